//! 2-bit nucleotide codec and packed k-mer helpers.
//!
//! A=0, C=1, G=2, T/U=3. The first base of a k-mer sits in the most
//! significant occupied bits, so a packed k-mer sorts like its text.

const INVALID: u8 = 4;

static DNA_CODES: [u8; 256] = {
    let mut table = [INVALID; 256];
    table[b'A' as usize] = 0;
    table[b'a' as usize] = 0;
    table[b'C' as usize] = 1;
    table[b'c' as usize] = 1;
    table[b'G' as usize] = 2;
    table[b'g' as usize] = 2;
    table[b'T' as usize] = 3;
    table[b't' as usize] = 3;
    table[b'U' as usize] = 3;
    table[b'u' as usize] = 3;
    table
};

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Encodes one nucleotide, or `None` for anything outside ACGTU.
#[inline(always)]
pub fn encode_base(base: u8) -> Option<u64> {
    match DNA_CODES[base as usize] {
        INVALID => None,
        code => Some(code as u64),
    }
}

/// Complement of an encoded base (A<->T, C<->G).
#[inline(always)]
pub fn complement_code(code: u64) -> u64 {
    3 - code
}

/// Encodes a whole k-mer, or `None` if any base is invalid.
pub fn encode_kmer(seq: &[u8]) -> Option<u64> {
    let mut val: u64 = 0;
    for &b in seq {
        val = (val << 2) | encode_base(b)?;
    }
    Some(val)
}

/// Decodes a packed k-mer of length `k` to uppercase text.
pub fn decode_kmer(k: usize, kmer: u64) -> String {
    (0..k)
        .map(|i| {
            let shift = 2 * (k - 1 - i);
            BASES[((kmer >> shift) & 3) as usize] as char
        })
        .collect()
}

/// Reverse complement of a packed k-mer computed base by base.
///
/// The extractor maintains this incrementally; this form is for callers
/// holding a single k-mer.
pub fn reverse_complement_kmer(k: usize, kmer: u64) -> u64 {
    let mut fwd = kmer;
    let mut rev = 0u64;
    for _ in 0..k {
        rev = (rev << 2) | complement_code(fwd & 3);
        fwd >>= 2;
    }
    rev
}

/// Reverse complement of a text sequence; case is kept, non-nucleotides pass through.
pub fn reverse_complement_seq(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|c| match c {
            'A' => 'T',
            'C' => 'G',
            'G' => 'C',
            'T' | 'U' => 'A',
            'a' => 't',
            'c' => 'g',
            'g' => 'c',
            't' | 'u' => 'a',
            other => other,
        })
        .collect()
}

/// Per-base counts (A, C, G, T) of a packed k-mer.
pub fn base_counts(k: usize, kmer: u64) -> [usize; 4] {
    let mut counts = [0usize; 4];
    let mut val = kmer;
    for _ in 0..k {
        counts[(val & 3) as usize] += 1;
        val >>= 2;
    }
    counts
}
