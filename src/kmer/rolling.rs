use crate::config::KmerSize;
use crate::kmer::codec::{complement_code, encode_base};

/// A k-mer window emitted by [`KmerIter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmerHit {
    /// Offset of the window's first base in the source sequence
    pub start: usize,
    pub forward: u64,
    pub reverse: u64,
}

/// Rolling 2-bit encoder holding the forward and reverse-complement
/// accumulators of the current window.
///
/// The forward code shifts left and takes the new base at the bottom; the
/// reverse-complement code shifts right and takes the complemented base at
/// the top. An invalid base empties the window.
#[derive(Debug, Clone, Copy)]
pub struct RollingKmer {
    k: KmerSize,
    forward: u64,
    reverse: u64,
    filled: usize,
}

impl RollingKmer {
    pub fn new(k: KmerSize) -> Self {
        Self {
            k,
            forward: 0,
            reverse: 0,
            filled: 0,
        }
    }

    /// Pushes one base; returns `(forward, reverse)` once K valid bases are in the window.
    #[inline(always)]
    pub fn push(&mut self, base: u8) -> Option<(u64, u64)> {
        let Some(code) = encode_base(base) else {
            self.reset();
            return None;
        };
        self.forward = ((self.forward << 2) | code) & self.k.mask();
        self.reverse = (self.reverse >> 2) | (complement_code(code) << self.k.top_shift());
        if self.filled < self.k.get() {
            self.filled += 1;
        }
        (self.filled == self.k.get()).then_some((self.forward, self.reverse))
    }

    #[inline(always)]
    pub fn reset(&mut self) {
        self.forward = 0;
        self.reverse = 0;
        self.filled = 0;
    }
}

/// Iterator over every all-valid window of a sequence, in order of start offset.
#[derive(Debug, Clone)]
pub struct KmerIter<'a> {
    seq: &'a [u8],
    pos: usize,
    roller: RollingKmer,
}

impl<'a> KmerIter<'a> {
    pub fn new(seq: &'a [u8], k: KmerSize) -> Self {
        Self {
            seq,
            pos: 0,
            roller: RollingKmer::new(k),
        }
    }
}

impl Iterator for KmerIter<'_> {
    type Item = KmerHit;

    fn next(&mut self) -> Option<Self::Item> {
        let k = self.roller.k.get();
        while self.pos < self.seq.len() {
            let base = self.seq[self.pos];
            self.pos += 1;
            if let Some((forward, reverse)) = self.roller.push(base) {
                return Some(KmerHit {
                    start: self.pos - k,
                    forward,
                    reverse,
                });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.seq.len() - self.pos;
        let upper = (remaining + self.roller.filled + 1)
            .saturating_sub(self.roller.k.get())
            .min(remaining);
        (0, Some(upper))
    }
}

/// All windows of `seq` with their reverse complements.
pub fn kmers(seq: &[u8], k: KmerSize) -> KmerIter<'_> {
    KmerIter::new(seq, k)
}

/// Forward-strand k-mers only.
pub fn forward_kmers(seq: &[u8], k: KmerSize) -> impl Iterator<Item = u64> + Clone + '_ {
    KmerIter::new(seq, k).map(|hit| hit.forward)
}

/// Forward and reverse-complement k-mers as two index-aligned vectors.
pub fn extract_separate(seq: &[u8], k: KmerSize) -> (Vec<u64>, Vec<u64>) {
    let capacity = (seq.len() + 1).saturating_sub(k.get());
    let mut forward = Vec::with_capacity(capacity);
    let mut reverse = Vec::with_capacity(capacity);
    for hit in kmers(seq, k) {
        forward.push(hit.forward);
        reverse.push(hit.reverse);
    }
    (forward, reverse)
}
