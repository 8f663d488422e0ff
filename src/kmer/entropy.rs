use crate::config::KmerSize;
use crate::kmer::codec::base_counts;

/// Shannon entropy (bits) of the base composition of a packed k-mer.
///
/// Bases that do not occur contribute nothing, so the result lies in [0, 2].
pub fn entropy(k: KmerSize, kmer: u64) -> f64 {
    let n = k.get() as f64;
    base_counts(k.get(), kmer)
        .into_iter()
        .filter(|&count| count > 0)
        .map(|count| {
            let p = count as f64 / n;
            -p * p.log2()
        })
        .sum()
}

/// Entropy divided by K, the unit the masking threshold is expressed in.
pub fn entropy_per_base(k: KmerSize, kmer: u64) -> f64 {
    entropy(k, kmer) / k.get() as f64
}

/// True when the k-mer falls below the per-base entropy threshold.
#[inline]
pub fn is_low_entropy(k: KmerSize, kmer: u64, threshold: f64) -> bool {
    entropy_per_base(k, kmer) < threshold
}
