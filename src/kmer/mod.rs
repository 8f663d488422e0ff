//! K-mer processing: 2-bit codec, rolling extraction, entropy and
//! reference frequency counting.

pub mod codec;
pub mod entropy;
pub mod frequency;
pub mod rolling;

pub use codec::{decode_kmer, encode_base, encode_kmer, reverse_complement_kmer};
pub use rolling::{extract_separate, forward_kmers, kmers, KmerHit, KmerIter, RollingKmer};

/// Set of packed k-mers.
pub type KmerSet = ahash::AHashSet<u64>;
/// Packed k-mer to occurrence count.
pub type KmerCounts = ahash::AHashMap<u64, u64>;
