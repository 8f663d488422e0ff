//! Bait masking and k-mer pulldown of paired sequencing reads.
//!
//! Baits are indexed as packed 2-bit k-mers. Masking prunes low-complexity
//! and genome-repetitive k-mers and rewrites the covered bases as `N`;
//! pulldown keeps every read pair sharing a k-mer with the masked baits.

pub mod annotation;
pub mod config;
pub mod error;
pub mod io;
pub mod kmer;
pub mod pipeline;
pub mod stats;

pub use config::{KmerSize, MaskConfig, PulldownConfig, ReadFilePair};
pub use error::{PulldownError, Result};
