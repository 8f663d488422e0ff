//! Run configuration shared by the library stages.
//!
//! Every stage takes its configuration as an explicit value; nothing here is
//! global. The CLI builds these from parsed arguments and calls `validate`
//! before any file is touched.

use crate::error::{PulldownError, Result};
use crate::io::is_stdio;
use std::path::PathBuf;

/// Largest supported k-mer length.
pub const MAX_K: usize = 30;

/// A validated k-mer length together with its 2K-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmerSize {
    k: usize,
    mask: u64,
}

impl KmerSize {
    pub fn new(k: usize) -> Result<Self> {
        if k == 0 || k > MAX_K {
            return Err(PulldownError::InvalidKmerSize(k));
        }
        Ok(KmerSize {
            k,
            mask: (1u64 << (2 * k)) - 1,
        })
    }

    #[inline(always)]
    pub fn get(self) -> usize {
        self.k
    }

    /// Mask keeping the low 2K bits of an accumulator.
    #[inline(always)]
    pub fn mask(self) -> u64 {
        self.mask
    }

    /// Bit offset of the most significant base.
    #[inline(always)]
    pub fn top_shift(self) -> u32 {
        2 * (self.k as u32 - 1)
    }
}

/// Settings for the bait masking stage.
#[derive(Debug, Clone)]
pub struct MaskConfig {
    pub k: KmerSize,
    /// Minimum entropy per base; k-mers below it are pruned
    pub min_entropy: Option<f64>,
    /// Maximum occurrences in the genome; k-mers above it are pruned
    pub max_count: Option<u64>,
    pub genome: Option<PathBuf>,
    pub histogram: Option<PathBuf>,
}

impl MaskConfig {
    pub fn new(k: KmerSize) -> Self {
        MaskConfig {
            k,
            min_entropy: None,
            max_count: None,
            genome: None,
            histogram: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(threshold) = self.min_entropy {
            if threshold.is_nan() || threshold < 0.0 {
                return Err(PulldownError::InvalidEntropy(threshold));
            }
        }
        if self.max_count.is_some() && self.genome.is_none() {
            return Err(PulldownError::MissingGenome);
        }
        Ok(())
    }

    /// Frequency pruning runs only when both a limit and a genome are set.
    pub fn frequency_limit(&self) -> Option<(u64, &PathBuf)> {
        match (self.max_count, self.genome.as_ref()) {
            (Some(max), Some(genome)) => Some((max, genome)),
            _ => None,
        }
    }
}

/// One left/right pair of read files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadFilePair {
    pub left: PathBuf,
    pub right: PathBuf,
}

impl ReadFilePair {
    /// Group a flat list of files as `l1 r1 l2 r2 ...`.
    pub fn from_flat(files: Vec<PathBuf>) -> Result<Vec<ReadFilePair>> {
        if files.len() % 2 != 0 {
            return Err(PulldownError::UnpairedReads(files.len()));
        }
        let mut pairs = Vec::with_capacity(files.len() / 2);
        let mut iter = files.into_iter();
        while let (Some(left), Some(right)) = (iter.next(), iter.next()) {
            pairs.push(ReadFilePair { left, right });
        }
        Ok(pairs)
    }
}

/// Settings for the pulldown stage.
#[derive(Debug, Clone)]
pub struct PulldownConfig {
    pub k: KmerSize,
    pub suffix: String,
    pub stats: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub pairs: Vec<ReadFilePair>,
    /// Log progress every this many read pairs
    pub progress_every: u64,
}

impl PulldownConfig {
    pub fn new(k: KmerSize, suffix: impl Into<String>, pairs: Vec<ReadFilePair>) -> Self {
        PulldownConfig {
            k,
            suffix: suffix.into(),
            stats: None,
            summary: None,
            pairs,
            progress_every: 1_000_000,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.suffix.is_empty() {
            return Err(PulldownError::EmptySuffix);
        }
        for pair in &self.pairs {
            if is_stdio(&pair.left) || is_stdio(&pair.right) {
                return Err(PulldownError::StdinReads);
            }
            if pair.left == pair.right {
                return Err(PulldownError::RepeatedReadFile(pair.left.clone()));
            }
        }
        Ok(())
    }
}
