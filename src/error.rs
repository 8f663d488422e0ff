use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by the pulldown library.
#[derive(Error, Debug)]
pub enum PulldownError {
    /// K outside the supported 1..=30 range
    #[error("invalid k-mer size {0}: must be between 1 and 30")]
    InvalidKmerSize(usize),
    /// A maximum k-mer count was given without a genome to count against
    #[error("--max-count requires --genome")]
    MissingGenome,
    #[error("invalid entropy threshold {0}: must be a non-negative number")]
    InvalidEntropy(f64),
    /// Read files must come in left/right pairs
    #[error("expected paired read files, got an odd number ({0})")]
    UnpairedReads(usize),
    #[error("output suffix must not be empty")]
    EmptySuffix,
    /// Pulldown output names derive from input names, so reads must be files
    #[error("paired read files cannot be read from stdin")]
    StdinReads,
    #[error("{} is given as both reads of a pair", .0.display())]
    RepeatedReadFile(PathBuf),
    #[error("invalid sample rate {0}: must be between 0 and 1")]
    InvalidSampleRate(f64),
    #[error("invalid region '{0}'")]
    InvalidRegion(String),
    #[error("malformed annotation at line {line}: {reason}")]
    MalformedAnnotation { line: usize, reason: String },
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PulldownError {
    /// Attach the offending path to an I/O error.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        PulldownError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PulldownError>;
