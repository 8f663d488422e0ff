//! Annotation handling for bait extraction: feature parsing, region
//! filtering and deterministic subsampling.

pub mod gtf;
pub mod region;
pub mod sampler;

pub use gtf::{read_features, Feature};
pub use region::RegionSet;
pub use sampler::DeterministicSampler;
