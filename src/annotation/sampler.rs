use ahash::RandomState;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hash::{BuildHasher, Hash, Hasher};

use crate::error::{PulldownError, Result};

// Fixed keys so the decision depends only on the seed and the identifier
const KEYS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Keeps a stable fraction of identifiers.
///
/// The same seed and identifier always give the same answer, no matter how
/// many other identifiers were asked about before.
#[derive(Debug, Clone)]
pub struct DeterministicSampler {
    seed: u64,
    rate: f64,
}

impl DeterministicSampler {
    pub fn new(seed: u64, rate: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(PulldownError::InvalidSampleRate(rate));
        }
        Ok(DeterministicSampler { seed, rate })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn keep(&self, id: &str) -> bool {
        let mut hasher = RandomState::with_seeds(KEYS[0], KEYS[1], KEYS[2], KEYS[3]).build_hasher();
        self.seed.hash(&mut hasher);
        id.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(hasher.finish());
        rng.gen_bool(self.rate)
    }
}
