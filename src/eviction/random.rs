//! Uniform random eviction policy.
//!
//! Every current entry is equally likely to be evicted, regardless of how
//! recently or how often it was read.

use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::EvictionPolicy;

/// Evicts an entry chosen uniformly at random.
pub struct RandomEviction {
    rng: SmallRng,
}

impl RandomEviction {
    /// A policy whose choices are reproducible across runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomEviction {
    fn default() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }
}

impl EvictionPolicy for RandomEviction {
    #[inline]
    fn select_victim(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "cannot evict from an empty store");
        self.rng.random_range(0..len)
    }
}

impl fmt::Debug for RandomEviction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomEviction").finish_non_exhaustive()
    }
}
