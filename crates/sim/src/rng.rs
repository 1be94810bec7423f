//! Seeded randomness for simulation runs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The single random source threaded through a run.
///
/// ChaCha8 output is stable across platforms and rand releases, so a seed
/// reproduces the same run anywhere.
pub type SimRng = ChaCha8Rng;

pub fn sim_rng(seed: u64) -> SimRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Uniform index in `[0, len - 1]`. `len` must be positive.
pub fn rand_idx(rng: &mut SimRng, len: usize) -> usize {
    debug_assert!(len > 0, "rand_idx on empty range");
    rng.gen_range(0..len)
}
