//! Seeded random streams for entity creation

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// Generator owned by each simulator; draws happen only at creation and spawn
pub type SimRng = Pcg64;

/// Deterministic stream for a seed
pub fn seeded(seed: u64) -> SimRng {
    Pcg64::seed_from_u64(seed)
}

/// Uniform sample in `[lo, hi)`, or `lo` when the range is empty
pub(crate) fn uniform(rng: &mut SimRng, lo: f32, hi: f32) -> f32 {
    if hi > lo { rng.gen_range(lo..hi) } else { lo }
}

/// Uniform integer in `[lo, hi]`
pub(crate) fn uniform_count(rng: &mut SimRng, lo: usize, hi: usize) -> usize {
    if hi > lo { rng.gen_range(lo..=hi) } else { lo }
}
