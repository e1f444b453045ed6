//! Deterministic RNG wrapper used by every training loop.
//!
//! # Determinism strategy
//!
//! Each engine (route planner, transport allocator) owns one `SeededRng`
//! built from its config seed.  All exploration, sampling, and replay draws
//! go through it, so two runs with the same seed, graph, and parameters take
//! identical decisions.  Child generators are derived by mixing the parent's
//! next draw with an offset, which keeps sub-components independent without
//! sharing state.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seeded `SmallRng` with the helpers the training loops need.
///
/// Not `Sync`: a generator belongs to exactly one engine.
#[derive(Clone, Debug)]
pub struct SeededRng(SmallRng);

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        SeededRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive an independent generator, e.g. for a sub-engine that must not
    /// perturb the parent's draw sequence.
    pub fn child(&mut self, offset: u64) -> SeededRng {
        let seed = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SeededRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Uniform `f64` in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element; `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        slice.choose(&mut self.0)
    }

    /// Up to `amount` distinct elements, without replacement, in random order.
    pub fn sample<T: Clone>(&mut self, slice: &[T], amount: usize) -> Vec<T> {
        slice
            .choose_multiple(&mut self.0, amount.min(slice.len()))
            .cloned()
            .collect()
    }

    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.0);
    }
}
