//! Deterministic per-scanner RNG.
//!
//! # Determinism strategy
//!
//! Each scanner gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (scanner_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive scanner IDs uniformly across the seed space.
//!
//! Scan tasks run on pool threads and must own their randomness, so each
//! collection [`fork`][ScannerRng::fork]s a child generator from the
//! scanner's root.  Counts are therefore reproducible for a given seed no
//! matter which worker thread picks up which scanner.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::ScannerId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-scanner deterministic RNG.
#[derive(Clone, Debug)]
pub struct ScannerRng(SmallRng);

impl ScannerRng {
    /// Seed deterministically from the run's global seed and a scanner ID.
    pub fn new(global_seed: u64, scanner: ScannerId) -> Self {
        let seed = global_seed ^ (scanner.0 as u64).wrapping_mul(MIXING_CONSTANT);
        ScannerRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive an independent child generator, advancing `self`.
    pub fn fork(&mut self) -> ScannerRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ MIXING_CONSTANT;
        ScannerRng(SmallRng::seed_from_u64(child_seed))
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Choose a random element from a non-empty slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}
