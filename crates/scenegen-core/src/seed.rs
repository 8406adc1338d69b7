//! Seed sources for generation runs.
//!
//! A run draws exactly one seed at start and hands it to every stage. The
//! default source reads the OS CSPRNG; the deterministic sources are opt-in
//! and meant for reproducible tests and benchmark sweeps.

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng};

/// Exclusive upper bound of every seed handed to the engine.
pub const SEED_BOUND: u64 = 1 << 31;

pub trait SeedSource: Send {
    /// Draws the next seed, always below [`SEED_BOUND`].
    fn next_seed(&mut self) -> u64;
}

/// Uniform draws from the operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSeedSource;

impl SeedSource for OsSeedSource {
    fn next_seed(&mut self) -> u64 {
        OsRng.gen_range(0..SEED_BOUND)
    }
}

/// Always returns the same seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSeed(u64);

impl FixedSeed {
    /// Returns `None` when `seed` is outside `[0, SEED_BOUND)`.
    pub fn new(seed: u64) -> Option<Self> {
        (seed < SEED_BOUND).then_some(Self(seed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl SeedSource for FixedSeed {
    fn next_seed(&mut self) -> u64 {
        self.0
    }
}

/// Reproducible stream of seeds derived from a master seed.
#[derive(Debug, Clone)]
pub struct SeedSequence {
    rng: StdRng,
}

impl SeedSequence {
    pub fn from_master(master: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(master),
        }
    }
}

impl SeedSource for SeedSequence {
    fn next_seed(&mut self) -> u64 {
        self.rng.gen_range(0..SEED_BOUND)
    }
}

/// Starts at a fixed seed; any redraw comes from a [`SeedSequence`] mastered
/// on that seed, so retries differ from the first attempt yet stay reproducible.
#[derive(Debug, Clone)]
pub struct FixedStart {
    first: Option<u64>,
    redraws: SeedSequence,
}

impl FixedStart {
    /// Returns `None` when `seed` is outside `[0, SEED_BOUND)`.
    pub fn new(seed: u64) -> Option<Self> {
        FixedSeed::new(seed).map(|fixed| Self {
            first: Some(fixed.value()),
            redraws: SeedSequence::from_master(fixed.value()),
        })
    }
}

impl SeedSource for FixedStart {
    fn next_seed(&mut self) -> u64 {
        match self.first.take() {
            Some(seed) => seed,
            None => self.redraws.next_seed(),
        }
    }
}

impl<S: SeedSource + ?Sized> SeedSource for Box<S> {
    fn next_seed(&mut self) -> u64 {
        (**self).next_seed()
    }
}
