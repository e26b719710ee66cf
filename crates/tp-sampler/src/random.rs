use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform random draws in `[0, 1)`.
///
/// Any `FnMut() -> f32` closure is a source, which makes scripted draws in
/// tests trivial.
pub trait RandomSource {
    fn draw(&mut self) -> f32;
}

impl<F> RandomSource for F
where
    F: FnMut() -> f32,
{
    fn draw(&mut self) -> f32 {
        self()
    }
}

/// A reproducible random source backed by a seeded `StdRng`.
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Create a source that yields the same draws for the same seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a non-reproducible source seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn draw(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }
}
