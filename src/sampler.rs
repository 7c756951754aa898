// Randomness is pulled through `Sampler` so tests can script the draws.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait Sampler {
    /// Uniform position in `0..len`. `len` is never zero.
    fn choose(&mut self, len: usize) -> usize;

    /// `amount` distinct positions in `0..len`, without replacement.
    /// Callers guarantee `amount <= len`.
    fn sample(&mut self, len: usize, amount: usize) -> Vec<usize>;
}

#[derive(Debug, Clone)]
pub struct RngSampler<R> {
    rng: R,
}

impl<R: Rng> RngSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSampler<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> Sampler for RngSampler<R> {
    fn choose(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn sample(&mut self, len: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.rng, len, amount).into_vec()
    }
}

impl<S: Sampler + ?Sized> Sampler for &mut S {
    fn choose(&mut self, len: usize) -> usize {
        (**self).choose(len)
    }

    fn sample(&mut self, len: usize, amount: usize) -> Vec<usize> {
        (**self).sample(len, amount)
    }
}
