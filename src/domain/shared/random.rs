use rand::Rng;

/// Source of randomness for theme draws, seeds and credential picks.
///
/// Injected so tests can pin the draw.
pub trait RandomSource: Send + Sync {
    /// Uniform value in `[0, upper)`; 0 when `upper` is 0
    fn below(&self, upper: usize) -> usize;

    fn next_u64(&self) -> u64;
}

/// Thread-local RNG backed source used in production
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn below(&self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..upper)
    }

    fn next_u64(&self) -> u64 {
        rand::thread_rng().gen()
    }
}
