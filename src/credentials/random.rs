//! Pluggable randomness for credential selection.

use rand::Rng;

/// Source of uniformly distributed indices.
///
/// Implementations must return a value in `0..len`; `len` is never zero.
pub trait RandomSource: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

/// Thread-local RNG from the `rand` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Replays a fixed sequence of picks, cycling when exhausted.
#[cfg(test)]
pub(crate) struct SequenceRandom {
    picks: Vec<usize>,
    cursor: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl SequenceRandom {
    pub(crate) fn new(picks: Vec<usize>) -> Self {
        Self {
            picks,
            cursor: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
impl RandomSource for SequenceRandom {
    fn pick(&self, _len: usize) -> usize {
        let i = self
            .cursor
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.picks[i % self.picks.len()]
    }
}
