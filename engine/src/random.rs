//! Randomness seam for sequence generation.
//!
//! Generation only needs uniform indexes for a game, not cryptographic strength.
//! Tests inject a closure to make draws deterministic.

/// Source of uniformly distributed indexes.
pub trait RandomSource {
    /// Draw an index in `[0, bound)`. `bound` is always at least 1.
    fn next_index(&mut self, bound: usize) -> usize;
}

/// Thread-local generator from the `rand` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_index(&mut self, bound: usize) -> usize {
        rand::random_range(0..bound)
    }
}

impl<F> RandomSource for F
where
    F: FnMut(usize) -> usize,
{
    fn next_index(&mut self, bound: usize) -> usize {
        self(bound)
    }
}

/// Boxed source used by owners that swap generators at runtime.
pub type BoxedRandom = Box<dyn RandomSource>;

/// Builds a fresh source for each new engine.
pub type RandomFactory = Box<dyn FnMut() -> BoxedRandom>;

#[must_use]
pub fn thread_random_factory() -> RandomFactory {
    Box::new(|| Box::new(ThreadRandom))
}

/// Replays `indexes` in order, wrapping around.
#[cfg(test)]
pub(crate) fn scripted(indexes: Vec<usize>) -> impl FnMut(usize) -> usize {
    let mut cursor = 0;
    move |_| {
        let index = indexes[cursor % indexes.len()];
        cursor += 1;
        index
    }
}
