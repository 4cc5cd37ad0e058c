//! SubBatch, a column of [`TransitionBatch`](super::TransitionBatch).
use anyhow::Result;

/// Column storage for one observation field of a replay memory.
pub trait SubBatch {
    /// Builds a subbatch with a capacity.
    fn new(capacity: usize) -> Self;

    /// Fails if `data` cannot be written by [`SubBatch::push`].
    fn check(&self, data: &Self) -> Result<()>;

    /// Writes the single sample in `data` at position `i`.
    fn push(&mut self, i: usize, data: &Self) -> Result<()>;

    /// Takes samples in the batch.
    fn sample(&self, ixs: &[usize]) -> Self;
}
