use ndarray::{Array2, ArrayView3};

use crate::error::Result;

///
/// A trained network that maps one-hot encoded sequences to per-task scores.
///
pub trait Model: Send + Sync {
    /// Number of bases every input sequence must have.
    fn input_length(&self) -> usize;

    /// Number of scores produced per sequence.
    fn num_tasks(&self) -> usize;

    ///
    /// Score a batch of one-hot encoded sequences.
    ///
    /// # Arguments
    /// - batch: `(n, input_length, 4)` tensor
    ///
    /// # Returns
    /// `(n, num_tasks)` scores, rows in batch order
    fn predict(&self, batch: ArrayView3<f32>) -> Result<Array2<f32>>;
}
