use anyhow::{Context, Result};
use log::info;
use ndarray::Array2;
use rayon::{ThreadPool, ThreadPoolBuilder};

use varpred_model::{Model, ModelError, encode_batch};

use crate::sequences::SequencePair;

/// Reference and alternate scores, one `(n, tasks)` matrix each, rows in pair order.
#[derive(Debug, Clone, PartialEq)]
pub struct PairScores {
    pub reference: Array2<f32>,
    pub alternate: Array2<f32>,
}

///
/// Scores all reference sequences in one model call and all alternate sequences
/// in another. Evaluation runs on a dedicated rayon pool.
///
pub struct BatchScorer<'a, M: Model + ?Sized> {
    model: &'a M,
    pool: ThreadPool,
}

impl<'a, M: Model + ?Sized> BatchScorer<'a, M> {
    ///
    /// # Arguments
    /// - model: the model to evaluate
    /// - threads: worker threads for evaluation, `0` picks rayon's default
    pub fn new(model: &'a M, threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(ModelError::from)?;
        Ok(BatchScorer { model, pool })
    }

    fn score_batch(&self, sequences: &[String]) -> Result<Array2<f32>> {
        let batch = encode_batch(sequences, self.model.input_length())?;
        let scores = self.pool.install(|| self.model.predict(batch.view()))?;
        Ok(scores)
    }

    pub fn score(&self, pairs: &[SequencePair]) -> Result<PairScores> {
        let reference: Vec<String> = pairs.iter().map(|p| p.reference.oriented()).collect();
        let alternate: Vec<String> = pairs.iter().map(|p| p.alternate.oriented()).collect();

        info!(
            "Scoring {} sequence pairs on {} threads",
            pairs.len(),
            self.pool.current_num_threads()
        );

        let reference = self
            .score_batch(&reference)
            .context("Failed to score reference sequences")?;
        let alternate = self
            .score_batch(&alternate)
            .context("Failed to score alternate sequences")?;

        Ok(PairScores {
            reference,
            alternate,
        })
    }
}
