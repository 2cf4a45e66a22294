//! # Variant effect prediction
//!
//! Builds a reference and an alternate sequence window of the model's input length
//! around every variant, scores both with a sequence model and writes the per task
//! reference score, alternate score and delta.
//!
//! Windows are centered on the variant and, for indels, moved and resized so the
//! alternate sequence keeps the model's input length after the variant is applied.
//! Variants that still don't fit are skipped and reported, never fatal.
//!
//! ```rust,ignore
//! use varpred_effect::{PredictionConfig, PredictionPaths, run_prediction};
//!
//! let summary = run_prediction(&paths, &PredictionConfig::default())?;
//! ```
pub mod config;
pub mod diagnostics;
pub mod indel;
pub mod pipeline;
pub mod scorer;
pub mod sequences;
pub mod window;

pub use config::*;
pub use diagnostics::*;
pub use indel::adjust_interval;
pub use pipeline::*;
pub use scorer::{BatchScorer, PairScores};
pub use sequences::{SequencePair, SequenceSource, extract_pair};
pub use window::{center_interval, flank_sizes};
