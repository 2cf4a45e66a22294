//! # Sequence models for varpred
//!
//! One-hot encoding of DNA, and a CPU evaluator for convolutional networks saved as a
//! Keras-style `Sequential` architecture (JSON) plus `.npz` weights.
//!
//! ```rust,ignore
//! use varpred_model::{Model, SequentialModel, encode_batch};
//!
//! let model = SequentialModel::load("model.json", "weights.npz")?;
//! let batch = encode_batch(&["ACGT"], model.input_length())?;
//! let scores = model.predict(batch.view())?;
//! ```
pub mod architecture;
pub mod encoding;
pub mod error;
pub mod layers;
pub mod model;
pub mod sequential;

pub use architecture::Architecture;
pub use encoding::*;
pub use error::*;
pub use model::Model;
pub use sequential::*;
