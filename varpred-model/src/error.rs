use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Can't parse model architecture: {0}")]
    Architecture(#[from] serde_json::Error),

    #[error("Unsupported model class {0}, only Sequential models can be evaluated")]
    UnsupportedModel(String),

    #[error("Model architecture doesn't declare an input shape on its first layer")]
    MissingInputShape,

    #[error("Model input must be (length, {expected}) but is {found:?}")]
    InvalidInputShape { expected: usize, found: Vec<Option<usize>> },

    #[error("Can't read weights: {0}")]
    Weights(String),

    #[error("Weight {name} has shape {found:?}, expected {expected:?}")]
    WeightShape {
        name: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Layer {layer} can't be applied: {reason}")]
    LayerShape { layer: String, reason: String },

    #[error("Model output must be a vector of task scores, got {0} dimensions")]
    NonVectorOutput(usize),

    #[error("Batch has shape {found:?}, model expects (n, {length}, {channels})")]
    BatchShape {
        found: Vec<usize>,
        length: usize,
        channels: usize,
    },

    #[error("Sequences in a batch must have the same length: expected {expected}, got {found}")]
    RaggedBatch { expected: usize, found: usize },

    #[error("Can't build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, ModelError>;
