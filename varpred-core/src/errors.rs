use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Can't read file: {0}")]
    FileReadError(String),

    #[error("Error parsing genome size line: {0}")]
    ChromSizeParseError(String),

    #[error("Error parsing variant: {0}")]
    VariantParseError(String),

    #[error("Interval {0} can't be expressed as a region: position must be >= 1 and length > 0")]
    InvalidInterval(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised while editing a [crate::models::Sequence].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SequenceError {
    #[error("Variant {variant} lies outside of sequence window {interval}")]
    VariantOutsideWindow { variant: String, interval: String },
}
