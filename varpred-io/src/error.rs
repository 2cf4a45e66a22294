use std::io;
use thiserror::Error;

/// Error type for varpred-io operations.
#[derive(Error, Debug)]
pub enum VarpredIoError {
    /// IO error occurred during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The variant file type flag is neither TSV nor VCF.
    #[error("Unknown file format identifier {0}. Can only be VCF or TSV")]
    UnknownFileType(String),

    /// A data line of a variant file could not be parsed.
    #[error("Malformed variant at {path}:{line}: {reason}")]
    MalformedVariant {
        path: String,
        line: usize,
        reason: String,
    },

    /// A prediction row doesn't have one score per task.
    #[error("Expected {expected} scores per allele but got {found}")]
    TaskCountMismatch { expected: usize, found: usize },
}

/// Result type alias for varpred-io operations.
pub type Result<T> = std::result::Result<T, VarpredIoError>;
