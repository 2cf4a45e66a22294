use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FastaError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Can't index a gzip'd FASTA file, decompress it first: {0}")]
    CompressedFasta(String),

    #[error("Malformed FASTA index line: {0}")]
    MalformedIndex(String),

    #[error("Sequence {name} has inconsistent line lengths; all lines but the last must be equally long")]
    IrregularLineLength { name: String },

    #[error("Sequence {0} not found in FASTA index")]
    UnknownSequence(String),

    #[error("Region {name}:{start}-{end} contains non-ASCII bytes")]
    NonAsciiSequence { name: String, start: u64, end: u64 },

    #[error("Region {name}:{start}-{end} is out of bounds for a sequence of length {length}")]
    OutOfBounds {
        name: String,
        start: u64,
        end: u64,
        length: u64,
    },
}

pub type Result<T> = std::result::Result<T, FastaError>;
