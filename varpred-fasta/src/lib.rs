//! # Indexed FASTA access
//!
//! Computes and reads samtools-compatible `.fai` indexes and fetches subsequences of a
//! memory-mapped reference genome by name and coordinates.
pub mod error;
pub mod faidx;
pub mod reader;

pub use error::*;
pub use faidx::*;
pub use reader::*;
