//! # Input/Output utilities for varpred.
//!
//! Reading variant lists (tab-separated or VCF, plain or gzip'd) and writing the
//! gzip'd, tab-separated prediction tables.
//!
pub mod error;
pub mod predictions;
pub mod variants;

// re-expose core functions
pub use error::*;
pub use predictions::*;
pub use variants::*;
