//! # Core data model for varpred
//!
//! Variants, BED-like regions, 1-based sequence windows ([models::Interval]) and the
//! sequences read from them. Also hosts small shared utilities such as readers that
//! transparently handle gzip'd input and the genome size file parser.
pub mod errors;
pub mod models;
pub mod utils;
