use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use varpred_io::VariantFileType;

///
/// Settings of a prediction run. Every key is optional in the TOML file, and
/// `altMinusRef` / `fileType` are accepted as well.
///
/// ```toml
/// alt_minus_ref = false
/// file_type = "vcf"
/// threads = 8
/// ```
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PredictionConfig {
    /// Report `alt - ref` as delta, `ref - alt` otherwise.
    #[serde(alias = "altMinusRef")]
    pub alt_minus_ref: bool,
    /// Layout of the variant files.
    #[serde(alias = "fileType")]
    pub file_type: VariantFileType,
    /// Threads used to evaluate the model, `0` for one per core.
    pub threads: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        PredictionConfig {
            alt_minus_ref: true,
            file_type: VariantFileType::TSV,
            threads: 0,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Invalid prediction config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl FromStr for PredictionConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

impl TryFrom<&Path> for PredictionConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        PredictionConfig::from_str(&toml_str)
    }
}
