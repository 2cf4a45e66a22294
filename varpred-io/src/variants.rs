use std::fmt::{self, Display};
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use varpred_core::models::Variant;
use varpred_core::utils::get_dynamic_reader;

use crate::error::VarpredIoError;

///
/// Layout of a variant input file.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[allow(clippy::upper_case_acronyms)]
pub enum VariantFileType {
    /// `chr  pos  ref  alt`, tab-separated
    #[default]
    TSV,
    /// standard variant call format
    VCF,
}

impl FromStr for VariantFileType {
    type Err = VarpredIoError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TSV" => Ok(VariantFileType::TSV),
            "VCF" => Ok(VariantFileType::VCF),
            _ => Err(VarpredIoError::UnknownFileType(s.to_string())),
        }
    }
}

impl TryFrom<String> for VariantFileType {
    type Error = VarpredIoError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        VariantFileType::from_str(&value)
    }
}

impl From<VariantFileType> for String {
    fn from(value: VariantFileType) -> Self {
        value.to_string()
    }
}

impl Display for VariantFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantFileType::TSV => write!(f, "TSV"),
            VariantFileType::VCF => write!(f, "VCF"),
        }
    }
}

///
/// Load all variants of a single file, in file order.
///
/// Lines starting with `#` are headers or comments, empty lines are ignored.
/// For VCF input every ALT allele becomes its own variant; symbolic (`<DEL>`),
/// missing (`.`) and spanning-deletion (`*`) alleles are skipped.
///
/// # Arguments
/// - path: path to the (optionally gzip'd) variant file
/// - file_type: layout of the file
pub fn load_variants<P: AsRef<Path>>(path: P, file_type: VariantFileType) -> Result<Vec<Variant>> {
    let path = path.as_ref();
    let reader = get_dynamic_reader(path)?;

    let mut variants = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let malformed = |reason: String| VarpredIoError::MalformedVariant {
            path: path.display().to_string(),
            line: idx + 1,
            reason,
        };

        match file_type {
            VariantFileType::TSV => {
                let variant = Variant::from_str(line).map_err(|e| malformed(e.to_string()))?;
                variants.push(variant);
            }
            VariantFileType::VCF => {
                let parsed = parse_vcf_line(line).map_err(malformed)?;
                variants.extend(parsed);
            }
        }
    }

    debug!("Loaded {} variants from {}", variants.len(), path.display());

    Ok(variants)
}

///
/// Load and concatenate the variants of several files, keeping file order.
///
pub fn load_variants_from_files<P: AsRef<Path>>(
    paths: &[P],
    file_type: VariantFileType,
) -> Result<Vec<Variant>> {
    let mut variants = Vec::new();
    for path in paths {
        variants.extend(load_variants(path, file_type)?);
    }

    info!(
        "Loaded {} variants from {} {} file(s)",
        variants.len(),
        paths.len(),
        file_type
    );

    Ok(variants)
}

fn parse_vcf_line(line: &str) -> std::result::Result<Vec<Variant>, String> {
    let fields: Vec<&str> = line.splitn(6, '\t').collect();
    if fields.len() < 5 {
        return Err(format!("expected at least 5 columns, found {}", fields.len()));
    }

    let chrom = fields[0];
    let pos = fields[1]
        .parse::<u64>()
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| format!("invalid POS field: {}", fields[1]))?;
    let ref_allele = fields[3];
    if ref_allele.is_empty() || ref_allele == "." {
        return Err("missing REF allele".to_string());
    }

    let variants = fields[4]
        .split(',')
        .filter(|alt| !(alt.is_empty() || alt.starts_with('<') || *alt == "*" || *alt == "."))
        .map(|alt| Variant::new(chrom, pos, ref_allele, alt))
        .collect();

    Ok(variants)
}
