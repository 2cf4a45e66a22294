use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::CoreError;

///
/// Classification of a variant by the lengths of its alleles.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VariantType {
    /// ref and alt have the same length (SNVs and MNVs)
    Snv,
    /// alt is longer than ref
    Insertion,
    /// ref is longer than alt
    Deletion,
}

impl VariantType {
    pub fn from_alleles(ref_allele: &str, alt_allele: &str) -> Self {
        match ref_allele.len().cmp(&alt_allele.len()) {
            std::cmp::Ordering::Equal => VariantType::Snv,
            std::cmp::Ordering::Greater => VariantType::Deletion,
            std::cmp::Ordering::Less => VariantType::Insertion,
        }
    }

    pub fn is_indel(&self) -> bool {
        !matches!(self, VariantType::Snv)
    }
}

impl Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantType::Snv => write!(f, "SNV"),
            VariantType::Insertion => write!(f, "INSERTION"),
            VariantType::Deletion => write!(f, "DELETION"),
        }
    }
}

///
/// A single variant, with a 1-based position and its reference and alternate alleles.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variant {
    pub chr: String,
    pub position: u64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub variant_type: VariantType,
}

impl Variant {
    ///
    /// Create a new variant. The type is derived from the allele lengths.
    ///
    pub fn new(chr: &str, position: u64, ref_allele: &str, alt_allele: &str) -> Self {
        Variant {
            chr: chr.to_owned(),
            position,
            ref_allele: ref_allele.to_owned(),
            alt_allele: alt_allele.to_owned(),
            variant_type: VariantType::from_alleles(ref_allele, alt_allele),
        }
    }

    /// Number of bases the alternate allele adds (positive) or removes (negative).
    pub fn length_change(&self) -> i64 {
        self.alt_allele.len() as i64 - self.ref_allele.len() as i64
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}>{}",
            self.chr, self.position, self.ref_allele, self.alt_allele
        )
    }
}

impl FromStr for Variant {
    type Err = CoreError;

    ///
    /// Parse a variant from the first four tab-separated columns of a line:
    /// `chr  pos  ref  alt`. Further columns are ignored.
    ///
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.split('\t');

        let chr = fields
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CoreError::VariantParseError(format!("missing chromosome: {}", line)))?;
        let position = fields
            .next()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|p| *p > 0)
            .ok_or_else(|| CoreError::VariantParseError(format!("invalid position: {}", line)))?;
        let ref_allele = fields
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CoreError::VariantParseError(format!("missing ref allele: {}", line)))?;
        let alt_allele = fields
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CoreError::VariantParseError(format!("missing alt allele: {}", line)))?;

        Ok(Variant::new(chr, position, ref_allele, alt_allele))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("A", "T", VariantType::Snv)]
    #[case("AC", "GT", VariantType::Snv)]
    #[case("AAA", "A", VariantType::Deletion)]
    #[case("A", "ACGT", VariantType::Insertion)]
    fn test_variant_type_from_alleles(
        #[case] ref_allele: &str,
        #[case] alt_allele: &str,
        #[case] expected: VariantType,
    ) {
        assert_eq!(VariantType::from_alleles(ref_allele, alt_allele), expected);
    }

    #[rstest]
    fn test_parse_variant_line() {
        let variant = Variant::from_str("chr1\t100\tAAA\tA\textra").unwrap();
        assert_eq!(variant.chr, "chr1");
        assert_eq!(variant.position, 100);
        assert_eq!(variant.variant_type, VariantType::Deletion);
        assert_eq!(variant.length_change(), -2);
        assert_eq!(variant.to_string(), "chr1:100 AAA>A");
    }

    #[rstest]
    #[case("chr1\tabc\tA\tT")]
    #[case("chr1\t0\tA\tT")]
    #[case("chr1\t100\tA")]
    #[case("")]
    fn test_parse_variant_line_fails(#[case] line: &str) {
        assert!(Variant::from_str(line).is_err());
    }
}
