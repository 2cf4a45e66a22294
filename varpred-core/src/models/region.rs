use std::fmt::{self, Display};

use crate::models::Variant;
use crate::utils::ChromSizes;

///
/// Region struct, a BED-like region with 0-based, half-open coordinates
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    pub chr: String,
    pub start: u64,
    pub end: u64,
}

impl Region {
    ///
    /// The single-base anchor region `[pos - 1, pos)` of a variant
    ///
    pub fn from_variant(variant: &Variant) -> Self {
        Region {
            chr: variant.chr.clone(),
            start: variant.position.saturating_sub(1),
            end: variant.position,
        }
    }

    ///
    /// Get length of the region
    ///
    pub fn width(&self) -> u64 {
        self.end - self.start
    }

    ///
    /// Extend the region by `left` bases upstream and `right` bases downstream,
    /// clamped to `[0, chrom size]`. Contigs missing from `chrom_sizes` are only
    /// clamped at zero.
    ///
    /// # Arguments
    /// - left: number of bases to add before `start`
    /// - right: number of bases to add after `end`
    /// - chrom_sizes: genome sizes used for clamping
    pub fn slop(&self, left: u64, right: u64, chrom_sizes: &ChromSizes) -> Region {
        let start = self.start.saturating_sub(left);
        let mut end = self.end.saturating_add(right);
        if let Some(size) = chrom_sizes.get(&self.chr) {
            end = end.min(*size);
        }

        Region {
            chr: self.chr.clone(),
            start: start.min(end),
            end,
        }
    }

    ///
    /// Get file string of Region
    ///
    pub fn as_string(&self) -> String {
        format!("{}\t{}\t{}", self.chr, self.start, self.end)
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}
