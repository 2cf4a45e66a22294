use std::fmt::{self, Display};

use crate::errors::CoreError;
use crate::models::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strand {
    #[default]
    Forward,
    Reverse,
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

///
/// A sequence window on a contig: 1-based start position, a length and a strand.
///
/// Position and length are signed so that window arithmetic can run past the
/// contig start or collapse to nothing; callers check [Interval::is_valid]
/// before reading bases.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    pub chr: String,
    pub position: i64,
    pub length: i64,
    pub strand: Strand,
}

impl Interval {
    pub fn new(chr: &str, position: i64, length: i64, strand: Strand) -> Self {
        Interval {
            chr: chr.to_owned(),
            position,
            length,
            strand,
        }
    }

    /// Last base covered by the interval (1-based, inclusive).
    pub fn end(&self) -> i64 {
        self.position + self.length - 1
    }

    pub fn is_reverse(&self) -> bool {
        self.strand == Strand::Reverse
    }

    /// True when the interval starts on the contig and covers at least one base.
    pub fn is_valid(&self) -> bool {
        self.position >= 1 && self.length > 0
    }
}

impl From<&Region> for Interval {
    fn from(region: &Region) -> Self {
        Interval {
            chr: region.chr.clone(),
            position: region.start as i64 + 1,
            length: region.width() as i64,
            strand: Strand::Forward,
        }
    }
}

impl TryFrom<&Interval> for Region {
    type Error = CoreError;

    fn try_from(interval: &Interval) -> Result<Self, Self::Error> {
        if !interval.is_valid() {
            return Err(CoreError::InvalidInterval(interval.to_string()));
        }
        let start = (interval.position - 1) as u64;
        Ok(Region {
            chr: interval.chr.clone(),
            start,
            end: start + interval.length as u64,
        })
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}({})",
            self.chr,
            self.position,
            self.end(),
            self.strand
        )
    }
}
