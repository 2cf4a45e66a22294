use log::warn;

use crate::errors::SequenceError;
use crate::models::{Interval, Variant};
use crate::utils::reverse_complement;

///
/// The bases of an [Interval], stored in forward reference orientation.
///
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Sequence {
    pub bases: String,
    pub interval: Interval,
}

impl Sequence {
    pub fn new(bases: String, interval: Interval) -> Self {
        Sequence { bases, interval }
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    ///
    /// Substitute the variant's ref allele with its alt allele.
    ///
    /// The ref allele is replaced starting at the variant's offset within the
    /// window. When the ref allele runs past the end of the window only the
    /// covered part is removed, so the result can end up shorter than the
    /// window; callers compare the final length against what they need.
    ///
    /// # Arguments
    /// - variant: the variant to apply
    pub fn replace(&mut self, variant: &Variant) -> Result<(), SequenceError> {
        let offset = variant.position as i64 - self.interval.position;
        if variant.chr != self.interval.chr || offset < 0 || offset >= self.bases.len() as i64 {
            return Err(SequenceError::VariantOutsideWindow {
                variant: variant.to_string(),
                interval: self.interval.to_string(),
            });
        }

        let start = offset as usize;
        let end = (start + variant.ref_allele.len()).min(self.bases.len());

        let observed = &self.bases[start..end];
        let matches_reference = variant
            .ref_allele
            .get(..end - start)
            .is_some_and(|expected| expected.eq_ignore_ascii_case(observed));
        if !matches_reference {
            warn!(
                "Reference allele of variant {} does not match reference bases {} in {}",
                variant, observed, self.interval
            );
        }

        self.bases.replace_range(start..end, &variant.alt_allele);

        Ok(())
    }

    ///
    /// The bases as read along the interval's strand.
    ///
    pub fn oriented(&self) -> String {
        match self.interval.is_reverse() {
            true => reverse_complement(&self.bases),
            false => self.bases.clone(),
        }
    }
}
