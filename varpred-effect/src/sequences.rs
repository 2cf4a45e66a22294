use anyhow::Result;

use varpred_core::models::{Interval, Sequence, Variant};
use varpred_fasta::IndexedFasta;

use crate::diagnostics::SkipReason;
use crate::indel::adjust_interval;

///
/// Anything that can hand out the reference bases of an interval.
///
pub trait SequenceSource {
    fn read_sequence(&self, interval: &Interval) -> Result<Sequence>;
}

impl SequenceSource for IndexedFasta {
    fn read_sequence(&self, interval: &Interval) -> Result<Sequence> {
        IndexedFasta::read_sequence(self, interval)
    }
}

///
/// A variant together with the two sequences that get scored for it.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencePair {
    pub variant: Variant,
    pub reference: Sequence,
    pub alternate: Sequence,
}

///
/// Build the reference and alternate sequences of a variant.
///
/// The reference sequence is read from the centered window. For indels the
/// alternate sequence is read from the adjusted window before the variant is
/// applied; for substitutions it starts as a copy of the reference.
///
/// Reader failures are fatal and returned as the outer error. Variants that
/// can't produce two sequences of `input_length` bases come back as a
/// [SkipReason].
///
/// # Arguments
/// - source: where to read reference bases from
/// - variant: the variant
/// - centered: window of `input_length` bases centered on the variant
/// - input_length: number of bases the model consumes
pub fn extract_pair<S: SequenceSource + ?Sized>(
    source: &S,
    variant: &Variant,
    centered: &Interval,
    input_length: usize,
) -> Result<std::result::Result<SequencePair, SkipReason>> {
    let reference = source.read_sequence(centered)?;
    if reference.len() != input_length {
        return Ok(Err(SkipReason::WrongWindowSize {
            interval: centered.clone(),
            found: reference.len(),
            expected: input_length,
        }));
    }

    let mut alternate = match variant.variant_type.is_indel() {
        true => match adjust_interval(variant, centered) {
            Ok(adjusted) if !adjusted.is_valid() => {
                return Ok(Err(SkipReason::OffContigStart(adjusted)));
            }
            Ok(adjusted) => source.read_sequence(&adjusted)?,
            Err(reason) => return Ok(Err(reason)),
        },
        false => reference.clone(),
    };

    if alternate.replace(variant).is_err() {
        return Ok(Err(SkipReason::VariantOutsideWindow(alternate.interval)));
    }

    let found = alternate.len();
    if found != input_length {
        return Ok(Err(SkipReason::LengthMismatchAfterIndel {
            interval: alternate.interval,
            found,
            expected: input_length,
        }));
    }

    Ok(Ok(SequencePair {
        variant: variant.clone(),
        reference,
        alternate,
    }))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use varpred_core::models::{Region, Strand};

    /// An in-memory single-contig genome with 1-based coordinates.
    pub(crate) struct InMemoryGenome {
        pub chr: String,
        pub bases: String,
    }

    impl SequenceSource for InMemoryGenome {
        fn read_sequence(&self, interval: &Interval) -> Result<Sequence> {
            let region = Region::try_from(interval)?;
            anyhow::ensure!(region.chr == self.chr, "unknown contig {}", region.chr);
            let end = (region.end as usize).min(self.bases.len());
            let start = (region.start as usize).min(end);
            Ok(Sequence::new(
                self.bases[start..end].to_string(),
                interval.clone(),
            ))
        }
    }

    #[fixture]
    fn genome() -> InMemoryGenome {
        // positions 1..=12
        InMemoryGenome {
            chr: "chr1".to_string(),
            bases: "ACGTTGCAACGT".to_string(),
        }
    }

    fn centered(position: i64, length: i64) -> Interval {
        Interval::new("chr1", position, length, Strand::Forward)
    }

    #[rstest]
    fn test_snv_pair(genome: InMemoryGenome) {
        // G at position 6
        let variant = Variant::new("chr1", 6, "G", "A");
        let pair = extract_pair(&genome, &variant, &centered(4, 4), 4)
            .unwrap()
            .unwrap();

        assert_eq!(pair.reference.bases, "TTGC");
        assert_eq!(pair.alternate.bases, "TTAC");
        assert_eq!(pair.alternate.interval, pair.reference.interval);
    }

    #[rstest]
    fn test_insertion_pair(genome: InMemoryGenome) {
        let variant = Variant::new("chr1", 6, "G", "GTT");
        let pair = extract_pair(&genome, &variant, &centered(4, 4), 4)
            .unwrap()
            .unwrap();

        assert_eq!(pair.reference.bases, "TTGC");
        // adjusted window 6-7 is "GC"
        assert_eq!(pair.alternate.bases, "GTTC");
        assert_eq!(pair.alternate.interval, centered(6, 2));
    }

    #[rstest]
    fn test_deletion_pair(genome: InMemoryGenome) {
        // window of 10 leaves room right of the deleted bases
        let variant = Variant::new("chr1", 7, "CA", "C");
        let pair = extract_pair(&genome, &variant, &centered(2, 10), 10)
            .unwrap()
            .unwrap();

        assert_eq!(pair.reference.bases, "CGTTGCAACG");
        // adjusted window 1-11 "ACGTTGCAACG", drop the A at 8
        assert_eq!(pair.alternate.bases, "ACGTTGCACG");
        assert_eq!(pair.alternate.len(), 10);
    }

    #[rstest]
    fn test_deletion_past_window_end_is_dropped(genome: InMemoryGenome) {
        let variant = Variant::new("chr1", 6, "GCA", "G");
        let result = extract_pair(&genome, &variant, &centered(4, 4), 4).unwrap();

        assert_eq!(
            result,
            Err(SkipReason::LengthMismatchAfterIndel {
                interval: centered(2, 6),
                found: 5,
                expected: 4,
            })
        );
    }

    #[rstest]
    fn test_deletion_before_contig_start_is_dropped(genome: InMemoryGenome) {
        // window 1-4 shifts two bases left of position 1
        let variant = Variant::new("chr1", 3, "GTT", "G");
        let result = extract_pair(&genome, &variant, &centered(1, 4), 4).unwrap();

        assert_eq!(result, Err(SkipReason::OffContigStart(centered(-1, 6))));
    }

    #[rstest]
    fn test_insertion_longer_than_window_is_dropped(genome: InMemoryGenome) {
        let variant = Variant::new("chr1", 6, "G", "GTTTTT");
        let result = extract_pair(&genome, &variant, &centered(4, 4), 4).unwrap();
        assert!(matches!(result, Err(SkipReason::NonPositiveLength(_))));
    }

    #[rstest]
    fn test_reference_truncated_at_contig_end(genome: InMemoryGenome) {
        let variant = Variant::new("chr1", 12, "T", "A");
        let result = extract_pair(&genome, &variant, &centered(10, 4), 4).unwrap();
        assert!(matches!(
            result,
            Err(SkipReason::WrongWindowSize { found: 3, .. })
        ));
    }

    #[rstest]
    fn test_unknown_contig_is_fatal(genome: InMemoryGenome) {
        let variant = Variant::new("chr9", 6, "G", "A");
        let interval = Interval::new("chr9", 4, 4, Strand::Forward);
        assert!(extract_pair(&genome, &variant, &interval, 4).is_err());
    }
}
