use varpred_core::models::{Interval, Strand, Variant, VariantType};

use crate::diagnostics::SkipReason;

///
/// Move and resize a centered window so that, once the variant is applied, the
/// alternate sequence read from it keeps the window's original length.
///
/// A deletion removes `extend` bases, so the window starts `extend` bases earlier
/// along its strand and grows by `extend`. An insertion adds `extend` bases, so
/// the window starts later and shrinks. Substitutions keep the window unchanged.
///
/// The move is a heuristic: long deletions whose ref allele runs past the window
/// end still come out short, and callers drop those after substitution.
///
/// # Arguments
/// - variant: the variant that will be applied to the window
/// - centered: the window centered on the variant
pub fn adjust_interval(variant: &Variant, centered: &Interval) -> Result<Interval, SkipReason> {
    let mut adjusted = centered.clone();
    let extend = variant.length_change().abs();

    match (variant.variant_type, centered.strand) {
        (VariantType::Snv, _) => return Ok(adjusted),
        (VariantType::Deletion, Strand::Reverse) => adjusted.position += extend,
        (VariantType::Deletion, Strand::Forward) => adjusted.position -= extend,
        (VariantType::Insertion, Strand::Reverse) => adjusted.position -= extend,
        (VariantType::Insertion, Strand::Forward) => adjusted.position += extend,
    }

    match variant.variant_type {
        VariantType::Deletion => adjusted.length += extend,
        _ => adjusted.length -= extend,
    }

    if adjusted.length <= 0 {
        return Err(SkipReason::NonPositiveLength(adjusted));
    }

    Ok(adjusted)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn forward(position: i64, length: i64) -> Interval {
        Interval::new("chr1", position, length, Strand::Forward)
    }

    fn reverse(position: i64, length: i64) -> Interval {
        Interval::new("chr1", position, length, Strand::Reverse)
    }

    #[rstest]
    #[case(Variant::new("chr1", 100, "A", "T"))]
    #[case(Variant::new("chr1", 100, "AC", "GT"))]
    fn test_substitution_is_unchanged(#[case] variant: Variant) {
        for centered in [forward(98, 4), reverse(98, 4)] {
            assert_eq!(adjust_interval(&variant, &centered).unwrap(), centered);
        }
    }

    #[rstest]
    #[case(forward(98, 4), forward(96, 6))]
    #[case(reverse(98, 4), reverse(100, 6))]
    fn test_deletion(#[case] centered: Interval, #[case] expected: Interval) {
        let variant = Variant::new("chr1", 100, "AAA", "A");
        let adjusted = adjust_interval(&variant, &centered).unwrap();
        assert_eq!(adjusted, expected);
        assert_eq!(adjusted.length, centered.length + 2);
    }

    #[rstest]
    #[case(forward(98, 4), forward(100, 2))]
    #[case(reverse(98, 4), reverse(96, 2))]
    fn test_insertion(#[case] centered: Interval, #[case] expected: Interval) {
        let variant = Variant::new("chr1", 100, "A", "ATT");
        let adjusted = adjust_interval(&variant, &centered).unwrap();
        assert_eq!(adjusted, expected);
        assert_eq!(adjusted.length, centered.length - 2);
    }

    #[rstest]
    #[case("A", "ATTTT")]
    #[case("A", "ATTTTTTT")]
    fn test_insertion_longer_than_window(#[case] ref_allele: &str, #[case] alt_allele: &str) {
        let variant = Variant::new("chr1", 100, ref_allele, alt_allele);
        assert!(matches!(
            adjust_interval(&variant, &forward(98, 4)),
            Err(SkipReason::NonPositiveLength(_))
        ));
    }

    #[rstest]
    fn test_input_is_not_mutated() {
        let variant = Variant::new("chr1", 100, "AAA", "A");
        let centered = forward(98, 4);
        let _ = adjust_interval(&variant, &centered);
        assert_eq!(centered, forward(98, 4));
    }
}
