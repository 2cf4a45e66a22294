use varpred_core::models::{Interval, Region, Variant};
use varpred_core::utils::ChromSizes;

use crate::diagnostics::SkipReason;

///
/// Number of bases to add before and after a variant's anchor base so the window
/// spans `input_length` bases. Even lengths put the extra base on the left.
///
pub fn flank_sizes(input_length: usize) -> (u64, u64) {
    let flank = input_length.saturating_sub(1) as u64;
    (flank.div_ceil(2), flank / 2)
}

///
/// Center a window of `input_length` bases on the variant's (first) position.
///
/// The window is clamped to the contig bounds given in `chrom_sizes`; a window
/// that loses bases to clamping is rejected.
///
/// # Arguments
/// - variant: the variant to center on
/// - input_length: number of bases the model consumes
/// - chrom_sizes: contig sizes used for clamping
pub fn center_interval(
    variant: &Variant,
    input_length: usize,
    chrom_sizes: &ChromSizes,
) -> Result<Interval, SkipReason> {
    let (left, right) = flank_sizes(input_length);
    let region = Region::from_variant(variant).slop(left, right, chrom_sizes);
    let interval = Interval::from(&region);

    if region.width() != input_length as u64 {
        return Err(SkipReason::WrongWindowSize {
            interval,
            found: region.width() as usize,
            expected: input_length,
        });
    }

    Ok(interval)
}
