use fxhash::FxHashMap;
use log::{info, warn};
use thiserror::Error;

use varpred_core::models::{Interval, Variant};

///
/// Why a variant was left out of scoring. None of these abort a run.
///
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("window {interval} has {found} bases, model expects {expected}")]
    WrongWindowSize {
        interval: Interval,
        found: usize,
        expected: usize,
    },

    #[error("adjusted window {0} has no bases left")]
    NonPositiveLength(Interval),

    #[error("adjusted window {0} starts before the contig")]
    OffContigStart(Interval),

    #[error("variant lies outside of window {0}")]
    VariantOutsideWindow(Interval),

    #[error("alternate sequence from {interval} has {found} bases, model expects {expected}")]
    LengthMismatchAfterIndel {
        interval: Interval,
        found: usize,
        expected: usize,
    },
}

impl SkipReason {
    /// Short stable name, used to tally skips.
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::WrongWindowSize { .. } => "wrong_window_size",
            SkipReason::NonPositiveLength(_) => "non_positive_length",
            SkipReason::OffContigStart(_) => "off_contig_start",
            SkipReason::VariantOutsideWindow(_) => "variant_outside_window",
            SkipReason::LengthMismatchAfterIndel { .. } => "length_mismatch_after_indel",
        }
    }
}

///
/// Receives every variant dropped before scoring.
///
pub trait Diagnostics {
    fn skipped(&mut self, variant: &Variant, reason: &SkipReason);
}

///
/// Default sink: logs a warning per skipped variant and keeps counts per reason.
///
#[derive(Debug, Default)]
pub struct SkipLog {
    counts: FxHashMap<&'static str, usize>,
}

impl SkipLog {
    pub fn new() -> Self {
        SkipLog::default()
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn count(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Log one line per skip reason that occurred.
    pub fn summarize(&self) {
        if self.counts.is_empty() {
            return;
        }

        let mut labels: Vec<_> = self.counts.iter().collect();
        labels.sort();

        info!("Skipped {} variant(s) in total", self.total());
        for (label, count) in labels {
            info!("  {}: {}", label, count);
        }
    }
}

impl Diagnostics for SkipLog {
    fn skipped(&mut self, variant: &Variant, reason: &SkipReason) {
        warn!("Skipping variant {}: {}", variant, reason);
        *self.counts.entry(reason.label()).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use varpred_core::models::Strand;

    #[rstest]
    fn test_skip_log_counts_by_reason() {
        let variant = Variant::new("chr1", 100, "AAA", "A");
        let interval = Interval::new("chr1", 96, 6, Strand::Forward);

        let mut log = SkipLog::new();
        log.skipped(&variant, &SkipReason::NonPositiveLength(interval.clone()));
        log.skipped(
            &variant,
            &SkipReason::LengthMismatchAfterIndel {
                interval: interval.clone(),
                found: 5,
                expected: 4,
            },
        );
        log.skipped(
            &variant,
            &SkipReason::LengthMismatchAfterIndel {
                interval,
                found: 5,
                expected: 4,
            },
        );

        assert_eq!(log.total(), 3);
        assert_eq!(log.count("length_mismatch_after_indel"), 2);
        assert_eq!(log.count("non_positive_length"), 1);
        assert_eq!(log.count("wrong_window_size"), 0);
    }

    #[rstest]
    fn test_skip_reason_message_names_interval() {
        let reason = SkipReason::WrongWindowSize {
            interval: Interval::new("chr2", 1, 2, Strand::Forward),
            found: 2,
            expected: 4,
        };
        assert_eq!(
            reason.to_string(),
            "window chr2:1-2(+) has 2 bases, model expects 4"
        );
    }

    #[rstest]
    fn test_off_contig_start_label() {
        let reason = SkipReason::OffContigStart(Interval::new("chr1", -1, 6, Strand::Forward));
        assert_eq!(reason.label(), "off_contig_start");

        let mut log = SkipLog::new();
        log.skipped(&Variant::new("chr1", 3, "GTT", "G"), &reason);
        assert_eq!(log.count("off_contig_start"), 1);
    }
}
