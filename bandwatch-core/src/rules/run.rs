//! Candle-run rules — same-polarity streaks and how they resolve.

use super::{Rule, RuleOutput};
use crate::domain::{SignalDirection, SignalMatch};
use crate::series::SeriesView;

/// Short: a run of non-bear candles collapsing into two bears, the run's
/// heaviest volume at least double the first bear's.
#[derive(Debug, Clone)]
pub struct BullRunCollapse;

impl BullRunCollapse {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;
        if !(now.is_bear && prev.is_bear) {
            return None;
        }

        // Walk back through the run immediately before the two bears.
        let mut streak = 0usize;
        let mut peak_volume = f64::MIN;
        let mut k = 2;
        while let Some(bar) = view.from_end(k) {
            if bar.is_bear {
                break;
            }
            streak += 1;
            peak_volume = peak_volume.max(bar.volume);
            k += 1;
        }
        if streak == 0 || peak_volume < prev.volume * 2.0 {
            return None;
        }

        Some(SignalMatch::new(
            self.id(),
            format!("short collapse: {streak}-bar bull run into two bears, 2x volume peak"),
            SignalDirection::Short,
            now.ts,
        ))
    }
}

impl Rule for BullRunCollapse {
    fn id(&self) -> &'static str {
        "bull_run_collapse"
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Short: three consecutive bears immediately behind the newest bar. The
/// newest bar either extends the run or stalls it; the pressure side is
/// down in both cases, so both fire with distinct names.
#[derive(Debug, Clone)]
pub struct ThreeBearContinuation;

impl ThreeBearContinuation {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let run = view.trailing(3, 1)?;
        if !run.iter().all(|k| k.is_bear) {
            return None;
        }

        let name = if now.is_bear {
            "short continuation: three bears extended by a fourth"
        } else {
            "short stall: three bears capped by a feeble bounce"
        };
        Some(SignalMatch::new(
            self.id(),
            name.to_string(),
            SignalDirection::Short,
            now.ts,
        ))
    }
}

impl Rule for ThreeBearContinuation {
    fn id(&self) -> &'static str {
        "three_bear_continuation"
    }

    fn min_bars(&self) -> usize {
        4
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}
