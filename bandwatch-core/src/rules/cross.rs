//! Single-candle band crosses — one decisive bar cutting down through the
//! upper band or midline after a bull, or up through the lower band or
//! midline after a bear. Doubled volume against the prior bar is noted in
//! the signal name.

use super::{Rule, RuleOutput};
use crate::domain::{SignalDirection, SignalMatch};
use crate::series::SeriesView;

/// Short: after a bull, a bar opening above and closing below the upper
/// band, or failing that the midline.
#[derive(Debug, Clone)]
pub struct BandCrossDown;

impl BandCrossDown {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;
        if !prev.is_bull {
            return None;
        }

        let upper = now.upper?;
        let mid = now.mid?;
        let level = if now.open > upper && upper > now.close {
            "upper band"
        } else if now.open > mid && mid > now.close {
            "midline"
        } else {
            return None;
        };

        let mut name = format!(
            "short reversal: cross down through {level}, {:+.1}%",
            now.change_pct
        );
        if now.volume > prev.volume * 2.0 {
            name.push_str(" on 2x volume");
        }
        Some(SignalMatch::new(
            self.id(),
            name,
            SignalDirection::Short,
            now.ts,
        ))
    }
}

impl Rule for BandCrossDown {
    fn id(&self) -> &'static str {
        "band_cross_down"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Long: mirror of [`BandCrossDown`] — after a bear, a bar opening below
/// and closing above the lower band, or failing that the midline.
#[derive(Debug, Clone)]
pub struct BandCrossUp;

impl BandCrossUp {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;
        if !prev.is_bear {
            return None;
        }

        let lower = now.lower?;
        let mid = now.mid?;
        let level = if now.open < lower && lower < now.close {
            "lower band"
        } else if now.open < mid && mid < now.close {
            "midline"
        } else {
            return None;
        };

        let mut name = format!(
            "long reversal: cross up through {level}, {:+.1}%",
            now.change_pct
        );
        if now.volume > prev.volume * 2.0 {
            name.push_str(" on 2x volume");
        }
        Some(SignalMatch::new(
            self.id(),
            name,
            SignalDirection::Long,
            now.ts,
        ))
    }
}

impl Rule for BandCrossUp {
    fn id(&self) -> &'static str {
        "band_cross_up"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}
