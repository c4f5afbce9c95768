//! Band-break rules — consecutive candles with bodies outside a band, each
//! bar judged against its own band values. Opposite-polarity pairs read as
//! exhaustion; same-polarity bull pairs as breakout strength.

use super::{Rule, RuleOutput};
use crate::domain::{SignalDirection, SignalMatch};
use crate::enrich::EnrichedBar;
use crate::series::SeriesView;

fn body_above_upper(k: &EnrichedBar) -> Option<bool> {
    let upper = k.upper?;
    Some(k.open > upper || k.close > upper)
}

fn body_below_lower(k: &EnrichedBar) -> Option<bool> {
    let lower = k.lower?;
    Some(k.open < lower || k.close < lower)
}

/// Short: a bull then a bear, both with a body edge beyond the upper band.
#[derive(Debug, Clone)]
pub struct DoubleBodyBreakUpper;

impl DoubleBodyBreakUpper {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;
        if !(prev.is_bull && now.is_bear) {
            return None;
        }
        if !(body_above_upper(prev)? && body_above_upper(now)?) {
            return None;
        }

        Some(SignalMatch::new(
            self.id(),
            "short exhaustion: consecutive bodies beyond upper band".to_string(),
            SignalDirection::Short,
            now.ts,
        ))
    }
}

impl Rule for DoubleBodyBreakUpper {
    fn id(&self) -> &'static str {
        "double_body_break_upper"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Long: mirror image — a bear then a bull, both with a body edge under the
/// lower band.
#[derive(Debug, Clone)]
pub struct DoubleBodyBreakLower;

impl DoubleBodyBreakLower {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;
        if !(prev.is_bear && now.is_bull) {
            return None;
        }
        if !(body_below_lower(prev)? && body_below_lower(now)?) {
            return None;
        }

        Some(SignalMatch::new(
            self.id(),
            "long exhaustion: consecutive bodies beyond lower band".to_string(),
            SignalDirection::Long,
            now.ts,
        ))
    }
}

impl Rule for DoubleBodyBreakLower {
    fn id(&self) -> &'static str {
        "double_body_break_lower"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

fn straddles_upper(k: &EnrichedBar) -> Option<bool> {
    let upper = k.upper?;
    Some(k.open <= upper && upper < k.close)
}

fn top_heavy_split(k: &EnrichedBar) -> Option<bool> {
    let upper = k.upper?;
    Some((k.close - upper) >= 2.0 * (upper - k.open))
}

/// Long: two bulls where at least one body straddles the upper band, the
/// part of a body above the band at least double the part below it.
#[derive(Debug, Clone)]
pub struct DoubleBullUpperBreak;

impl DoubleBullUpperBreak {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;
        if !(prev.is_bull && now.is_bull) {
            return None;
        }
        if !(straddles_upper(prev)? || straddles_upper(now)?) {
            return None;
        }
        if !(top_heavy_split(prev)? || top_heavy_split(now)?) {
            return None;
        }

        Some(SignalMatch::new(
            self.id(),
            "long surge: bull body through upper band, top-heavy split".to_string(),
            SignalDirection::Long,
            now.ts,
        ))
    }
}

impl Rule for DoubleBullUpperBreak {
    fn id(&self) -> &'static str {
        "double_bull_upper_break"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Long: two consecutive bulls both closing above the upper band, the
/// second also holding above the midline.
#[derive(Debug, Clone)]
pub struct DoubleCloseAboveUpper;

impl DoubleCloseAboveUpper {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;
        if !(prev.is_bull && prev.close > prev.upper?) {
            return None;
        }
        if !(now.is_bull && now.close > now.upper? && now.close > now.mid?) {
            return None;
        }

        Some(SignalMatch::new(
            self.id(),
            "long chase: consecutive bull closes above upper band".to_string(),
            SignalDirection::Long,
            now.ts,
        ))
    }
}

impl Rule for DoubleCloseAboveUpper {
    fn id(&self) -> &'static str {
        "double_close_above_upper"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}
