//! EMA crossover and regime-alignment rules.
//!
//! These read the trend fields attached by [`crate::enrich::ema::attach`];
//! a bar without them never matches.

use super::{Rule, RuleOutput};
use crate::domain::{SignalDirection, SignalMatch};
use crate::enrich::EnrichedBar;
use crate::series::SeriesView;

fn bull_aligned(k: &EnrichedBar) -> Option<bool> {
    Some(k.ema20? > k.ema50? && k.ema50? > k.ema200?)
}

fn bear_aligned(k: &EnrichedBar) -> Option<bool> {
    Some(k.ema20? < k.ema50? && k.ema50? < k.ema200?)
}

/// Long: ema20 crosses above ema50 on the current bar.
#[derive(Debug, Clone)]
pub struct GoldenCross;

impl GoldenCross {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;
        if prev.ema20? < prev.ema50? && now.ema20? > now.ema50? {
            return Some(SignalMatch::new(
                self.id(),
                "golden cross: ema20 over ema50".to_string(),
                SignalDirection::Long,
                now.ts,
            ));
        }
        None
    }
}

impl Rule for GoldenCross {
    fn id(&self) -> &'static str {
        "golden_cross"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Short: ema20 crosses below ema50 on the current bar.
#[derive(Debug, Clone)]
pub struct DeathCross;

impl DeathCross {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;
        if prev.ema20? > prev.ema50? && now.ema20? < now.ema50? {
            return Some(SignalMatch::new(
                self.id(),
                "death cross: ema20 under ema50".to_string(),
                SignalDirection::Short,
                now.ts,
            ));
        }
        None
    }
}

impl Rule for DeathCross {
    fn id(&self) -> &'static str {
        "death_cross"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Long: the bar where ema20 > ema50 > ema200 first becomes true.
#[derive(Debug, Clone)]
pub struct BullAlignment;

impl BullAlignment {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;
        if bull_aligned(now)? && !bull_aligned(prev)? {
            return Some(SignalMatch::new(
                self.id(),
                "bullish alignment: ema20 > ema50 > ema200".to_string(),
                SignalDirection::Long,
                now.ts,
            ));
        }
        None
    }
}

impl Rule for BullAlignment {
    fn id(&self) -> &'static str {
        "bull_alignment"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Short: the bar where ema20 < ema50 < ema200 first becomes true.
#[derive(Debug, Clone)]
pub struct BearAlignment;

impl BearAlignment {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;
        if bear_aligned(now)? && !bear_aligned(prev)? {
            return Some(SignalMatch::new(
                self.id(),
                "bearish alignment: ema20 < ema50 < ema200".to_string(),
                SignalDirection::Short,
                now.ts,
            ));
        }
        None
    }
}

impl Rule for BearAlignment {
    fn id(&self) -> &'static str {
        "bear_alignment"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}
