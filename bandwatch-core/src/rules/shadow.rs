//! Shadow-ratio rules — long wicks at the bands, tiered by ratio.

use super::{Rule, RuleOutput};
use crate::domain::{SignalDirection, SignalMatch};
use crate::series::SeriesView;

/// Long, halting: the low breaches the lower band with a lower shadow many
/// times the prior candle's body, at a lookback-window low.
///
/// A zero prior body halts the entire detection pass, suppressing every
/// rule registered after this one. See [`RuleOutput::halt`].
#[derive(Debug, Clone)]
pub struct LowerShadowReversal {
    depths: Vec<usize>,
}

/// Ratio tiers, strongest first.
const LOWER_SHADOW_TIERS: [f64; 3] = [8.0, 5.0, 3.0];

impl LowerShadowReversal {
    pub fn new(depths: Vec<usize>) -> Self {
        assert!(!depths.is_empty(), "at least one lookback depth required");
        Self { depths }
    }
}

impl Rule for LowerShadowReversal {
    fn id(&self) -> &'static str {
        "lower_shadow_reversal"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        let (Some(now), Some(prev)) = (view.from_end(0), view.from_end(1)) else {
            return RuleOutput::empty();
        };
        let Some(lower) = now.lower else {
            return RuleOutput::empty();
        };
        if now.low >= lower {
            return RuleOutput::empty();
        }

        if prev.body == 0.0 {
            return RuleOutput::halted();
        }

        let ratio = now.lower_shadow / prev.body;
        let Some(&tier) = LOWER_SHADOW_TIERS.iter().find(|&&t| ratio >= t) else {
            return RuleOutput::empty();
        };

        for &n in &self.depths {
            if view.len() < n + 2 {
                continue;
            }
            let Some(window) = view.trailing(n, 1) else {
                continue;
            };
            let lowest_low = window.iter().map(|k| k.low).fold(f64::MAX, f64::min);
            if now.low <= lowest_low {
                return RuleOutput::one(SignalMatch::new(
                    self.id(),
                    format!(
                        "long capitulation: {n}-bar low under lower band + {tier:.0}x lower shadow"
                    ),
                    SignalDirection::Long,
                    now.ts,
                ));
            }
        }
        RuleOutput::empty()
    }
}

/// Short: high at or above the upper band with an upper shadow at least
/// 1.77x the body and 4x the (epsilon-padded) lower shadow.
#[derive(Debug, Clone)]
pub struct UpperShadowRejection;

impl UpperShadowRejection {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let upper = now.upper?;

        // Epsilon keeps the 4x comparison meaningful on wickless candles.
        let lower_shadow = now.lower_shadow + 1e-8;
        let dominant_over_body = now.body > 0.0 && now.upper_shadow >= now.body * 1.77;
        let dominant_over_lower = now.upper_shadow >= lower_shadow * 4.0;

        if now.high >= upper && dominant_over_body && dominant_over_lower {
            return Some(SignalMatch::new(
                self.id(),
                "short rejection: extreme upper shadow at upper band".to_string(),
                SignalDirection::Short,
                now.ts,
            ));
        }
        None
    }
}

impl Rule for UpperShadowRejection {
    fn id(&self) -> &'static str {
        "upper_shadow_rejection"
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Long: a bull with a dominant lower shadow right after the prior bar's low
/// broke the lower band — demand absorbing the flush.
#[derive(Debug, Clone)]
pub struct SupportShadow;

/// Ratio tiers shared by [`SupportShadow`] and [`CapShadow`].
const BODY_RATIO_TIERS: [f64; 3] = [3.0, 2.0, 1.0];

impl SupportShadow {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;

        if now.body <= 0.0 || now.change_pct.abs() < 0.2 {
            return None;
        }
        if !(now.is_bull
            && now.lower_shadow > now.body
            && now.lower_shadow > now.upper_shadow
            && prev.low < prev.lower?)
        {
            return None;
        }

        let ratio = now.lower_shadow / now.body;
        let tier = BODY_RATIO_TIERS.iter().find(|&&t| ratio >= t)?;
        Some(SignalMatch::new(
            self.id(),
            format!("long support: absorbing lower shadow {tier:.0}x body"),
            SignalDirection::Long,
            now.ts,
        ))
    }
}

impl Rule for SupportShadow {
    fn id(&self) -> &'static str {
        "support_shadow"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Short: mirror of [`SupportShadow`] — a dominant upper shadow poking
/// above the upper band.
#[derive(Debug, Clone)]
pub struct CapShadow;

impl CapShadow {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;

        if now.body <= 0.0 || now.change_pct.abs() < 0.2 {
            return None;
        }
        if !(now.upper_shadow > now.body
            && now.upper_shadow > now.lower_shadow
            && now.high > now.upper?)
        {
            return None;
        }

        let ratio = now.upper_shadow / now.body;
        let tier = BODY_RATIO_TIERS.iter().find(|&&t| ratio >= t)?;
        Some(SignalMatch::new(
            self.id(),
            format!("short cap: rejecting upper shadow {tier:.0}x body"),
            SignalDirection::Short,
            now.ts,
        ))
    }
}

impl Rule for CapShadow {
    fn id(&self) -> &'static str {
        "cap_shadow"
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}
