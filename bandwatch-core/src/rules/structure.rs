//! Band-structure rules — how candles sit against the midline and bands.

use super::{Rule, RuleOutput};
use crate::domain::{SignalDirection, SignalMatch};
use crate::series::SeriesView;

/// Long: four consecutive bulls holding above the rolling midline, the first
/// of them still dipping below it — a thrust off the middle band.
#[derive(Debug, Clone)]
pub struct FourBullAboveMid;

impl FourBullAboveMid {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let last4 = view.trailing(4, 0)?;
        if !last4.iter().all(|k| k.is_bull) {
            return None;
        }
        for k in last4 {
            let mid = k.mid?;
            if !(k.high > mid && k.mid_price > mid) {
                return None;
            }
        }
        let first = &last4[0];
        if first.low >= first.mid? {
            return None;
        }

        Some(SignalMatch::new(
            self.id(),
            "long thrust: four bulls riding the midline".to_string(),
            SignalDirection::Long,
            now.ts,
        ))
    }
}

impl Rule for FourBullAboveMid {
    fn id(&self) -> &'static str {
        "four_bull_above_mid"
    }

    fn min_bars(&self) -> usize {
        4
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Short: three bears with descending midpoints pressing down through the
/// midline, the middle one opening above it and closing between midline and
/// lower band.
#[derive(Debug, Clone)]
pub struct ThreeBearMidCross;

impl ThreeBearMidCross {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let last3 = view.trailing(3, 1)?;
        if !last3.iter().all(|k| k.is_bear) {
            return None;
        }

        let k2 = view.from_end(2)?;
        let crossing =
            k2.open > k2.mid? && k2.close > k2.lower? && k2.close < k2.mid?;
        if !crossing {
            return None;
        }

        let descending = last3[0].mid_price > last3[1].mid_price
            && last3[1].mid_price > last3[2].mid_price;
        if !descending {
            return None;
        }

        Some(SignalMatch::new(
            self.id(),
            "short compression: three bears pressing through midline".to_string(),
            SignalDirection::Short,
            now.ts,
        ))
    }
}

impl Rule for ThreeBearMidCross {
    fn id(&self) -> &'static str {
        "three_bear_mid_cross"
    }

    fn min_bars(&self) -> usize {
        4
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Long: a decisive bull crossing the midline from below after seven bars
/// that never touched it.
#[derive(Debug, Clone)]
pub struct MidlineThrust;

impl MidlineThrust {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let mid = now.mid?;
        if !(now.is_bull && now.change_pct > 0.2 && now.open < mid && now.close > mid) {
            return None;
        }

        let base = view.trailing(7, 1)?;
        for k in base {
            if k.high >= k.mid? {
                return None;
            }
        }

        Some(SignalMatch::new(
            self.id(),
            "long ignition: midline cross after basing below".to_string(),
            SignalDirection::Long,
            now.ts,
        ))
    }
}

impl Rule for MidlineThrust {
    fn id(&self) -> &'static str {
        "midline_thrust"
    }

    fn min_bars(&self) -> usize {
        8
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Short: one bear spanning from the midline down through the lower band,
/// its body at least 70% of the mid-to-lower distance.
#[derive(Debug, Clone)]
pub struct MidToLowerPlunge;

impl MidToLowerPlunge {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let mid = now.mid?;
        let lower = now.lower?;
        if !(now.is_bear && now.open >= mid && now.close <= lower) {
            return None;
        }
        if now.body <= (mid - lower) * 0.7 {
            return None;
        }

        Some(SignalMatch::new(
            self.id(),
            "short plunge: single bear from midline through lower band".to_string(),
            SignalDirection::Short,
            now.ts,
        ))
    }
}

impl Rule for MidToLowerPlunge {
    fn id(&self) -> &'static str {
        "mid_to_lower_plunge"
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Long: the bar before last closed at or under the lower band, the next
/// bar is a bull closing back above it, and the newest bar is a bull too —
/// with the recovery bodies outgrowing the breakdown bar's. A bull
/// breakdown bar is measured against both recovery bodies combined.
#[derive(Debug, Clone)]
pub struct LowerCrossBullExpansion;

impl LowerCrossBullExpansion {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;
        let start = view.from_end(2)?;
        if !(prev.is_bull && now.is_bull) {
            return None;
        }
        if !(start.close <= start.lower? && prev.close > prev.lower?) {
            return None;
        }

        let expanding = if start.is_bull {
            prev.body + now.body > start.body
        } else {
            prev.body > start.body
        };
        if !expanding {
            return None;
        }

        Some(SignalMatch::new(
            self.id(),
            "long ignition: bull cross back above lower band with expanding bodies".to_string(),
            SignalDirection::Long,
            now.ts,
        ))
    }
}

impl Rule for LowerCrossBullExpansion {
    fn id(&self) -> &'static str {
        "lower_cross_bull_expansion"
    }

    fn min_bars(&self) -> usize {
        3
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Long: two bulls, the first with its low in the lower-band zone (within
/// 0.5% of the band), the second closing above the midline. The name
/// carries the distance covered from that low.
#[derive(Debug, Clone)]
pub struct LowerToMidRally;

impl LowerToMidRally {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;
        if !(prev.is_bull && now.is_bull) {
            return None;
        }
        if prev.low > prev.lower? * 1.005 {
            return None;
        }
        if now.close <= now.mid? {
            return None;
        }

        let travel = (now.close - prev.low) / prev.low * 100.0;
        Some(SignalMatch::new(
            self.id(),
            format!("long rally: two bulls from lower band through midline, +{travel:.1}%"),
            SignalDirection::Long,
            now.ts,
        ))
    }
}

impl Rule for LowerToMidRally {
    fn id(&self) -> &'static str {
        "lower_to_mid_rally"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Short: a top-heavy bait bull poking the upper band, then a bear whose
/// entire range hangs above it.
#[derive(Debug, Clone)]
pub struct HangingBearTrap;

impl HangingBearTrap {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;

        let bait = prev.is_bull
            && prev.high > prev.upper? * 0.998
            && (prev.high - prev.open) > (prev.open - prev.low) * 1.3;
        if !bait {
            return None;
        }
        if !(now.is_bear && now.low > now.upper? * 1.002) {
            return None;
        }

        Some(SignalMatch::new(
            self.id(),
            "short trap: bear hanging above upper band after bait bull".to_string(),
            SignalDirection::Short,
            now.ts,
        ))
    }
}

impl Rule for HangingBearTrap {
    fn id(&self) -> &'static str {
        "hanging_bear_trap"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Short: a peak bull followed by two bears, the bull's high topping the
/// ten bars before it and the second bear closing under the bull's midpoint.
#[derive(Debug, Clone)]
pub struct ThreeBarTopFade;

impl ThreeBarTopFade {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let k3 = view.from_end(0)?;
        let k2 = view.from_end(1)?;
        let k1 = view.from_end(2)?;
        if !(k1.is_bull && k2.is_bear && k3.is_bear) {
            return None;
        }

        let before = view.trailing(10, 3)?;
        let peak = before.iter().map(|k| k.high).fold(f64::MIN, f64::max);
        if k1.high < peak {
            return None;
        }
        if k3.close >= k1.mid_price {
            return None;
        }

        Some(SignalMatch::new(
            self.id(),
            "short fade: three-bar top below the peak bull midpoint".to_string(),
            SignalDirection::Short,
            k3.ts,
        ))
    }
}

impl Rule for ThreeBarTopFade {
    fn id(&self) -> &'static str {
        "three_bar_top_fade"
    }

    fn min_bars(&self) -> usize {
        15
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}
