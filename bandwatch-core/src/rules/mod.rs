//! Rule catalog — independent, named pattern predicates over a series view.
//!
//! Each rule is pure: it reads a trailing window of the enriched series and
//! produces zero or more matches. Cooldown filtering happens in the scan
//! driver, not here. Rules run in fixed registration order; a rule may halt
//! the remainder of a pass (see [`RuleOutput::halt`]).

pub mod band_break;
pub mod cross;
pub mod ema_cross;
pub mod reversal;
pub mod run;
pub mod shadow;
pub mod structure;
pub mod swing;
pub mod volume;

use crate::domain::SignalMatch;
use crate::series::SeriesView;
use thiserror::Error;

pub use band_break::{
    DoubleBodyBreakLower, DoubleBodyBreakUpper, DoubleBullUpperBreak, DoubleCloseAboveUpper,
};
pub use cross::{BandCrossDown, BandCrossUp};
pub use ema_cross::{BearAlignment, BullAlignment, DeathCross, GoldenCross};
pub use reversal::{BreakoutTrap, GapBearAboveUpper, HighCloseEngulfing, TwoBearUpperFade};
pub use run::{BullRunCollapse, ThreeBearContinuation};
pub use shadow::{CapShadow, LowerShadowReversal, SupportShadow, UpperShadowRejection};
pub use structure::{
    FourBullAboveMid, HangingBearTrap, LowerCrossBullExpansion, LowerToMidRally, MidToLowerPlunge,
    MidlineThrust, ThreeBarTopFade, ThreeBearMidCross,
};
pub use swing::{LostHighestBull, ReclaimLowestBear};
pub use volume::{VolumeBreakLower, VolumeCascadeReversal, VolumeSpikeReversal};

/// Lookback depths for extremum rules, largest first. The catalog accepts
/// the first depth whose extremum condition holds, then stops.
pub const DEFAULT_DEPTHS: [usize; 3] = [80, 50, 20];

/// Result of one rule evaluation.
#[derive(Debug, Clone, Default)]
pub struct RuleOutput {
    pub matches: Vec<SignalMatch>,
    /// When set, the catalog abandons the rest of this detection pass,
    /// keeping matches accumulated so far.
    pub halt: bool,
}

impl RuleOutput {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn one(m: SignalMatch) -> Self {
        Self {
            matches: vec![m],
            halt: false,
        }
    }

    pub fn maybe(m: Option<SignalMatch>) -> Self {
        Self {
            matches: m.into_iter().collect(),
            halt: false,
        }
    }

    pub fn halted() -> Self {
        Self {
            matches: Vec::new(),
            halt: true,
        }
    }
}

/// A pattern predicate over a sub-series.
///
/// Implementations must return an empty output when the view is shorter
/// than `min_bars()`; the catalog also pre-checks this so a rule never sees
/// a view it declared too short.
pub trait Rule: Send + Sync {
    /// Stable identifier, used for configuration-driven selection.
    fn id(&self) -> &'static str;

    /// Minimum sub-series length this rule needs to produce any match.
    fn min_bars(&self) -> usize;

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput;
}

#[derive(Debug, Error)]
#[error("unknown rule id: {0}")]
pub struct UnknownRule(pub String);

/// Ordered set of rules plus a catalog-level minimum series length.
pub struct RuleCatalog {
    min_len: usize,
    rules: Vec<Box<dyn Rule>>,
}

impl RuleCatalog {
    pub fn new(min_len: usize, rules: Vec<Box<dyn Rule>>) -> Self {
        Self { min_len, rules }
    }

    /// The standard intraday bollinger rule set, in fixed evaluation order.
    pub fn standard(depths: &[usize]) -> Self {
        Self::new(
            40,
            vec![
                Box::new(HighCloseEngulfing::new(depths.to_vec())),
                Box::new(TwoBearUpperFade::new(depths.to_vec())),
                Box::new(LowerShadowReversal::new(depths.to_vec())),
                Box::new(VolumeSpikeReversal::new(depths.to_vec())),
                Box::new(VolumeBreakLower),
                Box::new(FourBullAboveMid),
                Box::new(ThreeBearMidCross),
                Box::new(UpperShadowRejection),
                Box::new(BreakoutTrap),
                Box::new(MidlineThrust),
            ],
        )
    }

    /// The EMA crossover/regime rule set.
    pub fn ema() -> Self {
        Self::new(
            2,
            vec![
                Box::new(DeathCross),
                Box::new(GoldenCross),
                Box::new(BullAlignment),
                Box::new(BearAlignment),
            ],
        )
    }

    /// Build a catalog from configured rule ids, preserving their order.
    pub fn from_ids(ids: &[String], depths: &[usize], min_len: usize) -> Result<Self, UnknownRule> {
        let rules = ids
            .iter()
            .map(|id| builtin(id, depths).ok_or_else(|| UnknownRule(id.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(min_len, rules))
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Run every rule against the view, in order. Matches come back before
    /// cooldown filtering. A too-short view yields an empty list, never an
    /// error.
    pub fn detect(&self, view: &SeriesView<'_>) -> Vec<SignalMatch> {
        let mut matches = Vec::new();
        if view.len() < self.min_len {
            return matches;
        }

        for rule in &self.rules {
            if view.len() < rule.min_bars() {
                continue;
            }
            let out = rule.evaluate(view);
            matches.extend(out.matches);
            if out.halt {
                break;
            }
        }
        matches
    }
}

/// Look up a builtin rule by id. Depth-parameterized rules receive `depths`.
pub fn builtin(id: &str, depths: &[usize]) -> Option<Box<dyn Rule>> {
    let d = depths.to_vec();
    let rule: Box<dyn Rule> = match id {
        "high_close_engulfing" => Box::new(HighCloseEngulfing::new(d)),
        "two_bear_upper_fade" => Box::new(TwoBearUpperFade::new(d)),
        "lower_shadow_reversal" => Box::new(LowerShadowReversal::new(d)),
        "volume_spike_reversal" => Box::new(VolumeSpikeReversal::new(d)),
        "volume_break_lower" => Box::new(VolumeBreakLower),
        "four_bull_above_mid" => Box::new(FourBullAboveMid),
        "three_bear_mid_cross" => Box::new(ThreeBearMidCross),
        "upper_shadow_rejection" => Box::new(UpperShadowRejection),
        "breakout_trap" => Box::new(BreakoutTrap),
        "midline_thrust" => Box::new(MidlineThrust),
        "double_body_break_upper" => Box::new(DoubleBodyBreakUpper),
        "double_body_break_lower" => Box::new(DoubleBodyBreakLower),
        "support_shadow" => Box::new(SupportShadow),
        "cap_shadow" => Box::new(CapShadow),
        "mid_to_lower_plunge" => Box::new(MidToLowerPlunge),
        "hanging_bear_trap" => Box::new(HangingBearTrap),
        "three_bar_top_fade" => Box::new(ThreeBarTopFade),
        "gap_bear_above_upper" => Box::new(GapBearAboveUpper),
        "lower_cross_bull_expansion" => Box::new(LowerCrossBullExpansion),
        "lower_to_mid_rally" => Box::new(LowerToMidRally),
        "double_bull_upper_break" => Box::new(DoubleBullUpperBreak),
        "double_close_above_upper" => Box::new(DoubleCloseAboveUpper),
        "volume_cascade_reversal" => Box::new(VolumeCascadeReversal),
        "bull_run_collapse" => Box::new(BullRunCollapse),
        "three_bear_continuation" => Box::new(ThreeBearContinuation),
        "band_cross_down" => Box::new(BandCrossDown),
        "band_cross_up" => Box::new(BandCrossUp),
        "lost_highest_bull" => Box::new(LostHighestBull),
        "reclaim_lowest_bear" => Box::new(ReclaimLowestBear),
        "golden_cross" => Box::new(GoldenCross),
        "death_cross" => Box::new(DeathCross),
        "bull_alignment" => Box::new(BullAlignment),
        "bear_alignment" => Box::new(BearAlignment),
        _ => return None,
    };
    Some(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Series;
    use crate::testutil::ebar;

    #[test]
    fn standard_catalog_order_matches_deployment() {
        let catalog = RuleCatalog::standard(&DEFAULT_DEPTHS);
        assert_eq!(
            catalog.rule_ids(),
            vec![
                "high_close_engulfing",
                "two_bear_upper_fade",
                "lower_shadow_reversal",
                "volume_spike_reversal",
                "volume_break_lower",
                "four_bull_above_mid",
                "three_bear_mid_cross",
                "upper_shadow_rejection",
                "breakout_trap",
                "midline_thrust",
            ]
        );
        assert_eq!(catalog.min_len(), 40);
    }

    #[test]
    fn ema_preset_order_and_minimum() {
        let catalog = RuleCatalog::ema();
        assert_eq!(
            catalog.rule_ids(),
            vec!["death_cross", "golden_cross", "bull_alignment", "bear_alignment"]
        );
        assert_eq!(catalog.min_len(), 2);
    }

    #[test]
    fn short_view_yields_nothing() {
        let catalog = RuleCatalog::standard(&DEFAULT_DEPTHS);
        let bars: Vec<_> = (0..10)
            .map(|i| ebar(i, 100.0, 101.0, 99.0, 100.5, 1000.0))
            .collect();
        let series = Series::new(bars);
        assert!(catalog.detect(&series.view()).is_empty());
    }

    #[test]
    fn from_ids_rejects_unknown() {
        let err = RuleCatalog::from_ids(&["no_such_rule".to_string()], &DEFAULT_DEPTHS, 40);
        assert!(err.is_err());
    }

    #[test]
    fn from_ids_preserves_order() {
        let ids = vec!["midline_thrust".to_string(), "golden_cross".to_string()];
        let catalog = RuleCatalog::from_ids(&ids, &DEFAULT_DEPTHS, 10).unwrap();
        assert_eq!(catalog.rule_ids(), vec!["midline_thrust", "golden_cross"]);
    }

    #[test]
    fn every_builtin_id_resolves() {
        for id in [
            "high_close_engulfing",
            "two_bear_upper_fade",
            "lower_shadow_reversal",
            "volume_spike_reversal",
            "volume_break_lower",
            "four_bull_above_mid",
            "three_bear_mid_cross",
            "upper_shadow_rejection",
            "breakout_trap",
            "midline_thrust",
            "double_body_break_upper",
            "double_body_break_lower",
            "support_shadow",
            "cap_shadow",
            "mid_to_lower_plunge",
            "hanging_bear_trap",
            "three_bar_top_fade",
            "gap_bear_above_upper",
            "lower_cross_bull_expansion",
            "lower_to_mid_rally",
            "double_bull_upper_break",
            "double_close_above_upper",
            "volume_cascade_reversal",
            "bull_run_collapse",
            "three_bear_continuation",
            "band_cross_down",
            "band_cross_up",
            "lost_highest_bull",
            "reclaim_lowest_bear",
            "golden_cross",
            "death_cross",
            "bull_alignment",
            "bear_alignment",
        ] {
            let rule = builtin(id, &DEFAULT_DEPTHS).unwrap();
            assert_eq!(rule.id(), id);
        }
    }
}
