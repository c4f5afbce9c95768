//! Reversal rules — a strong candle overturning a recent extremum.

use super::{Rule, RuleOutput};
use crate::domain::{SignalDirection, SignalMatch};
use crate::enrich::EnrichedBar;
use crate::series::SeriesView;

fn highest_close(window: &[EnrichedBar]) -> f64 {
    window.iter().map(|k| k.close).fold(f64::MIN, f64::max)
}

fn highest_high(window: &[EnrichedBar]) -> f64 {
    window.iter().map(|k| k.high).fold(f64::MIN, f64::max)
}

/// Short: the prior bull closed at the highest close of the lookback window
/// and the current bear's body engulfs it.
///
/// Depths are tried largest first; the first depth whose extremum condition
/// holds wins and the search stops.
#[derive(Debug, Clone)]
pub struct HighCloseEngulfing {
    depths: Vec<usize>,
}

impl HighCloseEngulfing {
    pub fn new(depths: Vec<usize>) -> Self {
        assert!(!depths.is_empty(), "at least one lookback depth required");
        Self { depths }
    }

    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;
        if !(now.is_bear && prev.is_bull) {
            return None;
        }
        if now.body <= prev.body {
            return None;
        }

        for &n in &self.depths {
            if view.len() < n + 2 {
                continue;
            }
            let window = view.trailing(n, 1)?;
            if prev.close >= highest_close(window) {
                return Some(SignalMatch::new(
                    self.id(),
                    format!("short reversal: {n}-bar highest close engulfed by larger bear"),
                    SignalDirection::Short,
                    now.ts,
                ));
            }
        }
        None
    }
}

impl Rule for HighCloseEngulfing {
    fn id(&self) -> &'static str {
        "high_close_engulfing"
    }

    fn min_bars(&self) -> usize {
        self.depths.iter().min().copied().unwrap_or(0) + 2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Short: two consecutive bears after the upper band was pierced, where the
/// piercing high is also the lookback window's highest high.
#[derive(Debug, Clone)]
pub struct TwoBearUpperFade {
    depths: Vec<usize>,
}

impl TwoBearUpperFade {
    pub fn new(depths: Vec<usize>) -> Self {
        assert!(!depths.is_empty(), "at least one lookback depth required");
        Self { depths }
    }

    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;
        if !(now.is_bear && prev.is_bear) {
            return None;
        }

        // Either the prior bar or the bar three back may be the piercing one.
        let prev3 = view.from_end(3)?;
        let hit_prev = prev.high > prev.upper?;
        let hit_prev3 = prev3.high > prev3.upper?;
        if !(hit_prev || hit_prev3) {
            return None;
        }

        let ref_high = f64::max(
            if hit_prev { prev.high } else { 0.0 },
            if hit_prev3 { prev3.high } else { 0.0 },
        );

        for &n in &self.depths {
            if view.len() < n + 4 {
                continue;
            }
            let window = view.trailing(n, 1)?;
            if ref_high >= highest_high(window) {
                return Some(SignalMatch::new(
                    self.id(),
                    format!("short band fade: {n}-bar high pierced upper band + two bears"),
                    SignalDirection::Short,
                    now.ts,
                ));
            }
        }
        None
    }
}

impl Rule for TwoBearUpperFade {
    fn id(&self) -> &'static str {
        "two_bear_upper_fade"
    }

    fn min_bars(&self) -> usize {
        (self.depths.iter().min().copied().unwrap_or(0) + 4).max(4)
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Short: a bear that opened above the opens and closes of the three bars
/// before the prior one, then closed below all of them with a body at least
/// 1.68x the prior bar's.
#[derive(Debug, Clone)]
pub struct BreakoutTrap;

impl BreakoutTrap {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;
        if !now.is_bear {
            return None;
        }

        let ctx = view.trailing(3, 2)?;
        let open_above = ctx.iter().all(|k| now.open > k.open && now.open > k.close);
        if !open_above {
            return None;
        }

        // Zero prior body would divide by zero; the rule simply stands down.
        if prev.body <= 0.0 {
            return None;
        }
        if now.body / prev.body <= 1.68 {
            return None;
        }

        let close_below = ctx
            .iter()
            .all(|k| now.close < k.close && now.close < k.open);
        if !close_below {
            return None;
        }

        Some(SignalMatch::new(
            self.id(),
            "short trap: failed breakout engulfing three bars".to_string(),
            SignalDirection::Short,
            now.ts,
        ))
    }
}

impl Rule for BreakoutTrap {
    fn id(&self) -> &'static str {
        "breakout_trap"
    }

    fn min_bars(&self) -> usize {
        5
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Short: prior bull, then a gap-up bear whose whole body (with 0.1% slack)
/// sits above the upper band.
#[derive(Debug, Clone)]
pub struct GapBearAboveUpper;

impl GapBearAboveUpper {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let prev = view.from_end(1)?;
        if !(prev.is_bull && now.is_bear) {
            return None;
        }
        let upper = now.upper?;
        let body_floor = now.open.min(now.close);
        if !(body_floor * 1.001 > upper && now.open > prev.close) {
            return None;
        }

        Some(SignalMatch::new(
            self.id(),
            "short gap fade: bear body stranded above upper band".to_string(),
            SignalDirection::Short,
            now.ts,
        ))
    }
}

impl Rule for GapBearAboveUpper {
    fn id(&self) -> &'static str {
        "gap_bear_above_upper"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Series;
    use crate::testutil::{ebar, with_bands};

    /// Flat bulls with small bodies; closes 100.5.
    fn flat_bull(i: usize) -> crate::enrich::EnrichedBar {
        ebar(i, 100.0, 101.0, 99.5, 100.5, 1000.0)
    }

    #[test]
    fn engulfing_fires_at_first_matching_depth() {
        // 30 flat bars, then a bull closing at the highest close, then a
        // bigger bear. Only depth 20 fits (len 32 < 80+2 and < 50+2).
        let mut bars: Vec<_> = (0..30).map(flat_bull).collect();
        bars.push(ebar(30, 100.5, 102.5, 100.4, 102.0, 1000.0)); // highest close
        bars.push(ebar(31, 102.0, 102.1, 99.0, 100.0, 1000.0)); // bear, body 2.0 > 1.5
        let series = Series::new(bars);

        let rule = HighCloseEngulfing::new(vec![80, 50, 20]);
        let out = rule.evaluate(&series.view());
        assert_eq!(out.matches.len(), 1);
        assert!(out.matches[0].name.contains("20-bar"));
        assert_eq!(out.matches[0].direction, SignalDirection::Short);
    }

    #[test]
    fn engulfing_requires_larger_bear_body() {
        let mut bars: Vec<_> = (0..30).map(flat_bull).collect();
        bars.push(ebar(30, 100.5, 102.5, 100.4, 102.0, 1000.0));
        // Bear body 0.5 < prior bull body 1.5.
        bars.push(ebar(31, 102.0, 102.1, 101.0, 101.5, 1000.0));
        let series = Series::new(bars);

        let rule = HighCloseEngulfing::new(vec![80, 50, 20]);
        assert!(rule.evaluate(&series.view()).matches.is_empty());
    }

    #[test]
    fn two_bear_fade_needs_pierced_band() {
        let mut bars: Vec<_> = (0..27)
            .map(|i| with_bands(flat_bull(i), 100.0, 0.5))
            .collect();
        // Bar three back from the end pierces the upper band (101) with the
        // window's highest high.
        bars.push(with_bands(ebar(27, 100.5, 104.0, 100.4, 101.5, 1000.0), 100.0, 0.5));
        bars.push(with_bands(flat_bull(28), 100.0, 0.5));
        bars.push(with_bands(ebar(29, 100.9, 101.0, 100.2, 100.3, 1000.0), 100.0, 0.5)); // bear (prev)
        bars.push(with_bands(ebar(30, 100.5, 100.6, 99.5, 100.0, 1000.0), 100.0, 0.5)); // bear (now)
        let series = Series::new(bars);

        let rule = TwoBearUpperFade::new(vec![80, 50, 20]);
        let out = rule.evaluate(&series.view());
        assert_eq!(out.matches.len(), 1);
        assert!(out.matches[0].name.contains("20-bar"));
    }

    #[test]
    fn breakout_trap_detects_failed_breakout() {
        let mut bars: Vec<_> = (0..10).map(flat_bull).collect();
        // Context bars (offsets 2..4): opens/closes around 100–100.5.
        // Prior bar: small bull body 0.5.
        bars.push(ebar(10, 100.0, 101.0, 99.5, 100.5, 1000.0));
        // Now: bear opening above everything (102), closing below (99).
        bars.push(ebar(11, 102.0, 102.2, 98.8, 99.0, 1000.0));
        let series = Series::new(bars);

        let out = BreakoutTrap.evaluate(&series.view());
        assert_eq!(out.matches.len(), 1);
    }

    #[test]
    fn breakout_trap_stands_down_on_zero_prior_body() {
        let mut bars: Vec<_> = (0..10).map(flat_bull).collect();
        bars.push(ebar(10, 100.5, 101.0, 99.5, 100.5, 1000.0)); // doji
        bars.push(ebar(11, 102.0, 102.2, 98.8, 99.0, 1000.0));
        let series = Series::new(bars);

        let out = BreakoutTrap.evaluate(&series.view());
        assert!(out.matches.is_empty());
        assert!(!out.halt);
    }

    #[test]
    fn gap_bear_above_upper_band() {
        let bars = vec![
            with_bands(ebar(0, 100.0, 103.0, 99.5, 102.5, 1000.0), 100.0, 0.5), // bull
            // Bear stranded above upper band 101: body 103.2 → 102.8, gap up over 102.5.
            with_bands(ebar(1, 103.2, 103.5, 102.6, 102.8, 1000.0), 100.0, 0.5),
        ];
        let series = Series::new(bars);
        let out = GapBearAboveUpper.evaluate(&series.view());
        assert_eq!(out.matches.len(), 1);
        assert_eq!(out.matches[0].direction, SignalDirection::Short);
    }

    #[test]
    fn gap_bear_requires_gap() {
        let bars = vec![
            with_bands(ebar(0, 100.0, 103.0, 99.5, 102.9, 1000.0), 100.0, 0.5),
            // No gap: open 102.8 < prev close 102.9.
            with_bands(ebar(1, 102.8, 103.5, 102.5, 102.6, 1000.0), 100.0, 0.5),
        ];
        let series = Series::new(bars);
        assert!(GapBearAboveUpper.evaluate(&series.view()).matches.is_empty());
    }
}
