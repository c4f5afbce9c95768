//! Swing-anchor rules — the most recent extreme candle as a level to lose
//! or reclaim.

use super::{Rule, RuleOutput};
use crate::domain::{SignalDirection, SignalMatch};
use crate::enrich::EnrichedBar;
use crate::series::SeriesView;

/// Up to the last ten bars, current bar included.
fn anchor_window<'a>(view: &SeriesView<'a>) -> &'a [EnrichedBar] {
    let len = view.len().min(10);
    // len <= view.len(), so the window always exists.
    view.trailing(len, 0).unwrap_or(&[])
}

/// Short: the current bear's midpoint falls below the low of the highest
/// bull in the last ten bars. First occurrence wins on tied highs.
#[derive(Debug, Clone)]
pub struct LostHighestBull;

impl LostHighestBull {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        if !now.is_bear {
            return None;
        }

        let anchor = anchor_window(view)
            .iter()
            .filter(|k| k.is_bull)
            .fold(None::<&EnrichedBar>, |best, k| match best {
                Some(b) if k.high > b.high => Some(k),
                Some(b) => Some(b),
                None => Some(k),
            })?;
        if now.mid_price >= anchor.low {
            return None;
        }

        Some(SignalMatch::new(
            self.id(),
            "short break: candle midpoint lost the highest bull's low".to_string(),
            SignalDirection::Short,
            now.ts,
        ))
    }
}

impl Rule for LostHighestBull {
    fn id(&self) -> &'static str {
        "lost_highest_bull"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Long: mirror — the current bull's midpoint clears the high of the lowest
/// bear in the last ten bars.
#[derive(Debug, Clone)]
pub struct ReclaimLowestBear;

impl ReclaimLowestBear {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        if !now.is_bull {
            return None;
        }

        let anchor = anchor_window(view)
            .iter()
            .filter(|k| k.is_bear)
            .fold(None::<&EnrichedBar>, |best, k| match best {
                Some(b) if k.low < b.low => Some(k),
                Some(b) => Some(b),
                None => Some(k),
            })?;
        if now.mid_price <= anchor.high {
            return None;
        }

        Some(SignalMatch::new(
            self.id(),
            "long reclaim: candle midpoint above the lowest bear's high".to_string(),
            SignalDirection::Long,
            now.ts,
        ))
    }
}

impl Rule for ReclaimLowestBear {
    fn id(&self) -> &'static str {
        "reclaim_lowest_bear"
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
    use crate::testutil::ebar;

    #[test]
    fn losing_the_highest_bulls_low() {
        let mut bars: Vec<_> = (0..8)
            .map(|i| ebar(i, 100.0, 101.0, 99.5, 100.5, 1000.0))
            .collect();
        // Highest bull in the window: high 105, low 102.
        bars.push(ebar(8, 102.5, 105.0, 102.0, 104.5, 1000.0));
        // Bear with midpoint (101+100)/2 = 100.5 below that low.
        bars.push(ebar(9, 101.0, 101.2, 99.8, 100.0, 1000.0));
        let series = Series::new(bars);

        let out = LostHighestBull.evaluate(&series.view());
        assert_eq!(out.matches.len(), 1);
        assert_eq!(out.matches[0].direction, SignalDirection::Short);
    }

    #[test]
    fn holding_the_level_stays_quiet() {
        let mut bars: Vec<_> = (0..8)
            .map(|i| ebar(i, 100.0, 101.0, 99.5, 100.5, 1000.0))
            .collect();
        bars.push(ebar(8, 102.5, 105.0, 102.0, 104.5, 1000.0));
        // Bear midpoint (104+103.5)/2 = 103.75 still above low 102.
        bars.push(ebar(9, 104.0, 104.2, 103.0, 103.5, 1000.0));
        let series = Series::new(bars);

        assert!(LostHighestBull.evaluate(&series.view()).matches.is_empty());
    }

    #[test]
    fn anchor_only_looks_back_ten_bars() {
        // A towering bull 11 bars back must not be the anchor.
        let mut bars = vec![ebar(0, 110.0, 120.0, 109.0, 119.0, 1000.0)];
        bars.extend((1..11).map(|i| ebar(i, 100.0, 101.0, 99.5, 100.5, 1000.0)));
        // Bear midpoint 100.25; in-window highest bull low is 99.5, held.
        bars.push(ebar(11, 100.5, 100.6, 99.9, 100.0, 1000.0));
        let series = Series::new(bars);

        assert!(LostHighestBull.evaluate(&series.view()).matches.is_empty());
    }

    #[test]
    fn reclaiming_the_lowest_bears_high() {
        let mut bars: Vec<_> = (0..8)
            .map(|i| ebar(i, 100.0, 101.0, 99.5, 100.5, 1000.0))
            .collect();
        // Lowest bear: low 95, high 98.
        bars.push(ebar(8, 97.5, 98.0, 95.0, 95.5, 1000.0));
        // Bull midpoint (98+99.5)/2 = 98.75 above that high.
        bars.push(ebar(9, 98.0, 99.8, 97.8, 99.5, 1000.0));
        let series = Series::new(bars);

        let out = ReclaimLowestBear.evaluate(&series.view());
        assert_eq!(out.matches.len(), 1);
        assert_eq!(out.matches[0].direction, SignalDirection::Long);
    }

    #[test]
    fn no_bear_in_window_means_no_anchor() {
        let bars: Vec<_> = (0..10)
            .map(|i| ebar(i, 100.0, 101.0, 99.5, 100.5, 1000.0))
            .collect();
        let series = Series::new(bars);
        assert!(ReclaimLowestBear.evaluate(&series.view()).matches.is_empty());
    }
}
