//! Bar enrichment — rolling bollinger statistics plus per-candle attributes.
//!
//! The enricher is a pure function: bars in, enriched bars out, re-derivable
//! at any time from the same input. Rolling fields use a fixed window W and
//! are `None` for the first W−1 bars; rules treat `None` as non-matching.
//!
//! Numeric semantics: **sample** standard deviation (N−1 denominator) over
//! the trailing W closes, band multiplier fixed at 2.

pub mod ema;

use crate::domain::Bar;
use chrono::NaiveDateTime;

/// Band multiplier. Every deployment of the scanner uses ±2σ.
const BAND_MULT: f64 = 2.0;

/// Bar plus derived fields.
///
/// Per-candle attributes (`body`, shadows, `mid_price`, `change_pct`,
/// polarity flags) are always defined. Rolling fields (`mid`, `std`,
/// `upper`, `lower`) require W prior bars; EMA trend fields are filled by
/// [`ema::attach`] in an independent pass and stay `None` until then.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedBar {
    pub ts: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,

    pub is_bull: bool,
    pub is_bear: bool,
    pub body: f64,
    pub upper_shadow: f64,
    pub lower_shadow: f64,
    /// Candle midpoint: (open + close) / 2.
    pub mid_price: f64,
    /// Percent move of the candle: (close − open) / open × 100.
    pub change_pct: f64,

    pub mid: Option<f64>,
    pub std: Option<f64>,
    pub upper: Option<f64>,
    pub lower: Option<f64>,

    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub ema200: Option<f64>,
}

impl EnrichedBar {
    /// Derive the per-candle attributes; rolling fields start undefined.
    fn from_bar(bar: &Bar) -> Self {
        let body_top = bar.open.max(bar.close);
        let body_bot = bar.open.min(bar.close);
        Self {
            ts: bar.ts,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            is_bull: bar.close > bar.open,
            is_bear: bar.close < bar.open,
            body: (bar.close - bar.open).abs(),
            upper_shadow: bar.high - body_top,
            lower_shadow: body_bot - bar.low,
            mid_price: (bar.open + bar.close) / 2.0,
            change_pct: (bar.close - bar.open) / bar.open * 100.0,
            mid: None,
            std: None,
            upper: None,
            lower: None,
            ema20: None,
            ema50: None,
            ema200: None,
        }
    }
}

/// Rolling-statistics enricher with a fixed window length.
#[derive(Debug, Clone)]
pub struct Enricher {
    window: usize,
}

impl Enricher {
    /// `window` is the rolling-stat width W, commonly 20 or 25.
    pub fn new(window: usize) -> Self {
        assert!(window >= 2, "enrichment window must be >= 2");
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Enrich a bar sequence. Input must already be sorted ascending by ts.
    pub fn enrich(&self, bars: &[Bar]) -> Vec<EnrichedBar> {
        let w = self.window;
        let mut out: Vec<EnrichedBar> = bars.iter().map(EnrichedBar::from_bar).collect();

        for i in (w - 1)..out.len() {
            let start = i + 1 - w;
            let closes = &bars[start..=i];

            let sum: f64 = closes.iter().map(|b| b.close).sum();
            let mean = sum / w as f64;
            // Sample variance, N−1 denominator.
            let var: f64 = closes
                .iter()
                .map(|b| {
                    let d = b.close - mean;
                    d * d
                })
                .sum::<f64>()
                / (w as f64 - 1.0);
            let std = var.sqrt();

            let k = &mut out[i];
            k.mid = Some(mean);
            k.std = Some(std);
            k.upper = Some(mean + BAND_MULT * std);
            k.lower = Some(mean - BAND_MULT * std);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn rolling_mean_matches_window() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let enriched = Enricher::new(3).enrich(&bars);

        assert!(enriched[0].mid.is_none());
        assert!(enriched[1].mid.is_none());
        assert_approx(enriched[2].mid.unwrap(), 11.0, DEFAULT_EPSILON);
        assert_approx(enriched[3].mid.unwrap(), 12.0, DEFAULT_EPSILON);
        assert_approx(enriched[4].mid.unwrap(), 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sample_stddev_bands() {
        // Window (10, 11, 12): mean 11, sample variance ((1+0+1)/2) = 1, σ = 1.
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let enriched = Enricher::new(3).enrich(&bars);
        let k = &enriched[2];
        assert_approx(k.std.unwrap(), 1.0, 1e-9);
        assert_approx(k.upper.unwrap(), 13.0, 1e-9);
        assert_approx(k.lower.unwrap(), 9.0, 1e-9);
    }

    #[test]
    fn constant_price_zero_width_bands() {
        let bars = make_bars(&[100.0, 100.0, 100.0, 100.0]);
        let enriched = Enricher::new(3).enrich(&bars);
        assert_approx(enriched[3].upper.unwrap(), 100.0, DEFAULT_EPSILON);
        assert_approx(enriched[3].lower.unwrap(), 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn candle_attributes() {
        let mut bars = make_bars(&[100.0, 103.0]);
        bars[1].high = 106.0;
        bars[1].low = 99.0;
        let enriched = Enricher::new(2).enrich(&bars);
        let k = &enriched[1];

        assert!(k.is_bull);
        assert!(!k.is_bear);
        assert_approx(k.body, 3.0, DEFAULT_EPSILON);
        assert_approx(k.upper_shadow, 3.0, DEFAULT_EPSILON); // 106 − 103
        assert_approx(k.lower_shadow, 1.0, DEFAULT_EPSILON); // 100 − 99
        assert_approx(k.mid_price, 101.5, DEFAULT_EPSILON);
        assert_approx(k.change_pct, 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn doji_is_neither_bull_nor_bear() {
        let mut bars = make_bars(&[100.0, 100.0]);
        bars[1].open = 100.0;
        let enriched = Enricher::new(2).enrich(&bars);
        assert!(!enriched[1].is_bull);
        assert!(!enriched[1].is_bear);
        assert_approx(enriched[1].body, 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn enrichment_is_deterministic() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        let bars = make_bars(&closes);
        let enricher = Enricher::new(20);
        assert_eq!(enricher.enrich(&bars), enricher.enrich(&bars));
    }

    #[test]
    fn short_series_has_no_rolling_fields() {
        let bars = make_bars(&[10.0, 11.0]);
        let enriched = Enricher::new(20).enrich(&bars);
        assert!(enriched.iter().all(|k| k.mid.is_none() && k.upper.is_none()));
    }
}
