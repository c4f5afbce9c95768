//! Shared helpers for unit tests.

use crate::domain::Bar;
use crate::enrich::EnrichedBar;
use chrono::{Duration, NaiveDate, NaiveDateTime};

pub const DEFAULT_EPSILON: f64 = 1e-10;

/// Timestamp of the i-th synthetic bar (15-minute spacing).
pub fn ts_at(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::minutes(15 * i as i64)
}

/// Create synthetic bars from close prices.
///
/// Generates plausible OHLV: open = prev_close (or close for the first bar),
/// high = max(open, close) + 1.0, low = min(open, close) - 1.0, volume 1000.
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                ts: ts_at(i),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Hand-build one enriched bar with explicit OHLCV; rolling fields stay None.
pub fn ebar(i: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> EnrichedBar {
    let body_top = open.max(close);
    let body_bot = open.min(close);
    EnrichedBar {
        ts: ts_at(i),
        open,
        high,
        low,
        close,
        volume,
        is_bull: close > open,
        is_bear: close < open,
        body: (close - open).abs(),
        upper_shadow: high - body_top,
        lower_shadow: body_bot - low,
        mid_price: (open + close) / 2.0,
        change_pct: (close - open) / open * 100.0,
        mid: None,
        std: None,
        upper: None,
        lower: None,
        ema20: None,
        ema50: None,
        ema200: None,
    }
}

/// Set the bollinger fields on a hand-built enriched bar.
pub fn with_bands(mut k: EnrichedBar, mid: f64, std: f64) -> EnrichedBar {
    k.mid = Some(mid);
    k.std = Some(std);
    k.upper = Some(mid + 2.0 * std);
    k.lower = Some(mid - 2.0 * std);
    k
}

pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}
