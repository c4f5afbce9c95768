//! EMA trend enrichment — 20/50/200-period exponential moving averages.
//!
//! Computed independently of the bollinger pipeline; only the crossover
//! rule family reads these fields. Recursive form with alpha = 2/(span+1),
//! seeded at the first close, so values are defined from bar 0 with no
//! SMA-seeded warmup.

use super::EnrichedBar;

pub const TREND_SPANS: [usize; 3] = [20, 50, 200];

/// Recursive EMA over a close series, seeded at the first value.
pub fn ema_of_closes(closes: &[f64], span: usize) -> Vec<f64> {
    assert!(span >= 1, "EMA span must be >= 1");
    let mut out = Vec::with_capacity(closes.len());
    let alpha = 2.0 / (span as f64 + 1.0);

    let mut prev = match closes.first() {
        Some(&c) => c,
        None => return out,
    };
    out.push(prev);

    for &c in &closes[1..] {
        prev = alpha * c + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

/// Fill ema20/ema50/ema200 on an already-enriched series.
pub fn attach(series: &mut [EnrichedBar]) {
    let closes: Vec<f64> = series.iter().map(|k| k.close).collect();
    let e20 = ema_of_closes(&closes, 20);
    let e50 = ema_of_closes(&closes, 50);
    let e200 = ema_of_closes(&closes, 200);

    for (i, k) in series.iter_mut().enumerate() {
        k.ema20 = Some(e20[i]);
        k.ema50 = Some(e50[i]);
        k.ema200 = Some(e200[i]);
    }
}
