//! Volume rules — climactic bursts and one-sided breakdowns.

use super::{Rule, RuleOutput};
use crate::domain::{SignalDirection, SignalMatch};
use crate::series::SeriesView;

/// Neutral: the current bar carries the highest volume of a lookback window
/// AND dwarfs the quietest of the last three bars by 6x or more.
///
/// Direction is deliberately neutral — a volume climax marks exhaustion
/// without saying whose.
#[derive(Debug, Clone)]
pub struct VolumeSpikeReversal {
    depths: Vec<usize>,
}

impl VolumeSpikeReversal {
    pub fn new(depths: Vec<usize>) -> Self {
        assert!(!depths.is_empty(), "at least one lookback depth required");
        Self { depths }
    }

    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;

        for &n in &self.depths {
            if view.len() < n + 3 {
                continue;
            }
            let window = view.trailing(n, 1)?;
            let max_vol = window.iter().map(|k| k.volume).fold(f64::MIN, f64::max);
            if now.volume < max_vol {
                continue;
            }

            let recent = view.trailing(3, 1)?;
            let min_vol = recent.iter().map(|k| k.volume).fold(f64::MAX, f64::min);
            if min_vol == 0.0 {
                continue;
            }
            let ratio = now.volume / min_vol;
            if ratio < 6.0 {
                return None;
            }
            return Some(SignalMatch::new(
                self.id(),
                format!("volume climax: {n}-bar max volume, {ratio:.1}x burst"),
                SignalDirection::Neutral,
                now.ts,
            ));
        }
        None
    }
}

impl Rule for VolumeSpikeReversal {
    fn id(&self) -> &'static str {
        "volume_spike_reversal"
    }

    fn min_bars(&self) -> usize {
        self.depths.iter().min().copied().unwrap_or(0) + 3
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Short: a bear closing below the lower band on at least 4.3x the volume of
/// the most recent bull candle.
#[derive(Debug, Clone)]
pub struct VolumeBreakLower;

impl VolumeBreakLower {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        if !now.is_bear || now.close >= now.lower? {
            return None;
        }

        // Most recent bull strictly before the current bar.
        let prior = view.trailing(view.len() - 1, 1)?;
        let last_bull = prior.iter().rev().find(|k| k.is_bull)?;
        if now.volume < last_bull.volume * 4.3 {
            return None;
        }

        Some(SignalMatch::new(
            self.id(),
            "short breakdown: bear through lower band on 4.3x bull volume".to_string(),
            SignalDirection::Short,
            now.ts,
        ))
    }
}

impl Rule for VolumeBreakLower {
    fn id(&self) -> &'static str {
        "volume_break_lower"
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}

/// Short: a bull then two bears with volume at least doubling on each step
/// and tripling on one of them, the pattern's high poking the upper band.
#[derive(Debug, Clone)]
pub struct VolumeCascadeReversal;

impl VolumeCascadeReversal {
    fn check(&self, view: &SeriesView<'_>) -> Option<SignalMatch> {
        let now = view.from_end(0)?;
        let k2 = view.from_end(1)?;
        let k3 = view.from_end(2)?;
        let k4 = view.from_end(3)?;
        if !(k2.is_bear && k3.is_bear && k4.is_bull) {
            return None;
        }
        if k3.volume <= 0.0 || k4.volume <= 0.0 {
            return None;
        }

        let step_mid = k3.volume / k4.volume;
        let step_last = k2.volume / k3.volume;
        if step_mid < 2.0 || step_last < 2.0 {
            return None;
        }
        if step_mid < 3.0 && step_last < 3.0 {
            return None;
        }
        if k2.high.max(k3.high) <= k2.upper? * 0.995 {
            return None;
        }

        Some(SignalMatch::new(
            self.id(),
            format!(
                "short cascade: two bears after a bull on {step_mid:.1}x / {step_last:.1}x volume"
            ),
            SignalDirection::Short,
            now.ts,
        ))
    }
}

impl Rule for VolumeCascadeReversal {
    fn id(&self) -> &'static str {
        "volume_cascade_reversal"
    }

    fn min_bars(&self) -> usize {
        4
    }

    fn evaluate(&self, view: &SeriesView<'_>) -> RuleOutput {
        RuleOutput::maybe(self.check(view))
    }
}
