//! Signal matches — named pattern hits emitted by the rule catalog.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Directional read of a matched pattern.
///
/// `Neutral` covers observation signals (e.g. volume climaxes) that flag a
/// bar without committing to a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalDirection {
    Long,
    Short,
    Neutral,
}

/// One pattern match on one bar.
///
/// `name` is the full human-readable description — direction, lookback depth,
/// and any computed ratio tiers baked in — and doubles as the cooldown key,
/// so two tiers of the same rule cool down independently. Matches are
/// ephemeral: produced, reported, discarded — serializable one way for
/// debugging dumps, never read back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalMatch {
    /// Stable rule identifier (e.g. "lower_shadow_reversal").
    pub rule: &'static str,
    pub name: String,
    pub direction: SignalDirection,
    pub ts: NaiveDateTime,
}

impl SignalMatch {
    pub fn new(
        rule: &'static str,
        name: impl Into<String>,
        direction: SignalDirection,
        ts: NaiveDateTime,
    ) -> Self {
        Self {
            rule,
            name: name.into(),
            direction,
            ts,
        }
    }
}
