//! Cooldown gate — per-signal-name suppression of repeat emissions.

use chrono::{Duration, NaiveDateTime};
use std::collections::HashMap;

/// Name → last-fired timestamp, gated by a fixed cooldown duration.
///
/// Keyed purely by signal name, so one tracker serves exactly one
/// (instrument, rule-set) scanning context; the scan driver owns one and
/// resets it between backtest iterations. Calling [`allow`](Self::allow) is
/// a side effect in itself: an allowed firing records its timestamp even if
/// the caller then drops the match.
///
/// Single-threaded by construction — scans are sequential, no locking.
#[derive(Debug, Clone)]
pub struct CooldownTracker {
    cooldown: Duration,
    last_fired: HashMap<String, NaiveDateTime>,
}

impl CooldownTracker {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_fired: HashMap::new(),
        }
    }

    pub fn from_minutes(minutes: i64) -> Self {
        Self::new(Duration::minutes(minutes))
    }

    /// First call for a name always fires and records `ts`. Later calls fire
    /// only when `ts − last ≥ cooldown`, overwriting the record on success
    /// and leaving it untouched on suppression.
    pub fn allow(&mut self, name: &str, ts: NaiveDateTime) -> bool {
        match self.last_fired.get(name) {
            None => {
                self.last_fired.insert(name.to_string(), ts);
                true
            }
            Some(&last) if ts - last >= self.cooldown => {
                self.last_fired.insert(name.to_string(), ts);
                true
            }
            Some(_) => false,
        }
    }

    /// Forget all cooldown history (fresh backtest iteration).
    pub fn reset(&mut self) {
        self.last_fired.clear();
    }

    /// Last recorded firing for a name, if any.
    pub fn last_fired(&self, name: &str) -> Option<NaiveDateTime> {
        self.last_fired.get(name).copied()
    }
}
