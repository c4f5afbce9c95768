//! Scan driver — wires catalog, cooldown, report, and notification together.

use crate::config::{LiveBarMode, ScanConfig};
use crate::cooldown::CooldownTracker;
use crate::notify::Notifier;
use crate::report::{notification_text, SignalEntry, SignalSink, SinkError};
use crate::rules::RuleCatalog;
use crate::series::Series;

/// Result of one live check.
#[derive(Debug, Clone, Default)]
pub struct LiveOutcome {
    /// Signal names that survived the cooldown gate.
    pub matched: Vec<String>,
    /// `Some(true)` when the notification went out, `Some(false)` when the
    /// send failed, `None` when there was nothing to send.
    pub delivered: Option<bool>,
}

pub struct ScanDriver {
    config: ScanConfig,
    catalog: RuleCatalog,
    tracker: CooldownTracker,
}

impl ScanDriver {
    pub fn new(config: ScanConfig, catalog: RuleCatalog) -> Self {
        let tracker = CooldownTracker::from_minutes(config.cooldown_minutes);
        Self {
            config,
            catalog,
            tracker,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Fresh cooldown state, for a new backtest iteration.
    pub fn reset(&mut self) {
        self.tracker.reset();
    }

    /// Walk history from `start_index`, evaluating each prefix as if the
    /// scanner had been running live. One record per bar with surviving
    /// matches; returns the record count.
    pub fn scan_history(
        &mut self,
        series: &Series,
        sink: &mut dyn SignalSink,
    ) -> Result<usize, SinkError> {
        let mut records = 0;
        for i in self.config.start_index..series.len() {
            let Some(view) = series.prefix(i) else {
                continue;
            };
            let matches = self.catalog.detect(&view);
            if matches.is_empty() {
                continue;
            }

            let bar = &series.bars()[i];
            let names: Vec<String> = matches
                .into_iter()
                .filter(|m| self.tracker.allow(&m.name, m.ts))
                .map(|m| m.name)
                .collect();
            if names.is_empty() {
                continue;
            }

            sink.append(&SignalEntry {
                ts: bar.ts,
                price: bar.close,
                names,
            })?;
            records += 1;
        }
        Ok(records)
    }

    /// Evaluate the newest bar once; notify and log if anything survives.
    ///
    /// `DropForming` detects on the series minus its forming bar but reports
    /// the forming bar's timestamp and price, matching live operation where
    /// the last closed candle triggers while the current price is what the
    /// operator acts on.
    pub fn check_latest(
        &mut self,
        series: &Series,
        notifier: &dyn Notifier,
        sink: &mut dyn SignalSink,
    ) -> Result<LiveOutcome, SinkError> {
        let view = match self.config.live_bar {
            LiveBarMode::DropForming => series.without_last(),
            LiveBarMode::IncludeForming => series.view(),
        };
        let Some(report_bar) = series.bars().last() else {
            return Ok(LiveOutcome::default());
        };

        let names: Vec<String> = self
            .catalog
            .detect(&view)
            .into_iter()
            .filter(|m| self.tracker.allow(&m.name, m.ts))
            .map(|m| m.name)
            .collect();
        if names.is_empty() {
            return Ok(LiveOutcome::default());
        }

        let text = notification_text(&self.config.inst_id, report_bar, &names);
        let delivered = Some(notifier.send(&text).is_ok());

        sink.append(&SignalEntry {
            ts: report_bar.ts,
            price: report_bar.close,
            names: names.clone(),
        })?;

        Ok(LiveOutcome {
            matched: names,
            delivered,
        })
    }
}
