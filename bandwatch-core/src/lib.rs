//! Rule-based candlestick signal scanner.
//!
//! Pipeline: raw OHLCV bars → bollinger/EMA enrichment → rule catalog over
//! prefix views → cooldown gate → report/notification. The historical scan
//! replays every prefix as if the scanner had been running live; the live
//! check evaluates the newest bar once.
//!
//! All detection is pure and deterministic; I/O (exchange fetch, Telegram,
//! the append-only signal log) lives behind traits at the edges.

pub mod config;
pub mod cooldown;
pub mod data;
pub mod domain;
pub mod enrich;
pub mod notify;
pub mod report;
pub mod rules;
pub mod scan;
pub mod series;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::{LiveBarMode, ScanConfig};
pub use cooldown::CooldownTracker;
pub use domain::{Bar, SignalDirection, SignalMatch};
pub use enrich::{EnrichedBar, Enricher};
pub use scan::{LiveOutcome, ScanDriver};
pub use series::{Series, SeriesView};
