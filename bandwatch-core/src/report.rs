//! Signal records, report formatting, and the append-only signal log.

use crate::enrich::EnrichedBar;
use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("signal log: {0}")]
    Io(#[from] std::io::Error),
}

/// One bar's worth of surviving signals.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalEntry {
    pub ts: NaiveDateTime,
    pub price: f64,
    pub names: Vec<String>,
}

/// Where surviving signals go. The log is the system of record; matches
/// themselves are ephemeral.
pub trait SignalSink {
    fn append(&mut self, entry: &SignalEntry) -> Result<(), SinkError>;
}

/// Backtest-report block for one bar: header line, one bullet per signal,
/// and a rule-off line.
pub fn history_record(inst_id: &str, entry: &SignalEntry) -> String {
    let mut out = format!(
        "{} | {} {}\n",
        entry.ts.format("%Y-%m-%d %H:%M"),
        inst_id,
        entry.price
    );
    for name in &entry.names {
        out.push_str(" - ");
        out.push_str(name);
        out.push('\n');
    }
    out.push_str(&"-".repeat(30));
    out.push('\n');
    out
}

/// Live notification body: header, timestamp, price with candle change,
/// bullet list of signal names.
pub fn notification_text(inst_id: &str, bar: &EnrichedBar, names: &[String]) -> String {
    let mut out = format!(
        "{inst_id} signal\n{}\nprice {} ({:+.2}%)\n",
        bar.ts, bar.close, bar.change_pct
    );
    for name in names {
        out.push_str(" - ");
        out.push_str(name);
        out.push('\n');
    }
    out
}

/// Append-only file log, one line per signal name:
/// `{ts}|{name}|{price}`.
///
/// With dedup enabled, existing `(date, name)` keys are loaded once at
/// construction and repeat signals on the same calendar day are dropped.
pub struct FileSignalLog {
    path: PathBuf,
    seen: Option<HashSet<(String, String)>>,
}

impl FileSignalLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seen: None,
        }
    }

    /// Same log with per-day dedup; reads existing keys from the file.
    pub fn with_dedup(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        let mut seen = HashSet::new();
        if path.exists() {
            let file = std::fs::File::open(&path)?;
            for line in BufReader::new(file).lines() {
                let line = line?;
                if let Some(key) = Self::key_of_line(&line) {
                    seen.insert(key);
                }
            }
        }
        Ok(Self {
            path,
            seen: Some(seen),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn key_of_line(line: &str) -> Option<(String, String)> {
        let mut fields = line.split('|');
        let ts = fields.next()?.trim();
        let name = fields.next()?.trim();
        // Calendar-day portion of the timestamp.
        let date = ts.get(..10)?;
        Some((date.to_string(), name.to_string()))
    }
}

impl SignalSink for FileSignalLog {
    fn append(&mut self, entry: &SignalEntry) -> Result<(), SinkError> {
        let date = entry.ts.date().to_string();
        let mut lines = String::new();
        for name in &entry.names {
            if let Some(seen) = &mut self.seen {
                if !seen.insert((date.clone(), name.clone())) {
                    continue;
                }
            }
            lines.push_str(&format!("{}|{}|{}\n", entry.ts, name, entry.price));
        }
        if lines.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(lines.as_bytes())?;
        Ok(())
    }
}

/// Prints each record as a backtest-report block.
pub struct StdoutSink {
    inst_id: String,
}

impl StdoutSink {
    pub fn new(inst_id: impl Into<String>) -> Self {
        Self {
            inst_id: inst_id.into(),
        }
    }
}

impl SignalSink for StdoutSink {
    fn append(&mut self, entry: &SignalEntry) -> Result<(), SinkError> {
        print!("{}", history_record(&self.inst_id, entry));
        Ok(())
    }
}

/// Collects entries in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub entries: Vec<SignalEntry>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SignalSink for MemorySink {
    fn append(&mut self, entry: &SignalEntry) -> Result<(), SinkError> {
        self.entries.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ebar, ts_at};

    fn entry(names: &[&str]) -> SignalEntry {
        SignalEntry {
            ts: ts_at(0),
            price: 100.5,
            names: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn history_record_layout() {
        let text = history_record("BTC-USDT", &entry(&["sig one", "sig two"]));
        let lines: Vec<&str> = text.lines().collect();
        // Minute precision: candle timestamps never carry seconds.
        assert_eq!(lines[0], "2026-01-02 00:00 | BTC-USDT 100.5");
        assert_eq!(lines[1], " - sig one");
        assert_eq!(lines[2], " - sig two");
        assert_eq!(lines[3], "-".repeat(30));
    }

    #[test]
    fn notification_text_carries_change() {
        let bar = ebar(0, 100.0, 101.0, 99.0, 100.5, 1000.0);
        let text = notification_text("BTC-USDT", &bar, &["sig".to_string()]);
        assert!(text.starts_with("BTC-USDT signal\n"));
        assert!(text.contains("price 100.5 (+0.50%)"));
        assert!(text.contains(" - sig\n"));
    }

    #[test]
    fn file_log_appends_one_line_per_name() {
        let path = std::env::temp_dir().join("bandwatch_test_log_plain.txt");
        let _ = std::fs::remove_file(&path);

        let mut log = FileSignalLog::new(&path);
        log.append(&entry(&["a", "b"])).unwrap();
        log.append(&entry(&["a"])).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(body.lines().count(), 3);
        assert!(body.contains("|a|100.5"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn dedup_drops_same_day_repeats_across_instances() {
        let path = std::env::temp_dir().join("bandwatch_test_log_dedup.txt");
        let _ = std::fs::remove_file(&path);

        let mut log = FileSignalLog::with_dedup(&path).unwrap();
        log.append(&entry(&["a"])).unwrap();
        log.append(&entry(&["a", "b"])).unwrap();

        // A fresh instance reloads keys from the file.
        let mut log = FileSignalLog::with_dedup(&path).unwrap();
        log.append(&entry(&["b", "c"])).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        let names: Vec<&str> = body
            .lines()
            .map(|l| l.split('|').nth(1).unwrap())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn memory_sink_collects() {
        let mut sink = MemorySink::new();
        sink.append(&entry(&["a"])).unwrap();
        assert_eq!(sink.entries.len(), 1);
        assert_eq!(sink.entries[0].names, vec!["a"]);
    }
}
