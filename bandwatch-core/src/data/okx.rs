//! OKX v5 market-candles provider.

use super::{CandleProvider, DataError};
use crate::domain::Bar;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDateTime};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://www.okx.com";
const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_MS: u64 = 500;

/// Candle rows come back as arrays of strings:
/// `[ts_ms, open, high, low, close, vol, ...aux]`, newest first. Only the
/// first six columns matter.
#[derive(Debug, Deserialize)]
struct OkxResponse {
    code: String,
    msg: String,
    data: Vec<Vec<String>>,
}

pub struct OkxProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    tz_offset_hours: i64,
}

impl OkxProvider {
    pub fn new(tz_offset_hours: i64) -> Result<Self, DataError> {
        Self::with_base_url(DEFAULT_BASE_URL, tz_offset_hours)
    }

    /// Test hook: point at a local stub server.
    pub fn with_base_url(
        base_url: impl Into<String>,
        tz_offset_hours: i64,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            tz_offset_hours,
        })
    }

    fn request(&self, inst_id: &str, bar: &str, limit: u32) -> Result<OkxResponse, DataError> {
        let url = format!("{}/api/v5/market/candles", self.base_url);
        let limit = limit.to_string();
        let mut last_err = None;
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let backoff = BACKOFF_BASE_MS * 2u64.pow(attempt - 1);
                std::thread::sleep(Duration::from_millis(backoff));
            }
            let result = self
                .client
                .get(&url)
                .query(&[("instId", inst_id), ("bar", bar), ("limit", &limit)])
                .send()
                .and_then(|r| r.text());
            match result {
                Ok(body) => return Ok(serde_json::from_str(&body)?),
                Err(e) => last_err = Some(e),
            }
        }
        // Loop ran MAX_ATTEMPTS times, so an error is recorded.
        Err(last_err
            .map(DataError::Http)
            .unwrap_or_else(|| DataError::Malformed("no response".to_string())))
    }
}

impl CandleProvider for OkxProvider {
    fn fetch(&self, inst_id: &str, bar: &str, limit: u32) -> Result<Vec<Bar>, DataError> {
        let response = self.request(inst_id, bar, limit)?;
        if response.code != "0" {
            return Err(DataError::Exchange {
                code: response.code,
                msg: response.msg,
            });
        }
        parse_rows(&response.data, self.tz_offset_hours)
    }
}

/// Decode candle rows into bars, oldest first.
fn parse_rows(rows: &[Vec<String>], tz_offset_hours: i64) -> Result<Vec<Bar>, DataError> {
    let mut bars = Vec::with_capacity(rows.len());
    for row in rows {
        if row.len() < 6 {
            return Err(DataError::Malformed(format!(
                "expected at least 6 columns, got {}",
                row.len()
            )));
        }
        let ts = parse_ts(&row[0], tz_offset_hours)?;
        bars.push(Bar {
            ts,
            open: parse_field(&row[1], "open")?,
            high: parse_field(&row[2], "high")?,
            low: parse_field(&row[3], "low")?,
            close: parse_field(&row[4], "close")?,
            volume: parse_field(&row[5], "volume")?,
        });
    }
    bars.sort_by_key(|b| b.ts);
    Ok(bars)
}

fn parse_ts(raw: &str, tz_offset_hours: i64) -> Result<NaiveDateTime, DataError> {
    let ms: i64 = raw
        .parse()
        .map_err(|_| DataError::Malformed(format!("timestamp {raw:?}")))?;
    let utc = DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| DataError::Malformed(format!("timestamp {raw:?} out of range")))?;
    Ok(utc.naive_utc() + ChronoDuration::hours(tz_offset_hours))
}

fn parse_field(raw: &str, field: &str) -> Result<f64, DataError> {
    raw.parse()
        .map_err(|_| DataError::Malformed(format!("{field} {raw:?}")))
}
