//! Market-data boundary — candle providers and offline import.

pub mod csv_import;
pub mod okx;

use crate::domain::Bar;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("candle request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("candle response decode: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("exchange error {code}: {msg}")]
    Exchange { code: String, msg: String },
    #[error("malformed candle row: {0}")]
    Malformed(String),
    #[error("candle file: {0}")]
    Io(#[from] std::io::Error),
    #[error("candle csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Source of candle history. Implementations return bars sorted ascending
/// by timestamp.
pub trait CandleProvider {
    fn fetch(&self, inst_id: &str, bar: &str, limit: u32) -> Result<Vec<Bar>, DataError>;
}
