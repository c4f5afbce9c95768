//! Offline candle import from CSV files.
//!
//! Expected header: `ts,open,high,low,close,volume` with ISO-8601
//! timestamps (`2026-01-02T00:15:00`). Rows may arrive in any order; the
//! result is sorted ascending.

use super::DataError;
use crate::domain::Bar;
use std::io::Read;
use std::path::Path;

pub fn read_candles_csv(path: impl AsRef<Path>) -> Result<Vec<Bar>, DataError> {
    let file = std::fs::File::open(path)?;
    read_candles(file)
}

fn read_candles(reader: impl Read) -> Result<Vec<Bar>, DataError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut bars = Vec::new();
    for record in rdr.deserialize::<Bar>() {
        let bar: Bar = record?;
        if !bar.is_sane() {
            return Err(DataError::Malformed(format!(
                "inconsistent OHLCV at {}",
                bar.ts
            )));
        }
        bars.push(bar);
    }
    bars.sort_by_key(|b| b.ts);
    Ok(bars)
}
