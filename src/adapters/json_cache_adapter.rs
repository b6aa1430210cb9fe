//! Cached market data adapter.
//!
//! Reads the `market_data.json` layout produced by the data fetcher:
//!
//! ```json
//! { "stocks": { "AAPL": { "dates": ["2024-01-02", ...],
//!                         "prices": { "open": [...], "high": [...],
//!                                     "low": [...], "close": [...],
//!                                     "volume": [...] } } } }
//! ```
//!
//! Series are decoded lazily per symbol, so one malformed entry only fails
//! that symbol.

use crate::domain::error::FractalTraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CachedSeries {
    dates: Vec<String>,
    prices: CachedPrices,
}

#[derive(Debug, Deserialize)]
struct CachedPrices {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Option<Vec<Option<f64>>>,
}

pub struct JsonCacheAdapter {
    groups: BTreeMap<String, BTreeMap<String, Value>>,
}

impl JsonCacheAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FractalTraderError> {
        let file = File::open(path.as_ref())?;
        let groups = serde_json::from_reader(BufReader::new(file))?;
        Ok(Self { groups })
    }

    pub fn from_json(content: &str) -> Result<Self, FractalTraderError> {
        let groups = serde_json::from_str(content)?;
        Ok(Self { groups })
    }

    fn decode(symbol: &str, value: &Value) -> Result<Vec<OhlcvBar>, FractalTraderError> {
        let series = CachedSeries::deserialize(value).map_err(|e| FractalTraderError::Data {
            reason: format!("{symbol}: {e}"),
        })?;
        let prices = &series.prices;
        let n = series.dates.len();

        let columns = [
            ("open", prices.open.len()),
            ("high", prices.high.len()),
            ("low", prices.low.len()),
            ("close", prices.close.len()),
        ];
        if let Some((name, len)) = columns.iter().find(|(_, len)| *len != n) {
            return Err(FractalTraderError::Data {
                reason: format!("{symbol}: {n} dates but {len} {name} values"),
            });
        }

        let mut bars = Vec::with_capacity(n);
        for (i, raw_date) in series.dates.iter().enumerate() {
            let date = parse_date(raw_date).ok_or_else(|| FractalTraderError::Data {
                reason: format!("{symbol}: invalid date '{raw_date}'"),
            })?;

            let (Some(open), Some(high), Some(low), Some(close)) =
                (prices.open[i], prices.high[i], prices.low[i], prices.close[i])
            else {
                tracing::debug!(symbol, %date, "skipping bar with missing prices");
                continue;
            };

            let volume = prices
                .volume
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten())
                .map(|v| v as i64);

            bars.push(OhlcvBar {
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Ok(bars)
    }
}

/// Accepts plain dates and timestamps with a date prefix.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

impl DataPort for JsonCacheAdapter {
    fn list_groups(&self) -> Result<Vec<String>, FractalTraderError> {
        Ok(self.groups.keys().cloned().collect())
    }

    fn list_symbols(&self, group: &str) -> Result<Vec<String>, FractalTraderError> {
        Ok(self
            .groups
            .get(group)
            .map(|symbols| symbols.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn fetch_ohlcv(&self, group: &str, symbol: &str) -> Result<Vec<OhlcvBar>, FractalTraderError> {
        let value = self
            .groups
            .get(group)
            .and_then(|symbols| symbols.get(symbol))
            .ok_or_else(|| FractalTraderError::NoData {
                symbol: symbol.to_string(),
            })?;
        Self::decode(symbol, value)
    }
}
