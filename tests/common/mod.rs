#![allow(dead_code)]

use chrono::NaiveDate;
use fractaltrader::domain::batch::BatchReport;
use fractaltrader::domain::error::FractalTraderError;
pub use fractaltrader::domain::ohlcv::OhlcvBar;
use fractaltrader::ports::data_port::DataPort;
use fractaltrader::ports::report_port::ReportPort;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// In-memory data source keyed by group and symbol, with injectable
/// per-symbol fetch failures.
pub struct MockDataPort {
    pub data: BTreeMap<String, BTreeMap<String, Vec<OhlcvBar>>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, group: &str, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data
            .entry(group.to_string())
            .or_default()
            .insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, group: &str, symbol: &str, reason: &str) -> Self {
        self.data
            .entry(group.to_string())
            .or_default()
            .insert(symbol.to_string(), Vec::new());
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn list_groups(&self) -> Result<Vec<String>, FractalTraderError> {
        Ok(self.data.keys().cloned().collect())
    }

    fn list_symbols(&self, group: &str) -> Result<Vec<String>, FractalTraderError> {
        Ok(self
            .data
            .get(group)
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn fetch_ohlcv(&self, group: &str, symbol: &str) -> Result<Vec<OhlcvBar>, FractalTraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(FractalTraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(group)
            .and_then(|s| s.get(symbol))
            .cloned()
            .unwrap_or_default())
    }
}

/// Captures reports instead of writing files.
#[derive(Default)]
pub struct MockReportPort {
    pub written: Mutex<Vec<BatchReport>>,
}

impl ReportPort for MockReportPort {
    fn write(
        &self,
        report: &BatchReport,
        output_dir: &Path,
    ) -> Result<PathBuf, FractalTraderError> {
        self.written.lock().unwrap().push(report.clone());
        Ok(output_dir.join(format!("{}_results.json", report.strategy)))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Bar `i` days after 2024-01-01.
pub fn ohlc(i: usize, open: f64, high: f64, low: f64, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: date(2024, 1, 1) + chrono::Duration::days(i as i64),
        open,
        high,
        low,
        close,
        volume: None,
    }
}

/// Swing high of 15 at bar 2 (confirmed at bar 4), bar 6 closes above it,
/// bar 7 opens at 15.6 and closes back below the level, and bar 8 trades
/// down through the ATR stop.
pub fn breakout_then_stop() -> Vec<OhlcvBar> {
    vec![
        ohlc(0, 10.0, 11.0, 9.0, 10.5),
        ohlc(1, 10.5, 12.0, 10.0, 11.5),
        ohlc(2, 11.5, 15.0, 11.0, 14.0),
        ohlc(3, 14.0, 14.5, 12.0, 12.5),
        ohlc(4, 12.5, 13.5, 12.0, 13.0),
        ohlc(5, 13.0, 14.0, 12.5, 13.5),
        ohlc(6, 13.5, 16.0, 13.4, 15.5),
        ohlc(7, 15.6, 16.5, 14.5, 14.8),
        ohlc(8, 14.8, 16.2, 8.0, 9.0),
        ohlc(9, 9.0, 10.0, 8.5, 9.5),
    ]
}

/// Deterministic zig-zag series with regular swings in both directions.
pub fn generate_bars(count: usize, base: f64) -> Vec<OhlcvBar> {
    wave_bars(count, base, 0.3)
}

/// `generate_bars` with candle bodies of up to `2 * body`. Bodies of 1.0 or
/// more clear the default body-ratio gate, so order blocks form.
pub fn wave_bars(count: usize, base: f64, body: f64) -> Vec<OhlcvBar> {
    (0..count)
        .map(|i| {
            let wave = ((i as f64) * 0.7).sin() * 4.0 + ((i as f64) * 0.13).cos() * 6.0;
            let mid = base + wave + i as f64 * 0.05;
            let open = mid - body * (i as f64 * 1.3).sin();
            let close = mid + body * (i as f64 * 1.3).sin();
            ohlc(
                i,
                open,
                open.max(close) + 0.8,
                open.min(close) - 0.8,
                close,
            )
        })
        .collect()
}

/// Swing high of 15 at bar 2 and down candles at bars 4 and 5 that become
/// bullish order blocks when bar 7 closes above 15. Bar 8 gaps back down
/// to 13.0, inside both zones, and bar 9 rallies through the 2.5R target.
pub fn order_block_retest() -> Vec<OhlcvBar> {
    vec![
        ohlc(0, 10.0, 11.0, 9.0, 10.5),
        ohlc(1, 10.5, 12.0, 10.0, 11.5),
        ohlc(2, 11.5, 15.0, 11.0, 14.0),
        ohlc(3, 14.0, 14.5, 12.0, 12.5),
        ohlc(4, 12.5, 13.0, 11.5, 12.0),
        ohlc(5, 13.0, 13.2, 11.8, 12.0),
        ohlc(6, 12.0, 14.0, 11.9, 13.8),
        ohlc(7, 13.8, 16.0, 13.5, 15.5),
        ohlc(8, 13.0, 14.5, 12.8, 14.2),
        ohlc(9, 14.2, 25.0, 14.0, 24.0),
    ]
}

/// Prices reflected around `pivot / 2`: highs become lows and bullish
/// setups become bearish ones.
pub fn mirrored(bars: &[OhlcvBar], pivot: f64) -> Vec<OhlcvBar> {
    bars.iter()
        .map(|b| OhlcvBar {
            open: pivot - b.open,
            high: pivot - b.low,
            low: pivot - b.high,
            close: pivot - b.close,
            ..b.clone()
        })
        .collect()
}
