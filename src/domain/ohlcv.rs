//! Daily OHLC bar representation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily bar. Volume is carried through from the data source but unused
/// by the signal pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<i64>,
}

impl OhlcvBar {
    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// |close - open| / (high - low), `None` for a zero-range bar.
    pub fn body_ratio(&self) -> Option<f64> {
        let range = self.range();
        if range == 0.0 {
            None
        } else {
            Some((self.close - self.open).abs() / range)
        }
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Position of `date` in a chronologically sorted bar slice.
pub fn bar_index(bars: &[OhlcvBar], date: NaiveDate) -> Option<usize> {
    bars.binary_search_by_key(&date, |b| b.date).ok()
}
