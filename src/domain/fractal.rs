//! Swing-point (fractal) detection.
//!
//! A high fractal at `i` is a bar whose high is strictly greater than every
//! other high in `[i - left, i + right]`; a low fractal is the mirror on lows.
//! Equal highs/lows anywhere in the window mean "no fractal".
//!
//! A fractal needs `right` closed bars after it, so its price is only
//! published in the level arrays at `i + right`.

use crate::domain::ohlcv::OhlcvBar;
use crate::domain::rolling::{rolling_max, rolling_min};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FractalKind {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fractal {
    /// Bar holding the extreme.
    pub index: usize,
    /// First bar at which the fractal is knowable (`index + right_bars`).
    pub confirmed_index: usize,
    pub kind: FractalKind,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FractalSeries {
    pub right_bars: usize,
    pub is_high_fractal: Vec<bool>,
    pub is_low_fractal: Vec<bool>,
    /// Fractal high prices, shifted forward by `right_bars`.
    pub fractal_high_level: Vec<Option<f64>>,
    /// Fractal low prices, shifted forward by `right_bars`.
    pub fractal_low_level: Vec<Option<f64>>,
}

impl FractalSeries {
    pub fn len(&self) -> usize {
        self.is_high_fractal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_high_fractal.is_empty()
    }

    /// All detected fractals in origin order.
    pub fn fractals(&self, bars: &[OhlcvBar]) -> Vec<Fractal> {
        let mut out = Vec::new();
        for (i, bar) in bars.iter().enumerate().take(self.len()) {
            let confirmed_index = i.saturating_add(self.right_bars);
            if self.is_high_fractal[i] {
                out.push(Fractal {
                    index: i,
                    confirmed_index,
                    kind: FractalKind::High,
                    price: bar.high,
                });
            }
            if self.is_low_fractal[i] {
                out.push(Fractal {
                    index: i,
                    confirmed_index,
                    kind: FractalKind::Low,
                    price: bar.low,
                });
            }
        }
        out
    }
}

pub fn detect_fractals(bars: &[OhlcvBar], left_bars: usize, right_bars: usize) -> FractalSeries {
    let n = bars.len();
    let mut is_high = vec![false; n];
    let mut is_low = vec![false; n];

    if left_bars.checked_add(right_bars).is_some_and(|window| n > window) {
        for i in left_bars..n - right_bars {
            let left = &bars[i - left_bars..i];
            let right = &bars[i + 1..=i + right_bars];

            let high = bars[i].high;
            let left_high = left.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            let right_high = right.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            is_high[i] = high > left_high && high > right_high;

            let low = bars[i].low;
            let left_low = left.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let right_low = right.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            is_low[i] = low < left_low && low < right_low;
        }
    }

    let shifted = |flags: &[bool], price: fn(&OhlcvBar) -> f64| -> Vec<Option<f64>> {
        (0..n)
            .map(|j| {
                j.checked_sub(right_bars)
                    .filter(|&origin| flags[origin])
                    .map(|origin| price(&bars[origin]))
            })
            .collect()
    };

    let fractal_high_level = shifted(&is_high, |b| b.high);
    let fractal_low_level = shifted(&is_low, |b| b.low);

    FractalSeries {
        right_bars,
        is_high_fractal: is_high,
        is_low_fractal: is_low,
        fractal_high_level,
        fractal_low_level,
    }
}

/// Breakout reference levels: the highest published fractal high and lowest
/// published fractal low over the trailing `lookback` bars.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingFractalLevels {
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
}

impl RollingFractalLevels {
    pub fn compute(fractals: &FractalSeries, lookback: usize) -> Self {
        Self {
            high: rolling_max(&fractals.fractal_high_level, lookback),
            low: rolling_min(&fractals.fractal_low_level, lookback),
        }
    }
}
