//! Order block (supply/demand zone) detection.
//!
//! A bullish order block is the last down candle before an impulse whose close
//! breaks the rolling fractal-high level within `impulse_bars` bars. Bearish is
//! the mirror: an up candle followed by a close below the rolling fractal low.
//! The zone spans the origin candle's `[low, high]`.

use crate::domain::fractal::{FractalSeries, RollingFractalLevels};
use crate::domain::ohlcv::OhlcvBar;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBlockDirection {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrderBlock {
    pub origin_index: usize,
    /// Last bar of the confirmation window (`origin_index + impulse_bars`).
    pub confirmed_index: usize,
    pub direction: OrderBlockDirection,
    pub low: f64,
    pub high: f64,
}

impl OrderBlock {
    pub fn height(&self) -> f64 {
        self.high - self.low
    }

    /// Whether `price` lies inside the zone widened by `tolerance_pct` of its
    /// height on both sides.
    pub fn contains(&self, price: f64, tolerance_pct: f64) -> bool {
        let tolerance = self.height() * tolerance_pct;
        self.low - tolerance <= price && price <= self.high + tolerance
    }
}

/// Per-bar detector output.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrderBlockRow {
    pub bullish_ob: bool,
    pub bearish_ob: bool,
    pub ob_low: Option<f64>,
    pub ob_high: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderBlockParams {
    pub impulse_bars: usize,
    pub min_body_ratio: f64,
    pub lookback: usize,
}

impl Default for OrderBlockParams {
    fn default() -> Self {
        Self {
            impulse_bars: 3,
            min_body_ratio: 0.3,
            lookback: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBlockSeries {
    pub impulse_bars: usize,
    pub rows: Vec<OrderBlockRow>,
}

impl OrderBlockSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The order block originating at `index`, if any.
    pub fn block_at(&self, index: usize) -> Option<OrderBlock> {
        let row = self.rows.get(index)?;
        let direction = if row.bullish_ob {
            OrderBlockDirection::Bullish
        } else if row.bearish_ob {
            OrderBlockDirection::Bearish
        } else {
            return None;
        };
        Some(OrderBlock {
            origin_index: index,
            confirmed_index: index.saturating_add(self.impulse_bars),
            direction,
            low: row.ob_low?,
            high: row.ob_high?,
        })
    }

    pub fn blocks(&self) -> Vec<OrderBlock> {
        (0..self.rows.len()).filter_map(|i| self.block_at(i)).collect()
    }
}

pub fn detect_order_blocks(
    bars: &[OhlcvBar],
    fractals: &FractalSeries,
    params: &OrderBlockParams,
) -> OrderBlockSeries {
    let n = bars.len();
    let levels = RollingFractalLevels::compute(fractals, params.lookback);
    let mut rows = vec![OrderBlockRow::default(); n];

    for i in 0..n.saturating_sub(params.impulse_bars) {
        let bar = &bars[i];
        let qualifies = bar
            .body_ratio()
            .is_some_and(|ratio| ratio >= params.min_body_ratio);
        if !qualifies {
            continue;
        }

        let impulse = &bars[i + 1..=i + params.impulse_bars];
        if impulse.is_empty() {
            continue;
        }

        let row = &mut rows[i];
        if bar.is_bearish() {
            if let Some(level) = levels.high[i] {
                row.bullish_ob = impulse.iter().any(|b| b.close > level);
            }
        } else if bar.is_bullish() {
            if let Some(level) = levels.low[i] {
                row.bearish_ob = impulse.iter().any(|b| b.close < level);
            }
        }

        if row.bullish_ob || row.bearish_ob {
            row.ob_low = Some(bar.low);
            row.ob_high = Some(bar.high);
        }
    }

    OrderBlockSeries {
        impulse_bars: params.impulse_bars,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fractal::detect_fractals;
    use chrono::NaiveDate;

    fn bar(i: usize, open: f64, high: f64, low: f64, close: f64) -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    /// High fractal of 15 at bar 2 (published at 4), a down candle at 5 and an
    /// impulse closing above 15 at 7.
    fn bullish_setup() -> Vec<OhlcvBar> {
        vec![
            bar(0, 10.0, 11.0, 9.0, 10.5),
            bar(1, 10.5, 12.0, 10.0, 11.5),
            bar(2, 11.5, 15.0, 11.0, 14.0),
            bar(3, 14.0, 14.5, 12.0, 12.5),
            bar(4, 12.5, 13.0, 11.5, 12.0),
            bar(5, 13.0, 13.2, 11.8, 12.0),
            bar(6, 12.0, 14.0, 11.9, 13.8),
            bar(7, 13.8, 16.0, 13.5, 15.5),
            bar(8, 15.5, 16.5, 15.0, 16.0),
        ]
    }

    #[test]
    fn last_down_candle_before_impulse_is_bullish_block() {
        let bars = bullish_setup();
        let fr = detect_fractals(&bars, 2, 2);
        let obs = detect_order_blocks(&bars, &fr, &OrderBlockParams::default());

        let row = obs.rows[5];
        assert!(row.bullish_ob);
        assert!(!row.bearish_ob);
        assert_eq!(row.ob_low, Some(11.8));
        assert_eq!(row.ob_high, Some(13.2));

        let block = obs.block_at(5).unwrap();
        assert_eq!(block.direction, OrderBlockDirection::Bullish);
        assert_eq!(block.confirmed_index, 8);
    }

    #[test]
    fn no_block_before_level_is_published() {
        let bars = bullish_setup();
        let fr = detect_fractals(&bars, 2, 2);
        let obs = detect_order_blocks(&bars, &fr, &OrderBlockParams::default());
        // bar 3 is a down candle but the fractal is only published at bar 4
        assert!(!obs.rows[3].bullish_ob);
    }

    #[test]
    fn small_body_does_not_qualify() {
        let mut bars = bullish_setup();
        bars[5] = bar(5, 12.1, 13.2, 11.8, 12.0);
        let fr = detect_fractals(&bars, 2, 2);
        let obs = detect_order_blocks(&bars, &fr, &OrderBlockParams::default());
        assert!(!obs.rows[5].bullish_ob);
    }

    #[test]
    fn zero_range_bar_does_not_qualify() {
        let mut bars = bullish_setup();
        bars[5] = bar(5, 12.0, 12.0, 12.0, 12.0);
        let fr = detect_fractals(&bars, 2, 2);
        let obs = detect_order_blocks(&bars, &fr, &OrderBlockParams::default());
        assert!(obs.block_at(5).is_none());
    }

    #[test]
    fn last_impulse_bars_cannot_be_origins() {
        let bars = bullish_setup();
        let fr = detect_fractals(&bars, 2, 2);
        let obs = detect_order_blocks(&bars, &fr, &OrderBlockParams::default());
        assert_eq!(obs.len(), bars.len());
        for row in &obs.rows[bars.len() - 3..] {
            assert_eq!(*row, OrderBlockRow::default());
        }
    }

    #[test]
    fn oversized_impulse_window() {
        let bars = bullish_setup();
        let fr = detect_fractals(&bars, 2, 2);
        let params = OrderBlockParams {
            impulse_bars: usize::MAX,
            ..OrderBlockParams::default()
        };
        let obs = detect_order_blocks(&bars, &fr, &params);
        assert!(obs.blocks().is_empty());

        let mut rows = vec![OrderBlockRow::default(); 3];
        rows[2] = OrderBlockRow {
            bullish_ob: true,
            bearish_ob: false,
            ob_low: Some(1.0),
            ob_high: Some(2.0),
        };
        let obs = OrderBlockSeries {
            impulse_bars: usize::MAX,
            rows,
        };
        assert_eq!(obs.block_at(2).unwrap().confirmed_index, usize::MAX);
    }

    #[test]
    fn bearish_block_on_break_below_fractal_low() {
        let bars = vec![
            bar(0, 20.0, 21.0, 19.0, 19.5),
            bar(1, 19.5, 20.0, 18.0, 18.5),
            bar(2, 18.5, 19.0, 15.0, 16.0),
            bar(3, 16.0, 18.0, 15.8, 17.5),
            bar(4, 17.5, 18.5, 17.0, 18.0),
            bar(5, 17.0, 18.2, 16.8, 18.0),
            bar(6, 18.0, 18.1, 15.5, 15.8),
            bar(7, 15.8, 16.0, 14.0, 14.5),
            bar(8, 14.5, 15.0, 13.0, 13.5),
        ];
        let fr = detect_fractals(&bars, 2, 2);
        assert!(fr.is_low_fractal[2]);

        let obs = detect_order_blocks(&bars, &fr, &OrderBlockParams::default());
        let block = obs.block_at(5).unwrap();
        assert_eq!(block.direction, OrderBlockDirection::Bearish);
        assert_eq!((block.low, block.high), (16.8, 18.2));
    }

    #[test]
    fn zone_contains_with_tolerance() {
        let block = OrderBlock {
            origin_index: 0,
            confirmed_index: 3,
            direction: OrderBlockDirection::Bullish,
            low: 100.0,
            high: 110.0,
        };
        assert!(block.contains(105.0, 0.02));
        assert!(block.contains(110.2, 0.02));
        assert!(block.contains(99.8, 0.02));
        assert!(!block.contains(110.3, 0.02));
        assert!(!block.contains(99.7, 0.02));
    }
}
