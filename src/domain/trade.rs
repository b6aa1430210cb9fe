//! Trade simulation: fixed ATR stop, fixed R-multiple target.
//!
//! Exit search scans bars strictly after the entry bar. Within one bar the
//! stop is checked before the target, so a bar touching both is a loss.

use crate::domain::ohlcv::{bar_index, OhlcvBar};
use crate::domain::signal::{Signal, SignalKind};
use chrono::NaiveDate;
use serde::Serialize;

pub const LOSS_R: f64 = -1.0;
pub const UNRESOLVED_R: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub kind: SignalKind,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub stop_price: f64,
    #[serde(rename = "R")]
    pub risk: f64,
    #[serde(rename = "outcome_R")]
    pub outcome_r: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeParams {
    pub atr_mult_stop: f64,
    pub target_multiple: f64,
}

impl Default for TradeParams {
    fn default() -> Self {
        Self {
            atr_mult_stop: 2.0,
            target_multiple: 2.0,
        }
    }
}

pub fn stop_price(kind: SignalKind, entry_price: f64, atr: f64, atr_mult_stop: f64) -> f64 {
    match kind {
        SignalKind::Bullish => entry_price - atr_mult_stop * atr,
        SignalKind::Bearish => entry_price + atr_mult_stop * atr,
    }
}

pub fn simulate_trade(signal: &Signal, bars: &[OhlcvBar], params: &TradeParams) -> Trade {
    let stop = stop_price(signal.kind, signal.entry_price, signal.atr, params.atr_mult_stop);
    let risk = (signal.entry_price - stop).abs();
    let outcome_r = find_exit(
        bars,
        signal.date,
        signal.kind,
        signal.entry_price,
        stop,
        params.target_multiple,
    );

    Trade {
        kind: signal.kind,
        entry_date: signal.date,
        entry_price: signal.entry_price,
        stop_price: stop,
        risk,
        outcome_r,
    }
}

pub fn simulate_trades(
    signals: &[Signal],
    bars: &[OhlcvBar],
    params: &TradeParams,
) -> Vec<Trade> {
    signals
        .iter()
        .map(|signal| simulate_trade(signal, bars, params))
        .collect()
}

/// Outcome in R of a trade entered on `entry_date`: -1 when the stop is hit
/// first, `target_multiple` when the target is, 0 when neither happens before
/// the series ends or the entry date is not in `bars`.
pub fn find_exit(
    bars: &[OhlcvBar],
    entry_date: NaiveDate,
    kind: SignalKind,
    entry_price: f64,
    stop_price: f64,
    target_multiple: f64,
) -> f64 {
    let Some(entry_idx) = bar_index(bars, entry_date) else {
        tracing::debug!(%entry_date, "entry date not in series, scoring as unresolved");
        return UNRESOLVED_R;
    };

    let risk = (entry_price - stop_price).abs();

    for bar in &bars[entry_idx + 1..] {
        match kind {
            SignalKind::Bullish => {
                if bar.low <= stop_price {
                    return LOSS_R;
                }
                if bar.high >= entry_price + target_multiple * risk {
                    return target_multiple;
                }
            }
            SignalKind::Bearish => {
                if bar.high >= stop_price {
                    return LOSS_R;
                }
                if bar.low <= entry_price - target_multiple * risk {
                    return target_multiple;
                }
            }
        }
    }

    UNRESOLVED_R
}
