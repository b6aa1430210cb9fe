//! Entry signal generation.
//!
//! A signal at bar `i` is decided from bar `i-1`'s close, EMA and breakout
//! level, and is entered at bar `i`'s open. Bar `i`'s high, low and close are
//! never read.

use crate::domain::fractal::RollingFractalLevels;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::order_block::{OrderBlockDirection, OrderBlockSeries};
use crate::domain::strategy::Strategy;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SignalKind {
    Bullish,
    Bearish,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Bullish => write!(f, "Bullish"),
            SignalKind::Bearish => write!(f, "Bearish"),
        }
    }
}

impl From<OrderBlockDirection> for SignalKind {
    fn from(direction: OrderBlockDirection) -> Self {
        match direction {
            OrderBlockDirection::Bullish => SignalKind::Bullish,
            OrderBlockDirection::Bearish => SignalKind::Bearish,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub date: NaiveDate,
    pub entry_price: f64,
    pub fractal_level: f64,
    pub ema_level: f64,
    pub atr: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalParams {
    pub strategy: Strategy,
    /// Zone widening, as a fraction of the zone height.
    pub ob_tolerance_pct: f64,
    /// How many bars back (inclusive of the signal bar) to look for zones.
    pub ob_recent_bars: usize,
    /// Only use order blocks whose confirmation window closed before the
    /// signal bar.
    pub strict_causality: bool,
}

impl SignalParams {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ob_tolerance_pct: 0.02,
            ob_recent_bars: 10,
            strict_causality: false,
        }
    }
}

pub fn generate_signals(
    bars: &[OhlcvBar],
    indicators: &IndicatorSeries,
    levels: &RollingFractalLevels,
    order_blocks: Option<&OrderBlockSeries>,
    params: &SignalParams,
) -> Vec<Signal> {
    let mut signals = Vec::new();
    let n = bars.len().min(indicators.len());

    for i in 1..n {
        let prev_close = bars[i - 1].close;
        let ema = indicators.ema(i - 1);
        let entry_price = bars[i].open;

        let zone = if params.strategy.uses_order_blocks() {
            order_blocks.and_then(|obs| nearby_order_block(obs, i, entry_price, params))
        } else {
            None
        };
        let admits = |kind: SignalKind| !params.strategy.uses_order_blocks() || zone == Some(kind);

        // bullish is checked first; at most one signal per bar
        let breakout = levels.high[i - 1]
            .filter(|&level| prev_close > ema && prev_close > level)
            .filter(|_| admits(SignalKind::Bullish))
            .map(|level| (SignalKind::Bullish, level))
            .or_else(|| {
                levels.low[i - 1]
                    .filter(|&level| prev_close < ema && prev_close < level)
                    .filter(|_| admits(SignalKind::Bearish))
                    .map(|level| (SignalKind::Bearish, level))
            });

        if let Some((kind, fractal_level)) = breakout {
            signals.push(Signal {
                kind,
                date: bars[i].date,
                entry_price,
                fractal_level,
                ema_level: ema,
                atr: indicators.atr(i - 1),
            });
        }
    }

    signals
}

/// Direction of the most recent order block among the last
/// `ob_recent_bars` rows up to and including `index` whose zone contains
/// `price`.
pub fn nearby_order_block(
    order_blocks: &OrderBlockSeries,
    index: usize,
    price: f64,
    params: &SignalParams,
) -> Option<SignalKind> {
    let start = (index + 1).saturating_sub(params.ob_recent_bars);
    (start..=index)
        .rev()
        .filter_map(|j| order_blocks.block_at(j))
        .filter(|block| !params.strict_causality || block.confirmed_index < index)
        .find(|block| block.contains(price, params.ob_tolerance_pct))
        .map(|block| block.direction.into())
}
