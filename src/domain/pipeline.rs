//! End-to-end pipeline: indicators → fractals → order blocks → signals →
//! trades → summary. Every stage is a pure function of the bars and params.

use crate::domain::fractal::{detect_fractals, RollingFractalLevels};
use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::order_block::{detect_order_blocks, OrderBlockParams};
use crate::domain::signal::{generate_signals, Signal, SignalParams};
use crate::domain::strategy::Strategy;
use crate::domain::summary::Summary;
use crate::domain::trade::{simulate_trades, Trade, TradeParams};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineParams {
    pub left_bars: usize,
    pub right_bars: usize,
    pub lookback: usize,
    pub ema_period: usize,
    pub atr_period: usize,
    pub impulse_bars: usize,
    pub min_body_ratio: f64,
    pub ob_tolerance_pct: f64,
    pub ob_recent_bars: usize,
    pub atr_mult_stop: f64,
    pub strict_causality: bool,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            left_bars: 2,
            right_bars: 2,
            lookback: 20,
            ema_period: 50,
            atr_period: 14,
            impulse_bars: 3,
            min_body_ratio: 0.3,
            ob_tolerance_pct: 0.02,
            ob_recent_bars: 10,
            atr_mult_stop: 2.0,
            strict_causality: false,
        }
    }
}

impl PipelineParams {
    pub fn order_block_params(&self) -> OrderBlockParams {
        OrderBlockParams {
            impulse_bars: self.impulse_bars,
            min_body_ratio: self.min_body_ratio,
            lookback: self.lookback,
        }
    }

    pub fn signal_params(&self, strategy: Strategy) -> SignalParams {
        SignalParams {
            strategy,
            ob_tolerance_pct: self.ob_tolerance_pct,
            ob_recent_bars: self.ob_recent_bars,
            strict_causality: self.strict_causality,
        }
    }

    pub fn trade_params(&self, strategy: Strategy) -> TradeParams {
        TradeParams {
            atr_mult_stop: self.atr_mult_stop,
            target_multiple: strategy.target_multiple(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub strategy: Strategy,
    pub signals: Vec<Signal>,
    pub trades: Vec<Trade>,
    pub summary: Summary,
}

pub fn detect_signals(
    bars: &[OhlcvBar],
    strategy: Strategy,
    params: &PipelineParams,
) -> Vec<Signal> {
    let indicators = IndicatorSeries::compute(bars, params.ema_period, params.atr_period);
    let fractals = detect_fractals(bars, params.left_bars, params.right_bars);
    let levels = RollingFractalLevels::compute(&fractals, params.lookback);

    let order_blocks = strategy
        .uses_order_blocks()
        .then(|| detect_order_blocks(bars, &fractals, &params.order_block_params()));

    tracing::debug!(
        bars = bars.len(),
        ema = %indicators.ema_type,
        atr = %indicators.atr_type,
        fractals = fractals.fractals(bars).len(),
        order_blocks = order_blocks.as_ref().map_or(0, |obs| obs.blocks().len()),
        "signal inputs"
    );

    generate_signals(
        bars,
        &indicators,
        &levels,
        order_blocks.as_ref(),
        &params.signal_params(strategy),
    )
}

pub fn run_pipeline(
    bars: &[OhlcvBar],
    strategy: Strategy,
    params: &PipelineParams,
) -> PipelineResult {
    let signals = detect_signals(bars, strategy, params);
    let trades = simulate_trades(&signals, bars, &params.trade_params(strategy));
    let summary = Summary::compute(&trades);

    PipelineResult {
        strategy,
        signals,
        trades,
        summary,
    }
}
