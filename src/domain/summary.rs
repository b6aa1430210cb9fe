//! Trade-set summary statistics.

use crate::domain::signal::SignalKind;
use crate::domain::trade::Trade;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub num_trades: usize,
    #[serde(rename = "avg_outcome_R")]
    pub avg_outcome_r: f64,
    #[serde(rename = "win_rate_pos_R")]
    pub win_rate_pos_r: f64,
    pub bullish_trades: usize,
    pub bearish_trades: usize,
}

impl Summary {
    /// Pure reduction over `trades`; an empty slice yields the zero summary.
    pub fn compute(trades: &[Trade]) -> Self {
        let mut total_r = 0.0_f64;
        let mut winners = 0usize;
        let mut bullish_trades = 0usize;
        let mut bearish_trades = 0usize;

        for trade in trades {
            total_r += trade.outcome_r;
            if trade.outcome_r > 0.0 {
                winners += 1;
            }
            match trade.kind {
                SignalKind::Bullish => bullish_trades += 1,
                SignalKind::Bearish => bearish_trades += 1,
            }
        }

        let num_trades = trades.len();
        if num_trades == 0 {
            return Self::default();
        }

        Summary {
            num_trades,
            avg_outcome_r: total_r / num_trades as f64,
            win_rate_pos_r: winners as f64 / num_trades as f64,
            bullish_trades,
            bearish_trades,
        }
    }

    /// Copy with ratios rounded to 3 decimals, as written to result files.
    pub fn rounded(&self) -> Self {
        Summary {
            avg_outcome_r: round3(self.avg_outcome_r),
            win_rate_pos_r: round3(self.win_rate_pos_r),
            ..self.clone()
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Running sum of `outcome_R` in trade order.
pub fn equity_curve(trades: &[Trade]) -> Vec<f64> {
    trades
        .iter()
        .scan(0.0, |acc, trade| {
            *acc += trade.outcome_r;
            Some(*acc)
        })
        .collect()
}
