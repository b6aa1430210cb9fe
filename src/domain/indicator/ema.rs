//! Exponential Moving Average trend filter.
//!
//! alpha = 2/(n+1), seeded with the first close, then
//! EMA[i] = C[i]*alpha + EMA[i-1]*(1-alpha). No warmup: every bar has a value.

use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> Vec<f64> {
    let alpha = 2.0 / (period.max(1) as f64 + 1.0);
    let mut values = Vec::with_capacity(bars.len());
    let mut ema = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        ema = if i == 0 {
            bar.close
        } else {
            bar.close * alpha + ema * (1.0 - alpha)
        };
        values.push(ema);
    }

    values
}
