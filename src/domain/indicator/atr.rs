//! Average True Range volatility measure.
//!
//! TR[0] = high - low, TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|).
//! ATR is the exponential smoothing of TR with alpha = 1/n, seeded with TR[0].

use crate::domain::ohlcv::OhlcvBar;

pub fn true_ranges(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.range()
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> Vec<f64> {
    let alpha = 1.0 / period.max(1) as f64;
    let mut values = Vec::with_capacity(bars.len());
    let mut atr = 0.0;

    for (i, tr) in true_ranges(bars).into_iter().enumerate() {
        atr = if i == 0 { tr } else { tr * alpha + atr * (1.0 - alpha) };
        values.push(atr);
    }

    values
}
