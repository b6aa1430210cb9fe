//! Trend and volatility indicators.
//!
//! - `IndicatorType`: indicator identity + period
//! - `IndicatorPoint`: the per-bar `{ema, atr}` pair
//! - `IndicatorSeries`: points aligned 1:1 with the input bars

pub mod atr;
pub mod ema;

use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Atr(usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub ema: f64,
    pub atr: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub ema_type: IndicatorType,
    pub atr_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn compute(bars: &[OhlcvBar], ema_period: usize, atr_period: usize) -> Self {
        let ema = ema::calculate_ema(bars, ema_period);
        let atr = atr::calculate_atr(bars, atr_period);

        let values = bars
            .iter()
            .zip(ema)
            .zip(atr)
            .map(|((bar, ema), atr)| IndicatorPoint {
                date: bar.date,
                ema,
                atr,
            })
            .collect();

        Self {
            ema_type: IndicatorType::Ema(ema_period),
            atr_type: IndicatorType::Atr(atr_period),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn ema(&self, index: usize) -> f64 {
        self.values[index].ema
    }

    pub fn atr(&self, index: usize) -> f64 {
        self.values[index].atr
    }
}
