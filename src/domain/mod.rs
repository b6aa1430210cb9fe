//! Signal pipeline: pure functions from a bar series to trades and summaries.

pub mod batch;
pub mod config_validation;
pub mod error;
pub mod fractal;
pub mod indicator;
pub mod ohlcv;
pub mod order_block;
pub mod pipeline;
pub mod rolling;
pub mod signal;
pub mod strategy;
pub mod summary;
pub mod trade;
