//! fractaltrader: fractal and order-block signal backtester.
//!
//! Hexagonal architecture: the signal pipeline lives in [`domain`], port traits
//! in [`ports`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
