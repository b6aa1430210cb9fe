//! Batch driver: runs one strategy over every cached symbol.
//!
//! Each (group, symbol) pair is an independent pipeline run, executed on the
//! rayon pool. A failure in one symbol is recorded in its result and never
//! aborts the batch.

use crate::domain::error::FractalTraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::pipeline::{run_pipeline, PipelineParams};
use crate::domain::strategy::Strategy;
use crate::domain::summary::{equity_curve, Summary};
use crate::domain::trade::Trade;
use crate::ports::data_port::DataPort;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Generic table stored alongside per-symbol series in the cache; not a symbol.
pub const GENERIC_TABLE: &str = "daily_prices";

/// group (stocks, forex, ...) → symbol → bars
pub type MarketData = BTreeMap<String, BTreeMap<String, Vec<OhlcvBar>>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolResult {
    pub symbol: String,
    pub strategy: String,
    pub summary: Summary,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SymbolResult {
    pub fn failed(symbol: &str, strategy: &str, err: &FractalTraderError) -> Self {
        Self {
            symbol: symbol.to_string(),
            strategy: strategy.to_string(),
            summary: Summary::default(),
            trades: Vec::new(),
            equity_curve: Vec::new(),
            error: Some(err.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub strategy: String,
    pub results: BTreeMap<String, BTreeMap<String, SymbolResult>>,
}

impl BatchReport {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SymbolResult)> {
        self.results
            .iter()
            .flat_map(|(group, symbols)| symbols.values().map(move |r| (group.as_str(), r)))
    }

    pub fn failures(&self) -> usize {
        self.iter().filter(|(_, r)| !r.is_ok()).count()
    }
}

pub fn run_symbol(
    symbol: &str,
    bars: &[OhlcvBar],
    strategy_name: &str,
    params: &PipelineParams,
) -> SymbolResult {
    let strategy: Strategy = match strategy_name.parse() {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(symbol, strategy = strategy_name, "{e}");
            return SymbolResult::failed(symbol, strategy_name, &e);
        }
    };

    let result = run_pipeline(bars, strategy, params);
    tracing::debug!(
        symbol,
        %strategy,
        bars = bars.len(),
        signals = result.signals.len(),
        "pipeline complete"
    );

    SymbolResult {
        symbol: symbol.to_string(),
        strategy: strategy.name().to_string(),
        summary: result.summary.rounded(),
        equity_curve: equity_curve(&result.trades),
        trades: result.trades,
        error: None,
    }
}

/// Runs `strategy_name` over every symbol `data` provides, in parallel.
/// Only listing failures are returned as errors; a symbol whose series cannot
/// be fetched is reported in its own result.
pub fn run_batch(
    data: &dyn DataPort,
    strategy_name: &str,
    params: &PipelineParams,
) -> Result<BatchReport, FractalTraderError> {
    // aliases are reported under the canonical name; unknown names as typed
    let canonical = strategy_name
        .parse::<Strategy>()
        .map(|s| s.name().to_string())
        .unwrap_or_else(|_| strategy_name.to_string());

    let groups = data.list_groups()?;
    let mut jobs: Vec<(&str, String)> = Vec::new();
    for group in &groups {
        for symbol in data.list_symbols(group)? {
            if symbol != GENERIC_TABLE {
                jobs.push((group.as_str(), symbol));
            }
        }
    }

    tracing::info!(strategy = %canonical, symbols = jobs.len(), "running batch");

    let finished: Vec<(&str, SymbolResult)> = jobs
        .par_iter()
        .map(|(group, symbol)| {
            let result = match data.fetch_ohlcv(group, symbol) {
                Ok(bars) => run_symbol(symbol, &bars, strategy_name, params),
                Err(e) => {
                    tracing::warn!(group, symbol, "failed to load series: {e}");
                    SymbolResult::failed(symbol, &canonical, &e)
                }
            };
            (*group, result)
        })
        .collect();

    let mut results: BTreeMap<String, BTreeMap<String, SymbolResult>> = groups
        .iter()
        .map(|group| (group.clone(), BTreeMap::new()))
        .collect();
    for (group, result) in finished {
        if let Some(symbols) = results.get_mut(group) {
            symbols.insert(result.symbol.clone(), result);
        }
    }

    Ok(BatchReport {
        strategy: canonical,
        results,
    })
}
