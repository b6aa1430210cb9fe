//! Configuration validation.
//!
//! Reads the `[pipeline]` and `[backtest]` sections through `ConfigPort`,
//! falling back to defaults for absent keys and rejecting values the
//! pipeline cannot run with.

use crate::domain::error::FractalTraderError;
use crate::domain::pipeline::PipelineParams;
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use std::str::FromStr;

const PIPELINE: &str = "pipeline";
const BACKTEST: &str = "backtest";

pub const DEFAULT_OUTPUT_DIR: &str = "cache";

pub fn validate_pipeline_config(config: &dyn ConfigPort) -> Result<(), FractalTraderError> {
    build_pipeline_params(config).map(|_| ())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), FractalTraderError> {
    for name in strategy_names(config) {
        name.parse::<Strategy>()?;
    }
    if let Some(dir) = config.get_string(BACKTEST, "output_dir") {
        if dir.trim().is_empty() {
            return Err(invalid(BACKTEST, "output_dir", "output_dir must not be empty"));
        }
    }
    Ok(())
}

/// Pipeline parameters from `[pipeline]`, defaulting every absent key.
pub fn build_pipeline_params(
    config: &dyn ConfigPort,
) -> Result<PipelineParams, FractalTraderError> {
    let defaults = PipelineParams::default();

    let params = PipelineParams {
        left_bars: read(config, "left_bars", defaults.left_bars)?,
        right_bars: read(config, "right_bars", defaults.right_bars)?,
        lookback: read(config, "lookback", defaults.lookback)?,
        ema_period: read(config, "ema_period", defaults.ema_period)?,
        atr_period: read(config, "atr_period", defaults.atr_period)?,
        impulse_bars: read(config, "impulse_bars", defaults.impulse_bars)?,
        min_body_ratio: read(config, "min_body_ratio", defaults.min_body_ratio)?,
        ob_tolerance_pct: read(config, "ob_tolerance_pct", defaults.ob_tolerance_pct)?,
        ob_recent_bars: read(config, "ob_recent_bars", defaults.ob_recent_bars)?,
        atr_mult_stop: read(config, "atr_mult_stop", defaults.atr_mult_stop)?,
        strict_causality: read_flag(config, "strict_causality", defaults.strict_causality)?,
    };

    validate_periods(&params)?;
    validate_ratios(&params)?;
    Ok(params)
}

/// Strategy names from `[backtest] strategies`, or every known strategy.
/// Names are not parsed here; unknown ones surface per symbol.
pub fn strategy_names(config: &dyn ConfigPort) -> Vec<String> {
    let names = config.get_list(BACKTEST, "strategies");

    if names.is_empty() {
        Strategy::ALL.iter().map(|s| s.name().to_string()).collect()
    } else {
        names
    }
}

pub fn data_path(config: &dyn ConfigPort) -> Option<String> {
    config
        .get_string(BACKTEST, "data_path")
        .filter(|s| !s.trim().is_empty())
}

pub fn output_dir(config: &dyn ConfigPort) -> String {
    config
        .get_string(BACKTEST, "output_dir")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string())
}

fn read<T: FromStr>(
    config: &dyn ConfigPort,
    key: &str,
    default: T,
) -> Result<T, FractalTraderError> {
    match config.get_string(PIPELINE, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid(PIPELINE, key, &format!("cannot parse '{raw}'"))),
    }
}

/// Accepts true/yes/on/1 and false/no/off/0, case-insensitively.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn read_flag(
    config: &dyn ConfigPort,
    key: &str,
    default: bool,
) -> Result<bool, FractalTraderError> {
    match config.get_string(PIPELINE, key) {
        None => Ok(default),
        Some(raw) => parse_bool(&raw).ok_or_else(|| {
            invalid(PIPELINE, key, &format!("cannot parse '{raw}' as true or false"))
        }),
    }
}

fn validate_periods(params: &PipelineParams) -> Result<(), FractalTraderError> {
    let periods = [
        ("lookback", params.lookback),
        ("ema_period", params.ema_period),
        ("atr_period", params.atr_period),
        ("impulse_bars", params.impulse_bars),
        ("ob_recent_bars", params.ob_recent_bars),
    ];
    for (key, value) in periods {
        if value == 0 {
            return Err(invalid(PIPELINE, key, &format!("{key} must be at least 1")));
        }
    }
    Ok(())
}

fn validate_ratios(params: &PipelineParams) -> Result<(), FractalTraderError> {
    if !(0.0..=1.0).contains(&params.min_body_ratio) {
        return Err(invalid(
            PIPELINE,
            "min_body_ratio",
            "min_body_ratio must be between 0 and 1",
        ));
    }
    if params.ob_tolerance_pct < 0.0 || params.ob_tolerance_pct.is_nan() {
        return Err(invalid(
            PIPELINE,
            "ob_tolerance_pct",
            "ob_tolerance_pct must be non-negative",
        ));
    }
    if params.atr_mult_stop <= 0.0 || params.atr_mult_stop.is_nan() {
        return Err(invalid(
            PIPELINE,
            "atr_mult_stop",
            "atr_mult_stop must be positive",
        ));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> FractalTraderError {
    FractalTraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
