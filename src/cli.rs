//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_cache_adapter::JsonCacheAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::batch::{run_batch, SymbolResult, GENERIC_TABLE};
use crate::domain::config_validation::{self, build_pipeline_params, validate_backtest_config};
use crate::domain::error::FractalTraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::pipeline::{run_pipeline, PipelineParams};
use crate::domain::signal::Signal;
use crate::domain::strategy::Strategy;
use crate::domain::trade::Trade;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "fractaltrader",
    about = "Fractal breakout and order-block signal backtester"
)]
pub struct Cli {
    /// Debug-level diagnostics on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run strategies over every cached symbol and write results JSON
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// market_data.json cache or a directory of per-symbol CSV files
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Strategy name; repeatable. Defaults to the config list or all.
        #[arg(short, long)]
        strategy: Vec<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the signals (or simulated trades) for one symbol as CSV
    Signals {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(short, long, default_value = "fractal_refined_strategy")]
        strategy: String,
        #[arg(long)]
        trades: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show groups, symbols and date ranges of a data source
    Info {
        #[arg(short, long)]
        data: PathBuf,
    },
}

pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: logging already initialised");
    }
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            strategy,
            output,
        } => run_backtest(config.as_ref(), data.as_ref(), &strategy, output.as_ref()),
        Command::Signals {
            config,
            data,
            symbol,
            strategy,
            trades,
        } => run_signals(config.as_ref(), &data, &symbol, &strategy, trades),
        Command::Validate { config } => run_validate(&config),
        Command::Info { data } => run_info(&data),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// A `.json` path is a market data cache; anything else is a CSV directory.
pub fn open_data_port(path: &Path) -> Result<Box<dyn DataPort>, FractalTraderError> {
    if path.extension().is_some_and(|ext| ext == "json") {
        Ok(Box::new(JsonCacheAdapter::from_file(path)?))
    } else if path.is_dir() {
        Ok(Box::new(CsvAdapter::new(path.to_path_buf())))
    } else {
        Err(FractalTraderError::Data {
            reason: format!(
                "{} is neither a .json cache nor a directory",
                path.display()
            ),
        })
    }
}

/// CLI names win over the config list; with neither, every strategy runs.
pub fn resolve_strategies(
    overrides: &[String],
    config: Option<&dyn ConfigPort>,
) -> Vec<String> {
    if !overrides.is_empty() {
        return overrides.to_vec();
    }
    match config {
        Some(c) => config_validation::strategy_names(c),
        None => Strategy::ALL.iter().map(|s| s.name().to_string()).collect(),
    }
}

pub fn format_result_line(result: &SymbolResult) -> String {
    match &result.error {
        Some(err) => format!("{}: error: {}", result.symbol, err),
        None => format!(
            "{}: {} trades, {:.2}R avg, {:.1}% win rate",
            result.symbol,
            result.summary.num_trades,
            result.summary.avg_outcome_r,
            result.summary.win_rate_pos_r * 100.0
        ),
    }
}

fn params_from(config: Option<&FileConfigAdapter>) -> Result<PipelineParams, ExitCode> {
    match config {
        Some(c) => build_pipeline_params(c).map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }),
        None => Ok(PipelineParams::default()),
    }
}

fn run_backtest(
    config_path: Option<&PathBuf>,
    data_override: Option<&PathBuf>,
    strategy_overrides: &[String],
    output_override: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Load and validate config
    let config = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            match load_config(path) {
                Ok(c) => Some(c),
                Err(code) => return code,
            }
        }
        None => None,
    };
    let params = match params_from(config.as_ref()) {
        Ok(p) => p,
        Err(code) => return code,
    };

    // Stage 2: Resolve data source, strategies and output directory
    let data_path = match data_override.cloned().or_else(|| {
        config
            .as_ref()
            .and_then(|c| config_validation::data_path(c))
            .map(PathBuf::from)
    }) {
        Some(p) => p,
        None => {
            let err = FractalTraderError::ConfigMissing {
                section: "backtest".into(),
                key: "data_path".into(),
            };
            eprintln!("error: {err} (or pass --data)");
            return (&err).into();
        }
    };
    let strategies = resolve_strategies(
        strategy_overrides,
        config.as_ref().map(|c| c as &dyn ConfigPort),
    );
    let output_dir = output_override.cloned().unwrap_or_else(|| {
        PathBuf::from(
            config
                .as_ref()
                .map(|c| config_validation::output_dir(c))
                .unwrap_or_else(|| config_validation::DEFAULT_OUTPUT_DIR.to_string()),
        )
    });

    // Stage 3: Open data source
    eprintln!("Loading market data from {}", data_path.display());
    let data_port = match open_data_port(&data_path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    run_backtest_pipeline(
        data_port.as_ref(),
        &JsonReportAdapter::new(),
        &strategies,
        &params,
        &output_dir,
    )
}

/// Stages 4-5: one batch per strategy, progress lines on stderr, one results
/// file per strategy.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    strategies: &[String],
    params: &PipelineParams,
    output_dir: &Path,
) -> ExitCode {
    for strategy in strategies {
        eprintln!("=== {} ===", strategy);

        let report = match run_batch(data_port, strategy, params) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };

        for (group, symbols) in &report.results {
            eprintln!("{}:", group);
            for result in symbols.values() {
                eprintln!("  {}", format_result_line(result));
            }
        }

        match report_port.write(&report, output_dir) {
            Ok(path) => eprintln!("Results saved to {}", path.display()),
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        }

        let failures = report.failures();
        if failures > 0 {
            eprintln!("{} of {} symbols failed", failures, report.iter().count());
        }
    }

    ExitCode::SUCCESS
}

fn run_signals(
    config_path: Option<&PathBuf>,
    data_path: &Path,
    symbol: &str,
    strategy_name: &str,
    trades: bool,
) -> ExitCode {
    let config = match config_path.map(load_config).transpose() {
        Ok(c) => c,
        Err(code) => return code,
    };
    let params = match params_from(config.as_ref()) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let strategy: Strategy = match strategy_name.parse() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_port = match open_data_port(data_path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let bars = match load_symbol(data_port.as_ref(), symbol) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let result = run_pipeline(&bars, strategy, &params);
    eprintln!(
        "{} {}: {} bars, {} signals",
        symbol,
        strategy,
        bars.len(),
        result.signals.len()
    );

    let stdout = io::stdout();
    let written = if trades {
        write_trades_csv(stdout.lock(), &result.trades)
    } else {
        write_signals_csv(stdout.lock(), &result.signals)
    };
    match written {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Series for `symbol` from whichever group holds it. An empty series is
/// reported as missing data.
pub fn load_symbol(
    data_port: &dyn DataPort,
    symbol: &str,
) -> Result<Vec<OhlcvBar>, FractalTraderError> {
    let group = data_port
        .find_symbol(symbol)?
        .ok_or_else(|| FractalTraderError::NoData {
            symbol: symbol.to_string(),
        })?;
    let bars = data_port.fetch_ohlcv(&group, symbol)?;
    if bars.is_empty() {
        return Err(FractalTraderError::NoData {
            symbol: symbol.to_string(),
        });
    }
    Ok(bars)
}

pub fn write_signals_csv<W: Write>(
    writer: W,
    signals: &[Signal],
) -> Result<(), FractalTraderError> {
    write_csv(writer, signals)
}

pub fn write_trades_csv<W: Write>(
    writer: W,
    trades: &[Trade],
) -> Result<(), FractalTraderError> {
    write_csv(writer, trades)
}

fn write_csv<W: Write, T: serde::Serialize>(
    writer: W,
    rows: &[T],
) -> Result<(), FractalTraderError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row).map_err(|e| FractalTraderError::Data {
            reason: format!("CSV write error: {e}"),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    eprintln!("Config: {}", config_path.display());

    let params = match build_pipeline_params(&config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = validate_backtest_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    eprintln!("\nPipeline:");
    eprintln!(
        "  fractals: left={} right={} lookback={}",
        params.left_bars, params.right_bars, params.lookback
    );
    eprintln!(
        "  indicators: EMA({}) ATR({})",
        params.ema_period, params.atr_period
    );
    eprintln!(
        "  order blocks: impulse={} min_body_ratio={} tolerance={} recent={}",
        params.impulse_bars,
        params.min_body_ratio,
        params.ob_tolerance_pct,
        params.ob_recent_bars
    );
    eprintln!(
        "  stop: {}x ATR, strict_causality={}",
        params.atr_mult_stop, params.strict_causality
    );

    eprintln!("\nStrategies:");
    for name in config_validation::strategy_names(&config) {
        if let Ok(strategy) = name.parse::<Strategy>() {
            eprintln!("  {} (target {}R)", strategy, strategy.target_multiple());
        }
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_info(data_path: &Path) -> ExitCode {
    let data_port = match open_data_port(data_path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let groups = match data_port.list_groups() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for group in groups {
        let symbols = match data_port.list_symbols(&group) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error listing {}: {}", group, e);
                continue;
            }
        };
        for symbol in symbols.iter().filter(|s| s.as_str() != GENERIC_TABLE) {
            match data_port.fetch_ohlcv(&group, symbol) {
                Ok(bars) => match (bars.first(), bars.last()) {
                    (Some(first), Some(last)) => println!(
                        "{}/{}: {} bars, {} to {}",
                        group,
                        symbol,
                        bars.len(),
                        first.date,
                        last.date
                    ),
                    _ => eprintln!("{}/{}: no data found", group, symbol),
                },
                Err(e) => eprintln!("error reading {}/{}: {}", group, symbol, e),
            }
        }
    }
    ExitCode::SUCCESS
}
