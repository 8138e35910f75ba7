//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::console_report_adapter::ConsoleReportAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_chart_adapter::SvgChartAdapter;
use crate::domain::backtest::{
    self as backtest_engine, BacktestConfig, BacktestResult, DEFAULT_FAST_WINDOW,
    DEFAULT_INITIAL_CAPITAL, DEFAULT_SLOW_WINDOW, DEFAULT_SYMBOL,
};
use crate::domain::config_validation::{parse_date, validate_backtest_config};
use crate::domain::error::SmacrossError;
use crate::domain::metrics::CagrBase;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "smacross", about = "Moving-average crossover backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the crossover backtest and print its metrics
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Instrument to load instead of [backtest] symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Directory holding <SYMBOL>.csv files
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        fast: Option<usize>,
        #[arg(long)]
        slow: Option<usize>,
        /// Write an SVG chart to this path
        #[arg(long)]
        chart: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the date range available for a symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

/// Command-line values that replace config file settings.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub symbol: Option<String>,
    pub fast_window: Option<usize>,
    pub slow_window: Option<usize>,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            symbol,
            data_dir,
            fast,
            slow,
            chart,
            dry_run,
        } => {
            let overrides = Overrides {
                symbol,
                fast_window: fast,
                slow_window: slow,
            };
            run_backtest(&config, &overrides, data_dir, chart, dry_run)
        }
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SmacrossError> {
    tracing::info!("loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

fn run_backtest(
    config_path: &Path,
    overrides: &Overrides,
    data_dir: Option<PathBuf>,
    chart: Option<PathBuf>,
    dry_run: bool,
) -> Result<(), SmacrossError> {
    // Stage 1: Load and validate config
    let adapter = load_config(config_path)?;
    validate_backtest_config(&adapter)?;

    // Stage 2: Resolve parameters
    let mut bt_config = build_backtest_config(&adapter)?;
    apply_overrides(&mut bt_config, overrides)?;
    let data_dir = data_dir.unwrap_or_else(|| resolve_data_dir(&adapter));
    let chart_path = chart.or_else(|| resolve_chart_path(&adapter));

    if dry_run {
        log_config(&bt_config, &data_dir, chart_path.as_deref());
        tracing::info!("dry run complete: configuration is valid");
        return Ok(());
    }

    // Stage 3: Fetch, run, report
    let data_port = CsvAdapter::new(data_dir);
    let console = ConsoleReportAdapter::new();
    let chart_adapter = chart_path.map(SvgChartAdapter::new);

    let mut reports: Vec<&dyn ReportPort> = vec![&console];
    if let Some(ref c) = chart_adapter {
        reports.push(c);
    }

    run_backtest_pipeline(&data_port, &bt_config, &reports)?;
    Ok(())
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, SmacrossError> {
    let start_date = parse_date(
        adapter.get_string("backtest", "start_date").as_deref(),
        "start_date",
    )?;
    let end_date = parse_date(
        adapter.get_string("backtest", "end_date").as_deref(),
        "end_date",
    )?;

    let cagr_base = match adapter.get_string("backtest", "cagr_base") {
        Some(raw) => raw
            .parse::<CagrBase>()
            .map_err(|reason| SmacrossError::ConfigInvalid {
                section: "backtest".into(),
                key: "cagr_base".into(),
                reason,
            })?,
        None => CagrBase::default(),
    };

    Ok(BacktestConfig {
        symbol: configured_symbol(adapter),
        start_date,
        end_date,
        fast_window: window(adapter, "fast_window", DEFAULT_FAST_WINDOW)?,
        slow_window: window(adapter, "slow_window", DEFAULT_SLOW_WINDOW)?,
        initial_capital: adapter.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL),
        cagr_base,
    })
}

fn window(adapter: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, SmacrossError> {
    let value = adapter.get_int("strategy", key, default as i64);
    match usize::try_from(value) {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(SmacrossError::ConfigInvalid {
            section: "strategy".into(),
            key: key.into(),
            reason: format!("{key} must be at least 1, got {value}"),
        }),
    }
}

/// `[backtest] symbol`, trimmed, or the default when absent or blank.
pub fn configured_symbol(adapter: &dyn ConfigPort) -> String {
    adapter
        .get_string("backtest", "symbol")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SYMBOL.to_string())
}

pub fn apply_overrides(
    config: &mut BacktestConfig,
    overrides: &Overrides,
) -> Result<(), SmacrossError> {
    if let Some(symbol) = overrides.symbol.as_deref().map(str::trim) {
        if symbol.is_empty() {
            return Err(SmacrossError::ConfigInvalid {
                section: "backtest".into(),
                key: "symbol".into(),
                reason: "symbol must not be empty".into(),
            });
        }
        config.symbol = symbol.to_string();
    }

    for (key, value, slot) in [
        ("fast_window", overrides.fast_window, &mut config.fast_window),
        ("slow_window", overrides.slow_window, &mut config.slow_window),
    ] {
        if let Some(n) = value {
            if n == 0 {
                return Err(SmacrossError::ConfigInvalid {
                    section: "strategy".into(),
                    key: key.into(),
                    reason: format!("{key} must be at least 1"),
                });
            }
            *slot = n;
        }
    }
    Ok(())
}

pub fn resolve_data_dir(config: &dyn ConfigPort) -> PathBuf {
    config
        .get_string("data", "csv_dir")
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

pub fn resolve_chart_path(config: &dyn ConfigPort) -> Option<PathBuf> {
    config
        .get_string("report", "chart_path")
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

fn log_config(config: &BacktestConfig, data_dir: &Path, chart: Option<&Path>) {
    tracing::info!("  symbol:          {}", config.symbol);
    tracing::info!("  range:           {} to {} (exclusive)", config.start_date, config.end_date);
    tracing::info!("  fast/slow:       {}/{}", config.fast_window, config.slow_window);
    tracing::info!("  initial capital: {}", config.initial_capital);
    tracing::info!("  cagr base:       {}", config.cagr_base);
    tracing::info!("  data dir:        {}", data_dir.display());
    match chart {
        Some(path) => tracing::info!("  chart:           {}", path.display()),
        None => tracing::info!("  chart:           none"),
    }
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    config: &BacktestConfig,
    reports: &[&dyn ReportPort],
) -> Result<BacktestResult, SmacrossError> {
    if config.fast_window >= config.slow_window {
        tracing::warn!(
            "fast_window {} is not shorter than slow_window {}; the strategy will rarely or never invest",
            config.fast_window,
            config.slow_window
        );
    }

    tracing::info!(
        "fetching {} from {} to {}",
        config.symbol,
        config.start_date,
        config.end_date
    );
    let series = data_port.fetch_closes(&config.symbol, config.start_date, config.end_date)?;
    tracing::info!("loaded {} price points", series.len());
    if !series.is_empty() && series.len() < config.slow_window {
        tracing::warn!(
            "only {} points for a {}-day slow average; no position can be taken",
            series.len(),
            config.slow_window
        );
    }

    let result = backtest_engine::run_backtest(&series, config)?;

    if result.events.is_empty() {
        tracing::warn!("no crossovers in the selected window");
    }
    tracing::info!(
        "{} buys, {} sells, final total {:.2}",
        result.events.buys.len(),
        result.events.sells.len(),
        result.final_row().map(|r| r.total).unwrap_or(config.initial_capital)
    );

    for report in reports {
        report.write(&result, config)?;
    }
    Ok(result)
}

fn run_validate(config_path: &Path) -> Result<(), SmacrossError> {
    let adapter = load_config(config_path)?;
    validate_backtest_config(&adapter)?;
    let config = build_backtest_config(&adapter)?;
    if config.fast_window >= config.slow_window {
        tracing::warn!(
            "fast_window {} is not shorter than slow_window {}",
            config.fast_window,
            config.slow_window
        );
    }
    tracing::info!("configuration is valid");
    Ok(())
}

fn run_info(config_path: &Path, symbol: Option<&str>) -> Result<(), SmacrossError> {
    let adapter = load_config(config_path)?;
    let symbol = symbol
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| configured_symbol(&adapter));

    let data_port = CsvAdapter::new(resolve_data_dir(&adapter));
    match data_port.get_data_range(&symbol)? {
        Some((first, last, count)) => {
            println!("{}: {} points, {} to {}", symbol, count, first, last);
        }
        None => tracing::warn!("{}: no data found", symbol),
    }
    Ok(())
}
