//! Backtest configuration and the one-pass pipeline.
//!
//! prices → signals → (events, portfolio) → metrics

use chrono::NaiveDate;

use super::error::SmacrossError;
use super::events::{extract_events, TradeEvents};
use super::metrics::{CagrBase, PerformanceMetrics};
use super::portfolio::{simulate, PortfolioRow};
use super::price::PriceSeries;
use super::signal::{generate_signals, SignalRow};

pub const DEFAULT_SYMBOL: &str = "^IXIC";
pub const DEFAULT_FAST_WINDOW: usize = 20;
pub const DEFAULT_SLOW_WINDOW: usize = 100;
pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub symbol: String,
    /// Inclusive.
    pub start_date: NaiveDate,
    /// Exclusive.
    pub end_date: NaiveDate,
    pub fast_window: usize,
    pub slow_window: usize,
    pub initial_capital: f64,
    pub cagr_base: CagrBase,
}

impl BacktestConfig {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            start_date,
            end_date,
            fast_window: DEFAULT_FAST_WINDOW,
            slow_window: DEFAULT_SLOW_WINDOW,
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            cagr_base: CagrBase::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub signals: Vec<SignalRow>,
    pub events: TradeEvents,
    pub portfolio: Vec<PortfolioRow>,
    pub metrics: PerformanceMetrics,
}

impl BacktestResult {
    pub fn final_row(&self) -> Option<&PortfolioRow> {
        self.portfolio.last()
    }

    pub fn is_invested_at_end(&self) -> bool {
        self.signals.last().is_some_and(|r| r.position == 1.0)
    }
}

pub fn run_backtest(
    series: &PriceSeries,
    config: &BacktestConfig,
) -> Result<BacktestResult, SmacrossError> {
    if series.is_empty() {
        return Err(SmacrossError::NoData {
            symbol: config.symbol.clone(),
            start: config.start_date,
            end: config.end_date,
        });
    }

    let signals = generate_signals(series, config.fast_window, config.slow_window);
    let events = extract_events(&signals);
    let portfolio = simulate(&signals, config.initial_capital);
    let metrics = PerformanceMetrics::compute(&portfolio, config.cagr_base);

    Ok(BacktestResult {
        signals,
        events,
        portfolio,
        metrics,
    })
}
