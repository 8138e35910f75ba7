//! Report output port trait.

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::error::SmacrossError;

/// Port for rendering a finished backtest.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, config: &BacktestConfig) -> Result<(), SmacrossError>;
}
