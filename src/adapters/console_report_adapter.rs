//! Plain-text metrics report on stdout.

use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::error::SmacrossError;
use crate::domain::metrics::PerformanceMetrics;
use crate::ports::report_port::ReportPort;
use std::io::Write;

#[derive(Debug, Default)]
pub struct ConsoleReportAdapter;

impl ConsoleReportAdapter {
    pub fn new() -> Self {
        Self
    }

    /// NaN and infinities print as-is (`NaN`, `inf`).
    pub fn render(metrics: &PerformanceMetrics) -> String {
        format!(
            "Sharpe ratio: {}\nMax Drawdown: {}\nCAGR: {}\n",
            metrics.sharpe_ratio, metrics.max_drawdown, metrics.cagr
        )
    }
}

impl ReportPort for ConsoleReportAdapter {
    fn write(&self, result: &BacktestResult, _config: &BacktestConfig) -> Result<(), SmacrossError> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(Self::render(&result.metrics).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}
