//! Performance metrics over a simulated portfolio.
//!
//! Undefined inputs (too few rows, zero deviation, zero totals) follow IEEE
//! float semantics and surface as NaN or infinity rather than errors.

use std::fmt;
use std::str::FromStr;

use super::portfolio::{defined_returns, totals, PortfolioRow};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const CALENDAR_DAYS_PER_YEAR: f64 = 365.0;

/// Which row the CAGR growth ratio is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CagrBase {
    /// `total[last] / total[0]`.
    FirstRow,
    /// `total[last] / total[1]`, the historical behaviour.
    #[default]
    SecondRow,
}

impl CagrBase {
    fn index(self) -> usize {
        match self {
            CagrBase::FirstRow => 0,
            CagrBase::SecondRow => 1,
        }
    }
}

impl FromStr for CagrBase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" => Ok(CagrBase::FirstRow),
            "second" => Ok(CagrBase::SecondRow),
            other => Err(format!("unknown cagr_base '{other}' (expected first or second)")),
        }
    }
}

impl fmt::Display for CagrBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CagrBase::FirstRow => write!(f, "first"),
            CagrBase::SecondRow => write!(f, "second"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceMetrics {
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub cagr: f64,
}

impl PerformanceMetrics {
    pub fn compute(rows: &[PortfolioRow], base: CagrBase) -> Self {
        PerformanceMetrics {
            sharpe_ratio: sharpe_ratio(&defined_returns(rows)),
            max_drawdown: max_drawdown(&totals(rows)),
            cagr: cagr(rows, base),
        }
    }
}

/// sqrt(252) * mean / sample stddev.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return f64::NAN;
    }

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    TRADING_DAYS_PER_YEAR.sqrt() * mean / stddev
}

/// Worst `total / running_peak - 1`. Zero when the series never falls.
pub fn max_drawdown(totals: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst: Option<f64> = None;

    for &total in totals {
        peak = peak.max(total);
        let dd = total / peak - 1.0;
        if dd.is_nan() {
            continue;
        }
        worst = Some(worst.map_or(dd, |w| w.min(dd)));
    }

    worst.unwrap_or(f64::NAN)
}

pub fn cagr(rows: &[PortfolioRow], base: CagrBase) -> f64 {
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return f64::NAN;
    };
    let Some(start) = rows.get(base.index()) else {
        return f64::NAN;
    };

    let days = (last.date - first.date).num_days() as f64;
    (last.total / start.total).powf(CALENDAR_DAYS_PER_YEAR / days) - 1.0
}
