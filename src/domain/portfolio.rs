//! Long/flat portfolio simulation over a signal series.
//!
//! Cash moves by exactly one close on every transition: an entry pays
//! `close` out of cash, an exit returns `close` to cash. Holdings are
//! `position * close`. This is a fixed one-unit notional, not an allocation of
//! the whole capital.

use chrono::NaiveDate;

use super::signal::SignalRow;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioRow {
    pub date: NaiveDate,
    pub holdings: f64,
    pub cash: f64,
    pub total: f64,
    /// `None` on the first row and where the change is 0/0.
    pub returns: Option<f64>,
}

fn pct_change(prev: f64, curr: f64) -> Option<f64> {
    let r = (curr - prev) / prev;
    if r.is_nan() { None } else { Some(r) }
}

pub fn simulate(rows: &[SignalRow], initial_capital: f64) -> Vec<PortfolioRow> {
    let mut out: Vec<PortfolioRow> = Vec::with_capacity(rows.len());
    let mut cash = initial_capital;

    for row in rows {
        cash -= row.signal.unwrap_or(0.0) * row.close;
        let holdings = row.position * row.close;
        let total = cash + holdings;
        let returns = out.last().and_then(|prev| pct_change(prev.total, total));

        out.push(PortfolioRow {
            date: row.date,
            holdings,
            cash,
            total,
            returns,
        });
    }
    out
}

pub fn totals(rows: &[PortfolioRow]) -> Vec<f64> {
    rows.iter().map(|r| r.total).collect()
}

/// Defined returns only; the leading `None` is dropped.
pub fn defined_returns(rows: &[PortfolioRow]) -> Vec<f64> {
    rows.iter().filter_map(|r| r.returns).collect()
}
