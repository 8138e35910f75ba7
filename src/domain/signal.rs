//! Moving-average crossover signal generation.
//!
//! For each close the generator computes a fast and a slow simple moving
//! average, a binary position (1.0 while fast > slow, otherwise 0.0) and the
//! change in position against the previous row.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: the first (n-1) rows have no average.

use chrono::NaiveDate;

use super::price::PriceSeries;

pub const ENTER: f64 = 1.0;
pub const EXIT: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalRow {
    pub date: NaiveDate,
    pub close: f64,
    pub fast_ma: Option<f64>,
    pub slow_ma: Option<f64>,
    /// 0.0 while either average is still warming up.
    pub position: f64,
    /// `None` on the first row.
    pub signal: Option<f64>,
}

impl SignalRow {
    /// Both averages are defined on this row.
    pub fn is_warm(&self) -> bool {
        self.fast_ma.is_some() && self.slow_ma.is_some()
    }

    pub fn is_entry(&self) -> bool {
        self.signal == Some(ENTER)
    }

    pub fn is_exit(&self) -> bool {
        self.signal == Some(EXIT)
    }
}

/// Trailing simple moving average aligned with `closes`.
pub fn rolling_mean(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let warmup = window.saturating_sub(1);
    (0..closes.len())
        .map(|i| {
            if window == 0 || i < warmup {
                return None;
            }
            let start = i + 1 - window;
            Some(closes[start..=i].iter().sum::<f64>() / window as f64)
        })
        .collect()
}

fn position_for(fast: Option<f64>, slow: Option<f64>) -> f64 {
    match (fast, slow) {
        (Some(f), Some(s)) if f > s => 1.0,
        _ => 0.0,
    }
}

pub fn generate_signals(
    series: &PriceSeries,
    fast_window: usize,
    slow_window: usize,
) -> Vec<SignalRow> {
    let closes: Vec<f64> = series.closes().collect();
    let fast = rolling_mean(&closes, fast_window);
    let slow = rolling_mean(&closes, slow_window);

    let mut rows: Vec<SignalRow> = Vec::with_capacity(closes.len());
    for (i, point) in series.points().iter().enumerate() {
        let position = position_for(fast[i], slow[i]);
        let signal = rows.last().map(|prev| position - prev.position);
        rows.push(SignalRow {
            date: point.date,
            close: point.close,
            fast_ma: fast[i],
            slow_ma: slow[i],
            position,
            signal,
        });
    }
    rows
}
