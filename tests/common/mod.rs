#![allow(dead_code)]

use chrono::NaiveDate;
use smacross::domain::backtest::BacktestConfig;
use smacross::domain::error::SmacrossError;
pub use smacross::domain::price::{PricePoint, PriceSeries};
use smacross::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_points(mut self, symbol: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), points);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_closes(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SmacrossError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SmacrossError::Data {
                reason: reason.clone(),
            });
        }
        let points = self
            .data
            .get(symbol)
            .map(|pts| {
                pts.iter()
                    .filter(|p| p.date >= start_date && p.date < end_date)
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        PriceSeries::new(points)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SmacrossError> {
        match self.data.get(symbol) {
            Some(pts) if !pts.is_empty() => {
                let min = pts.iter().map(|p| p.date).min().unwrap();
                let max = pts.iter().map(|p| p.date).max().unwrap();
                Ok(Some((min, max, pts.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One point per calendar day from `start`.
pub fn daily_points(start: &str, closes: &[f64]) -> Vec<PricePoint> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint::new(start + chrono::Duration::days(i as i64), close))
        .collect()
}

pub fn daily_series(start: &str, closes: &[f64]) -> PriceSeries {
    PriceSeries::new(daily_points(start, closes)).unwrap()
}

pub fn sample_config(fast_window: usize, slow_window: usize) -> BacktestConfig {
    BacktestConfig {
        symbol: "^IXIC".to_string(),
        start_date: date(2024, 1, 1),
        end_date: date(2025, 1, 1),
        fast_window,
        slow_window,
        initial_capital: 10_000.0,
        cagr_base: Default::default(),
    }
}
