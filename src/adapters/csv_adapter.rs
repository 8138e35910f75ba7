//! CSV file price data adapter.
//!
//! One file per instrument at `<base_path>/<SYMBOL>.csv`. The header row must
//! name a `date` and a `close` column (case-insensitive); other columns are
//! ignored, so both `date,close` files and full OHLCV exports load.

use crate::domain::error::SmacrossError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_all(&self, symbol: &str) -> Result<PriceSeries, SmacrossError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| SmacrossError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| SmacrossError::Data {
            reason: format!("CSV header error in {}: {}", path.display(), e),
        })?;
        let date_col = column_index(headers, "date")?;
        let close_col = column_index(headers, "close")?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| SmacrossError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(date_col).ok_or_else(|| SmacrossError::Data {
                reason: "missing date column".into(),
            })?;
            let date = parse_date(date_str)?;

            let close: f64 = record
                .get(close_col)
                .ok_or_else(|| SmacrossError::Data {
                    reason: "missing close column".into(),
                })?
                .trim()
                .parse()
                .map_err(|e| SmacrossError::Data {
                    reason: format!("invalid close value on {}: {}", date, e),
                })?;

            points.push(PricePoint::new(date, close));
        }

        PriceSeries::new(points)
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, SmacrossError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| SmacrossError::Data {
            reason: format!("missing {} column", name),
        })
}

/// `YYYY-MM-DD`, optionally followed by a time component.
fn parse_date(raw: &str) -> Result<NaiveDate, SmacrossError> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| SmacrossError::Data {
        reason: format!("invalid date format '{}': {}", raw, e),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_closes(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SmacrossError> {
        let all = self.read_all(symbol)?;
        let in_range = all
            .points()
            .iter()
            .filter(|p| p.date >= start_date && p.date < end_date)
            .copied()
            .collect();
        PriceSeries::new(in_range)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SmacrossError> {
        if !self.csv_path(symbol).exists() {
            return Ok(None);
        }
        let all = self.read_all(symbol)?;
        Ok(match (all.first_date(), all.last_date()) {
            (Some(first), Some(last)) => Some((first, last, all.len())),
            _ => None,
        })
    }
}
