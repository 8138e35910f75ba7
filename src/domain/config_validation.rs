//! Configuration validation.
//!
//! Validates config fields before a backtest runs.

use crate::domain::backtest::{DEFAULT_FAST_WINDOW, DEFAULT_INITIAL_CAPITAL, DEFAULT_SLOW_WINDOW};
use crate::domain::error::SmacrossError;
use crate::domain::metrics::CagrBase;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    validate_symbol(config)?;
    validate_dates(config)?;
    validate_initial_capital(config)?;
    validate_cagr_base(config)?;
    validate_windows(config)?;
    Ok(())
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    match config.get_string("backtest", "symbol") {
        Some(s) if s.trim().is_empty() => Err(SmacrossError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "symbol".to_string(),
            reason: "symbol must not be empty".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(SmacrossError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, SmacrossError> {
    match value {
        None => Err(SmacrossError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            SmacrossError::ConfigInvalid {
                section: "backtest".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }
        }),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    if let Some(raw) = config.get_string("backtest", "initial_capital") {
        if raw.trim().parse::<f64>().is_err() {
            return Err(SmacrossError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "initial_capital".to_string(),
                reason: format!("'{}' is not a number", raw.trim()),
            });
        }
    }
    let value = config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL);
    if value <= 0.0 || !value.is_finite() {
        return Err(SmacrossError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_cagr_base(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    match config.get_string("backtest", "cagr_base") {
        Some(raw) => raw.parse::<CagrBase>().map(|_| ()).map_err(|reason| {
            SmacrossError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "cagr_base".to_string(),
                reason,
            }
        }),
        None => Ok(()),
    }
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), SmacrossError> {
    validate_window(config, "fast_window", DEFAULT_FAST_WINDOW)?;
    validate_window(config, "slow_window", DEFAULT_SLOW_WINDOW)?;
    Ok(())
}

fn validate_window(config: &dyn ConfigPort, key: &str, default: usize) -> Result<(), SmacrossError> {
    let invalid = |reason: String| SmacrossError::ConfigInvalid {
        section: "strategy".to_string(),
        key: key.to_string(),
        reason,
    };

    if let Some(raw) = config.get_string("strategy", key) {
        if raw.trim().parse::<i64>().is_err() {
            return Err(invalid(format!("'{}' is not an integer", raw.trim())));
        }
    }
    let value = config.get_int("strategy", key, default as i64);
    if value < 1 {
        return Err(invalid(format!("{} must be at least 1", key)));
    }
    Ok(())
}
