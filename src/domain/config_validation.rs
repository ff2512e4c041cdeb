//! Configuration validation.
//!
//! Validates every config field before any data is loaded.

use crate::domain::error::PegtrackError;
use crate::domain::metrics::RISK_FREE_RATE;
use crate::domain::portfolio::parse_allocations;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;
pub const DEFAULT_BENCHMARK: &str = "SPY";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), PegtrackError> {
    validate_initial_capital(config)?;
    validate_risk_free_rate(config)?;
    parse_start_date(config)?;
    validate_benchmark(config)?;
    Ok(())
}

pub fn validate_portfolio_config(config: &dyn ConfigPort) -> Result<(), PegtrackError> {
    let Some(raw) = config
        .get_string("portfolio", "allocations")
        .filter(|s| !s.trim().is_empty())
    else {
        return Err(PegtrackError::ConfigMissing {
            section: "portfolio".to_string(),
            key: "allocations".to_string(),
        });
    };
    parse_allocations(&raw)
        .map_err(|e| PegtrackError::config_invalid("portfolio", "allocations", e.to_string()))?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), PegtrackError> {
    match config.get_string("data", "price_dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(PegtrackError::ConfigMissing {
            section: "data".to_string(),
            key: "price_dir".to_string(),
        }),
    }
}

/// `[backtest] start_date` as a date. Required.
pub fn parse_start_date(config: &dyn ConfigPort) -> Result<NaiveDate, PegtrackError> {
    let Some(raw) = config.get_string("backtest", "start_date") else {
        return Err(PegtrackError::ConfigMissing {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
        });
    };
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        PegtrackError::config_invalid(
            "backtest",
            "start_date",
            "invalid start_date format, expected YYYY-MM-DD",
        )
    })
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), PegtrackError> {
    let value = config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL);
    if value <= 0.0 {
        return Err(PegtrackError::config_invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), PegtrackError> {
    let value = config.get_double("backtest", "risk_free_rate", RISK_FREE_RATE);
    if !(0.0..1.0).contains(&value) {
        return Err(PegtrackError::config_invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_benchmark(config: &dyn ConfigPort) -> Result<(), PegtrackError> {
    match config.get_string("backtest", "benchmark") {
        Some(s) if s.trim().is_empty() => Err(PegtrackError::config_invalid(
            "backtest",
            "benchmark",
            "benchmark must not be blank",
        )),
        _ => Ok(()),
    }
}
