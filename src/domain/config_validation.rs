//! Configuration validation.
//!
//! Validates every simulator key before a session starts.

use rust_decimal::Decimal;

use super::sim_config::{decimal_or, DEFAULT_INITIAL_CASH};
use crate::domain::error::SimulatorError;
use crate::ports::config_port::ConfigPort;

pub fn validate_simulator_config(config: &dyn ConfigPort) -> Result<(), SimulatorError> {
    validate_initial_cash(config)?;
    validate_slippage(config)?;
    validate_commission(config)?;
    validate_start_day(config)?;
    validate_chart_days(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> SimulatorError {
    SimulatorError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), SimulatorError> {
    let value = decimal_or(config, "simulator", "initial_cash", DEFAULT_INITIAL_CASH)?;
    if value <= Decimal::ZERO {
        return Err(invalid(
            "simulator",
            "initial_cash",
            "initial_cash must be positive",
        ));
    }
    Ok(())
}

fn validate_slippage(config: &dyn ConfigPort) -> Result<(), SimulatorError> {
    let value = decimal_or(config, "execution", "slippage_rate", Decimal::ZERO)?;
    if value < Decimal::ZERO || value >= Decimal::ONE {
        return Err(invalid(
            "execution",
            "slippage_rate",
            "slippage_rate must be in [0, 1)",
        ));
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort) -> Result<(), SimulatorError> {
    let value = decimal_or(config, "execution", "commission", Decimal::ZERO)?;
    if value < Decimal::ZERO {
        return Err(invalid(
            "execution",
            "commission",
            "commission must be non-negative",
        ));
    }
    Ok(())
}

fn validate_start_day(config: &dyn ConfigPort) -> Result<(), SimulatorError> {
    if let Some(raw) = config.get_string("simulator", "start_day") {
        match raw.trim().parse::<i64>() {
            Ok(v) if v >= 0 => {}
            _ => {
                return Err(invalid(
                    "simulator",
                    "start_day",
                    "start_day must be a non-negative integer",
                ));
            }
        }
    }
    Ok(())
}

fn validate_chart_days(config: &dyn ConfigPort) -> Result<(), SimulatorError> {
    if let Some(raw) = config.get_string("simulator", "chart_days") {
        match raw.trim().parse::<i64>() {
            Ok(v) if v >= 1 => {}
            _ => {
                return Err(invalid(
                    "simulator",
                    "chart_days",
                    "chart_days must be at least 1",
                ));
            }
        }
    }
    Ok(())
}
