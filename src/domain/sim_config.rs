//! Simulator configuration and its INI mapping.
//!
//! ```ini
//! [simulator]
//! initial_cash = 100000
//! start_day = 50
//! chart_days = 50
//!
//! [execution]
//! slippage_rate = 0.001
//! commission = 1.00
//!
//! [data]
//! directory = data
//! dataset = AAPL
//!
//! [logging]
//! level = info
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::path::PathBuf;

use super::cursor::DEFAULT_START_DAY;
use super::error::SimulatorError;
use super::execution::ExecutionConfig;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_INITIAL_CASH: Decimal = dec!(100000);
pub const DEFAULT_CHART_DAYS: usize = 50;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    pub initial_cash: Decimal,
    pub start_day: usize,
    pub chart_days: usize,
    pub execution: ExecutionConfig,
    pub data_dir: PathBuf,
    pub default_dataset: Option<String>,
    pub log_level: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            initial_cash: DEFAULT_INITIAL_CASH,
            start_day: DEFAULT_START_DAY,
            chart_days: DEFAULT_CHART_DAYS,
            execution: ExecutionConfig::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            default_dataset: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Read a decimal key, falling back to `default` when absent.
pub fn decimal_or(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: Decimal,
) -> Result<Decimal, SimulatorError> {
    config
        .get_decimal(section, key)
        .map(|v| v.unwrap_or(default))
        .map_err(|raw| SimulatorError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("not a decimal: {raw}"),
        })
}

/// Build a config from a validated port. Missing keys take defaults.
pub fn build_simulator_config(config: &dyn ConfigPort) -> Result<SimulatorConfig, SimulatorError> {
    let defaults = SimulatorConfig::default();

    let execution = ExecutionConfig {
        slippage_rate: decimal_or(
            config,
            "execution",
            "slippage_rate",
            defaults.execution.slippage_rate,
        )?,
        commission: decimal_or(config, "execution", "commission", defaults.execution.commission)?,
    };

    Ok(SimulatorConfig {
        initial_cash: decimal_or(config, "simulator", "initial_cash", defaults.initial_cash)?,
        start_day: config.get_int("simulator", "start_day", defaults.start_day as i64).max(0) as usize,
        chart_days: config
            .get_int("simulator", "chart_days", defaults.chart_days as i64)
            .max(1) as usize,
        execution,
        data_dir: config
            .get_string("data", "directory")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir),
        default_dataset: config
            .get_string("data", "dataset")
            .filter(|s| !s.trim().is_empty()),
        log_level: config
            .get_string("logging", "level")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.log_level),
    })
}
