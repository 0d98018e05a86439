//! Core domain types and logic.

pub mod error;
pub mod price_bar;
pub mod market_data;
pub mod cursor;
pub mod order;
pub mod trade;
pub mod portfolio;
pub mod execution;
pub mod valuation;
pub mod reset;
pub mod sim_config;
pub mod config_validation;
pub mod session;
