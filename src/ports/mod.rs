//! Port traits the domain depends on.

pub mod config_port;
pub mod data_port;
pub mod export_port;
