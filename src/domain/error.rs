//! Domain error types.

use rust_decimal::Decimal;

use super::order::Side;

/// Failure to turn a dataset source into a price series.
///
/// Row numbers are 1-based and count data rows only (the header is row 0).
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column {column}")]
    MissingColumn { column: String },

    #[error("row {row}: invalid date {value:?}")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: invalid {column} value {value:?}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: {column} must be positive, got {value}")]
    NonPositivePrice {
        row: usize,
        column: String,
        value: Decimal,
    },

    #[error("dataset {name} contains no price rows")]
    Empty { name: String },

    #[error("unknown dataset {name}")]
    UnknownDataset { name: String },

    #[error("no datasets found in {location}")]
    NoDatasets { location: String },
}

/// An order that was refused. The portfolio is untouched whenever one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderRejection {
    #[error("invalid order: {reason}")]
    InvalidOrder { reason: String },

    #[error("price ${market:.2} {} limit ${limit:.2}", .side.limit_relation())]
    LimitNotMet {
        side: Side,
        market: Decimal,
        limit: Decimal,
    },

    #[error("not enough cash to buy {shares} shares: need ${required:.2}, have ${available:.2}")]
    InsufficientCash {
        shares: u64,
        required: Decimal,
        available: Decimal,
    },

    #[error("you only have {held} shares, cannot sell {requested}")]
    InsufficientPosition { requested: u64, held: u64 },
}

/// Top-level error type for tradesim.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error("data load failed: {0}")]
    DataLoad(#[from] DataLoadError),

    #[error(transparent)]
    Rejected(#[from] OrderRejection),

    #[error("no reset is awaiting confirmation")]
    ResetNotPending,

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("export to {path} failed: {reason}")]
    Export { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SimulatorError> for std::process::ExitCode {
    fn from(err: &SimulatorError) -> Self {
        let code: u8 = match err {
            SimulatorError::Io(_) | SimulatorError::Export { .. } => 1,
            SimulatorError::ConfigParse { .. } | SimulatorError::ConfigInvalid { .. } => 2,
            SimulatorError::DataLoad(_) => 3,
            SimulatorError::Rejected(_) | SimulatorError::ResetNotPending => 4,
        };
        std::process::ExitCode::from(code)
    }
}
