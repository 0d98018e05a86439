//! Market data access port trait.

use crate::domain::error::DataLoadError;
use crate::domain::market_data::MarketData;

pub trait MarketDataPort {
    /// Names of the datasets this source offers, sorted.
    fn list_datasets(&self) -> Result<Vec<String>, DataLoadError>;

    /// Load one dataset by name. The returned series is non-empty and sorted.
    fn load(&self, name: &str) -> Result<MarketData, DataLoadError>;
}
