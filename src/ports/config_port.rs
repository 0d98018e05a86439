//! Configuration access port trait.

use rust_decimal::Decimal;
use std::str::FromStr;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    /// Exact decimal value. `Ok(None)` when the key is absent, `Err` with the
    /// raw text when it is present but not a decimal.
    fn get_decimal(&self, section: &str, key: &str) -> Result<Option<Decimal>, String> {
        match self.get_string(section, key) {
            None => Ok(None),
            Some(raw) => {
                let trimmed = raw.trim();
                Decimal::from_str(trimmed)
                    .or_else(|_| Decimal::from_scientific(trimmed))
                    .map(Some)
                    .map_err(|_| raw)
            }
        }
    }
}
