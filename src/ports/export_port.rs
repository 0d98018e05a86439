//! Trade log export port trait.

use std::path::Path;

use crate::domain::error::SimulatorError;
use crate::domain::trade::Trade;

/// Port for writing the trade log out of the session.
pub trait ExportPort {
    fn export(&self, trades: &[Trade], output_path: &Path) -> Result<(), SimulatorError>;
}
