//! CSV trade log export.

use std::path::Path;
use tracing::info;

use crate::domain::error::SimulatorError;
use crate::domain::trade::{export_rows, Trade, TRADE_ROW_HEADER};
use crate::ports::export_port::ExportPort;

pub struct CsvExportAdapter;

impl CsvExportAdapter {
    /// Write the trade log to any writer: header first, then one row per
    /// trade in execution order.
    pub fn write_to<W: std::io::Write>(trades: &[Trade], writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(TRADE_ROW_HEADER)?;
        for row in export_rows(trades) {
            wtr.write_record(row.fields())?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ExportPort for CsvExportAdapter {
    fn export(&self, trades: &[Trade], output_path: &Path) -> Result<(), SimulatorError> {
        let to_err = |reason: String| SimulatorError::Export {
            path: output_path.display().to_string(),
            reason,
        };
        let file = std::fs::File::create(output_path).map_err(|e| to_err(e.to_string()))?;
        Self::write_to(trades, file).map_err(|e| to_err(e.to_string()))?;
        info!(path = %output_path.display(), trades = trades.len(), "trade log exported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::Side;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn trades() -> Vec<Trade> {
        vec![
            Trade {
                date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                action: Side::Buy,
                shares: 10,
                execution_price: dec!(100.100),
                commission: dec!(1.00),
                total: dec!(1002.000),
            },
            Trade {
                date: NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
                action: Side::Sell,
                shares: 10,
                execution_price: dec!(99.900),
                commission: dec!(1.00),
                total: dec!(998.000),
            },
        ]
    }

    #[test]
    fn writes_header_and_rows_in_order() {
        let mut buf = Vec::new();
        CsvExportAdapter::write_to(&trades(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "date,action,shares,price,commission,total\n\
             2024-01-15,BUY,10,100.1,1,1002\n\
             2024-01-16,SELL,10,99.9,1,998\n"
        );
    }

    #[test]
    fn empty_log_writes_header_only() {
        let mut buf = Vec::new();
        CsvExportAdapter::write_to(&[], &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "date,action,shares,price,commission,total\n"
        );
    }

    #[test]
    fn export_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        CsvExportAdapter.export(&trades(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn export_to_missing_directory_fails() {
        let err = CsvExportAdapter
            .export(&trades(), Path::new("/nonexistent/dir/trades.csv"))
            .unwrap_err();
        assert!(matches!(err, SimulatorError::Export { .. }));
    }
}
