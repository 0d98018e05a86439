//! CSV file data adapter.
//!
//! A data directory holds one `<NAME>.csv` per dataset. Files need a header
//! row with `Date, Open, High, Low, Close` and optionally `Volume`; header
//! names are matched case-insensitively and column order is free.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::domain::error::DataLoadError;
use crate::domain::market_data::MarketData;
use crate::domain::price_bar::PriceBar;
use crate::ports::data_port::MarketDataPort;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const OFFSET_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%dT%H:%M:%S%:z"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Load an arbitrary file with the dataset schema. The dataset is named
    /// after the upper-cased file stem.
    pub fn load_path(&self, path: &Path) -> Result<MarketData, DataLoadError> {
        let file = fs::File::open(path).map_err(|source| DataLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let bars = parse_bars(file)?;
        MarketData::new(dataset_name(path), bars)
    }

    fn csv_files(&self) -> Result<Vec<PathBuf>, DataLoadError> {
        let entries = fs::read_dir(&self.base_path).map_err(|source| DataLoadError::Io {
            path: self.base_path.display().to_string(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| DataLoadError::Io {
                path: self.base_path.display().to_string(),
                source,
            })?;
            let path = entry.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if is_csv && path.is_file() {
                files.push(path);
            }
        }
        Ok(files)
    }
}

impl MarketDataPort for CsvAdapter {
    fn list_datasets(&self) -> Result<Vec<String>, DataLoadError> {
        let mut names: Vec<String> = self.csv_files()?.iter().map(|p| dataset_name(p)).collect();
        names.sort();
        Ok(names)
    }

    fn load(&self, name: &str) -> Result<MarketData, DataLoadError> {
        let wanted = name.trim().to_uppercase();
        let path = self
            .csv_files()?
            .into_iter()
            .find(|p| dataset_name(p) == wanted)
            .ok_or_else(|| DataLoadError::UnknownDataset {
                name: name.to_string(),
            })?;
        debug!(dataset = %wanted, path = %path.display(), "loading dataset");
        self.load_path(&path)
    }
}

/// `data/aapl.csv` → `AAPL`
pub fn dataset_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_default()
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, DataLoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| DataLoadError::MissingColumn {
                column: name.to_string(),
            })
        };

        Ok(Columns {
            date: require("Date")?,
            open: require("Open")?,
            high: require("High")?,
            low: require("Low")?,
            close: require("Close")?,
            volume: find("Volume"),
        })
    }
}

/// Parse CSV rows into bars in file order.
pub fn parse_bars<R: Read>(reader: R) -> Result<Vec<PriceBar>, DataLoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = Columns::locate(rdr.headers()?)?;

    let mut bars = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 1;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let date = parse_date(field(columns.date)).ok_or_else(|| DataLoadError::InvalidDate {
            row,
            value: field(columns.date).to_string(),
        })?;

        bars.push(PriceBar {
            date,
            open: parse_price(field(columns.open), row, "Open")?,
            high: parse_price(field(columns.high), row, "High")?,
            low: parse_price(field(columns.low), row, "Low")?,
            close: parse_price(field(columns.close), row, "Close")?,
            volume: match columns.volume {
                Some(idx) => parse_volume(field(idx), row)?,
                None => 0,
            },
        });
    }
    Ok(bars)
}

/// Calendar date of a cell; date-times keep their local date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            OFFSET_DATETIME_FORMATS
                .iter()
                .find_map(|f| DateTime::parse_from_str(value, f).ok())
                .map(|dt| dt.date_naive())
        })
}

fn parse_decimal(value: &str) -> Option<Decimal> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

fn parse_price(value: &str, row: usize, column: &str) -> Result<Decimal, DataLoadError> {
    let price = parse_decimal(value).ok_or_else(|| DataLoadError::InvalidNumber {
        row,
        column: column.to_string(),
        value: value.to_string(),
    })?;
    if price <= Decimal::ZERO {
        return Err(DataLoadError::NonPositivePrice {
            row,
            column: column.to_string(),
            value: price,
        });
    }
    Ok(price)
}

fn parse_volume(value: &str, row: usize) -> Result<u64, DataLoadError> {
    if value.is_empty() {
        return Ok(0);
    }
    if let Ok(v) = value.parse::<u64>() {
        return Ok(v);
    }
    // exports sometimes write integral volumes as 1200.0
    parse_decimal(value)
        .filter(|d| d.fract().is_zero() && !d.is_sign_negative())
        .and_then(|d| d.to_u64())
        .ok_or_else(|| DataLoadError::InvalidNumber {
            row,
            column: "Volume".to_string(),
            value: value.to_string(),
        })
}
