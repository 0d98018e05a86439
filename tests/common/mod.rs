#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tradesim::domain::error::DataLoadError;
use tradesim::domain::market_data::MarketData;
pub use tradesim::domain::price_bar::PriceBar;
use tradesim::domain::session::SimulationSession;
use tradesim::domain::sim_config::SimulatorConfig;
use tradesim::ports::data_port::MarketDataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, name: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(name.to_string(), bars);
        self
    }

    pub fn with_error(mut self, name: &str, reason: &str) -> Self {
        self.errors.insert(name.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockDataPort {
    fn list_datasets(&self) -> Result<Vec<String>, DataLoadError> {
        let mut names: Vec<String> = self
            .data
            .keys()
            .chain(self.errors.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    fn load(&self, name: &str) -> Result<MarketData, DataLoadError> {
        if let Some(reason) = self.errors.get(name) {
            return Err(DataLoadError::InvalidDate {
                row: 1,
                value: reason.clone(),
            });
        }
        match self.data.get(name) {
            Some(bars) => MarketData::new(name, bars.clone()),
            None => Err(DataLoadError::UnknownDataset {
                name: name.to_string(),
            }),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: Decimal) -> PriceBar {
    PriceBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close,
        high: close + Decimal::ONE,
        low: close,
        close,
        volume: 1000,
    }
}

/// `n` consecutive calendar days from 2024-01-01, every close equal.
pub fn flat_series(n: usize, close: Decimal) -> Vec<PriceBar> {
    series(&vec![close; n])
}

/// One bar per close, consecutive calendar days from 2024-01-01.
pub fn series(closes: &[Decimal]) -> Vec<PriceBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + Days::new(i as u64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000,
        })
        .collect()
}

pub fn market(name: &str, bars: Vec<PriceBar>) -> MarketData {
    MarketData::new(name, bars).unwrap()
}

pub fn session_with(bars: Vec<PriceBar>) -> SimulationSession {
    SimulationSession::new(SimulatorConfig::default(), market("TEST", bars))
}

/// Write `bars` in dataset CSV format to `dir/<name>.csv`.
pub fn write_dataset(dir: &Path, name: &str, bars: &[PriceBar]) {
    let mut file = std::fs::File::create(dir.join(format!("{name}.csv"))).unwrap();
    writeln!(file, "Date,Open,High,Low,Close,Volume").unwrap();
    for b in bars {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            b.date, b.open, b.high, b.low, b.close, b.volume
        )
        .unwrap();
    }
}
