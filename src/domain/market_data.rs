//! Market data store: one named, date-ordered price series per session.

use chrono::NaiveDate;
use std::collections::HashMap;

use super::error::DataLoadError;
use super::price_bar::PriceBar;
use super::trade::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct MarketData {
    name: String,
    bars: Vec<PriceBar>,
    date_index: HashMap<NaiveDate, usize>,
}

impl MarketData {
    /// Build a store from unordered bars.
    ///
    /// Bars are sorted ascending by date; the sort is stable so rows sharing
    /// a date keep their input order. Duplicate dates are not removed.
    pub fn new(name: impl Into<String>, mut bars: Vec<PriceBar>) -> Result<Self, DataLoadError> {
        let name = name.into();
        if bars.is_empty() {
            return Err(DataLoadError::Empty { name });
        }
        bars.sort_by_key(|b| b.date);

        let mut date_index = HashMap::with_capacity(bars.len());
        for (i, bar) in bars.iter().enumerate() {
            date_index.entry(bar.date).or_insert(i);
        }

        Ok(MarketData {
            name,
            bars,
            date_index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Never true for a constructed store; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.bars.len() - 1
    }

    pub fn bar(&self, day: usize) -> Option<&PriceBar> {
        self.bars.get(day)
    }

    pub fn day_of(&self, date: NaiveDate) -> Option<usize> {
        self.date_index.get(&date).copied()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.last_index()].date
    }

    /// Bars from `end_day - days` through `end_day` inclusive.
    ///
    /// Nothing after `end_day` is ever returned.
    pub fn window(&self, end_day: usize, days: usize) -> &[PriceBar] {
        let end = end_day.min(self.last_index());
        let start = end.saturating_sub(days);
        &self.bars[start..=end]
    }

    /// Trades whose date falls on a bar inside the window ending at
    /// `end_day`.
    pub fn markers<'a>(&self, trades: &'a [Trade], end_day: usize, days: usize) -> Vec<&'a Trade> {
        let end = end_day.min(self.last_index());
        let start = end.saturating_sub(days);
        trades
            .iter()
            .filter(|t| {
                self.day_of(t.date)
                    .is_some_and(|day| (start..=end).contains(&day))
            })
            .collect()
    }
}
