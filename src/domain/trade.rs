//! Executed trade records.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::order::Side;

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub date: NaiveDate,
    pub action: Side,
    pub shares: u64,
    pub execution_price: Decimal,
    pub commission: Decimal,
    /// Cash paid for a BUY or received for a SELL, commission included.
    pub total: Decimal,
}

impl Trade {
    /// Signed effect of this trade on cash.
    pub fn cash_delta(&self) -> Decimal {
        match self.action {
            Side::Buy => -self.total,
            Side::Sell => self.total,
        }
    }

    /// Signed effect of this trade on the share position.
    pub fn position_delta(&self) -> i64 {
        match self.action {
            Side::Buy => self.shares as i64,
            Side::Sell => -(self.shares as i64),
        }
    }
}

/// Flat export row: date, action, shares, price, commission, total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRow {
    pub date: String,
    pub action: String,
    pub shares: String,
    pub price: String,
    pub commission: String,
    pub total: String,
}

pub const TRADE_ROW_HEADER: [&str; 6] = ["date", "action", "shares", "price", "commission", "total"];

impl TradeRow {
    pub fn fields(&self) -> [&str; 6] {
        [
            &self.date,
            &self.action,
            &self.shares,
            &self.price,
            &self.commission,
            &self.total,
        ]
    }
}

impl From<&Trade> for TradeRow {
    fn from(trade: &Trade) -> Self {
        TradeRow {
            date: trade.date.format("%Y-%m-%d").to_string(),
            action: trade.action.to_string(),
            shares: trade.shares.to_string(),
            price: trade.execution_price.normalize().to_string(),
            commission: trade.commission.normalize().to_string(),
            total: trade.total.normalize().to_string(),
        }
    }
}

/// Trades in execution order as export rows.
pub fn export_rows(trades: &[Trade]) -> Vec<TradeRow> {
    trades.iter().map(TradeRow::from).collect()
}
