//! Portfolio state: cash, share position and trade log.

use rust_decimal::Decimal;

use super::trade::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    cash: Decimal,
    initial_cash: Decimal,
    position: u64,
    trades: Vec<Trade>,
}

impl Portfolio {
    pub fn new(initial_cash: Decimal) -> Self {
        Portfolio {
            cash: initial_cash,
            initial_cash,
            position: 0,
            trades: Vec::new(),
        }
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn initial_cash(&self) -> Decimal {
        self.initial_cash
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Apply an executed trade: cash, position and log move together.
    ///
    /// Callers must have checked affordability and holdings; see
    /// [`crate::domain::execution::execute`].
    pub(crate) fn apply(&mut self, trade: Trade) {
        self.cash += trade.cash_delta();
        self.position = self.position.saturating_add_signed(trade.position_delta());
        self.trades.push(trade);
    }

    pub fn reset(&mut self) {
        self.cash = self.initial_cash;
        self.position = 0;
        self.trades.clear();
    }
}
