//! Derived portfolio valuation. Computed on demand, never stored.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::portfolio::Portfolio;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valuation {
    pub portfolio_value: Decimal,
    pub total_pnl: Decimal,
    pub total_pnl_pct: Decimal,
}

impl Valuation {
    /// cash + position * close, measured against the portfolio's initial cash.
    pub fn compute(portfolio: &Portfolio, current_close: Decimal) -> Self {
        let portfolio_value = portfolio
            .cash()
            .saturating_add(Decimal::from(portfolio.position()).saturating_mul(current_close));
        let total_pnl = portfolio_value.saturating_sub(portfolio.initial_cash());
        // zero initial cash has no meaningful percentage
        let total_pnl_pct = total_pnl
            .checked_div(portfolio.initial_cash())
            .map_or(Decimal::ZERO, |ratio| ratio.saturating_mul(dec!(100)));
        Valuation {
            portfolio_value,
            total_pnl,
            total_pnl_pct,
        }
    }
}
