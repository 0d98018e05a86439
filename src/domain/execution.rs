//! Order execution against the current bar.
//!
//! Fills are all-or-nothing at the bar close adjusted by slippage, with a
//! flat commission per trade. A rejected order never touches the portfolio.
//!
//! Check order:
//! 1. share count is a positive integer
//! 2. limit orders carry a positive limit price
//! 3. limit admissibility against the raw close
//! 4. BUY total cost fits in cash
//! 5. SELL share count fits in the position

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, warn};

use super::error::OrderRejection;
use super::order::{limit_admits, OrderRequest, Side};
use super::portfolio::Portfolio;
use super::price_bar::PriceBar;
use super::trade::Trade;

/// Fill pricing parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    /// Fraction of the market price, 0.001 = 0.1%.
    pub slippage_rate: Decimal,
    /// Flat fee per trade.
    pub commission: Decimal,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            slippage_rate: dec!(0.001),
            commission: dec!(1.00),
        }
    }
}

/// BUY fills above the market, SELL fills below it. `None` when the
/// adjusted price does not fit in a `Decimal`.
pub fn apply_slippage(side: Side, market_price: Decimal, slippage_rate: Decimal) -> Option<Decimal> {
    match side {
        Side::Buy => market_price.checked_mul(Decimal::ONE + slippage_rate),
        Side::Sell => market_price.checked_mul(Decimal::ONE - slippage_rate),
    }
}

/// Priced but not yet applied fill.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub side: Side,
    pub shares: u64,
    pub execution_price: Decimal,
    pub commission: Decimal,
    pub total: Decimal,
}

/// Price a fill: cost for BUY is `shares * price + commission`, proceeds for
/// SELL are `shares * price - commission`. `None` on `Decimal` overflow.
pub fn price_fill(
    side: Side,
    shares: u64,
    market_price: Decimal,
    config: &ExecutionConfig,
) -> Option<Fill> {
    let execution_price = apply_slippage(side, market_price, config.slippage_rate)?;
    let notional = Decimal::from(shares).checked_mul(execution_price)?;
    let total = match side {
        Side::Buy => notional.checked_add(config.commission)?,
        Side::Sell => notional.checked_sub(config.commission)?,
    };
    Some(Fill {
        side,
        shares,
        execution_price,
        commission: config.commission,
        total,
    })
}

/// Execute `request` against `bar` and apply it to `portfolio`.
pub fn execute(
    portfolio: &mut Portfolio,
    request: &OrderRequest,
    bar: &PriceBar,
    config: &ExecutionConfig,
) -> Result<Trade, OrderRejection> {
    let result = check(portfolio, request, bar, config);
    let fill = match result {
        Ok(fill) => fill,
        Err(rejection) => {
            warn!(side = %request.side, shares = request.shares, date = %bar.date, %rejection, "order rejected");
            return Err(rejection);
        }
    };

    let trade = Trade {
        date: bar.date,
        action: fill.side,
        shares: fill.shares,
        execution_price: fill.execution_price,
        commission: fill.commission,
        total: fill.total,
    };
    portfolio.apply(trade.clone());

    info!(
        side = %trade.action,
        shares = trade.shares,
        price = %trade.execution_price,
        market = %bar.market_price(),
        total = %trade.total,
        date = %trade.date,
        "order filled"
    );
    Ok(trade)
}

fn check(
    portfolio: &Portfolio,
    request: &OrderRequest,
    bar: &PriceBar,
    config: &ExecutionConfig,
) -> Result<Fill, OrderRejection> {
    let (shares, limit) = request.validate()?;
    let market = bar.market_price();

    if let Some(limit) = limit {
        if !limit_admits(request.side, market, limit) {
            return Err(OrderRejection::LimitNotMet {
                side: request.side,
                market,
                limit,
            });
        }
    }

    if request.side == Side::Sell && shares > portfolio.position() {
        return Err(OrderRejection::InsufficientPosition {
            requested: shares,
            held: portfolio.position(),
        });
    }

    let fill = price_fill(request.side, shares, market, config).ok_or_else(|| match request.side {
        // a cost too large to represent is never affordable
        Side::Buy => OrderRejection::InsufficientCash {
            shares,
            required: Decimal::MAX,
            available: portfolio.cash(),
        },
        Side::Sell => OrderRejection::InvalidOrder {
            reason: format!("proceeds of selling {shares} shares are out of range"),
        },
    })?;

    if request.side == Side::Buy && fill.total > portfolio.cash() {
        return Err(OrderRejection::InsufficientCash {
            shares,
            required: fill.total,
            available: portfolio.cash(),
        });
    }
    Ok(fill)
}
