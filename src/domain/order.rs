//! Order requests.
//!
//! A request is plain data: nothing here knows about cash or positions.
//! Validation of shares and limit price lives here; everything that needs
//! portfolio state is decided by [`crate::domain::execution`].

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use super::error::OrderRejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }

    /// How the market price relates to the limit when a limit order of this
    /// side is refused.
    pub fn limit_relation(&self) -> &'static str {
        match self {
            Side::Buy => "above",
            Side::Sell => "below",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(format!("unknown side: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Market,
    Limit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub order_type: OrderType,
    pub side: Side,
    /// Signed so that malformed requests can be represented and refused.
    pub shares: i64,
    pub limit_price: Option<Decimal>,
}

impl OrderRequest {
    pub fn market(side: Side, shares: i64) -> Self {
        OrderRequest {
            order_type: OrderType::Market,
            side,
            shares,
            limit_price: None,
        }
    }

    pub fn limit(side: Side, shares: i64, limit_price: Decimal) -> Self {
        OrderRequest {
            order_type: OrderType::Limit,
            side,
            shares,
            limit_price: Some(limit_price),
        }
    }

    /// Check the request in isolation.
    ///
    /// Returns the share count as unsigned and the limit price that applies
    /// (`None` for market orders, even if one was supplied).
    pub fn validate(&self) -> Result<(u64, Option<Decimal>), OrderRejection> {
        if self.shares <= 0 {
            return Err(OrderRejection::InvalidOrder {
                reason: format!("shares must be a positive integer, got {}", self.shares),
            });
        }
        let shares = self.shares as u64;

        match self.order_type {
            OrderType::Market => Ok((shares, None)),
            OrderType::Limit => match self.limit_price {
                Some(limit) if limit > Decimal::ZERO => Ok((shares, Some(limit))),
                Some(limit) => Err(OrderRejection::InvalidOrder {
                    reason: format!("limit price must be positive, got {limit}"),
                }),
                None => Err(OrderRejection::InvalidOrder {
                    reason: "limit order requires a limit price".into(),
                }),
            },
        }
    }
}

/// Raw-price admissibility of a limit order.
pub fn limit_admits(side: Side, market: Decimal, limit: Decimal) -> bool {
    match side {
        Side::Buy => market <= limit,
        Side::Sell => market >= limit,
    }
}
