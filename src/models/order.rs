//! Order placement, cancellation and query models.
//!
//! [`OrderRequest`] describes a new order; it is turned into insertion-ordered
//! [`QueryParams`] right before signing. [`OrderReport`] decodes whatever the
//! order endpoints answer with. The test endpoint answers `{}`, so every
//! report field is optional.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::auth::QueryParams;
use crate::price::PriceFormatter;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

/// Order type specifying how the order should be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
    Market,
    StopLoss,
    StopLossLimit,
    TakeProfit,
    TakeProfitLimit,
    LimitMaker,
}

impl OrderType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Limit => "LIMIT",
            Self::Market => "MARKET",
            Self::StopLoss => "STOP_LOSS",
            Self::StopLossLimit => "STOP_LOSS_LIMIT",
            Self::TakeProfit => "TAKE_PROFIT",
            Self::TakeProfitLimit => "TAKE_PROFIT_LIMIT",
            Self::LimitMaker => "LIMIT_MAKER",
        }
    }
}

/// Time in force specifying how long the order remains active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good 'til cancelled (default).
    Gtc,
    /// Immediate or cancel.
    Ioc,
    /// Fill or kill.
    Fok,
}

impl TimeInForce {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gtc => "GTC",
            Self::Ioc => "IOC",
            Self::Fok => "FOK",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(OrderSide, OrderType, TimeInForce);

/// A new order, before timestamping and signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Decimal,
    pub time_in_force: TimeInForce,
}

impl OrderRequest {
    /// Creates a good-til-cancelled order.
    #[must_use]
    pub fn new(
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            order_type,
            quantity,
            price,
            time_in_force: TimeInForce::Gtc,
        }
    }

    /// Creates a good-til-cancelled limit order.
    #[must_use]
    pub fn limit(symbol: &str, side: OrderSide, quantity: Decimal, price: Decimal) -> Self {
        Self::new(symbol, side, OrderType::Limit, quantity, price)
    }

    /// Sets the time in force.
    #[must_use]
    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }

    /// Builds the parameter list in the order the exchange documents.
    ///
    /// `timestamp` and `signature` are added by the client when it signs.
    ///
    /// # Errors
    ///
    /// Returns [`DipscanError::Config`](crate::DipscanError::Config) if the
    /// symbol is empty, quantity or price is not positive, or the price
    /// cannot be formatted.
    pub fn to_params(&self, prices: &PriceFormatter, recv_window: u64) -> Result<QueryParams> {
        self.validate()?;
        Ok(QueryParams::new()
            .with("symbol", &self.symbol)
            .with("side", self.side)
            .with("type", self.order_type)
            .with("timeInForce", self.time_in_force)
            .with("quantity", self.quantity.normalize())
            .with("price", prices.format(self.price)?)
            .with("recvWindow", recv_window))
    }

    fn validate(&self) -> Result<()> {
        if self.symbol.is_empty() {
            return Err(crate::DipscanError::Config("order symbol is empty".into()));
        }
        if self.quantity <= Decimal::ZERO {
            return Err(crate::DipscanError::Config(format!(
                "order quantity must be positive, got {}",
                self.quantity
            )));
        }
        if self.price <= Decimal::ZERO {
            return Err(crate::DipscanError::Config(format!(
                "order price must be positive, got {}",
                self.price
            )));
        }
        Ok(())
    }
}

/// Order acknowledgement or status as returned by the order endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderReport {
    pub symbol: Option<String>,
    pub order_id: Option<u64>,
    pub client_order_id: Option<String>,
    pub price: Option<Decimal>,
    pub orig_qty: Option<Decimal>,
    pub executed_qty: Option<Decimal>,
    /// `NEW`, `PARTIALLY_FILLED`, `FILLED`, `CANCELED`, ...
    pub status: Option<String>,
    pub time_in_force: Option<TimeInForce>,
    #[serde(rename = "type")]
    pub order_type: Option<OrderType>,
    pub side: Option<OrderSide>,
    /// Set on placement and cancellation acknowledgements.
    pub transact_time: Option<u64>,
    /// Set on order queries.
    pub time: Option<u64>,
}

impl OrderReport {
    /// True for the empty acknowledgement of the test endpoint.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
