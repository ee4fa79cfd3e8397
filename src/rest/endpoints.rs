//! The closed set of REST operations this client talks to.

use std::fmt;
use std::str::FromStr;

use reqwest::Method;

/// A logical exchange operation and its `(method, path)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Instrument metadata (wire name: `"exchangeInfo"`).
    ExchangeInfo,
    /// Candlestick history (wire name: `"klines"`).
    Klines,
    /// Live order placement (wire name: `"order"`).
    Order,
    /// Order validation without execution (wire name: `"testOrder"`).
    TestOrder,
    CancelOrder,
    /// Single order status.
    QueryOrder,
    AllOrders,
}

impl Endpoint {
    /// Every endpoint, in table order.
    pub const ALL: [Endpoint; 7] = [
        Self::ExchangeInfo,
        Self::Klines,
        Self::Order,
        Self::TestOrder,
        Self::CancelOrder,
        Self::QueryOrder,
        Self::AllOrders,
    ];

    /// Returns the logical operation name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExchangeInfo => "exchangeInfo",
            Self::Klines => "klines",
            Self::Order => "order",
            Self::TestOrder => "testOrder",
            Self::CancelOrder => "cancelOrder",
            Self::QueryOrder => "queryOrder",
            Self::AllOrders => "allOrders",
        }
    }

    /// Returns the path relative to the exchange base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::ExchangeInfo => "/api/v3/exchangeInfo",
            Self::Klines => "/api/v3/klines",
            Self::Order | Self::CancelOrder | Self::QueryOrder => "/api/v3/order",
            Self::TestOrder => "/api/v3/order/test",
            Self::AllOrders => "/api/v3/allOrders",
        }
    }

    /// Returns the HTTP method the exchange expects.
    pub fn method(self) -> Method {
        match self {
            Self::Order | Self::TestOrder => Method::POST,
            Self::CancelOrder => Method::DELETE,
            Self::ExchangeInfo | Self::Klines | Self::QueryOrder | Self::AllOrders => Method::GET,
        }
    }

    /// Whether the exchange requires an API key and signature.
    pub fn is_signed(self) -> bool {
        !matches!(self, Self::ExchangeInfo | Self::Klines)
    }

    /// Only idempotent reads may be retried.
    pub fn is_retryable(self) -> bool {
        self.method() == Method::GET
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Endpoint {
    type Err = crate::DipscanError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == name)
            .ok_or_else(|| crate::DipscanError::Config(format!("unknown endpoint: {name:?}")))
    }
}
