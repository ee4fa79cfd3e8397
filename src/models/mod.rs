//! Typed models for the Binance spot REST API.
//!
//! Contains kline normalization, instrument listing, and order
//! request/response types.

pub mod candle;
pub mod exchange_info;
pub mod order;

pub use candle::{Candle, Interval};
pub use exchange_info::{ExchangeInfo, SymbolMetadata, TradingStatus};
pub use order::{OrderReport, OrderRequest, OrderSide, OrderType, TimeInForce};
