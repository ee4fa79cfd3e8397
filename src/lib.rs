//! Binance spot REST client and dip-buying signal engine.
//!
//! Fetches instrument listings and klines, computes moving averages and a
//! lower Bollinger band, evaluates buy rules against them, and places,
//! cancels or queries signed orders.

pub mod auth;
pub mod config;
pub mod error;
pub mod indicators;
pub mod models;
pub mod price;
pub mod rest;
pub mod scanner;
pub mod strategy;

pub use error::{DipscanError, Result};
pub use rest::{ClientSettings, Endpoint, ExchangeClient};
