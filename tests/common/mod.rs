//! Shared test utilities and constants.

#![allow(dead_code)]

use std::time::Duration;

use dipscan::auth::ExchangeCredentials;
use dipscan::{ClientSettings, ExchangeClient};

pub const API_KEY: &str = "test-api-key";
pub const API_SECRET: &str = "test-api-secret";

/// Nothing listens on port 1, so connecting fails immediately.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

pub const EXCHANGE_INFO_JSON: &str = include_str!("../fixtures/exchange_info.json");
pub const KLINES_JSON: &str = include_str!("../fixtures/klines.json");
pub const ORDER_ACK_JSON: &str = include_str!("../fixtures/order_ack.json");
pub const ALL_ORDERS_JSON: &str = include_str!("../fixtures/all_orders.json");

/// Client settings pointed at `base_url` with near-instant retries.
pub fn test_settings(base_url: &str) -> ClientSettings {
    ClientSettings {
        base_url: base_url.to_string(),
        market_timeout: Duration::from_secs(2),
        signed_timeout: Duration::from_secs(2),
        retry_base_delay: Duration::from_millis(1),
        ..ClientSettings::default()
    }
}

pub fn public_client(base_url: &str) -> ExchangeClient {
    ExchangeClient::new(test_settings(base_url), None).expect("failed to build client")
}

pub fn signed_client(base_url: &str) -> ExchangeClient {
    let credentials =
        ExchangeCredentials::new(API_KEY, API_SECRET).expect("failed to build credentials");
    ExchangeClient::new(test_settings(base_url), Some(credentials)).expect("failed to build client")
}
