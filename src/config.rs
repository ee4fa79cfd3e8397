//! Application configuration loaded from environment variables.
//!
//! Credentials are only needed for order operations:
//! - `BINANCE_API_KEY`: API key sent in the `X-MBX-APIKEY` header
//! - `BINANCE_API_SECRET`: secret used to sign requests
//!
//! Optional overrides:
//! - `BINANCE_BASE_URL`: REST base URL (testnet, staging)
//! - `DIPSCAN_INTERVAL`: kline interval to scan (default `4h`)
//! - `DIPSCAN_RULES`: comma-separated rules (default `lower_band`)
//! - `DIPSCAN_MAX_INFLIGHT`: concurrent exchange requests (default 4)
//! - `DIPSCAN_RECV_WINDOW`: `recvWindow` in milliseconds (default 5000)
//! - `DIPSCAN_STRATEGY_FILE`: JSON file with [`StrategyConfig`] overrides

use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::ExchangeCredentials;
use crate::models::Interval;
use crate::rest::{ClientSettings, DEFAULT_BASE_URL, DEFAULT_RECV_WINDOW};
use crate::strategy::Rule;
use crate::strategy::config::StrategyConfig;

const DEFAULT_INTERVAL: Interval = Interval::FourHours;
const DEFAULT_MAX_INFLIGHT: usize = 4;

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub exchange: ExchangeConfig,
    pub scan: ScanConfig,
}

/// Exchange connection values.
#[derive(Debug)]
pub struct ExchangeConfig {
    pub base_url: String,
    /// Present only when both key and secret are set.
    pub credentials: Option<ExchangeCredentials>,
    pub recv_window: u64,
    pub max_inflight: usize,
}

/// What the scanner evaluates.
#[derive(Debug)]
pub struct ScanConfig {
    pub interval: Interval,
    pub rules: Vec<Rule>,
    pub strategy_file: Option<PathBuf>,
}

impl AppConfig {
    /// Client settings derived from this configuration.
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.exchange.base_url.clone(),
            max_inflight: self.exchange.max_inflight,
            recv_window: self.exchange.recv_window,
            ..ClientSettings::default()
        }
    }

    /// Loads the strategy file if one is configured, otherwise the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DipscanError::Config`](crate::DipscanError::Config) if the
    /// file cannot be read or is invalid.
    pub fn strategy(&self) -> crate::Result<StrategyConfig> {
        match &self.scan.strategy_file {
            Some(path) => StrategyConfig::load(path),
            None => Ok(StrategyConfig::default()),
        }
    }
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`DipscanError::Config`](crate::DipscanError::Config) if only
/// one of the two credential variables is set or a value does not parse.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let base_url = non_empty_var("BINANCE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let api_key = non_empty_var("BINANCE_API_KEY");
    let api_secret = non_empty_var("BINANCE_API_SECRET");
    let credentials = match (api_key, api_secret) {
        (Some(key), Some(secret)) => Some(ExchangeCredentials::new(key, secret)?),
        (Some(_), None) => {
            return Err(crate::DipscanError::Config(
                "BINANCE_API_KEY is set but BINANCE_API_SECRET is missing".to_string(),
            ));
        }
        (None, Some(_)) => {
            return Err(crate::DipscanError::Config(
                "BINANCE_API_SECRET is set but BINANCE_API_KEY is missing".to_string(),
            ));
        }
        (None, None) => None,
    };

    let interval = parsed_var("DIPSCAN_INTERVAL")?.unwrap_or(DEFAULT_INTERVAL);
    let recv_window = parsed_var("DIPSCAN_RECV_WINDOW")?.unwrap_or(DEFAULT_RECV_WINDOW);
    let max_inflight = parsed_var("DIPSCAN_MAX_INFLIGHT")?.unwrap_or(DEFAULT_MAX_INFLIGHT);

    let rules = match non_empty_var("DIPSCAN_RULES") {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Rule::from_str)
            .collect::<crate::Result<Vec<_>>>()?,
        None => vec![Rule::LowerBand],
    };

    Ok(AppConfig {
        exchange: ExchangeConfig {
            base_url,
            credentials,
            recv_window,
            max_inflight,
        },
        scan: ScanConfig {
            interval,
            rules,
            strategy_file: non_empty_var("DIPSCAN_STRATEGY_FILE").map(PathBuf::from),
        },
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Parses a non-empty environment variable.
fn parsed_var<T>(name: &str) -> crate::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    non_empty_var(name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| crate::DipscanError::Config(format!("invalid {name} {raw:?}: {e}")))
        })
        .transpose()
}
