//! Binance spot REST client.
//!
//! [`ExchangeClient`] is the single point of contact with the exchange. It
//! resolves every [`Endpoint`] against the base URL up front, bounds the
//! number of requests in flight, timestamps and signs authenticated calls,
//! retries idempotent reads, and decodes responses into JSON values or
//! typed [`DipscanError`]s.

pub mod endpoints;
mod market;
mod orders;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

pub use endpoints::Endpoint;

use crate::auth::{API_KEY_HEADER, ExchangeCredentials, QueryParams, timestamp_ms};
use crate::price::{DEFAULT_SIGNIFICANT_DIGITS, PriceFormatter};
use crate::{DipscanError, Result};

/// Default public REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Default tolerance, in milliseconds, between request timestamp and receipt.
pub const DEFAULT_RECV_WINDOW: u64 = 5000;

/// Longest error body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

/// Tunables for [`ExchangeClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    /// Upper bound on concurrently outstanding requests.
    pub max_inflight: usize,
    /// Per-attempt timeout for unauthenticated market data calls.
    pub market_timeout: Duration,
    /// Per-attempt timeout for signed calls.
    pub signed_timeout: Duration,
    /// Attempts for GET requests; writes are always attempted once.
    pub max_attempts: u32,
    /// First retry delay, doubled on every further attempt.
    pub retry_base_delay: Duration,
    pub recv_window: u64,
    /// Significant digits kept when formatting order prices.
    pub price_precision: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_inflight: 4,
            market_timeout: Duration::from_secs(5),
            signed_timeout: Duration::from_secs(10),
            max_attempts: 3,
            retry_base_delay: Duration::from_millis(200),
            recv_window: DEFAULT_RECV_WINDOW,
            price_precision: DEFAULT_SIGNIFICANT_DIGITS,
        }
    }
}

/// Async client for the exchange's REST surface.
///
/// Cloning is cheap; clones share the connection pool, the in-flight limit
/// and the credentials.
#[derive(Clone)]
pub struct ExchangeClient {
    http: reqwest::Client,
    endpoints: Arc<HashMap<Endpoint, Url>>,
    credentials: Option<Arc<ExchangeCredentials>>,
    inflight: Arc<Semaphore>,
    settings: Arc<ClientSettings>,
    prices: PriceFormatter,
}

impl ExchangeClient {
    /// Builds a client, validating the base URL and every setting.
    ///
    /// Without credentials only market data calls are possible.
    ///
    /// # Errors
    ///
    /// Returns [`DipscanError::Config`] if the base URL is not an
    /// `http(s)` URL, a limit is zero, the price precision is out of range,
    /// or the HTTP client cannot be built.
    pub fn new(settings: ClientSettings, credentials: Option<ExchangeCredentials>) -> Result<Self> {
        let base = Url::parse(&settings.base_url).map_err(|e| {
            DipscanError::Config(format!("invalid base URL {:?}: {e}", settings.base_url))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(DipscanError::Config(format!(
                "base URL must be http or https, got {:?}",
                settings.base_url
            )));
        }
        if settings.max_inflight == 0 {
            return Err(DipscanError::Config("max_inflight must be at least 1".into()));
        }
        if settings.max_attempts == 0 {
            return Err(DipscanError::Config("max_attempts must be at least 1".into()));
        }
        let prices = PriceFormatter::new(settings.price_precision)?;

        if base.query().is_some() || base.fragment().is_some() {
            return Err(DipscanError::Config(format!(
                "base URL must not carry a query or fragment, got {:?}",
                settings.base_url
            )));
        }

        // Endpoint paths are appended to the base path so a proxy prefix survives.
        let prefix = base.path().trim_end_matches('/');
        let mut endpoints = HashMap::with_capacity(Endpoint::ALL.len());
        for endpoint in Endpoint::ALL {
            let mut url = base.clone();
            url.set_path(&format!("{prefix}{}", endpoint.path()));
            endpoints.insert(endpoint, url);
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("dipscan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DipscanError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoints: Arc::new(endpoints),
            credentials: credentials.map(Arc::new),
            inflight: Arc::new(Semaphore::new(settings.max_inflight)),
            settings: Arc::new(settings),
            prices,
        })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn price_formatter(&self) -> &PriceFormatter {
        &self.prices
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Returns the absolute URL an endpoint resolves to.
    pub fn url(&self, endpoint: Endpoint) -> Result<&Url> {
        self.endpoints
            .get(&endpoint)
            .ok_or_else(|| DipscanError::Config(format!("endpoint {endpoint} is not configured")))
    }

    /// Executes one operation and returns the decoded JSON body.
    ///
    /// When `authenticated` is set the API key header is attached and, on
    /// every attempt, a fresh `timestamp` is appended and the parameters are
    /// signed. GET operations are retried with exponential backoff on
    /// transport failures and HTTP 429/5xx; other methods are sent once.
    ///
    /// # Errors
    ///
    /// - [`DipscanError::Config`] if `authenticated` is required but unset,
    ///   or no credentials are configured
    /// - [`DipscanError::Transport`] (code `-1`) if no response arrived
    /// - [`DipscanError::Decode`] if a successful response is not JSON
    /// - [`DipscanError::Exchange`] for error payloads and failure statuses
    pub async fn submit(
        &self,
        endpoint: Endpoint,
        params: &QueryParams,
        authenticated: bool,
    ) -> Result<Value> {
        if endpoint.is_signed() && !authenticated {
            return Err(DipscanError::Config(format!(
                "endpoint {endpoint} requires an authenticated request"
            )));
        }
        let credentials = if authenticated {
            Some(self.credentials()?)
        } else {
            None
        };

        let attempts = if endpoint.is_retryable() {
            self.settings.max_attempts
        } else {
            1
        };

        let mut attempt = 1;
        loop {
            match self.send_once(endpoint, params, credentials).await {
                Err(e) if attempt < attempts && e.is_retryable() => {
                    let delay = self.settings.retry_base_delay * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        endpoint = %endpoint,
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn credentials(&self) -> Result<&ExchangeCredentials> {
        self.credentials.as_deref().ok_or_else(|| {
            DipscanError::Config("API credentials are required for signed endpoints".into())
        })
    }

    async fn send_once(
        &self,
        endpoint: Endpoint,
        params: &QueryParams,
        credentials: Option<&ExchangeCredentials>,
    ) -> Result<Value> {
        // Stamp and sign last so the signature covers exactly what is sent.
        let query = match credentials {
            Some(creds) => {
                let mut stamped = params.clone();
                stamped.push("timestamp", timestamp_ms()?);
                stamped.signed(creds.secret())?
            }
            None => params.clone(),
        };
        let url = with_query(self.url(endpoint)?, &query);

        let timeout = if credentials.is_some() {
            self.settings.signed_timeout
        } else {
            self.settings.market_timeout
        };
        let mut request = self.http.request(endpoint.method(), url).timeout(timeout);
        if let Some(creds) = credentials {
            request = request.header(API_KEY_HEADER, creds.api_key());
        }

        let _permit = self
            .inflight
            .acquire()
            .await
            .map_err(|_| DipscanError::Transport("request limiter closed".into()))?;

        debug!(endpoint = %endpoint, method = %endpoint.method(), "sending request");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(endpoint = %endpoint, status = status.as_u16(), bytes = body.len(), "received response");

        decode_body(status, &body)
    }
}

/// Attaches the encoded query to `url`; the URL keeps it byte for byte.
fn with_query(url: &Url, params: &QueryParams) -> Url {
    let mut url = url.clone();
    let query = params.to_query_string();
    if !query.is_empty() {
        url.set_query(Some(&query));
    }
    url
}

/// Turns a status and body into a JSON value or a typed error.
fn decode_body(status: StatusCode, body: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => {
            if let Some(err) = exchange_error(&value) {
                return Err(err);
            }
            if !status.is_success() {
                return Err(DipscanError::Exchange {
                    code: i64::from(status.as_u16()),
                    msg: truncate(&value.to_string()),
                });
            }
            Ok(value)
        }
        Err(e) if status.is_success() => Err(DipscanError::Decode(format!(
            "response is not valid JSON: {e}"
        ))),
        Err(_) => Err(DipscanError::Exchange {
            code: i64::from(status.as_u16()),
            msg: truncate(body),
        }),
    }
}

/// Recognizes the exchange's `{"code": <int>, "msg": <string>}` error payload.
fn exchange_error(value: &Value) -> Option<DipscanError> {
    let code = value.get("code")?.as_i64()?;
    let msg = value.get("msg")?.as_str()?;
    Some(DipscanError::Exchange {
        code,
        msg: msg.to_string(),
    })
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_ERROR_BODY).collect()
}
