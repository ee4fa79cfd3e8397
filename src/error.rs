//! Crate-level error types.
//!
//! [`DipscanError`] unifies every failure source (configuration, transport,
//! decoding, market data, exchange rejections) behind a single enum so
//! callers can match on the variant they care about while still using the
//! `?` operator for easy propagation.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DipscanError>;

/// Code reported for failures that never reached the exchange.
pub const TRANSPORT_FAILURE_CODE: i64 = -1;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum DipscanError {
    /// Setup defect: unknown endpoint, missing secret, invalid setting.
    #[error("configuration error: {0}")]
    Config(String),

    /// The request never produced an HTTP response (connect, timeout, I/O).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not valid JSON or had an unexpected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Kline rows were malformed or could not be fetched.
    #[error("market data error: {0}")]
    MarketData(String),

    /// The exchange answered with a well-formed error payload.
    #[error("exchange error {code}: {msg}")]
    Exchange { code: i64, msg: String },
}

impl DipscanError {
    /// Returns the failure code callers report per order.
    ///
    /// Local transport failures map to `-1`, exchange rejections carry the
    /// exchange's own code. Other variants have no code.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Transport(_) => Some(TRANSPORT_FAILURE_CODE),
            Self::Exchange { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether a GET request that failed this way may be attempted again.
    pub(crate) fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            // HTTP 429 and 5xx are surfaced with the status as code when the
            // body is not an exchange error payload. -1001 (disconnected),
            // -1003 (rate limited) and -1007 (backend timeout) are the
            // exchange's own transient codes.
            Self::Exchange { code, .. } => {
                *code == 429 || (500..600).contains(code) || matches!(code, -1001 | -1003 | -1007)
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for DipscanError {
    fn from(e: reqwest::Error) -> Self {
        // Strip the URL: signed query strings must never end up in logs.
        Self::Transport(e.without_url().to_string())
    }
}

impl From<serde_json::Error> for DipscanError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
