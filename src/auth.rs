//! Request signing for the Binance `SIGNED` endpoints.
//!
//! Signed requests carry the API key in the `X-MBX-APIKEY` header and a
//! `signature` query parameter: the lowercase hex
//! `HMAC-SHA256(secret, query_string)` of every other parameter, joined in
//! insertion order. The string that is signed is the exact string that is
//! sent, so [`QueryParams`] keeps its pairs in the order they were pushed.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::form_urlencoded;
use zeroize::Zeroizing;

use crate::Result;

/// Name of the header that carries the API key.
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Insertion-ordered request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pair; later pushes never reorder earlier ones.
    pub fn push(&mut self, key: &str, value: impl fmt::Display) -> &mut Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Builder-style variant of [`push`](Self::push).
    #[must_use]
    pub fn with(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.push(key, value);
        self
    }

    /// Returns the value of the first pair named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Joins the pairs as `k1=v1&k2=v2` in insertion order.
    ///
    /// Keys and values are form-urlencoded, so a value can never smuggle in
    /// another pair and the string is already in the form a URL keeps it.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Returns a copy with `signature` appended as the final pair.
    ///
    /// # Errors
    ///
    /// Returns [`DipscanError::Config`](crate::DipscanError::Config) if the
    /// secret is empty.
    pub fn signed(&self, secret: &[u8]) -> Result<Self> {
        let signature = sign(self, secret)?;
        Ok(self.clone().with("signature", signature))
    }
}

fn encode(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

/// Computes the lowercase hex `HMAC-SHA256` of the parameters' query string.
///
/// # Errors
///
/// Returns [`DipscanError::Config`](crate::DipscanError::Config) if the
/// secret is empty.
pub fn sign(params: &QueryParams, secret: &[u8]) -> Result<String> {
    if secret.is_empty() {
        return Err(crate::DipscanError::Config(
            "secret key is empty, cannot sign request".into(),
        ));
    }

    let mut mac = Hmac::<Sha256>::new_from_slice(secret)
        .map_err(|e| crate::DipscanError::Config(format!("invalid HMAC key: {e}")))?;
    mac.update(params.to_query_string().as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Current wall-clock time in milliseconds since the UNIX epoch.
///
/// # Errors
///
/// Returns [`DipscanError::Config`](crate::DipscanError::Config) if the
/// system clock reads earlier than the epoch.
pub fn timestamp_ms() -> Result<u64> {
    millis_since_epoch(SystemTime::now())
}

fn millis_since_epoch(now: SystemTime) -> Result<u64> {
    let elapsed = now.duration_since(UNIX_EPOCH).map_err(|e| {
        crate::DipscanError::Config(format!("system clock before UNIX epoch: {e}"))
    })?;
    Ok(elapsed.as_millis() as u64)
}

/// API key and secret for the signed endpoints.
///
/// Read-only once built. The secret is wiped from memory on drop and both
/// values are redacted from `Debug` output.
#[derive(Clone)]
pub struct ExchangeCredentials {
    api_key: String,
    secret_key: Zeroizing<String>,
}

impl ExchangeCredentials {
    /// Builds credentials, rejecting empty values.
    ///
    /// # Errors
    ///
    /// Returns [`DipscanError::Config`](crate::DipscanError::Config) if
    /// either value is empty.
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        let secret_key = Zeroizing::new(secret_key.into());
        if api_key.is_empty() {
            return Err(crate::DipscanError::Config("API key is empty".into()));
        }
        if secret_key.is_empty() {
            return Err(crate::DipscanError::Config("secret key is empty".into()));
        }
        Ok(Self {
            api_key,
            secret_key,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn secret(&self) -> &[u8] {
        self.secret_key.as_bytes()
    }
}

impl fmt::Debug for ExchangeCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeCredentials")
            .field("api_key", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}
