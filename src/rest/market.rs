//! Public market data: instrument listing and klines.

use tracing::{debug, info, warn};

use super::{Endpoint, ExchangeClient};
use crate::auth::QueryParams;
use crate::models::{Candle, ExchangeInfo, Interval};
use crate::{DipscanError, Result};

impl ExchangeClient {
    /// Fetches the full instrument listing.
    ///
    /// # Errors
    ///
    /// Returns a [`DipscanError`] if the request fails or the response has
    /// no `symbols` array.
    pub async fn exchange_info(&self) -> Result<ExchangeInfo> {
        let value = self
            .submit(Endpoint::ExchangeInfo, &QueryParams::new(), false)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Returns the symbols currently trading, in listing order.
    ///
    /// Read failures degrade to an empty list and a warning. An empty list
    /// therefore means "unknown", not "nothing is trading".
    pub async fn list_trading_symbols(&self) -> Vec<String> {
        match self.exchange_info().await {
            Ok(info) => {
                let symbols = info.trading_symbols();
                info!(
                    listed = info.symbols.len(),
                    trading = symbols.len(),
                    "fetched trading symbols"
                );
                symbols
            }
            Err(e) => {
                warn!(error = %e, "failed to list trading symbols, continuing without any");
                Vec::new()
            }
        }
    }

    /// Fetches the latest candles for `symbol`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DipscanError::MarketData`] if the klines cannot be fetched
    /// or normalized; no partial series is ever returned.
    pub async fn get_candles(&self, symbol: &str, interval: Interval) -> Result<Vec<Candle>> {
        self.get_candles_limited(symbol, interval, None).await
    }

    /// Like [`get_candles`](Self::get_candles) with an explicit row limit
    /// (the exchange defaults to 500, maximum 1000).
    ///
    /// # Errors
    ///
    /// Returns [`DipscanError::Config`] for an empty symbol and
    /// [`DipscanError::MarketData`] for any fetch or parse failure.
    pub async fn get_candles_limited(
        &self,
        symbol: &str,
        interval: Interval,
        limit: Option<u16>,
    ) -> Result<Vec<Candle>> {
        if symbol.is_empty() {
            return Err(DipscanError::Config("kline symbol is empty".into()));
        }

        let mut params = QueryParams::new()
            .with("symbol", symbol)
            .with("interval", interval);
        if let Some(limit) = limit {
            params.push("limit", limit);
        }

        let response = match self.submit(Endpoint::Klines, &params, false).await {
            Ok(value) => value,
            Err(e @ DipscanError::Config(_)) => return Err(e),
            Err(e) => {
                return Err(DipscanError::MarketData(format!(
                    "failed to fetch {interval} klines for {symbol}: {e}"
                )));
            }
        };

        let candles = Candle::from_klines(&response).map_err(|e| match e {
            DipscanError::MarketData(msg) => {
                DipscanError::MarketData(format!("{symbol} {interval}: {msg}"))
            }
            other => other,
        })?;
        debug!(symbol, interval = %interval, count = candles.len(), "fetched candles");
        Ok(candles)
    }
}
