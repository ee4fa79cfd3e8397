//! Instrument listing (`exchangeInfo`) models.

use serde::Deserialize;

/// The subset of the `exchangeInfo` response this crate reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeInfo {
    pub symbols: Vec<SymbolMetadata>,
}

impl ExchangeInfo {
    /// Returns the identifiers of symbols currently trading, in listing order.
    pub fn trading_symbols(&self) -> Vec<String> {
        self.symbols
            .iter()
            .filter(|s| s.status == TradingStatus::Trading)
            .map(|s| s.symbol.clone())
            .collect()
    }
}

/// Reference data for a single trading pair.
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolMetadata {
    pub symbol: String,
    pub status: TradingStatus,
}

/// Trading state of a symbol. Anything but `TRADING` is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum TradingStatus {
    Trading,
    /// `BREAK`, `HALT`, `PRE_TRADING`, ...
    Other(String),
}

impl From<String> for TradingStatus {
    fn from(status: String) -> Self {
        if status == "TRADING" {
            Self::Trading
        } else {
            Self::Other(status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_trading_symbols_in_order() {
        let json = r#"{
            "timezone": "UTC",
            "symbols": [
                {"symbol": "ETHUSDT", "status": "TRADING", "baseAsset": "ETH"},
                {"symbol": "XRPUSDT", "status": "BREAK"},
                {"symbol": "BTCUSDT", "status": "TRADING"}
            ]
        }"#;
        let info: ExchangeInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.trading_symbols(), vec!["ETHUSDT", "BTCUSDT"]);
        assert_eq!(info.symbols[1].status, TradingStatus::Other("BREAK".into()));
    }

    #[test]
    fn missing_symbols_array_fails() {
        assert!(serde_json::from_str::<ExchangeInfo>(r#"{"timezone": "UTC"}"#).is_err());
    }
}
