//! Kline (candlestick) models and normalization.
//!
//! The klines endpoint answers with an array of positional arrays:
//! `[openTime, open, high, low, close, volume, closeTime, ...]`. Only the
//! first six columns are kept; anything after `volume` is ignored no matter
//! how many columns the exchange appends.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::Result;

/// Columns every kline row must carry.
const KLINE_COLUMNS: usize = 6;

/// A single OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candle {
    /// Open time in milliseconds since the UNIX epoch.
    pub time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Candle {
    /// Normalizes one positional kline row.
    ///
    /// # Errors
    ///
    /// Returns [`DipscanError::MarketData`](crate::DipscanError::MarketData)
    /// if the row is not an array, has fewer than six columns, or holds a
    /// non-numeric value in one of them.
    pub fn from_kline_row(row: &Value) -> Result<Self> {
        let columns = row
            .as_array()
            .ok_or_else(|| market_data(format!("kline row is not an array: {row}")))?;
        if columns.len() < KLINE_COLUMNS {
            return Err(market_data(format!(
                "kline row has {} columns, expected at least {KLINE_COLUMNS}",
                columns.len()
            )));
        }

        Ok(Self {
            time: integer_column(&columns[0], "time")?,
            open: decimal_column(&columns[1], "open")?,
            high: decimal_column(&columns[2], "high")?,
            low: decimal_column(&columns[3], "low")?,
            close: decimal_column(&columns[4], "close")?,
            volume: decimal_column(&columns[5], "volume")?,
        })
    }

    /// Normalizes a full klines response into candles ordered by time.
    ///
    /// Fails as a whole: a single bad row means no candles are returned.
    ///
    /// # Errors
    ///
    /// Returns [`DipscanError::MarketData`](crate::DipscanError::MarketData)
    /// if the response is not an array of valid rows or the open times are
    /// not strictly increasing.
    pub fn from_klines(response: &Value) -> Result<Vec<Self>> {
        let rows = response
            .as_array()
            .ok_or_else(|| market_data("klines response is not an array".to_string()))?;

        let mut candles: Vec<Self> = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let candle = Self::from_kline_row(row).map_err(|e| match e {
                crate::DipscanError::MarketData(msg) => market_data(format!("row {index}: {msg}")),
                other => other,
            })?;
            if let Some(prev) = candles.last()
                && candle.time <= prev.time
            {
                return Err(market_data(format!(
                    "row {index}: open time {} does not follow {}",
                    candle.time, prev.time
                )));
            }
            candles.push(candle);
        }
        Ok(candles)
    }
}

/// Returns the closing prices of a candle series.
pub fn closes(candles: &[Candle]) -> Vec<Decimal> {
    candles.iter().map(|c| c.close).collect()
}

fn market_data(msg: String) -> crate::DipscanError {
    crate::DipscanError::MarketData(msg)
}

fn decimal_column(value: &Value, name: &str) -> Result<Decimal> {
    let parsed = match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        _ => None,
    };
    parsed.ok_or_else(|| market_data(format!("{name} is not numeric: {value}")))
}

fn integer_column(value: &Value, name: &str) -> Result<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| market_data(format!("{name} is not an integer: {value}")))
}

/// Kline intervals accepted by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    OneSecond,
    OneMinute,
    ThreeMinutes,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    FourHours,
    SixHours,
    EightHours,
    TwelveHours,
    OneDay,
    ThreeDays,
    OneWeek,
    OneMonth,
}

impl Interval {
    const ALL: [Interval; 16] = [
        Self::OneSecond,
        Self::OneMinute,
        Self::ThreeMinutes,
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::OneHour,
        Self::TwoHours,
        Self::FourHours,
        Self::SixHours,
        Self::EightHours,
        Self::TwelveHours,
        Self::OneDay,
        Self::ThreeDays,
        Self::OneWeek,
        Self::OneMonth,
    ];

    /// Returns the wire-format interval expected by the klines endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneSecond => "1s",
            Self::OneMinute => "1m",
            Self::ThreeMinutes => "3m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
            Self::OneHour => "1h",
            Self::TwoHours => "2h",
            Self::FourHours => "4h",
            Self::SixHours => "6h",
            Self::EightHours => "8h",
            Self::TwelveHours => "12h",
            Self::OneDay => "1d",
            Self::ThreeDays => "3d",
            Self::OneWeek => "1w",
            Self::OneMonth => "1M",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = crate::DipscanError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| crate::DipscanError::Config(format!("unknown kline interval: {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn trailing_columns_are_ignored() {
        let row = json!([
            1620000000000i64,
            "100.0",
            "101.0",
            "99.0",
            "100.5",
            "10.0",
            "extra1",
            "extra2"
        ]);
        let candle = Candle::from_kline_row(&row).unwrap();
        assert_eq!(
            candle,
            Candle {
                time: 1620000000000,
                open: dec!(100.0),
                high: dec!(101.0),
                low: dec!(99.0),
                close: dec!(100.5),
                volume: dec!(10.0),
            }
        );
    }

    #[test]
    fn numeric_json_values_are_accepted() {
        let row = json!([1, 1.5, 2, 0.5, 1.25, 300]);
        let candle = Candle::from_kline_row(&row).unwrap();
        assert_eq!(candle.time, 1);
        assert_eq!(candle.open, dec!(1.5));
        assert_eq!(candle.close, dec!(1.25));
        assert_eq!(candle.volume, dec!(300));
    }

    #[test]
    fn short_rows_are_rejected() {
        let row = json!([1620000000000i64, "100.0", "101.0", "99.0", "100.5"]);
        let err = Candle::from_kline_row(&row).unwrap_err();
        assert!(matches!(err, crate::DipscanError::MarketData(_)));
    }

    #[test]
    fn non_numeric_fields_are_rejected() {
        let row = json!([1620000000000i64, "abc", "101.0", "99.0", "100.5", "10.0"]);
        assert!(Candle::from_kline_row(&row).is_err());

        let row = json!([1620000000000i64, "100", "101.0", null, "100.5", "10.0"]);
        assert!(Candle::from_kline_row(&row).is_err());

        let row = json!(["soon", "100", "101.0", "99", "100.5", "10.0"]);
        assert!(Candle::from_kline_row(&row).is_err());
    }

    #[test]
    fn one_bad_row_fails_the_whole_series() {
        let response = json!([
            [1, "1", "1", "1", "1", "1"],
            [2, "1", "1", "1"],
        ]);
        let err = Candle::from_klines(&response).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn times_must_strictly_increase() {
        let response = json!([
            [2, "1", "1", "1", "1", "1"],
            [2, "1", "1", "1", "1", "1"],
        ]);
        assert!(Candle::from_klines(&response).is_err());
    }

    #[test]
    fn non_array_response_is_rejected() {
        let response = json!({"code": -1121, "msg": "Invalid symbol."});
        assert!(Candle::from_klines(&response).is_err());
    }

    #[test]
    fn interval_wire_names() {
        assert_eq!(Interval::FourHours.as_str(), "4h");
        assert_eq!("1M".parse::<Interval>().unwrap(), Interval::OneMonth);
        assert_eq!("1m".parse::<Interval>().unwrap(), Interval::OneMinute);
        assert!("4hours".parse::<Interval>().is_err());
    }
}
