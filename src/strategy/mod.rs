//! Dip-buying rules over indicator-augmented candle series.
//!
//! A [`Rule`] is a pure predicate over one candle index of an
//! [`IndicatorFrame`]. Rules never read or write shared state; the signals
//! they produce are collected by the caller's [`EvaluationSession`]. An
//! undefined indicator value, or an index past the end of the series, never
//! triggers a rule.

pub mod config;

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::Result;
use crate::indicators::{IndicatorSeries, lower_band, sma};
use crate::models::Candle;
use crate::models::candle::closes;
use config::StrategyConfig;

/// A detected buy opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Signal {
    /// Open time of the triggering candle, in milliseconds.
    pub time: i64,
    pub trigger_price: Decimal,
    pub target_sell_price: Decimal,
}

/// Candles plus the indicator series the rules read, all index-aligned.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    candles: Vec<Candle>,
    fast_sma: IndicatorSeries,
    slow_sma: IndicatorSeries,
    lower_band: IndicatorSeries,
}

impl IndicatorFrame {
    /// Computes the fast/slow moving averages and the lower band over the
    /// closing prices.
    ///
    /// # Errors
    ///
    /// Returns [`DipscanError::Config`](crate::DipscanError::Config) if the
    /// configuration is invalid.
    pub fn build(candles: Vec<Candle>, config: &StrategyConfig) -> Result<Self> {
        config.validate()?;
        let close = closes(&candles);
        Ok(Self {
            fast_sma: sma(&close, config.fast_window)?,
            slow_sma: sma(&close, config.slow_window)?,
            lower_band: lower_band(&close, config.band_window, config.band_std_dev)?,
            candles,
        })
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn fast_sma(&self) -> &IndicatorSeries {
        &self.fast_sma
    }

    pub fn slow_sma(&self) -> &IndicatorSeries {
        &self.slow_sma
    }

    pub fn lower_band(&self) -> &IndicatorSeries {
        &self.lower_band
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Index of the most recent candle.
    pub fn last_index(&self) -> Option<usize> {
        self.candles.len().checked_sub(1)
    }

    /// Closing price of the most recent candle.
    pub fn last_price(&self) -> Option<Decimal> {
        self.candles.last().map(|c| c.close)
    }
}

/// The available buy rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Close at least 10% under the slow moving average.
    MovingAverageGap,
    /// Close at least 2% under the lower band.
    LowerBand,
    /// Candle low more than 3% under the slow moving average.
    LowGap,
}

impl Rule {
    pub const ALL: [Rule; 3] = [Self::MovingAverageGap, Self::LowerBand, Self::LowGap];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MovingAverageGap => "ma_gap",
            Self::LowerBand => "lower_band",
            Self::LowGap => "low_gap",
        }
    }

    /// Evaluates the rule at `index`, returning the signal it would emit.
    pub fn check(self, frame: &IndicatorFrame, index: usize, config: &StrategyConfig) -> Option<Signal> {
        let candle = frame.candles.get(index)?;
        match self {
            Self::MovingAverageGap => {
                let slow = frame.slow_sma.get(index)?;
                if config.ma_gap_factor.checked_mul(slow)? < candle.close {
                    return None;
                }
                signal(candle.time, candle.close, config.target_markup)
            }
            Self::LowerBand => {
                let band = frame.lower_band.get(index)?;
                if config.band_gap_factor.checked_mul(band)? < candle.close {
                    return None;
                }
                signal(candle.time, candle.close, config.target_markup)
            }
            Self::LowGap => {
                let slow = frame.slow_sma.get(index)?;
                let gap = slow.checked_sub(candle.low)?;
                if gap <= Decimal::ZERO || gap <= config.low_gap_pct.checked_mul(candle.low)? {
                    return None;
                }
                signal(candle.time, candle.low, config.low_gap_markup)
            }
        }
    }
}

/// `None` when the target price overflows.
fn signal(time: i64, price: Decimal, markup: Decimal) -> Option<Signal> {
    Some(Signal {
        time,
        trigger_price: price,
        target_sell_price: price.checked_mul(markup)?,
    })
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rule {
    type Err = crate::DipscanError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| crate::DipscanError::Config(format!("unknown rule: {s:?}")))
    }
}

/// Accumulates the signals of one evaluation run.
#[derive(Debug, Clone)]
pub struct EvaluationSession {
    config: StrategyConfig,
    signals: Vec<Signal>,
}

impl EvaluationSession {
    #[must_use]
    pub fn new(config: StrategyConfig) -> Self {
        Self {
            config,
            signals: Vec::new(),
        }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Evaluates `rule` at `index`, recording a signal when it triggers.
    pub fn evaluate(&mut self, rule: Rule, frame: &IndicatorFrame, index: usize) -> bool {
        match rule.check(frame, index, &self.config) {
            Some(signal) => {
                self.signals.push(signal);
                true
            }
            None => false,
        }
    }

    /// Evaluates `rule` at every index after the first, returning how many
    /// signals were recorded.
    pub fn scan(&mut self, rule: Rule, frame: &IndicatorFrame) -> usize {
        (1..frame.len())
            .filter(|&i| self.evaluate(rule, frame, i))
            .count()
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn into_signals(self) -> Vec<Signal> {
        self.signals
    }
}
