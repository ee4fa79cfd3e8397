//! Concurrent scan of many symbols through the data → indicator → rule
//! pipeline.
//!
//! Symbols are processed with at most `concurrency` pipelines in flight; the
//! client's own request limit still applies underneath. Each pipeline has its
//! own timeout. Dropping the returned future aborts every in-flight request.

use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::Result;
use crate::models::Interval;
use crate::rest::ExchangeClient;
use crate::strategy::config::StrategyConfig;
use crate::strategy::{EvaluationSession, IndicatorFrame, Rule, Signal};

/// How a scan fetches and evaluates its symbols.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub interval: Interval,
    /// Candles requested per symbol; `None` uses the exchange default.
    pub candle_limit: Option<u16>,
    /// Symbols processed at the same time.
    pub concurrency: usize,
    /// Budget for one symbol's fetch and evaluation, retries included.
    pub task_timeout: Duration,
}

impl ScanOptions {
    #[must_use]
    pub fn new(interval: Interval) -> Self {
        Self {
            interval,
            candle_limit: None,
            concurrency: 4,
            task_timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn with_candle_limit(mut self, limit: u16) -> Self {
        self.candle_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }
}

/// The outcome of evaluating one symbol at its latest candle.
#[derive(Debug, Clone)]
pub struct SymbolReport {
    pub symbol: String,
    pub last_price: Decimal,
    /// Candles and indicators, kept only for symbols that matched.
    pub frame: Option<IndicatorFrame>,
    /// Rules that triggered, in the order they were evaluated.
    pub matched: Vec<Rule>,
    pub signals: Vec<Signal>,
}

impl SymbolReport {
    pub fn is_match(&self) -> bool {
        !self.matched.is_empty()
    }
}

/// Evaluates `rules` at the latest candle of every symbol.
///
/// Symbols whose candles cannot be fetched in time, or that have no
/// candles, are logged and left out. Reports come back in input order.
///
/// # Errors
///
/// Returns [`DipscanError::Config`](crate::DipscanError::Config) if the
/// strategy configuration or concurrency is invalid; per-symbol failures
/// never abort the scan.
pub async fn scan_symbols(
    client: &ExchangeClient,
    symbols: Vec<String>,
    options: &ScanOptions,
    config: &StrategyConfig,
    rules: &[Rule],
) -> Result<Vec<SymbolReport>> {
    config.validate()?;
    if options.concurrency == 0 {
        return Err(crate::DipscanError::Config(
            "scan concurrency must be at least 1".into(),
        ));
    }

    let total = symbols.len();
    let mut reports: Vec<(usize, SymbolReport)> = stream::iter(symbols.into_iter().enumerate())
        .map(|(position, symbol)| async move {
            let outcome =
                tokio::time::timeout(options.task_timeout, scan_one(client, &symbol, options, config, rules))
                    .await;
            match outcome {
                Ok(Ok(Some(report))) => Some((position, report)),
                Ok(Ok(None)) => {
                    debug!(symbol = %symbol, "no candles, skipping");
                    None
                }
                Ok(Err(e)) => {
                    warn!(symbol = %symbol, error = %e, "skipping symbol");
                    None
                }
                Err(_) => {
                    warn!(
                        symbol = %symbol,
                        timeout_ms = options.task_timeout.as_millis() as u64,
                        "symbol timed out, skipping"
                    );
                    None
                }
            }
        })
        .buffer_unordered(options.concurrency)
        .filter_map(|report| async move { report })
        .collect()
        .await;

    reports.sort_by_key(|(position, _)| *position);
    let reports: Vec<SymbolReport> = reports.into_iter().map(|(_, r)| r).collect();
    info!(
        scanned = total,
        evaluated = reports.len(),
        matched = reports.iter().filter(|r| r.is_match()).count(),
        "scan complete"
    );
    Ok(reports)
}

async fn scan_one(
    client: &ExchangeClient,
    symbol: &str,
    options: &ScanOptions,
    config: &StrategyConfig,
    rules: &[Rule],
) -> Result<Option<SymbolReport>> {
    let candles = client
        .get_candles_limited(symbol, options.interval, options.candle_limit)
        .await?;
    let frame = IndicatorFrame::build(candles, config)?;
    let (Some(index), Some(last_price)) = (frame.last_index(), frame.last_price()) else {
        return Ok(None);
    };

    let mut session = EvaluationSession::new(config.clone());
    let matched: Vec<Rule> = rules
        .iter()
        .copied()
        .filter(|rule| session.evaluate(*rule, &frame, index))
        .collect();
    for rule in &matched {
        info!(symbol, rule = %rule, last_price = %last_price, "strategy match");
    }

    let frame = (!matched.is_empty()).then_some(frame);
    Ok(Some(SymbolReport {
        symbol: symbol.to_string(),
        last_price,
        frame,
        matched,
        signals: session.into_signals(),
    }))
}
