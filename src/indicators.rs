//! Rolling-window indicators over decimal series.
//!
//! Every output is aligned 1:1 with its input. Positions before the first
//! full window hold `None`; there is no partial-window averaging and no
//! zero filling.

use rust_decimal::{Decimal, MathematicalOps};

use crate::Result;

/// Indicator values aligned with the candle series they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorSeries(Vec<Option<Decimal>>);

impl IndicatorSeries {
    /// Value at `index`; `None` when undefined or out of range.
    pub fn get(&self, index: usize) -> Option<Decimal> {
        self.0.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of leading undefined positions.
    pub fn undefined_prefix(&self) -> usize {
        self.0.iter().take_while(|v| v.is_none()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<Decimal>> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Option<Decimal>] {
        &self.0
    }
}

impl From<Vec<Option<Decimal>>> for IndicatorSeries {
    fn from(values: Vec<Option<Decimal>>) -> Self {
        Self(values)
    }
}

/// Simple moving average.
///
/// `out[i]` is the mean of `series[i + 1 - window ..= i]` for
/// `i >= window - 1`, `None` before.
///
/// # Errors
///
/// Returns [`DipscanError::Config`](crate::DipscanError::Config) if
/// `window` is zero.
pub fn sma(series: &[Decimal], window: usize) -> Result<IndicatorSeries> {
    check_window(window)?;
    let divisor = Decimal::from(window);

    let mut out = Vec::with_capacity(series.len());
    let mut sum = Decimal::ZERO;
    for (i, value) in series.iter().enumerate() {
        sum = sum.checked_add(*value).ok_or_else(|| overflow("moving average sum"))?;
        if i >= window {
            sum = sum
                .checked_sub(series[i - window])
                .ok_or_else(|| overflow("moving average sum"))?;
        }
        out.push((i + 1 >= window).then(|| sum / divisor));
    }
    Ok(IndicatorSeries(out))
}

/// Lower Bollinger band: rolling mean minus `num_std_dev` population
/// standard deviations (ddof = 0).
///
/// # Errors
///
/// Returns [`DipscanError::Config`](crate::DipscanError::Config) if
/// `window` is zero or `num_std_dev` is negative.
pub fn lower_band(series: &[Decimal], window: usize, num_std_dev: Decimal) -> Result<IndicatorSeries> {
    check_window(window)?;
    if num_std_dev.is_sign_negative() {
        return Err(crate::DipscanError::Config(format!(
            "band width must not be negative, got {num_std_dev}"
        )));
    }

    let mut out = vec![None; series.len()];
    for (i, slot) in out.iter_mut().enumerate().skip(window - 1) {
        let values = &series[i + 1 - window..=i];
        let (mean, std_dev) = mean_and_population_std(values)?;
        let band = num_std_dev
            .checked_mul(std_dev)
            .and_then(|width| mean.checked_sub(width))
            .ok_or_else(|| overflow("lower band"))?;
        *slot = Some(band);
    }
    Ok(IndicatorSeries(out))
}

fn mean_and_population_std(values: &[Decimal]) -> Result<(Decimal, Decimal)> {
    let n = Decimal::from(values.len());
    let mean = checked_sum(values.iter().copied(), "window sum")? / n;
    let squares = values.iter().map(|v| {
        v.checked_sub(mean)
            .and_then(|d| d.checked_mul(d))
            .ok_or_else(|| overflow("squared deviation"))
    });
    let mut total = Decimal::ZERO;
    for square in squares {
        total = total
            .checked_add(square?)
            .ok_or_else(|| overflow("variance"))?;
    }
    let variance = total / n;
    let std_dev = variance.sqrt().ok_or_else(|| {
        crate::DipscanError::MarketData(format!("cannot take square root of variance {variance}"))
    })?;
    Ok((mean, std_dev))
}

fn checked_sum(mut values: impl Iterator<Item = Decimal>, what: &str) -> Result<Decimal> {
    values.try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(v).ok_or_else(|| overflow(what))
    })
}

fn overflow(what: &str) -> crate::DipscanError {
    crate::DipscanError::MarketData(format!("{what} overflows decimal range"))
}

fn check_window(window: usize) -> Result<()> {
    if window == 0 {
        return Err(crate::DipscanError::Config(
            "indicator window must be at least 1".into(),
        ));
    }
    Ok(())
}
