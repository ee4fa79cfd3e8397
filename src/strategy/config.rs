//! Strategy parameters and loading.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Indicator windows, rule thresholds and target markups.
///
/// Every field has a default, so a JSON file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub fast_window: usize,
    pub slow_window: usize,
    pub band_window: usize,
    /// Standard deviations subtracted from the mean for the lower band.
    pub band_std_dev: Decimal,
    /// Moving-average-gap rule fires when `factor * slow_sma >= close`.
    pub ma_gap_factor: Decimal,
    /// Lower-band rule fires when `factor * lower_band >= close`.
    pub band_gap_factor: Decimal,
    /// Target sell price as a multiple of the trigger price.
    pub target_markup: Decimal,
    /// Low-gap rule fires when `slow_sma - low > pct * low`.
    pub low_gap_pct: Decimal,
    pub low_gap_markup: Decimal,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            fast_window: 10,
            slow_window: 30,
            band_window: 14,
            band_std_dev: Decimal::TWO,
            ma_gap_factor: Decimal::new(9, 1),
            band_gap_factor: Decimal::new(98, 2),
            target_markup: Decimal::new(1045, 3),
            low_gap_pct: Decimal::new(3, 2),
            low_gap_markup: Decimal::new(102, 2),
        }
    }
}

impl StrategyConfig {
    /// Loads strategy parameters from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds
    /// invalid values.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            crate::DipscanError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            crate::DipscanError::Config(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks windows are non-zero and factors positive.
    ///
    /// # Errors
    ///
    /// Returns [`DipscanError::Config`](crate::DipscanError::Config)
    /// naming the first offending field.
    pub fn validate(&self) -> crate::Result<()> {
        for (name, window) in [
            ("fast_window", self.fast_window),
            ("slow_window", self.slow_window),
            ("band_window", self.band_window),
        ] {
            if window == 0 {
                return Err(crate::DipscanError::Config(format!(
                    "{name} must be at least 1"
                )));
            }
        }
        if self.band_std_dev.is_sign_negative() {
            return Err(crate::DipscanError::Config(
                "band_std_dev must not be negative".into(),
            ));
        }
        for (name, value) in [
            ("ma_gap_factor", self.ma_gap_factor),
            ("band_gap_factor", self.band_gap_factor),
            ("target_markup", self.target_markup),
            ("low_gap_pct", self.low_gap_pct),
            ("low_gap_markup", self.low_gap_markup),
        ] {
            if value <= Decimal::ZERO {
                return Err(crate::DipscanError::Config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}
