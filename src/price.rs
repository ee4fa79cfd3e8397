//! Fixed-point price formatting for order parameters.
//!
//! The exchange rejects prices written in scientific notation and prices
//! with more precision than the symbol's tick size allows. Prices are
//! rounded to a number of significant digits and written in plain
//! positional notation.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::Result;

/// Significant digits kept when no precision is configured.
pub const DEFAULT_SIGNIFICANT_DIGITS: u32 = 12;

/// Largest precision a [`Decimal`] can represent.
const MAX_SIGNIFICANT_DIGITS: u32 = 28;

/// Formats decimals as plain fixed-point strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceFormatter {
    significant_digits: u32,
}

impl Default for PriceFormatter {
    fn default() -> Self {
        Self {
            significant_digits: DEFAULT_SIGNIFICANT_DIGITS,
        }
    }
}

impl PriceFormatter {
    /// Creates a formatter keeping `significant_digits` digits.
    ///
    /// # Errors
    ///
    /// Returns [`DipscanError::Config`](crate::DipscanError::Config) unless
    /// `1 <= significant_digits <= 28`.
    pub fn new(significant_digits: u32) -> Result<Self> {
        if !(1..=MAX_SIGNIFICANT_DIGITS).contains(&significant_digits) {
            return Err(crate::DipscanError::Config(format!(
                "price precision must be between 1 and {MAX_SIGNIFICANT_DIGITS}, got {significant_digits}"
            )));
        }
        Ok(Self { significant_digits })
    }

    #[must_use]
    pub fn significant_digits(&self) -> u32 {
        self.significant_digits
    }

    /// Rounds `value` half-to-even and writes it without an exponent.
    ///
    /// Trailing fractional zeros are dropped, so `84.0` becomes `"84"`.
    ///
    /// # Errors
    ///
    /// Returns [`DipscanError::Config`](crate::DipscanError::Config) if the
    /// rounded value cannot be represented.
    pub fn format(&self, value: Decimal) -> Result<String> {
        let rounded = value.round_sf(self.significant_digits).ok_or_else(|| {
            crate::DipscanError::Config(format!(
                "cannot round {value} to {} significant digits",
                self.significant_digits
            ))
        })?;
        Ok(rounded.normalize().to_string())
    }

    /// Formats a float via its shortest round-trip representation.
    ///
    /// # Errors
    ///
    /// Returns [`DipscanError::Config`](crate::DipscanError::Config) for
    /// NaN, infinities, and magnitudes a [`Decimal`] cannot hold.
    pub fn format_f64(&self, value: f64) -> Result<String> {
        if !value.is_finite() {
            return Err(crate::DipscanError::Config(format!(
                "price must be finite, got {value}"
            )));
        }
        // `f64`'s Display never uses an exponent.
        let decimal = Decimal::from_str(&value.to_string())
            .or_else(|_| Decimal::from_scientific(&format!("{value:e}")))
            .map_err(|e| crate::DipscanError::Config(format!("unrepresentable price {value}: {e}")))?;
        self.format(decimal)
    }
}
