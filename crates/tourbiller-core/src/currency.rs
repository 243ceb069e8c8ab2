//! # Currency Presentation
//!
//! The display contract for amounts on invoices and quotations, plus the
//! exchange rate a bill carries when it is priced in a foreign currency.
//!
//! The calculation engine never converts currencies. A bill is computed in
//! its own currency; [`ExchangeRate::convert`] is applied afterwards to
//! record the base-currency (LKR) figure used by revenue dashboards.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

/// Currency every amount is reported in unless the bill says otherwise.
pub const DEFAULT_CURRENCY: &str = "LKR";

/// Literal marker printed before every amount.
const CURRENCY_MARKER: &str = "Rs. ";

/// Formats an amount the way invoices print it.
///
/// Two fixed decimals, comma-grouped thousands, `Rs. ` prefix. A negative
/// amount keeps its sign after the marker.
///
/// ## Example
/// ```rust
/// use tourbiller_core::{format_currency, Money};
///
/// assert_eq!(format_currency(Money::from_cents(123_450)), "Rs. 1,234.50");
/// assert_eq!(format_currency(Money::from_major(1_000_000)), "Rs. 1,000,000.00");
/// assert_eq!(format_currency(Money::from_cents(-5)), "Rs. -0.05");
/// ```
pub fn format_currency(amount: Money) -> String {
    let cents = amount.cents();
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();

    let whole = (abs / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}{}.{:02}", CURRENCY_MARKER, sign, grouped, abs % 100)
}

// =============================================================================
// Exchange Rate
// =============================================================================

/// Units of base currency per one unit of the bill's currency, stored as
/// millionths so it survives the database round trip exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct ExchangeRate(i64);

impl ExchangeRate {
    const SCALE: i64 = 1_000_000;

    /// Rate of 1.0 (bill already in base currency).
    pub const ONE: ExchangeRate = ExchangeRate(Self::SCALE);

    /// Creates a rate from millionths.
    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        ExchangeRate(micros)
    }

    /// Creates a rate from a form value.
    ///
    /// Zero, negative and non-finite values fall back to 1.0: a missing rate
    /// means "same currency".
    pub fn from_f64(rate: f64) -> Self {
        if !rate.is_finite() || rate <= 0.0 {
            return ExchangeRate::ONE;
        }
        ExchangeRate((rate * Self::SCALE as f64).round() as i64)
    }

    /// Returns the rate in millionths.
    #[inline]
    pub const fn micros(&self) -> i64 {
        self.0
    }

    /// Returns the rate as a float (display only).
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }

    /// Converts an amount into base currency, rounded half-up to a cent.
    ///
    /// ## Example
    /// ```rust
    /// use tourbiller_core::{ExchangeRate, Money};
    ///
    /// let usd_rate = ExchangeRate::from_f64(300.0);
    /// assert_eq!(usd_rate.convert(Money::from_major(25)), Money::from_major(7500));
    /// ```
    pub fn convert(&self, amount: Money) -> Money {
        let product = amount.cents() as i128 * self.0 as i128;
        let scale = Self::SCALE as i128;
        let rounded = if product >= 0 {
            (product + scale / 2) / scale
        } else {
            (product - scale / 2) / scale
        };
        Money::from_cents(rounded as i64)
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        ExchangeRate::ONE
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency_grouping() {
        assert_eq!(format_currency(Money::from_cents(0)), "Rs. 0.00");
        assert_eq!(format_currency(Money::from_cents(99_999)), "Rs. 999.99");
        assert_eq!(format_currency(Money::from_cents(100_000)), "Rs. 1,000.00");
        assert_eq!(format_currency(Money::from_cents(123_456_789)), "Rs. 1,234,567.89");
    }

    #[test]
    fn test_format_currency_matches_invoice_sample() {
        assert_eq!(format_currency(Money::from_major_f64(1234.5)), "Rs. 1,234.50");
    }

    #[test]
    fn test_exchange_rate_fallback() {
        assert_eq!(ExchangeRate::from_f64(0.0), ExchangeRate::ONE);
        assert_eq!(ExchangeRate::from_f64(f64::NAN), ExchangeRate::ONE);
        assert_eq!(ExchangeRate::from_f64(-3.0), ExchangeRate::ONE);
    }

    #[test]
    fn test_exchange_rate_convert_rounds() {
        let rate = ExchangeRate::from_f64(1.5);
        // 0.03 * 1.5 = 0.045 → 0.05
        assert_eq!(rate.convert(Money::from_cents(3)).cents(), 5);
        assert_eq!(ExchangeRate::ONE.convert(Money::from_cents(777)).cents(), 777);
    }
}
