//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  An invoice prints every line item AND the total. If the lines are     │
//! │  floats, the printed lines may not add up to the printed total.        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every intermediate is an exact count of cents, so the itemized      │
//! │    breakdown always reconciles with the stored total.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tourbiller_core::money::Money;
//!
//! let rate = Money::from_major(50);          // Rs. 50.00
//! let waiting = Money::from_cents(20_050);   // Rs. 200.50
//! assert_eq!((rate + waiting).cents(), 25_050);
//!
//! // Values coming off a form are coerced once, at the edge
//! assert_eq!(Money::from_major_f64(1234.5).cents(), 123_450);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::currency::format_currency;
use crate::types::{Distance, Percentage};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents (1/100 of a rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: subtraction may go negative before a clamp is applied
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Clamping lives in the engine**: `Money` itself never silently clamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole rupees.
    ///
    /// ## Example
    /// ```rust
    /// use tourbiller_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(7800).cents(), 780_000);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Converts a coerced form value (rupees as a float) to cents.
    ///
    /// Rounds half away from zero. NaN and infinities become zero, so a
    /// malformed value degrades to a safe amount instead of poisoning totals.
    ///
    /// ## Example
    /// ```rust
    /// use tourbiller_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_f64(10.005).cents(), 1001);
    /// assert_eq!(Money::from_major_f64(f64::NAN), Money::zero());
    /// ```
    pub fn from_major_f64(major: f64) -> Self {
        if !major.is_finite() {
            return Money::zero();
        }
        // 10.005 * 100 = 1000.4999..., nudge away from zero before rounding
        let scaled = major * 100.0;
        let nudged = scaled + scaled.signum() * 1e-7;
        Money(nudged.round() as i64)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the value as a float, for display widgets only.
    #[inline]
    pub fn as_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Floors the value at zero.
    ///
    /// ## Example
    /// ```rust
    /// use tourbiller_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-550).non_negative(), Money::zero());
    /// assert_eq!(Money::from_cents(550).non_negative().cents(), 550);
    /// ```
    #[inline]
    pub const fn non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Charge for travelling `distance` at `self` per kilometre.
    ///
    /// Distances are metres, so the product is divided by 1000 and rounded
    /// half away from zero to the nearest cent. Whole-kilometre distances
    /// are always exact.
    ///
    /// ## Example
    /// ```rust
    /// use tourbiller_core::{Distance, Money};
    ///
    /// let rate = Money::from_major(50);
    /// assert_eq!(rate.per_km(Distance::from_km(150)), Money::from_major(7500));
    /// // 12.345 km @ Rs. 50 = Rs. 617.25
    /// assert_eq!(rate.per_km(Distance::from_metres(12_345)).cents(), 61_725);
    /// ```
    pub fn per_km(&self, distance: Distance) -> Money {
        // i128: metres * cents can exceed i64 for absurd odometer values
        let product = self.0 as i128 * distance.metres() as i128;
        let rounded = if product >= 0 {
            (product + 500) / 1000
        } else {
            (product - 500) / 1000
        };
        Money(rounded as i64)
    }

    /// Returns `rate` percent of this amount, rounded half-up to a cent.
    ///
    /// ## Example
    /// ```rust
    /// use tourbiller_core::{Money, Percentage};
    ///
    /// let subtotal = Money::from_major(10_000);
    /// let markup = subtotal.percentage(Percentage::from_bps(1250)); // 12.5%
    /// assert_eq!(markup, Money::from_major(1250));
    /// ```
    pub fn percentage(&self, rate: Percentage) -> Money {
        let product = self.0 as i128 * rate.bps() as i128;
        let rounded = if product >= 0 {
            (product + 5000) / 10000
        } else {
            (product - 5000) / 10000
        };
        Money(rounded as i64)
    }

    /// Multiplies money by a count (days, persons).
    #[inline]
    pub const fn times(&self, count: i64) -> Self {
        Money(self.0 * count)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Displays the invoice format, e.g. `Rs. 1,234.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_currency(*self))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, count: i64) -> Self {
        Money(self.0 * count)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents_and_parts() {
        let money = Money::from_cents(123_450);
        assert_eq!(money.rupees(), 1234);
        assert_eq!(money.cents_part(), 50);
    }

    #[test]
    fn test_from_major_f64_rounding() {
        assert_eq!(Money::from_major_f64(1234.5).cents(), 123_450);
        assert_eq!(Money::from_major_f64(0.1 + 0.2).cents(), 30);
        assert_eq!(Money::from_major_f64(-5.5).cents(), -550);
        assert_eq!(Money::from_major_f64(f64::INFINITY), Money::zero());
    }

    #[test]
    fn test_display_uses_invoice_format() {
        assert_eq!(Money::from_cents(123_450).to_string(), "Rs. 1,234.50");
        assert_eq!(Money::zero().to_string(), "Rs. 0.00");
    }

    #[test]
    fn test_per_km_whole_kilometres_is_exact() {
        let rate = Money::from_major(30);
        assert_eq!(rate.per_km(Distance::from_km(20)), Money::from_major(600));
        assert_eq!(rate.per_km(Distance::zero()), Money::zero());
    }

    #[test]
    fn test_per_km_fractional_rounds_to_cent() {
        // 0.5 km @ Rs. 0.01 = 0.5 cent → rounds up to 1 cent
        let rate = Money::from_cents(1);
        assert_eq!(rate.per_km(Distance::from_metres(500)).cents(), 1);
        // 0.4 km @ Rs. 0.01 = 0.4 cent → rounds down
        assert_eq!(rate.per_km(Distance::from_metres(400)).cents(), 0);
    }

    #[test]
    fn test_percentage() {
        let amount = Money::from_cents(999);
        // 10% of 9.99 = 0.999 → 1.00
        assert_eq!(amount.percentage(Percentage::from_bps(1000)).cents(), 100);
        assert_eq!(amount.percentage(Percentage::zero()), Money::zero());
    }

    #[test]
    fn test_non_negative_and_sum() {
        assert_eq!(Money::from_cents(-1).non_negative(), Money::zero());
        let total: Money = [Money::from_major(1), Money::from_major(2)].into_iter().sum();
        assert_eq!(total, Money::from_major(3));
    }
}
