//! # Value Types
//!
//! Distances, percentages and the status enums shared by every record.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Value Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Distance     │   │   Percentage    │   │ BookingStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  metres (i64)   │   │  bps (u32)      │   │  Confirmed      │       │
//! │  │  150 km =       │   │  1250 = 12.5%   │   │  Cancelled      │       │
//! │  │   150_000 m     │   │                 │   │  Completed      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Persisted enums are stored as their UPPER-CASE wire names.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Distance
// =============================================================================

/// A distance (or odometer position) in metres.
///
/// ## Why Metres?
/// Odometers read to a tenth of a kilometre and rates are quoted per km.
/// Metres keep every reading exact while `Money::per_km` does the one
/// rounding step to a cent.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Distance(i64);

/// An odometer reading. Same unit as [`Distance`].
pub type MeterReading = Distance;

impl Distance {
    /// Creates a distance from metres.
    #[inline]
    pub const fn from_metres(metres: i64) -> Self {
        Distance(metres)
    }

    /// Creates a distance from whole kilometres.
    #[inline]
    pub const fn from_km(km: i64) -> Self {
        Distance(km * 1000)
    }

    /// Creates a distance from a coerced form value in kilometres.
    ///
    /// Non-finite values become zero.
    pub fn from_km_f64(km: f64) -> Self {
        if !km.is_finite() {
            return Distance::zero();
        }
        Distance((km * 1000.0).round() as i64)
    }

    /// Returns the distance in metres.
    #[inline]
    pub const fn metres(&self) -> i64 {
        self.0
    }

    /// Returns the distance in kilometres (display only).
    #[inline]
    pub fn km_f64(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Zero distance.
    #[inline]
    pub const fn zero() -> Self {
        Distance(0)
    }

    /// Checks if the distance is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the distance is greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// `self - other`, floored at zero.
    ///
    /// ## Example
    /// ```rust
    /// use tourbiller_core::Distance;
    ///
    /// let d = Distance::from_km(120).saturating_sub(Distance::from_km(100));
    /// assert_eq!(d, Distance::from_km(20));
    /// assert_eq!(Distance::from_km(80).saturating_sub(Distance::from_km(100)), Distance::zero());
    /// ```
    #[inline]
    pub const fn saturating_sub(&self, other: Distance) -> Distance {
        if self.0 > other.0 {
            Distance(self.0 - other.0)
        } else {
            Distance(0)
        }
    }

    /// Floors a negative distance at zero.
    ///
    /// ## Example
    /// ```rust
    /// use tourbiller_core::Distance;
    ///
    /// assert_eq!(Distance::from_metres(-250).non_negative(), Distance::zero());
    /// assert_eq!(Distance::from_km(3).non_negative(), Distance::from_km(3));
    /// ```
    #[inline]
    pub const fn non_negative(&self) -> Self {
        if self.0 < 0 {
            Distance(0)
        } else {
            Distance(self.0)
        }
    }

    /// Multiplies the distance by a count (e.g. km-per-day × days).
    #[inline]
    pub const fn times(&self, count: i64) -> Self {
        Distance(self.0 * count)
    }
}

/// Displays kilometres with one decimal, e.g. `150.0 km`.
impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} km", self.km_f64())
    }
}

impl Add for Distance {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Distance(self.0 + other.0)
    }
}

impl AddAssign for Distance {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

// =============================================================================
// Percentage
// =============================================================================

/// A percentage in basis points (1 bp = 0.01%).
///
/// Used for quotation markup: 1250 bps = 12.5%.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Percentage(u32);

impl Percentage {
    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percentage(bps)
    }

    /// Creates a percentage from a form value such as `12.5`.
    ///
    /// Negative and non-finite values become zero.
    pub fn from_percent_f64(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return Percentage::zero();
        }
        Percentage((pct * 100.0).round().min(u32::MAX as f64) as u32)
    }

    /// Returns the value in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the value as a percentage (display only).
    #[inline]
    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percentage(0)
    }

    /// Checks if the percentage is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

// =============================================================================
// Status Enums
// =============================================================================

fn not_allowed(field: &str, allowed: &[&str]) -> ValidationError {
    ValidationError::NotAllowed {
        field: field.to_string(),
        allowed: allowed.iter().map(|s| s.to_string()).collect(),
    }
}

/// Whether a vehicle can currently be hired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum VehicleStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
}

impl VehicleStatus {
    pub const ALL: [&'static str; 3] = ["ACTIVE", "INACTIVE", "MAINTENANCE"];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Active => "ACTIVE",
            VehicleStatus::Inactive => "INACTIVE",
            VehicleStatus::Maintenance => "MAINTENANCE",
        }
    }
}

impl FromStr for VehicleStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(VehicleStatus::Active),
            "INACTIVE" => Ok(VehicleStatus::Inactive),
            "MAINTENANCE" => Ok(VehicleStatus::Maintenance),
            _ => Err(not_allowed("status", &Self::ALL)),
        }
    }
}

/// The persisted status of a booking.
///
/// `Ongoing` and `Overdue` are deliberately absent: they are derived at
/// read time, see [`DisplayStatus`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum BookingStatus {
    #[default]
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub const ALL: [&'static str; 3] = ["CONFIRMED", "CANCELLED", "COMPLETED"];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            "COMPLETED" => Ok(BookingStatus::Completed),
            _ => Err(not_allowed("status", &Self::ALL)),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status shown in booking lists and on the dashboard. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum DisplayStatus {
    Confirmed,
    Ongoing,
    Overdue,
    Cancelled,
    Completed,
}

impl DisplayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayStatus::Confirmed => "CONFIRMED",
            DisplayStatus::Ongoing => "ONGOING",
            DisplayStatus::Overdue => "OVERDUE",
            DisplayStatus::Cancelled => "CANCELLED",
            DisplayStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to the advance when a booking is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum RefundStatus {
    Refunded,
    Forfeited,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundStatus::Refunded => "REFUNDED",
            RefundStatus::Forfeited => "FORFEITED",
        }
    }
}

/// How a bill was settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum PaymentMethod {
    #[default]
    Cash,
    Credit,
}

impl PaymentMethod {
    pub const ALL: [&'static str; 2] = ["CASH", "CREDIT"];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Credit => "CREDIT",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CASH" => Ok(PaymentMethod::Cash),
            "CREDIT" => Ok(PaymentMethod::Credit),
            _ => Err(not_allowed("paymentMethod", &Self::ALL)),
        }
    }
}

/// Lifecycle of a quotation sent to a customer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum QuotationStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Expired,
}

impl QuotationStatus {
    pub const ALL: [&'static str; 4] = ["DRAFT", "SENT", "ACCEPTED", "EXPIRED"];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuotationStatus::Draft => "DRAFT",
            QuotationStatus::Sent => "SENT",
            QuotationStatus::Accepted => "ACCEPTED",
            QuotationStatus::Expired => "EXPIRED",
        }
    }
}

impl FromStr for QuotationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(QuotationStatus::Draft),
            "SENT" => Ok(QuotationStatus::Sent),
            "ACCEPTED" => Ok(QuotationStatus::Accepted),
            "EXPIRED" => Ok(QuotationStatus::Expired),
            _ => Err(not_allowed("status", &Self::ALL)),
        }
    }
}

/// Which transport-pricing strategy a quotation was priced with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PricingMode {
    PerKm,
    #[default]
    PerDay,
}

impl PricingMode {
    pub const ALL: [&'static str; 2] = ["PER_KM", "PER_DAY"];

    pub fn as_str(&self) -> &'static str {
        match self {
            PricingMode::PerKm => "PER_KM",
            PricingMode::PerDay => "PER_DAY",
        }
    }
}

impl FromStr for PricingMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PER_KM" => Ok(PricingMode::PerKm),
            "PER_DAY" => Ok(PricingMode::PerDay),
            _ => Err(not_allowed("pricingMode", &Self::ALL)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_from_km_f64() {
        assert_eq!(Distance::from_km_f64(12.5).metres(), 12_500);
        assert_eq!(Distance::from_km_f64(f64::NAN), Distance::zero());
        assert_eq!(Distance::from_km(150).to_string(), "150.0 km");
    }

    #[test]
    fn test_percentage_from_percent_f64() {
        assert_eq!(Percentage::from_percent_f64(12.5).bps(), 1250);
        assert_eq!(Percentage::from_percent_f64(-4.0), Percentage::zero());
        assert_eq!(Percentage::from_percent_f64(f64::NAN), Percentage::zero());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("confirmed".parse::<BookingStatus>().unwrap(), BookingStatus::Confirmed);
        assert_eq!("SENT".parse::<QuotationStatus>().unwrap(), QuotationStatus::Sent);
        assert_eq!("per_km".parse::<PricingMode>().unwrap(), PricingMode::PerKm);
        assert!("ARCHIVED".parse::<QuotationStatus>().is_err());
        assert!("CHEQUE".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_serde_wire_names() {
        let json = serde_json::to_string(&DisplayStatus::Overdue).unwrap();
        assert_eq!(json, "\"OVERDUE\"");
        let json = serde_json::to_string(&PricingMode::PerDay).unwrap();
        assert_eq!(json, "\"PER_DAY\"");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(BookingStatus::default(), BookingStatus::Confirmed);
        assert_eq!(QuotationStatus::default(), QuotationStatus::Draft);
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
        assert_eq!(VehicleStatus::default(), VehicleStatus::Active);
    }
}
