//! # Billing Engine
//!
//! Turns odometer readings and rates into an invoiced amount.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Bill Calculation                                  │
//! │                                                                         │
//! │  start_meter, end_meter                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  compute_distance ──► distance (never negative)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BillingMode::from_rates(allowed, package_charge)                      │
//! │       │                                                                 │
//! │       ├── Package  (allowed > 0 AND package > 0)                       │
//! │       │     base = max(0, distance - allowed) × hire_rate              │
//! │       │                                                                 │
//! │       └── Standard (otherwise)                                         │
//! │             base = distance × hire_rate                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  extras = waiting_charge + gate_pass + package_charge                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  total = base + extras        balance = max(0, total - advance)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! In package mode the flat package charge pays for the included distance,
//! which is why it appears in the extras and not in the base charge.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Distance, MeterReading};

// =============================================================================
// Inputs
// =============================================================================

/// Whether the trip is metered in full or only beyond a package allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum BillingMode {
    /// Every kilometre billed at the hire rate (taxi style).
    Standard,
    /// Flat package fee covers `allowed_km`; only the excess is metered.
    Package,
}

impl BillingMode {
    /// Package mode iff both an allowance and a package fee are set.
    #[inline]
    pub fn from_rates(allowed: Distance, package_charge: Money) -> Self {
        if allowed.is_positive() && package_charge.is_positive() {
            BillingMode::Package
        } else {
            BillingMode::Standard
        }
    }
}

/// Rates agreed for a trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RateConfiguration {
    /// Charge per kilometre.
    pub hire_rate: Money,
    /// Distance included in the package (zero when there is no package).
    pub allowed: Distance,
    /// Flat package fee (zero when there is no package).
    pub package_charge: Money,
}

impl RateConfiguration {
    #[inline]
    pub fn mode(&self) -> BillingMode {
        BillingMode::from_rates(self.allowed, self.package_charge)
    }
}

/// Charges added on top of the metered distance. Summed verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExtraCharges {
    pub waiting_charge: Money,
    pub gate_pass: Money,
    pub package_charge: Money,
}

/// Everything the bill form submits that affects the amount.
///
/// Unset fields default to zero, matching the form defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TripInput {
    pub start_meter: MeterReading,
    pub end_meter: MeterReading,
    pub hire_rate: Money,
    pub allowed: Distance,
    pub package_charge: Money,
    pub waiting_charge: Money,
    pub gate_pass: Money,
    pub advance_amount: Money,
}

impl TripInput {
    /// The rate part of the input, with negative money clamped to zero.
    pub fn rates(&self) -> RateConfiguration {
        RateConfiguration {
            hire_rate: self.hire_rate.non_negative(),
            allowed: self.allowed.non_negative(),
            package_charge: self.package_charge.non_negative(),
        }
    }

    /// The extra-charge part of the input, with negative money clamped to zero.
    pub fn extras(&self) -> ExtraCharges {
        ExtraCharges {
            waiting_charge: self.waiting_charge.non_negative(),
            gate_pass: self.gate_pass.non_negative(),
            package_charge: self.package_charge.non_negative(),
        }
    }
}

// =============================================================================
// Outputs
// =============================================================================

/// Every intermediate of a bill, as printed on the invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BillTotals {
    pub mode: BillingMode,
    pub distance: Distance,
    /// Distance beyond the package allowance. Zero in standard mode.
    pub excess_distance: Distance,
    pub base_charge: Money,
    pub extra_charges_total: Money,
    pub total_amount: Money,
    pub balance_due: Money,
}

// =============================================================================
// Operations
// =============================================================================

/// Distance travelled between two odometer readings.
///
/// Returns zero when `end <= start` so a data-entry slip never produces a
/// negative charge.
///
/// ## Example
/// ```rust
/// use tourbiller_core::billing::compute_distance;
/// use tourbiller_core::Distance;
///
/// assert_eq!(compute_distance(Distance::from_km(100), Distance::from_km(250)), Distance::from_km(150));
/// assert_eq!(compute_distance(Distance::from_km(250), Distance::from_km(100)), Distance::zero());
/// ```
#[inline]
pub fn compute_distance(start: MeterReading, end: MeterReading) -> Distance {
    end.saturating_sub(start)
}

/// Distance beyond the package allowance.
#[inline]
pub fn excess_distance(distance: Distance, allowed: Distance) -> Distance {
    distance.saturating_sub(allowed)
}

/// Metered part of the bill.
///
/// ## Example
/// ```rust
/// use tourbiller_core::billing::compute_base_charge;
/// use tourbiller_core::{Distance, Money};
///
/// // Standard: 150 km @ 50
/// let base = compute_base_charge(Distance::from_km(150), Money::from_major(50), Distance::zero(), Money::zero());
/// assert_eq!(base, Money::from_major(7500));
///
/// // Package: 120 km, 100 km included, 20 km excess @ 30
/// let base = compute_base_charge(
///     Distance::from_km(120),
///     Money::from_major(30),
///     Distance::from_km(100),
///     Money::from_major(5000),
/// );
/// assert_eq!(base, Money::from_major(600));
/// ```
pub fn compute_base_charge(
    distance: Distance,
    hire_rate: Money,
    allowed: Distance,
    package_charge: Money,
) -> Money {
    let distance = distance.non_negative();
    let hire_rate = hire_rate.non_negative();

    let billable = match BillingMode::from_rates(allowed, package_charge) {
        BillingMode::Package => excess_distance(distance, allowed),
        BillingMode::Standard => distance,
    };

    hire_rate.per_km(billable)
}

/// Sum of the extra charges.
pub fn compute_extra_charges(extras: &ExtraCharges) -> Money {
    extras.waiting_charge.non_negative()
        + extras.gate_pass.non_negative()
        + extras.package_charge.non_negative()
}

/// Base charge plus extra charges. No markup or discount at this layer.
pub fn compute_total_amount(trip: &TripInput) -> Money {
    compute_bill(trip).total_amount
}

/// `max(0, total - advance)`.
///
/// ## Example
/// ```rust
/// use tourbiller_core::billing::compute_balance;
/// use tourbiller_core::Money;
///
/// assert_eq!(compute_balance(Money::from_major(7800), Money::from_major(1000)), Money::from_major(6800));
/// assert_eq!(compute_balance(Money::from_major(500), Money::from_major(1000)), Money::zero());
/// ```
#[inline]
pub fn compute_balance(total_amount: Money, advance_amount: Money) -> Money {
    (total_amount - advance_amount.non_negative()).non_negative()
}

/// Runs the whole bill calculation and keeps every intermediate.
pub fn compute_bill(trip: &TripInput) -> BillTotals {
    let rates = trip.rates();
    let extras = trip.extras();
    let mode = rates.mode();

    let distance = compute_distance(trip.start_meter, trip.end_meter);
    let excess = match mode {
        BillingMode::Package => excess_distance(distance, rates.allowed),
        BillingMode::Standard => Distance::zero(),
    };

    let base_charge = compute_base_charge(distance, rates.hire_rate, rates.allowed, rates.package_charge);
    let extra_charges_total = compute_extra_charges(&extras);
    let total_amount = base_charge + extra_charges_total;

    BillTotals {
        mode,
        distance,
        excess_distance: excess,
        base_charge,
        extra_charges_total,
        total_amount,
        balance_due: compute_balance(total_amount, trip.advance_amount),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn km(v: i64) -> Distance {
        Distance::from_km(v)
    }

    fn rs(v: i64) -> Money {
        Money::from_major(v)
    }

    #[test]
    fn test_distance_never_negative() {
        for (start, end) in [(100, 100), (250, 100), (0, 0), (5, 4)] {
            assert_eq!(compute_distance(km(start), km(end)), Distance::zero());
        }
    }

    #[test]
    fn test_standard_mode_is_distance_times_rate() {
        for (d, rate) in [(0, 50), (1, 1), (150, 50), (999, 37)] {
            assert_eq!(
                compute_base_charge(km(d), rs(rate), Distance::zero(), Money::zero()),
                rs(d * rate)
            );
        }
    }

    #[test]
    fn test_allowance_without_package_fee_is_standard_mode() {
        // allowed_km alone does not switch to package mode
        let base = compute_base_charge(km(120), rs(30), km(100), Money::zero());
        assert_eq!(base, rs(3600));
        assert_eq!(BillingMode::from_rates(km(100), Money::zero()), BillingMode::Standard);
        assert_eq!(BillingMode::from_rates(Distance::zero(), rs(5000)), BillingMode::Standard);
    }

    #[test]
    fn test_package_mode_within_allowance_is_free() {
        for d in [0, 50, 100] {
            assert_eq!(compute_base_charge(km(d), rs(30), km(100), rs(5000)), Money::zero());
        }
    }

    #[test]
    fn test_package_mode_bills_excess_only() {
        for d in [101, 120, 400] {
            assert_eq!(
                compute_base_charge(km(d), rs(30), km(100), rs(5000)),
                rs((d - 100) * 30)
            );
        }
    }

    #[test]
    fn test_standard_trip_end_to_end() {
        let trip = TripInput {
            start_meter: km(100),
            end_meter: km(250),
            hire_rate: rs(50),
            waiting_charge: rs(200),
            gate_pass: rs(100),
            ..TripInput::default()
        };

        let totals = compute_bill(&trip);
        assert_eq!(totals.mode, BillingMode::Standard);
        assert_eq!(totals.distance, km(150));
        assert_eq!(totals.excess_distance, Distance::zero());
        assert_eq!(totals.base_charge, rs(7500));
        assert_eq!(totals.extra_charges_total, rs(300));
        assert_eq!(totals.total_amount, rs(7800));
        assert_eq!(compute_total_amount(&trip), rs(7800));
    }

    #[test]
    fn test_package_trip_end_to_end() {
        let trip = TripInput {
            start_meter: km(0),
            end_meter: km(120),
            hire_rate: rs(30),
            allowed: km(100),
            package_charge: rs(5000),
            ..TripInput::default()
        };

        let totals = compute_bill(&trip);
        assert_eq!(totals.mode, BillingMode::Package);
        assert_eq!(totals.distance, km(120));
        assert_eq!(totals.excess_distance, km(20));
        assert_eq!(totals.base_charge, rs(600));
        assert_eq!(totals.extra_charges_total, rs(5000));
        assert_eq!(totals.total_amount, rs(5600));
    }

    #[test]
    fn test_balance_due() {
        let trip = TripInput {
            start_meter: km(0),
            end_meter: km(10),
            hire_rate: rs(100),
            advance_amount: rs(400),
            ..TripInput::default()
        };
        assert_eq!(compute_bill(&trip).balance_due, rs(600));

        let overpaid = TripInput {
            advance_amount: rs(5000),
            ..trip
        };
        assert_eq!(compute_bill(&overpaid).balance_due, Money::zero());
    }

    #[test]
    fn test_balance_equals_difference_when_advance_fits() {
        for (total, advance) in [(100, 0), (100, 40), (100, 100)] {
            assert_eq!(compute_balance(rs(total), rs(advance)), rs(total - advance));
        }
    }

    #[test]
    fn test_negative_inputs_are_clamped() {
        let trip = TripInput {
            start_meter: km(300),
            end_meter: km(100),
            hire_rate: rs(-50),
            waiting_charge: rs(-200),
            gate_pass: rs(-1),
            ..TripInput::default()
        };
        let totals = compute_bill(&trip);
        assert_eq!(totals.distance, Distance::zero());
        assert_eq!(totals.total_amount, Money::zero());
        assert_eq!(totals.balance_due, Money::zero());
    }

    #[test]
    fn test_negative_allowance_reads_as_no_package() {
        let trip = TripInput {
            allowed: Distance::from_metres(-5_000),
            package_charge: rs(3_000),
            ..TripInput::default()
        };
        assert_eq!(trip.rates().allowed, Distance::zero());

        // A negative distance bills nothing rather than a credit.
        assert_eq!(
            compute_base_charge(Distance::from_metres(-2_000), rs(50), Distance::zero(), Money::zero()),
            Money::zero()
        );
    }

    #[test]
    fn test_total_is_monotonic_in_each_input() {
        let base = TripInput {
            start_meter: km(10),
            end_meter: km(60),
            hire_rate: rs(20),
            waiting_charge: rs(10),
            gate_pass: rs(10),
            ..TripInput::default()
        };
        let before = compute_total_amount(&base);

        let bumps = [
            TripInput { end_meter: km(61), ..base },
            TripInput { hire_rate: rs(21), ..base },
            TripInput { waiting_charge: rs(11), ..base },
            TripInput { gate_pass: rs(11), ..base },
            TripInput { package_charge: rs(1), ..base },
        ];
        for bumped in bumps {
            assert!(compute_total_amount(&bumped) >= before);
        }
    }

    #[test]
    fn test_fractional_distance() {
        // 12.3 km @ Rs. 45.50 = Rs. 559.65
        let trip = TripInput {
            start_meter: Distance::from_km_f64(1000.2),
            end_meter: Distance::from_km_f64(1012.5),
            hire_rate: Money::from_cents(4550),
            ..TripInput::default()
        };
        let totals = compute_bill(&trip);
        assert_eq!(totals.distance.metres(), 12_300);
        assert_eq!(totals.base_charge.cents(), 55_965);
    }
}
