//! # Quotation Pricing
//!
//! Prices a tour schedule for a customer.
//!
//! ## Pricing Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Quotation Calculation                              │
//! │                                                                         │
//! │  day items ──► ItinerarySums (one pass)                                │
//! │                  distance, accommodation, meals, activities, other     │
//! │                          │                                              │
//! │  PricingStrategy ────────┤                                              │
//! │    PerKm:  transport = total_distance × rate_per_km                    │
//! │    PerDay: transport = days × rate_per_day                             │
//! │            driver    = days × driver_cost_per_day                      │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  subtotal = transport + driver + accommodation + meals                 │
//! │             + activities + other                                       │
//! │  markup   = subtotal × markup%                                         │
//! │  total    = max(0, subtotal + markup - discount)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The two strategies are mutually exclusive. Every intermediate is kept in
//! [`QuotationPricing`] because the printed quotation shows each of them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::records::TourScheduleDayItem;
use crate::types::{Distance, Percentage, PricingMode};

// =============================================================================
// Itinerary Sums
// =============================================================================

/// The cost-bearing fields of one itinerary day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DayItemCosts {
    pub distance: Distance,
    pub accommodation: Money,
    pub meals: Money,
    pub activities: Money,
    pub other_costs: Money,
}

/// Field-wise totals over all days of a schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItinerarySums {
    pub total_distance: Distance,
    pub accommodation_total: Money,
    pub meals_total: Money,
    pub activities_total: Money,
    pub other_costs_total: Money,
}

impl ItinerarySums {
    /// Sums a schedule's persisted day items.
    pub fn from_items(items: &[TourScheduleDayItem]) -> Self {
        Self::from_costs(items.iter().map(TourScheduleDayItem::costs))
    }

    /// Sums any sequence of day costs in a single pass.
    pub fn from_costs<I>(costs: I) -> Self
    where
        I: IntoIterator<Item = DayItemCosts>,
    {
        costs.into_iter().fold(ItinerarySums::default(), |mut acc, day| {
            acc.total_distance += day.distance;
            acc.accommodation_total += day.accommodation;
            acc.meals_total += day.meals;
            acc.activities_total += day.activities;
            acc.other_costs_total += day.other_costs;
            acc
        })
    }

    /// Everything except transport: accommodation + meals + activities + other.
    #[inline]
    pub fn cost_total(&self) -> Money {
        self.accommodation_total + self.meals_total + self.activities_total + self.other_costs_total
    }
}

/// Grand total of the non-transport costs of a schedule, as shown on the
/// schedule list.
pub fn itinerary_cost_total(items: &[TourScheduleDayItem]) -> Money {
    ItinerarySums::from_items(items).cost_total()
}

// =============================================================================
// Strategy & Input
// =============================================================================

/// How transport is priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PricingStrategy {
    /// Total itinerary distance at a per-km rate. No driver term.
    PerKm { hire_rate_per_km: Money },
    /// Schedule length at a day rate, plus a driver cost per day.
    PerDay {
        hire_rate_per_day: Money,
        driver_cost_per_day: Money,
    },
}

impl PricingStrategy {
    pub fn mode(&self) -> PricingMode {
        match self {
            PricingStrategy::PerKm { .. } => PricingMode::PerKm,
            PricingStrategy::PerDay { .. } => PricingMode::PerDay,
        }
    }
}

impl Default for PricingStrategy {
    fn default() -> Self {
        PricingStrategy::PerDay {
            hire_rate_per_day: Money::zero(),
            driver_cost_per_day: Money::zero(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuotationInput {
    pub strategy: PricingStrategy,
    /// Length of the tour in days. Only the per-day strategy reads it.
    pub schedule_days: i64,
    pub markup: Percentage,
    pub discount: Money,
}

// =============================================================================
// Pricing
// =============================================================================

/// A priced quotation with every intermediate retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuotationPricing {
    pub mode: PricingMode,
    pub sums: ItinerarySums,
    pub transport_cost: Money,
    /// Zero under per-km pricing.
    pub driver_cost_total: Money,
    pub subtotal: Money,
    pub markup_amount: Money,
    pub discount_amount: Money,
    pub total_amount: Money,
}

impl QuotationPricing {
    /// `max(0, total - advance)`.
    #[inline]
    pub fn balance_after_advance(&self, advance: Money) -> Money {
        (self.total_amount - advance.non_negative()).non_negative()
    }
}

/// Prices a schedule.
///
/// ## Example
/// ```rust
/// use tourbiller_core::quotation::{compute_quotation_from_costs, DayItemCosts, PricingStrategy, QuotationInput};
/// use tourbiller_core::{Distance, Money, Percentage};
///
/// let days = [
///     DayItemCosts { distance: Distance::from_km(120), accommodation: Money::from_major(10_000), ..Default::default() },
///     DayItemCosts { distance: Distance::from_km(80), meals: Money::from_major(2_000), ..Default::default() },
/// ];
/// let input = QuotationInput {
///     strategy: PricingStrategy::PerKm { hire_rate_per_km: Money::from_major(50) },
///     schedule_days: 2,
///     markup: Percentage::from_bps(1000),
///     discount: Money::from_major(200),
/// };
///
/// let pricing = compute_quotation_from_costs(days, &input);
/// assert_eq!(pricing.transport_cost, Money::from_major(10_000));
/// assert_eq!(pricing.subtotal, Money::from_major(22_000));
/// assert_eq!(pricing.markup_amount, Money::from_major(2_200));
/// assert_eq!(pricing.total_amount, Money::from_major(24_000));
/// ```
pub fn compute_quotation(items: &[TourScheduleDayItem], input: &QuotationInput) -> QuotationPricing {
    compute_quotation_from_costs(items.iter().map(TourScheduleDayItem::costs), input)
}

/// [`compute_quotation`] over bare day costs (unsaved schedules, previews).
pub fn compute_quotation_from_costs<I>(costs: I, input: &QuotationInput) -> QuotationPricing
where
    I: IntoIterator<Item = DayItemCosts>,
{
    let sums = ItinerarySums::from_costs(costs);
    let days = input.schedule_days.max(0);

    let (transport_cost, driver_cost_total) = match input.strategy {
        PricingStrategy::PerKm { hire_rate_per_km } => (
            hire_rate_per_km.non_negative().per_km(sums.total_distance),
            Money::zero(),
        ),
        PricingStrategy::PerDay {
            hire_rate_per_day,
            driver_cost_per_day,
        } => (
            hire_rate_per_day.non_negative().times(days),
            driver_cost_per_day.non_negative().times(days),
        ),
    };

    let subtotal = transport_cost + driver_cost_total + sums.cost_total();
    let markup_amount = subtotal.percentage(input.markup);
    let discount_amount = input.discount.non_negative();
    let total_amount = (subtotal + markup_amount - discount_amount).non_negative();

    QuotationPricing {
        mode: input.strategy.mode(),
        sums,
        transport_cost,
        driver_cost_total,
        subtotal,
        markup_amount,
        discount_amount,
        total_amount,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rs(v: i64) -> Money {
        Money::from_major(v)
    }

    fn day(km: i64, accommodation: i64, meals: i64, activities: i64, other: i64) -> DayItemCosts {
        DayItemCosts {
            distance: Distance::from_km(km),
            accommodation: rs(accommodation),
            meals: rs(meals),
            activities: rs(activities),
            other_costs: rs(other),
        }
    }

    fn cultural_triangle() -> Vec<DayItemCosts> {
        vec![
            day(150, 15_000, 5_000, 0, 0),
            day(20, 15_000, 5_000, 6_000, 0),
            day(40, 12_000, 4_500, 5_000, 0),
            day(80, 18_000, 6_000, 4_000, 0),
            day(120, 0, 2_000, 0, 0),
        ]
    }

    #[test]
    fn test_itinerary_sums_single_pass() {
        let sums = ItinerarySums::from_costs(cultural_triangle());
        assert_eq!(sums.total_distance, Distance::from_km(410));
        assert_eq!(sums.accommodation_total, rs(60_000));
        assert_eq!(sums.meals_total, rs(22_500));
        assert_eq!(sums.activities_total, rs(15_000));
        assert_eq!(sums.other_costs_total, Money::zero());
        assert_eq!(sums.cost_total(), rs(97_500));
    }

    #[test]
    fn test_empty_itinerary() {
        let sums = ItinerarySums::from_costs(Vec::new());
        assert_eq!(sums, ItinerarySums::default());
    }

    #[test]
    fn test_per_day_pricing() {
        let input = QuotationInput {
            strategy: PricingStrategy::PerDay {
                hire_rate_per_day: rs(8_000),
                driver_cost_per_day: rs(2_500),
            },
            schedule_days: 5,
            markup: Percentage::zero(),
            discount: Money::zero(),
        };
        let pricing = compute_quotation_from_costs(cultural_triangle(), &input);

        assert_eq!(pricing.mode, PricingMode::PerDay);
        assert_eq!(pricing.transport_cost, rs(40_000));
        assert_eq!(pricing.driver_cost_total, rs(12_500));
        assert_eq!(pricing.subtotal, rs(40_000 + 12_500 + 97_500));
        assert_eq!(pricing.total_amount, pricing.subtotal);
    }

    #[test]
    fn test_per_km_pricing_has_no_driver_term() {
        let input = QuotationInput {
            strategy: PricingStrategy::PerKm {
                hire_rate_per_km: rs(60),
            },
            schedule_days: 5,
            ..QuotationInput::default()
        };
        let pricing = compute_quotation_from_costs(cultural_triangle(), &input);

        assert_eq!(pricing.mode, PricingMode::PerKm);
        assert_eq!(pricing.transport_cost, rs(410 * 60));
        assert_eq!(pricing.driver_cost_total, Money::zero());
    }

    #[test]
    fn test_markup_then_discount() {
        let input = QuotationInput {
            strategy: PricingStrategy::PerDay {
                hire_rate_per_day: rs(10_000),
                driver_cost_per_day: Money::zero(),
            },
            schedule_days: 1,
            markup: Percentage::from_bps(1250),
            discount: rs(250),
        };
        let pricing = compute_quotation_from_costs(Vec::new(), &input);

        assert_eq!(pricing.subtotal, rs(10_000));
        assert_eq!(pricing.markup_amount, rs(1_250));
        assert_eq!(pricing.discount_amount, rs(250));
        assert_eq!(pricing.total_amount, rs(11_000));
    }

    #[test]
    fn test_total_never_negative() {
        let input = QuotationInput {
            strategy: PricingStrategy::PerKm {
                hire_rate_per_km: rs(10),
            },
            schedule_days: 1,
            markup: Percentage::from_bps(500),
            discount: rs(1_000_000),
        };
        let pricing = compute_quotation_from_costs(vec![day(10, 500, 0, 0, 0)], &input);
        assert_eq!(pricing.total_amount, Money::zero());
        assert_eq!(pricing.balance_after_advance(rs(100)), Money::zero());
    }

    #[test]
    fn test_balance_after_advance() {
        let input = QuotationInput {
            strategy: PricingStrategy::PerDay {
                hire_rate_per_day: rs(5_000),
                driver_cost_per_day: rs(1_000),
            },
            schedule_days: 2,
            ..QuotationInput::default()
        };
        let pricing = compute_quotation_from_costs(Vec::new(), &input);
        assert_eq!(pricing.total_amount, rs(12_000));
        assert_eq!(pricing.balance_after_advance(rs(2_000)), rs(10_000));
    }

    #[test]
    fn test_negative_days_priced_as_zero() {
        let input = QuotationInput {
            strategy: PricingStrategy::PerDay {
                hire_rate_per_day: rs(5_000),
                driver_cost_per_day: rs(1_000),
            },
            schedule_days: -3,
            ..QuotationInput::default()
        };
        let pricing = compute_quotation_from_costs(Vec::new(), &input);
        assert_eq!(pricing.transport_cost, Money::zero());
        assert_eq!(pricing.total_amount, Money::zero());
    }

    #[test]
    fn test_strategy_serializes_with_mode_tag() {
        let json = serde_json::to_value(PricingStrategy::PerKm {
            hire_rate_per_km: rs(50),
        })
        .unwrap();
        assert_eq!(json["mode"], "PER_KM");
        assert_eq!(json["hire_rate_per_km"], 5000);
    }
}
