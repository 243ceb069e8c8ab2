//! # Records
//!
//! Persisted entities and the form inputs that create them.
//!
//! Records are plain data. Anything derived (bill totals, display status,
//! itinerary sums) is computed on demand through the engine modules so it
//! always reflects the current inputs and the current "now".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::billing::{compute_bill, BillTotals, TripInput};
use crate::currency::{ExchangeRate, DEFAULT_CURRENCY};
use crate::money::Money;
use crate::quotation::{itinerary_cost_total, DayItemCosts, ItinerarySums, PricingStrategy};
use crate::schedule::{derive_display_status, BookingWindow};
use crate::types::{
    BookingStatus, DisplayStatus, Distance, MeterReading, PaymentMethod, Percentage, PricingMode,
    QuotationStatus, RefundStatus, VehicleStatus,
};

// =============================================================================
// Vehicle
// =============================================================================

/// A vehicle in the hire fleet.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Vehicle {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Registration plate, e.g. `CAB-1234`. Unique.
    pub vehicle_no: String,

    pub model: Option<String>,

    /// Free-form category (CAR, VAN, SUV, BUS...).
    pub category: String,

    pub status: VehicleStatus,

    /// Default hire rate per km, prefilled on new bills.
    pub default_rate: Money,

    /// Rate per km beyond a package allowance.
    pub excess_km_rate: Money,

    pub rate_per_day: Money,

    /// Distance included per hire day.
    pub km_per_day: Distance,

    pub extra_hour_rate: Money,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Vehicle form input.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewVehicle {
    pub vehicle_no: String,
    pub model: Option<String>,
    pub category: String,
    pub status: VehicleStatus,
    pub default_rate: Money,
    pub excess_km_rate: Money,
    pub rate_per_day: Money,
    pub km_per_day: Distance,
    pub extra_hour_rate: Money,
}

impl Default for NewVehicle {
    fn default() -> Self {
        NewVehicle {
            vehicle_no: String::new(),
            model: None,
            category: "CAR".to_string(),
            status: VehicleStatus::Active,
            default_rate: Money::zero(),
            excess_km_rate: Money::zero(),
            rate_per_day: Money::zero(),
            km_per_day: Distance::zero(),
            extra_hour_rate: Money::zero(),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub mobile: String,
    pub email: Option<String>,
    pub address: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    pub mobile: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

// =============================================================================
// Booking
// =============================================================================

/// A reservation of a vehicle for a period.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Booking {
    pub id: String,
    pub vehicle_no: String,
    pub customer_name: String,

    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,

    /// Open-ended when absent.
    #[ts(as = "Option<String>")]
    pub end_date: Option<DateTime<Utc>>,

    pub destination: Option<String>,

    /// Persisted status. See [`Booking::display_status`] for what lists show.
    pub status: BookingStatus,

    pub advance_amount: Money,

    /// Set on cancellation when an advance was paid.
    pub refund_status: Option<RefundStatus>,

    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    #[inline]
    pub fn window(&self) -> BookingWindow {
        BookingWindow::new(self.start_date, self.end_date)
    }

    /// Status to show at `now`. Recomputed on every read.
    pub fn display_status(&self, now: DateTime<Utc>) -> DisplayStatus {
        derive_display_status(self.status, &self.window(), now)
    }
}

/// Booking form input. New bookings always start CONFIRMED.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewBooking {
    pub vehicle_no: String,
    pub customer_name: String,

    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub end_date: Option<DateTime<Utc>>,

    pub destination: Option<String>,
    pub advance_amount: Money,
    pub notes: Option<String>,
}

/// A booking paired with its derived status, as the booking list shows it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookingView {
    pub booking: Booking,
    pub display_status: DisplayStatus,
}

impl BookingView {
    pub fn at(booking: Booking, now: DateTime<Utc>) -> Self {
        let display_status = booking.display_status(now);
        BookingView {
            booking,
            display_status,
        }
    }
}

// =============================================================================
// Bill
// =============================================================================

/// A finalized invoice for one completed trip.
///
/// `total_amount` is stored for listing and revenue queries, and is always
/// equal to `self.totals().total_amount` for the stored inputs.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Bill {
    pub id: String,

    /// Human-facing sequential number printed on the invoice.
    pub bill_number: i64,

    pub vehicle_no: String,
    pub customer_name: String,
    pub customer_address: Option<String>,
    pub route: String,

    pub start_meter: MeterReading,
    pub end_meter: MeterReading,
    pub hire_rate: Money,
    pub allowed_distance: Distance,
    pub package_charge: Money,
    pub waiting_charge: Money,
    pub gate_pass: Money,
    pub advance_amount: Money,

    /// ISO code of the bill's currency (LKR unless priced abroad).
    pub currency: String,

    /// Base-currency units per one unit of `currency`.
    pub exchange_rate: ExchangeRate,

    pub payment_method: PaymentMethod,

    /// Total in the bill's own currency.
    pub total_amount: Money,

    /// Total converted to base currency. Revenue dashboards sum this.
    pub total_amount_base: Money,

    /// Booking this bill closed, if any.
    pub booking_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    pub fn trip_input(&self) -> TripInput {
        TripInput {
            start_meter: self.start_meter,
            end_meter: self.end_meter,
            hire_rate: self.hire_rate,
            allowed: self.allowed_distance,
            package_charge: self.package_charge,
            waiting_charge: self.waiting_charge,
            gate_pass: self.gate_pass,
            advance_amount: self.advance_amount,
        }
    }

    /// Recomputes every intermediate from the stored inputs.
    pub fn totals(&self) -> BillTotals {
        compute_bill(&self.trip_input())
    }

    #[inline]
    pub fn is_base_currency(&self) -> bool {
        self.currency == DEFAULT_CURRENCY
    }
}

/// Bill form input, already coerced to typed values.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewBill {
    pub vehicle_no: String,
    pub customer_name: String,
    pub customer_address: Option<String>,
    pub route: String,
    pub start_meter: MeterReading,
    pub end_meter: MeterReading,
    pub hire_rate: Money,
    pub allowed_distance: Distance,
    pub package_charge: Money,
    pub waiting_charge: Money,
    pub gate_pass: Money,
    pub advance_amount: Money,
    pub currency: String,
    pub exchange_rate: ExchangeRate,
    pub payment_method: PaymentMethod,
    pub booking_id: Option<String>,
}

impl NewBill {
    pub fn trip_input(&self) -> TripInput {
        TripInput {
            start_meter: self.start_meter,
            end_meter: self.end_meter,
            hire_rate: self.hire_rate,
            allowed: self.allowed_distance,
            package_charge: self.package_charge,
            waiting_charge: self.waiting_charge,
            gate_pass: self.gate_pass,
            advance_amount: self.advance_amount,
        }
    }
}

impl Default for NewBill {
    fn default() -> Self {
        NewBill {
            vehicle_no: String::new(),
            customer_name: String::new(),
            customer_address: None,
            route: String::new(),
            start_meter: Distance::zero(),
            end_meter: Distance::zero(),
            hire_rate: Money::zero(),
            allowed_distance: Distance::zero(),
            package_charge: Money::zero(),
            waiting_charge: Money::zero(),
            gate_pass: Money::zero(),
            advance_amount: Money::zero(),
            currency: DEFAULT_CURRENCY.to_string(),
            exchange_rate: ExchangeRate::ONE,
            payment_method: PaymentMethod::Cash,
            booking_id: None,
        }
    }
}

// =============================================================================
// Tour Schedule
// =============================================================================

/// A reusable day-by-day itinerary template.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TourSchedule {
    pub id: String,
    pub name: String,
    pub description: Option<String>,

    /// Length of the tour. Drives per-day transport pricing.
    pub days: i64,

    pub base_price_per_person: Money,
    pub vehicle_category: String,

    /// Soft-delete flag.
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// One itinerary day.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TourScheduleDayItem {
    pub id: String,
    pub tour_schedule_id: String,
    pub day_number: i64,
    pub title: String,
    pub description: Option<String>,
    pub distance: Distance,
    pub accommodation: Money,
    pub meals: Money,
    pub activities: Money,
    pub other_costs: Money,
}

impl TourScheduleDayItem {
    #[inline]
    pub fn costs(&self) -> DayItemCosts {
        DayItemCosts {
            distance: self.distance,
            accommodation: self.accommodation,
            meals: self.meals,
            activities: self.activities,
            other_costs: self.other_costs,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewDayItem {
    pub day_number: i64,
    pub title: String,
    pub description: Option<String>,
    pub distance: Distance,
    pub accommodation: Money,
    pub meals: Money,
    pub activities: Money,
    pub other_costs: Money,
}

impl NewDayItem {
    #[inline]
    pub fn costs(&self) -> DayItemCosts {
        DayItemCosts {
            distance: self.distance,
            accommodation: self.accommodation,
            meals: self.meals,
            activities: self.activities,
            other_costs: self.other_costs,
        }
    }
}

/// Tour schedule form input. Items are written together with the schedule.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewTourSchedule {
    pub name: String,
    pub description: Option<String>,
    pub days: i64,
    pub base_price_per_person: Money,
    pub vehicle_category: String,
    pub items: Vec<NewDayItem>,
}

impl NewTourSchedule {
    pub fn itinerary_sums(&self) -> ItinerarySums {
        ItinerarySums::from_costs(self.items.iter().map(NewDayItem::costs))
    }
}

/// A schedule together with its items, ordered by day number.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TourScheduleWithItems {
    pub schedule: TourSchedule,
    pub items: Vec<TourScheduleDayItem>,
}

impl TourScheduleWithItems {
    pub fn itinerary_sums(&self) -> ItinerarySums {
        ItinerarySums::from_items(&self.items)
    }

    /// Accommodation, meals, activities and other costs across all days.
    pub fn cost_total(&self) -> Money {
        itinerary_cost_total(&self.items)
    }
}

// =============================================================================
// Quotation
// =============================================================================

/// A priced proposal generated from a tour schedule.
///
/// Every intermediate of the pricing is stored so the printed breakdown
/// reconciles with `total_amount` without re-pricing.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Quotation {
    pub id: String,
    pub quotation_number: i64,
    pub tour_schedule_id: String,

    /// Tour name and length as they were when the quotation was priced.
    pub schedule_name: String,
    pub days: i64,

    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub vehicle_no: Option<String>,
    pub number_of_persons: i64,

    #[ts(as = "Option<String>")]
    pub start_date: Option<DateTime<Utc>>,

    // Pricing inputs
    pub pricing_mode: PricingMode,
    pub hire_rate_per_km: Money,
    pub hire_rate_per_day: Money,
    pub driver_cost_per_day: Money,
    pub km_per_day: Distance,
    pub markup: Percentage,
    pub discount: Money,
    pub advance_amount: Money,

    // Retained totals
    pub total_distance: Distance,
    pub transport_cost: Money,
    pub driver_cost_total: Money,
    pub accommodation_total: Money,
    pub meals_total: Money,
    pub activities_total: Money,
    pub other_costs_total: Money,
    pub subtotal: Money,
    pub markup_amount: Money,
    pub total_amount: Money,

    /// Free text listing what the price does not cover.
    pub excluded_items: Option<String>,
    pub notes: Option<String>,

    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,

    pub status: QuotationStatus,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Quotation {
    /// `max(0, total - advance)`.
    #[inline]
    pub fn balance_due(&self) -> Money {
        (self.total_amount - self.advance_amount.non_negative()).non_negative()
    }
}

/// One itinerary day copied onto a quotation at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct QuotationItem {
    pub id: String,
    pub quotation_id: String,
    pub day_number: i64,
    pub title: String,
    pub description: Option<String>,
    pub distance: Distance,
    pub accommodation: Money,
    pub meals: Money,
    pub activities: Money,
    pub other_costs: Money,
}

impl QuotationItem {
    #[inline]
    pub fn costs(&self) -> DayItemCosts {
        DayItemCosts {
            distance: self.distance,
            accommodation: self.accommodation,
            meals: self.meals,
            activities: self.activities,
            other_costs: self.other_costs,
        }
    }

    /// Accommodation + meals + activities + other costs.
    #[inline]
    pub fn day_total(&self) -> Money {
        self.accommodation + self.meals + self.activities + self.other_costs
    }
}

/// A quotation with its itinerary snapshot. Everything the print page needs.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuotationWithItems {
    pub quotation: Quotation,
    pub items: Vec<QuotationItem>,
}

/// Quotation form input.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewQuotation {
    pub tour_schedule_id: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub vehicle_no: Option<String>,
    pub number_of_persons: i64,

    #[ts(as = "Option<String>")]
    pub start_date: Option<DateTime<Utc>>,

    pub pricing_mode: PricingMode,
    pub hire_rate_per_km: Money,
    pub hire_rate_per_day: Money,
    pub driver_cost_per_day: Money,
    pub km_per_day: Distance,
    pub markup: Percentage,
    pub discount: Money,
    pub advance_amount: Money,
    pub excluded_items: Option<String>,
    pub notes: Option<String>,

    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,
}

impl NewQuotation {
    /// The transport-pricing strategy selected by `pricing_mode`.
    pub fn strategy(&self) -> PricingStrategy {
        match self.pricing_mode {
            PricingMode::PerKm => PricingStrategy::PerKm {
                hire_rate_per_km: self.hire_rate_per_km,
            },
            PricingMode::PerDay => PricingStrategy::PerDay {
                hire_rate_per_day: self.hire_rate_per_day,
                driver_cost_per_day: self.driver_cost_per_day,
            },
        }
    }
}

impl Default for NewQuotation {
    fn default() -> Self {
        NewQuotation {
            tour_schedule_id: String::new(),
            customer_name: String::new(),
            customer_email: None,
            customer_phone: None,
            vehicle_no: None,
            number_of_persons: 1,
            start_date: None,
            pricing_mode: PricingMode::PerDay,
            hire_rate_per_km: Money::zero(),
            hire_rate_per_day: Money::zero(),
            driver_cost_per_day: Money::zero(),
            km_per_day: Distance::zero(),
            markup: Percentage::zero(),
            discount: Money::zero(),
            advance_amount: Money::zero(),
            excluded_items: None,
            notes: None,
            valid_until: None,
        }
    }
}

// =============================================================================
// Business Profile
// =============================================================================

/// The company printed on every document. A single row.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BusinessProfile {
    pub id: String,
    pub company_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub bank_name: Option<String>,
    pub bank_branch: Option<String>,
    pub bank_account_no: Option<String>,
    pub bank_account_name: Option<String>,

    /// LKR per USD, prefilled on foreign-currency bills.
    pub usd_rate: ExchangeRate,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl BusinessProfile {
    /// Whether any bank detail is filled in (the documents print a payment
    /// block only then).
    pub fn has_bank_details(&self) -> bool {
        [
            &self.bank_name,
            &self.bank_branch,
            &self.bank_account_no,
            &self.bank_account_name,
        ]
        .iter()
        .any(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BusinessProfileInput {
    pub company_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub bank_name: Option<String>,
    pub bank_branch: Option<String>,
    pub bank_account_no: Option<String>,
    pub bank_account_name: Option<String>,
    pub usd_rate: ExchangeRate,
}

impl Default for BusinessProfileInput {
    fn default() -> Self {
        BusinessProfileInput {
            company_name: crate::DEFAULT_COMPANY_NAME.to_string(),
            address: None,
            phone: None,
            email: None,
            website: None,
            logo_url: None,
            bank_name: None,
            bank_branch: None,
            bank_account_no: None,
            bank_account_name: None,
            usd_rate: ExchangeRate::from_f64(crate::DEFAULT_USD_RATE),
        }
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Everything the dashboard page shows, computed per request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub total_vehicles: i64,
    pub occupied_vehicles: i64,
    pub available_vehicles: i64,
    pub yearly_revenue: Money,
    pub weekly_revenue: Money,
    pub recent_bills: Vec<Bill>,
    pub ongoing_bookings: Vec<BookingView>,
}

// =============================================================================
// Unit Tests
// =============================================================================
