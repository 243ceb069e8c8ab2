//! # Validation Module
//!
//! Input validation for every form the view layer submits.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form (view layer)                                            │
//! │  ├── Coerces text inputs to numbers and dates                          │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Presence and length of text fields                                │
//! │  ├── Non-negative amounts and distances                                │
//! │  └── Cross-field rules (end meter > start meter, end date ≥ start)     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE vehicle_no, bill_number, quotation_number                  │
//! │  └── Foreign keys from day items and quotations to schedules           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The billing engine still clamps whatever reaches it; these checks only
//! decide whether a record is accepted.
//!
//! ## Usage
//! ```rust
//! use tourbiller_core::validation::{validate_meter_readings, validate_vehicle_no};
//! use tourbiller_core::Distance;
//!
//! validate_vehicle_no("CAB-1234").unwrap();
//! assert!(validate_meter_readings(Distance::from_km(250), Distance::from_km(100)).is_err());
//! ```

use chrono::{DateTime, Utc};

use crate::currency::ExchangeRate;
use crate::error::ValidationError;
use crate::money::Money;
use crate::records::{
    BusinessProfileInput, NewBill, NewBooking, NewCustomer, NewDayItem, NewQuotation,
    NewTourSchedule, NewVehicle,
};
use crate::types::{Distance, MeterReading};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_VEHICLE_NO_LEN: usize = 20;
const MAX_TEXT_LEN: usize = 200;
const MAX_SEARCH_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// A non-empty (after trimming) text field of at most 200 characters.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

/// Validates a registration plate.
///
/// ## Rules
/// - Must not be empty
/// - At most 20 characters
/// - Letters, digits, hyphens and spaces only
///
/// ## Example
/// ```rust
/// use tourbiller_core::validation::validate_vehicle_no;
///
/// assert!(validate_vehicle_no("WP CAB-1234").is_ok());
/// assert!(validate_vehicle_no("").is_err());
/// assert!(validate_vehicle_no("CAB#12").is_err());
/// ```
pub fn validate_vehicle_no(vehicle_no: &str) -> ValidationResult<()> {
    let vehicle_no = vehicle_no.trim();

    if vehicle_no.is_empty() {
        return Err(ValidationError::required("vehicleNo"));
    }

    if vehicle_no.chars().count() > MAX_VEHICLE_NO_LEN {
        return Err(ValidationError::TooLong {
            field: "vehicleNo".to_string(),
            max: MAX_VEHICLE_NO_LEN,
        });
    }

    if !vehicle_no
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == ' ')
    {
        return Err(ValidationError::InvalidFormat {
            field: "vehicleNo".to_string(),
            reason: "must contain only letters, numbers, hyphens, and spaces".to_string(),
        });
    }

    Ok(())
}

/// Validates an optional e-mail address. Absent or blank is accepted.
pub fn validate_email(field: &str, email: Option<&str>) -> ValidationResult<()> {
    let email = match email.map(str::trim) {
        None | Some("") => return Ok(()),
        Some(e) => e,
    };

    let invalid = || ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "invalid email".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || email.contains(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(())
}

/// Validates an ISO-4217 style code: three upper-case ASCII letters.
///
/// ## Example
/// ```rust
/// use tourbiller_core::validation::validate_currency_code;
///
/// assert!(validate_currency_code("LKR").is_ok());
/// assert!(validate_currency_code("usd").is_err());
/// ```
pub fn validate_currency_code(code: &str) -> ValidationResult<()> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be a three-letter upper-case code".to_string(),
        })
    }
}

/// Validates a record id (UUID).
pub fn validate_uuid(field: &str, value: &str) -> ValidationResult<()> {
    uuid::Uuid::parse_str(value.trim())
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a valid UUID".to_string(),
        })
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns all results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

pub fn validate_non_negative_money(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_negative_distance(field: &str, distance: Distance) -> ValidationResult<()> {
    if distance.metres() < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Both readings non-negative and the end strictly past the start.
pub fn validate_meter_readings(start: MeterReading, end: MeterReading) -> ValidationResult<()> {
    validate_non_negative_distance("startMeter", start)?;
    validate_non_negative_distance("endMeter", end)?;

    if end <= start {
        return Err(ValidationError::MustExceed {
            field: "endMeter".to_string(),
            other: "startMeter".to_string(),
        });
    }

    Ok(())
}

fn validate_exchange_rate(rate: ExchangeRate) -> ValidationResult<()> {
    if rate.micros() <= 0 {
        return Err(ValidationError::InvalidFormat {
            field: "exchangeRate".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

fn validate_optional_text(field: &str, value: Option<&str>) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > MAX_TEXT_LEN * 10 => Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN * 10,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Form Validators
// =============================================================================

pub fn validate_new_vehicle(input: &NewVehicle) -> ValidationResult<()> {
    validate_vehicle_no(&input.vehicle_no)?;
    validate_required("category", &input.category)?;
    validate_non_negative_money("defaultRate", input.default_rate)?;
    validate_non_negative_money("excessKmRate", input.excess_km_rate)?;
    validate_non_negative_money("ratePerDay", input.rate_per_day)?;
    validate_non_negative_distance("kmPerDay", input.km_per_day)?;
    validate_non_negative_money("extraHourRate", input.extra_hour_rate)?;
    Ok(())
}

pub fn validate_new_customer(input: &NewCustomer) -> ValidationResult<()> {
    validate_required("name", &input.name)?;
    validate_required("mobile", &input.mobile)?;
    validate_email("email", input.email.as_deref())?;
    validate_optional_text("address", input.address.as_deref())
}

/// Validates a bill before it is priced and stored.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Bill form: Save                                                        │
/// │                                                                         │
/// │  validate_new_bill ← THIS FUNCTION                                     │
/// │       │                                                                 │
/// │       ├── vehicle / customer / route missing? → Required               │
/// │       ├── end meter ≤ start meter?            → MustExceed             │
/// │       ├── any amount negative?                → MustNotBeNegative      │
/// │       ├── currency not XXX?                   → InvalidFormat          │
/// │       │                                                                 │
/// │       └── OK → compute_bill → insert (and close booking)               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_new_bill(input: &NewBill) -> ValidationResult<()> {
    validate_vehicle_no(&input.vehicle_no)?;
    validate_required("customerName", &input.customer_name)?;
    validate_required("route", &input.route)?;
    validate_optional_text("customerAddress", input.customer_address.as_deref())?;

    validate_meter_readings(input.start_meter, input.end_meter)?;
    validate_non_negative_distance("allowedKm", input.allowed_distance)?;

    for (field, amount) in [
        ("hireRate", input.hire_rate),
        ("packageCharge", input.package_charge),
        ("waitingCharge", input.waiting_charge),
        ("gatePass", input.gate_pass),
        ("advanceAmount", input.advance_amount),
    ] {
        validate_non_negative_money(field, amount)?;
    }

    validate_currency_code(&input.currency)?;
    validate_exchange_rate(input.exchange_rate)?;

    if let Some(booking_id) = &input.booking_id {
        validate_uuid("bookingId", booking_id)?;
    }

    Ok(())
}

/// End date, when given, may not precede the start date.
pub fn validate_booking_dates(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> ValidationResult<()> {
    match end {
        Some(end) if end < start => Err(ValidationError::MustExceed {
            field: "endDate".to_string(),
            other: "startDate".to_string(),
        }),
        _ => Ok(()),
    }
}

pub fn validate_new_booking(input: &NewBooking) -> ValidationResult<()> {
    validate_vehicle_no(&input.vehicle_no)?;
    validate_required("customerName", &input.customer_name)?;
    validate_booking_dates(input.start_date, input.end_date)?;
    validate_non_negative_money("advanceAmount", input.advance_amount)?;
    validate_optional_text("notes", input.notes.as_deref())
}

fn validate_day_item(item: &NewDayItem) -> ValidationResult<()> {
    if item.day_number < 1 {
        return Err(ValidationError::OutOfRange {
            field: "dayNumber".to_string(),
            min: 1,
            max: i64::from(u16::MAX),
        });
    }
    validate_required("title", &item.title)?;
    validate_non_negative_distance("distanceKm", item.distance)?;
    validate_non_negative_money("accommodation", item.accommodation)?;
    validate_non_negative_money("meals", item.meals)?;
    validate_non_negative_money("activities", item.activities)?;
    validate_non_negative_money("otherCosts", item.other_costs)?;
    Ok(())
}

/// A schedule needs a name, at least one day and at least one item.
pub fn validate_tour_schedule(input: &NewTourSchedule) -> ValidationResult<()> {
    validate_required("name", &input.name)?;

    if input.days < 1 {
        return Err(ValidationError::OutOfRange {
            field: "days".to_string(),
            min: 1,
            max: i64::from(u16::MAX),
        });
    }

    if input.items.is_empty() {
        return Err(ValidationError::required("items"));
    }

    validate_non_negative_money("basePricePerPerson", input.base_price_per_person)?;
    input.items.iter().try_for_each(validate_day_item)
}

pub fn validate_new_quotation(input: &NewQuotation) -> ValidationResult<()> {
    validate_uuid("tourScheduleId", &input.tour_schedule_id)?;
    validate_required("customerName", &input.customer_name)?;
    validate_email("customerEmail", input.customer_email.as_deref())?;

    if input.number_of_persons < 1 {
        return Err(ValidationError::OutOfRange {
            field: "numberOfPersons".to_string(),
            min: 1,
            max: i64::from(u16::MAX),
        });
    }

    for (field, amount) in [
        ("hireRatePerKm", input.hire_rate_per_km),
        ("hireRatePerDay", input.hire_rate_per_day),
        ("driverCostPerDay", input.driver_cost_per_day),
        ("discount", input.discount),
        ("advanceAmount", input.advance_amount),
    ] {
        validate_non_negative_money(field, amount)?;
    }
    validate_non_negative_distance("kmPerDay", input.km_per_day)?;
    validate_optional_text("excludedItems", input.excluded_items.as_deref())?;
    validate_optional_text("notes", input.notes.as_deref())
}

pub fn validate_business_profile(input: &BusinessProfileInput) -> ValidationResult<()> {
    validate_required("companyName", &input.company_name)?;
    validate_email("email", input.email.as_deref())?;
    validate_exchange_rate(input.usd_rate)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn valid_bill() -> NewBill {
        NewBill {
            vehicle_no: "CAB-1234".to_string(),
            customer_name: "Nimal Perera".to_string(),
            route: "Colombo - Kandy".to_string(),
            start_meter: Distance::from_km(100),
            end_meter: Distance::from_km(250),
            hire_rate: Money::from_major(50),
            ..NewBill::default()
        }
    }

    #[test]
    fn test_validate_vehicle_no() {
        assert!(validate_vehicle_no("CAB-1234").is_ok());
        assert!(validate_vehicle_no("  ").is_err());
        assert!(validate_vehicle_no(&"A".repeat(21)).is_err());
        assert!(validate_vehicle_no("CAB/12").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("email", None).is_ok());
        assert!(validate_email("email", Some("")).is_ok());
        assert!(validate_email("email", Some("info@lankatours.lk")).is_ok());
        assert!(validate_email("email", Some("info@")).is_err());
        assert!(validate_email("email", Some("no-at-sign.lk")).is_err());
        assert!(validate_email("email", Some("a b@x.lk")).is_err());
    }

    #[test]
    fn test_validate_meter_readings() {
        assert!(validate_meter_readings(Distance::from_km(100), Distance::from_km(250)).is_ok());

        let err = validate_meter_readings(Distance::from_km(100), Distance::from_km(100)).unwrap_err();
        assert!(matches!(err, ValidationError::MustExceed { .. }));
        assert_eq!(err.to_string(), "endMeter must be greater than startMeter");
    }

    #[test]
    fn test_validate_new_bill() {
        assert!(validate_new_bill(&valid_bill()).is_ok());

        let missing_route = NewBill {
            route: String::new(),
            ..valid_bill()
        };
        assert!(matches!(
            validate_new_bill(&missing_route),
            Err(ValidationError::Required { .. })
        ));

        let negative_gate = NewBill {
            gate_pass: Money::from_cents(-1),
            ..valid_bill()
        };
        assert!(matches!(
            validate_new_bill(&negative_gate),
            Err(ValidationError::MustNotBeNegative { .. })
        ));

        let bad_currency = NewBill {
            currency: "rs".to_string(),
            ..valid_bill()
        };
        assert!(validate_new_bill(&bad_currency).is_err());

        let bad_booking = NewBill {
            booking_id: Some("not-a-uuid".to_string()),
            ..valid_bill()
        };
        assert!(validate_new_bill(&bad_booking).is_err());
    }

    #[test]
    fn test_validate_booking_dates() {
        let start = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();
        assert!(validate_booking_dates(start, None).is_ok());
        assert!(validate_booking_dates(start, Some(start)).is_ok());
        assert!(validate_booking_dates(start, Some(start - Duration::hours(1))).is_err());
    }

    #[test]
    fn test_validate_tour_schedule() {
        let item = NewDayItem {
            day_number: 1,
            title: "Arrival".to_string(),
            ..NewDayItem::default()
        };
        let schedule = NewTourSchedule {
            name: "Southern Coast".to_string(),
            description: None,
            days: 1,
            base_price_per_person: Money::zero(),
            vehicle_category: "VAN".to_string(),
            items: vec![item.clone()],
        };
        assert!(validate_tour_schedule(&schedule).is_ok());

        let no_items = NewTourSchedule {
            items: Vec::new(),
            ..schedule.clone()
        };
        assert!(validate_tour_schedule(&no_items).is_err());

        let zero_days = NewTourSchedule {
            days: 0,
            ..schedule.clone()
        };
        assert!(validate_tour_schedule(&zero_days).is_err());

        let bad_day = NewTourSchedule {
            items: vec![NewDayItem { day_number: 0, ..item }],
            ..schedule
        };
        assert!(validate_tour_schedule(&bad_day).is_err());
    }

    #[test]
    fn test_validate_new_quotation() {
        let quotation = NewQuotation {
            tour_schedule_id: uuid::Uuid::new_v4().to_string(),
            customer_name: "Sarah".to_string(),
            ..NewQuotation::default()
        };
        assert!(validate_new_quotation(&quotation).is_ok());

        let nobody = NewQuotation {
            number_of_persons: 0,
            ..quotation
        };
        assert!(matches!(
            validate_new_quotation(&nobody),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  kandy ").unwrap(), "kandy");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_business_profile() {
        assert!(validate_business_profile(&BusinessProfileInput::default()).is_ok());
        let blank = BusinessProfileInput {
            company_name: " ".to_string(),
            ..BusinessProfileInput::default()
        };
        assert!(validate_business_profile(&blank).is_err());
    }
}
