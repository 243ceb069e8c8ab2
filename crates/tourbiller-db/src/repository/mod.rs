//! # Repository Module
//!
//! Database repository implementations for TourBiller.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  View layer                                                            │
//! │       │                                                                 │
//! │       │  db.bills().create(&new_bill)                                  │
//! │       ▼                                                                 │
//! │  BillRepository                                                        │
//! │  ├── validate      (tourbiller_core::validation)                       │
//! │  ├── price         (tourbiller_core::billing)                          │
//! │  └── persist       (SQL, one transaction)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Every repository holds a pool handle and the shared Clock.            │
//! │  Timestamps and status rules read clock.now(), never Utc::now().       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`VehicleRepository`](vehicle::VehicleRepository) - Fleet CRUD and search
//! - [`CustomerRepository`](customer::CustomerRepository) - Customer CRUD and search
//! - [`BookingRepository`](booking::BookingRepository) - Reservations and cancellation
//! - [`BillRepository`](bill::BillRepository) - Trip bills (closes bookings)
//! - [`TourScheduleRepository`](tour_schedule::TourScheduleRepository) - Itinerary templates
//! - [`QuotationRepository`](quotation::QuotationRepository) - Priced tour quotations
//! - [`BusinessProfileRepository`](business_profile::BusinessProfileRepository) - Letterhead
//! - [`DashboardRepository`](dashboard::DashboardRepository) - Fleet and revenue summary

pub mod bill;
pub mod booking;
pub mod business_profile;
pub mod customer;
pub mod dashboard;
pub mod quotation;
pub mod tour_schedule;
pub mod vehicle;

use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::error::DbResult;

/// Generates a new record ID.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Opens a transaction that takes SQLite's write lock up front.
///
/// Writers that read before they write (next bill number, next quotation
/// number, booking state checks) go through this so two of them never
/// read the same snapshot. A second writer waits on `busy_timeout`.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

/// Builds a `LIKE` pattern matching `query` anywhere, with wildcards escaped.
///
/// Use with `LIKE ?n ESCAPE '\'`. SQLite's `LIKE` is case-insensitive for
/// ASCII, which is what the list searches want.
pub(crate) fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Trims an optional text field, treating blank as absent.
pub(crate) fn clean_optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("kandy"), "%kandy%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_clean_optional() {
        assert_eq!(clean_optional(&Some("  ".to_string())), None);
        assert_eq!(clean_optional(&Some(" Galle ".to_string())), Some("Galle".to_string()));
        assert_eq!(clean_optional(&None), None);
    }
}
