//! # Booking Repository
//!
//! Database operations for vehicle reservations.
//!
//! ## Booking Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   create() ──► CONFIRMED ──┬── cancel() ──► CANCELLED                  │
//! │                            │                (refund REFUNDED/FORFEITED │
//! │                            │                 if an advance was paid)   │
//! │                            │                                            │
//! │                            └── bill with booking_id ──► COMPLETED      │
//! │                                (BillRepository::create)                │
//! │                                                                         │
//! │   ONGOING / OVERDUE are never stored: list_views() derives them from   │
//! │   the dates and the repository's clock.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use tracing::{debug, info};

use tourbiller_core::schedule::cancel_booking;
use tourbiller_core::validation::validate_new_booking;
use tourbiller_core::{Booking, BookingStatus, BookingView, Clock, NewBooking};

use super::{begin_write, clean_optional, new_id};
use crate::error::{DbError, DbResult};

pub(crate) const BOOKING_COLUMNS: &str = "id, vehicle_no, customer_name, start_date, end_date, \
    destination, status, advance_amount, refund_status, notes, created_at, updated_at";

/// Repository for booking database operations.
#[derive(Debug, Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl BookingRepository {
    /// Creates a new BookingRepository.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        BookingRepository { pool, clock }
    }

    /// Creates a CONFIRMED booking.
    pub async fn create(&self, input: &NewBooking) -> DbResult<Booking> {
        validate_new_booking(input)?;

        let id = new_id();
        let now = self.clock.now();

        debug!(vehicle_no = %input.vehicle_no, start = %input.start_date, "Creating booking");

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, vehicle_no, customer_name, start_date, end_date, destination,
                status, advance_amount, refund_status, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, ?9, ?10, ?10)
            "#,
        )
        .bind(&id)
        .bind(input.vehicle_no.trim())
        .bind(input.customer_name.trim())
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(clean_optional(&input.destination))
        .bind(BookingStatus::Confirmed)
        .bind(input.advance_amount)
        .bind(clean_optional(&input.notes))
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(id = %id, vehicle_no = %input.vehicle_no, "Booking confirmed");

        self.get(&id)
            .await?
            .ok_or_else(|| DbError::not_found("Booking", &id))
    }

    /// Lists bookings by start date, optionally filtered by stored status.
    pub async fn list(&self, status: Option<BookingStatus>) -> DbResult<Vec<Booking>> {
        let bookings = match status {
            Some(status) => {
                sqlx::query_as::<_, Booking>(&format!(
                    "SELECT {BOOKING_COLUMNS} FROM bookings WHERE status = ?1 ORDER BY start_date ASC"
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Booking>(&format!(
                    "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY start_date ASC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        debug!(count = bookings.len(), status = ?status, "Listed bookings");
        Ok(bookings)
    }

    /// [`list`](Self::list) with each booking's display status at the
    /// repository clock's "now".
    pub async fn list_views(&self, status: Option<BookingStatus>) -> DbResult<Vec<BookingView>> {
        let now = self.clock.now();
        Ok(self
            .list(status)
            .await?
            .into_iter()
            .map(|booking| BookingView::at(booking, now))
            .collect())
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    /// Gets a booking with its display status.
    pub async fn get_view(&self, id: &str) -> DbResult<Option<BookingView>> {
        let now = self.clock.now();
        Ok(self.get(id).await?.map(|booking| BookingView::at(booking, now)))
    }

    /// Cancels a CONFIRMED booking and records the refund decision.
    ///
    /// ## Refund Rule
    /// No advance → no decision. Otherwise more than 7 days' notice
    /// (rounded up) is REFUNDED, anything less is FORFEITED.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such booking
    /// * `Err(DbError::Rule(BookingNotCancellable))` - already cancelled or completed
    pub async fn cancel(&self, id: &str) -> DbResult<Booking> {
        let now = self.clock.now();
        let mut tx = begin_write(&self.pool).await?;

        let booking = fetch_in_tx(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Booking", id))?;

        let cancellation = cancel_booking(
            &booking.id,
            booking.status,
            booking.advance_amount,
            booking.start_date,
            now,
        )?;

        sqlx::query(
            r#"
            UPDATE bookings SET
                status = ?2,
                refund_status = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(cancellation.status)
        .bind(cancellation.refund_status)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id = %id,
            refund = ?cancellation.refund_status,
            "Booking cancelled"
        );

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Booking", id))
    }
}

/// Loads a booking inside an open transaction.
pub(crate) async fn fetch_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
) -> DbResult<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(booking)
}
