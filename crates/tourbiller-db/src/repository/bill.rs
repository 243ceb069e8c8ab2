//! # Bill Repository
//!
//! Database operations for trip bills.
//!
//! ## Bill Creation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    BillRepository::create                               │
//! │                                                                         │
//! │  NewBill (form values)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_new_bill ──── Err ──► DbError::Validation (nothing written)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  compute_bill(trip) → total_amount                                     │
//! │  exchange_rate.convert(total) → total_amount_base                      │
//! │       │                                                                 │
//! │  ┌────▼──────────────────── BEGIN IMMEDIATE ─────────────────────┐     │
//! │  │  booking_id? → load booking, must be CONFIRMED               │     │
//! │  │  bill_number = MAX(bill_number) + 1                           │     │
//! │  │  INSERT bill                                                  │     │
//! │  │  booking_id? → UPDATE booking SET status = COMPLETED          │     │
//! │  └────┬──────────────────────────────────────────────────────────┘     │
//! │       ▼                                                                 │
//! │  COMMIT (any failure rolls back both writes)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info};

use tourbiller_core::billing::compute_bill;
use tourbiller_core::schedule::ensure_completable;
use tourbiller_core::validation::{validate_new_bill, validate_search_query};
use tourbiller_core::{Bill, BookingStatus, Clock, NewBill};

use super::booking::fetch_in_tx;
use super::{begin_write, clean_optional, contains_pattern, new_id};
use crate::error::{DbError, DbResult};

pub(crate) const BILL_COLUMNS: &str = "id, bill_number, vehicle_no, customer_name, \
    customer_address, route, start_meter, end_meter, hire_rate, allowed_distance, \
    package_charge, waiting_charge, gate_pass, advance_amount, currency, exchange_rate, \
    payment_method, total_amount, total_amount_base, booking_id, created_at, updated_at";

/// Repository for bill database operations.
///
/// ## Usage
/// ```rust,ignore
/// let bill = db.bills().create(&new_bill).await?;
/// let doc = InvoiceDocument::from_bill(&bill, &profile);
/// ```
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        BillRepository { pool, clock }
    }

    /// Prices and stores a bill, closing its booking in the same transaction.
    ///
    /// ## Returns
    /// * `Err(DbError::Validation)` - bad form input
    /// * `Err(DbError::NotFound)` - `booking_id` names no booking
    /// * `Err(DbError::Rule(BookingNotCompletable))` - booking already cancelled/completed
    pub async fn create(&self, input: &NewBill) -> DbResult<Bill> {
        validate_new_bill(input)?;

        let totals = compute_bill(&input.trip_input());
        let total_amount_base = input.exchange_rate.convert(totals.total_amount);
        let booking_id = clean_optional(&input.booking_id);

        let id = new_id();
        let now = self.clock.now();

        debug!(
            vehicle_no = %input.vehicle_no,
            mode = ?totals.mode,
            total = %totals.total_amount,
            booking_id = ?booking_id,
            "Creating bill"
        );

        let mut tx = begin_write(&self.pool).await?;

        if let Some(booking_id) = &booking_id {
            let booking = fetch_in_tx(&mut tx, booking_id)
                .await?
                .ok_or_else(|| DbError::not_found("Booking", booking_id))?;
            ensure_completable(&booking.id, booking.status)?;
        }

        let bill_number: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(bill_number), 0) + 1 FROM bills")
                .fetch_one(&mut *tx)
                .await?;

        sqlx::query(
            r#"
            INSERT INTO bills (
                id, bill_number, vehicle_no, customer_name, customer_address, route,
                start_meter, end_meter, hire_rate, allowed_distance,
                package_charge, waiting_charge, gate_pass, advance_amount,
                currency, exchange_rate, payment_method,
                total_amount, total_amount_base, booking_id,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14,
                ?15, ?16, ?17,
                ?18, ?19, ?20,
                ?21, ?21
            )
            "#,
        )
        .bind(&id)
        .bind(bill_number)
        .bind(input.vehicle_no.trim())
        .bind(input.customer_name.trim())
        .bind(clean_optional(&input.customer_address))
        .bind(input.route.trim())
        .bind(input.start_meter)
        .bind(input.end_meter)
        .bind(input.hire_rate)
        .bind(input.allowed_distance)
        .bind(input.package_charge)
        .bind(input.waiting_charge)
        .bind(input.gate_pass)
        .bind(input.advance_amount)
        .bind(&input.currency)
        .bind(input.exchange_rate)
        .bind(input.payment_method)
        .bind(totals.total_amount)
        .bind(total_amount_base)
        .bind(&booking_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if let Some(booking_id) = &booking_id {
            sqlx::query("UPDATE bookings SET status = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(booking_id)
                .bind(BookingStatus::Completed)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %id, bill_number, total = %totals.total_amount, "Bill created");

        self.get(&id)
            .await?
            .ok_or_else(|| DbError::not_found("Bill", &id))
    }

    /// Lists bills, newest first.
    ///
    /// A non-empty query matches vehicle number or customer name, or equals
    /// the bill number when it parses as one.
    pub async fn list(&self, query: &str) -> DbResult<Vec<Bill>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, "Listing bills");

        let bills = if query.is_empty() {
            sqlx::query_as::<_, Bill>(&format!(
                "SELECT {BILL_COLUMNS} FROM bills ORDER BY created_at DESC, bill_number DESC"
            ))
            .fetch_all(&self.pool)
            .await?
        } else {
            let number: Option<i64> = query.trim_start_matches('#').parse().ok();
            sqlx::query_as::<_, Bill>(&format!(
                r#"
                SELECT {BILL_COLUMNS} FROM bills
                WHERE vehicle_no LIKE ?1 ESCAPE '\'
                   OR customer_name LIKE ?1 ESCAPE '\'
                   OR bill_number = ?2
                ORDER BY created_at DESC, bill_number DESC
                "#
            ))
            .bind(contains_pattern(&query))
            .bind(number)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(bills)
    }

    /// The `limit` most recently created bills.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Bill>> {
        let bills = sqlx::query_as::<_, Bill>(&format!(
            "SELECT {BILL_COLUMNS} FROM bills ORDER BY created_at DESC, bill_number DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(bills)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Bill>> {
        let bill = sqlx::query_as::<_, Bill>(&format!(
            "SELECT {BILL_COLUMNS} FROM bills WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(bill)
    }

    pub async fn get_by_number(&self, bill_number: i64) -> DbResult<Option<Bill>> {
        let bill = sqlx::query_as::<_, Bill>(&format!(
            "SELECT {BILL_COLUMNS} FROM bills WHERE bill_number = ?1"
        ))
        .bind(bill_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(bill)
    }

    /// Deletes a bill. A booking it closed stays COMPLETED.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM bills WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Bill", id));
        }

        info!(id = %id, "Bill deleted");
        Ok(())
    }
}
