//! # Dashboard Repository
//!
//! Read-only summary of the fleet and takings, computed per request.
//!
//! ## Revenue Windows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  clock.now() (UTC) ──► local time at the configured offset             │
//! │                              │                                          │
//! │              ┌───────────────┴───────────────┐                          │
//! │              ▼                               ▼                          │
//! │   RevenueWindow::yearly           RevenueWindow::weekly                │
//! │   Jan 1 .. Dec 31 (local)         Mon .. Sun (local)                   │
//! │              │                               │                          │
//! │              └───────────────┬───────────────┘                          │
//! │                              ▼                                          │
//! │   bills.total_amount_base summed where created_at is inside            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, FixedOffset, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::debug;

use tourbiller_core::schedule::{available_vehicles, sum_revenue, RevenueWindow};
use tourbiller_core::{
    Bill, Booking, BookingStatus, BookingView, Clock, DashboardStats, Money, VehicleStatus,
    DASHBOARD_RECENT_LIMIT,
};

use super::bill::BILL_COLUMNS;
use super::booking::BOOKING_COLUMNS;
use crate::error::DbResult;

/// Repository for the dashboard summary.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    utc_offset: FixedOffset,
}

impl DashboardRepository {
    /// Creates a new DashboardRepository.
    ///
    /// `utc_offset` decides where the revenue years and weeks begin.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>, utc_offset: FixedOffset) -> Self {
        DashboardRepository {
            pool,
            clock,
            utc_offset,
        }
    }

    /// Computes the dashboard at the clock's "now".
    pub async fn stats(&self) -> DbResult<DashboardStats> {
        let now = self.clock.now();

        let total_vehicles: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM vehicles WHERE status = ?1")
                .bind(VehicleStatus::Active)
                .fetch_one(&self.pool)
                .await?;

        let ongoing = self.active_bookings(now).await?;
        let occupied_vehicles = ongoing.len() as i64;

        let local_now = now.with_timezone(&self.utc_offset);
        let year = RevenueWindow::yearly(&local_now);
        let week = RevenueWindow::weekly(&local_now);
        let revenue = self.revenue_since(year.start.min(week.start)).await?;

        let recent_bills = sqlx::query_as::<_, Bill>(&format!(
            "SELECT {BILL_COLUMNS} FROM bills ORDER BY created_at DESC, bill_number DESC LIMIT ?1"
        ))
        .bind(DASHBOARD_RECENT_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        let stats = DashboardStats {
            total_vehicles,
            occupied_vehicles,
            available_vehicles: available_vehicles(total_vehicles, occupied_vehicles),
            yearly_revenue: sum_revenue(revenue.iter().copied(), &year),
            weekly_revenue: sum_revenue(revenue.iter().copied(), &week),
            recent_bills,
            ongoing_bookings: ongoing
                .into_iter()
                .take(DASHBOARD_RECENT_LIMIT as usize)
                .map(|booking| BookingView::at(booking, now))
                .collect(),
        };

        debug!(
            total = stats.total_vehicles,
            occupied = stats.occupied_vehicles,
            yearly = %stats.yearly_revenue,
            weekly = %stats.weekly_revenue,
            "Dashboard computed"
        );

        Ok(stats)
    }

    /// CONFIRMED bookings whose window contains `now`, soonest start first.
    async fn active_bookings(&self, now: DateTime<Utc>) -> DbResult<Vec<Booking>> {
        let confirmed = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE status = ?1 ORDER BY start_date ASC"
        ))
        .bind(BookingStatus::Confirmed)
        .fetch_all(&self.pool)
        .await?;

        Ok(confirmed
            .into_iter()
            .filter(|booking| booking.window().is_active_at(now))
            .collect())
    }

    /// `(created_at, total_amount_base)` of bills from `since` onwards.
    async fn revenue_since(&self, since: DateTime<Utc>) -> DbResult<Vec<(DateTime<Utc>, Money)>> {
        let rows = sqlx::query_as::<_, (DateTime<Utc>, Money)>(
            "SELECT created_at, total_amount_base FROM bills WHERE created_at >= ?1",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
