//! # Tour Schedule Repository
//!
//! Database operations for itinerary templates and their day items.
//!
//! ## Key Operations
//! - Create a schedule with its items (one transaction)
//! - Replace a schedule's items wholesale on edit (one transaction)
//! - Soft delete: `is_active = 0` hides it from lists, quotations keep
//!   pointing at it

use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use tracing::{debug, info};

use tourbiller_core::validation::{validate_search_query, validate_tour_schedule};
use tourbiller_core::{
    Clock, NewDayItem, NewTourSchedule, TourSchedule, TourScheduleDayItem, TourScheduleWithItems,
};

use super::{begin_write, clean_optional, contains_pattern, new_id};
use crate::error::{DbError, DbResult};

const SCHEDULE_COLUMNS: &str = "id, name, description, days, base_price_per_person, \
    vehicle_category, is_active, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, tour_schedule_id, day_number, title, description, distance, \
    accommodation, meals, activities, other_costs";

/// Repository for tour schedule database operations.
#[derive(Debug, Clone)]
pub struct TourScheduleRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl TourScheduleRepository {
    /// Creates a new TourScheduleRepository.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        TourScheduleRepository { pool, clock }
    }

    /// Creates an active schedule and its day items.
    pub async fn create(&self, input: &NewTourSchedule) -> DbResult<TourScheduleWithItems> {
        validate_tour_schedule(input)?;

        let id = new_id();
        let now = self.clock.now();

        debug!(name = %input.name, days = input.days, items = input.items.len(), "Creating tour schedule");

        let mut tx = begin_write(&self.pool).await?;

        sqlx::query(
            r#"
            INSERT INTO tour_schedules (
                id, name, description, days, base_price_per_person,
                vehicle_category, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)
            "#,
        )
        .bind(&id)
        .bind(input.name.trim())
        .bind(clean_optional(&input.description))
        .bind(input.days)
        .bind(input.base_price_per_person)
        .bind(vehicle_category(input))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, &id, &input.items).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %id, name = %input.name, "Tour schedule created");

        self.get(&id)
            .await?
            .ok_or_else(|| DbError::not_found("TourSchedule", &id))
    }

    /// Lists active schedules with their items, most recently edited first.
    ///
    /// A non-empty query matches name or description.
    pub async fn list(&self, query: &str) -> DbResult<Vec<TourScheduleWithItems>> {
        let query = validate_search_query(query)?;

        let schedules = if query.is_empty() {
            sqlx::query_as::<_, TourSchedule>(&format!(
                "SELECT {SCHEDULE_COLUMNS} FROM tour_schedules WHERE is_active = 1 ORDER BY updated_at DESC"
            ))
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, TourSchedule>(&format!(
                r#"
                SELECT {SCHEDULE_COLUMNS} FROM tour_schedules
                WHERE is_active = 1
                  AND (name LIKE ?1 ESCAPE '\' OR description LIKE ?1 ESCAPE '\')
                ORDER BY updated_at DESC
                "#
            ))
            .bind(contains_pattern(&query))
            .fetch_all(&self.pool)
            .await?
        };

        let mut result = Vec::with_capacity(schedules.len());
        for schedule in schedules {
            let items = self.items(&schedule.id).await?;
            result.push(TourScheduleWithItems { schedule, items });
        }

        debug!(count = result.len(), query = %query, "Listed tour schedules");
        Ok(result)
    }

    /// Gets a schedule (active or not) with items ordered by day.
    pub async fn get(&self, id: &str) -> DbResult<Option<TourScheduleWithItems>> {
        let schedule = sqlx::query_as::<_, TourSchedule>(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM tour_schedules WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match schedule {
            Some(schedule) => {
                let items = self.items(id).await?;
                Ok(Some(TourScheduleWithItems { schedule, items }))
            }
            None => Ok(None),
        }
    }

    /// Day items for a schedule, ordered by day.
    pub async fn items(&self, schedule_id: &str) -> DbResult<Vec<TourScheduleDayItem>> {
        let items = sqlx::query_as::<_, TourScheduleDayItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM tour_schedule_items WHERE tour_schedule_id = ?1 ORDER BY day_number ASC, rowid ASC"
        ))
        .bind(schedule_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Number of quotations generated from a schedule.
    pub async fn quotation_count(&self, schedule_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM quotations WHERE tour_schedule_id = ?1")
                .bind(schedule_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Updates the schedule header and replaces all of its items.
    pub async fn update(&self, id: &str, input: &NewTourSchedule) -> DbResult<TourScheduleWithItems> {
        validate_tour_schedule(input)?;

        let mut tx = begin_write(&self.pool).await?;

        let result = sqlx::query(
            r#"
            UPDATE tour_schedules SET
                name = ?2,
                description = ?3,
                days = ?4,
                base_price_per_person = ?5,
                vehicle_category = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(clean_optional(&input.description))
        .bind(input.days)
        .bind(input.base_price_per_person)
        .bind(vehicle_category(input))
        .bind(self.clock.now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TourSchedule", id));
        }

        sqlx::query("DELETE FROM tour_schedule_items WHERE tour_schedule_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        insert_items(&mut tx, id, &input.items).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %id, items = input.items.len(), "Tour schedule updated");

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("TourSchedule", id))
    }

    /// Hides a schedule from lists. Existing quotations are unaffected.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE tour_schedules SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(self.clock.now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TourSchedule", id));
        }

        info!(id = %id, "Tour schedule deactivated");
        Ok(())
    }
}

fn vehicle_category(input: &NewTourSchedule) -> &str {
    match input.vehicle_category.trim() {
        "" => "CAR",
        category => category,
    }
}

async fn insert_items(
    tx: &mut Transaction<'_, Sqlite>,
    schedule_id: &str,
    items: &[NewDayItem],
) -> DbResult<()> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO tour_schedule_items (
                id, tour_schedule_id, day_number, title, description,
                distance, accommodation, meals, activities, other_costs
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(new_id())
        .bind(schedule_id)
        .bind(item.day_number)
        .bind(item.title.trim())
        .bind(clean_optional(&item.description))
        .bind(item.distance)
        .bind(item.accommodation)
        .bind(item.meals)
        .bind(item.activities)
        .bind(item.other_costs)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Loads a schedule's items inside an open transaction.
pub(crate) async fn items_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    schedule_id: &str,
) -> DbResult<Vec<TourScheduleDayItem>> {
    let items = sqlx::query_as::<_, TourScheduleDayItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM tour_schedule_items WHERE tour_schedule_id = ?1 ORDER BY day_number ASC, rowid ASC"
    ))
    .bind(schedule_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(items)
}

/// Loads a schedule header inside an open transaction.
pub(crate) async fn schedule_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    id: &str,
) -> DbResult<Option<TourSchedule>> {
    let schedule = sqlx::query_as::<_, TourSchedule>(&format!(
        "SELECT {SCHEDULE_COLUMNS} FROM tour_schedules WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(schedule)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use tourbiller_core::{Distance, Money, NewDayItem, NewTourSchedule};

    /// Three-day loop: 120 + 80 + 150 km, two nights' accommodation.
    pub fn three_day_tour() -> NewTourSchedule {
        NewTourSchedule {
            name: "Hill Country Loop".to_string(),
            description: Some("Kandy, Nuwara Eliya and Ella".to_string()),
            days: 3,
            base_price_per_person: Money::from_major(45_000),
            vehicle_category: "VAN".to_string(),
            items: vec![
                NewDayItem {
                    day_number: 1,
                    title: "Colombo to Kandy".to_string(),
                    distance: Distance::from_km(120),
                    accommodation: Money::from_major(12_000),
                    meals: Money::from_major(3_000),
                    ..NewDayItem::default()
                },
                NewDayItem {
                    day_number: 2,
                    title: "Kandy to Nuwara Eliya".to_string(),
                    distance: Distance::from_km(80),
                    accommodation: Money::from_major(15_000),
                    meals: Money::from_major(3_000),
                    activities: Money::from_major(2_500),
                    ..NewDayItem::default()
                },
                NewDayItem {
                    day_number: 3,
                    title: "Nuwara Eliya to Ella".to_string(),
                    distance: Distance::from_km(150),
                    meals: Money::from_major(2_000),
                    other_costs: Money::from_major(500),
                    ..NewDayItem::default()
                },
            ],
        }
    }
}
