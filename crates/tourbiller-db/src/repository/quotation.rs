//! # Quotation Repository
//!
//! Database operations for priced tour quotations.
//!
//! ## Generation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  NewQuotation (schedule id, customer, pricing strategy, markup ...)    │
//! │       │                                                                 │
//! │       ▼  validate_new_quotation                                        │
//! │  ┌──────────────────────── BEGIN IMMEDIATE ───────────────────────┐    │
//! │  │  load schedule + day items          (NotFound if missing)      │    │
//! │  │  compute_quotation(items, input)    ← tourbiller-core          │    │
//! │  │  quotation_number = MAX + 1                                    │    │
//! │  │  INSERT with every retained total, status DRAFT               │    │
//! │  │  INSERT quotation_items (copy of the day items)               │    │
//! │  └────────────────────────────────────────────────────────────────┘    │
//! │                                                                         │
//! │  Totals, days and itinerary are frozen at generation time: editing     │
//! │  the schedule later does not reach existing quotations.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use tracing::{debug, info};

use tourbiller_core::quotation::{compute_quotation, QuotationInput};
use tourbiller_core::validation::{validate_new_quotation, validate_search_query};
use tourbiller_core::{
    Clock, NewQuotation, Quotation, QuotationItem, QuotationStatus, QuotationWithItems,
    TourScheduleDayItem,
};

use super::tour_schedule::{items_in_tx, schedule_in_tx};
use super::{begin_write, clean_optional, contains_pattern, new_id};
use crate::error::{DbError, DbResult};

const QUOTATION_COLUMNS: &str = "id, quotation_number, tour_schedule_id, schedule_name, days, \
    customer_name, customer_email, customer_phone, vehicle_no, number_of_persons, start_date, \
    pricing_mode, hire_rate_per_km, hire_rate_per_day, driver_cost_per_day, km_per_day, \
    markup, discount, advance_amount, total_distance, transport_cost, driver_cost_total, \
    accommodation_total, meals_total, activities_total, other_costs_total, subtotal, \
    markup_amount, total_amount, excluded_items, notes, valid_until, status, \
    created_at, updated_at";

const ITEM_COLUMNS: &str = "id, quotation_id, day_number, title, description, distance, \
    accommodation, meals, activities, other_costs";

/// Repository for quotation database operations.
#[derive(Debug, Clone)]
pub struct QuotationRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl QuotationRepository {
    /// Creates a new QuotationRepository.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        QuotationRepository { pool, clock }
    }

    /// Prices a schedule for a customer and stores the result as a DRAFT.
    pub async fn generate(&self, input: &NewQuotation) -> DbResult<Quotation> {
        validate_new_quotation(input)?;

        let id = new_id();
        let now = self.clock.now();

        let mut tx = begin_write(&self.pool).await?;

        let schedule = schedule_in_tx(&mut tx, &input.tour_schedule_id)
            .await?
            .ok_or_else(|| DbError::not_found("TourSchedule", &input.tour_schedule_id))?;
        let items = items_in_tx(&mut tx, &schedule.id).await?;

        let pricing = compute_quotation(
            &items,
            &QuotationInput {
                strategy: input.strategy(),
                schedule_days: schedule.days,
                markup: input.markup,
                discount: input.discount,
            },
        );

        debug!(
            schedule = %schedule.name,
            mode = ?pricing.mode,
            subtotal = %pricing.subtotal,
            total = %pricing.total_amount,
            "Priced quotation"
        );

        let quotation_number: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(quotation_number), 0) + 1 FROM quotations")
                .fetch_one(&mut *tx)
                .await?;

        sqlx::query(
            r#"
            INSERT INTO quotations (
                id, quotation_number, tour_schedule_id, schedule_name, days,
                customer_name, customer_email, customer_phone, vehicle_no,
                number_of_persons, start_date, pricing_mode,
                hire_rate_per_km, hire_rate_per_day, driver_cost_per_day, km_per_day,
                markup, discount, advance_amount,
                total_distance, transport_cost, driver_cost_total,
                accommodation_total, meals_total, activities_total, other_costs_total,
                subtotal, markup_amount, total_amount,
                excluded_items, notes, valid_until, status,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12,
                ?13, ?14, ?15, ?16,
                ?17, ?18, ?19,
                ?20, ?21, ?22,
                ?23, ?24, ?25, ?26,
                ?27, ?28, ?29,
                ?30, ?31, ?32, ?33,
                ?34, ?34
            )
            "#,
        )
        .bind(&id)
        .bind(quotation_number)
        .bind(&schedule.id)
        .bind(&schedule.name)
        .bind(schedule.days)
        .bind(input.customer_name.trim())
        .bind(clean_optional(&input.customer_email))
        .bind(clean_optional(&input.customer_phone))
        .bind(clean_optional(&input.vehicle_no))
        .bind(input.number_of_persons)
        .bind(input.start_date)
        .bind(pricing.mode)
        .bind(input.hire_rate_per_km)
        .bind(input.hire_rate_per_day)
        .bind(input.driver_cost_per_day)
        .bind(input.km_per_day)
        .bind(input.markup)
        .bind(input.discount)
        .bind(input.advance_amount)
        .bind(pricing.sums.total_distance)
        .bind(pricing.transport_cost)
        .bind(pricing.driver_cost_total)
        .bind(pricing.sums.accommodation_total)
        .bind(pricing.sums.meals_total)
        .bind(pricing.sums.activities_total)
        .bind(pricing.sums.other_costs_total)
        .bind(pricing.subtotal)
        .bind(pricing.markup_amount)
        .bind(pricing.total_amount)
        .bind(clean_optional(&input.excluded_items))
        .bind(clean_optional(&input.notes))
        .bind(input.valid_until)
        .bind(QuotationStatus::Draft)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        snapshot_items_in_tx(&mut tx, &id, &items).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id = %id,
            quotation_number,
            days = schedule.days,
            items = items.len(),
            total = %pricing.total_amount,
            "Quotation generated"
        );

        self.get(&id)
            .await?
            .ok_or_else(|| DbError::not_found("Quotation", &id))
    }

    /// Lists quotations, newest first.
    ///
    /// A non-empty query matches customer name or schedule name, or equals
    /// the quotation number when it parses as one.
    pub async fn list(&self, query: &str) -> DbResult<Vec<Quotation>> {
        let query = validate_search_query(query)?;

        let quotations = if query.is_empty() {
            sqlx::query_as::<_, Quotation>(&format!(
                "SELECT {QUOTATION_COLUMNS} FROM quotations ORDER BY created_at DESC, quotation_number DESC"
            ))
            .fetch_all(&self.pool)
            .await?
        } else {
            let number: Option<i64> = query.trim_start_matches('#').parse().ok();
            sqlx::query_as::<_, Quotation>(&format!(
                r#"
                SELECT {QUOTATION_COLUMNS} FROM quotations
                WHERE customer_name LIKE ?1 ESCAPE '\'
                   OR quotation_number = ?2
                   OR schedule_name LIKE ?1 ESCAPE '\'
                ORDER BY created_at DESC, quotation_number DESC
                "#
            ))
            .bind(contains_pattern(&query))
            .bind(number)
            .fetch_all(&self.pool)
            .await?
        };

        debug!(count = quotations.len(), query = %query, "Listed quotations");
        Ok(quotations)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Quotation>> {
        let quotation = sqlx::query_as::<_, Quotation>(&format!(
            "SELECT {QUOTATION_COLUMNS} FROM quotations WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quotation)
    }

    /// The itinerary copied onto a quotation when it was generated.
    pub async fn items(&self, quotation_id: &str) -> DbResult<Vec<QuotationItem>> {
        let items = sqlx::query_as::<_, QuotationItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM quotation_items WHERE quotation_id = ?1 ORDER BY day_number ASC, rowid ASC"
        ))
        .bind(quotation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets a quotation with its itinerary snapshot.
    ///
    /// Reads only what was stored at generation, so the print page agrees
    /// with the stored totals whatever happened to the schedule since.
    pub async fn get_detail(&self, id: &str) -> DbResult<Option<QuotationWithItems>> {
        let Some(quotation) = self.get(id).await? else {
            return Ok(None);
        };
        let items = self.items(&quotation.id).await?;

        Ok(Some(QuotationWithItems { quotation, items }))
    }

    /// Moves a quotation to `status` given by its wire name.
    ///
    /// ## Returns
    /// * `Err(DbError::Validation)` - not one of DRAFT, SENT, ACCEPTED, EXPIRED
    pub async fn update_status(&self, id: &str, status: &str) -> DbResult<Quotation> {
        let status: QuotationStatus = status.parse()?;
        self.set_status(id, status).await
    }

    pub async fn set_status(&self, id: &str, status: QuotationStatus) -> DbResult<Quotation> {
        let result =
            sqlx::query("UPDATE quotations SET status = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(status)
                .bind(self.clock.now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quotation", id));
        }

        info!(id = %id, status = status.as_str(), "Quotation status updated");

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Quotation", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM quotations WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quotation", id));
        }

        info!(id = %id, "Quotation deleted");
        Ok(())
    }
}

async fn snapshot_items_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    quotation_id: &str,
    items: &[TourScheduleDayItem],
) -> DbResult<()> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO quotation_items (
                id, quotation_id, day_number, title, description, distance,
                accommodation, meals, activities, other_costs
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(new_id())
        .bind(quotation_id)
        .bind(item.day_number)
        .bind(&item.title)
        .bind(&item.description)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{file_db, remove_file_db, test_db};
    use crate::repository::tour_schedule::fixtures::three_day_tour;
    use chrono::Duration;
    use tourbiller_core::documents::QuotationDocument;
    use tourbiller_core::{Distance, Money, Percentage, PricingMode};

    async fn schedule_id(db: &crate::Database) -> String {
        db.tour_schedules()
            .create(&three_day_tour())
            .await
            .unwrap()
            .schedule
            .id
    }

    fn per_day(schedule_id: &str) -> NewQuotation {
        NewQuotation {
            tour_schedule_id: schedule_id.to_string(),
            customer_name: "Anna Schmidt".to_string(),
            customer_email: Some("anna@example.de".to_string()),
            number_of_persons: 2,
            pricing_mode: PricingMode::PerDay,
            hire_rate_per_day: Money::from_major(10_000),
            driver_cost_per_day: Money::from_major(2_000),
            markup: Percentage::from_bps(1000),
            discount: Money::from_major(1_000),
            advance_amount: Money::from_major(20_000),
            ..NewQuotation::default()
        }
    }

    #[tokio::test]
    async fn test_generate_per_day() {
        let (db, _) = test_db().await;
        let schedule_id = schedule_id(&db).await;

        let q = db.quotations().generate(&per_day(&schedule_id)).await.unwrap();

        assert_eq!(q.quotation_number, 1);
        assert_eq!(q.status, QuotationStatus::Draft);
        assert_eq!(q.pricing_mode, PricingMode::PerDay);
        assert_eq!(q.total_distance, Distance::from_km(350));
        // 3 days * 10,000 and 3 days * 2,000
        assert_eq!(q.transport_cost, Money::from_major(30_000));
        assert_eq!(q.driver_cost_total, Money::from_major(6_000));
        assert_eq!(q.accommodation_total, Money::from_major(27_000));
        // 30,000 + 6,000 + 38,000 itinerary costs
        assert_eq!(q.subtotal, Money::from_major(74_000));
        assert_eq!(q.markup_amount, Money::from_major(7_400));
        assert_eq!(q.total_amount, Money::from_major(80_400));
        assert_eq!(q.balance_due(), Money::from_major(60_400));
    }

    #[tokio::test]
    async fn test_generate_per_km() {
        let (db, _) = test_db().await;
        let schedule_id = schedule_id(&db).await;

        let input = NewQuotation {
            pricing_mode: PricingMode::PerKm,
            hire_rate_per_km: Money::from_major(100),
            markup: Percentage::zero(),
            discount: Money::zero(),
            ..per_day(&schedule_id)
        };
        let q = db.quotations().generate(&input).await.unwrap();

        assert_eq!(q.pricing_mode, PricingMode::PerKm);
        assert_eq!(q.transport_cost, Money::from_major(35_000));
        assert_eq!(q.driver_cost_total, Money::zero());
        assert_eq!(q.total_amount, Money::from_major(73_000));
    }

    #[tokio::test]
    async fn test_generate_for_missing_schedule() {
        let (db, _) = test_db().await;
        let err = db
            .quotations()
            .generate(&per_day("6f1c1f4e-8d7a-4b8e-9a57-0f8a9c2b1d11"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_totals_frozen_after_schedule_edit() {
        let (db, _) = test_db().await;
        let schedule_id = schedule_id(&db).await;
        let q = db.quotations().generate(&per_day(&schedule_id)).await.unwrap();
        assert_eq!(q.schedule_name, "Hill Country Loop");
        assert_eq!(q.days, 3);

        let mut edit = three_day_tour();
        edit.name = "Kandy Day Trip".to_string();
        edit.days = 1;
        edit.items.truncate(1);
        db.tour_schedules().update(&schedule_id, &edit).await.unwrap();

        let again = db.quotations().get(&q.id).await.unwrap().unwrap();
        assert_eq!(again.total_amount, q.total_amount);
        assert_eq!(again.days, 3);
        assert_eq!(again.schedule_name, "Hill Country Loop");

        let detail = db.quotations().get_detail(&q.id).await.unwrap().unwrap();
        assert_eq!(detail.items.len(), 3);
        assert_eq!(
            detail.items.iter().map(|i| i.day_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn test_document_after_schedule_edit_matches_stored_totals() {
        let (db, _) = test_db().await;
        let schedule_id = schedule_id(&db).await;
        let q = db.quotations().generate(&per_day(&schedule_id)).await.unwrap();

        let mut edit = three_day_tour();
        edit.days = 1;
        edit.items.truncate(1);
        db.tour_schedules().update(&schedule_id, &edit).await.unwrap();

        let profile = db.business_profile().get_or_create().await.unwrap();
        let detail = db.quotations().get_detail(&q.id).await.unwrap().unwrap();
        let doc = QuotationDocument::from_quotation(&detail.quotation, &detail.items, &profile);

        assert_eq!(doc.days, 3);
        assert_eq!(
            doc.cost_lines[0].detail.as_deref(),
            Some("3 days × Rs. 10,000.00/day")
        );
        assert_eq!(doc.cost_lines[0].amount, q.transport_cost);
        assert_eq!(doc.itinerary.len(), 3);

        let accommodation: Money = doc.itinerary.iter().map(|row| row.accommodation).sum();
        assert_eq!(accommodation, q.accommodation_total);
        let itinerary: Money = doc.itinerary.iter().map(|row| row.day_total).sum();
        assert_eq!(itinerary, Money::from_major(38_000));

        let cost_sum: Money = doc.cost_lines.iter().map(|l| l.amount).sum();
        assert_eq!(cost_sum, q.subtotal);
        assert_eq!(doc.total, q.total_amount);
    }

    #[tokio::test]
    async fn test_delete_removes_itinerary_snapshot() {
        let (db, _) = test_db().await;
        let schedule_id = schedule_id(&db).await;
        let repo = db.quotations();
        let q = repo.generate(&per_day(&schedule_id)).await.unwrap();
        assert_eq!(repo.items(&q.id).await.unwrap().len(), 3);

        repo.delete(&q.id).await.unwrap();
        assert!(repo.items(&q.id).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_generates_get_distinct_numbers() {
        let (db, path) = file_db(4).await;
        let schedule_id = schedule_id(&db).await;

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let quotations = db.quotations();
                let input = per_day(&schedule_id);
                tokio::spawn(async move { quotations.generate(&input).await })
            })
            .collect();

        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap().unwrap().quotation_number);
        }
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=6).collect::<Vec<i64>>());

        remove_file_db(db, path).await;
    }

    #[tokio::test]
    async fn test_list_search_and_numbers() {
        let (db, clock) = test_db().await;
        let schedule_id = schedule_id(&db).await;
        let repo = db.quotations();

        repo.generate(&per_day(&schedule_id)).await.unwrap();
        clock.advance(Duration::minutes(1));
        let mut other = per_day(&schedule_id);
        other.customer_name = "Kasun Silva".to_string();
        let second = repo.generate(&other).await.unwrap();
        assert_eq!(second.quotation_number, 2);

        let all = repo.list("").await.unwrap();
        assert_eq!(all[0].id, second.id);
        assert_eq!(repo.list("silva").await.unwrap().len(), 1);
        assert_eq!(repo.list("hill country").await.unwrap().len(), 2);

        let mut renamed = three_day_tour();
        renamed.name = "Kandy Day Trip".to_string();
        db.tour_schedules().update(&schedule_id, &renamed).await.unwrap();
        assert_eq!(repo.list("hill country").await.unwrap().len(), 2);
        assert!(repo.list("kandy day").await.unwrap().is_empty());
        assert_eq!(repo.list("2").await.unwrap()[0].customer_name, "Kasun Silva");
    }

    #[tokio::test]
    async fn test_status_update_and_delete() {
        let (db, _) = test_db().await;
        let schedule_id = schedule_id(&db).await;
        let repo = db.quotations();
        let q = repo.generate(&per_day(&schedule_id)).await.unwrap();

        let sent = repo.update_status(&q.id, "sent").await.unwrap();
        assert_eq!(sent.status, QuotationStatus::Sent);

        let err = repo.update_status(&q.id, "ARCHIVED").await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        repo.delete(&q.id).await.unwrap();
        assert!(repo.get(&q.id).await.unwrap().is_none());
        assert!(matches!(
            repo.set_status(&q.id, QuotationStatus::Accepted).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
