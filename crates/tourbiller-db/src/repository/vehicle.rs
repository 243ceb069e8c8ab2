//! # Vehicle Repository
//!
//! Database operations for the hire fleet.
//!
//! ## Key Operations
//! - Register / edit / remove vehicles
//! - Search by registration number or model
//! - Active count (dashboard fleet size)

use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info};

use tourbiller_core::validation::{validate_new_vehicle, validate_search_query};
use tourbiller_core::{Clock, NewVehicle, Vehicle, VehicleStatus};

use super::{clean_optional, contains_pattern, new_id};
use crate::error::{DbError, DbResult};

const VEHICLE_COLUMNS: &str = "id, vehicle_no, model, category, status, default_rate, \
    excess_km_rate, rate_per_day, km_per_day, extra_hour_rate, created_at, updated_at";

/// Repository for vehicle database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.vehicles();
///
/// let van = repo.create(&new_vehicle).await?;
/// let matches = repo.list("KDH").await?;
/// ```
#[derive(Debug, Clone)]
pub struct VehicleRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl VehicleRepository {
    /// Creates a new VehicleRepository.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        VehicleRepository { pool, clock }
    }

    /// Registers a vehicle.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - vehicle number already registered
    pub async fn create(&self, input: &NewVehicle) -> DbResult<Vehicle> {
        validate_new_vehicle(input)?;

        let id = new_id();
        let now = self.clock.now();
        let vehicle_no = input.vehicle_no.trim().to_string();

        debug!(vehicle_no = %vehicle_no, "Registering vehicle");

        sqlx::query(
            r#"
            INSERT INTO vehicles (
                id, vehicle_no, model, category, status,
                default_rate, excess_km_rate, rate_per_day, km_per_day, extra_hour_rate,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
            "#,
        )
        .bind(&id)
        .bind(&vehicle_no)
        .bind(clean_optional(&input.model))
        .bind(input.category.trim())
        .bind(input.status)
        .bind(input.default_rate)
        .bind(input.excess_km_rate)
        .bind(input.rate_per_day)
        .bind(input.km_per_day)
        .bind(input.extra_hour_rate)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("vehicle_no", &vehicle_no),
            other => other,
        })?;

        info!(id = %id, vehicle_no = %vehicle_no, "Vehicle registered");

        self.get(&id)
            .await?
            .ok_or_else(|| DbError::not_found("Vehicle", &id))
    }

    /// Lists vehicles, most recently edited first.
    ///
    /// An empty query returns the whole fleet; otherwise matches anywhere in
    /// the vehicle number or model (case-insensitive).
    pub async fn list(&self, query: &str) -> DbResult<Vec<Vehicle>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, "Listing vehicles");

        let vehicles = if query.is_empty() {
            sqlx::query_as::<_, Vehicle>(&format!(
                "SELECT {VEHICLE_COLUMNS} FROM vehicles ORDER BY updated_at DESC"
            ))
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Vehicle>(&format!(
                r#"
                SELECT {VEHICLE_COLUMNS} FROM vehicles
                WHERE vehicle_no LIKE ?1 ESCAPE '\' OR model LIKE ?1 ESCAPE '\'
                ORDER BY updated_at DESC
                "#
            ))
            .bind(contains_pattern(&query))
            .fetch_all(&self.pool)
            .await?
        };

        Ok(vehicles)
    }

    /// Gets a vehicle by its ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    /// Gets a vehicle by its registration number (bill and booking forms
    /// pick vehicles by number).
    pub async fn get_by_vehicle_no(&self, vehicle_no: &str) -> DbResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE vehicle_no = ?1"
        ))
        .bind(vehicle_no.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(vehicle)
    }

    /// Replaces a vehicle's editable fields.
    pub async fn update(&self, id: &str, input: &NewVehicle) -> DbResult<Vehicle> {
        validate_new_vehicle(input)?;

        let vehicle_no = input.vehicle_no.trim().to_string();

        let result = sqlx::query(
            r#"
            UPDATE vehicles SET
                vehicle_no = ?2,
                model = ?3,
                category = ?4,
                status = ?5,
                default_rate = ?6,
                excess_km_rate = ?7,
                rate_per_day = ?8,
                km_per_day = ?9,
                extra_hour_rate = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&vehicle_no)
        .bind(clean_optional(&input.model))
        .bind(input.category.trim())
        .bind(input.status)
        .bind(input.default_rate)
        .bind(input.excess_km_rate)
        .bind(input.rate_per_day)
        .bind(input.km_per_day)
        .bind(input.extra_hour_rate)
        .bind(self.clock.now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("vehicle_no", &vehicle_no),
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Vehicle", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Vehicle", id))
    }

    /// Removes a vehicle. Bills keep their copied vehicle number.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Vehicle", id));
        }

        info!(id = %id, "Vehicle deleted");
        Ok(())
    }

    /// Number of vehicles currently in service.
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vehicles WHERE status = ?1")
            .bind(VehicleStatus::Active)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::test_db;
    use chrono::Duration;
    use tourbiller_core::{Distance, Money};

    fn van(vehicle_no: &str, model: &str) -> NewVehicle {
        NewVehicle {
            vehicle_no: vehicle_no.to_string(),
            model: Some(model.to_string()),
            category: "VAN".to_string(),
            default_rate: Money::from_major(120),
            km_per_day: Distance::from_km(100),
            ..NewVehicle::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (db, _) = test_db().await;
        let repo = db.vehicles();

        let created = repo.create(&van("PH-4521", "Toyota KDH")).await.unwrap();
        assert_eq!(created.vehicle_no, "PH-4521");
        assert_eq!(created.status, VehicleStatus::Active);
        assert_eq!(created.default_rate, Money::from_major(120));
        assert_eq!(created.km_per_day, Distance::from_km(100));

        let by_no = repo.get_by_vehicle_no("PH-4521").await.unwrap().unwrap();
        assert_eq!(by_no.id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_vehicle_no_rejected() {
        let (db, _) = test_db().await;
        let repo = db.vehicles();

        repo.create(&van("PH-4521", "Toyota KDH")).await.unwrap();
        let err = repo.create(&van("PH-4521", "Nissan Caravan")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_invalid_input_rejected() {
        let (db, _) = test_db().await;
        let mut input = van("PH-4521", "Toyota KDH");
        input.default_rate = Money::from_major(-1);

        let err = db.vehicles().create(&input).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_search_matches_number_and_model() {
        let (db, clock) = test_db().await;
        let repo = db.vehicles();

        repo.create(&van("PH-4521", "Toyota KDH")).await.unwrap();
        clock.advance(Duration::minutes(1));
        repo.create(&van("CAB-7788", "Suzuki Wagon R")).await.unwrap();

        let all = repo.list("").await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].vehicle_no, "CAB-7788");

        let kdh = repo.list("kdh").await.unwrap();
        assert_eq!(kdh.len(), 1);
        assert_eq!(kdh[0].vehicle_no, "PH-4521");

        let cab = repo.list("CAB").await.unwrap();
        assert_eq!(cab.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (db, clock) = test_db().await;
        let repo = db.vehicles();
        let created = repo.create(&van("PH-4521", "Toyota KDH")).await.unwrap();

        clock.advance(Duration::hours(1));
        let mut edit = van("PH-4521", "Toyota KDH High Roof");
        edit.status = VehicleStatus::Maintenance;
        let updated = repo.update(&created.id, &edit).await.unwrap();

        assert_eq!(updated.model.as_deref(), Some("Toyota KDH High Roof"));
        assert_eq!(updated.status, VehicleStatus::Maintenance);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(repo.count_active().await.unwrap(), 0);

        repo.delete(&created.id).await.unwrap();
        assert!(repo.get(&created.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&created.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
