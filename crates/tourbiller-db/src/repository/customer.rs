//! # Customer Repository
//!
//! Database operations for customers.

use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info};

use tourbiller_core::validation::{validate_new_customer, validate_search_query};
use tourbiller_core::{Clock, Customer, NewCustomer};

use super::{clean_optional, contains_pattern, new_id};
use crate::error::{DbError, DbResult};

const CUSTOMER_COLUMNS: &str = "id, name, mobile, email, address, created_at, updated_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        CustomerRepository { pool, clock }
    }

    pub async fn create(&self, input: &NewCustomer) -> DbResult<Customer> {
        validate_new_customer(input)?;

        let id = new_id();
        let now = self.clock.now();

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, mobile, email, address, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(&id)
        .bind(input.name.trim())
        .bind(input.mobile.trim())
        .bind(clean_optional(&input.email))
        .bind(clean_optional(&input.address))
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(id = %id, "Customer created");

        self.get(&id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", &id))
    }

    /// Lists customers, most recently edited first.
    ///
    /// A non-empty query matches name, mobile or email.
    pub async fn list(&self, query: &str) -> DbResult<Vec<Customer>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, "Listing customers");

        let customers = if query.is_empty() {
            sqlx::query_as::<_, Customer>(&format!(
                "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY updated_at DESC"
            ))
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Customer>(&format!(
                r#"
                SELECT {CUSTOMER_COLUMNS} FROM customers
                WHERE name LIKE ?1 ESCAPE '\'
                   OR mobile LIKE ?1 ESCAPE '\'
                   OR email LIKE ?1 ESCAPE '\'
                ORDER BY updated_at DESC
                "#
            ))
            .bind(contains_pattern(&query))
            .fetch_all(&self.pool)
            .await?
        };

        Ok(customers)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn update(&self, id: &str, input: &NewCustomer) -> DbResult<Customer> {
        validate_new_customer(input)?;

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                mobile = ?3,
                email = ?4,
                address = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.mobile.trim())
        .bind(clean_optional(&input.email))
        .bind(clean_optional(&input.address))
        .bind(self.clock.now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        info!(id = %id, "Customer deleted");
        Ok(())
    }
}
