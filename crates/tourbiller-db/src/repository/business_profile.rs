//! # Business Profile Repository
//!
//! The single letterhead row printed on invoices and quotations.

use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

use tourbiller_core::validation::validate_business_profile;
use tourbiller_core::{BusinessProfile, BusinessProfileInput, Clock};

use super::{clean_optional, new_id};
use crate::error::{DbError, DbResult};

const PROFILE_COLUMNS: &str = "id, company_name, address, phone, email, website, logo_url, \
    bank_name, bank_branch, bank_account_no, bank_account_name, usd_rate, created_at, updated_at";

/// Repository for the business profile.
#[derive(Debug, Clone)]
pub struct BusinessProfileRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl BusinessProfileRepository {
    /// Creates a new BusinessProfileRepository.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        BusinessProfileRepository { pool, clock }
    }

    /// The stored profile, if one was ever saved.
    pub async fn find(&self) -> DbResult<Option<BusinessProfile>> {
        let profile = sqlx::query_as::<_, BusinessProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM business_profile ORDER BY created_at ASC LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// The stored profile, creating the default one on first use.
    pub async fn get_or_create(&self) -> DbResult<BusinessProfile> {
        if let Some(profile) = self.find().await? {
            return Ok(profile);
        }

        info!("No business profile yet, creating default");
        self.insert(&BusinessProfileInput::default()).await
    }

    /// Saves the profile, updating the existing row or creating the first one.
    pub async fn upsert(&self, input: &BusinessProfileInput) -> DbResult<BusinessProfile> {
        validate_business_profile(input)?;

        let Some(existing) = self.find().await? else {
            return self.insert(input).await;
        };

        sqlx::query(
            r#"
            UPDATE business_profile SET
                company_name = ?2,
                address = ?3,
                phone = ?4,
                email = ?5,
                website = ?6,
                logo_url = ?7,
                bank_name = ?8,
                bank_branch = ?9,
                bank_account_no = ?10,
                bank_account_name = ?11,
                usd_rate = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(&existing.id)
        .bind(input.company_name.trim())
        .bind(clean_optional(&input.address))
        .bind(clean_optional(&input.phone))
        .bind(clean_optional(&input.email))
        .bind(clean_optional(&input.website))
        .bind(clean_optional(&input.logo_url))
        .bind(clean_optional(&input.bank_name))
        .bind(clean_optional(&input.bank_branch))
        .bind(clean_optional(&input.bank_account_no))
        .bind(clean_optional(&input.bank_account_name))
        .bind(input.usd_rate)
        .bind(self.clock.now())
        .execute(&self.pool)
        .await?;

        info!(id = %existing.id, "Business profile updated");

        self.find()
            .await?
            .ok_or_else(|| DbError::not_found("BusinessProfile", &existing.id))
    }

    async fn insert(&self, input: &BusinessProfileInput) -> DbResult<BusinessProfile> {
        let id = new_id();

        sqlx::query(
            r#"
            INSERT INTO business_profile (
                id, company_name, address, phone, email, website, logo_url,
                bank_name, bank_branch, bank_account_no, bank_account_name,
                usd_rate, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
            "#,
        )
        .bind(&id)
        .bind(input.company_name.trim())
        .bind(clean_optional(&input.address))
        .bind(clean_optional(&input.phone))
        .bind(clean_optional(&input.email))
        .bind(clean_optional(&input.website))
        .bind(clean_optional(&input.logo_url))
        .bind(clean_optional(&input.bank_name))
        .bind(clean_optional(&input.bank_branch))
        .bind(clean_optional(&input.bank_account_no))
        .bind(clean_optional(&input.bank_account_name))
        .bind(input.usd_rate)
        .bind(self.clock.now())
        .execute(&self.pool)
        .await?;

        info!(id = %id, "Business profile created");

        self.find()
            .await?
            .ok_or_else(|| DbError::not_found("BusinessProfile", &id))
    }
}
