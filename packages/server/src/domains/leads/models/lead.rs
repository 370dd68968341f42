//! Lead model - a single prospect inside a collection.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{CollectionId, CompanyId, LeadId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lead {
    pub id: LeadId,
    pub user_id: UserId,
    pub collection_id: CollectionId,
    pub company_id: Option<CompanyId>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    /// Last verification verdict for `email` (`ok`, `invalid`, `risky`,
    /// `unknown`); null when the address was never verified.
    pub email_status: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    /// URL the lead was scraped from, when known.
    pub source_url: Option<String>,
    pub enriched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a scraped lead.
#[derive(Debug, Clone, Default)]
pub struct NewLead {
    pub company_id: Option<CompanyId>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub source_url: Option<String>,
}

/// Fields an enrichment run may fill in. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct LeadEnrichment {
    pub name: Option<String>,
    pub title: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
}

impl Lead {
    /// Insert a scraped lead into a collection
    pub async fn create(
        user_id: UserId,
        collection_id: CollectionId,
        new: &NewLead,
        pool: &PgPool,
    ) -> Result<Self> {
        let lead = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO leads (user_id, collection_id, company_id, name, title, email, website, phone, source_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(collection_id)
        .bind(new.company_id)
        .bind(&new.name)
        .bind(&new.title)
        .bind(&new.email)
        .bind(&new.website)
        .bind(&new.phone)
        .bind(&new.source_url)
        .fetch_one(pool)
        .await?;
        Ok(lead)
    }

    /// Find a lead owned by the given user
    pub async fn find_by_id_for_user(
        id: LeadId,
        user_id: UserId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let lead = sqlx::query_as::<_, Self>("SELECT * FROM leads WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        Ok(lead)
    }

    /// All leads in a collection
    pub async fn find_by_collection(
        collection_id: CollectionId,
        user_id: UserId,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let leads = sqlx::query_as::<_, Self>(
            "SELECT * FROM leads WHERE collection_id = $1 AND user_id = $2 ORDER BY created_at ASC",
        )
        .bind(collection_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(leads)
    }

    /// All leads attached to a company
    pub async fn find_by_company(
        company_id: CompanyId,
        user_id: UserId,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let leads = sqlx::query_as::<_, Self>(
            "SELECT * FROM leads WHERE company_id = $1 AND user_id = $2 ORDER BY created_at ASC",
        )
        .bind(company_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(leads)
    }

    /// Leads in a collection that have an email address to verify
    pub async fn find_verifiable_by_collection(
        collection_id: CollectionId,
        user_id: UserId,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let leads = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM leads
            WHERE collection_id = $1 AND user_id = $2 AND email IS NOT NULL
            ORDER BY created_at ASC
            "#,
        )
        .bind(collection_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(leads)
    }

    /// Leads at a company that have an email address to verify
    pub async fn find_verifiable_by_company(
        company_id: CompanyId,
        user_id: UserId,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let leads = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM leads
            WHERE company_id = $1 AND user_id = $2 AND email IS NOT NULL
            ORDER BY created_at ASC
            "#,
        )
        .bind(company_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(leads)
    }

    /// Whether the collection already holds a lead with this email address
    pub async fn email_exists_in_collection(
        collection_id: CollectionId,
        email: &str,
        pool: &PgPool,
    ) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM leads WHERE collection_id = $1 AND email = $2)",
        )
        .bind(collection_id)
        .bind(email)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Record a verification verdict on every lead of this user holding the
    /// given address. Returns the number of rows updated.
    pub async fn update_status_for_email(
        user_id: UserId,
        email: &str,
        status: &str,
        pool: &PgPool,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE leads SET email_status = $3 WHERE user_id = $1 AND email = $2",
        )
        .bind(user_id)
        .bind(email)
        .bind(status)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Attach a discovered email address (and its verdict) to a lead
    pub async fn set_email(
        id: LeadId,
        email: &str,
        status: Option<&str>,
        pool: &PgPool,
    ) -> Result<Self> {
        let lead = sqlx::query_as::<_, Self>(
            "UPDATE leads SET email = $2, email_status = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(email)
        .bind(status)
        .fetch_one(pool)
        .await?;
        Ok(lead)
    }

    /// Merge enrichment output into a lead, keeping existing values where
    /// the run produced nothing
    pub async fn apply_enrichment(
        id: LeadId,
        enrichment: &LeadEnrichment,
        pool: &PgPool,
    ) -> Result<Self> {
        let lead = sqlx::query_as::<_, Self>(
            r#"
            UPDATE leads
            SET name = COALESCE($2, name),
                title = COALESCE($3, title),
                website = COALESCE($4, website),
                phone = COALESCE($5, phone),
                enriched_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&enrichment.name)
        .bind(&enrichment.title)
        .bind(&enrichment.website)
        .bind(&enrichment.phone)
        .fetch_one(pool)
        .await?;
        Ok(lead)
    }
}
