//! CompanyReview model - reviews pulled from the review platform.
//!
//! Reviews are keyed by `(company_id, review_id)` where `review_id` is the
//! provider-assigned identifier, so re-syncing the same company is
//! idempotent: existing reviews are skipped, not duplicated.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::CompanyId;
use crate::kernel::ReviewStore;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CompanyReview {
    pub id: Uuid,
    pub company_id: CompanyId,
    /// Provider-assigned review identifier.
    pub review_id: String,
    pub rating: i32,
    pub title: Option<String>,
    pub body: Option<String>,
    pub reviewer: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a review.
#[derive(Debug, Clone)]
pub struct NewCompanyReview {
    pub company_id: CompanyId,
    pub review_id: String,
    pub rating: i32,
    pub title: Option<String>,
    pub body: Option<String>,
    pub reviewer: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl CompanyReview {
    /// Insert a review, ignoring duplicates of the natural key.
    /// Returns false when the review already existed.
    pub async fn insert_ignore(new: &NewCompanyReview, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO company_reviews (company_id, review_id, rating, title, body, reviewer, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (company_id, review_id) DO NOTHING
            "#,
        )
        .bind(new.company_id)
        .bind(&new.review_id)
        .bind(new.rating)
        .bind(&new.title)
        .bind(&new.body)
        .bind(&new.reviewer)
        .bind(new.published_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// All reviews for a company, newest first
    pub async fn find_by_company(company_id: CompanyId, pool: &PgPool) -> Result<Vec<Self>> {
        let reviews = sqlx::query_as::<_, Self>(
            "SELECT * FROM company_reviews WHERE company_id = $1 ORDER BY published_at DESC NULLS LAST",
        )
        .bind(company_id)
        .fetch_all(pool)
        .await?;
        Ok(reviews)
    }

    /// Number of stored reviews for a company
    pub async fn count_for_company(company_id: CompanyId, pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM company_reviews WHERE company_id = $1",
        )
        .bind(company_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}

#[async_trait]
impl ReviewStore for PgPool {
    async fn insert_review(&self, review: &NewCompanyReview) -> Result<bool> {
        CompanyReview::insert_ignore(review, self).await
    }
}
