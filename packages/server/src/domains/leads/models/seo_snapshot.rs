//! SeoSnapshot model - local-ranking results for a company and keyword.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::CompanyId;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SeoSnapshot {
    pub id: Uuid,
    pub company_id: CompanyId,
    pub keyword: String,
    /// Position in the local results, when the company was found at all.
    pub position: Option<i32>,
    /// Raw ranking payload from the platform run.
    pub payload: serde_json::Value,
    /// External run that produced this snapshot.
    pub run_id: String,
    pub created_at: DateTime<Utc>,
}

impl SeoSnapshot {
    pub async fn create(
        company_id: CompanyId,
        keyword: &str,
        position: Option<i32>,
        payload: &serde_json::Value,
        run_id: &str,
        pool: &PgPool,
    ) -> Result<Self> {
        let snapshot = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO seo_snapshots (company_id, keyword, position, payload, run_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(company_id)
        .bind(keyword)
        .bind(position)
        .bind(payload)
        .bind(run_id)
        .fetch_one(pool)
        .await?;
        Ok(snapshot)
    }

    /// Latest snapshot for a company and keyword
    pub async fn find_latest(
        company_id: CompanyId,
        keyword: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let snapshot = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM seo_snapshots
            WHERE company_id = $1 AND keyword = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(company_id)
        .bind(keyword)
        .fetch_optional(pool)
        .await?;
        Ok(snapshot)
    }
}
