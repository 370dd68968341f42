//! ScraperRun model - the per-run cost/usage ledger.
//!
//! One immutable row per external run, keyed by the platform-issued run id.
//! The unique constraint on `run_id` is the only cross-run invariant: a live
//! recorder and a later backfill may both try to insert the same run, and
//! whichever loses the race sees an ignored conflict, not an error.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use typed_builder::TypedBuilder;

use crate::common::{CollectionId, CompanyId, LeadId, ScraperId, ScraperRunId, UserId};
use crate::kernel::RunLedger;

/// Why a run happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "run_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RunSource {
    Scraping,
    EnrichCollection,
    EnrichLead,
    EnrichCompany,
    EnrichEmailsCollection,
    EnrichEmailsCompany,
    FindEmail,
    Trustpilot,
    SeoLocalRanking,
    /// Row created by the backfill reconciler rather than a live flow.
    Import,
}

impl RunSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunSource::Scraping => "scraping",
            RunSource::EnrichCollection => "enrich_collection",
            RunSource::EnrichLead => "enrich_lead",
            RunSource::EnrichCompany => "enrich_company",
            RunSource::EnrichEmailsCollection => "enrich_emails_collection",
            RunSource::EnrichEmailsCompany => "enrich_emails_company",
            RunSource::FindEmail => "find_email",
            RunSource::Trustpilot => "trustpilot",
            RunSource::SeoLocalRanking => "seo_local_ranking",
            RunSource::Import => "import",
        }
    }

    pub fn is_import(&self) -> bool {
        matches!(self, RunSource::Import)
    }
}

impl std::fmt::Display for RunSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ledger row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScraperRun {
    pub id: ScraperRunId,
    /// Platform-issued run identifier; unique across the ledger.
    pub run_id: String,
    /// Which configured scraper produced the run; null when the origin could
    /// not be resolved during backfill.
    pub scraper_id: Option<ScraperId>,
    pub user_id: UserId,
    pub source: RunSource,
    pub collection_id: Option<CollectionId>,
    pub lead_id: Option<LeadId>,
    pub company_id: Option<CompanyId>,
    pub cost_usd: Option<Decimal>,
    /// Raw per-component usage breakdown from the platform.
    pub usage_details: Option<serde_json::Value>,
    pub item_count: i32,
    /// Platform run status at record time.
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a ledger row.
#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct NewScraperRun {
    #[builder(setter(into))]
    pub run_id: String,
    #[builder(default)]
    pub scraper_id: Option<ScraperId>,
    pub user_id: UserId,
    pub source: RunSource,
    #[builder(default)]
    pub collection_id: Option<CollectionId>,
    #[builder(default)]
    pub lead_id: Option<LeadId>,
    #[builder(default)]
    pub company_id: Option<CompanyId>,
    #[builder(default)]
    pub cost_usd: Option<Decimal>,
    #[builder(default)]
    pub usage_details: Option<serde_json::Value>,
    #[builder(default)]
    pub item_count: i32,
    #[builder(setter(into))]
    pub status: String,
    #[builder(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[builder(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl ScraperRun {
    /// Insert a ledger row, ignoring a duplicate `run_id`.
    /// Returns false when the run was already recorded.
    pub async fn insert_ignore(new: &NewScraperRun, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO scraper_runs
                (run_id, scraper_id, user_id, source, collection_id, lead_id, company_id,
                 cost_usd, usage_details, item_count, status, started_at, finished_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (run_id) DO NOTHING
            "#,
        )
        .bind(&new.run_id)
        .bind(new.scraper_id)
        .bind(new.user_id)
        .bind(new.source)
        .bind(new.collection_id)
        .bind(new.lead_id)
        .bind(new.company_id)
        .bind(new.cost_usd)
        .bind(&new.usage_details)
        .bind(new.item_count)
        .bind(&new.status)
        .bind(new.started_at)
        .bind(new.finished_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Delete all imported rows for a user, returning the count removed.
    /// Used by the backfill reconciler so a re-import starts clean.
    pub async fn delete_imported_for_user(user_id: UserId, pool: &PgPool) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM scraper_runs WHERE user_id = $1 AND source = 'import'")
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// The user's most recent ledger rows
    pub async fn find_recent_for_user(
        user_id: UserId,
        limit: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let runs = sqlx::query_as::<_, Self>(
            "SELECT * FROM scraper_runs WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(runs)
    }

    /// Total recorded spend for a user; null when no row carries a cost.
    pub async fn total_cost_for_user(user_id: UserId, pool: &PgPool) -> Result<Option<Decimal>> {
        let total = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT SUM(cost_usd) FROM scraper_runs WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(total)
    }
}

#[async_trait]
impl RunLedger for PgPool {
    async fn insert_run(&self, row: &NewScraperRun) -> Result<bool> {
        ScraperRun::insert_ignore(row, self).await
    }

    async fn delete_imported(&self, user_id: UserId) -> Result<u64> {
        ScraperRun::delete_imported_for_user(user_id, self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_serializes_snake_case() {
        let json = serde_json::to_string(&RunSource::EnrichEmailsCompany).unwrap();
        assert_eq!(json, "\"enrich_emails_company\"");
        assert_eq!(RunSource::SeoLocalRanking.as_str(), "seo_local_ranking");
    }

    #[test]
    fn only_import_is_import() {
        assert!(RunSource::Import.is_import());
        assert!(!RunSource::Scraping.is_import());
        assert!(!RunSource::Trustpilot.is_import());
    }
}
