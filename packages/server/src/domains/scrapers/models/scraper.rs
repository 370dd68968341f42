//! Scraper model - a configured platform integration.
//!
//! Each row names an actor on the scraping platform plus the default input
//! template the actions merge request parameters into. The seed migration
//! installs the built-in integrations (google-maps, trustpilot, ...).

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::ScraperId;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Scraper {
    pub id: ScraperId,
    /// Stable name used by actions to locate an integration.
    pub slug: String,
    pub name: String,
    /// Platform actor identifier, e.g. `compass~crawler-google-places`.
    pub actor_id: String,
    /// Default actor input; request parameters are merged over it.
    pub default_input: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Scraper {
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let scrapers = sqlx::query_as::<_, Self>("SELECT * FROM scrapers ORDER BY slug ASC")
            .fetch_all(pool)
            .await?;
        Ok(scrapers)
    }

    pub async fn find_by_id(id: ScraperId, pool: &PgPool) -> Result<Option<Self>> {
        let scraper = sqlx::query_as::<_, Self>("SELECT * FROM scrapers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(scraper)
    }

    pub async fn find_by_slug(slug: &str, pool: &PgPool) -> Result<Option<Self>> {
        let scraper = sqlx::query_as::<_, Self>("SELECT * FROM scrapers WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await?;
        Ok(scraper)
    }
}
