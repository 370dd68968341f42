//! Company model - an organization leads belong to.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{CompanyId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    pub id: CompanyId,
    pub user_id: UserId,
    pub name: String,
    /// Bare website domain, e.g. `acme.com`. Used as the Trustpilot lookup key.
    pub domain: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Company {
    /// Create a new company
    pub async fn create(
        user_id: UserId,
        name: &str,
        domain: Option<&str>,
        pool: &PgPool,
    ) -> Result<Self> {
        let company = sqlx::query_as::<_, Self>(
            "INSERT INTO companies (user_id, name, domain) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(user_id)
        .bind(name)
        .bind(domain)
        .fetch_one(pool)
        .await?;
        Ok(company)
    }

    /// Find a company owned by the given user
    pub async fn find_by_id_for_user(
        id: CompanyId,
        user_id: UserId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let company =
            sqlx::query_as::<_, Self>("SELECT * FROM companies WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(pool)
                .await?;
        Ok(company)
    }
}
