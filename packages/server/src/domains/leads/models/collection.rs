//! Collection model - a user-owned folder of leads.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{CollectionId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Collection {
    pub id: CollectionId,
    pub user_id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Collection {
    /// Create a new collection
    pub async fn create(user_id: UserId, name: &str, pool: &PgPool) -> Result<Self> {
        let collection = sqlx::query_as::<_, Self>(
            "INSERT INTO collections (user_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(pool)
        .await?;
        Ok(collection)
    }

    /// Find a collection owned by the given user
    pub async fn find_by_id_for_user(
        id: CollectionId,
        user_id: UserId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let collection = sqlx::query_as::<_, Self>(
            "SELECT * FROM collections WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(collection)
    }

    /// List the user's collections, newest first
    pub async fn find_for_user(user_id: UserId, pool: &PgPool) -> Result<Vec<Self>> {
        let collections = sqlx::query_as::<_, Self>(
            "SELECT * FROM collections WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(collections)
    }
}
