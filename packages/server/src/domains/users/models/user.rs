//! User model - tenant owners. Account creation and login live with the
//! identity provider; this table anchors ownership foreign keys.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::UserId;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub async fn create(email: &str, is_admin: bool, pool: &PgPool) -> Result<Self> {
        let user = sqlx::query_as::<_, Self>(
            "INSERT INTO users (email, is_admin) VALUES ($1, $2) RETURNING *",
        )
        .bind(email)
        .bind(is_admin)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(id: UserId, pool: &PgPool) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }
}
