//! Axum extractor for the authenticated caller.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::common::UserId;
use crate::domains::users::models::User;
use crate::http::{ApiError, AppState};

/// The authenticated caller, extracted from the `Authorization: Bearer`
/// header. Handlers take this as an argument; an invalid or missing token
/// short-circuits into a 401 before the handler body runs.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl AuthUser {
    /// Require the caller to be an admin.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let claims = state
            .deps
            .jwt_service
            .verify_token(token)
            .map_err(|_| ApiError::Unauthorized)?;

        // The database is authoritative for admin status; a token can go
        // stale between issuance and use.
        let user = User::find_by_id(claims.user_id(), &state.deps.db_pool)
            .await
            .map_err(ApiError::Internal)?
            .ok_or(ApiError::Unauthorized)?;

        Ok(AuthUser {
            user_id: user.id,
            is_admin: user.is_admin,
        })
    }
}
