//! Admin endpoints for ledger reconciliation.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domains::auth::AuthUser;
use crate::domains::scrapers::models::Scraper;
use crate::domains::scrapers::{backfill_runs, reset_imported_runs, BackfillSummary};

use super::{ApiError, AppState};

const DEFAULT_DAYS_BACK: i64 = 90;

#[derive(Debug, Deserialize, Default)]
pub struct BackfillRequest {
    /// How far back to walk the platform's run history. Defaults to 90 days.
    pub days_back: Option<i64>,
}

/// Import the caller's historical platform runs into the ledger.
pub async fn backfill(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BackfillRequest>,
) -> Result<Json<BackfillSummary>, ApiError> {
    auth.require_admin()?;

    let days_back = req.days_back.unwrap_or(DEFAULT_DAYS_BACK);
    if days_back <= 0 {
        return Err(ApiError::BadRequest(
            "days_back must be positive".to_string(),
        ));
    }

    let scrapers = Scraper::find_all(&state.deps.db_pool).await?;
    let summary = backfill_runs(
        state.deps.platform.as_ref(),
        state.deps.ledger.as_ref(),
        &scrapers,
        auth.user_id,
        days_back,
    )
    .await?;

    Ok(Json(summary))
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub removed: u64,
}

/// Delete the caller's previously imported ledger rows so a backfill can
/// start clean.
pub async fn reset_imported(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ResetResponse>, ApiError> {
    auth.require_admin()?;

    let removed = reset_imported_runs(state.deps.ledger.as_ref(), auth.user_id).await?;
    Ok(Json(ResetResponse { removed }))
}
