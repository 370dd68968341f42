//! Ledger read endpoints.

use axum::extract::State;
use axum::Json;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domains::auth::AuthUser;
use crate::domains::scrapers::models::ScraperRun;

use super::{ApiError, AppState};

const RUN_LIST_LIMIT: i64 = 100;

#[derive(Debug, Serialize)]
pub struct RunListResponse {
    pub runs: Vec<ScraperRun>,
    /// Sum of recorded costs across the user's whole ledger.
    pub total_cost_usd: Option<Decimal>,
}

/// The caller's most recent ledger rows plus their total recorded spend.
pub async fn list_runs(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<RunListResponse>, ApiError> {
    let pool = &state.deps.db_pool;
    let runs = ScraperRun::find_recent_for_user(auth.user_id, RUN_LIST_LIMIT, pool).await?;
    let total_cost_usd = ScraperRun::total_cost_for_user(auth.user_id, pool).await?;

    Ok(Json(RunListResponse {
        runs,
        total_cost_usd,
    }))
}
