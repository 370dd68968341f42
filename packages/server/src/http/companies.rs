//! Company review and SEO endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::common::CompanyId;
use crate::domains::auth::AuthUser;
use crate::domains::scrapers::actions;

use super::{ApiError, AppState};

/// Pull a company's Trustpilot reviews into the database.
pub async fn sync_reviews(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<actions::ReviewSyncReport>, ApiError> {
    let report =
        actions::sync_company_reviews(&state.deps, auth.user_id, CompanyId::from_uuid(id)).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct SeoRankingRequest {
    pub keyword: String,
}

/// Snapshot a company's local search ranking for a keyword.
pub async fn seo_ranking(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SeoRankingRequest>,
) -> Result<Json<actions::SeoReport>, ApiError> {
    let report = actions::seo_local_ranking(
        &state.deps,
        auth.user_id,
        CompanyId::from_uuid(id),
        &req.keyword,
    )
    .await?;
    Ok(Json(report))
}
