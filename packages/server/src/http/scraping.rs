//! Scrape and enrichment endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::common::{CollectionId, CompanyId, LeadId, ScraperId};
use crate::domains::auth::AuthUser;
use crate::domains::scrapers::actions;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub scraper_id: Uuid,
    /// Actor input overrides, merged over the scraper's default input.
    #[serde(default)]
    pub input: serde_json::Value,
}

/// Run a configured scraper into a collection.
pub async fn scrape_collection(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ScrapeRequest>,
) -> Result<Json<actions::ScrapeReport>, ApiError> {
    let report = actions::scrape_collection(
        &state.deps,
        auth.user_id,
        CollectionId::from_uuid(id),
        ScraperId::from_uuid(req.scraper_id),
        &req.input,
    )
    .await?;
    Ok(Json(report))
}

/// Enrich every lead in a collection.
pub async fn enrich_collection(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<actions::EnrichReport>, ApiError> {
    let report =
        actions::enrich_collection(&state.deps, auth.user_id, CollectionId::from_uuid(id)).await?;
    Ok(Json(report))
}

/// Enrich a single lead.
pub async fn enrich_lead(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<actions::EnrichReport>, ApiError> {
    let report = actions::enrich_lead(&state.deps, auth.user_id, LeadId::from_uuid(id)).await?;
    Ok(Json(report))
}

/// Enrich the leads attached to a company.
pub async fn enrich_company(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<actions::EnrichReport>, ApiError> {
    let report =
        actions::enrich_company(&state.deps, auth.user_id, CompanyId::from_uuid(id)).await?;
    Ok(Json(report))
}
