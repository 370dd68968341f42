//! Email verification and email-finding endpoints.

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::common::{CollectionId, CompanyId, LeadId};
use crate::domains::auth::AuthUser;
use crate::domains::scrapers::actions;

use super::{ApiError, AppState};

/// Bulk-verify the email addresses of a collection's leads.
pub async fn verify_collection(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<actions::VerificationReport>, ApiError> {
    let report =
        actions::verify_collection_emails(&state.deps, auth.user_id, CollectionId::from_uuid(id))
            .await?;
    Ok(Json(report))
}

/// Bulk-verify the email addresses of a company's leads.
pub async fn verify_company(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<actions::VerificationReport>, ApiError> {
    let report =
        actions::verify_company_emails(&state.deps, auth.user_id, CompanyId::from_uuid(id))
            .await?;
    Ok(Json(report))
}

/// Find an email address for a lead.
pub async fn find_email(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<actions::FindEmailReport>, ApiError> {
    let report =
        actions::find_lead_email(&state.deps, auth.user_id, LeadId::from_uuid(id)).await?;
    Ok(Json(report))
}
