//! HTTP surface: axum router and request handlers.
//!
//! Handlers are thin: extract the caller, parse ids, invoke one action,
//! serialize the report. All interesting behavior lives in the domains.

pub mod admin;
pub mod companies;
pub mod error;
pub mod runs;
pub mod scraping;
pub mod verification;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;

pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// Build the application router.
pub fn router(deps: Arc<ServerDeps>) -> Router {
    let state = AppState { deps };

    Router::new()
        .route("/health", get(health))
        .route("/api/runs", get(runs::list_runs))
        .route("/api/collections/:id/scrape", post(scraping::scrape_collection))
        .route("/api/collections/:id/enrich", post(scraping::enrich_collection))
        .route(
            "/api/collections/:id/verify-emails",
            post(verification::verify_collection),
        )
        .route("/api/leads/:id/enrich", post(scraping::enrich_lead))
        .route("/api/leads/:id/find-email", post(verification::find_email))
        .route("/api/companies/:id/enrich", post(scraping::enrich_company))
        .route("/api/companies/:id/reviews/sync", post(companies::sync_reviews))
        .route(
            "/api/companies/:id/verify-emails",
            post(verification::verify_company),
        )
        .route("/api/companies/:id/seo-ranking", post(companies::seo_ranking))
        .route("/api/admin/runs/backfill", post(admin::backfill))
        .route("/api/admin/runs/reset-imported", post(admin::reset_imported))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
