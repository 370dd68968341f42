//! HTTP error type.
//!
//! Action failures map onto status codes here; responses that relate to an
//! external run carry the platform run id so the caller can correlate the
//! failure with platform-side diagnostics.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::domains::scrapers::actions::ActionError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthorized,

    #[error("admin access required")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    /// An external run ended badly or never finished.
    #[error("{message}")]
    RunFailed {
        message: String,
        run_id: Option<String>,
    },

    #[error("internal error")]
    Internal(anyhow::Error),
}

impl From<ActionError> for ApiError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::Invalid(message) => ApiError::BadRequest(message),
            ActionError::NotFound(what) => ApiError::NotFound(what),
            ActionError::Run(failure) => ApiError::RunFailed {
                run_id: failure.run_id().map(str::to_string),
                message: failure.to_string(),
            },
            ActionError::Other(source) => ApiError::Internal(source),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RunFailed { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let ApiError::Internal(cause) = &self {
            tracing::error!(error = ?cause, "Request failed");
        }

        let run_id = match &self {
            ApiError::RunFailed { run_id, .. } => run_id.clone(),
            _ => None,
        };

        let body = json!({
            "error": {
                "message": self.to_string(),
                "run_id": run_id,
            }
        });

        (status, Json(body)).into_response()
    }
}
