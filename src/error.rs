use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::policy::DenyReason;
use crate::repository::RepoError;
use crate::validate::FieldError;

/// ApiError
///
/// The typed error taxonomy of the core. The service always returns one of
/// these to its caller; only this module's `IntoResponse` impl translates them
/// into wire status codes and bodies, keeping HTTP concerns out of the service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Policy or field-level denial. The reason code is logged, never rendered.
    #[error("unauthorized ({0:?})")]
    Unauthorized(DenyReason),

    /// One or more record invariants violated; carries the aggregated list.
    #[error("validation failed ({} field errors)", .0.len())]
    ValidationFailed(Vec<FieldError>),

    #[error("user not found")]
    NotFound,

    /// Duplicate email detected at persist time.
    #[error("conflict: email already in use")]
    Conflict,

    /// Malformed or incomplete request body.
    #[error("request body could not be decoded: {0}")]
    DecodeFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::DuplicateEmail(_) => ApiError::Conflict,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Unauthorized(reason) => {
                // The reason code stays in the logs: rendering it would let a
                // caller enumerate valid ids and role assignments.
                tracing::debug!(?reason, "request denied");
                (
                    StatusCode::UNAUTHORIZED,
                    json!({ "error": "unauthorized" }),
                )
            }
            ApiError::ValidationFailed(fields) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "validation_failed", "fields": fields }),
            ),
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": "not_found" })),
            ApiError::Conflict => (StatusCode::CONFLICT, json!({ "error": "conflict" })),
            ApiError::DecodeFailed(detail) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "decode_failed", "detail": detail }),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
