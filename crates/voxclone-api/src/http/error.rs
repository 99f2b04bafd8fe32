//! Application error type mapping to HTTP status codes.
//!
//! Clone failures keep their contract shape (`{ code, message, actions }`);
//! everything else uses the envelope's `errors` list.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use voxclone_types::clone::ErrorCode;
use voxclone_types::error::{CloneError, CredentialError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// A clone run failed; carries the partial action log.
    Clone(CloneError),
    /// Credential storage failures.
    Credential(CredentialError),
}

impl From<CloneError> for AppError {
    fn from(e: CloneError) -> Self {
        AppError::Clone(e)
    }
}

impl From<CredentialError> for AppError {
    fn from(e: CredentialError) -> Self {
        AppError::Credential(e)
    }
}

/// HTTP status for a clone failure code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidUserId | ErrorCode::VapiBadRequest | ErrorCode::InvalidTemplate => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::ApiKeyNotFound => StatusCode::NOT_FOUND,
        ErrorCode::InsufficientPermissions => StatusCode::FORBIDDEN,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Clone(err) => {
                let failure = err.into_failure();
                return (status_for(failure.code), Json(failure)).into_response();
            }
            AppError::Credential(CredentialError::NotLinked) => (
                StatusCode::NOT_FOUND,
                ErrorCode::ApiKeyNotFound.as_str(),
                "No credentials are linked for this user".to_string(),
            ),
            AppError::Credential(CredentialError::EmptyApiKey) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                CredentialError::EmptyApiKey.to_string(),
            ),
            AppError::Credential(e) => {
                tracing::error!(error = %e, "Credential store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError.as_str(),
                    e.to_string(),
                )
            }
        };

        let body = json!({
            "data": null,
            "meta": {
                "request_id": "",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (status, Json(body)).into_response()
    }
}
