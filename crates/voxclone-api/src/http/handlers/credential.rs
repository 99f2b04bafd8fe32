//! Credential endpoint handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use voxclone_types::credential::{CredentialRecord, UserId};
use voxclone_types::error::CredentialError;

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// Request body for linking credentials. No Debug: it holds the key.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest {
    pub api_key: String,
    #[serde(default)]
    pub web_token: Option<String>,
}

fn self_link(user: &UserId) -> String {
    format!("/api/v1/users/{user}/credentials")
}

/// PUT /api/v1/users/{user_id}/credentials - Store or replace credentials.
pub async fn link_credentials(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<LinkRequest>,
) -> Result<Json<ApiResponse<Option<CredentialRecord>>>, AppError> {
    let timer = RequestTimer::start();
    let user = UserId::parse(&user_id)?;

    state
        .clone_service
        .link(&user, &body.api_key, body.web_token.as_deref())
        .await?;
    let record = state.clone_service.status(&user).await?;

    Ok(Json(timer.respond(record).with_link("self", self_link(&user))))
}

/// GET /api/v1/users/{user_id}/credentials - Credential metadata.
pub async fn get_credentials(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<CredentialRecord>>, AppError> {
    let timer = RequestTimer::start();
    let user = UserId::parse(&user_id)?;

    let record = state
        .clone_service
        .status(&user)
        .await?
        .ok_or(CredentialError::NotLinked)?;

    Ok(Json(
        timer
            .respond(record)
            .with_link("self", self_link(&user))
            .with_link("clone", format!("/api/v1/users/{user}/clone")),
    ))
}

/// DELETE /api/v1/users/{user_id}/credentials - Forget credentials.
pub async fn unlink_credentials(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let user = UserId::parse(&user_id)?;
    state.clone_service.unlink(&user).await?;
    Ok(StatusCode::NO_CONTENT)
}
