//! Clone endpoint handler.

use axum::Json;
use axum::extract::{Path, State};

use voxclone_types::clone::CloneOutcome;

use crate::http::error::AppError;
use crate::state::AppState;

/// POST /api/v1/users/{user_id}/clone - Clone or upgrade the templates.
///
/// Success: `200 { assistantId, toolId, actions }`.
/// Failure: `{ code, message, actions }` with a status derived from `code`.
pub async fn clone_templates(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<CloneOutcome>, AppError> {
    let outcome = state.clone_for(&user_id).await?;
    Ok(Json(outcome))
}
