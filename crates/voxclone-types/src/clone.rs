//! Request/response contract of a clone-and-reconcile run.

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::action::ActionRecord;

/// Successful reconciliation result: the ids now current in the user's
/// account plus everything that was done to get there.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneOutcome {
    pub assistant_id: String,
    pub tool_id: String,
    /// Tool actions first, then assistant actions.
    pub actions: Vec<ActionRecord>,
}

/// Machine-readable failure codes returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidUserId,
    ApiKeyNotFound,
    InvalidTemplate,
    InsufficientPermissions,
    VapiBadRequest,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidUserId => "INVALID_USER_ID",
            ErrorCode::ApiKeyNotFound => "API_KEY_NOT_FOUND",
            ErrorCode::InvalidTemplate => "INVALID_TEMPLATE",
            ErrorCode::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            ErrorCode::VapiBadRequest => "VAPI_BAD_REQUEST",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure returned to the caller, with any partial progress.
#[derive(Debug, Clone, Serialize)]
pub struct CloneFailure {
    pub code: ErrorCode,
    pub message: String,
    pub actions: Vec<ActionRecord>,
}
