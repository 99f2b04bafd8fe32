use serde_json::Value;
use thiserror::Error;

use crate::action::ActionRecord;
use crate::clone::{CloneFailure, ErrorCode};

/// Errors returned by the voice platform client.
///
/// The client never swallows a failure: every non-2xx response that is not
/// retried (or that exhausts its retries) surfaces as `Status`.
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// Non-2xx response. `body` is the parsed JSON body, or the raw text as a
    /// JSON string when the body is not JSON.
    #[error("platform returned HTTP {status}: {body}")]
    Status { status: u16, body: Value },

    /// No response was received (connect failure, timeout, reset).
    #[error("network error: {0}")]
    Network(String),

    /// A 2xx response whose body could not be decoded.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl PlatformError {
    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            PlatformError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 5xx, 429 and transport failures are transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            PlatformError::Status { status, .. } => *status == 429 || *status >= 500,
            PlatformError::Network(_) => true,
            PlatformError::Decode(_) => false,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    pub fn is_bad_request(&self) -> bool {
        self.status() == Some(400)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Errors from the encrypted credential store.
///
/// IMPORTANT: no variant carries plaintext, ciphertext or key material.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credentials not linked")]
    NotLinked,

    #[error("api key is empty")]
    EmptyApiKey,

    #[error("credential encryption error")]
    Crypto,

    #[error("storage error: {0}")]
    Storage(String),
}

/// Failure of a clone-and-reconcile run.
///
/// Variants raised after the first platform call carry the actions that had
/// already been performed, so partial progress is never lost.
#[derive(Debug, Error)]
pub enum CloneError {
    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    #[error("no platform API key is linked for this user")]
    ApiKeyNotFound,

    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    #[error("platform rejected the API key: {message}")]
    InsufficientPermissions {
        message: String,
        actions: Vec<ActionRecord>,
    },

    #[error("platform rejected the request body: {message}")]
    PlatformBadRequest {
        message: String,
        actions: Vec<ActionRecord>,
    },

    #[error("internal error: {message}")]
    Internal {
        message: String,
        actions: Vec<ActionRecord>,
    },
}

impl CloneError {
    /// Classify a platform failure raised mid-run.
    pub fn from_platform(err: &PlatformError, actions: Vec<ActionRecord>) -> Self {
        let message = err.to_string();
        if err.is_permission_denied() {
            CloneError::InsufficientPermissions { message, actions }
        } else if err.is_bad_request() {
            CloneError::PlatformBadRequest { message, actions }
        } else {
            CloneError::Internal { message, actions }
        }
    }

    pub fn internal(message: impl Into<String>, actions: Vec<ActionRecord>) -> Self {
        CloneError::Internal {
            message: message.into(),
            actions,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CloneError::InvalidUserId(_) => ErrorCode::InvalidUserId,
            CloneError::ApiKeyNotFound => ErrorCode::ApiKeyNotFound,
            CloneError::InvalidTemplate(_) => ErrorCode::InvalidTemplate,
            CloneError::InsufficientPermissions { .. } => ErrorCode::InsufficientPermissions,
            CloneError::PlatformBadRequest { .. } => ErrorCode::VapiBadRequest,
            CloneError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Actions performed before the failure (empty for configuration errors).
    pub fn actions(&self) -> &[ActionRecord] {
        match self {
            CloneError::InsufficientPermissions { actions, .. }
            | CloneError::PlatformBadRequest { actions, .. }
            | CloneError::Internal { actions, .. } => actions,
            _ => &[],
        }
    }

    /// Convert into the serializable failure envelope.
    pub fn into_failure(self) -> CloneFailure {
        let code = self.code();
        let message = self.to_string();
        let actions = match self {
            CloneError::InsufficientPermissions { actions, .. }
            | CloneError::PlatformBadRequest { actions, .. }
            | CloneError::Internal { actions, .. } => actions,
            _ => Vec::new(),
        };
        CloneFailure {
            code,
            message,
            actions,
        }
    }
}

impl From<CredentialError> for CloneError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::NotLinked => CloneError::ApiKeyNotFound,
            other => CloneError::internal(other.to_string(), Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceKind;
    use serde_json::json;

    fn status(code: u16) -> PlatformError {
        PlatformError::Status {
            status: code,
            body: json!({"message": "nope"}),
        }
    }

    #[test]
    fn test_retryable_classification() {
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(PlatformError::Network("reset".into()).is_retryable());
        assert!(!status(400).is_retryable());
        assert!(!status(401).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(!PlatformError::Decode("bad json".into()).is_retryable());
    }

    #[test]
    fn test_from_platform_maps_codes() {
        let actions = vec![ActionRecord::created(ResourceKind::Tool, "t1")];

        let err = CloneError::from_platform(&status(403), actions.clone());
        assert_eq!(err.code(), ErrorCode::InsufficientPermissions);
        assert_eq!(err.actions(), actions.as_slice());

        let err = CloneError::from_platform(&status(400), actions.clone());
        assert_eq!(err.code(), ErrorCode::VapiBadRequest);

        let err = CloneError::from_platform(&status(502), actions);
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[test]
    fn test_into_failure_keeps_actions() {
        let err = CloneError::PlatformBadRequest {
            message: "assistant.model is required".to_string(),
            actions: vec![ActionRecord::created(ResourceKind::Tool, "t1")],
        };
        let failure = err.into_failure();
        assert_eq!(failure.code, ErrorCode::VapiBadRequest);
        assert_eq!(failure.actions.len(), 1);
        assert!(failure.message.contains("assistant.model"));
    }

    #[test]
    fn test_credential_not_linked_maps_to_api_key_not_found() {
        let err: CloneError = CredentialError::NotLinked.into();
        assert_eq!(err.code(), ErrorCode::ApiKeyNotFound);
    }

    #[test]
    fn test_status_error_display() {
        assert_eq!(
            status(401).to_string(),
            r#"platform returned HTTP 401: {"message":"nope"}"#
        );
    }
}
