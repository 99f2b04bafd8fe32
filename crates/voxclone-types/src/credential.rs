use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

use crate::error::CloneError;

/// Longest user identifier accepted from the surrounding application.
const MAX_USER_ID_LEN: usize = 128;

/// Identity of the user whose platform account is being reconciled.
///
/// Issued by the surrounding application; this crate only checks that it is
/// a usable storage key (non-blank, bounded, no control characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn parse(raw: &str) -> Result<Self, CloneError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CloneError::InvalidUserId("user id is empty".to_string()));
        }
        if trimmed.len() > MAX_USER_ID_LEN {
            return Err(CloneError::InvalidUserId(format!(
                "user id exceeds {MAX_USER_ID_LEN} characters"
            )));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(CloneError::InvalidUserId(
                "user id contains control characters".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored credential metadata for one user. Never holds decrypted values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub user_id: UserId,
    /// Whether a live-session web token is stored alongside the API key.
    pub has_web_token: bool,
    /// Last assistant id produced by a successful reconciliation.
    pub assistant_id: Option<String>,
    /// Last tool id produced by a successful reconciliation.
    pub tool_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A wrapper that redacts secret values in Debug and Display output.
///
/// Decrypted platform API keys travel through the core crate in this
/// wrapper. The actual value is accessible via `.expose()`.
#[derive(Clone)]
pub struct Redacted(String);

impl Redacted {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the underlying secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Show masked representation: last 4 chars visible.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 4 {
            "****".to_string()
        } else {
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("****{tail}")
        }
    }
}

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Redacted(\"***\")")
    }
}

impl fmt::Display for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}
