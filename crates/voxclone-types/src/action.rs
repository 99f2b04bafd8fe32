//! Action log entries recorded during a reconciliation run.

use serde::{Serialize, Serializer};

use std::fmt;

use crate::resource::ResourceKind;

/// What the reconciliation did to a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionVerb {
    /// The template was submitted as a new resource.
    Created,
    /// An existing clone at the template's version was kept.
    Reused,
    /// A superseded clone was removed after an upgrade.
    DeletedOld,
    /// Removing a superseded clone failed; it must be cleaned up manually.
    DeleteFailed,
    /// The user already owns a newer version than the template.
    SkippedNewerExists,
}

/// One immutable entry in the action log, rendered as `<verb>-<kind>:<id>`.
///
/// Examples: `created-tool:tool_123`, `deleted-old-tool:tool_789`,
/// `skipped-tool-newer-exists:tool_999`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub verb: ActionVerb,
    pub kind: ResourceKind,
    pub id: String,
}

impl ActionRecord {
    pub fn new(verb: ActionVerb, kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            verb,
            kind,
            id: id.into(),
        }
    }

    pub fn created(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::new(ActionVerb::Created, kind, id)
    }

    pub fn reused(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::new(ActionVerb::Reused, kind, id)
    }

    pub fn deleted_old(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::new(ActionVerb::DeletedOld, kind, id)
    }

    pub fn delete_failed(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::new(ActionVerb::DeleteFailed, kind, id)
    }

    pub fn skipped_newer_exists(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::new(ActionVerb::SkippedNewerExists, kind, id)
    }
}

impl fmt::Display for ActionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind.singular();
        match self.verb {
            ActionVerb::Created => write!(f, "created-{kind}:{}", self.id),
            ActionVerb::Reused => write!(f, "reused-{kind}:{}", self.id),
            ActionVerb::DeletedOld => write!(f, "deleted-old-{kind}:{}", self.id),
            ActionVerb::DeleteFailed => write!(f, "delete-failed-{kind}:{}", self.id),
            ActionVerb::SkippedNewerExists => {
                write!(f, "skipped-{kind}-newer-exists:{}", self.id)
            }
        }
    }
}

/// Serialized as its display string so callers receive `string[]`.
impl Serialize for ActionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
