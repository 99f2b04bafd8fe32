//! Payload sanitization for create/update requests.
//!
//! The platform rejects bodies that echo back fields it assigns itself
//! (identifiers, timestamps, ownership and billing metadata). Templates are
//! usually exported from a live account, so they carry all of those. The
//! walker here strips them at every nesting level and prunes any container
//! the stripping left empty.
//!
//! The forbidden names are configuration data ([`ReadOnlyFields`]), kept
//! separate from the walking algorithm.

use std::collections::HashSet;

use serde_json::{Map, Value};

use voxclone_types::resource::{Resource, ResourceKind};

/// Fields the platform assigns on every resource kind.
const COMMON_READ_ONLY: &[&str] = &[
    "id",
    "_id",
    "internalId",
    "orgId",
    "createdAt",
    "updatedAt",
    "createdBy",
    "lastModifiedBy",
    "ownerId",
    "billing",
];

const TOOL_READ_ONLY: &[&str] = &["isServerUrlSecretSet"];

const ASSISTANT_READ_ONLY: &[&str] = &["isServerUrlSecretSet", "credentialIds"];

/// Path of the field that associates an assistant with its tools.
pub const DEPENDENCY_PATH: [&str; 2] = ["model", "toolIds"];

/// A set of field names that must never be sent on create/update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOnlyFields(HashSet<String>);

impl ReadOnlyFields {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// The default forbidden set for a resource kind.
    pub fn for_kind(kind: ResourceKind) -> Self {
        let specific = match kind {
            ResourceKind::Tool => TOOL_READ_ONLY,
            ResourceKind::Assistant => ASSISTANT_READ_ONLY,
        };
        Self::new(COMMON_READ_ONLY.iter().chain(specific).copied())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Return a sanitized deep copy of `resource`.
///
/// - Every key in `read_only` is dropped at every mapping level.
/// - A nested mapping or sequence that becomes empty because of that is
///   omitted from its parent. Containers that were already empty in the
///   input are kept as they are.
/// - When `dependency_ids` is given it replaces `model.toolIds`, creating
///   `model` if needed.
///
/// The input is never mutated.
pub fn sanitize(
    resource: &Value,
    read_only: &ReadOnlyFields,
    dependency_ids: Option<&[String]>,
) -> Value {
    let mut cleaned = match strip(resource, read_only) {
        Some(value) => value,
        None => empty_like(resource),
    };

    if let Some(ids) = dependency_ids {
        inject_dependencies(&mut cleaned, ids);
    }

    cleaned
}

/// Sanitize a typed resource with the default forbidden set for its kind.
pub fn sanitize_resource(
    kind: ResourceKind,
    resource: &Resource,
    dependency_ids: Option<&[String]>,
) -> Value {
    sanitize(
        &resource.to_value(),
        &ReadOnlyFields::for_kind(kind),
        dependency_ids,
    )
}

/// Recursive walker. `None` means "became empty, omit from parent".
fn strip(value: &Value, read_only: &ReadOnlyFields) -> Option<Value> {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, child) in map {
                if read_only.contains(key) {
                    continue;
                }
                if let Some(cleaned) = strip(child, read_only) {
                    out.insert(key.clone(), cleaned);
                }
            }
            if out.is_empty() && !map.is_empty() {
                None
            } else {
                Some(Value::Object(out))
            }
        }
        Value::Array(items) => {
            let out: Vec<Value> = items
                .iter()
                .filter_map(|item| strip(item, read_only))
                .collect();
            if out.is_empty() && !items.is_empty() {
                None
            } else {
                Some(Value::Array(out))
            }
        }
        other => Some(other.clone()),
    }
}

fn empty_like(value: &Value) -> Value {
    match value {
        Value::Array(_) => Value::Array(Vec::new()),
        _ => Value::Object(Map::new()),
    }
}

fn inject_dependencies(target: &mut Value, ids: &[String]) {
    let [parent_key, field_key] = DEPENDENCY_PATH;

    let Value::Object(root) = target else {
        return;
    };

    let parent = root
        .entry(parent_key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !parent.is_object() {
        *parent = Value::Object(Map::new());
    }
    if let Value::Object(parent) = parent {
        parent.insert(
            field_key.to_string(),
            Value::Array(ids.iter().cloned().map(Value::String).collect()),
        );
    }
}

/// Describe why a payload would be rejected, if it would.
///
/// Assistants need a non-empty `name`; tools need a non-empty `type`
/// discriminator.
pub fn validation_problem(kind: ResourceKind, resource: &Value) -> Option<String> {
    let (field, label) = match kind {
        ResourceKind::Assistant => ("name", "assistant name"),
        ResourceKind::Tool => ("type", "tool type"),
    };

    match resource.get(field).and_then(Value::as_str) {
        Some(value) if !value.trim().is_empty() => None,
        Some(_) => Some(format!("{label} is empty")),
        None => Some(format!("{label} is missing")),
    }
}

/// Minimal-shape pre-submission check. Reports, never panics.
pub fn validate(kind: ResourceKind, resource: &Value) -> bool {
    validation_problem(kind, resource).is_none()
}
