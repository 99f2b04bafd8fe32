use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use std::fmt;
use std::str::FromStr;

/// The two resource collections the voice platform exposes for cloning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A function-callable resource (function schema + server endpoint).
    Tool,
    /// A voice assistant (model, voice and transcriber settings).
    Assistant,
}

impl ResourceKind {
    /// Singular path segment, used for item paths and creation.
    pub fn singular(&self) -> &'static str {
        match self {
            ResourceKind::Tool => "tool",
            ResourceKind::Assistant => "assistant",
        }
    }

    /// Plural path segment, the alternative collection shape for listing.
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Tool => "tools",
            ResourceKind::Assistant => "assistants",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tool" | "tools" => Ok(ResourceKind::Tool),
            "assistant" | "assistants" => Ok(ResourceKind::Assistant),
            other => Err(format!("unknown resource kind: '{other}'")),
        }
    }
}

/// A tool or assistant as the platform represents it.
///
/// Only `id` and `name` are declared; every other field (model, voice,
/// function schema, server settings, platform metadata) is kept verbatim in
/// `fields` so that it survives a read-modify-write cycle untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Platform-assigned identifier. Absent until the resource is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Human name, optionally ending in a `_v<N>[.<N>]*` version suffix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Opaque, kind-specific configuration.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Resource {
    /// Parse a resource from a raw JSON value.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Rebuild the full JSON object, declared fields first.
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.fields.len() + 2);
        if let Some(id) = &self.id {
            map.insert("id".to_string(), Value::String(id.clone()));
        }
        if let Some(name) = &self.name {
            map.insert("name".to_string(), Value::String(name.clone()));
        }
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }

    /// The name that carries the version suffix.
    ///
    /// Assistants (and most tools) carry it at the top level. Function tools
    /// created without a top-level name carry it in `function.name`.
    pub fn versioned_name(&self) -> Option<&str> {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return Some(name);
        }
        self.fields
            .get("function")
            .and_then(|f| f.get("name"))
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
    }
}
