//! Template loading.
//!
//! The operator keeps the canonical definitions as two JSON files,
//! `tool.json` and `assistant.json`, in the templates directory. They are
//! typically exported straight from a master account, platform-assigned
//! fields included; sanitization happens later, per request.

use std::path::{Path, PathBuf};

use thiserror::Error;

use voxclone_core::service::reconcile::TemplatePair;
use voxclone_types::resource::{Resource, ResourceKind};

pub const TOOL_TEMPLATE_FILE: &str = "tool.json";
pub const ASSISTANT_TEMPLATE_FILE: &str = "assistant.json";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a valid {kind} definition: {message}")]
    Parse {
        path: PathBuf,
        kind: ResourceKind,
        message: String,
    },
}

/// Path of the template file for `kind` inside `dir`.
pub fn template_path(dir: &Path, kind: ResourceKind) -> PathBuf {
    match kind {
        ResourceKind::Tool => dir.join(TOOL_TEMPLATE_FILE),
        ResourceKind::Assistant => dir.join(ASSISTANT_TEMPLATE_FILE),
    }
}

/// Read one template file.
pub async fn load_template(dir: &Path, kind: ResourceKind) -> Result<Resource, TemplateError> {
    let path = template_path(dir, kind);
    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| TemplateError::Read {
            path: path.clone(),
            source,
        })?;

    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| TemplateError::Parse {
            path: path.clone(),
            kind,
            message: e.to_string(),
        })?;
    if !value.is_object() {
        return Err(TemplateError::Parse {
            path,
            kind,
            message: "expected a JSON object".to_string(),
        });
    }

    Resource::from_value(value).map_err(|e| TemplateError::Parse {
        path,
        kind,
        message: e.to_string(),
    })
}

/// Read both templates from `dir`.
pub async fn load_templates(dir: &Path) -> Result<TemplatePair, TemplateError> {
    let tool = load_template(dir, ResourceKind::Tool).await?;
    let assistant = load_template(dir, ResourceKind::Assistant).await?;
    tracing::debug!(
        dir = %dir.display(),
        tool = tool.versioned_name().unwrap_or_default(),
        assistant = assistant.versioned_name().unwrap_or_default(),
        "Loaded templates"
    );
    Ok(TemplatePair::new(tool, assistant))
}
