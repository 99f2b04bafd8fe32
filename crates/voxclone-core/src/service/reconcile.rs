//! Per-kind reconciliation of a user's account against the templates.
//!
//! For each kind (tool first, then assistant) the orchestrator lists the
//! user's resources, keeps the ones sharing the template's base name and
//! decides between create, reuse, upgrade (create then delete every old
//! candidate) and skip (the user already runs a newer version).

use voxclone_types::action::ActionRecord;
use voxclone_types::clone::CloneOutcome;
use voxclone_types::error::{CloneError, PlatformError};
use voxclone_types::resource::{Resource, ResourceKind};

use crate::platform::PlatformApi;
use crate::sanitize::{sanitize_resource, validation_problem};
use crate::version::{VersionSpec, base_name};

/// The operator-owned tool and assistant templates.
#[derive(Debug, Clone)]
pub struct TemplatePair {
    pub tool: Resource,
    pub assistant: Resource,
}

impl TemplatePair {
    pub fn new(tool: Resource, assistant: Resource) -> Self {
        Self { tool, assistant }
    }

    pub fn get(&self, kind: ResourceKind) -> &Resource {
        match kind {
            ResourceKind::Tool => &self.tool,
            ResourceKind::Assistant => &self.assistant,
        }
    }
}

/// Check both templates before anything touches the network.
///
/// Each template needs a name to version against plus the minimal shape
/// the platform accepts.
pub fn validate_templates(templates: &TemplatePair) -> Result<(), CloneError> {
    for kind in [ResourceKind::Tool, ResourceKind::Assistant] {
        let template = templates.get(kind);
        if template.versioned_name().is_none() {
            return Err(CloneError::InvalidTemplate(format!("{kind} template has no name")));
        }
        if let Some(problem) = validation_problem(kind, &template.to_value()) {
            return Err(CloneError::InvalidTemplate(format!("{kind} template: {problem}")));
        }
    }
    Ok(())
}

/// Final ids of one successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledIds {
    pub tool_id: String,
    pub assistant_id: String,
}

/// Runs the reconciliation state machine against one user's account.
///
/// Generic over the platform port so tests drive it with an in-memory fake.
pub struct CloneOrchestrator<P: PlatformApi> {
    platform: P,
}

impl<P: PlatformApi> CloneOrchestrator<P> {
    pub fn new(platform: P) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Reconcile both kinds, appending to `actions` as work happens.
    ///
    /// The log is written through a caller-owned buffer so that whatever
    /// ran before a failure (or before the caller's deadline cut the
    /// future) is still visible afterwards.
    pub async fn reconcile_all(
        &self,
        templates: &TemplatePair,
        actions: &mut Vec<ActionRecord>,
    ) -> Result<ReconciledIds, PlatformError> {
        let tool_id = self
            .reconcile_kind(ResourceKind::Tool, &templates.tool, None, actions)
            .await?;

        let dependencies = [tool_id.clone()];
        let assistant_id = self
            .reconcile_kind(
                ResourceKind::Assistant,
                &templates.assistant,
                Some(&dependencies),
                actions,
            )
            .await?;

        Ok(ReconciledIds {
            tool_id,
            assistant_id,
        })
    }

    /// Reconcile both kinds and package the result for the caller.
    pub async fn run(&self, templates: &TemplatePair) -> Result<CloneOutcome, CloneError> {
        validate_templates(templates)?;

        let mut actions = Vec::new();
        match self.reconcile_all(templates, &mut actions).await {
            Ok(ids) => Ok(CloneOutcome {
                assistant_id: ids.assistant_id,
                tool_id: ids.tool_id,
                actions,
            }),
            Err(err) => Err(CloneError::from_platform(&err, actions)),
        }
    }

    /// Reconcile a single kind and return the id to use downstream.
    pub async fn reconcile_kind(
        &self,
        kind: ResourceKind,
        template: &Resource,
        dependency_ids: Option<&[String]>,
        actions: &mut Vec<ActionRecord>,
    ) -> Result<String, PlatformError> {
        let template_name = template.versioned_name().unwrap_or_default();
        let template_base = base_name(template_name);
        let template_version = VersionSpec::from_name(template_name);

        let existing = self.platform.list(kind).await?;
        let candidates = candidate_set(&existing, template_base);

        let Some(newest) = newest_candidate(&candidates) else {
            tracing::debug!(kind = %kind, base = template_base, "No existing clone, creating");
            let id = self.create(kind, template, dependency_ids).await?;
            actions.push(ActionRecord::created(kind, id.clone()));
            return Ok(id);
        };

        match template_version.cmp(&newest.version) {
            std::cmp::Ordering::Greater => {
                tracing::info!(
                    kind = %kind,
                    base = template_base,
                    from = %newest.version,
                    to = %template_version,
                    "Upgrading clone"
                );
                let id = self.create(kind, template, dependency_ids).await?;
                actions.push(ActionRecord::created(kind, id.clone()));

                for candidate in &candidates {
                    match self.platform.delete(kind, candidate.id).await {
                        Ok(()) => actions.push(ActionRecord::deleted_old(kind, candidate.id)),
                        Err(err) => {
                            tracing::warn!(
                                kind = %kind,
                                id = candidate.id,
                                error = %err,
                                "Failed to delete superseded clone"
                            );
                            actions.push(ActionRecord::delete_failed(kind, candidate.id));
                        }
                    }
                }
                Ok(id)
            }
            std::cmp::Ordering::Equal => {
                actions.push(ActionRecord::reused(kind, newest.id));
                Ok(newest.id.to_string())
            }
            std::cmp::Ordering::Less => {
                tracing::info!(
                    kind = %kind,
                    id = newest.id,
                    existing = %newest.version,
                    template = %template_version,
                    "User already has a newer clone, skipping"
                );
                actions.push(ActionRecord::skipped_newer_exists(kind, newest.id));
                Ok(newest.id.to_string())
            }
        }
    }

    async fn create(
        &self,
        kind: ResourceKind,
        template: &Resource,
        dependency_ids: Option<&[String]>,
    ) -> Result<String, PlatformError> {
        let body = sanitize_resource(kind, template, dependency_ids);
        let created = self.platform.create(kind, &body).await?;
        created
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PlatformError::Decode(format!("created {kind} has no id")))
    }
}

/// An existing resource sharing the template's base name.
#[derive(Debug)]
struct Candidate<'a> {
    id: &'a str,
    version: VersionSpec,
}

/// Resources of the listed kind whose base name equals `base`, in list order.
/// Entries without an id cannot be reused or deleted and are ignored.
fn candidate_set<'a>(existing: &'a [Resource], base: &str) -> Vec<Candidate<'a>> {
    existing
        .iter()
        .filter_map(|resource| {
            let id = resource.id.as_deref().filter(|id| !id.is_empty())?;
            let name = resource.versioned_name().unwrap_or_default();
            (base_name(name) == base).then(|| Candidate {
                id,
                version: VersionSpec::from_name(name),
            })
        })
        .collect()
}

/// Highest-versioned candidate; the first one listed wins a tie.
fn newest_candidate<'c, 'a>(candidates: &'c [Candidate<'a>]) -> Option<&'c Candidate<'a>> {
    candidates.iter().fold(None, |best, candidate| match best {
        Some(current) if candidate.version <= current.version => Some(current),
        _ => Some(candidate),
    })
}
