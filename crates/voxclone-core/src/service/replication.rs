//! End-to-end clone flow for one user.
//!
//! `CloneService` ties the credential store, the platform connector and the
//! orchestrator together: resolve the user's key, validate it against the
//! platform, reconcile both kinds under a deadline, then remember the ids.
//! Runs for the same user are serialized with a per-user lock; runs for
//! different users never wait on each other.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::Instrument;

use voxclone_types::clone::CloneOutcome;
use voxclone_types::credential::{CredentialRecord, UserId};
use voxclone_types::error::{CloneError, CredentialError, PlatformError};
use voxclone_types::resource::ResourceKind;

use crate::platform::{PlatformApi, PlatformConnector};
use crate::repository::credential::CredentialStore;
use crate::service::reconcile::{CloneOrchestrator, TemplatePair, validate_templates};

/// Service owning the clone-and-reconcile use case.
pub struct CloneService<S: CredentialStore, C: PlatformConnector> {
    store: S,
    connector: C,
    deadline: Duration,
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl<S: CredentialStore, C: PlatformConnector> CloneService<S, C> {
    /// - `store`: encrypted credential storage
    /// - `connector`: builds a platform client from a decrypted key
    /// - `deadline`: upper bound on one whole run
    pub fn new(store: S, connector: C, deadline: Duration) -> Self {
        Self {
            store,
            connector,
            deadline,
            locks: DashMap::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Store or replace a user's platform credentials.
    pub async fn link(
        &self,
        user: &UserId,
        api_key: &str,
        web_token: Option<&str>,
    ) -> Result<(), CredentialError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(CredentialError::EmptyApiKey);
        }
        let web_token = web_token.map(str::trim).filter(|t| !t.is_empty());
        self.store.link(user, api_key, web_token).await?;
        tracing::info!(user_id = %user, has_web_token = web_token.is_some(), "Linked credentials");
        Ok(())
    }

    /// Forget a user's credentials and clone ids.
    pub async fn unlink(&self, user: &UserId) -> Result<(), CredentialError> {
        self.store.unlink(user).await?;
        tracing::info!(user_id = %user, "Unlinked credentials");
        Ok(())
    }

    /// Credential metadata, without decrypting anything.
    pub async fn status(&self, user: &UserId) -> Result<Option<CredentialRecord>, CredentialError> {
        self.store.record(user).await
    }

    /// Clone or reconcile both templates into the user's account.
    pub async fn clone_templates(
        &self,
        raw_user_id: &str,
        templates: &TemplatePair,
    ) -> Result<CloneOutcome, CloneError> {
        let user = UserId::parse(raw_user_id)?;
        validate_templates(templates)?;

        let span = tracing::info_span!("clone_templates", user_id = %user);
        async {
            let lock = self.locks.entry(user.clone()).or_default().clone();
            let guard = lock.lock().await;

            let result = self.run_locked(&user, templates).await;

            drop(guard);
            drop(lock);
            self.locks
                .remove_if(&user, |_, lock| Arc::strong_count(lock) == 1);

            match &result {
                Ok(outcome) => tracing::info!(
                    tool_id = %outcome.tool_id,
                    assistant_id = %outcome.assistant_id,
                    actions = outcome.actions.len(),
                    "Clone reconciled"
                ),
                Err(err) => tracing::warn!(
                    code = %err.code(),
                    actions = err.actions().len(),
                    error = %err,
                    "Clone failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_locked(
        &self,
        user: &UserId,
        templates: &TemplatePair,
    ) -> Result<CloneOutcome, CloneError> {
        let api_key = self
            .store
            .api_key(user)
            .await?
            .ok_or(CloneError::ApiKeyNotFound)?;

        let platform = self
            .connector
            .connect(&api_key)
            .map_err(|err| CloneError::from_platform(&err, Vec::new()))?;
        drop(api_key);
        let orchestrator = CloneOrchestrator::new(platform);

        let mut actions = Vec::new();
        let run = async {
            verify_access(orchestrator.platform()).await?;
            orchestrator.reconcile_all(templates, &mut actions).await
        };

        let finished = tokio::time::timeout(self.deadline, run).await;
        let ids = match finished {
            Ok(Ok(ids)) => ids,
            Ok(Err(err)) => return Err(CloneError::from_platform(&err, actions)),
            Err(_) => {
                return Err(CloneError::internal(
                    format!(
                        "reconciliation exceeded its {}s deadline",
                        self.deadline.as_secs()
                    ),
                    actions,
                ));
            }
        };

        if let Err(err) = self
            .store
            .save_clone_ids(user, &ids.assistant_id, &ids.tool_id)
            .await
        {
            return Err(CloneError::internal(
                format!("failed to persist clone ids: {err}"),
                actions,
            ));
        }

        Ok(CloneOutcome {
            assistant_id: ids.assistant_id,
            tool_id: ids.tool_id,
            actions,
        })
    }
}

/// One cheap read to confirm the key is accepted before anything is touched.
async fn verify_access<P: PlatformApi>(platform: &P) -> Result<(), PlatformError> {
    platform.list(ResourceKind::Tool).await.map(|_| ())
}
