//! Shared application state for CLI and HTTP handlers.
//!
//! AppState wires the SQLite credential store, the vault and the platform
//! connector into one [`CloneService`]. It is `Clone` so it can be used as
//! axum router state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use voxclone_core::service::reconcile::TemplatePair;
use voxclone_core::service::replication::CloneService;
use voxclone_infra::config::{load_config, resolve_data_dir, templates_dir};
use voxclone_infra::crypto::vault::VaultCrypto;
use voxclone_infra::platform::VapiConnector;
use voxclone_infra::sqlite::credential::SqliteCredentialStore;
use voxclone_infra::sqlite::pool::DatabasePool;
use voxclone_infra::template::load_templates;
use voxclone_types::clone::CloneOutcome;
use voxclone_types::config::AppConfig;
use voxclone_types::credential::UserId;
use voxclone_types::error::CloneError;

/// Concrete type alias for the clone service used across the binary.
pub type AppCloneService = CloneService<SqliteCredentialStore, VapiConnector>;

#[derive(Clone)]
pub struct AppState {
    pub clone_service: Arc<AppCloneService>,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize from the resolved data directory and its `config.toml`.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_config(&data_dir).await;
        Self::with_config(data_dir, config).await
    }

    /// Initialize against an explicit data directory and configuration.
    pub async fn with_config(data_dir: PathBuf, config: AppConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let db_pool = DatabasePool::open_in(&data_dir)
            .await
            .context("failed to open credential database")?;

        let vault = VaultCrypto::from_source(config.vault.key_source, &data_dir)
            .context("failed to load vault key")?;
        let store = SqliteCredentialStore::new(db_pool.clone(), Arc::new(vault));

        let connector =
            VapiConnector::from_config(&config).context("failed to build platform client")?;

        let clone_service = Arc::new(CloneService::new(
            store,
            connector,
            Duration::from_secs(config.reconcile.deadline_secs),
        ));

        let templates_dir = templates_dir(&config, &data_dir);
        tracing::debug!(
            data_dir = %data_dir.display(),
            templates_dir = %templates_dir.display(),
            base_url = %config.platform.base_url,
            "Application state initialized"
        );

        Ok(Self {
            clone_service,
            config: Arc::new(config),
            data_dir,
            templates_dir,
            db_pool,
        })
    }

    /// Read the templates fresh, so edits apply without a restart.
    ///
    /// An unreadable or malformed file is a configuration problem and is
    /// reported as `INVALID_TEMPLATE`.
    pub async fn templates(&self) -> Result<TemplatePair, CloneError> {
        load_templates(&self.templates_dir).await.map_err(|e| {
            tracing::warn!(dir = %self.templates_dir.display(), error = %e, "Template load failed");
            CloneError::InvalidTemplate(e.to_string())
        })
    }

    /// Load the templates and run a clone for `raw_user_id`.
    pub async fn clone_for(&self, raw_user_id: &str) -> Result<CloneOutcome, CloneError> {
        // A bad user id is reported before any template problem.
        UserId::parse(raw_user_id)?;
        let templates = self.templates().await?;
        self.clone_service
            .clone_templates(raw_user_id, &templates)
            .await
    }

    pub async fn shutdown(&self) {
        self.db_pool.close().await;
    }
}
