//! Configuration loading and data directory resolution.
//!
//! Reads `config.toml` from the data directory (`~/.voxclone/` by default)
//! into [`AppConfig`]. A missing or malformed file falls back to defaults.

use std::path::{Path, PathBuf};

use voxclone_types::config::AppConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "VOXCLONE_DATA_DIR";

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolve the data directory: `$VOXCLONE_DATA_DIR`, else `~/.voxclone`,
/// else `./.voxclone`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".voxclone");
    }

    PathBuf::from(".voxclone")
}

/// Load configuration from `{data_dir}/config.toml`.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join(CONFIG_FILE_NAME);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!(path = %config_path.display(), error = %err, "Failed to read config, using defaults");
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %config_path.display(), error = %err, "Failed to parse config, using defaults");
            AppConfig::default()
        }
    }
}

/// Directory holding `tool.json` and `assistant.json`.
pub fn templates_dir(config: &AppConfig, data_dir: &Path) -> PathBuf {
    config
        .templates
        .dir
        .clone()
        .unwrap_or_else(|| data_dir.join("templates"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config.platform.base_url, "https://api.vapi.ai");
        assert_eq!(config.reconcile.deadline_secs, 60);
    }

    #[tokio::test]
    async fn test_valid_file_is_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"
[platform]
base_url = "http://127.0.0.1:4010"

[retry]
max_attempts = 2
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.platform.base_url, "http://127.0.0.1:4010");
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.base_delay_ms, 1_000);
    }

    #[tokio::test]
    async fn test_malformed_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(CONFIG_FILE_NAME), "[retry\nmax_attempts = ")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_templates_dir_defaults_under_data_dir() {
        let mut config = AppConfig::default();
        assert_eq!(
            templates_dir(&config, Path::new("/data")),
            PathBuf::from("/data/templates")
        );

        config.templates.dir = Some(PathBuf::from("/etc/voxclone"));
        assert_eq!(
            templates_dir(&config, Path::new("/data")),
            PathBuf::from("/etc/voxclone")
        );
    }

    #[test]
    fn test_resolve_data_dir_from_env() {
        // SAFETY: no other test in this crate reads or writes this variable.
        unsafe {
            std::env::set_var(DATA_DIR_ENV, "/tmp/voxclone-test");
        }
        let dir = resolve_data_dir();
        unsafe {
            std::env::remove_var(DATA_DIR_ENV);
        }
        assert_eq!(dir, PathBuf::from("/tmp/voxclone-test"));
    }
}
