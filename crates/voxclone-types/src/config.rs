//! Configuration types for voxclone.
//!
//! `AppConfig` represents the top-level `config.toml` in the data directory.
//! Every section and field has a default so an empty file is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub platform: PlatformConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub reconcile: ReconcileConfig,

    #[serde(default)]
    pub templates: TemplateConfig,

    #[serde(default)]
    pub vault: VaultConfig,
}

/// Where and how to reach the voice platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.vapi.ai".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Retry/backoff settings for transient platform failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Factor applied to the delay after each failed attempt.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            multiplier: default_multiplier(),
        }
    }
}

/// Limits on a single reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Overall deadline for one run, in seconds.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

fn default_deadline_secs() -> u64 {
    60
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline_secs(),
        }
    }
}

/// Location of the template definitions (`tool.json`, `assistant.json`).
///
/// `None` means `{data_dir}/templates`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Source of the vault master key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySource {
    /// Hex-encoded key in `{data_dir}/vault.key`, generated on first use.
    #[default]
    File,
    /// OS keychain entry, generated on first use.
    Keychain,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default)]
    pub key_source: KeySource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.platform.base_url, "https://api.vapi.ai");
        assert_eq!(config.platform.request_timeout_secs, 30);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 1_000);
        assert_eq!(config.retry.multiplier, 2.0);
        assert_eq!(config.reconcile.deadline_secs, 60);
        assert!(config.templates.dir.is_none());
        assert_eq!(config.vault.key_source, KeySource::File);
    }

    #[test]
    fn test_app_config_deserialize_empty() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.retry, RetryConfig::default());
        assert_eq!(config.platform.base_url, "https://api.vapi.ai");
    }

    #[test]
    fn test_app_config_deserialize_with_values() {
        let toml_str = r#"
[platform]
base_url = "http://localhost:9999"

[retry]
max_attempts = 5
base_delay_ms = 250

[reconcile]
deadline_secs = 10

[templates]
dir = "/etc/voxclone/templates"

[vault]
key_source = "keychain"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.platform.base_url, "http://localhost:9999");
        assert_eq!(config.platform.request_timeout_secs, 30);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 250);
        assert_eq!(config.retry.multiplier, 2.0);
        assert_eq!(config.reconcile.deadline_secs, 10);
        assert_eq!(
            config.templates.dir,
            Some(PathBuf::from("/etc/voxclone/templates"))
        );
        assert_eq!(config.vault.key_source, KeySource::Keychain);
    }
}
