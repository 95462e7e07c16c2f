//! Bootstrap configuration.
//!
//! Built once (from defaults or a JSON file) and passed by reference to every
//! consumer. Nothing here is global or mutated after loading.

use crate::constants::{defaults, paths};
use firstboot_shared::errors::{FirstbootError, FirstbootResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapConfig {
    pub log: LogConfig,
    pub paths: ClientPaths,
    pub defaults: IdentityDefaults,
    pub ssl_verify_mode: SslVerifyMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Filter directive, overridden by `RUST_LOG` when set.
    pub level: String,
    /// Also append logs to this file.
    pub file: Option<PathBuf>,
    pub show_time: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            file: None,
            show_time: true,
        }
    }
}

/// Where the configuration client keeps its files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientPaths {
    pub validation_key: PathBuf,
    pub client_key: PathBuf,
    pub client_config_file: PathBuf,
    pub file_cache_path: PathBuf,
    pub pid_file: PathBuf,
}

impl Default for ClientPaths {
    fn default() -> Self {
        Self {
            validation_key: PathBuf::from(paths::VALIDATION_KEY),
            client_key: PathBuf::from(paths::CLIENT_KEY),
            client_config_file: PathBuf::from(paths::CLIENT_CONFIG_FILE),
            file_cache_path: PathBuf::from(paths::FILE_CACHE_PATH),
            pid_file: PathBuf::from(paths::PID_FILE),
        }
    }
}

impl ClientPaths {
    /// Defaults relocated under `root` (used for chroots and tests).
    pub fn under(root: &Path) -> Self {
        let rebase = |p: &str| root.join(p.trim_start_matches('/'));
        Self {
            validation_key: rebase(paths::VALIDATION_KEY),
            client_key: rebase(paths::CLIENT_KEY),
            client_config_file: rebase(paths::CLIENT_CONFIG_FILE),
            file_cache_path: rebase(paths::FILE_CACHE_PATH),
            pid_file: rebase(paths::PID_FILE),
        }
    }

    fn entries(&self) -> [(&'static str, &Path); 5] {
        [
            ("validation_key", &self.validation_key),
            ("client_key", &self.client_key),
            ("client_config_file", &self.client_config_file),
            ("file_cache_path", &self.file_cache_path),
            ("pid_file", &self.pid_file),
        ]
    }
}

/// Identity values used when user-data does not provide them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityDefaults {
    pub server_url: String,
    pub validation_client_name: String,
}

impl Default for IdentityDefaults {
    fn default() -> Self {
        Self {
            server_url: defaults::SERVER_URL.to_string(),
            validation_client_name: defaults::VALIDATION_CLIENT_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SslVerifyMode {
    #[default]
    VerifyNone,
    VerifyPeer,
}

impl BootstrapConfig {
    /// Load configuration from a JSON file. Missing keys take defaults,
    /// unknown keys are rejected.
    pub fn load(path: &Path) -> FirstbootResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FirstbootError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            FirstbootError::Config(format!("invalid config {}: {}", path.display(), e))
        })?;
        config.validate()?;

        tracing::debug!(path = %path.display(), "Loaded bootstrap configuration");
        Ok(config)
    }

    pub fn validate(&self) -> FirstbootResult<()> {
        for (key, path) in self.paths.entries() {
            if !path.is_absolute() {
                return Err(FirstbootError::Config(format!(
                    "paths.{} must be an absolute path, got: {}",
                    key,
                    path.display()
                )));
            }
        }

        if self.defaults.server_url.is_empty() {
            return Err(FirstbootError::Config(
                "defaults.server_url must not be empty".to_string(),
            ));
        }
        if self.defaults.validation_client_name.is_empty() {
            return Err(FirstbootError::Config(
                "defaults.validation_client_name must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
