//! Configuration resolution for the Absinthe console.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/absinthe/settings.json)
//! 3. Environment variables
//! 4. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Complete console configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Backend REST API base URL.
    pub api_url: String,
    /// Points service base URL. Falls back to `api_url` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_url: Option<String>,
    /// Identity storage file. Falls back to `~/.absinthe/storage.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,
    pub log_level: String,
    /// Per-request timeout; reqwest defaults apply when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            points_url: None,
            storage_path: None,
            log_level: "warn".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl ConsoleConfig {
    /// Points service base URL, defaulting to the API URL.
    pub fn points_base_url(&self) -> &str {
        self.points_url.as_deref().unwrap_or(&self.api_url)
    }

    /// Identity storage path, if one can be determined.
    pub fn identity_path(&self) -> Option<PathBuf> {
        self.storage_path
            .clone()
            .or_else(crate::identity::FileIdentityStore::default_path)
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config() -> Result<ConsoleConfig> {
    let mut config = ConsoleConfig::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            config = load_config_file(&global_path)?;
        }
    }

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".absinthe").join("settings.json"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/absinthe/settings.json"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("absinthe").join("settings.json"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

fn load_config_file(path: &Path) -> Result<ConsoleConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn apply_env_overrides(config: &mut ConsoleConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("ABSINTHE_API_URL") {
        config.api_url = val;
    }
    if let Some(val) = var("ABSINTHE_POINTS_URL") {
        config.points_url = Some(val);
    }
    if let Some(val) = var("ABSINTHE_STORAGE_PATH") {
        config.storage_path = Some(PathBuf::from(val));
    }
    if let Some(val) = var("ABSINTHE_LOG_LEVEL") {
        config.log_level = val;
    }
    if let Some(val) = var("ABSINTHE_REQUEST_TIMEOUT_SECS") {
        if let Ok(n) = val.parse() {
            config.request_timeout_secs = Some(n);
        }
    }
}
