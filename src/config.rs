//! Mindful Crew configuration management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend connection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Memory browser tuning
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Execution defaults
    #[serde(default)]
    pub execution: ExecutionConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the job backend
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

/// Memory browser configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Quiet period after the last query edit before a request goes out
    pub debounce_ms: u64,

    /// `limit` sent with list and search requests
    pub page_limit: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            page_limit: 50,
        }
    }
}

impl MemoryConfig {
    /// Debounce window as a `Duration`
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Topic used when none is given
    pub default_topic: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            default_topic: "digital detox".to_string(),
        }
    }
}

impl ClientConfig {
    /// Parse a TOML document. Missing sections fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolve the configuration: an explicit path wins, then the per-user
    /// config file if present, then defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "Loading user configuration");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// `<config dir>/mindful-crew/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|p| p.join("mindful-crew").join("config.toml"))
    }

    /// Reject settings that would make every request fail
    pub fn validate(&self) -> Result<()> {
        let url = self.backend.base_url.trim();
        if url.is_empty() {
            return Err(Error::Config("backend.base_url must not be empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "backend.base_url must be an http(s) URL, got '{}'",
                url
            )));
        }
        if self.memory.page_limit == 0 {
            return Err(Error::Config("memory.page_limit must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
