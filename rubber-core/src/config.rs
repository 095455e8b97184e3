//! Client settings.
//!
//! Settings come from the process environment, a `.env` file, or a TOML
//! document:
//!
//! - `ELASTICSEARCH_URL` - base URL prepended to every resource path
//! - `RUBBER_DISABLE_AUTO_INDEX` - never connect lifecycle hooks
//! - `RUBBER_RAISE_ON_ERROR` - propagate transport failures by default

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Base URL used when neither the caller nor the settings provide one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:9200/";

const URL_KEY: &str = "ELASTICSEARCH_URL";
const DISABLE_AUTO_INDEX_KEY: &str = "RUBBER_DISABLE_AUTO_INDEX";
const RAISE_ON_ERROR_KEY: &str = "RUBBER_RAISE_ON_ERROR";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Host-level settings consulted by clients and resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the document store.
    pub elasticsearch_url: Option<String>,
    /// Globally disable automatic indexing on save/delete.
    pub disable_auto_index: bool,
    /// Propagate transport failures instead of logging them.
    pub raise_on_error: bool,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            elasticsearch_url: lookup(URL_KEY),
            disable_auto_index: lookup(DISABLE_AUTO_INDEX_KEY)
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            raise_on_error: lookup(RAISE_ON_ERROR_KEY)
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }

    /// Read settings from a `.env` file. Variables already present in the
    /// process environment take precedence over the file.
    pub fn from_dotenv(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let entries = dotenvy::from_path_iter(path)
            .map_err(|e| ConfigError::LoadError(format!("{}: {}", path.display(), e)))?;

        let mut file = HashMap::new();
        for entry in entries {
            let (key, value) = entry.map_err(|e| ConfigError::ParseError(e.to_string()))?;
            file.insert(key, value);
        }

        Ok(Self::from_lookup(|key| {
            std::env::var(key).ok().or_else(|| file.get(key).cloned())
        }))
    }

    /// Parse settings from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Parse settings from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolve the base URL: an explicit value wins (even when empty), then
    /// the configured URL, then [`DEFAULT_BASE_URL`].
    pub fn resolve_base_url(&self, explicit: Option<&str>) -> String {
        explicit
            .or(self.elasticsearch_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
