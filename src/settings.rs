//! Application settings
//!
//! Stores generator configuration (endpoint, model, limits, API key) in a JSON
//! file. Environment variables take precedence over stored values. Settings
//! are loaded once and passed down explicitly; nothing here is global.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{BookmindError, Result};
use crate::utils::mask_secret;

pub const API_KEY_ENV: &str = "NVIDIA_NIM_API_KEY";
pub const ENDPOINT_ENV: &str = "BOOKMIND_ENDPOINT";
pub const MODEL_ENV: &str = "BOOKMIND_MODEL";

pub const DEFAULT_ENDPOINT: &str = "https://integrate.api.nvidia.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "meta/llama-3.1-70b-instruct";

/// What to do with bookmarks beyond the categorization limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Leave them out of the result entirely
    #[default]
    Drop,
    /// Append them with the fallback category
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Working-set size for categorization
    #[serde(default = "default_categorize_limit")]
    pub categorize_limit: usize,
    /// Working-set size for relevance queries
    #[serde(default = "default_query_limit")]
    pub query_limit: usize,
    #[serde(default = "default_categorize_temperature")]
    pub categorize_temperature: f32,
    #[serde(default = "default_categorize_max_tokens")]
    pub categorize_max_tokens: u32,
    #[serde(default = "default_query_temperature")]
    pub query_temperature: f32,
    #[serde(default = "default_query_max_tokens")]
    pub query_max_tokens: u32,
    /// None = transport default (no timeout)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_categorize_limit() -> usize {
    100
}

fn default_query_limit() -> usize {
    200
}

fn default_categorize_temperature() -> f32 {
    0.2
}

fn default_categorize_max_tokens() -> u32 {
    4000
}

fn default_query_temperature() -> f32 {
    0.1
}

fn default_query_max_tokens() -> u32 {
    1000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            model: default_model(),
            categorize_limit: default_categorize_limit(),
            query_limit: default_query_limit(),
            categorize_temperature: default_categorize_temperature(),
            categorize_max_tokens: default_categorize_max_tokens(),
            query_temperature: default_query_temperature(),
            query_max_tokens: default_query_max_tokens(),
            request_timeout_secs: None,
            overflow: OverflowPolicy::Drop,
        }
    }
}

/// Connection details handed to the generator client at construction.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Option<Duration>,
}

impl Settings {
    /// Load settings from disk, or defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            BookmindError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            BookmindError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load from `path` (or the default location) and apply env overrides
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_settings_path(),
        };
        let mut settings = Settings::load(&path)?;
        settings.apply_env(|name| std::env::var(name).ok());
        Ok(settings)
    }

    /// Overlay non-empty values from the environment lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(API_KEY_ENV) {
            self.api_key = Some(key.trim().to_string());
        }
        if let Some(endpoint) = non_empty(ENDPOINT_ENV) {
            self.endpoint = endpoint;
        }
        if let Some(model) = non_empty(MODEL_ENV) {
            self.model = model;
        }
    }

    /// Save settings to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            BookmindError::Configuration(format!("Failed to serialize settings: {}", e))
        })?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                BookmindError::Configuration(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(path, content)
            .map_err(|e| BookmindError::Configuration(format!("Failed to write settings: {}", e)))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().map(|k| !k.trim().is_empty()).unwrap_or(false)
    }

    /// API key for display
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_deref().map(mask_secret)
    }

    /// Build the client configuration; fails when no credential is set
    pub fn generator_config(&self) -> Result<GeneratorConfig> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                BookmindError::Configuration(format!("{} is not configured.", API_KEY_ENV))
            })?;

        Ok(GeneratorConfig {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            api_key: api_key.to_string(),
            timeout: self.request_timeout_secs.map(Duration::from_secs),
        })
    }
}

/// `<data_dir>/bookmind/settings.json`, or `./settings.json` without a data dir
pub fn default_settings_path() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("bookmind"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("settings.json")
}
