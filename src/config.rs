//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. explicit path (e.g. a `--config <path>` flag in the embedding binary)
//! 2. `~/.pappus/config.toml` (user)
//! 3. `/etc/pappus/config.toml` (system)
//!
//! Provider tables are keyed by name and kept as raw strings here so that
//! unknown names reach the registry, which logs and skips them. API keys
//! missing from the file fall back to the provider's environment variable
//! (e.g. `OPENAI_API_KEY`).
//!
//! ```toml
//! [engine]
//! default_strategy = "best_of_n"
//! best_of_n = 3
//!
//! [providers.openai]
//! model = "gpt-4o-mini"
//! temperature = 0.7
//! max_tokens = 4096
//! enabled = true
//! priority = 1
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, ProviderConfig, ProviderId, Strategy};
use crate::{PappusError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    /// Provider settings keyed by provider name.
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderSettings>,
}

/// Orchestrator defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Strategy used when a request names neither a provider nor a strategy
    /// (default: best_of_n).
    #[serde(default)]
    pub default_strategy: Strategy,
    /// Ensemble width when a request does not set `n` (default: 3).
    #[serde(default = "default_best_of_n")]
    pub best_of_n: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_strategy: Strategy::default(),
            best_of_n: default_best_of_n(),
        }
    }
}

fn default_best_of_n() -> usize {
    3
}

/// Settings for one provider, before its name has been resolved.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Sampling temperature (default: 0.7).
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Output token limit (default: 4096).
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Whether to load the provider at all (default: true).
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Reporting priority (default: 1). Not used for selection.
    #[serde(default = "default_priority")]
    pub priority: i32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            enabled: default_enabled(),
            priority: default_priority(),
        }
    }
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_enabled() -> bool {
    true
}

fn default_priority() -> i32 {
    1
}

impl ProviderSettings {
    /// Resolve into a typed config, reading the API key from the
    /// environment if the file did not set one.
    pub fn into_config(self, provider: ProviderId) -> ProviderConfig {
        self.into_config_with_env(provider, |var| std::env::var(var).ok())
    }

    /// Like [`into_config`](Self::into_config) with an explicit env lookup.
    pub fn into_config_with_env<F>(self, provider: ProviderId, env: F) -> ProviderConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = self.api_key.or_else(|| env(provider.api_key_env()));
        ProviderConfig {
            provider,
            api_key,
            base_url: self.base_url,
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            enabled: self.enabled,
            priority: self.priority,
        }
    }
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.pappus/config.toml`
    /// 3. `/etc/pappus/config.toml`
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?;
        let content = fs::read_to_string(&path).map_err(|e| {
            PappusError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            PappusError::Configuration(msg) => {
                PappusError::Configuration(format!("{msg} (in {path:?})"))
            }
            other => other,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| PappusError::Configuration(format!("Failed to parse config: {e}")))?;
        if config.engine.best_of_n == 0 {
            return Err(PappusError::Configuration(
                "engine.best_of_n must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(PappusError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".pappus").join("config.toml");
            if user_config.exists() {
                return Ok(user_config);
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/pappus/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }

        Err(PappusError::Configuration(
            "No config file found. Create ~/.pappus/config.toml or /etc/pappus/config.toml"
                .to_string(),
        ))
    }
}
