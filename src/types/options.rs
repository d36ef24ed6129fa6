//! Per-provider configuration and per-call overrides.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ProviderId;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default output token limit.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Configuration for one provider.
///
/// Stored configs are never mutated after the registry loads them; per-call
/// overrides go through [`with_overrides`](Self::with_overrides), which
/// returns a derived copy.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider: ProviderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Disabled providers are stored but never loaded.
    pub enabled: bool,
    /// Reported in status listings; not consulted by any selection strategy.
    pub priority: i32,
}

impl ProviderConfig {
    /// Create a config with default settings for the given provider.
    pub fn new(provider: ProviderId) -> Self {
        Self {
            provider,
            api_key: None,
            base_url: None,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            enabled: true,
            priority: 1,
        }
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the endpoint base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the default model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the output token limit.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Enable or disable the provider.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the reporting priority.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Derive an ephemeral config with the given overrides applied.
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Self {
        let mut derived = self.clone();
        if let Some(ref model) = overrides.model {
            derived.model = Some(model.clone());
        }
        if let Some(temperature) = overrides.temperature {
            derived.temperature = temperature;
        }
        derived
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("enabled", &self.enabled)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Per-call overrides. Unset fields leave the stored value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ProviderConfig::new(ProviderId::Groq);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 4096);
        assert!(config.enabled);
        assert_eq!(config.priority, 1);
        assert!(config.model.is_none());
    }

    #[test]
    fn overrides_produce_a_copy() {
        let stored = ProviderConfig::new(ProviderId::OpenAi)
            .model("gpt-4o-mini")
            .temperature(0.2);
        let overrides = ConfigOverrides {
            model: Some("gpt-4o".into()),
            temperature: None,
        };

        let derived = stored.with_overrides(&overrides);

        assert_eq!(derived.model.as_deref(), Some("gpt-4o"));
        assert_eq!(derived.temperature, 0.2);
        assert_eq!(stored.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ProviderConfig::new(ProviderId::Anthropic).api_key("sk-ant-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-ant-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn zero_temperature_override_is_applied() {
        let stored = ProviderConfig::new(ProviderId::Mistral);
        let derived = stored.with_overrides(&ConfigOverrides {
            model: None,
            temperature: Some(0.0),
        });
        assert_eq!(derived.temperature, 0.0);
        assert_eq!(stored.temperature, DEFAULT_TEMPERATURE);
    }
}
