//! Types for generation requests and results.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{ConfigOverrides, ExtraParams, ProviderId};
use crate::PappusError;

/// How a request without an explicit provider is dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Rotate through live providers, one per request.
    LoadBalanced,
    /// Query up to N providers concurrently, keep the best result.
    #[default]
    BestOfN,
    /// Query up to N providers concurrently, keep the majority answer.
    Consensus,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadBalanced => "load_balanced",
            Self::BestOfN => "best_of_n",
            Self::Consensus => "consensus",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = PappusError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "load_balanced" => Ok(Self::LoadBalanced),
            "best_of_n" => Ok(Self::BestOfN),
            "consensus" => Ok(Self::Consensus),
            other => Err(PappusError::UnknownStrategy(other.to_string())),
        }
    }
}

impl Serialize for Strategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Strategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A generation request.
///
/// With `provider` set the request goes straight to that provider and
/// `strategy`/`n` are ignored. Otherwise the strategy (or the engine's
/// default) decides.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub provider: Option<ProviderId>,
    pub overrides: ConfigOverrides,
    pub strategy: Option<Strategy>,
    /// Number of providers to query for ensemble strategies.
    pub n: Option<usize>,
    pub extra: ExtraParams,
}

impl GenerationRequest {
    /// Create a request for the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            provider: None,
            overrides: ConfigOverrides::default(),
            strategy: None,
            n: None,
            extra: ExtraParams::default(),
        }
    }

    /// Target a specific provider.
    pub fn provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Override the configured model for this call.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.overrides.model = Some(model.into());
        self
    }

    /// Override the configured temperature for this call.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.overrides.temperature = Some(temperature);
        self
    }

    /// Set the dispatch strategy.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Set the ensemble width.
    pub fn n(mut self, n: usize) -> Self {
        self.n = Some(n);
        self
    }

    /// Attach provider-specific parameters.
    pub fn extra(mut self, extra: ExtraParams) -> Self {
        self.extra = extra;
        self
    }
}

/// Token counters reported by an adapter, keyed by counter name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Usage(BTreeMap<String, u64>);

impl Usage {
    pub const PROMPT_TOKENS: &'static str = "prompt_tokens";
    pub const COMPLETION_TOKENS: &'static str = "completion_tokens";
    pub const TOTAL_TOKENS: &'static str = "total_tokens";

    pub fn new() -> Self {
        Self::default()
    }

    /// Usage with prompt, completion, and total counters filled in.
    pub fn tokens(prompt: u64, completion: u64) -> Self {
        Self::new()
            .with(Self::PROMPT_TOKENS, prompt)
            .with(Self::COMPLETION_TOKENS, completion)
            .with(Self::TOTAL_TOKENS, prompt + completion)
    }

    pub fn with(mut self, counter: impl Into<String>, value: u64) -> Self {
        self.0.insert(counter.into(), value);
        self
    }

    pub fn get(&self, counter: &str) -> Option<u64> {
        self.0.get(counter).copied()
    }

    pub fn prompt_tokens(&self) -> Option<u64> {
        self.get(Self::PROMPT_TOKENS)
    }

    pub fn completion_tokens(&self) -> Option<u64> {
        self.get(Self::COMPLETION_TOKENS)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// What an adapter returns for a single generate call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdapterResponse {
    pub content: String,
    /// Model id the backend actually used.
    pub model: String,
    #[serde(default)]
    pub usage: Usage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl AdapterResponse {
    pub fn new(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            usage: Usage::default(),
            cost: None,
        }
    }

    pub fn usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    pub fn cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }
}

/// Normalized result of a generate call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub content: String,
    pub model: String,
    pub provider: ProviderId,
    #[serde(default)]
    pub usage: Usage,
    /// Wall-clock time around the adapter call. Serialized as float seconds.
    #[serde(with = "latency_secs")]
    pub latency: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl GenerationResult {
    /// Wrap an adapter response.
    pub fn from_adapter(provider: ProviderId, response: AdapterResponse, latency: Duration) -> Self {
        Self {
            content: response.content,
            model: response.model,
            provider,
            usage: response.usage,
            latency,
            cost: response.cost,
        }
    }
}

mod latency_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(latency: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(latency.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parses_known_names() {
        assert_eq!("load_balanced".parse::<Strategy>().unwrap(), Strategy::LoadBalanced);
        assert_eq!("best_of_n".parse::<Strategy>().unwrap(), Strategy::BestOfN);
        assert_eq!("consensus".parse::<Strategy>().unwrap(), Strategy::Consensus);
    }

    #[test]
    fn strategy_rejects_unknown_names() {
        let err = "random".parse::<Strategy>().unwrap_err();
        assert!(matches!(err, PappusError::UnknownStrategy(ref s) if s == "random"));
    }

    #[test]
    fn request_builder_collects_overrides() {
        let request = GenerationRequest::new("hi")
            .provider(ProviderId::Ollama)
            .model("llama3")
            .temperature(0.1);
        assert_eq!(request.provider, Some(ProviderId::Ollama));
        assert_eq!(request.overrides.model.as_deref(), Some("llama3"));
        assert_eq!(request.overrides.temperature, Some(0.1));
    }

    #[test]
    fn result_serializes_latency_as_seconds() {
        let result = GenerationResult::from_adapter(
            ProviderId::Groq,
            AdapterResponse::new("hello", "llama-3.1-8b").usage(Usage::tokens(3, 2)),
            Duration::from_millis(1500),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["provider"], "groq");
        assert_eq!(json["latency"], 1.5);
        assert_eq!(json["usage"]["total_tokens"], 5);
        assert!(json.get("cost").is_none());

        let back: GenerationResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.latency, Duration::from_millis(1500));
    }
}
