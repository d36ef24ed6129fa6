//! Provider identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PappusError;

/// Identity of a supported text-generation backend.
///
/// The set is closed: extending it means adding a variant here and
/// registering an adapter factory for it. Declaration order is the stable
/// iteration order used when selecting among live providers.
///
/// Serializes as its lowercase name (e.g. `"openai"`), so it can be used as
/// a JSON object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderId {
    DeepSeek,
    Mistral,
    OpenAi,
    Anthropic,
    Ollama,
    Groq,
    Together,
}

impl ProviderId {
    /// Every provider, in declaration order.
    pub const ALL: [ProviderId; 7] = [
        Self::DeepSeek,
        Self::Mistral,
        Self::OpenAi,
        Self::Anthropic,
        Self::Ollama,
        Self::Groq,
        Self::Together,
    ];

    /// Canonical lowercase name, as used in config files and tool calls.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek",
            Self::Mistral => "mistral",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
            Self::Groq => "groq",
            Self::Together => "together",
        }
    }

    /// Environment variable consulted when no API key is configured.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::DeepSeek => "DEEPSEEK_API_KEY",
            Self::Mistral => "MISTRAL_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Ollama => "OLLAMA_API_KEY",
            Self::Groq => "GROQ_API_KEY",
            Self::Together => "TOGETHER_API_KEY",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = PappusError;

    /// Case-insensitive parse. Unknown names are a configuration error.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == lower)
            .ok_or_else(|| PappusError::Configuration(format!("unknown provider: {s}")))
    }
}

impl Serialize for ProviderId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProviderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("OpenAI".parse::<ProviderId>().unwrap(), ProviderId::OpenAi);
        assert_eq!(" groq ".parse::<ProviderId>().unwrap(), ProviderId::Groq);
    }

    #[test]
    fn unknown_name_is_configuration_error() {
        let err = "gemini".parse::<ProviderId>().unwrap_err();
        assert!(matches!(err, PappusError::Configuration(_)));
        assert!(err.to_string().contains("gemini"));
    }

    #[test]
    fn display_round_trips_every_variant() {
        for id in ProviderId::ALL {
            assert_eq!(id.to_string().parse::<ProviderId>().unwrap(), id);
        }
    }

    #[test]
    fn ordering_follows_declaration() {
        let mut ids = vec![ProviderId::Together, ProviderId::DeepSeek, ProviderId::OpenAi];
        ids.sort();
        assert_eq!(
            ids,
            vec![ProviderId::DeepSeek, ProviderId::OpenAi, ProviderId::Together]
        );
    }

    #[test]
    fn serializes_as_lowercase_string() {
        let json = serde_json::to_string(&ProviderId::Anthropic).unwrap();
        assert_eq!(json, "\"anthropic\"");
        let parsed: ProviderId = serde_json::from_str("\"mistral\"").unwrap();
        assert_eq!(parsed, ProviderId::Mistral);
    }
}
