//! Provider registry with per-provider load isolation.
//!
//! The `ProviderRegistry` owns every configured provider's [`ProviderConfig`]
//! and the set of *live* adapters, i.e. those whose construction and
//! initialization succeeded.
//!
//! # Load Semantics
//!
//! For each configured entry, in order:
//! - Unknown provider names are logged and skipped.
//! - The config is stored, whether or not the provider is enabled.
//! - Disabled providers stop here; their factory is never called.
//! - Enabled providers are constructed via their factory and initialized.
//!   Any failure (no factory, construction error, initialization error,
//!   or a panic in either step) is logged and recorded, and the provider
//!   stays out of the live set.
//!
//! Loading never fails as a whole: the engine starts with however many
//! providers came up.
//!
//! ```text
//!   [providers.openai]   ──► config stored ──► factory ──► initialize() ──► live
//!   [providers.groq]     ──► config stored ──► factory ──► initialize() ✗ ──► failures
//!   [providers.mistral]  ──► config stored (enabled = false)
//!   [providers.gemini]   ──► unknown name, skipped
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::{error, info, instrument, warn};

use super::factory::AdapterFactories;
use super::traits::ProviderAdapter;
use crate::config::ProviderSettings;
use crate::error::panic_message;
use crate::telemetry;
use crate::types::{ProviderConfig, ProviderId};
use crate::{PappusError, Result};

/// A live adapter together with its identity.
#[derive(Clone)]
pub struct ProviderHandle {
    id: ProviderId,
    adapter: Arc<dyn ProviderAdapter>,
}

impl ProviderHandle {
    pub fn new(id: ProviderId, adapter: Arc<dyn ProviderAdapter>) -> Self {
        Self { id, adapter }
    }

    pub fn id(&self) -> ProviderId {
        self.id
    }

    pub fn adapter(&self) -> &Arc<dyn ProviderAdapter> {
        &self.adapter
    }
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderHandle").field("id", &self.id).finish()
    }
}

/// Registry of configured and live providers.
///
/// Iteration over the live set is in [`ProviderId`] declaration order, which
/// is the stable order every selection strategy relies on.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    configs: BTreeMap<ProviderId, ProviderConfig>,
    live: BTreeMap<ProviderId, ProviderHandle>,
    failures: BTreeMap<ProviderId, String>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load raw, name-keyed provider entries (as read from a config file).
    ///
    /// Unknown names are logged and skipped. See the module docs for the
    /// full semantics.
    #[instrument(skip_all)]
    pub async fn load<I, N>(entries: I, factories: &AdapterFactories) -> Self
    where
        I: IntoIterator<Item = (N, ProviderSettings)>,
        N: AsRef<str>,
    {
        info!("initializing providers");
        let mut registry = Self::new();
        for (name, settings) in entries {
            let name = name.as_ref();
            let id = match name.parse::<ProviderId>() {
                Ok(id) => id,
                Err(e) => {
                    warn!(provider = name, error = %e, "skipping provider entry");
                    continue;
                }
            };
            registry.register(settings.into_config(id), factories).await;
        }
        info!(live = registry.live.len(), "initialized providers");
        registry
    }

    /// Load already-typed configs.
    #[instrument(skip_all)]
    pub async fn from_configs<I>(configs: I, factories: &AdapterFactories) -> Self
    where
        I: IntoIterator<Item = ProviderConfig>,
    {
        let mut registry = Self::new();
        for config in configs {
            registry.register(config, factories).await;
        }
        info!(live = registry.live.len(), "initialized providers");
        registry
    }

    /// Store one config and, if enabled, bring its adapter up.
    ///
    /// A later entry for the same provider replaces the earlier one.
    pub async fn register(&mut self, config: ProviderConfig, factories: &AdapterFactories) {
        let id = config.provider;
        if self.configs.contains_key(&id) {
            warn!(provider = %id, "duplicate provider entry, replacing previous");
            self.live.remove(&id);
            self.failures.remove(&id);
        }

        let enabled = config.enabled;
        self.configs.insert(id, config);
        if !enabled {
            info!(provider = %id, "provider disabled, not loading");
            return;
        }

        let Some(config) = self.configs.get(&id) else {
            return;
        };
        match Self::start_adapter(config, factories).await {
            Ok(adapter) => {
                info!(provider = %id, "loaded provider");
                self.live.insert(id, ProviderHandle::new(id, adapter));
            }
            Err(e) => {
                error!(provider = %id, error = %e, "failed to load provider");
                metrics::counter!(telemetry::PROVIDER_LOAD_FAILURES_TOTAL,
                    "provider" => id.as_str(),
                )
                .increment(1);
                self.failures.insert(id, e.to_string());
            }
        }
    }

    /// Construct and initialize one adapter.
    async fn start_adapter(
        config: &ProviderConfig,
        factories: &AdapterFactories,
    ) -> Result<Arc<dyn ProviderAdapter>> {
        let id = config.provider;
        let factory = factories
            .get(id)
            .ok_or_else(|| PappusError::Initialization {
                provider: id,
                message: "no adapter registered".to_string(),
            })?;
        let adapter = panic::catch_unwind(AssertUnwindSafe(|| factory(config)))
            .map_err(|payload| Self::panicked(id, "construction", &*payload))?
            .map_err(|e| Self::init_error(id, e))?;
        AssertUnwindSafe(adapter.initialize())
            .catch_unwind()
            .await
            .map_err(|payload| Self::panicked(id, "initialize()", &*payload))?
            .map_err(|e| Self::init_error(id, e))?;
        Ok(adapter)
    }

    fn panicked(provider: ProviderId, stage: &str, payload: &(dyn Any + Send)) -> PappusError {
        PappusError::Initialization {
            provider,
            message: format!("panic during {stage}: {}", panic_message(payload)),
        }
    }

    fn init_error(provider: ProviderId, e: PappusError) -> PappusError {
        match e {
            e @ PappusError::Initialization { .. } => e,
            other => PappusError::Initialization {
                provider,
                message: other.to_string(),
            },
        }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Live providers in stable order.
    pub fn live(&self) -> impl ExactSizeIterator<Item = &ProviderHandle> {
        self.live.values()
    }

    /// Identities of live providers in stable order.
    pub fn live_ids(&self) -> Vec<ProviderId> {
        self.live.keys().copied().collect()
    }

    /// The live handle for `id`, if it loaded.
    pub fn get(&self, id: ProviderId) -> Option<&ProviderHandle> {
        self.live.get(&id)
    }

    /// The `index`-th live provider in stable order.
    pub fn nth_live(&self, index: usize) -> Option<&ProviderHandle> {
        self.live.values().nth(index)
    }

    /// Stored config for `id`, whether or not it is live.
    pub fn config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.configs.get(&id)
    }

    /// All stored configs in stable order.
    pub fn configs(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.configs.values()
    }

    /// Whether `id` is in the live set.
    pub fn is_live(&self, id: ProviderId) -> bool {
        self.live.contains_key(&id)
    }

    /// Providers that were enabled but failed to load, with the reason.
    pub fn failures(&self) -> &BTreeMap<ProviderId, String> {
        &self.failures
    }

    /// Number of live providers.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no provider is live.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AdapterResponse, ExtraParams};
    use async_trait::async_trait;

    struct StubAdapter;

    #[async_trait]
    impl ProviderAdapter for StubAdapter {
        async fn initialize(&self) -> Result<()> {
            Ok(())
        }

        async fn generate(
            &self,
            prompt: &str,
            _config: &ProviderConfig,
            _extra: &ExtraParams,
        ) -> Result<AdapterResponse> {
            Ok(AdapterResponse::new(prompt, "stub"))
        }

        fn is_connected(&self) -> bool {
            true
        }

        async fn test_connection(&self) -> Result<bool> {
            Ok(true)
        }
    }

    fn stub_factories() -> AdapterFactories {
        let mut factories = AdapterFactories::new();
        for id in ProviderId::ALL {
            factories.register(id, |_| Ok(Arc::new(StubAdapter) as Arc<dyn ProviderAdapter>));
        }
        factories
    }

    #[tokio::test]
    async fn unknown_names_are_skipped() {
        let entries = vec![
            ("gemini", ProviderSettings::default()),
            ("OpenAI", ProviderSettings::default()),
        ];
        let registry = ProviderRegistry::load(entries, &stub_factories()).await;

        assert_eq!(registry.live_ids(), vec![ProviderId::OpenAi]);
        assert_eq!(registry.configs().count(), 1);
    }

    #[tokio::test]
    async fn missing_factory_is_a_load_failure() {
        let registry = ProviderRegistry::from_configs(
            [ProviderConfig::new(ProviderId::Groq)],
            &AdapterFactories::new(),
        )
        .await;

        assert!(registry.is_empty());
        assert!(registry.config(ProviderId::Groq).is_some());
        assert!(registry.failures()[&ProviderId::Groq].contains("no adapter registered"));
    }

    #[tokio::test]
    async fn live_set_iterates_in_declaration_order() {
        let registry = ProviderRegistry::from_configs(
            [
                ProviderConfig::new(ProviderId::Together),
                ProviderConfig::new(ProviderId::DeepSeek),
                ProviderConfig::new(ProviderId::Anthropic),
            ],
            &stub_factories(),
        )
        .await;

        assert_eq!(
            registry.live_ids(),
            vec![ProviderId::DeepSeek, ProviderId::Anthropic, ProviderId::Together]
        );
        assert_eq!(registry.nth_live(1).unwrap().id(), ProviderId::Anthropic);
        assert!(registry.nth_live(3).is_none());
    }

    #[tokio::test]
    async fn duplicate_entry_replaces_previous() {
        let registry = ProviderRegistry::from_configs(
            [
                ProviderConfig::new(ProviderId::Ollama).model("llama3"),
                ProviderConfig::new(ProviderId::Ollama).enabled(false),
            ],
            &stub_factories(),
        )
        .await;

        assert!(!registry.is_live(ProviderId::Ollama));
        let config = registry.config(ProviderId::Ollama).unwrap();
        assert!(!config.enabled);
        assert!(config.model.is_none());
    }
}
