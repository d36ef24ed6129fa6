//! Builder for configuring orchestrator instances

use std::sync::Arc;

use super::Orchestrator;
use super::selector::ResultSelector;
use crate::config::Config;
use crate::providers::{AdapterFactories, ProviderAdapter, ProviderRegistry};
use crate::types::{ProviderConfig, ProviderId, Strategy};
use crate::{PappusError, Result};

/// Main entry point for creating orchestrator instances.
pub struct Pappus;

impl Pappus {
    /// Create a new builder for configuring the orchestrator.
    pub fn builder() -> PappusBuilder {
        PappusBuilder::new()
    }
}

/// Builder for configuring orchestrator instances.
///
/// Providers come from two places: name-keyed entries of a loaded
/// [`Config`] and typed [`ProviderConfig`]s added with
/// [`provider`](Self::provider). Config entries load first.
pub struct PappusBuilder {
    config: Config,
    providers: Vec<ProviderConfig>,
    factories: AdapterFactories,
    selector: Option<Arc<dyn ResultSelector>>,
    default_strategy: Option<Strategy>,
    best_of_n: Option<usize>,
}

impl PappusBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            providers: Vec::new(),
            factories: AdapterFactories::new(),
            selector: None,
            default_strategy: None,
            best_of_n: None,
        }
    }

    /// Use a loaded configuration (provider entries and engine defaults).
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Add a typed provider config.
    pub fn provider(mut self, config: ProviderConfig) -> Self {
        self.providers.push(config);
        self
    }

    /// Register the adapter factory for a provider.
    pub fn adapter<F>(mut self, provider: ProviderId, factory: F) -> Self
    where
        F: Fn(&ProviderConfig) -> Result<Arc<dyn ProviderAdapter>> + Send + Sync + 'static,
    {
        self.factories.register(provider, factory);
        self
    }

    /// Replace the whole factory table.
    pub fn factories(mut self, factories: AdapterFactories) -> Self {
        self.factories = factories;
        self
    }

    /// Set the best-of-N result selector (default: longest content).
    pub fn selector(mut self, selector: impl ResultSelector + 'static) -> Self {
        self.selector = Some(Arc::new(selector));
        self
    }

    /// Override the configured default strategy.
    pub fn default_strategy(mut self, strategy: Strategy) -> Self {
        self.default_strategy = Some(strategy);
        self
    }

    /// Override the configured best-of-N width.
    pub fn best_of_n(mut self, n: usize) -> Self {
        self.best_of_n = Some(n);
        self
    }

    /// Load and initialize providers, then build the orchestrator.
    ///
    /// Provider load failures never fail the build; the orchestrator simply
    /// starts with fewer live providers.
    pub async fn build(self) -> Result<Orchestrator> {
        let best_of_n = self.best_of_n.unwrap_or(self.config.engine.best_of_n);
        if best_of_n == 0 {
            return Err(PappusError::Configuration(
                "best_of_n must be at least 1".to_string(),
            ));
        }
        let default_strategy = self
            .default_strategy
            .unwrap_or(self.config.engine.default_strategy);

        let mut registry = ProviderRegistry::load(self.config.providers, &self.factories).await;
        for config in self.providers {
            registry.register(config, &self.factories).await;
        }

        let mut orchestrator = Orchestrator::new(registry)
            .with_default_strategy(default_strategy)
            .with_best_of_n(best_of_n);
        if let Some(selector) = self.selector {
            orchestrator = orchestrator.with_selector(selector);
        }
        Ok(orchestrator)
    }
}

impl Default for PappusBuilder {
    fn default() -> Self {
        Self::new()
    }
}
