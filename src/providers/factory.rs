//! Startup table mapping provider identities to adapter constructors.
//!
//! This replaces any name-based module lookup: a provider can only be
//! loaded if a factory for its [`ProviderId`] was registered here.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::traits::ProviderAdapter;
use crate::Result;
use crate::types::{ProviderConfig, ProviderId};

/// Constructs an adapter from its stored config.
///
/// Construction should be cheap and side-effect free; expensive setup
/// belongs in [`ProviderAdapter::initialize`].
pub type AdapterFactory =
    Arc<dyn Fn(&ProviderConfig) -> Result<Arc<dyn ProviderAdapter>> + Send + Sync>;

/// Registered adapter factories, one per provider identity.
#[derive(Clone, Default)]
pub struct AdapterFactories {
    factories: BTreeMap<ProviderId, AdapterFactory>,
}

impl AdapterFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `provider`.
    pub fn register<F>(&mut self, provider: ProviderId, factory: F)
    where
        F: Fn(&ProviderConfig) -> Result<Arc<dyn ProviderAdapter>> + Send + Sync + 'static,
    {
        self.factories.insert(provider, Arc::new(factory));
    }

    pub fn get(&self, provider: ProviderId) -> Option<&AdapterFactory> {
        self.factories.get(&provider)
    }
}

impl fmt::Debug for AdapterFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterFactories")
            .field("providers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
