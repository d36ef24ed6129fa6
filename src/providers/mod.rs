//! Provider adapters and the registry that loads them.
//!
//! Concrete backends live outside this crate. They implement
//! [`ProviderAdapter`] and are handed to the registry as factories keyed by
//! [`ProviderId`](crate::types::ProviderId).

pub mod factory;
pub mod registry;
pub mod traits;

pub use factory::{AdapterFactories, AdapterFactory};
pub use registry::{ProviderHandle, ProviderRegistry};
pub use traits::ProviderAdapter;
