//! The capability interface every backend adapter implements.
//!
//! The engine depends only on [`ProviderAdapter`]; concrete adapters own
//! their transport, authentication and timeouts. An adapter is constructed
//! by its factory, initialized exactly once by the registry, and only then
//! receives traffic.
//!
//! # Example
//!
//! ```ignore
//! struct EchoAdapter;
//!
//! #[async_trait]
//! impl ProviderAdapter for EchoAdapter {
//!     async fn initialize(&self) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     async fn generate(
//!         &self,
//!         prompt: &str,
//!         config: &ProviderConfig,
//!         _extra: &ExtraParams,
//!     ) -> Result<AdapterResponse> {
//!         let model = config.model.clone().unwrap_or_default();
//!         Ok(AdapterResponse::new(prompt, model))
//!     }
//!
//!     fn is_connected(&self) -> bool {
//!         true
//!     }
//!
//!     async fn test_connection(&self) -> Result<bool> {
//!         Ok(true)
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::Result;
use crate::types::{AdapterResponse, ExtraParams, ProviderConfig};

/// A backend capable of producing generated text from a prompt.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// One-time setup (client construction, credential checks, warm-up).
    ///
    /// An error here keeps the provider out of the live set.
    async fn initialize(&self) -> Result<()>;

    /// Generate a completion for `prompt`.
    ///
    /// `config` is the stored provider config with any per-call overrides
    /// already applied. `extra` is forwarded untouched from the caller.
    async fn generate(
        &self,
        prompt: &str,
        config: &ProviderConfig,
        extra: &ExtraParams,
    ) -> Result<AdapterResponse>;

    /// Cheap, non-blocking connectivity check. Must not perform I/O.
    fn is_connected(&self) -> bool;

    /// Active connectivity check. May perform I/O.
    ///
    /// Adapters should report an unreachable backend as `Ok(false)`; an
    /// `Err` is also treated as `false` by the status reporter.
    async fn test_connection(&self) -> Result<bool>;
}
