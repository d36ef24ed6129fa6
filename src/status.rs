//! Read-only status views over the provider registry.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::join_all;
use tracing::{error, instrument};

use crate::error::panic_message;
use crate::providers::ProviderRegistry;
use crate::types::{ProviderId, ProviderStatus};

/// Lists live providers and checks their connectivity.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    registry: Arc<ProviderRegistry>,
}

impl StatusReporter {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Snapshot of every live provider joined with its stored config.
    ///
    /// Uses each adapter's non-blocking `is_connected()`; no network I/O.
    pub fn list(&self) -> Vec<ProviderStatus> {
        self.registry
            .live()
            .filter_map(|handle| {
                let config = self.registry.config(handle.id())?;
                Some(ProviderStatus {
                    provider: handle.id(),
                    enabled: config.enabled,
                    model: config.model.clone(),
                    status: handle.adapter().is_connected().into(),
                    priority: config.priority,
                })
            })
            .collect()
    }

    /// Actively check every live provider, concurrently.
    ///
    /// A check that errors or panics is logged and reported as `false`; it
    /// never affects the other checks. Every live provider appears in the result.
    #[instrument(skip(self))]
    pub async fn test_all(&self) -> BTreeMap<ProviderId, bool> {
        let checks = self.registry.live().map(|handle| async move {
            let id = handle.id();
            let check = AssertUnwindSafe(handle.adapter().test_connection()).catch_unwind();
            let ok = match check.await {
                Ok(Ok(ok)) => ok,
                Ok(Err(e)) => {
                    error!(provider = %id, error = %e, "connection test failed");
                    false
                }
                Err(payload) => {
                    error!(
                        provider = %id,
                        panic = %panic_message(&*payload),
                        "connection test panicked"
                    );
                    false
                }
            };
            (id, ok)
        });
        join_all(checks).await.into_iter().collect()
    }
}
