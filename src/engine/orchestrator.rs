//! The orchestration engine.
//!
//! [`Orchestrator::generate`] implements one uniform contract over every
//! live provider:
//!
//! - **Direct**: the request names a provider. It must be live; the call
//!   runs with the stored config plus any per-call overrides. Adapter
//!   errors reach the caller unchanged.
//! - **Load-balanced**: one provider per request, chosen by a shared
//!   round-robin cursor over the live set.
//! - **Best-of-N**: the first N live providers are queried concurrently and
//!   the configured [`ResultSelector`] picks the winner.
//! - **Consensus**: like best-of-N (N defaults to every live provider) but
//!   the winner is chosen by [`MajorityVote`].
//!
//! # Ensemble Flow
//!
//! ```text
//!            generate(best_of_n, n = 3)
//!                       │
//!        ┌──────────────┼──────────────┐  spawn, none waits for another
//!        ▼              ▼              ▼
//!    deepseek        openai          groq
//!        │              │              ✗  (error recorded, siblings continue)
//!        └──────────────┼──────────────┘  join all, never first-wins
//!                       ▼
//!            ResultSelector over successes
//!            (all failed ──► AllProvidersFailed)
//! ```
//!
//! Ensemble members run as detached tokio tasks, so they finish even if
//! the caller stops waiting. No retries and no timeouts are applied here;
//! both belong to the adapters.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use futures_util::future::join_all;
use tracing::{Instrument, debug, instrument, warn};

use super::selector::{LongestContent, MajorityVote, ResultSelector};
use crate::error::ProviderFailure;
use crate::providers::{ProviderHandle, ProviderRegistry};
use crate::status::StatusReporter;
use crate::telemetry;
use crate::types::{
    ConfigOverrides, ExtraParams, GenerationRequest, GenerationResult, ProviderConfig,
    ProviderId, Strategy, Usage,
};
use crate::{PappusError, Result};

/// Ensemble width used when neither the request nor the builder sets one.
pub const DEFAULT_BEST_OF_N: usize = 3;

/// Dispatches generation requests across the live providers.
///
/// Share one instance (behind an `Arc`) between callers: the round-robin
/// cursor is per-instance.
pub struct Orchestrator {
    registry: Arc<ProviderRegistry>,
    cursor: AtomicU64,
    selector: Arc<dyn ResultSelector>,
    default_strategy: Strategy,
    best_of_n: usize,
}

impl Orchestrator {
    /// Create an orchestrator over a loaded registry with default settings.
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            cursor: AtomicU64::new(0),
            selector: Arc::new(LongestContent),
            default_strategy: Strategy::default(),
            best_of_n: DEFAULT_BEST_OF_N,
        }
    }

    /// Replace the best-of-N result selector.
    pub fn with_selector(mut self, selector: Arc<dyn ResultSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Strategy used when a request sets neither provider nor strategy.
    pub fn with_default_strategy(mut self, strategy: Strategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    /// Ensemble width used when a best-of-N request does not set `n`.
    pub fn with_best_of_n(mut self, n: usize) -> Self {
        self.best_of_n = n.max(1);
        self
    }

    /// The underlying registry.
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Read-only status views over the registry.
    pub fn status(&self) -> StatusReporter {
        StatusReporter::new(self.registry.clone())
    }

    /// Current value of the round-robin cursor.
    pub fn cursor(&self) -> u64 {
        self.cursor.load(Ordering::Relaxed)
    }

    /// Strategy applied to requests that set neither provider nor strategy.
    pub fn default_strategy(&self) -> Strategy {
        self.default_strategy
    }

    // ========================================================================
    // generate
    // ========================================================================

    /// Generate a completion according to the request's routing.
    ///
    /// Usage errors (`InvalidInput`, `ProviderUnavailable`,
    /// `NoProvidersAvailable`) are raised before any adapter is touched.
    #[instrument(
        skip(self, request),
        fields(provider = ?request.provider, strategy = ?request.strategy)
    )]
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult> {
        if request.prompt.is_empty() {
            return Err(PappusError::InvalidInput("prompt must not be empty".into()));
        }
        if request.n == Some(0) {
            return Err(PappusError::InvalidInput("n must be at least 1".into()));
        }

        let GenerationRequest {
            prompt,
            provider,
            overrides,
            strategy,
            n,
            extra,
        } = request;
        let prompt: Arc<str> = prompt.into();
        let extra = Arc::new(extra);

        if let Some(id) = provider {
            let (handle, config) = self.resolve(id, &overrides)?;
            return call_provider(handle, config, prompt, extra, "direct").await;
        }

        match strategy.unwrap_or(self.default_strategy) {
            Strategy::LoadBalanced => {
                let (handle, config) = self.next_in_rotation(&overrides)?;
                call_provider(handle, config, prompt, extra, Strategy::LoadBalanced.as_str())
                    .await
            }
            Strategy::BestOfN => {
                let width = n.unwrap_or(self.best_of_n);
                let results = self
                    .fan_out(width, &overrides, prompt, extra, Strategy::BestOfN)
                    .await?;
                Ok(self.pick(self.selector.as_ref(), results))
            }
            Strategy::Consensus => {
                let width = n.unwrap_or(self.registry.len());
                let results = self
                    .fan_out(width, &overrides, prompt, extra, Strategy::Consensus)
                    .await?;
                Ok(self.pick(&MajorityVote, results))
            }
        }
    }

    /// Look up a live provider and derive its per-call config.
    fn resolve(
        &self,
        id: ProviderId,
        overrides: &ConfigOverrides,
    ) -> Result<(ProviderHandle, ProviderConfig)> {
        let handle = self
            .registry
            .get(id)
            .ok_or(PappusError::ProviderUnavailable(id))?;
        let config = self
            .registry
            .config(id)
            .ok_or(PappusError::ProviderUnavailable(id))?
            .with_overrides(overrides);
        Ok((handle.clone(), config))
    }

    /// Advance the round-robin cursor and return the provider it lands on.
    fn next_in_rotation(
        &self,
        overrides: &ConfigOverrides,
    ) -> Result<(ProviderHandle, ProviderConfig)> {
        let live = self.registry.len();
        if live == 0 {
            return Err(PappusError::NoProvidersAvailable);
        }
        let ticket = self.cursor.fetch_add(1, Ordering::Relaxed);
        let index = (ticket % live as u64) as usize;
        let id = self
            .registry
            .nth_live(index)
            .map(ProviderHandle::id)
            .ok_or(PappusError::NoProvidersAvailable)?;
        debug!(ticket, index, provider = %id, "round-robin selection");
        self.resolve(id, overrides)
    }

    /// Query the first `width` live providers concurrently and wait for all
    /// of them. Returns the successes in stable order, or
    /// `AllProvidersFailed` if there were none.
    async fn fan_out(
        &self,
        width: usize,
        overrides: &ConfigOverrides,
        prompt: Arc<str>,
        extra: Arc<ExtraParams>,
        strategy: Strategy,
    ) -> Result<Vec<GenerationResult>> {
        if self.registry.is_empty() {
            return Err(PappusError::NoProvidersAvailable);
        }

        // Resolve every member before spawning any of them.
        let members = self
            .registry
            .live()
            .take(width)
            .map(|handle| self.resolve(handle.id(), overrides))
            .collect::<Result<Vec<_>>>()?;

        let mut tasks = Vec::with_capacity(members.len());
        for (handle, config) in members {
            let id = handle.id();
            let task = tokio::spawn(
                call_provider(
                    handle,
                    config,
                    prompt.clone(),
                    extra.clone(),
                    strategy.as_str(),
                )
                .in_current_span(),
            );
            tasks.push(async move { (id, task.await) });
        }
        debug!(members = tasks.len(), %strategy, "dispatched ensemble");

        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for (provider, outcome) in join_all(tasks).await {
            let error = match outcome {
                Ok(Ok(result)) => {
                    successes.push(result);
                    continue;
                }
                Ok(Err(e)) => e,
                Err(join_err) => PappusError::TaskFailed {
                    provider,
                    message: join_err.to_string(),
                },
            };
            debug!(provider = %provider, error = %error, %strategy, "ensemble member failed");
            metrics::counter!(telemetry::ENSEMBLE_FAILURES_TOTAL,
                "provider" => provider.as_str(),
                "strategy" => strategy.as_str(),
            )
            .increment(1);
            failures.push(ProviderFailure { provider, error });
        }

        if successes.is_empty() {
            return Err(PappusError::AllProvidersFailed { failures });
        }
        Ok(successes)
    }

    fn pick(
        &self,
        selector: &dyn ResultSelector,
        mut candidates: Vec<GenerationResult>,
    ) -> GenerationResult {
        let mut index = selector.select(&candidates);
        if index >= candidates.len() {
            warn!(
                index,
                candidates = candidates.len(),
                selector = selector.name(),
                "selector returned out-of-range index, using first candidate"
            );
            index = 0;
        }
        debug!(
            selector = selector.name(),
            provider = %candidates[index].provider,
            candidates = candidates.len(),
            "selected ensemble result"
        );
        candidates.swap_remove(index)
    }
}

/// Time one adapter call and normalize its response.
///
/// Free-standing (owned arguments) so ensemble members can run as spawned
/// tasks.
async fn call_provider(
    handle: ProviderHandle,
    config: ProviderConfig,
    prompt: Arc<str>,
    extra: Arc<ExtraParams>,
    strategy: &'static str,
) -> Result<GenerationResult> {
    let id = handle.id();
    let start = Instant::now();
    let outcome = handle.adapter().generate(&prompt, &config, &extra).await;
    let latency = start.elapsed();

    match outcome {
        Ok(response) => {
            record_request(id, strategy, latency.as_secs_f64(), true);
            record_token_usage(id, &response.usage);
            Ok(GenerationResult::from_adapter(id, response, latency))
        }
        Err(e) => {
            record_request(id, strategy, latency.as_secs_f64(), false);
            warn!(provider = %id, error = %e, "error generating");
            Err(e)
        }
    }
}

// ============================================================================
// Metrics recording
// ============================================================================

/// Record request outcome metrics (counter + histogram).
fn record_request(provider: ProviderId, strategy: &'static str, elapsed: f64, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "provider" => provider.as_str(),
        "strategy" => strategy,
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
        "provider" => provider.as_str(),
        "strategy" => strategy,
    )
    .record(elapsed);
}

/// Record token counters reported by the adapter.
fn record_token_usage(provider: ProviderId, usage: &Usage) {
    for (counter, value) in usage.iter() {
        metrics::counter!(telemetry::TOKENS_TOTAL,
            "provider" => provider.as_str(),
            "counter" => counter.to_owned(),
        )
        .increment(value);
    }
}
