//! Telemetry metric name constants.
//!
//! Centralised metric names for pappus operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `pappus_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: provider identity (e.g. "openai", "ollama")
//! - `strategy`: dispatch mode: "direct", "load_balanced", "best_of_n", "consensus"
//! - `status`: outcome: "ok" or "error"
//! - `counter`: usage counter name as reported by the adapter

/// Total adapter calls dispatched by the orchestrator.
///
/// Labels: `provider`, `strategy`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "pappus_requests_total";

/// Adapter call duration in seconds.
///
/// Labels: `provider`, `strategy`.
pub const REQUEST_DURATION_SECONDS: &str = "pappus_request_duration_seconds";

/// Token counters reported by adapters.
///
/// Labels: `provider`, `counter`.
pub const TOKENS_TOTAL: &str = "pappus_tokens_total";

/// Providers that failed to load at startup.
///
/// Labels: `provider`.
pub const PROVIDER_LOAD_FAILURES_TOTAL: &str = "pappus_provider_load_failures_total";

/// Failed members of ensemble calls.
///
/// Labels: `provider`, `strategy`.
pub const ENSEMBLE_FAILURES_TOTAL: &str = "pappus_ensemble_failures_total";
