//! Pappus error types

use std::any::Any;
use std::fmt;
use std::time::Duration;

use crate::types::ProviderId;

/// Pappus error types
#[derive(Debug, thiserror::Error)]
pub enum PappusError {
    // Startup errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to initialize provider {provider}: {message}")]
    Initialization {
        provider: ProviderId,
        message: String,
    },

    // Adapter errors, passed through to the caller unchanged
    #[error("request to {provider} failed: {message}")]
    Request {
        provider: ProviderId,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    /// Every member of an ensemble call failed.
    #[error("all {} providers failed: {}", .failures.len(), FailureList(.failures))]
    AllProvidersFailed { failures: Vec<ProviderFailure> },

    /// A spawned ensemble call panicked or was aborted.
    #[error("task for {provider} did not complete: {message}")]
    TaskFailed {
        provider: ProviderId,
        message: String,
    },

    // Usage errors, raised before anything is dispatched
    #[error("provider {0} not available")]
    ProviderUnavailable(ProviderId),

    #[error("no providers available")]
    NoProvidersAvailable,

    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PappusError {
    /// Whether this error was raised by request validation rather than by a provider.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            PappusError::ProviderUnavailable(_)
                | PappusError::NoProvidersAvailable
                | PappusError::UnknownStrategy(_)
                | PappusError::InvalidInput(_)
        )
    }

    /// Individual causes of an ensemble failure (empty for other variants).
    pub fn failures(&self) -> &[ProviderFailure] {
        match self {
            PappusError::AllProvidersFailed { failures } => failures,
            _ => &[],
        }
    }
}

/// One failed member of an ensemble call.
#[derive(Debug)]
pub struct ProviderFailure {
    pub provider: ProviderId,
    pub error: PappusError,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

struct FailureList<'a>(&'a [ProviderFailure]);

impl fmt::Display for FailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

/// Render a caught panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

/// Result type alias for Pappus operations
pub type Result<T> = std::result::Result<T, PappusError>;
