//! Public types for the Pappus API.

mod generate;
mod options;
mod parameter;
mod provider;
mod status;

pub use generate::{AdapterResponse, GenerationRequest, GenerationResult, Strategy, Usage};
pub use options::{ConfigOverrides, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, ProviderConfig};
pub use parameter::{ExtraParams, ParamValue};
pub use provider::ProviderId;
pub use status::{ConnectionStatus, ProviderStatus};
