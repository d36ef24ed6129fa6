//! Pappus - Provider orchestration engine for LLM backends
//!
//! This crate routes text-generation requests across a set of independently
//! configured providers. Callers get one uniform `generate` contract whether
//! they target a single provider, rotate across all of them, or fan out to
//! several at once and keep the best or majority answer.
//!
//! Concrete backends are not part of this crate: they implement
//! [`ProviderAdapter`] and are registered as factories on the builder.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pappus::{Config, GenerationRequest, Pappus, ProviderId, Strategy};
//!
//! #[tokio::main]
//! async fn main() -> pappus::Result<()> {
//!     let orchestrator = Pappus::builder()
//!         .config(Config::load(None)?)
//!         .adapter(ProviderId::OpenAi, |config| {
//!             Ok(Arc::new(MyOpenAiAdapter::new(config)) as Arc<dyn pappus::ProviderAdapter>)
//!         })
//!         .build()
//!         .await?;
//!
//!     let result = orchestrator
//!         .generate(GenerationRequest::new("Name three moons of Jupiter.").strategy(Strategy::BestOfN))
//!         .await?;
//!
//!     println!("{} ({}): {}", result.provider, result.model, result.content);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod providers;
pub mod status;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use config::{Config, EngineConfig, ProviderSettings};
pub use dispatch::{ToolCall, ToolDispatcher, ToolResult};
pub use engine::{
    DEFAULT_BEST_OF_N, LongestContent, MajorityVote, Orchestrator, Pappus, PappusBuilder,
    ResultSelector,
};
pub use error::{PappusError, ProviderFailure, Result};
pub use providers::{AdapterFactories, ProviderAdapter, ProviderRegistry};
pub use status::StatusReporter;

// Re-export all types
pub use types::{
    AdapterResponse, ConfigOverrides, ConnectionStatus, ExtraParams, GenerationRequest,
    GenerationResult, ParamValue, ProviderConfig, ProviderId, ProviderStatus, Strategy, Usage,
};
