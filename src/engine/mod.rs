//! Orchestration engine: routing, ensembles and result selection.

mod builder;
mod orchestrator;
pub mod selector;

pub use builder::{Pappus, PappusBuilder};
pub use orchestrator::{DEFAULT_BEST_OF_N, Orchestrator};
pub use selector::{LongestContent, MajorityVote, ResultSelector};
