//! Distribution run orchestration.

pub mod orchestrator;

pub use orchestrator::{OrchestrationError, Orchestrator};
