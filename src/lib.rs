//! GenAI Strategy Consultant
//!
//! Turns a free-text company description into a structured GenAI adoption
//! strategy:
//! - Builds a consultant prompt and sends it to Gemini with a strict schema
//! - Validates the reply into a typed `StrategyReport` (complete or rejected)
//! - Drives each browser session through a four-state view machine
//! - Serves sessions and dashboard tabs over HTTP
//!
//! FLOW:
//! INPUT → LOADING → RESULT | ERROR → INPUT

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gemini;
pub mod models;
pub mod orchestrator;
pub mod provider;
pub mod schema;
pub mod state;

pub use error::Result;

// Re-export common types
pub use error::GenerationError;
pub use models::*;
pub use orchestrator::StrategyOrchestrator;
pub use state::{ViewPhase, ViewSession, ViewState};
