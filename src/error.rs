//! Error types for the strategy consultant

use crate::state::ViewPhase;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for generation operations
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Every way a strategy generation can fail.
///
/// Callers that face end users collapse all three kinds into a single
/// generic message; the variant and its cause are kept for logging.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Empty response from generative model")]
    EmptyResponse,

    #[error("Malformed strategy payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Transport failure: {0}")]
    TransportFailure(#[from] TransportError),
}

impl GenerationError {
    /// Stable label used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::EmptyResponse => "empty_response",
            GenerationError::MalformedPayload(_) => "malformed_payload",
            GenerationError::TransportFailure(_) => "transport_failure",
        }
    }
}

/// Network or provider-side fault, with the underlying cause retained.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::TransportFailure(TransportError::Http(err))
    }
}

/// Startup configuration problems
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY (or API_KEY) is not set")]
    MissingApiKey,

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Session lookup and trigger errors surfaced by the API
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(Uuid),

    #[error("Cannot {action} while in {phase:?} state")]
    InvalidTransition {
        action: &'static str,
        phase: ViewPhase,
    },
}
