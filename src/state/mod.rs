//! View state machine
//!
//! INPUT → LOADING → RESULT | ERROR → INPUT
//!
//! One `ViewSession` per browser session. The state is a tagged enum so a
//! session can never hold a report and an error at the same time, and
//! `Loading` is the only admission gate: while it is active, submit is
//! ignored.

use crate::error::GenerationError;
use crate::models::StrategyReport;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

pub mod store;
pub use store::SessionStore;

/// Shown to the user for every generation failure
pub const GENERIC_ERROR_MESSAGE: &str =
    "Ocurrió un error al generar la estrategia. Por favor, intenta de nuevo.";

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Input,
    Loading { ticket_id: u64 },
    Result(Arc<StrategyReport>),
    Error { message: String },
}

/// Which view to render
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ViewPhase {
    Input,
    Loading,
    Result,
    Error,
}

impl ViewState {
    pub fn phase(&self) -> ViewPhase {
        match self {
            ViewState::Input => ViewPhase::Input,
            ViewState::Loading { .. } => ViewPhase::Loading,
            ViewState::Result(_) => ViewPhase::Result,
            ViewState::Error { .. } => ViewPhase::Error,
        }
    }
}

/// Outcome of a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Transition {
    Applied,
    Ignored,
}

/// Issued on submit; the result must come back with the same id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    pub id: u64,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct ViewSession {
    state: ViewState,
    input_text: String,
    last_ticket: u64,
}

impl ViewSession {
    pub fn new() -> Self {
        Self {
            state: ViewState::Input,
            input_text: String::new(),
            last_ticket: 0,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn phase(&self) -> ViewPhase {
        self.state.phase()
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn report(&self) -> Option<&Arc<StrategyReport>> {
        match &self.state {
            ViewState::Result(report) => Some(report),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            ViewState::Error { message } => Some(message),
            _ => None,
        }
    }

    /// Submit is offered only from `Input` with non-blank text
    pub fn can_submit(&self) -> bool {
        self.state == ViewState::Input && !self.input_text.trim().is_empty()
    }

    /// Edit the description; only the input form accepts text
    pub fn set_input(&mut self, text: impl Into<String>) -> Transition {
        if self.state != ViewState::Input {
            return Transition::Ignored;
        }
        self.input_text = text.into();
        Transition::Applied
    }

    /// Input → Loading. Returns the ticket for the request to issue, or
    /// `None` when the submission is ignored.
    pub fn submit(&mut self) -> Option<GenerationTicket> {
        if !self.can_submit() {
            debug!(phase = ?self.phase(), "Submit ignored");
            return None;
        }

        self.last_ticket += 1;
        self.state = ViewState::Loading {
            ticket_id: self.last_ticket,
        };

        Some(GenerationTicket {
            id: self.last_ticket,
            description: self.input_text.clone(),
        })
    }

    /// Loading → Result | Error. Outcomes for any other ticket are stale
    /// and dropped without touching the state.
    pub fn complete(
        &mut self,
        ticket_id: u64,
        outcome: crate::Result<StrategyReport>,
    ) -> Transition {
        match self.state {
            ViewState::Loading { ticket_id: current } if current == ticket_id => {}
            _ => {
                debug!(ticket_id, phase = ?self.phase(), "Discarding stale generation result");
                return Transition::Ignored;
            }
        }

        self.state = match outcome {
            Ok(report) => {
                info!(ticket_id, company = %report.company_name, "Strategy ready");
                ViewState::Result(Arc::new(report))
            }
            Err(e) => {
                log_failure(ticket_id, &e);
                ViewState::Error {
                    message: GENERIC_ERROR_MESSAGE.to_string(),
                }
            }
        };

        Transition::Applied
    }

    /// Result → Input, clearing both the report and the description
    pub fn reset(&mut self) -> Transition {
        if !matches!(self.state, ViewState::Result(_)) {
            return Transition::Ignored;
        }
        self.state = ViewState::Input;
        self.input_text.clear();
        Transition::Applied
    }

    /// Error → Input, keeping the description for another attempt
    pub fn retry(&mut self) -> Transition {
        if !matches!(self.state, ViewState::Error { .. }) {
            return Transition::Ignored;
        }
        self.state = ViewState::Input;
        Transition::Applied
    }
}

impl Default for ViewSession {
    fn default() -> Self {
        Self::new()
    }
}

fn log_failure(ticket_id: u64, e: &GenerationError) {
    error!(
        ticket_id,
        kind = e.kind(),
        error = %e,
        "Strategy generation failed, showing generic error"
    );
}
