//! In-memory session hosting
//!
//! Holds every live `ViewSession` and runs submitted generations in the
//! background. Nothing is persisted; a session lives until it is removed
//! or sits idle past the TTL.

use super::{GenerationTicket, Transition, ViewPhase, ViewSession};
use crate::error::SessionError;
use crate::models::StrategyReport;
use crate::orchestrator::StrategyOrchestrator;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Snapshot of a session, as served to the UI
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub state: ViewPhase,
    pub input_text: String,
    pub can_submit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Arc<StrategyReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl SessionView {
    fn of(session_id: Uuid, session: &ViewSession) -> Self {
        Self {
            session_id,
            state: session.phase(),
            input_text: session.input_text().to_string(),
            can_submit: session.can_submit(),
            report: session.report().cloned(),
            error_message: session.error_message().map(str::to_string),
        }
    }
}

/// Result of a submit request
pub struct Submission {
    pub view: SessionView,
    /// Background generation, when one was started
    pub task: Option<JoinHandle<()>>,
}

struct SessionEntry {
    session: ViewSession,
    last_seen: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            session: ViewSession::new(),
            last_seen: Instant::now(),
        }
    }

    /// Record client activity and hand out the session
    fn touch(&mut self) -> &mut ViewSession {
        self.last_seen = Instant::now();
        &mut self.session
    }
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    orchestrator: Arc<StrategyOrchestrator>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(orchestrator: Arc<StrategyOrchestrator>) -> Self {
        Self::with_idle_ttl(orchestrator, DEFAULT_IDLE_TTL)
    }

    /// Sessions untouched for longer than `idle_ttl` are evicted by the sweeper
    pub fn with_idle_ttl(orchestrator: Arc<StrategyOrchestrator>, idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            orchestrator,
            idle_ttl,
        }
    }

    pub fn orchestrator(&self) -> &Arc<StrategyOrchestrator> {
        &self.orchestrator
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn create(&self) -> SessionView {
        let session_id = Uuid::new_v4();
        let entry = SessionEntry::new();
        let view = SessionView::of(session_id, &entry.session);

        self.sessions.write().await.insert(session_id, entry);
        info!(%session_id, "Session created");

        view
    }

    pub async fn view(&self, session_id: Uuid) -> Result<SessionView, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = Self::touch(&mut sessions, session_id)?;
        Ok(SessionView::of(session_id, session))
    }

    /// Borrow the current report, if the session is showing one
    pub async fn report(&self, session_id: Uuid) -> Result<Arc<StrategyReport>, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = Self::touch(&mut sessions, session_id)?;

        session.report().cloned().ok_or(SessionError::InvalidTransition {
            action: "view report",
            phase: session.phase(),
        })
    }

    /// Tear a session down. Any request still in flight for it is discarded
    /// when it finishes.
    pub async fn remove(&self, session_id: Uuid) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .remove(&session_id)
            .map(|_| info!(%session_id, "Session removed"))
            .ok_or(SessionError::NotFound(session_id))
    }

    /// Drop every session idle for longer than the TTL. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|session_id, entry| {
            let keep = now.duration_since(entry.last_seen) <= self.idle_ttl;
            if !keep {
                debug!(%session_id, phase = ?entry.session.phase(), "Evicting idle session");
            }
            keep
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Idle sessions evicted");
        }
        evicted
    }

    /// Run `evict_idle` periodically for the life of the process
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let store = self.clone();
        let every = (self.idle_ttl / 4).max(MIN_SWEEP_INTERVAL);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                store.evict_idle().await;
            }
        })
    }

    pub async fn set_input(
        &self,
        session_id: Uuid,
        text: String,
    ) -> Result<SessionView, SessionError> {
        self.apply(session_id, "edit input", |s| s.set_input(text))
            .await
    }

    pub async fn reset(&self, session_id: Uuid) -> Result<SessionView, SessionError> {
        self.apply(session_id, "reset", ViewSession::reset).await
    }

    pub async fn retry(&self, session_id: Uuid) -> Result<SessionView, SessionError> {
        self.apply(session_id, "retry", ViewSession::retry).await
    }

    /// Input → Loading and start the generation in the background.
    ///
    /// Blank input or an outstanding request makes this a no-op; the
    /// unchanged view is returned and no task is started.
    pub async fn submit(&self, session_id: Uuid) -> Result<Submission, SessionError> {
        let (ticket, view) = {
            let mut sessions = self.sessions.write().await;
            let session = Self::touch(&mut sessions, session_id)?;
            let ticket = session.submit();
            (ticket, SessionView::of(session_id, session))
        };

        let task = ticket.map(|ticket| {
            info!(%session_id, ticket_id = ticket.id, "Generation submitted");
            let store = self.clone();
            tokio::spawn(async move { store.run_generation(session_id, ticket).await })
        });

        Ok(Submission { view, task })
    }

    async fn run_generation(&self, session_id: Uuid, ticket: GenerationTicket) {
        let outcome = self
            .orchestrator
            .generate_report(&ticket.description)
            .await;

        let mut sessions = self.sessions.write().await;
        let Some(entry) = sessions.get_mut(&session_id) else {
            debug!(
                %session_id,
                ticket_id = ticket.id,
                "Session gone before generation finished, discarding result"
            );
            return;
        };

        if entry.session.complete(ticket.id, outcome) == Transition::Ignored {
            warn!(
                %session_id,
                ticket_id = ticket.id,
                phase = ?entry.session.phase(),
                "Generation result arrived for a request the session moved past"
            );
        }
    }

    fn touch(
        sessions: &mut HashMap<Uuid, SessionEntry>,
        session_id: Uuid,
    ) -> Result<&mut ViewSession, SessionError> {
        sessions
            .get_mut(&session_id)
            .map(SessionEntry::touch)
            .ok_or(SessionError::NotFound(session_id))
    }

    async fn apply<F>(
        &self,
        session_id: Uuid,
        action: &'static str,
        trigger: F,
    ) -> Result<SessionView, SessionError>
    where
        F: FnOnce(&mut ViewSession) -> Transition,
    {
        let mut sessions = self.sessions.write().await;
        let session = Self::touch(&mut sessions, session_id)?;

        match trigger(&mut *session) {
            Transition::Applied => Ok(SessionView::of(session_id, session)),
            Transition::Ignored => Err(SessionError::InvalidTransition {
                action,
                phase: session.phase(),
            }),
        }
    }
}
