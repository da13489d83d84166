//! Session guard for the single analyze request.
//!
//! The request-issuing transition only fires from `Idle`, so once a subject
//! has been accepted every later activation is a no-op for the rest of the
//! session. The transition happens synchronously in [`SessionGuard::begin`],
//! before the request is awaited.

use super::navigation::{NavigationGuard, NavigationHost, NavigationOutcome, UnloadPolicy};
use crate::error::TransportError;
use crate::transport::Transport;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle of the analyze request.
#[derive(Debug, Clone)]
pub enum SessionState {
    Idle,
    Loading { subject: String },
    /// The report exactly as the service returned it.
    Loaded(Value),
    Failed(TransportError),
}

/// Payload-free view of [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "idle"),
            SessionPhase::Loading => write!(f, "loading"),
            SessionPhase::Loaded => write!(f, "loaded"),
            SessionPhase::Failed => write!(f, "failed"),
        }
    }
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Idle => SessionPhase::Idle,
            SessionState::Loading { .. } => SessionPhase::Loading,
            SessionState::Loaded(_) => SessionPhase::Loaded,
            SessionState::Failed(_) => SessionPhase::Failed,
        }
    }

    pub fn report(&self) -> Option<&Value> {
        match self {
            SessionState::Loaded(report) => Some(report),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TransportError> {
        match self {
            SessionState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Proof that the `Idle -> Loading` transition fired. Only [`SessionGuard::begin`]
/// hands these out.
#[derive(Debug)]
pub struct AnalyzeTicket {
    subject: String,
}

impl AnalyzeTicket {
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Owns the analyze lifecycle and navigation protection for one mount.
pub struct SessionGuard {
    transport: Arc<dyn Transport>,
    state: SessionState,
    transitions: Vec<SessionPhase>,
    navigation: NavigationGuard,
}

impl SessionGuard {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            state: SessionState::Idle,
            transitions: vec![SessionPhase::Idle],
            navigation: NavigationGuard::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    pub fn is_loading(&self) -> bool {
        self.phase() == SessionPhase::Loading
    }

    /// Every phase the guard has been in, oldest first.
    pub fn transitions(&self) -> &[SessionPhase] {
        &self.transitions
    }

    fn transition(&mut self, next: SessionState) {
        let phase = next.phase();
        debug!("Session {} -> {}", self.state.phase(), phase);
        self.state = next;
        self.transitions.push(phase);
    }

    /// Fire `Idle -> Loading` if a subject is present and the guard is idle.
    ///
    /// Returns `None` for a missing or blank subject and for any call after
    /// the first accepted one.
    pub fn begin(&mut self, subject: Option<&str>) -> Option<AnalyzeTicket> {
        let subject = match subject.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => {
                debug!("No subject; analyze request not issued");
                return None;
            }
        };

        if self.phase() != SessionPhase::Idle {
            debug!("Analyze already issued; ignoring activation in {} state", self.phase());
            return None;
        }

        info!("Starting analysis for {}", subject);
        self.transition(SessionState::Loading {
            subject: subject.to_string(),
        });

        Some(AnalyzeTicket {
            subject: subject.to_string(),
        })
    }

    /// Apply the result of the request started by `ticket`.
    pub fn complete(&mut self, ticket: AnalyzeTicket, result: Result<Value, TransportError>) {
        if self.phase() != SessionPhase::Loading {
            warn!(
                "Dropping analyze result for {} received in {} state",
                ticket.subject,
                self.phase()
            );
            return;
        }

        match result {
            Ok(report) => {
                info!("Analysis for {} loaded", ticket.subject);
                self.transition(SessionState::Loaded(report));
            }
            Err(err) => {
                warn!("Analysis for {} failed: {}", ticket.subject, err);
                self.transition(SessionState::Failed(err));
            }
        }
    }

    /// Activation trigger: begin, await the transport, complete.
    pub async fn activate(&mut self, subject: Option<&str>) -> SessionPhase {
        if let Some(ticket) = self.begin(subject) {
            let result = self.transport.analyze(ticket.subject()).await;
            self.complete(ticket, result);
        }
        self.phase()
    }

    /// Install navigation-loss protection for this mount.
    pub fn mount(&mut self, host: &mut dyn NavigationHost) {
        self.navigation.install(host);
    }

    pub fn unmount(&mut self) {
        self.navigation.uninstall();
    }

    pub fn navigation(&self) -> &NavigationGuard {
        &self.navigation
    }

    pub fn on_before_unload(&self) -> UnloadPolicy {
        self.navigation.on_before_unload()
    }

    pub fn on_back_navigation(&mut self, host: &mut dyn NavigationHost) -> NavigationOutcome {
        self.navigation.on_back_navigation(host)
    }
}
