//! Per-session state.
//!
//! A session is opened on login or registration and keyed by the token's
//! `jti`. Flows that update session state take a [`FlowTicket`] before
//! calling collaborators, which puts the session in `Loading`. When the
//! result comes back it is applied only if no newer flow started and the
//! session is still open; the session then reads `Success` or carries the
//! flow's notice as `Error`.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::entities::profile::{UserIdentity, UserProfile};

/// Status of the most recent flow on the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum AuthState {
    Loading,
    Success,
    Error(String),
}

/// State owned by one signed-in client
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub identity: UserIdentity,
    pub profile: Option<UserProfile>,
    pub auth_state: AuthState,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    generation: u64,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.identity.user_id
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Proof that a flow started at a given generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowTicket {
    session_id: String,
    generation: u64,
}

impl FlowTicket {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Registry of open sessions
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session after a successful authentication flow
    pub fn open(
        &self,
        session_id: &str,
        identity: UserIdentity,
        profile: Option<UserProfile>,
        expires_at: DateTime<Utc>,
    ) -> Session {
        let session = Session {
            session_id: session_id.to_string(),
            identity,
            profile,
            auth_state: AuthState::Success,
            created_at: Utc::now(),
            expires_at,
            generation: 0,
        };

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.insert(session_id.to_string(), session.clone());
        info!("Opened session {} for user {}", session_id, session.identity.user_id);
        session
    }

    /// Snapshot of an open, unexpired session
    pub fn get(&self, session_id: &str) -> Option<Session> {
        let expired = {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            match sessions.get(session_id) {
                Some(session) if !session.is_expired() => return Some(session.clone()),
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            debug!("Session {} expired", session_id);
            self.close(session_id);
        }
        None
    }

    /// Start a flow, superseding any flow already in progress
    pub fn begin_flow(&self, session_id: &str) -> Option<FlowTicket> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let session = sessions.get_mut(session_id)?;
        session.generation += 1;
        session.auth_state = AuthState::Loading;
        Some(FlowTicket {
            session_id: session_id.to_string(),
            generation: session.generation,
        })
    }

    /// Apply a flow result if the ticket is still current, leaving the
    /// session in `Success`.
    ///
    /// Returns false when the result was dropped as stale.
    pub fn complete_flow<F>(&self, ticket: &FlowTicket, apply: F) -> bool
    where
        F: FnOnce(&mut Session),
    {
        self.finish_flow(ticket, |session| {
            apply(session);
            session.auth_state = AuthState::Success;
        })
    }

    /// Record a failed flow's notice if the ticket is still current
    pub fn fail_flow(&self, ticket: &FlowTicket, notice: impl Into<String>) -> bool {
        let notice = notice.into();
        self.finish_flow(ticket, move |session| session.auth_state = AuthState::Error(notice))
    }

    fn finish_flow<F>(&self, ticket: &FlowTicket, apply: F) -> bool
    where
        F: FnOnce(&mut Session),
    {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        match sessions.get_mut(&ticket.session_id) {
            Some(session) if session.generation == ticket.generation => {
                apply(session);
                true
            },
            Some(_) => {
                debug!("Dropping stale flow result for session {}", ticket.session_id);
                false
            },
            None => {
                debug!("Dropping flow result for closed session {}", ticket.session_id);
                false
            }
        }
    }

    /// Close a session; its token is rejected from now on
    pub fn close(&self, session_id: &str) -> Option<Session> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.remove(session_id)
    }

    /// Drop every expired session, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired());
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
