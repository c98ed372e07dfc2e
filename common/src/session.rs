//! Session-gated access control.
//!
//! The session layer itself (storage, cookies) belongs to the web server; the
//! gate only talks to it through [`SessionBackend`].

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::SessionError;
use crate::models::{SessionId, SessionState};

/// Outcome of an access check. `Deny` means "send the client to the login form".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// Session layer contract
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Start a new anonymous session
    async fn create(&self) -> Result<SessionState, SessionError>;

    /// Fetch a live session; destroyed or unknown ids yield `None`
    async fn load(&self, id: &SessionId) -> Result<Option<SessionState>, SessionError>;

    /// Store changes to a live session. Fails with `NotFound` if it was destroyed.
    async fn save(&self, session: SessionState) -> Result<SessionState, SessionError>;

    /// Drop `id` and issue a fresh anonymous session under a new identifier
    async fn regenerate(&self, id: &SessionId) -> Result<SessionState, SessionError>;

    /// Discard the session; returns whether it existed
    async fn destroy(&self, id: &SessionId) -> Result<bool, SessionError>;
}

#[derive(Clone)]
pub struct SessionGate {
    backend: Arc<dyn SessionBackend>,
}

impl SessionGate {
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self { backend }
    }

    /// `Allow` iff the session carries a non-empty user
    pub fn authorize(&self, session: &SessionState) -> Access {
        if session.is_authenticated() {
            Access::Allow
        } else {
            Access::Deny
        }
    }

    /// Authorize the session a client presented, by identifier.
    /// Missing, unknown and destroyed sessions are all denied.
    pub async fn authorize_id(&self, id: Option<&SessionId>) -> Access {
        let Some(id) = id else {
            return Access::Deny;
        };

        match self.backend.load(id).await {
            Ok(Some(session)) => self.authorize(&session),
            Ok(None) => {
                tracing::debug!("No live session for {}", id);
                Access::Deny
            }
            Err(e) => {
                tracing::error!("Session lookup failed for {}: {}", id, e);
                Access::Deny
            }
        }
    }

    /// The client's current session, or a new anonymous one
    pub async fn resume(&self, id: Option<&SessionId>) -> Result<SessionState, SessionError> {
        if let Some(id) = id {
            if let Some(session) = self.backend.load(id).await? {
                return Ok(session);
            }
        }
        self.backend.create().await
    }

    /// Bind `username` to the client after a successful credential check.
    /// The pre-login identifier is discarded; the returned session has a new one.
    pub async fn complete_login(
        &self,
        session: &SessionState,
        username: &str,
    ) -> Result<SessionState, SessionError> {
        let mut fresh = self.backend.regenerate(&session.id).await?;
        fresh.authenticate(username.to_string());
        let saved = self.backend.save(fresh).await?;

        tracing::info!("Session {} now belongs to {}", saved.id, username);
        Ok(saved)
    }

    /// Invalidate the session. Logging out twice is not an error.
    pub async fn logout(&self, id: &SessionId) -> Result<(), SessionError> {
        if self.backend.destroy(id).await? {
            tracing::info!("Session {} logged out", id);
        } else {
            tracing::debug!("Logout for unknown session {}", id);
        }
        Ok(())
    }
}
