// common/src/models/session.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque session identifier delivered to the client in a cookie
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(token: String) -> Self {
        Self(token)
    }
}

// Only a short prefix ever reaches the logs.
impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(8).collect();
        write!(f, "{}…", prefix)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self)
    }
}

/// Server-side state for one client, anonymous until a login completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Current identifier; replaced on login
    pub id: SessionId,
    /// Authenticated username, if any
    pub user: Option<String>,
    /// Timestamp when the session was created
    pub created_at: DateTime<Utc>,
    /// Timestamp of last client activity
    pub last_active: DateTime<Utc>,
}

impl SessionState {
    /// Create a new anonymous session
    pub fn new_anonymous(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            user: None,
            created_at: now,
            last_active: now,
        }
    }

    /// Update session activity timestamp
    pub fn update_activity(&mut self) {
        self.last_active = Utc::now();
    }

    /// Attach an authenticated user to the session
    pub fn authenticate(&mut self, username: String) {
        self.user = Some(username);
        self.update_activity();
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.as_deref().map_or(false, |user| !user.is_empty())
    }
}
