// web-server/src/session_registry.rs
use actix::{Actor, Addr, Context, Handler, MailboxError, Message, MessageResult};
use async_trait::async_trait;
use filedrop_common::error::SessionError;
use filedrop_common::models::{SessionId, SessionState};
use filedrop_common::SessionBackend;
use std::collections::HashMap;

use crate::utils::token::new_session_id;

/// Actor message: Start a new anonymous session
#[derive(Message)]
#[rtype(result = "SessionState")]
pub struct CreateSession;

/// Actor message: Get a session by identifier
#[derive(Message)]
#[rtype(result = "Option<SessionState>")]
pub struct GetSession {
    pub id: SessionId,
}

/// Actor message: Overwrite a live session
#[derive(Message)]
#[rtype(result = "Option<SessionState>")]
pub struct SaveSession {
    pub session: SessionState,
}

/// Actor message: Retire an identifier and issue a fresh session
#[derive(Message)]
#[rtype(result = "SessionState")]
pub struct RegenerateSession {
    pub id: SessionId,
}

/// Actor message: Remove a session
#[derive(Message)]
#[rtype(result = "bool")]
pub struct DestroySession {
    pub id: SessionId,
}

/// SessionRegistryActor owns every live session. Identifiers that have been
/// regenerated or destroyed are simply absent and never handed out again.
#[derive(Default)]
pub struct SessionRegistryActor {
    sessions: HashMap<SessionId, SessionState>,
}

impl SessionRegistryActor {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(&mut self) -> SessionState {
        let mut id = SessionId::new(new_session_id());
        while self.sessions.contains_key(&id) {
            id = SessionId::new(new_session_id());
        }

        let session = SessionState::new_anonymous(id.clone());
        self.sessions.insert(id, session.clone());
        session
    }
}

impl Actor for SessionRegistryActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("SessionRegistryActor started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(
            "SessionRegistryActor stopped with {} live sessions",
            self.sessions.len()
        );
    }
}

impl Handler<CreateSession> for SessionRegistryActor {
    type Result = MessageResult<CreateSession>;

    fn handle(&mut self, _msg: CreateSession, _ctx: &mut Self::Context) -> Self::Result {
        let session = self.issue();
        tracing::debug!("Created anonymous session: {}", session.id);
        MessageResult(session)
    }
}

impl Handler<GetSession> for SessionRegistryActor {
    type Result = MessageResult<GetSession>;

    fn handle(&mut self, msg: GetSession, _ctx: &mut Self::Context) -> Self::Result {
        let result = self.sessions.get_mut(&msg.id).map(|session| {
            session.update_activity();
            session.clone()
        });

        if result.is_none() {
            tracing::debug!("Session not found: {}", msg.id);
        }

        MessageResult(result)
    }
}

impl Handler<SaveSession> for SessionRegistryActor {
    type Result = MessageResult<SaveSession>;

    fn handle(&mut self, msg: SaveSession, _ctx: &mut Self::Context) -> Self::Result {
        let result = self.sessions.get_mut(&msg.session.id).map(|slot| {
            *slot = msg.session;
            slot.update_activity();
            slot.clone()
        });

        MessageResult(result)
    }
}

impl Handler<RegenerateSession> for SessionRegistryActor {
    type Result = MessageResult<RegenerateSession>;

    fn handle(&mut self, msg: RegenerateSession, _ctx: &mut Self::Context) -> Self::Result {
        if self.sessions.remove(&msg.id).is_none() {
            tracing::debug!("Regenerating unknown session: {}", msg.id);
        }

        let session = self.issue();
        tracing::debug!("Session {} replaced by {}", msg.id, session.id);
        MessageResult(session)
    }
}

impl Handler<DestroySession> for SessionRegistryActor {
    type Result = MessageResult<DestroySession>;

    fn handle(&mut self, msg: DestroySession, _ctx: &mut Self::Context) -> Self::Result {
        let existed = self.sessions.remove(&msg.id).is_some();
        if existed {
            tracing::debug!("Destroyed session: {}", msg.id);
        }
        MessageResult(existed)
    }
}

/// Session layer handle used by the gate
#[derive(Clone)]
pub struct SessionRegistry {
    addr: Addr<SessionRegistryActor>,
}

impl SessionRegistry {
    /// Start the registry actor on the current arbiter
    pub fn start() -> Self {
        Self {
            addr: SessionRegistryActor::new().start(),
        }
    }
}

fn unavailable(e: MailboxError) -> SessionError {
    SessionError::Unavailable {
        message: e.to_string(),
    }
}

#[async_trait]
impl SessionBackend for SessionRegistry {
    async fn create(&self) -> Result<SessionState, SessionError> {
        self.addr.send(CreateSession).await.map_err(unavailable)
    }

    async fn load(&self, id: &SessionId) -> Result<Option<SessionState>, SessionError> {
        self.addr
            .send(GetSession { id: id.clone() })
            .await
            .map_err(unavailable)
    }

    async fn save(&self, session: SessionState) -> Result<SessionState, SessionError> {
        self.addr
            .send(SaveSession { session })
            .await
            .map_err(unavailable)?
            .ok_or(SessionError::NotFound)
    }

    async fn regenerate(&self, id: &SessionId) -> Result<SessionState, SessionError> {
        self.addr
            .send(RegenerateSession { id: id.clone() })
            .await
            .map_err(unavailable)
    }

    async fn destroy(&self, id: &SessionId) -> Result<bool, SessionError> {
        self.addr
            .send(DestroySession { id: id.clone() })
            .await
            .map_err(unavailable)
    }
}
