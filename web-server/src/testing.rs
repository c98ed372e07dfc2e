// web-server/src/testing.rs
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::web;
use filedrop_common::store::{CounterRepository, MemoryStore};
use filedrop_common::{CredentialStore, FilesConfig, Kdf, SessionConfig, SessionGate};
use std::sync::Arc;

use crate::session_cookie::SessionCookie;
use crate::session_registry::SessionRegistry;

pub const ADMIN_USER: &str = "Admin";
pub const ADMIN_PASSWORD: &str = "testingPassword";
pub const COOKIE_NAME: &str = "filedrop_session";

/// Application state over an in-memory store and a temporary public directory
pub struct TestState {
    pub credentials: web::Data<CredentialStore>,
    pub gate: web::Data<SessionGate>,
    pub counters: web::Data<dyn CounterRepository>,
    pub files: web::Data<FilesConfig>,
    pub cookie: web::Data<SessionCookie>,
    pub public_dir: tempfile::TempDir,
}

impl TestState {
    /// Must run inside an actix system: starts a session registry actor
    pub async fn new() -> Self {
        let public_dir = tempfile::tempdir().unwrap();
        std::fs::write(public_dir.path().join("notes.txt"), b"shared notes").unwrap();

        let store = Arc::new(MemoryStore::new());
        let credentials = CredentialStore::new(store.clone(), Kdf::default());
        credentials.seed(ADMIN_USER, ADMIN_PASSWORD).await.unwrap();
        let counters: Arc<dyn CounterRepository> = store;

        let files = FilesConfig {
            public_dir: public_dir.path().to_string_lossy().into_owned(),
        };

        Self {
            credentials: web::Data::new(credentials),
            gate: web::Data::new(SessionGate::new(Arc::new(SessionRegistry::start()))),
            counters: web::Data::from(counters),
            files: web::Data::new(files),
            cookie: web::Data::new(SessionCookie::from(&SessionConfig::default())),
            public_dir,
        }
    }
}

/// Cookie for a session that has already logged in as the admin
pub async fn logged_in_cookie(state: &TestState) -> Cookie<'static> {
    let anonymous = state.gate.resume(None).await.unwrap();
    let session = state.gate.complete_login(&anonymous, ADMIN_USER).await.unwrap();
    state.cookie.issue(&session.id)
}

/// Session cookie set on a response, if any
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == COOKIE_NAME)
        .map(|cookie| cookie.into_owned())
}

/// Serve the full route table on a real socket, for clients such as `awc`
pub fn start_server(state: &TestState) -> actix_test::TestServer {
    let credentials = state.credentials.clone();
    let gate = state.gate.clone();
    let counters = state.counters.clone();
    let files = state.files.clone();
    let cookie = state.cookie.clone();

    actix_test::start(move || {
        actix_web::App::new()
            .app_data(credentials.clone())
            .app_data(gate.clone())
            .app_data(counters.clone())
            .app_data(files.clone())
            .app_data(cookie.clone())
            .configure(crate::routes::configure)
    })
}

/// Initialise the full route table over a `TestState`
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.credentials.clone())
                .app_data($state.gate.clone())
                .app_data($state.counters.clone())
                .app_data($state.files.clone())
                .app_data($state.cookie.clone())
                .configure(crate::routes::configure)
                .default_service(actix_web::web::route().to(crate::static_files::not_found)),
        )
        .await
    };
}

pub(crate) use test_app;
