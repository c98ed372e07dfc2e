// web-server/src/main.rs
mod counter_socket;
mod error;
mod middleware;
mod pages;
mod routes;
mod session_cookie;
mod session_registry;
mod static_files;
mod utils;

#[cfg(test)]
mod testing;

use actix_web::{web, App, HttpServer};
use filedrop_common::store::{self, CounterRepository};
use filedrop_common::{setup_tracing, Config, CredentialStore, Kdf, SessionGate};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use middleware::RateLimiter;
use session_cookie::SessionCookie;
use session_registry::SessionRegistry;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Setup tracing
    setup_tracing();

    // Load configuration
    let config = Config::from_env();
    let server_addr = config.web_server_addr.clone();

    let stores = store::open(&config.store).await.map_err(|e| {
        tracing::error!("Failed to open document store: {}", e);
        io::Error::new(io::ErrorKind::Other, e.to_string())
    })?;

    let credentials = CredentialStore::new(stores.users.clone(), Kdf::default());

    // No connections are accepted until the admin record is in place.
    if let Err(e) = credentials
        .seed(&config.admin.username, &config.admin.password)
        .await
    {
        tracing::error!("Failed to seed credential store: {}", e);
        return Err(io::Error::new(io::ErrorKind::Other, e.to_string()));
    }

    let gate = SessionGate::new(Arc::new(SessionRegistry::start()));

    let limiter = RateLimiter::new(
        vec!["/login".to_string()],
        config.login_throttle.max_attempts,
        Duration::from_secs(config.login_throttle.window_seconds),
    )
    .trust_forwarded_for(config.login_throttle.trust_forwarded_for);

    let public_dir = config.files.public_dir.clone();

    let credentials_data = web::Data::new(credentials);
    let gate_data = web::Data::new(gate);
    let counters_data: web::Data<dyn CounterRepository> = web::Data::from(stores.counters);
    let files_data = web::Data::new(config.files.clone());
    let cookie_data = web::Data::new(SessionCookie::from(&config.session));

    tracing::info!("Starting Filedrop on {}", server_addr);

    HttpServer::new(move || {
        let public_dir = public_dir.clone();
        App::new()
            .wrap(limiter.clone())
            .app_data(credentials_data.clone())
            .app_data(gate_data.clone())
            .app_data(counters_data.clone())
            .app_data(files_data.clone())
            .app_data(cookie_data.clone())
            .configure(routes::configure)
            .configure(move |cfg| static_files::configure(cfg, &public_dir))
            .default_service(web::route().to(static_files::not_found))
    })
    .bind(&server_addr)?
    .run()
    .await
}
