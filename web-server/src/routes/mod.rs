// web-server/src/routes/mod.rs
pub mod auth;
pub mod files;
pub mod upload;

use actix_web::http::header;
use actix_web::{web, HttpResponse};

use crate::counter_socket;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login_form)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::restricted)
        .service(files::list_files)
        .service(files::download)
        .service(files::preview)
        .service(upload::upload_form)
        .service(upload::upload)
        .service(counter_socket::count_socket);
}

/// 303 redirect, so a POST is followed by a GET
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
