// web-server/src/routes/auth.rs
use actix_web::http::header::{self, ContentType};
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use filedrop_common::{CredentialStore, SessionGate};
use serde::Deserialize;

use super::see_other;
use crate::error::PageError;
use crate::middleware::login_gate::LOGIN_PATH;
use crate::middleware::RequireLogin;
use crate::pages;
use crate::session_cookie::SessionCookie;

const RESTRICTED_PATH: &str = "/restricted";
const FILES_PATH: &str = "/files";

/// Login form body. Missing fields read as empty and simply fail verification.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

#[get("/login")]
pub async fn login_form() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(pages::login_form())
}

#[post("/login")]
pub async fn login(
    req: HttpRequest,
    form: web::Form<LoginForm>,
    credentials: web::Data<CredentialStore>,
    gate: web::Data<SessionGate>,
    cookie: web::Data<SessionCookie>,
) -> Result<HttpResponse, PageError> {
    let LoginForm { user, password } = form.into_inner();

    if !credentials.verify(&user, &password).await {
        return Ok(see_other(LOGIN_PATH));
    }

    let presented = cookie.session_id(&req);
    let current = gate
        .resume(presented.as_ref())
        .await
        .map_err(|e| PageError::Internal(format!("Session lookup failed: {}", e)))?;
    let session = gate
        .complete_login(&current, &user)
        .await
        .map_err(|e| PageError::Internal(format!("Could not establish session for {}: {}", user, e)))?;

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, RESTRICTED_PATH))
        .cookie(cookie.issue(&session.id))
        .finish())
}

#[get("/logout")]
pub async fn logout(
    req: HttpRequest,
    gate: web::Data<SessionGate>,
    cookie: web::Data<SessionCookie>,
) -> HttpResponse {
    if let Some(id) = cookie.session_id(&req) {
        if let Err(e) = gate.logout(&id).await {
            tracing::error!("Failed to destroy session {}: {}", id, e);
        }
    }

    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, LOGIN_PATH))
        .cookie(cookie.clear())
        .finish()
}

#[get("/restricted", wrap = "RequireLogin::default()")]
pub async fn restricted() -> HttpResponse {
    see_other(FILES_PATH)
}
