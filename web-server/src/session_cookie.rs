// web-server/src/session_cookie.rs
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use filedrop_common::models::SessionId;
use filedrop_common::SessionConfig;

/// How the session identifier travels between client and server
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    secure: bool,
}

impl From<&SessionConfig> for SessionCookie {
    fn from(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            secure: config.secure_cookie,
        }
    }
}

impl SessionCookie {
    /// Session identifier presented by the client, if any
    pub fn session_id(&self, req: &HttpRequest) -> Option<SessionId> {
        req.cookie(&self.name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
            .map(SessionId::from)
    }

    /// Cookie carrying `id`
    pub fn issue(&self, id: &SessionId) -> Cookie<'static> {
        Cookie::build(self.name.clone(), id.as_str().to_string())
            .path("/")
            .secure(self.secure)
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish()
    }

    /// Empty cookie that makes the browser drop the session
    pub fn clear(&self) -> Cookie<'static> {
        Cookie::build(self.name.clone(), "")
            .path("/")
            .max_age(CookieDuration::seconds(0))
            .finish()
    }
}
