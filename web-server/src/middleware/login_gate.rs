// web-server/src/middleware/login_gate.rs
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpResponse,
};
use filedrop_common::{Access, SessionGate};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::session_cookie::SessionCookie;

pub const LOGIN_PATH: &str = "/login";

/// Lets a request through only when its session cookie names a logged-in
/// session; everything else is redirected to the login form.
#[derive(Debug, Clone)]
pub struct RequireLogin {
    login_path: &'static str,
}

impl Default for RequireLogin {
    fn default() -> Self {
        Self {
            login_path: LOGIN_PATH,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireLogin
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequireLoginMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireLoginMiddleware {
            service: Rc::new(service),
            login_path: self.login_path,
        }))
    }
}

pub struct RequireLoginMiddleware<S> {
    service: Rc<S>,
    login_path: &'static str,
}

impl<S, B> Service<ServiceRequest> for RequireLoginMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let login_path = self.login_path;

        Box::pin(async move {
            let gate = req.app_data::<web::Data<SessionGate>>().cloned();
            let cookie = req.app_data::<web::Data<SessionCookie>>().cloned();

            let access = match (gate, cookie) {
                (Some(gate), Some(cookie)) => {
                    let id = cookie.session_id(req.request());
                    gate.authorize_id(id.as_ref()).await
                }
                _ => {
                    tracing::error!("Session gate is not configured for {}", req.path());
                    Access::Deny
                }
            };

            match access {
                Access::Allow => {
                    tracing::debug!("Access granted: {}", req.path());
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Access::Deny => {
                    tracing::info!("Access denied: {}", req.path());
                    let redirect = HttpResponse::SeeOther()
                        .insert_header((header::LOCATION, login_path))
                        .finish();
                    Ok(req.into_response(redirect).map_into_right_body())
                }
            }
        })
    }
}
