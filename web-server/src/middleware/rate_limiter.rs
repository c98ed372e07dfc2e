// web-server/src/middleware/rate_limiter.rs
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, Method},
    Error, HttpResponse, ResponseError,
};
use dashmap::DashMap;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use std::sync::Arc;
use std::time::{Duration, Instant};

// Custom error for rate limiting
#[derive(Debug, thiserror::Error)]
#[error("Rate limit exceeded")]
struct RateLimitExceeded {
    retry_after: u64,
}

impl ResponseError for RateLimitExceeded {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::TooManyRequests()
            .append_header((header::RETRY_AFTER, self.retry_after.to_string()))
            .body("Too many login attempts. Please try again later.")
    }
}

/// Sliding-window limit on POSTs to the configured paths, per client IP
#[derive(Debug, Clone)]
pub struct RateLimiter {
    paths: Vec<String>,
    max_requests: usize,
    window: Duration,
    trust_forwarded_for: bool,
    store: Arc<DashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(paths: Vec<String>, max_requests: usize, window: Duration) -> Self {
        Self {
            paths,
            max_requests,
            window,
            trust_forwarded_for: false,
            store: Arc::new(DashMap::new()),
        }
    }

    /// Take the client address from forwarding headers rather than the socket
    pub fn trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }

    fn applies_to(&self, method: &Method, path: &str) -> bool {
        *method == Method::POST && self.paths.iter().any(|p| path == p)
    }

    fn client_key(&self, req: &ServiceRequest) -> String {
        if self.trust_forwarded_for {
            if let Some(ip) = req.connection_info().realip_remote_addr() {
                return ip.to_string();
            }
        }

        req.peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    fn is_rate_limited(&self, client: &str) -> bool {
        self.is_rate_limited_at(client, Instant::now())
    }

    fn is_rate_limited_at(&self, client: &str, now: Instant) -> bool {
        self.prune(now);

        let mut attempts = self.store.entry(client.to_string()).or_default();
        if attempts.len() >= self.max_requests {
            true
        } else {
            attempts.push(now);
            false
        }
    }

    /// Forget attempts outside the window; clients with none left are dropped
    fn prune(&self, now: Instant) {
        self.store.retain(|_, attempts| {
            attempts.retain(|time| now.saturating_duration_since(*time) < self.window);
            !attempts.is_empty()
        });
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RateLimiterMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterMiddleware {
            service,
            limiter: self.clone(),
        }))
    }
}

pub struct RateLimiterMiddleware<S> {
    service: S,
    limiter: RateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimiterMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.limiter.applies_to(req.method(), req.path()) {
            let client = self.limiter.client_key(&req);

            if self.limiter.is_rate_limited(&client) {
                tracing::warn!("Login rate limit exceeded for IP: {}", client);

                let retry_after = self.limiter.window.as_secs();
                return Box::pin(async move { Err(RateLimitExceeded { retry_after }.into()) });
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as http_test;
    use actix_web::{web, App, HttpResponse};
    use std::net::SocketAddr;

    fn limiter(max: usize) -> RateLimiter {
        RateLimiter::new(vec!["/login".to_string()], max, Duration::from_secs(60))
    }

    fn peer() -> SocketAddr {
        "10.0.0.7:51000".parse().unwrap()
    }

    fn login_attempt(forwarded_for: &str) -> actix_web::dev::ServiceRequest {
        http_test::TestRequest::post()
            .uri("/login")
            .peer_addr(peer())
            .insert_header(("x-forwarded-for", forwarded_for))
            .to_srv_request()
    }

    #[test]
    fn test_window_slides() {
        let limiter = limiter(2);
        let start = Instant::now();

        assert!(!limiter.is_rate_limited_at("1.2.3.4", start));
        assert!(!limiter.is_rate_limited_at("1.2.3.4", start));
        assert!(limiter.is_rate_limited_at("1.2.3.4", start));
        // other clients are unaffected
        assert!(!limiter.is_rate_limited_at("5.6.7.8", start));
        assert_eq!(limiter.store.len(), 2);

        // attempts age out of the window, and idle clients are forgotten
        assert!(!limiter.is_rate_limited_at("1.2.3.4", start + Duration::from_secs(61)));
        assert_eq!(limiter.store.len(), 1);
        assert!(limiter.store.get("5.6.7.8").is_none());
    }

    #[test]
    fn test_only_post_to_listed_paths() {
        let limiter = limiter(1);
        assert!(limiter.applies_to(&Method::POST, "/login"));
        assert!(!limiter.applies_to(&Method::GET, "/login"));
        assert!(!limiter.applies_to(&Method::POST, "/files"));
    }

    #[test]
    fn test_client_key_uses_peer_address_by_default() {
        let untrusted = limiter(1);
        assert_eq!(untrusted.client_key(&login_attempt("203.0.113.9")), "10.0.0.7");

        let trusted = limiter(1).trust_forwarded_for(true);
        assert_eq!(trusted.client_key(&login_attempt("203.0.113.9")), "203.0.113.9");
    }

    #[actix_web::test]
    async fn test_middleware_rejects_with_retry_after() {
        let app = http_test::init_service(
            App::new()
                .wrap(limiter(1))
                .route("/login", web::post().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let first = http_test::call_service(&app, http_test::TestRequest::post().uri("/login").to_request()).await;
        assert_eq!(first.status(), StatusCode::OK);

        let err = match app.call(http_test::TestRequest::post().uri("/login").to_request()).await {
            Ok(_) => panic!("second attempt should be limited"),
            Err(err) => err,
        };
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(resp.headers().get(header::RETRY_AFTER).unwrap(), "60");
    }

    #[actix_web::test]
    async fn test_rotating_forwarded_header_does_not_reset_limit() {
        let limiter = limiter(1);
        let app = http_test::init_service(
            App::new()
                .wrap(limiter.clone())
                .route("/login", web::post().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let mut accepted = 0;
        for i in 0..20 {
            let req = http_test::TestRequest::post()
                .uri("/login")
                .peer_addr(peer())
                .insert_header(("x-forwarded-for", format!("198.51.100.{}", i)))
                .to_request();
            if app.call(req).await.is_ok() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(limiter.store.len(), 1);
    }
}
