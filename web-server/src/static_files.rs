// web-server/src/static_files.rs
use actix_files::Files;
use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};

use crate::pages;

/// Serve the public directory as plain static assets under `/static`
pub fn configure(cfg: &mut web::ServiceConfig, public_dir: &str) {
    cfg.service(
        Files::new("/static", public_dir)
            .prefer_utf8(true)
            .use_etag(true)
            .use_last_modified(true),
    );
}

/// Fallback for unmatched routes
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type(ContentType::html())
        .body(pages::not_found())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_static_files_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.css"), b"body {}").unwrap();
        let public_dir = dir.path().to_string_lossy().into_owned();

        let app = test::init_service(
            App::new()
                .configure(|cfg| configure(cfg, &public_dir))
                .default_service(web::route().to(not_found)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/static/style.css").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/nowhere").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = test::read_body(resp).await;
        assert!(std::str::from_utf8(&body).unwrap().contains("404 Not Found"));
    }
}
