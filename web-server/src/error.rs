// web-server/src/error.rs
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::pages;

/// Errors rendered as HTML pages
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for PageError {
    fn status_code(&self) -> StatusCode {
        match self {
            PageError::NotFound(_) => StatusCode::NOT_FOUND,
            PageError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            PageError::NotFound(_) => pages::not_found(),
            PageError::Internal(message) => {
                tracing::error!("Request failed: {}", message);
                pages::internal_error()
            }
        };

        HttpResponse::build(self.status_code())
            .content_type(ContentType::html())
            .body(body)
    }
}
