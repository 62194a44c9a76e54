//! Service-wide error type.
//!
//! Parse and validation failures map to `400`, unknown templates and missing
//! required placeholders to `404`, everything else to `500`. Handlers bubble
//! errors with `?`; no partially processed document is ever returned.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or empty mapping input.
    #[error("parse error: {0}")]
    Parse(String),

    /// Bad image data, oversized upload, or unknown owner type.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown template id, or a placeholder a caller-visible operation
    /// requires is absent from the document.
    #[error("not found: {0}")]
    NotFound(String),

    /// The uploaded archive is not a well-formed OOXML package.
    #[error("malformed document: {0}")]
    Document(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Parse(_) | ServiceError::Validation(_) | ServiceError::Document(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Io(_) | ServiceError::Zip(_) | ServiceError::Image(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

impl From<quick_xml::Error> for ServiceError {
    fn from(e: quick_xml::Error) -> Self {
        ServiceError::Document(e.to_string())
    }
}
