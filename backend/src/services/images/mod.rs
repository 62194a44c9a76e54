//! Image pre-flight endpoint.
//!
//! The provided route is:
//! - `POST /api/images/validate`: accepts image bytes as a multipart
//!   `image` part or as the raw request body, and reports the detected
//!   format, the byte size, and whether the bytes would be accepted for
//!   embedding. The report is always `200`; rejection reasons travel in the
//!   body so a client can show them before attempting a populate.

use crate::error::{Result, ServiceError};
use crate::images::{detect_format, validate_for_embedding};
use crate::services::upload::UploadForm;
use actix_multipart::Multipart;
use actix_web::web::{post, scope};
use actix_web::{web, HttpRequest, HttpResponse, Scope};
use common::requests::ImageValidationReport;
use futures_util::StreamExt;

const API_PATH: &str = "/api/images";

/// Configures and returns the Actix scope for image routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/validate", post().to(process))
}

pub async fn process(req: HttpRequest, body: web::Payload) -> Result<HttpResponse> {
    let content_type = req
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let bytes = if content_type.starts_with("multipart/") {
        let mut form = UploadForm::collect(Multipart::new(req.headers(), body)).await?;
        form.require_file_bytes("image")?
    } else {
        collect_body(body).await?
    };

    let report = match validate_for_embedding(&bytes) {
        Ok(()) => ImageValidationReport {
            valid: true,
            format: Some("PNG".to_string()),
            size: bytes.len(),
            message: "ok".to_string(),
        },
        Err(e) => ImageValidationReport {
            valid: false,
            format: detect_format(&bytes).map(str::to_string),
            size: bytes.len(),
            message: e.to_string(),
        },
    };
    Ok(HttpResponse::Ok().json(report))
}

async fn collect_body(mut body: web::Payload) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = body.next().await {
        let chunk =
            chunk.map_err(|e| ServiceError::Validation(format!("bad request body: {}", e)))?;
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}
