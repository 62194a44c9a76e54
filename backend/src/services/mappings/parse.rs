use crate::error::{Result, ServiceError};
use crate::mapping::{parse_json_mapping, parse_mapping_file};
use crate::services::upload::UploadForm;
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};

/// Parse an uploaded mapping without touching any document. Multipart
/// bodies carry a `file` part; anything else is treated as a raw JSON
/// mapping payload.
pub async fn process(req: HttpRequest, body: web::Payload) -> Result<HttpResponse> {
    let content_type = req
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let parsed = if content_type.starts_with("multipart/") {
        let mut form = UploadForm::collect(Multipart::new(req.headers(), body)).await?;
        let file = form
            .file_mut("file")
            .ok_or_else(|| ServiceError::Validation("missing 'file' part".to_string()))?;
        let filename = file.filename.clone();
        let content = String::from_utf8_lossy(&file.bytes()?).into_owned();
        parse_mapping_file(&filename, &content)?
    } else {
        let bytes = collect_body(body).await?;
        parse_json_mapping(&String::from_utf8_lossy(&bytes))?
    };

    Ok(HttpResponse::Ok().json(parsed))
}

async fn collect_body(mut body: web::Payload) -> Result<Vec<u8>> {
    use futures_util::StreamExt;
    let mut buf = Vec::new();
    while let Some(chunk) = body.next().await {
        let chunk =
            chunk.map_err(|e| ServiceError::Validation(format!("bad request body: {}", e)))?;
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}
