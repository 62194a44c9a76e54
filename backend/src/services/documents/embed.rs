use crate::config::{DOCX_MIME, EXHIBIT_IMAGE_TOKEN, INLINE_IMAGE_TOKEN};
use crate::docx::DocxPackage;
use crate::error::{Result, ServiceError};
use crate::images::prepare_for_embedding;
use crate::services::upload::UploadForm;
use actix_multipart::Multipart;
use actix_web::http::header::ContentDisposition;
use actix_web::HttpResponse;

/// Image-only path: embed a PNG into an uploaded DOCX with no text
/// substitution. Unlike populate, a document without the placeholder token
/// is an error here, since embedding is the caller's whole intent.
pub async fn process(payload: Multipart) -> Result<HttpResponse> {
    let mut form = UploadForm::collect(payload).await?;

    let docx_bytes = form.require_file_bytes("docx")?;
    let image_bytes = form.require_file_bytes("image")?;
    let token = form
        .value("placeholder")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(INLINE_IMAGE_TOKEN)
        .to_string();

    let mut document = DocxPackage::from_bytes(&docx_bytes)?;
    let prepared = prepare_for_embedding(&image_bytes)?;
    if document
        .embed_image_at_first(&[&token, EXHIBIT_IMAGE_TOKEN], &prepared)?
        .is_none()
    {
        return Err(ServiceError::NotFound(format!(
            "document contains no '{}' or '{}' placeholder",
            token, EXHIBIT_IMAGE_TOKEN
        )));
    }

    Ok(HttpResponse::Ok()
        .content_type(DOCX_MIME)
        .insert_header(ContentDisposition::attachment("embedded.docx".to_string()))
        .body(document.save()?))
}
