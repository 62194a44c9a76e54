use crate::blocks::auto_generate_signature_blocks;
use crate::config::{DOCX_MIME, EXHIBIT_IMAGE_TOKEN, INLINE_IMAGE_TOKEN};
use crate::docx::DocxPackage;
use crate::error::{Result, ServiceError};
use crate::images::prepare_for_embedding;
use crate::mapping::{parse_json_mapping, parse_mapping_file};
use crate::services::documents::sanitize_filename;
use crate::services::upload::UploadForm;
use actix_multipart::Multipart;
use actix_web::http::header::ContentDisposition;
use actix_web::HttpResponse;
use base64::Engine;
use common::model::mapping::ParsedMapping;
use log::info;

/// Populate an uploaded DOCX template. The image, when present, is embedded
/// before text substitution so its placeholder paragraph is still intact,
/// and its mapping key is consumed so substitution never writes the token
/// back as text.
pub async fn process(payload: Multipart) -> Result<HttpResponse> {
    let mut form = UploadForm::collect(payload).await?;

    let docx_bytes = form.require_file_bytes("docx")?;
    let mut document = DocxPackage::from_bytes(&docx_bytes)?;

    let mut mapping = extract_mapping(&mut form)?;
    if let Some(name) = form.value("document_name") {
        if !name.trim().is_empty() {
            mapping.document_name = name.trim().to_string();
        }
    }
    let track_changes = form.flag("track_changes");

    auto_generate_signature_blocks(&mut mapping)?;

    let placeholder = form
        .value("image_placeholder")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(INLINE_IMAGE_TOKEN)
        .to_string();
    if let Some(image_bytes) = extract_image(&mut form)? {
        let prepared = prepare_for_embedding(&image_bytes)?;
        // exhibit attachments carry their own slot token
        match document.embed_image_at_first(&[&placeholder, EXHIBIT_IMAGE_TOKEN], &prepared)? {
            Some(token) => mapping.remove(&token),
            None => info!("image supplied but '{}' not present in document", placeholder),
        }
    }

    let replaced = document.substitute(&mapping.entries, track_changes)?;
    info!(
        "populated '{}': {} paragraph(s) substituted",
        mapping.document_name, replaced
    );

    let filename = format!("{}.docx", sanitize_filename(&mapping.document_name));
    Ok(HttpResponse::Ok()
        .content_type(DOCX_MIME)
        .insert_header(ContentDisposition::attachment(filename))
        .body(document.save()?))
}

/// Mapping arrives either as a `mapping` file part (dispatched on its file
/// name) or as a `mapping` text field holding JSON.
fn extract_mapping(form: &mut UploadForm) -> Result<ParsedMapping> {
    if let Some(file) = form.file_mut("mapping") {
        let filename = file.filename.clone();
        let content = String::from_utf8_lossy(&file.bytes()?).into_owned();
        return parse_mapping_file(&filename, &content);
    }
    match form.value("mapping") {
        Some(raw) => parse_json_mapping(raw),
        None => Err(ServiceError::Validation(
            "missing 'mapping' part".to_string(),
        )),
    }
}

/// Image bytes from the `image` file part, or from an `image_base64` text
/// field (with or without a data-URL prefix).
fn extract_image(form: &mut UploadForm) -> Result<Option<Vec<u8>>> {
    if let Some(file) = form.file_mut("image") {
        return Ok(Some(file.bytes()?));
    }
    let Some(encoded) = form.value("image_base64") else {
        return Ok(None);
    };
    let encoded = encoded
        .rsplit_once(',')
        .map(|(_, data)| data)
        .unwrap_or(encoded)
        .trim();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| ServiceError::Validation(format!("invalid base64 image: {}", e)))?;
    Ok(Some(bytes))
}
