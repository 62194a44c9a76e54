//! DOCX population endpoints.
//!
//! The provided routes are:
//! - `POST /api/documents/populate`: multipart form with a `docx` template,
//!   a `mapping` (file part or JSON text field), and optional `image`,
//!   `image_base64`, `image_placeholder`, `track_changes`, and
//!   `document_name` fields. Auto-generates signature blocks the mapping
//!   lacks, embeds the image before text substitution, and streams the
//!   populated document back as an attachment.
//! - `POST /api/documents/embed_image`: multipart form with a `docx` and a
//!   PNG `image`; embeds the image at the placeholder token and returns the
//!   document. Fails with `404` when the document has no such token.

use actix_web::web::{post, scope};
use actix_web::Scope;

mod embed;
mod populate;

const API_PATH: &str = "/api/documents";

/// Configures and returns the Actix scope for document routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/populate", post().to(populate::process))
        .route("/embed_image", post().to(embed::process))
}

/// Attachment names come from user input; keep them filesystem-friendly.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            ' ' => '_',
            other => other,
        })
        .collect();
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_filename;

    #[test]
    fn sanitizes_separators_and_spaces() {
        assert_eq!(
            sanitize_filename("My Lease: final/v2"),
            "My_Lease__final_v2"
        );
        assert_eq!(sanitize_filename("  "), "document");
    }
}
