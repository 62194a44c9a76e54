//! Single-slide template endpoints.
//!
//! The provided routes are:
//! - `GET /api/slides`: ids of every template in the catalog directory.
//! - `GET /api/slides/{template_id}/mapping`: shape descriptors for the
//!   template, regenerated when the file changed on disk.
//! - `POST /api/slides/{template_id}/render`: apply `{shape_id, new_text}`
//!   updates to a fresh copy of the template and return the rendered
//!   `.pptx`. The template file itself is never written.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod mapping;
mod render;

const API_PATH: &str = "/api/slides";

/// Configures and returns the Actix scope for slide template routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(mapping::list))
        .route("/{template_id}/mapping", get().to(mapping::process))
        .route("/{template_id}/render", post().to(render::process))
}
