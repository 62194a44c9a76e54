//! Standalone mapping parsing endpoint.
//!
//! The provided route is:
//! - `POST /api/mappings/parse`: accepts either a multipart form with a
//!   `file` part (`.json`, `.csv`, or `.txt`, dispatched on the filename) or
//!   a raw JSON body, and returns the parsed entries, the document name, and
//!   any warnings about dropped elements.

use actix_web::web::{post, scope};
use actix_web::Scope;

mod parse;

const API_PATH: &str = "/api/mappings";

/// Configures and returns the Actix scope for mapping routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/parse", post().to(parse::process))
}
