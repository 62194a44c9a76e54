//! Block generation endpoints.
//!
//! The provided routes are:
//! - `POST /api/blocks/signature`: signature block for an owner type, with
//!   or without the notary acknowledgment spliced in.
//! - `POST /api/blocks/notary`: the acknowledgment text alone.
//! - `POST /api/blocks/combined`: signature and notary together, with the
//!   embedding toggle controlling whether the acknowledgment sits inside
//!   each signer unit or after the whole block.
//! - `POST /api/blocks/exhibit`: the `EXHIBIT A` parcel listing, optionally
//!   reserving an inline image slot.
//!
//! All of them are pure text composition; the resulting strings are meant to
//! be fed back into `/api/documents/populate` as mapping values.

use actix_web::web::{post, scope};
use actix_web::Scope;

mod combined;
mod exhibit;
mod notary;
mod signature;

const API_PATH: &str = "/api/blocks";

/// Configures and returns the Actix scope for block generation routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/signature", post().to(signature::process))
        .route("/notary", post().to(notary::process))
        .route("/combined", post().to(combined::process))
        .route("/exhibit", post().to(exhibit::process))
}
