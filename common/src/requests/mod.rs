//! Request and response payloads exchanged between the HTTP surface and its
//! callers. Kept in `common` so any future client crate shares the exact
//! wire shapes with the backend.

use crate::model::owner::OwnerType;
use crate::model::parcel::ExhibitParcel;
use crate::model::shape::ShapeUpdate;
use serde::{Deserialize, Serialize};

fn default_num_signatures() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// Field values interpolated into a signature template. Empty fields leave
/// the template's slot text in place so the recipient can fill it by hand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignatureFields {
    #[serde(default)]
    pub grantor_name: String,
    #[serde(default)]
    pub trust_entity_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: String,
}

/// Field values interpolated into a notary acknowledgment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotaryFields {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub county: String,
    #[serde(default)]
    pub names_of_individuals: String,
    #[serde(default)]
    pub type_of_authority: String,
    #[serde(default)]
    pub instrument_for: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignatureBlockRequest {
    pub owner_type: OwnerType,
    #[serde(default = "default_num_signatures")]
    pub num_signatures: u32,
    #[serde(default)]
    pub with_notary: bool,
    #[serde(default)]
    pub fields: SignatureFields,
    #[serde(default)]
    pub notary_fields: NotaryFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotaryBlockRequest {
    pub owner_type: OwnerType,
    #[serde(default)]
    pub fields: NotaryFields,
}

/// Combined signature + notary request with the embedding toggle: when
/// `embed_notary_in_signature` is set, the notary text is spliced into the
/// signature template at its `[Notary Block]` marker instead of being
/// appended after it.
#[derive(Debug, Clone, Deserialize)]
pub struct CombinedBlockRequest {
    pub owner_type: OwnerType,
    #[serde(default = "default_num_signatures")]
    pub num_signatures: u32,
    #[serde(default = "default_true")]
    pub include_signature: bool,
    #[serde(default = "default_true")]
    pub include_notary: bool,
    #[serde(default = "default_true")]
    pub embed_notary_in_signature: bool,
    #[serde(default)]
    pub fields: SignatureFields,
    #[serde(default)]
    pub notary_fields: NotaryFields,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombinedBlockResponse {
    pub signature_block: Option<String>,
    pub notary_block: Option<String>,
    pub combined_block: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExhibitRequest {
    pub parcels: Vec<ExhibitParcel>,
    /// Reserve an inline image slot in the exhibit text.
    #[serde(default)]
    pub with_image: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExhibitResponse {
    pub exhibit_string: String,
    /// Token the caller must route image bytes to, present only when an
    /// image slot was requested.
    pub inline_image_token: Option<String>,
    pub parcel_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderSlideRequest {
    pub updates: Vec<ShapeUpdate>,
}

/// Pre-flight image check result.
#[derive(Debug, Clone, Serialize)]
pub struct ImageValidationReport {
    pub valid: bool,
    pub format: Option<String>,
    pub size: usize,
    pub message: String,
}
