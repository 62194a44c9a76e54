//! Composed text blocks: signature, notary, and exhibit generation.
//!
//! Each generator picks a fixed template for the owner type, interpolates
//! the caller's field values into the template's own placeholder slots, and
//! returns one composed string. The result is fed into document population
//! as an ordinary mapping entry.

mod templates;

use crate::config::{
    INLINE_IMAGE_TOKEN, NOTARY_BLOCK_MARKER, NUM_SIGNATURES_KEY, SIGNATURE_BLOCK_KEY,
    SIGNATURE_BLOCK_WITH_NOTARY_KEY,
};
use crate::error::{Result, ServiceError};
use common::model::mapping::ParsedMapping;
use common::model::owner::OwnerType;
use common::model::parcel::ExhibitParcel;
use common::requests::{NotaryFields, SignatureFields};
use log::debug;

/// Per-signer templates for an owner type. Married couples sign twice with
/// the same individual block; a sole-owner married couple pairs the
/// individual block with the spousal consent block; entities repeat the
/// authorized-signatory block.
fn signer_templates(owner: OwnerType, num_signatures: u32) -> Vec<&'static str> {
    let n = num_signatures.max(1) as usize;
    match owner {
        OwnerType::Individual => vec![templates::INDIVIDUAL_SIGNATURE; n],
        OwnerType::MarriedCouple => {
            vec![templates::INDIVIDUAL_SIGNATURE; n.max(2)]
        }
        OwnerType::SoleOwnerMarriedCouple => vec![
            templates::INDIVIDUAL_SIGNATURE,
            templates::SPOUSAL_CONSENT_SIGNATURE,
        ],
        OwnerType::Corporation | OwnerType::Llc | OwnerType::Lp | OwnerType::Trust => {
            vec![templates::ENTITY_SIGNATURE; n]
        }
    }
}

/// Replace a slot only when the caller supplied a value; otherwise the slot
/// text stays visible for hand completion.
fn fill(mut text: String, slot: &str, value: &str) -> String {
    if !value.trim().is_empty() {
        text = text.replace(slot, value);
    }
    text
}

fn fill_signature(template: &str, fields: &SignatureFields) -> String {
    let mut out = template.to_string();
    out = fill(out, "[Grantor Name]", &fields.grantor_name);
    out = fill(out, "[Trust/Entity Name]", &fields.trust_entity_name);
    out = fill(out, "[Name]", &fields.name);
    out = fill(out, "[Title]", &fields.title);
    out = fill(out, "[State]", &fields.state);
    out
}

/// Compose the notary acknowledgment for the given owner type.
pub fn notary_block(owner: OwnerType, fields: &NotaryFields) -> String {
    let template = if owner.is_entity() {
        templates::ENTITY_NOTARY
    } else {
        templates::INDIVIDUAL_NOTARY
    };
    let mut out = template.to_string();
    out = fill(out, "[State]", &fields.state);
    out = fill(out, "[County]", &fields.county);
    out = fill(out, "[NAME(S) OF INDIVIDUAL(S)]", &fields.names_of_individuals);
    out = fill(out, "[TYPE OF AUTHORITY]", &fields.type_of_authority);
    out = fill(
        out,
        "[NAME OF ENTITY OR TRUST WHOM INSTRUMENT WAS EXECUTED FOR]",
        &fields.instrument_for,
    );
    out
}

/// Compose the signature block. With `notary` present, the acknowledgment is
/// spliced into each signer unit at the `[Notary Block]` marker; without it
/// the marker line is stripped.
pub fn signature_block(
    owner: OwnerType,
    num_signatures: u32,
    fields: &SignatureFields,
    notary: Option<&str>,
) -> String {
    let units: Vec<String> = signer_templates(owner, num_signatures)
        .into_iter()
        .map(|t| {
            let filled = fill_signature(t, fields);
            match notary {
                Some(n) => filled.replace(NOTARY_BLOCK_MARKER, n),
                None => strip_marker(&filled),
            }
        })
        .collect();
    units.join("\n\n")
}

fn strip_marker(text: &str) -> String {
    text.replace(NOTARY_BLOCK_MARKER, "").trim_end().to_string()
}

/// Result of combined block generation.
pub struct CombinedBlock {
    pub signature: Option<String>,
    pub notary: Option<String>,
    pub combined: String,
}

/// Combined signature/notary composition with the embedding toggle.
pub fn combined_block(
    owner: OwnerType,
    num_signatures: u32,
    include_signature: bool,
    include_notary: bool,
    embed_notary_in_signature: bool,
    fields: &SignatureFields,
    notary_fields: &NotaryFields,
) -> Result<CombinedBlock> {
    if !include_signature && !include_notary {
        return Err(ServiceError::Validation(
            "nothing to generate: both signature and notary disabled".to_string(),
        ));
    }

    let notary = include_notary.then(|| notary_block(owner, notary_fields));

    let combined = match (include_signature, &notary) {
        (true, Some(n)) if embed_notary_in_signature => {
            signature_block(owner, num_signatures, fields, Some(n))
        }
        (true, Some(n)) => format!(
            "{}\n\n\n{}",
            signature_block(owner, num_signatures, fields, None),
            n
        ),
        (true, None) => signature_block(owner, num_signatures, fields, None),
        (false, Some(n)) => n.clone(),
        (false, None) => unreachable!(),
    };

    let signature =
        include_signature.then(|| signature_block(owner, num_signatures, fields, None));

    Ok(CombinedBlock {
        signature,
        notary,
        combined,
    })
}

/// Result of exhibit generation.
pub struct ExhibitBlock {
    pub text: String,
    pub inline_image_token: Option<String>,
}

/// Build the `EXHIBIT A` text from parcel descriptions. When an image slot
/// is requested, an `[Image]` token is inserted after the header for the
/// image embedder to resolve later.
pub fn exhibit_block(parcels: &[ExhibitParcel], with_image: bool) -> Result<ExhibitBlock> {
    if parcels.is_empty() {
        return Err(ServiceError::Validation("no parcels provided".to_string()));
    }

    let mut parts: Vec<String> = vec!["EXHIBIT A".to_string()];
    if with_image {
        parts.push(INLINE_IMAGE_TOKEN.to_string());
    }
    for (i, parcel) in parcels.iter().enumerate() {
        let label = if parcel.is_portion { "Portion" } else { "Parcel" };
        parts.push(format!("{} {}:\n{}", label, i + 1, parcel.description));
    }

    Ok(ExhibitBlock {
        text: parts.join("\n\n"),
        inline_image_token: with_image.then(|| INLINE_IMAGE_TOKEN.to_string()),
    })
}

/// Owner type carried by a mapping, checked in priority order. A present
/// but unrecognized value is a caller error; an absent one means an
/// individual grantor.
pub fn detect_owner_type(mapping: &ParsedMapping) -> Result<OwnerType> {
    for key in ["[Owner Type]", "[Grantor Type]", "[Grantee Type]"] {
        if let Some(raw) = mapping.get(key) {
            if raw.trim().is_empty() {
                continue;
            }
            return raw
                .parse()
                .map_err(|_| ServiceError::Validation(format!("unknown owner type '{}'", raw)));
        }
    }
    Ok(OwnerType::Individual)
}

/// Fill in `[Signature Block]` and `[Signature Block With Notary]` entries
/// when the caller's mapping does not carry them, built from the owner type
/// and signer details already present in the mapping.
pub fn auto_generate_signature_blocks(mapping: &mut ParsedMapping) -> Result<()> {
    let has = |m: &ParsedMapping, key: &str| m.get(key).is_some_and(|v| !v.trim().is_empty());
    if has(mapping, SIGNATURE_BLOCK_KEY) && has(mapping, SIGNATURE_BLOCK_WITH_NOTARY_KEY) {
        return Ok(());
    }

    let owner = detect_owner_type(mapping)?;
    let num_signatures = mapping
        .get(NUM_SIGNATURES_KEY)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(1);

    let pick = |key: &str| mapping.get(key).unwrap_or_default().to_string();
    let fields = SignatureFields {
        grantor_name: pick("[Grantor Name]"),
        trust_entity_name: pick("[Trust/Entity Name]"),
        name: pick("[Name]"),
        title: pick("[Title]"),
        state: pick("[State]"),
    };
    let notary_fields = NotaryFields {
        state: pick("[State]"),
        county: pick("[County]"),
        names_of_individuals: pick("[Grantor Name]"),
        type_of_authority: pick("[Title]"),
        instrument_for: pick("[Trust/Entity Name]"),
    };

    if !has(mapping, SIGNATURE_BLOCK_KEY) {
        debug!("auto-generating {} for {}", SIGNATURE_BLOCK_KEY, owner);
        mapping.insert(
            SIGNATURE_BLOCK_KEY.to_string(),
            signature_block(owner, num_signatures, &fields, None),
        );
    }
    if !has(mapping, SIGNATURE_BLOCK_WITH_NOTARY_KEY) {
        let notary = notary_block(owner, &notary_fields);
        mapping.insert(
            SIGNATURE_BLOCK_WITH_NOTARY_KEY.to_string(),
            signature_block(owner, num_signatures, &fields, Some(&notary)),
        );
    }
    Ok(())
}
