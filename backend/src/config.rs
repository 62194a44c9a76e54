//! Fixed processing limits and well-known placeholder tokens.

/// Uploaded images above this size are rejected outright.
pub const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024;

/// Embedded images are scaled down so their width never exceeds this.
pub const MAX_IMAGE_WIDTH_INCHES: f64 = 6.0;

/// Screen resolution assumed when converting pixel sizes to inches.
pub const PIXELS_PER_INCH: u32 = 96;

/// English Metric Units per inch, the unit OOXML uses for extents.
pub const EMUS_PER_INCH: i64 = 914_400;

/// EMUs per typographic point.
pub const EMUS_PER_POINT: f64 = 12_700.0;

/// Capacity estimate used when a shape's geometry or font size is unknown.
pub const DEFAULT_SHAPE_MAX_CHARS: u32 = 500;

/// Length of the text preview carried by a shape descriptor.
pub const TEXT_PREVIEW_CHARS: usize = 80;

/// Default token the exhibit image is embedded at.
pub const EXHIBIT_IMAGE_TOKEN: &str = "[EXHIBIT_A_IMAGE_1]";

/// Token inserted into an exhibit string when an inline image is requested.
pub const INLINE_IMAGE_TOKEN: &str = "[Image]";

/// Mapping keys for auto-generated blocks.
pub const SIGNATURE_BLOCK_KEY: &str = "[Signature Block]";
pub const SIGNATURE_BLOCK_WITH_NOTARY_KEY: &str = "[Signature Block With Notary]";
pub const NUM_SIGNATURES_KEY: &str = "[Number of Grantor Signatures]";

/// Marker inside signature templates where the notary text is spliced.
pub const NOTARY_BLOCK_MARKER: &str = "[Notary Block]";

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Directory scanned for single-slide templates, overridable via
/// `SLIDE_TEMPLATE_DIR`.
pub const DEFAULT_SLIDE_TEMPLATE_DIR: &str = "templates/slides";
