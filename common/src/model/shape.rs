use serde::{Deserialize, Serialize};

/// Metadata for one editable text shape in a single-slide template.
///
/// Descriptors are regenerated from the template file whenever its
/// fingerprint changes; they are read-only at request time and exist so a
/// caller can build an edit form without parsing the slide itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    /// Stable shape id from the slide XML (`p:cNvPr id`).
    pub shape_id: u32,
    /// Shape name from the slide XML, used as a fallback label.
    pub name: String,
    /// Placeholder role (`title`, `body`, ...) when the shape is a layout
    /// placeholder, otherwise the shape name.
    pub role: String,
    /// First characters of the shape's current text.
    pub text_preview: String,
    /// Bounding box in EMUs: left, top, width, height.
    pub bbox: Option<BoundingBox>,
    /// Style sample taken from the first run.
    pub styles: ShapeStyles,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

/// Formatting constraints derived from the shape's first run and box size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeStyles {
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<f32>,
    pub bold: bool,
    pub italic: bool,
    /// Hex RGB like `FF0000`, when an explicit solid fill is set.
    pub color_rgb: Option<String>,
    /// Rough capacity estimate from box size and font size; 500 when the
    /// geometry or font size is unknown.
    pub max_chars: u32,
}

/// One requested edit: replace the text of the shape with this id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeUpdate {
    pub shape_id: u32,
    pub new_text: String,
}
