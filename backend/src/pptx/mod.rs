//! Single-slide PPTX templates: shape discovery and text re-injection.
//!
//! Discovery walks the slide XML with a streaming parser and emits one
//! descriptor per text-bearing shape. Injection goes the other way and is
//! deliberately surgical: only `<a:t>` contents inside the targeted
//! `<p:sp>` block change, so every list, theme, and transition in the deck
//! survives untouched.

use crate::config::{DEFAULT_SHAPE_MAX_CHARS, EMUS_PER_POINT, TEXT_PREVIEW_CHARS};
use crate::docx::text::element_ranges;
use crate::error::{Result, ServiceError};
use crate::xmlutil::escape_xml;
use common::model::shape::{BoundingBox, ShapeDescriptor, ShapeStyles, ShapeUpdate};
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::io::{Cursor, Read, Write};
use std::sync::OnceLock;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// One opened `.pptx` archive. Only the first slide is addressed; the
/// catalog guarantees single-slide templates.
pub struct PptxPackage {
    parts: Vec<(String, Vec<u8>)>,
    slide_part: String,
}

impl PptxPackage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ServiceError::Document(format!("not a ZIP archive: {}", e)))?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut content = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut content)?;
            parts.push((file.name().to_string(), content));
        }

        let slide_part = first_slide_name(&parts).ok_or_else(|| {
            ServiceError::Document("archive has no ppt/slides/slideN.xml, not a PPTX file".to_string())
        })?;
        Ok(PptxPackage { parts, slide_part })
    }

    fn slide_xml(&self) -> Result<String> {
        let bytes = self
            .parts
            .iter()
            .find(|(n, _)| *n == self.slide_part)
            .map(|(_, c)| c.clone())
            .ok_or_else(|| ServiceError::Document(format!("missing part {}", self.slide_part)))?;
        String::from_utf8(bytes)
            .map_err(|_| ServiceError::Document(format!("{} is not UTF-8", self.slide_part)))
    }

    fn set_slide_xml(&mut self, xml: String) {
        if let Some((_, c)) = self.parts.iter_mut().find(|(n, _)| *n == self.slide_part) {
            *c = xml.into_bytes();
        }
    }

    /// Descriptors for every text-bearing shape on the slide, in slide
    /// order.
    pub fn shape_descriptors(&self) -> Result<Vec<ShapeDescriptor>> {
        parse_shapes(&self.slide_xml()?)
    }

    /// Replace the text of each addressed shape. Fails with `NotFound`
    /// before any edit when an update names a shape the slide does not have
    /// or one without text runs.
    pub fn inject(&mut self, updates: &[ShapeUpdate]) -> Result<()> {
        let mut xml = self.slide_xml()?;
        for update in updates {
            xml = inject_one(&xml, update)?;
            debug!("injected text into shape {}", update.shape_id);
        }
        self.set_slide_xml(xml);
        Ok(())
    }

    pub fn save(&self) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        {
            let mut writer = ZipWriter::new(&mut out);
            for (name, content) in &self.parts {
                let method = if name.starts_with("ppt/media/") {
                    CompressionMethod::Stored
                } else {
                    CompressionMethod::Deflated
                };
                writer.start_file(
                    name.as_str(),
                    SimpleFileOptions::default().compression_method(method),
                )?;
                writer.write_all(content)?;
            }
            writer.finish()?;
        }
        Ok(out.into_inner())
    }
}

fn first_slide_name(parts: &[(String, Vec<u8>)]) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^ppt/slides/slide(\d+)\.xml$").unwrap_or_else(|_| unreachable!())
    });
    parts
        .iter()
        .filter_map(|(n, _)| {
            re.captures(n)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .map(|idx| (idx, n.clone()))
        })
        .min_by_key(|(idx, _)| *idx)
        .map(|(_, n)| n)
}

#[derive(Default)]
struct ShapeBuilder {
    id: Option<u32>,
    name: String,
    ph_role: Option<String>,
    off: Option<(i64, i64)>,
    ext: Option<(i64, i64)>,
    font_name: Option<String>,
    font_size: Option<f32>,
    bold: bool,
    italic: bool,
    color_rgb: Option<String>,
    rpr_seen: bool,
    has_text_body: bool,
    text: String,
}

impl ShapeBuilder {
    fn finish(self) -> Option<ShapeDescriptor> {
        let id = self.id?;
        if !self.has_text_body {
            return None;
        }
        let bbox = match (self.off, self.ext) {
            (Some((left, top)), Some((width, height))) => Some(BoundingBox {
                left,
                top,
                width,
                height,
            }),
            _ => None,
        };
        let role = match &self.ph_role {
            Some(t) => normalize_role(t),
            None => self.name.clone(),
        };
        Some(ShapeDescriptor {
            shape_id: id,
            text_preview: self.text.chars().take(TEXT_PREVIEW_CHARS).collect(),
            role,
            styles: ShapeStyles {
                font_name: self.font_name,
                font_size: self.font_size,
                bold: self.bold,
                italic: self.italic,
                color_rgb: self.color_rgb,
                max_chars: estimate_max_chars(bbox, self.font_size),
            },
            name: self.name,
            bbox,
        })
    }
}

fn normalize_role(ph_type: &str) -> String {
    match ph_type {
        "ctrTitle" | "title" => "title".to_string(),
        "subTitle" => "subtitle".to_string(),
        "" => "body".to_string(),
        other => other.to_string(),
    }
}

/// Rough capacity estimate from box geometry and point size. Character
/// width is taken as 0.55 em, line height as 1.2 em.
fn estimate_max_chars(bbox: Option<BoundingBox>, font_size: Option<f32>) -> u32 {
    let (Some(b), Some(sz)) = (bbox, font_size) else {
        return DEFAULT_SHAPE_MAX_CHARS;
    };
    if sz <= 0.0 || b.width <= 0 || b.height <= 0 {
        return DEFAULT_SHAPE_MAX_CHARS;
    }
    let width_pt = b.width as f64 / EMUS_PER_POINT;
    let height_pt = b.height as f64 / EMUS_PER_POINT;
    let chars_per_line = (width_pt / (sz as f64 * 0.55)).floor().max(1.0);
    let lines = (height_pt / (sz as f64 * 1.2)).floor().max(1.0);
    (chars_per_line * lines) as u32
}

fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn parse_shapes(xml: &str) -> Result<Vec<ShapeDescriptor>> {
    let mut reader = Reader::from_str(xml);
    let mut shapes = Vec::new();
    let mut current: Option<ShapeBuilder> = None;
    let mut in_first_rpr = false;
    let mut in_text = false;

    loop {
        let event = reader.read_event()?;
        let has_children = matches!(event, Event::Start(_));
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = e.name();
                let tag = name.as_ref();
                match tag {
                    b"p:sp" => current = Some(ShapeBuilder::default()),
                    b"p:cNvPr" => {
                        if let Some(sp) = current.as_mut() {
                            if sp.id.is_none() {
                                sp.id = attr(e, b"id").and_then(|v| v.parse().ok());
                                sp.name = attr(e, b"name").unwrap_or_default();
                            }
                        }
                    }
                    b"p:ph" => {
                        if let Some(sp) = current.as_mut() {
                            sp.ph_role = Some(attr(e, b"type").unwrap_or_default());
                        }
                    }
                    b"a:off" => {
                        if let Some(sp) = current.as_mut() {
                            if sp.off.is_none() {
                                sp.off = pair(attr(e, b"x"), attr(e, b"y"));
                            }
                        }
                    }
                    b"a:ext" => {
                        if let Some(sp) = current.as_mut() {
                            if sp.ext.is_none() {
                                sp.ext = pair(attr(e, b"cx"), attr(e, b"cy"));
                            }
                        }
                    }
                    b"p:txBody" => {
                        if let Some(sp) = current.as_mut() {
                            sp.has_text_body = true;
                        }
                    }
                    b"a:rPr" => {
                        if let Some(sp) = current.as_mut() {
                            if !sp.rpr_seen {
                                sp.rpr_seen = true;
                                // sz is in hundredths of a point
                                sp.font_size = attr(e, b"sz")
                                    .and_then(|v| v.parse::<f32>().ok())
                                    .map(|v| v / 100.0);
                                sp.bold = attr(e, b"b").as_deref() == Some("1");
                                sp.italic = attr(e, b"i").as_deref() == Some("1");
                                in_first_rpr = has_children;
                            }
                        }
                    }
                    b"a:latin" => {
                        if in_first_rpr {
                            if let Some(sp) = current.as_mut() {
                                sp.font_name = attr(e, b"typeface");
                            }
                        }
                    }
                    b"a:srgbClr" => {
                        if in_first_rpr {
                            if let Some(sp) = current.as_mut() {
                                if sp.color_rgb.is_none() {
                                    sp.color_rgb = attr(e, b"val");
                                }
                            }
                        }
                    }
                    b"a:t" => in_text = true,
                    _ => {}
                }
            }
            Event::Text(ref t) => {
                if in_text {
                    if let Some(sp) = current.as_mut() {
                        sp.text.push_str(&t.unescape()?);
                    }
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"p:sp" => {
                    if let Some(desc) = current.take().and_then(ShapeBuilder::finish) {
                        shapes.push(desc);
                    }
                    in_first_rpr = false;
                }
                b"a:rPr" => in_first_rpr = false,
                b"a:t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(shapes)
}

fn pair(a: Option<String>, b: Option<String>) -> Option<(i64, i64)> {
    Some((a?.parse().ok()?, b?.parse().ok()?))
}

fn shape_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<p:cNvPr[^>]*\bid="(\d+)""#).unwrap_or_else(|_| unreachable!())
    })
}

fn inject_one(xml: &str, update: &ShapeUpdate) -> Result<String> {
    for (start, end) in element_ranges(xml, "<p:sp", "</p:sp>") {
        let shape = &xml[start..end];
        let id = shape_id_pattern()
            .captures(shape)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok());
        if id != Some(update.shape_id) {
            continue;
        }
        let rewritten = set_shape_text(shape, &update.new_text).ok_or_else(|| {
            ServiceError::NotFound(format!("shape {} has no text runs", update.shape_id))
        })?;
        return Ok(format!("{}{}{}", &xml[..start], rewritten, &xml[end..]));
    }
    Err(ServiceError::NotFound(format!(
        "shape {} not found in slide",
        update.shape_id
    )))
}

/// First `<a:t>` gets the new text, the rest are emptied so stale fragments
/// from later runs never resurface.
fn set_shape_text(shape: &str, new_text: &str) -> Option<String> {
    let mut out = String::with_capacity(shape.len() + new_text.len());
    let mut cursor = 0;
    let mut first = true;
    let mut found = false;

    while let Some(rel) = shape[cursor..].find("<a:t>") {
        let content_start = cursor + rel + "<a:t>".len();
        let Some(end_rel) = shape[content_start..].find("</a:t>") else {
            break;
        };
        let content_end = content_start + end_rel;
        out.push_str(&shape[cursor..content_start]);
        if first {
            out.push_str(&escape_xml(new_text));
            first = false;
        }
        found = true;
        cursor = content_end;
    }
    out.push_str(&shape[cursor..]);
    found.then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = concat!(
        r#"<p:sld xmlns:p="p" xmlns:a="a"><p:cSld><p:spTree>"#,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/>"#,
        r#"<p:nvPr><p:ph type="ctrTitle"/></p:nvPr></p:nvSpPr>"#,
        r#"<p:spPr><a:xfrm><a:off x="914400" y="457200"/><a:ext cx="6858000" cy="1143000"/></a:xfrm></p:spPr>"#,
        r#"<p:txBody><a:bodyPr/><a:p><a:r>"#,
        r#"<a:rPr lang="en-US" sz="4400" b="1"><a:solidFill><a:srgbClr val="FF0000"/></a:solidFill>"#,
        r#"<a:latin typeface="Calibri"/></a:rPr><a:t>Old </a:t></a:r>"#,
        r#"<a:r><a:t>Title</a:t></a:r></a:p></p:txBody></p:sp>"#,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="5" name="TextBox 4"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>"#,
        r#"<p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"/>"#,
        r#"<a:t>Body copy</a:t></a:r></a:p></p:txBody></p:sp>"#,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="7" name="Decoration"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>"#,
        r#"<p:spPr/></p:sp>"#,
        r#"</p:spTree></p:cSld></p:sld>"#
    );

    fn build_pptx(slide: &str) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = ZipWriter::new(&mut cursor);
            let opts = SimpleFileOptions::default();
            writer.start_file("[Content_Types].xml", opts).unwrap();
            writer.write_all(b"<Types/>").unwrap();
            writer.start_file("ppt/presentation.xml", opts).unwrap();
            writer.write_all(b"<p:presentation/>").unwrap();
            writer.start_file("ppt/slides/slide1.xml", opts).unwrap();
            writer.write_all(slide.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn descriptors_skip_shapes_without_text_body() {
        let pptx = PptxPackage::from_bytes(&build_pptx(SLIDE)).unwrap();
        let shapes = pptx.shape_descriptors().unwrap();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].shape_id, 2);
        assert_eq!(shapes[1].shape_id, 5);
    }

    #[test]
    fn title_descriptor_carries_geometry_and_styles() {
        let pptx = PptxPackage::from_bytes(&build_pptx(SLIDE)).unwrap();
        let title = &pptx.shape_descriptors().unwrap()[0];

        assert_eq!(title.name, "Title 1");
        assert_eq!(title.role, "title");
        assert_eq!(title.text_preview, "Old Title");
        let bbox = title.bbox.unwrap();
        assert_eq!((bbox.left, bbox.top), (914_400, 457_200));
        assert_eq!((bbox.width, bbox.height), (6_858_000, 1_143_000));
        assert_eq!(title.styles.font_size, Some(44.0));
        assert!(title.styles.bold);
        assert!(!title.styles.italic);
        assert_eq!(title.styles.font_name.as_deref(), Some("Calibri"));
        assert_eq!(title.styles.color_rgb.as_deref(), Some("FF0000"));
        // 540pt wide box, 44pt glyphs: 22 chars x 1 line
        assert_eq!(title.styles.max_chars, 22);
    }

    #[test]
    fn plain_text_box_falls_back_to_defaults() {
        let pptx = PptxPackage::from_bytes(&build_pptx(SLIDE)).unwrap();
        let body = &pptx.shape_descriptors().unwrap()[1];

        assert_eq!(body.role, "TextBox 4");
        assert!(body.bbox.is_none());
        assert_eq!(body.styles.font_size, None);
        assert_eq!(body.styles.max_chars, DEFAULT_SHAPE_MAX_CHARS);
    }

    #[test]
    fn inject_rewrites_first_run_and_empties_the_rest() {
        let mut pptx = PptxPackage::from_bytes(&build_pptx(SLIDE)).unwrap();
        pptx.inject(&[ShapeUpdate {
            shape_id: 2,
            new_text: "Lease & Option".to_string(),
        }])
        .unwrap();

        let saved = pptx.save().unwrap();
        let reopened = PptxPackage::from_bytes(&saved).unwrap();
        let shapes = reopened.shape_descriptors().unwrap();
        assert_eq!(shapes[0].text_preview, "Lease & Option");
        // the untouched shape keeps its text
        assert_eq!(shapes[1].text_preview, "Body copy");
    }

    #[test]
    fn inject_unknown_shape_is_not_found() {
        let mut pptx = PptxPackage::from_bytes(&build_pptx(SLIDE)).unwrap();
        let err = pptx
            .inject(&[ShapeUpdate {
                shape_id: 99,
                new_text: "x".to_string(),
            }])
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn inject_shape_without_runs_is_not_found() {
        // shape 7 has no txBody at all
        let mut pptx = PptxPackage::from_bytes(&build_pptx(SLIDE)).unwrap();
        assert!(pptx
            .inject(&[ShapeUpdate {
                shape_id: 7,
                new_text: "x".to_string(),
            }])
            .is_err());
    }

    #[test]
    fn rejects_archives_without_slides() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = ZipWriter::new(&mut cursor);
            writer
                .start_file("ppt/presentation.xml", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"<p:presentation/>").unwrap();
            writer.finish().unwrap();
        }
        assert!(PptxPackage::from_bytes(&cursor.into_inner()).is_err());
    }
}
