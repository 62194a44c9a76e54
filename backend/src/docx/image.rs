//! Inline image insertion for WordprocessingML parts.
//!
//! An image lands in a document as three coordinated edits: a media part
//! under `word/media/`, a relationship entry pointing at it, and a centered
//! paragraph carrying the `<w:drawing>` element in place of the token
//! paragraph. This module builds the XML for each edit; `DocxPackage` wires
//! them together.

use crate::images::PreparedImage;
use crate::xmlutil::escape_xml;
use regex::Regex;
use std::sync::OnceLock;

use super::text::{paragraph_ranges, text_content};

pub(crate) const EMPTY_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\r\n",
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#
);

const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

fn rel_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"Id="rId(\d+)""#).unwrap_or_else(|_| unreachable!()))
}

/// Smallest unused `rIdN` in a relationships part.
pub(crate) fn next_relationship_id(rels_xml: &str) -> u32 {
    max_captured_id(rel_id_pattern(), rels_xml) + 1
}

fn doc_pr_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<wp:docPr[^>]*\bid="(\d+)""#).unwrap_or_else(|_| unreachable!())
    })
}

/// Smallest `wp:docPr` id not already taken by a drawing in this part.
/// Templates routinely ship with logos or seals, so starting from 1 would
/// collide with them.
pub(crate) fn next_doc_pr_id(part_xml: &str) -> u32 {
    max_captured_id(doc_pr_id_pattern(), part_xml) + 1
}

fn max_captured_id(re: &Regex, xml: &str) -> u32 {
    re.captures_iter(xml)
        .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse::<u32>().ok()))
        .max()
        .unwrap_or(0)
}

/// Append an image relationship. The target is relative to the owning part,
/// which for both `document.xml` and header parts resolves `media/...`
/// correctly.
pub(crate) fn add_image_relationship(rels_xml: &str, rel_id: u32, target: &str) -> String {
    let entry = format!(
        r#"<Relationship Id="rId{}" Type="{}" Target="{}"/>"#,
        rel_id,
        IMAGE_REL_TYPE,
        escape_xml(target)
    );
    match rels_xml.rfind("</Relationships>") {
        Some(pos) => format!("{}{}{}", &rels_xml[..pos], entry, &rels_xml[pos..]),
        None => format!("{}{}", rels_xml, entry),
    }
}

/// Make sure `[Content_Types].xml` declares the png default.
pub(crate) fn ensure_png_content_type(types_xml: &str) -> String {
    if types_xml.contains(r#"Extension="png""#) {
        return types_xml.to_string();
    }
    let entry = r#"<Default Extension="png" ContentType="image/png"/>"#;
    match types_xml.rfind("</Types>") {
        Some(pos) => format!("{}{}{}", &types_xml[..pos], entry, &types_xml[pos..]),
        None => format!("{}{}", types_xml, entry),
    }
}

/// A centered paragraph holding one inline picture at its native extent.
pub(crate) fn drawing_paragraph(rel_id: u32, doc_pr_id: u32, img: &PreparedImage) -> String {
    format!(
        concat!(
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:drawing>"#,
            r#"<wp:inline xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
            r#"distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
            r#"<wp:docPr id="{id}" name="Picture {id}"/>"#,
            r#"<a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">"#,
            r#"<a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:nvPicPr><pic:cNvPr id="{id}" name="Picture {id}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="rId{rid}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
            r#"</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#
        ),
        cx = img.width_emu,
        cy = img.height_emu,
        id = doc_pr_id,
        rid = rel_id,
    )
}

/// Replace every paragraph whose displayed text contains `token` with a
/// drawing paragraph produced by `drawing`. The factory runs once per
/// replaced paragraph so each drawing can carry its own `docPr` id.
/// Returns the rewritten part and the number of paragraphs replaced.
pub(crate) fn replace_token_paragraphs(
    xml: &str,
    token: &str,
    mut drawing: impl FnMut() -> String,
) -> (String, usize) {
    let mut out = String::with_capacity(xml.len());
    let mut cursor = 0;
    let mut replaced = 0;

    for (start, end) in paragraph_ranges(xml) {
        if start < cursor {
            continue;
        }
        if text_content(&xml[start..end]).contains(token) {
            out.push_str(&xml[cursor..start]);
            out.push_str(&drawing());
            cursor = end;
            replaced += 1;
        }
    }
    out.push_str(&xml[cursor..]);
    (out, replaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_ids_continue_from_highest() {
        let rels = r#"<Relationships><Relationship Id="rId3" Type="t" Target="x"/><Relationship Id="rId12" Type="t" Target="y"/></Relationships>"#;
        assert_eq!(next_relationship_id(rels), 13);
        assert_eq!(next_relationship_id(EMPTY_RELS), 1);
    }

    #[test]
    fn relationship_lands_inside_root_element() {
        let out = add_image_relationship(EMPTY_RELS, 1, "media/image_a.png");
        assert!(out.ends_with("</Relationships>"));
        assert!(out.contains(r#"Id="rId1""#));
        assert!(out.contains("media/image_a.png"));
    }

    #[test]
    fn png_default_added_once() {
        let types = r#"<Types xmlns="x"><Default Extension="xml" ContentType="application/xml"/></Types>"#;
        let once = ensure_png_content_type(types);
        assert!(once.contains(r#"Extension="png""#));
        assert_eq!(ensure_png_content_type(&once), once);
    }

    #[test]
    fn token_paragraph_replaced_with_drawing() {
        let xml = concat!(
            r#"<w:p><w:r><w:t>before</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>[EXHIBIT_"#,
            r#"</w:t></w:r><w:r><w:t>A_IMAGE_1]</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>after</w:t></w:r></w:p>"#
        );
        let (out, n) =
            replace_token_paragraphs(xml, "[EXHIBIT_A_IMAGE_1]", || "<w:p>PIC</w:p>".to_string());
        assert_eq!(n, 1);
        assert!(out.contains("<w:p>PIC</w:p>"));
        assert!(out.contains("before"));
        assert!(out.contains("after"));
        assert!(!out.contains("EXHIBIT"));
    }

    #[test]
    fn absent_token_changes_nothing() {
        let xml = r#"<w:p><w:r><w:t>plain</w:t></w:r></w:p>"#;
        let (out, n) = replace_token_paragraphs(xml, "[Image]", || "<w:p>PIC</w:p>".to_string());
        assert_eq!(n, 0);
        assert_eq!(out, xml);
    }

    #[test]
    fn drawing_factory_runs_once_per_paragraph() {
        let xml = concat!(
            r#"<w:p><w:r><w:t>[Image]</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>text</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>[Image]</w:t></w:r></w:p>"#
        );
        let mut n = 0;
        let (out, replaced) = replace_token_paragraphs(xml, "[Image]", || {
            n += 1;
            format!("<w:p>PIC{}</w:p>", n)
        });
        assert_eq!(replaced, 2);
        assert!(out.contains("<w:p>PIC1</w:p>"));
        assert!(out.contains("<w:p>PIC2</w:p>"));
    }

    #[test]
    fn doc_pr_ids_continue_above_existing_drawings() {
        let xml = concat!(
            r#"<w:p><w:r><w:drawing><wp:inline><wp:extent cx="1" cy="1"/>"#,
            r#"<wp:docPr id="7" name="Company Seal"/></wp:inline></w:drawing></w:r></w:p>"#
        );
        assert_eq!(next_doc_pr_id(xml), 8);
        assert_eq!(next_doc_pr_id("<w:p/>"), 1);
    }
}
