//! In-memory DOCX package: read the ZIP once, edit parts as strings, write
//! the ZIP back out.
//!
//! Substitution and image embedding cover every part that renders text, so
//! placeholders in headers, footers, and footnotes behave the same as in the
//! body.

pub mod image;
pub mod text;

use crate::error::{Result, ServiceError};
use crate::images::PreparedImage;
use common::model::mapping::MappingEntry;
use log::{debug, info};
use std::io::{Cursor, Read, Write};
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// One opened `.docx` archive with all parts held in memory, in original
/// archive order.
#[derive(Debug)]
pub struct DocxPackage {
    parts: Vec<(String, Vec<u8>)>,
}

impl DocxPackage {
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

        let package = DocxPackage { parts };
        if package.part("word/document.xml").is_none() {
            return Err(ServiceError::Document(
                "archive has no word/document.xml, not a DOCX file".to_string(),
            ));
        }
        Ok(package)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_slice())
    }

    fn part_xml(&self, name: &str) -> Result<String> {
        let bytes = self
            .part(name)
            .ok_or_else(|| ServiceError::Document(format!("missing part {}", name)))?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| ServiceError::Document(format!("part {} is not UTF-8", name)))
    }

    pub fn set_part(&mut self, name: &str, content: Vec<u8>) {
        match self.parts.iter_mut().find(|(n, _)| n == name) {
            Some((_, c)) => *c = content,
            None => self.parts.push((name.to_string(), content)),
        }
    }

    /// Every part that renders text: the body, headers, footers, footnotes,
    /// and endnotes.
    pub fn text_part_names(&self) -> Vec<String> {
        self.parts
            .iter()
            .map(|(n, _)| n.as_str())
            .filter(|n| {
                *n == "word/document.xml"
                    || *n == "word/footnotes.xml"
                    || *n == "word/endnotes.xml"
                    || (n.starts_with("word/header") && n.ends_with(".xml"))
                    || (n.starts_with("word/footer") && n.ends_with(".xml"))
            })
            .map(str::to_string)
            .collect()
    }

    /// Apply the mapping everywhere text renders. Returns the number of
    /// paragraphs rewritten across all parts.
    pub fn substitute(&mut self, entries: &[MappingEntry], track_changes: bool) -> Result<usize> {
        let mut total = 0;
        for name in self.text_part_names() {
            let xml = self.part_xml(&name)?;
            let (rewritten, replaced) = text::substitute_part(&xml, entries, track_changes);
            if replaced > 0 {
                debug!("substituted {} paragraph(s) in {}", replaced, name);
                self.set_part(&name, rewritten.into_bytes());
                total += replaced;
            }
        }
        info!("substitution touched {} paragraph(s)", total);
        Ok(total)
    }

    /// Embed a prepared PNG at every paragraph containing `token`. Returns
    /// `false` when no part contains the token; the package is unchanged in
    /// that case.
    pub fn embed_image(&mut self, token: &str, img: &PreparedImage) -> Result<bool> {
        let media_name = format!("image_{}.png", Uuid::new_v4().simple());
        let mut embedded = false;

        for part_name in self.text_part_names() {
            let xml = self.part_xml(&part_name)?;
            let rels_name = rels_part_name(&part_name);
            let rels_xml = match self.part(&rels_name) {
                Some(bytes) => String::from_utf8(bytes.to_vec())
                    .map_err(|_| ServiceError::Document(format!("{} is not UTF-8", rels_name)))?,
                None => image::EMPTY_RELS.to_string(),
            };
            let rel_id = image::next_relationship_id(&rels_xml);

            let mut doc_pr_id = image::next_doc_pr_id(&xml);
            let (rewritten, replaced) = image::replace_token_paragraphs(&xml, token, || {
                let drawing = image::drawing_paragraph(rel_id, doc_pr_id, img);
                doc_pr_id += 1;
                drawing
            });
            if replaced == 0 {
                continue;
            }

            debug!("embedding image at {} spot(s) in {}", replaced, part_name);
            self.set_part(&part_name, rewritten.into_bytes());
            self.set_part(
                &rels_name,
                image::add_image_relationship(&rels_xml, rel_id, &format!("media/{}", media_name))
                    .into_bytes(),
            );
            embedded = true;
        }

        if embedded {
            self.set_part(&format!("word/media/{}", media_name), img.png_bytes.clone());
            let types = self.part_xml("[Content_Types].xml")?;
            self.set_part(
                "[Content_Types].xml",
                image::ensure_png_content_type(&types).into_bytes(),
            );
        }
        Ok(embedded)
    }

    /// Try placeholder tokens in order, embedding at the first one the
    /// document contains. Returns the matched token so the caller can
    /// consume its mapping entry.
    pub fn embed_image_at_first(
        &mut self,
        tokens: &[&str],
        img: &PreparedImage,
    ) -> Result<Option<String>> {
        for token in tokens {
            if self.embed_image(token, img)? {
                return Ok(Some((*token).to_string()));
            }
        }
        Ok(None)
    }

    /// Write the package back out as a `.docx` byte stream. XML parts are
    /// deflated; media parts are stored since PNG data does not compress.
    pub fn save(&self) -> Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        {
            let mut writer = ZipWriter::new(&mut out);
            for (name, content) in &self.parts {
                let method = if name.starts_with("word/media/") {
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

/// `word/document.xml` -> `word/_rels/document.xml.rels`, and likewise for
/// headers and footers.
fn rels_part_name(part_name: &str) -> String {
    match part_name.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::mapping::MappingEntry;

    const CONTENT_TYPES: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        r#"</Types>"#
    );

    fn build_docx(body: &str, header: Option<&str>) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = ZipWriter::new(&mut cursor);
            let opts = SimpleFileOptions::default();
            writer.start_file("[Content_Types].xml", opts).unwrap();
            writer.write_all(CONTENT_TYPES.as_bytes()).unwrap();
            writer.start_file("word/document.xml", opts).unwrap();
            writer
                .write_all(format!("<w:document><w:body>{}</w:body></w:document>", body).as_bytes())
                .unwrap();
            writer.start_file("word/_rels/document.xml.rels", opts).unwrap();
            writer.write_all(image::EMPTY_RELS.as_bytes()).unwrap();
            if let Some(h) = header {
                writer.start_file("word/header1.xml", opts).unwrap();
                writer
                    .write_all(format!("<w:hdr>{}</w:hdr>", h).as_bytes())
                    .unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    fn paragraph(text: &str) -> String {
        format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text)
    }

    #[test]
    fn rejects_non_docx_archives() {
        assert!(DocxPackage::from_bytes(b"plainly not a zip").is_err());

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = ZipWriter::new(&mut cursor);
            writer
                .start_file("hello.txt", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"hi").unwrap();
            writer.finish().unwrap();
        }
        let err = DocxPackage::from_bytes(&cursor.into_inner()).unwrap_err();
        assert!(matches!(err, ServiceError::Document(_)));
    }

    #[test]
    fn substitutes_in_body_and_header() {
        let bytes = build_docx(
            &paragraph("Lessee: [Grantor Name]"),
            Some(&paragraph("Prepared for [Grantor Name]")),
        );
        let mut doc = DocxPackage::from_bytes(&bytes).unwrap();
        let mapping = vec![MappingEntry::new("[Grantor Name]", "Jane Roe")];
        let n = doc.substitute(&mapping, false).unwrap();
        assert_eq!(n, 2);

        let saved = doc.save().unwrap();
        let reopened = DocxPackage::from_bytes(&saved).unwrap();
        let body = String::from_utf8(reopened.part("word/document.xml").unwrap().to_vec()).unwrap();
        let header = String::from_utf8(reopened.part("word/header1.xml").unwrap().to_vec()).unwrap();
        assert!(body.contains("Jane Roe"));
        assert!(header.contains("Jane Roe"));
        assert!(!body.contains("[Grantor Name]"));
    }

    #[test]
    fn embed_image_reports_absent_token() {
        let bytes = build_docx(&paragraph("no token here"), None);
        let mut doc = DocxPackage::from_bytes(&bytes).unwrap();
        let img = test_image();
        let before = doc.save().unwrap();
        assert!(!doc.embed_image("[Image]", &img).unwrap());
        assert_eq!(doc.save().unwrap(), before);
    }

    #[test]
    fn embed_image_wires_media_rels_and_content_type() {
        let body = format!("{}{}", paragraph("above"), paragraph("[Image]"));
        let bytes = build_docx(&body, None);
        let mut doc = DocxPackage::from_bytes(&bytes).unwrap();
        let img = test_image();
        assert!(doc.embed_image("[Image]", &img).unwrap());

        let saved = doc.save().unwrap();
        let reopened = DocxPackage::from_bytes(&saved).unwrap();

        let body = String::from_utf8(reopened.part("word/document.xml").unwrap().to_vec()).unwrap();
        assert!(body.contains("<w:drawing>"));
        assert!(body.contains(r#"<a:blip r:embed="rId1"/>"#));
        assert!(!body.contains("[Image]"));

        let rels =
            String::from_utf8(reopened.part("word/_rels/document.xml.rels").unwrap().to_vec())
                .unwrap();
        assert!(rels.contains("media/image_"));

        let media = reopened
            .parts
            .iter()
            .find(|(n, _)| n.starts_with("word/media/"))
            .unwrap();
        assert_eq!(media.1, img.png_bytes);

        let types =
            String::from_utf8(reopened.part("[Content_Types].xml").unwrap().to_vec()).unwrap();
        assert!(types.contains(r#"Extension="png""#));
    }

    #[test]
    fn embed_falls_back_across_tokens() {
        let bytes = build_docx(&paragraph("[EXHIBIT_A_IMAGE_1]"), None);
        let mut doc = DocxPackage::from_bytes(&bytes).unwrap();
        let img = test_image();

        let matched = doc
            .embed_image_at_first(&["[Image]", "[EXHIBIT_A_IMAGE_1]"], &img)
            .unwrap();
        assert_eq!(matched.as_deref(), Some("[EXHIBIT_A_IMAGE_1]"));

        let body = String::from_utf8(doc.part("word/document.xml").unwrap().to_vec()).unwrap();
        assert!(body.contains("<w:drawing>"));
        assert!(!body.contains("EXHIBIT_A_IMAGE_1"));

        // none of the tokens present
        let bytes = build_docx(&paragraph("plain text"), None);
        let mut doc = DocxPackage::from_bytes(&bytes).unwrap();
        assert_eq!(
            doc.embed_image_at_first(&["[Image]", "[EXHIBIT_A_IMAGE_1]"], &img)
                .unwrap(),
            None
        );
    }

    #[test]
    fn embedded_drawings_get_unique_doc_pr_ids() {
        let existing = concat!(
            r#"<w:p><w:r><w:drawing><wp:inline><wp:extent cx="1" cy="1"/>"#,
            r#"<wp:docPr id="7" name="Company Seal"/></wp:inline></w:drawing></w:r></w:p>"#
        );
        let body = format!("{}{}{}", existing, paragraph("[Image]"), paragraph("[Image]"));
        let bytes = build_docx(&body, None);
        let mut doc = DocxPackage::from_bytes(&bytes).unwrap();
        assert!(doc.embed_image("[Image]", &test_image()).unwrap());

        let body = String::from_utf8(doc.part("word/document.xml").unwrap().to_vec()).unwrap();
        assert_eq!(body.matches(r#"<wp:docPr id="7""#).count(), 1);
        assert_eq!(body.matches(r#"<wp:docPr id="8""#).count(), 1);
        assert_eq!(body.matches(r#"<wp:docPr id="9""#).count(), 1);
    }

    fn test_image() -> PreparedImage {
        let img = ::image::DynamicImage::ImageRgb8(::image::RgbImage::from_pixel(
            8,
            4,
            ::image::Rgb([1, 2, 3]),
        ));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ::image::ImageFormat::Png)
            .unwrap();
        PreparedImage {
            png_bytes: png,
            width_px: 8,
            height_px: 4,
            width_emu: 8 * 9525,
            height_emu: 4 * 9525,
        }
    }
}
