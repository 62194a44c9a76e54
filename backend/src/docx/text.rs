//! Placeholder substitution over WordprocessingML part XML.
//!
//! A paragraph's displayed content is defined as the concatenation of its
//! runs' `<w:t>` text. When that content contains a placeholder, the
//! paragraph is collapsed to a single run carrying the original first run's
//! properties and the replaced text. No new runs are created for untouched
//! paragraphs, and nothing outside a matched paragraph is rewritten, so the
//! operation is idempotent and formatting-preserving by construction.

use crate::xmlutil::{escape_xml, unescape_xml};
use common::model::mapping::MappingEntry;

/// Byte ranges of every `<w:p>`..`</w:p>` block, in document order.
/// Paragraphs never nest in WordprocessingML (table cells open their own
/// `<w:p>` elements), so scanning for the next closing tag is sound.
pub(crate) fn paragraph_ranges(xml: &str) -> Vec<(usize, usize)> {
    element_ranges(xml, "<w:p", "</w:p>")
}

/// Generic flat-element scanner. `open` must be the tag prefix without the
/// closing `>` so attributes are tolerated; self-closing elements are
/// skipped.
pub(crate) fn element_ranges(xml: &str, open: &str, close: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let bytes = xml.as_bytes();
    for (start, _) in xml.match_indices(open) {
        // Reject longer tag names sharing the prefix (e.g. <w:pPr for <w:p).
        match bytes.get(start + open.len()) {
            Some(b'>') | Some(b' ') => {}
            _ => continue,
        }
        if let Some(rel_end) = xml[start..].find(close) {
            ranges.push((start, start + rel_end + close.len()));
        }
    }
    ranges
}

/// One `<w:r>` element inside a paragraph slice.
pub(crate) struct Run {
    /// Offsets relative to the paragraph slice.
    pub start: usize,
    pub end: usize,
    /// The full `<w:rPr>...</w:rPr>` element, empty when the run has none.
    pub rpr: String,
    pub text: String,
}

pub(crate) fn runs(paragraph: &str) -> Vec<Run> {
    element_ranges(paragraph, "<w:r", "</w:r>")
        .into_iter()
        .map(|(start, end)| {
            let body = &paragraph[start..end];
            let rpr = match (body.find("<w:rPr"), body.find("</w:rPr>")) {
                (Some(s), Some(e)) => body[s..e + "</w:rPr>".len()].to_string(),
                _ => String::new(),
            };
            Run {
                start,
                end,
                rpr,
                text: text_content(body),
            }
        })
        .collect()
}

/// Concatenated `<w:t>` contents of an XML slice.
pub(crate) fn text_content(xml: &str) -> String {
    let mut out = String::new();
    let mut cursor = 0;
    while let Some(rel) = xml[cursor..].find("<w:t") {
        let tag_start = cursor + rel;
        match xml.as_bytes().get(tag_start + 4) {
            Some(b'>') | Some(b' ') | Some(b'/') => {}
            _ => {
                cursor = tag_start + 4;
                continue;
            }
        }
        let Some(gt_rel) = xml[tag_start..].find('>') else {
            break;
        };
        let gt = tag_start + gt_rel;
        if xml.as_bytes()[gt - 1] == b'/' {
            cursor = gt + 1;
            continue;
        }
        let content_start = gt + 1;
        let Some(close_rel) = xml[content_start..].find("</w:t>") else {
            break;
        };
        out.push_str(&unescape_xml(&xml[content_start..content_start + close_rel]));
        cursor = content_start + close_rel + "</w:t>".len();
    }
    out
}

/// Apply every mapping entry to `text`. Both the literal key and, for
/// bracketed keys, the bracket-stripped form are matched. Entries with
/// blank values are skipped so unresolved fields keep their placeholder.
fn apply_mapping(text: &str, entries: &[MappingEntry], track_changes: bool) -> String {
    let mut out = text.to_string();
    for entry in entries {
        if entry.value.trim().is_empty() {
            continue;
        }
        let value = if track_changes {
            format!("NEW:{}", entry.value)
        } else {
            entry.value.clone()
        };
        let key = entry.key.trim();
        if key.is_empty() {
            continue;
        }
        out = out.replace(key, &value);
        if let Some(inner) = strip_brackets(key) {
            if !inner.is_empty() {
                out = out.replace(inner, &value);
            }
        }
    }
    out
}

fn strip_brackets(key: &str) -> Option<&str> {
    key.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(str::trim)
}

/// Build the single replacement run. Newlines in the value become `<w:br/>`
/// line breaks so multi-line blocks keep their structure inside the
/// paragraph.
fn build_run(rpr: &str, text: &str, track_changes: bool) -> String {
    let rpr = if track_changes {
        add_highlight(rpr)
    } else {
        rpr.to_string()
    };
    let body: Vec<String> = text
        .split('\n')
        .map(|line| {
            format!(
                r#"<w:t xml:space="preserve">{}</w:t>"#,
                escape_xml(line.trim_end_matches('\r'))
            )
        })
        .collect();
    format!("<w:r>{}{}</w:r>", rpr, body.join("<w:br/>"))
}

/// Revision-marking mode: substituted runs get a yellow highlight. The core
/// does not implement real change tracking, it only marks what it touched.
fn add_highlight(rpr: &str) -> String {
    const HIGHLIGHT: &str = r#"<w:highlight w:val="yellow"/>"#;
    if let Some(pos) = rpr.rfind("</w:rPr>") {
        format!("{}{}{}", &rpr[..pos], HIGHLIGHT, &rpr[pos..])
    } else {
        format!("<w:rPr>{}</w:rPr>", HIGHLIGHT)
    }
}

/// Substitute placeholders throughout one part's XML. Returns the rewritten
/// XML and the number of paragraphs changed; the XML is returned untouched
/// (same allocation content) when nothing matches.
pub fn substitute_part(
    xml: &str,
    entries: &[MappingEntry],
    track_changes: bool,
) -> (String, usize) {
    let mut out = String::with_capacity(xml.len());
    let mut cursor = 0;
    let mut replaced = 0;

    for (start, end) in paragraph_ranges(xml) {
        if start < cursor {
            continue;
        }
        let paragraph = &xml[start..end];
        let rewritten = if paragraph.contains("<w:hyperlink") {
            rewrite_hyperlink_paragraph(paragraph, entries, track_changes)
        } else {
            collapse_runs(paragraph, entries, track_changes)
        };
        if let Some(new_paragraph) = rewritten {
            out.push_str(&xml[cursor..start]);
            out.push_str(&new_paragraph);
            cursor = end;
            replaced += 1;
        }
    }
    out.push_str(&xml[cursor..]);
    (out, replaced)
}

/// Collapse the runs of one segment (a whole paragraph, or one stretch of a
/// hyperlink paragraph) into a single run when its joined text changes
/// under the mapping. Everything before the first run and after the last
/// run is kept as is.
fn collapse_runs(
    segment: &str,
    entries: &[MappingEntry],
    track_changes: bool,
) -> Option<String> {
    let runs = runs(segment);
    let (first, last) = (runs.first()?, runs.last()?);

    let joined: String = runs.iter().map(|r| r.text.as_str()).collect();
    let new_text = apply_mapping(&joined, entries, track_changes);
    if new_text == joined {
        return None;
    }

    let mut rebuilt = String::with_capacity(segment.len() + new_text.len());
    rebuilt.push_str(&segment[..first.start]);
    rebuilt.push_str(&build_run(&first.rpr, &new_text, track_changes));
    rebuilt.push_str(&segment[last.end..]);
    Some(rebuilt)
}

/// Hyperlink wrappers contain whole runs, so the paragraph splits cleanly
/// into hyperlink blocks and the stretches between them, each collapsed on
/// its own. A placeholder straddling a hyperlink boundary is not matched;
/// crossing the wrapper would move text in or out of the link.
fn rewrite_hyperlink_paragraph(
    paragraph: &str,
    entries: &[MappingEntry],
    track_changes: bool,
) -> Option<String> {
    let mut out = String::with_capacity(paragraph.len());
    let mut cursor = 0;
    let mut changed = false;

    for (start, end) in element_ranges(paragraph, "<w:hyperlink", "</w:hyperlink>") {
        if start < cursor {
            continue;
        }
        changed |= push_collapsed(&mut out, &paragraph[cursor..start], entries, track_changes);
        changed |= push_collapsed(&mut out, &paragraph[start..end], entries, track_changes);
        cursor = end;
    }
    changed |= push_collapsed(&mut out, &paragraph[cursor..], entries, track_changes);
    changed.then_some(out)
}

fn push_collapsed(
    out: &mut String,
    segment: &str,
    entries: &[MappingEntry],
    track_changes: bool,
) -> bool {
    match collapse_runs(segment, entries, track_changes) {
        Some(rewritten) => {
            out.push_str(&rewritten);
            true
        }
        None => {
            out.push_str(segment);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, value: &str) -> MappingEntry {
        MappingEntry::new(key, value)
    }

    const MULTI_RUN: &str = concat!(
        r#"<w:p><w:pPr><w:jc w:val="both"/></w:pPr>"#,
        r#"<w:r><w:rPr><w:b/></w:rPr><w:t>[Grantor</w:t></w:r>"#,
        r#"<w:r><w:t xml:space="preserve"> Name]</w:t></w:r></w:p>"#
    );

    #[test]
    fn collapses_multi_run_placeholder_keeping_first_run_style() {
        let mapping = vec![entry("[Grantor Name]", "Jane Roe")];
        let (out, n) = substitute_part(MULTI_RUN, &mapping, false);
        assert_eq!(n, 1);
        // single run, first run's bold properties retained
        assert_eq!(out.matches("<w:r>").count(), 1);
        assert!(out.contains("<w:rPr><w:b/></w:rPr>"));
        assert!(out.contains(r#"<w:t xml:space="preserve">Jane Roe</w:t>"#));
        // paragraph properties untouched
        assert!(out.contains(r#"<w:jc w:val="both"/>"#));
    }

    #[test]
    fn substitution_is_idempotent() {
        let mapping = vec![entry("[Grantor Name]", "Jane Roe")];
        let (once, _) = substitute_part(MULTI_RUN, &mapping, false);
        let (twice, n) = substitute_part(&once, &mapping, false);
        assert_eq!(n, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn unrecognized_placeholders_leave_xml_untouched() {
        let xml = r#"<w:p><w:r><w:t>[Something Else]</w:t></w:r></w:p>"#;
        let mapping = vec![entry("[Grantor Name]", "Jane Roe")];
        let (out, n) = substitute_part(xml, &mapping, false);
        assert_eq!(n, 0);
        assert_eq!(out, xml);
    }

    #[test]
    fn replaces_every_occurrence() {
        let xml = concat!(
            r#"<w:p><w:r><w:t>[State]</w:t></w:r></w:p>"#,
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>STATE OF [State]</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#
        );
        let mapping = vec![entry("[State]", "Ohio")];
        let (out, n) = substitute_part(xml, &mapping, false);
        assert_eq!(n, 2);
        assert!(!out.contains("[State]"));
        assert!(out.contains("STATE OF Ohio"));
    }

    #[test]
    fn blank_values_are_skipped() {
        let xml = r#"<w:p><w:r><w:t>[Keep Me]</w:t></w:r></w:p>"#;
        let mapping = vec![entry("[Keep Me]", "   ")];
        let (out, n) = substitute_part(xml, &mapping, false);
        assert_eq!(n, 0);
        assert_eq!(out, xml);
    }

    #[test]
    fn newline_values_become_line_breaks() {
        let xml = r#"<w:p><w:r><w:t>[Signature Block]</w:t></w:r></w:p>"#;
        let mapping = vec![entry("[Signature Block]", "line one\nline two")];
        let (out, _) = substitute_part(xml, &mapping, false);
        assert!(out.contains(
            r#"<w:t xml:space="preserve">line one</w:t><w:br/><w:t xml:space="preserve">line two</w:t>"#
        ));
    }

    #[test]
    fn track_changes_prefixes_and_highlights() {
        let xml = r#"<w:p><w:r><w:t>[County]</w:t></w:r></w:p>"#;
        let mapping = vec![entry("[County]", "Summit")];
        let (out, _) = substitute_part(xml, &mapping, true);
        assert!(out.contains("NEW:Summit"));
        assert!(out.contains(r#"<w:highlight w:val="yellow"/>"#));
    }

    #[test]
    fn replacement_text_is_escaped() {
        let xml = r#"<w:p><w:r><w:t>[Name]</w:t></w:r></w:p>"#;
        let mapping = vec![entry("[Name]", "Smith & Sons <LLC>")];
        let (out, _) = substitute_part(xml, &mapping, false);
        assert!(out.contains("Smith &amp; Sons &lt;LLC&gt;"));
    }

    #[test]
    fn hyperlink_paragraphs_keep_their_wrapper() {
        let xml = concat!(
            r#"<w:p><w:hyperlink r:id="rId9"><w:r><w:t>[Site]</w:t></w:r></w:hyperlink>"#,
            r#"<w:r><w:t> and more</w:t></w:r></w:p>"#
        );
        let mapping = vec![entry("[Site]", "example.test")];
        let (out, n) = substitute_part(xml, &mapping, false);
        assert_eq!(n, 1);
        assert!(out.contains(r#"<w:hyperlink r:id="rId9">"#));
        assert!(out.contains("</w:hyperlink>"));
        assert!(out.contains("example.test"));
        assert!(out.contains("<w:t> and more</w:t>"));
    }

    #[test]
    fn placeholder_split_across_runs_inside_hyperlink_is_replaced() {
        let xml = concat!(
            r#"<w:p><w:r><w:t>see </w:t></w:r>"#,
            r#"<w:hyperlink r:id="rId9"><w:r><w:rPr><w:u w:val="single"/></w:rPr><w:t>[Si</w:t></w:r>"#,
            r#"<w:r><w:t>te]</w:t></w:r></w:hyperlink></w:p>"#
        );
        let mapping = vec![entry("[Site]", "example.test")];
        let (out, n) = substitute_part(xml, &mapping, false);
        assert_eq!(n, 1);
        assert!(out.contains("example.test"));
        assert!(!out.contains("[Si"));
        // collapsed into the link, keeping the first run's underline
        assert!(out.contains(r#"<w:hyperlink r:id="rId9"><w:r><w:rPr><w:u w:val="single"/></w:rPr>"#));
        assert!(out.contains("</w:hyperlink></w:p>"));
        assert!(out.contains("<w:t>see </w:t>"));
    }
}
