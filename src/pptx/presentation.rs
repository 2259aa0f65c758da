//! Reading and rewriting `/ppt/presentation.xml`.
//!
//! The slide list is rewritten by splicing bytes: the original presentation
//! part carries namespace declarations, the master list, the slide size and
//! anything else the template author put there, and all of it must survive
//! untouched. Only the `p:sldIdLst` span is replaced.

use crate::common::xml::escape_xml;
use crate::pptx::error::{PptxError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fmt::Write;

/// One `p:sldId` entry: the slide id and the rId resolving to the slide part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideEntry {
    pub id: u32,
    pub r_id: String,
}

/// Entries of `p:sldIdLst` in document order.
pub fn slide_entries(xml: &[u8]) -> Result<Vec<SlideEntry>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"sldId" {
                    let mut id = None;
                    let mut r_id = None;
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"id" {
                            id = std::str::from_utf8(&attr.value)
                                .ok()
                                .and_then(|v| v.parse::<u32>().ok());
                        } else if attr.key.local_name().as_ref() == b"id" {
                            // Prefixed r:id attribute.
                            let value = std::str::from_utf8(&attr.value)
                                .map_err(|e| PptxError::Xml(e.to_string()))?;
                            if value.starts_with("rId") {
                                r_id = Some(value.to_string());
                            }
                        }
                    }
                    if let (Some(id), Some(r_id)) = (id, r_id) {
                        entries.push(SlideEntry { id, r_id });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}

/// rIds of `p:sldMasterId` entries, in document order.
pub fn slide_master_rids(xml: &[u8]) -> Result<Vec<String>> {
    collect_rids(xml, b"sldMasterId")
}

/// rIds of a master's `p:sldLayoutId` entries, in document order.
///
/// This order is the layout order users see in the desktop application, and
/// the order layout indexes refer to.
pub fn slide_layout_rids(master_xml: &[u8]) -> Result<Vec<String>> {
    collect_rids(master_xml, b"sldLayoutId")
}

fn collect_rids(xml: &[u8], element: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut rids = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == element {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"id" {
                            continue;
                        }
                        if attr.key.local_name().as_ref() == b"id" {
                            let value = std::str::from_utf8(&attr.value)
                                .map_err(|e| PptxError::Xml(e.to_string()))?;
                            if value.starts_with("rId") {
                                rids.push(value.to_string());
                            }
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(rids)
}

/// Slide width and height in EMU from `p:sldSz`, if declared.
pub fn slide_size(xml: &[u8]) -> Result<Option<(i64, i64)>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"sldSz" {
                    let mut cx = None;
                    let mut cy = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"cx" => {
                                cx = std::str::from_utf8(&attr.value).ok().and_then(|v| v.parse().ok())
                            }
                            b"cy" => {
                                cy = std::str::from_utf8(&attr.value).ok().and_then(|v| v.parse().ok())
                            }
                            _ => {}
                        }
                    }
                    if let (Some(cx), Some(cy)) = (cx, cy) {
                        return Ok(Some((cx, cy)));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(None)
}

/// Replace the `p:sldIdLst` with one naming exactly `entries`, preserving
/// every other byte of the part.
///
/// A presentation without a slide list gets one inserted after the last
/// master-id list, where the schema expects it.
pub fn replace_slide_id_list(xml: &[u8], entries: &[SlideEntry]) -> Result<Vec<u8>> {
    // Offsets must refer to the raw byte stream, so text trimming stays off.
    let mut reader = Reader::from_reader(xml);

    let mut span: Option<(usize, usize)> = None;
    let mut list_start = 0usize;
    let mut after_master_lists: Option<usize> = None;
    let mut presentation_open_end: Option<usize> = None;
    let mut buf = Vec::new();

    loop {
        let pos_before = reader.buffer_position() as usize;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"sldIdLst" => list_start = pos_before,
                b"presentation" => {
                    presentation_open_end = Some(reader.buffer_position() as usize);
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"sldIdLst" => span = Some((pos_before, reader.buffer_position() as usize)),
                b"sldMasterIdLst" | b"notesMasterIdLst" | b"handoutMasterIdLst" => {
                    after_master_lists = Some(reader.buffer_position() as usize);
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"sldIdLst" => span = Some((list_start, reader.buffer_position() as usize)),
                b"sldMasterIdLst" | b"notesMasterIdLst" | b"handoutMasterIdLst" => {
                    after_master_lists = Some(reader.buffer_position() as usize);
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    let (start, end) = match span {
        Some(span) => span,
        None => {
            let insert_at = after_master_lists.or(presentation_open_end).ok_or_else(|| {
                PptxError::Xml("presentation part has no p:presentation element".to_string())
            })?;
            (insert_at, insert_at)
        }
    };

    let replacement = slide_id_list_xml(entries);
    let mut out = Vec::with_capacity(xml.len() + replacement.len());
    out.extend_from_slice(&xml[..start]);
    out.extend_from_slice(replacement.as_bytes());
    out.extend_from_slice(&xml[end..]);
    Ok(out)
}

fn slide_id_list_xml(entries: &[SlideEntry]) -> String {
    if entries.is_empty() {
        return "<p:sldIdLst/>".to_string();
    }
    let mut xml = String::with_capacity(16 + entries.len() * 40);
    xml.push_str("<p:sldIdLst>");
    for entry in entries {
        let _ = write!(
            xml,
            "<p:sldId id=\"{}\" r:id=\"{}\"/>",
            entry.id,
            escape_xml(&entry.r_id),
        );
    }
    xml.push_str("</p:sldIdLst>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESENTATION_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
  <p:sldIdLst>
    <p:sldId id="256" r:id="rId2"/>
    <p:sldId id="257" r:id="rId3"/>
  </p:sldIdLst>
  <p:sldSz cx="12192000" cy="6858000"/>
  <p:notesSz cx="6858000" cy="9144000"/>
</p:presentation>"#;

    #[test]
    fn test_slide_entries() {
        let entries = slide_entries(PRESENTATION_XML.as_bytes()).unwrap();
        assert_eq!(
            entries,
            vec![
                SlideEntry { id: 256, r_id: "rId2".to_string() },
                SlideEntry { id: 257, r_id: "rId3".to_string() },
            ]
        );
    }

    #[test]
    fn test_master_rids() {
        assert_eq!(
            slide_master_rids(PRESENTATION_XML.as_bytes()).unwrap(),
            vec!["rId1".to_string()]
        );
    }

    #[test]
    fn test_layout_rids_preserve_document_order() {
        let master = r#"<p:sldMaster xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
<p:sldLayoutIdLst>
<p:sldLayoutId id="2147483649" r:id="rId7"/>
<p:sldLayoutId id="2147483650" r:id="rId2"/>
<p:sldLayoutId id="2147483651" r:id="rId5"/>
</p:sldLayoutIdLst>
</p:sldMaster>"#;
        assert_eq!(
            slide_layout_rids(master.as_bytes()).unwrap(),
            vec!["rId7".to_string(), "rId2".to_string(), "rId5".to_string()]
        );
    }

    #[test]
    fn test_slide_size() {
        assert_eq!(
            slide_size(PRESENTATION_XML.as_bytes()).unwrap(),
            Some((12_192_000, 6_858_000))
        );
        assert_eq!(slide_size(b"<p:presentation/>").unwrap(), None);
    }

    #[test]
    fn test_replace_slide_list_splices_in_place() {
        let entries = vec![SlideEntry { id: 256, r_id: "rId9".to_string() }];
        let out = replace_slide_id_list(PRESENTATION_XML.as_bytes(), &entries).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains(r#"<p:sldId id="256" r:id="rId9"/>"#));
        assert!(!out.contains("rId2\"/>"));
        assert!(!out.contains("rId3"));
        // Surrounding structure is untouched.
        assert!(out.contains("sldMasterIdLst"));
        assert!(out.contains(r#"<p:sldSz cx="12192000" cy="6858000"/>"#));

        let reparsed = slide_entries(out.as_bytes()).unwrap();
        assert_eq!(reparsed.len(), 1);
        assert_eq!(reparsed[0].r_id, "rId9");
    }

    #[test]
    fn test_replace_with_empty_list() {
        let out = replace_slide_id_list(PRESENTATION_XML.as_bytes(), &[]).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("<p:sldIdLst/>"));
        assert!(slide_entries(out.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_insert_when_list_is_missing() {
        let bare = r#"<p:presentation xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#;
        let entries = vec![SlideEntry { id: 256, r_id: "rId5".to_string() }];
        let out = replace_slide_id_list(bare.as_bytes(), &entries).unwrap();
        let out = String::from_utf8(out).unwrap();

        // Inserted after the master list, before the slide size.
        let list_at = out.find("<p:sldIdLst>").unwrap();
        assert!(out.find("</p:sldMasterIdLst>").unwrap() < list_at);
        assert!(list_at < out.find("<p:sldSz").unwrap());
        assert_eq!(slide_entries(out.as_bytes()).unwrap().len(), 1);
    }

    #[test]
    fn test_insert_into_empty_presentation() {
        let bare = r#"<p:presentation xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"></p:presentation>"#;
        let out = replace_slide_id_list(bare.as_bytes(), &[]).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("<p:sldIdLst/>"));
    }
}
