//! Core document properties (`/docProps/core.xml`).

use crate::common::xml::escape_xml;
use crate::pptx::error::{PptxError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Rewrite `dcterms:modified` to `stamp` (a W3CDTF string), splicing bytes so
/// the rest of the part survives verbatim.
///
/// Returns `Ok(None)` when the part has no `dcterms:modified` element; core
/// properties are optional and a missing stamp is not worth failing a build
/// over.
pub fn touch_modified(xml: &[u8], stamp: &str) -> Result<Option<Vec<u8>>> {
    let mut reader = Reader::from_reader(xml);

    let mut inner_span: Option<(usize, usize)> = None;
    let mut open_end = 0usize;
    let mut in_modified = false;
    let mut buf = Vec::new();

    loop {
        let pos_before = reader.buffer_position() as usize;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"modified" {
                    in_modified = true;
                    open_end = reader.buffer_position() as usize;
                }
            }
            Ok(Event::End(e)) => {
                if in_modified && e.local_name().as_ref() == b"modified" {
                    inner_span = Some((open_end, pos_before));
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    let Some((start, end)) = inner_span else {
        return Ok(None);
    };

    let stamp = escape_xml(stamp);
    let mut out = Vec::with_capacity(xml.len() + stamp.len());
    out.extend_from_slice(&xml[..start]);
    out.extend_from_slice(stamp.as_bytes());
    out.extend_from_slice(&xml[end..]);
    Ok(Some(out))
}
