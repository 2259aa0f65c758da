//! Shape scanning for slide, layout and master XML.
//!
//! Only shapes that are *direct* children of the `p:spTree` are reported;
//! shapes nested inside group shapes belong to the group and are never
//! addressed individually by the deck builder.

use crate::pptx::error::{PptxError, Result};
use crate::pptx::placeholder::PlaceholderRole;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Element kind of a top-level shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// `p:sp`
    Shape,
    /// `p:pic`
    Picture,
    /// `p:grpSp`
    GroupShape,
    /// `p:graphicFrame`
    GraphicFrame,
    /// `p:cxnSp`
    Connector,
}

/// The `p:ph` element of a placeholder shape, attributes as written.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderDesc {
    /// `type` attribute; `None` means the generic content placeholder.
    pub ph_type: Option<String>,
    pub orient: Option<String>,
    pub sz: Option<String>,
    pub idx: Option<u32>,
}

impl PlaceholderDesc {
    pub fn role(&self) -> PlaceholderRole {
        PlaceholderRole::from_ph_type(self.ph_type.as_deref())
    }
}

/// Summary of one top-level shape.
#[derive(Debug, Clone)]
pub struct ShapeInfo {
    pub kind: ShapeKind,
    /// `p:cNvPr` name; empty when the attribute is missing.
    pub name: String,
    pub placeholder: Option<PlaceholderDesc>,
    /// `r:embed` of the picture's `a:blip`, when present.
    pub blip_rid: Option<String>,
}

impl ShapeInfo {
    pub fn is_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    pub fn role(&self) -> Option<PlaceholderRole> {
        self.placeholder.as_ref().map(PlaceholderDesc::role)
    }
}

/// Scan the direct children of `p:spTree`.
pub fn top_level_shapes(xml: &[u8]) -> Result<Vec<ShapeInfo>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut shapes: Vec<ShapeInfo> = Vec::new();
    let mut in_sp_tree = false;
    // Depth within the current top-level shape subtree; 0 when outside one.
    let mut depth = 0usize;
    let mut current: Option<ShapeInfo> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let local = e.local_name();
                let local = local.as_ref();
                if !in_sp_tree {
                    if local == b"spTree" {
                        in_sp_tree = true;
                    }
                } else if current.is_none() {
                    if let Some(kind) = shape_kind(local) {
                        current = Some(ShapeInfo {
                            kind,
                            name: String::new(),
                            placeholder: None,
                            blip_rid: None,
                        });
                        depth = 1;
                    }
                } else {
                    depth += 1;
                    if let Some(shape) = current.as_mut() {
                        capture(shape, local, &e, depth)?;
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                let local = e.local_name();
                let local = local.as_ref();
                if in_sp_tree {
                    if let Some(shape) = current.as_mut() {
                        capture(shape, local, &e, depth + 1)?;
                    } else if let Some(kind) = shape_kind(local) {
                        shapes.push(ShapeInfo {
                            kind,
                            name: String::new(),
                            placeholder: None,
                            blip_rid: None,
                        });
                    }
                }
            }
            Ok(Event::End(e)) => {
                if in_sp_tree {
                    if current.is_some() {
                        depth -= 1;
                        if depth == 0 {
                            if let Some(shape) = current.take() {
                                shapes.push(shape);
                            }
                        }
                    } else if e.local_name().as_ref() == b"spTree" {
                        break;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(shapes)
}

/// Record the interesting descendants of a top-level shape.
///
/// Depths are fixed by the schema: `cNvPr` and `blip` sit two levels down
/// (`sp > nvSpPr > cNvPr`, `pic > blipFill > blip`), `ph` three
/// (`sp > nvSpPr > nvPr > ph`). Matching on depth keeps shapes nested in
/// groups from leaking their properties into the group's entry.
fn capture(shape: &mut ShapeInfo, local: &[u8], e: &BytesStart<'_>, depth: usize) -> Result<()> {
    match local {
        b"cNvPr" if depth == 3 && shape.name.is_empty() => {
            for attr in e.attributes().flatten() {
                if attr.key.as_ref() == b"name" {
                    shape.name = attr_value(&attr)?;
                }
            }
        }
        b"ph" if depth == 4 && shape.placeholder.is_none() => {
            let mut desc = PlaceholderDesc::default();
            for attr in e.attributes().flatten() {
                match attr.key.as_ref() {
                    b"type" => desc.ph_type = Some(attr_value(&attr)?),
                    b"orient" => desc.orient = Some(attr_value(&attr)?),
                    b"sz" => desc.sz = Some(attr_value(&attr)?),
                    b"idx" => desc.idx = attr_value(&attr)?.parse().ok(),
                    _ => {}
                }
            }
            shape.placeholder = Some(desc);
        }
        b"blip" if depth == 3 && shape.blip_rid.is_none() => {
            for attr in e.attributes().flatten() {
                if attr.key.local_name().as_ref() == b"embed" {
                    shape.blip_rid = Some(attr_value(&attr)?);
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn shape_kind(local: &[u8]) -> Option<ShapeKind> {
    match local {
        b"sp" => Some(ShapeKind::Shape),
        b"pic" => Some(ShapeKind::Picture),
        b"grpSp" => Some(ShapeKind::GroupShape),
        b"graphicFrame" => Some(ShapeKind::GraphicFrame),
        b"cxnSp" => Some(ShapeKind::Connector),
        _ => None,
    }
}

/// Paragraph texts of every top-level `p:sp` placeholder with `role`.
///
/// For each matching shape, returns its paragraphs in order; a paragraph is
/// included when it carries at least one `a:t` element, so the empty `<a:p/>`
/// that pads an otherwise-empty text body does not count.
pub fn placeholder_paragraphs(xml: &[u8], role: PlaceholderRole) -> Result<Vec<Vec<String>>> {
    let mut reader = Reader::from_reader(xml);

    let mut out: Vec<Vec<String>> = Vec::new();
    let mut in_sp_tree = false;
    let mut depth = 0usize;
    // Some(true) while inside a top-level p:sp, Some(false) for other kinds.
    let mut current: Option<bool> = None;
    let mut shape_role: Option<PlaceholderRole> = None;
    let mut in_txbody = false;
    let mut in_text = false;
    let mut paragraphs: Vec<String> = Vec::new();
    // (accumulated text, saw an a:t element)
    let mut paragraph: Option<(String, bool)> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let local = e.local_name();
                let local = local.as_ref();
                if !in_sp_tree {
                    if local == b"spTree" {
                        in_sp_tree = true;
                    }
                } else if current.is_none() {
                    if let Some(kind) = shape_kind(local) {
                        current = Some(kind == ShapeKind::Shape);
                        depth = 1;
                        shape_role = None;
                        paragraphs.clear();
                    }
                } else {
                    depth += 1;
                    if current == Some(true) {
                        match local {
                            b"ph" if depth == 4 && shape_role.is_none() => {
                                shape_role = Some(ph_role(&e)?);
                            }
                            b"txBody" if depth == 2 => in_txbody = true,
                            b"p" if in_txbody && depth == 3 => {
                                paragraph = Some((String::new(), false));
                            }
                            b"t" if paragraph.is_some() => in_text = true,
                            _ => {}
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                let local = e.local_name();
                let local = local.as_ref();
                if in_sp_tree && current == Some(true) {
                    match local {
                        b"ph" if depth == 3 && shape_role.is_none() => {
                            shape_role = Some(ph_role(&e)?);
                        }
                        b"t" => {
                            if let Some(p) = paragraph.as_mut() {
                                p.1 = true;
                            }
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if in_text {
                    if let Some(p) = paragraph.as_mut() {
                        let text = t.unescape().map_err(|e| PptxError::Xml(e.to_string()))?;
                        p.0.push_str(&text);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let local = e.local_name();
                let local = local.as_ref();
                if !in_sp_tree {
                    // before the shape tree: nothing to do
                } else if current.is_some() {
                    if current == Some(true) {
                        match local {
                            b"t" if in_text => {
                                in_text = false;
                                if let Some(p) = paragraph.as_mut() {
                                    p.1 = true;
                                }
                            }
                            b"p" if depth == 3 => {
                                if let Some((text, saw_text)) = paragraph.take() {
                                    if saw_text {
                                        paragraphs.push(text);
                                    }
                                }
                            }
                            b"txBody" if depth == 2 => in_txbody = false,
                            _ => {}
                        }
                    }
                    depth -= 1;
                    if depth == 0 {
                        let was_sp = current == Some(true);
                        current = None;
                        if was_sp && shape_role == Some(role) {
                            out.push(std::mem::take(&mut paragraphs));
                        }
                    }
                } else if local == b"spTree" {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}

fn ph_role(e: &BytesStart<'_>) -> Result<PlaceholderRole> {
    let mut ph_type = None;
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"type" {
            ph_type = Some(attr_value(&attr)?);
        }
    }
    Ok(PlaceholderRole::from_ph_type(ph_type.as_deref()))
}

fn attr_value(attr: &quick_xml::events::attributes::Attribute<'_>) -> Result<String> {
    attr.unescape_value()
        .map(|v| v.into_owned())
        .map_err(|e| PptxError::Xml(e.to_string()))
}
