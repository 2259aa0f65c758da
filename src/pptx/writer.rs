//! Slide XML synthesis.
//!
//! New slides are generated as strings rather than edited DOM trees; the
//! shapes are simple enough that templated markup stays readable, and the
//! result never carries stray attributes from the layout it was derived from.

use crate::common::xml::escape_xml;
use crate::opc::constants::namespace;
use crate::pptx::error::{PptxError, Result};
use crate::pptx::shapes::ShapeInfo;
use std::fmt::Write;

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";

/// Accumulates the shapes of one new slide, then renders the `p:sld` part.
///
/// Shape ids start at 2; id 1 belongs to the `p:spTree` group itself.
pub struct SlideXmlBuilder {
    shapes: String,
    next_shape_id: u32,
}

impl SlideXmlBuilder {
    pub fn new() -> Self {
        Self {
            shapes: String::new(),
            next_shape_id: 2,
        }
    }

    /// Clone a layout placeholder onto the slide.
    ///
    /// The `p:ph` attributes are copied from the layout shape so the new
    /// placeholder inherits position and formatting. `paragraphs` controls
    /// the text body: `None` leaves it empty (inheriting any layout prompt
    /// text behavior), `Some(texts)` writes one paragraph per entry, and
    /// `Some(&[])` clears the body explicitly.
    pub fn add_placeholder(
        &mut self,
        source: &ShapeInfo,
        paragraphs: Option<&[String]>,
    ) -> Result<()> {
        let ph = source
            .placeholder
            .as_ref()
            .ok_or_else(|| PptxError::NotAPlaceholder(source.name.clone()))?;

        let id = self.take_id();
        let name = format!("{} {}", placeholder_basename(ph.ph_type.as_deref()), id - 1);

        let _ = write!(
            self.shapes,
            "<p:sp><p:nvSpPr><p:cNvPr id=\"{}\" name=\"{}\"/><p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr><p:nvPr><p:ph",
            id,
            escape_xml(&name),
        );
        if let Some(ph_type) = &ph.ph_type {
            let _ = write!(self.shapes, " type=\"{}\"", escape_xml(ph_type));
        }
        if let Some(orient) = &ph.orient {
            let _ = write!(self.shapes, " orient=\"{}\"", escape_xml(orient));
        }
        if let Some(sz) = &ph.sz {
            let _ = write!(self.shapes, " sz=\"{}\"", escape_xml(sz));
        }
        if let Some(idx) = ph.idx {
            let _ = write!(self.shapes, " idx=\"{}\"", idx);
        }
        self.shapes.push_str("/></p:nvPr></p:nvSpPr><p:spPr/>");

        self.shapes.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
        match paragraphs {
            Some(texts) if !texts.is_empty() => {
                for text in texts {
                    let _ = write!(
                        self.shapes,
                        "<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>",
                        escape_xml(text),
                    );
                }
            }
            // A text body must hold at least one paragraph.
            _ => self.shapes.push_str("<a:p/>"),
        }
        self.shapes.push_str("</p:txBody></p:sp>");
        Ok(())
    }

    /// Place a picture at the given EMU offsets and extent.
    pub fn add_picture(&mut self, name: &str, r_id: &str, x: i64, y: i64, cx: i64, cy: i64) {
        let id = self.take_id();
        let _ = write!(
            self.shapes,
            "<p:pic><p:nvPicPr><p:cNvPr id=\"{id}\" name=\"{name}\"/><p:cNvPicPr><a:picLocks noChangeAspect=\"1\"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>\
<p:blipFill><a:blip r:embed=\"{r_id}\"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>\
<p:spPr><a:xfrm><a:off x=\"{x}\" y=\"{y}\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm><a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></p:spPr></p:pic>",
            id = id,
            name = escape_xml(name),
            r_id = escape_xml(r_id),
            x = x,
            y = y,
            cx = cx,
            cy = cy,
        );
    }

    fn take_id(&mut self) -> u32 {
        let id = self.next_shape_id;
        self.next_shape_id += 1;
        id
    }

    /// Render the complete slide part.
    pub fn into_xml(self) -> String {
        let mut xml = String::with_capacity(1024 + self.shapes.len());
        xml.push_str(XML_DECL);
        let _ = write!(
            xml,
            "<p:sld xmlns:a=\"{}\" xmlns:r=\"{}\" xmlns:p=\"{}\">",
            namespace::DML,
            namespace::R,
            namespace::PML,
        );
        xml.push_str("<p:cSld><p:spTree>");
        xml.push_str(
            "<p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>",
        );
        xml.push_str(
            "<p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/><a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>",
        );
        xml.push_str(&self.shapes);
        xml.push_str("</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
        xml
    }
}

impl Default for SlideXmlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shape name stem by placeholder type, matching the names the desktop
/// application gives freshly inserted placeholders.
fn placeholder_basename(ph_type: Option<&str>) -> &'static str {
    match ph_type {
        Some("title") | Some("ctrTitle") => "Title",
        Some("subTitle") => "Subtitle",
        Some("body") => "Text Placeholder",
        None | Some("obj") => "Content Placeholder",
        Some("pic") => "Picture Placeholder",
        Some("dt") => "Date Placeholder",
        Some("ftr") => "Footer Placeholder",
        Some("sldNum") => "Slide Number Placeholder",
        _ => "Placeholder",
    }
}

/// Render a notes-slide part holding `text`, one paragraph per line.
pub fn notes_slide_xml(text: &str) -> String {
    let mut xml = String::with_capacity(1024 + text.len());
    xml.push_str(XML_DECL);
    let _ = write!(
        xml,
        "<p:notes xmlns:a=\"{}\" xmlns:r=\"{}\" xmlns:p=\"{}\">",
        namespace::DML,
        namespace::R,
        namespace::PML,
    );
    xml.push_str("<p:cSld><p:spTree>");
    xml.push_str(
        "<p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>",
    );
    xml.push_str(
        "<p:sp><p:nvSpPr><p:cNvPr id=\"2\" name=\"Notes Placeholder 1\"/><p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr><p:nvPr><p:ph type=\"body\" idx=\"1\"/></p:nvPr></p:nvSpPr><p:spPr/>",
    );
    xml.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
    for line in text.split('\n') {
        let _ = write!(
            xml,
            "<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>",
            escape_xml(line),
        );
    }
    xml.push_str("</p:txBody></p:sp>");
    xml.push_str("</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:notes>");
    xml
}
