//! Hand-assembled `.pptx` packages for tests.
//!
//! `two_layout_template` models the template shape the deck builder is
//! exercised against: one master with two layouts (3 and 2 placeholders),
//! one pre-existing slide, two PNG media parts, a notes master, core
//! properties. The no-image and empty variants cover the degenerate cases.

use crate::opc::constants::{content_type as ct, namespace as ns, relationship_type as rt};
use std::fmt::Write as _;
use std::io::Write as _;

const NS_DECLS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

/// Minimal but well-formed PNG with the given pixel dimensions.
///
/// CRC fields are zeroed; header-sniffing code never checks them.
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    png.extend_from_slice(&13u32.to_be_bytes());
    png.extend_from_slice(b"IHDR");
    png.extend_from_slice(&width.to_be_bytes());
    png.extend_from_slice(&height.to_be_bytes());
    // bit depth 8, RGBA, default compression/filter/interlace
    png.extend_from_slice(&[8, 6, 0, 0, 0]);
    png.extend_from_slice(&[0, 0, 0, 0]);
    png.extend_from_slice(&0u32.to_be_bytes());
    png.extend_from_slice(b"IEND");
    png.extend_from_slice(&[0, 0, 0, 0]);
    png
}

fn zip_bytes(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn rels_xml(rels: &[(&str, &str, &str)]) -> Vec<u8> {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}">"#,
        ns::RELATIONSHIPS
    );
    for (r_id, reltype, target) in rels {
        let _ = write!(
            xml,
            r#"<Relationship Id="{r_id}" Type="{reltype}" Target="{target}"/>"#
        );
    }
    xml.push_str("</Relationships>");
    xml.into_bytes()
}

fn content_types_xml(overrides: &[(&str, &str)]) -> Vec<u8> {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="{}">"#,
        ns::CONTENT_TYPES
    );
    let _ = write!(
        xml,
        r#"<Default Extension="rels" ContentType="{}"/><Default Extension="xml" ContentType="{}"/><Default Extension="png" ContentType="{}"/>"#,
        ct::OPC_RELATIONSHIPS,
        ct::XML,
        ct::PNG
    );
    for (partname, content_type) in overrides {
        let _ = write!(
            xml,
            r#"<Override PartName="{partname}" ContentType="{content_type}"/>"#
        );
    }
    xml.push_str("</Types>");
    xml.into_bytes()
}

fn sp_xml(id: u32, name: &str, ph_attrs: &str, prompt: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr/><p:nvPr><p:ph {ph_attrs}/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>{prompt}</a:t></a:r></a:p></p:txBody></p:sp>"#
    )
}

fn pic_xml(id: u32, name: &str, r_id: &str) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="{name}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{r_id}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr/></p:pic>"#
    )
}

fn sp_tree(shapes: &str) -> String {
    format!(
        r#"<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{shapes}</p:spTree></p:cSld>"#
    )
}

const CLR_MAP: &str = r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#;

fn build_template(with_images: bool) -> Vec<u8> {
    let presentation = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {NS_DECLS}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:notesMasterIdLst><p:notesMasterId r:id="rId3"/></p:notesMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rId2"/></p:sldIdLst><p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
    );

    let master = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster {NS_DECLS}>{tree}{CLR_MAP}<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/><p:sldLayoutId id="2147483650" r:id="rId2"/></p:sldLayoutIdLst></p:sldMaster>"#,
        tree = sp_tree("")
    );

    let mut layout1_shapes = sp_xml(2, "Title 1", r#"type="title""#, "Click to edit Master title style")
        + &sp_xml(3, "Content Placeholder 2", r#"idx="1""#, "Edit Master text styles")
        + &sp_xml(4, "Footer Placeholder 3", r#"type="ftr" sz="quarter" idx="11""#, "Footer");
    if with_images {
        layout1_shapes.push_str(&pic_xml(5, "company_logo", "rId2"));
    }
    let layout1 = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {NS_DECLS} type="tx">{tree}<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        tree = sp_tree(&layout1_shapes)
    );

    let mut layout2_shapes = sp_xml(2, "Title 1", r#"type="ctrTitle""#, "Click to edit Master title style")
        + &sp_xml(3, "Subtitle 2", r#"type="subTitle" idx="1""#, "Click to edit Master subtitle style");
    if with_images {
        layout2_shapes.push_str(&pic_xml(4, "sidebar_art", "rId2"));
    }
    let layout2 = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {NS_DECLS} type="title">{tree}<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        tree = sp_tree(&layout2_shapes)
    );

    let mut slide1_shapes = sp_xml(2, "Title 1", r#"type="title""#, "Original deck title");
    if with_images {
        slide1_shapes.push_str(&pic_xml(3, "company_logo", "rId2"));
        slide1_shapes.push_str(&pic_xml(4, "", "rId3"));
    }
    let slide1 = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {NS_DECLS}>{tree}<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        tree = sp_tree(&slide1_shapes)
    );

    let notes_master = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notesMaster {NS_DECLS}>{tree}{CLR_MAP}</p:notesMaster>"#,
        tree = sp_tree("")
    );

    let theme = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="{}" name="Office"><a:themeElements><a:clrScheme name="Office"/><a:fontScheme name="Office"/><a:fmtScheme name="Office"/></a:themeElements></a:theme>"#,
        ns::DML
    );

    let core = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>Fixture Deck</dc:title><dcterms:created xsi:type="dcterms:W3CDTF">2020-01-01T00:00:00Z</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">2020-01-01T00:00:00Z</dcterms:modified></cp:coreProperties>"#.to_vec();

    let mut layout_rels = vec![("rId1", rt::SLIDE_MASTER, "../slideMasters/slideMaster1.xml")];
    let mut layout2_rels = layout_rels.clone();
    let mut slide_rels = vec![("rId1", rt::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml")];
    if with_images {
        layout_rels.push(("rId2", rt::IMAGE, "../media/image1.png"));
        layout2_rels.push(("rId2", rt::IMAGE, "../media/image2.png"));
        slide_rels.push(("rId2", rt::IMAGE, "../media/image1.png"));
        slide_rels.push(("rId3", rt::IMAGE, "../media/image2.png"));
    }

    let mut entries = vec![
        (
            "[Content_Types].xml",
            content_types_xml(&[
                ("/ppt/presentation.xml", ct::PML_PRESENTATION_MAIN),
                ("/ppt/slideMasters/slideMaster1.xml", ct::PML_SLIDE_MASTER),
                ("/ppt/slideLayouts/slideLayout1.xml", ct::PML_SLIDE_LAYOUT),
                ("/ppt/slideLayouts/slideLayout2.xml", ct::PML_SLIDE_LAYOUT),
                ("/ppt/slides/slide1.xml", ct::PML_SLIDE),
                ("/ppt/notesMasters/notesMaster1.xml", ct::PML_NOTES_MASTER),
                ("/ppt/theme/theme1.xml", ct::OFC_THEME),
                ("/docProps/core.xml", ct::OPC_CORE_PROPERTIES),
            ]),
        ),
        (
            "_rels/.rels",
            rels_xml(&[
                ("rId1", rt::OFFICE_DOCUMENT, "ppt/presentation.xml"),
                ("rId2", rt::CORE_PROPERTIES, "docProps/core.xml"),
            ]),
        ),
        ("ppt/presentation.xml", presentation.into_bytes()),
        (
            "ppt/_rels/presentation.xml.rels",
            rels_xml(&[
                ("rId1", rt::SLIDE_MASTER, "slideMasters/slideMaster1.xml"),
                ("rId2", rt::SLIDE, "slides/slide1.xml"),
                ("rId3", rt::NOTES_MASTER, "notesMasters/notesMaster1.xml"),
            ]),
        ),
        ("ppt/slideMasters/slideMaster1.xml", master.into_bytes()),
        (
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            rels_xml(&[
                ("rId1", rt::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"),
                ("rId2", rt::SLIDE_LAYOUT, "../slideLayouts/slideLayout2.xml"),
                ("rId3", rt::THEME, "../theme/theme1.xml"),
            ]),
        ),
        ("ppt/slideLayouts/slideLayout1.xml", layout1.into_bytes()),
        (
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            rels_xml(&layout_rels),
        ),
        ("ppt/slideLayouts/slideLayout2.xml", layout2.into_bytes()),
        (
            "ppt/slideLayouts/_rels/slideLayout2.xml.rels",
            rels_xml(&layout2_rels),
        ),
        ("ppt/slides/slide1.xml", slide1.into_bytes()),
        ("ppt/slides/_rels/slide1.xml.rels", rels_xml(&slide_rels)),
        ("ppt/notesMasters/notesMaster1.xml", notes_master.into_bytes()),
        (
            "ppt/notesMasters/_rels/notesMaster1.xml.rels",
            rels_xml(&[("rId1", rt::THEME, "../theme/theme1.xml")]),
        ),
        ("ppt/theme/theme1.xml", theme.into_bytes()),
        ("docProps/core.xml", core),
    ];
    if with_images {
        entries.push(("ppt/media/image1.png", png_bytes(400, 300)));
        entries.push(("ppt/media/image2.png", png_bytes(200, 200)));
    }
    zip_bytes(&entries)
}

/// Template with two layouts (3 and 2 placeholders), one original slide and
/// two layout images named `company_logo` and `sidebar_art`.
pub(crate) fn two_layout_template() -> Vec<u8> {
    build_template(true)
}

/// Same structure without any picture shapes or media parts.
pub(crate) fn two_layout_template_no_images() -> Vec<u8> {
    build_template(false)
}

/// A presentation part with no masters, layouts or slides.
pub(crate) fn empty_template() -> Vec<u8> {
    let presentation = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {NS_DECLS}><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
    );
    zip_bytes(&[
        (
            "[Content_Types].xml",
            content_types_xml(&[("/ppt/presentation.xml", ct::PML_PRESENTATION_MAIN)]),
        ),
        (
            "_rels/.rels",
            rels_xml(&[("rId1", rt::OFFICE_DOCUMENT, "ppt/presentation.xml")]),
        ),
        ("ppt/presentation.xml", presentation.into_bytes()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opc::OpcPackage;

    #[test]
    fn test_fixture_packages_parse() {
        let package = OpcPackage::from_bytes(&two_layout_template()).unwrap();
        assert!(package.contains_part(&crate::opc::PackURI::new("/ppt/media/image2.png").unwrap()));
        OpcPackage::from_bytes(&two_layout_template_no_images()).unwrap();
        OpcPackage::from_bytes(&empty_template()).unwrap();
    }

    #[test]
    fn test_png_bytes_carry_requested_dimensions() {
        let png = png_bytes(400, 300);
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(crate::pptx::ImageFormat::dimensions(&png), Some((400, 300)));
    }
}
