//! Package serialization.

use crate::common::xml::escape_xml;
use crate::opc::constants::{content_type as ct, namespace};
use crate::opc::error::Result;
use crate::opc::package::OpcPackage;
use crate::opc::packuri::PackURI;
use crate::opc::part::Part;
use crate::opc::phys_pkg::PhysPkgWriter;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

/// Serializes an [`OpcPackage`] to ZIP bytes.
///
/// Writes `[Content_Types].xml` first, then the package `.rels`, then every
/// reachable part followed by its `.rels` stream. Unreachable parts are left
/// out, which is how removed slides disappear from the output.
pub struct PackageWriter;

impl PackageWriter {
    pub fn write<P: AsRef<Path>>(path: P, package: &OpcPackage) -> Result<()> {
        std::fs::write(path, Self::to_bytes(package)?)?;
        Ok(())
    }

    pub fn write_to_stream<W: Write>(mut stream: W, package: &OpcPackage) -> Result<()> {
        stream.write_all(&Self::to_bytes(package)?)?;
        Ok(())
    }

    pub fn to_bytes(package: &OpcPackage) -> Result<Vec<u8>> {
        let mut phys = PhysPkgWriter::new();
        let parts = package.reachable_parts();

        let types = ContentTypesItem::from_parts(parts.iter().copied());
        phys.write(&PackURI::content_types(), types.to_xml().as_bytes())?;
        phys.write(
            &PackURI::package().rels_uri(),
            package.rels().to_xml().as_bytes(),
        )?;

        for part in &parts {
            phys.write(part.partname(), part.blob())?;
            if !part.rels().is_empty() {
                phys.write(&part.partname().rels_uri(), part.rels().to_xml().as_bytes())?;
            }
        }

        phys.finish()
    }
}

/// Composes `[Content_Types].xml` for a set of parts.
///
/// Extensions with a canonical content type get a `Default` entry; everything
/// else gets a per-part `Override`.
struct ContentTypesItem {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypesItem {
    fn new() -> Self {
        let mut defaults = HashMap::new();
        // Every package carries .rels parts, and plain .xml is common enough
        // to always declare.
        defaults.insert("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), ct::XML.to_string());
        Self {
            defaults,
            overrides: HashMap::new(),
        }
    }

    fn from_parts<'a>(parts: impl Iterator<Item = &'a Part>) -> Self {
        let mut types = Self::new();
        for part in parts {
            types.add_content_type(part.partname(), part.content_type());
        }
        types
    }

    fn add_content_type(&mut self, partname: &PackURI, content_type: &str) {
        let ext = partname.ext().to_lowercase();
        if is_default_content_type(&ext, content_type) {
            self.defaults.insert(ext, content_type.to_string());
        } else {
            self.overrides
                .insert(partname.to_string(), content_type.to_string());
        }
    }

    fn to_xml(&self) -> String {
        let mut defaults: Vec<(&str, &str)> = self
            .defaults
            .iter()
            .map(|(ext, ct)| (ext.as_str(), ct.as_str()))
            .collect();
        defaults.sort_unstable();
        let mut overrides: Vec<(&str, &str)> = self
            .overrides
            .iter()
            .map(|(name, ct)| (name.as_str(), ct.as_str()))
            .collect();
        overrides.sort_unstable();

        let mut xml =
            String::with_capacity(128 + (defaults.len() + overrides.len()) * 96);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        let _ = write!(xml, "<Types xmlns=\"{}\">", namespace::CONTENT_TYPES);
        for (ext, content_type) in defaults {
            let _ = write!(
                xml,
                "<Default Extension=\"{}\" ContentType=\"{}\"/>",
                escape_xml(ext),
                escape_xml(content_type),
            );
        }
        for (partname, content_type) in overrides {
            let _ = write!(
                xml,
                "<Override PartName=\"{}\" ContentType=\"{}\"/>",
                escape_xml(partname),
                escape_xml(content_type),
            );
        }
        xml.push_str("</Types>");
        xml
    }
}

/// Pairs that may be expressed as a `Default` rather than an `Override`.
fn is_default_content_type(ext: &str, content_type: &str) -> bool {
    matches!(
        (ext, content_type),
        ("rels", ct::OPC_RELATIONSHIPS)
            | ("xml", ct::XML)
            | ("bmp", ct::BMP)
            | ("gif", ct::GIF)
            | ("jpg", ct::JPEG)
            | ("jpeg", ct::JPEG)
            | ("png", ct::PNG)
            | ("tif", ct::TIFF)
            | ("tiff", ct::TIFF)
    )
}
