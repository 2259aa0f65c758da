//! Package loading: content types plus a relationship-graph walk.

use crate::opc::error::{OpcError, Result};
use crate::opc::package::OpcPackage;
use crate::opc::packuri::{PACKAGE_URI, PackURI};
use crate::opc::part::Part;
use crate::opc::phys_pkg::PhysPkgReader;
use crate::opc::rel::Relationships;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::{HashMap, HashSet, VecDeque};

/// Loads an [`OpcPackage`] from serialized bytes.
///
/// Only parts reachable from the package relationships are loaded. Archive
/// members nobody points at are ignored, and relationship targets missing
/// from the archive are skipped rather than treated as fatal; both occur in
/// real-world files.
pub struct PackageReader;

impl PackageReader {
    pub fn read(data: &[u8]) -> Result<OpcPackage> {
        let mut phys = PhysPkgReader::from_bytes(data)?;
        let content_types = ContentTypeMap::from_xml(phys.content_types_xml()?)?;

        let pkg_rels_xml = phys
            .rels_xml_for(&PackURI::package())
            .ok_or_else(|| OpcError::PartNotFound(PackURI::package().rels_uri().to_string()))?
            .to_vec();
        let pkg_rels = Relationships::from_xml(PACKAGE_URI, &pkg_rels_xml)?;

        let mut package = OpcPackage::with_rels(pkg_rels);
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<PackURI> = VecDeque::new();

        let seeds: Vec<PackURI> = package
            .rels()
            .iter()
            .filter(|rel| !rel.is_external())
            .filter_map(|rel| rel.target_partname(PACKAGE_URI).ok())
            .collect();
        for partname in seeds {
            if visited.insert(partname.to_string()) {
                queue.push_back(partname);
            }
        }

        while let Some(partname) = queue.pop_front() {
            // Dangling relationship: target member absent from the archive.
            let Some(blob) = phys.take_blob(&partname) else {
                continue;
            };
            let content_type = content_types.content_type_for(&partname)?.to_string();

            let rels = match phys.rels_xml_for(&partname) {
                Some(xml) => {
                    let xml = xml.to_vec();
                    Relationships::from_xml(partname.base_uri(), &xml)?
                }
                None => Relationships::new(partname.base_uri()),
            };

            for rel in rels.iter().filter(|rel| !rel.is_external()) {
                if let Ok(target) = rel.target_partname(&partname.base_uri()) {
                    if visited.insert(target.to_string()) {
                        queue.push_back(target);
                    }
                }
            }

            package.insert_part(Part::from_loaded(partname, content_type, blob, rels));
        }

        Ok(package)
    }
}

/// Parsed form of `[Content_Types].xml`.
pub struct ContentTypeMap {
    /// Extension (lowercased, no dot) to content type.
    defaults: HashMap<String, String>,
    /// Exact partname to content type; wins over any default.
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut defaults = HashMap::new();
        let mut overrides = HashMap::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"Default" => {
                        let mut extension = None;
                        let mut content_type = None;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"Extension" => extension = Some(attr_value(&attr)?),
                                b"ContentType" => content_type = Some(attr_value(&attr)?),
                                _ => {}
                            }
                        }
                        if let (Some(ext), Some(ct)) = (extension, content_type) {
                            defaults.insert(ext.to_lowercase(), ct);
                        }
                    }
                    b"Override" => {
                        let mut partname = None;
                        let mut content_type = None;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"PartName" => partname = Some(attr_value(&attr)?),
                                b"ContentType" => content_type = Some(attr_value(&attr)?),
                                _ => {}
                            }
                        }
                        if let (Some(name), Some(ct)) = (partname, content_type) {
                            overrides.insert(name, ct);
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OpcError::Xml(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self {
            defaults,
            overrides,
        })
    }

    pub fn content_type_for(&self, partname: &PackURI) -> Result<&str> {
        if let Some(ct) = self.overrides.get(partname.as_str()) {
            return Ok(ct);
        }
        let ext = partname.ext().to_lowercase();
        self.defaults
            .get(&ext)
            .map(String::as_str)
            .ok_or_else(|| OpcError::MissingContentType(partname.to_string()))
    }
}

fn attr_value(attr: &quick_xml::events::attributes::Attribute<'_>) -> Result<String> {
    attr.unescape_value()
        .map(|v| v.into_owned())
        .map_err(|e| OpcError::Xml(e.to_string()))
}
