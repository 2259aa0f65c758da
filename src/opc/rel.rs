//! Relationship collections, one per part plus one for the package.

use crate::common::xml::escape_xml;
use crate::opc::constants::namespace;
use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::Write;

/// A single `<Relationship>` entry.
#[derive(Debug, Clone)]
pub struct Relationship {
    r_id: String,
    reltype: String,
    target_ref: String,
    is_external: bool,
}

impl Relationship {
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Raw `Target` attribute value. Relative for internal relationships,
    /// a full URL for external ones.
    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Resolve the target to an absolute partname, given the base URI of the
    /// part this relationship belongs to.
    pub fn target_partname(&self, base_uri: &str) -> Result<PackURI> {
        if self.is_external {
            return Err(OpcError::InvalidPackUri(format!(
                "external relationship {} has no partname",
                self.r_id
            )));
        }
        PackURI::from_rel_ref(base_uri, &self.target_ref)
    }
}

/// The relationships of one source: either the package or a single part.
#[derive(Debug, Clone)]
pub struct Relationships {
    base_uri: String,
    by_rid: HashMap<String, Relationship>,
}

impl Relationships {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            by_rid: HashMap::new(),
        }
    }

    /// Parse a `.rels` stream.
    pub fn from_xml(base_uri: impl Into<String>, xml: &[u8]) -> Result<Self> {
        let mut rels = Self::new(base_uri);
        for parsed in parse_rels_xml(xml)? {
            rels.add_relationship(parsed.r_id, parsed.reltype, parsed.target_ref, parsed.is_external);
        }
        Ok(rels)
    }

    #[inline]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_rid.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_rid.is_empty()
    }

    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.by_rid.get(r_id)
    }

    pub fn remove(&mut self, r_id: &str) -> Option<Relationship> {
        self.by_rid.remove(r_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.by_rid.values()
    }

    /// Relationships ordered by their numeric rId, non-standard ids last.
    pub fn sorted(&self) -> Vec<&Relationship> {
        let mut rels: Vec<&Relationship> = self.by_rid.values().collect();
        rels.sort_by(|a, b| {
            rid_ordinal(&a.r_id)
                .cmp(&rid_ordinal(&b.r_id))
                .then_with(|| a.r_id.cmp(&b.r_id))
        });
        rels
    }

    /// Insert a relationship under an explicit id, as read from a `.rels` part.
    pub fn add_relationship(
        &mut self,
        r_id: impl Into<String>,
        reltype: impl Into<String>,
        target_ref: impl Into<String>,
        is_external: bool,
    ) {
        let r_id = r_id.into();
        self.by_rid.insert(
            r_id.clone(),
            Relationship {
                r_id,
                reltype: reltype.into(),
                target_ref: target_ref.into(),
                is_external,
            },
        );
    }

    /// Return the rId of a matching internal relationship, adding one under
    /// the next free id if none exists yet.
    pub fn get_or_add(&mut self, reltype: &str, target_ref: &str) -> String {
        if let Some(rel) = self
            .by_rid
            .values()
            .find(|r| !r.is_external && r.reltype == reltype && r.target_ref == target_ref)
        {
            return rel.r_id.clone();
        }
        let r_id = self.next_r_id();
        self.add_relationship(r_id.clone(), reltype, target_ref, false);
        r_id
    }

    /// Smallest unused `rId{n}`, filling gaps left by removed relationships.
    pub fn next_r_id(&self) -> String {
        let mut n = 1usize;
        loop {
            let candidate = format!("rId{n}");
            if !self.by_rid.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Target reference of the single relationship of `reltype`.
    pub fn part_with_reltype(&self, reltype: &str) -> Result<&str> {
        let mut matching = self.by_rid.values().filter(|r| r.reltype == reltype);
        match (matching.next(), matching.next()) {
            (Some(rel), None) => Ok(&rel.target_ref),
            (None, _) => Err(OpcError::RelationshipNotFound(reltype.to_string())),
            (Some(_), Some(_)) => Err(OpcError::AmbiguousRelationship {
                reltype: reltype.to_string(),
                count: self.by_rid.values().filter(|r| r.reltype == reltype).count(),
            }),
        }
    }

    /// Any relationship of `reltype`, for parts that occur zero-or-once.
    pub fn find_reltype(&self, reltype: &str) -> Option<&Relationship> {
        self.by_rid.values().find(|r| r.reltype == reltype)
    }

    /// Serialize to `.rels` XML.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(128 + self.by_rid.len() * 128);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        let _ = write!(xml, "<Relationships xmlns=\"{}\">", namespace::RELATIONSHIPS);
        for rel in self.sorted() {
            let _ = write!(
                xml,
                "<Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"",
                escape_xml(&rel.r_id),
                escape_xml(&rel.reltype),
                escape_xml(&rel.target_ref),
            );
            if rel.is_external {
                xml.push_str(" TargetMode=\"External\"");
            }
            xml.push_str("/>");
        }
        xml.push_str("</Relationships>");
        xml
    }
}

fn rid_ordinal(r_id: &str) -> u64 {
    r_id.strip_prefix("rId")
        .and_then(|n| n.parse().ok())
        .unwrap_or(u64::MAX)
}

struct ParsedRel {
    r_id: String,
    reltype: String,
    target_ref: String,
    is_external: bool,
}

fn parse_rels_xml(xml: &[u8]) -> Result<SmallVec<[ParsedRel; 8]>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut rels = SmallVec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let mut r_id = None;
                    let mut reltype = None;
                    let mut target_ref = None;
                    let mut is_external = false;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => r_id = Some(attr_value(&attr)?),
                            b"Type" => reltype = Some(attr_value(&attr)?),
                            b"Target" => target_ref = Some(attr_value(&attr)?),
                            b"TargetMode" => is_external = attr.value.as_ref() == b"External",
                            _ => {}
                        }
                    }
                    if let (Some(r_id), Some(reltype), Some(target_ref)) = (r_id, reltype, target_ref)
                    {
                        rels.push(ParsedRel {
                            r_id,
                            reltype,
                            target_ref,
                            is_external,
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(OpcError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

fn attr_value(attr: &quick_xml::events::attributes::Attribute<'_>) -> Result<String> {
    attr.unescape_value()
        .map(|v| v.into_owned())
        .map_err(|e| OpcError::Xml(e.to_string()))
}
