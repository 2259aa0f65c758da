//! The logical package: relationships plus a map of parts.

use crate::opc::constants::relationship_type as rt;
use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::{PACKAGE_URI, PackURI};
use crate::opc::part::Part;
use crate::opc::pkgreader::PackageReader;
use crate::opc::pkgwriter::PackageWriter;
use crate::opc::rel::Relationships;
use std::collections::{HashSet, VecDeque};

/// An OPC package held entirely in memory.
#[derive(Debug, Clone)]
pub struct OpcPackage {
    rels: Relationships,
    parts: std::collections::HashMap<String, Part>,
}

impl OpcPackage {
    pub fn new() -> Self {
        Self {
            rels: Relationships::new(PACKAGE_URI),
            parts: std::collections::HashMap::new(),
        }
    }

    pub(crate) fn with_rels(rels: Relationships) -> Self {
        Self {
            rels,
            parts: std::collections::HashMap::new(),
        }
    }

    /// Deserialize a package from ZIP bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        PackageReader::read(data)
    }

    /// Serialize the reachable part graph to ZIP bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PackageWriter::to_bytes(self)
    }

    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    #[inline]
    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    pub fn part(&self, partname: &str) -> Option<&Part> {
        self.parts.get(partname)
    }

    pub fn part_mut(&mut self, partname: &str) -> Option<&mut Part> {
        self.parts.get_mut(partname)
    }

    pub fn contains_part(&self, partname: &str) -> bool {
        self.parts.contains_key(partname)
    }

    pub fn insert_part(&mut self, part: Part) {
        self.parts.insert(part.partname().to_string(), part);
    }

    pub fn remove_part(&mut self, partname: &str) -> Option<Part> {
        self.parts.remove(partname)
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn iter_parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    /// The part targeted by the package-level officeDocument relationship.
    pub fn main_document_part(&self) -> Result<&Part> {
        let target_ref = self.rels.part_with_reltype(rt::OFFICE_DOCUMENT)?;
        let partname = PackURI::from_rel_ref(PACKAGE_URI, target_ref)?;
        self.part(&partname)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Relate the package itself to a part. Returns the rId.
    pub fn relate_to(&mut self, target: &PackURI, reltype: &str) -> String {
        self.rels.get_or_add(reltype, &target.relative_ref(PACKAGE_URI))
    }

    /// First free partname matching `template`, where `%d` stands for a
    /// 1-based index. Candidate indexes are tried in order so removed parts'
    /// names are reused.
    pub fn next_partname(&self, template: &str) -> Result<PackURI> {
        for n in 1..=9999usize {
            let candidate = template.replace("%d", &n.to_string());
            if !self.parts.contains_key(&candidate) {
                return PackURI::new(candidate);
            }
        }
        Err(OpcError::PartnameExhausted(template.to_string()))
    }

    /// Parts reachable from the package relationships, in breadth-first
    /// order. Relationship traversal is ordered by rId so the result is
    /// deterministic.
    pub fn reachable_parts(&self) -> Vec<&Part> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<PackURI> = VecDeque::new();

        for rel in self.rels.sorted() {
            if rel.is_external() {
                continue;
            }
            if let Ok(partname) = rel.target_partname(PACKAGE_URI) {
                if self.contains_part(&partname) && visited.insert(partname.to_string()) {
                    queue.push_back(partname);
                }
            }
        }

        let mut parts = Vec::new();
        while let Some(partname) = queue.pop_front() {
            let Some(part) = self.part(&partname) else {
                continue;
            };
            parts.push(part);
            for rel in part.rels().sorted() {
                if rel.is_external() {
                    continue;
                }
                if let Ok(target) = rel.target_partname(&partname.base_uri()) {
                    if self.contains_part(&target) && visited.insert(target.to_string()) {
                        queue.push_back(target);
                    }
                }
            }
        }
        parts
    }
}

impl Default for OpcPackage {
    fn default() -> Self {
        Self::new()
    }
}
