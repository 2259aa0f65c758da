//! A package part: partname, content type, blob and relationships.

use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::PackURI;
use crate::opc::rel::Relationships;

/// One part of an OPC package.
///
/// Parts hold their serialized bytes; the XML layers above parse and rewrite
/// blobs rather than keeping a live object tree per part.
#[derive(Debug, Clone)]
pub struct Part {
    partname: PackURI,
    content_type: String,
    blob: Vec<u8>,
    rels: Relationships,
}

impl Part {
    pub fn new(partname: PackURI, content_type: impl Into<String>, blob: Vec<u8>) -> Self {
        let rels = Relationships::new(partname.base_uri());
        Self {
            partname,
            content_type: content_type.into(),
            blob,
            rels,
        }
    }

    /// Assemble a part loaded from an archive together with its parsed `.rels`.
    pub(crate) fn from_loaded(
        partname: PackURI,
        content_type: String,
        blob: Vec<u8>,
        rels: Relationships,
    ) -> Self {
        Self {
            partname,
            content_type,
            blob,
            rels,
        }
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    #[inline]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[inline]
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    pub fn set_blob(&mut self, blob: Vec<u8>) {
        self.blob = blob;
    }

    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    #[inline]
    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// Relate this part to `target`, reusing an existing relationship when one
    /// matches. Returns the rId.
    pub fn relate_to(&mut self, target: &PackURI, reltype: &str) -> String {
        let target_ref = target.relative_ref(&self.partname.base_uri());
        self.rels.get_or_add(reltype, &target_ref)
    }

    /// Absolute partname targeted by one of this part's relationships.
    pub fn target_partname(&self, r_id: &str) -> Result<PackURI> {
        let rel = self
            .rels
            .get(r_id)
            .ok_or_else(|| OpcError::RelationshipNotFound(r_id.to_string()))?;
        rel.target_partname(&self.partname.base_uri())
    }
}
