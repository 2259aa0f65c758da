//! Physical package access: the ZIP container beneath the logical model.

use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::PackURI;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Reads all ZIP members into memory, keyed by member name.
///
/// Packages are small enough that decoding everything up front is cheaper
/// than tracking archive offsets through the graph walk.
pub struct PhysPkgReader {
    members: HashMap<String, Vec<u8>>,
}

impl PhysPkgReader {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut members = HashMap::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut blob = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut blob)?;
            members.insert(file.name().to_string(), blob);
        }
        Ok(Self { members })
    }

    /// The `[Content_Types].xml` stream; its absence means the archive is not
    /// an OPC package at all.
    pub fn content_types_xml(&self) -> Result<&[u8]> {
        self.members
            .get(PackURI::content_types().membername())
            .map(Vec::as_slice)
            .ok_or_else(|| OpcError::PartNotFound(PackURI::content_types().to_string()))
    }

    /// The `.rels` stream for a part (or the package), if present.
    pub fn rels_xml_for(&self, source_uri: &PackURI) -> Option<&[u8]> {
        self.members
            .get(source_uri.rels_uri().membername())
            .map(Vec::as_slice)
    }

    /// Remove and return a member's bytes, so each blob is moved exactly once.
    pub fn take_blob(&mut self, partname: &PackURI) -> Option<Vec<u8>> {
        self.members.remove(partname.membername())
    }
}

/// Streams members into a deflate-compressed ZIP held in memory.
pub struct PhysPkgWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl PhysPkgWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    pub fn write(&mut self, partname: &PackURI, blob: &[u8]) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(partname.membername(), options)?;
        self.zip.write_all(blob)?;
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for PhysPkgWriter {
    fn default() -> Self {
        Self::new()
    }
}
