//! The presentation package: an OPC package validated as PresentationML.

use crate::opc::constants::{content_type as ct, relationship_type as rt};
use crate::opc::packuri::PACKAGE_URI;
use crate::opc::{OpcPackage, PackURI, Part};
use crate::pptx::error::{PptxError, Result};
use crate::pptx::presentation;
use std::path::Path;

/// A `.pptx` package.
///
/// Wraps [`OpcPackage`] with accessors for the presentation part, the layout
/// roster and the slide list. Construction validates that the package's main
/// part actually is a presentation.
#[derive(Debug)]
pub struct PptxPackage {
    opc: OpcPackage,
}

impl PptxPackage {
    /// Parse template bytes, validating the main part's content type.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let opc = OpcPackage::from_bytes(data)?;
        let content_type = opc.main_document_part()?.content_type().to_string();
        match content_type.as_str() {
            ct::PML_PRESENTATION_MAIN | ct::PML_PRES_MACRO_MAIN => Ok(Self { opc }),
            got => Err(PptxError::InvalidContentType {
                expected: ct::PML_PRESENTATION_MAIN.to_string(),
                got: got.to_string(),
            }),
        }
    }

    /// Open a `.pptx` file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path).map_err(crate::opc::OpcError::from)?;
        Self::from_bytes(&data)
    }

    #[inline]
    pub fn opc(&self) -> &OpcPackage {
        &self.opc
    }

    #[inline]
    pub fn opc_mut(&mut self) -> &mut OpcPackage {
        &mut self.opc
    }

    /// Serialize the package.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.opc.to_bytes()?)
    }

    /// Partname of the presentation part (usually `/ppt/presentation.xml`).
    pub fn presentation_partname(&self) -> Result<PackURI> {
        let target_ref = self.opc.rels().part_with_reltype(rt::OFFICE_DOCUMENT)?;
        Ok(PackURI::from_rel_ref(PACKAGE_URI, target_ref)?)
    }

    pub fn presentation_part(&self) -> Result<&Part> {
        let partname = self.presentation_partname()?;
        self.opc
            .part(&partname)
            .ok_or_else(|| PptxError::PartNotFound(partname.to_string()))
    }

    pub fn presentation_part_mut(&mut self) -> Result<&mut Part> {
        let partname = self.presentation_partname()?;
        self.opc
            .part_mut(&partname)
            .ok_or_else(|| PptxError::PartNotFound(partname.to_string()))
    }

    /// Layout partnames of the first slide master, in `sldLayoutIdLst` order.
    ///
    /// Layout indexes used throughout the crate are positions in this list.
    /// Templates with no master (or no layouts) yield an empty roster.
    pub fn layout_partnames(&self) -> Result<Vec<PackURI>> {
        let pres = self.presentation_part()?;
        let master_rids = presentation::slide_master_rids(pres.blob())?;
        let Some(first_master_rid) = master_rids.first() else {
            return Ok(Vec::new());
        };
        let master_partname = pres.target_partname(first_master_rid)?;
        let Some(master) = self.opc.part(&master_partname) else {
            return Ok(Vec::new());
        };

        let mut layouts = Vec::new();
        for rid in presentation::slide_layout_rids(master.blob())? {
            let partname = master.target_partname(&rid)?;
            if self.opc.contains_part(&partname) {
                layouts.push(partname);
            }
        }
        Ok(layouts)
    }

    /// Slide partnames in `sldIdLst` order.
    pub fn slide_partnames(&self) -> Result<Vec<PackURI>> {
        let pres = self.presentation_part()?;
        let mut slides = Vec::new();
        for entry in presentation::slide_entries(pres.blob())? {
            let Ok(partname) = pres.target_partname(&entry.r_id) else {
                continue;
            };
            if self.opc.contains_part(&partname) {
                slides.push(partname);
            }
        }
        Ok(slides)
    }

    /// The notes master part, when the template carries one.
    pub fn notes_master_partname(&self) -> Result<Option<PackURI>> {
        let pres = self.presentation_part()?;
        match pres.rels().find_reltype(rt::NOTES_MASTER) {
            Some(rel) => Ok(Some(rel.target_partname(&pres.partname().base_uri())?)),
            None => Ok(None),
        }
    }
}
