//! Structural summary of a template, serialized into the planning prompt.

use crate::pptx::{PptxPackage, Result, top_level_shapes};
use serde::{Deserialize, Serialize};

/// One layout of the template's first master, in roster order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    /// Position in the layout roster; `layout_index` in a slide spec refers
    /// to this.
    pub index: usize,
    /// Number of placeholder shapes directly on the layout.
    pub placeholder_count: usize,
}

/// One image found on the template's original slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub name: String,
}

/// What the template offers: layouts to build on and images to reuse.
///
/// Advisory only. The plan that comes back is re-validated against the
/// template at build time, so out-of-inventory values never break the build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateInventory {
    pub layouts: Vec<LayoutInfo>,
    pub images: Vec<ImageInfo>,
}

impl TemplateInventory {
    /// Inspect template bytes without mutating them.
    ///
    /// Unnamed pictures get a synthetic `img_<n>` name where `n` is the size
    /// of the image list at the time of discovery. Those names are stable
    /// within one extraction run only.
    pub fn extract(template: &[u8]) -> Result<Self> {
        let package = PptxPackage::from_bytes(template)?;

        let mut layouts = Vec::new();
        for (index, partname) in package.layout_partnames()?.iter().enumerate() {
            let Some(part) = package.opc().part(partname) else {
                continue;
            };
            let placeholder_count = top_level_shapes(part.blob())?
                .iter()
                .filter(|shape| shape.is_placeholder())
                .count();
            layouts.push(LayoutInfo {
                index,
                placeholder_count,
            });
        }

        let mut images = Vec::new();
        for partname in package.slide_partnames()? {
            let Some(part) = package.opc().part(&partname) else {
                continue;
            };
            for shape in top_level_shapes(part.blob())? {
                let Some(r_id) = shape.blip_rid.as_deref() else {
                    continue;
                };
                // Only count pictures whose relationship resolves to a real
                // media part; a dangling r:embed carries no image data.
                let Ok(target) = part.target_partname(r_id) else {
                    continue;
                };
                if !package.opc().contains_part(&target) {
                    continue;
                }
                let name = if shape.name.is_empty() {
                    format!("img_{}", images.len())
                } else {
                    shape.name.clone()
                };
                images.push(ImageInfo { name });
            }
        }

        Ok(Self { layouts, images })
    }
}
