//! Deck assembly: reset the template's slides, then replay the plan.

use crate::deck::interpret::{ImageCache, SlideContext, materialize_slide};
use crate::deck::plan::SlidePlan;
use crate::opc::constants::relationship_type as rt;
use crate::opc::packuri::PACKAGE_URI;
use crate::opc::OpcError;
use crate::pptx::presentation::{self, SlideEntry};
use crate::pptx::{MediaRegistry, PptxError, PptxPackage, core_props};
use chrono::Utc;
use thiserror::Error;

/// Slide ids handed out by the desktop application start at 256.
const FIRST_SLIDE_ID: u32 = 256;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Pptx(#[from] PptxError),
    #[error(transparent)]
    Opc(#[from] OpcError),
    #[error("template has no slide layouts to build slides from")]
    NoLayouts,
}

/// Build a deck from `template` bytes and a parsed plan.
///
/// The template's own slides never survive: the package is stripped back to
/// its layouts and masters, then one slide per spec is created in plan order.
/// Per-placeholder problems are logged and skipped; anything structural
/// (unreadable template, no layouts while slides were requested) fails the
/// whole build.
pub fn build_deck(template: &[u8], plan: &SlidePlan) -> Result<Vec<u8>, BuildError> {
    let mut package = PptxPackage::from_bytes(template)?;

    let layouts = package.layout_partnames()?;
    if layouts.is_empty() && !plan.slides.is_empty() {
        return Err(BuildError::NoLayouts);
    }

    // Snapshots of everything the per-slide loop needs, taken before any
    // mutation so later indexes still match the inventory the plan saw.
    let mut layout_snapshots = Vec::with_capacity(layouts.len());
    for partname in &layouts {
        if let Some(part) = package.opc().part(partname) {
            layout_snapshots.push((partname.clone(), part.blob().to_vec()));
        }
    }
    let images = ImageCache::from_layouts(&package, &layouts)?;
    let notes_master = package.notes_master_partname()?;
    let mut media = MediaRegistry::from_package(package.opc());

    // Reset: release original slides highest-index-first, so each removal
    // leaves the remaining entries' positions intact.
    let old_entries = presentation::slide_entries(package.presentation_part()?.blob())?;
    let pres_base = package.presentation_partname()?.base_uri();
    for entry in old_entries.iter().rev() {
        let Some(rel) = package.presentation_part_mut()?.rels_mut().remove(&entry.r_id) else {
            continue;
        };
        if let Ok(target) = rel.target_partname(&pres_base) {
            package.opc_mut().remove_part(&target);
        }
    }

    let mut new_entries = Vec::with_capacity(plan.slides.len());
    for (i, spec) in plan.slides.iter().enumerate() {
        let layout_index = match usize::try_from(spec.layout_index) {
            Ok(index) if index < layout_snapshots.len() => index,
            _ => {
                tracing::warn!(
                    slide = i,
                    layout_index = spec.layout_index,
                    "layout index out of range, using layout 0"
                );
                0
            }
        };
        let (layout_partname, layout_xml) = &layout_snapshots[layout_index];
        let ctx = SlideContext {
            slide_index: i,
            layout_partname,
            layout_xml: layout_xml.as_slice(),
            images: &images,
            notes_master: notes_master.as_ref(),
        };
        let slide_partname = materialize_slide(package.opc_mut(), &mut media, &ctx, spec)?;
        let r_id = package
            .presentation_part_mut()?
            .relate_to(&slide_partname, rt::SLIDE);
        new_entries.push(SlideEntry {
            id: FIRST_SLIDE_ID + i as u32,
            r_id,
        });
    }

    let pres = package.presentation_part_mut()?;
    let updated = presentation::replace_slide_id_list(pres.blob(), &new_entries)?;
    pres.set_blob(updated);

    touch_core_modified(&mut package);

    tracing::info!(slides = plan.slides.len(), "deck built");
    Ok(package.to_bytes()?)
}

/// Stamp `dcterms:modified` in the core-properties part with the current
/// time. Best-effort: a template without core properties (or with an odd
/// core part) is left alone.
fn touch_core_modified(package: &mut PptxPackage) {
    let partname = {
        let Some(rel) = package.opc().rels().find_reltype(rt::CORE_PROPERTIES) else {
            return;
        };
        match rel.target_partname(PACKAGE_URI) {
            Ok(partname) => partname,
            Err(_) => return,
        }
    };
    let stamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let updated = {
        let Some(part) = package.opc().part(&partname) else {
            return;
        };
        match core_props::touch_modified(part.blob(), &stamp) {
            Ok(Some(xml)) => xml,
            Ok(None) => return,
            Err(error) => {
                tracing::debug!(%error, "could not update core properties");
                return;
            }
        }
    };
    if let Some(part) = package.opc_mut().part_mut(&partname) {
        part.set_blob(updated);
    }
}
