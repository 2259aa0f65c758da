//! Per-slide interpretation of a spec: layout placeholders, image hints,
//! speaker notes.

use crate::common::unit::EMUS_PER_INCH;
use crate::deck::builder::BuildError;
use crate::deck::plan::SlideSpec;
use crate::opc::constants::{content_type as ct, relationship_type as rt};
use crate::opc::{OpcPackage, PackURI, Part};
use crate::pptx::shapes::top_level_shapes;
use crate::pptx::writer::{SlideXmlBuilder, notes_slide_xml};
use crate::pptx::{ImageFormat, MediaRegistry, PlaceholderRole, PptxError, PptxPackage};
use std::collections::HashMap;

/// Inserted pictures sit at a fixed spot: 5in from the left, 1.5in from the
/// top, 4in wide, height scaled to the image's aspect ratio.
const PIC_LEFT_EMU: i64 = 5 * EMUS_PER_INCH;
const PIC_TOP_EMU: i64 = 3 * EMUS_PER_INCH / 2;
const PIC_WIDTH_EMU: i64 = 4 * EMUS_PER_INCH;
/// Height used when the image header gives no usable dimensions.
const PIC_FALLBACK_HEIGHT_EMU: i64 = 3 * EMUS_PER_INCH;

pub(crate) struct CachedImage {
    pub name: String,
    pub blob: Vec<u8>,
}

/// Name-to-blob mapping of every picture on the template's layouts.
///
/// Built once per deck build, before any template mutation. Duplicate names
/// keep their first position but carry the last blob seen, and unnamed
/// pictures get `img_<n>` names in encounter order.
pub(crate) struct ImageCache {
    entries: Vec<CachedImage>,
    by_name: HashMap<String, usize>,
}

impl ImageCache {
    pub(crate) fn from_layouts(
        package: &PptxPackage,
        layouts: &[PackURI],
    ) -> Result<Self, PptxError> {
        let mut cache = Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
        };
        for partname in layouts {
            let Some(part) = package.opc().part(partname) else {
                continue;
            };
            for shape in top_level_shapes(part.blob())? {
                let Some(r_id) = shape.blip_rid.as_deref() else {
                    continue;
                };
                let Ok(target) = part.target_partname(r_id) else {
                    continue;
                };
                let Some(media) = package.opc().part(&target) else {
                    continue;
                };
                let name = if shape.name.is_empty() {
                    format!("img_{}", cache.entries.len())
                } else {
                    shape.name.clone()
                };
                cache.insert(name, media.blob().to_vec());
            }
        }
        Ok(cache)
    }

    fn insert(&mut self, name: String, blob: Vec<u8>) {
        match self.by_name.get(&name) {
            Some(&index) => self.entries[index].blob = blob,
            None => {
                self.by_name.insert(name.clone(), self.entries.len());
                self.entries.push(CachedImage { name, blob });
            }
        }
    }

    /// Case-insensitive substring match on the name; a miss falls back to the
    /// first entry so a bad hint still yields a picture. `None` only when the
    /// cache is empty.
    pub(crate) fn lookup(&self, hint: &str) -> Option<&CachedImage> {
        let needle = hint.to_lowercase();
        self.entries
            .iter()
            .find(|image| image.name.to_lowercase().contains(&needle))
            .or_else(|| self.entries.first())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Everything `materialize_slide` needs beyond the [`SlideSpec`] itself,
/// borrowed from state the builder snapshots before it starts mutating the
/// package.
pub(crate) struct SlideContext<'a> {
    pub slide_index: usize,
    pub layout_partname: &'a PackURI,
    pub layout_xml: &'a [u8],
    pub images: &'a ImageCache,
    pub notes_master: Option<&'a PackURI>,
}

/// Build one slide part (plus its notes part, when requested) and insert it
/// into the package. Returns the new slide's partname.
///
/// Placeholder population is best-effort: a shape that cannot be populated is
/// logged and skipped, never failing the slide.
pub(crate) fn materialize_slide(
    opc: &mut OpcPackage,
    media: &mut MediaRegistry,
    ctx: &SlideContext<'_>,
    spec: &SlideSpec,
) -> Result<PackURI, BuildError> {
    let shapes = top_level_shapes(ctx.layout_xml)?;

    let slide_partname = opc.next_partname("/ppt/slides/slide%d.xml")?;
    let mut slide_part = Part::new(slide_partname.clone(), ct::PML_SLIDE, Vec::new());
    slide_part.relate_to(ctx.layout_partname, rt::SLIDE_LAYOUT);

    let mut builder = SlideXmlBuilder::new();
    let mut title_filled = false;
    let mut body_filled = false;
    for shape in &shapes {
        let Some(role) = shape.role() else {
            continue;
        };
        // Date, footer and slide-number placeholders inherit from the layout
        // and are not cloned onto slides.
        if role.is_latent() {
            continue;
        }
        let paragraphs: Option<Vec<String>> = if role.is_title() && !title_filled {
            title_filled = true;
            Some(vec![spec.title.clone()])
        } else if role == PlaceholderRole::Body && !body_filled {
            body_filled = true;
            Some(spec.bullets.clone())
        } else {
            None
        };
        if let Err(error) = builder.add_placeholder(shape, paragraphs.as_deref()) {
            tracing::warn!(
                slide = ctx.slide_index,
                shape = %shape.name,
                %error,
                "skipping placeholder"
            );
        }
    }

    if let Some(hint) = spec
        .image_from_template_hint
        .as_deref()
        .filter(|h| !h.is_empty())
    {
        if let Some(image) = ctx.images.lookup(hint) {
            let media_partname = media.add_image(opc, &image.blob)?;
            let r_id = slide_part.relate_to(&media_partname, rt::IMAGE);
            let (cx, cy) = picture_extent(ImageFormat::dimensions(&image.blob));
            builder.add_picture(&image.name, &r_id, PIC_LEFT_EMU, PIC_TOP_EMU, cx, cy);
        }
    }

    if let Some(notes) = spec.notes.as_deref().filter(|n| !n.is_empty()) {
        let notes_partname = opc.next_partname("/ppt/notesSlides/notesSlide%d.xml")?;
        let mut notes_part = Part::new(
            notes_partname.clone(),
            ct::PML_NOTES_SLIDE,
            notes_slide_xml(notes).into_bytes(),
        );
        notes_part.relate_to(&slide_partname, rt::SLIDE);
        if let Some(notes_master) = ctx.notes_master {
            notes_part.relate_to(notes_master, rt::NOTES_MASTER);
        }
        slide_part.relate_to(&notes_partname, rt::NOTES_SLIDE);
        opc.insert_part(notes_part);
    }

    slide_part.set_blob(builder.into_xml().into_bytes());
    opc.insert_part(slide_part);
    Ok(slide_partname)
}

/// Display extent for an inserted picture: fixed width, proportional height.
fn picture_extent(dimensions: Option<(u32, u32)>) -> (i64, i64) {
    match dimensions {
        Some((width, height)) if width > 0 => {
            let cy = (PIC_WIDTH_EMU as i128 * height as i128 / width as i128) as i64;
            (PIC_WIDTH_EMU, cy)
        }
        _ => (PIC_WIDTH_EMU, PIC_FALLBACK_HEIGHT_EMU),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_of(entries: &[(&str, &[u8])]) -> ImageCache {
        let mut cache = ImageCache {
            entries: Vec::new(),
            by_name: HashMap::new(),
        };
        for (name, blob) in entries {
            cache.insert(name.to_string(), blob.to_vec());
        }
        cache
    }

    #[test]
    fn test_lookup_is_case_insensitive_substring() {
        let cache = cache_of(&[("company_logo", b"1"), ("banner", b"2")]);
        assert_eq!(cache.lookup("LOGO").map(|i| i.name.as_str()), Some("company_logo"));
        assert_eq!(cache.lookup("Banner").map(|i| i.name.as_str()), Some("banner"));
    }

    #[test]
    fn test_lookup_falls_back_to_first_entry() {
        let cache = cache_of(&[("company_logo", b"1"), ("banner", b"2")]);
        assert_eq!(cache.lookup("zzz").map(|i| i.name.as_str()), Some("company_logo"));
    }

    #[test]
    fn test_lookup_on_empty_cache() {
        let cache = cache_of(&[]);
        assert!(cache.is_empty());
        assert!(cache.lookup("anything").is_none());
    }

    #[test]
    fn test_duplicate_names_keep_first_position() {
        let cache = cache_of(&[("logo", b"old"), ("banner", b"2"), ("logo", b"new")]);
        assert_eq!(cache.len(), 2);
        let hit = cache.lookup("logo").unwrap();
        assert_eq!(hit.blob, b"new");
        assert_eq!(cache.entries[0].name, "logo");
    }

    #[test]
    fn test_extent_scales_height_to_width() {
        assert_eq!(picture_extent(Some((400, 300))), (3_657_600, 2_743_200));
        assert_eq!(picture_extent(Some((200, 200))), (3_657_600, 3_657_600));
        // 2:1 panorama
        assert_eq!(picture_extent(Some((1000, 500))), (3_657_600, 1_828_800));
    }

    #[test]
    fn test_extent_fallback_for_unreadable_headers() {
        assert_eq!(picture_extent(None), (3_657_600, 2_743_200));
        assert_eq!(picture_extent(Some((0, 100))), (3_657_600, 2_743_200));
    }

    #[test]
    fn test_cache_from_template_layouts() {
        let template = crate::pptx::fixture::two_layout_template();
        let package = PptxPackage::from_bytes(&template).unwrap();
        let layouts = package.layout_partnames().unwrap();
        let cache = ImageCache::from_layouts(&package, &layouts).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.entries[0].name, "company_logo");
        assert_eq!(cache.entries[1].name, "sidebar_art");
        // Blobs come from the media parts the layouts reference.
        assert_eq!(ImageFormat::dimensions(&cache.entries[0].blob), Some((400, 300)));
    }
}
