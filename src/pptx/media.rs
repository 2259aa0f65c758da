//! Image formats, intrinsic dimensions, and media part management.

use crate::opc::constants::content_type as ct;
use crate::opc::{OpcPackage, PackURI, Part};
use crate::pptx::error::{PptxError, Result};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Raster image formats PowerPoint templates commonly embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Sniff the format from magic bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Some(Self::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if data.starts_with(b"GIF8") {
            Some(Self::Gif)
        } else if data.starts_with(b"BM") {
            Some(Self::Bmp)
        } else if data.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            Some(Self::Tiff)
        } else {
            None
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => ct::PNG,
            Self::Jpeg => ct::JPEG,
            Self::Gif => ct::GIF,
            Self::Bmp => ct::BMP,
            Self::Tiff => ct::TIFF,
        }
    }

    /// Partname extension, matching the content-type defaults the writer emits.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    /// Intrinsic pixel dimensions `(width, height)`, read from the header.
    ///
    /// Returns `None` when the header is truncated or malformed; callers fall
    /// back to a default display size in that case.
    pub fn dimensions(data: &[u8]) -> Option<(u32, u32)> {
        match Self::detect(data)? {
            Self::Png => png_dimensions(data),
            Self::Jpeg => jpeg_dimensions(data),
            Self::Gif => gif_dimensions(data),
            Self::Bmp => bmp_dimensions(data),
            Self::Tiff => tiff_dimensions(data),
        }
    }
}

fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    // Signature (8) + first chunk header; the first chunk must be IHDR.
    if data.get(12..16)? != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(data.get(16..20)?.try_into().ok()?);
    let height = u32::from_be_bytes(data.get(20..24)?.try_into().ok()?);
    (width > 0 && height > 0).then_some((width, height))
}

fn jpeg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];
        if marker == 0xFF {
            // Fill byte before a marker.
            pos += 1;
            continue;
        }
        pos += 2;
        match marker {
            // Standalone markers carry no length field.
            0x00 | 0x01 | 0xD0..=0xD8 => continue,
            0xD9 => break,
            _ => {
                let len = u16::from_be_bytes(data.get(pos..pos + 2)?.try_into().ok()?) as usize;
                // SOF0-SOF15 excluding DHT/JPG/DAC hold the frame size.
                if matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
                    let height =
                        u16::from_be_bytes(data.get(pos + 3..pos + 5)?.try_into().ok()?) as u32;
                    let width =
                        u16::from_be_bytes(data.get(pos + 5..pos + 7)?.try_into().ok()?) as u32;
                    return Some((width, height));
                }
                pos += len;
            }
        }
    }
    None
}

fn gif_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let width = u16::from_le_bytes(data.get(6..8)?.try_into().ok()?) as u32;
    let height = u16::from_le_bytes(data.get(8..10)?.try_into().ok()?) as u32;
    Some((width, height))
}

fn bmp_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let dib_size = u32::from_le_bytes(data.get(14..18)?.try_into().ok()?);
    if dib_size == 12 {
        // BITMAPCOREHEADER: 16-bit fields.
        let width = u16::from_le_bytes(data.get(18..20)?.try_into().ok()?) as u32;
        let height = u16::from_le_bytes(data.get(20..22)?.try_into().ok()?) as u32;
        Some((width, height))
    } else {
        let width = i32::from_le_bytes(data.get(18..22)?.try_into().ok()?);
        // Height is negative for top-down bitmaps.
        let height = i32::from_le_bytes(data.get(22..26)?.try_into().ok()?);
        Some((width.unsigned_abs(), height.unsigned_abs()))
    }
}

fn tiff_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let little_endian = data.starts_with(&[0x49, 0x49]);
    let read_u16 = |offset: usize| -> Option<u16> {
        let bytes: [u8; 2] = data.get(offset..offset + 2)?.try_into().ok()?;
        Some(if little_endian {
            u16::from_le_bytes(bytes)
        } else {
            u16::from_be_bytes(bytes)
        })
    };
    let read_u32 = |offset: usize| -> Option<u32> {
        let bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
        Some(if little_endian {
            u32::from_le_bytes(bytes)
        } else {
            u32::from_be_bytes(bytes)
        })
    };

    let ifd_offset = read_u32(4)? as usize;
    let entry_count = read_u16(ifd_offset)? as usize;
    let mut width = None;
    let mut height = None;
    for i in 0..entry_count {
        let entry = ifd_offset + 2 + i * 12;
        let tag = read_u16(entry)?;
        let field_type = read_u16(entry + 2)?;
        // 3 = SHORT, 4 = LONG; single values are stored inline.
        let value = match field_type {
            3 => read_u16(entry + 8)? as u32,
            4 => read_u32(entry + 8)?,
            _ => continue,
        };
        match tag {
            256 => width = Some(value),
            257 => height = Some(value),
            _ => {}
        }
        if let (Some(w), Some(h)) = (width, height) {
            return Some((w, h));
        }
    }
    None
}

/// Adds image parts to a package, sharing one part among identical blobs.
///
/// Seeded from the `/ppt/media/` parts already in the package so re-inserted
/// template images do not get duplicated.
pub struct MediaRegistry {
    by_digest: HashMap<String, PackURI>,
}

impl MediaRegistry {
    pub fn from_package(package: &OpcPackage) -> Self {
        let mut by_digest = HashMap::new();
        for part in package.iter_parts() {
            if part.partname().starts_with("/ppt/media/") {
                by_digest.insert(digest_hex(part.blob()), part.partname().clone());
            }
        }
        Self { by_digest }
    }

    /// Ensure an image part with these bytes exists; returns its partname.
    pub fn add_image(&mut self, package: &mut OpcPackage, blob: &[u8]) -> Result<PackURI> {
        let key = digest_hex(blob);
        if let Some(partname) = self.by_digest.get(&key) {
            return Ok(partname.clone());
        }
        let format = ImageFormat::detect(blob).ok_or(PptxError::UnknownImageFormat)?;
        let template = format!("/ppt/media/image%d.{}", format.extension());
        let partname = package.next_partname(&template)?;
        package.insert_part(Part::new(
            partname.clone(),
            format.content_type(),
            blob.to_vec(),
        ));
        self.by_digest.insert(key, partname.clone());
        Ok(partname)
    }
}

fn digest_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}
