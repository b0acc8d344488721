//! Image dimension resolution for one annotation unit.
//!
//! Three sources are tried in strict order, stopping at the first success:
//! the `<size>` element embedded in the annotation, a sibling image sharing
//! the annotation's stem, and the exact file named by `<filename>`. Image
//! files are inspected header-only via `imagesize`, so large images are never
//! decoded.

use std::path::Path;

use crate::error::ConvertError;
use crate::types::{ImageSize, SourceUnit, IMG_FORMATS};
use crate::voc::VocAnnotation;

/// Resolve the image size for a unit, or fail with `SizeUnresolved` carrying
/// every candidate path that was attempted.
pub fn resolve_image_size(
    unit: &SourceUnit,
    annotation: &VocAnnotation,
) -> Result<ImageSize, ConvertError> {
    // 1. Embedded <size> element, when both dimensions are positive.
    if let Some(size) = annotation.size {
        if size.width > 0 && size.height > 0 {
            return Ok(ImageSize {
                width: size.width,
                height: size.height,
            });
        }
    }

    let dir = unit.path.parent().unwrap_or_else(|| Path::new(""));
    let mut tried = Vec::new();

    // 2. Sibling image sharing the annotation's stem, per extension order.
    // The extension is appended rather than set via `with_extension`, which
    // would truncate dotted stems like "img.1".
    if let Some(stem) = unit.path.file_stem() {
        for ext in IMG_FORMATS {
            let mut name = stem.to_os_string();
            name.push(".");
            name.push(ext);
            let candidate = dir.join(name);
            if let Some(size) = read_dimensions(&candidate) {
                return Ok(size);
            }
            tried.push(candidate);
        }
    }

    // 3. The exact file the annotation declares as its image.
    if let Some(filename) = &annotation.filename {
        let candidate = dir.join(filename);
        if let Some(size) = read_dimensions(&candidate) {
            return Ok(size);
        }
        tried.push(candidate);
    }

    Err(ConvertError::SizeUnresolved { tried })
}

/// Read pixel dimensions from an image header. Returns `None` when the file
/// is absent, unreadable, or reports a zero dimension.
fn read_dimensions(candidate: &Path) -> Option<ImageSize> {
    if !candidate.is_file() {
        return None;
    }
    match imagesize::size(candidate) {
        Ok(dim) if dim.width > 0 && dim.height > 0 => Some(ImageSize {
            width: dim.width as u32,
            height: dim.height as u32,
        }),
        Ok(_) => None,
        Err(e) => {
            log::debug!(
                "failed to read image header {}: {}",
                candidate.display(),
                e
            );
            None
        }
    }
}
