//! Per-unit conversion: coordinate transform, class resolution and the task
//! composing the whole pipeline for one annotation file.

use log::warn;

use crate::config::ConvertConfig;
use crate::error::ConvertError;
use crate::image_size::resolve_image_size;
use crate::io::write_unit_records;
use crate::types::{ConversionOutcome, CornerBox, ImageSize, NormalizedBox, SourceUnit};
use crate::voc::{extract_records, parse_annotation};

/// Convert a corner box in pixel coordinates to a normalized center/extent
/// box. No clamping: out-of-bounds input yields out-of-bounds output.
pub fn normalize_box(size: ImageSize, bbox: CornerBox) -> NormalizedBox {
    let dw = 1.0 / size.width as f64;
    let dh = 1.0 / size.height as f64;
    NormalizedBox {
        x_center: (bbox.xmin + bbox.xmax) / 2.0 * dw,
        y_center: (bbox.ymin + bbox.ymax) / 2.0 * dh,
        width: (bbox.xmax - bbox.xmin) * dw,
        height: (bbox.ymax - bbox.ymin) * dh,
    }
}

/// Inverse of [`normalize_box`], recovering pixel corner coordinates.
pub fn denormalize_box(size: ImageSize, bbox: NormalizedBox) -> CornerBox {
    let w = bbox.width * size.width as f64;
    let h = bbox.height * size.height as f64;
    let cx = bbox.x_center * size.width as f64;
    let cy = bbox.y_center * size.height as f64;
    CornerBox {
        xmin: cx - w / 2.0,
        ymin: cy - h / 2.0,
        xmax: cx + w / 2.0,
        ymax: cy + h / 2.0,
    }
}

/// Run the full pipeline for one unit and capture the result as an outcome.
/// Never panics and never propagates: every failure ends up as a diagnostic
/// on this unit's outcome so the batch can keep going.
pub fn convert_unit(unit: &SourceUnit, config: &ConvertConfig) -> ConversionOutcome {
    match try_convert_unit(unit, config) {
        Ok(written) => ConversionOutcome::success(unit.rel_path.clone(), written),
        Err(e) => ConversionOutcome::failure(unit.rel_path.clone(), e.to_string()),
    }
}

fn try_convert_unit(unit: &SourceUnit, config: &ConvertConfig) -> Result<usize, ConvertError> {
    let annotation = parse_annotation(unit)?;
    let size = resolve_image_size(unit, &annotation)?;
    let records = extract_records(unit, &annotation);

    let mut lines = Vec::with_capacity(records.len());
    for record in records {
        // Unknown classes are skipped per-object, mirroring the parser's
        // partial-success policy.
        let class_id = match config.class_table.resolve(&record.class_name) {
            Ok(class_id) => class_id,
            Err(e) => {
                warn!("{}: skipping object: {}", unit.path.display(), e);
                continue;
            }
        };
        lines.push((class_id, normalize_box(size, record.bbox)));
    }

    // An empty line list still produces an empty label file, keeping the
    // input/output mapping 1:1.
    write_unit_records(&config.destination_root, &unit.rel_path, &lines)?;
    Ok(lines.len())
}
