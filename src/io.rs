//! Source-tree enumeration and YOLO label emission.

use jwalk::WalkDir;
use log::warn;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::RunError;
use crate::types::{NormalizedBox, SourceUnit};

/// Walk the source root and collect every annotation file with the given
/// extension, in a deterministic order. An unreadable root is run-fatal;
/// unreadable entries below it are skipped with a warning.
pub fn enumerate_units(source_root: &Path, extension: &str) -> Result<Vec<SourceUnit>, RunError> {
    // Probe the root up front so a missing or unreadable directory surfaces
    // as a single run-fatal error instead of an empty walk.
    fs::read_dir(source_root).map_err(|source| RunError::Enumeration {
        root: source_root.to_path_buf(),
        source,
    })?;

    let mut units = Vec::new();
    for entry in WalkDir::new(source_root).skip_hidden(false).sort(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry under {}: {}", source_root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        {
            continue;
        }
        let rel_path = match path.strip_prefix(source_root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => {
                warn!("skipping entry outside source root: {}", path.display());
                continue;
            }
        };
        units.push(SourceUnit { path, rel_path });
    }
    Ok(units)
}

/// Compute the destination path for a unit: the relative path mirrored under
/// the destination root, with the extension replaced by `txt`.
pub fn destination_path(destination_root: &Path, rel_path: &Path) -> PathBuf {
    destination_root.join(rel_path).with_extension("txt")
}

/// Write the converted records for one unit, one line per object in source
/// order, overwriting any existing file. Missing intermediate directories are
/// created; `create_dir_all` tolerates concurrent creation by other workers.
pub fn write_unit_records(
    destination_root: &Path,
    rel_path: &Path,
    records: &[(usize, NormalizedBox)],
) -> std::io::Result<PathBuf> {
    let dest = destination_path(destination_root, rel_path);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(&dest)?);
    for (class_id, bbox) in records {
        // Plain Display keeps the shortest f64 representation, so 0.2 is
        // written as "0.2", not "0.200000".
        writeln!(
            writer,
            "{} {} {} {} {}",
            class_id, bbox.x_center, bbox.y_center, bbox.width, bbox.height
        )?;
    }
    writer.flush()?;
    Ok(dest)
}
