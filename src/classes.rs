//! Class enumeration over a VOC annotation tree.
//!
//! Companion utility to the converter: walks the same source tree, tallies
//! every class name found, and writes the sorted unique list to a text file
//! that can be fed back to `convert` as `--classes_file`.

use dashmap::DashMap;
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rayon::prelude::*;

use crate::error::RunError;
use crate::io::enumerate_units;
use crate::voc::parse_annotation;

/// Scan the source tree and count, per class name, the number of annotation
/// files it appears in. Returns the classes sorted by name.
pub fn list_classes(source_root: &Path, workers: usize) -> Result<Vec<(String, usize)>, RunError> {
    let units = enumerate_units(source_root, "xml")?;
    info!("Found {} annotation files to scan.", units.len());

    let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
    let counts: DashMap<String, usize> = DashMap::new();

    pool.install(|| {
        units.par_iter().for_each(|unit| {
            let annotation = match parse_annotation(unit) {
                Ok(annotation) => annotation,
                Err(e) => {
                    warn!("{}: {}", unit.path.display(), e);
                    return;
                }
            };
            // Count each class once per file, like a per-file vocabulary.
            let mut seen: Vec<&str> = annotation
                .objects
                .iter()
                .filter_map(|object| object.name.as_deref())
                .collect();
            seen.sort_unstable();
            seen.dedup();
            for name in seen {
                *counts.entry(name.to_string()).or_insert(0) += 1;
            }
        });
    });

    let mut classes: Vec<(String, usize)> = counts.into_iter().collect();
    classes.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(classes)
}

/// Write the class list, one name per line in sorted order, so the file is
/// directly usable as a `--classes_file` for conversion.
pub fn write_class_list(output_file: &Path, classes: &[(String, usize)]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(output_file)?);
    for (name, _) in classes {
        writeln!(writer, "{}", name)?;
    }
    writer.flush()
}

/// Log the most frequent classes as a sanity check on the dataset before
/// committing to a class table.
pub fn log_class_distribution(classes: &[(String, usize)], top: usize) {
    let mut by_count: Vec<&(String, usize)> = classes.iter().collect();
    by_count.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    info!("Unique classes found: {}", classes.len());
    for (name, count) in by_count.into_iter().take(top) {
        info!("{}: {} file(s)", name, count);
    }
}
