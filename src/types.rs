use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConvertError, RunError};

// Image extensions tried, in order, when looking for a sibling image next to
// an annotation file.
pub const IMG_FORMATS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"];

/// One annotation file discovered under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Full path of the annotation file.
    pub path: PathBuf,
    /// Path relative to the source root, mirrored into the destination tree.
    pub rel_path: PathBuf,
}

/// Pixel dimensions of the annotated image. Both sides are always positive;
/// resolvers never return a zero dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Axis-aligned bounding box in absolute pixel coordinates.
///
/// Values are taken from the annotation as-is. Inverted or out-of-bounds
/// boxes are passed through unchanged rather than clamped or rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

/// Center/extent box normalized to image dimensions, in [0, 1] for
/// well-formed input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

/// One labeled object extracted from an annotation unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRecord {
    pub class_name: String,
    pub bbox: CornerBox,
}

/// The fixed, ordered class list for a run. The position of a name is its
/// YOLO class index. Shared read-only across all workers.
#[derive(Debug, Clone)]
pub struct ClassTable {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl ClassTable {
    /// Build a table from an ordered name list. The first occurrence of a
    /// duplicated name wins its index.
    pub fn new(names: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(names.len());
        for (id, name) in names.iter().enumerate() {
            index.entry(name.clone()).or_insert(id);
        }
        Self { names, index }
    }

    /// Load a table from a text file, one class name per line, preserving
    /// line order. Blank lines are ignored; no other normalization is applied
    /// since label sets may use non-Latin scripts.
    pub fn from_file(path: &Path) -> Result<Self, RunError> {
        let content = fs::read_to_string(path).map_err(|source| RunError::ClassFile {
            path: path.to_path_buf(),
            source,
        })?;
        let names = content
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(|line| line.to_string())
            .collect();
        Ok(Self::new(names))
    }

    /// Resolve a class name to its index. Exact string match only.
    pub fn resolve(&self, name: &str) -> Result<usize, ConvertError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ConvertError::UnknownClass(name.to_string()))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The result of converting one annotation unit. Exactly one outcome is
/// produced per enumerated unit, success or not.
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    /// Relative path of the unit the outcome belongs to.
    pub unit: PathBuf,
    pub success: bool,
    /// Failure diagnostic; `None` on success.
    pub diagnostic: Option<String>,
    /// Number of label lines written; 0 on failure or for empty units.
    pub records_written: usize,
}

impl ConversionOutcome {
    pub fn success(unit: PathBuf, records_written: usize) -> Self {
        Self {
            unit,
            success: true,
            diagnostic: None,
            records_written,
        }
    }

    pub fn failure(unit: PathBuf, diagnostic: String) -> Self {
        Self {
            unit,
            success: false,
            diagnostic: Some(diagnostic),
            records_written: 0,
        }
    }
}

/// Aggregated result of a whole run. Failure diagnostics are kept in
/// completion order, which is arbitrary under parallel execution.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
    pub failures: Vec<FailureDiagnostic>,
}

/// A failed unit and the reason it failed.
#[derive(Debug, Clone)]
pub struct FailureDiagnostic {
    pub unit: PathBuf,
    pub message: String,
}

impl RunReport {
    /// Units converted per second of wall-clock time.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total as f64 / secs
        } else {
            0.0
        }
    }

    /// Log the final summary. At most `max_failures` diagnostics are shown,
    /// with a count of how many more were truncated.
    pub fn log_summary(&self, max_failures: usize) {
        log::info!("=== Conversion Summary ===");
        log::info!("Total annotation files: {}", self.total);
        log::info!("Successfully converted: {}", self.succeeded);
        log::info!("Failed conversions: {}", self.failed);
        log::info!(
            "Elapsed: {:.2}s ({:.1} files/s)",
            self.elapsed.as_secs_f64(),
            self.throughput()
        );
        for failure in self.failures.iter().take(max_failures) {
            log::warn!("{}: {}", failure.unit.display(), failure.message);
        }
        if self.failures.len() > max_failures {
            log::warn!(
                "... and {} more failures not shown",
                self.failures.len() - max_failures
            );
        }
    }
}
