//! Pascal VOC to YOLO format converter
//!
//! This library converts Pascal VOC XML annotations (corner-coordinate boxes
//! plus class-name strings, one file per image) into YOLO label files (one
//! line per object: class index and normalized center/extent box), mirroring
//! a source directory tree into a destination tree with bounded parallelism
//! and per-file fault isolation.

pub mod batch;
pub mod classes;
pub mod config;
pub mod conversion;
pub mod error;
pub mod image_size;
pub mod io;
pub mod status;
pub mod types;
pub mod voc;

// Re-export commonly used types and functions
pub use batch::run_batch;
pub use classes::{list_classes, log_class_distribution, write_class_list};
pub use config::{Cli, Command, ConvertArgs, ConvertConfig, ListClassesArgs};
pub use conversion::{convert_unit, denormalize_box, normalize_box};
pub use error::{ConvertError, RunError};
pub use image_size::resolve_image_size;
pub use io::{destination_path, enumerate_units, write_unit_records};
pub use status::{NullStatusSink, ProgressBarSink, StatusSink, StatusSnapshot, SystemLoad};
pub use types::{
    ClassTable, ConversionOutcome, CornerBox, FailureDiagnostic, ImageSize, NormalizedBox,
    ObjectRecord, RunReport, SourceUnit,
};
pub use voc::{extract_records, parse_annotation, VocAnnotation};
