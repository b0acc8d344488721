use std::path::PathBuf;
use thiserror::Error;

/// Failures scoped to a single annotation unit or a single object within it.
///
/// `MalformedAnnotation`, `SizeUnresolved` and `Io` abort the unit;
/// `UnknownClass` and `MissingBoxField` only skip the offending object.
/// Either way the error is recorded on that unit's outcome and the batch
/// keeps going.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("malformed annotation: {0}")]
    MalformedAnnotation(String),

    #[error("image size unresolved, tried: {}", format_tried(.tried))]
    SizeUnresolved { tried: Vec<PathBuf> },

    #[error("unknown class '{0}'")]
    UnknownClass(String),

    #[error("object is missing box field '{0}'")]
    MissingBoxField(&'static str),

    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
}

fn format_tried(tried: &[PathBuf]) -> String {
    if tried.is_empty() {
        return "no candidates".to_string();
    }
    tried
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run-fatal failures. These abort before any conversion task is scheduled.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to enumerate source root {root}: {source}")]
    Enumeration {
        root: PathBuf,
        source: std::io::Error,
    },

    #[error("class table is empty, pass a label list or --classes_file")]
    EmptyClassTable,

    #[error("failed to read classes file {path}: {source}")]
    ClassFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
