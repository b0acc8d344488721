use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::RunError;
use crate::types::ClassTable;

/// Command-line interface for converting Pascal VOC XML annotations to YOLO
/// label format.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a tree of VOC XML files into a mirrored tree of YOLO labels
    Convert(ConvertArgs),
    /// List the unique class names found in a tree of VOC XML files
    ListClasses(ListClassesArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Directory containing VOC XML annotation files (searched recursively)
    #[arg(short = 's', long = "source_dir")]
    pub source_dir: String,

    /// Directory to write YOLO label files to, mirroring the source layout
    #[arg(short = 'o', long = "output_dir")]
    pub output_dir: String,

    /// File with one class name per line, in class-index order
    #[arg(long = "classes_file", conflicts_with = "class_list")]
    pub classes_file: Option<String>,

    /// Number of worker threads; 0 uses all available cores
    #[arg(short = 'w', long = "workers", default_value_t = 0)]
    pub workers: usize,

    /// Emit a status update every N completed files
    #[arg(long = "status_every", default_value_t = 100)]
    pub status_every: usize,

    /// Also emit a status update at least every N milliseconds
    #[arg(long = "status_interval_ms", default_value_t = 1000)]
    pub status_interval_ms: u64,

    /// Maximum number of per-file failure diagnostics in the final report
    #[arg(long = "max_reported_failures", default_value_t = 10)]
    pub max_reported_failures: usize,

    /// The ordered class list (alternative to --classes_file)
    #[arg(use_value_delimiter = true)]
    pub class_list: Vec<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ListClassesArgs {
    /// Directory containing VOC XML annotation files (searched recursively)
    #[arg(short = 's', long = "source_dir")]
    pub source_dir: String,

    /// File to write the sorted class list to, one name per line
    #[arg(short = 'o', long = "output_file", default_value = "voc_classes.txt")]
    pub output_file: String,

    /// Number of worker threads; 0 uses all available cores
    #[arg(short = 'w', long = "workers", default_value_t = 0)]
    pub workers: usize,
}

/// The fixed configuration record for one conversion run. Shared read-only
/// across all workers.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
    pub class_table: ClassTable,
    /// Worker pool size; 0 lets rayon pick, 1 runs on a single worker.
    pub workers: usize,
    /// Completions between status snapshots.
    pub status_every: usize,
    /// Wall-clock bound between status snapshots.
    pub status_interval: Duration,
    pub max_reported_failures: usize,
}

impl ConvertConfig {
    pub fn from_args(args: &ConvertArgs) -> Result<Self, RunError> {
        let class_table = match &args.classes_file {
            Some(path) => ClassTable::from_file(path.as_ref())?,
            None => ClassTable::new(args.class_list.clone()),
        };
        if class_table.is_empty() {
            return Err(RunError::EmptyClassTable);
        }
        Ok(Self {
            source_root: PathBuf::from(&args.source_dir),
            destination_root: PathBuf::from(&args.output_dir),
            class_table,
            workers: args.workers,
            status_every: args.status_every.max(1),
            status_interval: Duration::from_millis(args.status_interval_ms.max(1)),
            max_reported_failures: args.max_reported_failures,
        })
    }
}
