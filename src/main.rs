use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

use voc2yolo::{
    list_classes, log_class_distribution, run_batch, write_class_list, Cli, Command,
    ConvertArgs, ConvertConfig, ListClassesArgs, ProgressBarSink,
};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Convert(args) => run_convert(&args),
        Command::ListClasses(args) => run_list_classes(&args),
    }
}

fn run_convert(args: &ConvertArgs) -> ExitCode {
    let config = match ConvertConfig::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Starting conversion: {} -> {} ({} classes)",
        config.source_root.display(),
        config.destination_root.display(),
        config.class_table.len()
    );

    let sink = ProgressBarSink::new("Convert");
    let max_failures = config.max_reported_failures;
    match run_batch(config, &sink) {
        Ok(report) => {
            sink.finish();
            report.log_summary(max_failures);
            if report.failed > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            sink.finish();
            error!("Conversion run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_list_classes(args: &ListClassesArgs) -> ExitCode {
    let source_root = PathBuf::from(&args.source_dir);
    let output_file = PathBuf::from(&args.output_file);

    let classes = match list_classes(&source_root, args.workers) {
        Ok(classes) => classes,
        Err(e) => {
            error!("Class listing failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log_class_distribution(&classes, 20);

    if let Err(e) = write_class_list(&output_file, &classes) {
        error!(
            "Failed to write class list to {}: {}",
            output_file.display(),
            e
        );
        return ExitCode::FAILURE;
    }
    info!("Class list saved to {}", output_file.display());
    ExitCode::SUCCESS
}
