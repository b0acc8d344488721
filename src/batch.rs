//! The batch coordinator: fans conversion tasks out over a bounded worker
//! pool and aggregates one outcome per enumerated unit.
//!
//! Workers communicate only through outcome messages; all counters, status
//! sampling and reporting live on the coordinator thread. A run moves through
//! enumerating, running and finalizing, and never aborts on a per-unit
//! failure.

use log::info;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::config::ConvertConfig;
use crate::conversion::convert_unit;
use crate::error::RunError;
use crate::io::enumerate_units;
use crate::status::{StatusSink, StatusSnapshot, SystemMonitor};
use crate::types::{ConversionOutcome, FailureDiagnostic, RunReport};

/// Run a full conversion batch. Returns the final report; the only errors
/// surfaced here are run-fatal ones raised before any task is scheduled.
pub fn run_batch(config: ConvertConfig, sink: &dyn StatusSink) -> Result<RunReport, RunError> {
    let start = Instant::now();

    info!("Enumerating annotation files under {}...", config.source_root.display());
    let units = enumerate_units(&config.source_root, "xml")?;
    let total = units.len();
    info!("Found {} annotation files.", total);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()?;
    info!(
        "Converting with {} worker thread(s)...",
        pool.current_num_threads()
    );

    let config = Arc::new(config);
    let (tx, rx) = mpsc::channel::<ConversionOutcome>();
    {
        let config = Arc::clone(&config);
        // The sender is moved into the pool; the channel disconnects once
        // every unit has produced its outcome.
        pool.spawn(move || {
            units.into_par_iter().for_each_with(tx, |tx, unit| {
                let outcome = convert_unit(&unit, &config);
                let _ = tx.send(outcome);
            });
        });
    }

    let mut monitor = SystemMonitor::new();
    let mut completed = 0usize;
    let mut succeeded = 0usize;
    let mut failures: Vec<FailureDiagnostic> = Vec::new();
    let mut since_update = 0usize;
    let mut last_update = Instant::now();

    loop {
        match rx.recv_timeout(config.status_interval) {
            Ok(outcome) => {
                completed += 1;
                since_update += 1;
                if outcome.success {
                    succeeded += 1;
                } else {
                    failures.push(FailureDiagnostic {
                        unit: outcome.unit,
                        message: outcome.diagnostic.unwrap_or_default(),
                    });
                }
                if since_update >= config.status_every
                    || last_update.elapsed() >= config.status_interval
                {
                    emit_status(
                        sink,
                        &mut monitor,
                        completed,
                        total,
                        succeeded,
                        failures.len(),
                        start,
                    );
                    since_update = 0;
                    last_update = Instant::now();
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                emit_status(
                    sink,
                    &mut monitor,
                    completed,
                    total,
                    succeeded,
                    failures.len(),
                    start,
                );
                since_update = 0;
                last_update = Instant::now();
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    // Final snapshot so the sink always observes completed == total.
    emit_status(
        sink,
        &mut monitor,
        completed,
        total,
        succeeded,
        failures.len(),
        start,
    );

    info!("Finalizing report...");
    let failed = failures.len();
    debug_assert_eq!(completed, total);
    Ok(RunReport {
        total,
        succeeded,
        failed,
        elapsed: start.elapsed(),
        failures,
    })
}

fn emit_status(
    sink: &dyn StatusSink,
    monitor: &mut SystemMonitor,
    completed: usize,
    total: usize,
    succeeded: usize,
    failed: usize,
    start: Instant,
) {
    let snapshot = StatusSnapshot {
        completed,
        total,
        succeeded,
        failed,
        elapsed: start.elapsed(),
        system: Some(monitor.sample()),
    };
    sink.update(&snapshot);
}
