//! Progress and system-status reporting.
//!
//! Workers never touch progress state; the batch coordinator samples and
//! forwards snapshots to a [`StatusSink`]. The shipped sink renders an
//! indicatif progress bar with live CPU/memory usage in the message.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

/// A point-in-time view of a running batch.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub completed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
    pub system: Option<SystemLoad>,
}

/// Host resource usage at sample time.
#[derive(Debug, Clone, Copy)]
pub struct SystemLoad {
    pub cpu_percent: f32,
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
}

impl SystemLoad {
    pub fn format_compact(&self) -> String {
        const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
        format!(
            "CPU: {:.1}% | MEM: {:.1}/{:.1}GB",
            self.cpu_percent,
            self.memory_used_bytes as f64 / GIB,
            self.memory_total_bytes as f64 / GIB
        )
    }
}

/// Receives periodic snapshots from the coordinator. Implementations must be
/// callable from the coordinator thread only; no worker ever holds a sink.
pub trait StatusSink: Send + Sync {
    fn update(&self, snapshot: &StatusSnapshot);
}

/// A sink that drops every snapshot. Useful for library callers and tests.
#[derive(Debug, Default)]
pub struct NullStatusSink;

impl StatusSink for NullStatusSink {
    fn update(&self, _snapshot: &StatusSnapshot) {}
}

/// Samples host CPU and memory usage via sysinfo. Only CPU usage and memory
/// are refreshed; frequency and process tables are never polled.
pub struct SystemMonitor {
    system: System,
}

impl SystemMonitor {
    pub fn new() -> Self {
        let mut system = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::new().with_cpu_usage())
                .with_memory(MemoryRefreshKind::everything()),
        );
        // CPU usage is a delta between refreshes; prime once so the first
        // sample has a baseline instead of reporting 0%.
        system.refresh_cpu();
        Self { system }
    }

    pub fn sample(&mut self) -> SystemLoad {
        self.system.refresh_cpu();
        self.system.refresh_memory();
        SystemLoad {
            cpu_percent: self.system.global_cpu_info().cpu_usage(),
            memory_used_bytes: self.system.used_memory(),
            memory_total_bytes: self.system.total_memory(),
        }
    }
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders snapshots onto an indicatif progress bar. The bar length follows
/// the snapshot's total, which is only known after enumeration.
pub struct ProgressBarSink {
    pb: ProgressBar,
}

impl ProgressBarSink {
    pub fn new(label: &str) -> Self {
        let pb = ProgressBar::new(0);
        pb.set_style(ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}}) {{msg}}",
                label
            ))
            .progress_chars("#>-"));
        Self { pb }
    }

    pub fn finish(&self) {
        self.pb.finish();
    }
}

impl StatusSink for ProgressBarSink {
    fn update(&self, snapshot: &StatusSnapshot) {
        self.pb.set_length(snapshot.total as u64);
        self.pb.set_position(snapshot.completed as u64);
        let mut message = format!("ok: {} failed: {}", snapshot.succeeded, snapshot.failed);
        if let Some(system) = &snapshot.system {
            message.push_str(" | ");
            message.push_str(&system.format_compact());
        }
        self.pb.set_message(message);
    }
}
