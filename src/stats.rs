//! Statistics collection and export.
//!
//! The kernel records per-process and per-signal counters while a model
//! runs. [`SimulationStats`] gathers them together with the run outcome
//! and exports to JSON, CSV or a human-readable summary.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::types::SimTime;

/// Aggregate statistics for a simulation run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SimulationStats {
    /// Run metadata
    pub metadata: SimulationMetadata,

    /// Kernel-level counters
    pub kernel: KernelStats,

    /// One entry per process, in insertion order
    pub processes: Vec<ProcessStats>,

    /// One entry per signal created through the simulation
    pub signals: Vec<SignalStats>,

    /// Wall-clock timing
    pub timing: TimingStats,
}

/// Metadata about the run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SimulationMetadata {
    /// Model name
    pub name: String,

    /// Crate version that produced the statistics
    pub version: String,

    /// Stop time the run was bounded by, if any
    pub stop_time: Option<SimTime>,
}

/// Kernel-level counters.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct KernelStats {
    /// Scheduling rounds executed
    pub rounds: u64,

    /// Total process firings
    pub firings: u64,

    /// Latest local time reached by any timed process
    pub final_time: SimTime,

    /// How the run ended, e.g. "finished" or "quiescent"
    pub outcome: String,

    /// Number of processes
    pub process_count: usize,

    /// Number of processes that terminated
    pub finished_processes: usize,
}

/// Statistics for a single process.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProcessStats {
    /// Instance name
    pub name: String,

    /// Constructor kind, e.g. "SDF::comb2"
    pub kind: String,

    /// MoC tag of the process
    pub moc: Option<String>,

    /// Completed prep/exec/prod cycles
    pub firings: u64,

    /// Preps that reported missing inputs
    pub blocked_preps: u64,

    /// Rounds spent waiting for staged outputs to be committed
    pub blocked_flushes: u64,

    /// Tokens committed to output signals
    pub tokens_out: u64,

    /// Local time at the end of the run (timed processes only)
    pub local_time: Option<SimTime>,

    /// Whether the process terminated
    pub done: bool,

    /// Whether the process was parked at the stop time
    pub parked: bool,
}

/// Statistics for a single signal.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SignalStats {
    /// Signal name
    pub name: String,

    /// MoC tag, if any
    pub moc: Option<String>,

    /// Tokens committed by the writer
    pub written: u64,

    /// Tokens consumed by the reader
    pub read: u64,

    /// Tokens still queued
    pub queued: usize,

    /// Peak occupancy
    pub peak: usize,

    /// Capacity (None = unbounded)
    pub capacity: Option<usize>,

    /// Whether the writer terminated
    pub closed: bool,
}

/// Timing/performance statistics.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TimingStats {
    /// Total wall-clock time in milliseconds
    pub total_wall_time_ms: f64,

    /// Firings per wall-clock second
    pub firings_per_second: f64,
}

impl SimulationStats {
    /// Creates a new empty statistics container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.name = name.into();
        self
    }

    /// Updates timing statistics from the elapsed wall-clock time.
    pub fn compute_timing(&mut self, wall_time_ms: f64) {
        self.timing.total_wall_time_ms = wall_time_ms;
        if wall_time_ms > 0.0 {
            self.timing.firings_per_second = self.kernel.firings as f64 / (wall_time_ms / 1000.0);
        }
    }

    /// Finds the statistics of a process by name.
    pub fn process(&self, name: &str) -> Option<&ProcessStats> {
        self.processes.iter().find(|p| p.name == name)
    }

    /// Finds the statistics of a signal by name.
    pub fn signal(&self, name: &str) -> Option<&SignalStats> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// Exports statistics as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Exports statistics as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Exports statistics to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = self
            .to_json_string()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Exports per-process statistics to CSV.
    pub fn processes_to_csv(&self) -> String {
        let mut csv = String::new();
        csv.push_str("name,kind,firings,blocked_preps,blocked_flushes,tokens_out,local_time,done\n");
        for p in &self.processes {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{}\n",
                p.name,
                p.kind,
                p.firings,
                p.blocked_preps,
                p.blocked_flushes,
                p.tokens_out,
                p.local_time.map(|t| t.to_string()).unwrap_or_default(),
                p.done,
            ));
        }
        csv
    }

    /// Writes a human-readable summary to a writer.
    pub fn write_summary<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "=== Simulation Statistics ===")?;
        if !self.metadata.name.is_empty() {
            writeln!(w, "Name: {}", self.metadata.name)?;
        }
        writeln!(w, "Outcome: {}", self.kernel.outcome)?;
        writeln!(w, "Rounds: {}", self.kernel.rounds)?;
        writeln!(w, "Firings: {}", self.kernel.firings)?;
        writeln!(w, "Final time: {}", self.kernel.final_time)?;
        writeln!(
            w,
            "Processes: {} ({} finished)",
            self.kernel.process_count, self.kernel.finished_processes
        )?;
        writeln!(w, "Wall time: {:.2} ms", self.timing.total_wall_time_ms)?;
        writeln!(w)?;

        writeln!(w, "--- Processes ---")?;
        for p in &self.processes {
            writeln!(
                w,
                "{} ({}): {} firings, {} blocked, {} tokens out",
                p.name, p.kind, p.firings, p.blocked_preps, p.tokens_out
            )?;
        }

        if !self.signals.is_empty() {
            writeln!(w)?;
            writeln!(w, "--- Signals ---")?;
            for s in &self.signals {
                writeln!(
                    w,
                    "{}: {} written, {} read, peak {}",
                    s.name, s.written, s.read, s.peak
                )?;
            }
        }

        Ok(())
    }

    /// Returns the summary as a string.
    pub fn summary(&self) -> String {
        let mut buf = Vec::new();
        if let Err(e) = self.write_summary(&mut buf) {
            tracing::warn!("failed to render statistics summary: {}", e);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// A simple timer for measuring wall-clock time.
#[derive(Debug)]
pub struct Timer {
    start: std::time::Instant,
}

impl Timer {
    /// Starts a new timer.
    pub fn start() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Returns elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::start()
    }
}
