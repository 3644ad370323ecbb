//! The simulation kernel.
//!
//! [`Simulation`] owns a set of processes and drives them through their
//! lifecycle in scheduling rounds. In every round each live process:
//!
//! 1. commits the tokens staged by its last firing; if some remain
//!    (full bounded signal) it waits for the next round;
//! 2. runs `prep`. `Blocked` means it waits for the next round. `Done`
//!    closes its output signals and retires it;
//! 3. if its local time has passed the stop time, it is parked;
//! 4. otherwise it runs `exec` and `prod`, and its outputs are committed.
//!
//! Because every signal has a single writer and a single reader, the
//! token streams do not depend on the order processes are visited in a
//! round. The run ends when every process has terminated, when all
//! remaining processes are parked at the stop time, when a round makes no
//! progress (deadlock or starvation) or when the round limit is hit.
//!
//! # Example
//!
//! ```
//! use forsyde::{AbstExt, Simulation, RunOutcome};
//! use forsyde::moc::sy;
//!
//! let mut sim = Simulation::new();
//! let src = sim.signal("src");
//! let dbl = sim.signal("dbl");
//!
//! sim.add(sy::VSource::new("numbers", vec![1, 2, 3], src.writer().unwrap()));
//! sim.add(sy::Comb::new(
//!     "double",
//!     |x: &AbstExt<i32>| x.map(|v| v * 2),
//!     src.reader().unwrap(),
//!     dbl.writer().unwrap(),
//! ));
//!
//! let report = sim.run().unwrap();
//! assert_eq!(report.outcome, RunOutcome::Finished);
//! assert_eq!(
//!     dbl.contents(),
//!     vec![AbstExt::Present(2), AbstExt::Present(4), AbstExt::Present(6)]
//! );
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{SimConfig, SimulationParams};
use crate::error::SimResult;
use crate::parallel::RoundRunner;
use crate::process::{Flow, Moc, Process, ProcessDesc};
use crate::signal::{Signal, SignalView, Token};
use crate::stats::{ProcessStats, SimulationStats, Timer};
use crate::types::{ProcessId, SimTime};

/// How a run ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Every process terminated.
    Finished,
    /// Every remaining process is parked past the stop time.
    StopTime,
    /// No process could make progress; the names of the waiting
    /// processes are listed.
    Quiescent { blocked: Vec<String> },
    /// The round limit was reached.
    RoundLimit,
}

impl RunOutcome {
    /// Short lowercase label.
    pub fn label(&self) -> &'static str {
        match self {
            RunOutcome::Finished => "finished",
            RunOutcome::StopTime => "stop_time",
            RunOutcome::Quiescent { .. } => "quiescent",
            RunOutcome::RoundLimit => "round_limit",
        }
    }
}

/// Summary returned by [`Simulation::run_until`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Rounds executed in this run
    pub rounds: u64,
    /// Firings in this run
    pub firings: u64,
    /// Latest local time reached by a non-parked timed process
    pub final_time: SimTime,
    /// How the run ended
    pub outcome: RunOutcome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotState {
    Created,
    Live,
    Parked,
    Done,
}

/// A process plus its kernel bookkeeping.
pub(crate) struct Slot {
    process: Box<dyn Process>,
    state: SlotState,
    stats: ProcessStats,
}

/// What one slot did in one round.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SlotRound {
    pub progress: bool,
    pub fired: bool,
}

impl Slot {
    fn new(process: Box<dyn Process>) -> Self {
        let stats = ProcessStats {
            name: process.name().to_string(),
            kind: process.kind().to_string(),
            moc: process.moc().map(|m| m.to_string()),
            ..Default::default()
        };
        Self {
            process,
            state: SlotState::Created,
            stats,
        }
    }

    fn init(&mut self) -> SimResult<()> {
        if self.state != SlotState::Created {
            return Ok(());
        }
        self.process.init().map_err(|e| self.report(e))?;
        self.flush();
        self.state = SlotState::Live;
        Ok(())
    }

    /// Runs this slot's share of one scheduling round.
    pub(crate) fn round(&mut self, stop: SimTime) -> SimResult<SlotRound> {
        let mut r = SlotRound::default();
        match self.state {
            SlotState::Created | SlotState::Done => return Ok(r),
            SlotState::Parked => {
                if self.past(stop) {
                    return Ok(r);
                }
                self.state = SlotState::Live;
                self.stats.parked = false;
                return self.fire(r);
            }
            SlotState::Live => {}
        }

        if self.flush() > 0 {
            r.progress = true;
        }
        if !self.is_flushed() {
            self.stats.blocked_flushes += 1;
            return Ok(r);
        }

        match self.process.prep().map_err(|e| self.report(e))? {
            Flow::Blocked => {
                self.stats.blocked_preps += 1;
                Ok(r)
            }
            Flow::Done => {
                self.retire();
                r.progress = true;
                Ok(r)
            }
            Flow::Ready => {
                if self.past(stop) {
                    tracing::debug!(
                        process = %self.stats.name,
                        time = ?self.process.local_time(),
                        "parked at stop time"
                    );
                    self.state = SlotState::Parked;
                    self.stats.parked = true;
                    r.progress = true;
                    return Ok(r);
                }
                self.fire(r)
            }
        }
    }

    fn fire(&mut self, mut r: SlotRound) -> SimResult<SlotRound> {
        self.process.exec().map_err(|e| self.report(e))?;
        self.process.prod().map_err(|e| self.report(e))?;
        self.flush();
        self.stats.firings += 1;
        tracing::trace!(process = %self.stats.name, firing = self.stats.firings, "fired");
        r.progress = true;
        r.fired = true;
        Ok(r)
    }

    fn past(&self, stop: SimTime) -> bool {
        matches!(self.process.local_time(), Some(t) if t > stop)
    }

    fn flush(&mut self) -> usize {
        let moved: usize = self
            .process
            .outputs()
            .into_iter()
            .map(|p| p.flush())
            .sum();
        self.stats.tokens_out += moved as u64;
        moved
    }

    fn is_flushed(&mut self) -> bool {
        self.process.outputs().iter().all(|p| p.is_flushed())
    }

    fn retire(&mut self) {
        for port in self.process.outputs() {
            port.close();
        }
        self.state = SlotState::Done;
        self.stats.done = true;
        tracing::debug!(process = %self.stats.name, "terminated");
    }

    fn report(&self, err: crate::error::SimError) -> crate::error::SimError {
        tracing::error!(
            process = %self.stats.name,
            kind = %self.stats.kind,
            "{}",
            err
        );
        err
    }

    fn snapshot(&self) -> ProcessStats {
        let mut s = self.stats.clone();
        s.local_time = self.process.local_time();
        s
    }
}

/// The cooperative kernel owning and scheduling processes.
pub struct Simulation {
    slots: Vec<Slot>,
    views: Vec<Box<dyn SignalView>>,
    params: SimulationParams,
    runner: RoundRunner,
    rounds: u64,
    firings: u64,
    initialized: bool,
    cleaned: bool,
    last_outcome: Option<RunOutcome>,
    wall_time_ms: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    /// Creates a kernel with default parameters.
    pub fn new() -> Self {
        Self::with_params(SimulationParams::default())
    }

    /// Creates a kernel from a validated configuration.
    pub fn from_config(config: &SimConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self::with_params(config.simulation.clone()))
    }

    fn with_params(params: SimulationParams) -> Self {
        let runner = RoundRunner::new(params.threads);
        Self {
            slots: Vec::new(),
            views: Vec::new(),
            params,
            runner,
            rounds: 0,
            firings: 0,
            initialized: false,
            cleaned: false,
            last_outcome: None,
            wall_time_ms: 0.0,
        }
    }

    /// Sets the stop time used by [`Simulation::run`].
    pub fn with_stop_time(mut self, stop: SimTime) -> Self {
        self.params.stop_time = stop;
        self
    }

    /// Sets the round limit.
    pub fn with_max_rounds(mut self, rounds: u64) -> Self {
        self.params.max_rounds = rounds.max(1);
        self
    }

    /// Sets the number of worker threads (0 = auto).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.params.threads = threads;
        self.runner = RoundRunner::new(threads);
        self
    }

    /// Returns true if rounds fire on several threads.
    pub fn is_parallel(&self) -> bool {
        self.runner.is_parallel()
    }

    /// The run parameters.
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Creates a signal with the configured default capacity and tracks
    /// it in the statistics.
    pub fn signal<T: Token>(&mut self, name: impl Into<String>) -> Signal<T> {
        let sig = Signal::with_capacity(name, self.params.default_capacity);
        self.track(&sig);
        sig
    }

    /// Creates a signal tagged with the MoC of its tokens.
    pub fn signal_with<T: Token>(&mut self, name: impl Into<String>, moc: Moc) -> Signal<T> {
        let sig = Signal::with_capacity(name, self.params.default_capacity).with_moc(moc);
        self.track(&sig);
        sig
    }

    /// Creates a bounded signal and tracks it in the statistics.
    ///
    /// A capacity of 0 is raised to 1.
    pub fn bounded_signal<T: Token>(&mut self, name: impl Into<String>, capacity: usize) -> Signal<T> {
        let sig = Signal::bounded(name, capacity);
        self.track(&sig);
        sig
    }

    /// Tracks an externally created signal in the statistics.
    pub fn track<T: Token>(&mut self, signal: &Signal<T>) {
        self.views.push(Box::new(signal.clone()));
    }

    /// Adds a process.
    pub fn add<P: Process + 'static>(&mut self, process: P) -> ProcessId {
        self.add_boxed(Box::new(process))
    }

    /// Adds a boxed process.
    pub fn add_boxed(&mut self, process: Box<dyn Process>) -> ProcessId {
        let id = self.slots.len();
        tracing::debug!(id, name = process.name(), kind = process.kind(), "process added");
        self.slots.push(Slot::new(process));
        id
    }

    /// Number of processes.
    pub fn process_count(&self) -> usize {
        self.slots.len()
    }

    /// Total scheduling rounds so far.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Local time of a process, if it is timed.
    pub fn local_time(&self, id: ProcessId) -> Option<SimTime> {
        self.slots.get(id).and_then(|s| s.process.local_time())
    }

    /// Whether a process has terminated.
    pub fn is_done(&self, id: ProcessId) -> bool {
        self.slots
            .get(id)
            .map(|s| s.state == SlotState::Done)
            .unwrap_or(false)
    }

    /// Runs `init` on every process not yet initialized and commits the
    /// initial tokens.
    pub fn init(&mut self) -> SimResult<()> {
        for slot in &mut self.slots {
            slot.init()?;
        }
        self.initialized = true;
        Ok(())
    }

    /// Executes one scheduling round bounded by `stop`.
    ///
    /// Returns whether anything happened.
    pub fn step_until(&mut self, stop: SimTime) -> SimResult<bool> {
        if !self.initialized || self.slots.iter().any(|s| s.state == SlotState::Created) {
            self.init()?;
        }
        let results = self.runner.run(&mut self.slots, stop)?;
        self.rounds += 1;
        let mut progress = false;
        for r in results {
            progress |= r.progress;
            if r.fired {
                self.firings += 1;
            }
        }
        Ok(progress)
    }

    /// Executes one scheduling round bounded by the configured stop time.
    pub fn step(&mut self) -> SimResult<bool> {
        self.step_until(self.params.stop_time)
    }

    /// Runs until no process can fire at or before `stop`.
    pub fn run_until(&mut self, stop: SimTime) -> SimResult<RunReport> {
        let timer = Timer::start();
        let (rounds0, firings0) = (self.rounds, self.firings);

        let outcome = loop {
            if self.rounds - rounds0 >= self.params.max_rounds {
                break RunOutcome::RoundLimit;
            }
            let progress = self.step_until(stop)?;

            let live = self.count(SlotState::Live);
            let parked = self.count(SlotState::Parked);
            if live == 0 && parked == 0 {
                break RunOutcome::Finished;
            }
            if !progress {
                if parked > 0 {
                    break RunOutcome::StopTime;
                }
                let blocked = self
                    .slots
                    .iter()
                    .filter(|s| s.state == SlotState::Live)
                    .map(|s| s.stats.name.clone())
                    .collect::<Vec<_>>();
                tracing::warn!(?blocked, "no process can make progress");
                break RunOutcome::Quiescent { blocked };
            }
        };

        self.wall_time_ms += timer.elapsed_ms();
        let report = RunReport {
            rounds: self.rounds - rounds0,
            firings: self.firings - firings0,
            final_time: self.final_time(),
            outcome: outcome.clone(),
        };
        tracing::info!(
            rounds = report.rounds,
            firings = report.firings,
            final_time = report.final_time,
            outcome = outcome.label(),
            "run complete"
        );
        self.last_outcome = Some(outcome);
        Ok(report)
    }

    /// Runs until the configured stop time.
    pub fn run(&mut self) -> SimResult<RunReport> {
        self.run_until(self.params.stop_time)
    }

    /// Calls `clean` on every process. Only the first call has an effect.
    pub fn finish(&mut self) {
        if self.cleaned {
            return;
        }
        for slot in &mut self.slots {
            slot.process.clean();
        }
        self.cleaned = true;
    }

    fn count(&self, state: SlotState) -> usize {
        self.slots.iter().filter(|s| s.state == state).count()
    }

    fn final_time(&self) -> SimTime {
        self.slots
            .iter()
            .filter(|s| s.state != SlotState::Parked && s.stats.firings > 0)
            .filter_map(|s| s.process.local_time())
            .max()
            .unwrap_or(0)
    }

    /// Collects the statistics of the run so far.
    pub fn stats(&self) -> SimulationStats {
        let mut stats = SimulationStats::new().with_name(self.params.name.clone());
        stats.metadata.version = env!("CARGO_PKG_VERSION").to_string();
        stats.metadata.stop_time = Some(self.params.stop_time);
        stats.kernel.rounds = self.rounds;
        stats.kernel.firings = self.firings;
        stats.kernel.final_time = self.final_time();
        stats.kernel.outcome = self
            .last_outcome
            .as_ref()
            .map(|o| o.label().to_string())
            .unwrap_or_else(|| "not_run".to_string());
        stats.kernel.process_count = self.slots.len();
        stats.kernel.finished_processes = self.count(SlotState::Done);
        stats.processes = self.slots.iter().map(Slot::snapshot).collect();
        stats.signals = self.views.iter().map(|p| p.snapshot()).collect();
        stats.compute_timing(self.wall_time_ms);
        stats
    }

    /// Exports statistics as JSON.
    pub fn export_stats(&self) -> serde_json::Value {
        self.stats().to_json()
    }

    /// Descriptions of every process, in insertion order.
    pub fn describe(&mut self) -> Vec<ProcessDesc> {
        self.slots.iter_mut().map(|s| s.process.describe()).collect()
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.finish();
    }
}
