//! # ForSyDe Models of Computation
//!
//! Executable process networks under several Models of Computation
//! (MoCs), run by a cooperative in-crate kernel.
//!
//! ## Design Principles
//!
//! - **Processes and signals**: a model is a set of processes connected
//!   by single-writer, single-reader FIFO signals. Every process follows
//!   the same init / prep / exec / prod / clean lifecycle.
//! - **One kernel for every MoC**: untimed MoCs (SY, SDF, DT, UT) are
//!   driven by token availability alone; timed MoCs (DE, DDE, CT) also
//!   report a local time so that runs can stop at a given instant.
//! - **Unified timeline**: all timed MoCs share the integer
//!   [`SimTime`], so interfaces never convert clocks.
//!
//! ## Models of Computation
//!
//! | Module | MoC | Token |
//! |--------|-----|-------|
//! | [`moc::sy`] | Synchronous | [`AbstExt<T>`] |
//! | [`moc::sdf`] | Synchronous dataflow | `T` |
//! | [`moc::de`] | Discrete event | [`TtEvent<T>`] |
//! | [`moc::dde`] | Distributed discrete event | [`TtnEvent<T>`] |
//! | [`moc::ct`] | Continuous time | [`SubSignal`] |
//! | [`moc::dt`] | Discrete time | [`AbstExt<T>`] |
//! | [`moc::ut`] | Untimed | `T` |
//! | [`moc::mi`] | Interfaces between the above | |
//!
//! ## Features
//!
//! - `parallel` - Fire the processes of a round on a rayon thread pool
//!
//! ## Quick Start
//!
//! ```rust
//! use forsyde::moc::sy;
//! use forsyde::{AbstExt, RunOutcome, Simulation};
//!
//! let mut sim = Simulation::new();
//! let (a, b, sum) = (sim.signal("a"), sim.signal("b"), sim.signal("sum"));
//!
//! sim.add(sy::VSource::new("a", vec![1, 2, 3], a.writer().unwrap()));
//! sim.add(sy::VSource::new("b", vec![10, 20, 30], b.writer().unwrap()));
//! sim.add(sy::Comb2::new(
//!     "add",
//!     |x: &AbstExt<i32>, y: &AbstExt<i32>| match (x, y) {
//!         (AbstExt::Present(x), AbstExt::Present(y)) => AbstExt::Present(x + y),
//!         _ => AbstExt::Absent,
//!     },
//!     a.reader().unwrap(),
//!     b.reader().unwrap(),
//!     sum.writer().unwrap(),
//! ));
//!
//! let report = sim.run().unwrap();
//! assert_eq!(report.outcome, RunOutcome::Finished);
//! assert_eq!(
//!     sum.contents(),
//!     vec![AbstExt::Present(11), AbstExt::Present(22), AbstExt::Present(33)]
//! );
//! ```
//!
//! ## Configuration-Driven Setup
//!
//! ```rust,ignore
//! use forsyde::{SimConfig, Simulation};
//!
//! let config = SimConfig::from_yaml_file("simulation.yaml")?;
//! forsyde::init_logging(&config.simulation.log_level);
//! let mut sim = Simulation::from_config(&config)?;
//! // ... add signals and processes
//! sim.run()?;
//! ```

pub mod types;
pub mod time;
pub mod error;
pub mod abst_ext;
pub mod event;
pub mod sub_signal;
pub mod signal;
pub mod process;
pub mod merge;
pub mod engine;
pub mod parallel;
pub mod config;
pub mod stats;
pub mod moc;

// Re-export commonly used types
pub use types::{CtValue, ProcessId, SimTime, END_OF_TIME, ZERO_TIME};
pub use time::TimeAlignment;
pub use error::{SimError, SimResult};
pub use abst_ext::AbstExt;
pub use event::{TtEvent, TtnEvent};
pub use sub_signal::SubSignal;
pub use signal::{Availability, InPort, InputPort, OutPort, OutputPort, Signal, Token};
pub use process::{Flow, Moc, PortInfo, Process, ProcessDesc};
pub use engine::{RunOutcome, RunReport, Simulation};
pub use config::{ConfigError, SimConfig, SimConfigBuilder, SimulationParams};
pub use stats::{SimulationStats, Timer};

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging.
/// `RUST_LOG` takes precedence over `level` when set.
///
/// # Example
///
/// ```rust,ignore
/// forsyde::init_logging("debug");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
