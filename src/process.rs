//! The abstract process and its lifecycle.
//!
//! Every process constructor of every MoC implements [`Process`]. The
//! kernel drives each process through the same fixed sequence:
//!
//! ```text
//! init()                 once: set up state, stage initial tokens
//! loop:
//!     prep()             take input tokens, or report Blocked / Done
//!     exec()             apply the user function, never suspends
//!     prod()             stage output tokens
//! clean()                once, at teardown
//! ```
//!
//! `prep` is the only phase that may decline to proceed. A process whose
//! inputs are not yet available returns [`Flow::Blocked`] and is retried
//! in a later scheduling round without consuming anything. Outputs are
//! staged by `prod` and committed by the kernel after the firing; a
//! process whose outputs cannot be committed (full bounded signal) is not
//! prepared again until they are.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SimResult;
use crate::signal::{InputPort, OutputPort};
use crate::types::SimTime;

/// Models of Computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Moc {
    /// Synchronous
    Sy,
    /// Synchronous dataflow
    Sdf,
    /// Discrete event
    De,
    /// Distributed discrete event
    Dde,
    /// Continuous time
    Ct,
    /// Discrete time
    Dt,
    /// Untimed
    Ut,
    /// Interface between two MoCs
    Interface,
}

impl Moc {
    /// Short tag used in process kinds, e.g. `"SY"`.
    pub fn tag(&self) -> &'static str {
        match self {
            Moc::Sy => "SY",
            Moc::Sdf => "SDF",
            Moc::De => "DE",
            Moc::Dde => "DDE",
            Moc::Ct => "CT",
            Moc::Dt => "DT",
            Moc::Ut => "UT",
            Moc::Interface => "MI",
        }
    }

    /// Parses the prefix of a process kind such as `"SDF::comb2"`.
    pub fn from_kind(kind: &str) -> Option<Moc> {
        let tag = kind.split("::").next()?;
        [
            Moc::Sy,
            Moc::Sdf,
            Moc::De,
            Moc::Dde,
            Moc::Ct,
            Moc::Dt,
            Moc::Ut,
            Moc::Interface,
        ]
        .into_iter()
        .find(|m| m.tag() == tag)
    }
}

impl fmt::Display for Moc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Outcome of [`Process::prep`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Inputs were taken; `exec` and `prod` follow.
    Ready,
    /// Inputs are not available yet; nothing was consumed.
    Blocked,
    /// The process will never fire again.
    Done,
}

/// Describes a port of a process: its position, carried type and the
/// signals it is bound to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
    /// Position of the port (e.g. "iport1", "oport1")
    pub name: String,
    /// Type carried by the port
    pub ty: String,
    /// Bound signals; an output port may drive several
    pub signals: Vec<String>,
}

impl PortInfo {
    /// Creates a new `PortInfo`.
    pub fn new(name: impl Into<String>, ty: impl Into<String>, signals: Vec<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            signals,
        }
    }

    /// Describes the `index`-th input port.
    pub fn input(index: usize, port: &dyn InputPort) -> Self {
        Self::new(
            format!("iport{}", index + 1),
            port.token_type(),
            vec![port.signal_name().to_string()],
        )
    }

    /// Describes the `index`-th output port.
    pub fn output(index: usize, port: &dyn OutputPort) -> Self {
        Self::new(format!("oport{}", index + 1), port.token_type(), port.signal_names())
    }
}

/// Static description of a process instance.
///
/// Purely descriptive: nothing in the kernel depends on it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessDesc {
    /// Instance name
    pub name: String,
    /// Constructor kind, e.g. "SY::mealy"
    pub kind: String,
    /// MoC of the constructor
    pub moc: Option<Moc>,
    /// Construction arguments as (name, value) strings
    pub args: Vec<(String, String)>,
    /// Input ports
    pub inputs: Vec<PortInfo>,
    /// Output ports
    pub outputs: Vec<PortInfo>,
}

/// A process running the init / prep / exec / prod / clean lifecycle.
pub trait Process: Send {
    /// Instance name.
    fn name(&self) -> &str;

    /// Constructor kind, e.g. `"DE::comb2"`.
    fn kind(&self) -> &'static str;

    /// MoC of this process, derived from [`Process::kind`].
    fn moc(&self) -> Option<Moc> {
        Moc::from_kind(self.kind())
    }

    /// One-time setup. Initial tokens may be written here.
    fn init(&mut self) -> SimResult<()> {
        Ok(())
    }

    /// Takes the inputs of the next firing.
    fn prep(&mut self) -> SimResult<Flow>;

    /// Computes the results of the current firing.
    fn exec(&mut self) -> SimResult<()>;

    /// Stages the results of the current firing.
    fn prod(&mut self) -> SimResult<()>;

    /// Teardown, called once when the simulation finishes.
    fn clean(&mut self) {}

    /// The output ports, so the kernel can commit and close them.
    fn outputs(&mut self) -> Vec<&mut dyn OutputPort>;

    /// The input ports, for introspection.
    fn inputs(&self) -> Vec<&dyn InputPort> {
        Vec::new()
    }

    /// Current local time, for timed processes.
    fn local_time(&self) -> Option<SimTime> {
        None
    }

    /// Construction arguments, for introspection.
    fn args(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Builds the descriptive record of this process.
    fn describe(&mut self) -> ProcessDesc {
        let inputs = self
            .inputs()
            .into_iter()
            .enumerate()
            .map(|(i, p)| PortInfo::input(i, p))
            .collect();
        let outputs = self
            .outputs()
            .into_iter()
            .enumerate()
            .map(|(i, p)| PortInfo::output(i, p))
            .collect();
        ProcessDesc {
            name: self.name().to_string(),
            kind: self.kind().to_string(),
            moc: self.moc(),
            args: self.args(),
            inputs,
            outputs,
        }
    }
}

/// Formats a construction argument for [`Process::args`].
pub(crate) fn arg(name: &str, value: impl fmt::Debug) -> (String, String) {
    (name.to_string(), format!("{:?}", value))
}
