//! Error types for model construction and simulation.

use thiserror::Error;

use crate::config::ConfigError;
use crate::types::SimTime;

/// Errors raised while building or running a model.
///
/// Every error aborts the run: the kernel logs it with the name of the
/// offending process and hands it back to the caller.
#[derive(Error, Debug)]
pub enum SimError {
    /// A continuous-time sub-signal was sampled outside `[start, end)`.
    #[error("sub-signal sampled at {at} outside its range [{start}, {end})")]
    OutOfRange {
        at: SimTime,
        start: SimTime,
        end: SimTime,
    },

    /// A second reader port was requested for a signal.
    #[error("signal '{0}' already has a reader bound")]
    ReaderBound(String),

    /// A second writer was bound to a signal.
    #[error("signal '{0}' already has a writer bound")]
    WriterBound(String),

    /// A token was read from a signal that had none available.
    #[error("read from empty signal '{0}'")]
    EmptyRead(String),

    /// A user function produced a different number of tokens than the
    /// rate declared at construction.
    #[error("process '{process}' produced {actual} tokens, declared rate is {expected}")]
    RateMismatch {
        process: String,
        expected: usize,
        actual: usize,
    },

    /// An event time did not fall on a sampling tick under strict alignment.
    #[error("time {time} is not on a tick boundary of period {period}")]
    Misaligned { time: SimTime, period: SimTime },

    /// A malformed model detected by a process.
    #[error("process '{process}': {reason}")]
    Process { process: String, reason: String },

    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SimError {
    /// Shorthand for [`SimError::Process`].
    pub fn process(process: impl Into<String>, reason: impl Into<String>) -> Self {
        SimError::Process {
            process: process.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
