//! Process constructors, one module per Model of Computation.
//!
//! Every constructor is a struct implementing [`crate::Process`], built
//! from a name, its user function(s) and its ports. The port types fix
//! the token representation of the MoC:
//!
//! | MoC | Module | Token |
//! |-----|--------|-------|
//! | Synchronous | [`sy`] | `AbstExt<T>`, one per cycle |
//! | Synchronous dataflow | [`sdf`] | `T`, fixed rates per firing |
//! | Discrete event | [`de`] | `TtEvent<T>` |
//! | Distributed discrete event | [`dde`] | `TtEvent<AbstExt<T>>` |
//! | Continuous time | [`ct`] | `SubSignal` |
//! | Discrete time | [`dt`] | `AbstExt<T>`, one per instant |
//! | Untimed | [`ut`] | `T`, state-dependent rates |
//!
//! [`mi`] holds the interfaces translating one MoC's signals into
//! another's.

/// Reads one token from `$port`, or returns from the enclosing `prep`
/// with the flow implied by the port's availability.
macro_rules! read_or_return {
    ($port:expr) => {
        match $port.status(1) {
            $crate::signal::Availability::Ready => $port.read()?,
            other => return Ok(other.flow()),
        }
    };
}

pub mod ct;
pub mod dde;
pub mod de;
pub mod dt;
pub mod mi;
pub mod sdf;
pub mod sy;
pub mod ut;

use crate::error::{SimError, SimResult};
use crate::signal::{Availability, InPort, Token};

/// Fails with [`SimError::RateMismatch`] unless `actual == expected`.
pub(crate) fn check_rate(process: &str, expected: usize, actual: usize) -> SimResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(SimError::RateMismatch {
            process: process.to_string(),
            expected,
            actual,
        })
    }
}

/// Fails unless a construction parameter is positive.
pub(crate) fn check_positive(process: &str, what: &str, value: u64) -> SimResult<()> {
    if value == 0 {
        return Err(SimError::process(process, format!("{} must be greater than 0", what)));
    }
    Ok(())
}

/// Lockstep availability of several ports, each needing its own count.
pub(crate) fn all_ready<'a, T: Token>(
    ports: impl IntoIterator<Item = (&'a InPort<T>, usize)>,
) -> Availability {
    Availability::all(ports.into_iter().map(|(p, n)| p.status(n)))
}

/// Availability of a state-dependent read of `n` tokens.
///
/// A zero-token read never waits, so it only ends once the input is
/// closed and drained.
pub(crate) fn rate_status<T: Token>(port: &InPort<T>, n: usize) -> Availability {
    if n == 0 && port.is_ended() {
        Availability::Ended
    } else {
        port.status(n)
    }
}

/// Counts emitted tokens against a `take` limit, 0 meaning unlimited.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct TakeCounter {
    take: u64,
    emitted: u64,
}

impl TakeCounter {
    pub(crate) fn new(take: u64) -> Self {
        Self { take, emitted: 0 }
    }

    pub(crate) fn exhausted(&self) -> bool {
        self.take != 0 && self.emitted >= self.take
    }

    pub(crate) fn tick(&mut self) {
        self.emitted += 1;
    }
}
