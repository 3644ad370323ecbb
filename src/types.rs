//! Core type definitions shared by every Model of Computation.
//!
//! All timed MoCs (DE, DDE, CT) and the timed interfaces use the same
//! integer `SimTime` representation, so tokens crossing MoC boundaries
//! keep a single timeline.

/// Simulation time unit (abstract integer ticks, e.g. nanoseconds).
pub type SimTime = u64;

/// The origin of the timeline.
pub const ZERO_TIME: SimTime = 0;

/// Clock value of an input whose stream has ended.
///
/// A closed and drained timed input behaves as if its next event lies
/// infinitely far in the future, which lets multi-input merges keep
/// consuming the remaining live input.
pub const END_OF_TIME: SimTime = SimTime::MAX;

/// Codomain of continuous-time sub-signal functions.
pub type CtValue = f64;

/// Index of a process inside a [`crate::Simulation`].
pub type ProcessId = usize;
