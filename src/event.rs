//! Time-tagged events for the discrete-event MoCs.
//!
//! A [`TtEvent`] pairs a value with the simulated time at which it
//! occurs. The DE MoC carries plain values, while DDE carries
//! absent-extended ones ([`TtnEvent`]) so that a process can announce
//! "nothing happened at time t" and let its consumers advance.
//!
//! Events are ordered by time only; the value never takes part in a
//! comparison. Use [`by_time`] where a sort is needed.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::abst_ext::AbstExt;
use crate::types::SimTime;

/// A value tagged with the simulated time at which it occurs.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct TtEvent<T> {
    /// The carried value
    pub value: T,
    /// Timestamp of the event
    pub time: SimTime,
}

/// A time-tagged absent-extended event (DDE token).
pub type TtnEvent<T> = TtEvent<AbstExt<T>>;

impl<T> TtEvent<T> {
    /// Creates a new event.
    pub fn new(value: T, time: SimTime) -> Self {
        Self { value, time }
    }

    /// Returns the timestamp.
    #[inline]
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Borrows the value.
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Moves the event to another time.
    pub fn set_time(&mut self, time: SimTime) {
        self.time = time;
    }

    /// Replaces the value.
    pub fn set_value(&mut self, value: T) {
        self.value = value;
    }

    /// Consumes the event, returning its value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Returns a copy of this event delayed by `delay`.
    pub fn delayed(mut self, delay: SimTime) -> Self {
        self.time = self.time.saturating_add(delay);
        self
    }

    /// Applies `f` to the value, keeping the timestamp.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> TtEvent<U> {
        TtEvent {
            value: f(self.value),
            time: self.time,
        }
    }
}

impl<T> TtEvent<AbstExt<T>> {
    /// A present DDE event.
    pub fn present(value: T, time: SimTime) -> Self {
        Self::new(AbstExt::Present(value), time)
    }

    /// An absent DDE event, which only advances time.
    pub fn absent(time: SimTime) -> Self {
        Self::new(AbstExt::Absent, time)
    }
}

/// Compares two events by timestamp only.
pub fn by_time<A, B>(a: &TtEvent<A>, b: &TtEvent<B>) -> Ordering {
    a.time.cmp(&b.time)
}

impl<T: fmt::Display> fmt::Display for TtEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.value, self.time)
    }
}
