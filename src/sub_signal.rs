//! Continuous-time sub-signals.
//!
//! A CT signal is a stream of [`SubSignal`]s, each one a function of time
//! valid over the half-open interval `[start, end)`. Processes never
//! sample eagerly: combinators build new sub-signals by composing
//! closures, and evaluation only happens when a consumer samples.
//!
//! # Example
//!
//! ```
//! use forsyde::SubSignal;
//!
//! let ramp = SubSignal::new(0, 10, |t| t as f64 * 0.5);
//! assert_eq!(ramp.sample(4).unwrap(), 2.0);
//! assert!(ramp.sample(10).is_err()); // end is exclusive
//!
//! let later = ramp.shifted(5);
//! assert_eq!(later.range(), (5, 15));
//! assert_eq!(later.sample(9).unwrap(), 2.0);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::{SimError, SimResult};
use crate::types::{CtValue, SimTime};

/// Shared function from time to value.
pub type CtFn = Arc<dyn Fn(SimTime) -> CtValue + Send + Sync>;

/// A function of time together with its validity interval `[start, end)`.
#[derive(Clone)]
pub struct SubSignal {
    start: SimTime,
    end: SimTime,
    f: CtFn,
}

impl SubSignal {
    /// Creates a sub-signal from a closure.
    pub fn new<F>(start: SimTime, end: SimTime, f: F) -> Self
    where
        F: Fn(SimTime) -> CtValue + Send + Sync + 'static,
    {
        Self::from_fn(start, end, Arc::new(f))
    }

    /// Creates a sub-signal from an already shared function.
    pub fn from_fn(start: SimTime, end: SimTime, f: CtFn) -> Self {
        Self { start, end, f }
    }

    /// A constant sub-signal.
    pub fn constant(start: SimTime, end: SimTime, value: CtValue) -> Self {
        Self::new(start, end, move |_| value)
    }

    /// Start of the interval (inclusive).
    #[inline]
    pub fn start(&self) -> SimTime {
        self.start
    }

    /// End of the interval (exclusive).
    #[inline]
    pub fn end(&self) -> SimTime {
        self.end
    }

    /// `(start, end)`.
    #[inline]
    pub fn range(&self) -> (SimTime, SimTime) {
        (self.start, self.end)
    }

    /// Length of the interval.
    #[inline]
    pub fn duration(&self) -> SimTime {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the interval contains no instant.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Returns `true` if `t` lies in `[start, end)`.
    #[inline]
    pub fn contains(&self, t: SimTime) -> bool {
        self.start <= t && t < self.end
    }

    /// The shared function, for composition.
    pub fn function(&self) -> CtFn {
        Arc::clone(&self.f)
    }

    /// Evaluates the sub-signal at `t`.
    ///
    /// Sampling outside `[start, end)` is a protocol violation: it is
    /// logged and reported as [`SimError::OutOfRange`].
    pub fn sample(&self, t: SimTime) -> SimResult<CtValue> {
        if !self.contains(t) {
            tracing::error!(
                at = t,
                start = self.start,
                end = self.end,
                "sub-signal sampled out of range"
            );
            return Err(SimError::OutOfRange {
                at: t,
                start: self.start,
                end: self.end,
            });
        }
        Ok((self.f)(t))
    }

    /// Same function, new interval.
    pub fn with_range(&self, start: SimTime, end: SimTime) -> Self {
        Self::from_fn(start, end, self.function())
    }

    /// Moves the interval by `delay` while keeping the function as is.
    pub fn delayed(&self, delay: SimTime) -> Self {
        self.with_range(
            self.start.saturating_add(delay),
            self.end.saturating_add(delay),
        )
    }

    /// Moves both the interval and the function by `delay`, so that the
    /// new signal at `t + delay` equals the old one at `t`.
    pub fn shifted(&self, delay: SimTime) -> Self {
        let f = self.function();
        Self::new(
            self.start.saturating_add(delay),
            self.end.saturating_add(delay),
            move |t| f(t.saturating_sub(delay)),
        )
    }

    /// Pointwise application of `g` to this sub-signal.
    pub fn map<G>(&self, g: G) -> Self
    where
        G: Fn(CtValue) -> CtValue + Send + Sync + 'static,
    {
        let f = self.function();
        Self::new(self.start, self.end, move |t| g(f(t)))
    }
}

/// The common interval `[max(starts), min(ends))` of two sub-signals.
///
/// The result is empty (`start >= end`) when they do not intersect.
pub fn overlap(a: &SubSignal, b: &SubSignal) -> (SimTime, SimTime) {
    (a.start.max(b.start), a.end.min(b.end))
}

impl fmt::Debug for SubSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubSignal")
            .field("start", &self.start)
            .field("end", &self.end)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for SubSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
