//! Mapping event times onto sampling ticks.
//!
//! Timed MoCs (DE, DDE) place events at arbitrary times, while the
//! synchronous side of an interface only exists at multiples of a
//! sampling period. When a timed event crosses into a synchronous
//! signal, its timestamp is aligned to a tick boundary using one of
//! three rules:
//!
//! | Rule | Formula |
//! |------|---------|
//! | CeilToTick | `t_vis = ⌈t_e / Δt⌉ × Δt` |
//! | FloorToTick | `t_vis = ⌊t_e / Δt⌋ × Δt` |
//! | StrictTickBoundary | `t_vis = t_e` if `t_e % Δt == 0`, else error |
//!
//! # Example
//!
//! ```
//! use forsyde::TimeAlignment;
//!
//! // An event at 103 seen by a consumer sampling every 10
//! assert_eq!(TimeAlignment::CeilToTick.align(103, 10), Some(110));
//! assert_eq!(TimeAlignment::FloorToTick.align(103, 10), Some(100));
//! assert_eq!(TimeAlignment::StrictTickBoundary.align(103, 10), None);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::types::SimTime;

/// Time alignment rules for timed → synchronous conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeAlignment {
    /// Round up to the next tick.
    ///
    /// The synchronous side never observes an event before it happened.
    #[default]
    CeilToTick,

    /// Round down to the previous tick.
    ///
    /// The synchronous side may observe an event up to one period
    /// before its timestamp.
    FloorToTick,

    /// Require the event to fall exactly on a tick.
    StrictTickBoundary,
}

impl TimeAlignment {
    /// Aligns `event_time` to a tick of `tick_period`.
    ///
    /// A period of 0 leaves the time unchanged. Returns `None` only for
    /// [`TimeAlignment::StrictTickBoundary`] off a boundary.
    pub fn align(&self, event_time: SimTime, tick_period: SimTime) -> Option<SimTime> {
        if tick_period == 0 {
            return Some(event_time);
        }

        match self {
            TimeAlignment::CeilToTick => Some(Self::ceil_to_tick(event_time, tick_period)),
            TimeAlignment::FloorToTick => Some(Self::floor_to_tick(event_time, tick_period)),
            TimeAlignment::StrictTickBoundary => {
                if event_time % tick_period == 0 {
                    Some(event_time)
                } else {
                    None
                }
            }
        }
    }

    /// Like [`TimeAlignment::align`], reporting a strict failure as
    /// [`SimError::Misaligned`].
    pub fn try_align(&self, event_time: SimTime, tick_period: SimTime) -> SimResult<SimTime> {
        self.align(event_time, tick_period)
            .ok_or(SimError::Misaligned {
                time: event_time,
                period: tick_period,
            })
    }

    /// `⌈t / Δt⌉ × Δt`
    #[inline]
    pub fn ceil_to_tick(event_time: SimTime, tick_period: SimTime) -> SimTime {
        if tick_period == 0 || event_time == 0 {
            return event_time;
        }
        event_time.div_ceil(tick_period).saturating_mul(tick_period)
    }

    /// `⌊t / Δt⌋ × Δt`
    #[inline]
    pub fn floor_to_tick(event_time: SimTime, tick_period: SimTime) -> SimTime {
        if tick_period == 0 {
            return event_time;
        }
        (event_time / tick_period) * tick_period
    }

    /// Checks if a time is exactly on a tick boundary.
    #[inline]
    pub fn is_on_boundary(event_time: SimTime, tick_period: SimTime) -> bool {
        tick_period == 0 || event_time % tick_period == 0
    }

    /// Index of the tick at or before `event_time`.
    #[inline]
    pub fn tick_number(event_time: SimTime, tick_period: SimTime) -> u64 {
        if tick_period == 0 {
            return 0;
        }
        event_time / tick_period
    }
}
