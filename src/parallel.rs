//! Multi-threaded scheduling rounds.
//!
//! With the `parallel` feature, the processes of a round fire
//! concurrently on a rayon thread pool. Signals are single-reader,
//! single-writer FIFOs behind a `parking_lot::Mutex`, so the token
//! streams of the network are the same as in a sequential round; only
//! the number of rounds needed may differ.
//!
//! Without the feature, or with a single thread, rounds run sequentially
//! in process insertion order.
//!
//! # Feature Flag
//!
//! ```toml
//! [dependencies]
//! forsyde = { version = "0.1", features = ["parallel"] }
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::engine::{Slot, SlotRound};
use crate::error::SimResult;
use crate::types::SimTime;

/// Strategy used to fire the processes of one round.
pub(crate) enum RoundRunner {
    Sequential,
    #[cfg(feature = "parallel")]
    Pool(rayon::ThreadPool),
}

impl RoundRunner {
    /// Picks a runner for `threads` workers (0 = one per CPU).
    pub(crate) fn new(threads: usize) -> Self {
        #[cfg(feature = "parallel")]
        {
            if threads != 1 {
                match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                    Ok(pool) => {
                        tracing::debug!(threads = pool.current_num_threads(), "parallel rounds enabled");
                        return RoundRunner::Pool(pool);
                    }
                    Err(e) => {
                        tracing::warn!("failed to build thread pool, running sequentially: {}", e);
                    }
                }
            }
        }
        #[cfg(not(feature = "parallel"))]
        let _ = threads;
        RoundRunner::Sequential
    }

    /// Returns true if rounds fire on several threads.
    pub(crate) fn is_parallel(&self) -> bool {
        !matches!(self, RoundRunner::Sequential)
    }

    /// Fires one round over `slots`, stopping at the first error.
    pub(crate) fn run(&self, slots: &mut [Slot], stop: SimTime) -> SimResult<Vec<SlotRound>> {
        match self {
            RoundRunner::Sequential => slots.iter_mut().map(|s| s.round(stop)).collect(),
            #[cfg(feature = "parallel")]
            RoundRunner::Pool(pool) => {
                pool.install(|| slots.par_iter_mut().map(|s| s.round(stop)).collect())
            }
        }
    }
}

impl std::fmt::Debug for RoundRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundRunner::Sequential => f.write_str("Sequential"),
            #[cfg(feature = "parallel")]
            RoundRunner::Pool(pool) => write!(f, "Pool({})", pool.current_num_threads()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_thread_is_sequential() {
        let runner = RoundRunner::new(1);
        assert!(!runner.is_parallel());
        assert_eq!(format!("{:?}", runner), "Sequential");
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_pool_runner() {
        let runner = RoundRunner::new(2);
        assert!(runner.is_parallel());
    }

    #[test]
    fn test_empty_round() {
        let runner = RoundRunner::new(0);
        let mut slots: Vec<Slot> = Vec::new();
        assert!(runner.run(&mut slots, 0).unwrap().is_empty());
    }
}
