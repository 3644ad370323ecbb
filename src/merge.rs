//! Clock alignment for the multi-input discrete-event processes.
//!
//! A two-input DE/DDE process sees two independently advancing event
//! streams. Each input has a channel clock: the timestamp of the last
//! event read from it. At every firing:
//!
//! 1. read port 1 if `in1T <= in2T`, read port 2 if `in2T <= in1T`
//!    (ties read both);
//! 2. set the clock of every port read to the time of its new event, or
//!    to [`END_OF_TIME`] when its stream has ended;
//! 3. the local time becomes `tc = min(in1T, in2T)`;
//! 4. the input(s) whose clock equals `tc` are *current* and deliver
//!    their event to the user function. The other input's event has
//!    been read but lies in the future, so it stays pending.
//!
//! When both clocks reach `END_OF_TIME` the process is done.
//!
//! [`ClockMerge`] holds the bare clock arithmetic. [`Merge2`] applies it
//! to a pair of [`InPort`]s and never consumes a token unless every port
//! it wants to read has one. [`MergeN`] generalizes the same rule to any
//! number of ports of one token type: a port is read iff its clock equals
//! the minimum over all clocks.
//!
//! # Example
//!
//! ```
//! use forsyde::merge::ClockMerge;
//!
//! let mut m = ClockMerge::new();
//! assert_eq!(m.ports_to_read(), (true, true));
//!
//! m.set_clocks(Some(0), Some(1));
//! let tick = m.settle();
//! assert_eq!(tick.time, 0);
//! assert_eq!(tick.current, (true, false));
//!
//! // Port 2 is ahead, only port 1 is read next.
//! assert_eq!(m.ports_to_read(), (true, false));
//! ```

use crate::error::{SimError, SimResult};
use crate::event::TtEvent;
use crate::signal::{Availability, InPort, Token};
use crate::types::{SimTime, END_OF_TIME, ZERO_TIME};

/// Result of settling the clocks after a read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    /// The new local time, `min(in1T, in2T)`
    pub time: SimTime,
    /// Which inputs are current at `time`
    pub current: (bool, bool),
}

/// Channel clocks of a two-input timed process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClockMerge {
    in1: SimTime,
    in2: SimTime,
    local: SimTime,
}

impl Default for ClockMerge {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockMerge {
    /// Both clocks and the local time start at zero.
    pub fn new() -> Self {
        Self {
            in1: ZERO_TIME,
            in2: ZERO_TIME,
            local: ZERO_TIME,
        }
    }

    /// Which ports the next firing reads.
    ///
    /// A port is read iff its clock is not strictly ahead of the other.
    /// An ended port is never read again.
    pub fn ports_to_read(&self) -> (bool, bool) {
        (
            self.in1 <= self.in2 && self.in1 != END_OF_TIME,
            self.in2 <= self.in1 && self.in2 != END_OF_TIME,
        )
    }

    /// Updates the clocks of the ports just read.
    ///
    /// `None` leaves a clock unchanged.
    pub fn set_clocks(&mut self, in1: Option<SimTime>, in2: Option<SimTime>) {
        if let Some(t) = in1 {
            self.in1 = t;
        }
        if let Some(t) = in2 {
            self.in2 = t;
        }
    }

    /// Advances local time to the earliest clock.
    pub fn settle(&mut self) -> Tick {
        self.local = self.in1.min(self.in2);
        Tick {
            time: self.local,
            current: (self.in1 == self.local, self.in2 == self.local),
        }
    }

    /// `(in1T, in2T)`.
    pub fn clocks(&self) -> (SimTime, SimTime) {
        (self.in1, self.in2)
    }

    /// The local time after the last [`ClockMerge::settle`].
    pub fn local_time(&self) -> SimTime {
        self.local
    }

    /// Both inputs have ended.
    pub fn is_done(&self) -> bool {
        self.in1 == END_OF_TIME && self.in2 == END_OF_TIME
    }
}

/// Outcome of one [`Merge2::poll`].
#[derive(Clone, Debug, PartialEq)]
pub enum MergeStep<A, B> {
    /// A wanted port has no token yet; nothing was consumed.
    Blocked,
    /// Both inputs have ended.
    Done,
    /// A firing at `time`; `Some` marks the current inputs.
    Fire {
        time: SimTime,
        first: Option<A>,
        second: Option<B>,
    },
}

/// Clock merge over two event ports.
#[derive(Debug)]
pub struct Merge2<A, B> {
    clock: ClockMerge,
    pending1: Option<TtEvent<A>>,
    pending2: Option<TtEvent<B>>,
}

impl<A, B> Default for Merge2<A, B> {
    fn default() -> Self {
        Self {
            clock: ClockMerge::new(),
            pending1: None,
            pending2: None,
        }
    }
}

impl<A: Token, B: Token> Merge2<A, B> {
    /// Creates a fresh merge.
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying clocks.
    pub fn clock(&self) -> &ClockMerge {
        &self.clock
    }

    /// Runs one step of the alignment over `in1` and `in2`.
    ///
    /// `owner` names the process in errors.
    pub fn poll(
        &mut self,
        owner: &str,
        in1: &InPort<TtEvent<A>>,
        in2: &InPort<TtEvent<B>>,
    ) -> SimResult<MergeStep<A, B>> {
        let (r1, r2) = self.clock.ports_to_read();
        if !r1 && !r2 {
            return Ok(MergeStep::Done);
        }

        let s1 = if r1 { in1.status(1) } else { Availability::Ready };
        let s2 = if r2 { in2.status(1) } else { Availability::Ready };
        if s1 == Availability::Pending || s2 == Availability::Pending {
            return Ok(MergeStep::Blocked);
        }

        let (c1, c2) = self.clock.clocks();
        let t1 = if r1 {
            Some(Self::take(owner, in1, s1, c1, &mut self.pending1)?)
        } else {
            None
        };
        let t2 = if r2 {
            Some(Self::take(owner, in2, s2, c2, &mut self.pending2)?)
        } else {
            None
        };
        self.clock.set_clocks(t1, t2);

        if self.clock.is_done() {
            return Ok(MergeStep::Done);
        }

        let tick = self.clock.settle();
        let first = if tick.current.0 {
            self.pending1.take().map(TtEvent::into_value)
        } else {
            None
        };
        let second = if tick.current.1 {
            self.pending2.take().map(TtEvent::into_value)
        } else {
            None
        };
        tracing::trace!(
            process = owner,
            time = tick.time,
            first = tick.current.0,
            second = tick.current.1,
            "merge fired"
        );
        Ok(MergeStep::Fire {
            time: tick.time,
            first,
            second,
        })
    }

    fn take<T: Token>(
        owner: &str,
        port: &InPort<TtEvent<T>>,
        status: Availability,
        clock: SimTime,
        pending: &mut Option<TtEvent<T>>,
    ) -> SimResult<SimTime> {
        if status == Availability::Ended {
            return Ok(END_OF_TIME);
        }
        let ev = port.read()?;
        if ev.time < clock {
            return Err(SimError::process(
                owner,
                format!(
                    "event at {} on '{}' is earlier than the channel clock {}",
                    ev.time,
                    port.name(),
                    clock
                ),
            ));
        }
        let t = ev.time;
        *pending = Some(ev);
        Ok(t)
    }
}

/// Outcome of one [`MergeN::poll`].
#[derive(Clone, Debug, PartialEq)]
pub enum MergeNStep<T> {
    /// A wanted port has no token yet; nothing was consumed.
    Blocked,
    /// Every input has ended.
    Done,
    /// A firing at `time`; `Some` marks the current inputs.
    Fire { time: SimTime, current: Vec<Option<T>> },
}

/// Clock merge over N event ports of the same token type.
#[derive(Debug)]
pub struct MergeN<T> {
    clocks: Vec<SimTime>,
    pending: Vec<Option<TtEvent<T>>>,
    local: SimTime,
}

impl<T: Token> MergeN<T> {
    /// Creates a merge over `n` inputs, all clocks at zero.
    pub fn new(n: usize) -> Self {
        Self {
            clocks: vec![ZERO_TIME; n],
            pending: vec![None; n],
            local: ZERO_TIME,
        }
    }

    /// The channel clocks, one per input.
    pub fn clocks(&self) -> &[SimTime] {
        &self.clocks
    }

    /// The local time after the last firing.
    pub fn local_time(&self) -> SimTime {
        self.local
    }

    /// Every input has ended.
    pub fn is_done(&self) -> bool {
        self.clocks.iter().all(|&c| c == END_OF_TIME)
    }

    /// Runs one step of the alignment over `ports`.
    pub fn poll(&mut self, owner: &str, ports: &[InPort<TtEvent<T>>]) -> SimResult<MergeNStep<T>> {
        if ports.len() != self.clocks.len() {
            return Err(SimError::RateMismatch {
                process: owner.to_string(),
                expected: self.clocks.len(),
                actual: ports.len(),
            });
        }
        if self.is_done() {
            return Ok(MergeNStep::Done);
        }

        let min = self.clocks.iter().copied().min().unwrap_or(END_OF_TIME);
        let wanted: Vec<bool> = self.clocks.iter().map(|&c| c == min).collect();
        let status: Vec<Availability> = ports
            .iter()
            .zip(&wanted)
            .map(|(p, &w)| if w { p.status(1) } else { Availability::Ready })
            .collect();
        if status.contains(&Availability::Pending) {
            return Ok(MergeNStep::Blocked);
        }

        for (i, port) in ports.iter().enumerate() {
            if wanted[i] {
                self.clocks[i] = Merge2::<T, T>::take(owner, port, status[i], self.clocks[i], &mut self.pending[i])?;
            }
        }
        if self.is_done() {
            return Ok(MergeNStep::Done);
        }

        self.local = self.clocks.iter().copied().min().unwrap_or(END_OF_TIME);
        let local = self.local;
        let current: Vec<Option<T>> = self
            .clocks
            .iter()
            .zip(self.pending.iter_mut())
            .map(|(&c, p)| if c == local { p.take().map(TtEvent::into_value) } else { None })
            .collect();
        tracing::trace!(
            process = owner,
            time = local,
            current = current.iter().filter(|c| c.is_some()).count(),
            "merge fired"
        );
        Ok(MergeNStep::Fire { time: local, current })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{OutputPort, Signal};

    #[test]
    fn test_initial_reads_both() {
        let m = ClockMerge::new();
        assert_eq!(m.ports_to_read(), (true, true));
        assert_eq!(m.clocks(), (0, 0));
    }

    #[test]
    fn test_tie_reads_both() {
        let mut m = ClockMerge::new();
        m.set_clocks(Some(5), Some(5));
        let tick = m.settle();
        assert_eq!(tick, Tick { time: 5, current: (true, true) });
        assert_eq!(m.ports_to_read(), (true, true));
    }

    #[test]
    fn test_ended_port_not_read() {
        let mut m = ClockMerge::new();
        m.set_clocks(Some(END_OF_TIME), Some(3));
        assert_eq!(m.settle().time, 3);
        assert_eq!(m.ports_to_read(), (false, true));
        m.set_clocks(None, Some(END_OF_TIME));
        assert!(m.is_done());
        assert_eq!(m.ports_to_read(), (false, false));
    }

    #[test]
    fn test_merge_blocks_without_consuming() {
        let a: Signal<TtEvent<i32>> = Signal::new("a");
        let b: Signal<TtEvent<i32>> = Signal::new("b");
        let mut wa = a.writer().unwrap();
        let _wb = b.writer().unwrap();
        let (ra, rb) = (a.reader().unwrap(), b.reader().unwrap());

        wa.write(TtEvent::new(1, 0));
        wa.flush();

        let mut m: Merge2<i32, i32> = Merge2::new();
        assert_eq!(m.poll("p", &ra, &rb).unwrap(), MergeStep::Blocked);
        assert_eq!(ra.available(), 1);
    }

    #[test]
    fn test_merge_rejects_time_going_backwards() {
        let a: Signal<TtEvent<i32>> = Signal::new("a");
        let b: Signal<TtEvent<i32>> = Signal::new("b");
        let mut wa = a.writer().unwrap();
        let mut wb = b.writer().unwrap();
        let (ra, rb) = (a.reader().unwrap(), b.reader().unwrap());

        wa.write_all([TtEvent::new(1, 5), TtEvent::new(2, 3)]);
        wb.write(TtEvent::new(1, 10));
        wa.flush();
        wb.flush();

        let mut m: Merge2<i32, i32> = Merge2::new();
        assert!(matches!(
            m.poll("p", &ra, &rb).unwrap(),
            MergeStep::Fire { time: 5, .. }
        ));
        assert!(matches!(
            m.poll("p", &ra, &rb),
            Err(SimError::Process { .. })
        ));
    }

    #[test]
    fn test_merge_n_fires_earliest_inputs() {
        let sigs: Vec<Signal<TtEvent<char>>> = ["a", "b", "c"].iter().map(|n| Signal::new(*n)).collect();
        let mut writers: Vec<_> = sigs.iter().map(|s| s.writer().unwrap()).collect();
        let readers: Vec<_> = sigs.iter().map(|s| s.reader().unwrap()).collect();

        writers[0].write_all([TtEvent::new('a', 0), TtEvent::new('A', 4)]);
        writers[1].write(TtEvent::new('b', 2));
        writers[2].write(TtEvent::new('c', 4));
        for w in writers.iter_mut() {
            w.flush();
            w.close();
        }

        let mut m: MergeN<char> = MergeN::new(3);
        assert_eq!(
            m.poll("p", &readers).unwrap(),
            MergeNStep::Fire { time: 0, current: vec![Some('a'), None, None] }
        );
        assert_eq!(
            m.poll("p", &readers).unwrap(),
            MergeNStep::Fire { time: 2, current: vec![None, Some('b'), None] }
        );
        assert_eq!(
            m.poll("p", &readers).unwrap(),
            MergeNStep::Fire { time: 4, current: vec![Some('A'), None, Some('c')] }
        );
        assert_eq!(m.poll("p", &readers).unwrap(), MergeNStep::Done);
        assert!(m.is_done());
    }

    #[test]
    fn test_merge_n_blocks_on_silent_input() {
        let a: Signal<TtEvent<i32>> = Signal::new("a");
        let b: Signal<TtEvent<i32>> = Signal::new("b");
        let mut wa = a.writer().unwrap();
        let _wb = b.writer().unwrap();
        let readers = vec![a.reader().unwrap(), b.reader().unwrap()];

        wa.write(TtEvent::new(1, 0));
        wa.flush();

        let mut m = MergeN::new(2);
        assert_eq!(m.poll("p", &readers).unwrap(), MergeNStep::Blocked);
        assert_eq!(readers[0].available(), 1);
        assert_eq!(m.clocks(), &[0, 0]);
    }
}
