//! Signals and ports: the typed FIFO channels connecting processes.
//!
//! A [`Signal`] is a named FIFO carrying one MoC-specific token type. It
//! has exactly one reader ([`InPort`]) and exactly one writer
//! ([`OutPort`]). An `OutPort` may be bound to several signals at
//! once: every token written is copied to each of them, which is how a
//! single process output feeds several consumers.
//!
//! # Staging and commit
//!
//! Writes are staged inside the `OutPort`. The kernel commits staged
//! tokens with [`OutputPort::flush`] after every firing, moving as many
//! as the signal's capacity allows. A process whose staged tokens are
//! not yet committed is held back by the kernel until they are, which is
//! how a bounded signal applies backpressure.
//!
//! # End of stream
//!
//! When its writer terminates, a signal is closed. Once a closed signal
//! has been drained, its reader sees [`Availability::Ended`].
//!
//! # Example
//!
//! ```
//! use forsyde::signal::{Availability, OutputPort, Signal};
//!
//! let sig: Signal<u32> = Signal::new("numbers");
//! let mut out = sig.writer().unwrap();
//! let inp = sig.reader().unwrap();
//!
//! out.write(1);
//! out.write(2);
//! assert_eq!(inp.available(), 0); // still staged
//! assert_eq!(out.flush(), 2);
//! assert_eq!(inp.status(2), Availability::Ready);
//! assert_eq!(inp.read_n(2).unwrap(), vec![1, 2]);
//!
//! out.close();
//! assert_eq!(inp.status(1), Availability::Ended);
//! ```

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::abst_ext::AbstExt;
use crate::error::{SimError, SimResult};
use crate::event::{TtEvent, TtnEvent};
use crate::process::{Flow, Moc};
use crate::stats::SignalStats;
use crate::sub_signal::SubSignal;

/// Bound for anything carried by a signal.
pub trait Token: Clone + Send + 'static {}

impl<T: Clone + Send + 'static> Token for T {}

/// Synchronous signal: one absent-extended token per evaluation cycle.
pub type Sy2Sy<T> = Signal<AbstExt<T>>;
/// Synchronous dataflow signal.
pub type Sdf2Sdf<T> = Signal<T>;
/// Discrete-event signal.
pub type De2De<T> = Signal<TtEvent<T>>;
/// Distributed discrete-event signal.
pub type Dde2Dde<T> = Signal<TtnEvent<T>>;
/// Continuous-time signal.
pub type Ct2Ct = Signal<SubSignal>;
/// Discrete-time signal.
pub type Dt2Dt<T> = Signal<AbstExt<T>>;
/// Untimed signal.
pub type Ut2Ut<T> = Signal<T>;

/// Whether a reader can take `n` tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    /// At least `n` tokens are queued.
    Ready,
    /// Not enough tokens yet, but the writer is still alive.
    Pending,
    /// The writer terminated and too few tokens are left.
    Ended,
}

impl Availability {
    /// Combines the availability of several inputs read in lockstep.
    ///
    /// Any ended input ends the whole firing, otherwise any pending
    /// input holds it back.
    pub fn all<I: IntoIterator<Item = Availability>>(items: I) -> Availability {
        let mut acc = Availability::Ready;
        for a in items {
            match a {
                Availability::Ended => return Availability::Ended,
                Availability::Pending => acc = Availability::Pending,
                Availability::Ready => {}
            }
        }
        acc
    }

    /// The process flow implied by this availability.
    pub fn flow(self) -> Flow {
        match self {
            Availability::Ready => Flow::Ready,
            Availability::Pending => Flow::Blocked,
            Availability::Ended => Flow::Done,
        }
    }
}

struct Fifo<T> {
    queue: VecDeque<T>,
    capacity: Option<usize>,
    closed: bool,
    has_reader: bool,
    has_writer: bool,
    written: u64,
    read: u64,
    peak: usize,
}

impl<T> Fifo<T> {
    fn space(&self) -> usize {
        match self.capacity {
            Some(cap) => cap.saturating_sub(self.queue.len()),
            None => usize::MAX,
        }
    }
}

/// A named FIFO channel.
///
/// Cloning a `Signal` yields another handle to the same channel.
pub struct Signal<T> {
    name: Arc<str>,
    moc: Option<Moc>,
    inner: Arc<Mutex<Fifo<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            moc: self.moc,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Token> Signal<T> {
    /// Creates an unbounded signal.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, None)
    }

    /// Creates a signal holding at most `capacity` tokens.
    ///
    /// A capacity of 0 is raised to 1, since no token could ever pass.
    pub fn bounded(name: impl Into<String>, capacity: usize) -> Self {
        Self::with_capacity(name, Some(capacity))
    }

    /// Creates a signal with an optional capacity of at least 1.
    pub fn with_capacity(name: impl Into<String>, capacity: Option<usize>) -> Self {
        let name: String = name.into();
        let capacity = capacity.map(|cap| cap.max(1));
        Self {
            name: name.into(),
            moc: None,
            inner: Arc::new(Mutex::new(Fifo {
                queue: VecDeque::new(),
                capacity,
                closed: false,
                has_reader: false,
                has_writer: false,
                written: 0,
                read: 0,
                peak: 0,
            })),
        }
    }

    /// Tags the signal with the MoC it belongs to.
    pub fn with_moc(mut self, moc: Moc) -> Self {
        self.moc = Some(moc);
        self
    }

    /// The signal name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The MoC tag, if any.
    pub fn moc(&self) -> Option<Moc> {
        self.moc
    }

    /// Takes the reader port. Only one reader may exist.
    pub fn reader(&self) -> SimResult<InPort<T>> {
        let mut fifo = self.inner.lock();
        if fifo.has_reader {
            return Err(SimError::ReaderBound(self.name.to_string()));
        }
        fifo.has_reader = true;
        Ok(InPort {
            signal: self.clone(),
        })
    }

    /// Creates an output port bound to this signal.
    pub fn writer(&self) -> SimResult<OutPort<T>> {
        let mut port = OutPort::new();
        port.bind(self)?;
        Ok(port)
    }

    /// Number of committed tokens waiting to be read.
    pub fn len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Returns true if no committed token is waiting.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().queue.is_empty()
    }

    /// Returns true once the writer has terminated.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Snapshot of the committed tokens, oldest first.
    pub fn contents(&self) -> Vec<T> {
        self.inner.lock().queue.iter().cloned().collect()
    }

    /// Removes and returns every committed token.
    ///
    /// Intended for inspecting unread signals after a run.
    pub fn drain(&self) -> Vec<T> {
        let mut fifo = self.inner.lock();
        let out: Vec<T> = fifo.queue.drain(..).collect();
        fifo.read += out.len() as u64;
        out
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fifo = self.inner.lock();
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("moc", &self.moc)
            .field("queued", &fifo.queue.len())
            .field("capacity", &fifo.capacity)
            .field("closed", &fifo.closed)
            .finish()
    }
}

/// Type-erased read-only view on a signal, used for statistics.
pub trait SignalView: Send + Sync {
    /// Current counters of the signal.
    fn snapshot(&self) -> SignalStats;
}

impl<T: Token> SignalView for Signal<T> {
    fn snapshot(&self) -> SignalStats {
        let fifo = self.inner.lock();
        SignalStats {
            name: self.name.to_string(),
            moc: self.moc.map(|m| m.to_string()),
            written: fifo.written,
            read: fifo.read,
            queued: fifo.queue.len(),
            peak: fifo.peak,
            capacity: fifo.capacity,
            closed: fifo.closed,
        }
    }
}

/// The reading end of a signal.
pub struct InPort<T> {
    signal: Signal<T>,
}

impl<T: Token> InPort<T> {
    /// Name of the underlying signal.
    pub fn name(&self) -> &str {
        self.signal.name()
    }

    /// Number of tokens that can be read right now.
    pub fn available(&self) -> usize {
        self.signal.inner.lock().queue.len()
    }

    /// Whether `n` tokens can be read.
    pub fn status(&self, n: usize) -> Availability {
        let fifo = self.signal.inner.lock();
        if fifo.queue.len() >= n {
            Availability::Ready
        } else if fifo.closed {
            Availability::Ended
        } else {
            Availability::Pending
        }
    }

    /// Reads one token.
    pub fn read(&self) -> SimResult<T> {
        let mut fifo = self.signal.inner.lock();
        match fifo.queue.pop_front() {
            Some(v) => {
                fifo.read += 1;
                Ok(v)
            }
            None => Err(SimError::EmptyRead(self.signal.name.to_string())),
        }
    }

    /// Reads exactly `n` tokens, or nothing at all.
    pub fn read_n(&self, n: usize) -> SimResult<Vec<T>> {
        let mut fifo = self.signal.inner.lock();
        if fifo.queue.len() < n {
            return Err(SimError::EmptyRead(self.signal.name.to_string()));
        }
        fifo.read += n as u64;
        Ok(fifo.queue.drain(..n).collect())
    }

    /// Looks at the next token without consuming it.
    pub fn peek(&self) -> Option<T> {
        self.signal.inner.lock().queue.front().cloned()
    }

    /// Returns true if the signal is closed and drained.
    pub fn is_ended(&self) -> bool {
        let fifo = self.signal.inner.lock();
        fifo.closed && fifo.queue.is_empty()
    }
}

/// Introspection side of an input port, independent of token type.
pub trait InputPort {
    /// Name of the signal read from.
    fn signal_name(&self) -> &str;

    /// Type name of the tokens read.
    fn token_type(&self) -> &'static str;
}

impl<T: Token> InputPort for InPort<T> {
    fn signal_name(&self) -> &str {
        self.signal.name()
    }

    fn token_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Kernel-facing side of an output port, independent of token type.
pub trait OutputPort: Send {
    /// Moves staged tokens into the bound signals as far as capacity
    /// allows. Returns the number of tokens moved.
    fn flush(&mut self) -> usize;

    /// Returns true if nothing is left staged.
    fn is_flushed(&self) -> bool;

    /// Closes every bound signal.
    fn close(&mut self);

    /// Names of the bound signals.
    fn signal_names(&self) -> Vec<String>;

    /// Type name of the tokens written.
    fn token_type(&self) -> &'static str;
}

struct Binding<T> {
    signal: Signal<T>,
    staged: VecDeque<T>,
}

/// The writing end of one or more signals.
pub struct OutPort<T> {
    bindings: Vec<Binding<T>>,
}

impl<T: Token> Default for OutPort<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Token> OutPort<T> {
    /// Creates an unbound port. Writes to it are discarded until bound.
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Binds another signal to this port.
    pub fn bind(&mut self, signal: &Signal<T>) -> SimResult<()> {
        {
            let mut fifo = signal.inner.lock();
            if fifo.has_writer {
                return Err(SimError::WriterBound(signal.name.to_string()));
            }
            fifo.has_writer = true;
        }
        self.bindings.push(Binding {
            signal: signal.clone(),
            staged: VecDeque::new(),
        });
        Ok(())
    }

    /// Builder form of [`OutPort::bind`].
    pub fn and(mut self, signal: &Signal<T>) -> SimResult<Self> {
        self.bind(signal)?;
        Ok(self)
    }

    /// Number of bound signals.
    pub fn fanout(&self) -> usize {
        self.bindings.len()
    }

    /// Stages one token for every bound signal.
    pub fn write(&mut self, value: T) {
        if let Some((last, rest)) = self.bindings.split_last_mut() {
            for b in rest {
                b.staged.push_back(value.clone());
            }
            last.staged.push_back(value);
        }
    }

    /// Stages several tokens, in order.
    pub fn write_all<I: IntoIterator<Item = T>>(&mut self, values: I) {
        for v in values {
            self.write(v);
        }
    }
}

impl<T: Token> OutputPort for OutPort<T> {
    fn flush(&mut self) -> usize {
        let mut moved = 0;
        for b in &mut self.bindings {
            if b.staged.is_empty() {
                continue;
            }
            let mut fifo = b.signal.inner.lock();
            let n = fifo.space().min(b.staged.len());
            fifo.queue.extend(b.staged.drain(..n));
            fifo.written += n as u64;
            fifo.peak = fifo.peak.max(fifo.queue.len());
            moved += n;
        }
        moved
    }

    fn is_flushed(&self) -> bool {
        self.bindings.iter().all(|b| b.staged.is_empty())
    }

    fn close(&mut self) {
        for b in &self.bindings {
            b.signal.inner.lock().closed = true;
        }
    }

    fn signal_names(&self) -> Vec<String> {
        self.bindings
            .iter()
            .map(|b| b.signal.name().to_string())
            .collect()
    }

    fn token_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_reader_and_writer() {
        let sig: Signal<i32> = Signal::new("s");
        let _r = sig.reader().unwrap();
        assert!(matches!(sig.reader(), Err(SimError::ReaderBound(_))));

        let _w = sig.writer().unwrap();
        assert!(matches!(sig.writer(), Err(SimError::WriterBound(_))));
    }

    #[test]
    fn test_staged_until_flush() {
        let sig: Signal<i32> = Signal::new("s");
        let mut w = sig.writer().unwrap();
        let r = sig.reader().unwrap();

        w.write(1);
        assert!(!w.is_flushed());
        assert_eq!(r.status(1), Availability::Pending);
        assert_eq!(w.flush(), 1);
        assert!(w.is_flushed());
        assert_eq!(r.peek(), Some(1));
        assert_eq!(r.read().unwrap(), 1);
        assert!(matches!(r.read(), Err(SimError::EmptyRead(_))));
    }

    #[test]
    fn test_bounded_backpressure() {
        let sig: Signal<i32> = Signal::bounded("b", 2);
        let mut w = sig.writer().unwrap();
        let r = sig.reader().unwrap();

        w.write_all([1, 2, 3]);
        assert_eq!(w.flush(), 2);
        assert!(!w.is_flushed());
        assert_eq!(w.flush(), 0);

        assert_eq!(r.read().unwrap(), 1);
        assert_eq!(w.flush(), 1);
        assert!(w.is_flushed());
        assert_eq!(r.read_n(2).unwrap(), vec![2, 3]);
    }

    #[test]
    fn test_zero_capacity_holds_one_token() {
        let sig: Signal<i32> = Signal::bounded("z", 0);
        let mut w = sig.writer().unwrap();
        let r = sig.reader().unwrap();

        w.write_all([1, 2]);
        assert_eq!(w.flush(), 1);
        assert_eq!(sig.snapshot().capacity, Some(1));
        assert_eq!(r.read().unwrap(), 1);
        assert_eq!(w.flush(), 1);
        assert!(w.is_flushed());
    }

    #[test]
    fn test_read_n_is_all_or_nothing() {
        let sig: Signal<i32> = Signal::new("s");
        let mut w = sig.writer().unwrap();
        let r = sig.reader().unwrap();
        w.write_all([1, 2]);
        w.flush();
        assert_eq!(r.status(3), Availability::Pending);
        assert!(r.read_n(3).is_err());
        assert_eq!(r.available(), 2);
    }

    #[test]
    fn test_multiport_copies_tokens() {
        let a: Signal<i32> = Signal::new("a");
        let b: Signal<i32> = Signal::new("b");
        let mut w = a.writer().unwrap().and(&b).unwrap();
        assert_eq!(w.fanout(), 2);

        w.write(9);
        assert_eq!(w.flush(), 2);
        assert_eq!(a.contents(), vec![9]);
        assert_eq!(b.contents(), vec![9]);
        assert_eq!(w.signal_names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(w.token_type(), "i32");
    }

    #[test]
    fn test_close_ends_after_drain() {
        let sig: Signal<i32> = Signal::new("s");
        let mut w = sig.writer().unwrap();
        let r = sig.reader().unwrap();
        w.write(5);
        w.flush();
        w.close();

        assert_eq!(r.status(1), Availability::Ready);
        assert_eq!(r.status(2), Availability::Ended);
        r.read().unwrap();
        assert!(r.is_ended());
        assert_eq!(r.signal_name(), "s");
    }

    #[test]
    fn test_availability_all() {
        use Availability::*;
        assert_eq!(Availability::all([Ready, Ready]), Ready);
        assert_eq!(Availability::all([Ready, Pending]), Pending);
        assert_eq!(Availability::all([Pending, Ended]), Ended);
        assert_eq!(Ended.flow(), Flow::Done);
    }

    #[test]
    fn test_signal_counters() {
        let sig: Signal<i32> = Signal::bounded("p", 4).with_moc(Moc::Sdf);
        let mut w = sig.writer().unwrap();
        let r = sig.reader().unwrap();
        w.write_all([1, 2, 3]);
        w.flush();
        r.read().unwrap();

        let snap = sig.snapshot();
        assert_eq!(snap.written, 3);
        assert_eq!(snap.read, 1);
        assert_eq!(snap.queued, 2);
        assert_eq!(snap.peak, 3);
        assert_eq!(snap.capacity, Some(4));
        assert_eq!(snap.moc.as_deref(), Some("SDF"));
    }
}
