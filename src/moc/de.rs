//! The discrete-event MoC.
//!
//! Tokens are [`TtEvent`]s: values stamped with the time they occur at.
//! Every process tracks a local time, the timestamp of the event it is
//! about to handle, which the kernel compares with the stop time.
//!
//! Multi-input processes align their inputs with [`Merge2`] or
//! [`MergeN`]. An input that is not current at a firing contributes the
//! last value it delivered (`T::default()` before its first event).
//!
//! # Example
//!
//! ```
//! use forsyde::{Simulation, TtEvent};
//! use forsyde::moc::de;
//!
//! let mut sim = Simulation::new();
//! let (a, b, sum) = (sim.signal("a"), sim.signal("b"), sim.signal("sum"));
//!
//! sim.add(de::VSource::new("a", vec![1, 2], vec![0, 2], a.writer().unwrap()));
//! sim.add(de::VSource::new("b", vec![10], vec![1], b.writer().unwrap()));
//! sim.add(de::Comb2::new(
//!     "add",
//!     |x: &i32, y: &i32| x + y,
//!     a.reader().unwrap(),
//!     b.reader().unwrap(),
//!     sum.writer().unwrap(),
//! ));
//!
//! sim.run().unwrap();
//! assert_eq!(
//!     sum.contents(),
//!     vec![TtEvent::new(1, 0), TtEvent::new(11, 1), TtEvent::new(12, 2)]
//! );
//! ```

use crate::error::{SimError, SimResult};
use crate::event::TtEvent;
use crate::merge::{Merge2, MergeN, MergeNStep, MergeStep};
use crate::moc::{check_rate, TakeCounter};
use crate::process::{arg, Flow, Process};
use crate::signal::{InPort, InputPort, OutPort, OutputPort, Token};
use crate::types::{SimTime, ZERO_TIME};

/// Input port of a discrete-event process.
pub type DeIn<T> = InPort<TtEvent<T>>;
/// Output port of a discrete-event process.
pub type DeOut<T> = OutPort<TtEvent<T>>;

/// Applies `func` to the value of every event, keeping its time.
pub struct Comb<I, O, F> {
    name: String,
    func: F,
    iport: DeIn<I>,
    oport: DeOut<O>,
    tc: Option<SimTime>,
    ival: Option<TtEvent<I>>,
    oval: Option<TtEvent<O>>,
}

impl<I, O, F> Comb<I, O, F>
where
    I: Token,
    O: Token,
    F: FnMut(&I) -> O + Send,
{
    /// Creates a new DE combinator.
    pub fn new(name: impl Into<String>, func: F, iport: DeIn<I>, oport: DeOut<O>) -> Self {
        Self {
            name: name.into(),
            func,
            iport,
            oport,
            tc: None,
            ival: None,
            oval: None,
        }
    }
}

impl<I, O, F> Process for Comb<I, O, F>
where
    I: Token,
    O: Token,
    F: FnMut(&I) -> O + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DE::comb"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let ev = read_or_return!(self.iport);
        self.tc = Some(ev.time);
        self.ival = Some(ev);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some(ev) = self.ival.take() {
            let func = &mut self.func;
            self.oval = Some(ev.map(|v| func(&v)));
        }
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(ev) = self.oval.take() {
            self.oport.write(ev);
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport]
    }

    fn local_time(&self) -> Option<SimTime> {
        self.tc
    }
}

/// Two-input combinational process over the clock merge.
///
/// The non-current input is held at its last value.
pub struct Comb2<I1, I2, O, F> {
    name: String,
    func: F,
    iport1: DeIn<I1>,
    iport2: DeIn<I2>,
    oport: DeOut<O>,
    merge: Merge2<I1, I2>,
    held1: I1,
    held2: I2,
    tc: Option<SimTime>,
    oval: Option<TtEvent<O>>,
}

impl<I1, I2, O, F> Comb2<I1, I2, O, F>
where
    I1: Token + Default,
    I2: Token + Default,
    O: Token,
    F: FnMut(&I1, &I2) -> O + Send,
{
    /// Creates a new two-input DE combinator.
    pub fn new(
        name: impl Into<String>,
        func: F,
        iport1: DeIn<I1>,
        iport2: DeIn<I2>,
        oport: DeOut<O>,
    ) -> Self {
        Self {
            name: name.into(),
            func,
            iport1,
            iport2,
            oport,
            merge: Merge2::new(),
            held1: I1::default(),
            held2: I2::default(),
            tc: None,
            oval: None,
        }
    }
}

impl<I1, I2, O, F> Process for Comb2<I1, I2, O, F>
where
    I1: Token + Default,
    I2: Token + Default,
    O: Token,
    F: FnMut(&I1, &I2) -> O + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DE::comb2"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        match self.merge.poll(&self.name, &self.iport1, &self.iport2)? {
            MergeStep::Blocked => Ok(Flow::Blocked),
            MergeStep::Done => Ok(Flow::Done),
            MergeStep::Fire {
                time,
                first,
                second,
            } => {
                if let Some(v) = first {
                    self.held1 = v;
                }
                if let Some(v) = second {
                    self.held2 = v;
                }
                self.tc = Some(time);
                Ok(Flow::Ready)
            }
        }
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some(t) = self.tc {
            self.oval = Some(TtEvent::new((self.func)(&self.held1, &self.held2), t));
        }
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(ev) = self.oval.take() {
            self.oport.write(ev);
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport1, &self.iport2]
    }

    fn local_time(&self) -> Option<SimTime> {
        self.tc
    }
}

/// Emits `init` at time zero, then every input event shifted by `delay`.
pub struct Delay<T> {
    name: String,
    init_val: T,
    delay: SimTime,
    iport: DeIn<T>,
    oport: DeOut<T>,
    tc: Option<SimTime>,
    val: Option<TtEvent<T>>,
}

impl<T: Token> Delay<T> {
    /// Creates a new DE delay.
    pub fn new(name: impl Into<String>, init_val: T, delay: SimTime, iport: DeIn<T>, oport: DeOut<T>) -> Self {
        Self {
            name: name.into(),
            init_val,
            delay,
            iport,
            oport,
            tc: None,
            val: None,
        }
    }
}

impl<T: Token> Process for Delay<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DE::delay"
    }

    fn init(&mut self) -> SimResult<()> {
        self.oport.write(TtEvent::new(self.init_val.clone(), ZERO_TIME));
        Ok(())
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let ev = read_or_return!(self.iport).delayed(self.delay);
        self.tc = Some(ev.time);
        self.val = Some(ev);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(ev) = self.val.take() {
            self.oport.write(ev);
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport]
    }

    fn local_time(&self) -> Option<SimTime> {
        self.tc
    }

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("delay", self.delay)]
    }
}

/// Emits `value` at time zero and again at `interval`, then ends.
///
/// A DE signal holds its value between events, so the two events
/// describe a constant signal up to `interval`.
pub struct Constant<T> {
    name: String,
    value: T,
    interval: SimTime,
    times: std::vec::IntoIter<SimTime>,
    tc: Option<SimTime>,
    oport: DeOut<T>,
}

impl<T: Token> Constant<T> {
    /// Creates a new DE constant.
    pub fn new(name: impl Into<String>, value: T, interval: SimTime, oport: DeOut<T>) -> Self {
        Self {
            name: name.into(),
            value,
            interval,
            times: vec![ZERO_TIME, interval].into_iter(),
            tc: None,
            oport,
        }
    }
}

impl<T: Token> Process for Constant<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DE::constant"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.tc = self.times.next();
        Ok(if self.tc.is_some() { Flow::Ready } else { Flow::Done })
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(t) = self.tc {
            self.oport.write(TtEvent::new(self.value.clone(), t));
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn local_time(&self) -> Option<SimTime> {
        self.tc
    }

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("interval", self.interval)]
    }
}

/// Emits `init`, then `f(init)`, `f(f(init))`, ..., `take` events in
/// total (0 = forever). Generated times must not decrease.
pub struct Source<T, F> {
    name: String,
    func: F,
    last: TtEvent<T>,
    next: Option<TtEvent<T>>,
    count: TakeCounter,
    oport: DeOut<T>,
}

impl<T, F> Source<T, F>
where
    T: Token,
    F: FnMut(&TtEvent<T>) -> TtEvent<T> + Send,
{
    /// Creates a new DE source.
    pub fn new(name: impl Into<String>, func: F, init_val: TtEvent<T>, take: u64, oport: DeOut<T>) -> Self {
        Self {
            name: name.into(),
            func,
            last: init_val,
            next: None,
            count: TakeCounter::new(take),
            oport,
        }
    }
}

impl<T, F> Process for Source<T, F>
where
    T: Token,
    F: FnMut(&TtEvent<T>) -> TtEvent<T> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DE::source"
    }

    fn init(&mut self) -> SimResult<()> {
        self.oport.write(self.last.clone());
        self.count.tick();
        Ok(())
    }

    fn prep(&mut self) -> SimResult<Flow> {
        if self.count.exhausted() {
            return Ok(Flow::Done);
        }
        let ev = (self.func)(&self.last);
        if ev.time < self.last.time {
            return Err(SimError::process(
                &self.name,
                format!("generated event at {} precedes {}", ev.time, self.last.time),
            ));
        }
        self.next = Some(ev);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(ev) = self.next.take() {
            self.last = ev.clone();
            self.oport.write(ev);
            self.count.tick();
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn local_time(&self) -> Option<SimTime> {
        Some(self.next.as_ref().unwrap_or(&self.last).time)
    }
}

/// Emits `values[i]` at `times[i]`, then ends.
pub struct VSource<T> {
    name: String,
    values: Vec<T>,
    times: Vec<SimTime>,
    pos: usize,
    tc: Option<SimTime>,
    oport: DeOut<T>,
}

impl<T: Token> VSource<T> {
    /// Creates a new DE source; `values` and `times` pair up by index.
    pub fn new(name: impl Into<String>, values: Vec<T>, times: Vec<SimTime>, oport: DeOut<T>) -> Self {
        Self {
            name: name.into(),
            values,
            times,
            pos: 0,
            tc: None,
            oport,
        }
    }
}

impl<T: Token> Process for VSource<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DE::vsource"
    }

    fn init(&mut self) -> SimResult<()> {
        if self.values.len() != self.times.len() {
            return Err(SimError::process(
                &self.name,
                format!("{} values for {} times", self.values.len(), self.times.len()),
            ));
        }
        if self.times.windows(2).any(|w| w[1] < w[0]) {
            return Err(SimError::process(&self.name, "event times must not decrease"));
        }
        Ok(())
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.tc = self.times.get(self.pos).copied();
        Ok(if self.tc.is_some() { Flow::Ready } else { Flow::Done })
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let (Some(t), Some(v)) = (self.tc, self.values.get(self.pos)) {
            self.oport.write(TtEvent::new(v.clone(), t));
            self.pos += 1;
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn local_time(&self) -> Option<SimTime> {
        self.tc
    }

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("events", self.times.len())]
    }
}

/// Calls `func` on every event.
pub struct Sink<T, F> {
    name: String,
    func: F,
    iport: DeIn<T>,
    tc: Option<SimTime>,
    val: Option<TtEvent<T>>,
}

impl<T, F> Sink<T, F>
where
    T: Token,
    F: FnMut(&TtEvent<T>) + Send,
{
    /// Creates a new DE sink.
    pub fn new(name: impl Into<String>, func: F, iport: DeIn<T>) -> Self {
        Self {
            name: name.into(),
            func,
            iport,
            tc: None,
            val: None,
        }
    }
}

impl<T, F> Process for Sink<T, F>
where
    T: Token,
    F: FnMut(&TtEvent<T>) + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DE::sink"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let ev = read_or_return!(self.iport);
        self.tc = Some(ev.time);
        self.val = Some(ev);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some(ev) = self.val.take() {
            (self.func)(&ev);
        }
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        Vec::new()
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport]
    }

    fn local_time(&self) -> Option<SimTime> {
        self.tc
    }
}

/// Merges two event streams into a stream of pairs, holding the
/// non-current value.
pub struct Zip<A, B> {
    name: String,
    iport1: DeIn<A>,
    iport2: DeIn<B>,
    oport: DeOut<(A, B)>,
    merge: Merge2<A, B>,
    held: (A, B),
    tc: Option<SimTime>,
    fired: bool,
}

impl<A, B> Zip<A, B>
where
    A: Token + Default,
    B: Token + Default,
{
    /// Creates a new DE zip.
    pub fn new(name: impl Into<String>, iport1: DeIn<A>, iport2: DeIn<B>, oport: DeOut<(A, B)>) -> Self {
        Self {
            name: name.into(),
            iport1,
            iport2,
            oport,
            merge: Merge2::new(),
            held: (A::default(), B::default()),
            tc: None,
            fired: false,
        }
    }
}

impl<A, B> Process for Zip<A, B>
where
    A: Token + Default,
    B: Token + Default,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DE::zip"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        match self.merge.poll(&self.name, &self.iport1, &self.iport2)? {
            MergeStep::Blocked => Ok(Flow::Blocked),
            MergeStep::Done => Ok(Flow::Done),
            MergeStep::Fire {
                time,
                first,
                second,
            } => {
                if let Some(a) = first {
                    self.held.0 = a;
                }
                if let Some(b) = second {
                    self.held.1 = b;
                }
                self.tc = Some(time);
                self.fired = true;
                Ok(Flow::Ready)
            }
        }
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let (true, Some(t)) = (std::mem::take(&mut self.fired), self.tc) {
            self.oport.write(TtEvent::new(self.held.clone(), t));
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport1, &self.iport2]
    }

    fn local_time(&self) -> Option<SimTime> {
        self.tc
    }
}

/// Splits a stream of pairs into two streams with the same times.
pub struct Unzip<A, B> {
    name: String,
    iport: DeIn<(A, B)>,
    oport1: DeOut<A>,
    oport2: DeOut<B>,
    tc: Option<SimTime>,
    val: Option<TtEvent<(A, B)>>,
}

impl<A: Token, B: Token> Unzip<A, B> {
    /// Creates a new DE unzip.
    pub fn new(name: impl Into<String>, iport: DeIn<(A, B)>, oport1: DeOut<A>, oport2: DeOut<B>) -> Self {
        Self {
            name: name.into(),
            iport,
            oport1,
            oport2,
            tc: None,
            val: None,
        }
    }
}

impl<A: Token, B: Token> Process for Unzip<A, B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DE::unzip"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let ev = read_or_return!(self.iport);
        self.tc = Some(ev.time);
        self.val = Some(ev);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(TtEvent { value: (a, b), time }) = self.val.take() {
            self.oport1.write(TtEvent::new(a, time));
            self.oport2.write(TtEvent::new(b, time));
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport1, &mut self.oport2]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport]
    }

    fn local_time(&self) -> Option<SimTime> {
        self.tc
    }
}

/// Merges N event streams of one type into a stream of vectors, holding
/// every non-current value.
pub struct ZipN<T> {
    name: String,
    iports: Vec<DeIn<T>>,
    oport: DeOut<Vec<T>>,
    merge: MergeN<T>,
    held: Vec<T>,
    tc: Option<SimTime>,
    fired: bool,
}

impl<T: Token + Default> ZipN<T> {
    /// Creates a new N-input zip over the clock merge.
    pub fn new(name: impl Into<String>, iports: Vec<DeIn<T>>, oport: DeOut<Vec<T>>) -> Self {
        let n = iports.len();
        Self {
            name: name.into(),
            iports,
            oport,
            merge: MergeN::new(n),
            held: vec![T::default(); n],
            tc: None,
            fired: false,
        }
    }
}

impl<T: Token + Default> Process for ZipN<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DE::zipN"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        match self.merge.poll(&self.name, &self.iports)? {
            MergeNStep::Blocked => Ok(Flow::Blocked),
            MergeNStep::Done => Ok(Flow::Done),
            MergeNStep::Fire { time, current } => {
                for (held, v) in self.held.iter_mut().zip(current) {
                    if let Some(v) = v {
                        *held = v;
                    }
                }
                self.tc = Some(time);
                self.fired = true;
                Ok(Flow::Ready)
            }
        }
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let (true, Some(t)) = (std::mem::take(&mut self.fired), self.tc) {
            self.oport.write(TtEvent::new(self.held.clone(), t));
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        self.iports.iter().map(|p| p as &dyn InputPort).collect()
    }

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("inputs", self.iports.len())]
    }

    fn local_time(&self) -> Option<SimTime> {
        self.tc
    }
}

/// Splits a stream of vectors over N outputs with the same times.
pub struct UnzipN<T> {
    name: String,
    iport: DeIn<Vec<T>>,
    oports: Vec<DeOut<T>>,
    tc: Option<SimTime>,
    val: Option<TtEvent<Vec<T>>>,
}

impl<T: Token> UnzipN<T> {
    /// Creates a new N-output unzip; every input vector must hold one
    /// value per output.
    pub fn new(name: impl Into<String>, iport: DeIn<Vec<T>>, oports: Vec<DeOut<T>>) -> Self {
        Self {
            name: name.into(),
            iport,
            oports,
            tc: None,
            val: None,
        }
    }
}

impl<T: Token> Process for UnzipN<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DE::unzipN"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let ev = read_or_return!(self.iport);
        self.tc = Some(ev.time);
        self.val = Some(ev);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        match &self.val {
            Some(ev) => check_rate(&self.name, self.oports.len(), ev.value.len()),
            None => Ok(()),
        }
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(TtEvent { value, time }) = self.val.take() {
            for (port, v) in self.oports.iter_mut().zip(value) {
                port.write(TtEvent::new(v, time));
            }
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        self.oports.iter_mut().map(|p| p as &mut dyn OutputPort).collect()
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport]
    }

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("outputs", self.oports.len())]
    }

    fn local_time(&self) -> Option<SimTime> {
        self.tc
    }
}

/// Copies its input to every signal bound to its output.
pub struct Fanout<T> {
    name: String,
    iport: DeIn<T>,
    oport: DeOut<T>,
    tc: Option<SimTime>,
    val: Option<TtEvent<T>>,
}

impl<T: Token> Fanout<T> {
    /// Creates a new DE fanout.
    pub fn new(name: impl Into<String>, iport: DeIn<T>, oport: DeOut<T>) -> Self {
        Self {
            name: name.into(),
            iport,
            oport,
            tc: None,
            val: None,
        }
    }
}

impl<T: Token> Process for Fanout<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DE::fanout"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let ev = read_or_return!(self.iport);
        self.tc = Some(ev.time);
        self.val = Some(ev);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(ev) = self.val.take() {
            self.oport.write(ev);
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport]
    }

    fn local_time(&self) -> Option<SimTime> {
        self.tc
    }
}
