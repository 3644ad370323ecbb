//! The continuous-time MoC.
//!
//! Tokens are [`SubSignal`]s. Combinators never sample: they compose the
//! functions of their inputs into the function of their output, and the
//! resulting closure is only evaluated when a consumer (a [`Sink`] or an
//! interface process) samples it.
//!
//! # Example
//!
//! ```
//! use forsyde::Simulation;
//! use forsyde::moc::ct;
//!
//! let mut sim = Simulation::new();
//! let (ramp, scaled) = (sim.signal("ramp"), sim.signal("scaled"));
//! let samples = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
//! let seen = samples.clone();
//!
//! sim.add(ct::Source::new("ramp", |t| t as f64, 4, ramp.writer().unwrap()));
//! sim.add(ct::Comb::new("x2", |v| v * 2.0, ramp.reader().unwrap(), scaled.writer().unwrap()));
//! sim.add(ct::Sink::new("monitor", 2, move |t, v| seen.lock().push((t, v)), scaled.reader().unwrap()));
//!
//! sim.run().unwrap();
//! assert_eq!(*samples.lock(), vec![(0, 0.0), (2, 4.0)]);
//! ```

use std::sync::Arc;

use crate::error::{SimError, SimResult};
use crate::moc::check_positive;
use crate::process::{arg, Flow, Process};
use crate::signal::{Availability, InPort, InputPort, OutPort, OutputPort};
use crate::sub_signal::{overlap, SubSignal};
use crate::time::TimeAlignment;
use crate::types::{CtValue, SimTime, ZERO_TIME};

/// Input port of a continuous-time process.
pub type CtIn = InPort<SubSignal>;
/// Output port of a continuous-time process.
pub type CtOut = OutPort<SubSignal>;

/// Pointwise function of one CT signal.
pub struct Comb<F> {
    name: String,
    func: Arc<F>,
    iport: CtIn,
    oport: CtOut,
    tc: Option<SimTime>,
    ival: Option<SubSignal>,
    oval: Option<SubSignal>,
}

impl<F> Comb<F>
where
    F: Fn(CtValue) -> CtValue + Send + Sync + 'static,
{
    /// Creates a new pointwise CT combinator.
    pub fn new(name: impl Into<String>, func: F, iport: CtIn, oport: CtOut) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
            iport,
            oport,
            tc: None,
            ival: None,
            oval: None,
        }
    }
}

impl<F> Process for Comb<F>
where
    F: Fn(CtValue) -> CtValue + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "CT::comb"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let ss = read_or_return!(self.iport);
        self.tc = Some(ss.start());
        self.ival = Some(ss);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some(ss) = self.ival.take() {
            let func = Arc::clone(&self.func);
            self.oval = Some(ss.map(move |v| func(v)));
        }
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(ss) = self.oval.take() {
            self.oport.write(ss);
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

/// Which inputs of a [`Comb2`] are read at the next firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    /// Both current sub-signals end together; read both.
    Aligned,
    /// The first input's sub-signal ends earlier; read only the first.
    FirstEarlier,
    /// The second input's sub-signal ends earlier; read only the second.
    SecondEarlier,
}

impl Alignment {
    /// The state after handling `ss1` and `ss2`.
    pub fn after(ss1: &SubSignal, ss2: &SubSignal) -> Self {
        match ss1.end().cmp(&ss2.end()) {
            std::cmp::Ordering::Equal => Alignment::Aligned,
            std::cmp::Ordering::Less => Alignment::FirstEarlier,
            std::cmp::Ordering::Greater => Alignment::SecondEarlier,
        }
    }

    /// `(read first, read second)`.
    pub fn reads(self) -> (bool, bool) {
        match self {
            Alignment::Aligned => (true, true),
            Alignment::FirstEarlier => (true, false),
            Alignment::SecondEarlier => (false, true),
        }
    }
}

/// Pointwise function of two CT signals.
///
/// Each output sub-signal covers the overlap of the current input
/// sub-signals. The input whose sub-signal ends first is re-read at the
/// next firing, so inputs with different segmentations line up.
pub struct Comb2<F> {
    name: String,
    func: Arc<F>,
    iport1: CtIn,
    iport2: CtIn,
    oport: CtOut,
    state: Alignment,
    cur1: Option<SubSignal>,
    cur2: Option<SubSignal>,
    tc: Option<SimTime>,
    oval: Option<SubSignal>,
}

impl<F> Comb2<F>
where
    F: Fn(CtValue, CtValue) -> CtValue + Send + Sync + 'static,
{
    /// Creates a new two-input CT combinator.
    pub fn new(name: impl Into<String>, func: F, iport1: CtIn, iport2: CtIn, oport: CtOut) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
            iport1,
            iport2,
            oport,
            state: Alignment::Aligned,
            cur1: None,
            cur2: None,
            tc: None,
            oval: None,
        }
    }

    /// The alignment state for the next firing.
    pub fn alignment(&self) -> Alignment {
        self.state
    }
}

impl<F> Process for Comb2<F>
where
    F: Fn(CtValue, CtValue) -> CtValue + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "CT::comb2"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let (r1, r2) = self.state.reads();
        let status = Availability::all([
            if r1 { self.iport1.status(1) } else { Availability::Ready },
            if r2 { self.iport2.status(1) } else { Availability::Ready },
        ]);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        if r1 {
            self.cur1 = Some(self.iport1.read()?);
        }
        if r2 {
            self.cur2 = Some(self.iport2.read()?);
        }
        if let (Some(a), Some(b)) = (&self.cur1, &self.cur2) {
            self.tc = Some(a.start().max(b.start()));
        }
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        let (a, b) = match (&self.cur1, &self.cur2) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(SimError::process(&self.name, "fired without both inputs")),
        };
        let (start, end) = overlap(a, b);
        self.state = Alignment::after(a, b);
        if start >= end {
            tracing::trace!(process = %self.name, start, end, "empty overlap skipped");
            return Ok(());
        }
        let (f1, f2) = (a.function(), b.function());
        let func = Arc::clone(&self.func);
        self.oval = Some(SubSignal::new(start, end, move |t| func(f1(t), f2(t))));
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(ss) = self.oval.take() {
            self.oport.write(ss);
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

/// Pointwise function of N CT signals whose sub-signals share ranges.
pub struct CombN<F> {
    name: String,
    func: Arc<F>,
    iports: Vec<CtIn>,
    oport: CtOut,
    tc: Option<SimTime>,
    ivals: Vec<SubSignal>,
    oval: Option<SubSignal>,
}

impl<F> CombN<F>
where
    F: Fn(&[CtValue]) -> CtValue + Send + Sync + 'static,
{
    /// Creates a new N-input CT combinator.
    pub fn new(name: impl Into<String>, func: F, iports: Vec<CtIn>, oport: CtOut) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
            iports,
            oport,
            tc: None,
            ivals: Vec::new(),
            oval: None,
        }
    }
}

impl<F> Process for CombN<F>
where
    F: Fn(&[CtValue]) -> CtValue + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "CT::combN"
    }

    fn init(&mut self) -> SimResult<()> {
        if self.iports.is_empty() {
            return Err(SimError::process(&self.name, "needs at least one input"));
        }
        Ok(())
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = crate::moc::all_ready(self.iports.iter().map(|p| (p, 1)));
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.ivals = self
            .iports
            .iter()
            .map(|p| p.read())
            .collect::<SimResult<Vec<_>>>()?;
        self.tc = self.ivals.first().map(SubSignal::start);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        let range = match self.ivals.first() {
            Some(ss) => ss.range(),
            None => return Ok(()),
        };
        if let Some(bad) = self.ivals.iter().find(|ss| ss.range() != range) {
            return Err(SimError::process(
                &self.name,
                format!("input ranges differ: {} and {}", self.ivals[0], bad),
            ));
        }
        let fs: Vec<_> = self.ivals.drain(..).map(|ss| ss.function()).collect();
        let func = Arc::clone(&self.func);
        self.oval = Some(SubSignal::new(range.0, range.1, move |t| {
            let vals: Vec<CtValue> = fs.iter().map(|f| f(t)).collect();
            func(&vals)
        }));
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(ss) = self.oval.take() {
            self.oport.write(ss);
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        self.iports.iter().map(|p| p as &dyn InputPort).collect()
    }

    fn local_time(&self) -> Option<SimTime> {
        self.tc
    }

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("inputs", self.iports.len())]
    }
}

/// Delays a CT signal by `delay`, filling `[0, delay)` with 0.0.
///
/// Built by [`Delay::new`], which moves only the interval of every
/// sub-signal, or [`Shift::new`], which moves the function as well.
pub struct Delay {
    name: String,
    delay: SimTime,
    shift_function: bool,
    iport: CtIn,
    oport: CtOut,
    tc: Option<SimTime>,
    val: Option<SubSignal>,
}

impl Delay {
    /// Creates a new CT delay; each sub-signal keeps its function and only
    /// its interval moves.
    pub fn new(name: impl Into<String>, delay: SimTime, iport: CtIn, oport: CtOut) -> Self {
        Self::build(name.into(), delay, false, iport, oport)
    }

    fn build(name: String, delay: SimTime, shift_function: bool, iport: CtIn, oport: CtOut) -> Self {
        Self {
            name,
            delay,
            shift_function,
            iport,
            oport,
            tc: None,
            val: None,
        }
    }
}

/// Shifts a CT signal in time by `delay`.
pub struct Shift;

impl Shift {
    /// Creates a new CT shift, moving the function along with the interval.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(name: impl Into<String>, delay: SimTime, iport: CtIn, oport: CtOut) -> Delay {
        Delay::build(name.into(), delay, true, iport, oport)
    }
}

impl Process for Delay {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        if self.shift_function {
            "CT::shift"
        } else {
            "CT::delay"
        }
    }

    fn init(&mut self) -> SimResult<()> {
        if self.delay > 0 {
            self.oport.write(SubSignal::constant(ZERO_TIME, self.delay, 0.0));
        }
        Ok(())
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let ss = read_or_return!(self.iport);
        let ss = if self.shift_function {
            ss.shifted(self.delay)
        } else {
            ss.delayed(self.delay)
        };
        self.tc = Some(ss.start());
        self.val = Some(ss);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(ss) = self.val.take() {
            self.oport.write(ss);
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

/// Emits one sub-signal over `[0, end)`, then ends.
pub struct Source {
    name: String,
    kind: &'static str,
    signal: Option<SubSignal>,
    end: SimTime,
    oport: CtOut,
    fired: bool,
}

impl Source {
    /// `func` gives the value at each instant.
    pub fn new<F>(name: impl Into<String>, func: F, end: SimTime, oport: CtOut) -> Self
    where
        F: Fn(SimTime) -> CtValue + Send + Sync + 'static,
    {
        Self::build(name.into(), "CT::source", SubSignal::new(ZERO_TIME, end, func), oport)
    }

    fn build(name: String, kind: &'static str, ss: SubSignal, oport: CtOut) -> Self {
        Self {
            name,
            kind,
            end: ss.end(),
            signal: Some(ss),
            oport,
            fired: false,
        }
    }
}

/// A constant CT signal over `[0, end)`.
pub struct Constant;

impl Constant {
    /// Creates a new constant CT source over `[0, end)`.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(name: impl Into<String>, value: CtValue, end: SimTime, oport: CtOut) -> Source {
        Source::build(
            name.into(),
            "CT::constant",
            SubSignal::constant(ZERO_TIME, end, value),
            oport,
        )
    }
}

impl Process for Source {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        self.kind
    }

    fn prep(&mut self) -> SimResult<Flow> {
        Ok(if self.fired { Flow::Done } else { Flow::Ready })
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(ss) = self.signal.take() {
            self.oport.write(ss);
        }
        self.fired = true;
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn local_time(&self) -> Option<SimTime> {
        Some(ZERO_TIME)
    }

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("end", self.end)]
    }
}

/// Walks the global grid `k · period` across a stream of sub-signals,
/// one instant per firing.
///
/// Instants that fall in a gap between sub-signals are skipped. A
/// sub-signal reaching [`END_OF_TIME`](crate::END_OF_TIME) is sampled
/// until the kernel stops the sampler.
pub(crate) struct Sampler {
    period: SimTime,
    next: SimTime,
    current: Option<SubSignal>,
}

impl Sampler {
    pub(crate) fn new(period: SimTime) -> Self {
        Self {
            period,
            next: ZERO_TIME,
            current: None,
        }
    }

    /// Reads sub-signals until one covers the next instant.
    pub(crate) fn advance(&mut self, iport: &CtIn) -> SimResult<Flow> {
        loop {
            if let Some(ss) = &self.current {
                if self.next < ss.start() {
                    self.next = TimeAlignment::ceil_to_tick(ss.start(), self.period);
                }
                if self.next < ss.end() {
                    return Ok(Flow::Ready);
                }
            }
            match iport.status(1) {
                Availability::Ready => self.current = Some(iport.read()?),
                other => return Ok(other.flow()),
            }
        }
    }

    /// The instant sampled at the next [`take`](Self::take).
    pub(crate) fn instant(&self) -> SimTime {
        self.next
    }

    /// Samples the current instant and moves to the next one.
    pub(crate) fn take(&mut self) -> SimResult<(SimTime, CtValue)> {
        let t = self.next;
        let ss = self
            .current
            .as_ref()
            .ok_or_else(|| SimError::process("sampler", "no sub-signal to sample"))?;
        let v = ss.sample(t)?;
        self.next = t.saturating_add(self.period);
        Ok((t, v))
    }
}

/// Samples a CT signal every `period` and calls `func(t, value)`.
///
/// Sample instants lie on the global grid `k · period`, so consecutive
/// sub-signals are sampled without gaps or duplicates. Each firing takes
/// one sample; the local time is the sampling instant.
pub struct Sink<F> {
    name: String,
    period: SimTime,
    func: F,
    iport: CtIn,
    sampler: Sampler,
    tc: Option<SimTime>,
}

impl<F> Sink<F>
where
    F: FnMut(SimTime, CtValue) + Send,
{
    /// Creates a new CT sink sampling every `period`.
    pub fn new(name: impl Into<String>, period: SimTime, func: F, iport: CtIn) -> Self {
        Self {
            name: name.into(),
            period,
            func,
            iport,
            sampler: Sampler::new(period),
            tc: None,
        }
    }
}

impl<F> Process for Sink<F>
where
    F: FnMut(SimTime, CtValue) + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "CT::sink"
    }

    fn init(&mut self) -> SimResult<()> {
        check_positive(&self.name, "sampling period", self.period)
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let flow = self.sampler.advance(&self.iport)?;
        if flow == Flow::Ready {
            self.tc = Some(self.sampler.instant());
        }
        Ok(flow)
    }

    fn exec(&mut self) -> SimResult<()> {
        let (t, v) = self.sampler.take()?;
        (self.func)(t, v);
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

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("period", self.period)]
    }
}

/// Copies its input to every signal bound to its output.
pub struct Fanout {
    name: String,
    iport: CtIn,
    oport: CtOut,
    tc: Option<SimTime>,
    val: Option<SubSignal>,
}

impl Fanout {
    /// Creates a new CT fanout.
    pub fn new(name: impl Into<String>, iport: CtIn, oport: CtOut) -> Self {
        Self {
            name: name.into(),
            iport,
            oport,
            tc: None,
            val: None,
        }
    }
}

impl Process for Fanout {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "CT::fanout"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let ss = read_or_return!(self.iport);
        self.tc = Some(ss.start());
        self.val = Some(ss);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(ss) = self.val.take() {
            self.oport.write(ss);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;
    use crate::Simulation;

    fn feed(sim: &mut Simulation, name: &str, parts: Vec<SubSignal>) -> Signal<SubSignal> {
        let sig = sim.signal(name);
        let mut w = sig.writer().unwrap();
        w.write_all(parts);
        w.flush();
        w.close();
        sig
    }

    #[test]
    fn test_comb2_realigns_segments() {
        let mut sim = Simulation::new();
        let a = feed(&mut sim, "a", vec![SubSignal::constant(0, 10, 1.0)]);
        let b = feed(
            &mut sim,
            "b",
            vec![SubSignal::constant(0, 4, 10.0), SubSignal::constant(4, 10, 20.0)],
        );
        let o = sim.signal("o");
        sim.add(Comb2::new("add", |x, y| x + y, a.reader().unwrap(), b.reader().unwrap(), o.writer().unwrap()));
        sim.run().unwrap();

        let out = o.contents();
        let ranges: Vec<_> = out.iter().map(SubSignal::range).collect();
        assert_eq!(ranges, vec![(0, 4), (4, 10)]);
        assert_eq!(out[0].sample(2).unwrap(), 11.0);
        assert_eq!(out[1].sample(9).unwrap(), 21.0);
        assert!(out[1].sample(10).is_err());
    }

    #[test]
    fn test_alignment_transitions() {
        let a = SubSignal::constant(0, 5, 0.0);
        let b = SubSignal::constant(0, 8, 0.0);
        assert_eq!(Alignment::after(&a, &b), Alignment::FirstEarlier);
        assert_eq!(Alignment::after(&b, &a), Alignment::SecondEarlier);
        assert_eq!(Alignment::after(&a, &a), Alignment::Aligned);
        assert_eq!(Alignment::FirstEarlier.reads(), (true, false));
    }

    #[test]
    fn test_combn_rejects_unequal_ranges() {
        let mut sim = Simulation::new();
        let a = feed(&mut sim, "a", vec![SubSignal::constant(0, 5, 1.0)]);
        let b = feed(&mut sim, "b", vec![SubSignal::constant(0, 6, 1.0)]);
        let o = sim.signal("o");
        sim.add(CombN::new(
            "sum",
            |xs: &[f64]| xs.iter().sum(),
            vec![a.reader().unwrap(), b.reader().unwrap()],
            o.writer().unwrap(),
        ));
        assert!(matches!(sim.run(), Err(SimError::Process { .. })));
    }

    #[test]
    fn test_delay_and_shift() {
        let mut sim = Simulation::new();
        let a = feed(&mut sim, "a", vec![SubSignal::new(0, 10, |t| t as f64)]);
        let b = feed(&mut sim, "b", vec![SubSignal::new(0, 10, |t| t as f64)]);
        let (da, sb) = (sim.signal("da"), sim.signal("sb"));
        sim.add(Delay::new("delay", 3, a.reader().unwrap(), da.writer().unwrap()));
        sim.add(Shift::new("shift", 3, b.reader().unwrap(), sb.writer().unwrap()));
        sim.run().unwrap();

        let d = da.contents();
        assert_eq!(d[0].range(), (0, 3));
        assert_eq!(d[0].sample(1).unwrap(), 0.0);
        assert_eq!(d[1].range(), (3, 13));
        assert_eq!(d[1].sample(5).unwrap(), 5.0);

        let s = sb.contents();
        assert_eq!(s[1].sample(5).unwrap(), 2.0);
    }

    #[test]
    fn test_sink_samples_on_global_grid() {
        let mut sim = Simulation::new();
        let a = feed(
            &mut sim,
            "a",
            vec![SubSignal::constant(0, 5, 1.0), SubSignal::constant(5, 9, 2.0)],
        );
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let log = seen.clone();
        sim.add(Sink::new("monitor", 3, move |t, v| log.lock().push((t, v)), a.reader().unwrap()));
        sim.run().unwrap();
        assert_eq!(*seen.lock(), vec![(0, 1.0), (3, 1.0), (6, 2.0)]);
    }

    #[test]
    fn test_zero_period_sink_rejected() {
        let mut sim = Simulation::new();
        let a = feed(&mut sim, "a", Vec::new());
        sim.add(Sink::new("monitor", 0, |_, _| {}, a.reader().unwrap()));
        assert!(sim.init().is_err());
    }
}
