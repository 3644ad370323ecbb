//! The distributed discrete-event MoC.
//!
//! Like [`crate::moc::de`], but event values are absent-extended
//! ([`TtnEvent`]). An absent event only announces that time has advanced,
//! which lets a consumer make progress without a value. Two-input
//! processes pass `Absent` for the input that is not current at a firing
//! instead of holding its previous value.

use crate::abst_ext::AbstExt;
use crate::error::{SimError, SimResult};
use crate::event::{TtEvent, TtnEvent};
use crate::merge::{Merge2, MergeN, MergeNStep, MergeStep};
use crate::moc::{check_rate, TakeCounter};
use crate::process::{arg, Flow, Process};
use crate::signal::{InPort, InputPort, OutPort, OutputPort, Token};
use crate::types::{SimTime, ZERO_TIME};

/// Input port of a DDE process.
pub type DdeIn<T> = InPort<TtnEvent<T>>;
/// Output port of a DDE process.
pub type DdeOut<T> = OutPort<TtnEvent<T>>;

/// Applies `func` to the value of every event, keeping its time.
pub struct Comb<I, O, F> {
    name: String,
    func: F,
    iport: DdeIn<I>,
    oport: DdeOut<O>,
    tc: Option<SimTime>,
    ival: Option<TtnEvent<I>>,
    oval: Option<TtnEvent<O>>,
}

impl<I, O, F> Comb<I, O, F>
where
    I: Token,
    O: Token,
    F: FnMut(&AbstExt<I>) -> AbstExt<O> + Send,
{
    /// Creates a new DDE combinator.
    pub fn new(name: impl Into<String>, func: F, iport: DdeIn<I>, oport: DdeOut<O>) -> Self {
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
    F: FnMut(&AbstExt<I>) -> AbstExt<O> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DDE::comb"
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

/// Current inputs of a merge firing, `Absent` for the non-current one.
fn current<A, B>(first: Option<AbstExt<A>>, second: Option<AbstExt<B>>) -> (AbstExt<A>, AbstExt<B>) {
    (first.unwrap_or_default(), second.unwrap_or_default())
}

/// Two-input combinational process over the clock merge.
///
/// When both current values are absent the output is absent and `func`
/// is not called.
pub struct Comb2<I1, I2, O, F> {
    name: String,
    func: F,
    iport1: DdeIn<I1>,
    iport2: DdeIn<I2>,
    oport: DdeOut<O>,
    merge: Merge2<AbstExt<I1>, AbstExt<I2>>,
    tc: Option<SimTime>,
    ivals: Option<(AbstExt<I1>, AbstExt<I2>)>,
    oval: Option<TtnEvent<O>>,
}

impl<I1, I2, O, F> Comb2<I1, I2, O, F>
where
    I1: Token,
    I2: Token,
    O: Token,
    F: FnMut(&AbstExt<I1>, &AbstExt<I2>) -> AbstExt<O> + Send,
{
    /// Creates a new two-input DDE combinator.
    pub fn new(
        name: impl Into<String>,
        func: F,
        iport1: DdeIn<I1>,
        iport2: DdeIn<I2>,
        oport: DdeOut<O>,
    ) -> Self {
        Self {
            name: name.into(),
            func,
            iport1,
            iport2,
            oport,
            merge: Merge2::new(),
            tc: None,
            ivals: None,
            oval: None,
        }
    }
}

impl<I1, I2, O, F> Process for Comb2<I1, I2, O, F>
where
    I1: Token,
    I2: Token,
    O: Token,
    F: FnMut(&AbstExt<I1>, &AbstExt<I2>) -> AbstExt<O> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DDE::comb2"
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
                self.tc = Some(time);
                self.ivals = Some(current(first, second));
                Ok(Flow::Ready)
            }
        }
    }

    fn exec(&mut self) -> SimResult<()> {
        if let (Some((a, b)), Some(t)) = (self.ivals.take(), self.tc) {
            let out = if a.is_absent() && b.is_absent() {
                AbstExt::Absent
            } else {
                (self.func)(&a, &b)
            };
            self.oval = Some(TtEvent::new(out, t));
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
    init_val: AbstExt<T>,
    delay: SimTime,
    iport: DdeIn<T>,
    oport: DdeOut<T>,
    tc: Option<SimTime>,
    val: Option<TtnEvent<T>>,
}

impl<T: Token> Delay<T> {
    /// Creates a new DDE delay.
    pub fn new(
        name: impl Into<String>,
        init_val: AbstExt<T>,
        delay: SimTime,
        iport: DdeIn<T>,
        oport: DdeOut<T>,
    ) -> Self {
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
        "DDE::delay"
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

/// Mealy machine whose output for an event at `t` is stamped `t + delay`.
pub struct Mealy<I, S, O, NS, OD> {
    name: String,
    ns_func: NS,
    od_func: OD,
    state: S,
    delay: SimTime,
    iport: DdeIn<I>,
    oport: DdeOut<O>,
    tc: Option<SimTime>,
    ival: Option<AbstExt<I>>,
    oval: Option<TtnEvent<O>>,
}

impl<I, S, O, NS, OD> Mealy<I, S, O, NS, OD>
where
    I: Token,
    S: Send + 'static,
    O: Token,
    NS: FnMut(&S, &AbstExt<I>) -> S + Send,
    OD: FnMut(&S, &AbstExt<I>) -> AbstExt<O> + Send,
{
    /// Creates a new DDE Mealy machine; `ns_func` comes before `od_func`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        ns_func: NS,
        od_func: OD,
        init_st: S,
        delay: SimTime,
        iport: DdeIn<I>,
        oport: DdeOut<O>,
    ) -> Self {
        Self {
            name: name.into(),
            ns_func,
            od_func,
            state: init_st,
            delay,
            iport,
            oport,
            tc: None,
            ival: None,
            oval: None,
        }
    }
}

impl<I, S, O, NS, OD> Process for Mealy<I, S, O, NS, OD>
where
    I: Token,
    S: Send + 'static,
    O: Token,
    NS: FnMut(&S, &AbstExt<I>) -> S + Send,
    OD: FnMut(&S, &AbstExt<I>) -> AbstExt<O> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DDE::mealy"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let ev = read_or_return!(self.iport);
        self.tc = Some(ev.time);
        self.ival = Some(ev.into_value());
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let (Some(i), Some(t)) = (self.ival.take(), self.tc) {
            let out = (self.od_func)(&self.state, &i);
            self.state = (self.ns_func)(&self.state, &i);
            self.oval = Some(TtEvent::new(out, t.saturating_add(self.delay)));
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

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("delay", self.delay)]
    }
}

/// Two-input Mealy machine over the clock merge.
pub struct Mealy2<I1, I2, S, O, NS, OD> {
    name: String,
    ns_func: NS,
    od_func: OD,
    state: S,
    delay: SimTime,
    iport1: DdeIn<I1>,
    iport2: DdeIn<I2>,
    oport: DdeOut<O>,
    merge: Merge2<AbstExt<I1>, AbstExt<I2>>,
    tc: Option<SimTime>,
    ivals: Option<(AbstExt<I1>, AbstExt<I2>)>,
    oval: Option<TtnEvent<O>>,
}

impl<I1, I2, S, O, NS, OD> Mealy2<I1, I2, S, O, NS, OD>
where
    I1: Token,
    I2: Token,
    S: Send + 'static,
    O: Token,
    NS: FnMut(&S, &AbstExt<I1>, &AbstExt<I2>) -> S + Send,
    OD: FnMut(&S, &AbstExt<I1>, &AbstExt<I2>) -> AbstExt<O> + Send,
{
    /// Creates a new two-input DDE Mealy machine.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        ns_func: NS,
        od_func: OD,
        init_st: S,
        delay: SimTime,
        iport1: DdeIn<I1>,
        iport2: DdeIn<I2>,
        oport: DdeOut<O>,
    ) -> Self {
        Self {
            name: name.into(),
            ns_func,
            od_func,
            state: init_st,
            delay,
            iport1,
            iport2,
            oport,
            merge: Merge2::new(),
            tc: None,
            ivals: None,
            oval: None,
        }
    }
}

impl<I1, I2, S, O, NS, OD> Process for Mealy2<I1, I2, S, O, NS, OD>
where
    I1: Token,
    I2: Token,
    S: Send + 'static,
    O: Token,
    NS: FnMut(&S, &AbstExt<I1>, &AbstExt<I2>) -> S + Send,
    OD: FnMut(&S, &AbstExt<I1>, &AbstExt<I2>) -> AbstExt<O> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DDE::mealy2"
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
                self.tc = Some(time);
                self.ivals = Some(current(first, second));
                Ok(Flow::Ready)
            }
        }
    }

    fn exec(&mut self) -> SimResult<()> {
        if let (Some((a, b)), Some(t)) = (self.ivals.take(), self.tc) {
            let out = (self.od_func)(&self.state, &a, &b);
            self.state = (self.ns_func)(&self.state, &a, &b);
            self.oval = Some(TtEvent::new(out, t.saturating_add(self.delay)));
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

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("delay", self.delay)]
    }
}

/// Emits `init`, then `f(init)`, `f(f(init))`, ..., `take` events in
/// total (0 = forever). Generated times must not decrease.
pub struct Source<T, F> {
    name: String,
    func: F,
    last: TtnEvent<T>,
    next: Option<TtnEvent<T>>,
    count: TakeCounter,
    oport: DdeOut<T>,
}

impl<T, F> Source<T, F>
where
    T: Token,
    F: FnMut(&TtnEvent<T>) -> TtnEvent<T> + Send,
{
    /// Creates a new DDE source.
    pub fn new(name: impl Into<String>, func: F, init_val: TtnEvent<T>, take: u64, oport: DdeOut<T>) -> Self {
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
    F: FnMut(&TtnEvent<T>) -> TtnEvent<T> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DDE::source"
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

/// Emits `values[i]` as a present event at `times[i]`, then ends.
pub struct VSource<T> {
    name: String,
    events: Vec<TtnEvent<T>>,
    pos: usize,
    tc: Option<SimTime>,
    oport: DdeOut<T>,
    mismatch: Option<(usize, usize)>,
}

impl<T: Token> VSource<T> {
    /// Creates a new DDE source of present events; `values` and `times` pair up by index.
    pub fn new(name: impl Into<String>, values: Vec<T>, times: Vec<SimTime>, oport: DdeOut<T>) -> Self {
        let mismatch = (values.len() != times.len()).then_some((values.len(), times.len()));
        let events = values
            .into_iter()
            .zip(times)
            .map(|(v, t)| TtEvent::present(v, t))
            .collect();
        Self::build(name.into(), events, oport, mismatch)
    }

    /// Emits the given events, absent ones included.
    pub fn from_events(name: impl Into<String>, events: Vec<TtnEvent<T>>, oport: DdeOut<T>) -> Self {
        Self::build(name.into(), events, oport, None)
    }

    fn build(name: String, events: Vec<TtnEvent<T>>, oport: DdeOut<T>, mismatch: Option<(usize, usize)>) -> Self {
        Self {
            name,
            events,
            pos: 0,
            tc: None,
            oport,
            mismatch,
        }
    }
}

impl<T: Token> Process for VSource<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DDE::vsource"
    }

    fn init(&mut self) -> SimResult<()> {
        if let Some((values, times)) = self.mismatch {
            return Err(SimError::process(
                &self.name,
                format!("{} values for {} times", values, times),
            ));
        }
        if self.events.windows(2).any(|w| w[1].time < w[0].time) {
            return Err(SimError::process(&self.name, "event times must not decrease"));
        }
        Ok(())
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.tc = self.events.get(self.pos).map(|e| e.time);
        Ok(if self.tc.is_some() { Flow::Ready } else { Flow::Done })
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(ev) = self.events.get(self.pos) {
            self.oport.write(ev.clone());
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
        vec![arg("events", self.events.len())]
    }
}

/// Calls `func` on every event.
pub struct Sink<T, F> {
    name: String,
    func: F,
    iport: DdeIn<T>,
    tc: Option<SimTime>,
    val: Option<TtnEvent<T>>,
}

impl<T, F> Sink<T, F>
where
    T: Token,
    F: FnMut(&TtnEvent<T>) + Send,
{
    /// Creates a new DDE sink.
    pub fn new(name: impl Into<String>, func: F, iport: DdeIn<T>) -> Self {
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
    F: FnMut(&TtnEvent<T>) + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DDE::sink"
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

/// Merges two event streams into present pairs, `Absent` marking the
/// non-current side.
pub struct Zip<A, B> {
    name: String,
    iport1: DdeIn<A>,
    iport2: DdeIn<B>,
    oport: DdeOut<(AbstExt<A>, AbstExt<B>)>,
    merge: Merge2<AbstExt<A>, AbstExt<B>>,
    tc: Option<SimTime>,
    vals: Option<(AbstExt<A>, AbstExt<B>)>,
}

impl<A: Token, B: Token> Zip<A, B> {
    /// Creates a new DDE zip.
    pub fn new(
        name: impl Into<String>,
        iport1: DdeIn<A>,
        iport2: DdeIn<B>,
        oport: DdeOut<(AbstExt<A>, AbstExt<B>)>,
    ) -> Self {
        Self {
            name: name.into(),
            iport1,
            iport2,
            oport,
            merge: Merge2::new(),
            tc: None,
            vals: None,
        }
    }
}

impl<A: Token, B: Token> Process for Zip<A, B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DDE::zip"
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
                self.tc = Some(time);
                self.vals = Some(current(first, second));
                Ok(Flow::Ready)
            }
        }
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let (Some(pair), Some(t)) = (self.vals.take(), self.tc) {
            self.oport.write(TtEvent::present(pair, t));
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

/// Splits a stream of pairs. An absent pair yields two absent events.
pub struct Unzip<A, B> {
    name: String,
    iport: DdeIn<(AbstExt<A>, AbstExt<B>)>,
    oport1: DdeOut<A>,
    oport2: DdeOut<B>,
    tc: Option<SimTime>,
    val: Option<TtnEvent<(AbstExt<A>, AbstExt<B>)>>,
}

impl<A: Token, B: Token> Unzip<A, B> {
    /// Creates a new DDE unzip.
    pub fn new(
        name: impl Into<String>,
        iport: DdeIn<(AbstExt<A>, AbstExt<B>)>,
        oport1: DdeOut<A>,
        oport2: DdeOut<B>,
    ) -> Self {
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
        "DDE::unzip"
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
        if let Some(TtEvent { value, time }) = self.val.take() {
            let (a, b) = value.into_option().unwrap_or_default();
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

/// Merges N event streams of one type into vectors, `Absent` marking
/// every non-current input. A firing where every current value is absent
/// yields an absent event.
pub struct ZipN<T> {
    name: String,
    iports: Vec<DdeIn<T>>,
    oport: DdeOut<Vec<AbstExt<T>>>,
    merge: MergeN<AbstExt<T>>,
    tc: Option<SimTime>,
    vals: Option<Vec<AbstExt<T>>>,
}

impl<T: Token> ZipN<T> {
    /// Creates a new N-input zip over the clock merge.
    pub fn new(name: impl Into<String>, iports: Vec<DdeIn<T>>, oport: DdeOut<Vec<AbstExt<T>>>) -> Self {
        let n = iports.len();
        Self {
            name: name.into(),
            iports,
            oport,
            merge: MergeN::new(n),
            tc: None,
            vals: None,
        }
    }
}

impl<T: Token> Process for ZipN<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DDE::zipN"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        match self.merge.poll(&self.name, &self.iports)? {
            MergeNStep::Blocked => Ok(Flow::Blocked),
            MergeNStep::Done => Ok(Flow::Done),
            MergeNStep::Fire { time, current } => {
                self.tc = Some(time);
                self.vals = Some(current.into_iter().map(Option::unwrap_or_default).collect());
                Ok(Flow::Ready)
            }
        }
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let (Some(vals), Some(t)) = (self.vals.take(), self.tc) {
            if vals.iter().all(AbstExt::is_absent) {
                self.oport.write(TtEvent::absent(t));
            } else {
                self.oport.write(TtEvent::present(vals, t));
            }
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

/// Splits a stream of vectors over N outputs. An absent vector yields an
/// absent event on every output.
pub struct UnzipN<T> {
    name: String,
    iport: DdeIn<Vec<AbstExt<T>>>,
    oports: Vec<DdeOut<T>>,
    tc: Option<SimTime>,
    val: Option<TtnEvent<Vec<AbstExt<T>>>>,
}

impl<T: Token> UnzipN<T> {
    /// Creates a new N-output unzip; every present vector must hold one
    /// value per output.
    pub fn new(name: impl Into<String>, iport: DdeIn<Vec<AbstExt<T>>>, oports: Vec<DdeOut<T>>) -> Self {
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
        "DDE::unzipN"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let ev = read_or_return!(self.iport);
        self.tc = Some(ev.time);
        self.val = Some(ev);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        match self.val.as_ref().and_then(|ev| ev.value.value()) {
            Some(vals) => check_rate(&self.name, self.oports.len(), vals.len()),
            None => Ok(()),
        }
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(TtEvent { value, time }) = self.val.take() {
            let n = self.oports.len();
            let vals = value.into_option().unwrap_or_else(|| vec![AbstExt::Absent; n]);
            for (port, v) in self.oports.iter_mut().zip(vals) {
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
    iport: DdeIn<T>,
    oport: DdeOut<T>,
    tc: Option<SimTime>,
    val: Option<TtnEvent<T>>,
}

impl<T: Token> Fanout<T> {
    /// Creates a new DDE fanout.
    pub fn new(name: impl Into<String>, iport: DdeIn<T>, oport: DdeOut<T>) -> Self {
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
        "DDE::fanout"
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
