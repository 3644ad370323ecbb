//! Interfaces between Models of Computation.
//!
//! Each interface is an ordinary process reading one MoC's tokens and
//! writing another's. Conversions between timed and synchronous signals
//! need a sampling period; a synchronous token at index `k` stands for
//! the instant `k * period`.
//!
//! | Interface | From | To |
//! |-----------|------|----|
//! | [`Sy2Ct`] | SY | CT |
//! | [`Ct2Sy`] | CT | SY |
//! | [`Ct2Dde`] | CT | DDE |
//! | [`Dde2Ct`] | DDE | CT |
//! | [`De2Ct`] | DE | CT |
//! | [`Ct2De`] | CT | DE |
//! | [`Sy2Sdf`] | SY | SDF |
//! | [`Sdf2Sy`] | SDF | SY |
//! | [`Sy2Dde`] | SY | DDE |
//! | [`Dde2Sy`] | DDE | SY |
//!
//! # Example
//!
//! ```
//! use forsyde::moc::mi::{Ct2Sy, Interpolation, Sy2Ct};
//! use forsyde::moc::sy;
//! use forsyde::{AbstExt, Simulation};
//!
//! let mut sim = Simulation::new();
//! let (steps, wave, back) = (sim.signal("steps"), sim.signal("wave"), sim.signal("back"));
//!
//! sim.add(sy::VSource::new("steps", vec![1.0, 2.0], steps.writer().unwrap()));
//! sim.add(Sy2Ct::new("dac", 10, Interpolation::Hold, steps.reader().unwrap(), wave.writer().unwrap()));
//! sim.add(Ct2Sy::new("adc", 5, wave.reader().unwrap(), back.writer().unwrap()));
//!
//! sim.run().unwrap();
//! let expect: Vec<_> = [1.0, 1.0, 2.0, 2.0].into_iter().map(AbstExt::Present).collect();
//! assert_eq!(back.contents(), expect);
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::abst_ext::AbstExt;
use crate::error::SimResult;
use crate::event::TtEvent;
use crate::moc::check_positive;
use crate::moc::ct::{CtIn, CtOut, Sampler};
use crate::moc::dde::{DdeIn, DdeOut};
use crate::moc::de::{DeIn, DeOut};
use crate::moc::sy::{SyIn, SyOut};
use crate::process::{arg, Flow, Process};
use crate::signal::{Availability, InPort, InputPort, OutPort, OutputPort, Token};
use crate::sub_signal::SubSignal;
use crate::time::TimeAlignment;
use crate::types::{CtValue, SimTime, END_OF_TIME, ZERO_TIME};

/// How a discrete sequence of values is turned into a continuous signal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    /// Piecewise constant.
    #[default]
    Hold,
    /// Straight line from the previous value to the current one.
    Linear,
}

/// Line through `(t0, v0)` and `(t1, v1)`, over `[start, end)`.
fn ramp(start: SimTime, end: SimTime, t0: SimTime, v0: CtValue, t1: SimTime, v1: CtValue) -> SubSignal {
    let span = t1.saturating_sub(t0) as CtValue;
    let slope = if span > 0.0 { (v1 - v0) / span } else { 0.0 };
    SubSignal::new(start, end, move |t| v0 + slope * t.saturating_sub(t0) as CtValue)
}

/// SY to CT: every token spans one sampling period.
///
/// An absent token repeats the previous value, which is 0 before the
/// first present token.
pub struct Sy2Ct {
    name: String,
    period: SimTime,
    mode: Interpolation,
    iport: SyIn<CtValue>,
    oport: CtOut,
    iter: u64,
    previous: CtValue,
    current: CtValue,
    tc: Option<SimTime>,
    oval: Option<SubSignal>,
}

impl Sy2Ct {
    /// Creates a new SY to CT interface with one segment per `period`.
    pub fn new(name: impl Into<String>, period: SimTime, mode: Interpolation, iport: SyIn<CtValue>, oport: CtOut) -> Self {
        Self {
            name: name.into(),
            period,
            mode,
            iport,
            oport,
            iter: 0,
            previous: 0.0,
            current: 0.0,
            tc: None,
            oval: None,
        }
    }
}

impl Process for Sy2Ct {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "MI::SY2CT"
    }

    fn init(&mut self) -> SimResult<()> {
        check_positive(&self.name, "sampling period", self.period)
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let tok = read_or_return!(self.iport);
        self.current = tok.from_abst_ext(self.previous);
        self.tc = Some(self.iter.saturating_mul(self.period));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        let start = self.iter.saturating_mul(self.period);
        let end = start.saturating_add(self.period);
        self.oval = Some(match self.mode {
            Interpolation::Hold => SubSignal::constant(start, end, self.current),
            Interpolation::Linear => ramp(start, end, start, self.previous, end, self.current),
        });
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(ss) = self.oval.take() {
            self.oport.write(ss);
        }
        self.iter += 1;
        self.previous = self.current;
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
        vec![arg("period", self.period), arg("mode", self.mode)]
    }
}

/// CT to SY: samples every multiple of the period.
pub struct Ct2Sy {
    name: String,
    period: SimTime,
    iport: CtIn,
    oport: SyOut<CtValue>,
    sampler: Sampler,
    tc: Option<SimTime>,
    oval: Option<CtValue>,
}

impl Ct2Sy {
    /// Creates a new CT to SY interface sampling every `period`.
    pub fn new(name: impl Into<String>, period: SimTime, iport: CtIn, oport: SyOut<CtValue>) -> Self {
        Self {
            name: name.into(),
            period,
            iport,
            oport,
            sampler: Sampler::new(period),
            tc: None,
            oval: None,
        }
    }
}

impl Process for Ct2Sy {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "MI::CT2SY"
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
        let (_, v) = self.sampler.take()?;
        self.oval = Some(v);
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(v) = self.oval.take() {
            self.oport.write(AbstExt::Present(v));
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
        vec![arg("period", self.period)]
    }
}

/// CT to DDE: fixed-step sampling into events stamped with the sample
/// time.
pub struct Ct2Dde {
    name: String,
    period: SimTime,
    iport: CtIn,
    oport: DdeOut<CtValue>,
    sampler: Sampler,
    tc: Option<SimTime>,
    oval: Option<(SimTime, CtValue)>,
}

impl Ct2Dde {
    /// Creates a new CT to DDE interface sampling every `period`.
    pub fn new(name: impl Into<String>, period: SimTime, iport: CtIn, oport: DdeOut<CtValue>) -> Self {
        Self {
            name: name.into(),
            period,
            iport,
            oport,
            sampler: Sampler::new(period),
            tc: None,
            oval: None,
        }
    }
}

impl Process for Ct2Dde {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "MI::CT2DDE"
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
        self.oval = Some(self.sampler.take()?);
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some((t, v)) = self.oval.take() {
            self.oport.write(TtEvent::new(AbstExt::Present(v), t));
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
        vec![arg("period", self.period)]
    }
}

/// Turns a sequence of timed values into consecutive sub-signals.
///
/// A value's segment ends where the next value starts, so each segment
/// is only known one value late.
struct Segments {
    mode: Interpolation,
    pending: Option<(SimTime, CtValue)>,
}

impl Segments {
    fn new(mode: Interpolation) -> Self {
        Self { mode, pending: None }
    }

    /// Accepts the value starting at `t1`, returning the segment it closes.
    fn push(&mut self, name: &str, t1: SimTime, v1: CtValue) -> Option<SubSignal> {
        let (t0, v0) = self.pending.replace((t1, v1))?;
        if t1 <= t0 {
            trace!(process = %name, time = t1, "empty segment skipped");
            return None;
        }
        Some(match self.mode {
            Interpolation::Hold => SubSignal::constant(t0, t1, v0),
            Interpolation::Linear => ramp(t0, t1, t0, v0, t1, v1),
        })
    }

    /// Holds the last value until [`END_OF_TIME`].
    fn finish(&mut self) -> Option<SubSignal> {
        self.pending
            .take()
            .map(|(t, v)| SubSignal::constant(t, END_OF_TIME, v))
    }
}

/// DDE to CT: each event's value lasts until the next event.
///
/// The segment of an event is only known once the following event
/// arrives, so output lags input by one event. When the input ends, the
/// last value is held until [`END_OF_TIME`]. An absent event repeats
/// the previous value.
pub struct Dde2Ct {
    name: String,
    iport: DdeIn<CtValue>,
    oport: CtOut,
    segments: Segments,
    last: CtValue,
    tc: Option<SimTime>,
    oval: Option<SubSignal>,
}

impl Dde2Ct {
    /// Creates a new DDE to CT interface.
    pub fn new(name: impl Into<String>, mode: Interpolation, iport: DdeIn<CtValue>, oport: CtOut) -> Self {
        Self {
            name: name.into(),
            iport,
            oport,
            segments: Segments::new(mode),
            last: 0.0,
            tc: None,
            oval: None,
        }
    }
}

impl Process for Dde2Ct {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "MI::DDE2CT"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        match self.iport.status(1) {
            Availability::Ready => {}
            Availability::Pending => return Ok(Flow::Blocked),
            Availability::Ended => {
                self.oval = self.segments.finish();
                return Ok(if self.oval.is_some() { Flow::Ready } else { Flow::Done });
            }
        }

        let ev = self.iport.read()?;
        let (t1, v1) = (ev.time(), ev.into_value().from_abst_ext(self.last));
        self.last = v1;
        self.tc = Some(t1);
        self.oval = self.segments.push(&self.name, t1, v1);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
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

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("mode", self.segments.mode)]
    }
}

/// DE to CT: a digital-to-analog converter.
///
/// Same segmenting as [`Dde2Ct`], over plain DE events.
pub struct De2Ct {
    name: String,
    iport: DeIn<CtValue>,
    oport: CtOut,
    segments: Segments,
    tc: Option<SimTime>,
    oval: Option<SubSignal>,
}

impl De2Ct {
    /// Creates a new DE to CT interface.
    pub fn new(name: impl Into<String>, mode: Interpolation, iport: DeIn<CtValue>, oport: CtOut) -> Self {
        Self {
            name: name.into(),
            iport,
            oport,
            segments: Segments::new(mode),
            tc: None,
            oval: None,
        }
    }
}

impl Process for De2Ct {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "MI::DE2CT"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        match self.iport.status(1) {
            Availability::Ready => {}
            Availability::Pending => return Ok(Flow::Blocked),
            Availability::Ended => {
                self.oval = self.segments.finish();
                return Ok(if self.oval.is_some() { Flow::Ready } else { Flow::Done });
            }
        }

        let ev = self.iport.read()?;
        self.tc = Some(ev.time());
        self.oval = self.segments.push(&self.name, ev.time(), ev.value);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
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

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("mode", self.segments.mode)]
    }
}

/// CT to DE: samples the CT input at the instants of a second,
/// sampling DE input.
///
/// Only the times of sampling events matter; their values are ignored.
/// Sampling instants are expected in non-decreasing order. An instant
/// that falls in a gap of the CT input, or before the sub-signal
/// currently held, yields no event. The interface ends when either
/// input ends.
pub struct Ct2De<S> {
    name: String,
    iport: CtIn,
    sampling: DeIn<S>,
    oport: DeOut<CtValue>,
    current: Option<SubSignal>,
    next: Option<SimTime>,
    tc: Option<SimTime>,
    oval: Option<(SimTime, CtValue)>,
}

impl<S: Token> Ct2De<S> {
    /// Creates a new CT to DE interface.
    pub fn new(name: impl Into<String>, iport: CtIn, sampling: DeIn<S>, oport: DeOut<CtValue>) -> Self {
        Self {
            name: name.into(),
            iport,
            sampling,
            oport,
            current: None,
            next: None,
            tc: None,
            oval: None,
        }
    }
}

impl<S: Token> Process for Ct2De<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "MI::CT2DE"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let t = match self.next {
            Some(t) => t,
            None => {
                let t = read_or_return!(self.sampling).time();
                self.next = Some(t);
                t
            }
        };
        while !matches!(&self.current, Some(ss) if t < ss.end()) {
            self.current = Some(read_or_return!(self.iport));
        }
        self.next = None;
        self.tc = Some(t);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let (Some(t), Some(ss)) = (self.tc, &self.current) {
            if ss.contains(t) {
                self.oval = Some((t, ss.sample(t)?));
            } else {
                trace!(process = %self.name, time = t, "sampling instant outside the input");
            }
        }
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some((t, v)) = self.oval.take() {
            self.oport.write(TtEvent::new(v, t));
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport, &self.sampling]
    }

    fn local_time(&self) -> Option<SimTime> {
        self.tc
    }
}

/// SY to SDF: forwards present values and drops absents.
pub struct Sy2Sdf<T> {
    name: String,
    iport: SyIn<T>,
    oport: OutPort<T>,
    val: Option<T>,
}

impl<T: Token> Sy2Sdf<T> {
    /// Creates a new SY to SDF interface.
    pub fn new(name: impl Into<String>, iport: SyIn<T>, oport: OutPort<T>) -> Self {
        Self {
            name: name.into(),
            iport,
            oport,
            val: None,
        }
    }
}

impl<T: Token> Process for Sy2Sdf<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "MI::SY2SDF"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.val = read_or_return!(self.iport).into_option();
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(v) = self.val.take() {
            self.oport.write(v);
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport]
    }
}

/// SDF to SY: every token becomes a present value.
pub struct Sdf2Sy<T> {
    name: String,
    iport: InPort<T>,
    oport: SyOut<T>,
    val: Option<T>,
}

impl<T: Token> Sdf2Sy<T> {
    /// Creates a new SDF to SY interface.
    pub fn new(name: impl Into<String>, iport: InPort<T>, oport: SyOut<T>) -> Self {
        Self {
            name: name.into(),
            iport,
            oport,
            val: None,
        }
    }
}

impl<T: Token> Process for Sdf2Sy<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "MI::SDF2SY"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.val = Some(read_or_return!(self.iport));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(v) = self.val.take() {
            self.oport.write(AbstExt::Present(v));
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport]
    }
}

/// SY to DDE: the k-th token becomes an event at `k * period`.
pub struct Sy2Dde<T> {
    name: String,
    period: SimTime,
    iport: SyIn<T>,
    oport: DdeOut<T>,
    cur_time: SimTime,
    tc: Option<SimTime>,
    val: Option<AbstExt<T>>,
}

impl<T: Token> Sy2Dde<T> {
    /// Creates a new SY to DDE interface stamping cycle `k` at `k * period`.
    pub fn new(name: impl Into<String>, period: SimTime, iport: SyIn<T>, oport: DdeOut<T>) -> Self {
        Self {
            name: name.into(),
            period,
            iport,
            oport,
            cur_time: ZERO_TIME,
            tc: None,
            val: None,
        }
    }
}

impl<T: Token> Process for Sy2Dde<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "MI::SY2DDE"
    }

    fn init(&mut self) -> SimResult<()> {
        check_positive(&self.name, "sampling period", self.period)
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.val = Some(read_or_return!(self.iport));
        self.tc = Some(self.cur_time);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(v) = self.val.take() {
            self.oport.write(TtEvent::new(v, self.cur_time));
        }
        self.cur_time = self.cur_time.saturating_add(self.period);
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
        vec![arg("period", self.period)]
    }
}

/// DDE to SY: events are aligned onto ticks of `period`.
///
/// Each tick emits the last present value seen at or before it, or
/// absent while there is none. Several events landing on the same tick
/// keep the latest one. The tick of the last event is emitted once the
/// input ends.
pub struct Dde2Sy<T> {
    name: String,
    period: SimTime,
    alignment: TimeAlignment,
    iport: DdeIn<T>,
    oport: SyOut<T>,
    next_tick: SimTime,
    last: AbstExt<T>,
    seen: bool,
    tc: Option<SimTime>,
    ovals: Vec<AbstExt<T>>,
}

impl<T: Token> Dde2Sy<T> {
    /// Creates a new DDE to SY interface.
    pub fn new(
        name: impl Into<String>,
        period: SimTime,
        alignment: TimeAlignment,
        iport: DdeIn<T>,
        oport: SyOut<T>,
    ) -> Self {
        Self {
            name: name.into(),
            period,
            alignment,
            iport,
            oport,
            next_tick: ZERO_TIME,
            last: AbstExt::Absent,
            seen: false,
            tc: None,
            ovals: Vec::new(),
        }
    }

    fn emit_until(&mut self, tick: SimTime) {
        while self.next_tick < tick {
            self.ovals.push(self.last.clone());
            self.next_tick = self.next_tick.saturating_add(self.period);
        }
    }
}

impl<T: Token> Process for Dde2Sy<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "MI::DDE2SY"
    }

    fn init(&mut self) -> SimResult<()> {
        check_positive(&self.name, "sampling period", self.period)
    }

    fn prep(&mut self) -> SimResult<Flow> {
        match self.iport.status(1) {
            Availability::Ready => {}
            Availability::Pending => return Ok(Flow::Blocked),
            Availability::Ended => {
                if !self.seen {
                    return Ok(Flow::Done);
                }
                // closes the tick of the last event
                self.seen = false;
                let last_tick = self.next_tick.saturating_add(1);
                self.emit_until(last_tick);
                return Ok(Flow::Ready);
            }
        }

        let ev = self.iport.read()?;
        let tick = self.alignment.try_align(ev.time(), self.period)?;
        self.emit_until(tick);
        if ev.value().is_present() {
            self.last = ev.into_value();
        }
        self.seen = true;
        self.tc = Some(tick);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        self.oport.write_all(self.ovals.drain(..));
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
        vec![
            arg("period", self.period),
            arg("alignment", self.alignment),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::moc::{dde, sy};
    use crate::Simulation;

    #[test]
    fn test_sy2ct_linear_ramps_between_tokens() {
        let mut sim = Simulation::new();
        let (s, c) = (sim.signal("s"), sim.signal("c"));
        sim.add(sy::VSource::with_absents(
            "s",
            vec![AbstExt::Present(2.0), AbstExt::Absent, AbstExt::Present(4.0)],
            s.writer().unwrap(),
        ));
        sim.add(Sy2Ct::new("dac", 10, Interpolation::Linear, s.reader().unwrap(), c.writer().unwrap()));
        sim.run().unwrap();

        let out = c.contents();
        let ranges: Vec<_> = out.iter().map(SubSignal::range).collect();
        assert_eq!(ranges, vec![(0, 10), (10, 20), (20, 30)]);
        // ramp from the initial 0 up to 2
        assert_eq!(out[0].sample(5).unwrap(), 1.0);
        // absent holds 2
        assert_eq!(out[1].sample(15).unwrap(), 2.0);
        assert_eq!(out[2].sample(25).unwrap(), 3.0);
    }

    #[test]
    fn test_dde2ct_segments_and_tail() {
        let mut sim = Simulation::new();
        let (d, c) = (sim.signal("d"), sim.signal("c"));
        sim.add(dde::VSource::from_events(
            "d",
            vec![
                TtEvent::new(AbstExt::Present(1.0), 0),
                TtEvent::new(AbstExt::Present(5.0), 4),
                TtEvent::new(AbstExt::Absent, 4),
            ],
            d.writer().unwrap(),
        ));
        sim.add(Dde2Ct::new("hold", Interpolation::Hold, d.reader().unwrap(), c.writer().unwrap()));
        sim.run().unwrap();

        let out = c.contents();
        let ranges: Vec<_> = out.iter().map(SubSignal::range).collect();
        assert_eq!(ranges, vec![(0, 4), (4, END_OF_TIME)]);
        assert_eq!(out[0].sample(3).unwrap(), 1.0);
        assert_eq!(out[1].sample(1_000).unwrap(), 5.0);
    }

    #[test]
    fn test_segments_linear_and_repeated_time() {
        let mut seg = Segments::new(Interpolation::Linear);
        assert!(seg.push("p", 0, 0.0).is_none());
        let ramp = seg.push("p", 10, 5.0).unwrap();
        assert_eq!(ramp.range(), (0, 10));
        assert_eq!(ramp.sample(4).unwrap(), 2.0);
        // same instant again: nothing to span
        assert!(seg.push("p", 10, 7.0).is_none());
        let tail = seg.finish().unwrap();
        assert_eq!(tail.range(), (10, END_OF_TIME));
        assert_eq!(tail.sample(50).unwrap(), 7.0);
        assert!(seg.finish().is_none());
    }

    #[test]
    fn test_dde2sy_holds_last_present_value() {
        let mut sim = Simulation::new();
        let (d, s) = (sim.signal("d"), sim.signal("s"));
        sim.add(dde::VSource::from_events(
            "d",
            vec![
                TtEvent::new(AbstExt::Present('a'), 12),
                TtEvent::new(AbstExt::Absent, 25),
                TtEvent::new(AbstExt::Present('b'), 40),
            ],
            d.writer().unwrap(),
        ));
        sim.add(Dde2Sy::new("sync", 10, TimeAlignment::CeilToTick, d.reader().unwrap(), s.writer().unwrap()));
        sim.run().unwrap();

        use AbstExt::{Absent, Present};
        // ticks 0..=40, event 12 seen at 20, 25 at 30, 40 at 40
        assert_eq!(
            s.contents(),
            vec![Absent, Absent, Present('a'), Present('a'), Present('b')]
        );
    }

    #[test]
    fn test_dde2sy_strict_rejects_misaligned() {
        let mut sim = Simulation::new();
        let (d, s) = (sim.signal("d"), sim.signal::<AbstExt<i32>>("s"));
        sim.add(dde::VSource::new("d", vec![1], vec![7], d.writer().unwrap()));
        sim.add(Dde2Sy::new(
            "sync",
            5,
            TimeAlignment::StrictTickBoundary,
            d.reader().unwrap(),
            s.writer().unwrap(),
        ));
        let err = sim.run().unwrap_err();
        assert!(matches!(err, SimError::Misaligned { time: 7, period: 5 }));
    }

    #[test]
    fn test_sy_sdf_round_trip_drops_absents() {
        let mut sim = Simulation::new();
        let (a, b, c) = (sim.signal("a"), sim.signal("b"), sim.signal("c"));
        sim.add(sy::VSource::with_absents(
            "a",
            vec![AbstExt::Present(1), AbstExt::Absent, AbstExt::Present(3)],
            a.writer().unwrap(),
        ));
        sim.add(Sy2Sdf::new("to_sdf", a.reader().unwrap(), b.writer().unwrap()));
        sim.add(Sdf2Sy::new("to_sy", b.reader().unwrap(), c.writer().unwrap()));
        sim.run().unwrap();
        assert_eq!(c.contents(), vec![AbstExt::Present(1), AbstExt::Present(3)]);
    }

    #[test]
    fn test_sy2dde_stamps_ticks() {
        let mut sim = Simulation::new();
        let (a, d) = (sim.signal("a"), sim.signal("d"));
        sim.add(sy::VSource::with_absents(
            "a",
            vec![AbstExt::Present(1), AbstExt::Absent],
            a.writer().unwrap(),
        ));
        sim.add(Sy2Dde::new("stamp", 3, a.reader().unwrap(), d.writer().unwrap()));
        sim.run().unwrap();
        assert_eq!(
            d.contents(),
            vec![TtEvent::new(AbstExt::Present(1), 0), TtEvent::new(AbstExt::Absent, 3)]
        );
    }
}
