//! The untimed MoC.
//!
//! Tokens are plain values and there is no notion of time. Unlike SDF,
//! the number of tokens a state machine reads per firing is chosen at
//! run time by a partitioning function `gamma(state)`.
//!
//! # Example
//!
//! ```
//! use forsyde::Simulation;
//! use forsyde::moc::ut;
//!
//! let mut sim = Simulation::new();
//! let (input, totals) = (sim.signal("input"), sim.signal("totals"));
//!
//! sim.add(ut::VSource::new("src", vec![1, 2, 3, 4, 5, 6], input.writer().unwrap()));
//! // Reads one token, then two, then three...
//! sim.add(ut::Scan::new(
//!     "grow",
//!     |s: &(usize, i32)| s.0,
//!     |s: &(usize, i32), xs: &[i32]| (s.0 + 1, xs.iter().sum()),
//!     (1, 0),
//!     input.reader().unwrap(),
//!     totals.writer().unwrap(),
//! ));
//!
//! sim.run().unwrap();
//! let sums: Vec<i32> = totals.contents().into_iter().map(|s| s.1).collect();
//! assert_eq!(sums, vec![1, 5, 15]);
//! ```

use crate::error::SimResult;
use crate::moc::{check_positive, rate_status, TakeCounter};
use crate::process::{arg, Flow, Process};
use crate::signal::{Availability, InPort, InputPort, OutPort, OutputPort, Token};

/// Reads `itoks` tokens per firing and writes whatever `func` returns.
pub struct Comb<I, O, F> {
    name: String,
    itoks: usize,
    func: F,
    iport: InPort<I>,
    oport: OutPort<O>,
    ivals: Vec<I>,
    ovals: Vec<O>,
}

impl<I, O, F> Comb<I, O, F>
where
    I: Token,
    O: Token,
    F: FnMut(&[I]) -> Vec<O> + Send,
{
    /// Creates a new UT combinator reading `itoks` tokens per firing.
    /// Unlike SDF, the rate comes before `func`.
    pub fn new(name: impl Into<String>, itoks: usize, func: F, iport: InPort<I>, oport: OutPort<O>) -> Self {
        Self {
            name: name.into(),
            itoks,
            func,
            iport,
            oport,
            ivals: Vec::new(),
            ovals: Vec::new(),
        }
    }
}

impl<I, O, F> Process for Comb<I, O, F>
where
    I: Token,
    O: Token,
    F: FnMut(&[I]) -> Vec<O> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "UT::comb"
    }

    fn init(&mut self) -> SimResult<()> {
        check_positive(&self.name, "itoks", self.itoks as u64)
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = self.iport.status(self.itoks);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.ivals = self.iport.read_n(self.itoks)?;
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        self.ovals = (self.func)(&self.ivals);
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

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("itoks", self.itoks)]
    }
}

/// Two-input version of [`Comb`].
pub struct Comb2<I1, I2, O, F> {
    name: String,
    i1toks: usize,
    i2toks: usize,
    func: F,
    iport1: InPort<I1>,
    iport2: InPort<I2>,
    oport: OutPort<O>,
    ivals: Option<(Vec<I1>, Vec<I2>)>,
    ovals: Vec<O>,
}

impl<I1, I2, O, F> Comb2<I1, I2, O, F>
where
    I1: Token,
    I2: Token,
    O: Token,
    F: FnMut(&[I1], &[I2]) -> Vec<O> + Send,
{
    /// Creates a new two-input UT combinator.
    pub fn new(
        name: impl Into<String>,
        i1toks: usize,
        i2toks: usize,
        func: F,
        iport1: InPort<I1>,
        iport2: InPort<I2>,
        oport: OutPort<O>,
    ) -> Self {
        Self {
            name: name.into(),
            i1toks,
            i2toks,
            func,
            iport1,
            iport2,
            oport,
            ivals: None,
            ovals: Vec::new(),
        }
    }
}

impl<I1, I2, O, F> Process for Comb2<I1, I2, O, F>
where
    I1: Token,
    I2: Token,
    O: Token,
    F: FnMut(&[I1], &[I2]) -> Vec<O> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "UT::comb2"
    }

    fn init(&mut self) -> SimResult<()> {
        check_positive(&self.name, "i1toks", self.i1toks as u64)?;
        check_positive(&self.name, "i2toks", self.i2toks as u64)
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = Availability::all([self.iport1.status(self.i1toks), self.iport2.status(self.i2toks)]);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.ivals = Some((self.iport1.read_n(self.i1toks)?, self.iport2.read_n(self.i2toks)?));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some((a, b)) = self.ivals.take() {
            self.ovals = (self.func)(&a, &b);
        }
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
        vec![&self.iport1, &self.iport2]
    }

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("i1toks", self.i1toks), arg("i2toks", self.i2toks)]
    }
}

/// Three-input version of [`Comb`], reading `itoks[i]` tokens from input `i`.
pub struct Comb3<I1, I2, I3, O, F> {
    name: String,
    itoks: [usize; 3],
    func: F,
    iport1: InPort<I1>,
    iport2: InPort<I2>,
    iport3: InPort<I3>,
    oport: OutPort<O>,
    ivals: Option<(Vec<I1>, Vec<I2>, Vec<I3>)>,
    ovals: Vec<O>,
}

impl<I1, I2, I3, O, F> Comb3<I1, I2, I3, O, F>
where
    I1: Token,
    I2: Token,
    I3: Token,
    O: Token,
    F: FnMut(&[I1], &[I2], &[I3]) -> Vec<O> + Send,
{
    /// Creates a new three-input combinator.
    pub fn new(
        name: impl Into<String>,
        itoks: [usize; 3],
        func: F,
        inputs: (InPort<I1>, InPort<I2>, InPort<I3>),
        oport: OutPort<O>,
    ) -> Self {
        let (iport1, iport2, iport3) = inputs;
        Self {
            name: name.into(),
            itoks,
            func,
            iport1,
            iport2,
            iport3,
            oport,
            ivals: None,
            ovals: Vec::new(),
        }
    }
}

impl<I1, I2, I3, O, F> Process for Comb3<I1, I2, I3, O, F>
where
    I1: Token,
    I2: Token,
    I3: Token,
    O: Token,
    F: FnMut(&[I1], &[I2], &[I3]) -> Vec<O> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "UT::comb3"
    }

    fn init(&mut self) -> SimResult<()> {
        for n in self.itoks {
            check_positive(&self.name, "itoks", n as u64)?;
        }
        Ok(())
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let [n1, n2, n3] = self.itoks;
        let status = Availability::all([
            self.iport1.status(n1),
            self.iport2.status(n2),
            self.iport3.status(n3),
        ]);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.ivals = Some((
            self.iport1.read_n(n1)?,
            self.iport2.read_n(n2)?,
            self.iport3.read_n(n3)?,
        ));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some((a, b, c)) = self.ivals.take() {
            self.ovals = (self.func)(&a, &b, &c);
        }
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
        vec![&self.iport1, &self.iport2, &self.iport3]
    }

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("itoks", self.itoks)]
    }
}

/// Four-input version of [`Comb`], reading `itoks[i]` tokens from input `i`.
pub struct Comb4<I1, I2, I3, I4, O, F> {
    name: String,
    itoks: [usize; 4],
    func: F,
    iport1: InPort<I1>,
    iport2: InPort<I2>,
    iport3: InPort<I3>,
    iport4: InPort<I4>,
    oport: OutPort<O>,
    ivals: Option<(Vec<I1>, Vec<I2>, Vec<I3>, Vec<I4>)>,
    ovals: Vec<O>,
}

impl<I1, I2, I3, I4, O, F> Comb4<I1, I2, I3, I4, O, F>
where
    I1: Token,
    I2: Token,
    I3: Token,
    I4: Token,
    O: Token,
    F: FnMut(&[I1], &[I2], &[I3], &[I4]) -> Vec<O> + Send,
{
    /// Creates a new four-input combinator.
    pub fn new(
        name: impl Into<String>,
        itoks: [usize; 4],
        func: F,
        inputs: (InPort<I1>, InPort<I2>, InPort<I3>, InPort<I4>),
        oport: OutPort<O>,
    ) -> Self {
        let (iport1, iport2, iport3, iport4) = inputs;
        Self {
            name: name.into(),
            itoks,
            func,
            iport1,
            iport2,
            iport3,
            iport4,
            oport,
            ivals: None,
            ovals: Vec::new(),
        }
    }
}

impl<I1, I2, I3, I4, O, F> Process for Comb4<I1, I2, I3, I4, O, F>
where
    I1: Token,
    I2: Token,
    I3: Token,
    I4: Token,
    O: Token,
    F: FnMut(&[I1], &[I2], &[I3], &[I4]) -> Vec<O> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "UT::comb4"
    }

    fn init(&mut self) -> SimResult<()> {
        for n in self.itoks {
            check_positive(&self.name, "itoks", n as u64)?;
        }
        Ok(())
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let [n1, n2, n3, n4] = self.itoks;
        let status = Availability::all([
            self.iport1.status(n1),
            self.iport2.status(n2),
            self.iport3.status(n3),
            self.iport4.status(n4),
        ]);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.ivals = Some((
            self.iport1.read_n(n1)?,
            self.iport2.read_n(n2)?,
            self.iport3.read_n(n3)?,
            self.iport4.read_n(n4)?,
        ));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some((a, b, c, d)) = self.ivals.take() {
            self.ovals = (self.func)(&a, &b, &c, &d);
        }
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
        vec![&self.iport1, &self.iport2, &self.iport3, &self.iport4]
    }

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("itoks", self.itoks)]
    }
}

/// `n` initial tokens followed by the input stream.
pub struct DelayN<T> {
    name: String,
    init_val: T,
    n: usize,
    iport: InPort<T>,
    oport: OutPort<T>,
    val: Option<T>,
}

impl<T: Token> DelayN<T> {
    /// Creates a new UT delay emitting `n` copies of `init_val` first.
    pub fn new(name: impl Into<String>, init_val: T, n: usize, iport: InPort<T>, oport: OutPort<T>) -> Self {
        Self {
            name: name.into(),
            init_val,
            n,
            iport,
            oport,
            val: None,
        }
    }
}

impl<T: Token> Process for DelayN<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        if self.n == 1 {
            "UT::delay"
        } else {
            "UT::delayn"
        }
    }

    fn init(&mut self) -> SimResult<()> {
        for _ in 0..self.n {
            self.oport.write(self.init_val.clone());
        }
        Ok(())
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

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("n", self.n)]
    }
}

/// One initial token followed by the input stream.
pub struct Delay;

impl Delay {
    /// Creates a new single-token UT delay.
    #[allow(clippy::new_ret_no_self)]
    pub fn new<T: Token>(name: impl Into<String>, init_val: T, iport: InPort<T>, oport: OutPort<T>) -> DelayN<T> {
        DelayN::new(name, init_val, 1, iport, oport)
    }
}

/// Reads `gamma(state)` tokens, updates the state and emits it.
pub struct Scan<I, S, G, NS> {
    name: String,
    gamma: G,
    ns_func: NS,
    state: S,
    iport: InPort<I>,
    oport: OutPort<S>,
    ivals: Vec<I>,
}

impl<I, S, G, NS> Scan<I, S, G, NS>
where
    I: Token,
    S: Token,
    G: FnMut(&S) -> usize + Send,
    NS: FnMut(&S, &[I]) -> S + Send,
{
    /// Creates a new UT scan.
    pub fn new(name: impl Into<String>, gamma: G, ns_func: NS, init_st: S, iport: InPort<I>, oport: OutPort<S>) -> Self {
        Self {
            name: name.into(),
            gamma,
            ns_func,
            state: init_st,
            iport,
            oport,
            ivals: Vec::new(),
        }
    }
}

impl<I, S, G, NS> Process for Scan<I, S, G, NS>
where
    I: Token,
    S: Token,
    G: FnMut(&S) -> usize + Send,
    NS: FnMut(&S, &[I]) -> S + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "UT::scan"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let itoks = (self.gamma)(&self.state);
        let status = rate_status(&self.iport, itoks);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.ivals = self.iport.read_n(itoks)?;
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        self.state = (self.ns_func)(&self.state, &self.ivals);
        self.ivals.clear();
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        self.oport.write(self.state.clone());
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport]
    }
}

/// [`Scan`] that emits the initial state before reading anything.
pub struct ScanD<I, S, G, NS> {
    name: String,
    gamma: G,
    ns_func: NS,
    state: S,
    iport: InPort<I>,
    oport: OutPort<S>,
    started: bool,
    ivals: Option<Vec<I>>,
}

impl<I, S, G, NS> ScanD<I, S, G, NS>
where
    I: Token,
    S: Token,
    G: FnMut(&S) -> usize + Send,
    NS: FnMut(&S, &[I]) -> S + Send,
{
    /// Creates a new delayed scan.
    pub fn new(name: impl Into<String>, gamma: G, ns_func: NS, init_st: S, iport: InPort<I>, oport: OutPort<S>) -> Self {
        Self {
            name: name.into(),
            gamma,
            ns_func,
            state: init_st,
            iport,
            oport,
            started: false,
            ivals: None,
        }
    }
}

impl<I, S, G, NS> Process for ScanD<I, S, G, NS>
where
    I: Token,
    S: Token,
    G: FnMut(&S) -> usize + Send,
    NS: FnMut(&S, &[I]) -> S + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "UT::scand"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        if !self.started {
            return Ok(Flow::Ready);
        }
        let itoks = (self.gamma)(&self.state);
        let status = rate_status(&self.iport, itoks);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.ivals = Some(self.iport.read_n(itoks)?);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some(ivals) = self.ivals.take() {
            self.state = (self.ns_func)(&self.state, &ivals);
        }
        self.started = true;
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        self.oport.write(self.state.clone());
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport]
    }
}

/// Moore machine with a state-dependent input rate.
///
/// The first firing emits `od(init)` without reading. Every later firing
/// reads `gamma(state)` tokens, moves to the next state and emits its
/// output decoding.
pub struct Moore<I, S, O, G, NS, OD> {
    name: String,
    gamma: G,
    ns_func: NS,
    od_func: OD,
    state: S,
    iport: InPort<I>,
    oport: OutPort<O>,
    started: bool,
    ivals: Option<Vec<I>>,
    ovals: Vec<O>,
}

impl<I, S, O, G, NS, OD> Moore<I, S, O, G, NS, OD>
where
    I: Token,
    S: Send + 'static,
    O: Token,
    G: FnMut(&S) -> usize + Send,
    NS: FnMut(&S, &[I]) -> S + Send,
    OD: FnMut(&S) -> Vec<O> + Send,
{
    /// Creates a new UT Moore machine.
    pub fn new(
        name: impl Into<String>,
        gamma: G,
        ns_func: NS,
        od_func: OD,
        init_st: S,
        iport: InPort<I>,
        oport: OutPort<O>,
    ) -> Self {
        Self {
            name: name.into(),
            gamma,
            ns_func,
            od_func,
            state: init_st,
            iport,
            oport,
            started: false,
            ivals: None,
            ovals: Vec::new(),
        }
    }
}

impl<I, S, O, G, NS, OD> Process for Moore<I, S, O, G, NS, OD>
where
    I: Token,
    S: Send + 'static,
    O: Token,
    G: FnMut(&S) -> usize + Send,
    NS: FnMut(&S, &[I]) -> S + Send,
    OD: FnMut(&S) -> Vec<O> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "UT::moore"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        if !self.started {
            return Ok(Flow::Ready);
        }
        let itoks = (self.gamma)(&self.state);
        let status = rate_status(&self.iport, itoks);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.ivals = Some(self.iport.read_n(itoks)?);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some(ivals) = self.ivals.take() {
            self.state = (self.ns_func)(&self.state, &ivals);
        }
        self.started = true;
        self.ovals = (self.od_func)(&self.state);
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
}

/// Mealy machine with a state-dependent input rate.
pub struct Mealy<I, S, O, G, NS, OD> {
    name: String,
    gamma: G,
    ns_func: NS,
    od_func: OD,
    state: S,
    iport: InPort<I>,
    oport: OutPort<O>,
    ivals: Vec<I>,
    ovals: Vec<O>,
}

impl<I, S, O, G, NS, OD> Mealy<I, S, O, G, NS, OD>
where
    I: Token,
    S: Send + 'static,
    O: Token,
    G: FnMut(&S) -> usize + Send,
    NS: FnMut(&S, &[I]) -> S + Send,
    OD: FnMut(&S, &[I]) -> Vec<O> + Send,
{
    /// Creates a new UT Mealy machine.
    pub fn new(
        name: impl Into<String>,
        gamma: G,
        ns_func: NS,
        od_func: OD,
        init_st: S,
        iport: InPort<I>,
        oport: OutPort<O>,
    ) -> Self {
        Self {
            name: name.into(),
            gamma,
            ns_func,
            od_func,
            state: init_st,
            iport,
            oport,
            ivals: Vec::new(),
            ovals: Vec::new(),
        }
    }
}

impl<I, S, O, G, NS, OD> Process for Mealy<I, S, O, G, NS, OD>
where
    I: Token,
    S: Send + 'static,
    O: Token,
    G: FnMut(&S) -> usize + Send,
    NS: FnMut(&S, &[I]) -> S + Send,
    OD: FnMut(&S, &[I]) -> Vec<O> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "UT::mealy"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let itoks = (self.gamma)(&self.state);
        let status = rate_status(&self.iport, itoks);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.ivals = self.iport.read_n(itoks)?;
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        self.ovals = (self.od_func)(&self.state, &self.ivals);
        self.state = (self.ns_func)(&self.state, &self.ivals);
        self.ivals.clear();
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
}

/// Emits the same token `take` times (0 = forever).
pub struct Constant<T> {
    name: String,
    value: T,
    count: TakeCounter,
    oport: OutPort<T>,
}

impl<T: Token> Constant<T> {
    /// Creates a new UT constant.
    pub fn new(name: impl Into<String>, value: T, take: u64, oport: OutPort<T>) -> Self {
        Self {
            name: name.into(),
            value,
            count: TakeCounter::new(take),
            oport,
        }
    }
}

impl<T: Token> Process for Constant<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "UT::constant"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        Ok(if self.count.exhausted() { Flow::Done } else { Flow::Ready })
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        self.oport.write(self.value.clone());
        self.count.tick();
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }
}

/// Emits `init`, then repeatedly applies `func`, `take` tokens in total
/// (0 = forever).
pub struct Source<T, F> {
    name: String,
    func: F,
    state: T,
    count: TakeCounter,
    oport: OutPort<T>,
}

impl<T, F> Source<T, F>
where
    T: Token,
    F: FnMut(&T) -> T + Send,
{
    /// Creates a new UT source.
    pub fn new(name: impl Into<String>, func: F, init_val: T, take: u64, oport: OutPort<T>) -> Self {
        Self {
            name: name.into(),
            func,
            state: init_val,
            count: TakeCounter::new(take),
            oport,
        }
    }
}

impl<T, F> Process for Source<T, F>
where
    T: Token,
    F: FnMut(&T) -> T + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "UT::source"
    }

    fn init(&mut self) -> SimResult<()> {
        self.oport.write(self.state.clone());
        self.count.tick();
        Ok(())
    }

    fn prep(&mut self) -> SimResult<Flow> {
        Ok(if self.count.exhausted() { Flow::Done } else { Flow::Ready })
    }

    fn exec(&mut self) -> SimResult<()> {
        self.state = (self.func)(&self.state);
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        self.oport.write(self.state.clone());
        self.count.tick();
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }
}

/// Emits the elements of a vector, then ends.
pub struct VSource<T> {
    name: String,
    values: std::vec::IntoIter<T>,
    next: Option<T>,
    oport: OutPort<T>,
}

impl<T: Token> VSource<T> {
    /// Creates a new UT source from a vector.
    pub fn new(name: impl Into<String>, values: Vec<T>, oport: OutPort<T>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter(),
            next: None,
            oport,
        }
    }
}

impl<T: Token> Process for VSource<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "UT::vsource"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.next = self.values.next();
        Ok(if self.next.is_some() { Flow::Ready } else { Flow::Done })
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(v) = self.next.take() {
            self.oport.write(v);
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }
}

/// Calls `func` on every token.
pub struct Sink<T, F> {
    name: String,
    func: F,
    iport: InPort<T>,
    val: Option<T>,
}

impl<T, F> Sink<T, F>
where
    T: Token,
    F: FnMut(&T) + Send,
{
    /// Creates a new UT sink.
    pub fn new(name: impl Into<String>, func: F, iport: InPort<T>) -> Self {
        Self {
            name: name.into(),
            func,
            iport,
            val: None,
        }
    }
}

impl<T, F> Process for Sink<T, F>
where
    T: Token,
    F: FnMut(&T) + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "UT::sink"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.val = Some(read_or_return!(self.iport));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some(v) = self.val.take() {
            (self.func)(&v);
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
}

/// Reads `i1toks` and `i2toks` tokens and emits them as one tuple.
pub struct Zips<A, B> {
    name: String,
    i1toks: usize,
    i2toks: usize,
    iport1: InPort<A>,
    iport2: InPort<B>,
    oport: OutPort<(Vec<A>, Vec<B>)>,
    vals: Option<(Vec<A>, Vec<B>)>,
}

impl<A: Token, B: Token> Zips<A, B> {
    /// Creates a new UT zip with fixed rates.
    pub fn new(
        name: impl Into<String>,
        i1toks: usize,
        i2toks: usize,
        iport1: InPort<A>,
        iport2: InPort<B>,
        oport: OutPort<(Vec<A>, Vec<B>)>,
    ) -> Self {
        Self {
            name: name.into(),
            i1toks,
            i2toks,
            iport1,
            iport2,
            oport,
            vals: None,
        }
    }
}

impl<A: Token, B: Token> Process for Zips<A, B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "UT::zips"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = Availability::all([self.iport1.status(self.i1toks), self.iport2.status(self.i2toks)]);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.vals = Some((self.iport1.read_n(self.i1toks)?, self.iport2.read_n(self.i2toks)?));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(v) = self.vals.take() {
            self.oport.write(v);
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport1, &self.iport2]
    }

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("i1toks", self.i1toks), arg("i2toks", self.i2toks)]
    }
}

/// Zips two inputs at rates chosen by a control signal.
///
/// Each firing reads one control token `c`, then `gamma1(c)` tokens from
/// the first input and `gamma2(c)` from the second. Nothing is consumed
/// until all of them are available.
pub struct ZipU<A, B, C, G1, G2> {
    name: String,
    gamma1: G1,
    gamma2: G2,
    iport1: InPort<A>,
    iport2: InPort<B>,
    control: InPort<C>,
    oport: OutPort<(Vec<A>, Vec<B>)>,
    vals: Option<(Vec<A>, Vec<B>)>,
}

impl<A, B, C, G1, G2> ZipU<A, B, C, G1, G2>
where
    A: Token,
    B: Token,
    C: Token,
    G1: FnMut(&C) -> usize + Send,
    G2: FnMut(&C) -> usize + Send,
{
    /// Creates a new control-driven zip.
    pub fn new(
        name: impl Into<String>,
        gammas: (G1, G2),
        inputs: (InPort<A>, InPort<B>),
        control: InPort<C>,
        oport: OutPort<(Vec<A>, Vec<B>)>,
    ) -> Self {
        let (gamma1, gamma2) = gammas;
        let (iport1, iport2) = inputs;
        Self {
            name: name.into(),
            gamma1,
            gamma2,
            iport1,
            iport2,
            control,
            oport,
            vals: None,
        }
    }
}

impl<A, B, C, G1, G2> Process for ZipU<A, B, C, G1, G2>
where
    A: Token,
    B: Token,
    C: Token,
    G1: FnMut(&C) -> usize + Send,
    G2: FnMut(&C) -> usize + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "UT::zipU"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let Some(c) = self.control.peek() else {
            return Ok(self.control.status(1).flow());
        };
        let (n1, n2) = ((self.gamma1)(&c), (self.gamma2)(&c));
        let status = Availability::all([self.iport1.status(n1), self.iport2.status(n2)]);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.control.read()?;
        self.vals = Some((self.iport1.read_n(n1)?, self.iport2.read_n(n2)?));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(v) = self.vals.take() {
            self.oport.write(v);
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport1, &self.iport2, &self.control]
    }
}

/// Splits tuples of vectors into two token streams.
pub struct Unzip<A, B> {
    name: String,
    iport: InPort<(Vec<A>, Vec<B>)>,
    oport1: OutPort<A>,
    oport2: OutPort<B>,
    val: Option<(Vec<A>, Vec<B>)>,
}

impl<A: Token, B: Token> Unzip<A, B> {
    /// Creates a new UT unzip.
    pub fn new(name: impl Into<String>, iport: InPort<(Vec<A>, Vec<B>)>, oport1: OutPort<A>, oport2: OutPort<B>) -> Self {
        Self {
            name: name.into(),
            iport,
            oport1,
            oport2,
            val: None,
        }
    }
}

impl<A: Token, B: Token> Process for Unzip<A, B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "UT::unzip"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.val = Some(read_or_return!(self.iport));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some((a, b)) = self.val.take() {
            self.oport1.write_all(a);
            self.oport2.write_all(b);
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport1, &mut self.oport2]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport]
    }
}

/// Copies its input to every signal bound to its output.
pub struct Fanout<T> {
    name: String,
    iport: InPort<T>,
    oport: OutPort<T>,
    val: Option<T>,
}

impl<T: Token> Fanout<T> {
    /// Creates a new UT fanout.
    pub fn new(name: impl Into<String>, iport: InPort<T>, oport: OutPort<T>) -> Self {
        Self {
            name: name.into(),
            iport,
            oport,
            val: None,
        }
    }
}

impl<T: Token> Process for Fanout<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "UT::fanout"
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
