//! The synchronous MoC.
//!
//! Every process reads exactly one token from each input and writes
//! exactly one token to each output per evaluation cycle. Tokens are
//! [`AbstExt`] values, so "nothing happened in this cycle" is written as
//! an absent token rather than by skipping a write.
//!
//! User functions see and produce absent-extended values; they decide
//! themselves how absence propagates.
//!
//! # Example
//!
//! ```
//! use forsyde::{AbstExt, Simulation};
//! use forsyde::moc::sy;
//!
//! let mut sim = Simulation::new();
//! let input = sim.signal("input");
//! let acc = sim.signal("acc");
//!
//! sim.add(sy::VSource::new("src", vec![1, 2, 3], input.writer().unwrap()));
//! // Running sum, emitted one cycle late.
//! sim.add(sy::Moore::new(
//!     "sum",
//!     |s: &i32, x: &AbstExt<i32>| s + x.from_abst_ext(0),
//!     |s: &i32| AbstExt::present(*s),
//!     0,
//!     input.reader().unwrap(),
//!     acc.writer().unwrap(),
//! ));
//!
//! sim.run().unwrap();
//! let sums: Vec<i32> = acc.contents().into_iter().map(|v| v.from_abst_ext(-1)).collect();
//! assert_eq!(sums, vec![0, 1, 3]);
//! ```

use crate::abst_ext::AbstExt;
use crate::error::{SimError, SimResult};
use crate::moc::{all_ready, TakeCounter};
use crate::process::{arg, Flow, Process};
use crate::signal::{Availability, InPort, InputPort, OutPort, OutputPort, Token};

/// Input port of a synchronous process.
pub type SyIn<T> = InPort<AbstExt<T>>;
/// Output port of a synchronous process.
pub type SyOut<T> = OutPort<AbstExt<T>>;

/// Combinational process with one input.
pub struct Comb<I, O, F> {
    name: String,
    func: F,
    iport: SyIn<I>,
    oport: SyOut<O>,
    ival: Option<AbstExt<I>>,
    oval: Option<AbstExt<O>>,
}

impl<I, O, F> Comb<I, O, F>
where
    I: Token,
    O: Token,
    F: FnMut(&AbstExt<I>) -> AbstExt<O> + Send,
{
    /// Creates a new SY combinator.
    pub fn new(name: impl Into<String>, func: F, iport: SyIn<I>, oport: SyOut<O>) -> Self {
        Self {
            name: name.into(),
            func,
            iport,
            oport,
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
        "SY::comb"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.ival = Some(read_or_return!(self.iport));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some(i) = self.ival.take() {
            self.oval = Some((self.func)(&i));
        }
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(o) = self.oval.take() {
            self.oport.write(o);
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

/// Combinational process with two inputs.
pub struct Comb2<I1, I2, O, F> {
    name: String,
    func: F,
    iport1: SyIn<I1>,
    iport2: SyIn<I2>,
    oport: SyOut<O>,
    ivals: Option<(AbstExt<I1>, AbstExt<I2>)>,
    oval: Option<AbstExt<O>>,
}

impl<I1, I2, O, F> Comb2<I1, I2, O, F>
where
    I1: Token,
    I2: Token,
    O: Token,
    F: FnMut(&AbstExt<I1>, &AbstExt<I2>) -> AbstExt<O> + Send,
{
    /// Creates a new two-input SY combinator.
    pub fn new(
        name: impl Into<String>,
        func: F,
        iport1: SyIn<I1>,
        iport2: SyIn<I2>,
        oport: SyOut<O>,
    ) -> Self {
        Self {
            name: name.into(),
            func,
            iport1,
            iport2,
            oport,
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
        "SY::comb2"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = Availability::all([self.iport1.status(1), self.iport2.status(1)]);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.ivals = Some((self.iport1.read()?, self.iport2.read()?));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some((a, b)) = self.ivals.take() {
            self.oval = Some((self.func)(&a, &b));
        }
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(o) = self.oval.take() {
            self.oport.write(o);
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport1, &self.iport2]
    }
}

/// Combinational process with three inputs.
pub struct Comb3<I1, I2, I3, O, F> {
    name: String,
    func: F,
    iport1: SyIn<I1>,
    iport2: SyIn<I2>,
    iport3: SyIn<I3>,
    oport: SyOut<O>,
    ivals: Option<(AbstExt<I1>, AbstExt<I2>, AbstExt<I3>)>,
    oval: Option<AbstExt<O>>,
}

impl<I1, I2, I3, O, F> Comb3<I1, I2, I3, O, F>
where
    I1: Token,
    I2: Token,
    I3: Token,
    O: Token,
    F: FnMut(&AbstExt<I1>, &AbstExt<I2>, &AbstExt<I3>) -> AbstExt<O> + Send,
{
    /// Creates a new three-input SY combinator.
    pub fn new(
        name: impl Into<String>,
        func: F,
        iport1: SyIn<I1>,
        iport2: SyIn<I2>,
        iport3: SyIn<I3>,
        oport: SyOut<O>,
    ) -> Self {
        Self {
            name: name.into(),
            func,
            iport1,
            iport2,
            iport3,
            oport,
            ivals: None,
            oval: None,
        }
    }
}

impl<I1, I2, I3, O, F> Process for Comb3<I1, I2, I3, O, F>
where
    I1: Token,
    I2: Token,
    I3: Token,
    O: Token,
    F: FnMut(&AbstExt<I1>, &AbstExt<I2>, &AbstExt<I3>) -> AbstExt<O> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "SY::comb3"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = Availability::all([
            self.iport1.status(1),
            self.iport2.status(1),
            self.iport3.status(1),
        ]);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.ivals = Some((
            self.iport1.read()?,
            self.iport2.read()?,
            self.iport3.read()?,
        ));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some((a, b, c)) = self.ivals.take() {
            self.oval = Some((self.func)(&a, &b, &c));
        }
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(o) = self.oval.take() {
            self.oport.write(o);
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport1, &self.iport2, &self.iport3]
    }
}

/// Combinational process with four inputs.
pub struct Comb4<I1, I2, I3, I4, O, F> {
    name: String,
    func: F,
    iport1: SyIn<I1>,
    iport2: SyIn<I2>,
    iport3: SyIn<I3>,
    iport4: SyIn<I4>,
    oport: SyOut<O>,
    ivals: Option<(AbstExt<I1>, AbstExt<I2>, AbstExt<I3>, AbstExt<I4>)>,
    oval: Option<AbstExt<O>>,
}

impl<I1, I2, I3, I4, O, F> Comb4<I1, I2, I3, I4, O, F>
where
    I1: Token,
    I2: Token,
    I3: Token,
    I4: Token,
    O: Token,
    F: FnMut(&AbstExt<I1>, &AbstExt<I2>, &AbstExt<I3>, &AbstExt<I4>) -> AbstExt<O> + Send,
{
    /// Creates a new four-input SY combinator.
    pub fn new(
        name: impl Into<String>,
        func: F,
        inputs: (SyIn<I1>, SyIn<I2>, SyIn<I3>, SyIn<I4>),
        oport: SyOut<O>,
    ) -> Self {
        let (iport1, iport2, iport3, iport4) = inputs;
        Self {
            name: name.into(),
            func,
            iport1,
            iport2,
            iport3,
            iport4,
            oport,
            ivals: None,
            oval: None,
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
    F: FnMut(&AbstExt<I1>, &AbstExt<I2>, &AbstExt<I3>, &AbstExt<I4>) -> AbstExt<O> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "SY::comb4"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = Availability::all([
            self.iport1.status(1),
            self.iport2.status(1),
            self.iport3.status(1),
            self.iport4.status(1),
        ]);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.ivals = Some((
            self.iport1.read()?,
            self.iport2.read()?,
            self.iport3.read()?,
            self.iport4.read()?,
        ));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some((a, b, c, d)) = self.ivals.take() {
            self.oval = Some((self.func)(&a, &b, &c, &d));
        }
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(o) = self.oval.take() {
            self.oport.write(o);
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport1, &self.iport2, &self.iport3, &self.iport4]
    }
}

/// Combinational process over N inputs of the same type.
pub struct CombN<I, O, F> {
    name: String,
    func: F,
    iports: Vec<SyIn<I>>,
    oport: SyOut<O>,
    ivals: Vec<AbstExt<I>>,
    oval: Option<AbstExt<O>>,
}

impl<I, O, F> CombN<I, O, F>
where
    I: Token,
    O: Token,
    F: FnMut(&[AbstExt<I>]) -> AbstExt<O> + Send,
{
    /// Creates a new N-input SY combinator.
    pub fn new(name: impl Into<String>, func: F, iports: Vec<SyIn<I>>, oport: SyOut<O>) -> Self {
        Self {
            name: name.into(),
            func,
            iports,
            oport,
            ivals: Vec::new(),
            oval: None,
        }
    }
}

impl<I, O, F> Process for CombN<I, O, F>
where
    I: Token,
    O: Token,
    F: FnMut(&[AbstExt<I>]) -> AbstExt<O> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "SY::combN"
    }

    fn init(&mut self) -> SimResult<()> {
        if self.iports.is_empty() {
            return Err(SimError::process(&self.name, "needs at least one input"));
        }
        Ok(())
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = all_ready(self.iports.iter().map(|p| (p, 1)));
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.ivals = self
            .iports
            .iter()
            .map(|p| p.read())
            .collect::<SimResult<Vec<_>>>()?;
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        self.oval = Some((self.func)(&self.ivals));
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(o) = self.oval.take() {
            self.oport.write(o);
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
}

/// Unit delay: emits `init` first, then forwards its input.
pub struct Delay<T> {
    name: String,
    init_val: AbstExt<T>,
    iport: SyIn<T>,
    oport: SyOut<T>,
    val: Option<AbstExt<T>>,
}

impl<T: Token> Delay<T> {
    /// Creates a new SY delay.
    pub fn new(name: impl Into<String>, init_val: AbstExt<T>, iport: SyIn<T>, oport: SyOut<T>) -> Self {
        Self {
            name: name.into(),
            init_val,
            iport,
            oport,
            val: None,
        }
    }
}

impl<T: Token> Process for Delay<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "SY::delay"
    }

    fn init(&mut self) -> SimResult<()> {
        self.oport.write(self.init_val.clone());
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
}

/// `n`-cycle delay: emits `n` copies of `init` first.
pub struct DelayN<T> {
    name: String,
    init_val: AbstExt<T>,
    n: usize,
    iport: SyIn<T>,
    oport: SyOut<T>,
    val: Option<AbstExt<T>>,
}

impl<T: Token> DelayN<T> {
    /// Creates a new SY delay of `n` cycles.
    pub fn new(
        name: impl Into<String>,
        init_val: AbstExt<T>,
        n: usize,
        iport: SyIn<T>,
        oport: SyOut<T>,
    ) -> Self {
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
        "SY::delayn"
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

/// Moore machine: the output depends on the current state only.
pub struct Moore<I, S, O, NS, OD> {
    name: String,
    ns_func: NS,
    od_func: OD,
    state: S,
    iport: SyIn<I>,
    oport: SyOut<O>,
    ival: Option<AbstExt<I>>,
    oval: Option<AbstExt<O>>,
}

impl<I, S, O, NS, OD> Moore<I, S, O, NS, OD>
where
    I: Token,
    S: Send + 'static,
    O: Token,
    NS: FnMut(&S, &AbstExt<I>) -> S + Send,
    OD: FnMut(&S) -> AbstExt<O> + Send,
{
    /// Creates a new SY Moore machine.
    pub fn new(
        name: impl Into<String>,
        ns_func: NS,
        od_func: OD,
        init_st: S,
        iport: SyIn<I>,
        oport: SyOut<O>,
    ) -> Self {
        Self {
            name: name.into(),
            ns_func,
            od_func,
            state: init_st,
            iport,
            oport,
            ival: None,
            oval: None,
        }
    }
}

impl<I, S, O, NS, OD> Process for Moore<I, S, O, NS, OD>
where
    I: Token,
    S: Send + 'static,
    O: Token,
    NS: FnMut(&S, &AbstExt<I>) -> S + Send,
    OD: FnMut(&S) -> AbstExt<O> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "SY::moore"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.ival = Some(read_or_return!(self.iport));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some(i) = self.ival.take() {
            self.oval = Some((self.od_func)(&self.state));
            self.state = (self.ns_func)(&self.state, &i);
        }
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(o) = self.oval.take() {
            self.oport.write(o);
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

/// Mealy machine: the output depends on the state and the input.
pub struct Mealy<I, S, O, NS, OD> {
    name: String,
    ns_func: NS,
    od_func: OD,
    state: S,
    iport: SyIn<I>,
    oport: SyOut<O>,
    ival: Option<AbstExt<I>>,
    oval: Option<AbstExt<O>>,
}

impl<I, S, O, NS, OD> Mealy<I, S, O, NS, OD>
where
    I: Token,
    S: Send + 'static,
    O: Token,
    NS: FnMut(&S, &AbstExt<I>) -> S + Send,
    OD: FnMut(&S, &AbstExt<I>) -> AbstExt<O> + Send,
{
    /// Creates a new SY Mealy machine.
    pub fn new(
        name: impl Into<String>,
        ns_func: NS,
        od_func: OD,
        init_st: S,
        iport: SyIn<I>,
        oport: SyOut<O>,
    ) -> Self {
        Self {
            name: name.into(),
            ns_func,
            od_func,
            state: init_st,
            iport,
            oport,
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
        "SY::mealy"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.ival = Some(read_or_return!(self.iport));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some(i) = self.ival.take() {
            self.oval = Some((self.od_func)(&self.state, &i));
            self.state = (self.ns_func)(&self.state, &i);
        }
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(o) = self.oval.take() {
            self.oport.write(o);
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

/// Replaces absent tokens with a fixed value.
pub struct Fill<T> {
    name: String,
    def_val: T,
    iport: SyIn<T>,
    oport: SyOut<T>,
    val: Option<AbstExt<T>>,
}

impl<T: Token> Fill<T> {
    /// Creates a new SY fill.
    pub fn new(name: impl Into<String>, def_val: T, iport: SyIn<T>, oport: SyOut<T>) -> Self {
        Self {
            name: name.into(),
            def_val,
            iport,
            oport,
            val: None,
        }
    }
}

impl<T: Token> Process for Fill<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "SY::fill"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.val = Some(read_or_return!(self.iport));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some(v) = self.val.as_mut() {
            if v.is_absent() {
                v.set_val(self.def_val.clone());
            }
        }
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

/// Replaces absent tokens with the last present value seen.
pub struct Hold<T> {
    name: String,
    last: T,
    iport: SyIn<T>,
    oport: SyOut<T>,
    val: Option<AbstExt<T>>,
}

impl<T: Token> Hold<T> {
    /// `init_val` is used until the first present token arrives.
    pub fn new(name: impl Into<String>, init_val: T, iport: SyIn<T>, oport: SyOut<T>) -> Self {
        Self {
            name: name.into(),
            last: init_val,
            iport,
            oport,
            val: None,
        }
    }
}

impl<T: Token> Process for Hold<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "SY::hold"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.val = Some(read_or_return!(self.iport));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some(v) = self.val.as_mut() {
            match v.value() {
                Some(x) => self.last = x.clone(),
                None => v.set_val(self.last.clone()),
            }
        }
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

/// Emits the same token every cycle, `take` times (0 = forever).
pub struct Constant<T> {
    name: String,
    value: AbstExt<T>,
    count: TakeCounter,
    oport: SyOut<T>,
}

impl<T: Token> Constant<T> {
    /// Creates a new SY constant.
    pub fn new(name: impl Into<String>, value: AbstExt<T>, take: u64, oport: SyOut<T>) -> Self {
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
        "SY::constant"
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

/// Emits `init`, then repeatedly applies `func` to the last output,
/// `take` tokens in total (0 = forever).
pub struct Source<T, F> {
    name: String,
    func: F,
    state: AbstExt<T>,
    count: TakeCounter,
    oport: SyOut<T>,
}

impl<T, F> Source<T, F>
where
    T: Token,
    F: FnMut(&AbstExt<T>) -> AbstExt<T> + Send,
{
    /// Creates a new SY source.
    pub fn new(name: impl Into<String>, func: F, init_val: AbstExt<T>, take: u64, oport: SyOut<T>) -> Self {
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
    F: FnMut(&AbstExt<T>) -> AbstExt<T> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "SY::source"
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

/// Emits the tokens of a vector, one per cycle, then terminates.
pub struct VSource<T> {
    name: String,
    values: std::vec::IntoIter<AbstExt<T>>,
    next: Option<AbstExt<T>>,
    oport: SyOut<T>,
}

impl<T: Token> VSource<T> {
    /// Emits every value as a present token.
    pub fn new(name: impl Into<String>, values: Vec<T>, oport: SyOut<T>) -> Self {
        Self::with_absents(name, values.into_iter().map(AbstExt::Present).collect(), oport)
    }

    /// Emits the tokens as given, absent ones included.
    pub fn with_absents(name: impl Into<String>, values: Vec<AbstExt<T>>, oport: SyOut<T>) -> Self {
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
        "SY::vsource"
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
    iport: SyIn<T>,
    val: Option<AbstExt<T>>,
}

impl<T, F> Sink<T, F>
where
    T: Token,
    F: FnMut(&AbstExt<T>) + Send,
{
    /// Creates a new SY sink.
    pub fn new(name: impl Into<String>, func: F, iport: SyIn<T>) -> Self {
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
    F: FnMut(&AbstExt<T>) + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "SY::sink"
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

/// Joins two signals into a signal of pairs. The output is always present.
pub struct Zip<A, B> {
    name: String,
    iport1: SyIn<A>,
    iport2: SyIn<B>,
    oport: SyOut<(AbstExt<A>, AbstExt<B>)>,
    vals: Option<(AbstExt<A>, AbstExt<B>)>,
}

impl<A: Token, B: Token> Zip<A, B> {
    /// Creates a new SY zip.
    pub fn new(
        name: impl Into<String>,
        iport1: SyIn<A>,
        iport2: SyIn<B>,
        oport: SyOut<(AbstExt<A>, AbstExt<B>)>,
    ) -> Self {
        Self {
            name: name.into(),
            iport1,
            iport2,
            oport,
            vals: None,
        }
    }
}

impl<A: Token, B: Token> Process for Zip<A, B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "SY::zip"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = Availability::all([self.iport1.status(1), self.iport2.status(1)]);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.vals = Some((self.iport1.read()?, self.iport2.read()?));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(pair) = self.vals.take() {
            self.oport.write(AbstExt::Present(pair));
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport1, &self.iport2]
    }
}

/// Splits a signal of pairs. An absent pair yields two absent tokens.
pub struct Unzip<A, B> {
    name: String,
    iport: SyIn<(AbstExt<A>, AbstExt<B>)>,
    oport1: SyOut<A>,
    oport2: SyOut<B>,
    val: Option<AbstExt<(AbstExt<A>, AbstExt<B>)>>,
}

impl<A: Token, B: Token> Unzip<A, B> {
    /// Creates a new SY unzip.
    pub fn new(
        name: impl Into<String>,
        iport: SyIn<(AbstExt<A>, AbstExt<B>)>,
        oport1: SyOut<A>,
        oport2: SyOut<B>,
    ) -> Self {
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
        "SY::unzip"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.val = Some(read_or_return!(self.iport));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        match self.val.take() {
            Some(AbstExt::Present((a, b))) => {
                self.oport1.write(a);
                self.oport2.write(b);
            }
            Some(AbstExt::Absent) => {
                self.oport1.write(AbstExt::Absent);
                self.oport2.write(AbstExt::Absent);
            }
            None => {}
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

/// Joins N signals of one type into a signal of vectors.
pub struct ZipN<T> {
    name: String,
    iports: Vec<SyIn<T>>,
    oport: SyOut<Vec<AbstExt<T>>>,
    vals: Option<Vec<AbstExt<T>>>,
}

impl<T: Token> ZipN<T> {
    /// Creates a new N-input SY zip.
    pub fn new(name: impl Into<String>, iports: Vec<SyIn<T>>, oport: SyOut<Vec<AbstExt<T>>>) -> Self {
        Self {
            name: name.into(),
            iports,
            oport,
            vals: None,
        }
    }
}

impl<T: Token> Process for ZipN<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "SY::zipN"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = all_ready(self.iports.iter().map(|p| (p, 1)));
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.vals = Some(
            self.iports
                .iter()
                .map(|p| p.read())
                .collect::<SimResult<Vec<_>>>()?,
        );
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(v) = self.vals.take() {
            self.oport.write(AbstExt::Present(v));
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        self.iports.iter().map(|p| p as &dyn InputPort).collect()
    }
}

/// Splits a signal of vectors over N outputs.
pub struct UnzipN<T> {
    name: String,
    iport: SyIn<Vec<AbstExt<T>>>,
    oports: Vec<SyOut<T>>,
    val: Option<AbstExt<Vec<AbstExt<T>>>>,
}

impl<T: Token> UnzipN<T> {
    /// Creates a new N-output SY unzip.
    pub fn new(name: impl Into<String>, iport: SyIn<Vec<AbstExt<T>>>, oports: Vec<SyOut<T>>) -> Self {
        Self {
            name: name.into(),
            iport,
            oports,
            val: None,
        }
    }
}

impl<T: Token> Process for UnzipN<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "SY::unzipN"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.val = Some(read_or_return!(self.iport));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        if let Some(AbstExt::Present(v)) = &self.val {
            if v.len() != self.oports.len() {
                return Err(SimError::process(
                    &self.name,
                    format!("vector of {} for {} outputs", v.len(), self.oports.len()),
                ));
            }
        }
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        match self.val.take() {
            Some(AbstExt::Present(v)) => {
                for (port, x) in self.oports.iter_mut().zip(v) {
                    port.write(x);
                }
            }
            Some(AbstExt::Absent) => {
                for port in &mut self.oports {
                    port.write(AbstExt::Absent);
                }
            }
            None => {}
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        self.oports
            .iter_mut()
            .map(|p| p as &mut dyn OutputPort)
            .collect()
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport]
    }
}

/// Collects `samples` tokens into one vector, emitting absent tokens
/// while the group fills.
pub struct Group<T> {
    name: String,
    samples: usize,
    iport: SyIn<T>,
    oport: SyOut<Vec<AbstExt<T>>>,
    buffer: Vec<AbstExt<T>>,
    out: Option<AbstExt<Vec<AbstExt<T>>>>,
}

impl<T: Token> Group<T> {
    /// Creates a new SY grouping of `samples` cycles.
    pub fn new(name: impl Into<String>, samples: usize, iport: SyIn<T>, oport: SyOut<Vec<AbstExt<T>>>) -> Self {
        Self {
            name: name.into(),
            samples,
            iport,
            oport,
            buffer: Vec::with_capacity(samples),
            out: None,
        }
    }
}

impl<T: Token> Process for Group<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "SY::group"
    }

    fn init(&mut self) -> SimResult<()> {
        crate::moc::check_positive(&self.name, "samples", self.samples as u64)
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let v = read_or_return!(self.iport);
        self.buffer.push(v);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        self.out = Some(if self.buffer.len() == self.samples {
            AbstExt::Present(std::mem::take(&mut self.buffer))
        } else {
            AbstExt::Absent
        });
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(v) = self.out.take() {
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
        vec![arg("samples", self.samples)]
    }
}

/// Copies its input to every signal bound to its output.
pub struct Fanout<T> {
    name: String,
    iport: SyIn<T>,
    oport: SyOut<T>,
    val: Option<AbstExt<T>>,
}

impl<T: Token> Fanout<T> {
    /// Creates a new SY fanout.
    pub fn new(name: impl Into<String>, iport: SyIn<T>, oport: SyOut<T>) -> Self {
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
        "SY::fanout"
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
