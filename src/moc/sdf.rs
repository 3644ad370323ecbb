//! The synchronous dataflow MoC.
//!
//! Each firing consumes a fixed number of tokens from every input and
//! produces a fixed number on every output. The rates are constructor
//! arguments; a firing waits until all its input tokens are queued, and
//! a function returning the wrong number of outputs is a
//! [`SimError::RateMismatch`].
//!
//! # Example
//!
//! ```
//! use forsyde::Simulation;
//! use forsyde::moc::sdf;
//!
//! let mut sim = Simulation::new();
//! let input = sim.signal("input");
//! let pairs = sim.signal("pairs");
//!
//! sim.add(sdf::VSource::new("src", vec![1, 2, 3, 4], input.writer().unwrap()));
//! // Two tokens in, one out.
//! sim.add(sdf::Comb::new(
//!     "sum2",
//!     |xs: &[i32]| vec![xs[0] + xs[1]],
//!     1,
//!     2,
//!     input.reader().unwrap(),
//!     pairs.writer().unwrap(),
//! ));
//!
//! sim.run().unwrap();
//! assert_eq!(pairs.contents(), vec![3, 7]);
//! ```

use crate::error::{SimError, SimResult};
use crate::moc::{all_ready, check_positive, check_rate, TakeCounter};
use crate::process::{arg, Flow, Process};
use crate::signal::{Availability, InPort, InputPort, OutPort, OutputPort, Token};

/// Combinational actor with one input.
pub struct Comb<I, O, F> {
    name: String,
    func: F,
    o_toks: usize,
    i_toks: usize,
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
    /// Creates a new SDF combinator. Note the rate order: `o_toks` comes
    /// before `i_toks`.
    pub fn new(
        name: impl Into<String>,
        func: F,
        o_toks: usize,
        i_toks: usize,
        iport: InPort<I>,
        oport: OutPort<O>,
    ) -> Self {
        Self {
            name: name.into(),
            func,
            o_toks,
            i_toks,
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
        "SDF::comb"
    }

    fn init(&mut self) -> SimResult<()> {
        check_positive(&self.name, "o_toks", self.o_toks as u64)?;
        check_positive(&self.name, "i_toks", self.i_toks as u64)
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = self.iport.status(self.i_toks);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.ivals = self.iport.read_n(self.i_toks)?;
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        self.ovals = (self.func)(&self.ivals);
        check_rate(&self.name, self.o_toks, self.ovals.len())
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
        vec![arg("o_toks", self.o_toks), arg("i_toks", self.i_toks)]
    }
}

/// Combinational actor with two inputs.
pub struct Comb2<I1, I2, O, F> {
    name: String,
    func: F,
    o_toks: usize,
    i1_toks: usize,
    i2_toks: usize,
    iport1: InPort<I1>,
    iport2: InPort<I2>,
    oport: OutPort<O>,
    ivals1: Vec<I1>,
    ivals2: Vec<I2>,
    ovals: Vec<O>,
}

impl<I1, I2, O, F> Comb2<I1, I2, O, F>
where
    I1: Token,
    I2: Token,
    O: Token,
    F: FnMut(&[I1], &[I2]) -> Vec<O> + Send,
{
    /// Creates a new two-input SDF combinator; the output rate comes first.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        func: F,
        o_toks: usize,
        i1_toks: usize,
        i2_toks: usize,
        iport1: InPort<I1>,
        iport2: InPort<I2>,
        oport: OutPort<O>,
    ) -> Self {
        Self {
            name: name.into(),
            func,
            o_toks,
            i1_toks,
            i2_toks,
            iport1,
            iport2,
            oport,
            ivals1: Vec::new(),
            ivals2: Vec::new(),
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
        "SDF::comb2"
    }

    fn init(&mut self) -> SimResult<()> {
        check_positive(&self.name, "o_toks", self.o_toks as u64)?;
        check_positive(&self.name, "i1_toks", self.i1_toks as u64)?;
        check_positive(&self.name, "i2_toks", self.i2_toks as u64)
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = Availability::all([
            self.iport1.status(self.i1_toks),
            self.iport2.status(self.i2_toks),
        ]);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.ivals1 = self.iport1.read_n(self.i1_toks)?;
        self.ivals2 = self.iport2.read_n(self.i2_toks)?;
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        self.ovals = (self.func)(&self.ivals1, &self.ivals2);
        check_rate(&self.name, self.o_toks, self.ovals.len())
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
        vec![
            arg("o_toks", self.o_toks),
            arg("i1_toks", self.i1_toks),
            arg("i2_toks", self.i2_toks),
        ]
    }
}

/// Combinational actor with three inputs.
///
/// Rates are given as `(o_toks, [i1_toks, i2_toks, i3_toks])`.
pub struct Comb3<I1, I2, I3, O, F> {
    name: String,
    func: F,
    o_toks: usize,
    i_toks: [usize; 3],
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
    /// Creates a new three-input SDF combinator; the output rate comes first.
    pub fn new(
        name: impl Into<String>,
        func: F,
        o_toks: usize,
        i_toks: [usize; 3],
        inputs: (InPort<I1>, InPort<I2>, InPort<I3>),
        oport: OutPort<O>,
    ) -> Self {
        let (iport1, iport2, iport3) = inputs;
        Self {
            name: name.into(),
            func,
            o_toks,
            i_toks,
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
        "SDF::comb3"
    }

    fn init(&mut self) -> SimResult<()> {
        check_positive(&self.name, "o_toks", self.o_toks as u64)?;
        for n in self.i_toks {
            check_positive(&self.name, "i_toks", n as u64)?;
        }
        Ok(())
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let [n1, n2, n3] = self.i_toks;
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
        check_rate(&self.name, self.o_toks, self.ovals.len())
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
        vec![arg("o_toks", self.o_toks), arg("i_toks", self.i_toks)]
    }
}

/// Combinational actor with four inputs.
pub struct Comb4<I1, I2, I3, I4, O, F> {
    name: String,
    func: F,
    o_toks: usize,
    i_toks: [usize; 4],
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
    /// Creates a new four-input SDF combinator.
    pub fn new(
        name: impl Into<String>,
        func: F,
        o_toks: usize,
        i_toks: [usize; 4],
        inputs: (InPort<I1>, InPort<I2>, InPort<I3>, InPort<I4>),
        oport: OutPort<O>,
    ) -> Self {
        let (iport1, iport2, iport3, iport4) = inputs;
        Self {
            name: name.into(),
            func,
            o_toks,
            i_toks,
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
        "SDF::comb4"
    }

    fn init(&mut self) -> SimResult<()> {
        check_positive(&self.name, "o_toks", self.o_toks as u64)?;
        for n in self.i_toks {
            check_positive(&self.name, "i_toks", n as u64)?;
        }
        Ok(())
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let [n1, n2, n3, n4] = self.i_toks;
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
        check_rate(&self.name, self.o_toks, self.ovals.len())
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
        vec![arg("o_toks", self.o_toks), arg("i_toks", self.i_toks)]
    }
}

/// Initial tokens followed by the input stream.
pub struct DelayN<T> {
    name: String,
    init_val: T,
    n: usize,
    iport: InPort<T>,
    oport: OutPort<T>,
    val: Option<T>,
}

impl<T: Token> DelayN<T> {
    /// Creates a new SDF delay emitting `n` copies of `init_val` first.
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
            "SDF::delay"
        } else {
            "SDF::delayn"
        }
    }

    fn init(&mut self) -> SimResult<()> {
        for _ in 0..self.n {
            self.oport.write(self.init_val.clone());
        }
        Ok(())
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = self.iport.status(1);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.val = Some(self.iport.read()?);
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
    // SDF delays only differ by their token count, so `Delay` builds a
    // single-token `DelayN`.
    /// Creates a new single-token SDF delay.
    #[allow(clippy::new_ret_no_self)]
    pub fn new<T: Token>(name: impl Into<String>, init_val: T, iport: InPort<T>, oport: OutPort<T>) -> DelayN<T> {
        DelayN::new(name, init_val, 1, iport, oport)
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
    /// Creates a new SDF constant.
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
        "SDF::constant"
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

/// Emits `init` then `f(init)`, `f(f(init))`, ..., `take` tokens in
/// total (0 = forever).
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
    /// Creates a new SDF source.
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
        "SDF::source"
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

/// Emits the elements of a vector, one per firing.
pub struct VSource<T> {
    name: String,
    values: std::vec::IntoIter<T>,
    next: Option<T>,
    oport: OutPort<T>,
}

impl<T: Token> VSource<T> {
    /// Creates a new SDF source from a vector.
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
        "SDF::vsource"
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
    /// Creates a new SDF sink.
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
        "SDF::sink"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = self.iport.status(1);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.val = Some(self.iport.read()?);
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

/// Groups `i1_toks` and `i2_toks` tokens into one tuple per firing.
pub struct Zip<A, B> {
    name: String,
    i1_toks: usize,
    i2_toks: usize,
    iport1: InPort<A>,
    iport2: InPort<B>,
    oport: OutPort<(Vec<A>, Vec<B>)>,
    vals: Option<(Vec<A>, Vec<B>)>,
}

impl<A: Token, B: Token> Zip<A, B> {
    /// Creates a new SDF zip.
    pub fn new(
        name: impl Into<String>,
        i1_toks: usize,
        i2_toks: usize,
        iport1: InPort<A>,
        iport2: InPort<B>,
        oport: OutPort<(Vec<A>, Vec<B>)>,
    ) -> Self {
        Self {
            name: name.into(),
            i1_toks,
            i2_toks,
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
        "SDF::zip"
    }

    fn init(&mut self) -> SimResult<()> {
        check_positive(&self.name, "i1_toks", self.i1_toks as u64)?;
        check_positive(&self.name, "i2_toks", self.i2_toks as u64)
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = Availability::all([
            self.iport1.status(self.i1_toks),
            self.iport2.status(self.i2_toks),
        ]);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.vals = Some((
            self.iport1.read_n(self.i1_toks)?,
            self.iport2.read_n(self.i2_toks)?,
        ));
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
        vec![arg("i1_toks", self.i1_toks), arg("i2_toks", self.i2_toks)]
    }
}

/// Splits tuples into two token streams of `o1_toks` and `o2_toks`
/// tokens per firing.
pub struct Unzip<A, B> {
    name: String,
    o1_toks: usize,
    o2_toks: usize,
    iport: InPort<(Vec<A>, Vec<B>)>,
    oport1: OutPort<A>,
    oport2: OutPort<B>,
    val: Option<(Vec<A>, Vec<B>)>,
}

impl<A: Token, B: Token> Unzip<A, B> {
    /// Creates a new SDF unzip.
    pub fn new(
        name: impl Into<String>,
        o1_toks: usize,
        o2_toks: usize,
        iport: InPort<(Vec<A>, Vec<B>)>,
        oport1: OutPort<A>,
        oport2: OutPort<B>,
    ) -> Self {
        Self {
            name: name.into(),
            o1_toks,
            o2_toks,
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
        "SDF::unzip"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = self.iport.status(1);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.val = Some(self.iport.read()?);
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        match &self.val {
            Some((a, b)) => {
                check_rate(&self.name, self.o1_toks, a.len())?;
                check_rate(&self.name, self.o2_toks, b.len())
            }
            None => Err(SimError::process(&self.name, "fired without input")),
        }
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

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("o1_toks", self.o1_toks), arg("o2_toks", self.o2_toks)]
    }
}

/// Groups `i_toks[i]` tokens from each of N inputs into one vector of
/// vectors per firing.
pub struct ZipN<T> {
    name: String,
    i_toks: Vec<usize>,
    iports: Vec<InPort<T>>,
    oport: OutPort<Vec<Vec<T>>>,
    vals: Option<Vec<Vec<T>>>,
}

impl<T: Token> ZipN<T> {
    /// Creates a new N-input zip; `i_toks` holds one rate per input.
    pub fn new(name: impl Into<String>, i_toks: Vec<usize>, iports: Vec<InPort<T>>, oport: OutPort<Vec<Vec<T>>>) -> Self {
        Self {
            name: name.into(),
            i_toks,
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
        "SDF::zipN"
    }

    fn init(&mut self) -> SimResult<()> {
        check_rate(&self.name, self.iports.len(), self.i_toks.len())?;
        for n in &self.i_toks {
            check_positive(&self.name, "i_toks", *n as u64)?;
        }
        Ok(())
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = all_ready(self.iports.iter().zip(self.i_toks.iter().copied()));
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.vals = Some(
            self.iports
                .iter()
                .zip(&self.i_toks)
                .map(|(p, n)| p.read_n(*n))
                .collect::<SimResult<Vec<_>>>()?,
        );
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
        self.iports.iter().map(|p| p as &dyn InputPort).collect()
    }

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("i_toks", &self.i_toks)]
    }
}

/// Splits vectors of vectors over N outputs, `o_toks[i]` tokens to
/// output `i` per firing.
pub struct UnzipN<T> {
    name: String,
    o_toks: Vec<usize>,
    iport: InPort<Vec<Vec<T>>>,
    oports: Vec<OutPort<T>>,
    val: Option<Vec<Vec<T>>>,
}

impl<T: Token> UnzipN<T> {
    /// Creates a new N-output unzip; `o_toks` holds one rate per output.
    pub fn new(name: impl Into<String>, o_toks: Vec<usize>, iport: InPort<Vec<Vec<T>>>, oports: Vec<OutPort<T>>) -> Self {
        Self {
            name: name.into(),
            o_toks,
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
        "SDF::unzipN"
    }

    fn init(&mut self) -> SimResult<()> {
        check_rate(&self.name, self.oports.len(), self.o_toks.len())
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.val = Some(read_or_return!(self.iport));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        let Some(v) = &self.val else {
            return Err(SimError::process(&self.name, "fired without input"));
        };
        check_rate(&self.name, self.o_toks.len(), v.len())?;
        for (expected, part) in self.o_toks.iter().zip(v) {
            check_rate(&self.name, *expected, part.len())?;
        }
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(v) = self.val.take() {
            for (port, part) in self.oports.iter_mut().zip(v) {
                port.write_all(part);
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
        vec![arg("o_toks", &self.o_toks)]
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
    /// Creates a new SDF fanout.
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
        "SDF::fanout"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = self.iport.status(1);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.val = Some(self.iport.read()?);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RunOutcome, Simulation};

    #[test]
    fn test_comb_waits_for_full_rate() {
        let mut sim = Simulation::new();
        let (i, o) = (sim.signal("i"), sim.signal("o"));
        // 5 tokens at rate 2: the last one is never consumed
        sim.add(VSource::new("src", vec![1, 2, 3, 4, 5], i.writer().unwrap()));
        sim.add(Comb::new(
            "avg",
            |xs: &[i32]| vec![xs.iter().sum::<i32>(); 3],
            3,
            2,
            i.reader().unwrap(),
            o.writer().unwrap(),
        ));
        let report = sim.run().unwrap();
        assert_eq!(report.outcome, RunOutcome::Finished);
        assert_eq!(o.contents(), vec![3, 3, 3, 7, 7, 7]);
        assert_eq!(i.len(), 1);
    }

    #[test]
    fn test_wrong_output_count_is_rate_mismatch() {
        let mut sim = Simulation::new();
        let (i, o) = (sim.signal("i"), sim.signal::<i32>("o"));
        sim.add(VSource::new("src", vec![1], i.writer().unwrap()));
        sim.add(Comb::new(
            "bad",
            |xs: &[i32]| xs.to_vec(),
            2,
            1,
            i.reader().unwrap(),
            o.writer().unwrap(),
        ));
        assert!(matches!(
            sim.run(),
            Err(SimError::RateMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_zero_rate_rejected_at_init() {
        let mut sim = Simulation::new();
        let (i, o) = (sim.signal::<i32>("i"), sim.signal::<i32>("o"));
        let _w = i.writer().unwrap();
        sim.add(Comb::new("zero", |xs: &[i32]| xs.to_vec(), 1, 0, i.reader().unwrap(), o.writer().unwrap()));
        assert!(matches!(sim.init(), Err(SimError::Process { .. })));
    }

    #[test]
    fn test_comb2_multirate() {
        let mut sim = Simulation::new();
        let (a, b, o) = (sim.signal("a"), sim.signal("b"), sim.signal("o"));
        sim.add(VSource::new("a", vec![1, 2, 3, 4], a.writer().unwrap()));
        sim.add(VSource::new("b", vec![10, 20], b.writer().unwrap()));
        sim.add(Comb2::new(
            "mix",
            |x: &[i32], y: &[i32]| vec![x[0] + x[1] + y[0]],
            1,
            2,
            1,
            a.reader().unwrap(),
            b.reader().unwrap(),
            o.writer().unwrap(),
        ));
        sim.run().unwrap();
        assert_eq!(o.contents(), vec![13, 27]);
    }

    #[test]
    fn test_zip_unzip() {
        let mut sim = Simulation::new();
        let (a, b) = (sim.signal("a"), sim.signal("b"));
        let z = sim.signal("z");
        let (x, y) = (sim.signal("x"), sim.signal("y"));
        sim.add(VSource::new("a", vec![1, 2, 3, 4], a.writer().unwrap()));
        sim.add(VSource::new("b", vec!['p', 'q'], b.writer().unwrap()));
        sim.add(Zip::new("zip", 2, 1, a.reader().unwrap(), b.reader().unwrap(), z.writer().unwrap()));
        sim.add(Unzip::new("unzip", 2, 1, z.reader().unwrap(), x.writer().unwrap(), y.writer().unwrap()));
        sim.run().unwrap();
        assert_eq!(x.contents(), vec![1, 2, 3, 4]);
        assert_eq!(y.contents(), vec!['p', 'q']);
    }

    #[test]
    fn test_delay_and_source() {
        let mut sim = Simulation::new();
        let (s, d) = (sim.signal("s"), sim.signal("d"));
        sim.add(Source::new("nat", |x: &u32| x + 1, 0, 3, s.writer().unwrap()));
        sim.add(DelayN::new("z2", 9, 2, s.reader().unwrap(), d.writer().unwrap()));
        sim.run().unwrap();
        assert_eq!(d.contents(), vec![9, 9, 0, 1, 2]);
    }
}
