//! The discrete-time MoC.
//!
//! A DT signal has one absent-extended token per discrete instant, so the
//! position of a token in its signal is its time. Processes may consume
//! several tokens per firing; they then pad their outputs with absent
//! tokens so that no output lands at an earlier instant than the inputs
//! it depends on.

use crate::abst_ext::AbstExt;
use crate::error::{SimError, SimResult};
use crate::moc::{check_positive, check_rate, rate_status, TakeCounter};
use crate::process::{arg, Flow, Process};
use crate::signal::{Availability, InPort, InputPort, OutPort, OutputPort, Token};

/// Input port of a discrete-time process.
pub type DtIn<T> = InPort<AbstExt<T>>;
/// Output port of a discrete-time process.
pub type DtOut<T> = OutPort<AbstExt<T>>;

/// `n` initial tokens followed by the input stream.
pub struct DelayN<T> {
    name: String,
    init_val: AbstExt<T>,
    n: usize,
    iport: DtIn<T>,
    oport: DtOut<T>,
    val: Option<AbstExt<T>>,
}

impl<T: Token> DelayN<T> {
    /// Creates a new DT delay emitting `n` copies of `init_val` first.
    pub fn new(name: impl Into<String>, init_val: AbstExt<T>, n: usize, iport: DtIn<T>, oport: DtOut<T>) -> Self {
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
            "DT::delay"
        } else {
            "DT::delayn"
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
    /// Creates a new single-token DT delay.
    #[allow(clippy::new_ret_no_self)]
    pub fn new<T: Token>(name: impl Into<String>, init_val: AbstExt<T>, iport: DtIn<T>, oport: DtOut<T>) -> DelayN<T> {
        DelayN::new(name, init_val, 1, iport, oport)
    }
}

/// Mealy machine with a state-dependent input rate.
///
/// Each firing reads `gamma(state)` tokens. The outputs of a firing are
/// preceded by `max(t_in - t_out - 1, 0)` absent tokens, where `t_in`
/// and `t_out` count the tokens consumed and produced so far.
pub struct Mealy<I, S, O, G, NS, OD> {
    name: String,
    gamma: G,
    ns_func: NS,
    od_func: OD,
    state: S,
    iport: DtIn<I>,
    oport: DtOut<O>,
    tin: usize,
    tout: usize,
    ivals: Vec<AbstExt<I>>,
    ovals: Vec<AbstExt<O>>,
}

impl<I, S, O, G, NS, OD> Mealy<I, S, O, G, NS, OD>
where
    I: Token,
    S: Send + 'static,
    O: Token,
    G: FnMut(&S) -> usize + Send,
    NS: FnMut(&S, &[AbstExt<I>]) -> S + Send,
    OD: FnMut(&S, &[AbstExt<I>]) -> Vec<AbstExt<O>> + Send,
{
    /// Creates a new DT Mealy machine. The functions come in the order
    /// partitioning, next state, output decoding.
    pub fn new(
        name: impl Into<String>,
        gamma: G,
        ns_func: NS,
        od_func: OD,
        init_st: S,
        iport: DtIn<I>,
        oport: DtOut<O>,
    ) -> Self {
        Self {
            name: name.into(),
            gamma,
            ns_func,
            od_func,
            state: init_st,
            iport,
            oport,
            tin: 0,
            tout: 0,
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
    NS: FnMut(&S, &[AbstExt<I>]) -> S + Send,
    OD: FnMut(&S, &[AbstExt<I>]) -> Vec<AbstExt<O>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DT::mealy"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let itoks = (self.gamma)(&self.state);
        let status = rate_status(&self.iport, itoks);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.ivals = self.iport.read_n(itoks)?;
        self.tin += itoks;
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        self.ovals = (self.od_func)(&self.state, &self.ivals);
        self.state = (self.ns_func)(&self.state, &self.ivals);
        self.ivals.clear();
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        let k = self.tin.saturating_sub(self.tout + 1);
        for _ in 0..k {
            self.oport.write(AbstExt::Absent);
        }
        self.tout += k + self.ovals.len();
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

/// Mealy machine over N inputs and M outputs of one token type each.
///
/// Each firing reads `gamma(state)` tokens from every input. `od_func`
/// returns one vector per output; output `i` is preceded by
/// `max(t_in - t_out_i - 1, 0)` absent tokens, with `t_out_i` counting
/// the tokens written to that output so far.
pub struct MealyMN<I, S, O, G, NS, OD> {
    name: String,
    gamma: G,
    ns_func: NS,
    od_func: OD,
    state: S,
    iports: Vec<DtIn<I>>,
    oports: Vec<DtOut<O>>,
    tin: usize,
    touts: Vec<usize>,
    ivals: Vec<Vec<AbstExt<I>>>,
    ovals: Vec<Vec<AbstExt<O>>>,
}

impl<I, S, O, G, NS, OD> MealyMN<I, S, O, G, NS, OD>
where
    I: Token,
    S: Send + 'static,
    O: Token,
    G: FnMut(&S) -> usize + Send,
    NS: FnMut(&S, &[Vec<AbstExt<I>>]) -> S + Send,
    OD: FnMut(&S, &[Vec<AbstExt<I>>]) -> Vec<Vec<AbstExt<O>>> + Send,
{
    /// Creates a new multi-port Mealy machine. The functions come in the
    /// order partitioning, next state, output decoding.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        gamma: G,
        ns_func: NS,
        od_func: OD,
        init_st: S,
        iports: Vec<DtIn<I>>,
        oports: Vec<DtOut<O>>,
    ) -> Self {
        let m = oports.len();
        Self {
            name: name.into(),
            gamma,
            ns_func,
            od_func,
            state: init_st,
            iports,
            oports,
            tin: 0,
            touts: vec![0; m],
            ivals: Vec::new(),
            ovals: Vec::new(),
        }
    }
}

impl<I, S, O, G, NS, OD> Process for MealyMN<I, S, O, G, NS, OD>
where
    I: Token,
    S: Send + 'static,
    O: Token,
    G: FnMut(&S) -> usize + Send,
    NS: FnMut(&S, &[Vec<AbstExt<I>>]) -> S + Send,
    OD: FnMut(&S, &[Vec<AbstExt<I>>]) -> Vec<Vec<AbstExt<O>>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DT::mealyMN"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let itoks = (self.gamma)(&self.state);
        let status = Availability::all(self.iports.iter().map(|p| rate_status(p, itoks)));
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.ivals = self.iports.iter().map(|p| p.read_n(itoks)).collect::<SimResult<_>>()?;
        self.tin += itoks;
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        let ovals = (self.od_func)(&self.state, &self.ivals);
        check_rate(&self.name, self.oports.len(), ovals.len())?;
        self.ovals = ovals;
        self.state = (self.ns_func)(&self.state, &self.ivals);
        self.ivals.clear();
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        let tin = self.tin;
        for ((port, tout), vals) in self.oports.iter_mut().zip(self.touts.iter_mut()).zip(self.ovals.drain(..)) {
            let k = tin.saturating_sub(*tout + 1);
            for _ in 0..k {
                port.write(AbstExt::Absent);
            }
            *tout += k + vals.len();
            port.write_all(vals);
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        self.oports.iter_mut().map(|p| p as &mut dyn OutputPort).collect()
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        self.iports.iter().map(|p| p as &dyn InputPort).collect()
    }

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("inputs", self.iports.len()), arg("outputs", self.oports.len())]
    }
}

/// Emits the same token at every instant, `take` times (0 = forever).
pub struct Constant<T> {
    name: String,
    value: AbstExt<T>,
    count: TakeCounter,
    oport: DtOut<T>,
}

impl<T: Token> Constant<T> {
    /// Creates a new DT constant.
    pub fn new(name: impl Into<String>, value: AbstExt<T>, take: u64, oport: DtOut<T>) -> Self {
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
        "DT::constant"
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
    state: AbstExt<T>,
    count: TakeCounter,
    oport: DtOut<T>,
}

impl<T, F> Source<T, F>
where
    T: Token,
    F: FnMut(&AbstExt<T>) -> AbstExt<T> + Send,
{
    /// Creates a new DT source.
    pub fn new(name: impl Into<String>, func: F, init_val: AbstExt<T>, take: u64, oport: DtOut<T>) -> Self {
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
        "DT::source"
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

/// Emits each `(instant, value)` pair at its instant, with absent tokens
/// in between, and ends after the last one.
pub struct VSource<T> {
    name: String,
    events: Vec<(usize, T)>,
    pos: usize,
    now: usize,
    next: Option<AbstExt<T>>,
    oport: DtOut<T>,
}

impl<T: Token> VSource<T> {
    /// Creates a new DT source from `(instant, value)` pairs.
    pub fn new(name: impl Into<String>, events: Vec<(usize, T)>, oport: DtOut<T>) -> Self {
        Self {
            name: name.into(),
            events,
            pos: 0,
            now: 0,
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
        "DT::vsource"
    }

    fn init(&mut self) -> SimResult<()> {
        if self.events.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(SimError::process(&self.name, "instants must be strictly increasing"));
        }
        Ok(())
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.next = match self.events.get(self.pos) {
            None => return Ok(Flow::Done),
            Some((at, _)) if *at > self.now => Some(AbstExt::Absent),
            Some((_, v)) => {
                self.pos += 1;
                Some(AbstExt::Present(v.clone()))
            }
        };
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(v) = self.next.take() {
            self.oport.write(v);
            self.now += 1;
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("events", self.events.len())]
    }
}

/// Calls `func` on every token.
pub struct Sink<T, F> {
    name: String,
    func: F,
    iport: DtIn<T>,
    val: Option<AbstExt<T>>,
}

impl<T, F> Sink<T, F>
where
    T: Token,
    F: FnMut(&AbstExt<T>) + Send,
{
    /// Creates a new DT sink.
    pub fn new(name: impl Into<String>, func: F, iport: DtIn<T>) -> Self {
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
        "DT::sink"
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

/// Zipped block of a [`Zips`] firing.
pub type ZipBlock<A, B> = (Vec<AbstExt<A>>, Vec<AbstExt<B>>);

/// Reads `itoks` tokens from each input and emits them as one tuple,
/// preceded by `itoks - 1` absent tokens.
pub struct Zips<A, B> {
    name: String,
    itoks: usize,
    iport1: DtIn<A>,
    iport2: DtIn<B>,
    oport: DtOut<ZipBlock<A, B>>,
    vals: Option<ZipBlock<A, B>>,
}

impl<A: Token, B: Token> Zips<A, B> {
    /// Creates a new DT zip with a fixed rate.
    pub fn new(
        name: impl Into<String>,
        itoks: usize,
        iport1: DtIn<A>,
        iport2: DtIn<B>,
        oport: DtOut<ZipBlock<A, B>>,
    ) -> Self {
        Self {
            name: name.into(),
            itoks,
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
        "DT::zips"
    }

    fn init(&mut self) -> SimResult<()> {
        check_positive(&self.name, "itoks", self.itoks as u64)
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let status = Availability::all([self.iport1.status(self.itoks), self.iport2.status(self.itoks)]);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.vals = Some((self.iport1.read_n(self.itoks)?, self.iport2.read_n(self.itoks)?));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(block) = self.vals.take() {
            for _ in 1..self.itoks {
                self.oport.write(AbstExt::Absent);
            }
            self.oport.write(AbstExt::Present(block));
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
        vec![arg("itoks", self.itoks)]
    }
}

/// Partitioning state of a control-driven zip.
///
/// The rate of a firing is `gamma(k)`, where `k` is the first control
/// token of the previous firing (`C::default()` before the first one).
struct ZipControl<C, G> {
    gamma: G,
    k: C,
}

impl<C: Token + Default, G: FnMut(&C) -> usize> ZipControl<C, G> {
    fn new(gamma: G) -> Self {
        Self { gamma, k: C::default() }
    }

    fn rate(&mut self, owner: &str) -> SimResult<usize> {
        let itoks = (self.gamma)(&self.k);
        if itoks == 0 {
            return Err(SimError::process(owner, "partitioning function returned a zero rate"));
        }
        Ok(itoks)
    }

    fn update(&mut self, owner: &str, control: Vec<AbstExt<C>>) -> SimResult<()> {
        match control.into_iter().next() {
            Some(AbstExt::Present(k)) => {
                self.k = k;
                Ok(())
            }
            _ => Err(SimError::process(owner, "absent token on the control input")),
        }
    }
}

/// Reads `gamma(k)` tokens from each data input and from a control input
/// and emits the data as one tuple, preceded by `gamma(k) - 1` absent
/// tokens. `k` is the first control token read by the previous firing.
pub struct Zip<A, B, C, G> {
    name: String,
    control: ZipControl<C, G>,
    iport1: DtIn<A>,
    iport2: DtIn<B>,
    cport: DtIn<C>,
    oport: DtOut<ZipBlock<A, B>>,
    itoks: usize,
    vals: Option<ZipBlock<A, B>>,
}

impl<A, B, C, G> Zip<A, B, C, G>
where
    A: Token,
    B: Token,
    C: Token + Default,
    G: FnMut(&C) -> usize + Send,
{
    /// Creates a new control-driven zip.
    pub fn new(
        name: impl Into<String>,
        gamma: G,
        iport1: DtIn<A>,
        iport2: DtIn<B>,
        cport: DtIn<C>,
        oport: DtOut<ZipBlock<A, B>>,
    ) -> Self {
        Self {
            name: name.into(),
            control: ZipControl::new(gamma),
            iport1,
            iport2,
            cport,
            oport,
            itoks: 0,
            vals: None,
        }
    }
}

impl<A, B, C, G> Process for Zip<A, B, C, G>
where
    A: Token,
    B: Token,
    C: Token + Default,
    G: FnMut(&C) -> usize + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DT::zip"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let itoks = self.control.rate(&self.name)?;
        let status = Availability::all([
            self.iport1.status(itoks),
            self.iport2.status(itoks),
            self.cport.status(itoks),
        ]);
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.vals = Some((self.iport1.read_n(itoks)?, self.iport2.read_n(itoks)?));
        self.control.update(&self.name, self.cport.read_n(itoks)?)?;
        self.itoks = itoks;
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(block) = self.vals.take() {
            for _ in 1..self.itoks {
                self.oport.write(AbstExt::Absent);
            }
            self.oport.write(AbstExt::Present(block));
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        vec![&self.iport1, &self.iport2, &self.cport]
    }
}

/// Control-driven zip over N data inputs of one type.
///
/// Each firing reads `gamma(k)` tokens from every data input and from the
/// control input, then emits one vector per input after `gamma(k) - 1`
/// absent tokens.
pub struct ZipN<T, C, G> {
    name: String,
    control: ZipControl<C, G>,
    iports: Vec<DtIn<T>>,
    cport: DtIn<C>,
    oport: DtOut<Vec<Vec<AbstExt<T>>>>,
    itoks: usize,
    vals: Option<Vec<Vec<AbstExt<T>>>>,
}

impl<T, C, G> ZipN<T, C, G>
where
    T: Token,
    C: Token + Default,
    G: FnMut(&C) -> usize + Send,
{
    /// Creates a new N-input control-driven zip.
    pub fn new(
        name: impl Into<String>,
        gamma: G,
        iports: Vec<DtIn<T>>,
        cport: DtIn<C>,
        oport: DtOut<Vec<Vec<AbstExt<T>>>>,
    ) -> Self {
        Self {
            name: name.into(),
            control: ZipControl::new(gamma),
            iports,
            cport,
            oport,
            itoks: 0,
            vals: None,
        }
    }
}

impl<T, C, G> Process for ZipN<T, C, G>
where
    T: Token,
    C: Token + Default,
    G: FnMut(&C) -> usize + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "DT::zipN"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        let itoks = self.control.rate(&self.name)?;
        let status = Availability::all(
            self.iports
                .iter()
                .map(|p| p.status(itoks))
                .chain([self.cport.status(itoks)]),
        );
        if status != Availability::Ready {
            return Ok(status.flow());
        }
        self.vals = Some(self.iports.iter().map(|p| p.read_n(itoks)).collect::<SimResult<_>>()?);
        self.control.update(&self.name, self.cport.read_n(itoks)?)?;
        self.itoks = itoks;
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        Ok(())
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(block) = self.vals.take() {
            for _ in 1..self.itoks {
                self.oport.write(AbstExt::Absent);
            }
            self.oport.write(AbstExt::Present(block));
        }
        Ok(())
    }

    fn outputs(&mut self) -> Vec<&mut dyn OutputPort> {
        vec![&mut self.oport]
    }

    fn inputs(&self) -> Vec<&dyn InputPort> {
        self.iports
            .iter()
            .map(|p| p as &dyn InputPort)
            .chain([&self.cport as &dyn InputPort])
            .collect()
    }

    fn args(&self) -> Vec<(String, String)> {
        vec![arg("inputs", self.iports.len())]
    }
}

/// Splits a signal of pairs. An absent pair yields two absent tokens.
pub struct Unzip<A, B> {
    name: String,
    iport: DtIn<(AbstExt<A>, AbstExt<B>)>,
    oport1: DtOut<A>,
    oport2: DtOut<B>,
    val: Option<AbstExt<(AbstExt<A>, AbstExt<B>)>>,
}

impl<A: Token, B: Token> Unzip<A, B> {
    /// Creates a new DT unzip.
    pub fn new(
        name: impl Into<String>,
        iport: DtIn<(AbstExt<A>, AbstExt<B>)>,
        oport1: DtOut<A>,
        oport2: DtOut<B>,
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
        "DT::unzip"
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
            let (a, b) = v.into_option().unwrap_or_default();
            self.oport1.write(a);
            self.oport2.write(b);
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

/// Splits a signal of vectors over N outputs. An absent vector yields an
/// absent token on every output.
pub struct UnzipN<T> {
    name: String,
    iport: DtIn<Vec<AbstExt<T>>>,
    oports: Vec<DtOut<T>>,
    val: Option<AbstExt<Vec<AbstExt<T>>>>,
}

impl<T: Token> UnzipN<T> {
    /// Creates a new N-output unzip; every present vector must hold one
    /// token per output.
    pub fn new(name: impl Into<String>, iport: DtIn<Vec<AbstExt<T>>>, oports: Vec<DtOut<T>>) -> Self {
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
        "DT::unzipN"
    }

    fn prep(&mut self) -> SimResult<Flow> {
        self.val = Some(read_or_return!(self.iport));
        Ok(Flow::Ready)
    }

    fn exec(&mut self) -> SimResult<()> {
        match self.val.as_ref().and_then(AbstExt::value) {
            Some(vals) => check_rate(&self.name, self.oports.len(), vals.len()),
            None => Ok(()),
        }
    }

    fn prod(&mut self) -> SimResult<()> {
        if let Some(v) = self.val.take() {
            let n = self.oports.len();
            let vals = v.into_option().unwrap_or_else(|| vec![AbstExt::Absent; n]);
            for (port, x) in self.oports.iter_mut().zip(vals) {
                port.write(x);
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
}

/// Copies its input to every signal bound to its output.
pub struct Fanout<T> {
    name: String,
    iport: DtIn<T>,
    oport: DtOut<T>,
    val: Option<AbstExt<T>>,
}

impl<T: Token> Fanout<T> {
    /// Creates a new DT fanout.
    pub fn new(name: impl Into<String>, iport: DtIn<T>, oport: DtOut<T>) -> Self {
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
        "DT::fanout"
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
