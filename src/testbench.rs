use std::{io, path::PathBuf};

use strum::{Display, EnumString};
use tracing::{debug, info};

use crate::{
    config::{CycleInput, SimConfig},
    domain::{Clock, ClockDomain},
    error::Result,
    register::Register,
    signal::{Enable, Port, Reset},
    simulation::{SimCtx, Simulate},
    trace::{Timescale, TraceVars, Traceable, Tracer},
    unsigned::{Unsigned, Width},
    watchable::{AsBinary, AsDebug, AsDisplay, AsLowerHex, AsUpperHex},
};

const TOP_MODULE: &str = "top";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum WatchFmt {
    Dec,
    Hex,
    #[strum(serialize = "HEX", serialize = "upperhex")]
    UpperHex,
    Bin,
    Debug,
}

#[derive(Debug, Default, Clone)]
pub struct RunOpts {
    pub vcd: Option<PathBuf>,
    pub watch: Option<WatchFmt>,
}

/// A register wired to externally driven clock, reset, enable and data lines.
#[derive(Debug)]
pub struct Testbench {
    dom: ClockDomain,
    clk: Clock,
    rst: Reset,
    en: Enable,
    data: Port,
    reg: Register,
}

impl Testbench {
    pub fn new(dom: ClockDomain, width: Width, data_width: Width) -> Result<Self> {
        let clk = Clock::new();
        let rst = Reset::new(dom.reset_polarity());
        let en = Enable::new();
        let data = Port::new(data_width);
        let reg = Register::new(&clk, &rst, &data, width)?.with_enable(&en);

        Ok(Self {
            dom,
            clk,
            rst,
            en,
            data,
            reg,
        })
    }

    pub fn from_config(config: &SimConfig) -> Result<Self> {
        Self::new(config.domain()?, config.width, config.data_width())
    }

    #[inline]
    pub fn register(&self) -> &Register {
        &self.reg
    }

    /// Drives the inputs sampled by the next edge.
    pub fn apply(&self, input: &CycleInput) {
        match input.rst {
            Some(level) => self.rst.set_level(level),
            None => self.rst.deassert(),
        }
        self.en.set(input.en);
        self.data.drive(input.data);
    }

    fn watched(mut self, fmt: WatchFmt) -> Self {
        let name = self.reg.name().to_string();
        let reg = self.reg;
        self.reg = match fmt {
            WatchFmt::Dec => reg.watch_with::<AsDisplay, _>(name),
            WatchFmt::Hex => reg.watch_with::<AsLowerHex, _>(name),
            WatchFmt::UpperHex => reg.watch_with::<AsUpperHex, _>(name),
            WatchFmt::Bin => reg.watch_with::<AsBinary, _>(name),
            WatchFmt::Debug => reg.watch_with::<AsDebug, _>(name),
        };

        self
    }

    /// Runs one edge per input and returns the register output after each edge.
    pub fn run(self, cycles: &[CycleInput], opts: &RunOpts) -> Result<Vec<Unsigned>> {
        let bench = match opts.watch {
            Some(fmt) => self.watched(fmt),
            None => self,
        };
        let clk = bench.clk.clone();
        let dom = bench.dom;

        let mut values = bench.simulate_in(&clk, &dom);
        if let Some(path) = opts.vcd.as_ref() {
            let vars = TraceVars::new().with(&clk).with(values.source());
            let tracer = Tracer::open_vcd(path, vars, TOP_MODULE, Some(Timescale::PS(1)))?;
            debug!(path = %path.display(), "writing vcd");
            values = values.with_tracer(tracer);
        }

        let mut outputs = Vec::with_capacity(cycles.len());
        for input in cycles {
            values.source().apply(input);
            outputs.push(values.next_cycle()?);
        }
        values.finish()?;

        info!(
            cycles = outputs.len(),
            freq = dom.freq(),
            reset = %dom.reset_polarity(),
            "simulation finished"
        );

        Ok(outputs)
    }
}

impl Simulate for Testbench {
    type Value = Unsigned;

    fn next(&mut self, ctx: &mut SimCtx) -> Self::Value {
        self.reg.next(ctx)
    }
}

impl Traceable for Testbench {
    fn add_vars(&self, vars: &mut TraceVars) {
        self.reg.add_vars(vars);
    }

    fn trace(&self, tracer: &mut Tracer) -> io::Result<()> {
        self.reg.trace(tracer)
    }
}
