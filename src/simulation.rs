use std::io;

use tracing::{error, trace};

use crate::{
    domain::{Clock, ClockDomain},
    error::Result,
    trace::{Traceable, Tracer},
    watchable::Formatter,
};

#[derive(Debug)]
pub struct SimCtx {
    clk: Clock,
    cycle: u64,
    time: u64,
    period: u64,
}

impl SimCtx {
    pub(crate) fn new(clk: &Clock, dom: &ClockDomain) -> Self {
        Self {
            clk: clk.clone(),
            cycle: 0,
            time: 0,
            period: dom.period() as u64,
        }
    }

    #[inline]
    pub fn clk(&self) -> &Clock {
        &self.clk
    }

    /// Number of the current (or last completed) cycle, starting from 1.
    #[inline]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Simulated time in picoseconds.
    #[inline]
    pub fn time(&self) -> u64 {
        self.time
    }

    pub(crate) fn watch<T>(&self, value: &T, fmt: &Formatter<T>) {
        fmt.output(self.cycle, value);
    }

    fn rise(&mut self) {
        self.cycle += 1;
        self.clk.invert();
        trace!(cycle = self.cycle, time = self.time, "rising edge");
    }

    /// Falls half a period after the current rising edge.
    fn fall(&mut self) {
        self.time = self.cycle_start() + self.period / 2;
        self.clk.invert();
    }

    /// Moves to the next rising edge, one full period after the current one.
    fn next_time(&mut self) {
        self.time = self.cycle_start() + self.period;
    }

    #[inline]
    fn cycle_start(&self) -> u64 {
        (self.cycle - 1) * self.period
    }
}

/// Component evaluated once per rising clock edge.
pub trait Simulate: Sized {
    type Value;

    fn next(&mut self, ctx: &mut SimCtx) -> Self::Value;

    fn simulate(self, clk: &Clock) -> Values<Self> {
        self.simulate_in(clk, &ClockDomain::default())
    }

    fn simulate_in(self, clk: &Clock, dom: &ClockDomain) -> Values<Self> {
        Values {
            ctx: SimCtx::new(clk, dom),
            source: self,
            tracer: None,
        }
    }
}

type TraceFn<S> = fn(&S, &mut Tracer) -> io::Result<()>;

/// Per-cycle outputs of a simulated component.
///
/// Each step raises the clock, evaluates the component, then lowers the clock half a period
/// later. An attached tracer dumps every half period.
pub struct Values<S> {
    ctx: SimCtx,
    source: S,
    tracer: Option<(Tracer, TraceFn<S>)>,
}

impl<S: Simulate> Values<S> {
    pub fn with_tracer(mut self, tracer: Tracer) -> Self
    where
        S: Traceable,
    {
        let trace_fn: TraceFn<S> = |source, tracer| source.trace(tracer);
        self.tracer = Some((tracer, trace_fn));
        self
    }

    #[inline]
    pub fn ctx(&self) -> &SimCtx {
        &self.ctx
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[inline]
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Runs one clock cycle. Fails if the attached tracer cannot be written.
    pub fn next_cycle(&mut self) -> Result<S::Value> {
        let (value, traced) = self.step();
        traced?;

        Ok(value)
    }

    fn step(&mut self) -> (S::Value, io::Result<()>) {
        self.ctx.rise();
        let value = self.source.next(&mut self.ctx);
        let rising = self.dump();

        self.ctx.fall();
        let falling = self.dump();
        self.ctx.next_time();

        (value, rising.and(falling))
    }

    fn dump(&mut self) -> io::Result<()> {
        if let Some((tracer, trace_fn)) = self.tracer.as_mut() {
            tracer.dump_time(self.ctx.time)?;
            tracer.trace(&self.ctx.clk)?;
            trace_fn(&self.source, tracer)?;
        }

        Ok(())
    }

    /// Flushes the tracer and returns the component.
    pub fn finish(mut self) -> Result<S> {
        if let Some((tracer, _)) = self.tracer.as_mut() {
            tracer.flush()?;
        }

        Ok(self.source)
    }
}

impl<S: Simulate> Iterator for Values<S> {
    type Item = S::Value;

    fn next(&mut self) -> Option<Self::Item> {
        let (value, traced) = self.step();
        if let Err(e) = traced {
            error!(cycle = self.ctx.cycle, "tracing disabled: {e}");
            self.tracer = None;
        }

        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{hz_to_period, Polarity, MAX_FREQ};

    struct Counter {
        clk: Clock,
        count: u8,
    }

    impl Simulate for Counter {
        type Value = (bool, u8);

        fn next(&mut self, ctx: &mut SimCtx) -> Self::Value {
            assert!(ctx.clk().is_rising());
            self.count = self.count.wrapping_add(1);
            (self.clk.is_rising(), self.count)
        }
    }

    #[test]
    fn values() {
        let clk = Clock::new();
        let mut values = Counter {
            clk: clk.clone(),
            count: 0,
        }
        .simulate(&clk);

        assert_eq!(values.by_ref().take(3).collect::<Vec<_>>(), [
            (true, 1),
            (true, 2),
            (true, 3)
        ]);
        assert!(clk.is_falling());
        assert_eq!(clk.edges(), 3);
        assert_eq!(values.ctx().cycle(), 3);
        assert_eq!(values.ctx().time(), 3_000_000);

        assert_eq!(values.next_cycle().unwrap(), (true, 4));
        assert_eq!(values.finish().unwrap().count, 4);
    }

    #[test]
    fn odd_period_does_not_drift() {
        let clk = Clock::new();
        let dom = ClockDomain::new(3, Polarity::ActiveHigh).unwrap();
        let period = hz_to_period(3) as u64;
        let mut values = Counter {
            clk: clk.clone(),
            count: 0,
        }
        .simulate_in(&clk, &dom);

        values.next_cycle().unwrap();
        assert_eq!(values.ctx().time(), period);

        for _ in 0..999 {
            values.next_cycle().unwrap();
        }
        assert_eq!(values.ctx().time(), 1000 * period);
    }

    #[test]
    fn fastest_clock_has_distinct_edges() {
        let clk = Clock::new();
        let dom = ClockDomain::new(MAX_FREQ, Polarity::ActiveHigh).unwrap();
        let mut values = Counter {
            clk: clk.clone(),
            count: 0,
        }
        .simulate_in(&clk, &dom);

        values.ctx.rise();
        assert_eq!(values.ctx().time(), 0);
        values.ctx.fall();
        assert_eq!(values.ctx().time(), 1);
        values.ctx.next_time();
        assert_eq!(values.ctx().time(), 2);
    }
}
