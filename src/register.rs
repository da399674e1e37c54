use std::{borrow::Cow, io};

use tracing::{debug, trace};

use crate::{
    domain::Clock,
    error::{Error, Result},
    signal::{Enable, Port, Reset},
    simulation::{SimCtx, Simulate},
    trace::{TraceTy, TraceVars, Traceable, Tracer},
    unsigned::{Unsigned, Width},
    watchable::{AsDisplay, FmtKind, Formatter, Watchable},
};

/// Value latched by a register on a rising edge.
///
/// Reset wins over enable, enable wins over data.
#[inline]
pub fn next_state(state: &Unsigned, rst: bool, en: bool, data: &Unsigned) -> Unsigned {
    if rst {
        Unsigned::zero(state.width())
    } else if en {
        Unsigned::new(data.value(), state.width())
    } else {
        *state
    }
}

/// N-bit register with synchronous reset to zero.
#[derive(Debug)]
pub struct Register {
    name: Cow<'static, str>,
    clk: Clock,
    rst: Reset,
    en: Enable,
    data: Port,
    value: Unsigned,
    last_edge: u64,
    fmt: Option<Formatter<Unsigned>>,
}

impl Register {
    /// Connects a register of `width` bits to `data`.
    ///
    /// Fails with [`Error::WidthMismatch`] when the data input has a different width.
    pub fn new(clk: &Clock, rst: &Reset, data: &Port, width: Width) -> Result<Self> {
        if data.width() != width {
            return Err(Error::WidthMismatch {
                expected: width,
                found: data.width(),
            });
        }

        Ok(Self {
            name: Cow::Borrowed("reg"),
            clk: clk.clone(),
            rst: rst.clone(),
            en: Enable::new(),
            data: data.clone(),
            value: Unsigned::zero(width),
            last_edge: clk.edges(),
            fmt: None,
        })
    }

    pub fn with_enable(mut self, en: &Enable) -> Self {
        self.en = en.clone();
        self
    }

    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn watch(self, name: impl Into<Cow<'static, str>>) -> Self {
        self.watch_with::<AsDisplay, _>(name)
    }

    pub fn watch_with<F: FmtKind, I: Into<Cow<'static, str>>>(mut self, name: I) -> Self
    where
        Unsigned: Watchable<F>,
    {
        self.fmt = Some(<Unsigned as Watchable<F>>::formatter(name));
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.value.width()
    }

    /// Value latched at the most recent edge.
    #[inline]
    pub fn output(&self) -> Unsigned {
        self.value
    }

    /// Samples the inputs if the clock is on a rising edge that was not yet latched.
    ///
    /// Returns `true` when the value was updated.
    pub fn on_edge(&mut self) -> bool {
        let edge = self.clk.edges();
        if !self.clk.is_rising() || edge == self.last_edge {
            return false;
        }
        self.last_edge = edge;

        let rst = self.rst.is_asserted();
        let en = self.en.is_enabled();
        let data = self.data.value();
        let value = next_state(&self.value, rst, en, &data);

        trace!(reg = %self.name, edge, rst, en, %data, "sample");
        if value != self.value {
            debug!(reg = %self.name, edge, from = %self.value, to = %value, "latch");
        }
        self.value = value;

        true
    }
}

impl Simulate for Register {
    type Value = Unsigned;

    fn next(&mut self, ctx: &mut SimCtx) -> Self::Value {
        self.on_edge();
        if let Some(fmt) = self.fmt.as_ref() {
            ctx.watch(&self.value, fmt);
        }

        self.value
    }
}

impl Traceable for Register {
    fn add_vars(&self, vars: &mut TraceVars) {
        let width = self.width().get();

        vars.push_sym(&self.name);
        vars.add_var("rst", TraceTy::Wire);
        vars.add_var("en", TraceTy::Wire);
        vars.add_var("d", TraceTy::Bus(width));
        vars.add_var("q", TraceTy::Bus(width));
        vars.pop();
    }

    fn trace(&self, tracer: &mut Tracer) -> io::Result<()> {
        tracer.with_scope(&self.name, |tracer| {
            tracer.change_wire("rst", self.rst.level())?;
            tracer.change_wire("en", self.en.is_enabled())?;
            tracer.change_bus("d", &self.data.value())?;
            tracer.change_bus("q", &self.value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Polarity;

    fn w8() -> Width {
        Width::new(8).unwrap()
    }

    fn edge(clk: &Clock, reg: &mut Register) -> Unsigned {
        clk.invert();
        reg.on_edge();
        clk.invert();
        reg.output()
    }

    #[test]
    fn next_state_priority() {
        let state = Unsigned::new(0xAB, w8());
        let data = Unsigned::new(0xFF, w8());

        assert_eq!(next_state(&state, true, true, &data), 0);
        assert_eq!(next_state(&state, true, false, &data), 0);
        assert_eq!(next_state(&state, false, true, &data), 0xFF);
        assert_eq!(next_state(&state, false, false, &data), 0xAB);
    }

    #[test]
    fn width_mismatch() {
        let clk = Clock::new();
        let rst = Reset::default();
        let data = Port::new(Width::new(4).unwrap());

        let err = Register::new(&clk, &rst, &data, w8()).unwrap_err();
        assert!(matches!(
            err,
            Error::WidthMismatch { expected, found } if expected.get() == 8 && found.get() == 4
        ));
    }

    #[test]
    fn latches_only_on_rising_edge() {
        let clk = Clock::new();
        let rst = Reset::default();
        let data = Port::new(w8());
        let mut reg = Register::new(&clk, &rst, &data, w8()).unwrap();

        data.drive(0x12);
        assert!(!reg.on_edge());
        assert_eq!(reg.output(), 0);

        clk.invert();
        assert!(reg.on_edge());
        assert_eq!(reg.output(), 0x12);

        // same edge, new data: no second update
        data.drive(0x34);
        assert!(!reg.on_edge());
        assert_eq!(reg.output(), 0x12);

        clk.invert();
        assert!(!reg.on_edge());
        assert_eq!(reg.output(), 0x12);
    }

    #[test]
    fn reset_wins() {
        let clk = Clock::new();
        let rst = Reset::default();
        let data = Port::new(w8());
        let mut reg = Register::new(&clk, &rst, &data, w8()).unwrap();

        data.drive(0xAB);
        assert_eq!(edge(&clk, &mut reg), 0xAB);

        rst.assert();
        data.drive(0xFF);
        assert_eq!(edge(&clk, &mut reg), 0);
        assert_eq!(edge(&clk, &mut reg), 0);

        rst.deassert();
        assert_eq!(edge(&clk, &mut reg), 0xFF);
    }

    #[test]
    fn reset_active_low() {
        let clk = Clock::new();
        let rst = Reset::new(Polarity::ActiveLow);
        let data = Port::new(w8());
        let mut reg = Register::new(&clk, &rst, &data, w8()).unwrap();

        data.drive(0x5A);
        assert_eq!(edge(&clk, &mut reg), 0x5A);

        rst.set_level(false);
        assert_eq!(edge(&clk, &mut reg), 0);

        rst.set_level(true);
        assert_eq!(edge(&clk, &mut reg), 0x5A);
    }

    #[test]
    fn enable_holds() {
        let clk = Clock::new();
        let rst = Reset::default();
        let en = Enable::new();
        let data = Port::new(w8());
        let mut reg = Register::new(&clk, &rst, &data, w8())
            .unwrap()
            .with_enable(&en);

        data.drive(1);
        assert_eq!(edge(&clk, &mut reg), 1);

        en.set(false);
        data.drive(2);
        assert_eq!(edge(&clk, &mut reg), 1);
        assert_eq!(edge(&clk, &mut reg), 1);

        rst.assert();
        assert_eq!(edge(&clk, &mut reg), 0);

        rst.deassert();
        en.set(true);
        assert_eq!(edge(&clk, &mut reg), 2);
    }
}
