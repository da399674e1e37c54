use std::{
    cell::Cell,
    fmt::{self, Display},
    io,
    rc::Rc,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    trace::{TraceTy, TraceVars, Traceable, Tracer},
};

pub const SECOND: usize = 1_000_000_000_000;
pub const MILLISECOND: usize = 1_000_000_000;
pub const MICROSECOND: usize = 1_000_000;
pub const NANOSECOND: usize = 1_000;
pub const PICOSECOND: usize = 1;

/// Highest frequency whose half period is still a whole picosecond.
pub const MAX_FREQ: usize = SECOND / 2;

pub const fn hz_to_period(freq: usize) -> usize {
    assert!(freq > 0 && SECOND >= freq);
    SECOND / freq
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    #[default]
    ActiveHigh,
    ActiveLow,
}

impl Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ActiveHigh => "active_high",
            Self::ActiveLow => "active_low",
        })
    }
}

impl Polarity {
    /// Whether the raw line level `b` means "asserted".
    pub fn bool(&self, b: bool) -> bool {
        match self {
            Self::ActiveHigh => b,
            Self::ActiveLow => !b,
        }
    }

    /// Line level for the given logical state.
    pub fn level(&self, asserted: bool) -> bool {
        self.bool(asserted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockDomain {
    freq: usize,
    reset_polarity: Polarity,
}

impl Default for ClockDomain {
    /// 1 MHz, active-high reset.
    fn default() -> Self {
        Self {
            freq: 1_000_000,
            reset_polarity: Polarity::ActiveHigh,
        }
    }
}

impl ClockDomain {
    pub fn new(freq: usize, reset_polarity: Polarity) -> Result<Self> {
        if freq == 0 || freq > MAX_FREQ {
            return Err(Error::InvalidFreq(freq));
        }

        Ok(Self {
            freq,
            reset_polarity,
        })
    }

    /// In hertz
    #[inline]
    pub fn freq(&self) -> usize {
        self.freq
    }

    /// In picoseconds
    #[inline]
    pub fn period(&self) -> usize {
        hz_to_period(self.freq)
    }

    #[inline]
    pub fn reset_polarity(&self) -> Polarity {
        self.reset_polarity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClockState {
    Rising,
    Falling,
}

impl Display for ClockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rising => "rising",
            Self::Falling => "falling",
        })
    }
}

#[derive(Debug)]
struct ClockInner {
    state: Cell<ClockState>,
    edges: Cell<u64>,
}

/// Shared clock line. Every clone observes the same edges.
#[derive(Debug, Clone)]
pub struct Clock {
    inner: Rc<ClockInner>,
}

impl Display for Clock {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.state.get().fmt(f)
    }
}

impl Default for Clock {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ClockInner {
                state: Cell::new(ClockState::Falling),
                edges: Cell::new(0),
            }),
        }
    }

    pub fn is_rising(&self) -> bool {
        matches!(self.inner.state.get(), ClockState::Rising)
    }

    pub fn is_falling(&self) -> bool {
        matches!(self.inner.state.get(), ClockState::Falling)
    }

    /// Number of rising edges seen so far. Identifies the current edge while the clock is high.
    #[inline]
    pub fn edges(&self) -> u64 {
        self.inner.edges.get()
    }

    pub fn invert(&self) {
        let state = match self.inner.state.get() {
            ClockState::Rising => ClockState::Falling,
            ClockState::Falling => {
                self.inner.edges.set(self.inner.edges.get() + 1);
                ClockState::Rising
            }
        };
        self.inner.state.set(state);
    }
}

impl Traceable for Clock {
    fn add_vars(&self, vars: &mut TraceVars) {
        vars.add_var("clk", TraceTy::Wire);
    }

    fn trace(&self, tracer: &mut Tracer) -> io::Result<()> {
        tracer.change_wire("clk", self.is_rising())
    }
}
