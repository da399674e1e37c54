pub mod config;
pub mod domain;
pub mod error;
pub mod register;
pub mod signal;
pub mod simulation;
pub mod testbench;
pub mod trace;
pub mod unsigned;
pub mod watchable;

pub mod prelude {
    pub use crate::{
        config::{CycleInput, SimConfig},
        domain::{hz_to_period, Clock, ClockDomain, Polarity},
        error::{Error, Result},
        register::{next_state, Register},
        signal::{Enable, Port, Reset, Source},
        simulation::{SimCtx, Simulate, Values},
        testbench::{RunOpts, Testbench, WatchFmt},
        trace::{Timescale, TraceVars, Traceable, Tracer},
        unsigned::{Unsigned, Width},
        watchable::{AsBinary, AsDebug, AsDisplay, AsLowerHex, AsUpperHex, Watchable},
    };
}
