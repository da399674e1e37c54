use std::{cell::RefCell, rc::Rc};

use tracing::debug;

use crate::{
    domain::Polarity,
    unsigned::{Unsigned, Width},
};

/// Externally driven value. The testbench writes it, the circuit reads it.
#[derive(Debug, Clone)]
pub struct Source<T: Clone>(Rc<RefCell<T>>);

impl<T: Clone> Source<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    pub fn value(&self) -> T {
        RefCell::borrow(&self.0).clone()
    }

    pub fn set_value(&self, value: T) -> T {
        self.0.replace(value)
    }

    pub fn with(&self, f: impl FnOnce(T) -> T) {
        let value = self.value();
        self.set_value(f(value));
    }
}

impl Source<bool> {
    pub fn revert(&self) {
        self.0.replace_with(|val| !(*val));
    }
}

/// Reset line. Stores the raw level, `polarity` decides which level asserts it.
#[derive(Debug, Clone)]
pub struct Reset {
    line: Source<bool>,
    polarity: Polarity,
}

impl Default for Reset {
    fn default() -> Self {
        Self::new(Polarity::default())
    }
}

impl Reset {
    /// Creates a deasserted reset line.
    pub fn new(polarity: Polarity) -> Self {
        Self {
            line: Source::new(polarity.level(false)),
            polarity,
        }
    }

    #[inline]
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    #[inline]
    pub fn level(&self) -> bool {
        self.line.value()
    }

    #[inline]
    pub fn set_level(&self, level: bool) {
        self.line.set_value(level);
    }

    #[inline]
    pub fn is_asserted(&self) -> bool {
        self.polarity.bool(self.level())
    }

    pub fn assert(&self) {
        self.set_level(self.polarity.level(true));
    }

    pub fn deassert(&self) {
        self.set_level(self.polarity.level(false));
    }

    pub fn revert(&self) {
        self.line.revert();
    }
}

/// Clock enable, active-high.
#[derive(Debug, Clone)]
pub struct Enable(Source<bool>);

impl Default for Enable {
    fn default() -> Self {
        Self::new()
    }
}

impl Enable {
    pub fn new() -> Self {
        Self(Source::new(true))
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.0.value()
    }

    #[inline]
    pub fn set(&self, en: bool) {
        self.0.set_value(en);
    }

    pub fn revert(&self) {
        self.0.revert();
    }
}

/// Fixed-width data input.
#[derive(Debug, Clone)]
pub struct Port {
    src: Source<Unsigned>,
}

impl Port {
    pub fn new(width: Width) -> Self {
        Self {
            src: Source::new(Unsigned::zero(width)),
        }
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.src.value().width()
    }

    #[inline]
    pub fn value(&self) -> Unsigned {
        self.src.value()
    }

    /// Drives `value` truncated to the port width.
    pub fn drive(&self, value: u128) {
        let width = self.width();
        let driven = Unsigned::new(value, width);
        if driven != value {
            debug!(%value, %width, truncated = %driven, "dropping bits above port width");
        }

        self.src.set_value(driven);
    }
}
