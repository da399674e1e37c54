use std::{
    cmp::Ordering,
    fmt::{self, Binary, Display, LowerHex, UpperHex},
};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub fn unsigned_value(val: u128, width: u32) -> u128 {
    if width >= 128 {
        val
    } else {
        val & ((1 << width) - 1)
    }
}

/// Number of bits of a bit-vector, always in `1..=128`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Width(u32);

impl Width {
    pub const MAX: u32 = u128::BITS;

    pub const DEFAULT: Width = Width(8);

    pub fn new(width: u32) -> Result<Self> {
        if width == 0 || width > Self::MAX {
            return Err(Error::InvalidWidth(width));
        }

        Ok(Self(width))
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn mask(self) -> u128 {
        unsigned_value(u128::MAX, self.0)
    }

    #[inline]
    fn hex_digits(self) -> usize {
        self.0.div_ceil(4) as usize
    }
}

impl Default for Width {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl TryFrom<u32> for Width {
    type Error = Error;

    fn try_from(width: u32) -> Result<Self> {
        Self::new(width)
    }
}

impl From<Width> for u32 {
    fn from(width: Width) -> Self {
        width.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unsigned {
    value: u128,
    width: Width,
}

impl Unsigned {
    /// Creates a bit-vector of the given width. Bits above `width` are dropped.
    #[inline]
    pub fn new(value: u128, width: Width) -> Self {
        Self {
            value: unsigned_value(value, width.get()),
            width,
        }
    }

    #[inline]
    pub fn zero(width: Width) -> Self {
        Self { value: 0, width }
    }

    #[inline]
    pub fn value(&self) -> u128 {
        self.value
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.width
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    pub fn bit(&self, idx: u32) -> bool {
        idx < self.width.get() && (self.value >> idx) & 1 == 1
    }

    #[inline]
    pub fn msb(&self) -> bool {
        self.bit(self.width.get() - 1)
    }

    /// Bits from msb to lsb.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.width.get()).rev().map(|idx| self.bit(idx))
    }
}

impl PartialEq<u128> for Unsigned {
    fn eq(&self, other: &u128) -> bool {
        self.value == *other
    }
}

impl PartialOrd for Unsigned {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.width != other.width {
            return None;
        }

        Some(self.value.cmp(&other.value))
    }
}

impl From<Unsigned> for u128 {
    fn from(value: Unsigned) -> Self {
        value.value
    }
}

impl Display for Unsigned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.value, f)
    }
}

impl Binary for Unsigned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0b")?;
        }
        write!(f, "{:0width$b}", self.value, width = self.width.get() as usize)
    }
}

impl LowerHex for Unsigned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        write!(f, "{:0width$x}", self.value, width = self.width.hex_digits())
    }
}

impl UpperHex for Unsigned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        write!(f, "{:0width$X}", self.value, width = self.width.hex_digits())
    }
}
