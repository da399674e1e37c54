use std::{
    borrow::Cow,
    fmt::{self, Display},
    rc::Rc,
};

use derive_where::derive_where;
use tracing::info;

pub trait FmtKind {}

#[derive_where(Clone, Debug)]
pub struct Formatter<T> {
    pub(crate) name: Rc<Cow<'static, str>>,
    #[derive_where(skip)]
    pub(crate) fmt: fn(&T, f: &mut fmt::Formatter<'_>) -> fmt::Result,
}

impl<T> Formatter<T> {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display<'a>(&'a self, value: &'a T) -> impl Display + 'a {
        struct Output<'a, T> {
            value: &'a T,
            fmt: &'a Formatter<T>,
        }

        impl<'a, T> Display for Output<'a, T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}: ", self.fmt.name)?;
                (self.fmt.fmt)(self.value, f)
            }
        }

        Output { value, fmt: self }
    }

    pub(crate) fn output(&self, cycle: u64, value: &T) {
        info!(target: "watch", cycle, "{}", self.display(value));
    }
}

pub trait Watchable<F: FmtKind>: Sized {
    fn formatter(name: impl Into<Cow<'static, str>>) -> Formatter<Self>;
}

macro_rules! impl_fmt_kind {
    ($( $kind:ident => $trait:ident ),+) => {
        $(
            pub struct $kind;

            impl FmtKind for $kind {}

            impl<T: std::fmt::$trait> Watchable<$kind> for T {
                fn formatter(name: impl Into<Cow<'static, str>>) -> Formatter<T> {
                    Formatter {
                        name: Rc::new(name.into()),
                        fmt: <T as std::fmt::$trait>::fmt
                    }
                }
            }
        )+
    };
}

impl_fmt_kind!(
    AsDebug => Debug,
    AsDisplay => Display,
    AsBinary => Binary,
    AsLowerHex => LowerHex,
    AsUpperHex => UpperHex
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unsigned::{Unsigned, Width};

    #[test]
    fn formats_with_name() {
        let val = Unsigned::new(0x2A, Width::new(8).unwrap());

        let fmt = <Unsigned as Watchable<AsDisplay>>::formatter("q");
        assert_eq!(fmt.display(&val).to_string(), "q: 42");

        let fmt = <Unsigned as Watchable<AsLowerHex>>::formatter("q");
        assert_eq!(fmt.display(&val).to_string(), "q: 2a");

        let fmt = <Unsigned as Watchable<AsBinary>>::formatter(String::from("reg"));
        assert_eq!(fmt.name(), "reg");
        assert_eq!(fmt.display(&val).to_string(), "reg: 00101010");
    }
}
