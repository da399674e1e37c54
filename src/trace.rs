use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use derive_where::derive_where;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
pub use vcd::{IdCode, Value as TraceValue};
use vcd::{TimescaleUnit, VarType, Writer as VcdWriter};

use crate::unsigned::Unsigned;

pub trait Traceable {
    fn add_vars(&self, vars: &mut TraceVars);

    fn trace(&self, tracer: &mut Tracer) -> io::Result<()>;
}

impl<'a, T: Traceable> Traceable for &'a T {
    #[inline]
    fn add_vars(&self, vars: &mut TraceVars) {
        (*self).add_vars(vars);
    }

    #[inline]
    fn trace(&self, tracer: &mut Tracer) -> io::Result<()> {
        (*self).trace(tracer)
    }
}

pub(crate) fn bool_to_vcd(b: bool) -> TraceValue {
    if b {
        TraceValue::V1
    } else {
        TraceValue::V0
    }
}

#[derive(Debug, Clone, Copy)]
pub enum TraceTy {
    Wire,
    Bus(u32),
}

impl TraceTy {
    fn as_pair(&self) -> (u32, VarType) {
        match self {
            Self::Wire => (1, VarType::Wire),
            Self::Bus(w) => (*w, VarType::Reg),
        }
    }
}

#[derive(Debug, Clone)]
enum Command {
    PushSym(String),
    Var(&'static str, TraceTy),
    Pop,
}

/// Variable declarations collected before the VCD header is written.
#[derive(Debug, Default)]
pub struct TraceVars {
    commands: Vec<Command>,
}

impl TraceVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Traceable>(mut self, item: &T) -> Self {
        item.add_vars(&mut self);
        self
    }

    /// Opens a nested scope.
    #[inline]
    pub fn push_sym(&mut self, sym: &str) {
        self.commands.push(Command::PushSym(sym.to_string()));
    }

    #[inline]
    pub fn add_var(&mut self, sym: &'static str, ty: TraceTy) {
        self.commands.push(Command::Var(sym, ty));
    }

    #[inline]
    pub fn pop(&mut self) {
        self.commands.push(Command::Pop);
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Timescale {
    S(u32),
    MS(u32),
    US(u32),
    NS(u32),
    PS(u32),
    FS(u32),
}

impl Timescale {
    fn into_pair(self) -> (u32, TimescaleUnit) {
        match self {
            Self::S(ts) => (ts, TimescaleUnit::S),
            Self::MS(ts) => (ts, TimescaleUnit::MS),
            Self::US(ts) => (ts, TimescaleUnit::US),
            Self::NS(ts) => (ts, TimescaleUnit::NS),
            Self::PS(ts) => (ts, TimescaleUnit::PS),
            Self::FS(ts) => (ts, TimescaleUnit::FS),
        }
    }
}

impl Default for Timescale {
    fn default() -> Self {
        Self::PS(1)
    }
}

#[derive(Debug)]
struct VarName {
    stack: Vec<usize>,
    inner: String,
}

impl Default for VarName {
    fn default() -> Self {
        Self {
            stack: Vec::with_capacity(8),
            inner: String::with_capacity(32),
        }
    }
}

impl VarName {
    #[inline]
    fn as_str(&self) -> &str {
        self.inner.as_str()
    }

    fn push_sym(&mut self, sym: &str) {
        self.stack.push(self.inner.len());
        if !self.inner.is_empty() {
            self.inner.push('$');
        }
        self.inner.push_str(sym);
    }

    fn pop(&mut self) {
        if let Some(idx) = self.stack.pop() {
            self.inner.truncate(idx);
        }
    }

    /// Pushes `sym` and returns the full name. The caller pops.
    fn with_sym(&mut self, sym: &str) -> &str {
        self.push_sym(sym);
        self.as_str()
    }
}

#[derive_where(Debug)]
pub struct Tracer {
    syms: FxHashMap<String, IdCode>,
    scope: VarName,
    #[derive_where(skip)]
    vcd: VcdWriter<Box<dyn Write>>,
}

impl Tracer {
    pub fn open_vcd<P: AsRef<Path>>(
        path: P,
        vars: TraceVars,
        mod_name: &'static str,
        timescale: Option<Timescale>,
    ) -> io::Result<Self> {
        let writer = Box::new(BufWriter::new(File::create(path)?)) as Box<dyn Write>;
        Self::new(writer, vars, mod_name, timescale)
    }

    pub fn new(
        writer: Box<dyn Write>,
        vars: TraceVars,
        mod_name: &'static str,
        timescale: Option<Timescale>,
    ) -> io::Result<Self> {
        let mut vcd = VcdWriter::new(writer);
        let timescale = timescale.unwrap_or_default();
        let (ts, unit) = timescale.into_pair();
        vcd.timescale(ts, unit)?;
        vcd.add_module(mod_name)?;

        let mut syms: FxHashMap<String, IdCode> = Default::default();
        let mut var_name = VarName::default();
        for command in vars.commands {
            match command {
                Command::PushSym(sym) => {
                    vcd.add_module(&sym)?;
                    var_name.push_sym(&sym);
                }
                Command::Var(sym, ty) => {
                    let (width, var_ty) = ty.as_pair();
                    let code = vcd.add_var(var_ty, width, sym, None)?;
                    var_name.push_sym(sym);
                    syms.insert(var_name.as_str().to_string(), code);
                    var_name.pop();
                }
                Command::Pop => {
                    vcd.upscope()?;
                    var_name.pop();
                }
            }
        }
        vcd.upscope()?;
        vcd.enddefinitions()?;

        Ok(Self {
            syms,
            scope: VarName::default(),
            vcd,
        })
    }

    pub fn dump_time(&mut self, time: u64) -> io::Result<()> {
        self.vcd.timestamp(time)
    }

    pub fn trace<T: Traceable>(&mut self, value: &T) -> io::Result<()> {
        value.trace(self)
    }

    /// Runs `f` with variable lookups relative to the scope `sym`.
    pub fn with_scope<R>(
        &mut self,
        sym: &str,
        f: impl FnOnce(&mut Self) -> io::Result<R>,
    ) -> io::Result<R> {
        self.scope.push_sym(sym);
        let res = f(self);
        self.scope.pop();

        res
    }

    fn id(&mut self, sym: &str) -> Option<IdCode> {
        let id = self.syms.get(self.scope.with_sym(sym)).copied();
        self.scope.pop();

        id
    }

    /// Unknown symbols are ignored.
    pub fn change_wire(&mut self, sym: &str, value: bool) -> io::Result<()> {
        if let Some(id) = self.id(sym) {
            self.vcd.change_scalar(id, bool_to_vcd(value))?;
        }

        Ok(())
    }

    pub fn change_bus(&mut self, sym: &str, value: &Unsigned) -> io::Result<()> {
        if let Some(id) = self.id(sym) {
            let values = value
                .bits()
                .map(bool_to_vcd)
                .collect::<SmallVec<[TraceValue; 32]>>();
            self.vcd.change_vector(id, values)?;
        }

        Ok(())
    }

    #[inline]
    pub fn flush(&mut self) -> io::Result<()> {
        self.vcd.flush()
    }
}
