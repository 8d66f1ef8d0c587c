//! The parameter registry: declarations, stored values, and diagnostics.
//!
//! A [`Registry`] owns every registered [`Param`] together with its current
//! value and [`Source`], every registered [`Function`] with its `called`
//! flag, and the diagnostics sink. [`Registry::read_args`] and
//! [`Registry::read_file`] both commit values through the rule in
//! [`merge`](crate::merge).
//!
//! Parameters are looked up by name:
//!
//! ```
//! use cfgreg::{DataType, Param, Registry};
//!
//! let mut reg = Registry::new();
//! reg.add_params(vec![Param::new("port", DataType::INT).short('p').long("port")])
//!     .unwrap();
//! reg.read_args(&["prog", "--port=8080"], 1).unwrap();
//! assert_eq!(reg.get::<i32>("port"), Some(8080));
//! ```

use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::array::{self, Split};
use crate::chars::{is_graph, is_ident, is_ident_start};
use crate::coerce::{Coerce, coerce, coerce_as};
use crate::diagnostics::Diagnostics;
use crate::error::{CfgError, CoerceError, compose};
use crate::reader::DEFAULT_CHUNK_SIZE;
use crate::types::{
    CMD_ASSIGN, DataType, FromValue, MAX_HELP_LEN, MAX_LONG_OPT_LEN, MAX_NAME_LEN, Origin,
    Scalar, Source, Value,
};

/// Declaration of a typed parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub(crate) name: String,
    pub(crate) dtype: DataType,
    pub(crate) short: Option<char>,
    pub(crate) long: Option<String>,
    pub(crate) help: Option<String>,
}

impl Param {
    /// A parameter known by `name` in configuration files.
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
            short: None,
            long: None,
            help: None,
        }
    }

    /// Short command line option, `-c`. Must be an ASCII letter.
    pub fn short(mut self, opt: char) -> Self {
        self.short = Some(opt);
        self
    }

    /// Long command line option, `--name`, given without the dashes.
    pub fn long(mut self, opt: impl Into<String>) -> Self {
        self.long = Some(opt.into());
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }
}

/// A command line action, invoked at most once per registry.
pub struct Function {
    pub(crate) handler: Box<dyn FnMut()>,
    /// `(function, argument)` addresses for handlers built by [`Function::bound`].
    identity: Option<(usize, usize)>,
    pub(crate) short: Option<char>,
    pub(crate) long: Option<String>,
    pub(crate) help: Option<String>,
}

impl Function {
    pub fn new(handler: impl FnMut() + 'static) -> Self {
        Self::with_identity(Box::new(handler), None)
    }

    /// A handler calling `f` with a shared argument.
    ///
    /// Two bound functions with the same `f` and the same `arg` allocation
    /// are duplicates and cannot both be registered.
    pub fn bound<T: 'static>(f: fn(&T), arg: Rc<T>) -> Self {
        let identity = (f as usize, Rc::as_ptr(&arg) as *const () as usize);
        Self::with_identity(Box::new(move || f(&arg)), Some(identity))
    }

    fn with_identity(handler: Box<dyn FnMut()>, identity: Option<(usize, usize)>) -> Self {
        Self {
            handler,
            identity,
            short: None,
            long: None,
            help: None,
        }
    }

    pub fn short(mut self, opt: char) -> Self {
        self.short = Some(opt);
        self
    }

    pub fn long(mut self, opt: impl Into<String>) -> Self {
        self.long = Some(opt.into());
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("short", &self.short)
            .field("long", &self.long)
            .field("help", &self.help)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub(crate) struct Slot {
    pub(crate) param: Param,
    pub(crate) value: Option<Value>,
    pub(crate) source: Source,
}

#[derive(Debug)]
pub(crate) struct Registered {
    pub(crate) func: Function,
    pub(crate) called: bool,
}

/// Typed parameters and command line functions, filled from the command line
/// and configuration files by priority.
#[derive(Debug)]
pub struct Registry {
    pub(crate) params: Vec<Slot>,
    pub(crate) funcs: Vec<Registered>,
    pub(crate) diag: Diagnostics,
    pub(crate) chunk_size: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// A registry whose file reader starts with a `bytes`-sized buffer
    /// (at least one byte).
    pub fn with_chunk_size(bytes: usize) -> Self {
        Self {
            params: Vec::new(),
            funcs: Vec::new(),
            diag: Diagnostics::new(),
            chunk_size: bytes.max(1),
        }
    }

    // -- Registration --------------------------------------------------------

    /// Validate and register parameters.
    ///
    /// Either every parameter of the call is registered or, on the first
    /// fatal problem, none is and the registry fails.
    pub fn add_params(&mut self, params: Vec<Param>) -> Result<(), CfgError> {
        self.ensure_ok()?;
        if params.is_empty() {
            return Err(self.fail(CfgError::InvalidInput(
                "the parameter list is not set".into(),
            )));
        }
        let mut batch: Vec<Param> = Vec::with_capacity(params.len());
        for (index, mut param) in params.into_iter().enumerate() {
            self.check_param(index, &mut param, &batch)?;
            batch.push(param);
        }
        debug!(count = batch.len(), total = self.params.len() + batch.len(), "registered parameters");
        self.params.extend(batch.into_iter().map(|param| Slot {
            param,
            value: None,
            source: Source::Unset,
        }));
        Ok(())
    }

    /// Validate and register command line functions, all or nothing.
    pub fn add_functions(&mut self, funcs: Vec<Function>) -> Result<(), CfgError> {
        self.ensure_ok()?;
        if funcs.is_empty() {
            return Err(self.fail(CfgError::InvalidInput(
                "the function list is not set".into(),
            )));
        }
        let mut batch: Vec<Function> = Vec::with_capacity(funcs.len());
        for (index, mut func) in funcs.into_iter().enumerate() {
            self.check_function(index, &mut func, &batch)?;
            batch.push(func);
        }
        debug!(count = batch.len(), total = self.funcs.len() + batch.len(), "registered functions");
        self.funcs.extend(
            batch
                .into_iter()
                .map(|func| Registered { func, called: false }),
        );
        Ok(())
    }

    fn check_param(&mut self, index: usize, p: &mut Param, batch: &[Param]) -> Result<(), CfgError> {
        let idx = index.to_string();
        if !valid_name(&p.name) {
            return Err(self.fail(CfgError::InvalidInput(compose(
                "invalid parameter name in the list with index",
                Some(&idx),
            ))));
        }
        if p.short.is_some_and(|c| !c.is_ascii_alphabetic()) {
            self.warn("invalid short command line option for parameter", Some(&p.name))?;
            p.short = None;
        }
        p.long = self.check_long(
            p.long.take(),
            "invalid long command line option for parameter",
            &p.name,
        )?;
        if p.help.as_ref().is_some_and(|h| h.len() >= MAX_HELP_LEN) {
            let key = option_label(p.short, p.long.as_deref());
            return Err(self.fail(CfgError::InvalidInput(compose(
                "invalid help (too long) for parameter",
                Some(&key),
            ))));
        }

        let conflict = self
            .params
            .iter()
            .map(|s| &s.param)
            .chain(batch)
            .find_map(|other| {
                if other.name == p.name {
                    Some(CfgError::Duplicate(compose(
                        "duplicate parameter name",
                        Some(&p.name),
                    )))
                } else {
                    clash(p.short, p.long.as_deref(), other.short, other.long.as_deref())
                }
            })
            .or_else(|| {
                self.funcs.iter().find_map(|r| {
                    clash(p.short, p.long.as_deref(), r.func.short, r.func.long.as_deref())
                })
            });
        match conflict {
            Some(err) => Err(self.fail(err)),
            None => Ok(()),
        }
    }

    fn check_function(
        &mut self,
        index: usize,
        f: &mut Function,
        batch: &[Function],
    ) -> Result<(), CfgError> {
        let idx = index.to_string();
        if f.short.is_some_and(|c| !c.is_ascii_alphabetic()) {
            self.warn("invalid short command line option for function index", Some(&idx))?;
            f.short = None;
        }
        f.long = self.check_long(
            f.long.take(),
            "invalid long command line option for function index",
            &idx,
        )?;
        if f.short.is_none() && f.long.is_none() {
            return Err(self.fail(CfgError::InvalidInput(compose(
                "no valid command line option for function index",
                Some(&idx),
            ))));
        }
        if f.help.as_ref().is_some_and(|h| h.len() >= MAX_HELP_LEN) {
            let key = option_label(f.short, f.long.as_deref());
            return Err(self.fail(CfgError::InvalidInput(compose(
                "invalid help (too long) for function",
                Some(&key),
            ))));
        }

        let conflict = self
            .funcs
            .iter()
            .map(|r| &r.func)
            .chain(batch)
            .find_map(|other| {
                if f.identity.is_some() && f.identity == other.identity {
                    Some(CfgError::Duplicate(compose(
                        "duplicate function with index",
                        Some(&idx),
                    )))
                } else {
                    clash(f.short, f.long.as_deref(), other.short, other.long.as_deref())
                }
            })
            .or_else(|| {
                self.params.iter().find_map(|s| {
                    clash(f.short, f.long.as_deref(), s.param.short, s.param.long.as_deref())
                })
            });
        match conflict {
            Some(err) => Err(self.fail(err)),
            None => Ok(()),
        }
    }

    /// Keep a long option only if every byte is graphic and not `=`.
    ///
    /// A bad byte drops the option with a warning; an option reaching
    /// [`MAX_LONG_OPT_LEN`] is fatal.
    fn check_long(
        &mut self,
        long: Option<String>,
        msg: &str,
        key: &str,
    ) -> Result<Option<String>, CfgError> {
        let Some(long) = long.filter(|l| !l.is_empty()) else {
            return Ok(None);
        };
        let bad = long
            .bytes()
            .take(MAX_LONG_OPT_LEN)
            .any(|b| !is_graph(b) || b == CMD_ASSIGN);
        if bad {
            self.warn(msg, Some(key))?;
            return Ok(None);
        }
        if long.len() >= MAX_LONG_OPT_LEN {
            return Err(self.fail(CfgError::InvalidInput(compose(msg, Some(key)))));
        }
        Ok(Some(long))
    }

    // -- Assignment ----------------------------------------------------------

    pub(crate) fn find_param(&self, name: &[u8]) -> Option<usize> {
        self.params
            .iter()
            .position(|s| s.param.name.as_bytes() == name)
    }

    /// Coerce `raw` into parameter `idx` and record where it came from.
    ///
    /// A malformed value fails the registry.
    pub(crate) fn assign(
        &mut self,
        idx: usize,
        raw: &[u8],
        origin: Origin,
        priority: u32,
    ) -> Result<(), CfgError> {
        let slot = &mut self.params[idx];
        match parse_value(raw, slot.param.dtype) {
            Ok(value) => {
                trace!(name = %slot.param.name, %origin, priority, len = value.len(), "assigned");
                slot.value = Some(value);
                slot.source = Source::SetBy { origin, priority };
                Ok(())
            }
            Err(e) => {
                let name = Some(slot.param.name.as_str());
                let err = match e {
                    CoerceError::Value => {
                        CfgError::InvalidValue(compose("invalid value for parameter", name))
                    }
                    CoerceError::Parse => CfgError::Parse(compose(
                        "failed to parse the value for parameter",
                        name,
                    )),
                };
                Err(self.fail(err))
            }
        }
    }

    // -- Queries -------------------------------------------------------------

    /// Whether the parameter holds a value from any source.
    pub fn is_set(&self, name: &str) -> bool {
        self.slot(name).is_some_and(|s| s.source.is_set())
    }

    /// Number of elements stored: 1 for a set scalar, the length for a set
    /// array, 0 when unset or unknown.
    pub fn size(&self, name: &str) -> usize {
        self.value(name).map_or(0, Value::len)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.slot(name).and_then(|s| s.value.as_ref())
    }

    /// Typed copy of the stored value; `None` when unset or of another type.
    pub fn get<T: FromValue>(&self, name: &str) -> Option<T> {
        self.value(name).and_then(T::from_value)
    }

    /// Provenance of the stored value; `None` for an unknown name.
    pub fn source(&self, name: &str) -> Option<Source> {
        self.slot(name).map(|s| s.source)
    }

    /// Registered parameter declarations, in registration order.
    pub fn params(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().map(|s| &s.param)
    }

    fn slot(&self, name: &str) -> Option<&Slot> {
        self.find_param(name.as_bytes()).map(|i| &self.params[i])
    }

    /// Every set parameter as a JSON object keyed by name.
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .params
            .iter()
            .filter_map(|s| {
                let value = s.value.as_ref()?;
                let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
                Some((s.param.name.clone(), json))
            })
            .collect();
        serde_json::Value::Object(map)
    }

    /// Deserialize the set parameters into `T`.
    ///
    /// Unset parameters are absent, so optional or defaulted fields fall
    /// back to serde's handling. A mismatch is reported but does not fail
    /// the registry.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, CfgError> {
        serde_json::from_value(self.to_json()).map_err(|e| {
            CfgError::InvalidValue(compose("failed to extract parameters", Some(&e.to_string())))
        })
    }

    // -- Diagnostics ---------------------------------------------------------

    /// The sticky error, once the registry has failed.
    pub fn error(&self) -> Option<&CfgError> {
        self.diag.error()
    }

    /// Stored warnings, without removing them.
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.diag.warnings()
    }

    /// Remove and return every stored warning.
    pub fn take_warnings(&mut self) -> Vec<String> {
        self.diag.drain_warnings()
    }

    /// Write and clear warnings, one `"{prefix} {message}."` line each.
    pub fn print_warnings<W: Write>(&mut self, out: &mut W, prefix: &str) -> io::Result<()> {
        self.diag.write_warnings(out, prefix)
    }

    /// Write the sticky error, if any.
    pub fn print_error<W: Write>(&self, out: &mut W, prefix: &str) -> io::Result<()> {
        self.diag.write_error(out, prefix)
    }

    pub(crate) fn ensure_ok(&self) -> Result<(), CfgError> {
        match self.diag.error() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    pub(crate) fn fail(&mut self, err: CfgError) -> CfgError {
        debug!(code = err.code(), error = %err, "registry failed");
        self.diag.fail(err)
    }

    pub(crate) fn warn(&mut self, msg: &str, key: Option<&str>) -> Result<(), CfgError> {
        self.diag.record(msg, key)
    }
}

/// Identifier grammar shared by parameter names and file keywords.
fn valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.split_first() {
        Some((first, rest)) => {
            is_ident_start(*first) && rest.iter().all(|b| is_ident(*b)) && bytes.len() < MAX_NAME_LEN
        }
        None => false,
    }
}

/// The long option if present, else `-c`, else empty.
fn option_label(short: Option<char>, long: Option<&str>) -> String {
    match (long, short) {
        (Some(l), _) => l.to_string(),
        (None, Some(c)) => format!("-{c}"),
        (None, None) => String::new(),
    }
}

/// The duplicate-option error, if two declarations share an option.
fn clash(
    short: Option<char>,
    long: Option<&str>,
    other_short: Option<char>,
    other_long: Option<&str>,
) -> Option<CfgError> {
    if let Some(c) = short.filter(|c| other_short == Some(*c)) {
        return Some(CfgError::Duplicate(compose(
            "duplicate short command line option",
            Some(&c.to_string()),
        )));
    }
    if let Some(l) = long.filter(|l| other_long == Some(*l)) {
        return Some(CfgError::Duplicate(compose(
            "duplicate long command line option",
            Some(l),
        )));
    }
    None
}

/// Coerce a raw value for a parameter of type `dtype`.
///
/// Array parameters accept a bracketed list or a single bare element.
fn parse_value(raw: &[u8], dtype: DataType) -> Result<Value, CoerceError> {
    let elem = match dtype {
        DataType::Scalar(ty) => return coerce(raw, ty),
        DataType::Array(elem) => elem,
    };
    let split = array::split(raw)?;
    match elem {
        Scalar::Bool => elements(raw, split).map(Value::BoolArray),
        Scalar::Char => elements(raw, split).map(Value::CharArray),
        Scalar::Int => elements(raw, split).map(Value::IntArray),
        Scalar::Long => elements(raw, split).map(Value::LongArray),
        Scalar::Float => elements(raw, split).map(Value::FloatArray),
        Scalar::Double => elements(raw, split).map(Value::DoubleArray),
        Scalar::Str => elements(raw, split).map(Value::StrArray),
    }
}

fn elements<T: Coerce>(raw: &[u8], split: Split) -> Result<Vec<T>, CoerceError> {
    match split {
        Split::Scalar => Ok(vec![coerce_as(raw)?]),
        Split::Array(spans) => spans.into_iter().map(|span| coerce_as(&raw[span])).collect(),
    }
}
