//! Data types, values, and value provenance.

use std::fmt;

use serde::{Serialize, Serializer};

/// Parameter names and config-file keywords must be shorter than this.
pub const MAX_NAME_LEN: usize = 128;
/// Long command line options must be shorter than this.
pub const MAX_LONG_OPT_LEN: usize = 128;
/// Help messages must be shorter than this.
pub const MAX_HELP_LEN: usize = 1024;
/// Configuration file names must be shorter than this.
pub const MAX_FILENAME_LEN: usize = 1024;

pub(crate) const SYM_EQUAL: u8 = b'=';
pub(crate) const SYM_ARRAY_START: u8 = b'[';
pub(crate) const SYM_ARRAY_END: u8 = b']';
pub(crate) const SYM_ARRAY_SEP: u8 = b',';
pub(crate) const SYM_COMMENT: u8 = b'#';
pub(crate) const SYM_NEWLINE: u8 = b'\\';
pub(crate) const CMD_FLAG: u8 = b'-';
pub(crate) const CMD_ASSIGN: u8 = b'=';

/// A scalar element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    Bool,
    /// A single byte.
    Char,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    Float,
    Double,
    Str,
}

/// The declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Scalar(Scalar),
    /// A bracketed, comma-separated list of `Scalar` elements.
    Array(Scalar),
}

impl DataType {
    pub const BOOL: DataType = DataType::Scalar(Scalar::Bool);
    pub const CHAR: DataType = DataType::Scalar(Scalar::Char);
    pub const INT: DataType = DataType::Scalar(Scalar::Int);
    pub const LONG: DataType = DataType::Scalar(Scalar::Long);
    pub const FLOAT: DataType = DataType::Scalar(Scalar::Float);
    pub const DOUBLE: DataType = DataType::Scalar(Scalar::Double);
    pub const STR: DataType = DataType::Scalar(Scalar::Str);
}

/// A parsed parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Char(u8),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    BoolArray(Vec<bool>),
    CharArray(Vec<u8>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    StrArray(Vec<String>),
}

impl Value {
    /// Number of elements: 1 for scalars, the length for arrays.
    pub fn len(&self) -> usize {
        match self {
            Value::BoolArray(v) => v.len(),
            Value::CharArray(v) => v.len(),
            Value::IntArray(v) => v.len(),
            Value::LongArray(v) => v.len(),
            Value::FloatArray(v) => v.len(),
            Value::DoubleArray(v) => v.len(),
            Value::StrArray(v) => v.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(b) => s.serialize_bool(*b),
            Value::Char(c) => s.serialize_char(char::from(*c)),
            Value::Int(i) => s.serialize_i32(*i),
            Value::Long(l) => s.serialize_i64(*l),
            Value::Float(f) => s.serialize_f32(*f),
            Value::Double(d) => s.serialize_f64(*d),
            Value::Str(v) => s.serialize_str(v),
            Value::BoolArray(v) => v.serialize(s),
            Value::CharArray(v) => s.collect_seq(v.iter().map(|c| char::from(*c))),
            Value::IntArray(v) => v.serialize(s),
            Value::LongArray(v) => v.serialize(s),
            Value::FloatArray(v) => v.serialize(s),
            Value::DoubleArray(v) => v.serialize(s),
            Value::StrArray(v) => v.serialize(s),
        }
    }
}

/// Where a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Cli,
    File,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Cli => write!(f, "command line"),
            Origin::File => write!(f, "configuration file"),
        }
    }
}

/// Provenance of a parameter's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase", tag = "state")]
pub enum Source {
    #[default]
    Unset,
    SetBy { origin: Origin, priority: u32 },
}

impl Source {
    /// Priority of the stored value; 0 when unset.
    pub fn priority(self) -> u32 {
        match self {
            Source::Unset => 0,
            Source::SetBy { priority, .. } => priority,
        }
    }

    pub fn is_set(self) -> bool {
        !matches!(self, Source::Unset)
    }
}

/// Types that can be read back out of a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! from_value {
    ($ty:ty, $variant:ident) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

from_value!(bool, Bool);
from_value!(u8, Char);
from_value!(i32, Int);
from_value!(i64, Long);
from_value!(f32, Float);
from_value!(f64, Double);
from_value!(String, Str);
from_value!(Vec<bool>, BoolArray);
from_value!(Vec<u8>, CharArray);
from_value!(Vec<i32>, IntArray);
from_value!(Vec<i64>, LongArray);
from_value!(Vec<f32>, FloatArray);
from_value!(Vec<f64>, DoubleArray);
from_value!(Vec<String>, StrArray);
