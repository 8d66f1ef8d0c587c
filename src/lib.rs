//! Typed parameters from command line options and line-oriented
//! configuration files, merged by priority.
//!
//! Declare the parameters a program understands, then feed the registry its
//! command line and any number of configuration files. Every source carries
//! a priority; a value only replaces one of lower priority.
//!
//! ```
//! use cfgreg::{DataType, Function, Param, Registry, Scalar};
//!
//! let mut reg = Registry::new();
//! reg.add_params(vec![
//!     Param::new("conf", DataType::STR).short('c').long("conf").help("Configuration file"),
//!     Param::new("port", DataType::INT).short('p').long("port"),
//!     Param::new("hosts", DataType::Array(Scalar::Str)).long("hosts"),
//! ])?;
//! reg.add_functions(vec![Function::new(|| println!("v1")).long("version")])?;
//!
//! let args = ["prog", "--port", "8080"];
//! let rest = reg.read_args(&args, 5)?;
//! assert_eq!(rest, args.len());
//!
//! let file = "port = 80\nhosts = [alpha, \"beta\"]\n";
//! reg.read_source("inline.conf", file.as_bytes(), 1)?;
//!
//! assert_eq!(reg.get::<i32>("port"), Some(8080));
//! assert_eq!(reg.get::<Vec<String>>("hosts"), Some(vec!["alpha".into(), "beta".into()]));
//! assert!(reg.take_warnings().is_empty());
//! # Ok::<(), cfgreg::CfgError>(())
//! ```
//!
//! # Data types
//!
//! Seven scalar types (bool, char, int, long, float, double, string) and an
//! array of each. Booleans accept `1 T t true TRUE True` and `0 F f false
//! FALSE False`, and a boolean option given without an argument is true.
//! Values may be quoted with `'` or `"`; inside quotes `#`, `,` and `]` lose
//! their meaning. Arrays are written `[a, b, c]`; a bare single element is a
//! one-element array.
//!
//! # Configuration files
//!
//! One `name = value` entry per line, `#` comments, and arrays that may
//! continue onto the next line with a trailing `\`. See [`Registry::read_file`].
//!
//! # Priorities
//!
//! A value at priority `p` replaces a stored value of lower priority, is
//! dropped silently against a higher one, and is dropped with a warning
//! against an equal one. The origin of a value plays no part. Priorities
//! must be positive.
//!
//! # Diagnostics
//!
//! Unknown options, unknown names and malformed lines are warnings: they are
//! stored and can be drained with [`Registry::take_warnings`] or
//! [`Registry::print_warnings`]. Everything else is a [`CfgError`]. The first
//! error is sticky: every later registration or acquisition call returns it
//! without doing any work.
//!
//! # Features
//!
//! - `rich-errors`: derives `miette::Diagnostic` on [`CfgError`].

pub mod error;
pub mod types;

mod array;
mod chars;
mod cli;
mod coerce;
mod diagnostics;
mod file;
mod growth;
mod help;
mod lexer;
pub mod merge;
mod reader;
mod registry;

#[cfg(test)]
mod fixtures;

pub use error::CfgError;
pub use registry::{Function, Param, Registry};
pub use types::{
    DataType, FromValue, MAX_FILENAME_LEN, MAX_HELP_LEN, MAX_LONG_OPT_LEN, MAX_NAME_LEN, Origin,
    Scalar, Source, Value,
};
