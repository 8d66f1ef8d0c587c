//! Turn one raw token into a scalar [`Value`].
//!
//! Pure and allocation-free except for strings. The token may carry
//! surrounding whitespace and may be wrapped in single or double quotes.

use crate::chars::{is_quote, is_space};
use crate::error::CoerceError;
use crate::types::{Scalar, Value};

const TRUE_LITERALS: [&[u8]; 6] = [b"1", b"T", b"t", b"true", b"TRUE", b"True"];
const FALSE_LITERALS: [&[u8]; 6] = [b"0", b"F", b"f", b"false", b"FALSE", b"False"];

/// A scalar element type read from a single token.
pub(crate) trait Coerce: Sized {
    const SCALAR: Scalar;

    /// Parse the token content left after [`unquote`].
    fn from_content(content: &[u8]) -> Result<Self, CoerceError>;
}

impl Coerce for bool {
    const SCALAR: Scalar = Scalar::Bool;

    fn from_content(content: &[u8]) -> Result<Self, CoerceError> {
        parse_bool(content)
    }
}

impl Coerce for u8 {
    const SCALAR: Scalar = Scalar::Char;

    fn from_content(content: &[u8]) -> Result<Self, CoerceError> {
        parse_char(content)
    }
}

impl Coerce for i32 {
    const SCALAR: Scalar = Scalar::Int;

    fn from_content(content: &[u8]) -> Result<Self, CoerceError> {
        parse_number(content, int_prefix_len)
    }
}

impl Coerce for i64 {
    const SCALAR: Scalar = Scalar::Long;

    fn from_content(content: &[u8]) -> Result<Self, CoerceError> {
        parse_number(content, int_prefix_len)
    }
}

impl Coerce for f32 {
    const SCALAR: Scalar = Scalar::Float;

    fn from_content(content: &[u8]) -> Result<Self, CoerceError> {
        parse_number(content, float_prefix_len)
    }
}

impl Coerce for f64 {
    const SCALAR: Scalar = Scalar::Double;

    fn from_content(content: &[u8]) -> Result<Self, CoerceError> {
        parse_number(content, float_prefix_len)
    }
}

impl Coerce for String {
    const SCALAR: Scalar = Scalar::Str;

    fn from_content(content: &[u8]) -> Result<Self, CoerceError> {
        String::from_utf8(content.to_vec()).map_err(|_| CoerceError::Parse)
    }
}

/// Coerce `raw` into a native `T`.
pub(crate) fn coerce_as<T: Coerce>(raw: &[u8]) -> Result<T, CoerceError> {
    T::from_content(unquote(raw, T::SCALAR)?)
}

/// Coerce `raw` into a value of type `ty`.
pub(crate) fn coerce(raw: &[u8], ty: Scalar) -> Result<Value, CoerceError> {
    match ty {
        Scalar::Bool => coerce_as(raw).map(Value::Bool),
        Scalar::Char => coerce_as(raw).map(Value::Char),
        Scalar::Int => coerce_as(raw).map(Value::Int),
        Scalar::Long => coerce_as(raw).map(Value::Long),
        Scalar::Float => coerce_as(raw).map(Value::Float),
        Scalar::Double => coerce_as(raw).map(Value::Double),
        Scalar::Str => coerce_as(raw).map(Value::Str),
    }
}

/// Strip leading whitespace and either the quotes or the trailing whitespace.
fn unquote(raw: &[u8], ty: Scalar) -> Result<&[u8], CoerceError> {
    let start = raw
        .iter()
        .position(|b| !is_space(*b))
        .ok_or(CoerceError::Value)?;
    let rest = &raw[start..];
    let first = rest[0];

    if !is_quote(first) {
        let end = rest.iter().rposition(|b| !is_space(*b)).map_or(0, |p| p + 1);
        return Ok(&rest[..end]);
    }

    let inner = &rest[1..];
    let close = inner
        .iter()
        .position(|b| *b == first)
        .ok_or(CoerceError::Value)?;
    let content = &inner[..close];
    if content.is_empty() && !matches!(ty, Scalar::Char | Scalar::Str) {
        return Err(CoerceError::Value);
    }
    if inner[close + 1..].iter().any(|b| !is_space(*b)) {
        return Err(CoerceError::Value);
    }
    Ok(content)
}

fn parse_bool(content: &[u8]) -> Result<bool, CoerceError> {
    if TRUE_LITERALS.contains(&content) {
        Ok(true)
    } else if FALSE_LITERALS.contains(&content) {
        Ok(false)
    } else {
        Err(CoerceError::Parse)
    }
}

/// First byte; an empty quoted char is the zero byte.
fn parse_char(content: &[u8]) -> Result<u8, CoerceError> {
    let Some((&first, rest)) = content.split_first() else {
        return Ok(0);
    };
    if rest.iter().any(|b| !is_space(*b)) {
        return Err(CoerceError::Value);
    }
    Ok(first)
}

/// Parse the longest numeric prefix and require only whitespace after it.
fn parse_number<T: std::str::FromStr>(
    content: &[u8],
    prefix_len: fn(&[u8]) -> usize,
) -> Result<T, CoerceError> {
    let start = content
        .iter()
        .position(|b| !is_space(*b))
        .unwrap_or(content.len());
    let body = &content[start..];
    let n = prefix_len(body);
    if n == 0 {
        return Err(CoerceError::Parse);
    }
    // The prefix is ASCII by construction.
    let text = std::str::from_utf8(&body[..n]).map_err(|_| CoerceError::Parse)?;
    let value = text.parse::<T>().map_err(|_| CoerceError::Parse)?;
    if body[n..].iter().any(|b| !is_space(*b)) {
        return Err(CoerceError::Value);
    }
    Ok(value)
}

fn digits(s: &[u8]) -> usize {
    s.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn sign(s: &[u8]) -> usize {
    usize::from(matches!(s.first(), Some(b'+' | b'-')))
}

fn int_prefix_len(s: &[u8]) -> usize {
    let i = sign(s);
    match digits(&s[i..]) {
        0 => 0,
        d => i + d,
    }
}

fn float_prefix_len(s: &[u8]) -> usize {
    let mut i = sign(s);
    for word in [&b"infinity"[..], b"inf", b"nan"] {
        if s.len() >= i + word.len() && s[i..i + word.len()].eq_ignore_ascii_case(word) {
            return i + word.len();
        }
    }

    let int = digits(&s[i..]);
    i += int;
    let mut frac = 0;
    if s.get(i) == Some(&b'.') {
        frac = digits(&s[i + 1..]);
        if int + frac > 0 {
            i += 1 + frac;
        }
    }
    if int + frac == 0 {
        return 0;
    }

    if matches!(s.get(i), Some(b'e' | b'E')) {
        let j = i + 1 + sign(&s[i + 1..]);
        let exp = digits(&s[j..]);
        if exp > 0 {
            i = j + exp;
        }
    }
    i
}
