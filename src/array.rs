//! Split a bracketed, comma-separated value into element spans.
//!
//! Only the structure is checked here. Each span still carries its own
//! whitespace and quotes and is coerced separately, in order.

use std::ops::Range;

use crate::chars::{is_graph, is_print, is_quote, is_space};
use crate::error::CoerceError;
use crate::types::{SYM_ARRAY_END, SYM_ARRAY_SEP, SYM_ARRAY_START, SYM_COMMENT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Split {
    /// Not bracketed: the whole value is a single element.
    Scalar,
    /// Element spans into the input, in source order.
    Array(Vec<Range<usize>>),
}

#[derive(Clone, Copy)]
enum State {
    Start,
    Element,
    Bare,
    Quoted(u8),
    QuoteEnd,
    End,
}

pub(crate) fn split(raw: &[u8]) -> Result<Split, CoerceError> {
    let mut state = State::Start;
    let mut segments = Vec::new();
    let mut seg_start = 0;

    for (i, &c) in raw.iter().enumerate() {
        state = match state {
            State::Start => {
                if c == SYM_ARRAY_START {
                    seg_start = i + 1;
                    State::Element
                } else if is_space(c) {
                    State::Start
                } else {
                    return Ok(Split::Scalar);
                }
            }
            State::Element => {
                if c == SYM_ARRAY_SEP || c == SYM_ARRAY_END || c == SYM_COMMENT {
                    return Err(CoerceError::Value);
                } else if is_quote(c) {
                    State::Quoted(c)
                } else if is_graph(c) {
                    State::Bare
                } else if is_space(c) {
                    State::Element
                } else {
                    return Err(CoerceError::Value);
                }
            }
            State::Bare | State::QuoteEnd => {
                if c == SYM_ARRAY_SEP || c == SYM_ARRAY_END {
                    segments.push(seg_start..i);
                    seg_start = i + 1;
                    if c == SYM_ARRAY_SEP {
                        State::Element
                    } else {
                        State::End
                    }
                } else if matches!(state, State::Bare) && c != SYM_COMMENT && is_print(c) {
                    State::Bare
                } else if matches!(state, State::QuoteEnd) && is_space(c) {
                    State::QuoteEnd
                } else {
                    return Err(CoerceError::Value);
                }
            }
            State::Quoted(q) => {
                if c == q {
                    State::QuoteEnd
                } else {
                    State::Quoted(q)
                }
            }
            State::End => {
                if c == SYM_COMMENT {
                    break;
                } else if is_graph(c) {
                    return Err(CoerceError::Value);
                }
                State::End
            }
        };
    }

    match state {
        State::Start => Ok(Split::Scalar),
        State::End => Ok(Split::Array(segments)),
        _ => Err(CoerceError::Value),
    }
}
