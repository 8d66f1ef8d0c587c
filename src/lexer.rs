//! Character-level state machine for one configuration-file line.
//!
//! A logical line is one physical line, or several when an array is
//! continued with a trailing `\`. The lexer is fed one physical line at a
//! time and keeps its state across a [`Lexed::Continue`]. All offsets are
//! relative to the start of the logical line.

use std::ops::Range;

use crate::chars::{is_graph, is_ident, is_ident_start, is_print, is_quote, is_space};
use crate::types::{
    MAX_NAME_LEN, SYM_ARRAY_END, SYM_ARRAY_SEP, SYM_ARRAY_START, SYM_COMMENT, SYM_EQUAL,
    SYM_NEWLINE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Keyword,
    /// Bare keyword seen; waiting for `=`.
    Equal,
    ValueStart,
    Value,
    Quote,
    QuoteEnd,
    ArrayStart,
    ArrayValue,
    ArrayQuote,
    ArrayQuoteEnd,
    /// A `\` was seen where an array element could start.
    ArrayNewline,
    /// Blank out the rest of the physical line.
    Clean,
    ArrayEnd,
}

/// Outcome of scanning one physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Lexed {
    /// A keyword and its raw value. The value may end at a comment.
    Done {
        key: Range<usize>,
        value: Range<usize>,
    },
    /// Nothing to assign: blank, comment-only, or a keyword without value.
    Pass,
    /// Inside an open array; feed the next physical line.
    Continue,
    Error,
}

#[derive(Debug)]
pub(crate) struct LineLexer {
    state: State,
    key: Range<usize>,
    value_start: usize,
}

impl Default for LineLexer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineLexer {
    pub(crate) fn new() -> Self {
        Self {
            state: State::Start,
            key: 0..0,
            value_start: 0,
        }
    }

    /// Whether the last scan ended inside an open array.
    pub(crate) fn is_continuing(&self) -> bool {
        self.state != State::Start
    }

    /// Scan `line[from..]`, the next physical line of the logical line
    /// `line` (terminator excluded).
    ///
    /// Continuation markers and the comments following them are overwritten
    /// with spaces so the joined value reads as one array.
    pub(crate) fn scan(&mut self, line: &mut [u8], from: usize) -> Lexed {
        let result = self.run(line, from);
        self.state = match result {
            Lexed::Continue => State::ArrayStart,
            _ => State::Start,
        };
        result
    }

    fn done(&self, end: usize) -> Lexed {
        Lexed::Done {
            key: self.key.clone(),
            value: self.value_start..end,
        }
    }

    fn run(&mut self, line: &mut [u8], from: usize) -> Lexed {
        if from >= line.len() {
            return Lexed::Pass;
        }
        let mut quote = 0u8;
        let mut newline = None;
        let mut i = from;

        while i < line.len() {
            let c = line[i];
            match self.state {
                State::Start => {
                    if is_ident_start(c) {
                        self.key = i..i;
                        self.state = State::Keyword;
                    } else if c == SYM_COMMENT {
                        return Lexed::Pass;
                    } else if !is_space(c) {
                        return Lexed::Error;
                    }
                }
                State::Keyword => {
                    if c == SYM_EQUAL || is_space(c) {
                        if i - self.key.start >= MAX_NAME_LEN {
                            return Lexed::Error;
                        }
                        self.key.end = i;
                        self.state = if c == SYM_EQUAL {
                            State::ValueStart
                        } else {
                            State::Equal
                        };
                    } else if !is_ident(c) {
                        return Lexed::Error;
                    }
                }
                State::Equal => {
                    if c == SYM_EQUAL {
                        self.state = State::ValueStart;
                    } else if !is_space(c) {
                        return Lexed::Error;
                    }
                }
                State::ValueStart => {
                    if is_quote(c) {
                        quote = c;
                        self.value_start = i;
                        self.state = State::Quote;
                    } else if c == SYM_ARRAY_START {
                        self.value_start = i;
                        self.state = State::ArrayStart;
                    } else if c == SYM_COMMENT {
                        return Lexed::Pass;
                    } else if is_graph(c) {
                        self.value_start = i;
                        self.state = State::Value;
                    } else if !is_space(c) {
                        return Lexed::Error;
                    }
                }
                State::ArrayStart => {
                    if c == SYM_ARRAY_SEP || c == SYM_ARRAY_END || c == SYM_COMMENT {
                        return Lexed::Error;
                    } else if is_quote(c) {
                        quote = c;
                        self.state = State::ArrayQuote;
                    } else if c == SYM_NEWLINE {
                        newline = Some(i);
                        self.state = State::ArrayNewline;
                    } else if is_graph(c) {
                        self.state = State::ArrayValue;
                    } else if !is_space(c) {
                        return Lexed::Error;
                    }
                }
                State::Value => {
                    if c == SYM_COMMENT {
                        return self.done(i);
                    } else if !is_print(c) {
                        return Lexed::Error;
                    }
                }
                State::ArrayValue => {
                    if c == SYM_ARRAY_SEP {
                        self.state = State::ArrayStart;
                    } else if c == SYM_ARRAY_END {
                        self.state = State::ArrayEnd;
                    } else if c == SYM_COMMENT || !is_print(c) {
                        return Lexed::Error;
                    }
                }
                State::Quote => {
                    if c == quote {
                        self.state = State::QuoteEnd;
                    }
                }
                State::ArrayQuote => {
                    if c == quote {
                        self.state = State::ArrayQuoteEnd;
                    }
                }
                State::QuoteEnd | State::ArrayEnd => {
                    if c == SYM_COMMENT {
                        return self.done(i);
                    } else if !is_space(c) {
                        return Lexed::Error;
                    }
                }
                State::ArrayQuoteEnd => {
                    if c == SYM_ARRAY_SEP {
                        self.state = State::ArrayStart;
                    } else if c == SYM_ARRAY_END {
                        self.state = State::ArrayEnd;
                    } else if !is_space(c) {
                        return Lexed::Error;
                    }
                }
                State::ArrayNewline => {
                    if c == SYM_COMMENT {
                        line[i] = b' ';
                        if let Some(nl) = newline {
                            line[nl] = b' ';
                        }
                        self.state = State::Clean;
                    } else if !is_space(c) {
                        // Not a continuation after all: rescan this byte.
                        newline = None;
                        self.state = State::ArrayValue;
                        continue;
                    }
                }
                State::Clean => line[i] = b' ',
            }
            i += 1;
        }

        match self.state {
            State::Value | State::QuoteEnd | State::ArrayEnd => self.done(line.len()),
            State::Start | State::ValueStart => Lexed::Pass,
            State::ArrayNewline => {
                if let Some(nl) = newline {
                    line[nl] = b' ';
                }
                Lexed::Continue
            }
            State::Clean => Lexed::Continue,
            _ => Lexed::Error,
        }
    }
}
