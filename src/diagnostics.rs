//! Append-only store of warning and error messages.
//!
//! Entries are kept back to back in one text buffer. Warnings can be drained
//! after every acquisition call; the terminal error, once recorded, survives
//! every drain and marks the sink failed for good.

use std::io::{self, Write};

use crate::error::{CfgError, compose};
use crate::growth;

#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    text: String,
    /// End offset of every entry in `text`.
    ends: Vec<usize>,
    failure: Option<CfgError>,
    /// Index of the entry holding the failure's own message.
    failure_entry: Option<usize>,
}

impl Diagnostics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append `"msg"` or `"msg: key"`. Empty messages are ignored.
    ///
    /// Fails, and marks the sink failed, if the buffer cannot grow.
    pub(crate) fn record(&mut self, msg: &str, key: Option<&str>) -> Result<(), CfgError> {
        if msg.is_empty() {
            return Ok(());
        }
        let entry = compose(msg, key);
        self.push(&entry)
    }

    /// Record `err` as the terminal error and return the error now in effect.
    ///
    /// If the message itself cannot be stored the sink fails with an
    /// out-of-memory error instead.
    pub(crate) fn fail(&mut self, err: CfgError) -> CfgError {
        if let Some(existing) = &self.failure {
            return existing.clone();
        }
        match self.push(err.message()) {
            Ok(()) => {
                self.failure_entry = Some(self.ends.len() - 1);
                self.failure = Some(err.clone());
                err
            }
            Err(oom) => oom,
        }
    }

    /// The sticky error, if any.
    pub(crate) fn error(&self) -> Option<&CfgError> {
        self.failure.as_ref()
    }

    pub(crate) fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Number of stored warnings, excluding the terminal error entry.
    pub(crate) fn warning_count(&self) -> usize {
        self.ends.len() - usize::from(self.failure_entry.is_some())
    }

    /// Iterate over stored warnings without removing them.
    pub(crate) fn warnings(&self) -> impl Iterator<Item = &str> {
        (0..self.ends.len())
            .filter(move |i| Some(*i) != self.failure_entry)
            .map(move |i| self.entry(i))
    }

    /// Remove and return every warning; the terminal error entry stays.
    pub(crate) fn drain_warnings(&mut self) -> Vec<String> {
        if self.warning_count() == 0 {
            return Vec::new();
        }
        let drained: Vec<String> = self.warnings().map(str::to_string).collect();
        let kept = self.failure_entry.map(|i| self.entry(i).to_string());
        self.text.clear();
        self.ends.clear();
        self.failure_entry = None;
        if let Some(msg) = kept {
            self.text.push_str(&msg);
            self.ends.push(self.text.len());
            self.failure_entry = Some(0);
        }
        drained
    }

    /// Drain warnings into `out`, one `"{prefix} {message}."` line each.
    pub(crate) fn write_warnings<W: Write>(&mut self, out: &mut W, prefix: &str) -> io::Result<()> {
        for warning in self.drain_warnings() {
            write_line(out, prefix, &warning)?;
        }
        Ok(())
    }

    /// Write the terminal error, if any, without clearing it.
    pub(crate) fn write_error<W: Write>(&self, out: &mut W, prefix: &str) -> io::Result<()> {
        match &self.failure {
            Some(err) => write_line(out, prefix, err.message()),
            None => Ok(()),
        }
    }

    fn entry(&self, i: usize) -> &str {
        let start = if i == 0 { 0 } else { self.ends[i - 1] };
        &self.text[start..self.ends[i]]
    }

    fn push(&mut self, entry: &str) -> Result<(), CfgError> {
        let needed = self.text.len().checked_add(entry.len());
        let target = needed.and_then(|n| growth::capacity_for(self.text.capacity(), n));
        let Some(target) = target else {
            return Err(self.out_of_memory());
        };
        if target > self.text.capacity()
            && self
                .text
                .try_reserve_exact(target - self.text.len())
                .is_err()
        {
            return Err(self.out_of_memory());
        }
        self.text.push_str(entry);
        self.ends.push(self.text.len());
        Ok(())
    }

    fn out_of_memory(&mut self) -> CfgError {
        let err = CfgError::OutOfMemory("failed to allocate memory for messages".into());
        self.failure = Some(err.clone());
        err
    }
}

fn write_line<W: Write>(out: &mut W, prefix: &str, msg: &str) -> io::Result<()> {
    if prefix.is_empty() {
        writeln!(out, "{msg}.")
    } else {
        writeln!(out, "{prefix} {msg}.")
    }
}
