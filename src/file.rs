//! Configuration file acquisition.
//!
//! A configuration file holds `name = value` entries, one per line, with
//! `#` comments. Array values are bracketed and may continue over several
//! lines by ending a line with `\` where the next element would start:
//!
//! ```text
//! # server settings
//! port = 8080
//! hosts = ["alpha", "beta", \
//!          "gamma"]          # three of them
//! ```
//!
//! Unknown names and malformed lines are warnings. A malformed value for a
//! known name fails the registry.

use std::fs::File;
use std::io::Read;
use std::ops::ControlFlow;
use std::path::Path;

use tracing::{debug, trace};

use crate::error::{CfgError, compose};
use crate::merge::{Decision, decide};
use crate::reader::{self, Event, ReadFailure};
use crate::registry::Registry;
use crate::types::{MAX_FILENAME_LEN, Origin};

impl Registry {
    /// Read the configuration file at `path`, committing values at `priority`.
    pub fn read_file(&mut self, path: impl AsRef<Path>, priority: u32) -> Result<(), CfgError> {
        self.ensure_ok()?;
        self.ensure_params()?;
        let path = path.as_ref();
        let fname = path.to_string_lossy();
        if fname.is_empty() {
            return Err(self.fail(CfgError::InvalidInput(
                "the input configuration file is not set".into(),
            )));
        }
        if fname.len() >= MAX_FILENAME_LEN {
            return Err(self.fail(CfgError::InvalidInput(
                "invalid filename of the configuration file".into(),
            )));
        }
        self.ensure_file_priority(&fname, priority)?;

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                debug!(path = %fname, error = %e, "cannot open configuration file");
                return Err(self.fail(CfgError::File(compose(
                    "cannot open the configuration file",
                    Some(&fname),
                ))));
            }
        };
        self.read_entries(&fname, file, priority)
    }

    /// Read configuration entries from any byte source.
    ///
    /// `label` names the source in diagnostics.
    pub fn read_source<R: Read>(&mut self, label: &str, src: R, priority: u32) -> Result<(), CfgError> {
        self.ensure_ok()?;
        self.ensure_params()?;
        self.ensure_file_priority(label, priority)?;
        self.read_entries(label, src, priority)
    }

    fn ensure_params(&mut self) -> Result<(), CfgError> {
        if self.params.is_empty() {
            return Err(self.fail(CfgError::Uninitialized(
                "no parameter has been registered".into(),
            )));
        }
        Ok(())
    }

    fn ensure_file_priority(&mut self, label: &str, priority: u32) -> Result<(), CfgError> {
        if priority == 0 {
            return Err(self.fail(CfgError::InvalidInput(compose(
                "invalid priority for configuration file",
                Some(label),
            ))));
        }
        Ok(())
    }

    fn read_entries<R: Read>(&mut self, label: &str, src: R, priority: u32) -> Result<(), CfgError> {
        debug!(source = label, priority, chunk = self.chunk_size, "reading configuration");
        let chunk = self.chunk_size;
        let mut fatal = None;
        let result = reader::read_lines(src, chunk, |event| {
            let outcome = match event {
                Event::Entry { key, value, line } => {
                    trace!(line, "configuration entry");
                    self.apply_entry(key, value, priority)
                }
                Event::Invalid { line } => self.warn(
                    "invalid configuration entry at line",
                    Some(&line.to_string()),
                ),
            };
            match outcome {
                Ok(()) => ControlFlow::Continue(()),
                Err(e) => {
                    fatal = Some(e);
                    ControlFlow::Break(())
                }
            }
        });

        match result {
            Ok(()) => Ok(()),
            Err(ReadFailure::Aborted) => match fatal {
                Some(err) => Err(err),
                None => Err(self.fail(CfgError::Unknown("unknown line parser status".into()))),
            },
            Err(ReadFailure::Truncated) => Err(self.fail(CfgError::File(compose(
                "unexpected end of file",
                Some(label),
            )))),
            Err(ReadFailure::Memory) => Err(self.fail(CfgError::OutOfMemory(compose(
                "failed to allocate memory for reading the file",
                Some(label),
            )))),
            Err(ReadFailure::Io(e)) => {
                debug!(source = label, error = %e, "read error");
                Err(self.fail(CfgError::File(compose(
                    "failed to read the configuration file",
                    Some(label),
                ))))
            }
        }
    }

    fn apply_entry(&mut self, key: &[u8], value: &[u8], priority: u32) -> Result<(), CfgError> {
        let Some(idx) = self.find_param(key) else {
            let name = String::from_utf8_lossy(key);
            return self.warn("unregistered parameter name", Some(&name));
        };
        match decide(self.params[idx].source, priority) {
            Decision::Accept => self.assign(idx, value, Origin::File, priority),
            Decision::Keep => Ok(()),
            Decision::Duplicate => {
                let name = self.params[idx].param.name.clone();
                self.warn("omitting duplicate entry of parameter", Some(&name))
            }
        }
    }
}
