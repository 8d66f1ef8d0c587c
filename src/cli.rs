//! Command line acquisition.
//!
//! Options are `-c`, `-c=value`, `-c value`, `--name`, `--name=value` and
//! `--name value`. A token consumed as a value is never itself an option.
//! `--` ends scanning. Anything else that looks unfamiliar is warned about
//! and skipped, so the caller can keep positional arguments after the last
//! option and pick them up from the returned index.

use tracing::debug;

use crate::chars::is_graph;
use crate::error::{CfgError, compose};
use crate::merge::{Decision, decide};
use crate::registry::Registry;
use crate::types::{CMD_ASSIGN, CMD_FLAG, DataType, MAX_LONG_OPT_LEN, Origin};

/// Whether `arg` has the shape of a command line option.
pub(crate) fn is_option(arg: &str) -> bool {
    let b = arg.as_bytes();
    if b.len() < 2 || b[0] != CMD_FLAG {
        return false;
    }
    let third = b.get(2).copied();
    if b[1].is_ascii_alphabetic() {
        matches!(third, None | Some(CMD_ASSIGN))
    } else if b[1] == CMD_FLAG {
        third.is_none_or(|c| c != CMD_ASSIGN && is_graph(c))
    } else {
        false
    }
}

enum Target {
    Param(usize),
    Func(usize),
    Unknown,
}

impl Registry {
    /// Parse command line arguments. `args[0]` is the program name.
    ///
    /// Values are committed with origin [`Origin::Cli`] at `priority`.
    /// Returns the index of the first argument left unparsed: the one after
    /// `--`, or `args.len()`.
    pub fn read_args<S: AsRef<str>>(&mut self, args: &[S], priority: u32) -> Result<usize, CfgError> {
        self.ensure_ok()?;
        if self.params.is_empty() && self.funcs.is_empty() {
            return Err(self.fail(CfgError::Uninitialized(
                "no parameter or function has been registered".into(),
            )));
        }
        if priority == 0 {
            return Err(self.fail(CfgError::InvalidInput(
                "invalid priority for command line options".into(),
            )));
        }
        if args.is_empty() {
            return Ok(0);
        }
        debug!(count = args.len(), priority, "reading command line options");

        let mut i = 1;
        while i < args.len() {
            let arg: &str = args[i].as_ref();
            i += 1;
            if !is_option(arg) {
                self.warn("unrecognised command line option", Some(arg))?;
                continue;
            }
            if arg == "--" {
                return Ok(i);
            }

            // Only this many leading bytes are searched for `=`.
            let limit = MAX_LONG_OPT_LEN + 3;
            let (name, optarg) = match arg.bytes().take(limit).position(|b| b == CMD_ASSIGN) {
                Some(eq) => (&arg[..eq], Some(&arg[eq + 1..])),
                None if arg.len() > limit - 1 => {
                    return Err(self.fail(CfgError::CommandSyntax(compose(
                        "the command line option is too long",
                        Some(arg),
                    ))));
                }
                None => {
                    let next: Option<&str> = args.get(i).map(|s| s.as_ref());
                    match next {
                        Some(value) if !is_option(value) => {
                            i += 1;
                            (arg, Some(value))
                        }
                        _ => (arg, None),
                    }
                }
            };

            match self.lookup(name) {
                Target::Func(j) => self.call_function(j, name, optarg)?,
                Target::Param(j) => self.set_from_cli(j, name, optarg, priority)?,
                Target::Unknown => self.warn("unrecognised command line option", Some(name))?,
            }
        }
        Ok(args.len())
    }

    /// Resolve `-c` or `--long` (without any `=value`).
    fn lookup(&self, name: &str) -> Target {
        let bytes = name.as_bytes();
        if bytes[1] != CMD_FLAG {
            let c = char::from(bytes[1]);
            if let Some(j) = self.params.iter().position(|s| s.param.short == Some(c)) {
                return Target::Param(j);
            }
            if let Some(j) = self.funcs.iter().position(|r| r.func.short == Some(c)) {
                return Target::Func(j);
            }
        } else {
            let long = &name[2..];
            if let Some(j) = self
                .params
                .iter()
                .position(|s| s.param.long.as_deref() == Some(long))
            {
                return Target::Param(j);
            }
            if let Some(j) = self
                .funcs
                .iter()
                .position(|r| r.func.long.as_deref() == Some(long))
            {
                return Target::Func(j);
            }
        }
        Target::Unknown
    }

    fn call_function(&mut self, j: usize, name: &str, optarg: Option<&str>) -> Result<(), CfgError> {
        if let Some(value) = optarg {
            self.warn("omitting command line argument", Some(value))?;
        }
        if self.funcs[j].called {
            return self.warn("the function has already been called with option", Some(name));
        }
        debug!(option = name, "calling function");
        let entry = &mut self.funcs[j];
        (entry.func.handler)();
        entry.called = true;
        Ok(())
    }

    fn set_from_cli(
        &mut self,
        j: usize,
        name: &str,
        optarg: Option<&str>,
        priority: u32,
    ) -> Result<(), CfgError> {
        let slot = &self.params[j];
        match decide(slot.source, priority) {
            Decision::Keep => Ok(()),
            Decision::Duplicate => {
                let pname = slot.param.name.clone();
                self.warn("omitting duplicate entry of parameter", Some(&pname))
            }
            Decision::Accept => {
                let text = match optarg {
                    Some(v) if !v.is_empty() => v,
                    _ if slot.param.dtype == DataType::BOOL => "T",
                    _ => {
                        return Err(self.fail(CfgError::CommandSyntax(compose(
                            "argument not found for option",
                            Some(name),
                        ))));
                    }
                };
                self.assign(j, text.as_bytes(), Origin::Cli, priority)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{all_types, with_counter};
    use crate::registry::Param;
    use crate::types::{Source, Value};

    #[test]
    fn option_shapes() {
        for yes in ["-a", "-a=1", "-Z=", "--", "--name", "--x=1", "--a-b"] {
            assert!(is_option(yes), "{yes}");
        }
        for no in ["", "-", "a", "-1", "-ab", "-a1", "--=x", "-- x", "x-"] {
            assert!(!is_option(no), "{no}");
        }
    }

    #[test]
    fn triple_dash_is_a_long_option_shape() {
        // The third byte is graphic and not `=`.
        assert!(is_option("---"));
    }

    #[test]
    fn empty_argument_vector_returns_zero() {
        let mut reg = all_types();
        let none: [&str; 0] = [];
        assert_eq!(reg.read_args(&none, 1), Ok(0));
    }

    #[test]
    fn needs_registration_and_priority() {
        let mut reg = crate::Registry::new();
        let err = reg.read_args(&["prog"], 1).unwrap_err();
        assert_eq!(err.code(), -1);

        let mut reg = all_types();
        let err = reg.read_args(&["prog"], 0).unwrap_err();
        assert_eq!(err.message(), "invalid priority for command line options");
    }

    #[test]
    fn attached_and_separate_values() {
        let mut reg = all_types();
        // A dash followed by a digit is a value, not an option.
        let args = ["prog", "-i=4", "--long", "-9", "-s", "two words", "--double=2.5"];
        assert_eq!(reg.read_args(&args, 1), Ok(args.len()));
        assert_eq!(reg.get::<i32>("int"), Some(4));
        assert_eq!(reg.get::<i64>("long"), Some(-9));
        assert_eq!(reg.get::<String>("str"), Some("two words".into()));
        assert_eq!(reg.get::<f64>("double"), Some(2.5));
        assert_eq!(
            reg.source("int"),
            Some(Source::SetBy {
                origin: Origin::Cli,
                priority: 1
            })
        );
        assert!(reg.take_warnings().is_empty());
    }

    #[test]
    fn bool_without_argument_is_true() {
        let mut reg = all_types();
        reg.read_args(&["prog", "-b"], 1).unwrap();
        assert_eq!(reg.get::<bool>("bool"), Some(true));
    }

    #[test]
    fn bool_with_explicit_false() {
        let mut reg = all_types();
        reg.read_args(&["prog", "--bool=F"], 1).unwrap();
        assert_eq!(reg.get::<bool>("bool"), Some(false));
    }

    #[test]
    fn missing_argument_is_fatal_for_non_bool() {
        let mut reg = all_types();
        let err = reg.read_args(&["prog", "-i"], 1).unwrap_err();
        assert_eq!(
            err,
            CfgError::CommandSyntax("argument not found for option: -i".into())
        );
        let mut reg = all_types();
        let err = reg.read_args(&["prog", "--int="], 1).unwrap_err();
        assert_eq!(err.message(), "argument not found for option: --int");
    }

    #[test]
    fn next_option_is_not_consumed_as_value() {
        let mut reg = all_types();
        let err = reg.read_args(&["prog", "-i", "-b"], 1).unwrap_err();
        assert_eq!(err.code(), -8);
    }

    #[test]
    fn unknown_options_and_positionals_warn() {
        let mut reg = all_types();
        let end = reg.read_args(&["prog", "stray", "--nope", "-q"], 1).unwrap();
        assert_eq!(end, 4);
        assert_eq!(
            reg.take_warnings(),
            vec![
                "unrecognised command line option: stray",
                "unrecognised command line option: --nope",
                "unrecognised command line option: -q",
            ]
        );
    }

    #[test]
    fn double_dash_stops_scanning() {
        let mut reg = all_types();
        let args = ["prog", "-i", "1", "--", "-i", "2"];
        assert_eq!(reg.read_args(&args, 1), Ok(4));
        assert_eq!(reg.get::<i32>("int"), Some(1));
    }

    #[test]
    fn too_long_option_is_fatal() {
        let mut reg = all_types();
        let arg = format!("--{}", "x".repeat(MAX_LONG_OPT_LEN + 1));
        let err = reg.read_args(&["prog", arg.as_str()], 1).unwrap_err();
        assert_eq!(err.code(), -8);
        assert!(err.message().starts_with("the command line option is too long"));
    }

    #[test]
    fn longest_option_with_attached_value_is_accepted() {
        let mut reg = crate::Registry::new();
        let long = "x".repeat(MAX_LONG_OPT_LEN - 1);
        reg.add_params(vec![Param::new("x", DataType::INT).long(long.clone())])
            .unwrap();
        let arg = format!("--{long}=5");
        reg.read_args(&["prog", arg.as_str()], 1).unwrap();
        assert_eq!(reg.get::<i32>("x"), Some(5));
    }

    #[test]
    fn function_runs_once_across_spellings() {
        let (mut reg, count) = with_counter();
        reg.read_args(&["prog", "-h", "--help", "-h=now"], 1).unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(
            reg.take_warnings(),
            vec![
                "the function has already been called with option: --help",
                "omitting command line argument: now",
                "the function has already been called with option: -h",
            ]
        );
        reg.read_args(&["prog", "--help"], 2).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn function_discards_following_value() {
        let (mut reg, count) = with_counter();
        reg.read_args(&["prog", "--help", "topic"], 1).unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(
            reg.take_warnings(),
            vec!["omitting command line argument: topic"]
        );
    }

    #[test]
    fn equal_priority_is_a_duplicate() {
        let mut reg = all_types();
        reg.read_args(&["prog", "-i", "1", "-i", "2"], 3).unwrap();
        assert_eq!(reg.get::<i32>("int"), Some(1));
        assert_eq!(
            reg.take_warnings(),
            vec!["omitting duplicate entry of parameter: int"]
        );
    }

    #[test]
    fn higher_stored_priority_is_kept_silently() {
        let mut reg = all_types();
        reg.read_args(&["prog", "-i", "1"], 5).unwrap();
        reg.read_args(&["prog", "-i", "2"], 2).unwrap();
        assert_eq!(reg.get::<i32>("int"), Some(1));
        assert!(reg.take_warnings().is_empty());
        reg.read_args(&["prog", "-i", "3"], 9).unwrap();
        assert_eq!(reg.get::<i32>("int"), Some(3));
    }

    #[test]
    fn array_from_command_line() {
        let mut reg = all_types();
        reg.read_args(&["prog", "--int-array=[1, 2,3]", "--str-array", "solo"], 1)
            .unwrap();
        assert_eq!(reg.value("int-array"), Some(&Value::IntArray(vec![1, 2, 3])));
        assert_eq!(reg.get::<Vec<String>>("str-array"), Some(vec!["solo".to_string()]));
        assert_eq!(reg.size("int-array"), 3);
    }

    #[test]
    fn bad_value_is_fatal() {
        let mut reg = all_types();
        let err = reg.read_args(&["prog", "-i", "ten"], 1).unwrap_err();
        assert_eq!(
            err,
            CfgError::Parse("failed to parse the value for parameter: int".into())
        );
        let mut reg = all_types();
        let err = reg.read_args(&["prog", "-i", "10x"], 1).unwrap_err();
        assert_eq!(
            err,
            CfgError::InvalidValue("invalid value for parameter: int".into())
        );
    }

    #[test]
    fn accepts_owned_strings() {
        let mut reg = all_types();
        let args: Vec<String> = vec!["prog".into(), "-c".into(), "z".into()];
        reg.read_args(&args, 1).unwrap();
        assert_eq!(reg.get::<u8>("char"), Some(b'z'));
    }
}
