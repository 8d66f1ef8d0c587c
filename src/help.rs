//! Usage and help text built from the registered declarations.

use crate::registry::Registry;
use crate::types::DataType;

impl Registry {
    /// `Usage: prog [OPTIONS] [FUNCTIONS]`, with singular forms for a single
    /// entry and a section left out when nothing of that kind is registered.
    ///
    /// Empty once the registry has failed.
    pub fn usage(&self, progname: Option<&str>) -> String {
        if self.diag.is_failed() {
            return String::new();
        }
        let prog = progname.filter(|p| !p.is_empty()).unwrap_or("program");
        let options = match self.params.len() {
            0 => "",
            1 => " [OPTION]",
            _ => " [OPTIONS]",
        };
        let functions = match self.funcs.len() {
            0 => "",
            1 => " [FUNCTION]",
            _ => " [FUNCTIONS]",
        };
        format!("Usage: {prog}{options}{functions}\n")
    }

    /// One entry per parameter, then one per function:
    ///
    /// ```text
    /// Options:
    ///  -c, --conf conf
    ///     Configuration file to read
    /// ```
    ///
    /// An empty section records a warning. Empty once the registry has failed.
    pub fn help(&mut self) -> String {
        if self.diag.is_failed() {
            return String::new();
        }
        let mut out = String::new();

        if self.params.is_empty() {
            // A failure to store the warning leaves the registry failed.
            if self.warn("the parameter list is not set", None).is_err() {
                return String::new();
            }
        } else {
            out.push_str(if self.params.len() > 1 { "Options:\n" } else { "Option:\n" });
            for slot in &self.params {
                let p = &slot.param;
                let name = (p.dtype != DataType::BOOL).then_some(p.name.as_str());
                push_entry(&mut out, p.short, p.long.as_deref(), name, p.help.as_deref());
            }
            out.push('\n');
        }

        if self.funcs.is_empty() {
            if self.warn("the function list is not set", None).is_err() {
                return String::new();
            }
        } else {
            out.push_str(if self.funcs.len() > 1 { "Functions:\n" } else { "Function:\n" });
            for r in &self.funcs {
                let f = &r.func;
                push_entry(&mut out, f.short, f.long.as_deref(), None, f.help.as_deref());
            }
            out.push('\n');
        }
        out
    }
}

fn push_entry(
    out: &mut String,
    short: Option<char>,
    long: Option<&str>,
    name: Option<&str>,
    help: Option<&str>,
) {
    if let Some(c) = short {
        out.push_str(&format!(" -{c}"));
        if long.is_some() {
            out.push(',');
        }
    }
    if let Some(l) = long {
        out.push_str(&format!(" --{l}"));
    }
    if let Some(n) = name {
        out.push_str(&format!(" {n}"));
    }
    if let Some(h) = help.filter(|h| !h.is_empty()) {
        out.push_str(&format!("\n    {h}"));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use crate::fixtures::test::{noop, with_counter};
    use crate::registry::{Function, Param, Registry};
    use crate::types::DataType;

    #[test]
    fn usage_plural_singular_and_missing() {
        let (reg, _) = with_counter();
        assert_eq!(reg.usage(Some("demo")), "Usage: demo [OPTIONS] [FUNCTION]\n");

        let mut reg = Registry::new();
        reg.add_params(vec![Param::new("x", DataType::INT)]).unwrap();
        assert_eq!(reg.usage(None), "Usage: program [OPTION]\n");
        assert_eq!(reg.usage(Some("")), "Usage: program [OPTION]\n");
    }

    #[test]
    fn help_lists_options_then_functions() {
        let mut reg = Registry::new();
        reg.add_params(vec![
            Param::new("conf", DataType::STR)
                .short('c')
                .long("conf")
                .help("Config file"),
            Param::new("verbose", DataType::BOOL).short('v'),
        ])
        .unwrap();
        reg.add_functions(vec![
            Function::new(noop).long("license").help("Show the license"),
        ])
        .unwrap();
        assert_eq!(
            reg.help(),
            "Options:\n \
             -c, --conf conf\n    Config file\n \
             -v\n\
             \n\
             Function:\n \
             --license\n    Show the license\n\
             \n"
        );
        assert!(reg.take_warnings().is_empty());
    }

    #[test]
    fn help_warns_about_empty_sections() {
        let mut reg = Registry::new();
        reg.add_params(vec![Param::new("x", DataType::INT).long("x")])
            .unwrap();
        assert_eq!(reg.help(), "Option:\n --x x\n\n");
        assert_eq!(reg.take_warnings(), vec!["the function list is not set"]);
    }

    #[test]
    fn failed_registry_renders_nothing() {
        let mut reg = Registry::new();
        let _ = reg.add_params(vec![]);
        assert_eq!(reg.usage(Some("demo")), "");
        assert_eq!(reg.help(), "");
    }
}
