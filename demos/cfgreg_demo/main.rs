//! Reads every data type from the command line and a configuration file.
//!
//! ```text
//! cargo run --example cfgreg_demo -- -i 3 --strings "[a, 'b c']" -c site.conf
//! ```
//!
//! Command line values win over the file. Set `RUST_LOG=cfgreg=debug` to see
//! what the registry does.

use std::cell::Cell;
use std::io;
use std::process::ExitCode;
use std::rc::Rc;

use cfgreg::{CfgError, DataType, Function, Param, Registry, Scalar, Value};

const DEFAULT_CONF_FILE: &str = "input.conf";
const PRIOR_CMD: u32 = 5;
const PRIOR_FILE: u32 = 1;

const WARNING: &str = "\x1B[35;1mWarning:\x1B[0m";
const ERROR: &str = "\x1B[31;1mError:\x1B[0m";

fn params() -> Vec<Param> {
    let p = |name: &str, dtype: DataType, short: char, long: &str, help: &str| {
        Param::new(name, dtype).short(short).long(long).help(help)
    };
    vec![
        p("CONF_FILE", DataType::STR, 'c', "conf", "Set the configuration file."),
        p("BOOL", DataType::BOOL, 'b', "bool", "Set the boolean type BOOL."),
        p("CHAR", DataType::CHAR, 'a', "char", "Set the char type CHAR."),
        p("INT", DataType::INT, 'i', "int", "Set the int type INT."),
        p("LONG", DataType::LONG, 'l', "long", "Set the long type LONG."),
        p("FLOAT", DataType::FLOAT, 'f', "float", "Set the float type FLOAT."),
        p("DOUBLE", DataType::DOUBLE, 'd', "double", "Set the double type DOUBLE."),
        p("STRING", DataType::STR, 's', "string", "Set the string type STRING."),
        p("BOOL_ARR", DataType::Array(Scalar::Bool), 'B', "bools", "Set BOOL_ARR."),
        p("CHAR_ARR", DataType::Array(Scalar::Char), 'A', "chars", "Set CHAR_ARR."),
        p("INT_ARR", DataType::Array(Scalar::Int), 'I', "ints", "Set INT_ARR."),
        p("LONG_ARR", DataType::Array(Scalar::Long), 'L', "longs", "Set LONG_ARR."),
        p("FLOAT_ARR", DataType::Array(Scalar::Float), 'F', "floats", "Set FLOAT_ARR."),
        p("DOUBLE_ARR", DataType::Array(Scalar::Double), 'D', "doubles", "Set DOUBLE_ARR."),
        p("STRING_ARR", DataType::Array(Scalar::Str), 'S', "strings", "Set STRING_ARR."),
    ]
}

fn run(reg: &mut Registry, args: &[String]) -> Result<ExitCode, CfgError> {
    let want_help = Rc::new(Cell::new(false));
    let want_license = Rc::new(Cell::new(false));

    let flag = Rc::clone(&want_help);
    let license = Rc::clone(&want_license);
    reg.add_functions(vec![
        Function::new(move || flag.set(true))
            .short('h')
            .long("help")
            .help("Display this message and exit."),
        Function::new(move || license.set(true))
            .long("license")
            .help("Display the license information."),
    ])?;
    report(reg);

    reg.add_params(params())?;
    report(reg);

    let optidx = reg.read_args(args, PRIOR_CMD)?;
    report(reg);

    if want_help.get() {
        print!("{}", reg.usage(args.first().map(String::as_str)));
        print!("{}", reg.help());
        return Ok(ExitCode::SUCCESS);
    }
    if want_license.get() {
        println!("This code is distributed under the MIT license.");
        return Ok(ExitCode::SUCCESS);
    }

    if optidx < args.len() {
        println!("Unused command line options:\n  {}", args[optidx..].join(" "));
    }

    let conf = reg
        .get::<String>("CONF_FILE")
        .unwrap_or_else(|| DEFAULT_CONF_FILE.to_string());
    reg.read_file(&conf, PRIOR_FILE)?;
    report(reg);

    let names: Vec<String> = reg.params().map(|p| p.name().to_string()).collect();
    for name in names {
        match reg.value(&name) {
            Some(value) => println!("{name}: {}", render(value)),
            None => println!("{name}: (unset)"),
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn render(value: &Value) -> String {
    let json = |v: &Value| serde_json::to_string(v).unwrap_or_default();
    match value {
        Value::Char(c) => format!("'{}'", char::from(*c)),
        Value::Str(s) => format!("\"{s}\""),
        Value::Bool(_) | Value::Int(_) | Value::Long(_) | Value::Float(_) | Value::Double(_) => {
            json(value)
        }
        array => format!("{} ({} elements)", json(array), array.len()),
    }
}

fn report(reg: &mut Registry) {
    // Nothing useful can be done if stderr is gone.
    let _ = reg.print_warnings(&mut io::stderr(), WARNING);
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut reg = Registry::new();
    match run(&mut reg, &args) {
        Ok(code) => code,
        Err(_) => {
            report(&mut reg);
            let _ = reg.print_error(&mut io::stderr(), ERROR);
            ExitCode::FAILURE
        }
    }
}
