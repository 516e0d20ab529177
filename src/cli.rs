use clap::{App, Arg, ArgMatches};
use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use crate::compiler::{codegen::GeneratorError, CompilerError};

// Exit Codes for different types of errors
pub const ERR_TYPE_CHECK: i32 = 1;
pub const ERR_INPUT: i32 = 2;
pub const ERR_OUTPUT: i32 = 3;
pub const ERR_RUNTIME: i32 = 4;

/// Serialization formats a syntax tree can be read from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Format {
    Json,
    Yaml,
}

pub fn print_errs(errs: &[CompilerError<GeneratorError>]) {
    for e in errs {
        println!("{}", e);
    }
}

pub fn configure_cli() -> clap::App<'static, 'static> {
    App::new("TIL Compiler")
        .version("0.1.0")
        .author("Erich Ess")
        .about("Type checks a TIL syntax tree and compiles it into postfix stack machine code")
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .takes_value(true)
                .required(true)
                .help("Serialized syntax tree to compile"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("File the postfix listing is written to.  The listing goes to stdout when omitted"),
        )
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .possible_values(&["json", "yaml"])
                .takes_value(true)
                .help("Format of the input file.  Defaults to the format named by the file extension"),
        )
        .arg(
            Arg::with_name("run")
                .short("r")
                .long("run")
                .help("Executes the compiled program and exits with its exit code"),
        )
        .arg(
            Arg::with_name("input-values")
                .long("input-values")
                .takes_value(true)
                .help("Comma separated list of values consumed by readi and readd when running"),
        )
        .arg(
            Arg::with_name("log-level")
                .long("log-level")
                .possible_values(&["error", "warn", "info", "debug", "trace"])
                .takes_value(true)
                .help("Prints the compiler's log to the console at the given level"),
        )
}

pub fn get_log_level(args: &ArgMatches) -> Option<LevelFilter> {
    match args.value_of("log-level") {
        Some("error") => Some(LevelFilter::Error),
        Some("warn") => Some(LevelFilter::Warn),
        Some("info") => Some(LevelFilter::Info),
        Some("debug") => Some(LevelFilter::Debug),
        Some("trace") => Some(LevelFilter::Trace),
        _ => None,
    }
}

pub fn configure_logging(level: LevelFilter) -> Result<(), SetLoggerError> {
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
}

/// The input format: given explicitly, or taken from the file extension.
pub fn get_format(args: &ArgMatches, input: &str) -> Option<Format> {
    match args.value_of("format") {
        Some("json") => Some(Format::Json),
        Some("yaml") => Some(Format::Yaml),
        _ if input.ends_with(".json") => Some(Format::Json),
        _ if input.ends_with(".yaml") || input.ends_with(".yml") => Some(Format::Yaml),
        _ => None,
    }
}

pub fn get_input_values<'a>(args: &'a ArgMatches) -> Vec<&'a str> {
    match args.value_of("input-values") {
        None => vec![],
        Some(values) => values.split(',').collect(),
    }
}
