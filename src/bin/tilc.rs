extern crate log;
extern crate simplelog;

use std::fs::File;
use std::io::Write;
use std::process::exit;

use log::*;

use til_lang::compiler::{ast::Unit, codegen::compile};
use til_lang::vm::Machine;
use til_lang::*;

fn main() {
    let config = configure_cli().get_matches();

    if let Some(level) = get_log_level(&config) {
        if let Err(e) = configure_logging(level) {
            eprintln!("Failed to configure logger: {}", e);
        }
    }

    let input = config
        .value_of("input")
        .expect("Expected a syntax tree to compile");
    let format = match get_format(&config, input) {
        Some(format) => format,
        None => {
            eprintln!("Cannot tell the format of {}: use --format", input);
            exit(ERR_INPUT)
        }
    };

    let mut unit = match read_unit(input, format) {
        Ok(unit) => unit,
        Err(msg) => {
            eprintln!("Could not read {}: {}", input, msg);
            exit(ERR_INPUT)
        }
    };

    let listing = match compile(&mut unit) {
        Ok(listing) => listing,
        Err(errs) => {
            print_errs(&errs);
            exit(ERR_TYPE_CHECK)
        }
    };
    info!("Generated {} instructions", listing.len());

    let written = match config.value_of("output") {
        Some(output) => File::create(output)
            .and_then(|mut f| write!(f, "{}", listing))
            .map_err(|e| format!("{}: {}", output, e)),
        None => {
            if config.is_present("run") {
                Ok(())
            } else {
                print!("{}", listing);
                Ok(())
            }
        }
    };
    if let Err(msg) = written {
        eprintln!("Failed to write the listing to {}", msg);
        exit(ERR_OUTPUT)
    }

    if config.is_present("run") {
        let code = Machine::load(listing.instructions()).and_then(|machine| {
            let mut machine = machine.with_input(get_input_values(&config));
            let result = machine.run();
            print!("{}", machine.output());
            result
        });
        match code {
            Ok(code) => exit(code),
            Err(e) => {
                eprintln!("Runtime error: {}", e);
                exit(ERR_RUNTIME)
            }
        }
    }
}

fn read_unit(path: &str, format: Format) -> Result<Unit, String> {
    let file = File::open(path).map_err(|e| format!("{}", e))?;
    match format {
        Format::Json => serde_json::from_reader(file).map_err(|e| format!("{}", e)),
        Format::Yaml => serde_yaml::from_reader(file).map_err(|e| format!("{}", e)),
    }
}
