//! QuickJS host binding CLI
//!
//! Entry point for `qjs-bind`. Parses CLI arguments and delegates to the
//! Session for execution.

use clap::Parser as ClapParser;
use engine_shim::Value;
use js_cli::runtime::format_stats;
use js_cli::{logger, Cli, CliError, Session};

fn report(error: &CliError) -> ! {
    eprintln!("Error: {}", error);
    if let Some(stack) = error.stack() {
        eprintln!("{}", stack.trim_end());
    }
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let mut session = match Session::new(cli.runtime_config()) {
        Ok(session) => session.with_json_output(cli.json),
        Err(e) => report(&e),
    };

    let outcome = if let Some(file) = &cli.file {
        Some(session.execute_file(file))
    } else if let Some(code) = &cli.eval {
        Some(session.execute_string(code))
    } else if cli.repl {
        if let Err(e) = session.repl() {
            report(&e);
        }
        None
    } else {
        println!("qjs-bind {}", engine_shim::VERSION);
        println!();
        println!("Usage:");
        println!("  qjs-bind --file <FILE>     Execute a JavaScript file");
        println!("  qjs-bind --eval <CODE>     Evaluate inline JavaScript code");
        println!("  qjs-bind --repl            Start interactive REPL");
        println!();
        println!("Run 'qjs-bind --help' for more options.");
        None
    };

    if let Some(result) = outcome {
        match result.and_then(|value| {
            if matches!(value, Value::Undefined) && !cli.json {
                Ok(None)
            } else {
                session.render(&value).map(Some)
            }
        }) {
            Ok(Some(text)) => println!("{}", text),
            Ok(None) => {}
            Err(e) => report(&e),
        }
    }

    if cli.stats {
        match session.stats() {
            Ok(stats) => eprintln!("{}", format_stats(&stats)),
            Err(e) => report(&e),
        }
    }
}
