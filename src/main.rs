//! TinyCPS runtime entry point.
//!
//! Behavior summary:
//! - With no arguments, start the interactive REPL.
//! - With `-h`/`--help`, print usage.
//! - With `-v`/`--version`, print a build-identifier string.
//! - With a single path argument, read the file as a module, require a
//!   `main` entry, compile it, run it, and print the result value.

use std::env;
use std::fs;
use std::process::exit;

use tinycps_runtime::{driver, repl};

/// Human-facing version string for this runtime.
const VERSION: &str = "0.1.0";

fn usage() -> String {
    format!(
        r#"TinyCPS Runtime v{0}

Usage:
    tinycps <script.tcps>

Arguments:
    <script.tcps>
        Path to a TinyCPS source file to compile and run. The file must
        define a top-level `(def main (...) ...)`.

Example:
    tinycps fact.tcps

Options:
    -h, --help
        Show this help message and exit.
    -v, --version
        Show runtime version."#,
        VERSION
    )
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() == 1 {
        repl::run_repl();
        return;
    }

    if args[1] == "-h" || args[1] == "--help" {
        println!("{}", usage());
        return;
    }

    if args[1] == "-v" || args[1] == "--version" {
        println!(
            "tinycps-build-{}-{}: v{}",
            env::consts::OS,
            env::consts::ARCH,
            VERSION
        );
        return;
    }

    let path = &args[1];
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("failed to read '{}': {}", path, e);
            exit(1);
        }
    };

    match driver::run_file(&source) {
        Ok(value) => println!("{}", value),
        Err(e) => {
            eprintln!("{}", e);
            exit(1);
        }
    }
}
