//! # Driver: thin glue from a module to a printed result
//!
//! Takes a parsed module and an entry name, compiles it, runs it, hands back
//! the value. No parsing lives here — `sexp`/`compile::lower` own that —
//! this module only wires the compiler to the VM rather than folding that
//! glue into either one.

use crate::ast::Module;
use crate::compile::compile_module;
use crate::error::Error;
use crate::value::Value;
use crate::{compile, sexp};

/// Compiles and runs `module` starting from `entry`.
pub fn run_module(module: &Module, entry: &str) -> Result<Value, Error> {
    let program = compile_module(module, entry)?;
    crate::vm::run(&program, entry)
}

/// Parses, lowers, and runs an entire file as a single module whose entry
/// point must be named `main`.
pub fn run_file(source: &str) -> Result<Value, Error> {
    let forms = sexp::parse_program(source)?;
    let module = compile::lower::lower_program(&forms)?;
    if !module.contains_key("main") {
        return Err(Error::compile(
            "file mode requires a top-level `(def main (...) ...)`",
        ));
    }
    run_module(&module, "main")
}
