//! # Interactive REPL
//!
//! Runs entirely in-process: the compiler and VM are native Rust, so every
//! line is lowered, compiled, and run directly, with no subprocess involved.
//!
//! The loop itself is a straightforward prompt/read/execute/report cycle,
//! tracking paren balance to know when a multi-line form is complete (there
//! are no string literals in the surface syntax to carve out). Each
//! completed line is classified as a definition, a bare call, or a bare
//! constant, and handled accordingly.

use std::io::{self, Write};

use crate::ast::{Call, Func, Module};
use crate::compile::lower;
use crate::driver;
use crate::error::Error;
use crate::sexp::{self, Sexp};
use crate::value::Value;

const SYNTHETIC_ENTRY: &str = "__main__";

/// The REPL's persistent state: whatever `def`s have been accepted so far.
/// Kept separate from the read/parse loop so it can be unit-tested without
/// driving stdin.
pub struct Repl {
    module: Module,
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

impl Repl {
    pub fn new() -> Self {
        Repl {
            module: Module::new(),
        }
    }

    /// Lowers and handles one parsed top-level form, returning the value
    /// produced if the line caused something to run (`def main` for the
    /// first time, or a bare call/constant), or `None` for a plain
    /// definition. On error the module is left exactly as it was before
    /// this call.
    pub fn eval_line(&mut self, form: &Sexp) -> Result<Option<Value>, Error> {
        if lower::is_def_form(form) {
            self.eval_def(form)
        } else {
            self.eval_transient(form)
        }
    }

    fn eval_def(&mut self, form: &Sexp) -> Result<Option<Value>, Error> {
        let (name, func) = lower::lower_def(form)?;
        let introduces_main = name == "main" && !self.module.contains_key("main");
        self.module.insert(name, func);

        if !introduces_main {
            return Ok(None);
        }

        // Defining `main` for the first time immediately makes the program
        // runnable, by wiring a synthetic entry that calls it with the
        // finish continuation.
        let synthetic = Func {
            params: vec!["ret".to_string()],
            body: Call {
                target: "main".to_string(),
                args: vec![crate::ast::Expr::Finish],
            },
        };
        self.module.insert(SYNTHETIC_ENTRY.to_string(), synthetic);
        let result = driver::run_module(&self.module, SYNTHETIC_ENTRY);
        self.module.remove(SYNTHETIC_ENTRY);
        result.map(Some)
    }

    /// A bare call or bare constant: wrapped as a throwaway `__main__` and
    /// evaluated against the current module, without persisting anything.
    fn eval_transient(&mut self, form: &Sexp) -> Result<Option<Value>, Error> {
        let body = match form {
            Sexp::List(_) => lower::lower_call(form)?,
            _ => {
                let expr = lower::lower_argument(form)?;
                Call {
                    target: "ret".to_string(),
                    args: vec![expr],
                }
            }
        };
        let synthetic = Func {
            params: vec!["ret".to_string()],
            body,
        };
        self.module.insert(SYNTHETIC_ENTRY.to_string(), synthetic);
        let result = driver::run_module(&self.module, SYNTHETIC_ENTRY);
        self.module.remove(SYNTHETIC_ENTRY);
        result.map(Some)
    }
}

/// Runs the interactive prompt until EOF or an explicit `exit`/`quit`.
pub fn run_repl() {
    println!("TinyCPS REPL");
    println!("Type `exit` or `quit` to leave.");

    let mut repl = Repl::new();
    let mut buffer = String::new();
    let mut paren_depth: i32 = 0;

    loop {
        let prompt = if buffer.is_empty() { ">>> " } else { "... " };
        print!("{}", prompt);
        if io::stdout().flush().is_err() {
            return;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                println!();
                return;
            }
            Err(_) => return,
            Ok(_) => {}
        }

        let trimmed = line.trim();
        if buffer.is_empty() && (trimmed == "exit" || trimmed == "quit") {
            return;
        }

        for ch in line.chars() {
            match ch {
                '(' => paren_depth += 1,
                ')' => paren_depth -= 1,
                _ => {}
            }
        }
        buffer.push_str(&line);

        if paren_depth > 0 {
            continue;
        }
        if buffer.trim().is_empty() {
            buffer.clear();
            paren_depth = 0;
            continue;
        }
        if paren_depth < 0 {
            eprintln!("unexpected ')'");
            buffer.clear();
            paren_depth = 0;
            continue;
        }

        match sexp::parse_one(&buffer) {
            Ok(form) => match repl.eval_line(&form) {
                Ok(Some(value)) => println!("{}", value),
                Ok(None) => {}
                Err(e) => eprintln!("{}", e),
            },
            Err(e) => eprintln!("{}", e),
        }

        buffer.clear();
        paren_depth = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Number, Value};

    fn parse(src: &str) -> Sexp {
        sexp::parse_one(src).unwrap()
    }

    #[test]
    fn defining_main_immediately_runs_it() {
        let mut repl = Repl::new();
        let result = repl.eval_line(&parse("(def main (ret) (ret 7))")).unwrap();
        assert_eq!(result, Some(Value::Number(Number::Int(7))));
        // The synthetic entry must not leak into persistent state.
        assert!(!repl.module.contains_key(SYNTHETIC_ENTRY));
        assert!(repl.module.contains_key("main"));
    }

    #[test]
    fn redefining_main_does_not_auto_run_again() {
        let mut repl = Repl::new();
        repl.eval_line(&parse("(def main (ret) (ret 1))")).unwrap();
        let result = repl
            .eval_line(&parse("(def main (ret) (ret 2))"))
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn bare_call_uses_previously_defined_functions_without_persisting() {
        let mut repl = Repl::new();
        repl.eval_line(&parse("(def add1 (ret x) (+ ret x 1))"))
            .unwrap();
        let result = repl.eval_line(&parse("(add1 ret 4)")).unwrap();
        assert_eq!(result, Some(Value::Number(Number::Int(5))));
        assert!(!repl.module.contains_key(SYNTHETIC_ENTRY));
    }

    #[test]
    fn bare_constant_evaluates_to_itself() {
        let mut repl = Repl::new();
        let result = repl.eval_line(&parse("42")).unwrap();
        assert_eq!(result, Some(Value::Number(Number::Int(42))));
    }

    #[test]
    fn failed_line_does_not_corrupt_module_state() {
        let mut repl = Repl::new();
        repl.eval_line(&parse("(def add1 (ret x) (+ ret x 1))"))
            .unwrap();
        assert!(repl.eval_line(&parse("(nope ret)")).is_err());
        // The earlier definition must still be there and still work.
        let result = repl.eval_line(&parse("(add1 ret 10)")).unwrap();
        assert_eq!(result, Some(Value::Number(Number::Int(11))));
    }
}
