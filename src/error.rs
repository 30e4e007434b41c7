//! # Error Handling for TinyCPS
//!
//! Every stage of the pipeline — parsing, lowering, compiling, running —
//! fails through this one enum. There is no wire/bytecode format to decode
//! here (unlike a runtime that loads precompiled images from disk), so there
//! is no `ErrorKind` repr(u8) layer to keep in sync with a binary encoding;
//! a single flat enum with a human-readable message per variant is enough.
//!
//! ## Policy
//! All errors abort the current compilation or execution.
//! None of these are recoverable mid-run: a runtime fault always aborts the
//! in-flight program. Module-state preservation across a failed REPL turn is
//! the caller's responsibility (see `repl`), not this type's.

use std::fmt;

/// Everything that can go wrong from source text to a finished run.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// Failed to parse the s-expression surface syntax. Carries the byte
    /// offset the parser was at when it gave up.
    Parse { position: usize, message: String },
    /// A parsed form doesn't lower into valid AST: not a `def`, a
    /// non-symbol argument name, a malformed `lambda`, or a function body
    /// that isn't a call.
    Lowering(String),
    /// A *Var* reference that resolves to neither local scope, the module,
    /// nor a builtin.
    Compile(String),
    /// A VM fault: the target of a `JumpLambda`/`JumpLabel` isn't callable
    /// or isn't in the jump table, or execution fell off the end of the
    /// instruction stream without invoking the finish continuation.
    Runtime {
        ip: usize,
        instr: String,
        message: String,
    },
}

impl Error {
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            position,
            message: message.into(),
        }
    }

    pub fn lowering(message: impl Into<String>) -> Self {
        Error::Lowering(message.into())
    }

    pub fn compile(message: impl Into<String>) -> Self {
        Error::Compile(message.into())
    }

    pub fn runtime(ip: usize, instr: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Runtime {
            ip,
            instr: instr.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse { position, message } => {
                write!(f, "Parse error at position {}: {}", position, message)
            }
            Error::Lowering(msg) => write!(f, "Syntax error: {}", msg),
            Error::Compile(msg) => write!(f, "Compile error: {}", msg),
            Error::Runtime { ip, instr, message } => {
                write!(f, "Runtime error at instruction ({}: {}): {}", ip, instr, message)
            }
        }
    }
}

impl std::error::Error for Error {}
