//! # Builtin table
//!
//! The fixed, closed set of builtins: `+ - * % < = if`. Each compiles to a
//! single inlined opcode rather than a real call — there is no
//! function-call overhead for these, and they are never looked up by value
//! (no builtin ever appears as a `PushThunk` target; see `compile`).
//!
//! A `once_cell::sync::Lazy` static table holds this fixed name→arity→opcode
//! mapping, built once on first access rather than reconstructed per lookup.

use crate::instr::Instr;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A builtin's declared parameter names (used only to report its arity; the
/// names themselves never appear in compiled output) and the opcode it
/// compiles to.
pub struct Builtin {
    pub params: &'static [&'static str],
    pub opcode: fn() -> Instr,
}

impl Builtin {
    /// Declared params plus the continuation every call carries implicitly.
    pub fn call_arity(&self) -> usize {
        self.params.len() + 1
    }
}

pub static BUILTINS: Lazy<HashMap<&'static str, Builtin>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(
        "+",
        Builtin {
            params: &["a", "b"],
            opcode: || Instr::Add,
        },
    );
    m.insert(
        "-",
        Builtin {
            params: &["a", "b"],
            opcode: || Instr::Sub,
        },
    );
    m.insert(
        "*",
        Builtin {
            params: &["a", "b"],
            opcode: || Instr::Mul,
        },
    );
    m.insert(
        "%",
        Builtin {
            params: &["a", "b"],
            opcode: || Instr::Mod,
        },
    );
    m.insert(
        "<",
        Builtin {
            params: &["a", "b"],
            opcode: || Instr::Less,
        },
    );
    m.insert(
        "=",
        Builtin {
            params: &["a", "b"],
            opcode: || Instr::Eq,
        },
    );
    m.insert(
        "if",
        Builtin {
            params: &["cond", "iftrue", "iffalse"],
            opcode: || Instr::CondBranch,
        },
    );
    m
});

pub fn get(name: &str) -> Option<&'static Builtin> {
    BUILTINS.get(name)
}

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains_key(name)
}
