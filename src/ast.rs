//! # Abstract syntax for TinyCPS
//!
//! Five node kinds plus the `Finish` pseudo-node. The body of every `Func` is
//! typed as a `Call` directly rather than a generic `Expr` variant that would
//! need a separate runtime check — "every function body is a call" is
//! enforced by the type, not by a validator that could be skipped.

use crate::value::Number;
use std::fmt;

/// A bound name, introduced by a `def` or `lambda` parameter list.
pub type Symbol = String;

/// An expression in argument position: a variable reference, a literal, a
/// lambda, or the finish sentinel. Never a nested call — the surface syntax
/// doesn't allow one there, so the type doesn't either.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Var(Symbol),
    Const(Number),
    /// The literal identifiers `true`/`false` — kept distinct from `Const`
    /// since the runtime itself keeps `Number` and `Bool` as separate tags.
    ConstBool(bool),
    /// The literal identifier `finish` used as an argument value — lowers to
    /// a reference to the finish continuation regardless of scope.
    Finish,
    FuncLiteral(Box<Func>),
}

/// A call form: `(target arg ...)`. The only way to invoke a function,
/// builtin, or closure.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub target: Symbol,
    pub args: Vec<Expr>,
}

/// A function: a parameter list and a body that is always a call (tail
/// position, never anything else — there is no other kind of statement).
#[derive(Clone, Debug, PartialEq)]
pub struct Func {
    pub params: Vec<Symbol>,
    pub body: Call,
}

impl Func {
    /// Checks the one structural invariant the type system doesn't already
    /// enforce: parameter names must be distinct.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = std::collections::HashSet::new();
        for p in &self.params {
            if !seen.insert(p.as_str()) {
                return Err(format!("duplicate parameter name '{}'", p));
            }
        }
        Ok(())
    }
}

/// A module is a flat map from top-level function name to definition. There
/// is no nesting, no namespacing, no import system (Non-goals).
pub type Module = std::collections::HashMap<Symbol, Func>;

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(n) => write!(f, "{}", n),
            Expr::ConstBool(b) => write!(f, "{}", b),
            Expr::Finish => write!(f, "finish"),
            Expr::FuncLiteral(func) => write!(f, "{}", func),
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.target)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(lambda (")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ") {})", self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn func(params: &[&str]) -> Func {
        Func {
            params: params.iter().map(|s| s.to_string()).collect(),
            body: Call {
                target: "ret".to_string(),
                args: vec![],
            },
        }
    }

    #[test]
    fn distinct_params_validate() {
        assert!(func(&["ret", "n"]).validate().is_ok());
    }

    #[test]
    fn duplicate_params_rejected() {
        let err = func(&["ret", "n", "n"]).validate().unwrap_err();
        assert!(err.contains("n"));
    }

    #[test]
    fn display_matches_surface_shape() {
        let f = Func {
            params: vec!["ret".into(), "n".into()],
            body: Call {
                target: "ret".into(),
                args: vec![Expr::Var("n".into())],
            },
        };
        assert_eq!(format!("{}", f), "(lambda (ret n) (ret n))");
    }
}
