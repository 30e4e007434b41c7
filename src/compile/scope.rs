//! # Compile-time scope and offset rebasing
//!
//! This arithmetic is the densest source of bugs in the whole compiler, so
//! it gets its own module and its own unit tests rather than living inline
//! in `compile::mod`.
//!
//! A `Scope` maps a bound name to its distance from the top of the operand
//! stack *at function entry*, counted the same way `PushRel`/`JumpLambda`
//! count depths: 1-based, depth 1 is the current top. With `n` parameters
//! bound left to right, the last parameter sits at depth 1 and the first at
//! depth `n`.
//!
//! While compiling a call's arguments, each already-pushed argument shifts
//! everything below it one position further from the top — `offset` in
//! `compile::mod` tracks that shift and gets added to a scope lookup at
//! the point of use, never baked into the `Scope` map itself.
//!
//! Entering a nested `FuncLiteral`'s body rebases the *enclosing* scope: the
//! new function's own parameters go on top (shifting every captured binding
//! down by the new parameter count), and whatever had already been pushed
//! onto the stack before the `PushLambda` ran (`capture_offset`) shifts them
//! down further still, since the closure's captured stack is a snapshot of
//! the stack as it stood at that point.

use std::collections::HashMap;

pub type Scope = HashMap<String, i64>;

/// The scope at the very top of a function's body: each parameter's depth
/// from the top of the stack, with the last parameter closest (depth 1).
pub fn entry_scope(params: &[String]) -> Scope {
    let n = params.len() as i64;
    params
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), n - i as i64))
        .collect()
}

/// Shifts every binding in `scope` away from the top of the stack by `shift`
/// positions (more things have been pushed on top of them since).
pub fn rebase(scope: &Scope, shift: i64) -> Scope {
    scope.iter().map(|(k, v)| (k.clone(), v + shift)).collect()
}

/// The scope inside a (possibly nested) function body: the enclosing
/// scope's bindings rebased past this function's own parameters and past
/// whatever sat on the stack at the point this function literal was formed,
/// with the new parameters laid on top.
pub fn enter_func(outer: &Scope, capture_offset: i64, params: &[String]) -> Scope {
    let shift = capture_offset + params.len() as i64;
    let mut scope = rebase(outer, shift);
    scope.extend(entry_scope(params));
    scope
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn last_parameter_is_depth_one() {
        let scope = entry_scope(&names(&["ret", "n"]));
        assert_eq!(scope["n"], 1);
        assert_eq!(scope["ret"], 2);
    }

    #[test]
    fn single_parameter_is_depth_one() {
        let scope = entry_scope(&names(&["x"]));
        assert_eq!(scope["x"], 1);
    }

    #[test]
    fn rebase_shifts_every_binding_uniformly() {
        let scope = entry_scope(&names(&["ret", "n"]));
        let shifted = rebase(&scope, 3);
        assert_eq!(shifted["n"], 4);
        assert_eq!(shifted["ret"], 5);
    }

    #[test]
    fn entering_nested_func_rebases_captures_and_adds_new_params() {
        // outer: (ret n) with n at depth 1, ret at depth 2.
        let outer = entry_scope(&names(&["ret", "n"]));
        // a lambda (k) formed with nothing else pushed yet (capture_offset 0).
        let inner = enter_func(&outer, 0, &names(&["k"]));
        // k is the new, innermost parameter.
        assert_eq!(inner["k"], 1);
        // n and ret are now one position further from the top.
        assert_eq!(inner["n"], 2);
        assert_eq!(inner["ret"], 3);
    }

    #[test]
    fn capture_offset_accounts_for_arguments_pushed_before_the_lambda() {
        let outer = entry_scope(&names(&["ret", "n"]));
        // the lambda is the second argument in its enclosing call, so one
        // value was already pushed (capture_offset 1) before PushLambda ran.
        let inner = enter_func(&outer, 1, &names(&["k"]));
        assert_eq!(inner["k"], 1);
        assert_eq!(inner["n"], 3);
        assert_eq!(inner["ret"], 4);
    }
}
