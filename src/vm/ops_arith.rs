//! # Arithmetic and comparison operations for the TinyCPS VM
//!
//! Add, Sub, Mul, Mod, Less, Eq. Each pops its right operand then its left,
//! pushes the result, and tail-enters the continuation.
//!
//! The continuation was the first value pushed for this call, so once both
//! operands are popped it sits at the new stack top; pushing the result
//! shifts it one further down, to depth 2 — `tail_enter(stack, 2, ...)`.

use std::collections::HashMap;

use crate::value::Value;

use super::ops_control::{pop, tail_enter};
use super::Control;

/// Where the continuation sits once the result of a binary op has been
/// pushed: two values pushed for the call (cont, then the used-up operands'
/// slot collapses into one result) puts the continuation one below the top.
const CONT_DEPTH_AFTER_RESULT: i64 = 2;

fn numbers(stack: &mut Vec<Value>, op: &str) -> Result<(crate::value::Number, crate::value::Number), String> {
    let rhs = pop(stack)?;
    let lhs = pop(stack)?;
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok((a, b)),
        (a, b) => Err(format!(
            "'{}' expects two numbers, found {} and {}",
            op,
            a.type_name(),
            b.type_name()
        )),
    }
}

pub(super) fn handle_add(
    stack: &mut Vec<Value>,
    jump_table: &HashMap<String, usize>,
) -> Result<Control, String> {
    let (a, b) = numbers(stack, "+")?;
    stack.push(Value::Number(a.add(b)));
    tail_enter(stack, CONT_DEPTH_AFTER_RESULT, jump_table)
}

pub(super) fn handle_sub(
    stack: &mut Vec<Value>,
    jump_table: &HashMap<String, usize>,
) -> Result<Control, String> {
    let (a, b) = numbers(stack, "-")?;
    stack.push(Value::Number(a.sub(b)));
    tail_enter(stack, CONT_DEPTH_AFTER_RESULT, jump_table)
}

pub(super) fn handle_mul(
    stack: &mut Vec<Value>,
    jump_table: &HashMap<String, usize>,
) -> Result<Control, String> {
    let (a, b) = numbers(stack, "*")?;
    stack.push(Value::Number(a.mul(b)));
    tail_enter(stack, CONT_DEPTH_AFTER_RESULT, jump_table)
}

/// `%` pushes the numeric modulus, not a boolean — there is nothing
/// comparison-like about it despite sitting next to `Eq` in the builtin
/// table.
pub(super) fn handle_mod(
    stack: &mut Vec<Value>,
    jump_table: &HashMap<String, usize>,
) -> Result<Control, String> {
    let (a, b) = numbers(stack, "%")?;
    let result = a.modulus(b)?;
    stack.push(Value::Number(result));
    tail_enter(stack, CONT_DEPTH_AFTER_RESULT, jump_table)
}

pub(super) fn handle_less(
    stack: &mut Vec<Value>,
    jump_table: &HashMap<String, usize>,
) -> Result<Control, String> {
    let (a, b) = numbers(stack, "<")?;
    stack.push(Value::Bool(a.less_than(b)));
    tail_enter(stack, CONT_DEPTH_AFTER_RESULT, jump_table)
}

/// `=` compares two values of the same tag (both numbers, numerically; both
/// bools, by value); anything else is a type fault rather than a silent
/// `false`, since the surface language never produces mixed-type `=` calls
/// from well-typed programs.
pub(super) fn handle_eq(
    stack: &mut Vec<Value>,
    jump_table: &HashMap<String, usize>,
) -> Result<Control, String> {
    let rhs = pop(stack)?;
    let lhs = pop(stack)?;
    let result = match (&lhs, &rhs) {
        (Value::Number(a), Value::Number(b)) => a.numeric_eq(*b),
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => {
            return Err(format!(
                "'=' expects two comparable values of the same type, found {} and {}",
                lhs.type_name(),
                rhs.type_name()
            ))
        }
    };
    stack.push(Value::Bool(result));
    tail_enter(stack, CONT_DEPTH_AFTER_RESULT, jump_table)
}
