//! # The TinyCPS stack virtual machine
//!
//! A fetch-execute loop over a flat `Instr` vector, dispatching through
//! `ops_arith`/`ops_control`. The dispatch loop itself is a plain Rust
//! `while`, not host recursion — tail calls are implemented as jumps that
//! set `ip` directly, so TinyCPS recursion depth is bounded only by the
//! VM's own heap-allocated stack, never by the host call stack.

mod ops_arith;
mod ops_control;

use crate::error::Error;
use crate::instr::{Instr, Program};
use crate::value::Value;

/// What a single instruction's evaluation does to control flow: fall
/// through to the next instruction, jump to a specific index, or halt with
/// the program's result (the finish continuation was invoked).
pub(crate) enum Control {
    Advance,
    Jump(usize),
    Halt(Value),
}

/// Runs `program` starting from `entry`'s block. The operand stack is
/// seeded with a single `Value::Finish` — this assumes `entry` takes
/// exactly one parameter, the continuation that receives the final result.
pub fn run(program: &Program, entry: &str) -> Result<Value, Error> {
    let start = *program
        .jump_table
        .get(entry)
        .ok_or_else(|| Error::compile(format!("no compiled entry point named '{}'", entry)))?;

    let mut stack: Vec<Value> = vec![Value::Finish];
    let mut ip = start;

    loop {
        let instr = program.instrs.get(ip).ok_or_else(|| {
            Error::runtime(
                ip,
                "<end of instructions>",
                "program ended without invoking the finish continuation",
            )
        })?;

        let step = dispatch(instr, &mut stack, &program.jump_table)
            .map_err(|message| Error::runtime(ip, instr.to_string(), message))?;

        match step {
            Control::Advance => ip += 1,
            Control::Jump(target) => ip = target,
            Control::Halt(value) => return Ok(value),
        }
    }
}

fn dispatch(
    instr: &Instr,
    stack: &mut Vec<Value>,
    jump_table: &std::collections::HashMap<String, usize>,
) -> Result<Control, String> {
    use ops_control::*;

    match instr {
        Instr::PushConst(imm) => {
            handle_push_const(imm, stack);
            Ok(Control::Advance)
        }
        Instr::PushRel(depth) => {
            handle_push_rel(*depth, stack)?;
            Ok(Control::Advance)
        }
        Instr::PushLambda { label, arity } => {
            handle_push_lambda(label, *arity, stack)?;
            Ok(Control::Advance)
        }
        Instr::PushThunk { label, arity } => {
            handle_push_thunk(label, *arity, stack);
            Ok(Control::Advance)
        }
        Instr::Pop => {
            handle_pop(stack)?;
            Ok(Control::Advance)
        }
        Instr::JumpLambda(depth) => tail_enter(stack, *depth, jump_table),
        Instr::JumpLabel { label, arity } => handle_jump_label(label, *arity, stack, jump_table),
        Instr::CondBranch => handle_cond_branch(stack, jump_table),
        Instr::Add => ops_arith::handle_add(stack, jump_table),
        Instr::Sub => ops_arith::handle_sub(stack, jump_table),
        Instr::Mul => ops_arith::handle_mul(stack, jump_table),
        Instr::Mod => ops_arith::handle_mod(stack, jump_table),
        Instr::Less => ops_arith::handle_less(stack, jump_table),
        Instr::Eq => ops_arith::handle_eq(stack, jump_table),
    }
}
