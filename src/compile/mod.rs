//! # AST → bytecode compiler
//!
//! `lower` turns parsed s-expressions into this crate's AST; this module
//! (plus `scope`) turns that AST into a flat instruction stream and jump
//! table.
//!
//! Processing order over the module is otherwise unconstrained except that
//! the entry function's block is always emitted first, so its label
//! resolves to instruction 0.

pub mod lower;
pub mod scope;

use crate::ast::{Call, Expr, Func, Module};
use crate::builtins;
use crate::error::Error;
use crate::instr::{Immediate, Instr, Program};
use scope::Scope;

/// Compiles every function reachable from `module`'s definitions (the whole
/// map, not just what `entry` calls — `JumpLabel`/`PushThunk` may target any
/// of them) into one instruction stream, with `entry`'s block placed first.
pub fn compile_module(module: &Module, entry: &str) -> Result<Program, Error> {
    if !module.contains_key(entry) {
        return Err(Error::compile(format!(
            "undefined entry function '{}'",
            entry
        )));
    }

    // Deterministic order for the non-entry functions: iteration order over
    // a HashMap isn't, and a stable instruction stream makes the compiler's
    // own output reproducible across runs.
    let mut rest: Vec<&String> = module.keys().filter(|name| name.as_str() != entry).collect();
    rest.sort();

    let mut blocks: Vec<(String, Vec<Instr>)> = Vec::new();
    compile_func(entry, &module[entry], module, &mut blocks)?;
    for name in rest {
        compile_func(name, &module[name], module, &mut blocks)?;
    }

    let mut program = Program::new();
    for (label, instrs) in blocks {
        let start = program.instrs.len();
        program.jump_table.insert(label, start);
        program.instrs.extend(instrs);
    }
    Ok(program)
}

/// Compiles one top-level function under `label`, seeding its scope from its
/// own parameter list. There is no function prologue: the operand stack at
/// entry already holds exactly the arguments the caller pushed.
fn compile_func(
    label: &str,
    func: &Func,
    module: &Module,
    blocks: &mut Vec<(String, Vec<Instr>)>,
) -> Result<(), Error> {
    let entry_scope = scope::entry_scope(&func.params);
    compile_func_body(label, func, &entry_scope, module, blocks)
}

/// Compiles a function body (top-level or a hoisted lambda) under an
/// already-computed `scope`, appending the resulting block to `blocks`.
fn compile_func_body(
    label: &str,
    func: &Func,
    scope: &Scope,
    module: &Module,
    blocks: &mut Vec<(String, Vec<Instr>)>,
) -> Result<(), Error> {
    let instrs = compile_call(&func.body, scope, label, module, blocks)?;
    blocks.push((label.to_string(), instrs));
    Ok(())
}

/// Compiles a call: every argument's push instructions in order, then the
/// single tail instruction that consumes them.
fn compile_call(
    call: &Call,
    scope: &Scope,
    label_ctx: &str,
    module: &Module,
    blocks: &mut Vec<(String, Vec<Instr>)>,
) -> Result<Vec<Instr>, Error> {
    let mut instrs = Vec::new();
    let mut offset: i64 = 0;
    for arg in &call.args {
        instrs.extend(compile_expr(arg, scope, offset, label_ctx, module, blocks)?);
        offset += 1;
    }

    if let Some(&depth) = scope.get(&call.target) {
        instrs.push(Instr::JumpLambda(depth + offset));
    } else if let Some(builtin) = builtins::get(&call.target) {
        instrs.push((builtin.opcode)());
    } else if let Some(target_func) = module.get(&call.target) {
        instrs.push(Instr::JumpLabel {
            label: call.target.clone(),
            arity: target_func.params.len(),
        });
    } else {
        return Err(Error::compile(format!(
            "call to unresolved target '{}'",
            call.target
        )));
    }

    Ok(instrs)
}

/// Compiles one argument expression: the instructions that push its value
/// onto the operand stack. `offset` is the number of values already pushed
/// for the enclosing call, which rebases any local-scope lookup.
fn compile_expr(
    expr: &Expr,
    scope: &Scope,
    offset: i64,
    label_ctx: &str,
    module: &Module,
    blocks: &mut Vec<(String, Vec<Instr>)>,
) -> Result<Vec<Instr>, Error> {
    match expr {
        Expr::Var(name) => {
            if let Some(&depth) = scope.get(name) {
                Ok(vec![Instr::PushRel(depth + offset)])
            } else if let Some(func) = module.get(name) {
                Ok(vec![Instr::PushThunk {
                    label: name.clone(),
                    arity: func.params.len(),
                }])
            } else {
                Err(Error::compile(format!("unresolved variable '{}'", name)))
            }
        }
        Expr::Const(n) => Ok(vec![Instr::PushConst(Immediate::Number(*n))]),
        Expr::ConstBool(b) => Ok(vec![Instr::PushConst(Immediate::Bool(*b))]),
        Expr::Finish => Ok(vec![Instr::PushConst(Immediate::Finish)]),
        Expr::FuncLiteral(inner) => {
            // Lambda hoisting: the inner function is compiled as a fresh
            // top-level block under a generated label, derived from the
            // enclosing label plus this argument's push offset so sibling
            // and nested lambdas never collide.
            let label = format!("{}_lambda_{}", label_ctx, offset);
            let arity = inner.params.len();
            let inner_scope = scope::enter_func(scope, offset, &inner.params);
            compile_func_body(&label, inner, &inner_scope, module, blocks)?;
            Ok(vec![Instr::PushLambda { label, arity }])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::lower::lower_program;
    use crate::sexp::parse_program;

    /// End-to-end scenario runs live in `vm::tests`; these cover the
    /// compiler's own contract (entry placement, diagnostics).
    #[test]
    fn entry_function_is_placed_at_instruction_zero() {
        let forms = parse_program("(def main (ret) (ret 42))").unwrap();
        let module = lower_program(&forms).unwrap();
        let program = compile_module(&module, "main").unwrap();
        assert_eq!(program.jump_table["main"], 0);
    }

    #[test]
    fn non_entry_functions_are_also_compiled_and_placed_in_the_jump_table() {
        let src = "(def add1 (ret x) (+ ret x 1)) (def main (ret) (add1 ret 5))";
        let forms = parse_program(src).unwrap();
        let module = lower_program(&forms).unwrap();
        let program = compile_module(&module, "main").unwrap();
        assert!(program.jump_table.contains_key("add1"));
        assert_ne!(program.jump_table["add1"], program.jump_table["main"]);
    }

    #[test]
    fn unresolved_call_target_is_a_compile_error() {
        let forms = parse_program("(def main (ret) (nope ret))").unwrap();
        let module = lower_program(&forms).unwrap();
        assert!(compile_module(&module, "main").is_err());
    }

    #[test]
    fn unresolved_variable_reference_is_a_compile_error() {
        let forms = parse_program("(def main (ret) (ret nope))").unwrap();
        let module = lower_program(&forms).unwrap();
        assert!(compile_module(&module, "main").is_err());
    }

    #[test]
    fn unknown_operator_character_is_a_compile_error() {
        let forms = parse_program("(def main (ret) (/ ret 1 2))").unwrap();
        let module = lower_program(&forms).unwrap();
        assert!(compile_module(&module, "main").is_err());
    }

    #[test]
    fn missing_entry_is_a_compile_error() {
        let forms = parse_program("(def other (ret) (ret 1))").unwrap();
        let module = lower_program(&forms).unwrap();
        assert!(compile_module(&module, "main").is_err());
    }

    #[test]
    fn lambda_argument_compiles_to_a_hoisted_label_derived_from_its_offset() {
        let forms = parse_program("(def main (ret) (ret (lambda (k) (k 1))))").unwrap();
        let module = lower_program(&forms).unwrap();
        let program = compile_module(&module, "main").unwrap();
        assert!(program.jump_table.contains_key("main_lambda_0"));
    }
}
