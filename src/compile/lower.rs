//! # Lowering s-expressions to AST
//!
//! Grounded in `sexp_to_cps.py`: `convert_parse_to_cps`/`convert_def` become
//! `lower_program`/`lower_def`, `convert_argument` becomes `lower_argument`,
//! `convert_lambda` becomes `lower_lambda`, `check_args` stays `check_args`.

use crate::ast::{Call, Expr, Func, Module};
use crate::error::Error;
use crate::sexp::{Sexp, Token};

/// Lowers every top-level form. Each one must be a `def`.
pub fn lower_program(forms: &[Sexp]) -> Result<Module, Error> {
    let mut module = Module::new();
    for form in forms {
        let (name, func) = lower_def(form)?;
        module.insert(name, func);
    }
    Ok(module)
}

/// `(def NAME (arg ...) (body-call))`.
pub fn lower_def(form: &Sexp) -> Result<(String, Func), Error> {
    let items = form
        .as_list()
        .ok_or_else(|| Error::lowering("top-level definitions must be `def` forms"))?;
    if items.len() != 4 {
        return Err(Error::lowering(
            "a `def` form must have exactly 4 elements: (def name (args) body)",
        ));
    }
    if items[0].as_ident() != Some("def") {
        return Err(Error::lowering("top-level definitions must start with `def`"));
    }
    let name = items[1]
        .as_ident()
        .ok_or_else(|| Error::lowering("a function name must be an identifier"))?
        .to_string();
    let params = check_args(&items[2])?;
    let body = lower_call(&items[3])?;
    let func = Func { params, body };
    func.validate().map_err(Error::lowering)?;
    Ok((name, func))
}

/// A parameter list: a list of bare identifiers, no nesting, no numerals.
fn check_args(form: &Sexp) -> Result<Vec<String>, Error> {
    let items = form
        .as_list()
        .ok_or_else(|| Error::lowering("a parameter list must be written as `(arg ...)`"))?;
    items
        .iter()
        .map(|item| {
            item.as_ident()
                .map(|s| s.to_string())
                .ok_or_else(|| Error::lowering("parameter names must be plain identifiers"))
        })
        .collect()
}

/// `(target arg ...)` — the only shape a function or lambda body may take.
/// Exposed to `repl`, which lowers a bare top-level call the same way.
pub fn lower_call(form: &Sexp) -> Result<Call, Error> {
    let items = form
        .as_list()
        .ok_or_else(|| Error::lowering("a function body must be a call"))?;
    let (head, rest) = items
        .split_first()
        .ok_or_else(|| Error::lowering("a call cannot be empty"))?;
    let target = head
        .as_name()
        .ok_or_else(|| Error::lowering("a call's target must be a name or operator"))?;
    let args = rest.iter().map(lower_argument).collect::<Result<_, _>>()?;
    Ok(Call { target, args })
}

/// `convert_argument`: a nested list is a lambda, a numeral is a constant,
/// the bare identifiers `true`/`false` are boolean constants, the bare
/// identifier `finish` is the finish sentinel, anything else is a variable
/// reference. Exposed to `repl` for lowering a bare constant line.
pub fn lower_argument(form: &Sexp) -> Result<Expr, Error> {
    match form {
        Sexp::List(_) => Ok(Expr::FuncLiteral(Box::new(lower_lambda(form)?))),
        Sexp::Atom(Token::Number(n)) => Ok(Expr::Const(*n)),
        Sexp::Atom(Token::Ident(name)) if name == "finish" => Ok(Expr::Finish),
        Sexp::Atom(Token::Ident(name)) if name == "true" => Ok(Expr::ConstBool(true)),
        Sexp::Atom(Token::Ident(name)) if name == "false" => Ok(Expr::ConstBool(false)),
        Sexp::Atom(Token::Ident(name)) => Ok(Expr::Var(name.clone())),
        Sexp::Atom(Token::Op(c)) => Ok(Expr::Var(c.to_string())),
    }
}

/// `(lambda (arg ...) (body-call))`.
fn lower_lambda(form: &Sexp) -> Result<Func, Error> {
    let items = form.as_list().expect("caller already matched a list");
    if items.len() != 3 {
        return Err(Error::lowering(
            "a lambda must have exactly 3 elements: (lambda (args) body)",
        ));
    }
    if items[0].as_ident() != Some("lambda") {
        return Err(Error::lowering("a nested call argument must be a `lambda` form"));
    }
    let params = check_args(&items[1])?;
    let body = lower_call(&items[2])?;
    let func = Func { params, body };
    func.validate().map_err(Error::lowering)?;
    Ok(func)
}

/// Whether a parsed top-level form is a `def` (vs. a bare call/constant that
/// the REPL evaluates transiently). Used by `repl` to classify an input line.
pub fn is_def_form(form: &Sexp) -> bool {
    form.as_list()
        .and_then(|items| items.first())
        .and_then(|head| head.as_ident())
        == Some("def")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::parse_program;

    fn parse_def(src: &str) -> (String, Func) {
        let forms = parse_program(src).unwrap();
        lower_def(&forms[0]).unwrap()
    }

    #[test]
    fn lowers_a_simple_def() {
        let (name, func) = parse_def("(def main (ret) (ret 1))");
        assert_eq!(name, "main");
        assert_eq!(func.params, vec!["ret".to_string()]);
        assert_eq!(func.body.target, "ret");
        assert_eq!(func.body.args, vec![Expr::Const(Number::Int(1))]);
    }

    #[test]
    fn lowers_finish_keyword_as_argument() {
        let (_, func) = parse_def("(def main (ret) (f finish))");
        assert_eq!(func.body.args, vec![Expr::Finish]);
    }

    #[test]
    fn lowers_nested_lambda_argument() {
        let (_, func) = parse_def("(def main (ret) (f (lambda (k) (k 1))))");
        match &func.body.args[0] {
            Expr::FuncLiteral(inner) => {
                assert_eq!(inner.params, vec!["k".to_string()]);
                assert_eq!(inner.body.target, "k");
            }
            other => panic!("expected a lambda, got {:?}", other),
        }
    }

    #[test]
    fn non_call_body_is_a_lowering_error() {
        let forms = parse_program("(def main (ret) ret)").unwrap();
        assert!(lower_def(&forms[0]).is_err());
    }

    #[test]
    fn duplicate_parameter_names_are_rejected() {
        let forms = parse_program("(def f (ret ret) (ret 1))").unwrap();
        assert!(lower_def(&forms[0]).is_err());
    }

    #[test]
    fn operator_call_target_lowers_to_its_symbol() {
        let (_, func) = parse_def("(def main (ret) (+ 1 2))");
        assert_eq!(func.body.target, "+");
    }

    #[test]
    fn lowers_true_and_false_as_boolean_constants() {
        let (_, func) = parse_def("(def main (ret) (ret true false))");
        assert_eq!(
            func.body.args,
            vec![Expr::ConstBool(true), Expr::ConstBool(false)]
        );
    }
}
