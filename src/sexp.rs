//! # S-expression surface syntax
//!
//! A hand-rolled recursive-descent tokenizer/parser: identifiers
//! (`alpha (alpha|digit)*`), decimal numerals, the single-character operator
//! set, parens, and whitespace. No parser-combinator crate is used — this
//! grammar is straightforward enough that hand-rolling it directly is the
//! simpler and more idiomatic choice.

use crate::error::Error;
use crate::value::Number;

/// The operator charset. Each character is its own atom; only
/// `+ - * % < =` are bound to builtins (`builtins::BUILTINS`)
/// — referencing any of the others as a call target is simply an unresolved
/// symbol at compile time, with no special-casing needed here.
const OPERATORS: &str = "+-*/^!=<_%";

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Ident(String),
    Number(Number),
    Op(char),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Sexp {
    Atom(Token),
    List(Vec<Sexp>),
}

impl Sexp {
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Sexp::Atom(Token::Ident(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Sexp]> {
        match self {
            Sexp::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// The textual name a call target or bare argument atom refers to:
    /// identifiers and single-char operators both name things (the operator
    /// charset doubles as the builtin names), only numerals don't.
    pub fn as_name(&self) -> Option<String> {
        match self {
            Sexp::Atom(Token::Ident(s)) => Some(s.clone()),
            Sexp::Atom(Token::Op(c)) => Some(c.to_string()),
            _ => None,
        }
    }
}

pub struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Self {
        Parser { src, pos: 0 }
    }

    /// Parses every top-level form in the source, in order.
    pub fn parse_program(&mut self) -> Result<Vec<Sexp>, Error> {
        let mut forms = Vec::new();
        self.skip_ws();
        while self.peek_char().is_some() {
            forms.push(self.parse_sexp()?);
            self.skip_ws();
        }
        Ok(forms)
    }

    /// Parses exactly one top-level form, for the REPL's line-at-a-time use.
    pub fn parse_one(&mut self) -> Result<Sexp, Error> {
        self.skip_ws();
        let form = self.parse_sexp()?;
        self.skip_ws();
        if let Some(c) = self.peek_char() {
            return Err(self.err(&format!("unexpected trailing character '{}'", c)));
        }
        Ok(form)
    }

    fn err(&self, message: &str) -> Error {
        Error::parse(self.pos, message)
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn parse_sexp(&mut self) -> Result<Sexp, Error> {
        self.skip_ws();
        match self.peek_char() {
            Some('(') => self.parse_list(),
            Some(_) => self.parse_atom(),
            None => Err(self.err("unexpected end of input")),
        }
    }

    fn parse_list(&mut self) -> Result<Sexp, Error> {
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.peek_char() {
                Some(')') => {
                    self.bump();
                    return Ok(Sexp::List(items));
                }
                Some(_) => items.push(self.parse_sexp()?),
                None => return Err(self.err("unterminated list, expected ')'")),
            }
        }
    }

    fn parse_atom(&mut self) -> Result<Sexp, Error> {
        let c = self
            .peek_char()
            .ok_or_else(|| self.err("unexpected end of input"))?;
        if c.is_ascii_alphabetic() {
            return self.parse_identifier();
        }
        if c.is_ascii_digit() {
            return self.parse_number();
        }
        if OPERATORS.contains(c) {
            self.bump();
            return Ok(Sexp::Atom(Token::Op(c)));
        }
        Err(self.err(&format!("unexpected character '{}'", c)))
    }

    fn parse_identifier(&mut self) -> Result<Sexp, Error> {
        let start = self.pos;
        while matches!(self.peek_char(), Some(c) if c.is_ascii_alphanumeric()) {
            self.bump();
        }
        Ok(Sexp::Atom(Token::Ident(self.src[start..self.pos].to_string())))
    }

    fn parse_number(&mut self) -> Result<Sexp, Error> {
        let start = self.pos;
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        let mut is_float = false;
        if self.peek_char() == Some('.') {
            is_float = true;
            self.bump();
            while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
        }
        let text = &self.src[start..self.pos];
        if is_float {
            let value: f64 = text
                .parse()
                .map_err(|_| self.err(&format!("invalid decimal literal '{}'", text)))?;
            Ok(Sexp::Atom(Token::Number(Number::Float(value))))
        } else {
            match text.parse::<i64>() {
                Ok(i) => Ok(Sexp::Atom(Token::Number(Number::Int(i)))),
                Err(_) => {
                    let value: f64 = text
                        .parse()
                        .map_err(|_| self.err(&format!("invalid numeral '{}'", text)))?;
                    Ok(Sexp::Atom(Token::Number(Number::Float(value))))
                }
            }
        }
    }
}

pub fn parse_program(src: &str) -> Result<Vec<Sexp>, Error> {
    Parser::new(src).parse_program()
}

pub fn parse_one(src: &str) -> Result<Sexp, Error> {
    Parser::new(src).parse_one()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_list() {
        let forms = parse_program("(def main (ret) (ret 1))").unwrap();
        assert_eq!(forms.len(), 1);
        let top = forms[0].as_list().unwrap();
        assert_eq!(top[0].as_ident(), Some("def"));
        assert_eq!(top[1].as_ident(), Some("main"));
    }

    #[test]
    fn parses_integer_and_float_numerals_distinctly() {
        let forms = parse_program("(3 3.5)").unwrap();
        let items = forms[0].as_list().unwrap();
        assert_eq!(items[0], Sexp::Atom(Token::Number(Number::Int(3))));
        assert_eq!(items[1], Sexp::Atom(Token::Number(Number::Float(3.5))));
    }

    #[test]
    fn parses_operator_atoms() {
        let forms = parse_program("(+ 1 2)").unwrap();
        let items = forms[0].as_list().unwrap();
        assert_eq!(items[0], Sexp::Atom(Token::Op('+')));
    }

    #[test]
    fn unterminated_list_is_a_parse_error() {
        assert!(parse_program("(def main").is_err());
    }

    #[test]
    fn unexpected_character_reports_position() {
        let err = parse_program("(def main (ret) (ret @))").unwrap_err();
        match err {
            Error::Parse { position, .. } => assert!(position > 0),
            _ => panic!("expected a parse error"),
        }
    }
}
