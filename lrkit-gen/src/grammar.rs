//! Grammar AST and surface-syntax front end.
//!
//! A grammar is an ordered list of [`Rule`]s. Each rule body is an [`Expr`]
//! tree built from alternation, sequencing, optional `[ ]`, repeat `{ }`,
//! identifiers, and quoted literals. Lexer rules may also use code-point
//! ranges (`'a'-'z'`) and the wildcard `.`. Any alternative may end in a
//! hint, `-> { "parent": 1, "children": [0, 2] }`.
//!
//! ```text
//! # arithmetic
//! Root  ::= int '+' Root -> { "parent": 1, "children": [0, 2] }
//!         | int ;
//! int   ::= _digit { _digit } ;
//! _digit = '0'-'9'
//! !ws   ::= ' ' { ' ' }
//! ```
//!
//! The AST is passive data: later phases only read it.

mod lexer;
mod parser;

use crate::GenError;
use chumsky::Parser as _;
use lrkit::Location;

pub use lexer::{Lexer, Token};

/// A whole grammar: rules in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    pub rules: Vec<Rule>,
}

/// `name ::= body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: Ident,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub location: Location,
}

/// A literal as written in the source, quotes and escapes included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub text: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Two or more alternatives.
    Alternates(Vec<Expr>),
    /// One or more terms in sequence.
    Sequence(Vec<Expr>),
    Optional(Box<Expr>),
    /// Zero or more repetitions.
    Repeat(Box<Expr>),
    Identifier(Ident),
    Literal(Literal),
    /// Inclusive code-point range between two single-character literals.
    Range(Literal, Literal),
    /// Any code point.
    Wildcard(Location),
    /// An alternative annotated with an AST hint.
    Hinted(Box<Expr>, HintSpec),
}

/// A hint as written in the grammar; resolved by [`crate::hints`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintSpec {
    pub fields: Vec<(Literal, HintValue)>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintValue {
    Int(usize),
    Str(Literal),
    List(Vec<usize>),
}

impl Expr {
    /// Source location of the first token of the expression.
    pub fn location(&self) -> Option<Location> {
        match self {
            Expr::Alternates(v) | Expr::Sequence(v) => v.first().and_then(Expr::location),
            Expr::Optional(e) | Expr::Repeat(e) | Expr::Hinted(e, _) => e.location(),
            Expr::Identifier(id) => Some(id.location),
            Expr::Literal(lit) | Expr::Range(lit, _) => Some(lit.location),
            Expr::Wildcard(loc) => Some(*loc),
        }
    }
}

/// Lexes and parses grammar source text.
pub fn parse(source: &str) -> Result<Grammar, GenError> {
    let tokens = Lexer::tokenize_all(source)?;
    let kinds: Vec<Token> = tokens.iter().map(|(t, _)| t.clone()).collect();
    parser::parser()
        .parse(&kinds)
        .into_result()
        .map_err(|errs| {
            let err = &errs[0];
            let location = tokens
                .get(err.span().start)
                .map(|(_, loc)| *loc)
                .or_else(|| tokens.last().map(|(_, loc)| *loc))
                .unwrap_or_default();
            let found = match err.found() {
                Some(tok) => tok.to_string(),
                None => "end of input".to_string(),
            };
            GenError::Syntax {
                message: format!("unexpected {}", found),
                location,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rules_with_and_without_semicolons() {
        let g = parse(
            "# demo\nRoot ::= int '+' Root | int ;\nint = '0'-'9' { '0'-'9' }\n!ws ::= ' '\n",
        )
        .unwrap();
        let names: Vec<&str> = g.rules.iter().map(|r| r.name.name.as_str()).collect();
        assert_eq!(names, ["Root", "int", "!ws"]);
        assert!(matches!(&g.rules[0].body, Expr::Alternates(alts) if alts.len() == 2));
        assert_eq!(g.rules[1].name.location, Location::new(3, 1, 37));
    }

    #[test]
    fn syntax_error_has_location() {
        let err = parse("Root ::= ( int\n").unwrap_err();
        match err {
            GenError::Syntax { location, .. } => assert_eq!(location.line, 1),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
