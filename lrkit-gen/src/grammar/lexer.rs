//! Lexer for grammar source files.
//!
//! Built on [`logos`]: [`LogosToken`] recognizes the raw lexical classes and
//! [`Lexer`] turns them into [`Token`]s annotated with 1-based line/column
//! [`Location`]s for diagnostics.
//!
//! Rule boundaries are not marked by a terminator (the `;` is optional), so
//! after tokenization every identifier immediately followed by `::=` or `=` is
//! re-tagged as a [`Token::RuleName`]. The parser relies on that to know where
//! one rule body ends and the next rule begins.

use crate::GenError;
use logos::Logos;
use lrkit::Location;
use std::fmt;

/// Tokens consumed by the grammar parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An identifier that starts a rule (followed by `::=` or `=`).
    RuleName(String, Location),
    /// Any other identifier.
    Ident(String, Location),
    /// A quoted literal, quotes included.
    Literal(String, Location),
    /// A non-negative integer (hint values).
    Int(usize),
    /// `::=` or `=`.
    Assign,
    /// `|`
    Pipe,
    /// `;`
    Semi,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBrack,
    /// `]`
    RBrack,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `->`, introducing a hint.
    Arrow(Location),
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `-`, between range bounds.
    Dash,
    /// `.`, the wildcard.
    Dot(Location),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::RuleName(name, _) | Token::Ident(name, _) => write!(f, "identifier `{}`", name),
            Token::Literal(text, _) => write!(f, "literal {}", text),
            Token::Int(n) => write!(f, "integer {}", n),
            Token::Assign => write!(f, "`::=`"),
            Token::Pipe => write!(f, "`|`"),
            Token::Semi => write!(f, "`;`"),
            Token::LParen => write!(f, "`(`"),
            Token::RParen => write!(f, "`)`"),
            Token::LBrack => write!(f, "`[`"),
            Token::RBrack => write!(f, "`]`"),
            Token::LBrace => write!(f, "`{{`"),
            Token::RBrace => write!(f, "`}}`"),
            Token::Arrow(_) => write!(f, "`->`"),
            Token::Comma => write!(f, "`,`"),
            Token::Colon => write!(f, "`:`"),
            Token::Dash => write!(f, "`-`"),
            Token::Dot(_) => write!(f, "`.`"),
        }
    }
}

/// Raw tokens recognized by the `logos`-based lexer.
#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum LogosToken {
    /// A comment running to the end of the line.
    #[regex(r"#[^\n]*")]
    Comment,

    #[token("::=")]
    #[token("=")]
    Assign,

    #[token("|")]
    Pipe,

    #[token(";")]
    Semi,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBrack,

    #[token("]")]
    RBrack,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("->")]
    Arrow,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token("-")]
    Dash,

    #[token(".")]
    Dot,

    /// Rule and symbol names, including `!ignored` and `_fragment` names.
    #[regex(r"[!_A-Za-z][A-Za-z0-9_]*")]
    Ident,

    /// Single- or double-quoted literal with backslash escapes.
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r#"'([^'\\\n]|\\.)*'"#)]
    Literal,

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<usize>().ok())]
    Int(usize),
}

/// Maps byte offsets to line/column locations.
struct LineIndex<'source> {
    source: &'source str,
    starts: Vec<usize>,
}

impl<'source> LineIndex<'source> {
    fn new(source: &'source str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { source, starts }
    }

    fn location(&self, offset: usize) -> Location {
        let line = self.starts.partition_point(|&s| s <= offset);
        let start = self.starts[line - 1];
        let column = self.source[start..offset].chars().count() + 1;
        Location::new(line, column, offset)
    }
}

/// Source-level lexer for grammar files.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, LogosToken>,
    lines: LineIndex<'source>,
}

impl<'source> Lexer<'source> {
    pub fn new(input: &'source str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            lines: LineIndex::new(input),
        }
    }

    /// Returns the next token with its location, `None` at end of input.
    pub fn next_token(&mut self) -> Option<Result<(Token, Location), GenError>> {
        while let Some(kind) = self.inner.next() {
            let slice = self.inner.slice();
            let location = self.lines.location(self.inner.span().start);
            let token = match kind {
                Ok(LogosToken::Comment) => continue,
                Ok(LogosToken::Assign) => Token::Assign,
                Ok(LogosToken::Pipe) => Token::Pipe,
                Ok(LogosToken::Semi) => Token::Semi,
                Ok(LogosToken::LParen) => Token::LParen,
                Ok(LogosToken::RParen) => Token::RParen,
                Ok(LogosToken::LBrack) => Token::LBrack,
                Ok(LogosToken::RBrack) => Token::RBrack,
                Ok(LogosToken::LBrace) => Token::LBrace,
                Ok(LogosToken::RBrace) => Token::RBrace,
                Ok(LogosToken::Arrow) => Token::Arrow(location),
                Ok(LogosToken::Comma) => Token::Comma,
                Ok(LogosToken::Colon) => Token::Colon,
                Ok(LogosToken::Dash) => Token::Dash,
                Ok(LogosToken::Dot) => Token::Dot(location),
                Ok(LogosToken::Ident) => Token::Ident(slice.to_string(), location),
                Ok(LogosToken::Literal) => Token::Literal(slice.to_string(), location),
                Ok(LogosToken::Int(n)) => Token::Int(n),
                Err(()) => {
                    return Some(Err(GenError::Syntax {
                        message: format!("unrecognized input {:?}", slice),
                        location,
                    }));
                }
            };
            return Some(Ok((token, location)));
        }
        None
    }

    /// Tokenizes the entire input, tagging rule names.
    pub fn tokenize_all(input: &'source str) -> Result<Vec<(Token, Location)>, GenError> {
        let mut lex = Lexer::new(input);
        let mut out: Vec<(Token, Location)> = Vec::new();
        while let Some(tok) = lex.next_token() {
            let (tok, location) = tok?;
            if tok == Token::Assign {
                if let Some((prev, _)) = out.last_mut() {
                    if let Token::Ident(name, loc) = prev {
                        *prev = Token::RuleName(std::mem::take(name), *loc);
                    }
                }
            }
            out.push((tok, location));
        }
        log::trace!("grammar tokens: {}", out.len());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        Lexer::tokenize_all(input)
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn simple_rule() {
        let toks = kinds("Root ::= int '+' Root # trailing comment\n");
        assert_eq!(toks.len(), 5);
        assert!(matches!(&toks[0], Token::RuleName(n, _) if n == "Root"));
        assert_eq!(toks[1], Token::Assign);
        assert!(matches!(&toks[2], Token::Ident(n, _) if n == "int"));
        assert!(matches!(&toks[3], Token::Literal(t, _) if t == "'+'"));
        assert!(matches!(&toks[4], Token::Ident(n, _) if n == "Root"));
    }

    #[test]
    fn rule_names_without_semicolons() {
        let toks = kinds("a = 'x'\n!ws = ' '\n_frag ::= a");
        let names: Vec<&str> = toks
            .iter()
            .filter_map(|t| match t {
                Token::RuleName(n, _) => Some(n.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, ["a", "!ws", "_frag"]);
    }

    #[test]
    fn hint_and_range_tokens() {
        let toks = kinds(r#"d = '0'-'9' . -> { "parent": 12, "children": [0, 2] }"#);
        assert!(toks.contains(&Token::Dash));
        assert!(toks.iter().any(|t| matches!(t, Token::Arrow(_))));
        assert!(toks.iter().any(|t| matches!(t, Token::Dot(_))));
        assert!(toks.contains(&Token::Int(12)));
    }

    #[test]
    fn escaped_quotes_stay_in_one_literal() {
        let toks = kinds(r#"q = "a\"b" 'c\'d'"#);
        assert!(matches!(&toks[2], Token::Literal(t, _) if t == r#""a\"b""#));
        assert!(matches!(&toks[3], Token::Literal(t, _) if t == r#"'c\'d'"#));
    }

    #[test]
    fn locations_are_one_based() {
        let toks = Lexer::tokenize_all("A ::= b\n  | c").unwrap();
        assert_eq!(toks[3].1, Location::new(2, 3, 10));
    }

    #[test]
    fn bad_character_is_reported() {
        let err = Lexer::tokenize_all("A ::= b @").unwrap_err();
        assert!(err.to_string().contains("line 1, column 9"), "{err}");
    }
}
