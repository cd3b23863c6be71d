use crate::GenError;
use crate::classify::{Classified, RuleKind};
use crate::grammar::Expr;
use crate::literal;
use std::fmt;

/// Largest Unicode code point.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

/// A regular expression over code points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Regex {
    /// A fixed string; empty matches only the empty string.
    Literal(String),
    /// Inclusive code-point range.
    Range(u32, u32),
    Concat(Vec<Regex>),
    Alt(Vec<Regex>),
    Optional(Box<Regex>),
    Star(Box<Regex>),
}

impl Regex {
    pub fn nullable(&self) -> bool {
        match self {
            Regex::Literal(s) => s.is_empty(),
            Regex::Range(..) => false,
            Regex::Concat(v) => v.iter().all(Regex::nullable),
            Regex::Alt(v) => v.iter().any(Regex::nullable),
            Regex::Optional(_) | Regex::Star(_) => true,
        }
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |f: &mut fmt::Formatter<'_>, v: &[Regex], sep: &str| -> fmt::Result {
            for (i, r) in v.iter().enumerate() {
                if i > 0 {
                    f.write_str(sep)?;
                }
                write!(f, "{}", r)?;
            }
            Ok(())
        };
        match self {
            Regex::Literal(s) => write!(f, "{:?}", s),
            Regex::Range(a, b) if *a == 0 && *b == MAX_CODE_POINT => f.write_str("."),
            Regex::Range(a, b) => write!(f, "[{:#x}-{:#x}]", a, b),
            Regex::Concat(v) => join(f, v, " "),
            Regex::Alt(v) => {
                f.write_str("(")?;
                join(f, v, " | ")?;
                f.write_str(")")
            }
            Regex::Optional(r) => write!(f, "({})?", r),
            Regex::Star(r) => write!(f, "({})*", r),
        }
    }
}

/// Lowers the body of lexer rule `name` to a [`Regex`], inlining references.
pub fn lower<'g>(classified: &Classified<'g>, name: &str) -> Result<Regex, GenError> {
    let mut stack = Vec::new();
    lower_rule(classified, name, &mut stack)
}

fn lower_rule<'g>(
    classified: &Classified<'g>,
    name: &str,
    stack: &mut Vec<&'g str>,
) -> Result<Regex, GenError> {
    if stack.iter().any(|s| *s == name) {
        let mut path: Vec<&str> = stack.to_vec();
        path.push(name);
        return Err(GenError::RecursiveLexerRule {
            name: name.to_string(),
            path: path.join(" -> "),
        });
    }
    let Some((&key, &rule)) = classified.lexer.get_key_value(name) else {
        // classify() has already resolved every reference
        return Err(GenError::UndefinedIdentifier {
            name: name.to_string(),
            location: Default::default(),
        });
    };
    stack.push(key);
    let re = lower_expr(classified, &rule.body, stack)?;
    stack.pop();
    Ok(re)
}

fn lower_expr<'g>(
    classified: &Classified<'g>,
    expr: &'g Expr,
    stack: &mut Vec<&'g str>,
) -> Result<Regex, GenError> {
    Ok(match expr {
        Expr::Alternates(v) => Regex::Alt(
            v.iter()
                .map(|e| lower_expr(classified, e, stack))
                .collect::<Result<_, _>>()?,
        ),
        Expr::Sequence(v) => Regex::Concat(
            v.iter()
                .map(|e| lower_expr(classified, e, stack))
                .collect::<Result<_, _>>()?,
        ),
        Expr::Optional(e) => Regex::Optional(Box::new(lower_expr(classified, e, stack)?)),
        Expr::Repeat(e) => Regex::Star(Box::new(lower_expr(classified, e, stack)?)),
        Expr::Identifier(id) => {
            if classified.kind(&id.name) == Some(RuleKind::Parser) {
                return Err(GenError::LexerRefersToParser {
                    rule: stack.last().map(|s| s.to_string()).unwrap_or_default(),
                    name: id.name.clone(),
                    location: id.location,
                });
            }
            lower_rule(classified, &id.name, stack)?
        }
        Expr::Literal(lit) => Regex::Literal(literal::unquote(lit)?),
        Expr::Range(from, to) => {
            let lo = literal::single_char(from)? as u32;
            let hi = literal::single_char(to)? as u32;
            if lo > hi {
                return Err(GenError::BadRange {
                    location: from.location,
                    reason: format!("{} is greater than {}", from.text, to.text),
                });
            }
            Regex::Range(lo, hi)
        }
        Expr::Wildcard(_) => Regex::Range(0, MAX_CODE_POINT),
        Expr::Hinted(_, hint) => {
            return Err(GenError::Hint {
                location: hint.location,
                reason: "hints are only allowed in parser rules".into(),
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{classify, grammar};

    fn lowered(src: &str, name: &str) -> Result<Regex, GenError> {
        let g = grammar::parse(src).unwrap();
        let c = classify::classify(&g).unwrap();
        lower(&c, name)
    }

    #[test]
    fn fragments_are_inlined() {
        let re = lowered("int ::= _d { _d }\n_d ::= '0'-'9'", "int").unwrap();
        assert_eq!(re.to_string(), "[0x30-0x39] ([0x30-0x39])*");
        assert!(!re.nullable());
    }

    #[test]
    fn optional_and_wildcard() {
        let re = lowered("c ::= '#' [ . ]", "c").unwrap();
        assert_eq!(re.to_string(), "\"#\" (.)?");
    }

    #[test]
    fn nullable_rules() {
        assert!(lowered("e ::= { 'a' }", "e").unwrap().nullable());
        assert!(lowered("e ::= 'a' | ''", "e").unwrap().nullable());
        assert!(!lowered("e ::= 'a' | 'b'", "e").unwrap().nullable());
    }

    #[test]
    fn recursion_is_rejected() {
        let err = lowered("a ::= 'x' _b\n_b ::= a", "a").unwrap_err();
        match err {
            GenError::RecursiveLexerRule { name, path } => {
                assert_eq!(name, "a");
                assert_eq!(path, "a -> _b -> a");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn reversed_range_is_rejected() {
        assert!(matches!(
            lowered("a ::= 'z'-'a'", "a"),
            Err(GenError::BadRange { .. })
        ));
    }
}
