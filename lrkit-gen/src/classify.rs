//! Partitioning of rules into lexer and parser rules.
//!
//! The kind of a rule follows from the first character of its name:
//!
//! | prefix | kind |
//! |---|---|
//! | `!` | ignored token (whitespace, comments) |
//! | `_` | fragment, inlined into other lexer rules |
//! | lowercase letter | token |
//! | anything else | parser rule |

use crate::GenError;
use crate::grammar::{Expr, Grammar, Rule};
use indexmap::IndexMap;
use lrkit::{EOF, ERROR, Location};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Token,
    Ignored,
    Fragment,
    Parser,
}

impl RuleKind {
    pub fn of(name: &str) -> Self {
        match name.chars().next() {
            Some('!') => RuleKind::Ignored,
            Some('_') => RuleKind::Fragment,
            Some(c) if c.is_lowercase() => RuleKind::Token,
            _ => RuleKind::Parser,
        }
    }

    pub fn is_lexer(self) -> bool {
        self != RuleKind::Parser
    }

    pub fn describe(self) -> &'static str {
        match self {
            RuleKind::Token => "token",
            RuleKind::Ignored => "ignored",
            RuleKind::Fragment => "fragment",
            RuleKind::Parser => "parser",
        }
    }
}

/// Rules split by kind, each map in declaration order.
#[derive(Debug)]
pub struct Classified<'g> {
    pub lexer: IndexMap<&'g str, &'g Rule>,
    pub parser: IndexMap<&'g str, &'g Rule>,
}

impl<'g> Classified<'g> {
    pub fn kind(&self, name: &str) -> Option<RuleKind> {
        if self.lexer.contains_key(name) {
            Some(RuleKind::of(name))
        } else if self.parser.contains_key(name) {
            Some(RuleKind::Parser)
        } else {
            None
        }
    }

    /// Token and ignored rules, in declaration order.
    pub fn token_rules(&self) -> impl Iterator<Item = &'g Rule> + '_ {
        self.lexer
            .values()
            .copied()
            .filter(|r| RuleKind::of(&r.name.name) != RuleKind::Fragment)
    }
}

/// Classifies the rules of `grammar` and checks every identifier reference.
pub fn classify(grammar: &Grammar) -> Result<Classified<'_>, GenError> {
    let mut lexer = IndexMap::new();
    let mut parser = IndexMap::new();
    let mut seen: IndexMap<&str, Location> = IndexMap::new();

    for rule in &grammar.rules {
        let name = rule.name.name.as_str();
        if name == EOF || name == ERROR {
            return Err(GenError::ReservedName {
                name: name.to_string(),
                location: rule.name.location,
            });
        }
        if let Some(&previous) = seen.get(name) {
            return Err(GenError::DuplicateRule {
                name: name.to_string(),
                location: rule.name.location,
                previous,
            });
        }
        seen.insert(name, rule.name.location);
        if RuleKind::of(name).is_lexer() {
            lexer.insert(name, rule);
        } else {
            parser.insert(name, rule);
        }
    }

    let classified = Classified { lexer, parser };
    for rule in &grammar.rules {
        check_references(&classified, rule, &rule.body)?;
    }
    log::debug!(
        "classified {} lexer rules, {} parser rules",
        classified.lexer.len(),
        classified.parser.len()
    );
    Ok(classified)
}

fn check_references(classified: &Classified<'_>, rule: &Rule, expr: &Expr) -> Result<(), GenError> {
    match expr {
        Expr::Alternates(v) | Expr::Sequence(v) => v
            .iter()
            .try_for_each(|e| check_references(classified, rule, e)),
        Expr::Optional(e) | Expr::Repeat(e) | Expr::Hinted(e, _) => {
            check_references(classified, rule, e)
        }
        Expr::Identifier(id) => {
            let in_lexer = RuleKind::of(&rule.name.name).is_lexer();
            match classified.kind(&id.name) {
                None => Err(GenError::UndefinedIdentifier {
                    name: id.name.clone(),
                    location: id.location,
                }),
                Some(RuleKind::Parser) if in_lexer => Err(GenError::LexerRefersToParser {
                    rule: rule.name.name.clone(),
                    name: id.name.clone(),
                    location: id.location,
                }),
                Some(RuleKind::Fragment) if !in_lexer => Err(GenError::FragmentReference {
                    name: id.name.clone(),
                    location: id.location,
                }),
                Some(_) => Ok(()),
            }
        }
        Expr::Literal(_) | Expr::Range(..) | Expr::Wildcard(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar;

    #[test]
    fn kinds_by_prefix() {
        assert_eq!(RuleKind::of("!ws"), RuleKind::Ignored);
        assert_eq!(RuleKind::of("_digit"), RuleKind::Fragment);
        assert_eq!(RuleKind::of("int"), RuleKind::Token);
        assert_eq!(RuleKind::of("Root"), RuleKind::Parser);
        assert!(!RuleKind::Parser.is_lexer());
    }

    #[test]
    fn partitions_in_declaration_order() {
        let g = grammar::parse("Root ::= x Sum\nSum ::= x\n!ws ::= ' '\nx ::= _d\n_d ::= '0'").unwrap();
        let c = classify(&g).unwrap();
        assert_eq!(c.parser.keys().copied().collect::<Vec<_>>(), ["Root", "Sum"]);
        assert_eq!(c.lexer.keys().copied().collect::<Vec<_>>(), ["!ws", "x", "_d"]);
        let tokens: Vec<&str> = c.token_rules().map(|r| r.name.name.as_str()).collect();
        assert_eq!(tokens, ["!ws", "x"]);
    }

    #[test]
    fn duplicate_rule() {
        let g = grammar::parse("A ::= b\nb ::= 'b'\nA ::= b").unwrap();
        let err = classify(&g).unwrap_err();
        assert!(matches!(err, GenError::DuplicateRule { ref name, .. } if name == "A"));
        assert!(err.to_string().contains("line 3, column 1"), "{err}");
    }

    #[test]
    fn undefined_identifier() {
        let g = grammar::parse("A ::= b c\nb ::= 'b'").unwrap();
        assert!(matches!(
            classify(&g),
            Err(GenError::UndefinedIdentifier { ref name, .. }) if name == "c"
        ));
    }

    #[test]
    fn fragment_in_parser_rule() {
        let g = grammar::parse("A ::= _d\n_d ::= '0'").unwrap();
        assert!(matches!(
            classify(&g),
            Err(GenError::FragmentReference { .. })
        ));
    }

    #[test]
    fn lexer_rule_referring_to_parser_rule() {
        let g = grammar::parse("A ::= b\nb ::= A").unwrap();
        assert!(matches!(
            classify(&g),
            Err(GenError::LexerRefersToParser { .. })
        ));
    }

    #[test]
    fn reserved_rule_name() {
        let g = grammar::parse("EOF ::= x\nx ::= 'x'").unwrap();
        assert!(matches!(classify(&g), Err(GenError::ReservedName { .. })));
    }
}
