//! EBNF → BNF normalization of parser rules.
//!
//! Each parser rule body is expanded depth-first, in source order:
//!  * a sequence becomes the cartesian product of its terms' expansions;
//!  * alternates contribute their expansions one after another;
//!  * `[ X ]` expands to the expansions of `X` followed by the empty one;
//!  * `{ X }` becomes a fresh `__repeat_N` nonterminal with `R ::= ε` and
//!    `R ::= X R` (one production per non-empty expansion of `X`); these are
//!    emitted before the productions of the rule that contains them.
//!
//! Literals become terminals named by their unquoted text. The augmented
//! start production `__start ::= S` is production 0.

use crate::GenError;
use crate::classify::{Classified, RuleKind};
use crate::grammar::{Expr, HintSpec, Rule};
use crate::hints;
use crate::literal;
use crate::symtab::Symtab;
use lrkit::{EOF, ERROR, Hint};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(String),
    Nonterminal(String),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(s) | Symbol::Nonterminal(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BnfProduction {
    pub lhs: String,
    pub rhs: Vec<Symbol>,
    pub hint: Option<Hint>,
}

impl fmt::Display for BnfProduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ::=", self.lhs)?;
        if self.rhs.is_empty() {
            return write!(f, " ε");
        }
        self.rhs.iter().try_for_each(|s| write!(f, " {}", s.name()))
    }
}

/// A grammar in normalized BNF form.
#[derive(Debug, Clone)]
pub struct Bnf {
    /// The user's start symbol.
    pub start: String,
    /// Production 0 is `augmented ::= start`.
    pub productions: Vec<BnfProduction>,
    /// Augmented start, then parser rules in declaration order, then synthetic ones.
    pub nonterminals: Vec<String>,
    /// Terminals in order of first appearance in `productions`.
    pub terminals: Vec<String>,
    /// Literal terminals in order of first appearance in the grammar source.
    pub literals: Vec<String>,
}

type Alternative = Vec<Symbol>;

struct Normalizer<'c, 'g> {
    classified: &'c Classified<'g>,
    names: Symtab,
    productions: Vec<BnfProduction>,
    synthetic: Vec<String>,
    literals: Symtab,
}

/// Normalizes the parser rules of `classified`.
pub fn normalize(classified: &Classified<'_>) -> Result<Bnf, GenError> {
    if classified.parser.is_empty() {
        return Err(GenError::NoParserRules);
    }
    let mut names = Symtab::new();
    for name in classified.lexer.keys().chain(classified.parser.keys()) {
        names.add(name);
    }
    let mut n = Normalizer {
        classified,
        names,
        productions: Vec::new(),
        synthetic: Vec::new(),
        literals: Symtab::new(),
    };
    for rule in classified.parser.values() {
        n.rule(rule)?;
    }

    let start = if classified.parser.contains_key("Root") {
        "Root".to_string()
    } else {
        classified
            .parser
            .keys()
            .next()
            .map(|s| s.to_string())
            .ok_or(GenError::NoParserRules)?
    };
    let augmented = n.names.fresh("__start");
    n.productions.insert(
        0,
        BnfProduction {
            lhs: augmented.clone(),
            rhs: vec![Symbol::Nonterminal(start.clone())],
            hint: None,
        },
    );

    let nonterminals: Vec<String> = std::iter::once(augmented)
        .chain(classified.parser.keys().map(|s| s.to_string()))
        .chain(n.synthetic.iter().cloned())
        .collect();
    let mut terminals = Symtab::new();
    for prod in &n.productions {
        for sym in &prod.rhs {
            if let Symbol::Terminal(t) = sym {
                terminals.add(t);
            }
        }
    }

    let bnf = Bnf {
        start,
        productions: n.productions,
        nonterminals,
        terminals: terminals.iter().cloned().collect(),
        literals: n.literals.iter().cloned().collect(),
    };
    check_productive(&bnf)?;
    warn_unreachable(&bnf);
    log::debug!(
        "normalized to {} productions, {} nonterminals, {} terminals",
        bnf.productions.len(),
        bnf.nonterminals.len(),
        bnf.terminals.len()
    );
    Ok(bnf)
}

impl Normalizer<'_, '_> {
    fn rule(&mut self, rule: &Rule) -> Result<(), GenError> {
        let lhs = rule.name.name.as_str();
        let top: Vec<&Expr> = match &rule.body {
            Expr::Alternates(alts) => alts.iter().collect(),
            body => vec![body],
        };
        let mut out = Vec::new();
        for alt in top {
            match alt {
                Expr::Hinted(inner, spec) => {
                    let hint = hints::resolve(spec)?;
                    for rhs in self.expand(inner)? {
                        check_hint(&hint, spec, lhs, &rhs)?;
                        out.push(BnfProduction {
                            lhs: lhs.to_string(),
                            rhs,
                            hint: Some(hint.clone()),
                        });
                    }
                }
                _ => {
                    for rhs in self.expand(alt)? {
                        out.push(BnfProduction {
                            lhs: lhs.to_string(),
                            rhs,
                            hint: None,
                        });
                    }
                }
            }
        }
        self.productions.extend(out);
        Ok(())
    }

    fn expand(&mut self, expr: &Expr) -> Result<Vec<Alternative>, GenError> {
        match expr {
            Expr::Alternates(alts) => {
                let mut out = Vec::new();
                for alt in alts {
                    out.extend(self.expand(alt)?);
                }
                Ok(out)
            }
            Expr::Sequence(terms) => {
                let mut acc: Vec<Alternative> = vec![Vec::new()];
                for term in terms {
                    let tails = self.expand(term)?;
                    let mut next = Vec::with_capacity(acc.len() * tails.len());
                    for head in &acc {
                        for tail in &tails {
                            let mut v = head.clone();
                            v.extend(tail.iter().cloned());
                            next.push(v);
                        }
                    }
                    acc = next;
                }
                Ok(acc)
            }
            Expr::Optional(inner) => {
                let mut out = self.expand(inner)?;
                out.push(Vec::new());
                Ok(out)
            }
            Expr::Repeat(inner) => {
                let alts = self.expand(inner)?;
                let name = self.names.fresh(&format!("__repeat_{}", self.synthetic.len() + 1));
                self.names.add(&name);
                self.synthetic.push(name.clone());
                let repeat = Symbol::Nonterminal(name.clone());
                self.productions.push(BnfProduction {
                    lhs: name.clone(),
                    rhs: Vec::new(),
                    hint: None,
                });
                for mut rhs in alts.into_iter().filter(|a| !a.is_empty()) {
                    rhs.push(repeat.clone());
                    self.productions.push(BnfProduction {
                        lhs: name.clone(),
                        rhs,
                        hint: None,
                    });
                }
                Ok(vec![vec![repeat]])
            }
            Expr::Identifier(id) => match self.classified.kind(&id.name) {
                Some(RuleKind::Parser) => Ok(vec![vec![Symbol::Nonterminal(id.name.clone())]]),
                Some(RuleKind::Token) => Ok(vec![vec![Symbol::Terminal(id.name.clone())]]),
                Some(RuleKind::Ignored) => Err(GenError::IgnoredReference {
                    name: id.name.clone(),
                    location: id.location,
                }),
                Some(RuleKind::Fragment) => Err(GenError::FragmentReference {
                    name: id.name.clone(),
                    location: id.location,
                }),
                None => Err(GenError::UndefinedIdentifier {
                    name: id.name.clone(),
                    location: id.location,
                }),
            },
            Expr::Literal(lit) => {
                let text = literal::unquote(lit)?;
                if text == EOF || text == ERROR {
                    return Err(GenError::ReservedName {
                        name: text,
                        location: lit.location,
                    });
                }
                if text.is_empty() {
                    return Err(GenError::BadLiteral {
                        text: lit.text.clone(),
                        location: lit.location,
                        reason: "empty literal in parser rule".into(),
                    });
                }
                if let Some(kind @ (RuleKind::Fragment | RuleKind::Ignored | RuleKind::Parser)) =
                    self.classified.kind(&text)
                {
                    return Err(GenError::LiteralCollision {
                        name: text,
                        kind: kind.describe(),
                        location: lit.location,
                    });
                }
                self.literals.add(&text);
                Ok(vec![vec![Symbol::Terminal(text)]])
            }
            Expr::Range(from, _) => Err(GenError::LexerOnly {
                what: "code-point range",
                location: from.location,
            }),
            Expr::Wildcard(location) => Err(GenError::LexerOnly {
                what: "wildcard `.`",
                location: *location,
            }),
            Expr::Hinted(_, spec) => Err(GenError::Hint {
                location: spec.location,
                reason: "a hint must annotate a whole alternative of a rule".into(),
            }),
        }
    }
}

fn check_hint(hint: &Hint, spec: &HintSpec, lhs: &str, rhs: &[Symbol]) -> Result<(), GenError> {
    hints::validate(hint, rhs.len()).map_err(|reason| {
        let prod = BnfProduction {
            lhs: lhs.to_string(),
            rhs: rhs.to_vec(),
            hint: None,
        };
        GenError::Hint {
            location: spec.location,
            reason: format!("{} (production {})", reason, prod),
        }
    })
}

/// Every nonterminal must derive at least one terminal string.
fn check_productive(bnf: &Bnf) -> Result<(), GenError> {
    let mut productive = std::collections::HashSet::new();
    let mut changed = true;
    while changed {
        changed = false;
        for prod in &bnf.productions {
            if productive.contains(prod.lhs.as_str()) {
                continue;
            }
            let ok = prod.rhs.iter().all(|s| match s {
                Symbol::Terminal(_) => true,
                Symbol::Nonterminal(n) => productive.contains(n.as_str()),
            });
            if ok {
                productive.insert(prod.lhs.as_str());
                changed = true;
            }
        }
    }
    match bnf
        .nonterminals
        .iter()
        .skip(1)
        .find(|n| !productive.contains(n.as_str()))
    {
        Some(name) => Err(GenError::UnproductiveRule { name: name.clone() }),
        None => Ok(()),
    }
}

fn warn_unreachable(bnf: &Bnf) {
    let mut reached = std::collections::HashSet::new();
    let mut stack = vec![bnf.productions[0].lhs.as_str()];
    while let Some(n) = stack.pop() {
        if !reached.insert(n) {
            continue;
        }
        for prod in bnf.productions.iter().filter(|p| p.lhs == n) {
            for sym in &prod.rhs {
                if let Symbol::Nonterminal(m) = sym {
                    stack.push(m);
                }
            }
        }
    }
    for n in bnf.nonterminals.iter().filter(|n| !reached.contains(n.as_str())) {
        log::warn!("rule {:?} is unreachable from {:?}", n, bnf.start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{classify, grammar};

    fn bnf(src: &str) -> Result<Bnf, GenError> {
        let g = grammar::parse(src).unwrap();
        let c = classify::classify(&g).unwrap();
        normalize(&c)
    }

    fn rendered(b: &Bnf) -> Vec<String> {
        b.productions.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn alternates_and_augmentation() {
        let b = bnf("Root ::= int '+' Root | int '*' Root | int\nint ::= '0'-'9'").unwrap();
        assert_eq!(b.start, "Root");
        assert_eq!(
            rendered(&b),
            [
                "__start ::= Root",
                "Root ::= int + Root",
                "Root ::= int * Root",
                "Root ::= int",
            ]
        );
        assert_eq!(b.terminals, ["int", "+", "*"]);
        assert_eq!(b.literals, ["+", "*"]);
        assert_eq!(b.nonterminals, ["__start", "Root"]);
    }

    #[test]
    fn optional_distributes_with_item_first() {
        let b = bnf("S ::= 'a' ['b'] ('c' | 'd')").unwrap();
        assert_eq!(
            rendered(&b)[1..],
            ["S ::= a b c", "S ::= a b d", "S ::= a c", "S ::= a d"]
        );
    }

    #[test]
    fn repeat_introduces_synthetic_rule() {
        let b = bnf("List ::= '[' { x ',' } ']'\nx ::= 'x'").unwrap();
        assert_eq!(
            rendered(&b),
            [
                "__start ::= List",
                "__repeat_1 ::= ε",
                "__repeat_1 ::= x , __repeat_1",
                "List ::= [ __repeat_1 ]",
            ]
        );
        assert_eq!(b.nonterminals, ["__start", "List", "__repeat_1"]);
    }

    #[test]
    fn ignored_and_fragment_names_stay_out_of_parser_rules() {
        let err = bnf("S ::= 'a' !ws\n!ws ::= ' '").unwrap_err();
        assert!(matches!(err, GenError::IgnoredReference { ref name, .. } if name == "!ws"));
        let err = bnf("S ::= '!ws'\n!ws ::= ' '").unwrap_err();
        assert!(matches!(err, GenError::LiteralCollision { kind: "ignored", .. }));
        let err = bnf("S ::= x '_y'\nx ::= _y\n_y ::= 'y'").unwrap_err();
        assert!(matches!(err, GenError::LiteralCollision { kind: "fragment", .. }));
        let err = bnf("S ::= 'T' T\nT ::= 'x'").unwrap_err();
        assert!(matches!(err, GenError::LiteralCollision { kind: "parser", .. }));
        // a literal may name a token rule; the rule then scans it
        assert!(bnf("S ::= 'x'\nx ::= 'x' { 'x' }").is_ok());
    }

    #[test]
    fn start_is_root_when_present() {
        let b = bnf("A ::= 'a'\nRoot ::= A").unwrap();
        assert_eq!(b.start, "Root");
        let b = bnf("A ::= 'a'\nB ::= A").unwrap();
        assert_eq!(b.start, "A");
    }

    #[test]
    fn synthetic_names_avoid_user_names() {
        let b = bnf("S ::= 'a'\n__start ::= 'b'").unwrap();
        assert_eq!(b.productions[0].lhs, "__start_1");
    }

    #[test]
    fn hints_apply_to_each_expansion() {
        let b = bnf(r#"S ::= x ['+'] x -> { "parent": 0, "children": [0] }
                       x ::= 'x'"#)
        .unwrap();
        assert_eq!(b.productions.len(), 3);
        assert!(b.productions[1..].iter().all(|p| p.hint.is_some()));
    }

    #[test]
    fn hint_out_of_bounds() {
        let err = bnf(r#"S ::= x -> { "parent": 0, "children": [1] }
                         x ::= 'x'"#)
        .unwrap_err();
        assert!(err.to_string().contains("out of bounds"), "{err}");
    }

    #[test]
    fn nested_hint_is_rejected() {
        let err = bnf(r#"S ::= ( x -> { "passthrough": 0 } ) x
                         x ::= 'x'"#)
        .unwrap_err();
        assert!(matches!(err, GenError::Hint { .. }));
    }

    #[test]
    fn lexer_only_constructs() {
        assert!(matches!(bnf("S ::= 'a'-'z'"), Err(GenError::LexerOnly { .. })));
        assert!(matches!(bnf("S ::= ."), Err(GenError::LexerOnly { .. })));
    }

    #[test]
    fn reserved_literals() {
        assert!(matches!(bnf("S ::= 'EOF'"), Err(GenError::ReservedName { .. })));
    }

    #[test]
    fn unproductive_rule() {
        let err = bnf("S ::= 'a' T\nT ::= 'b' T").unwrap_err();
        assert!(matches!(err, GenError::UnproductiveRule { ref name } if name == "S"));
    }

    #[test]
    fn no_parser_rules() {
        assert!(matches!(bnf("x ::= 'x'"), Err(GenError::NoParserRules)));
    }
}
