//! Lexer generator: token rules → Thompson NFA → range-indexed DFA.
//!
//! All token rules are combined into one automaton. Rule priority is the
//! order of [`LexerTables::rules`]: implicit literal tokens first (in order of
//! first appearance in parser rules), then named token and ignored rules in
//! declaration order. When a DFA state accepts several rules, the one with the
//! best priority labels it.

pub mod dfa;
pub mod nfa;
pub mod regex;

use crate::GenError;
use crate::classify::{Classified, RuleKind};
use lrkit::{LexerTables, is_ignored_type};
use nfa::Nfa;
use regex::Regex;
use std::collections::BTreeMap;

/// Builds lexer tables for the token rules of `classified` plus `literals`.
///
/// A literal gets its own token rule only if no named lexer rule has the
/// same name.
pub fn build_lexer(
    classified: &Classified<'_>,
    literals: &[String],
    max_states: usize,
) -> Result<LexerTables, GenError> {
    // every lexer rule is lowered, so fragments are validated even if unused
    let mut lowered = BTreeMap::new();
    for name in classified.lexer.keys() {
        lowered.insert(*name, regex::lower(classified, name)?);
    }

    let mut rules: Vec<(String, Regex)> = Vec::new();
    for lit in literals {
        if classified.kind(lit) != Some(RuleKind::Token) {
            rules.push((lit.clone(), Regex::Literal(lit.clone())));
        }
    }
    for rule in classified.token_rules() {
        let name = rule.name.name.as_str();
        if let Some(re) = lowered.remove(name) {
            rules.push((name.to_string(), re));
        }
    }

    for (name, re) in &rules {
        if re.nullable() {
            return Err(GenError::EmptyMatch { name: name.clone() });
        }
        log::trace!("token rule {}: {}", name, re);
    }

    let nfa = Nfa::build(rules.iter().map(|(_, re)| re));
    let dfa = dfa::build(&nfa, max_states)?;
    log::debug!(
        "lexer: {} token rules, {} NFA states, {} DFA states",
        rules.len(),
        nfa.states.len(),
        dfa.len()
    );

    let mut tables = LexerTables {
        start_state: 0,
        ..Default::default()
    };
    for (state, ranges) in dfa.transitions.into_iter().enumerate() {
        if !ranges.is_empty() {
            tables.transitions.insert(state, ranges);
        }
    }
    for (state, accept) in dfa.accepts.iter().enumerate() {
        if let Some(priority) = accept {
            tables.actions.insert(state, rules[*priority].0.clone());
        }
    }
    tables.ignored = rules
        .iter()
        .map(|(name, _)| name.clone())
        .filter(|name| is_ignored_type(name))
        .collect();
    tables.ignored.sort();
    tables.rules = rules.into_iter().map(|(name, _)| name).collect();
    Ok(tables)
}
