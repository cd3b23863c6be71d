//! The table IR: lexer DFA, productions with hints, ACTION and GOTO tables.
//!
//! [`Tables`] is self-contained. It is what the generator produces, what the
//! emitter renders, and what [`Tables::to_json`] writes to disk. All maps are
//! `BTreeMap`s so that serialization is byte-for-byte stable: states appear in
//! numeric order and terminal/nonterminal names in lexicographic order.
//!
//! ```json
//! {
//!   "start_symbol": "Root",
//!   "productions": [{"lhs": "__start", "rhs_count": 1, "rhs": ["Root"]}, ...],
//!   "actions": {"0": {"int": {"type": "shift", "target": 2}}, ...},
//!   "gotos": {"0": {"Root": 1}, ...},
//!   "lexer": {"start_state": 0, "transitions": {"0": [{"from": 48, "to": 57, "next": 1}]}, ...},
//!   "meta": {"generator": "lrkit-gen", ...}
//! }
//! ```

use crate::{
    Ast, AstMode, Hint, LexerData, ParseError, Parser, ParserData, ProductionView, TableLexer,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A parser action stored in an ACTION cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    Shift { target: usize },
    Reduce { target: usize },
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift { target } => write!(f, "shift to state {}", target),
            Action::Reduce { target } => write!(f, "reduce by production {}", target),
            Action::Accept => write!(f, "accept"),
        }
    }
}

/// A DFA edge over the code points `from..=to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeTransition {
    pub from: u32,
    pub to: u32,
    pub next: usize,
}

impl RangeTransition {
    pub const fn new(from: u32, to: u32, next: usize) -> Self {
        Self { from, to, next }
    }

    #[inline]
    pub fn contains(&self, c: u32) -> bool {
        self.from <= c && c <= self.to
    }
}

/// Lexer DFA tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexerTables {
    pub start_state: usize,
    /// Per-state transitions, sorted by `from` and disjoint.
    pub transitions: BTreeMap<usize, Vec<RangeTransition>>,
    /// Accepting states and their token types.
    pub actions: BTreeMap<usize, String>,
    /// Ignored token types (those starting with `!`), sorted.
    #[serde(default)]
    pub ignored: Vec<String>,
    /// Token types in priority order.
    #[serde(default)]
    pub rules: Vec<String>,
}

impl LexerTables {
    /// Number of DFA states, i.e. one more than the largest state mentioned.
    pub fn state_count(&self) -> usize {
        let transitions = self
            .transitions
            .iter()
            .flat_map(|(s, ts)| std::iter::once(*s).chain(ts.iter().map(|t| t.next)));
        let accepts = self.actions.keys().copied();
        transitions
            .chain(accepts)
            .chain(std::iter::once(self.start_state))
            .max()
            .map_or(0, |m| m + 1)
    }
}

impl LexerData for LexerTables {
    fn start_state(&self) -> usize {
        self.start_state
    }

    fn transitions(&self, state: usize) -> &[RangeTransition] {
        self.transitions
            .get(&state)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn accept(&self, state: usize) -> Option<&str> {
        self.actions.get(&state).map(String::as_str)
    }
}

/// One BNF production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub lhs: String,
    pub rhs_count: usize,
    /// Right-hand-side symbol names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rhs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<Hint>,
}

impl Production {
    pub fn view(&self) -> ProductionView<'_> {
        ProductionView {
            lhs: &self.lhs,
            rhs_count: self.rhs_count,
            hint: self.hint.as_ref().map(Hint::view),
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ::=", self.lhs)?;
        if self.rhs.is_empty() {
            write!(f, " ε")
        } else {
            self.rhs.iter().try_for_each(|s| write!(f, " {}", s))
        }
    }
}

/// The complete generator output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tables {
    pub start_symbol: String,
    /// Production 0 is the augmented start production.
    pub productions: Vec<Production>,
    pub actions: BTreeMap<usize, BTreeMap<String, Action>>,
    pub gotos: BTreeMap<usize, BTreeMap<String, usize>>,
    pub lexer: LexerTables,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl Tables {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Number of parser states.
    pub fn state_count(&self) -> usize {
        let a = self.actions.keys().next_back();
        let g = self.gotos.keys().next_back();
        a.max(g).map_or(0, |m| m + 1)
    }

    /// A lexer over `input` driven by these tables.
    pub fn lexer(&self, input: &str) -> TableLexer<&LexerTables> {
        TableLexer::new(&self.lexer, input)
    }

    /// Lexes and parses `input` in-process.
    pub fn parse_str(&self, input: &str, mode: AstMode) -> Result<Ast, ParseError> {
        Parser::new(self.lexer(input), self).with_mode(mode).parse()
    }
}

impl ParserData for Tables {
    fn action(&self, state: usize, terminal: &str) -> Option<Action> {
        self.actions.get(&state)?.get(terminal).copied()
    }

    fn goto(&self, state: usize, nonterminal: &str) -> Option<usize> {
        self.gotos.get(&state)?.get(nonterminal).copied()
    }

    fn production(&self, index: usize) -> Option<ProductionView<'_>> {
        self.productions.get(index).map(Production::view)
    }

    fn expected(&self, state: usize) -> Vec<String> {
        self.actions
            .get(&state)
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }
}
