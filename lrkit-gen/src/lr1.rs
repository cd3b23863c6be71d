// This module defines LR(1) item machinery, FIRST computations, and
// canonical LR(1) ACTION/GOTO table construction.

use crate::normalize::{Bnf, Symbol};
use crate::symtab::Symtab;
use crate::{Conflict, GenError};
use lrkit::{Action, EOF};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{self, Write};

/// An LR(1) item: a production, a dot position, and one lookahead terminal.
///
/// Productions are encoded as symbol index vectors with the left-hand side at
/// index `0`, so the dot of a fresh item is `1` and an item is complete when
/// `dot == prods[prod].len()`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Item {
    /// The index of the production in the grammar.
    pub prod: usize,

    /// The position of the dot; `1` is before the first right-hand-side symbol.
    pub dot: usize,

    /// The lookahead terminal (a symbol index `>= n_nonterm`).
    pub lookahead: usize,
}

/// A set of LR(1) items
pub type ItemSet = BTreeSet<Item>;

/// ACTION and GOTO tables keyed by state and symbol name.
#[derive(Debug, Clone, Default)]
pub struct ParseTables {
    pub actions: BTreeMap<usize, BTreeMap<String, Action>>,
    pub gotos: BTreeMap<usize, BTreeMap<String, usize>>,
}

/// The canonical LR(1) automaton of a normalized grammar.
#[derive(Debug, Clone)]
pub struct Lr1 {
    /// Symbol names: nonterminals first (the augmented start is `0`), then
    /// terminals, with `EOF` last.
    pub symbols: Vec<String>,
    pub n_nonterm: usize,
    pub n_term: usize,
    /// Productions as symbol index vectors, lhs at index `0`.
    pub prods: Vec<Vec<usize>>,
    pub first: Vec<BTreeSet<usize>>,
    pub nullable: Vec<bool>,
    /// Item sets, numbered in BFS order from the start state.
    pub states: Vec<ItemSet>,
    /// Per-state transitions, by symbol index.
    pub transitions: Vec<BTreeMap<usize, usize>>,
    by_lhs: Vec<Vec<usize>>,
}

/// Encodes `bnf` as symbol index vectors.
///
/// Returns the productions, the symbol names, and the number of nonterminals
/// and terminals (including `EOF`).
pub fn encode(bnf: &Bnf) -> (Vec<Vec<usize>>, Vec<String>, usize, usize) {
    let mut nonterms = Symtab::new();
    for n in &bnf.nonterminals {
        nonterms.add(n);
    }
    let mut terms = Symtab::new();
    for t in &bnf.terminals {
        terms.add(t);
    }
    terms.add(EOF);
    let n_nonterm = nonterms.len();

    let prods = bnf
        .productions
        .iter()
        .map(|prod| {
            std::iter::once(nonterms.idx(&prod.lhs).unwrap_or_default())
                .chain(prod.rhs.iter().map(|sym| match sym {
                    Symbol::Nonterminal(n) => nonterms.idx(n).unwrap_or_default(),
                    Symbol::Terminal(t) => n_nonterm + terms.idx(t).unwrap_or_default(),
                }))
                .collect::<Vec<usize>>()
        })
        .collect();
    let symbols = nonterms.iter().chain(terms.iter()).cloned().collect();
    (prods, symbols, n_nonterm, terms.len())
}

/// Computes FIRST sets and nullability for all grammar symbols.
///
/// Iteratively determines which terminals can begin each nonterminal’s derivations
/// and which symbols can derive the empty string.
///
/// # Parameters
/// - `prods`: Grammar productions, with the LHS at index `0`.
/// - `n_nonterm`: Number of nonterminal symbols.
/// - `n_term`: Number of terminal symbols.
///
/// # Returns
/// A tuple containing:
/// - A vector of FIRST sets (one per symbol).
/// - A vector of booleans marking nullable symbols.
pub fn first_sets(
    prods: &[Vec<usize>],
    n_nonterm: usize,
    n_term: usize,
) -> (Vec<BTreeSet<usize>>, Vec<bool>) {
    let n_sym = n_nonterm + n_term;
    let mut first: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n_sym];
    let mut nullable = vec![false; n_sym];
    // Terminals: FIRST(t) = {t}
    for (t, set) in first.iter_mut().enumerate().skip(n_nonterm) {
        set.insert(t);
    }
    let mut changed = true;
    while changed {
        changed = false;
        for prod in prods {
            let lhs = prod[0];
            let mut all_nullable = true;
            for &sym in &prod[1..] {
                // Clone FIRST(sym) to avoid simultaneous borrow
                let first_sym = first[sym].clone();
                for f in first_sym {
                    if first[lhs].insert(f) {
                        changed = true;
                    }
                }
                if !nullable[sym] {
                    all_nullable = false;
                    break;
                }
            }
            if all_nullable && !nullable[lhs] {
                nullable[lhs] = true;
                changed = true;
            }
        }
    }
    (first, nullable)
}

impl Lr1 {
    /// Builds the canonical collection of LR(1) item sets for `bnf`.
    pub fn build(bnf: &Bnf, max_states: usize) -> Result<Self, GenError> {
        let (prods, symbols, n_nonterm, n_term) = encode(bnf);
        let (first, nullable) = first_sets(&prods, n_nonterm, n_term);
        let mut by_lhs = vec![Vec::new(); n_nonterm];
        for (j, p) in prods.iter().enumerate() {
            by_lhs[p[0]].push(j);
        }
        let mut lr = Lr1 {
            symbols,
            n_nonterm,
            n_term,
            prods,
            first,
            nullable,
            states: Vec::new(),
            transitions: Vec::new(),
            by_lhs,
        };
        lr.construct_set(max_states)?;
        log::debug!("LR(1) automaton: {} states", lr.states.len());
        Ok(lr)
    }

    pub fn eof(&self) -> usize {
        self.n_nonterm + self.n_term - 1
    }

    /// FIRST of the symbol string `seq` followed by `lookahead`.
    fn first_of(&self, seq: &[usize], lookahead: usize) -> BTreeSet<usize> {
        let mut out = BTreeSet::new();
        for &sym in seq {
            out.extend(self.first[sym].iter().copied());
            if !self.nullable[sym] {
                return out;
            }
        }
        out.insert(lookahead);
        out
    }

    /// Computes the LR(1) *closure* of a set of items.
    ///
    /// For each item `[A ::= α . B β, a]` adds `[B ::= . γ, b]` for every
    /// production of `B` and every `b` in FIRST(β a), until saturation.
    pub fn closure(&self, items: &ItemSet) -> ItemSet {
        let mut c = items.clone();
        let mut work: Vec<Item> = items.iter().cloned().collect();
        while let Some(item) = work.pop() {
            let p = &self.prods[item.prod];
            if item.dot >= p.len() || p[item.dot] >= self.n_nonterm {
                continue;
            }
            let lookaheads = self.first_of(&p[item.dot + 1..], item.lookahead);
            for &j in &self.by_lhs[p[item.dot]] {
                for &lookahead in &lookaheads {
                    let new_item = Item {
                        prod: j,
                        dot: 1,
                        lookahead,
                    };
                    if c.insert(new_item.clone()) {
                        work.push(new_item);
                    }
                }
            }
        }
        c
    }

    /// Computes the LR(1) *goto* function for a given item set and grammar symbol.
    pub fn goto(&self, items: &ItemSet, sym: usize) -> ItemSet {
        let mut moved = ItemSet::new();
        for item in items {
            let p = &self.prods[item.prod];
            if item.dot < p.len() && p[item.dot] == sym {
                moved.insert(Item {
                    dot: item.dot + 1,
                    ..item.clone()
                });
            }
        }
        self.closure(&moved)
    }

    /// Breadth-first construction from `closure({[S' ::= . S, EOF]})`.
    ///
    /// Within a state, successor symbols are visited in symbol index order, so
    /// numbering is reproducible.
    fn construct_set(&mut self, max_states: usize) -> Result<(), GenError> {
        let start = self.closure(&ItemSet::from([Item {
            prod: 0,
            dot: 1,
            lookahead: self.eof(),
        }]));
        let mut index: HashMap<ItemSet, usize> = HashMap::new();
        index.insert(start.clone(), 0);
        self.states.push(start);

        let mut i = 0;
        while i < self.states.len() {
            let syms: BTreeSet<usize> = self.states[i]
                .iter()
                .filter_map(|item| self.prods[item.prod].get(item.dot).copied())
                .collect();
            let mut row = BTreeMap::new();
            for sym in syms {
                let next = self.goto(&self.states[i], sym);
                let id = match index.get(&next) {
                    Some(&id) => id,
                    None => {
                        let id = self.states.len();
                        if id >= max_states {
                            return Err(GenError::Capacity {
                                what: "LR(1)",
                                limit: max_states,
                            });
                        }
                        index.insert(next.clone(), id);
                        self.states.push(next);
                        id
                    }
                };
                row.insert(sym, id);
            }
            log::trace!("state {}: {} items, {} transitions", i, self.states[i].len(), row.len());
            self.transitions.push(row);
            i += 1;
        }
        Ok(())
    }

    /// Fills ACTION and GOTO; every conflicting cell is reported.
    pub fn tables(&self, bnf: &Bnf) -> Result<ParseTables, GenError> {
        let mut tables = ParseTables::default();
        let mut conflicts = Vec::new();

        for (state, items) in self.states.iter().enumerate() {
            let row = tables.actions.entry(state).or_default();
            for item in items {
                let p = &self.prods[item.prod];
                let (terminal, action) = if item.dot < p.len() {
                    let sym = p[item.dot];
                    if sym < self.n_nonterm {
                        continue;
                    }
                    let Some(&target) = self.transitions[state].get(&sym) else {
                        continue;
                    };
                    (sym, Action::Shift { target })
                } else if item.prod == 0 && item.lookahead == self.eof() {
                    (item.lookahead, Action::Accept)
                } else {
                    (item.lookahead, Action::Reduce { target: item.prod })
                };
                let name = &self.symbols[terminal];
                match row.get(name) {
                    None => {
                        row.insert(name.clone(), action);
                    }
                    Some(existing) if *existing == action => {}
                    Some(existing) => {
                        conflicts.push(self.conflict(bnf, state, name, *existing, action));
                    }
                }
            }
            if row.is_empty() {
                tables.actions.remove(&state);
            }

            for (&sym, &target) in &self.transitions[state] {
                if sym < self.n_nonterm {
                    tables
                        .gotos
                        .entry(state)
                        .or_default()
                        .insert(self.symbols[sym].clone(), target);
                }
            }
        }

        if conflicts.is_empty() {
            Ok(tables)
        } else {
            log::debug!("{} conflicts", conflicts.len());
            Err(GenError::Conflicts(conflicts))
        }
    }

    fn describe(&self, bnf: &Bnf, action: Action) -> String {
        match action {
            Action::Reduce { target } => match bnf.productions.get(target) {
                Some(prod) => format!("{}: {}", action, prod),
                None => action.to_string(),
            },
            _ => action.to_string(),
        }
    }

    fn conflict(
        &self,
        bnf: &Bnf,
        state: usize,
        lookahead: &str,
        existing: Action,
        new: Action,
    ) -> Conflict {
        let mut notes = Vec::new();
        for action in [existing, new] {
            let Action::Reduce { target } = action else {
                continue;
            };
            let Some(prod) = bnf.productions.get(target) else {
                continue;
            };
            if prod.rhs.iter().any(|s| s.name() == bnf.start) {
                notes.push(format!(
                    "production reduces to {} via {}; check for cycles involving the start symbol",
                    prod.lhs, bnf.start
                ));
            }
            if prod.rhs.iter().any(|s| s.name() == prod.lhs) {
                notes.push(format!(
                    "production {} is directly recursive; verify it appears only where intended",
                    prod
                ));
            }
        }
        if matches!(existing, Action::Shift { .. }) || matches!(new, Action::Shift { .. }) {
            notes.push(
                "shift/reduce conflicts often come from ambiguous operator precedence or unintended recursion"
                    .into(),
            );
        }
        Conflict {
            state,
            lookahead: lookahead.to_string(),
            existing: self.describe(bnf, existing),
            new: self.describe(bnf, new),
            items: self.states[state]
                .iter()
                .map(|item| self.format_item(item))
                .collect(),
            notes,
        }
    }

    /// Renders `item` as `[A ::= α . β, a]`.
    pub fn format_item(&self, item: &Item) -> String {
        let p = &self.prods[item.prod];
        let mut s = format!("[{} ::=", self.symbols[p[0]]);
        for (j, &sym) in p.iter().enumerate().skip(1) {
            if j == item.dot {
                s.push_str(" .");
            }
            s.push(' ');
            s.push_str(&self.symbols[sym]);
        }
        if item.dot == p.len() {
            s.push_str(" .");
        }
        s.push_str(", ");
        s.push_str(&self.symbols[item.lookahead]);
        s.push(']');
        s
    }

    /// Writes productions, FIRST sets, and item sets for debugging.
    pub fn write_debug<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write_prods(out, &self.prods, &self.symbols)?;
        writeln!(out)?;
        write_first(out, &self.first, &self.nullable, &self.symbols)?;
        writeln!(out)?;
        self.write_set(out)
    }

    /// Writes the canonical collection of item sets, with transitions.
    fn write_set<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "CS,{}\n", self.states.len())?;
        for (i, state) in self.states.iter().enumerate() {
            for item in state {
                writeln!(out, "C,{},{}", i, self.format_item(item))?;
            }
            for (&sym, &target) in &self.transitions[i] {
                writeln!(out, "T,{},{} => {}", i, self.symbols[sym], target)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// Writes the grammar productions to an output stream.
///
/// # Output Format
/// ```text
/// PS,<number of productions>
///
/// P,<index>,<LHS> -> <RHS symbols>
/// ```
pub fn write_prods<W: Write>(
    out: &mut W,
    prods: &[Vec<usize>],
    tokens: &[String],
) -> io::Result<()> {
    writeln!(out, "PS,{}\n", prods.len())?;
    for (i, prod) in prods.iter().enumerate() {
        write!(out, "P,{},", i)?;
        for (j, t) in prod.iter().enumerate() {
            write!(out, "{} ", tokens[*t])?;
            if j == 0 {
                write!(out, "-> ")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Writes FIRST sets, marking nullable symbols with `` `empty' ``.
pub fn write_first<W: Write>(
    out: &mut W,
    vs: &[BTreeSet<usize>],
    nullable: &[bool],
    tokens: &[String],
) -> io::Result<()> {
    for (sym, set) in vs.iter().enumerate() {
        let dname = format!("${}", sym);
        let name = tokens.get(sym).unwrap_or(&dname);

        write!(out, "FIRST,{},{{", name)?;

        if nullable[sym] {
            write!(out, "`empty', ")?;
        }

        for &t in set {
            let dname = format!("${}", t);
            let tname = tokens.get(t).unwrap_or(&dname);
            write!(out, "{}, ", tname)?;
        }

        writeln!(out, "}}")?;
    }

    Ok(())
}
