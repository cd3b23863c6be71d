use crate::{Action, Ast, AstNode, HintView, Lexer, ParseError, Token};
use std::str::FromStr;

/// A production as seen by the parser driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductionView<'a> {
    pub lhs: &'a str,
    pub rhs_count: usize,
    pub hint: Option<HintView<'a>>,
}

/// Read access to LR(1) ACTION/GOTO tables.
pub trait ParserData {
    fn start_state(&self) -> usize {
        0
    }

    fn action(&self, state: usize, terminal: &str) -> Option<Action>;

    fn goto(&self, state: usize, nonterminal: &str) -> Option<usize>;

    fn production(&self, index: usize) -> Option<ProductionView<'_>>;

    /// Terminals with an ACTION entry in `state`, sorted.
    fn expected(&self, state: usize) -> Vec<String>;
}

impl<T: ParserData + ?Sized> ParserData for &T {
    fn start_state(&self) -> usize {
        (**self).start_state()
    }

    fn action(&self, state: usize, terminal: &str) -> Option<Action> {
        (**self).action(state, terminal)
    }

    fn goto(&self, state: usize, nonterminal: &str) -> Option<usize> {
        (**self).goto(state, nonterminal)
    }

    fn production(&self, index: usize) -> Option<ProductionView<'_>> {
        (**self).production(index)
    }

    fn expected(&self, state: usize) -> Vec<String> {
        (**self).expected(state)
    }
}

/// Parser tables with `'static` storage, as emitted by the Rust backend.
///
/// Rows are indexed by state; cells within a row are sorted by symbol name.
#[derive(Debug, Clone, Copy)]
pub struct StaticParserData {
    pub actions: &'static [&'static [(&'static str, Action)]],
    pub gotos: &'static [&'static [(&'static str, usize)]],
    pub productions: &'static [ProductionView<'static>],
}

impl ParserData for StaticParserData {
    fn action(&self, state: usize, terminal: &str) -> Option<Action> {
        let row = self.actions.get(state)?;
        let i = row.binary_search_by(|(t, _)| (*t).cmp(terminal)).ok()?;
        Some(row[i].1)
    }

    fn goto(&self, state: usize, nonterminal: &str) -> Option<usize> {
        let row = self.gotos.get(state)?;
        let i = row.binary_search_by(|(n, _)| (*n).cmp(nonterminal)).ok()?;
        Some(row[i].1)
    }

    fn production(&self, index: usize) -> Option<ProductionView<'_>> {
        self.productions.get(index).copied()
    }

    fn expected(&self, state: usize) -> Vec<String> {
        self.actions
            .get(state)
            .map(|row| row.iter().map(|(t, _)| t.to_string()).collect())
            .unwrap_or_default()
    }
}

/// How reduces build AST nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AstMode {
    /// Apply hints; unhinted productions build an lhs node over all RHS nodes.
    #[default]
    Hinted,
    /// As `Hinted`, but an unhinted single-symbol production passes its child through.
    Condensed,
    /// Ignore hints entirely.
    Full,
}

impl FromStr for AstMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hinted" => Ok(AstMode::Hinted),
            "condensed" => Ok(AstMode::Condensed),
            "full" => Ok(AstMode::Full),
            other => Err(format!(
                "unknown AST mode {:?} (expected hinted, condensed or full)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParserStats {
    pub tokens: usize,
    pub shifts: usize,
    pub reductions: usize,
}

/// Table-driven shift/reduce parser.
pub struct Parser<L, D> {
    lexer: L,
    data: D,
    mode: AstMode,
    states: Vec<usize>,
    nodes: Vec<AstNode>,
    stats: ParserStats,
}

impl<L: Lexer, D: ParserData> Parser<L, D> {
    pub fn new(lexer: L, data: D) -> Self {
        Self {
            lexer,
            data,
            mode: AstMode::default(),
            states: Vec::new(),
            nodes: Vec::new(),
            stats: ParserStats::default(),
        }
    }

    pub fn with_mode(mut self, mode: AstMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn stats(&self) -> ParserStats {
        self.stats.clone()
    }

    pub fn lexer(&self) -> &L {
        &self.lexer
    }

    /// Parses the whole input into an [`Ast`].
    pub fn parse(&mut self) -> Result<Ast, ParseError> {
        self.states.clear();
        self.nodes.clear();
        self.states.push(self.data.start_state());
        let mut token = self.next_token()?;
        if log::log_enabled!(log::Level::Trace) {
            self.dump_state(&token);
        }
        loop {
            let state = self.top();
            match self.data.action(state, &token.token_type) {
                Some(Action::Shift { target }) => {
                    log::trace!("Shift {}", target);
                    self.nodes.push(AstNode::leaf(token));
                    self.states.push(target);
                    self.stats.shifts += 1;
                    token = self.next_token()?;
                }
                Some(Action::Reduce { target }) => {
                    log::trace!("Reduce {}", target);
                    self.reduce(target)?;
                    self.stats.reductions += 1;
                }
                Some(Action::Accept) => {
                    log::trace!("Accept");
                    if self.nodes.len() != 1 {
                        return Err(ParseError::BadAccept(self.nodes.len()));
                    }
                    let root = self.nodes.pop().ok_or(ParseError::BadAccept(0))?;
                    self.states.clear();
                    return Ok(Ast::new(root));
                }
                None => {
                    return Err(ParseError::Unexpected {
                        token_type: token.token_type.to_string(),
                        lexeme: token.lexeme.to_string(),
                        location: token.location,
                        expected: self.data.expected(state),
                    });
                }
            }
            if log::log_enabled!(log::Level::Trace) {
                self.dump_state(&token);
            }
        }
    }

    fn top(&self) -> usize {
        self.states.last().copied().unwrap_or_default()
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        let token = self.lexer.scan();
        self.stats.tokens += 1;
        if token.is_error() {
            return Err(ParseError::Lex {
                rune: token.lexeme.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER),
                location: token.location,
            });
        }
        Ok(token)
    }

    fn reduce(&mut self, index: usize) -> Result<(), ParseError> {
        let prod = self
            .data
            .production(index)
            .ok_or(ParseError::UnknownProduction(index))?;
        let n = prod.rhs_count;
        if self.nodes.len() < n || self.states.len() <= n {
            return Err(ParseError::StackUnderflow(index));
        }
        let rhs = self.nodes.split_off(self.nodes.len() - n);
        self.states.truncate(self.states.len() - n);

        let hint = match self.mode {
            AstMode::Full => None,
            AstMode::Hinted | AstMode::Condensed => prod.hint,
        };
        let node = match hint {
            Some(hint) => hint.apply(prod.lhs, index, rhs)?,
            None if self.mode == AstMode::Condensed && n == 1 => {
                rhs.into_iter().next().ok_or(ParseError::StackUnderflow(index))?
            }
            None => AstNode::branch(prod.lhs, rhs),
        };
        self.nodes.push(node);

        let state = self.top();
        let next = self
            .data
            .goto(state, prod.lhs)
            .ok_or_else(|| ParseError::MissingGoto {
                state,
                nonterminal: prod.lhs.to_string(),
            })?;
        self.states.push(next);
        Ok(())
    }

    fn dump_state(&self, incoming: &Token) {
        let mut output = String::new();
        for (i, state) in self.states.iter().enumerate() {
            output.push_str(&format!("<{}> ", state));
            if let Some(node) = self.nodes.get(i) {
                output.push_str(&format!("{} ", node.label()));
            }
        }
        log::trace!("{} <- {}", output, incoming);
    }
}
