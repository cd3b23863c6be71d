use crate::token::is_ignored_type;
use crate::{Location, RangeTransition, Token};
use smartstring::alias::String;

/// Read access to lexer DFA tables.
///
/// Implemented by the owned [`LexerTables`](crate::LexerTables) and by
/// [`StaticLexerData`] for tables emitted as Rust constants.
pub trait LexerData {
    fn start_state(&self) -> usize;

    /// Transitions out of `state`, sorted by `from` and disjoint.
    fn transitions(&self, state: usize) -> &[RangeTransition];

    /// Token type accepted in `state`, if any.
    fn accept(&self, state: usize) -> Option<&str>;

    #[inline]
    fn next_state(&self, state: usize, rune: char) -> Option<usize> {
        let c = rune as u32;
        let ranges = self.transitions(state);
        let i = ranges.partition_point(|r| r.to < c);
        ranges.get(i).filter(|r| r.contains(c)).map(|r| r.next)
    }
}

impl<T: LexerData + ?Sized> LexerData for &T {
    fn start_state(&self) -> usize {
        (**self).start_state()
    }

    fn transitions(&self, state: usize) -> &[RangeTransition] {
        (**self).transitions(state)
    }

    fn accept(&self, state: usize) -> Option<&str> {
        (**self).accept(state)
    }
}

/// Lexer tables with `'static` storage, as emitted by the Rust backend.
#[derive(Debug, Clone, Copy)]
pub struct StaticLexerData {
    pub start_state: usize,
    pub transitions: &'static [&'static [RangeTransition]],
    pub accepts: &'static [Option<&'static str>],
}

impl LexerData for StaticLexerData {
    fn start_state(&self) -> usize {
        self.start_state
    }

    fn transitions(&self, state: usize) -> &[RangeTransition] {
        self.transitions.get(state).copied().unwrap_or(&[])
    }

    fn accept(&self, state: usize) -> Option<&str> {
        self.accepts.get(state).copied().flatten()
    }
}

/// A token source for the parser driver.
pub trait Lexer {
    /// Returns the next non-ignored token, an `EOF` token at end of input,
    /// or an `ERROR` token if no rule matches at the current position.
    fn scan(&mut self) -> Token;

    fn stats(&self) -> LexerStats;
}

#[derive(Debug, Clone, Default)]
pub struct LexerStats {
    pub chars: usize,
    pub tokens: usize,
    pub ignored: usize,
    pub errors: usize,
}

/// Longest-match lexer driven by range-transition tables.
pub struct TableLexer<D> {
    data: D,
    input: Vec<char>,
    pos: usize,
    location: Location,
    stats: LexerStats,
}

impl<D: LexerData> TableLexer<D> {
    pub fn new(data: D, input: &str) -> Self {
        Self {
            data,
            input: input.chars().collect(),
            pos: 0,
            location: Location::default(),
            stats: LexerStats::default(),
        }
    }

    /// Location of the next unconsumed code point.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Scans up to and including the first `EOF` or `ERROR` token.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut out = Vec::new();
        loop {
            let token = self.scan();
            let done = token.is_eof() || token.is_error();
            out.push(token);
            if done {
                return out;
            }
        }
    }

    /// Follows transitions from the current position as far as possible and
    /// returns the end of the last accepting prefix with its token type.
    fn longest_match(&self) -> Option<(usize, Location, String)> {
        let mut state = self.data.start_state();
        let mut pos = self.pos;
        let mut location = self.location;
        let mut last = None;
        while let Some(&c) = self.input.get(pos) {
            let Some(next) = self.data.next_state(state, c) else {
                break;
            };
            state = next;
            pos += 1;
            location.advance(c);
            if let Some(token_type) = self.data.accept(state) {
                last = Some((pos, location, token_type.into()));
            }
        }
        last
    }
}

impl<D: LexerData> Lexer for TableLexer<D> {
    fn scan(&mut self) -> Token {
        loop {
            let Some(&rune) = self.input.get(self.pos) else {
                log::trace!("EOF at {}", self.location);
                return Token::eof(self.location);
            };
            let Some((end, location, token_type)) = self.longest_match() else {
                log::trace!("NO MATCH: {:?} at {}", rune, self.location);
                self.stats.errors += 1;
                return Token::error(rune, self.location);
            };
            let lexeme: String = self.input[self.pos..end].iter().copied().collect();
            let start = self.location;
            self.stats.chars += end - self.pos;
            self.pos = end;
            self.location = location;
            log::trace!("MATCH: {} {:?} at {}", token_type, lexeme.as_str(), start);
            if is_ignored_type(&token_type) {
                self.stats.ignored += 1;
                continue;
            }
            self.stats.tokens += 1;
            return Token {
                token_type,
                lexeme,
                location: start,
            };
        }
    }

    fn stats(&self) -> LexerStats {
        self.stats.clone()
    }
}
