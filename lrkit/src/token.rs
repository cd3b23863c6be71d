//! Tokens and source locations.
//!
//! A [`Token`] is what the lexer hands to the parser: a type tag, the matched
//! lexeme, and the [`Location`] of its first code point. Two type tags are
//! reserved: [`EOF`] marks the end of input and [`ERROR`] marks input the lexer
//! could not match.
//!
//! # Examples
//!
//! ```rust
//! # use lrkit::{Location, Token};
//! let mut loc = Location::default();
//! loc.advance('a');
//! loc.advance('\n');
//! assert_eq!((loc.line, loc.column, loc.offset), (2, 1, 2));
//!
//! let tok = Token::new("int", "42", Location::new(1, 3, 2));
//! assert!(!tok.is_eof() && !tok.is_error());
//! assert_eq!(tok.to_string(), "int(\"42\") at line 1, column 3");
//! ```

use smartstring::alias::String;
use std::fmt;

/// Token type of the end-of-input sentinel.
pub const EOF: &str = "EOF";

/// Token type of the lexer error sentinel.
pub const ERROR: &str = "ERROR";

/// Returns `true` if tokens of this type are skipped by the lexer.
#[inline]
pub fn is_ignored_type(token_type: &str) -> bool {
    token_type.starts_with('!')
}

/// A position in source text.
///
/// `line` and `column` are 1-based and count code points; `offset` is the
/// 0-based byte offset into the UTF-8 input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number, in code points.
    pub column: usize,
    /// 0-based byte offset.
    pub offset: usize,
}

impl Location {
    /// Creates a new `Location`.
    #[inline]
    pub const fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Moves the location past `c`.
    #[inline]
    pub fn advance(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.offset += c.len_utf8();
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new(1, 1, 0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token type tag; the name of the lexer rule or literal that matched.
    pub token_type: String,
    /// The matched text.
    pub lexeme: String,
    /// Location of the first code point of `lexeme`.
    pub location: Location,
}

impl Token {
    pub fn new(token_type: &str, lexeme: &str, location: Location) -> Self {
        Self {
            token_type: token_type.into(),
            lexeme: lexeme.into(),
            location,
        }
    }

    /// End-of-input token at `location`.
    pub fn eof(location: Location) -> Self {
        Self::new(EOF, "", location)
    }

    /// Error token carrying the rune that could not be matched.
    pub fn error(rune: char, location: Location) -> Self {
        let mut lexeme = String::new();
        lexeme.push(rune);
        Self {
            token_type: ERROR.into(),
            lexeme,
            location,
        }
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.token_type == EOF
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.token_type == ERROR
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({:?}) at {}",
            self.token_type, self.lexeme, self.location
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_counts_code_points_and_bytes() {
        let mut loc = Location::default();
        for c in "aé\n€x".chars() {
            loc.advance(c);
        }
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 3);
        assert_eq!(loc.offset, 1 + 2 + 1 + 3 + 1);
    }

    #[test]
    fn sentinels() {
        let eof = Token::eof(Location::new(4, 2, 17));
        assert!(eof.is_eof());
        assert_eq!(eof.lexeme, "");
        let err = Token::error('@', Location::default());
        assert!(err.is_error());
        assert_eq!(err.lexeme, "@");
    }

    #[test]
    fn ignored_types() {
        assert!(is_ignored_type("!whitespace"));
        assert!(!is_ignored_type("int"));
        assert!(!is_ignored_type(EOF));
    }
}
