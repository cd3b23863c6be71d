//! Errors reported by the table-driven lexer and parser.
//!
//! Every failure of [`Parser::parse`](crate::Parser::parse) is fatal; there is
//! no error recovery. A [`ParseError`] carries enough to point the user at the
//! offending input.

use crate::Location;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The lexer could not match any token rule at `location`.
    #[error("lexer error: unrecognized input {rune:?} at {location}")]
    Lex { rune: char, location: Location },

    /// No ACTION entry exists for the lookahead in the current state.
    #[error(
        "parse error: unexpected {token_type} ({lexeme:?}) at {location}; expected one of: {}",
        .expected.join(", ")
    )]
    Unexpected {
        token_type: String,
        lexeme: String,
        location: Location,
        /// Terminals with an ACTION entry in the current state, sorted.
        expected: Vec<String>,
    },

    /// A reduce landed in a state with no GOTO for the production's lhs.
    #[error("missing goto from state {state} on {nonterminal}")]
    MissingGoto { state: usize, nonterminal: String },

    /// A reduce referenced a production that does not exist.
    #[error("unknown production {0}")]
    UnknownProduction(usize),

    /// The stacks did not hold enough entries for a reduce.
    #[error("stack underflow reducing production {0}")]
    StackUnderflow(usize),

    /// The accept action was reached with other than one node on the stack.
    #[error("accept with {0} nodes on the stack")]
    BadAccept(usize),

    /// A hint referenced a slot that is out of range or already consumed.
    #[error("production {production}: hint slot {index} is out of range or already used")]
    BadHint { production: usize, index: usize },
}
