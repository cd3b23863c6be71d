//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).
//!
//! Runtime for table-driven LR(1) parsers.
//!
//! `lrkit` executes the tables produced by `lrkit-gen`:
//!  * [`TableLexer`] performs longest-match tokenization over range-indexed
//!    DFA tables and skips ignored (`!`-prefixed) token types;
//!  * [`Parser`] runs the shift/reduce loop over ACTION/GOTO tables and builds
//!    an [`Ast`], applying per-production [`Hint`]s.
//!
//! Tables come either from the JSON IR ([`Tables`]) or from Rust constants
//! emitted at build time ([`StaticLexerData`], [`StaticParserData`]).
//!
//! # Example
//!
//! ```rust
//! use lrkit::{AstMode, Tables};
//!
//! # fn demo(json: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let tables = Tables::from_json(json)?;
//! let ast = tables.parse_str("1+2*3", AstMode::Hinted)?;
//! println!("{}", ast.compact());
//! # Ok(()) }
//! ```

mod ast;
mod error;
mod hint;
mod lexer;
mod parser;
mod tables;
mod token;

pub use crate::ast::{Ast, AstNode};
pub use crate::error::ParseError;
pub use crate::hint::{Hint, HintView, Parent, ParentView};
pub use crate::lexer::{Lexer, LexerData, LexerStats, StaticLexerData, TableLexer};
pub use crate::parser::{
    AstMode, Parser, ParserData, ParserStats, ProductionView, StaticParserData,
};
pub use crate::tables::{Action, LexerTables, Production, RangeTransition, Tables};
pub use crate::token::{EOF, ERROR, Location, Token, is_ignored_type};
