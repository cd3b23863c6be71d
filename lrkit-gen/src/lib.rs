//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).
//!
//! Lexer and canonical LR(1) parser generator.
//!
//! `lrkit-gen` compiles one EBNF grammar holding both lexer and parser rules
//! into a [`Tables`](lrkit::Tables) document:
//!  * **classify** splits rules into tokens, ignored tokens, fragments and
//!    parser rules by name prefix;
//!  * **lexgen** lowers token rules to regular expressions and builds a
//!    range-indexed DFA through a Thompson NFA;
//!  * **normalize** expands EBNF parser rules into BNF productions;
//!  * **lr1** builds the canonical LR(1) automaton and its ACTION/GOTO tables;
//!  * **emit** renders the tables as Rust constants for the `lrkit` runtime.
//!
//! # Example
//!
//! ```rust
//! use lrkit::AstMode;
//! use lrkit_gen::{GenOptions, generate_tables_from_str};
//!
//! let grammar = r#"
//!     Root ::= int '+' Root -> { "parent": 1, "children": [0, 2] }
//!            | int -> { "passthrough": 0 }
//!     int ::= '0'-'9' { '0'-'9' }
//! "#;
//! let tables = generate_tables_from_str(grammar, &GenOptions::default()).unwrap();
//! let ast = tables.parse_str("1+2+3", AstMode::Hinted).unwrap();
//! assert_eq!(ast.compact(), "+(1, +(2, 3))");
//! ```
//!
//! From a `build.rs`, [`generate`] writes `<name>.json` and `<name>.rs`
//! into `OUT_DIR`.

pub mod classify;
pub mod emit;
pub mod error;
pub mod generate;
pub mod grammar;
pub mod hints;
pub mod lexgen;
pub mod literal;
pub mod lr1;
pub mod normalize;
pub mod symtab;

pub use emit::emit_rust;
pub use error::{Conflict, GenError};
pub use generate::{GenOptions, generate, generate_tables, generate_tables_from_str};
