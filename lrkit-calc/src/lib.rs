//! # lrkit-calc
//!
//! A small demonstration crate built on **lrkit**: an integer calculator whose
//! lexer and parser tables are generated from `src/pemdas.ebnf` at build time
//! by `lrkit-gen` and included as Rust constants.
//!
//! ## Overview
//!
//! - [`calc`] evaluates the AST produced by the generated parser. Grammar
//!   hints shape the tree so that each operator node carries its operator
//!   token and its two operands.
//! - [`symtab`] holds variable bindings between statements and calls.
//! - [`error`] defines [`CalcError`].
//!
//! ## Example
//!
//! ```rust
//! use lrkit_calc::Calc;
//!
//! let mut calc = Calc::new();
//! assert_eq!(calc.eval_str("1 + 2 * 3").unwrap(), 7);
//! assert_eq!(calc.eval_str("(1 + 2) * 3").unwrap(), 9);
//! assert_eq!(calc.eval_str("2 ** 3 ** 2").unwrap(), 512);
//! ```
pub mod calc;
pub mod error;
pub mod symtab;

pub use calc::{Calc, pemdas};
pub use error::CalcError;
pub use symtab::{SymTab, SymTabError};
