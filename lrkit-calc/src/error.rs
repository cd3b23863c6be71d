//! # Calculator Error Type
//!
//! [`CalcError`] covers the whole pipeline: lexing and parsing through the
//! generated tables, integer literal conversion, variable lookup, and
//! arithmetic faults. Conversions from the underlying error types are derived
//! with `#[from]`, so `?` works at every call site.
use crate::SymTabError;
use lrkit::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalcError {
    /// The input is not a valid program.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// An integer literal does not fit in an `i64`.
    #[error("unable to parse {0:?}")]
    ParseInt(#[from] std::num::ParseIntError),

    /// A symbol-table operation failed.
    #[error("symtab error: {0}")]
    SymTab(#[from] SymTabError),

    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow in {0}")]
    Overflow(String),

    #[error("negative exponent {0}")]
    NegativeExponent(i64),

    /// The AST contains a node the evaluator does not know.
    #[error("unexpected node {0:?}")]
    UnexpectedNode(String),
}
