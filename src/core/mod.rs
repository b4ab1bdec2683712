//! Core types for symbolic mathematics
//!
//! This module contains the fundamental types:
//! - `Expr` - the immutable expression tree and its canonical constructors
//! - `Symbol` - interned named symbols and anonymous symbols
//! - `UniPoly` - univariate polynomials used for fraction cancellation
//! - Error types
//! - Display formatting (`to_string`, `to_latex`)

mod display;
pub(crate) mod error;
pub(crate) mod expr;
mod ops;
pub(crate) mod ordering;
pub(crate) mod poly;
pub(crate) mod symbol;
pub(crate) mod traverse;

pub use error::{DiffError, EvaluationError, Expected, ParseError, Span};
pub use expr::{Expr, Func};
pub use symbol::Symbol;
