//! Unit algebra for the Numerobis runtime.
//!
//! A tree representation of unit expressions (C1), a normal-form simplifier
//! (C2), a three-mode numeric evaluator plus logarithmicity predicate (C3),
//! and a fraction-form pretty-printer (C4). No dependency on the boxed
//! numeric value or the value-dispatch shim — those live in
//! `numerobis-runtime` and build on top of this crate.

pub mod eval;
pub mod print;
pub mod simplify;
pub mod tree;

pub use eval::{eval as eval_unit, is_unit_log, reduce_to_scalar, EvalMode, UnitTables};
pub use print::{format_scalar, format_unit};
pub use simplify::simplify;
pub use tree::{expression, ident, neg, one, power, product, product_of, scalar, sum, sum_of, Unit, UnitNode};
