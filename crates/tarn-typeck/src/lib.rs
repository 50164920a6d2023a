//! Constraint generation and unification for the tarn expression language.
//!
//! `ctrgen` walks an `Expr` and produces a flat set of type-equality
//! constraints; `unify` closes that set into an equivalence partition via
//! online union-find. Neither stage can fail --
//! contradiction detection (two base tags in one class) is an optional
//! query on the result, not a condition the solver itself rejects.

pub mod ctrgen;
pub mod handle;
pub mod unify;

pub use ctrgen::CtrGen;
pub use handle::{Constraint, TyVarId, TypeHandle};
pub use unify::Unifier;
