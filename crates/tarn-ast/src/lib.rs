//! The AST, value domain, and the tree-walking passes that don't belong to
//! a pipeline stage of their own: free-variable analysis and alpha-renaming.
//!
//! Evaluation lives in `tarn-eval`, constraint generation and unification in
//! `tarn-typeck`, and code generation in `tarn-codegen` -- each of those
//! depends on this crate for `Expr`.

pub mod env;
pub mod expr;
pub mod rename;
pub mod usedef;
pub mod value;

pub use env::Env;
pub use expr::{BaseType, Expr, ExprKind, TypeAnnotation};
pub use rename::RenameVisitor;
pub use value::{Closure, Value};
