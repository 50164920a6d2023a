//! Lowers a (renamed) `Expr` to three-address instructions over an
//! infinite virtual register file.

pub mod gen;
pub mod instr;

pub use gen::GenVisitor;
pub use instr::{Instr, InstrSink};
