use std::fmt;

use tarn_ast::expr::BaseType;

/// One side of a constraint pair: a base type tag, a fresh type variable
/// minted by [`crate::ctrgen::CtrGen`], or a program identifier standing in
/// for "the type of this variable".
///
/// `Named` is what lets `Var x` emit the literal constraint `{(x, T)}` --
/// the identifier is a first-class member of the constraint set, not a
/// variable that merely refers to one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeHandle {
    Base(BaseType),
    Var(TyVarId),
    Named(String),
}

impl TypeHandle {
    pub fn int() -> Self {
        TypeHandle::Base(BaseType::Int)
    }

    pub fn bool() -> Self {
        TypeHandle::Base(BaseType::Bool)
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeHandle::Base(BaseType::Int) => write!(f, "int"),
            TypeHandle::Base(BaseType::Bool) => write!(f, "bool"),
            TypeHandle::Var(v) => write!(f, "TV_{}", v.0),
            TypeHandle::Named(name) => write!(f, "{name}"),
        }
    }
}

/// A fresh type variable's index, as minted by [`crate::ctrgen::CtrGen`].
/// Displayed as `TV_n`, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TyVarId(pub u32);

/// An equality constraint between two type handles, emitted by `CtrGen` and
/// consumed by [`crate::unify::Unifier`].
pub type Constraint = (TypeHandle, TypeHandle);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(TypeHandle::int().to_string(), "int");
        assert_eq!(TypeHandle::bool().to_string(), "bool");
        assert_eq!(TypeHandle::Var(TyVarId(3)).to_string(), "TV_3");
        assert_eq!(TypeHandle::Named("x".into()).to_string(), "x");
    }
}
