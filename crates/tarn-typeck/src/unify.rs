//! Online union-find over type handles.
//!
//! Built on `ena::unify::InPlaceUnificationTable` the way
//! `mesh_typeck::unify::InferCtx` wraps it, but stripped down to a plain
//! equivalence relation over constraint pairs, not a substitution-based
//! unifier. There is no `occurs` check, no value payload carried on each
//! key, and no generalization -- `solve` can never fail. Two distinct
//! base-type tags are allowed to land in the same equivalence class;
//! flagging that as a contradiction is a separate, optional query
//! (`contradictions`), left to whichever caller wants it.

use ena::unify::{InPlaceUnificationTable, UnifyKey};
use rustc_hash::{FxHashMap, FxHashSet};

use tarn_ast::expr::BaseType;

use crate::handle::{Constraint, TyVarId, TypeHandle};

impl UnifyKey for TyVarId {
    type Value = ();

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TyVarId(u)
    }

    fn tag() -> &'static str {
        "TyVarId"
    }
}

pub struct Unifier {
    table: InPlaceUnificationTable<TyVarId>,
    interner: FxHashMap<TypeHandle, TyVarId>,
}

impl Default for Unifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Unifier {
    pub fn new() -> Self {
        Self {
            table: InPlaceUnificationTable::new(),
            interner: FxHashMap::default(),
        }
    }

    fn key_for(&mut self, handle: &TypeHandle) -> TyVarId {
        if let Some(key) = self.interner.get(handle) {
            return *key;
        }
        let key = self.table.new_key(());
        self.interner.insert(handle.clone(), key);
        key
    }

    /// Union the equivalence classes of `a` and `b`. A no-op when `a == b`,
    /// but both sides are still registered so they appear in `classes()`.
    pub fn unify(&mut self, a: &TypeHandle, b: &TypeHandle) {
        let ka = self.key_for(a);
        let kb = self.key_for(b);
        if ka != kb {
            self.table.union(ka, kb);
        }
    }

    /// Process a full constraint set in order.
    pub fn solve(&mut self, constraints: &[Constraint]) {
        for (a, b) in constraints {
            self.unify(a, b);
        }
    }

    /// `setsMap`: for every handle that appeared in a processed constraint,
    /// the set of handles (including itself) in its equivalence class.
    pub fn classes(&mut self) -> FxHashMap<TypeHandle, FxHashSet<TypeHandle>> {
        let handles: Vec<TypeHandle> = self.interner.keys().cloned().collect();
        let mut by_root: FxHashMap<TyVarId, FxHashSet<TypeHandle>> = FxHashMap::default();
        for handle in &handles {
            let key = self.interner[handle];
            let root = self.table.find(key);
            by_root.entry(root).or_default().insert(handle.clone());
        }
        let mut result = FxHashMap::default();
        for handle in handles {
            let key = self.interner[&handle];
            let root = self.table.find(key);
            result.insert(handle, by_root[&root].clone());
        }
        result
    }

    /// Equivalence classes containing two distinct base-type tags -- a
    /// type error in any caller that asks, but not one this crate raises
    /// on its own.
    pub fn contradictions(&mut self) -> Vec<(BaseType, BaseType)> {
        let handles: Vec<TypeHandle> = self.interner.keys().cloned().collect();
        let mut bases_by_root: FxHashMap<TyVarId, FxHashSet<BaseType>> = FxHashMap::default();
        for handle in &handles {
            if let TypeHandle::Base(base) = handle {
                let key = self.interner[handle];
                let root = self.table.find(key);
                bases_by_root.entry(root).or_default().insert(*base);
            }
        }
        bases_by_root
            .values()
            .filter(|bases| bases.contains(&BaseType::Int) && bases.contains(&BaseType::Bool))
            .map(|_| (BaseType::Int, BaseType::Bool))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unified_pair_lands_in_the_same_class() {
        let mut u = Unifier::new();
        let a = TypeHandle::Named("a".into());
        let b = TypeHandle::Named("b".into());
        u.unify(&a, &b);
        let classes = u.classes();
        assert!(classes[&a].contains(&b));
        assert!(classes[&b].contains(&a));
    }

    #[test]
    fn unrelated_handles_stay_in_separate_classes() {
        let mut u = Unifier::new();
        let a = TypeHandle::Named("a".into());
        let b = TypeHandle::Named("b".into());
        let c = TypeHandle::Named("c".into());
        u.unify(&a, &b);
        u.key_for(&c); // register without unifying
        let classes = u.classes();
        assert!(!classes[&c].contains(&a));
        assert_eq!(classes[&c].len(), 1);
    }

    #[test]
    fn transitive_unification_merges_three_handles() {
        let mut u = Unifier::new();
        let a = TypeHandle::Named("a".into());
        let b = TypeHandle::Named("b".into());
        let c = TypeHandle::Named("c".into());
        u.unify(&a, &b);
        u.unify(&b, &c);
        let classes = u.classes();
        assert_eq!(classes[&a].len(), 3);
        assert!(classes[&a].contains(&c));
    }

    #[test]
    fn self_constraint_is_a_no_op_but_still_registers() {
        let mut u = Unifier::new();
        let a = TypeHandle::Named("a".into());
        u.unify(&a, &a);
        let classes = u.classes();
        assert_eq!(classes[&a].len(), 1);
    }

    #[test]
    fn contradiction_detects_two_base_tags_in_one_class() {
        let mut u = Unifier::new();
        let x = TypeHandle::Named("x".into());
        u.unify(&x, &TypeHandle::int());
        u.unify(&x, &TypeHandle::bool());
        assert_eq!(u.contradictions(), vec![(BaseType::Int, BaseType::Bool)]);
    }

    #[test]
    fn no_contradiction_when_classes_are_consistent() {
        let mut u = Unifier::new();
        let x = TypeHandle::Named("x".into());
        u.unify(&x, &TypeHandle::int());
        assert!(u.contradictions().is_empty());
    }
}
