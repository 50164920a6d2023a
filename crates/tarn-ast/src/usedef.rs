//! Free-variable analysis.
//!
//! A pure function over the tree: no mutable state, no errors. `Let` and
//! `Fn` add their bound name before visiting their body; every other node
//! just unions its children's results.

use rustc_hash::FxHashSet;

use crate::expr::{Expr, ExprKind};

/// Identifiers referenced by `Var` nodes in `expr` that are not bound by any
/// enclosing `Let`/`Fn` within `expr` itself, nor already present in `bound`.
pub fn use_def(expr: &Expr, bound: &FxHashSet<String>) -> FxHashSet<String> {
    match &expr.kind {
        ExprKind::Num(_) | ExprKind::Bln(_) => FxHashSet::default(),
        ExprKind::Var(name) => {
            if bound.contains(name) {
                FxHashSet::default()
            } else {
                let mut set = FxHashSet::default();
                set.insert(name.clone());
                set
            }
        }
        ExprKind::Neg(e) | ExprKind::Not(e) => use_def(e, bound),
        ExprKind::Add(l, r)
        | ExprKind::Sub(l, r)
        | ExprKind::Mul(l, r)
        | ExprKind::Div(l, r)
        | ExprKind::Mod(l, r)
        | ExprKind::Eql(l, r)
        | ExprKind::Lth(l, r)
        | ExprKind::Leq(l, r)
        | ExprKind::And(l, r)
        | ExprKind::Or(l, r) => union(use_def(l, bound), use_def(r, bound)),
        ExprKind::IfThenElse {
            cond,
            then_branch,
            else_branch,
        } => union(
            union(use_def(cond, bound), use_def(then_branch, bound)),
            use_def(else_branch, bound),
        ),
        ExprKind::Let {
            identifier,
            def,
            body,
            ..
        } => {
            let def_free = use_def(def, bound);
            let mut body_bound = bound.clone();
            body_bound.insert(identifier.clone());
            union(def_free, use_def(body, &body_bound))
        }
        ExprKind::Fn { formal, body, .. } => {
            let mut body_bound = bound.clone();
            body_bound.insert(formal.clone());
            use_def(body, &body_bound)
        }
        ExprKind::App { function, argument } => {
            union(use_def(function, bound), use_def(argument, bound))
        }
    }
}

fn union(mut a: FxHashSet<String>, b: FxHashSet<String>) -> FxHashSet<String> {
    a.extend(b);
    a
}
