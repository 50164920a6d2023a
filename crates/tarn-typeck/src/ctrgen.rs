//! Constraint generation.
//!
//! `CtrGen::generate` walks an `Expr` the same way `tarn_ast::usedef::use_def`
//! does -- one arm per variant, no shared state beyond the fresh-variable
//! counter -- and returns a flat set of type-equality constraints. `Fn`/
//! `App` generate constraints for their sub-expressions only: the type
//! domain has no arrow/function handle, so there is nothing to tie a
//! closure's own type to its formal or body. See DESIGN.md for the
//! rationale.

use tarn_ast::expr::{BaseType, Expr, ExprKind, TypeAnnotation};

use crate::handle::{Constraint, TyVarId, TypeHandle};

#[derive(Default)]
pub struct CtrGen {
    next: u32,
}

impl CtrGen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh type variable, `TV_1, TV_2, ...`.
    pub fn fresh(&mut self) -> TypeHandle {
        self.next += 1;
        TypeHandle::Var(TyVarId(self.next))
    }

    /// Generate the constraint set for `expr` against the expected type
    /// handle `expected`, appending into `out`.
    pub fn generate(&mut self, expr: &Expr, expected: TypeHandle, out: &mut Vec<Constraint>) {
        match &expr.kind {
            ExprKind::Num(_) => out.push((TypeHandle::int(), expected)),
            ExprKind::Bln(_) => out.push((TypeHandle::bool(), expected)),
            ExprKind::Var(name) => out.push((TypeHandle::Named(name.clone()), expected)),

            ExprKind::Neg(e) => {
                self.generate(e, TypeHandle::int(), out);
                out.push((TypeHandle::int(), expected));
            }
            ExprKind::Not(e) => {
                self.generate(e, TypeHandle::bool(), out);
                out.push((TypeHandle::bool(), expected));
            }

            ExprKind::Add(l, r)
            | ExprKind::Sub(l, r)
            | ExprKind::Mul(l, r)
            | ExprKind::Div(l, r)
            | ExprKind::Mod(l, r) => {
                self.generate(l, TypeHandle::int(), out);
                self.generate(r, TypeHandle::int(), out);
                out.push((TypeHandle::int(), expected));
            }

            ExprKind::Lth(l, r) | ExprKind::Leq(l, r) => {
                self.generate(l, TypeHandle::int(), out);
                self.generate(r, TypeHandle::int(), out);
                out.push((TypeHandle::bool(), expected));
            }

            ExprKind::Eql(l, r) => {
                let f = self.fresh();
                self.generate(l, f.clone(), out);
                self.generate(r, f, out);
                out.push((TypeHandle::bool(), expected));
            }

            ExprKind::And(l, r) | ExprKind::Or(l, r) => {
                self.generate(l, TypeHandle::bool(), out);
                self.generate(r, TypeHandle::bool(), out);
                out.push((TypeHandle::bool(), expected));
            }

            ExprKind::IfThenElse {
                cond,
                then_branch,
                else_branch,
            } => {
                let f = self.fresh();
                self.generate(cond, TypeHandle::bool(), out);
                self.generate(then_branch, f.clone(), out);
                self.generate(else_branch, f.clone(), out);
                out.push((expected, f));
            }

            ExprKind::Let {
                identifier,
                type_annotation,
                def,
                body,
            } => {
                let f = self.fresh();
                self.generate(def, TypeHandle::Named(identifier.clone()), out);
                self.generate(body, f.clone(), out);
                out.push((expected, f));
                if let Some(c) = annotation_constraint(identifier, type_annotation.as_ref()) {
                    out.push(c);
                }
            }

            // No arrow/function type handle exists, so a closure's own type
            // is left unconstrained. Sub-expressions still get typed, so
            // free variables inside a body are covered.
            ExprKind::Fn {
                formal,
                param_type,
                body,
            } => {
                let f = self.fresh();
                self.generate(body, f, out);
                if let Some(c) = annotation_constraint(formal, param_type.as_ref()) {
                    out.push(c);
                }
            }
            ExprKind::App { function, argument } => {
                let ff = self.fresh();
                let fa = self.fresh();
                self.generate(function, ff, out);
                self.generate(argument, fa, out);
            }
        }
    }
}

/// Ties a binder's identifier handle to its declared base type when an
/// annotation is present. Arrow annotations have no TypeHandle
/// representation (no arrow constructor in this simplified domain), so they
/// do not strengthen anything.
fn annotation_constraint(identifier: &str, annotation: Option<&TypeAnnotation>) -> Option<Constraint> {
    match annotation {
        Some(TypeAnnotation::Base(BaseType::Int)) => {
            Some((TypeHandle::Named(identifier.to_string()), TypeHandle::int()))
        }
        Some(TypeAnnotation::Base(BaseType::Bool)) => {
            Some((TypeHandle::Named(identifier.to_string()), TypeHandle::bool()))
        }
        Some(TypeAnnotation::Arrow(_, _)) | None => None,
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use tarn_common::span::Span;

    use super::*;

    fn var(name: &str) -> Rc<Expr> {
        Rc::new(Expr::new(ExprKind::Var(name.into()), Span::new(0, 0)))
    }

    fn num(n: i64) -> Rc<Expr> {
        Rc::new(Expr::new(ExprKind::Num(n), Span::new(0, 0)))
    }

    #[test]
    fn literal_constrains_to_base_type() {
        let e = Expr::new(ExprKind::Num(4), Span::new(0, 1));
        let mut gen = CtrGen::new();
        let mut out = Vec::new();
        gen.generate(&e, TypeHandle::Var(TyVarId(1)), &mut out);
        assert_eq!(out, vec![(TypeHandle::int(), TypeHandle::Var(TyVarId(1)))]);
    }

    #[test]
    fn var_constrains_identifier_handle() {
        let e = Expr::new(ExprKind::Var("x".into()), Span::new(0, 1));
        let mut gen = CtrGen::new();
        let mut out = Vec::new();
        gen.generate(&e, TypeHandle::Var(TyVarId(1)), &mut out);
        assert_eq!(
            out,
            vec![(TypeHandle::Named("x".into()), TypeHandle::Var(TyVarId(1)))]
        );
    }

    #[test]
    fn add_constrains_both_operands_to_int() {
        let e = Expr::new(ExprKind::Add(num(1), var("y")), Span::new(0, 0));
        let mut gen = CtrGen::new();
        let mut out = Vec::new();
        gen.generate(&e, TypeHandle::int(), &mut out);
        assert!(out.contains(&(TypeHandle::int(), TypeHandle::int())));
        assert!(out.contains(&(TypeHandle::Named("y".into()), TypeHandle::int())));
    }

    #[test]
    fn eql_shares_a_single_fresh_variable_between_operands() {
        let e = Expr::new(ExprKind::Eql(var("a"), var("b")), Span::new(0, 0));
        let mut gen = CtrGen::new();
        let mut out = Vec::new();
        gen.generate(&e, TypeHandle::bool(), &mut out);
        // Both operands constrained against the same fresh variable.
        let fresh_for_a = out
            .iter()
            .find(|(l, _)| *l == TypeHandle::Named("a".into()))
            .map(|(_, r)| r.clone())
            .unwrap();
        let fresh_for_b = out
            .iter()
            .find(|(l, _)| *l == TypeHandle::Named("b".into()))
            .map(|(_, r)| r.clone())
            .unwrap();
        assert_eq!(fresh_for_a, fresh_for_b);
    }

    #[test]
    fn let_with_int_annotation_adds_strengthening_constraint() {
        let e = Expr::new(
            ExprKind::Let {
                identifier: "x".into(),
                type_annotation: Some(TypeAnnotation::Base(BaseType::Int)),
                def: num(5),
                body: var("x"),
            },
            Span::new(0, 0),
        );
        let mut gen = CtrGen::new();
        let mut out = Vec::new();
        gen.generate(&e, TypeHandle::Var(TyVarId(99)), &mut out);
        assert!(out.contains(&(TypeHandle::Named("x".into()), TypeHandle::int())));
    }
}
