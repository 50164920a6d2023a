//! Scoped alpha-renaming.
//!
//! The only pass in the pipeline that mutates the tree in place. Every
//! binder (`Let`, `Fn`) is given a fresh globally-unique name; every `Var`
//! occurrence under that binder's body is rewritten to match. A `Var` whose
//! name is not currently on any stack is left alone -- whether it is free is
//! someone else's concern (`use_def`).
//!
//! Mutating through `Rc::make_mut` is safe here because renaming always
//! runs before any closure is built over the tree: every `Rc<Expr>` in a
//! freshly parsed AST has strong count 1, so `make_mut` never clones.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::expr::{Expr, ExprKind};

#[derive(Default)]
pub struct RenameVisitor {
    counter: u32,
    scopes: FxHashMap<String, Vec<String>>,
}

impl RenameVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_name(&mut self) -> String {
        self.counter += 1;
        format!("x_{}", self.counter)
    }

    fn push(&mut self, original: &str, fresh: String) {
        self.scopes.entry(original.to_string()).or_default().push(fresh);
    }

    fn pop(&mut self, original: &str) {
        if let Some(stack) = self.scopes.get_mut(original) {
            stack.pop();
        }
    }

    fn current(&self, original: &str) -> Option<&str> {
        self.scopes
            .get(original)
            .and_then(|stack| stack.last())
            .map(String::as_str)
    }

    pub fn rename(&mut self, expr: &mut Expr) {
        match &mut expr.kind {
            ExprKind::Num(_) | ExprKind::Bln(_) => {}
            ExprKind::Var(name) => {
                if let Some(current) = self.current(name) {
                    *name = current.to_string();
                }
            }
            ExprKind::Neg(e) | ExprKind::Not(e) => self.rename(Rc::make_mut(e)),
            ExprKind::Add(l, r)
            | ExprKind::Sub(l, r)
            | ExprKind::Mul(l, r)
            | ExprKind::Div(l, r)
            | ExprKind::Mod(l, r)
            | ExprKind::Eql(l, r)
            | ExprKind::Lth(l, r)
            | ExprKind::Leq(l, r)
            | ExprKind::And(l, r)
            | ExprKind::Or(l, r) => {
                self.rename(Rc::make_mut(l));
                self.rename(Rc::make_mut(r));
            }
            ExprKind::IfThenElse {
                cond,
                then_branch,
                else_branch,
            } => {
                self.rename(Rc::make_mut(cond));
                self.rename(Rc::make_mut(then_branch));
                self.rename(Rc::make_mut(else_branch));
            }
            ExprKind::Let {
                identifier,
                def,
                body,
                ..
            } => {
                self.rename(Rc::make_mut(def));
                let original = identifier.clone();
                let fresh = self.fresh_name();
                self.push(&original, fresh.clone());
                *identifier = fresh;
                self.rename(Rc::make_mut(body));
                self.pop(&original);
            }
            ExprKind::Fn { formal, body, .. } => {
                let original = formal.clone();
                let fresh = self.fresh_name();
                self.push(&original, fresh.clone());
                *formal = fresh;
                self.rename(Rc::make_mut(body));
                self.pop(&original);
            }
            ExprKind::App { function, argument } => {
                self.rename(Rc::make_mut(function));
                self.rename(Rc::make_mut(argument));
            }
        }
    }
}
