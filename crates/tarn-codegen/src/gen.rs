//! Code generation: lowers an `Expr` into three-address instructions.
//!
//! `GenVisitor::lower` returns the name of the virtual register holding the
//! sub-expression's result. Assumes the rename pass has already run over
//! the tree -- `Var`/`Let` rely on identifiers being globally unique.

use tarn_ast::expr::{Expr, ExprKind};
use tarn_common::error::{CodegenError, CodegenErrorKind};

use crate::instr::{Instr, InstrSink};

pub struct GenVisitor {
    next: u32,
}

impl Default for GenVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl GenVisitor {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    fn fresh(&mut self) -> String {
        self.next += 1;
        format!("v{}", self.next)
    }

    /// Lower `expr`, appending instructions to `sink`, returning the
    /// register holding the result.
    pub fn lower(&mut self, expr: &Expr, sink: &mut dyn InstrSink) -> Result<String, CodegenError> {
        match &expr.kind {
            ExprKind::Num(n) => {
                let v = self.fresh();
                sink.push(Instr::Addi {
                    rd: v.clone(),
                    rs: "x0".into(),
                    imm: *n,
                });
                Ok(v)
            }
            ExprKind::Bln(b) => {
                let v = self.fresh();
                sink.push(Instr::Addi {
                    rd: v.clone(),
                    rs: "x0".into(),
                    imm: if *b { 1 } else { 0 },
                });
                Ok(v)
            }
            ExprKind::Var(name) => Ok(name.clone()),

            ExprKind::Neg(e) => {
                let v_e = self.lower(e, sink)?;
                let v = self.fresh();
                sink.push(Instr::Sub {
                    rd: v.clone(),
                    rs: "x0".into(),
                    rt: v_e,
                });
                Ok(v)
            }
            ExprKind::Not(e) => {
                let v_e = self.lower(e, sink)?;
                self.equality_gadget(&v_e, "x0", sink)
            }

            ExprKind::Add(l, r) => self.binop(l, r, sink, |rd, rs, rt| Instr::Add { rd, rs, rt }),
            ExprKind::Sub(l, r) => self.binop(l, r, sink, |rd, rs, rt| Instr::Sub { rd, rs, rt }),
            ExprKind::Mul(l, r) => self.binop(l, r, sink, |rd, rs, rt| Instr::Mul { rd, rs, rt }),
            ExprKind::Div(l, r) => self.binop(l, r, sink, |rd, rs, rt| Instr::Div { rd, rs, rt }),

            ExprKind::Mod(l, r) => {
                // No modulo instruction in this ISA. Built from the
                // instructions that do exist -- `a mod b = a - (a / b) * b`
                // -- rather than left unlowerable.
                let v_l = self.lower(l, sink)?;
                let v_r = self.lower(r, sink)?;
                let v_q = self.fresh();
                sink.push(Instr::Div {
                    rd: v_q.clone(),
                    rs: v_l.clone(),
                    rt: v_r.clone(),
                });
                let v_prod = self.fresh();
                sink.push(Instr::Mul {
                    rd: v_prod.clone(),
                    rs: v_q,
                    rt: v_r,
                });
                let v = self.fresh();
                sink.push(Instr::Sub {
                    rd: v.clone(),
                    rs: v_l,
                    rt: v_prod,
                });
                Ok(v)
            }

            ExprKind::Lth(l, r) => self.binop(l, r, sink, |rd, rs, rt| Instr::Slt { rd, rs, rt }),

            ExprKind::Eql(l, r) => {
                let v_l = self.lower(l, sink)?;
                let v_r = self.lower(r, sink)?;
                self.equality_gadget(&v_l, &v_r, sink)
            }

            ExprKind::Leq(l, r) => {
                let v_l = self.lower(l, sink)?;
                let v_r = self.lower(r, sink)?;
                let lt = self.fresh();
                sink.push(Instr::Slt {
                    rd: lt.clone(),
                    rs: v_l.clone(),
                    rt: v_r.clone(),
                });
                let eq = self.equality_gadget(&v_l, &v_r, sink)?;
                let v = self.fresh();
                sink.push(Instr::Add {
                    rd: v.clone(),
                    rs: lt,
                    rt: eq,
                });
                Ok(v)
            }

            ExprKind::Let {
                identifier,
                def,
                body,
                ..
            } => {
                let v_d = self.lower(def, sink)?;
                sink.push(Instr::Add {
                    rd: identifier.clone(),
                    rs: v_d,
                    rt: "x0".into(),
                });
                self.lower(body, sink)
            }

            // `And`/`Or`/`IfThenElse` would need a branch and `Fn`/`App`
            // a calling convention; neither exists in this straight-line
            // instruction set.
            ExprKind::And(_, _) | ExprKind::Or(_, _) | ExprKind::IfThenElse { .. } => {
                Err(CodegenError {
                    kind: CodegenErrorKind::RequiresBranching,
                    span: expr.span,
                })
            }
            ExprKind::Fn { .. } | ExprKind::App { .. } => Err(CodegenError {
                kind: CodegenErrorKind::RequiresCallingConvention,
                span: expr.span,
            }),
        }
    }

    fn binop(
        &mut self,
        l: &Expr,
        r: &Expr,
        sink: &mut dyn InstrSink,
        ctor: impl FnOnce(String, String, String) -> Instr,
    ) -> Result<String, CodegenError> {
        let v_l = self.lower(l, sink)?;
        let v_r = self.lower(r, sink)?;
        let v = self.fresh();
        sink.push(ctor(v.clone(), v_l, v_r));
        Ok(v)
    }

    /// `d = a - b; c1 = (d < 1); c2 = (d < 0); result = c1 xor c2`, true
    /// exactly when `d == 0` -- the equality gadget shared by `Eql`, `Not`,
    /// and `Leq`.
    fn equality_gadget(
        &mut self,
        a: &str,
        b: &str,
        sink: &mut dyn InstrSink,
    ) -> Result<String, CodegenError> {
        let d = self.fresh();
        sink.push(Instr::Sub {
            rd: d.clone(),
            rs: a.to_string(),
            rt: b.to_string(),
        });
        let c1 = self.fresh();
        sink.push(Instr::Slti {
            rd: c1.clone(),
            rs: d.clone(),
            imm: 1,
        });
        let c2 = self.fresh();
        sink.push(Instr::Slti {
            rd: c2.clone(),
            rs: d,
            imm: 0,
        });
        let v = self.fresh();
        sink.push(Instr::Xor {
            rd: v.clone(),
            rs: c1,
            rt: c2,
        });
        Ok(v)
    }
}
