//! Tree-walking evaluator.
//!
//! `eval` visits an `Expr` under an immutable `Env`, producing a `Value` or
//! the first `EvalError` encountered. There is no recovery: a failing
//! sub-expression aborts the whole evaluation, which is why `And`/`Or`/`If`
//! must be careful never to evaluate a branch they don't need.

use std::rc::Rc;

use tarn_ast::env::Env;
use tarn_ast::expr::{Expr, ExprKind};
use tarn_ast::value::{Closure, Value};
use tarn_common::error::{ArithError, ArithErrorKind, DefError, EvalError, TypeError, TypeErrorKind};
use tarn_common::span::Span;

pub fn eval(expr: &Expr, env: &Rc<Env>) -> Result<Value, EvalError> {
    match &expr.kind {
        ExprKind::Num(n) => Ok(Value::Int(*n)),
        ExprKind::Bln(b) => Ok(Value::Bool(*b)),

        ExprKind::Var(name) => env.lookup(name).cloned().ok_or_else(|| {
            EvalError::from(DefError {
                name: name.clone(),
                span: expr.span,
            })
        }),

        ExprKind::Neg(e) => {
            let n = as_int(&eval(e, env)?, e.span)?;
            Ok(Value::Int(-n))
        }
        ExprKind::Not(e) => {
            let b = as_bool(&eval(e, env)?, e.span)?;
            Ok(Value::Bool(!b))
        }

        ExprKind::Add(l, r) => {
            let (a, b) = eval_int_pair(l, r, env)?;
            Ok(Value::Int(a.wrapping_add(b)))
        }
        ExprKind::Sub(l, r) => {
            let (a, b) = eval_int_pair(l, r, env)?;
            Ok(Value::Int(a.wrapping_sub(b)))
        }
        ExprKind::Mul(l, r) => {
            let (a, b) = eval_int_pair(l, r, env)?;
            Ok(Value::Int(a.wrapping_mul(b)))
        }
        ExprKind::Div(l, r) => {
            let (a, b) = eval_int_pair(l, r, env)?;
            if b == 0 {
                return Err(ArithError {
                    kind: ArithErrorKind::DivisionByZero,
                    span: expr.span,
                }
                .into());
            }
            Ok(Value::Int(floor_div(a, b)))
        }
        ExprKind::Mod(l, r) => {
            let (a, b) = eval_int_pair(l, r, env)?;
            if b == 0 {
                return Err(ArithError {
                    kind: ArithErrorKind::ModuloByZero,
                    span: expr.span,
                }
                .into());
            }
            Ok(Value::Int(floor_mod(a, b)))
        }

        ExprKind::Eql(l, r) => {
            let lv = eval(l, env)?;
            let rv = eval(r, env)?;
            match (&lv, &rv) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Bool(a == b)),
                (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a == b)),
                _ => Err(TypeError {
                    kind: TypeErrorKind::NotComparable,
                    span: expr.span,
                }
                .into()),
            }
        }
        ExprKind::Lth(l, r) => {
            let (a, b) = eval_int_pair(l, r, env)?;
            Ok(Value::Bool(a < b))
        }
        ExprKind::Leq(l, r) => {
            let (a, b) = eval_int_pair(l, r, env)?;
            Ok(Value::Bool(a <= b))
        }

        ExprKind::And(l, r) => {
            if !as_bool(&eval(l, env)?, l.span)? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(as_bool(&eval(r, env)?, r.span)?))
        }
        ExprKind::Or(l, r) => {
            if as_bool(&eval(l, env)?, l.span)? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(as_bool(&eval(r, env)?, r.span)?))
        }

        ExprKind::IfThenElse {
            cond,
            then_branch,
            else_branch,
        } => {
            if as_bool(&eval(cond, env)?, cond.span)? {
                eval(then_branch, env)
            } else {
                eval(else_branch, env)
            }
        }

        ExprKind::Let {
            identifier,
            def,
            body,
            ..
        } => {
            let value = eval(def, env)?;
            let extended = Env::extend(env, identifier.clone(), value);
            eval(body, &extended)
        }

        ExprKind::Fn { formal, body, .. } => Ok(Value::Closure(Rc::new(Closure {
            formal: formal.clone(),
            body: Rc::clone(body),
            captured_env: Rc::clone(env),
        }))),

        ExprKind::App { function, argument } => {
            let callee = eval(function, env)?;
            let Value::Closure(closure) = callee else {
                return Err(TypeError {
                    kind: TypeErrorKind::ExpectedFunction,
                    span: function.span,
                }
                .into());
            };
            let arg_value = eval(argument, env)?;
            let call_env = Env::extend(&closure.captured_env, closure.formal.clone(), arg_value);
            eval(&closure.body, &call_env)
        }
    }
}

fn eval_int_pair(l: &Expr, r: &Expr, env: &Rc<Env>) -> Result<(i64, i64), EvalError> {
    let a = as_int(&eval(l, env)?, l.span)?;
    let b = as_int(&eval(r, env)?, r.span)?;
    Ok((a, b))
}

fn as_int(value: &Value, span: Span) -> Result<i64, EvalError> {
    match value {
        Value::Int(n) => Ok(*n),
        _ => Err(TypeError {
            kind: TypeErrorKind::ExpectedInt,
            span,
        }
        .into()),
    }
}

fn as_bool(value: &Value, span: Span) -> Result<bool, EvalError> {
    match value {
        Value::Bool(b) => Ok(*b),
        _ => Err(TypeError {
            kind: TypeErrorKind::ExpectedBool,
            span,
        }
        .into()),
    }
}

/// Floor division: rounds the quotient toward negative infinity, unlike
/// Rust's `/` which truncates toward zero.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a.wrapping_div(b);
    let r = a.wrapping_rem(b);
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

/// Remainder consistent with `floor_div`: `a == floor_div(a, b) * b + floor_mod(a, b)`.
fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}
