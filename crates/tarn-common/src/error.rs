use std::fmt;

use crate::span::Span;

/// A lexer error with location information.
///
/// The scanner does not recover from lexical errors: the first violation
/// aborts scanning and this error propagates out of the stage.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LexErrorKind {
    /// A character matched none of the lexical rules.
    UnrecognizedCharacter(char),
    /// A block comment (`(* ... *)`) ran off the end of input before its closer.
    UnterminatedBlockComment,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedCharacter(c) => write!(f, "unrecognized character: {c:?}"),
            Self::UnterminatedBlockComment => write!(f, "unterminated block comment"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for LexError {}

/// A parse error with location information and optional related span.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    /// An additional span with context, e.g. "`if` opened here".
    pub related: Option<(String, Span)>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            related: None,
        }
    }

    pub fn with_related(
        message: impl Into<String>,
        span: Span,
        related_message: impl Into<String>,
        related_span: Span,
    ) -> Self {
        Self {
            message: message.into(),
            span,
            related: Some((related_message.into(), related_span)),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Evaluation failed because a `Var` referenced an identifier not bound by
/// any enclosing `let`/`fn` in the runtime environment.
#[derive(Debug, Clone, PartialEq)]
pub struct DefError {
    pub name: String,
    pub span: Span,
}

impl fmt::Display for DefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "undefined variable `{}`", self.name)
    }
}

impl std::error::Error for DefError {}

/// Evaluation failed because an operand had the wrong runtime kind.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeErrorKind {
    /// Expected an integer operand, found something else.
    ExpectedInt,
    /// Expected a boolean operand, found something else.
    ExpectedBool,
    /// Expected a closure value to apply, found something else.
    ExpectedFunction,
    /// `Eql` applied to operands that do not agree on a base type (or to
    /// two closures, which are never comparable).
    NotComparable,
}

impl fmt::Display for TypeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpectedInt => write!(f, "expected an integer"),
            Self::ExpectedBool => write!(f, "expected a boolean"),
            Self::ExpectedFunction => write!(f, "expected a function"),
            Self::NotComparable => write!(f, "operands are not comparable"),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for TypeError {}

/// Division or modulo by zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ArithError {
    pub kind: ArithErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithErrorKind {
    DivisionByZero,
    ModuloByZero,
}

impl fmt::Display for ArithErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::ModuloByZero => write!(f, "modulo by zero"),
        }
    }
}

impl fmt::Display for ArithError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ArithError {}

/// An error raised while evaluating an AST. Unifies the three runtime
/// failure modes the evaluator can produce; `LexError`/`ParseError` are
/// earlier-stage failures and do not appear here.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    Def(DefError),
    Type(TypeError),
    Arith(ArithError),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Def(e) => write!(f, "{e}"),
            Self::Type(e) => write!(f, "{e}"),
            Self::Arith(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<DefError> for EvalError {
    fn from(e: DefError) -> Self {
        Self::Def(e)
    }
}

impl From<TypeError> for EvalError {
    fn from(e: TypeError) -> Self {
        Self::Type(e)
    }
}

impl From<ArithError> for EvalError {
    fn from(e: ArithError) -> Self {
        Self::Arith(e)
    }
}

/// Code generation reached an AST node the straight-line three-address
/// lowering does not cover: `And`/`Or`/`IfThenElse` would need a branch to
/// short-circuit or select a side, and `Fn`/`App` would need a calling
/// convention -- neither exists in this instruction set.
#[derive(Debug, Clone, PartialEq)]
pub struct CodegenError {
    pub kind: CodegenErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodegenErrorKind {
    /// `And`/`Or`/`IfThenElse` would require a branch instruction.
    RequiresBranching,
    /// `Fn`/`App` would require a calling convention.
    RequiresCallingConvention,
}

impl fmt::Display for CodegenErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequiresBranching => {
                write!(f, "lowering this node would require a branch instruction")
            }
            Self::RequiresCallingConvention => {
                write!(f, "lowering this node would require a calling convention")
            }
        }
    }
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for CodegenError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = LexError::new(LexErrorKind::UnrecognizedCharacter('@'), Span::new(0, 1));
        assert_eq!(err.to_string(), "unrecognized character: '@'");
    }

    #[test]
    fn parse_error_with_related() {
        let err = ParseError::with_related(
            "expected `end` to close `let`",
            Span::new(20, 23),
            "`let` opened here",
            Span::new(0, 3),
        );
        assert_eq!(err.to_string(), "expected `end` to close `let`");
        let (msg, span) = err.related.unwrap();
        assert_eq!(msg, "`let` opened here");
        assert_eq!(span, Span::new(0, 3));
    }

    #[test]
    fn def_error_display() {
        let err = DefError {
            name: "z".into(),
            span: Span::new(0, 1),
        };
        assert_eq!(err.to_string(), "undefined variable `z`");
    }

    #[test]
    fn arith_error_display() {
        let err = ArithError {
            kind: ArithErrorKind::DivisionByZero,
            span: Span::new(0, 1),
        };
        assert_eq!(err.to_string(), "division by zero");
    }

    #[test]
    fn eval_error_from_conversions() {
        let def: EvalError = DefError {
            name: "x".into(),
            span: Span::new(0, 1),
        }
        .into();
        assert!(matches!(def, EvalError::Def(_)));
    }
}
