//! Ariadne-based diagnostic rendering.
//!
//! Every error kind in [`crate::error`] implements [`Diagnostic`], which is
//! enough to render a labeled, terse report against the original source
//! text. Rendering never happens implicitly: callers ask for it, so the
//! core pipeline stays silent until asked to explain itself.

use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::error::{
    ArithError, CodegenError, DefError, EvalError, LexError, ParseError, TypeError,
};
use crate::span::Span;

/// A pipeline error that knows its own source location and a stable code.
pub trait Diagnostic: std::fmt::Display {
    fn span(&self) -> Span;
    fn code(&self) -> &'static str;
}

impl Diagnostic for LexError {
    fn span(&self) -> Span {
        self.span
    }
    fn code(&self) -> &'static str {
        "L0001"
    }
}

impl Diagnostic for ParseError {
    fn span(&self) -> Span {
        self.span
    }
    fn code(&self) -> &'static str {
        "P0001"
    }
}

impl Diagnostic for DefError {
    fn span(&self) -> Span {
        self.span
    }
    fn code(&self) -> &'static str {
        "D0001"
    }
}

impl Diagnostic for TypeError {
    fn span(&self) -> Span {
        self.span
    }
    fn code(&self) -> &'static str {
        "T0001"
    }
}

impl Diagnostic for ArithError {
    fn span(&self) -> Span {
        self.span
    }
    fn code(&self) -> &'static str {
        "A0001"
    }
}

impl Diagnostic for CodegenError {
    fn span(&self) -> Span {
        self.span
    }
    fn code(&self) -> &'static str {
        "G0001"
    }
}

impl Diagnostic for EvalError {
    fn span(&self) -> Span {
        match self {
            Self::Def(e) => e.span(),
            Self::Type(e) => e.span(),
            Self::Arith(e) => e.span(),
        }
    }
    fn code(&self) -> &'static str {
        match self {
            Self::Def(e) => e.code(),
            Self::Type(e) => e.code(),
            Self::Arith(e) => e.code(),
        }
    }
}

/// Render a diagnostic as a human-readable report string, labeling the
/// offending span in `source`.
pub fn render(err: &impl Diagnostic, source_name: &str, source: &str) -> String {
    let range = err.span().as_range();
    let mut buf = Vec::new();
    Report::build(ReportKind::Error, (source_name, range.clone()))
        .with_code(err.code())
        .with_message(err.to_string())
        .with_label(
            Label::new((source_name, range))
                .with_message(err.to_string())
                .with_color(Color::Red),
        )
        .finish()
        .write((source_name, Source::from(source)), &mut buf)
        .expect("ariadne report should render to an in-memory buffer");
    String::from_utf8(buf).expect("ariadne output is always valid UTF-8")
}
