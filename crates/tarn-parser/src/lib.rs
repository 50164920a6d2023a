//! Recursive-descent parser, one function per grammar level.
//!
//! The grammar is precedence-ordered top to bottom (`fn_exp` loosest,
//! `atom` tightest); each level calls straight into the next without a
//! shared binding-power table, since the language has a small, fixed set of
//! levels and every level's associativity is spelled out in its own loop.
//! Newlines are skipped at statement-like joints (after keywords and binary
//! operators, before a closing keyword) but left alone inside `app_exp`'s
//! lookahead, which is how it decides when the application chain ends.

use std::rc::Rc;

use tarn_ast::expr::{BaseType, Expr, ExprKind, TypeAnnotation};
use tarn_common::error::ParseError;
use tarn_common::span::Span;
use tarn_common::token::{Token, TokenKind};

/// Parse a filtered token stream (no `Wsp`/`Com`) into the root expression.
/// `source` is the original text the tokens' spans index into, needed to
/// recover `Num`/`Var` lexemes.
pub fn parse(tokens: &[Token], source: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser {
        tokens,
        source,
        pos: 0,
    };
    parser.skip_newlines();
    let expr = parser.fn_exp()?;
    parser.skip_newlines();
    if !parser.check(TokenKind::Eof) {
        return Err(ParseError::new(
            format!("unexpected token {:?} after end of expression", parser.peek().kind),
            parser.peek().span,
        ));
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn skip_newlines(&mut self) {
        while self.check(TokenKind::Nln) {
            self.advance();
        }
    }

    fn text(&self, span: Span) -> &'a str {
        &self.source[span.start as usize..span.end as usize]
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        self.skip_newlines();
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::new(
                format!("expected {what}, found {:?}", self.peek_kind()),
                self.peek().span,
            ))
        }
    }

    fn expect_related(
        &mut self,
        kind: TokenKind,
        what: &str,
        related_message: impl Into<String>,
        related_span: Span,
    ) -> Result<Token, ParseError> {
        self.skip_newlines();
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::with_related(
                format!("expected {what}, found {:?}", self.peek_kind()),
                self.peek().span,
                related_message,
                related_span,
            ))
        }
    }

    // fn_exp ::= 'fn' VAR [':' types] '=>' fn_exp | if_exp
    fn fn_exp(&mut self) -> Result<Expr, ParseError> {
        if self.check(TokenKind::Fnx) {
            let start = self.advance().span; // 'fn'
            self.skip_newlines();
            let name_tok = self.expect(TokenKind::Var, "a parameter name")?;
            let formal = self.text(name_tok.span).to_string();

            let param_type = self.parse_optional_annotation()?;

            self.skip_newlines();
            self.expect_related(
                TokenKind::Arw,
                "`=>`",
                "`fn` opened here",
                start,
            )?;
            self.skip_newlines();
            let body = self.fn_exp()?;
            let span = start.merge(body.span);
            Ok(Expr::new(
                ExprKind::Fn {
                    formal,
                    param_type,
                    body: Rc::new(body),
                },
                span,
            ))
        } else {
            self.if_exp()
        }
    }

    // if_exp ::= 'if' if_exp 'then' fn_exp 'else' fn_exp | or_exp
    fn if_exp(&mut self) -> Result<Expr, ParseError> {
        if self.check(TokenKind::Ifx) {
            let start = self.advance().span; // 'if'
            self.skip_newlines();
            let cond = self.if_exp()?;
            self.skip_newlines();
            self.expect_related(TokenKind::Thn, "`then`", "`if` opened here", start)?;
            self.skip_newlines();
            let then_branch = self.fn_exp()?;
            self.skip_newlines();
            self.expect_related(TokenKind::Els, "`else`", "`if` opened here", start)?;
            self.skip_newlines();
            let else_branch = self.fn_exp()?;
            let span = start.merge(else_branch.span);
            Ok(Expr::new(
                ExprKind::IfThenElse {
                    cond: Rc::new(cond),
                    then_branch: Rc::new(then_branch),
                    else_branch: Rc::new(else_branch),
                },
                span,
            ))
        } else {
            self.or_exp()
        }
    }

    // or_exp ::= and_exp ('or' and_exp)*
    fn or_exp(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.and_exp()?;
        while self.check(TokenKind::Orx) {
            self.advance();
            self.skip_newlines();
            let right = self.and_exp()?;
            let span = left.span.merge(right.span);
            left = Expr::new(ExprKind::Or(Rc::new(left), Rc::new(right)), span);
        }
        Ok(left)
    }

    // and_exp ::= eq_exp ('and' eq_exp)*
    fn and_exp(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.eq_exp()?;
        while self.check(TokenKind::And) {
            self.advance();
            self.skip_newlines();
            let right = self.eq_exp()?;
            let span = left.span.merge(right.span);
            left = Expr::new(ExprKind::And(Rc::new(left), Rc::new(right)), span);
        }
        Ok(left)
    }

    // eq_exp ::= cmp_exp ('=' cmp_exp)*
    fn eq_exp(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.cmp_exp()?;
        while self.check(TokenKind::Eql) {
            self.advance();
            self.skip_newlines();
            let right = self.cmp_exp()?;
            let span = left.span.merge(right.span);
            left = Expr::new(ExprKind::Eql(Rc::new(left), Rc::new(right)), span);
        }
        Ok(left)
    }

    // cmp_exp ::= add_exp (('<='|'<'|'>') add_exp)*
    fn cmp_exp(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.add_exp()?;
        loop {
            let ctor: fn(Rc<Expr>, Rc<Expr>) -> ExprKind = match self.peek_kind() {
                TokenKind::Leq => ExprKind::Leq,
                TokenKind::Lth => ExprKind::Lth,
                // `>` has no dedicated AST variant; `a > b` desugars to `b < a`.
                TokenKind::Gth => |l, r| ExprKind::Lth(r, l),
                _ => break,
            };
            self.advance();
            self.skip_newlines();
            let right = self.add_exp()?;
            let span = left.span.merge(right.span);
            left = Expr::new(ctor(Rc::new(left), Rc::new(right)), span);
        }
        Ok(left)
    }

    // add_exp ::= mul_exp (('+'|'-') mul_exp)*
    fn add_exp(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.mul_exp()?;
        loop {
            let ctor: fn(Rc<Expr>, Rc<Expr>) -> ExprKind = match self.peek_kind() {
                TokenKind::Add => ExprKind::Add,
                TokenKind::Sub => ExprKind::Sub,
                _ => break,
            };
            self.advance();
            self.skip_newlines();
            let right = self.mul_exp()?;
            let span = left.span.merge(right.span);
            left = Expr::new(ctor(Rc::new(left), Rc::new(right)), span);
        }
        Ok(left)
    }

    // mul_exp ::= un_exp (('*'|'/'|'mod') un_exp)*
    fn mul_exp(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.un_exp()?;
        loop {
            let ctor: fn(Rc<Expr>, Rc<Expr>) -> ExprKind = match self.peek_kind() {
                TokenKind::Mul => ExprKind::Mul,
                TokenKind::Div => ExprKind::Div,
                TokenKind::Mod => ExprKind::Mod,
                _ => break,
            };
            self.advance();
            self.skip_newlines();
            let right = self.un_exp()?;
            let span = left.span.merge(right.span);
            left = Expr::new(ctor(Rc::new(left), Rc::new(right)), span);
        }
        Ok(left)
    }

    // un_exp ::= 'not' un_exp | '~' un_exp | let_exp
    fn un_exp(&mut self) -> Result<Expr, ParseError> {
        if self.check(TokenKind::Not) {
            let start = self.advance().span;
            self.skip_newlines();
            let operand = self.un_exp()?;
            let span = start.merge(operand.span);
            Ok(Expr::new(ExprKind::Not(Rc::new(operand)), span))
        } else if self.check(TokenKind::Neg) {
            let start = self.advance().span;
            self.skip_newlines();
            let operand = self.un_exp()?;
            let span = start.merge(operand.span);
            Ok(Expr::new(ExprKind::Neg(Rc::new(operand)), span))
        } else {
            self.let_exp()
        }
    }

    // let_exp ::= 'let' VAR [':' types] '<-' fn_exp 'in' fn_exp 'end' | app_exp
    fn let_exp(&mut self) -> Result<Expr, ParseError> {
        if self.check(TokenKind::Let) {
            let start = self.advance().span; // 'let'
            self.skip_newlines();
            let name_tok = self.expect(TokenKind::Var, "a binding name")?;
            let identifier = self.text(name_tok.span).to_string();

            let type_annotation = self.parse_optional_annotation()?;

            self.skip_newlines();
            self.expect_related(TokenKind::Asn, "`<-`", "`let` opened here", start)?;
            self.skip_newlines();
            let def = self.fn_exp()?;
            self.skip_newlines();
            self.expect_related(TokenKind::Inx, "`in`", "`let` opened here", start)?;
            self.skip_newlines();
            let body = self.fn_exp()?;
            self.skip_newlines();
            let end_tok =
                self.expect_related(TokenKind::End, "`end`", "`let` opened here", start)?;
            let span = start.merge(end_tok.span);
            Ok(Expr::new(
                ExprKind::Let {
                    identifier,
                    type_annotation,
                    def: Rc::new(def),
                    body: Rc::new(body),
                },
                span,
            ))
        } else {
            self.app_exp()
        }
    }

    /// Parses the optional `: types` annotation that follows a `let`/`fn`
    /// binder's name. Returns `None` when there is no `:` -- the AST stores
    /// that absence directly rather than a distinguished "untyped" variant.
    fn parse_optional_annotation(&mut self) -> Result<Option<TypeAnnotation>, ParseError> {
        self.skip_newlines();
        if self.check(TokenKind::Col) {
            self.advance();
            self.skip_newlines();
            Ok(Some(self.parse_types()?))
        } else {
            Ok(None)
        }
    }

    // app_exp ::= atom (atom)*
    fn app_exp(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.atom()?;
        loop {
            let checkpoint = self.pos;
            self.skip_newlines();
            if self.starts_atom() {
                let argument = self.atom()?;
                let span = expr.span.merge(argument.span);
                expr = Expr::new(
                    ExprKind::App {
                        function: Rc::new(expr),
                        argument: Rc::new(argument),
                    },
                    span,
                );
            } else {
                self.pos = checkpoint;
                break;
            }
        }
        Ok(expr)
    }

    fn starts_atom(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Var | TokenKind::Num | TokenKind::Tru | TokenKind::Fls | TokenKind::Lpr
        )
    }

    // atom ::= VAR | NUM | 'true' | 'false' | '(' fn_exp ')'
    fn atom(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind() {
            TokenKind::Var => {
                let tok = self.advance();
                let name = self.text(tok.span).to_string();
                Ok(Expr::new(ExprKind::Var(name), tok.span))
            }
            TokenKind::Num => {
                let tok = self.advance();
                let text = self.text(tok.span);
                let n: i64 = text.parse().map_err(|_| {
                    ParseError::new(format!("integer literal `{text}` out of range"), tok.span)
                })?;
                Ok(Expr::new(ExprKind::Num(n), tok.span))
            }
            TokenKind::Tru => {
                let tok = self.advance();
                Ok(Expr::new(ExprKind::Bln(true), tok.span))
            }
            TokenKind::Fls => {
                let tok = self.advance();
                Ok(Expr::new(ExprKind::Bln(false), tok.span))
            }
            TokenKind::Lpr => {
                let open = self.advance();
                self.skip_newlines();
                let inner = self.fn_exp()?;
                self.skip_newlines();
                let close = self.expect_related(
                    TokenKind::Rpr,
                    "`)`",
                    "`(` opened here",
                    open.span,
                )?;
                Ok(Expr::new(inner.kind, open.span.merge(close.span)))
            }
            other => Err(ParseError::new(
                format!("expected an expression, found {other:?}"),
                self.peek().span,
            )),
        }
    }

    // types ::= type ('->' types)?
    fn parse_types(&mut self) -> Result<TypeAnnotation, ParseError> {
        let left = self.parse_type_atom()?;
        self.skip_newlines();
        if self.check(TokenKind::Tpf) {
            self.advance();
            self.skip_newlines();
            let right = self.parse_types()?;
            Ok(TypeAnnotation::Arrow(Box::new(left), Box::new(right)))
        } else {
            Ok(left)
        }
    }

    // type ::= 'int' | 'bool' | '(' types ')'
    fn parse_type_atom(&mut self) -> Result<TypeAnnotation, ParseError> {
        match self.peek_kind() {
            TokenKind::Int => {
                self.advance();
                Ok(TypeAnnotation::Base(BaseType::Int))
            }
            TokenKind::Lgc => {
                self.advance();
                Ok(TypeAnnotation::Base(BaseType::Bool))
            }
            TokenKind::Lpr => {
                let open = self.advance();
                self.skip_newlines();
                let inner = self.parse_types()?;
                self.skip_newlines();
                self.expect_related(TokenKind::Rpr, "`)`", "`(` opened here", open.span)?;
                Ok(inner)
            }
            other => Err(ParseError::new(
                format!("expected a type, found {other:?}"),
                self.peek().span,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tarn_lexer::Scanner;

    fn parse_str(source: &str) -> Expr {
        let tokens = Scanner::filtered(source).expect("lex should succeed");
        parse(&tokens, source).expect("parse should succeed")
    }

    #[test]
    fn application_binds_tighter_than_binary_operators() {
        // f g x + 1  ==  ((f g) x) + 1
        let e = parse_str("f g x + 1");
        match e.kind {
            ExprKind::Add(lhs, _) => match &lhs.kind {
                ExprKind::App { function, .. } => match &function.kind {
                    ExprKind::App { .. } => {}
                    other => panic!("expected nested App, got {other:?}"),
                },
                other => panic!("expected App, got {other:?}"),
            },
            other => panic!("expected Add, got {other:?}"),
        }
    }

    #[test]
    fn parenthesized_expression_overrides_precedence() {
        let e = parse_str("(1 + 2) * 3");
        assert!(matches!(e.kind, ExprKind::Mul(_, _)));
    }

    #[test]
    fn not_binds_tighter_than_or() {
        // not true or true
        let e = parse_str("not true or true");
        match e.kind {
            ExprKind::Or(lhs, _) => assert!(matches!(lhs.kind, ExprKind::Not(_))),
            other => panic!("expected Or, got {other:?}"),
        }
    }

    #[test]
    fn let_with_type_annotation() {
        let e = parse_str("let x : int <- 5 in x end");
        match e.kind {
            ExprKind::Let {
                identifier,
                type_annotation,
                ..
            } => {
                assert_eq!(identifier, "x");
                assert_eq!(type_annotation, Some(TypeAnnotation::Base(BaseType::Int)));
            }
            other => panic!("expected Let, got {other:?}"),
        }
    }

    #[test]
    fn fn_with_arrow_type_annotation() {
        let e = parse_str("fn f : int -> bool => true");
        match e.kind {
            ExprKind::Fn { param_type, .. } => {
                assert_eq!(
                    param_type,
                    Some(TypeAnnotation::Arrow(
                        Box::new(TypeAnnotation::Base(BaseType::Int)),
                        Box::new(TypeAnnotation::Base(BaseType::Bool)),
                    ))
                );
            }
            other => panic!("expected Fn, got {other:?}"),
        }
    }

    #[test]
    fn nested_let_across_newlines() {
        let e = parse_str("let a <- 2 in\nlet b <- 3 in\na + b\nend\nend");
        assert!(matches!(e.kind, ExprKind::Let { .. }));
    }

    #[test]
    fn missing_end_reports_related_let_span() {
        let tokens = Scanner::filtered("let x <- 1 in x").unwrap();
        let err = parse(&tokens, "let x <- 1 in x").unwrap_err();
        assert!(err.related.is_some());
    }

    #[test]
    fn gth_desugars_to_reversed_lth() {
        let e = parse_str("3 > 2");
        match e.kind {
            ExprKind::Lth(l, r) => {
                assert!(matches!(l.kind, ExprKind::Num(2)));
                assert!(matches!(r.kind, ExprKind::Num(3)));
            }
            other => panic!("expected Lth, got {other:?}"),
        }
    }

    #[test]
    fn unbalanced_parenthesis_is_a_parse_error() {
        let tokens = Scanner::filtered("(1 + 2").unwrap();
        assert!(parse(&tokens, "(1 + 2").is_err());
    }
}
