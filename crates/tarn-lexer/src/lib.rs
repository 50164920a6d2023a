//! Scanner for the tarn expression language.
//!
//! Consumes a source string and produces tokens one at a time via
//! [`Scanner::next_token`], or all at once via [`Scanner::tokenize`]. The
//! scanner does not recover from lexical errors: the first unrecognized
//! character aborts scanning.

mod cursor;

use cursor::Cursor;
use tarn_common::error::{LexError, LexErrorKind};
use tarn_common::token::{keyword_from_str, Token, TokenKind};

/// Tokenizes a source string, one token per call to [`Scanner::next_token`].
pub struct Scanner<'src> {
    cursor: Cursor<'src>,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Tokenize the entire source, including the terminating `Eof` token.
    /// Whitespace and comment tokens are kept -- callers that want the
    /// filtered stream the parser consumes should use [`Scanner::filtered`].
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
        let mut scanner = Scanner::new(source);
        let mut tokens = Vec::new();
        loop {
            let tok = scanner.next_token()?;
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                return Ok(tokens);
            }
        }
    }

    /// Tokenize the entire source and drop `Wsp`/`Com` tokens -- the stream
    /// the parser actually consumes.
    pub fn filtered(source: &str) -> Result<Vec<Token>, LexError> {
        let all = Self::tokenize(source)?;
        Ok(all
            .into_iter()
            .filter(|t| !matches!(t.kind, TokenKind::Wsp | TokenKind::Com))
            .collect())
    }

    /// Produce the next token. Once `Eof` has been produced, every
    /// subsequent call returns `Eof` again.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let start = self.cursor.pos();

        let Some(c) = self.cursor.peek() else {
            return Ok(Token::new(TokenKind::Eof, start, start));
        };

        match c {
            ' ' => {
                self.cursor.advance();
                Ok(Token::new(TokenKind::Wsp, start, self.cursor.pos()))
            }
            '\n' => {
                self.cursor.advance();
                Ok(Token::new(TokenKind::Nln, start, self.cursor.pos()))
            }
            '0'..='9' => Ok(self.lex_number(start)),
            c if c.is_ascii_alphabetic() => Ok(self.lex_ident(start)),
            '+' => self.single(TokenKind::Add, start),
            '*' => self.single(TokenKind::Mul, start),
            '~' => self.single(TokenKind::Neg, start),
            '(' => self.lex_lpr(start),
            ')' => self.single(TokenKind::Rpr, start),
            ':' => self.single(TokenKind::Col, start),
            '-' => self.lex_minus(start),
            '=' => self.lex_eq(start),
            '<' => self.lex_lt(start),
            '>' => self.single(TokenKind::Gth, start),
            '/' => self.single(TokenKind::Div, start),
            other => {
                self.cursor.advance();
                Err(LexError::new(
                    LexErrorKind::UnrecognizedCharacter(other),
                    tarn_common::span::Span::new(start, self.cursor.pos()),
                ))
            }
        }
    }

    fn single(&mut self, kind: TokenKind, start: u32) -> Result<Token, LexError> {
        self.cursor.advance();
        Ok(Token::new(kind, start, self.cursor.pos()))
    }

    /// `(` opens a parenthesis, or `(*` opens a block comment.
    fn lex_lpr(&mut self, start: u32) -> Result<Token, LexError> {
        self.cursor.advance(); // '('
        if self.cursor.peek() == Some('*') {
            self.cursor.advance(); // '*'
            loop {
                match self.cursor.peek() {
                    None => {
                        return Err(LexError::new(
                            LexErrorKind::UnterminatedBlockComment,
                            tarn_common::span::Span::new(start, self.cursor.pos()),
                        ));
                    }
                    Some('*') if self.cursor.peek_next() == Some(')') => {
                        self.cursor.advance(); // '*'
                        self.cursor.advance(); // ')'
                        return Ok(Token::new(TokenKind::Com, start, self.cursor.pos()));
                    }
                    Some(_) => {
                        self.cursor.advance();
                    }
                }
            }
        }
        Ok(Token::new(TokenKind::Lpr, start, self.cursor.pos()))
    }

    /// `-` is subtraction, `--` starts a line comment, `->` is the type arrow.
    fn lex_minus(&mut self, start: u32) -> Result<Token, LexError> {
        self.cursor.advance(); // '-'
        match self.cursor.peek() {
            Some('-') => {
                self.cursor.eat_while(|c| c != '\n');
                if self.cursor.peek() == Some('\n') {
                    self.cursor.advance();
                }
                Ok(Token::new(TokenKind::Com, start, self.cursor.pos()))
            }
            Some('>') => {
                self.cursor.advance();
                Ok(Token::new(TokenKind::Tpf, start, self.cursor.pos()))
            }
            _ => Ok(Token::new(TokenKind::Sub, start, self.cursor.pos())),
        }
    }

    /// `=` is equality, `=>` is the lambda arrow.
    fn lex_eq(&mut self, start: u32) -> Result<Token, LexError> {
        self.cursor.advance(); // '='
        if self.cursor.peek() == Some('>') {
            self.cursor.advance();
            Ok(Token::new(TokenKind::Arw, start, self.cursor.pos()))
        } else {
            Ok(Token::new(TokenKind::Eql, start, self.cursor.pos()))
        }
    }

    /// `<` is less-than, `<=` is less-or-equal, `<-` is the let-binding arrow.
    fn lex_lt(&mut self, start: u32) -> Result<Token, LexError> {
        self.cursor.advance(); // '<'
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.advance();
                Ok(Token::new(TokenKind::Leq, start, self.cursor.pos()))
            }
            Some('-') => {
                self.cursor.advance();
                Ok(Token::new(TokenKind::Asn, start, self.cursor.pos()))
            }
            _ => Ok(Token::new(TokenKind::Lth, start, self.cursor.pos())),
        }
    }

    fn lex_number(&mut self, start: u32) -> Token {
        self.cursor.eat_while(|c| c.is_ascii_digit());
        Token::new(TokenKind::Num, start, self.cursor.pos())
    }

    fn lex_ident(&mut self, start: u32) -> Token {
        self.cursor.advance(); // first alphabetic char
        self.cursor.eat_while(|c| c.is_ascii_alphanumeric());
        let text = self.cursor.slice(start, self.cursor.pos());
        let kind = keyword_from_str(text).unwrap_or(TokenKind::Var);
        Token::new(kind, start, self.cursor.pos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_simple_let() {
        assert_eq!(
            kinds("let x <- 5 in x end"),
            vec![
                TokenKind::Let,
                TokenKind::Wsp,
                TokenKind::Var,
                TokenKind::Wsp,
                TokenKind::Asn,
                TokenKind::Wsp,
                TokenKind::Num,
                TokenKind::Wsp,
                TokenKind::Inx,
                TokenKind::Wsp,
                TokenKind::Var,
                TokenKind::Wsp,
                TokenKind::End,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn filtered_drops_whitespace_and_comments() {
        let tokens = Scanner::filtered("1 + 2 -- trailing comment\n").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Num,
                TokenKind::Add,
                TokenKind::Num,
                TokenKind::Nln,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn line_comment_runs_to_newline() {
        assert_eq!(
            kinds("-- a comment\n1"),
            vec![TokenKind::Com, TokenKind::Nln, TokenKind::Num, TokenKind::Eof]
        );
    }

    #[test]
    fn block_comment_does_not_nest() {
        // The first "*)" closes the comment, so "more" is lexed as code.
        let tokens = Scanner::filtered("(* a (* nested *) more *)1").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        // "more" is an identifier, "*)1" after it re-enters normal lexing:
        // the comment closes at the first "*)", leaving " more *)1" as code.
        assert!(kinds.contains(&TokenKind::Var)); // "more"
        assert!(kinds.contains(&TokenKind::Num)); // trailing 1
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        let err = Scanner::tokenize("(* never closed").unwrap_err();
        assert!(matches!(
            err.kind,
            tarn_common::error::LexErrorKind::UnterminatedBlockComment
        ));
    }

    #[test]
    fn unrecognized_character_is_an_error() {
        let err = Scanner::tokenize("1 + @").unwrap_err();
        assert!(matches!(
            err.kind,
            tarn_common::error::LexErrorKind::UnrecognizedCharacter('@')
        ));
    }

    #[test]
    fn non_ascii_letter_is_an_error() {
        let err = Scanner::tokenize("caf\u{e9}").unwrap_err();
        assert!(matches!(
            err.kind,
            tarn_common::error::LexErrorKind::UnrecognizedCharacter('\u{e9}')
        ));
    }

    #[test]
    fn multi_char_operators() {
        assert_eq!(
            kinds("=> <= <- -> ="),
            vec![
                TokenKind::Arw,
                TokenKind::Wsp,
                TokenKind::Leq,
                TokenKind::Wsp,
                TokenKind::Asn,
                TokenKind::Wsp,
                TokenKind::Tpf,
                TokenKind::Wsp,
                TokenKind::Eql,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keyword_and_type_keyword_lexing() {
        assert_eq!(
            kinds("int bool div mod"),
            vec![
                TokenKind::Int,
                TokenKind::Wsp,
                TokenKind::Lgc,
                TokenKind::Wsp,
                TokenKind::Div,
                TokenKind::Wsp,
                TokenKind::Mod,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn eof_is_stable_across_repeated_calls() {
        let mut scanner = Scanner::new("");
        let first = scanner.next_token().unwrap();
        let second = scanner.next_token().unwrap();
        assert_eq!(first.kind, TokenKind::Eof);
        assert_eq!(second.kind, TokenKind::Eof);
    }
}
