//! Token navigation utilities for the parser.
//!
//! This module provides the low-level token stream operations that form
//! the foundation of the recursive descent parser:
//! - Peeking at tokens without consuming them
//! - Advancing through the token stream
//! - Matching and expecting specific tokens
//! - Block closer detection
//! - Error recovery (synchronization)
//!
//! Comment tokens are dropped when the parser is built, so nothing here has
//! to step over them.

use crate::ast::Span;
use crate::lexer::{Keyword, Token, TokenKind};

use super::{Closer, ParseError, Parser};

impl<'a> Parser<'a> {
    // ==================== Token Navigation ====================

    /// Returns the current token without consuming it.
    pub(super) fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.current).copied()
    }

    /// Returns the kind of the current token (`Eof` past the end).
    pub(super) fn peek_kind(&self) -> TokenKind {
        self.peek().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    /// Looks ahead n tokens (0 = current token).
    pub(super) fn peek_ahead(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.current + n).copied()
    }

    /// Kind of the token n places ahead.
    pub(super) fn peek_kind_ahead(&self, n: usize) -> TokenKind {
        self.peek_ahead(n).map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    /// Consumes and returns the current token.
    ///
    /// The end-of-input token is never consumed.
    pub(super) fn advance(&mut self) -> Option<&'a Token> {
        let token = self.peek();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Returns true if we've reached the end of the token stream.
    pub(super) fn is_at_end(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    /// Checks if the current token matches the expected kind.
    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Checks if the current token is the given keyword.
    pub(super) fn check_keyword(&self, keyword: Keyword) -> bool {
        self.peek_kind().is_keyword(keyword)
    }

    /// Consumes the current token if it matches, returns true if consumed.
    pub(super) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes the current token if it is the given keyword.
    pub(super) fn match_keyword(&mut self, keyword: Keyword) -> bool {
        self.match_token(TokenKind::Keyword(keyword))
    }

    /// Expects the current token to match, or records an error.
    pub(super) fn expect(&mut self, kind: TokenKind, expected_desc: &str) -> Result<&'a Token, ()> {
        if self.check(kind)
            && let Some(token) = self.advance()
        {
            return Ok(token);
        }
        self.error_expected(expected_desc);
        Err(())
    }

    /// Expects a keyword, or records an error.
    pub(super) fn expect_keyword(&mut self, keyword: Keyword) -> Result<&'a Token, ()> {
        self.expect(TokenKind::Keyword(keyword), &format!("`{}`", keyword))
    }

    /// Expects an identifier, or records an error.
    pub(super) fn expect_identifier(&mut self, expected_desc: &str) -> Result<&'a Token, ()> {
        self.expect(TokenKind::Identifier, expected_desc)
    }

    /// Records "expected X, found Y" at the current token.
    pub(super) fn error_expected(&mut self, expected_desc: &str) {
        let span = self.current_span();
        let error = match self.peek() {
            Some(token) if token.kind != TokenKind::Eof => {
                ParseError::unexpected(expected_desc, token.describe(), span)
            }
            _ => ParseError::eof(expected_desc, span),
        };
        self.errors.push(error);
    }

    /// Returns true at a newline, `:` or end of input.
    pub(super) fn at_statement_end(&self) -> bool {
        self.peek_kind().is_terminator()
    }

    /// Skips newline and `:` tokens.
    pub(super) fn skip_newlines(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Colon) {
            self.advance();
        }
    }

    /// Requires the statement just parsed to end here.
    ///
    /// Trailing tokens are reported once and skipped. A block closer may
    /// follow directly when an inner block was left unclosed.
    pub(super) fn finish_statement(&mut self) {
        if !self.at_statement_end() && !self.at_any_closer() {
            self.error_expected("end of statement");
            self.synchronize();
        }
    }

    // ==================== Block Closers ====================

    /// Returns true if the current token closes a block with `closer`.
    pub(super) fn at_closer(&self, closer: Closer) -> bool {
        match closer {
            Closer::Keyword(keyword) => self.check_keyword(keyword),
            Closer::EndOf(keyword) => {
                self.check_keyword(Keyword::End) && self.peek_kind_ahead(1).is_keyword(keyword)
            }
        }
    }

    /// Returns true if the current token closes any block kind.
    pub(super) fn at_any_closer(&self) -> bool {
        Closer::ALL.iter().any(|closer| self.at_closer(*closer))
    }

    /// Consumes `closer` if present.
    pub(super) fn match_closer(&mut self, closer: Closer) -> bool {
        if !self.at_closer(closer) {
            return false;
        }
        if let Closer::EndOf(_) = closer {
            self.advance();
        }
        self.advance();
        true
    }

    // ==================== Error Recovery ====================

    /// Attempts to recover from an error by skipping to a synchronization point.
    ///
    /// Synchronization points are:
    /// - Just past a newline or `:` (statement boundaries)
    /// - Keywords that start or close a statement
    ///
    /// Always consumes at least one token unless at end of input.
    pub(super) fn synchronize(&mut self) {
        while !self.is_at_end() {
            if matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Colon) {
                self.advance();
                return;
            }

            self.advance();

            if let TokenKind::Keyword(keyword) = self.peek_kind()
                && starts_statement(keyword)
            {
                return;
            }
        }
    }

    // ==================== Spans ====================

    /// Span of the current token (or end of input).
    pub(super) fn current_span(&self) -> Span {
        self.peek()
            .or_else(|| self.tokens.last().copied())
            .map(Token::location)
            .unwrap_or_default()
    }

    /// Creates a span from the token at index `start` to the last consumed token.
    pub(super) fn span_from(&self, start: usize) -> Span {
        let Some(first) = self.tokens.get(start) else {
            return self.current_span();
        };
        let end = self
            .tokens
            .get(self.current.saturating_sub(1))
            .filter(|_| self.current > start)
            .map(|t| t.span.end)
            .unwrap_or(first.span.end);
        Span::new(first.span.start, end).at(first.line, first.column)
    }
}

/// Keywords that begin or close a statement.
fn starts_statement(keyword: Keyword) -> bool {
    use Keyword::*;
    matches!(
        keyword,
        If | ElseIf
            | Else
            | EndIf
            | End
            | While
            | Wend
            | Repeat
            | Until
            | Forever
            | For
            | Next
            | Select
            | Case
            | Default
            | Function
            | Type
            | Field
            | Global
            | Local
            | Dim
            | Const
            | Return
            | Exit
            | Goto
            | Gosub
            | Data
            | Read
            | Restore
            | Delete
            | Insert
    )
}
