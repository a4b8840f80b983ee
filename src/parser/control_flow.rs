//! Control flow statement parsing.
//!
//! This module handles parsing of control flow constructs:
//! - `If`/`Then`/`ElseIf`/`Else`/`EndIf`, in block and single-line form
//! - `Select`/`Case`/`Default`/`End Select`
//! - `For`/`Next` and `For ... = Each Type`
//! - `While`/`Wend`
//! - `Repeat`/`Until` and `Repeat`/`Forever`

use crate::ast::{CaseClause, Expr, Statement, StatementKind};
use crate::lexer::{Keyword, TokenKind};
use crate::semantic::ValueType;

use super::statements::declared_symbol;
use super::{Closer, ParseError, Parser};

/// Closers that end an `If` branch.
const IF_BRANCH_CLOSERS: [Closer; 4] = [
    Closer::Keyword(Keyword::EndIf),
    Closer::EndOf(Keyword::If),
    Closer::Keyword(Keyword::ElseIf),
    Closer::Keyword(Keyword::Else),
];

const IF_CLOSERS: [Closer; 2] = [Closer::Keyword(Keyword::EndIf), Closer::EndOf(Keyword::If)];

const CASE_CLOSERS: [Closer; 3] = [
    Closer::EndOf(Keyword::Select),
    Closer::Keyword(Keyword::Case),
    Closer::Keyword(Keyword::Default),
];

impl<'a> Parser<'a> {
    // ==================== If Statement ====================

    /// Parses an `If` statement.
    ///
    /// A newline right after the condition (and optional `Then`) selects the
    /// block form; anything else is the single-line form.
    pub(super) fn parse_if(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();

        let condition = self.parse_expression();
        self.match_keyword(Keyword::Then);

        if !matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Eof) {
            return Ok(self.parse_single_line_if(condition, start));
        }

        let opened = self.span_from(start);
        let then_branch = self.parse_block(&IF_BRANCH_CLOSERS, "If", opened);

        let mut elseif_branches = Vec::new();
        loop {
            let else_if = self.check_keyword(Keyword::Else)
                && self.peek_kind_ahead(1).is_keyword(Keyword::If);
            if !self.match_keyword(Keyword::ElseIf) && !else_if {
                break;
            }
            if else_if {
                self.advance();
                self.advance();
            }
            let condition = self.parse_expression();
            self.match_keyword(Keyword::Then);
            let body = self.parse_block(&IF_BRANCH_CLOSERS, "If", opened);
            elseif_branches.push((condition, body));
        }

        let else_branch = if self.match_keyword(Keyword::Else) {
            Some(self.parse_block(&IF_CLOSERS, "If", opened))
        } else {
            None
        };

        // a missing EndIf was already reported by the block
        if !self.match_closer(Closer::Keyword(Keyword::EndIf)) {
            self.match_closer(Closer::EndOf(Keyword::If));
        }

        Ok(Statement::new(
            StatementKind::If {
                condition,
                then_branch,
                elseif_branches,
                else_branch,
            },
            self.span_from(start),
        ))
    }

    /// `If c Then a : b Else c : d [EndIf]`, all on one line.
    fn parse_single_line_if(&mut self, condition: Expr, start: usize) -> Statement {
        let then_branch = self.parse_inline_statements();
        let else_branch = if self.match_keyword(Keyword::Else) {
            Some(self.parse_inline_statements())
        } else {
            None
        };
        self.match_keyword(Keyword::EndIf);

        Statement::new(
            StatementKind::If {
                condition,
                then_branch,
                elseif_branches: Vec::new(),
                else_branch,
            },
            self.span_from(start),
        )
    }

    /// Parses `:`-separated statements up to `Else`, `EndIf` or end of line.
    fn parse_inline_statements(&mut self) -> Vec<Statement> {
        let mut body = Vec::new();
        self.block_depth += 1;

        loop {
            while self.match_token(TokenKind::Colon) {}
            if self.at_inline_end() {
                break;
            }

            let before = self.current;
            match self.parse_statement() {
                Ok(stmt) => {
                    body.push(stmt);
                    if !self.check(TokenKind::Colon) && !self.at_inline_end() {
                        self.error_expected("end of statement");
                        self.skip_inline();
                    }
                }
                Err(()) => self.skip_inline(),
            }

            if self.current == before {
                self.advance();
            }
        }

        self.block_depth -= 1;
        body
    }

    fn at_inline_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Eof)
            || self.check_keyword(Keyword::Else)
            || self.check_keyword(Keyword::EndIf)
    }

    /// Skips to the next `:` or the end of the inline body.
    fn skip_inline(&mut self) {
        while !self.check(TokenKind::Colon) && !self.at_inline_end() {
            self.advance();
        }
    }

    // ==================== Loops ====================

    /// Parses `While condition ... Wend`.
    pub(super) fn parse_while(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();

        let condition = self.parse_expression();
        let opened = self.span_from(start);
        let wend = Closer::Keyword(Keyword::Wend);
        let body = self.parse_block(&[wend], "While", opened);
        self.match_closer(wend);

        Ok(Statement::new(
            StatementKind::While { condition, body },
            self.span_from(start),
        ))
    }

    /// Parses `Repeat ... Until condition` or `Repeat ... Forever`.
    pub(super) fn parse_repeat(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();

        let opened = self.span_from(start);
        let body = self.parse_block(
            &[
                Closer::Keyword(Keyword::Until),
                Closer::Keyword(Keyword::Forever),
            ],
            "Repeat",
            opened,
        );

        let until = if self.match_keyword(Keyword::Until) {
            Some(self.parse_expression())
        } else {
            self.match_keyword(Keyword::Forever);
            None
        };

        Ok(Statement::new(
            StatementKind::Repeat { body, until },
            self.span_from(start),
        ))
    }

    /// Parses `For i = a To b [Step s] ... Next` and
    /// `For p.T = Each T ... Next`.
    pub(super) fn parse_for(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();

        let variable = self.expect_identifier("loop variable")?.text.clone();
        let annotation = self.parse_annotation();
        self.expect(TokenKind::Equals, "`=`")?;

        if self.match_keyword(Keyword::Each) {
            let type_name = self.parse_type_name().ok_or(())?;
            if annotation.as_deref().is_some_and(|a| !a.eq_ignore_ascii_case(&type_name)) {
                self.errors.push(ParseError::syntax(
                    format!("loop variable is declared as a different type than `{}`", type_name),
                    self.span_from(start),
                ));
            }
            if self.symbols.lookup(&variable).is_none() {
                self.symbols
                    .define(declared_symbol(&variable, Some(&type_name), None));
            }

            let body = self.parse_next_body("For Each", start);
            return Ok(Statement::new(
                StatementKind::ForEach {
                    variable,
                    type_name,
                    body,
                },
                self.span_from(start),
            ));
        }

        if self.symbols.lookup(&variable).is_none() {
            self.symbols
                .define(declared_symbol(&variable, None, Some(ValueType::Number)));
        }

        let from = self.parse_expression();
        self.expect_keyword(Keyword::To)?;
        let to = self.parse_expression();
        let step = if self.match_keyword(Keyword::Step) {
            Some(self.parse_expression())
        } else {
            None
        };

        let body = self.parse_next_body("For", start);
        Ok(Statement::new(
            StatementKind::For {
                variable,
                start: from,
                end: to,
                step,
                body,
            },
            self.span_from(start),
        ))
    }

    /// Body of a `For` loop, through `Next [var]`.
    fn parse_next_body(&mut self, construct: &str, start: usize) -> Vec<Statement> {
        let opened = self.span_from(start);
        let next = Closer::Keyword(Keyword::Next);
        let body = self.parse_block(&[next], construct, opened);
        if self.match_closer(next) && self.check(TokenKind::Identifier) {
            self.advance();
        }
        body
    }

    // ==================== Select Statement ====================

    /// Parses `Select subject ... End Select`.
    pub(super) fn parse_select(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();

        let subject = self.parse_expression();
        let opened = self.span_from(start);

        let mut cases = Vec::new();
        let mut default = None;

        loop {
            self.skip_newlines();

            if self.match_closer(Closer::EndOf(Keyword::Select)) {
                break;
            }

            if self.check_keyword(Keyword::Case) {
                let case_start = self.current;
                self.advance();
                let mut values = vec![self.parse_expression()];
                while self.match_token(TokenKind::Comma) {
                    values.push(self.parse_expression());
                }
                let body = self.parse_block(&CASE_CLOSERS, "Select", opened);
                cases.push(CaseClause {
                    values,
                    body,
                    span: self.span_from(case_start),
                });
                continue;
            }

            if self.match_keyword(Keyword::Default) {
                if default.is_some() {
                    self.errors.push(ParseError::syntax(
                        "`Select` has more than one `Default`",
                        self.span_from(self.current.saturating_sub(1)),
                    ));
                }
                default = Some(self.parse_block(&CASE_CLOSERS, "Select", opened));
                continue;
            }

            if self.is_at_end() || self.at_any_closer() {
                // a case body that ran off the end has reported it already
                let reported = self.errors.last().is_some_and(|e| {
                    matches!(e, ParseError::MissingTerminator { span, .. } if *span == opened)
                });
                if !reported {
                    self.errors.push(ParseError::missing(
                        "Select",
                        Closer::EndOf(Keyword::Select).describe(),
                        opened,
                    ));
                }
                break;
            }

            let before = self.current;
            self.error_expected("`Case`, `Default` or `End Select`");
            self.synchronize();
            if self.current == before {
                self.advance();
            }
        }

        Ok(Statement::new(
            StatementKind::Select {
                subject,
                cases,
                default,
            },
            self.span_from(start),
        ))
    }
}
