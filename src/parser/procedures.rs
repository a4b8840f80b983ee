//! Procedure and type definition parsing.
//!
//! This module handles parsing of:
//! - `Function` definitions and their parameter lists
//! - `Type` (user-defined type) definitions
//! - The declaration pre-scan that makes functions and types visible before
//!   their definitions

use crate::ast::{FieldDecl, Parameter, Statement, StatementKind};
use crate::lexer::{Keyword, TokenKind};
use crate::semantic::{SemanticError, Symbol, ValueType, type_from_suffix};

use super::statements::declared_symbol;
use super::{Closer, ParseError, Parser};

impl<'a> Parser<'a> {
    // ==================== Pre-scan ====================

    /// Registers every `Function name` and `Type name` in the global scope.
    ///
    /// Calls and `New T` may appear above the definition they refer to.
    pub(super) fn prescan_declarations(&mut self) {
        let mut functions = 0;
        let mut types = 0;

        for (i, token) in self.tokens.iter().enumerate() {
            let Some(name) = self.tokens.get(i + 1).filter(|t| t.kind == TokenKind::Identifier)
            else {
                continue;
            };
            let after_end = i > 0 && self.tokens[i - 1].kind.is_keyword(Keyword::End);
            if after_end {
                continue;
            }

            match token.kind {
                TokenKind::Keyword(Keyword::Function) => {
                    let returns_object = self
                        .tokens
                        .get(i + 2)
                        .is_some_and(|t| t.kind == TokenKind::Label && t.span.start == name.span.end);
                    let returns = if returns_object {
                        ValueType::Object
                    } else {
                        type_from_suffix(&name.text).unwrap_or(ValueType::Number)
                    };
                    self.symbols
                        .define_global(Symbol::function(&name.text, returns, Vec::new()));
                    functions += 1;
                }
                TokenKind::Keyword(Keyword::Type) => {
                    self.symbols
                        .define_global(Symbol::user_type(&name.text, Vec::new()));
                    types += 1;
                }
                _ => {}
            }
        }

        log::debug!("pre-scan found {} functions and {} types", functions, types);
    }

    // ==================== Function Definition ====================

    /// Parses `Function name[.Type](params) ... End Function`.
    pub(super) fn parse_function(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();

        let name = match self.peek_kind() {
            TokenKind::Identifier => self.advance().map(|t| t.text.clone()).unwrap_or_default(),
            TokenKind::Command => {
                let token = self.advance().map(|t| (t.text.clone(), t.location()));
                let (name, span) = token.unwrap_or_default();
                self.errors
                    .push(SemanticError::BuiltinRedefinition { name: name.clone(), span }.into());
                name
            }
            _ => {
                self.error_expected("function name");
                return Err(());
            }
        };
        let return_type = self.parse_annotation();

        if self.block_depth > 0 {
            let message = if self.symbols.is_global_scope() {
                "functions must be declared at the top level"
            } else {
                "functions cannot be nested"
            };
            self.errors.push(ParseError::InvalidStatement {
                span: self.span_from(start),
                message: message.to_string(),
            });
        }

        let params = self.parse_parameter_list();

        let returns = if return_type.is_some() {
            ValueType::Object
        } else {
            type_from_suffix(&name).unwrap_or(ValueType::Number)
        };
        let param_names = params.iter().map(|p| p.name.clone()).collect();
        let mut symbol = Symbol::function(&name, returns, param_names);
        if let Some(type_name) = &return_type {
            symbol = symbol.with_type_name(type_name);
        }
        self.symbols.define_global(symbol);

        self.symbols.enter_scope();
        for param in &params {
            let value = param.default.as_ref().map(|d| d.ty);
            self.symbols
                .define(declared_symbol(&param.name, param.type_name.as_deref(), value));
        }

        let end_function = Closer::EndOf(Keyword::Function);
        let body = self.parse_block(&[end_function], "Function", self.span_from(start));
        self.symbols.exit_scope();
        self.match_closer(end_function);

        Ok(Statement::new(
            StatementKind::FunctionDeclaration {
                name,
                return_type,
                params,
                body,
            },
            self.span_from(start),
        ))
    }

    /// Parses `(a, b.T, c = 5)`.
    ///
    /// A malformed list is reported and the rest of the line skipped, so the
    /// body is still parsed as part of the function.
    fn parse_parameter_list(&mut self) -> Vec<Parameter> {
        let mut params = Vec::new();
        if self.expect(TokenKind::LeftParen, "`(`").is_err() {
            self.skip_to_line_end();
            return params;
        }
        if self.match_token(TokenKind::RightParen) {
            return params;
        }

        loop {
            let param_start = self.current;
            let Ok(token) = self.expect_identifier("parameter name") else {
                self.skip_to_line_end();
                return params;
            };
            let type_name = self.parse_annotation();
            let default = if self.match_token(TokenKind::Equals) {
                Some(self.parse_expression())
            } else {
                None
            };
            params.push(Parameter {
                name: token.text.clone(),
                type_name,
                default,
                span: self.span_from(param_start),
            });
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        if self.expect(TokenKind::RightParen, "`)`").is_err() {
            self.skip_to_line_end();
        }
        params
    }

    fn skip_to_line_end(&mut self) {
        while !self.check(TokenKind::Newline) && !self.is_at_end() {
            self.advance();
        }
    }

    // ==================== Type Definition ====================

    /// Parses `Type Name / Field a, b.T / End Type`.
    pub(super) fn parse_type_definition(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();
        let name = self.expect_identifier("type name")?.text.clone();
        let opened = self.span_from(start);
        if self.block_depth > 0 {
            self.errors.push(ParseError::InvalidStatement {
                span: opened,
                message: "types must be declared at the top level".to_string(),
            });
        }
        let end_type = Closer::EndOf(Keyword::Type);

        let mut fields = Vec::new();
        loop {
            self.skip_newlines();

            if self.match_closer(end_type) {
                break;
            }

            if self.match_keyword(Keyword::Field) {
                self.parse_field_list(&mut fields);
                self.finish_statement();
                continue;
            }

            if self.is_at_end() || self.at_any_closer() {
                self.errors
                    .push(ParseError::missing("Type", end_type.describe(), opened));
                break;
            }

            let before = self.current;
            self.error_expected("`Field` or `End Type`");
            self.synchronize();
            if self.current == before {
                self.advance();
            }
        }

        let field_names = fields.iter().map(|f: &FieldDecl| f.name.clone()).collect();
        self.symbols
            .define_global(Symbol::user_type(&name, field_names));

        Ok(Statement::new(
            StatementKind::TypeDeclaration { name, fields },
            self.span_from(start),
        ))
    }

    fn parse_field_list(&mut self, fields: &mut Vec<FieldDecl>) {
        loop {
            let field_start = self.current;
            let Ok(token) = self.expect_identifier("field name") else {
                return;
            };
            let type_name = self.parse_annotation();
            fields.push(FieldDecl {
                name: token.text.clone(),
                type_name,
                span: self.span_from(field_start),
            });
            if !self.match_token(TokenKind::Comma) {
                return;
            }
        }
    }
}
