//! Statement parsing for the parser.
//!
//! This module contains the main statement dispatcher, the generic block
//! loop, and parsing for simple statements: assignments, calls,
//! declarations, jumps, the DATA pool and object-list statements.
//!
//! Control flow and procedure definitions are handled in their own modules.

use crate::ast::{
    ArrayDecl, DataValue, DeclScope, Expr, ExprKind, InsertPosition, Span, Statement,
    StatementKind, VarDecl,
};
use crate::lexer::{Keyword, TokenKind};
use crate::semantic::{SemanticError, Symbol, ValueType, type_from_suffix};

use super::expressions::parse_hex;
use super::{Closer, ParseError, Parser};

impl<'a> Parser<'a> {
    // ==================== Statement Dispatcher ====================

    /// Parses a single statement.
    pub(super) fn parse_statement(&mut self) -> Result<Statement, ()> {
        let Some(token) = self.peek() else {
            self.error_expected("statement");
            return Err(());
        };

        match token.kind {
            TokenKind::Identifier => self.parse_identifier_statement(),
            TokenKind::Command => self.parse_command_statement(),
            TokenKind::Label => {
                self.advance();
                Ok(Statement::new(
                    StatementKind::Label(token.text.clone()),
                    token.location(),
                ))
            }
            TokenKind::Keyword(keyword) => self.parse_keyword_statement(keyword),
            _ => {
                self.errors.push(ParseError::InvalidStatement {
                    span: token.location(),
                    message: format!("unexpected {}", token.describe()),
                });
                Err(())
            }
        }
    }

    fn parse_keyword_statement(&mut self, keyword: Keyword) -> Result<Statement, ()> {
        match keyword {
            // Control flow (delegated to control_flow.rs)
            Keyword::If => self.parse_if(),
            Keyword::While => self.parse_while(),
            Keyword::Repeat => self.parse_repeat(),
            Keyword::For => self.parse_for(),
            Keyword::Select => self.parse_select(),

            // Definitions (delegated to procedures.rs)
            Keyword::Function => self.parse_function(),
            Keyword::Type => self.parse_type_definition(),

            // Declarations
            Keyword::Local => self.parse_declaration(DeclScope::Local),
            Keyword::Global => self.parse_declaration(DeclScope::Global),
            Keyword::Dim => self.parse_dim(),
            Keyword::Const => self.parse_const(),

            // Jumps
            Keyword::Return => self.parse_return(),
            Keyword::Exit => self.simple(StatementKind::Exit),
            Keyword::End => self.parse_end(),
            Keyword::Goto | Keyword::Gosub => self.parse_jump(keyword),

            // DATA pool
            Keyword::Data => self.parse_data(),
            Keyword::Read => self.parse_read(),
            Keyword::Restore => self.parse_restore(),

            // Object lists
            Keyword::Delete => self.parse_delete(),
            Keyword::Insert => self.parse_insert(),

            _ => {
                let span = self.current_span();
                self.errors.push(ParseError::InvalidStatement {
                    span,
                    message: format!("unexpected `{}`", keyword),
                });
                Err(())
            }
        }
    }

    /// Consumes a one-token statement.
    fn simple(&mut self, kind: StatementKind) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();
        Ok(Statement::new(kind, self.span_from(start)))
    }

    // ==================== Blocks ====================

    /// Parses statements until one of `closers` (left unconsumed).
    ///
    /// End of input or a closer belonging to another construct ends the block
    /// early and is reported as a missing terminator for `construct`.
    pub(super) fn parse_block(
        &mut self,
        closers: &[Closer],
        construct: &str,
        opened: Span,
    ) -> Vec<Statement> {
        let mut body = Vec::new();
        self.block_depth += 1;

        loop {
            self.skip_newlines();

            if closers.iter().any(|c| self.at_closer(*c)) {
                break;
            }
            if self.is_at_end() || self.at_any_closer() {
                let terminator = closers.first().map(Closer::describe).unwrap_or_default();
                self.errors
                    .push(ParseError::missing(construct, terminator, opened));
                break;
            }

            let before = self.current;
            match self.parse_statement() {
                Ok(stmt) => {
                    body.push(stmt);
                    self.finish_statement();
                }
                Err(()) => self.synchronize(),
            }

            if self.current == before {
                self.advance();
            }
        }

        self.block_depth -= 1;
        body
    }

    // ==================== Assignments and Calls ====================

    /// Parses a statement that starts with an identifier: an assignment or a
    /// user function call.
    fn parse_identifier_statement(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        let name = self.peek().map(|t| t.text.clone()).unwrap_or_default();
        let next = self.peek_kind_ahead(1);

        if next == TokenKind::LeftParen && !self.symbols.is_array(&name) {
            // `name(...)` is either a call or an assignment to an undeclared array
            let checkpoint = self.errors.len();
            self.advance();
            self.parse_paren_args();
            let is_assignment = self.check(TokenKind::Equals);
            self.current = start;
            self.errors.truncate(checkpoint);

            if !is_assignment {
                self.advance();
                let args = self.parse_statement_args();
                let call = self.typed(Expr::new(
                    ExprKind::Call { name, args },
                    self.span_from(start),
                ));
                return Ok(Statement::new(
                    StatementKind::Expression(call),
                    self.span_from(start),
                ));
            }
        }

        let assigns = matches!(
            next,
            TokenKind::Equals | TokenKind::Label | TokenKind::Backslash | TokenKind::LeftParen
        );
        if assigns {
            return self.parse_assignment();
        }

        if self.symbols.is_function(&name) {
            self.advance();
            let args = self.parse_statement_args();
            let call = self.typed(Expr::new(ExprKind::Call { name, args }, self.span_from(start)));
            return Ok(Statement::new(
                StatementKind::Expression(call),
                self.span_from(start),
            ));
        }

        self.advance();
        self.error_expected(&format!("`=` after `{}`", name));
        Err(())
    }

    fn parse_assignment(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        let target = self.parse_target()?;
        self.expect(TokenKind::Equals, "`=`")?;
        let value = self.parse_expression();
        let target = self.declare_target(target, value.ty);
        Ok(Statement::new(
            StatementKind::Assignment { target, value },
            self.span_from(start),
        ))
    }

    /// Parses an assignable expression: `x`, `p.T`, `a(i)`, `p\f\g`.
    pub(super) fn parse_target(&mut self) -> Result<Expr, ()> {
        let start = self.current;
        let token = self.expect_identifier("variable")?;
        let name = token.text.clone();

        let kind = if let Some(type_name) = self.parse_annotation() {
            ExprKind::Variable {
                name,
                type_name: Some(type_name),
            }
        } else if self.check(TokenKind::LeftParen) {
            let indices = self.parse_paren_args();
            if !self.symbols.is_array(&name) {
                self.errors.push(
                    SemanticError::NotAnArray {
                        name: name.clone(),
                        span: self.span_from(start),
                    }
                    .into(),
                );
            }
            ExprKind::ArrayAccess { name, indices }
        } else {
            ExprKind::Variable {
                name,
                type_name: None,
            }
        };

        let expr = self.typed(Expr::new(kind, self.span_from(start)));
        Ok(self.parse_postfix(expr, start))
    }

    /// Implicitly declares a plain variable target on first assignment.
    pub(super) fn declare_target(&mut self, target: Expr, value_type: ValueType) -> Expr {
        if let ExprKind::Variable { name, type_name } = &target.kind {
            let known = self.symbols.lookup(name).is_some();
            if !known || (type_name.is_some() && self.symbols.lookup_current(name).is_none()) {
                let symbol = declared_symbol(name, type_name.as_deref(), Some(value_type));
                self.symbols.define(symbol);
            }
            return self.typed(target);
        }
        target
    }

    /// Parses a builtin command statement: `Cls`, `Plot x, y`, `Color(r, g, b)`.
    fn parse_command_statement(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        let name = self.advance().map(|t| t.text.clone()).unwrap_or_default();
        let args = self.parse_statement_args();
        let expr = self.command_expr(name, args, start);
        Ok(Statement::new(
            StatementKind::Expression(expr),
            self.span_from(start),
        ))
    }

    /// Parses statement-call arguments, with or without surrounding parens.
    ///
    /// `Cmd (a + b) * 2, c` starts with a parenthesized expression, so a
    /// paren list is only accepted when the statement ends right after it.
    fn parse_statement_args(&mut self) -> Vec<Expr> {
        if self.check(TokenKind::LeftParen) {
            let checkpoint = (self.current, self.errors.len());
            let args = self.parse_paren_args();
            if self.at_statement_end() || self.check_keyword(Keyword::Else) {
                return args;
            }
            self.current = checkpoint.0;
            self.errors.truncate(checkpoint.1);
        }
        self.parse_bare_args()
    }

    // ==================== Declarations ====================

    /// Parses `Local`/`Global` lists.
    fn parse_declaration(&mut self, scope: DeclScope) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();

        let mut vars = Vec::new();
        loop {
            let var_start = self.current;
            let token = self.expect_identifier("variable name")?;
            let type_name = self.parse_annotation();
            let value = if self.match_token(TokenKind::Equals) {
                Some(self.parse_expression())
            } else {
                None
            };

            let symbol = declared_symbol(
                &token.text,
                type_name.as_deref(),
                value.as_ref().map(|v| v.ty),
            );
            match scope {
                DeclScope::Local => self.symbols.define(symbol),
                DeclScope::Global => self.symbols.define_global(symbol),
            };

            vars.push(VarDecl {
                name: token.text.clone(),
                type_name,
                value,
                span: self.span_from(var_start),
            });

            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        Ok(Statement::new(
            StatementKind::Declaration { scope, vars },
            self.span_from(start),
        ))
    }

    /// Parses `Dim a(10), b$(2, 2)`.
    ///
    /// Arrays are always global.
    fn parse_dim(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();

        let mut arrays = Vec::new();
        loop {
            let array_start = self.current;
            let token = self.expect_identifier("array name")?;
            let type_name = self.parse_annotation();
            if !self.check(TokenKind::LeftParen) {
                self.error_expected("`(` and array dimensions");
                return Err(());
            }
            let dimensions = self.parse_paren_args();
            if dimensions.is_empty() {
                self.errors.push(ParseError::syntax(
                    "an array needs at least one dimension",
                    self.span_from(array_start),
                ));
            }

            let mut symbol = Symbol::array(
                &token.text,
                type_from_suffix(&token.text).unwrap_or(ValueType::Number),
                dimensions.len(),
            );
            if let Some(type_name) = &type_name {
                symbol = symbol.with_type_name(type_name);
            }
            self.symbols.define_global(symbol);

            arrays.push(ArrayDecl {
                name: token.text.clone(),
                type_name,
                dimensions,
                span: self.span_from(array_start),
            });

            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        Ok(Statement::new(
            StatementKind::Dim { arrays },
            self.span_from(start),
        ))
    }

    /// Parses `Const NAME = value`.
    fn parse_const(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();
        let name = self.expect_identifier("constant name")?.text.clone();
        self.expect(TokenKind::Equals, "`=`")?;
        let value = self.parse_expression();
        self.symbols
            .define(declared_symbol(&name, None, Some(value.ty)));
        Ok(Statement::new(
            StatementKind::Const { name, value },
            self.span_from(start),
        ))
    }

    // ==================== Jumps ====================

    fn parse_return(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();
        let value = if self.at_statement_end() || self.check_keyword(Keyword::Else) {
            None
        } else {
            Some(self.parse_expression())
        };
        Ok(Statement::new(
            StatementKind::Return(value),
            self.span_from(start),
        ))
    }

    /// Parses `End`; `End If` and friends out of place are errors.
    fn parse_end(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();
        if let TokenKind::Keyword(
            keyword @ (Keyword::If | Keyword::Function | Keyword::Select | Keyword::Type),
        ) = self.peek_kind()
        {
            self.advance();
            self.errors.push(ParseError::InvalidStatement {
                span: self.span_from(start),
                message: format!("`End {}` without a matching `{}`", keyword, keyword),
            });
            return Err(());
        }
        Ok(Statement::new(StatementKind::End, self.span_from(start)))
    }

    /// Parses `Goto label` / `Gosub label`.
    fn parse_jump(&mut self, keyword: Keyword) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();
        let target = self.parse_label_name()?;
        let kind = if keyword == Keyword::Goto {
            StatementKind::Goto(target)
        } else {
            StatementKind::Gosub(target)
        };
        Ok(Statement::new(kind, self.span_from(start)))
    }

    /// A label reference, written `name` or `.name`.
    fn parse_label_name(&mut self) -> Result<String, ()> {
        match self.peek_kind() {
            TokenKind::Identifier | TokenKind::Label => {
                Ok(self.advance().map(|t| t.text.clone()).unwrap_or_default())
            }
            _ => {
                self.error_expected("label name");
                Err(())
            }
        }
    }

    // ==================== DATA Pool ====================

    /// Parses `Data 1, -2.5, "three", four`.
    fn parse_data(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();

        let mut values = Vec::new();
        if !self.at_statement_end() {
            loop {
                values.push(self.parse_data_value()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        Ok(Statement::new(
            StatementKind::Data(values),
            self.span_from(start),
        ))
    }

    fn parse_data_value(&mut self) -> Result<DataValue, ()> {
        let start = self.current;
        let negative = self.match_token(TokenKind::Minus);
        let Some(token) = self.peek() else {
            self.error_expected("data value");
            return Err(());
        };

        let value = match token.kind {
            TokenKind::IntegerLiteral | TokenKind::HexLiteral => {
                let parsed = if token.kind == TokenKind::HexLiteral {
                    parse_hex(&token.text)
                } else {
                    token.text.parse::<i64>().ok()
                };
                match parsed {
                    Some(v) => DataValue::Integer(if negative { -v } else { v }),
                    None => return self.invalid_data(start, "integer out of range"),
                }
            }
            TokenKind::FloatLiteral => match token.text.parse::<f64>() {
                Ok(v) => DataValue::Float(if negative { -v } else { v }),
                Err(_) => return self.invalid_data(start, "malformed float"),
            },
            TokenKind::StringLiteral | TokenKind::Identifier | TokenKind::Command if !negative => {
                DataValue::String(token.text.clone())
            }
            TokenKind::Keyword(Keyword::True) if !negative => DataValue::Integer(1),
            TokenKind::Keyword(Keyword::False) if !negative => DataValue::Integer(0),
            _ => {
                self.error_expected("number or string in `Data`");
                return Err(());
            }
        };
        self.advance();
        Ok(value)
    }

    fn invalid_data(&mut self, start: usize, message: &str) -> Result<DataValue, ()> {
        self.advance();
        self.errors.push(ParseError::InvalidNumber {
            span: self.span_from(start),
            message: message.to_string(),
        });
        Err(())
    }

    /// Parses `Read a, b$, grid(i)`.
    fn parse_read(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();

        let mut targets = Vec::new();
        loop {
            let target = self.parse_target()?;
            let ty = match &target.kind {
                ExprKind::Variable { name, .. } => {
                    type_from_suffix(name).unwrap_or(ValueType::Number)
                }
                _ => target.ty,
            };
            targets.push(self.declare_target(target, ty));
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        Ok(Statement::new(
            StatementKind::Read(targets),
            self.span_from(start),
        ))
    }

    /// Parses `Restore [label]`.
    fn parse_restore(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();
        let label = if self.at_statement_end() {
            None
        } else {
            Some(self.parse_label_name()?)
        };
        Ok(Statement::new(
            StatementKind::Restore(label),
            self.span_from(start),
        ))
    }

    // ==================== Object Lists ====================

    /// Parses `Delete obj` or `Delete Each Type`.
    fn parse_delete(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();
        let kind = if self.match_keyword(Keyword::Each) {
            let Some(type_name) = self.parse_type_name() else {
                return Err(());
            };
            StatementKind::DeleteEach(type_name)
        } else {
            StatementKind::Delete(self.parse_expression())
        };
        Ok(Statement::new(kind, self.span_from(start)))
    }

    /// Parses `Insert obj Before anchor` / `Insert obj After anchor`.
    fn parse_insert(&mut self) -> Result<Statement, ()> {
        let start = self.current;
        self.advance();
        let object = self.parse_expression();
        let position = if self.match_keyword(Keyword::Before) {
            InsertPosition::Before
        } else if self.match_keyword(Keyword::After) {
            InsertPosition::After
        } else {
            self.error_expected("`Before` or `After`");
            return Err(());
        };
        let anchor = self.parse_expression();
        Ok(Statement::new(
            StatementKind::Insert {
                object,
                position,
                anchor,
            },
            self.span_from(start),
        ))
    }
}

/// Builds the symbol for a declared or implicitly created variable.
///
/// An annotation makes it an object; otherwise the suffix decides, then an
/// object or string initial value, then `Number`.
pub(super) fn declared_symbol(
    name: &str,
    type_name: Option<&str>,
    value: Option<ValueType>,
) -> Symbol {
    if let Some(type_name) = type_name {
        return Symbol::variable(name, ValueType::Object).with_type_name(type_name);
    }
    let ty = type_from_suffix(name).unwrap_or(match value {
        Some(ValueType::Object) => ValueType::Object,
        Some(ValueType::String) => ValueType::String,
        _ => ValueType::Number,
    });
    Symbol::variable(name, ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn parse_ok(source: &str) -> Vec<Statement> {
        let tokens = lex(source);
        let (program, errors) = parse(&tokens);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        program.statements
    }

    #[test]
    fn test_command_statement_forms() {
        let statements = parse_ok("Cls\nColor 255, 0, 0\nColor(0, 255, 0)\nPlot (1 + 2) * 3, 4");
        let arg_counts: Vec<_> = statements
            .iter()
            .map(|s| match &s.kind {
                StatementKind::Expression(Expr {
                    kind: ExprKind::Command { args, .. },
                    ..
                }) => args.len(),
                other => panic!("expected command, got {other:?}"),
            })
            .collect();
        assert_eq!(arg_counts, vec![0, 3, 3, 2]);
    }

    #[test]
    fn test_user_call_statement_forms() {
        let statements = parse_ok(
            "Function Spawn(x, y)\nEnd Function\nSpawn 1, 2\nSpawn(3, 4)\n",
        );
        for stmt in &statements[1..] {
            assert!(matches!(
                &stmt.kind,
                StatementKind::Expression(Expr {
                    kind: ExprKind::Call { args, .. },
                    ..
                }) if args.len() == 2
            ));
        }
    }

    #[test]
    fn test_assignment_to_undeclared_array() {
        let tokens = lex("scores(3) = 10");
        let (program, errors) = parse(&tokens);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ParseError::Semantic(SemanticError::NotAnArray { name, .. }) if name == "scores"
        ));
        assert!(matches!(
            program.statements[0].kind,
            StatementKind::Assignment { .. }
        ));
    }

    #[test]
    fn test_declarations() {
        let statements = parse_ok("Global lives = 3, name$ = \"x\"\nLocal p.Player\nType Player\nEnd Type");
        let StatementKind::Declaration { scope, vars } = &statements[0].kind else {
            panic!("expected declaration");
        };
        assert_eq!(*scope, DeclScope::Global);
        assert_eq!(vars.len(), 2);
        let StatementKind::Declaration { vars, .. } = &statements[1].kind else {
            panic!("expected declaration");
        };
        assert_eq!(vars[0].type_name.as_deref(), Some("Player"));
    }

    #[test]
    fn test_dim_registers_array() {
        let tokens = lex("Dim grid(10, 10), names$(5)\ngrid(1, 2) = 3");
        let mut parser = super::Parser::new(&tokens);
        parser.parse();
        assert!(parser.errors().is_empty());
        assert!(parser.symbols().is_array("grid"));
        assert!(parser.symbols().is_array("names"));
    }

    #[test]
    fn test_data_values() {
        let statements = parse_ok("Data 1, -2, 3.5, \"four\", five, $10");
        let StatementKind::Data(values) = &statements[0].kind else {
            panic!("expected data");
        };
        assert_eq!(
            values,
            &vec![
                DataValue::Integer(1),
                DataValue::Integer(-2),
                DataValue::Float(3.5),
                DataValue::String("four".into()),
                DataValue::String("five".into()),
                DataValue::Integer(16),
            ]
        );
    }

    #[test]
    fn test_read_and_restore() {
        let statements = parse_ok("Read a, b$\nRestore levels\nRestore .levels\nRestore");
        assert!(matches!(&statements[0].kind, StatementKind::Read(t) if t.len() == 2));
        assert!(matches!(&statements[1].kind, StatementKind::Restore(Some(l)) if l == "levels"));
        assert!(matches!(&statements[2].kind, StatementKind::Restore(Some(l)) if l == "levels"));
        assert!(matches!(statements[3].kind, StatementKind::Restore(None)));
    }

    #[test]
    fn test_labels_and_jumps() {
        let statements = parse_ok(".top\nGoto top\nGosub .top");
        assert!(matches!(&statements[0].kind, StatementKind::Label(l) if l == "top"));
        assert!(matches!(&statements[1].kind, StatementKind::Goto(l) if l == "top"));
        assert!(matches!(&statements[2].kind, StatementKind::Gosub(l) if l == "top"));
    }

    #[test]
    fn test_object_list_statements() {
        let statements = parse_ok(
            "Type Node\nField v\nEnd Type\na = New Node\nb = New Node\nInsert b Before a\nDelete a\nDelete Each Node",
        );
        assert!(matches!(
            statements[3].kind,
            StatementKind::Insert {
                position: InsertPosition::Before,
                ..
            }
        ));
        assert!(matches!(statements[4].kind, StatementKind::Delete(_)));
        assert!(matches!(&statements[5].kind, StatementKind::DeleteEach(t) if t == "Node"));
    }

    #[test]
    fn test_stray_end_if_is_reported() {
        let tokens = lex("End If\nCls");
        let (program, errors) = parse(&tokens);
        assert_eq!(errors.len(), 1);
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn test_unknown_name_statement() {
        let tokens = lex("mystery\nCls");
        let (program, errors) = parse(&tokens);
        assert_eq!(errors.len(), 1);
        assert_eq!(program.statements.len(), 1);
    }
}
