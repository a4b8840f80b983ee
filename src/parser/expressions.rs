//! Expression parsing using Pratt (precedence climbing) parsing.
//!
//! Pratt parsing handles:
//! - Binary operators with correct precedence and associativity
//! - Unary operators (negation, `Not`)
//! - Parenthesized expressions
//! - Function calls, command calls and array access
//! - `\field` chains
//!
//! # Precedence Levels (lowest to highest)
//!
//! 1. `Or`, `Xor`
//! 2. `And`
//! 3. Comparison (`=`, `<>`, `<`, `>`, `<=`, `>=`)
//! 4. Shifts (`Shl`, `Shr`, `Sar`)
//! 5. Addition (`+`, `-`)
//! 6. Multiplication (`*`, `/`, `Mod`)
//! 7. Power (`^`)
//! 8. Unary (`-`, `+`)
//!
//! `Not` takes a comparison as its operand, so `Not a = b` is `Not (a = b)`.
//!
//! Expression parsing never fails outright: a malformed expression is
//! recorded and replaced by an [`ExprKind::Error`] node. Every node is given
//! its inferred type as it is built.

use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::lexer::{Keyword, TokenKind};
use crate::semantic::{SemanticError, check_arguments, infer_type};

use super::{ParseError, Parser, Precedence};

impl<'a> Parser<'a> {
    // ==================== Expression Parsing (Pratt Parser) ====================

    /// Parses a full expression.
    pub(super) fn parse_expression(&mut self) -> Expr {
        self.parse_precedence(Precedence::Or)
    }

    /// Parses an expression whose operators bind at least as tight as `min_prec`.
    pub(super) fn parse_precedence(&mut self, min_prec: Precedence) -> Expr {
        let start = self.current;
        let mut left = self.parse_prefix();

        while let Some((op, prec)) = binary_op(self.peek_kind()) {
            if prec < min_prec {
                break;
            }
            self.advance();

            let next = if op.is_right_associative() {
                prec
            } else {
                prec.next()
            };
            let right = self.parse_precedence(next);

            left = self.typed(Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                self.span_from(start),
            ));
        }

        left
    }

    /// Parses a prefix expression (literal, name, unary op, or grouped).
    pub(super) fn parse_prefix(&mut self) -> Expr {
        let start = self.current;
        let Some(token) = self.peek() else {
            self.error_expected("expression");
            return Expr::error(self.current_span());
        };

        let kind = match token.kind {
            TokenKind::IntegerLiteral => {
                self.advance();
                match token.text.parse::<i64>() {
                    Ok(value) => ExprKind::IntegerLiteral(value),
                    Err(err) => self.invalid_number(err.to_string(), start),
                }
            }
            TokenKind::FloatLiteral => {
                self.advance();
                match token.text.parse::<f64>() {
                    Ok(value) => ExprKind::FloatLiteral(value),
                    Err(err) => self.invalid_number(err.to_string(), start),
                }
            }
            TokenKind::HexLiteral => {
                self.advance();
                match parse_hex(&token.text) {
                    Some(value) => ExprKind::IntegerLiteral(value),
                    None => self.invalid_number("hex literal out of range".to_string(), start),
                }
            }
            TokenKind::StringLiteral => {
                self.advance();
                ExprKind::StringLiteral(token.text.clone())
            }
            TokenKind::Identifier => return self.parse_identifier_expr(),
            TokenKind::Command => return self.parse_command_expr(),
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expression();
                let _ = self.expect(TokenKind::RightParen, "`)`");
                ExprKind::Grouped(Box::new(inner))
            }
            TokenKind::Minus | TokenKind::Plus => {
                self.advance();
                let op = if token.kind == TokenKind::Minus {
                    UnaryOp::Negate
                } else {
                    UnaryOp::Plus
                };
                let operand = self.parse_precedence(Precedence::Power);
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                }
            }
            TokenKind::Keyword(keyword) => match self.parse_keyword_expr(keyword) {
                Some(kind) => kind,
                None => return self.invalid_expression(start),
            },
            _ => return self.invalid_expression(start),
        };

        let expr = self.typed(Expr::new(kind, self.span_from(start)));
        self.parse_postfix(expr, start)
    }

    /// Parses expressions introduced by a keyword.
    fn parse_keyword_expr(&mut self, keyword: Keyword) -> Option<ExprKind> {
        let kind = match keyword {
            Keyword::True | Keyword::False => {
                self.advance();
                ExprKind::BooleanLiteral(keyword == Keyword::True)
            }
            Keyword::Null => {
                self.advance();
                ExprKind::Null
            }
            Keyword::Not => {
                self.advance();
                let operand = self.parse_precedence(Precedence::Comparison);
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                }
            }
            Keyword::New | Keyword::First | Keyword::Last => {
                self.advance();
                let name = self.parse_type_name()?;
                match keyword {
                    Keyword::New => ExprKind::New(name),
                    Keyword::First => ExprKind::First(name),
                    _ => ExprKind::Last(name),
                }
            }
            Keyword::After | Keyword::Before => {
                self.advance();
                let operand = Box::new(self.parse_prefix());
                if keyword == Keyword::After {
                    ExprKind::After(operand)
                } else {
                    ExprKind::Before(operand)
                }
            }
            _ => return None,
        };
        Some(kind)
    }

    /// Parses `name`, `name.Type`, `name(args)`, with any `\field` chain.
    pub(super) fn parse_identifier_expr(&mut self) -> Expr {
        let start = self.current;
        let Ok(token) = self.expect_identifier("identifier") else {
            return Expr::error(self.current_span());
        };
        let name = token.text.clone();

        let kind = if let Some(type_name) = self.parse_annotation() {
            ExprKind::Variable {
                name,
                type_name: Some(type_name),
            }
        } else if self.check(TokenKind::LeftParen) {
            let args = self.parse_paren_args();
            if self.symbols.is_array(&name) {
                ExprKind::ArrayAccess {
                    name,
                    indices: args,
                }
            } else {
                ExprKind::Call { name, args }
            }
        } else {
            ExprKind::Variable {
                name,
                type_name: None,
            }
        };

        let expr = self.typed(Expr::new(kind, self.span_from(start)));
        self.parse_postfix(expr, start)
    }

    /// Parses a builtin command used as a value: `MouseX()`, `Rnd(1, 6)`, `Pi`.
    fn parse_command_expr(&mut self) -> Expr {
        let start = self.current;
        let name = self.advance().map(|t| t.text.clone()).unwrap_or_default();
        let args = if self.check(TokenKind::LeftParen) {
            self.parse_paren_args()
        } else {
            Vec::new()
        };
        let expr = self.command_expr(name, args, start);
        self.parse_postfix(expr, start)
    }

    /// Builds a typed command node and checks its arguments.
    pub(super) fn command_expr(&mut self, name: String, args: Vec<Expr>, start: usize) -> Expr {
        if let Some(descriptor) = self.commands.get(&name) {
            for error in check_arguments(&name, descriptor, &args) {
                self.errors.push(error.into());
            }
        }
        self.typed(Expr::new(ExprKind::Command { name, args }, self.span_from(start)))
    }

    /// Parses a `\field` chain after a primary expression.
    pub(super) fn parse_postfix(&mut self, mut expr: Expr, start: usize) -> Expr {
        while self.match_token(TokenKind::Backslash) {
            let field = match self.peek_kind() {
                TokenKind::Identifier | TokenKind::Command => {
                    self.advance().map(|t| t.text.clone()).unwrap_or_default()
                }
                _ => {
                    self.error_expected("field name");
                    return Expr::error(self.span_from(start));
                }
            };
            expr = self.typed(Expr::new(
                ExprKind::FieldAccess {
                    object: Box::new(expr),
                    field,
                },
                self.span_from(start),
            ));
        }
        expr
    }

    // ==================== Argument Lists ====================

    /// Parses `( expr, ... )`.
    pub(super) fn parse_paren_args(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();
        if self.expect(TokenKind::LeftParen, "`(`").is_err() {
            return args;
        }
        if self.match_token(TokenKind::RightParen) {
            return args;
        }
        loop {
            args.push(self.parse_expression());
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        let _ = self.expect(TokenKind::RightParen, "`)`");
        args
    }

    /// Parses `expr, expr, ...` up to the end of the statement.
    pub(super) fn parse_bare_args(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();
        if !can_start_expression(self.peek_kind()) {
            return args;
        }
        loop {
            args.push(self.parse_expression());
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        args
    }

    // ==================== Names ====================

    /// Consumes a `.Type` label glued to the previous token (`p.Player`).
    pub(super) fn parse_annotation(&mut self) -> Option<String> {
        let token = self.peek()?;
        let previous = self.tokens.get(self.current.checked_sub(1)?)?;
        if token.kind == TokenKind::Label && token.span.start == previous.span.end {
            self.advance();
            Some(token.text.clone())
        } else {
            None
        }
    }

    /// Parses a user type name, reporting unknown types.
    pub(super) fn parse_type_name(&mut self) -> Option<String> {
        let token = self.expect_identifier("type name").ok()?;
        if !self.symbols.is_type(&token.text) {
            self.errors.push(
                SemanticError::UnknownType {
                    name: token.text.clone(),
                    span: token.location(),
                }
                .into(),
            );
        }
        Some(token.text.clone())
    }

    // ==================== Helpers ====================

    /// Attaches the inferred type to a freshly built node.
    pub(super) fn typed(&self, expr: Expr) -> Expr {
        let ty = infer_type(&expr, &self.symbols, self.commands);
        expr.with_type(ty)
    }

    fn invalid_number(&mut self, message: String, start: usize) -> ExprKind {
        self.errors.push(ParseError::InvalidNumber {
            span: self.span_from(start),
            message,
        });
        ExprKind::Error
    }

    /// Records an invalid expression and returns an error node.
    ///
    /// The offending token is consumed unless it could end the enclosing
    /// construct.
    fn invalid_expression(&mut self, start: usize) -> Expr {
        let span = self.current_span();
        match self.peek() {
            Some(token) if token.kind != TokenKind::Eof => {
                self.errors.push(ParseError::InvalidExpression {
                    span,
                    message: format!("unexpected {}", token.describe()),
                });
            }
            _ => self.errors.push(ParseError::eof("expression", span)),
        }

        let kind = self.peek_kind();
        let keeps = kind.is_terminator()
            || matches!(kind, TokenKind::RightParen | TokenKind::Comma)
            || self.at_any_closer()
            || matches!(kind, TokenKind::Keyword(Keyword::Then | Keyword::To | Keyword::Step));
        if !keeps {
            self.advance();
        }
        Expr::error(self.span_from(start))
    }
}

/// Maps a token to its binary operator and precedence.
fn binary_op(kind: TokenKind) -> Option<(BinaryOp, Precedence)> {
    let entry = match kind {
        TokenKind::Keyword(Keyword::Or) => (BinaryOp::Or, Precedence::Or),
        TokenKind::Keyword(Keyword::Xor) => (BinaryOp::Xor, Precedence::Or),
        TokenKind::Keyword(Keyword::And) => (BinaryOp::And, Precedence::And),
        TokenKind::Equals => (BinaryOp::Equal, Precedence::Comparison),
        TokenKind::NotEquals => (BinaryOp::NotEqual, Precedence::Comparison),
        TokenKind::LessThan => (BinaryOp::LessThan, Precedence::Comparison),
        TokenKind::LessEquals => (BinaryOp::LessEqual, Precedence::Comparison),
        TokenKind::GreaterThan => (BinaryOp::GreaterThan, Precedence::Comparison),
        TokenKind::GreaterEquals => (BinaryOp::GreaterEqual, Precedence::Comparison),
        TokenKind::Keyword(Keyword::Shl) => (BinaryOp::ShiftLeft, Precedence::Shift),
        TokenKind::Keyword(Keyword::Shr) => (BinaryOp::ShiftRight, Precedence::Shift),
        TokenKind::Keyword(Keyword::Sar) => (BinaryOp::ShiftArith, Precedence::Shift),
        TokenKind::Plus => (BinaryOp::Add, Precedence::Additive),
        TokenKind::Minus => (BinaryOp::Subtract, Precedence::Additive),
        TokenKind::Star => (BinaryOp::Multiply, Precedence::Multiplicative),
        TokenKind::Slash => (BinaryOp::Divide, Precedence::Multiplicative),
        TokenKind::Keyword(Keyword::Mod) => (BinaryOp::Modulo, Precedence::Multiplicative),
        TokenKind::Caret => (BinaryOp::Power, Precedence::Power),
        _ => return None,
    };
    Some(entry)
}

/// Returns true if a token can begin an expression.
pub(super) fn can_start_expression(kind: TokenKind) -> bool {
    match kind {
        TokenKind::IntegerLiteral
        | TokenKind::FloatLiteral
        | TokenKind::HexLiteral
        | TokenKind::StringLiteral
        | TokenKind::Identifier
        | TokenKind::Command
        | TokenKind::LeftParen
        | TokenKind::Minus
        | TokenKind::Plus => true,
        TokenKind::Keyword(keyword) => matches!(
            keyword,
            Keyword::Not
                | Keyword::New
                | Keyword::First
                | Keyword::Last
                | Keyword::After
                | Keyword::Before
                | Keyword::Null
                | Keyword::True
                | Keyword::False
        ),
        _ => false,
    }
}

/// Parses `$FF` as a 32-bit pattern, so `$FFFFFFFF` is -1.
pub(super) fn parse_hex(text: &str) -> Option<i64> {
    let digits = text.strip_prefix('$')?;
    let value = u64::from_str_radix(digits, 16).ok()?;
    let value = u32::try_from(value).ok()?;
    Some(i64::from(value as i32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::StatementKind;
    use crate::lexer::lex;
    use crate::semantic::ValueType;

    /// Parses `x = <source>` and returns the value expression.
    fn expr(source: &str) -> Expr {
        let tokens = lex(&format!("x = {source}"));
        let mut parser = Parser::new(&tokens);
        let mut program = parser.parse();
        match program.statements.remove(0).kind {
            StatementKind::Assignment { value, .. } => value,
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_hex_literal_values() {
        assert_eq!(parse_hex("$FF"), Some(255));
        assert_eq!(parse_hex("$FFFFFFFF"), Some(-1));
        assert_eq!(parse_hex("$1FFFFFFFF"), None);
    }

    #[test]
    fn test_literal_types() {
        assert_eq!(expr("42").ty, ValueType::Number);
        assert_eq!(expr(".5").ty, ValueType::Number);
        assert_eq!(expr("\"hi\"").ty, ValueType::String);
        assert_eq!(expr("True").ty, ValueType::Boolean);
        assert_eq!(expr("Null").ty, ValueType::Null);
    }

    #[test]
    fn test_concatenation_is_string() {
        assert_eq!(expr("\"score: \" + 10").ty, ValueType::String);
        assert_eq!(expr("1 + 2").ty, ValueType::Number);
    }

    #[test]
    fn test_comparison_and_not_are_boolean() {
        assert_eq!(expr("a < b").ty, ValueType::Boolean);
        assert_eq!(expr("Not done").ty, ValueType::Boolean);
        assert_eq!(expr("-a").ty, ValueType::Number);
    }

    #[test]
    fn test_not_takes_comparison_operand() {
        let value = expr("Not a = b");
        let ExprKind::Unary { op, operand } = value.kind else {
            panic!("expected unary");
        };
        assert_eq!(op, UnaryOp::Not);
        assert!(matches!(
            operand.kind,
            ExprKind::Binary {
                op: BinaryOp::Equal,
                ..
            }
        ));
    }

    #[test]
    fn test_negation_binds_looser_than_power() {
        let value = expr("-2 ^ 2");
        assert!(matches!(
            value.kind,
            ExprKind::Unary {
                op: UnaryOp::Negate,
                ..
            }
        ));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let value = expr("a Or b And c");
        let ExprKind::Binary { op, right, .. } = value.kind else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Or);
        assert!(matches!(
            right.kind,
            ExprKind::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
    }

    #[test]
    fn test_field_chain() {
        let value = expr("p\\pos\\x");
        let ExprKind::FieldAccess { object, field } = value.kind else {
            panic!("expected field access");
        };
        assert_eq!(field, "x");
        assert!(matches!(object.kind, ExprKind::FieldAccess { .. }));
    }

    #[test]
    fn test_command_value_types() {
        assert_eq!(expr("KeyDown(57)").ty, ValueType::Boolean);
        assert_eq!(expr("MouseX()").ty, ValueType::Number);
        assert_eq!(expr("Str(5)").ty, ValueType::String);
    }

    #[test]
    fn test_object_operators() {
        let tokens = lex("Type Enemy\nField x\nEnd Type\ne = First Enemy\nf = After e\n");
        let mut parser = Parser::new(&tokens);
        let program = parser.parse();
        assert!(parser.errors().is_empty(), "{:?}", parser.errors());
        let StatementKind::Assignment { value, .. } = &program.statements[2].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(value.kind, ExprKind::After(_)));
        assert_eq!(value.ty, ValueType::Object);
    }

    #[test]
    fn test_unknown_type_is_reported() {
        let tokens = lex("e = New Ghost");
        let mut parser = Parser::new(&tokens);
        parser.parse();
        assert!(matches!(
            parser.errors(),
            [ParseError::Semantic(SemanticError::UnknownType { .. })]
        ));
    }

    #[test]
    fn test_missing_operand_yields_error_node() {
        let tokens = lex("x = 1 +");
        let mut parser = Parser::new(&tokens);
        let program = parser.parse();
        assert_eq!(parser.errors().len(), 1);
        let StatementKind::Assignment { value, .. } = &program.statements[0].kind else {
            panic!("expected assignment");
        };
        let ExprKind::Binary { right, .. } = &value.kind else {
            panic!("expected binary");
        };
        assert!(matches!(right.kind, ExprKind::Error));
    }
}
