//! Parser for blitzweb BASIC.
//!
//! The parser transforms a stream of tokens into an Abstract Syntax Tree (AST).
//! It uses recursive descent for statements and Pratt parsing (precedence climbing)
//! for expressions.
//!
//! # Example
//!
//! ```
//! use blitzweb::lexer::lex;
//! use blitzweb::parser::Parser;
//!
//! let source = r#"
//!     Graphics 640, 480
//!     x = 1 + 2
//! "#;
//!
//! let tokens = lex(source);
//! let mut parser = Parser::new(&tokens);
//! let program = parser.parse();
//!
//! assert!(parser.errors().is_empty());
//! assert_eq!(program.statements.len(), 2);
//! ```
//!
//! # Module Structure
//!
//! The parser is split into focused modules:
//! - [`tokens`] - Token navigation utilities (peek, advance, match, expect)
//! - [`expressions`] - Pratt parser for expressions, with type inference
//! - [`statements`] - Statement dispatcher, blocks and simple statements
//! - [`control_flow`] - If/While/Repeat/For/Select parsing
//! - [`procedures`] - Function/Type definitions and the declaration pre-scan
//! - [`error`] - Parse error types
//!
//! # Symbol Table
//!
//! The parser owns a [`SymbolTable`] and updates it as declarations are
//! parsed. `name(i)` becomes an array access only if `name` is already known
//! to be an array at that point; otherwise it is a call.
//!
//! # Error Recovery
//!
//! The parser never aborts. Errors are recorded, the parser synchronizes to
//! the next statement boundary, and parsing continues. Every loop in the
//! parser consumes at least one token per iteration, so it always reaches
//! end of input.

mod control_flow;
mod error;
mod expressions;
mod procedures;
mod statements;
mod tokens;

pub use error::ParseError;

use crate::ast::{Program, Statement};
use crate::commands::CommandTable;
use crate::lexer::{Keyword, Token, TokenKind};
use crate::semantic::SymbolTable;

/// Parser for BASIC source code.
///
/// The parser consumes a slice of tokens and produces an AST.
/// Errors are collected alongside the program rather than replacing it.
pub struct Parser<'a> {
    /// The tokens to parse, comments removed.
    tokens: Vec<&'a Token>,
    /// Current position in the token stream.
    current: usize,
    /// Collected parse errors.
    errors: Vec<ParseError>,
    /// Names declared so far.
    symbols: SymbolTable,
    /// Number of enclosing statement blocks; 0 at the top level.
    block_depth: usize,
    /// Builtin command signatures.
    commands: &'a CommandTable,
}

impl<'a> Parser<'a> {
    /// Creates a new parser using the standard command table.
    pub fn new(tokens: &'a [Token]) -> Self {
        Self::with_commands(tokens, CommandTable::standard())
    }

    /// Creates a parser that checks command calls against `commands`.
    pub fn with_commands(tokens: &'a [Token], commands: &'a CommandTable) -> Self {
        Self {
            tokens: tokens
                .iter()
                .filter(|t| t.kind != TokenKind::Comment)
                .collect(),
            current: 0,
            errors: Vec::new(),
            symbols: SymbolTable::new(),
            block_depth: 0,
            commands,
        }
    }

    /// Parses the token stream into a program AST.
    ///
    /// Always returns a program; problems are available from [`errors`](Self::errors).
    pub fn parse(&mut self) -> Program {
        self.prescan_declarations();
        let statements = self.parse_program();
        log::debug!(
            "parsed {} top-level statements with {} errors",
            statements.len(),
            self.errors.len()
        );
        Program::new(statements)
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Takes the recorded errors, leaving none behind.
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    /// The symbol table as it stands.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Returns true once every token has been consumed.
    pub fn is_finished(&self) -> bool {
        self.is_at_end()
    }

    /// Parses a complete program (sequence of statements).
    fn parse_program(&mut self) -> Vec<Statement> {
        let mut statements = Vec::new();

        loop {
            self.skip_newlines();
            if self.is_at_end() {
                break;
            }

            let before = self.current;
            match self.parse_statement() {
                Ok(stmt) => {
                    statements.push(stmt);
                    self.finish_statement();
                }
                Err(()) => {
                    // Error already recorded; try to recover
                    self.synchronize();
                }
            }

            if self.current == before {
                self.advance();
            }
        }

        statements
    }
}

/// Parses tokens with the standard command table.
pub fn parse(tokens: &[Token]) -> (Program, Vec<ParseError>) {
    parse_with(tokens, CommandTable::standard())
}

/// Parses tokens against a custom command table.
pub fn parse_with(tokens: &[Token], commands: &CommandTable) -> (Program, Vec<ParseError>) {
    let mut parser = Parser::with_commands(tokens, commands);
    let program = parser.parse();
    (program, parser.take_errors())
}

/// Something that ends a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Closer {
    /// A single keyword: `Wend`, `Next`, `Case`...
    Keyword(Keyword),
    /// `End` followed by a keyword: `End Function`.
    EndOf(Keyword),
}

impl Closer {
    /// Every closer in the language.
    pub(crate) const ALL: [Closer; 13] = [
        Closer::Keyword(Keyword::ElseIf),
        Closer::Keyword(Keyword::Else),
        Closer::Keyword(Keyword::EndIf),
        Closer::Keyword(Keyword::Wend),
        Closer::Keyword(Keyword::Until),
        Closer::Keyword(Keyword::Forever),
        Closer::Keyword(Keyword::Next),
        Closer::Keyword(Keyword::Case),
        Closer::Keyword(Keyword::Default),
        Closer::EndOf(Keyword::If),
        Closer::EndOf(Keyword::Function),
        Closer::EndOf(Keyword::Select),
        Closer::EndOf(Keyword::Type),
    ];

    /// Source spelling for diagnostics.
    pub(crate) fn describe(&self) -> String {
        match self {
            Closer::Keyword(keyword) => format!("`{}`", keyword),
            Closer::EndOf(keyword) => format!("`End {}`", keyword),
        }
    }
}

/// Operator precedence levels for Pratt parsing.
///
/// Higher values mean higher precedence (bind tighter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub(crate) enum Precedence {
    Lowest = 0,
    Or = 1,             // Or, Xor
    And = 2,            // And
    Comparison = 3,     // =, <>, <, >, <=, >=
    Shift = 4,          // Shl, Shr, Sar
    Additive = 5,       // +, -
    Multiplicative = 6, // *, /, Mod
    Power = 7,          // ^
    Unary = 8,          // -x, +x
}

impl Precedence {
    /// The next-tighter level, used for left-associative operators.
    pub(crate) fn next(self) -> Self {
        match self {
            Precedence::Lowest => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Comparison,
            Precedence::Comparison => Precedence::Shift,
            Precedence::Shift => Precedence::Additive,
            Precedence::Additive => Precedence::Multiplicative,
            Precedence::Multiplicative => Precedence::Power,
            Precedence::Power | Precedence::Unary => Precedence::Unary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, ExprKind, StatementKind};
    use crate::lexer::lex;

    fn parse_source(source: &str) -> (Program, Vec<ParseError>) {
        let tokens = lex(source);
        parse(&tokens)
    }

    fn parse_ok(source: &str) -> Program {
        let (program, errors) = parse_source(source);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        program
    }

    #[test]
    fn test_parse_function_declaration() {
        let program = parse_ok("Function Add(a, b)\n    Return a + b\nEnd Function");
        assert_eq!(program.statements.len(), 1);

        let StatementKind::FunctionDeclaration { name, params, body, .. } =
            &program.statements[0].kind
        else {
            panic!("expected function declaration");
        };
        assert_eq!(name, "Add");
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(body.len(), 1);

        let StatementKind::Return(Some(value)) = &body[0].kind else {
            panic!("expected return with value");
        };
        let ExprKind::Binary { left, op, right } = &value.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(&left.kind, ExprKind::Variable { name, .. } if name == "a"));
        assert!(matches!(&right.kind, ExprKind::Variable { name, .. } if name == "b"));
    }

    #[test]
    fn test_parse_precedence() {
        // 1 + 2 * 3 should parse as 1 + (2 * 3)
        let program = parse_ok("x = 1 + 2 * 3");
        let StatementKind::Assignment { value, .. } = &program.statements[0].kind else {
            panic!("expected assignment");
        };
        let ExprKind::Binary { op, right, .. } = &value.kind else {
            panic!("expected binary");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(
            right.kind,
            ExprKind::Binary {
                op: BinaryOp::Multiply,
                ..
            }
        ));
    }

    #[test]
    fn test_power_is_right_associative() {
        let program = parse_ok("x = 2 ^ 3 ^ 2");
        let StatementKind::Assignment { value, .. } = &program.statements[0].kind else {
            panic!("expected assignment");
        };
        let ExprKind::Binary { left, right, .. } = &value.kind else {
            panic!("expected binary");
        };
        assert!(matches!(left.kind, ExprKind::IntegerLiteral(2)));
        assert!(matches!(
            right.kind,
            ExprKind::Binary {
                op: BinaryOp::Power,
                ..
            }
        ));
    }

    #[test]
    fn test_function_local_not_visible_at_top_level() {
        let tokens = lex("Function f()\n    Local temp = 1\nEnd Function\n");
        let mut parser = Parser::new(&tokens);
        parser.parse();
        assert!(parser.errors().is_empty());
        assert!(parser.symbols().lookup("temp").is_none());
        assert!(parser.symbols().is_function("f"));
    }

    #[test]
    fn test_top_level_array_visible_in_function() {
        let program = parse_ok("Dim grid(10)\nFunction f()\n    v = grid(3)\nEnd Function\n");
        let StatementKind::FunctionDeclaration { body, .. } = &program.statements[1].kind else {
            panic!("expected function");
        };
        let StatementKind::Assignment { value, .. } = &body[0].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(value.kind, ExprKind::ArrayAccess { .. }));
    }

    #[test]
    fn test_array_versus_call_decided_at_parse_time() {
        let program = parse_ok("a = f(1)\nDim f(5)\nb = f(1)\nFunction f(x)\nEnd Function");
        let kinds: Vec<_> = program
            .statements
            .iter()
            .filter_map(|s| match &s.kind {
                StatementKind::Assignment { value, .. } => Some(&value.kind),
                _ => None,
            })
            .collect();
        assert!(matches!(kinds[0], ExprKind::Call { .. }));
        assert!(matches!(kinds[1], ExprKind::ArrayAccess { .. }));
    }

    #[test]
    fn test_string_argument_to_numeric_command() {
        let (_, errors) = parse_source("Plot \"ten\", 5");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_semantic());
    }

    #[test]
    fn test_boolean_and_number_arguments_interchange() {
        let (_, errors) = parse_source("Plot True, 5 > 3\nFlip 1\nFlip False");
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_recovery_reports_and_continues() {
        let (program, errors) = parse_source("x = = 3\nCls\ny = (1 +\nFlip");
        assert!(!errors.is_empty());
        let commands = program
            .statements
            .iter()
            .filter(|s| matches!(s.kind, StatementKind::Expression(_)))
            .count();
        assert_eq!(commands, 2);
    }

    #[test]
    fn test_garbage_input_terminates() {
        let inputs = [
            "Wend Wend Next Until",
            "If If If Then Else",
            "Function (((\n",
            "For = To Step\nNext Next",
            "Select\nCase\nDefault\n",
            ") ) , , = = \\ \\",
            "Type\nField\nField ,\n",
            "End End If End Function",
            "x(1,2,3 = 4",
            "Insert Before After",
            "Data -, \"a\", -\n",
        ];
        for input in inputs {
            let tokens = lex(input);
            let mut parser = Parser::new(&tokens);
            parser.parse();
            assert!(parser.is_finished(), "{input:?}");
        }
    }

    #[test]
    fn test_unclosed_block_reports_missing_terminator() {
        let (program, errors) = parse_source("While True\n    Cls\n");
        assert_eq!(program.statements.len(), 1);
        assert!(errors.iter().any(|e| matches!(
            e,
            ParseError::MissingTerminator { terminator, .. } if terminator == "`Wend`"
        )));
    }

    #[test]
    fn test_foreign_closer_ends_block() {
        let (program, errors) = parse_source("While a\n    Repeat\n        Cls\nWend\n");
        assert_eq!(errors.len(), 1);
        let StatementKind::While { body, .. } = &program.statements[0].kind else {
            panic!("expected while");
        };
        assert!(matches!(body[0].kind, StatementKind::Repeat { until: None, .. }));
    }

    #[test]
    fn test_comments_are_ignored() {
        let program = parse_ok("; header\nCls ; clear\n; trailer");
        assert_eq!(program.statements.len(), 1);
    }
}
