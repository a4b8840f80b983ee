//! Parser error types.
//!
//! Parse errors capture what went wrong and where, enabling good error messages.
//! The parser collects every error rather than stopping at the first one, and
//! still produces a complete [`Program`](crate::ast::Program).

use crate::ast::Span;
use crate::semantic::SemanticError;
use thiserror::Error;

/// A parse error with location and description.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// Expected a specific token but found something else.
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        /// What we expected to find.
        expected: String,
        /// What we actually found.
        found: String,
        /// Location of the unexpected token.
        span: Span,
    },

    /// Reached end of input unexpectedly.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// What we expected to find.
        expected: String,
        /// End-of-input location.
        span: Span,
    },

    /// Invalid expression.
    #[error("invalid expression: {message}")]
    InvalidExpression {
        /// Location of the invalid expression.
        span: Span,
        /// Additional context about what went wrong.
        message: String,
    },

    /// Invalid statement.
    #[error("invalid statement: {message}")]
    InvalidStatement {
        /// Location of the invalid statement.
        span: Span,
        /// Description of the problem.
        message: String,
    },

    /// Invalid number literal.
    #[error("invalid number: {message}")]
    InvalidNumber {
        /// Location of the invalid number.
        span: Span,
        /// Description of the problem.
        message: String,
    },

    /// A block construct was not closed.
    #[error("missing {terminator} for {construct}")]
    MissingTerminator {
        /// The construct that was opened (`While`, `Function`...).
        construct: String,
        /// The closer that never came (`Wend`, `End Function`...).
        terminator: String,
        /// Location of the opening statement.
        span: Span,
    },

    /// General syntax error.
    #[error("{message}")]
    SyntaxError {
        /// Location of the error.
        span: Span,
        /// Description of the problem.
        message: String,
    },

    /// An advisory semantic problem found while parsing.
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

impl ParseError {
    /// Returns the span of this error.
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnexpectedEof { span, .. } => *span,
            ParseError::InvalidExpression { span, .. } => *span,
            ParseError::InvalidStatement { span, .. } => *span,
            ParseError::InvalidNumber { span, .. } => *span,
            ParseError::MissingTerminator { span, .. } => *span,
            ParseError::SyntaxError { span, .. } => *span,
            ParseError::Semantic(err) => err.span(),
        }
    }

    /// Returns true for advisory semantic errors.
    pub fn is_semantic(&self) -> bool {
        matches!(self, ParseError::Semantic(_))
    }

    /// Creates an "unexpected token" error.
    pub fn unexpected(expected: impl Into<String>, found: impl Into<String>, span: Span) -> Self {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    /// Creates an "unexpected end of input" error.
    pub fn eof(expected: impl Into<String>, span: Span) -> Self {
        ParseError::UnexpectedEof {
            expected: expected.into(),
            span,
        }
    }

    /// Creates a "missing terminator" error.
    pub fn missing(construct: impl Into<String>, terminator: impl Into<String>, span: Span) -> Self {
        ParseError::MissingTerminator {
            construct: construct.into(),
            terminator: terminator.into(),
            span,
        }
    }

    /// Creates a syntax error with a message.
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        ParseError::SyntaxError {
            span,
            message: message.into(),
        }
    }
}
