//! Semantic error types.
//!
//! These are advisory problems found while parsing: they never stop the
//! parse and never block code generation. Each error includes source
//! location information for accurate diagnostics.

use crate::ast::Span;
use crate::semantic::ValueType;
use thiserror::Error;

/// A semantic error with location and description.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SemanticError {
    /// A builtin command argument has the wrong inferred type.
    #[error("argument {position} of `{command}`: expected {expected}, found {found}")]
    ArgumentTypeMismatch {
        /// Lower-cased command name.
        command: String,
        /// 1-based argument position.
        position: usize,
        expected: ValueType,
        found: ValueType,
        span: Span,
    },

    /// An indexed assignment to a name that was never `Dim`med.
    #[error("`{name}` is not an array")]
    NotAnArray { name: String, span: Span },

    /// `New`, `First`, `Each`... with a name that is not a declared type.
    #[error("unknown type `{name}`")]
    UnknownType { name: String, span: Span },

    /// A function declared with the name of a builtin command.
    #[error("`{name}` is a builtin command and cannot be redefined")]
    BuiltinRedefinition { name: String, span: Span },
}

impl SemanticError {
    /// Returns the primary span of this error.
    pub fn span(&self) -> Span {
        match self {
            SemanticError::ArgumentTypeMismatch { span, .. } => *span,
            SemanticError::NotAnArray { span, .. } => *span,
            SemanticError::UnknownType { span, .. } => *span,
            SemanticError::BuiltinRedefinition { span, .. } => *span,
        }
    }

    /// Creates an argument type mismatch error.
    pub fn argument_mismatch(
        command: impl Into<String>,
        position: usize,
        expected: ValueType,
        found: ValueType,
        span: Span,
    ) -> Self {
        SemanticError::ArgumentTypeMismatch {
            command: command.into(),
            position,
            expected,
            found,
            span,
        }
    }
}
