//! Uniform diagnostics for every compilation phase.
//!
//! Each phase keeps its own error enum. The façade converts all of them into
//! [`Diagnostic`] values so callers see one flat, ordered list.

use std::fmt;

use crate::commands::TableError;
use crate::lexer::LexError;
use crate::parser::ParseError;
use crate::preprocessor::IncludeError;

/// The phase that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Preprocess,
    Lexical,
    Syntax,
    Semantic,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Preprocess => "preprocess",
            Phase::Lexical => "lexical",
            Phase::Syntax => "syntax",
            Phase::Semantic => "semantic",
        };
        f.write_str(name)
    }
}

/// A located, non-fatal compiler message.
///
/// Line and column are 1-based; `0` means the problem has no source
/// location (for example a bad command table entry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub phase: Phase,
}

impl Diagnostic {
    /// Creates a diagnostic.
    pub fn new(phase: Phase, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
            phase,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl From<&LexError> for Diagnostic {
    fn from(error: &LexError) -> Self {
        let span = error.span();
        Diagnostic::new(Phase::Lexical, span.line, span.column, error.to_string())
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(error: &ParseError) -> Self {
        let span = error.span();
        let phase = match error {
            ParseError::Semantic(_) => Phase::Semantic,
            _ => Phase::Syntax,
        };
        Diagnostic::new(phase, span.line, span.column, error.to_string())
    }
}

impl From<&IncludeError> for Diagnostic {
    fn from(error: &IncludeError) -> Self {
        Diagnostic::new(Phase::Preprocess, error.line(), 1, error.to_string())
    }
}

impl From<&TableError> for Diagnostic {
    fn from(error: &TableError) -> Self {
        Diagnostic::new(Phase::Semantic, 0, 0, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;
    use crate::semantic::SemanticError;

    #[test]
    fn test_display_is_line_column_message() {
        let diagnostic = Diagnostic::new(Phase::Syntax, 3, 7, "expected `Wend`");
        assert_eq!(diagnostic.to_string(), "3:7: expected `Wend`");
    }

    #[test]
    fn test_lex_error_conversion() {
        let error = LexError::UnterminatedString {
            span: Span::new(10, 14).at(2, 5),
        };
        let diagnostic = Diagnostic::from(&error);
        assert_eq!(diagnostic.phase, Phase::Lexical);
        assert_eq!((diagnostic.line, diagnostic.column), (2, 5));
        assert_eq!(diagnostic.message, "unterminated string literal");
    }

    #[test]
    fn test_wrapped_semantic_error_keeps_its_phase() {
        let error = ParseError::Semantic(SemanticError::NotAnArray {
            name: "grid".into(),
            span: Span::new(0, 4).at(1, 1),
        });
        assert_eq!(Diagnostic::from(&error).phase, Phase::Semantic);
    }

    #[test]
    fn test_include_error_conversion() {
        let error = IncludeError::Cycle {
            path: "a.bb".into(),
            line: 4,
        };
        let diagnostic = Diagnostic::from(&error);
        assert_eq!(diagnostic.phase, Phase::Preprocess);
        assert_eq!(diagnostic.to_string(), "4:1: `a.bb` includes itself");
    }
}
