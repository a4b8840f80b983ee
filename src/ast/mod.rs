//! Abstract Syntax Tree (AST) definitions for blitzweb.
//!
//! The AST represents the hierarchical structure of a BASIC program after parsing.
//! Each node in the tree corresponds to a syntactic construct in the source code.
//!
//! # Structure
//!
//! ```text
//! Program
//! └── Vec<Statement>
//!     ├── Assignment { target: Expr, value: Expr }
//!     ├── While { condition: Expr, body }
//!     ├── FunctionDeclaration { name, params, body }
//!     └── ...
//! ```
//!
//! # Design Decisions
//!
//! - **Owned nodes**: AST nodes own their children (no lifetimes, no back
//!   pointers). The AST outlives the source text and the token stream.
//! - **Span on every node**: every node tracks its byte range and the
//!   line/column of its first token for diagnostics.
//! - **Inferred types on expressions**: the parser stores its best guess at
//!   each expression's [`ValueType`](crate::semantic::ValueType) on the node.
//! - **Error nodes**: a failed expression becomes [`ExprKind::Error`] so later
//!   phases always have a complete tree to walk.

mod expr;
mod stmt;

pub use expr::*;
pub use stmt::*;

/// A span representing a range in the source text.
///
/// `start`/`end` are byte offsets matching the lexer's spans; `line` and
/// `column` are the 1-based position of `start` (0 when unknown).
///
/// # Example
///
/// ```
/// use blitzweb::ast::Span;
///
/// let span = Span::new(0, 5).at(1, 1);
/// assert_eq!(span.start, 0);
/// assert_eq!(span.end, 5);
/// assert_eq!(span.line, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset of the start of the span (inclusive).
    pub start: usize,
    /// Byte offset of the end of the span (exclusive).
    pub end: usize,
    /// 1-based line of `start`.
    pub line: usize,
    /// 1-based column of `start`.
    pub column: usize,
}

impl Span {
    /// Creates a new span from start to end byte offsets.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            line: 0,
            column: 0,
        }
    }

    /// Sets the line/column of the span start.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Creates a span that covers both `self` and `other`.
    ///
    /// The position is taken from whichever span starts first.
    pub fn merge(&self, other: &Span) -> Span {
        let first = if other.start < self.start { other } else { self };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: first.line,
            column: first.column,
        }
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

/// A complete BASIC program.
///
/// Top-level code, function declarations and type declarations are all
/// statements; the code generator separates them.
#[derive(Debug, Clone, Default)]
pub struct Program {
    /// The statements that make up the program.
    pub statements: Vec<Statement>,
}

impl Program {
    /// Creates a new program with the given statements.
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    /// Iterates over top-level function declarations.
    pub fn functions(&self) -> impl Iterator<Item = &Statement> {
        self.statements
            .iter()
            .filter(|s| matches!(s.kind, StatementKind::FunctionDeclaration { .. }))
    }
}
