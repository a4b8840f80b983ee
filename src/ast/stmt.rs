//! Statement AST nodes.
//!
//! Statements are constructs that perform actions but don't produce values.
//!
//! # Statement Categories
//!
//! - **Assignment**: `target = expression`
//! - **Declarations**: `Local`, `Global`, `Dim`, `Const`, `Function`, `Type`
//! - **Control flow**: `If`, `Select`, `Goto`, `Gosub`, `Return`, `Exit`, `End`
//! - **Loops**: `For/Next`, `For Each`, `While/Wend`, `Repeat/Until/Forever`
//! - **Data pool**: `Data`, `Read`, `Restore`
//! - **Object lists**: `Delete`, `Delete Each`, `Insert`
//! - **Calls**: a command or user function used as a statement

use super::{Expr, Span};

/// A statement with its source location.
#[derive(Debug, Clone)]
pub struct Statement {
    /// The kind of statement.
    pub kind: StatementKind,
    /// Source location of this statement.
    pub span: Span,
}

impl Statement {
    /// Creates a new statement with the given kind and span.
    pub fn new(kind: StatementKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The different kinds of statements.
#[derive(Debug, Clone)]
pub enum StatementKind {
    /// `target = value`
    ///
    /// The target is a variable, array element or field chain.
    Assignment { target: Expr, value: Expr },

    /// `Local a, b$ = "x"` / `Global p.Player`
    Declaration {
        /// Which scope the names land in.
        scope: DeclScope,
        /// Declared names with optional initialisers.
        vars: Vec<VarDecl>,
    },

    /// `Dim grid(10, 10), names$(5)`
    Dim { arrays: Vec<ArrayDecl> },

    /// `Const NAME = value`
    Const { name: String, value: Expr },

    /// Single-line: `If c Then stmt [Else stmt]`
    /// Block: `If c ... [ElseIf c ...] [Else ...] EndIf`
    If {
        /// The condition to test.
        condition: Expr,
        /// Statements to execute if the condition is true.
        then_branch: Vec<Statement>,
        /// `ElseIf` clauses (condition + statements).
        elseif_branches: Vec<(Expr, Vec<Statement>)>,
        /// `Else` branch, if present.
        else_branch: Option<Vec<Statement>>,
    },

    /// `While condition ... Wend`
    While { condition: Expr, body: Vec<Statement> },

    /// `Repeat ... Until condition` or `Repeat ... Forever` (`until` is `None`)
    Repeat {
        body: Vec<Statement>,
        until: Option<Expr>,
    },

    /// `For var = start To end [Step step] ... Next`
    For {
        /// Loop variable as written.
        variable: String,
        start: Expr,
        end: Expr,
        /// Step value (1 when absent).
        step: Option<Expr>,
        body: Vec<Statement>,
    },

    /// `For p.Player = Each Player ... Next`
    ForEach {
        /// Loop variable as written.
        variable: String,
        /// The user type being iterated.
        type_name: String,
        body: Vec<Statement>,
    },

    /// `Select subject ... Case v1, v2 ... Default ... End Select`
    Select {
        subject: Expr,
        cases: Vec<CaseClause>,
        default: Option<Vec<Statement>>,
    },

    /// `Function name(params) ... End Function`
    FunctionDeclaration {
        /// Name as written, suffix included.
        name: String,
        /// Object return type (`Function Spawn.Enemy()`).
        return_type: Option<String>,
        params: Vec<Parameter>,
        body: Vec<Statement>,
    },

    /// `Type Name / Field ... / End Type`
    TypeDeclaration { name: String, fields: Vec<FieldDecl> },

    /// `Return [expr]`
    Return(Option<Expr>),

    /// `Exit` - leave the innermost loop
    Exit,

    /// `End` - stop the program
    End,

    /// `Goto label`
    Goto(String),

    /// `Gosub label`
    Gosub(String),

    /// `.label`
    Label(String),

    /// `Data 1, 2, "three"`
    Data(Vec<DataValue>),

    /// `Read a, b$`
    Read(Vec<Expr>),

    /// `Restore [label]`
    Restore(Option<String>),

    /// `Delete obj`
    Delete(Expr),

    /// `Delete Each Type`
    DeleteEach(String),

    /// `Insert obj Before|After anchor`
    Insert {
        object: Expr,
        position: InsertPosition,
        anchor: Expr,
    },

    /// A command or user call used as a statement: `Cls`, `Plot x, y`
    Expression(Expr),
}

/// Scope of a `Local`/`Global` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclScope {
    Local,
    Global,
}

/// One name in a `Local`/`Global` list.
#[derive(Debug, Clone)]
pub struct VarDecl {
    /// Name as written.
    pub name: String,
    /// Object type annotation.
    pub type_name: Option<String>,
    /// Initial value.
    pub value: Option<Expr>,
    pub span: Span,
}

/// One array in a `Dim` statement.
#[derive(Debug, Clone)]
pub struct ArrayDecl {
    /// Name as written.
    pub name: String,
    /// Element type annotation (`Dim grid.Cell(8)`).
    pub type_name: Option<String>,
    /// Upper bound expression per dimension.
    pub dimensions: Vec<Expr>,
    pub span: Span,
}

/// A `Case` clause in a `Select` block.
#[derive(Debug, Clone)]
pub struct CaseClause {
    /// Values compared against the subject.
    pub values: Vec<Expr>,
    pub body: Vec<Statement>,
    pub span: Span,
}

/// Function parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Name as written.
    pub name: String,
    /// Object type annotation.
    pub type_name: Option<String>,
    /// Default value for an omitted argument.
    pub default: Option<Expr>,
    pub span: Span,
}

/// Field of a user type.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Name as written.
    pub name: String,
    /// Object type annotation.
    pub type_name: Option<String>,
    pub span: Span,
}

/// Where `Insert` places an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Before,
    After,
}

/// A literal in a `Data` statement.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    /// Integer literal.
    Integer(i64),
    /// Floating-point literal.
    Float(f64),
    /// String literal or bare word.
    String(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ExprKind;

    #[test]
    fn test_create_return_statement() {
        let value = Expr::new(ExprKind::IntegerLiteral(1), Span::new(7, 8));
        let stmt = Statement::new(StatementKind::Return(Some(value)), Span::new(0, 8));
        assert!(matches!(stmt.kind, StatementKind::Return(Some(_))));
    }

    #[test]
    fn test_data_values_compare() {
        assert_eq!(DataValue::Integer(3), DataValue::Integer(3));
        assert_ne!(DataValue::String("3".into()), DataValue::Integer(3));
    }
}
