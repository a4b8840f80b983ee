//! Expression AST nodes.
//!
//! Expressions are constructs that evaluate to a value: literals, variables,
//! arithmetic, comparisons, command and function calls, array elements,
//! field chains, and the object-list operators (`New`, `First`, `After`...).
//!
//! # Expression Precedence
//!
//! From highest to lowest (as implemented in the parser):
//!
//! 1. Postfix: `(...)`, `\field`
//! 2. Unary: `-x`, `+x`, `Not x`
//! 3. Exponentiation: `^` (right-associative)
//! 4. Multiplicative: `*`, `/`, `Mod`
//! 5. Additive: `+`, `-`
//! 6. Shifts: `Shl`, `Shr`, `Sar`
//! 7. Comparison: `=`, `<>`, `<`, `>`, `<=`, `>=`
//! 8. Logical AND: `And`
//! 9. Logical OR/XOR: `Or`, `Xor`

use super::Span;
use crate::semantic::ValueType;

/// An expression with its source location and inferred type.
#[derive(Debug, Clone)]
pub struct Expr {
    /// The kind of expression.
    pub kind: ExprKind,
    /// Source location of this expression.
    pub span: Span,
    /// Type inferred while parsing.
    pub ty: ValueType,
}

impl Expr {
    /// Creates a new expression with an unknown type.
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            ty: ValueType::Unknown,
        }
    }

    /// Sets the inferred type.
    pub fn with_type(mut self, ty: ValueType) -> Self {
        self.ty = ty;
        self
    }

    /// Placeholder for an expression that failed to parse.
    pub fn error(span: Span) -> Self {
        Self::new(ExprKind::Error, span)
    }

    /// Returns true for assignable expressions.
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Variable { .. } | ExprKind::ArrayAccess { .. } | ExprKind::FieldAccess { .. }
        )
    }
}

/// The different kinds of expressions.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Integer literal: `42`, `$FF`
    IntegerLiteral(i64),

    /// Floating-point literal: `3.14`, `.5`
    FloatLiteral(f64),

    /// String literal: `"Hello"`
    StringLiteral(String),

    /// `True` / `False`
    BooleanLiteral(bool),

    /// `Null`
    Null,

    /// Variable reference: `x`, `name$`, `p.Player`
    Variable {
        /// Name as written, suffix included.
        name: String,
        /// Object type annotation (`p.Player`).
        type_name: Option<String>,
    },

    /// Binary operation: `left op right`
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// Unary operation: `op operand`
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Parenthesized expression: `(expr)`
    Grouped(Box<Expr>),

    /// User function call: `Add(1, 2)`
    Call { name: String, args: Vec<Expr> },

    /// Builtin command used as a value: `Rnd(10)`, `MouseX()`
    Command { name: String, args: Vec<Expr> },

    /// Array element: `grid(x, y)`
    ArrayAccess { name: String, indices: Vec<Expr> },

    /// Field access: `player\x`
    FieldAccess { object: Box<Expr>, field: String },

    /// `New Player`
    New(String),

    /// `First Player`
    First(String),

    /// `Last Player`
    Last(String),

    /// `After p`
    After(Box<Expr>),

    /// `Before p`
    Before(Box<Expr>),

    /// An expression that failed to parse; lowers to an inert value.
    Error,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    /// `^` - Exponentiation (right-associative)
    Power,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `Mod`
    Modulo,
    /// `+` - Addition or string concatenation
    Add,
    /// `-`
    Subtract,

    // Bit shifts
    /// `Shl`
    ShiftLeft,
    /// `Shr` - logical
    ShiftRight,
    /// `Sar` - arithmetic
    ShiftArith,

    // Comparison
    /// `=` (also assignment in statement context)
    Equal,
    /// `<>`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterEqual,

    // Logical
    /// `And`
    And,
    /// `Or`
    Or,
    /// `Xor`
    Xor,
}

impl BinaryOp {
    /// Returns true if this operator is right-associative.
    ///
    /// Only exponentiation is: `2 ^ 3 ^ 2` is `2 ^ (3 ^ 2)`.
    pub fn is_right_associative(&self) -> bool {
        matches!(self, BinaryOp::Power)
    }

    /// Returns true for the six comparison operators.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThan
                | BinaryOp::LessEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterEqual
        )
    }

    /// Returns true for `And`, `Or` and `Xor`.
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::Xor)
    }

    /// Source spelling of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Power => "^",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "Mod",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::ShiftLeft => "Shl",
            BinaryOp::ShiftRight => "Shr",
            BinaryOp::ShiftArith => "Sar",
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "<>",
            BinaryOp::LessThan => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "And",
            BinaryOp::Or => "Or",
            BinaryOp::Xor => "Xor",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Negate,
    /// `+`
    Plus,
    /// `Not`
    Not,
}

impl UnaryOp {
    /// Source spelling of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "Not",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_op_right_associative() {
        assert!(BinaryOp::Power.is_right_associative());
        assert!(!BinaryOp::Add.is_right_associative());
    }

    #[test]
    fn test_binary_op_classes() {
        assert!(BinaryOp::LessEqual.is_comparison());
        assert!(!BinaryOp::Add.is_comparison());
        assert!(BinaryOp::Xor.is_logical());
        assert_eq!(BinaryOp::ShiftArith.as_str(), "Sar");
    }

    #[test]
    fn test_lvalues() {
        let var = Expr::new(
            ExprKind::Variable {
                name: "x".into(),
                type_name: None,
            },
            Span::new(0, 1),
        );
        assert!(var.is_lvalue());
        assert!(!Expr::error(Span::new(0, 0)).is_lvalue());
        assert_eq!(var.ty, ValueType::Unknown);
    }
}
