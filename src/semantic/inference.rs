//! Heuristic type inference and command argument checks.
//!
//! Inference is shallow: the parser builds expressions bottom-up and calls
//! [`infer_type`] on each new node, so children already carry their type.
//! The rules are:
//!
//! - literals have their obvious type
//! - a name's suffix wins, then its recorded symbol type, then `Number`
//! - `+` is a string if either side is a string, otherwise a number
//! - comparisons, `And`/`Or`/`Xor` and `Not` are booleans
//! - other arithmetic and negation are numbers
//! - object-list operators (`New`, `First`, `After`...) are objects

use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::commands::{CommandDescriptor, CommandTable};
use crate::semantic::types::type_from_suffix;
use crate::semantic::{SemanticError, SymbolTable, ValueType};

/// Infers the type of `expr` from its children and the symbol table.
pub fn infer_type(expr: &Expr, symbols: &SymbolTable, commands: &CommandTable) -> ValueType {
    match &expr.kind {
        ExprKind::IntegerLiteral(_) | ExprKind::FloatLiteral(_) => ValueType::Number,
        ExprKind::StringLiteral(_) => ValueType::String,
        ExprKind::BooleanLiteral(_) => ValueType::Boolean,
        ExprKind::Null => ValueType::Null,

        ExprKind::Variable { name, type_name } => {
            if type_name.is_some() {
                ValueType::Object
            } else {
                name_type(name, symbols)
            }
        }
        ExprKind::ArrayAccess { name, .. } | ExprKind::Call { name, .. } => {
            name_type(name, symbols)
        }

        ExprKind::Binary { left, op, right } => {
            if op.is_comparison() || op.is_logical() {
                ValueType::Boolean
            } else if *op == BinaryOp::Add
                && (left.ty == ValueType::String || right.ty == ValueType::String)
            {
                ValueType::String
            } else {
                ValueType::Number
            }
        }
        ExprKind::Unary { op, .. } => match op {
            UnaryOp::Not => ValueType::Boolean,
            UnaryOp::Negate | UnaryOp::Plus => ValueType::Number,
        },
        ExprKind::Grouped(inner) => inner.ty,

        ExprKind::Command { name, .. } => commands
            .get(name)
            .map(|d| d.returns)
            .unwrap_or(ValueType::Unknown),

        // Field types are not tracked per user type; trust the suffix only
        ExprKind::FieldAccess { field, .. } => {
            type_from_suffix(field).unwrap_or(ValueType::Unknown)
        }

        ExprKind::New(_)
        | ExprKind::First(_)
        | ExprKind::Last(_)
        | ExprKind::After(_)
        | ExprKind::Before(_) => ValueType::Object,

        ExprKind::Error => ValueType::Unknown,
    }
}

fn name_type(name: &str, symbols: &SymbolTable) -> ValueType {
    type_from_suffix(name)
        .or_else(|| symbols.lookup(name).map(|s| s.declared_type))
        .unwrap_or(ValueType::Number)
}

/// Compares argument types against a command's declared parameter types.
///
/// Only positions that are both declared and supplied are compared. Each
/// mismatching argument yields exactly one error.
pub fn check_arguments(
    command: &str,
    descriptor: &CommandDescriptor,
    args: &[Expr],
) -> Vec<SemanticError> {
    descriptor
        .params
        .iter()
        .zip(args)
        .enumerate()
        .filter(|(_, (expected, arg))| !expected.accepts(arg.ty))
        .map(|(i, (expected, arg))| {
            SemanticError::argument_mismatch(command, i + 1, *expected, arg.ty, arg.span)
        })
        .collect()
}
