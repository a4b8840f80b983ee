//! Expression code generation for the JavaScript backend.
//!
//! This module handles the emission of JavaScript for all expression types,
//! including literals, operators, user calls, builtin commands and the
//! object-list operators.
//!
//! # Special Handling
//!
//! - **Equality**: `=`/`<>` become loose `==`/`!=` so `True = 1` holds
//! - **Power (`^`)**: becomes `**` with both sides parenthesized
//! - **Shifts**: `Shr` is the logical `>>>`, `Sar` the arithmetic `>>`
//! - **Suspending calls**: wrapped as `(await ...)`
//! - **Error nodes**: become `undefined`

use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::commands::CommandCategory;

use super::Context;
use super::names::{class_name, float_literal, function_name, js_identifier, string_literal};

/// A lowered builtin command.
pub(super) struct LoweredCommand {
    /// The call, property read or inline template, without `await`.
    pub code: String,
    /// Whether the call site must be awaited.
    pub suspends: bool,
}

/// Emits JavaScript for an expression.
pub(super) fn emit_expr(expr: &Expr, ctx: &Context<'_>) -> String {
    match &expr.kind {
        ExprKind::IntegerLiteral(n) => n.to_string(),
        ExprKind::FloatLiteral(f) => float_literal(*f),
        ExprKind::StringLiteral(s) => string_literal(s),
        ExprKind::BooleanLiteral(b) => b.to_string(),
        ExprKind::Null => "null".to_string(),

        ExprKind::Variable { name, .. } => js_identifier(name),

        ExprKind::Binary { left, op, right } => {
            let l = emit_expr(left, ctx);
            let r = emit_expr(right, ctx);
            match op {
                BinaryOp::Xor => format!("(({}) ^ ({}))", l, r),
                _ => format!("({} {} {})", l, js_operator(*op), r),
            }
        }

        ExprKind::Unary { op, operand } => {
            let operand = emit_expr(operand, ctx);
            match op {
                UnaryOp::Negate => format!("(-{})", operand),
                UnaryOp::Plus => format!("(+{})", operand),
                UnaryOp::Not => format!("(!{})", operand),
            }
        }

        ExprKind::Grouped(inner) => format!("({})", emit_expr(inner, ctx)),

        ExprKind::Call { name, args } => {
            let call = format!("{}({})", function_name(name), emit_args(args, ctx));
            if ctx.function_suspends(name) {
                format!("(await {})", call)
            } else {
                call
            }
        }

        ExprKind::Command { name, args } => match lower_command(name, args, ctx) {
            Some(LoweredCommand {
                code,
                suspends: true,
            }) => format!("(await {})", code),
            Some(lowered) => lowered.code,
            None => "undefined".to_string(),
        },

        ExprKind::ArrayAccess { name, indices } => {
            let mut code = js_identifier(name);
            for index in indices {
                code.push('[');
                code.push_str(&emit_expr(index, ctx));
                code.push(']');
            }
            code
        }

        ExprKind::FieldAccess { object, field } => {
            format!("{}.{}", emit_expr(object, ctx), js_identifier(field))
        }

        ExprKind::New(type_name) => format!("new {}()", class_name(type_name)),
        ExprKind::First(type_name) => format!("$first({})", class_name(type_name)),
        ExprKind::Last(type_name) => format!("$last({})", class_name(type_name)),
        ExprKind::After(object) => format!("$after({})", emit_expr(object, ctx)),
        ExprKind::Before(object) => format!("$before({})", emit_expr(object, ctx)),

        ExprKind::Error => "undefined".to_string(),
    }
}

/// Emits a comma-separated argument list.
pub(super) fn emit_args(args: &[Expr], ctx: &Context<'_>) -> String {
    args.iter()
        .map(|a| emit_expr(a, ctx))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Lowers a builtin command through its descriptor.
///
/// Returns `None` when nothing should be emitted: the command is marked
/// unsupported or the table has no entry for it.
pub(super) fn lower_command(name: &str, args: &[Expr], ctx: &Context<'_>) -> Option<LoweredCommand> {
    let Some(descriptor) = ctx.commands.get(name) else {
        log::warn!("no descriptor for command `{}`; call dropped", name);
        return None;
    };

    let args = descriptor.apply_transforms(args.iter().map(|a| emit_expr(a, ctx)).collect());
    let code = match descriptor.category {
        CommandCategory::Call => format!("${}({})", descriptor.target, args.join(", ")),
        CommandCategory::Property => format!("${}", descriptor.target),
        CommandCategory::Inline => descriptor.render_inline(&args),
        CommandCategory::Unsupported => {
            log::warn!("command `{}` is not supported in this target; call dropped", name);
            return None;
        }
    };

    Some(LoweredCommand {
        code,
        suspends: ctx.command_suspends(name),
    })
}

/// JavaScript spelling of a binary operator.
fn js_operator(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Power => "**",
        BinaryOp::Multiply => "*",
        BinaryOp::Divide => "/",
        BinaryOp::Modulo => "%",
        BinaryOp::Add => "+",
        BinaryOp::Subtract => "-",
        BinaryOp::ShiftLeft => "<<",
        BinaryOp::ShiftRight => ">>>",
        BinaryOp::ShiftArith => ">>",
        BinaryOp::Equal => "==",
        BinaryOp::NotEqual => "!=",
        BinaryOp::LessThan => "<",
        BinaryOp::LessEqual => "<=",
        BinaryOp::GreaterThan => ">",
        BinaryOp::GreaterEqual => ">=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
        BinaryOp::Xor => "^",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Statement, StatementKind};
    use crate::codegen::js::analysis::DataTable;
    use crate::commands::CommandTable;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn value_of(source: &str) -> Expr {
        let tokens = lex(source);
        let (program, _) = parse(&tokens);
        let last: Option<&Statement> = program
            .statements
            .iter()
            .rev()
            .find(|s| matches!(s.kind, StatementKind::Assignment { .. }));
        match last.map(|s| &s.kind) {
            Some(StatementKind::Assignment { value, .. }) => value.clone(),
            _ => panic!("expected assignment"),
        }
    }

    fn emit(source: &str) -> String {
        let ctx = Context::new(CommandTable::standard(), DataTable::default());
        emit_expr(&value_of(source), &ctx)
    }

    #[test]
    fn test_operators() {
        assert_eq!(emit("x = 1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(emit("x = a <> b And c = d"), "((a != b) && (c == d))");
        assert_eq!(emit("x = 2 ^ 3"), "(2 ** 3)");
        assert_eq!(emit("x = -2 ^ 2"), "(-(2 ** 2))");
        assert_eq!(emit("x = n Shr 1"), "(n >>> 1)");
        assert_eq!(emit("x = Not done"), "(!done)");
    }

    #[test]
    fn test_literals() {
        assert_eq!(emit("x = \"c:\\dir\""), "\"c:\\\\dir\"");
        assert_eq!(emit("x = 1.5"), "1.5");
        assert_eq!(emit("x = $FF"), "255");
        assert_eq!(emit("x = True"), "true");
        assert_eq!(emit("x = Null"), "null");
    }

    #[test]
    fn test_names_are_mangled() {
        assert_eq!(emit("x = Score% + 1"), "(score + 1)");
        assert_eq!(emit("Dim grid(4, 4)\nx = grid(1, 2)"), "grid[1][2]");
        assert_eq!(emit("x = p\\pos\\X#"), "p.pos.x");
    }

    #[test]
    fn test_command_categories() {
        assert_eq!(emit("x = MouseX()"), "$input.mouseX");
        assert_eq!(emit("x = Abs(-3)"), "Math.abs((-3))");
        assert_eq!(emit("x = KeyDown(1)"), "$input.keyDown(\"Escape\")");
        assert_eq!(emit("x = Rnd(1, 6)"), "$math.rnd(1, 6)");
    }

    #[test]
    fn test_suspending_command_is_awaited() {
        assert!(emit("x = WaitKey()").starts_with("(await $input."));
    }

    #[test]
    fn test_object_operators() {
        let source = "Type Enemy\nField hp\nEnd Type\nx = After First Enemy";
        assert_eq!(emit(source), "$after($first($T_enemy))");
        assert_eq!(emit("Type Enemy\nEnd Type\nx = New Enemy"), "new $T_enemy()");
    }

    #[test]
    fn test_error_node_is_inert() {
        assert_eq!(emit("x = (1 +)"), "((1 + undefined))");
    }
}
