//! Statement code generation for the JavaScript backend.
//!
//! This module handles the emission of JavaScript for every statement kind,
//! including control flow, declarations, DATA access and the object-list
//! statements.
//!
//! # Loop Handling
//!
//! Every loop is emitted with a label (`$loop0:`) and tracked on a stack, so
//! `Exit` can leave the innermost loop even from inside a `switch`. An `Exit`
//! with an empty stack while emitting the per-frame update leaves the main
//! loop itself, which means shutting the program down.

use crate::ast::{
    ArrayDecl, CaseClause, DeclScope, Expr, ExprKind, InsertPosition, Statement, StatementKind,
    UnaryOp, VarDecl,
};
use crate::semantic::{ValueType, type_from_suffix};

use super::Context;
use super::analysis::{declared_default, default_value};
use super::expr::{LoweredCommand, emit_args, emit_expr, lower_command};
use super::names::{class_name, function_name, js_identifier};

/// State required for statement emission.
///
/// One emitter is created per generated routine (`$init`, `$update`,
/// `$shutdown` and each user function).
pub(super) struct StmtEmitter<'a> {
    ctx: &'a Context<'a>,
    /// Counter for generating unique loop labels.
    label_counter: u32,
    /// Current indentation level.
    pub indent: usize,
    /// Labels of the enclosing loops, innermost last.
    loop_stack: Vec<String>,
    /// Set while emitting the body of the main loop.
    in_update: bool,
    /// Value returned by a bare `Return` inside a user function.
    return_default: Option<&'static str>,
}

impl<'a> StmtEmitter<'a> {
    /// Creates an emitter for top-level code.
    pub fn new(ctx: &'a Context<'a>) -> Self {
        Self {
            ctx,
            label_counter: 0,
            indent: 1,
            loop_stack: Vec::new(),
            in_update: false,
            return_default: None,
        }
    }

    /// Creates an emitter for the main-loop body.
    pub fn for_update(ctx: &'a Context<'a>) -> Self {
        Self {
            in_update: true,
            ..Self::new(ctx)
        }
    }

    /// Creates an emitter for a user function body.
    pub fn for_function(ctx: &'a Context<'a>, return_default: &'static str) -> Self {
        Self {
            return_default: Some(return_default),
            ..Self::new(ctx)
        }
    }

    fn next_label(&mut self) -> String {
        let label = format!("$loop{}", self.label_counter);
        self.label_counter += 1;
        label
    }

    /// Writes one indented line.
    pub fn line(&self, output: &mut String, text: &str) {
        for _ in 0..self.indent {
            output.push_str("    ");
        }
        output.push_str(text);
        output.push('\n');
    }

    fn expr(&self, expr: &Expr) -> String {
        emit_expr(expr, self.ctx)
    }

    /// Emits a sequence of statements.
    pub fn emit_block(&mut self, stmts: &[Statement], output: &mut String) {
        for stmt in stmts {
            self.emit_stmt(stmt, output);
        }
    }

    /// Emits a statement.
    pub fn emit_stmt(&mut self, stmt: &Statement, output: &mut String) {
        match &stmt.kind {
            StatementKind::Assignment { target, value } => {
                let line = format!("{} = {};", self.expr(target), self.expr(value));
                self.line(output, &line);
            }

            StatementKind::Declaration { scope, vars } => self.emit_declaration(*scope, vars, output),

            StatementKind::Dim { arrays } => {
                for array in arrays {
                    self.emit_dim(array, output);
                }
            }

            // Top-level constants are emitted by the backend.
            StatementKind::Const { name, value } => {
                if self.return_default.is_some() {
                    let line = format!("{} = {};", js_identifier(name), self.expr(value));
                    self.line(output, &line);
                }
            }

            StatementKind::If {
                condition,
                then_branch,
                elseif_branches,
                else_branch,
            } => {
                let line = format!("if ({}) {{", self.expr(condition));
                self.line(output, &line);
                self.emit_nested(then_branch, output);
                for (condition, branch) in elseif_branches {
                    let line = format!("}} else if ({}) {{", self.expr(condition));
                    self.line(output, &line);
                    self.emit_nested(branch, output);
                }
                if let Some(branch) = else_branch {
                    self.line(output, "} else {");
                    self.emit_nested(branch, output);
                }
                self.line(output, "}");
            }

            StatementKind::While { condition, body } => {
                let label = self.next_label();
                let line = format!("{}: while ({}) {{", label, self.expr(condition));
                self.line(output, &line);
                self.emit_loop_body(label, body, output);
                self.line(output, "}");
            }

            StatementKind::Repeat { body, until } => {
                let label = self.next_label();
                match until {
                    Some(condition) => {
                        self.line(output, &format!("{}: do {{", label));
                        self.emit_loop_body(label, body, output);
                        let line = format!("}} while (!({}));", self.expr(condition));
                        self.line(output, &line);
                    }
                    None => {
                        self.line(output, &format!("{}: for (;;) {{", label));
                        self.emit_loop_body(label, body, output);
                        self.line(output, "}");
                    }
                }
            }

            StatementKind::For {
                variable,
                start,
                end,
                step,
                body,
            } => self.emit_for(variable, start, end, step.as_ref(), body, output),

            StatementKind::ForEach {
                variable,
                type_name,
                body,
            } => {
                let label = self.next_label();
                let line = format!(
                    "{}: for ({} of [...{}.$all]) {{",
                    label,
                    js_identifier(variable),
                    class_name(type_name)
                );
                self.line(output, &line);
                self.emit_loop_body(label, body, output);
                self.line(output, "}");
            }

            StatementKind::Select {
                subject,
                cases,
                default,
            } => self.emit_select(subject, cases, default.as_deref(), output),

            // Hoisted by the backend before any routine is emitted.
            StatementKind::FunctionDeclaration { .. } | StatementKind::TypeDeclaration { .. } => {}

            StatementKind::Return(value) => {
                let line = match (value, self.return_default) {
                    (Some(value), Some(_)) => format!("return {};", self.expr(value)),
                    (None, Some(default)) => format!("return {};", default),
                    _ => "return;".to_string(),
                };
                self.line(output, &line);
            }

            StatementKind::Exit => match self.loop_stack.last() {
                Some(label) => {
                    let line = format!("break {};", label);
                    self.line(output, &line);
                }
                None if self.in_update => self.line(output, "{ await $shutdown(); return; }"),
                None => {
                    log::warn!("line {}: `Exit` outside of a loop ignored", stmt.span.line);
                    self.line(output, "// Exit outside of a loop");
                }
            },

            StatementKind::End => self.line(output, "$end();"),

            StatementKind::Goto(label) => {
                log::warn!("line {}: `Goto {}` is not lowered", stmt.span.line, label);
                self.line(output, &format!("// Goto {} (not supported)", label));
            }

            StatementKind::Gosub(label) => {
                log::warn!("line {}: `Gosub {}` is not lowered", stmt.span.line, label);
                self.line(output, &format!("// Gosub {} (not supported)", label));
            }

            StatementKind::Label(name) => self.line(output, &format!("// .{}", name)),

            // Values live in the `$data` table.
            StatementKind::Data(_) => {}

            StatementKind::Read(targets) => {
                for target in targets {
                    let line = format!("{} = $read();", self.expr(target));
                    self.line(output, &line);
                }
            }

            StatementKind::Restore(label) => {
                let offset = self.ctx.data.restore_offset(label.as_deref());
                self.line(output, &format!("$dataPtr = {};", offset));
            }

            StatementKind::Delete(object) => {
                let line = format!("$delete({});", self.expr(object));
                self.line(output, &line);
            }

            StatementKind::DeleteEach(type_name) => {
                self.line(output, &format!("$deleteEach({});", class_name(type_name)));
            }

            StatementKind::Insert {
                object,
                position,
                anchor,
            } => {
                let after = matches!(position, InsertPosition::After);
                let line = format!(
                    "$insert({}, {}, {});",
                    self.expr(object),
                    self.expr(anchor),
                    after
                );
                self.line(output, &line);
            }

            StatementKind::Expression(expr) => self.emit_expression_statement(expr, output),
        }
    }

    fn emit_nested(&mut self, stmts: &[Statement], output: &mut String) {
        self.indent += 1;
        self.emit_block(stmts, output);
        self.indent -= 1;
    }

    fn emit_loop_body(&mut self, label: String, body: &[Statement], output: &mut String) {
        self.loop_stack.push(label);
        self.emit_nested(body, output);
        self.loop_stack.pop();
    }

    fn emit_declaration(&mut self, scope: DeclScope, vars: &[VarDecl], output: &mut String) {
        for var in vars {
            let value = match &var.value {
                Some(value) => self.expr(value),
                // A bare `Global` must not reset a value set elsewhere.
                None if scope == DeclScope::Global => continue,
                None => declared_default(&var.name, var.type_name.as_deref()).to_string(),
            };
            let line = format!("{} = {};", js_identifier(&var.name), value);
            self.line(output, &line);
        }
    }

    fn emit_dim(&mut self, array: &ArrayDecl, output: &mut String) {
        let sizes: Vec<String> = array
            .dimensions
            .iter()
            .map(|d| format!("{} + 1", self.expr(d)))
            .collect();
        let init = declared_default(&array.name, array.type_name.as_deref());
        let line = format!(
            "{} = $dim([{}], {});",
            js_identifier(&array.name),
            sizes.join(", "),
            init
        );
        self.line(output, &line);
    }

    fn emit_for(
        &mut self,
        variable: &str,
        start: &Expr,
        end: &Expr,
        step: Option<&Expr>,
        body: &[Statement],
        output: &mut String,
    ) {
        let number = self.label_counter;
        let label = self.next_label();
        let var = js_identifier(variable);
        let start = self.expr(start);
        let end = self.expr(end);

        let header = match step {
            None => format!("for ({v} = {start}; {v} <= {end}; {v}++)", v = var),
            Some(step) => match constant_sign(step) {
                Some(negative) => {
                    let cmp = if negative { ">=" } else { "<=" };
                    format!(
                        "for ({v} = {start}; {v} {cmp} {end}; {v} += {step})",
                        v = var,
                        step = self.expr(step)
                    )
                }
                None => {
                    let step_var = format!("$step{}", number);
                    let line = format!("let {} = {};", step_var, self.expr(step));
                    self.line(output, &line);
                    format!(
                        "for ({v} = {start}; {s} >= 0 ? {v} <= {end} : {v} >= {end}; {v} += {s})",
                        v = var,
                        s = step_var
                    )
                }
            },
        };

        self.line(output, &format!("{}: {} {{", label, header));
        self.emit_loop_body(label, body, output);
        self.line(output, "}");
    }

    fn emit_select(
        &mut self,
        subject: &Expr,
        cases: &[CaseClause],
        default: Option<&[Statement]>,
        output: &mut String,
    ) {
        let line = format!("switch ({}) {{", self.expr(subject));
        self.line(output, &line);
        self.indent += 1;

        for case in cases {
            for value in &case.values {
                let line = format!("case {}:", self.expr(value));
                self.line(output, &line);
            }
            self.line(output, "{");
            self.emit_nested(&case.body, output);
            self.line(output, "}");
            self.indent += 1;
            self.line(output, "break;");
            self.indent -= 1;
        }

        if let Some(body) = default {
            self.line(output, "default: {");
            self.emit_nested(body, output);
            self.line(output, "}");
        }

        self.indent -= 1;
        self.line(output, "}");
    }

    fn emit_expression_statement(&mut self, expr: &Expr, output: &mut String) {
        match &expr.kind {
            ExprKind::Command { name, args } => match lower_command(name, args, self.ctx) {
                Some(LoweredCommand {
                    code,
                    suspends: true,
                }) => self.line(output, &format!("await {};", code)),
                Some(LoweredCommand { code, .. }) => self.line(output, &format!("{};", code)),
                None => {}
            },
            ExprKind::Call { name, args } => {
                let call = format!("{}({})", function_name(name), emit_args(args, self.ctx));
                if self.ctx.function_suspends(name) {
                    self.line(output, &format!("await {};", call));
                } else {
                    self.line(output, &format!("{};", call));
                }
            }
            ExprKind::Error => {}
            _ => {
                let line = format!("{};", self.expr(expr));
                self.line(output, &line);
            }
        }
    }
}

/// Returns `Some(true)` for a negative literal step, `Some(false)` for a
/// non-negative one and `None` when the sign is only known at run time.
fn constant_sign(step: &Expr) -> Option<bool> {
    match &step.kind {
        ExprKind::IntegerLiteral(n) => Some(*n < 0),
        ExprKind::FloatLiteral(f) => Some(*f < 0.0),
        ExprKind::Grouped(inner) => constant_sign(inner),
        ExprKind::Unary {
            op: UnaryOp::Negate,
            operand,
        } => constant_sign(operand).map(|negative| !negative),
        ExprKind::Unary {
            op: UnaryOp::Plus,
            operand,
        } => constant_sign(operand),
        _ => None,
    }
}

/// Initial value of a user type field.
pub(super) fn field_default(name: &str, type_name: Option<&str>) -> &'static str {
    declared_default(name, type_name)
}

/// Value a user function returns when it falls off its end.
pub(super) fn return_default(name: &str, return_type: Option<&str>) -> &'static str {
    if return_type.is_some() {
        return "null";
    }
    default_value(type_from_suffix(name).unwrap_or(ValueType::Number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::js::analysis::DataTable;
    use crate::commands::CommandTable;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn emit_with(source: &str, update: bool) -> String {
        let tokens = lex(source);
        let (program, _) = parse(&tokens);
        let ctx = Context::new(CommandTable::standard(), DataTable::collect(&program));
        let mut emitter = if update {
            StmtEmitter::for_update(&ctx)
        } else {
            StmtEmitter::new(&ctx)
        };
        emitter.indent = 0;
        let mut output = String::new();
        emitter.emit_block(&program.statements, &mut output);
        output
    }

    fn emit(source: &str) -> String {
        emit_with(source, false)
    }

    #[test]
    fn test_assignment_and_declarations() {
        let output = emit("x = 1\nLocal a, b$ = \"hi\"\nGlobal g\nGlobal h = 2");
        assert!(output.contains("x = 1;"));
        assert!(output.contains("a = 0;"));
        assert!(output.contains("b = \"hi\";"));
        assert!(!output.contains("g = "));
        assert!(output.contains("h = 2;"));
    }

    #[test]
    fn test_dim_uses_inclusive_bounds() {
        let output = emit("Dim grid(4, 2), names$(3)");
        assert!(output.contains("grid = $dim([4 + 1, 2 + 1], 0);"));
        assert!(output.contains("names = $dim([3 + 1], \"\");"));
    }

    #[test]
    fn test_if_chain() {
        let output = emit("If a Then\n  x = 1\nElseIf b Then\n  x = 2\nElse\n  x = 3\nEndIf");
        assert!(output.contains("if (a) {\n"));
        assert!(output.contains("} else if (b) {\n"));
        assert!(output.contains("} else {\n"));
        assert!(output.ends_with("}\n"));
    }

    #[test]
    fn test_loops_are_labelled() {
        let output = emit("While a\n  Repeat\n    Exit\n  Until b\nWend");
        assert!(output.contains("$loop0: while (a) {"));
        assert!(output.contains("$loop1: do {"));
        assert!(output.contains("break $loop1;"));
        assert!(output.contains("} while (!(b));"));
    }

    #[test]
    fn test_forever_loop() {
        let output = emit("Repeat\n  x = x + 1\nForever");
        assert!(output.contains("$loop0: for (;;) {"));
    }

    #[test]
    fn test_for_step_direction() {
        assert!(emit("For i = 1 To 10\nNext").contains("for (i = 1; i <= 10; i++)"));
        assert!(emit("For i = 10 To 1 Step -1\nNext").contains("for (i = 10; i >= 1; i += (-1))"));
        let dynamic = emit("For i = 1 To n Step s\nNext");
        assert!(dynamic.contains("let $step0 = s;"));
        assert!(dynamic.contains("$step0 >= 0 ? i <= n : i >= n"));
    }

    #[test]
    fn test_for_each_iterates_snapshot() {
        let output = emit("Type Enemy\nField hp\nEnd Type\nFor e.Enemy = Each Enemy\n  Delete e\nNext");
        assert!(output.contains("$loop0: for (e of [...$T_enemy.$all]) {"));
        assert!(output.contains("$delete(e);"));
    }

    #[test]
    fn test_select_breaks_after_each_case() {
        let output = emit("Select choice\n  Case 1, 2\n    x = 1\n  Default\n    x = 0\nEnd Select");
        assert!(output.contains("switch (choice) {"));
        assert!(output.contains("case 1:\n"));
        assert!(output.contains("case 2:\n"));
        assert!(output.contains("break;"));
        assert!(output.contains("default: {"));
    }

    #[test]
    fn test_exit_inside_select_leaves_loop() {
        let output = emit("While True\n  Select k\n    Case 1\n      Exit\n  End Select\nWend");
        assert!(output.contains("break $loop0;"));
    }

    #[test]
    fn test_exit_in_update_shuts_down() {
        let output = emit_with("If KeyHit(1) Then Exit", true);
        assert!(output.contains("{ await $shutdown(); return; }"));
    }

    #[test]
    fn test_data_statements() {
        let output = emit("Data 1, 2\n.more\nData 3\nRead a, b$\nRestore more\nRestore");
        assert!(output.contains("a = $read();"));
        assert!(output.contains("b = $read();"));
        assert!(output.contains("$dataPtr = 2;"));
        assert!(output.contains("$dataPtr = 0;"));
    }

    #[test]
    fn test_goto_becomes_comment() {
        let output = emit(".top\nGoto top");
        assert!(output.contains("// .top"));
        assert!(output.contains("// Goto top (not supported)"));
    }

    #[test]
    fn test_object_list_statements() {
        let output = emit(
            "Type T\nEnd Type\na.T = New T\nb.T = New T\nInsert a After b\nInsert b Before a\nDelete Each T",
        );
        assert!(output.contains("$insert(a, b, true);"));
        assert!(output.contains("$insert(b, a, false);"));
        assert!(output.contains("$deleteEach($T_t);"));
    }

    #[test]
    fn test_command_statements() {
        let output = emit("Cls\nFlip\nEnd");
        assert!(output.contains("$graphics.cls();"));
        assert!(output.contains("await $graphics.flip("));
        assert!(output.contains("$end();"));
    }

    #[test]
    fn test_return_defaults() {
        assert_eq!(return_default("Name$", None), "\"\"");
        assert_eq!(return_default("Spawn", Some("Enemy")), "null");
        assert_eq!(return_default("total", None), "0");
        assert_eq!(field_default("label$", None), "\"\"");
    }
}
