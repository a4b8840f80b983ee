//! JavaScript backend for blitzweb.
//!
//! This backend turns the AST into a script driven by a frame scheduler.
//! The host runtime calls `$init` once, then `$update` once per frame, and
//! `$shutdown` when the program finishes.
//!
//! # Generated Code Structure
//!
//! ```javascript
//! "use strict";
//! const $rt = globalThis.BlitzRuntime;      // runtime wiring
//! const $graphics = $rt.graphics; ...
//! function $dim(sizes, init) { ... }        // helpers
//!
//! const max = 10;                           // constants
//! let score = 0;                            // hoisted variables
//! const $data = [1, 2, 3];                  // DATA pool
//!
//! class $T_enemy { ... }                    // user types
//! async function fn_wait() { ... }          // user functions
//!
//! async function $init() { ... }            // code before the main loop
//! async function $update() { ... }          // one main-loop iteration
//! async function $shutdown() { ... }        // code after the main loop
//!
//! $rt.run({ init: ..., update: ..., shutdown: ... });
//! ```

mod analysis;
mod expr;
mod names;
mod runtime;
mod stmt;
mod suspend;

use std::collections::BTreeSet;

use crate::ast::{Expr, ExprKind, Program, Statement, StatementKind};
use crate::commands::{CommandTable, FRAME_PRIMITIVE};
use crate::semantic::fold_name;

use super::{CodeGenerator, GeneratedOutput};
use analysis::{DataTable, Hoisted, Partition, declared_default, for_each_expr};
use names::{class_name, function_name, js_identifier};
use stmt::{StmtEmitter, field_default, return_default};
use suspend::CallGraph;

/// Facts shared by every routine of one generated script.
pub(super) struct Context<'a> {
    /// Descriptors used to lower builtin commands.
    pub commands: &'a CommandTable,
    /// Lower-case names of builtins that must be awaited.
    pub suspending_commands: BTreeSet<String>,
    /// Folded names of user functions emitted `async`.
    pub suspending_functions: BTreeSet<String>,
    /// The DATA pool, for `Restore` offsets.
    pub data: DataTable,
}

impl<'a> Context<'a> {
    /// Creates a context with no suspending user functions.
    pub fn new(commands: &'a CommandTable, data: DataTable) -> Self {
        Self {
            commands,
            suspending_commands: commands.suspending_names(),
            suspending_functions: BTreeSet::new(),
            data,
        }
    }

    /// Returns true if calls to user function `name` must be awaited.
    pub fn function_suspends(&self, name: &str) -> bool {
        self.suspending_functions.contains(&fold_name(name))
    }

    /// Returns true if calls to builtin `name` must be awaited.
    pub fn command_suspends(&self, name: &str) -> bool {
        self.suspending_commands
            .contains(&name.to_ascii_lowercase())
    }
}

/// Generates a frame-driven JavaScript program.
///
/// # Example
///
/// ```
/// use blitzweb::codegen::{CodeGenerator, JsBackend};
/// use blitzweb::lexer::lex;
/// use blitzweb::parser::parse;
///
/// let tokens = lex("Graphics 640, 480\nWhile Not KeyHit(1)\n  Cls\n  Flip\nWend");
/// let (program, _) = parse(&tokens);
/// let output = JsBackend::new().generate(&program);
/// assert!(output.code.contains("async function $update()"));
/// ```
pub struct JsBackend<'a> {
    commands: &'a CommandTable,
}

impl JsBackend<'static> {
    /// Creates a backend using the standard command table.
    pub fn new() -> Self {
        Self {
            commands: CommandTable::standard(),
        }
    }
}

impl Default for JsBackend<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> JsBackend<'a> {
    /// Creates a backend using a custom command table.
    pub fn with_commands(commands: &'a CommandTable) -> Self {
        Self { commands }
    }

    /// Writes top-level constants. Deferred ones become `let` bindings that
    /// `$init` assigns before anything else runs.
    fn emit_constants(
        &self,
        parts: &Partition<'_>,
        ctx: &Context<'_>,
        deferred: &BTreeSet<String>,
        output: &mut String,
    ) {
        for constant in &parts.constants {
            if let StatementKind::Const { name, value } = &constant.kind {
                let js_name = js_identifier(name);
                if deferred.contains(&js_name) {
                    output.push_str(&format!(
                        "let {} = {};\n",
                        js_name,
                        declared_default(name, None)
                    ));
                } else {
                    output.push_str(&format!(
                        "const {} = {};\n",
                        js_name,
                        expr::emit_expr(value, ctx)
                    ));
                }
            }
        }
        if !parts.constants.is_empty() {
            output.push('\n');
        }
    }

    fn emit_hoisted(&self, names: &Hoisted, output: &mut String) {
        for (name, init) in names {
            output.push_str(&format!("let {} = {};\n", name, init));
        }
        if !names.is_empty() {
            output.push('\n');
        }
    }

    fn emit_type(&self, stmt: &Statement, output: &mut String) {
        let StatementKind::TypeDeclaration { name, fields } = &stmt.kind else {
            return;
        };
        let class = class_name(name);
        output.push_str(&format!("class {} {{\n", class));
        output.push_str("    static $all = [];\n");
        output.push_str("    constructor() {\n");
        for field in fields {
            output.push_str(&format!(
                "        this.{} = {};\n",
                js_identifier(&field.name),
                field_default(&field.name, field.type_name.as_deref())
            ));
        }
        output.push_str(&format!("        {}.$all.push(this);\n", class));
        output.push_str("    }\n}\n\n");
    }

    fn emit_function(
        &self,
        stmt: &Statement,
        ctx: &Context<'_>,
        globals: &BTreeSet<String>,
        output: &mut String,
    ) {
        let StatementKind::FunctionDeclaration {
            name,
            return_type,
            params,
            body,
        } = &stmt.kind
        else {
            return;
        };

        let keyword = if ctx.function_suspends(name) {
            "async function"
        } else {
            "function"
        };
        let param_list: Vec<String> = params
            .iter()
            .map(|p| match &p.default {
                Some(default) => format!(
                    "{} = {}",
                    js_identifier(&p.name),
                    expr::emit_expr(default, ctx)
                ),
                None => js_identifier(&p.name),
            })
            .collect();
        output.push_str(&format!(
            "{} {}({}) {{\n",
            keyword,
            function_name(name),
            param_list.join(", ")
        ));

        let param_names: BTreeSet<String> = params.iter().map(|p| js_identifier(&p.name)).collect();
        for (local, init) in analysis::function_locals(body, &param_names, globals) {
            output.push_str(&format!("    let {} = {};\n", local, init));
        }

        let default = return_default(name, return_type.as_deref());
        let mut emitter = StmtEmitter::for_function(ctx, default);
        emitter.emit_block(body, output);
        emitter.line(output, &format!("return {};", default));
        output.push_str("}\n\n");
    }

    fn emit_routines(
        &self,
        parts: &Partition<'_>,
        ctx: &Context<'_>,
        deferred: &BTreeSet<String>,
        output: &mut String,
    ) {
        output.push_str("async function $init() {\n");
        let mut emitter = StmtEmitter::new(ctx);
        for constant in &parts.constants {
            if let StatementKind::Const { name, value } = &constant.kind
                && deferred.contains(&js_identifier(name))
            {
                let line = format!("{} = {};", js_identifier(name), expr::emit_expr(value, ctx));
                emitter.line(output, &line);
            }
        }
        for stmt in &parts.init {
            emitter.emit_stmt(stmt, output);
        }
        if parts.main_loop.is_none() {
            emitter.line(output, "await $shutdown();");
        }
        output.push_str("}\n\n");

        output.push_str("async function $update() {\n");
        let mut emitter = StmtEmitter::for_update(ctx);
        match parts.main_loop.map(|s| &s.kind) {
            Some(StatementKind::While { condition, body }) => {
                let line = format!(
                    "if (!({})) {{ await $shutdown(); return; }}",
                    expr::emit_expr(condition, ctx)
                );
                emitter.line(output, &line);
                emitter.emit_block(body, output);
            }
            Some(StatementKind::Repeat { body, until }) => {
                emitter.emit_block(body, output);
                if let Some(condition) = until {
                    let line = format!(
                        "if ({}) {{ await $shutdown(); return; }}",
                        expr::emit_expr(condition, ctx)
                    );
                    emitter.line(output, &line);
                }
            }
            _ => {}
        }
        output.push_str("}\n\n");

        output.push_str("async function $shutdown() {\n");
        let mut emitter = StmtEmitter::new(ctx);
        for stmt in &parts.shutdown {
            emitter.emit_stmt(stmt, output);
        }
        emitter.line(output, "$rt.stop();");
        output.push_str("}\n\n");
    }
}

impl CodeGenerator for JsBackend<'_> {
    fn generate(&self, program: &Program) -> GeneratedOutput {
        let graph = CallGraph::build(program);

        let suspending = graph.propagate(&self.commands.suspending_names());
        log::debug!(
            "{} suspending functions after {} passes",
            suspending.marked.len(),
            suspending.passes
        );
        let frame_seed: BTreeSet<String> = [FRAME_PRIMITIVE.to_string()].into();
        let frame_functions = graph.propagate(&frame_seed).marked;

        let parts = analysis::partition(program, &frame_functions);
        log::debug!(
            "partition: {} types, {} functions, {} constants, main loop {}",
            parts.types.len(),
            parts.functions.len(),
            parts.constants.len(),
            if parts.main_loop.is_some() { "found" } else { "absent" }
        );

        let mut ctx = Context::new(self.commands, DataTable::collect(program));
        ctx.suspending_functions = suspending.marked;

        let deferred = deferred_constants(&parts, &ctx);
        let hoisted = analysis::top_level_names(&parts);
        let globals = analysis::declared_globals(program);

        let mut output = String::new();
        runtime::emit_preamble(&mut output);
        self.emit_constants(&parts, &ctx, &deferred, &mut output);
        self.emit_hoisted(&hoisted, &mut output);
        runtime::emit_data_table(&mut output, &ctx.data);
        for stmt in &parts.types {
            self.emit_type(stmt, &mut output);
        }
        for stmt in &parts.functions {
            self.emit_function(stmt, &ctx, &globals, &mut output);
        }
        self.emit_routines(&parts, &ctx, &deferred, &mut output);
        runtime::emit_run(&mut output);

        log::debug!("generated {} bytes of JavaScript", output.len());
        GeneratedOutput::javascript(output)
    }

    fn backend_name(&self) -> &'static str {
        "JavaScript"
    }
}

/// Names of top-level constants that cannot be initialised at script load.
///
/// A classic script cannot `await` outside a function, so a constant whose
/// value suspends is assigned in `$init` instead. So is any later constant
/// that reads one of those, to keep the source order of evaluation.
fn deferred_constants(parts: &Partition<'_>, ctx: &Context<'_>) -> BTreeSet<String> {
    let mut deferred = BTreeSet::new();
    for constant in &parts.constants {
        if let StatementKind::Const { name, value } = &constant.kind
            && needs_init(value, ctx, &deferred)
        {
            deferred.insert(js_identifier(name));
        }
    }
    if !deferred.is_empty() {
        log::debug!("{} constants initialised in $init", deferred.len());
    }
    deferred
}

fn needs_init(value: &Expr, ctx: &Context<'_>, deferred: &BTreeSet<String>) -> bool {
    let mut found = false;
    for_each_expr(value, &mut |expr| match &expr.kind {
        ExprKind::Command { name, .. } if ctx.command_suspends(name) => found = true,
        ExprKind::Call { name, .. } if ctx.function_suspends(name) => found = true,
        ExprKind::Variable { name, .. } if deferred.contains(&js_identifier(name)) => {
            found = true
        }
        _ => {}
    });
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandDescriptor;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn generate(source: &str) -> String {
        let tokens = lex(source);
        let (program, errors) = parse(&tokens);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        JsBackend::new().generate(&program).code
    }

    #[test]
    fn test_emission_order() {
        let code = generate(
            "Const MAX = 3\nType Enemy\nField hp\nEnd Type\nData 1\nscore = 0\nFunction Tick()\nEnd Function\nWhile Not KeyHit(1)\nFlip\nWend",
        );
        let order = [
            "const $rt",
            "const max = 3;",
            "let score = 0;",
            "const $data = [1];",
            "class $T_enemy",
            "function fn_tick()",
            "async function $init()",
            "async function $update()",
            "async function $shutdown()",
            "$rt.run(",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|needle| code.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{code}");
    }

    #[test]
    fn test_suspending_function_is_async_and_awaited() {
        let code = generate("Function Pause()\n  WaitKey\nEnd Function\nPause\nx = Pause()");
        assert!(code.contains("async function fn_pause()"));
        assert!(code.contains("await fn_pause();"));
        assert!(code.contains("x = (await fn_pause());"));
    }

    #[test]
    fn test_plain_function_is_synchronous() {
        let code = generate("Function Add(a, b)\n  Return a + b\nEnd Function\nx = Add(1, 2)");
        assert!(code.contains("\nfunction fn_add(a, b) {"));
        assert!(code.contains("return (a + b);"));
        assert!(code.contains("x = fn_add(1, 2);"));
    }

    #[test]
    fn test_while_main_loop_prologue() {
        let code = generate("Graphics 640, 480\nWhile Not KeyHit(1)\n  Cls\n  Flip\nWend\nx = 1");
        assert!(code.contains("if (!((!$input.keyHit(\"Escape\")))) { await $shutdown(); return; }"));
        let shutdown = &code[code.find("async function $shutdown()").unwrap_or(0)..];
        assert!(shutdown.contains("x = 1;"));
        assert!(shutdown.contains("$rt.stop();"));
    }

    #[test]
    fn test_repeat_until_main_loop_epilogue() {
        let code = generate("Repeat\n  Flip\nUntil done");
        let update = &code[code.find("async function $update()").unwrap_or(0)..];
        assert!(update.contains("await $graphics.flip("));
        assert!(update.contains("if (done) { await $shutdown(); return; }"));
    }

    #[test]
    fn test_without_main_loop_init_shuts_down() {
        let code = generate("Print \"hi\"");
        let init = &code[code.find("async function $init()").unwrap_or(0)..];
        assert!(init.contains("await $shutdown();"));
    }

    #[test]
    fn test_restore_uses_data_offsets() {
        let code = generate("Data 1, 2, 3\n.L\nData 4, 5\nRestore L\nRead x");
        assert!(code.contains("const $data = [1, 2, 3, 4, 5];"));
        assert!(code.contains("$dataPtr = 3;"));
        assert!(code.contains("x = $read();"));
    }

    #[test]
    fn test_suspending_constant_is_set_in_init() {
        let code = generate("Const K = WaitKey()\nConst TWICE = K * 2\nConst MAX = 10\nPrint K");
        assert!(!code.contains("const k ="));
        assert!(code.contains("let k = 0;"));
        assert!(code.contains("let twice = 0;"));
        assert!(code.contains("const max = 10;"));
        let init = &code[code.find("async function $init()").unwrap_or(0)..];
        assert!(init.starts_with(
            "async function $init() {\n    k = (await $input.waitKey());\n    twice = (k * 2);\n"
        ));
    }

    #[test]
    fn test_function_const_shadows_global_const() {
        let code = generate("Const MAX = 3\nFunction F()\n  Const MAX = 5\n  Return MAX\nEnd Function");
        assert!(code.contains("const max = 3;"));
        assert!(code.contains("function fn_f() {\n    let max = 0;\n    max = 5;\n    return max;\n"));
    }

    #[test]
    fn test_reading_past_data_uses_bounded_helper() {
        let code = generate("Data 7\nRead a, b");
        assert!(code.contains("const $data = [7];"));
        assert!(code.contains("a = $read();"));
        assert!(code.contains("b = $read();"));
        assert!(code.contains("$dataPtr < $data.length ? $data[$dataPtr++] : 0"));
    }

    #[test]
    fn test_type_class_registry() {
        let code = generate("Type Enemy\nField hp\nField name$\nField target.Enemy\nEnd Type");
        assert!(code.contains("class $T_enemy {"));
        assert!(code.contains("static $all = [];"));
        assert!(code.contains("this.hp = 0;"));
        assert!(code.contains("this.name = \"\";"));
        assert!(code.contains("this.target = null;"));
        assert!(code.contains("$T_enemy.$all.push(this);"));
    }

    #[test]
    fn test_function_locals_are_declared() {
        let code = generate("Global score\nFunction Bump(n)\n  temp = n + 1\n  score = temp\nEnd Function");
        assert!(code.contains("function fn_bump(n) {\n    let temp = 0;\n"));
        assert!(!code.contains("let n = "));
        assert!(code.contains("    return 0;\n}"));
    }

    #[test]
    fn test_custom_command_table() {
        let mut table = CommandTable::empty();
        table.insert("beep", CommandDescriptor::call("audio.beep").suspending());
        let tokens = lex("Function Alert()\nEnd Function\nAlert");
        let (program, _) = parse(&tokens);
        let code = JsBackend::with_commands(&table).generate(&program).code;
        assert!(code.contains("function fn_alert()"));
        assert!(!code.contains("async function fn_alert()"));
    }

    #[test]
    fn test_backend_name() {
        assert_eq!(JsBackend::new().backend_name(), "JavaScript");
    }
}
