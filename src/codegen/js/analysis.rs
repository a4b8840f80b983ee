//! Program analysis for the JavaScript backend.
//!
//! This module provides the passes that run before any code is emitted:
//!
//! - AST traversal helpers shared by every pass
//! - Top-level partition into types, functions, constants, initialization,
//!   the main loop and shutdown
//! - Variable hoisting for the top level and for each function
//! - DATA pool linearization with label offsets for `Restore`

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::ast::{DataValue, DeclScope, Expr, ExprKind, Program, Statement, StatementKind};
use crate::commands::FRAME_PRIMITIVE;
use crate::semantic::{ValueType, fold_name, type_from_suffix};

use super::names::js_identifier;

// ==================== Traversal ====================

/// Nested statement blocks of a statement, in source order.
pub(super) fn child_blocks(stmt: &Statement) -> Vec<&[Statement]> {
    match &stmt.kind {
        StatementKind::If {
            then_branch,
            elseif_branches,
            else_branch,
            ..
        } => {
            let mut blocks = vec![then_branch.as_slice()];
            blocks.extend(elseif_branches.iter().map(|(_, b)| b.as_slice()));
            blocks.extend(else_branch.as_deref());
            blocks
        }
        StatementKind::While { body, .. }
        | StatementKind::Repeat { body, .. }
        | StatementKind::For { body, .. }
        | StatementKind::ForEach { body, .. }
        | StatementKind::FunctionDeclaration { body, .. } => vec![body.as_slice()],
        StatementKind::Select { cases, default, .. } => {
            let mut blocks: Vec<&[Statement]> = cases.iter().map(|c| c.body.as_slice()).collect();
            blocks.extend(default.as_deref());
            blocks
        }
        _ => Vec::new(),
    }
}

/// Expressions owned directly by a statement (not by its nested blocks).
pub(super) fn direct_exprs(stmt: &Statement) -> Vec<&Expr> {
    match &stmt.kind {
        StatementKind::Assignment { target, value } => vec![target, value],
        StatementKind::Declaration { vars, .. } => {
            vars.iter().filter_map(|v| v.value.as_ref()).collect()
        }
        StatementKind::Dim { arrays } => arrays.iter().flat_map(|a| &a.dimensions).collect(),
        StatementKind::Const { value, .. } => vec![value],
        StatementKind::If {
            condition,
            elseif_branches,
            ..
        } => {
            let mut exprs = vec![condition];
            exprs.extend(elseif_branches.iter().map(|(c, _)| c));
            exprs
        }
        StatementKind::While { condition, .. } => vec![condition],
        StatementKind::Repeat { until, .. } => until.iter().collect(),
        StatementKind::For {
            start, end, step, ..
        } => {
            let mut exprs = vec![start, end];
            exprs.extend(step.iter());
            exprs
        }
        StatementKind::Select { subject, cases, .. } => {
            let mut exprs = vec![subject];
            exprs.extend(cases.iter().flat_map(|c| &c.values));
            exprs
        }
        StatementKind::FunctionDeclaration { params, .. } => {
            params.iter().filter_map(|p| p.default.as_ref()).collect()
        }
        StatementKind::Return(value) => value.iter().collect(),
        StatementKind::Read(targets) => targets.iter().collect(),
        StatementKind::Delete(expr) | StatementKind::Expression(expr) => vec![expr],
        StatementKind::Insert { object, anchor, .. } => vec![object, anchor],
        StatementKind::ForEach { .. }
        | StatementKind::TypeDeclaration { .. }
        | StatementKind::Exit
        | StatementKind::End
        | StatementKind::Goto(_)
        | StatementKind::Gosub(_)
        | StatementKind::Label(_)
        | StatementKind::Data(_)
        | StatementKind::Restore(_)
        | StatementKind::DeleteEach(_) => Vec::new(),
    }
}

/// Calls `f` on every statement and nested statement in source order.
///
/// Function bodies are entered only when `into_functions` is set.
pub(super) fn for_each_statement<'p>(
    stmts: &'p [Statement],
    into_functions: bool,
    f: &mut impl FnMut(&'p Statement),
) {
    for stmt in stmts {
        f(stmt);
        if !into_functions && matches!(stmt.kind, StatementKind::FunctionDeclaration { .. }) {
            continue;
        }
        for block in child_blocks(stmt) {
            for_each_statement(block, into_functions, f);
        }
    }
}

/// Calls `f` on `expr` and every sub-expression.
pub(super) fn for_each_expr<'p>(expr: &'p Expr, f: &mut impl FnMut(&'p Expr)) {
    f(expr);
    match &expr.kind {
        ExprKind::Binary { left, right, .. } => {
            for_each_expr(left, f);
            for_each_expr(right, f);
        }
        ExprKind::Unary { operand, .. } => for_each_expr(operand, f),
        ExprKind::Grouped(inner) | ExprKind::After(inner) | ExprKind::Before(inner) => {
            for_each_expr(inner, f)
        }
        ExprKind::Call { args, .. } | ExprKind::Command { args, .. } => {
            args.iter().for_each(|a| for_each_expr(a, f))
        }
        ExprKind::ArrayAccess { indices, .. } => indices.iter().for_each(|i| for_each_expr(i, f)),
        ExprKind::FieldAccess { object, .. } => for_each_expr(object, f),
        ExprKind::IntegerLiteral(_)
        | ExprKind::FloatLiteral(_)
        | ExprKind::StringLiteral(_)
        | ExprKind::BooleanLiteral(_)
        | ExprKind::Null
        | ExprKind::Variable { .. }
        | ExprKind::New(_)
        | ExprKind::First(_)
        | ExprKind::Last(_)
        | ExprKind::Error => {}
    }
}

/// Calls `f` on every expression in `stmts`, nested blocks included.
pub(super) fn for_each_expr_in<'p>(
    stmts: &'p [Statement],
    into_functions: bool,
    f: &mut impl FnMut(&'p Expr),
) {
    for_each_statement(stmts, into_functions, &mut |stmt| {
        for expr in direct_exprs(stmt) {
            for_each_expr(expr, f);
        }
    });
}

// ==================== Partition ====================

/// The top level of a program, split by role.
#[derive(Debug, Default)]
pub(super) struct Partition<'p> {
    /// `Type` declarations.
    pub types: Vec<&'p Statement>,
    /// `Function` declarations.
    pub functions: Vec<&'p Statement>,
    /// `Const` declarations outside functions, in source order.
    pub constants: Vec<&'p Statement>,
    /// Statements run once before the main loop.
    pub init: Vec<&'p Statement>,
    /// The main loop, run as one iteration per frame.
    pub main_loop: Option<&'p Statement>,
    /// Statements after the main loop.
    pub shutdown: Vec<&'p Statement>,
}

impl<'p> Partition<'p> {
    /// Every plain top-level statement, the main loop included.
    pub fn plain_statements(&self) -> impl Iterator<Item = &'p Statement> + '_ {
        self.init
            .iter()
            .chain(self.main_loop.iter())
            .chain(self.shutdown.iter())
            .copied()
    }
}

/// Splits the top level of `program`.
///
/// The main loop is the first top-level `While` or `Repeat` whose body calls
/// the frame primitive, directly or through one of `frame_functions`. Only
/// that first match is treated specially; later loops stay ordinary code.
pub(super) fn partition<'p>(program: &'p Program, frame_functions: &BTreeSet<String>) -> Partition<'p> {
    let mut parts = Partition::default();

    for_each_statement(&program.statements, false, &mut |stmt| {
        if matches!(stmt.kind, StatementKind::Const { .. }) {
            parts.constants.push(stmt);
        }
    });

    for stmt in &program.statements {
        match &stmt.kind {
            StatementKind::TypeDeclaration { .. } => parts.types.push(stmt),
            StatementKind::FunctionDeclaration { .. } => parts.functions.push(stmt),
            StatementKind::While { body, .. } | StatementKind::Repeat { body, .. }
                if parts.main_loop.is_none() && reaches_frame(body, frame_functions) =>
            {
                parts.main_loop = Some(stmt);
            }
            _ if parts.main_loop.is_some() => parts.shutdown.push(stmt),
            _ => parts.init.push(stmt),
        }
    }

    parts
}

/// Returns true if `body` presents a frame, directly or through a call.
pub(super) fn reaches_frame(body: &[Statement], frame_functions: &BTreeSet<String>) -> bool {
    let mut found = false;
    for_each_expr_in(body, false, &mut |expr| match &expr.kind {
        ExprKind::Command { name, .. } if name.eq_ignore_ascii_case(FRAME_PRIMITIVE) => {
            found = true
        }
        ExprKind::Call { name, .. } if frame_functions.contains(&fold_name(name)) => found = true,
        _ => {}
    });
    found
}

// ==================== Hoisting ====================

/// JavaScript names to declare, each with its initial value.
pub(super) type Hoisted = BTreeMap<String, String>;

/// Initial value for a variable of the given BASIC type.
pub(super) fn default_value(ty: ValueType) -> &'static str {
    match ty {
        ValueType::String => "\"\"",
        ValueType::Object | ValueType::Null => "null",
        _ => "0",
    }
}

/// Initial value for a declared name: annotation, then suffix, then number.
pub(super) fn declared_default(name: &str, type_name: Option<&str>) -> &'static str {
    if type_name.is_some() {
        return "null";
    }
    default_value(type_from_suffix(name).unwrap_or(ValueType::Number))
}

fn hoist(names: &mut Hoisted, name: &str, init: &str) {
    let key = js_identifier(name);
    match names.get(&key) {
        Some(existing) if existing != "0" || init == "0" => {}
        _ => {
            names.insert(key, init.to_string());
        }
    }
}

/// Collects every variable and array name used in `stmts`.
///
/// Function bodies are not entered.
pub(super) fn collect_names(stmts: &[Statement]) -> Hoisted {
    let mut names = Hoisted::new();
    collect_names_into(&mut names, stmts);
    names
}

fn collect_names_into(names: &mut Hoisted, stmts: &[Statement]) {
    for_each_statement(stmts, false, &mut |stmt| match &stmt.kind {
        StatementKind::For { variable, .. } => hoist(names, variable, "0"),
        StatementKind::ForEach { variable, .. } => hoist(names, variable, "null"),
        StatementKind::Declaration { vars, .. } => {
            for var in vars {
                hoist(names, &var.name, declared_default(&var.name, var.type_name.as_deref()));
            }
        }
        StatementKind::Dim { arrays } => {
            for array in arrays {
                hoist(names, &array.name, "[]");
            }
        }
        StatementKind::Const { name, .. } => hoist(names, name, "0"),
        _ => {}
    });

    for_each_expr_in(stmts, false, &mut |expr| match &expr.kind {
        ExprKind::Variable { name, type_name } => {
            let init = if type_name.is_some() {
                "null"
            } else {
                match type_from_suffix(name) {
                    Some(ty) => default_value(ty),
                    None => default_value(expr.ty),
                }
            };
            hoist(names, name, init);
        }
        ExprKind::ArrayAccess { name, .. } => hoist(names, name, "[]"),
        _ => {}
    });
}

/// Names every function sees as global: `Global` and `Dim` anywhere, and
/// constants outside functions.
pub(super) fn declared_globals(program: &Program) -> BTreeSet<String> {
    let mut globals = BTreeSet::new();

    for_each_statement(&program.statements, true, &mut |stmt| match &stmt.kind {
        StatementKind::Declaration {
            scope: DeclScope::Global,
            vars,
        } => globals.extend(vars.iter().map(|v| js_identifier(&v.name))),
        StatementKind::Dim { arrays } => {
            globals.extend(arrays.iter().map(|a| js_identifier(&a.name)))
        }
        _ => {}
    });
    for_each_statement(&program.statements, false, &mut |stmt| {
        if let StatementKind::Const { name, .. } = &stmt.kind {
            globals.insert(js_identifier(name));
        }
    });

    globals
}

/// Names declared with `let` at the top of the generated script.
///
/// Every name used outside functions, plus globals declared inside them,
/// minus the constants (emitted separately).
pub(super) fn top_level_names(parts: &Partition<'_>) -> Hoisted {
    let mut names = Hoisted::new();
    for stmt in parts.plain_statements() {
        collect_names_into(&mut names, std::slice::from_ref(stmt));
    }

    for function in &parts.functions {
        for_each_statement(std::slice::from_ref(*function), true, &mut |stmt| match &stmt.kind {
            StatementKind::Declaration {
                scope: DeclScope::Global,
                vars,
            } => {
                for var in vars {
                    hoist(&mut names, &var.name, declared_default(&var.name, var.type_name.as_deref()));
                }
            }
            StatementKind::Dim { arrays } => {
                for array in arrays {
                    hoist(&mut names, &array.name, "[]");
                }
            }
            _ => {}
        });
    }

    for constant in &parts.constants {
        if let StatementKind::Const { name, .. } = &constant.kind {
            names.remove(&js_identifier(name));
        }
    }
    names
}

/// Names a function body declares with `let`: everything it uses that is
/// neither a parameter nor a declared global. Names declared `Local` or
/// `Const` in the body shadow globals of the same name.
pub(super) fn function_locals(
    body: &[Statement],
    params: &BTreeSet<String>,
    globals: &BTreeSet<String>,
) -> Hoisted {
    let mut locals = collect_names(body);
    let mut declared_local = BTreeSet::new();
    for_each_statement(body, false, &mut |stmt| match &stmt.kind {
        StatementKind::Declaration {
            scope: DeclScope::Local,
            vars,
        } => declared_local.extend(vars.iter().map(|v| js_identifier(&v.name))),
        StatementKind::Const { name, .. } => {
            declared_local.insert(js_identifier(name));
        }
        _ => {}
    });

    locals.retain(|name, _| {
        !params.contains(name) && (declared_local.contains(name) || !globals.contains(name))
    });
    locals
}

// ==================== DATA Pool ====================

/// The flat DATA pool with the offset of every label.
#[derive(Debug, Default)]
pub(super) struct DataTable {
    /// Every `Data` value in source order.
    pub values: Vec<DataValue>,
    /// Folded label name to the pool length where the label appeared.
    pub labels: HashMap<String, usize>,
}

impl DataTable {
    /// Linearizes every `Data` statement in `program`, functions included.
    pub fn collect(program: &Program) -> Self {
        let mut table = DataTable::default();

        for_each_statement(&program.statements, true, &mut |stmt| match &stmt.kind {
            StatementKind::Label(name) => {
                table
                    .labels
                    .entry(name.to_ascii_lowercase())
                    .or_insert(table.values.len());
            }
            StatementKind::Data(values) => table.values.extend(values.iter().cloned()),
            _ => {}
        });

        table
    }

    /// Read cursor after `Restore [label]`.
    ///
    /// No label, or one that was never declared, rewinds to the start.
    pub fn restore_offset(&self, label: Option<&str>) -> usize {
        label
            .and_then(|l| self.labels.get(&l.to_ascii_lowercase()))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn program(source: &str) -> Program {
        let tokens = lex(source);
        let (program, errors) = parse(&tokens);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        program
    }

    #[test]
    fn test_data_label_offsets() {
        let program = program("Data 1, 2, 3\n.L\nData 4, 5\n");
        let table = DataTable::collect(&program);
        assert_eq!(table.values.len(), 5);
        assert_eq!(table.labels.get("l"), Some(&3));
        assert_eq!(table.restore_offset(Some("L")), 3);
        assert_eq!(table.restore_offset(Some("nowhere")), 0);
        assert_eq!(table.restore_offset(None), 0);
    }

    #[test]
    fn test_data_inside_blocks_and_functions_is_in_source_order() {
        let program = program(
            "If a\n  Data 1\nEndIf\nFunction f()\n  .inner\n  Data \"x\"\nEnd Function\nData 2.5",
        );
        let table = DataTable::collect(&program);
        assert_eq!(
            table.values,
            vec![
                DataValue::Integer(1),
                DataValue::String("x".into()),
                DataValue::Float(2.5),
            ]
        );
        assert_eq!(table.restore_offset(Some("inner")), 1);
    }

    #[test]
    fn test_partition_finds_first_frame_loop() {
        let program = program(
            "Graphics 640, 480\nWhile i < 3\n  i = i + 1\nWend\nWhile Not KeyHit(1)\n  Cls\n  Flip\nWend\nRepeat\n  Flip\nForever\nEnd",
        );
        let parts = partition(&program, &BTreeSet::new());
        assert_eq!(parts.init.len(), 2);
        assert!(matches!(
            parts.main_loop.map(|s| &s.kind),
            Some(StatementKind::While { .. })
        ));
        assert_eq!(parts.shutdown.len(), 2);
    }

    #[test]
    fn test_main_loop_found_through_function() {
        let program = program("Repeat\n  Render\nForever\nFunction Render()\n  Flip\nEnd Function");
        let frame: BTreeSet<String> = ["render".to_string()].into();
        let parts = partition(&program, &frame);
        assert!(parts.main_loop.is_some());
        assert_eq!(parts.functions.len(), 1);
        assert!(parts.init.is_empty());
    }

    #[test]
    fn test_no_frame_loop_means_no_main_loop() {
        let program = program("While True\n  Cls\nWend");
        let parts = partition(&program, &BTreeSet::new());
        assert!(parts.main_loop.is_none());
        assert_eq!(parts.init.len(), 1);
    }

    #[test]
    fn test_top_level_names_exclude_constants() {
        let program = program(
            "Const MAX = 10\nname$ = \"x\"\nFor i = 1 To MAX\n  total = total + i\nNext\nFunction f()\n  Global hits\n  Dim grid(3)\nEnd Function",
        );
        let parts = partition(&program, &BTreeSet::new());
        let names = top_level_names(&parts);
        assert_eq!(names.get("name").map(String::as_str), Some("\"\""));
        assert_eq!(names.get("i").map(String::as_str), Some("0"));
        assert!(names.contains_key("total"));
        assert!(names.contains_key("hits"));
        assert_eq!(names.get("grid").map(String::as_str), Some("[]"));
        assert!(!names.contains_key("max"));
    }

    #[test]
    fn test_function_locals_skip_globals_and_params() {
        let program = program(
            "Global score\nDim grid(3)\nFunction f(a)\n  temp = a + score + grid(1)\n  Local score = 2\nEnd Function",
        );
        let globals = declared_globals(&program);
        let StatementKind::FunctionDeclaration { body, .. } = &program.statements[2].kind else {
            panic!("expected function");
        };
        let params: BTreeSet<String> = ["a".to_string()].into();
        let locals = function_locals(body, &params, &globals);
        let names: Vec<_> = locals.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["score", "temp"]);
    }

    #[test]
    fn test_function_const_shadows_global_const() {
        let program = program("Const MAX = 3\nFunction f()\n  Const MAX = 5\n  Return MAX\nEnd Function");
        let globals = declared_globals(&program);
        assert!(globals.contains("max"));
        let StatementKind::FunctionDeclaration { body, .. } = &program.statements[1].kind else {
            panic!("expected function");
        };
        let locals = function_locals(body, &BTreeSet::new(), &globals);
        assert_eq!(locals.get("max").map(String::as_str), Some("0"));
    }
}
