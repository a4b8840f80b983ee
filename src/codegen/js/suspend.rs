//! Suspension (async) propagation over the user call graph.
//!
//! A function must be emitted `async` if it can reach a suspending builtin,
//! either by calling one itself or by calling another function that does.
//! Every call site of a suspending function or builtin is then emitted with
//! `await`.
//!
//! The analysis is a plain fixpoint: each pass marks every unmarked function
//! that calls a seed builtin or a function marked by an earlier pass, and it
//! stops after the first pass that marks nothing. Marks are never removed, so
//! the number of marking passes is bounded by the number of functions.

use std::collections::{BTreeMap, BTreeSet};

use crate::ast::{ExprKind, Program, StatementKind};
use crate::semantic::fold_name;

use super::analysis::for_each_expr_in;

/// Something a function body calls.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Callee {
    /// A builtin command, by lower-case name.
    Command(String),
    /// A user function, by folded name.
    Function(String),
}

/// Adjacency map from each user function to what its body calls.
#[derive(Debug, Default)]
pub(super) struct CallGraph {
    calls: BTreeMap<String, BTreeSet<Callee>>,
}

/// Result of a propagation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Propagation {
    /// Folded names of every marked function.
    pub marked: BTreeSet<String>,
    /// Number of passes that marked at least one function.
    pub passes: usize,
}

impl CallGraph {
    /// Builds the call graph of every function declared in `program`.
    pub fn build(program: &Program) -> Self {
        let mut graph = CallGraph::default();

        for function in program.functions() {
            let StatementKind::FunctionDeclaration { name, body, .. } = &function.kind else {
                continue;
            };
            let callees = graph.calls.entry(fold_name(name)).or_default();
            for_each_expr_in(body, false, &mut |expr| match &expr.kind {
                ExprKind::Command { name, .. } => {
                    callees.insert(Callee::Command(name.to_ascii_lowercase()));
                }
                ExprKind::Call { name, .. } => {
                    callees.insert(Callee::Function(fold_name(name)));
                }
                _ => {}
            });
        }

        log::debug!("call graph has {} functions", graph.calls.len());
        graph
    }

    /// Adds one edge; used to build graphs by hand.
    #[cfg(test)]
    pub fn add_call(&mut self, caller: &str, callee: Callee) {
        self.calls
            .entry(caller.to_string())
            .or_default()
            .insert(callee);
    }

    /// Marks every function that reaches one of the `seeds` builtins.
    pub fn propagate(&self, seeds: &BTreeSet<String>) -> Propagation {
        let mut marked = BTreeSet::new();
        let mut passes = 0;

        loop {
            let newly: Vec<&String> = self
                .calls
                .iter()
                .filter(|(name, _)| !marked.contains(*name))
                .filter(|(_, callees)| {
                    callees.iter().any(|callee| match callee {
                        Callee::Command(command) => seeds.contains(command),
                        Callee::Function(function) => marked.contains(function),
                    })
                })
                .map(|(name, _)| name)
                .collect();

            if newly.is_empty() {
                break;
            }
            passes += 1;
            marked.extend(newly.into_iter().cloned());
        }

        Propagation { marked, passes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn seeds(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_three_function_chain() {
        let mut graph = CallGraph::default();
        graph.add_call("a", Callee::Function("b".into()));
        graph.add_call("b", Callee::Function("c".into()));
        graph.add_call("c", Callee::Command("waitkey".into()));

        let result = graph.propagate(&seeds(&["waitkey", "flip"]));
        assert_eq!(result.marked, seeds(&["a", "b", "c"]));
        assert!(result.passes <= 3);
    }

    #[test]
    fn test_unrelated_functions_stay_synchronous() {
        let mut graph = CallGraph::default();
        graph.add_call("draw", Callee::Command("cls".into()));
        graph.add_call("loop", Callee::Function("draw".into()));

        let result = graph.propagate(&seeds(&["flip"]));
        assert!(result.marked.is_empty());
        assert_eq!(result.passes, 0);
    }

    #[test]
    fn test_recursion_terminates() {
        let mut graph = CallGraph::default();
        graph.add_call("ping", Callee::Function("pong".into()));
        graph.add_call("pong", Callee::Function("ping".into()));
        graph.add_call("pong", Callee::Command("delay".into()));

        let result = graph.propagate(&seeds(&["delay"]));
        assert_eq!(result.marked, seeds(&["ping", "pong"]));
    }

    #[test]
    fn test_marking_is_monotonic_under_more_seeds() {
        let mut graph = CallGraph::default();
        graph.add_call("a", Callee::Command("delay".into()));
        graph.add_call("b", Callee::Command("waitkey".into()));

        let few = graph.propagate(&seeds(&["delay"]));
        let more = graph.propagate(&seeds(&["delay", "waitkey"]));
        assert!(few.marked.is_subset(&more.marked));
    }

    #[test]
    fn test_graph_built_from_source() {
        let tokens = lex(
            "Function Outer()\n  x = Middle(1) + 2\nEnd Function\nFunction Middle(n)\n  If n Then Inner\n  Return n\nEnd Function\nFunction Inner()\n  WaitKey\nEnd Function",
        );
        let (program, errors) = parse(&tokens);
        assert!(errors.is_empty(), "{errors:?}");

        let graph = CallGraph::build(&program);
        let result = graph.propagate(&seeds(&["waitkey"]));
        assert_eq!(result.marked, seeds(&["inner", "middle", "outer"]));
        assert_eq!(result.passes, 3);
    }
}
