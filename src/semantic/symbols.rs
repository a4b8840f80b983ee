//! Symbol table for blitzweb.
//!
//! The symbol table is consulted and mutated *during parsing*: whether
//! `name(1)` is an array element or a call depends on what was declared
//! before it. It supports:
//!
//! - **Nested scopes**: a global scope plus one scope per function body
//! - **Case-insensitive lookups**: keys are folded and suffix-free
//! - **Outward resolution**: lookups walk from the innermost scope out
//!
//! # Scope Rules
//!
//! Unlike classic BASIC, function bodies can see globals without a SHARED
//! declaration. Names first used inside a function stay local to it and
//! vanish when the function's scope is exited.

use crate::semantic::types::{ValueType, fold_name};
use std::collections::HashMap;

/// A named entity known to the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Case-folded name without suffix.
    pub name: String,
    /// The declared or inferred type.
    pub declared_type: ValueType,
    /// User type name for object references (`p.Player` -> `player`).
    pub type_name: Option<String>,
    /// What kind of symbol this is.
    pub kind: SymbolKind,
}

/// The kind of symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    /// A scalar variable or parameter.
    Variable,
    /// A `Dim` array.
    Array {
        /// Number of dimensions.
        dimensions: usize,
    },
    /// A user function.
    Function {
        /// Parameter names as written.
        params: Vec<String>,
    },
    /// A user type.
    Type {
        /// Field names as written.
        fields: Vec<String>,
    },
}

impl Symbol {
    /// A scalar variable.
    pub fn variable(name: &str, declared_type: ValueType) -> Self {
        Self {
            name: fold_name(name),
            declared_type,
            type_name: None,
            kind: SymbolKind::Variable,
        }
    }

    /// An array with `dimensions` indices.
    pub fn array(name: &str, declared_type: ValueType, dimensions: usize) -> Self {
        Self {
            kind: SymbolKind::Array { dimensions },
            ..Self::variable(name, declared_type)
        }
    }

    /// A user function returning `returns`.
    pub fn function(name: &str, returns: ValueType, params: Vec<String>) -> Self {
        Self {
            kind: SymbolKind::Function { params },
            ..Self::variable(name, returns)
        }
    }

    /// A user type declaration.
    pub fn user_type(name: &str, fields: Vec<String>) -> Self {
        Self {
            type_name: Some(fold_name(name)),
            kind: SymbolKind::Type { fields },
            ..Self::variable(name, ValueType::Object)
        }
    }

    /// Attaches a user type name, making this an object reference.
    pub fn with_type_name(mut self, type_name: &str) -> Self {
        self.type_name = Some(fold_name(type_name));
        self.declared_type = ValueType::Object;
        self
    }

    /// Returns true if this symbol is an array.
    pub fn is_array(&self) -> bool {
        matches!(self.kind, SymbolKind::Array { .. })
    }

    /// Returns true if this symbol is a user function.
    pub fn is_function(&self) -> bool {
        matches!(self.kind, SymbolKind::Function { .. })
    }
}

/// A stack of scopes, innermost last.
///
/// A fresh table is built for every compilation, so nothing leaks between
/// independent programs.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Symbol>>,
}

impl SymbolTable {
    /// Creates a table holding only the global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    /// Pushes a new innermost scope (function body).
    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pops the innermost scope, discarding its symbols.
    ///
    /// The global scope is never popped.
    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Number of scopes on the stack (1 at top level).
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Returns true while parsing top-level code.
    pub fn is_global_scope(&self) -> bool {
        self.scopes.len() == 1
    }

    /// Defines a symbol in the innermost scope.
    ///
    /// Returns the symbol it replaced, if any. Redefinition is not an error:
    /// `Local x` after an implicit `x` simply refines it.
    pub fn define(&mut self, symbol: Symbol) -> Option<Symbol> {
        self.scopes.last_mut()?.insert(symbol.name.clone(), symbol)
    }

    /// Defines a symbol in the global scope regardless of nesting.
    pub fn define_global(&mut self, symbol: Symbol) -> Option<Symbol> {
        self.scopes[0].insert(symbol.name.clone(), symbol)
    }

    /// Resolves a name from the innermost scope outward.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let key = fold_name(name);
        self.scopes.iter().rev().find_map(|scope| scope.get(&key))
    }

    /// Resolves a name in the innermost scope only.
    pub fn lookup_current(&self, name: &str) -> Option<&Symbol> {
        let key = fold_name(name);
        self.scopes.last().and_then(|scope| scope.get(&key))
    }

    /// Returns true if `name` currently resolves to an array.
    pub fn is_array(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(Symbol::is_array)
    }

    /// Returns true if `name` resolves to a user function.
    pub fn is_function(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(Symbol::is_function)
    }

    /// Returns true if `name` is a declared user type.
    pub fn is_type(&self, name: &str) -> bool {
        self.lookup(name)
            .is_some_and(|s| matches!(s.kind, SymbolKind::Type { .. }))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_local_is_gone_after_exit() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        table.define(Symbol::variable("temp", ValueType::Number));
        assert!(table.lookup("temp").is_some());
        table.exit_scope();
        assert!(table.lookup("temp").is_none());
    }

    #[test]
    fn test_global_visible_inside_function() {
        let mut table = SymbolTable::new();
        table.define(Symbol::variable("score", ValueType::Number));
        table.enter_scope();
        assert!(table.lookup("SCORE").is_some());
        assert!(table.lookup_current("score").is_none());
        table.exit_scope();
    }

    #[test]
    fn test_inner_scope_shadows_outer() {
        let mut table = SymbolTable::new();
        table.define(Symbol::variable("x", ValueType::Number));
        table.enter_scope();
        table.define(Symbol::variable("x$", ValueType::String));
        assert_eq!(table.lookup("x").map(|s| s.declared_type), Some(ValueType::String));
        table.exit_scope();
        assert_eq!(table.lookup("x").map(|s| s.declared_type), Some(ValueType::Number));
    }

    #[test]
    fn test_suffix_is_folded_into_key() {
        let mut table = SymbolTable::new();
        table.define(Symbol::array("grid%", ValueType::Number, 2));
        assert!(table.is_array("Grid"));
        assert!(table.is_array("grid%"));
        assert!(!table.is_array("other"));
    }

    #[test]
    fn test_define_global_from_nested_scope() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        table.define_global(Symbol::variable("lives", ValueType::Number));
        table.exit_scope();
        assert!(table.lookup("lives").is_some());
    }

    #[test]
    fn test_global_scope_is_never_popped() {
        let mut table = SymbolTable::new();
        table.exit_scope();
        table.exit_scope();
        assert_eq!(table.depth(), 1);
        table.define(Symbol::variable("a", ValueType::Number));
        assert!(table.lookup("a").is_some());
    }

    #[test]
    fn test_object_reference() {
        let sym = Symbol::variable("p", ValueType::Number).with_type_name("Player");
        assert_eq!(sym.declared_type, ValueType::Object);
        assert_eq!(sym.type_name.as_deref(), Some("player"));
    }
}
