//! # blitzweb
//!
//! A compiler from a Blitz-style BASIC dialect to frame-driven JavaScript.
//!
//! ## Architecture
//!
//! The compiler follows a traditional pipeline:
//!
//! ```text
//! Source (.bb) → Preprocessor → Lexer → Parser → AST → CodeGen → JavaScript
//! ```
//!
//! Each phase is implemented as a separate module:
//!
//! - [`preprocessor`] - Splices `Include` files
//! - [`lexer`] - Tokenizes source code into a stream of tokens
//! - [`parser`] - Builds an Abstract Syntax Tree from tokens
//! - [`ast`] - AST type definitions
//! - [`semantic`] - Symbol table, type inference and argument checks used by the parser
//! - [`commands`] - The builtin command descriptor table
//! - [`codegen`] - Code generation backends (JavaScript)
//! - [`diagnostics`] - One message type for every phase
//!
//! No phase stops on a user error. A compilation always yields a script and
//! the full list of diagnostics.
//!
//! ## Example
//!
//! ```
//! use blitzweb::compile;
//! use blitzweb::preprocessor::MemoryFileSystem;
//!
//! let source = "Graphics 640, 480\nWhile Not KeyHit(1)\n  Cls\n  Flip\nWend\nEnd";
//! let output = compile(source, &MemoryFileSystem::new());
//!
//! assert!(output.diagnostics.is_empty());
//! assert!(output.code.contains("$rt.run("));
//! ```

pub mod ast;
pub mod codegen;
pub mod commands;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod preprocessor;
pub mod semantic;

use ast::Program;
use codegen::{CodeGenerator, JsBackend};
use commands::CommandTable;
use diagnostics::Diagnostic;
use preprocessor::FileSystem;

/// Everything one compilation produces.
#[derive(Debug)]
pub struct CompileOutput {
    /// The generated JavaScript.
    pub code: String,
    /// Every problem found, in phase order.
    pub diagnostics: Vec<Diagnostic>,
    /// The parsed program.
    pub program: Program,
}

/// A compiler configured with a command table.
///
/// Holds no state between calls; each [`compile`](Self::compile) builds a
/// fresh lexer, parser and generator.
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'a> {
    commands: &'a CommandTable,
}

impl Compiler<'static> {
    /// Creates a compiler using the standard command table.
    pub fn new() -> Self {
        Self {
            commands: CommandTable::standard(),
        }
    }
}

impl Default for Compiler<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Compiler<'a> {
    /// Creates a compiler using a custom command table.
    pub fn with_commands(commands: &'a CommandTable) -> Self {
        Self { commands }
    }

    /// Compiles `source`, resolving includes through `fs`.
    pub fn compile(&self, source: &str, fs: &dyn FileSystem) -> CompileOutput {
        let mut diagnostics = Vec::new();

        if let Err(errors) = self.commands.validate() {
            diagnostics.extend(errors.iter().map(Diagnostic::from));
        }

        let (expanded, include_errors) = preprocessor::preprocess(source, fs);
        diagnostics.extend(include_errors.iter().map(Diagnostic::from));

        let (tokens, lex_errors) = lexer::tokenize_with(&expanded, self.commands);
        diagnostics.extend(lex_errors.iter().map(Diagnostic::from));

        let (program, parse_errors) = parser::parse_with(&tokens, self.commands);
        diagnostics.extend(parse_errors.iter().map(Diagnostic::from));

        let output = JsBackend::with_commands(self.commands).generate(&program);
        log::debug!(
            "compiled {} bytes with {} diagnostics",
            source.len(),
            diagnostics.len()
        );

        CompileOutput {
            code: output.code,
            diagnostics,
            program,
        }
    }
}

/// Compiles `source` with the standard command table.
pub fn compile(source: &str, fs: &dyn FileSystem) -> CompileOutput {
    Compiler::new().compile(source, fs)
}

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::ast::{Expr, ExprKind, Program, Span, Statement, StatementKind};
    pub use crate::codegen::{CodeGenerator, GeneratedOutput, JsBackend};
    pub use crate::commands::{CommandDescriptor, CommandTable};
    pub use crate::diagnostics::{Diagnostic, Phase};
    pub use crate::lexer::{Lexer, Token, TokenKind};
    pub use crate::parser::{ParseError, Parser};
    pub use crate::preprocessor::{DiskFileSystem, FileSystem, MemoryFileSystem};
    pub use crate::semantic::{SemanticError, SymbolTable, ValueType};
    pub use crate::{CompileOutput, Compiler, compile};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Phase;
    use crate::preprocessor::MemoryFileSystem;

    #[test]
    fn test_compile_reports_every_phase() {
        let source = "Include \"missing.bb\"\nx = \"open\nWhile True\n  Cls\n";
        let output = compile(source, &MemoryFileSystem::new());
        let phases: Vec<Phase> = output.diagnostics.iter().map(|d| d.phase).collect();
        assert!(phases.contains(&Phase::Preprocess));
        assert!(phases.contains(&Phase::Lexical));
        assert!(phases.contains(&Phase::Syntax));
        assert!(output.code.contains("$rt.run("));
    }

    #[test]
    fn test_advisory_mismatch_is_semantic() {
        let output = compile("Plot \"a\", 2", &MemoryFileSystem::new());
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].phase, Phase::Semantic);
        assert!(output.code.contains("$graphics.plot("));
    }

    #[test]
    fn test_included_function_is_called() {
        let fs = MemoryFileSystem::new().with_file("util.bb", "Function Pause()\n  WaitKey\nEnd Function");
        let output = compile("Include \"util.bb\"\nPause", &fs);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        assert!(output.code.contains("async function fn_pause()"));
        assert!(output.code.contains("await fn_pause();"));
        assert_eq!(output.program.functions().count(), 1);
    }

    #[test]
    fn test_invalid_custom_table_is_reported() {
        let mut table = CommandTable::empty();
        table.insert("wend", commands::CommandDescriptor::call("audio.beep"));
        let output = Compiler::with_commands(&table).compile("x = 1", &MemoryFileSystem::new());
        assert!(output.diagnostics.iter().any(|d| d.line == 0 && d.message.contains("shadowed by a keyword")));
    }

    #[test]
    fn test_compilations_are_independent() {
        let compiler = Compiler::new();
        let fs = MemoryFileSystem::new();
        let first = compiler.compile("Function F()\nEnd Function", &fs);
        let second = compiler.compile("x = F(1)", &fs);
        assert_eq!(first.program.functions().count(), 1);
        assert_eq!(second.program.functions().count(), 0);
    }
}
