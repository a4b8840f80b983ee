//! Code generation module for blitzweb.
//!
//! This module transforms the AST produced by the parser into a program for
//! the host runtime. The architecture uses a trait-based backend system so
//! another target can be added without touching the front end.
//!
//! # Architecture
//!
//! ```text
//! Program → CodeGenerator → GeneratedOutput
//!                 ↑
//!            JsBackend
//! ```
//!
//! Generation never fails. Erroneous sub-trees left by the parser lower to
//! inert placeholders, so a script is produced for every program.
//!
//! # Example
//!
//! ```
//! use blitzweb::codegen::{CodeGenerator, JsBackend};
//! use blitzweb::lexer::lex;
//! use blitzweb::parser::parse;
//!
//! let (program, _) = parse(&lex("Cls"));
//! let output = JsBackend::new().generate(&program);
//! assert_eq!(output.extension, "js");
//! ```

mod js;

pub use js::JsBackend;

use crate::ast::Program;

/// Output from code generation.
#[derive(Debug)]
pub struct GeneratedOutput {
    /// The generated source code.
    pub code: String,

    /// Human-readable description of the output format.
    pub format: String,

    /// Suggested file extension for the output.
    pub extension: String,
}

impl GeneratedOutput {
    /// Creates a new generated output for JavaScript.
    pub fn javascript(code: String) -> Self {
        Self {
            code,
            format: "JavaScript".to_string(),
            extension: "js".to_string(),
        }
    }
}

/// Trait for code generation backends.
///
/// Each backend is responsible for:
/// - Translating every AST node, error nodes included
/// - Lowering builtin commands through its command table
/// - Producing readable output
pub trait CodeGenerator {
    /// Generates code for a parsed program.
    fn generate(&self, program: &Program) -> GeneratedOutput;

    /// Returns the name of this backend for diagnostics.
    fn backend_name(&self) -> &'static str;
}
