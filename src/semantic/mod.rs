//! Semantic support for blitzweb.
//!
//! There is no separate semantic pass: the parser consults these pieces as it
//! goes. This module provides:
//!
//! - **Value types**: the flat [`ValueType`] lattice and identifier suffixes
//! - **Symbol table**: the scope stack used for array/call disambiguation
//! - **Type inference**: best-effort typing of every expression node
//! - **Argument checks**: advisory comparison against command signatures
//!
//! Nothing here is a soundness guarantee. Inference exists to catch obvious
//! mistakes such as passing a string to a drawing command.

pub mod error;
pub mod inference;
pub mod symbols;
pub mod types;

pub use error::SemanticError;
pub use inference::{check_arguments, infer_type};
pub use symbols::{Symbol, SymbolKind, SymbolTable};
pub use types::{TypeSuffix, ValueType, fold_name, strip_suffix, type_from_suffix};
