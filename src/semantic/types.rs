//! Value types for blitzweb type inference.
//!
//! The source language is dynamically typed at heart: an untyped name is a
//! number, `$` makes it a string, and a `.Type` annotation makes it an object
//! reference. Inference only has to be good enough to catch obviously wrong
//! command arguments, so the lattice is deliberately flat.
//!
//! # Type Suffixes
//!
//! - `%` integer (`count%`)
//! - `#` float (`speed#`)
//! - `$` string (`name$`)
//!
//! Integers and floats are both [`ValueType::Number`]; the suffix only
//! matters for the default value of an uninitialised variable.

use std::fmt;

/// Inferred type of an expression, variable or command parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueType {
    /// Integer or float
    #[default]
    Number,
    /// Text
    String,
    /// Result of a comparison or logical operator
    Boolean,
    /// Reference to an instance of a user type
    Object,
    /// The `Null` literal
    Null,
    /// Nothing is known; compatible with everything
    Unknown,
}

impl ValueType {
    /// Returns true if a value of type `actual` may be passed where `self`
    /// is expected.
    ///
    /// Numbers and booleans substitute for each other, `Null` fits any
    /// object slot, and `Unknown` on either side always fits.
    pub fn accepts(&self, actual: ValueType) -> bool {
        use ValueType::*;
        match (*self, actual) {
            (Unknown, _) | (_, Unknown) => true,
            (Number | Boolean, Number | Boolean) => true,
            (Object, Object | Null) => true,
            (expected, actual) => expected == actual,
        }
    }

    /// Returns true for number-like types.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Number | ValueType::Boolean)
    }

    /// Lower-case name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::Object => "object",
            ValueType::Null => "null",
            ValueType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trailing type marker on an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSuffix {
    /// `%`
    Int,
    /// `#`
    Float,
    /// `$`
    Str,
}

impl TypeSuffix {
    /// Maps a suffix character to its marker.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '%' => Some(TypeSuffix::Int),
            '#' => Some(TypeSuffix::Float),
            '$' => Some(TypeSuffix::Str),
            _ => None,
        }
    }

    /// The suffix character.
    pub fn as_char(&self) -> char {
        match self {
            TypeSuffix::Int => '%',
            TypeSuffix::Float => '#',
            TypeSuffix::Str => '$',
        }
    }

    /// Splits `name$` into `("name", Some(Str))`.
    pub fn split(name: &str) -> (&str, Option<TypeSuffix>) {
        match name.chars().last().and_then(TypeSuffix::from_char) {
            // Bare `$` is a hex prefix, not a suffix
            Some(suffix) if name.len() > 1 => (&name[..name.len() - 1], Some(suffix)),
            _ => (name, None),
        }
    }

    /// The value type a suffix implies.
    pub fn value_type(&self) -> ValueType {
        match self {
            TypeSuffix::Int | TypeSuffix::Float => ValueType::Number,
            TypeSuffix::Str => ValueType::String,
        }
    }
}

/// Returns the type implied by an identifier's suffix, if it has one.
///
/// ```
/// use blitzweb::semantic::{type_from_suffix, ValueType};
///
/// assert_eq!(type_from_suffix("name$"), Some(ValueType::String));
/// assert_eq!(type_from_suffix("hp%"), Some(ValueType::Number));
/// assert_eq!(type_from_suffix("total"), None);
/// ```
pub fn type_from_suffix(name: &str) -> Option<ValueType> {
    TypeSuffix::split(name).1.map(|s| s.value_type())
}

/// Strips the type suffix from an identifier name.
pub fn strip_suffix(name: &str) -> &str {
    TypeSuffix::split(name).0
}

/// Canonical lookup key for a name: suffix removed, lower-cased.
///
/// `Score%`, `score` and `SCORE#` all fold to `score`, so the suffix is
/// resolved before any array/call decision is made.
pub fn fold_name(name: &str) -> String {
    strip_suffix(name).to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_and_booleans_substitute() {
        assert!(ValueType::Number.accepts(ValueType::Boolean));
        assert!(ValueType::Boolean.accepts(ValueType::Number));
    }

    #[test]
    fn test_null_fits_object() {
        assert!(ValueType::Object.accepts(ValueType::Null));
        assert!(!ValueType::Number.accepts(ValueType::Null));
    }

    #[test]
    fn test_unknown_fits_everything() {
        assert!(ValueType::String.accepts(ValueType::Unknown));
        assert!(ValueType::Unknown.accepts(ValueType::String));
    }

    #[test]
    fn test_string_does_not_fit_number() {
        assert!(!ValueType::Number.accepts(ValueType::String));
        assert!(!ValueType::String.accepts(ValueType::Number));
    }

    #[test]
    fn test_split_suffix() {
        assert_eq!(TypeSuffix::split("name$"), ("name", Some(TypeSuffix::Str)));
        assert_eq!(TypeSuffix::split("x#"), ("x", Some(TypeSuffix::Float)));
        assert_eq!(TypeSuffix::split("plain"), ("plain", None));
        assert_eq!(TypeSuffix::split("$"), ("$", None));
    }

    #[test]
    fn test_fold_name() {
        assert_eq!(fold_name("Score%"), "score");
        assert_eq!(fold_name("SCORE"), "score");
    }
}
