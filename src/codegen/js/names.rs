//! Name mangling and literal spelling for the JavaScript backend.
//!
//! BASIC identifiers are case-insensitive and may carry a type suffix
//! (`$`, `%`, `#`), neither of which JavaScript allows. Every user name is
//! folded to lower case with its suffix removed, so `Score%`, `score` and
//! `SCORE` all name the same binding.
//!
//! | BASIC name      | JavaScript      |
//! |-----------------|-----------------|
//! | `Score%`        | `score`         |
//! | `new`           | `new_`          |
//! | `Function Draw` | `fn_draw`       |
//! | `Type Player`   | `$T_player`     |
//!
//! Runtime and helper names all start with `$`, which the lexer never
//! accepts in an identifier, so they cannot collide with user names.

use crate::semantic::fold_name;

/// JavaScript reserved words and globals a user name must not shadow.
const RESERVED: &[&str] = &[
    "arguments",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "globalthis",
    "if",
    "implements",
    "import",
    "in",
    "infinity",
    "instanceof",
    "interface",
    "let",
    "math",
    "nan",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "undefined",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

/// Mangles a variable, array, parameter or field name.
pub(super) fn js_identifier(name: &str) -> String {
    let folded = fold_name(name);
    if RESERVED.contains(&folded.as_str()) {
        format!("{}_", folded)
    } else {
        folded
    }
}

/// Mangles a user function name.
pub(super) fn function_name(name: &str) -> String {
    format!("fn_{}", fold_name(name))
}

/// Mangles a user type name to its class name.
pub(super) fn class_name(type_name: &str) -> String {
    format!("$T_{}", fold_name(type_name))
}

/// Escapes a string for use inside a double-quoted JavaScript literal.
pub(super) fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => result.push_str(&format!("\\u{:04x}", c as u32)),
            c => result.push(c),
        }
    }
    result
}

/// Spells a string literal.
pub(super) fn string_literal(s: &str) -> String {
    format!("\"{}\"", escape_string(s))
}

/// Spells a float so it reads back as the same number.
pub(super) fn float_literal(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_fold_case_and_suffix() {
        assert_eq!(js_identifier("Score%"), "score");
        assert_eq!(js_identifier("NAME$"), "name");
        assert_eq!(js_identifier("speed#"), "speed");
    }

    #[test]
    fn test_reserved_words_are_renamed() {
        assert_eq!(js_identifier("New"), "new_");
        assert_eq!(js_identifier("this"), "this_");
        assert_eq!(js_identifier("Math"), "math_");
        assert_eq!(js_identifier("player"), "player");
    }

    #[test]
    fn test_function_and_class_names() {
        assert_eq!(function_name("DrawAll"), "fn_drawall");
        assert_eq!(function_name("Name$"), "fn_name");
        assert_eq!(class_name("Player"), "$T_player");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string(r#"say "hi"\n"#), r#"say \"hi\"\\n"#);
        assert_eq!(escape_string("a\tb"), "a\\tb");
        assert_eq!(escape_string("\u{1}"), "\\u0001");
    }

    #[test]
    fn test_float_literal() {
        assert_eq!(float_literal(2.0), "2.0");
        assert_eq!(float_literal(0.25), "0.25");
        assert_eq!(float_literal(f64::NAN), "0");
    }
}
