//! Runtime wiring emitted at the top and bottom of every script.
//!
//! The host provides `globalThis.BlitzRuntime` with one capability object per
//! command group and a `run` entry point that drives the frame loop. The
//! generated script binds short aliases for those objects and defines the
//! small helpers that the lowering relies on.

use crate::ast::DataValue;

use super::analysis::DataTable;
use super::names::{float_literal, string_literal};

/// Runtime binding and capability aliases.
const PREAMBLE: &str = r#""use strict";
const $rt = globalThis.BlitzRuntime;
const $graphics = $rt.graphics;
const $input = $rt.input;
const $audio = $rt.audio;
const $files = $rt.files;
const $math = $rt.math;
const $strings = $rt.strings;
"#;

/// Helpers for arrays, the DATA pool, object lists and `End`.
const HELPERS: &str = r#"const $HALT = Symbol("halt");
function $end() { $rt.stop(); throw $HALT; }
function $guard(f) {
    return async () => {
        try { await f(); } catch (e) { if (e !== $HALT) throw e; }
    };
}
function $dim(sizes, init) {
    const [n, ...rest] = sizes;
    return Array.from({ length: n }, () => (rest.length ? $dim(rest, init) : init));
}
function $read() { return $dataPtr < $data.length ? $data[$dataPtr++] : 0; }
function $delete(o) {
    if (!o) return;
    const all = o.constructor.$all;
    const i = all.indexOf(o);
    if (i >= 0) all.splice(i, 1);
}
function $deleteEach(T) { T.$all.length = 0; }
function $first(T) { return T.$all.length ? T.$all[0] : null; }
function $last(T) { return T.$all.length ? T.$all[T.$all.length - 1] : null; }
function $after(o) {
    if (!o) return null;
    const all = o.constructor.$all;
    const i = all.indexOf(o);
    return i >= 0 && i + 1 < all.length ? all[i + 1] : null;
}
function $before(o) {
    if (!o) return null;
    const all = o.constructor.$all;
    const i = all.indexOf(o);
    return i > 0 ? all[i - 1] : null;
}
function $insert(o, anchor, after) {
    if (!o || !anchor || o === anchor) return;
    const all = o.constructor.$all;
    const i = all.indexOf(o);
    if (i >= 0) all.splice(i, 1);
    const j = all.indexOf(anchor);
    if (j < 0) { all.push(o); return; }
    all.splice(after ? j + 1 : j, 0, o);
}
"#;

/// Writes the runtime binding and helper functions.
pub(super) fn emit_preamble(output: &mut String) {
    output.push_str(PREAMBLE);
    output.push('\n');
    output.push_str(HELPERS);
    output.push('\n');
}

/// Writes `$data` and the read cursor.
///
/// Label offsets are not emitted: `Restore` resolves them at compile time.
pub(super) fn emit_data_table(output: &mut String, data: &DataTable) {
    let values: Vec<String> = data
        .values
        .iter()
        .map(|value| match value {
            DataValue::Integer(n) => n.to_string(),
            DataValue::Float(f) => float_literal(*f),
            DataValue::String(s) => string_literal(s),
        })
        .collect();
    output.push_str(&format!("const $data = [{}];\n", values.join(", ")));
    output.push_str("let $dataPtr = 0;\n\n");
}

/// Hands the generated routines to the host scheduler.
pub(super) fn emit_run(output: &mut String) {
    output.push_str(
        "$rt.run({ init: $guard($init), update: $guard($update), shutdown: $guard($shutdown) });\n",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preamble_binds_capabilities() {
        let mut output = String::new();
        emit_preamble(&mut output);
        for alias in ["$graphics", "$input", "$audio", "$files", "$math", "$strings"] {
            assert!(output.contains(&format!("const {} = $rt.", alias)), "{alias}");
        }
        for helper in ["$dim", "$read", "$delete", "$deleteEach", "$first", "$last", "$insert"] {
            assert!(output.contains(&format!("function {}(", helper)), "{helper}");
        }
    }

    #[test]
    fn test_read_past_end_yields_zero() {
        let mut output = String::new();
        emit_preamble(&mut output);
        assert!(output.contains(
            "function $read() { return $dataPtr < $data.length ? $data[$dataPtr++] : 0; }"
        ));
    }

    #[test]
    fn test_data_table_layout() {
        let mut data = DataTable::default();
        data.values = vec![
            DataValue::Integer(1),
            DataValue::Float(2.5),
            DataValue::String("three".into()),
        ];
        data.labels.insert("start".into(), 0);
        data.labels.insert("more".into(), 2);

        let mut output = String::new();
        emit_data_table(&mut output, &data);
        assert!(output.contains("const $data = [1, 2.5, \"three\"];"));
        assert!(output.contains("let $dataPtr = 0;"));
        assert!(!output.contains("$dataLabels"));
    }

    #[test]
    fn test_empty_data_table() {
        let mut output = String::new();
        emit_data_table(&mut output, &DataTable::default());
        assert!(output.contains("const $data = [];"));
    }
}
