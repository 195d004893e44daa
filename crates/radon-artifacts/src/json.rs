//! Human-readable JSON forms.
//!
//! Every artifact exposes `to_json(humanize)`. The raw form emits opcode
//! numbers and byte arrays; the humanized form emits symbolic opcode names
//! and decoded strings. Both are display/debugging surfaces; hashing always
//! goes through the wire bytes, never through JSON.

use radon_script::{chain::Param, Reducer, Script};
use serde_json::{json, Value};

/// JSON rendering of a script's operator chain, head→tail.
pub(crate) fn script_json(script: &Script, humanize: bool) -> Value {
    let ops = script
        .operators()
        .into_iter()
        .map(|node| {
            if humanize {
                if node.params.is_empty() {
                    Value::String(node.opcode.symbol().to_string())
                } else {
                    json!({
                        node.opcode.symbol(): node
                            .params
                            .iter()
                            .map(|param| param_json(param, humanize))
                            .collect::<Vec<_>>()
                    })
                }
            } else if node.params.is_empty() {
                Value::from(node.opcode as u8)
            } else {
                let mut element = vec![Value::from(node.opcode as u8)];
                element.extend(node.params.iter().map(|param| param_json(param, humanize)));
                Value::Array(element)
            }
        })
        .collect();
    Value::Array(ops)
}

fn param_json(param: &Param, humanize: bool) -> Value {
    match param {
        Param::Bool(b) => Value::from(*b),
        Param::Integer(i) => Value::from(*i),
        Param::Float(f) => Value::from(*f),
        Param::String(s) => Value::from(s.clone()),
        Param::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| param_json(item, humanize))
                .collect(),
        ),
        Param::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), param_json(value, humanize)))
                .collect(),
        ),
        Param::Subscript(script) => script_json(script, humanize),
    }
}

/// JSON rendering of a reducer stage.
pub(crate) fn reducer_json(reducer: &Reducer, humanize: bool) -> Value {
    if humanize {
        json!({
            "reducer": reducer.op.symbol(),
            "filters": reducer
                .filters
                .iter()
                .map(|filter| Value::String(filter.describe()))
                .collect::<Vec<_>>(),
        })
    } else {
        json!({
            "reducer": reducer.op as u8,
            "filters": reducer
                .filters
                .iter()
                .map(|filter| json!({ "op": filter.op as u8, "args": bytes_json(&filter.args) }))
                .collect::<Vec<_>>(),
        })
    }
}

/// Raw byte arrays render as JSON number arrays.
pub(crate) fn bytes_json(bytes: &[u8]) -> Value {
    Value::Array(bytes.iter().map(|byte| Value::from(*byte)).collect())
}
