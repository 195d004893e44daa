//! CBOR bytecode encoding and decoding of operator chains.
//!
//! The bytecode form of a script is a CBOR array ordered head→tail: each
//! operator becomes either its bare opcode integer (no parameters) or an
//! array `[opcode, param…]`. A nested sub-script parameter recursively
//! encodes to its own nested array; any other parameter is serialized as the
//! corresponding CBOR value.
//!
//! Decoding reverses this, opcode by opcode: the first element's opcode
//! metadata fixes the chain's input variant, and each subsequent element is
//! folded through the checked [`Script::append`] path, so a decoded chain
//! satisfies the same type invariants as a built one.
//!
//! Round-trip property: `decode(encode(s)) == s` for every encodable
//! script. The empty array decodes to the identity script on String (the
//! convention for retrievals that forward the raw response unchanged);
//! identity scripts on any other variant are rejected at encode time, since
//! round-tripping them would silently retype the input.

use ciborium::value::Value;

use crate::chain::{Param, Script};
use crate::error::{Result, ScriptError};
use crate::opcode::Opcode;
use crate::types::RadonTypeKind;

/// Encode a script to its CBOR bytecode.
///
/// An identity script is only encodable on String: the empty array carries
/// no opcode to infer an input variant from, so any other identity would
/// decode to a different script than it encoded from.
pub fn encode(script: &Script) -> Result<Vec<u8>> {
    let value = script_to_value(script)?;
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&value, &mut bytes)
        .map_err(|err| ScriptError::Cbor(err.to_string()))?;
    Ok(bytes)
}

/// Decode CBOR bytecode back into a typed script.
pub fn decode(bytes: &[u8]) -> Result<Script> {
    let value: Value = ciborium::de::from_reader(bytes)
        .map_err(|err| ScriptError::Cbor(err.to_string()))?;
    match value {
        Value::Array(elements) => decode_elements(&elements),
        other => Err(ScriptError::UnsupportedContainer {
            found: value_kind(&other),
        }),
    }
}

/// The CBOR value form of a script, before byte serialization.
pub(crate) fn script_to_value(script: &Script) -> Result<Value> {
    if script.is_empty() && script.input() != RadonTypeKind::String {
        return Err(ScriptError::UnencodableIdentity {
            input: script.input(),
        });
    }
    let nodes = script
        .operators()
        .into_iter()
        .map(|node| {
            if node.params.is_empty() {
                Ok(opcode_value(node.opcode))
            } else {
                let mut element = vec![opcode_value(node.opcode)];
                for param in &node.params {
                    element.push(param_to_value(param)?);
                }
                Ok(Value::Array(element))
            }
        })
        .collect::<Result<_>>()?;
    Ok(Value::Array(nodes))
}

fn opcode_value(opcode: Opcode) -> Value {
    Value::Integer((opcode as u8).into())
}

fn param_to_value(param: &Param) -> Result<Value> {
    Ok(match param {
        Param::Bool(b) => Value::Bool(*b),
        Param::Integer(i) => Value::Integer((*i).into()),
        Param::Float(f) => Value::Float(*f),
        Param::String(s) => Value::Text(s.clone()),
        Param::Array(items) => Value::Array(
            items
                .iter()
                .map(param_to_value)
                .collect::<Result<_>>()?,
        ),
        Param::Map(entries) => {
            let mut pairs = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                pairs.push((Value::Text(key.clone()), param_to_value(value)?));
            }
            Value::Map(pairs)
        }
        Param::Subscript(script) => script_to_value(script)?,
    })
}

fn decode_elements(elements: &[Value]) -> Result<Script> {
    let Some(first) = elements.first() else {
        // Bare `[]`: the identity on the raw response body.
        return Ok(Script::identity(RadonTypeKind::String));
    };
    let head = Opcode::from_u8(element_opcode(first)?)?;
    let mut script = Script::identity(head.input());
    for element in elements {
        let (opcode, raw_params) = split_element(element)?;
        let opcode = Opcode::from_u8(opcode)?;
        let mut params = Vec::with_capacity(raw_params.len());
        for (position, raw) in raw_params.iter().enumerate() {
            params.push(value_to_param(opcode, position, raw_params.len(), raw)?);
        }
        script = script.append(opcode, params)?;
    }
    Ok(script)
}

/// The opcode byte of an element, whether bare or `[opcode, …]`.
fn element_opcode(element: &Value) -> Result<u8> {
    match element {
        Value::Integer(_) => opcode_byte(element),
        Value::Array(items) => match items.first() {
            Some(head) => opcode_byte(head),
            None => Err(ScriptError::UnsupportedContainer {
                found: "empty operator array",
            }),
        },
        other => Err(ScriptError::UnsupportedContainer {
            found: value_kind(other),
        }),
    }
}

fn split_element(element: &Value) -> Result<(u8, &[Value])> {
    match element {
        Value::Integer(_) => Ok((opcode_byte(element)?, &[])),
        Value::Array(items) => {
            let Some((head, params)) = items.split_first() else {
                return Err(ScriptError::UnsupportedContainer {
                    found: "empty operator array",
                });
            };
            Ok((opcode_byte(head)?, params))
        }
        other => Err(ScriptError::UnsupportedContainer {
            found: value_kind(other),
        }),
    }
}

fn opcode_byte(value: &Value) -> Result<u8> {
    match value {
        Value::Integer(i) => {
            u8::try_from(i128::from(*i)).map_err(|_| ScriptError::UnsupportedContainer {
                found: "out-of-range opcode integer",
            })
        }
        other => Err(ScriptError::UnsupportedContainer {
            found: value_kind(other),
        }),
    }
}

/// Decode one raw parameter. An array in the final parameter slot of a
/// subscript-taking operator is an embedded sub-script; every other array is
/// a literal.
fn value_to_param(opcode: Opcode, position: usize, count: usize, raw: &Value) -> Result<Param> {
    if opcode.takes_subscript() && position + 1 == count {
        if let Value::Array(elements) = raw {
            return Ok(Param::Subscript(decode_elements(elements)?));
        }
    }
    value_to_literal(opcode, raw)
}

fn value_to_literal(opcode: Opcode, raw: &Value) -> Result<Param> {
    Ok(match raw {
        Value::Bool(b) => Param::Bool(*b),
        Value::Integer(i) => {
            Param::Integer(i64::try_from(i128::from(*i)).map_err(|_| {
                ScriptError::UnsupportedParam {
                    opcode: opcode.symbol(),
                    detail: "integer parameter outside the i64 range".to_string(),
                }
            })?)
        }
        Value::Float(f) => Param::Float(*f),
        Value::Text(s) => Param::String(s.clone()),
        Value::Array(items) => Param::Array(
            items
                .iter()
                .map(|item| value_to_literal(opcode, item))
                .collect::<Result<_>>()?,
        ),
        Value::Map(entries) => {
            let mut map = indexmap::IndexMap::with_capacity(entries.len());
            for (key, value) in entries {
                let Value::Text(key) = key else {
                    return Err(ScriptError::UnsupportedParam {
                        opcode: opcode.symbol(),
                        detail: format!("non-text map key ({})", value_kind(key)),
                    });
                };
                map.insert(key.clone(), value_to_literal(opcode, value)?);
            }
            Param::Map(map)
        }
        other => {
            return Err(ScriptError::UnsupportedParam {
                opcode: opcode.symbol(),
                detail: format!("unsupported CBOR value ({})", value_kind(other)),
            })
        }
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Integer(_) => "integer",
        Value::Bytes(_) => "bytes",
        Value::Float(_) => "float",
        Value::Text(_) => "text",
        Value::Bool(_) => "bool",
        Value::Null => "null",
        Value::Tag(..) => "tag",
        Value::Array(_) => "array",
        Value::Map(_) => "map",
        _ => "unknown",
    }
}
