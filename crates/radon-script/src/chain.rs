//! Operator chains and scripts.
//!
//! An [`OperatorNode`] is an immutable link in a script's abstract syntax
//! tree: an opcode, its ordered parameters, and the node appended before it.
//! Chains are append-only; appending wraps the existing chain as the new
//! node's predecessor and never mutates it, so sharing a chain across
//! threads needs no synchronization.
//!
//! A [`Script`] is the typed wrapper: the input variant the chain is applied
//! to plus the (possibly empty) chain. An empty chain is the identity on its
//! input.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScriptError};
use crate::opcode::Opcode;
use crate::types::RadonTypeKind;
use crate::wildcard;

/// An operator parameter.
///
/// Literals, wildcard-bearing strings, nested structures, or an embedded
/// sub-script. All variants are CBOR-encodable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Param {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Param>),
    /// Ordered map; order is hash-relevant and must be preserved.
    Map(IndexMap<String, Param>),
    /// An embedded transformation script (`filter`/`map`/`sort`/`alter`).
    Subscript(Script),
}

impl Param {
    /// Max wildcard count in this parameter, recursing into nested
    /// structures and subscripts.
    pub fn args_count(&self) -> Result<usize> {
        match self {
            Param::Bool(_) | Param::Integer(_) | Param::Float(_) => Ok(0),
            Param::String(s) => wildcard::args_count(s),
            Param::Array(items) => {
                let mut count = 0;
                for item in items {
                    count = count.max(item.args_count()?);
                }
                Ok(count)
            }
            Param::Map(entries) => {
                let mut count = 0;
                for (key, value) in entries {
                    count = count.max(wildcard::args_count(key)?);
                    count = count.max(value.args_count()?);
                }
                Ok(count)
            }
            Param::Subscript(script) => script.args_count(),
        }
    }

    /// New parameter with every wildcard replaced positionally by `values`.
    pub fn replace_wildcards<S: AsRef<str>>(&self, values: &[S]) -> Result<Param> {
        Ok(match self {
            Param::Bool(_) | Param::Integer(_) | Param::Float(_) => self.clone(),
            Param::String(s) => Param::String(wildcard::replace(s, values)?),
            Param::Array(items) => Param::Array(
                items
                    .iter()
                    .map(|item| item.replace_wildcards(values))
                    .collect::<Result<_>>()?,
            ),
            Param::Map(entries) => {
                let mut replaced = IndexMap::with_capacity(entries.len());
                for (key, value) in entries {
                    replaced.insert(
                        wildcard::replace(key, values)?,
                        value.replace_wildcards(values)?,
                    );
                }
                Param::Map(replaced)
            }
            Param::Subscript(script) => Param::Subscript(script.replace_wildcards(values)?),
        })
    }

    /// New parameter with wildcard `index` spliced to `value` and higher
    /// indices renumbered down by one.
    pub fn splice_wildcard(&self, index: u32, value: &str) -> Result<Param> {
        Ok(match self {
            Param::Bool(_) | Param::Integer(_) | Param::Float(_) => self.clone(),
            Param::String(s) => Param::String(wildcard::splice(s, index, value)?),
            Param::Array(items) => Param::Array(
                items
                    .iter()
                    .map(|item| item.splice_wildcard(index, value))
                    .collect::<Result<_>>()?,
            ),
            Param::Map(entries) => {
                let mut spliced = IndexMap::with_capacity(entries.len());
                for (key, item) in entries {
                    spliced.insert(
                        wildcard::splice(key, index, value)?,
                        item.splice_wildcard(index, value)?,
                    );
                }
                Param::Map(spliced)
            }
            Param::Subscript(script) => Param::Subscript(script.splice_wildcard(index, value)?),
        })
    }
}

/// An immutable operator node: opcode, ordered parameters, and the chain it
/// was appended onto (`None` for the chain head).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorNode {
    pub opcode: Opcode,
    pub params: Vec<Param>,
    pub predecessor: Option<Box<OperatorNode>>,
}

impl OperatorNode {
    /// Max over: wildcard counts in parameters and the predecessor's count.
    pub fn args_count(&self) -> Result<usize> {
        let mut count = 0;
        for param in &self.params {
            count = count.max(param.args_count()?);
        }
        if let Some(prev) = &self.predecessor {
            count = count.max(prev.args_count()?);
        }
        Ok(count)
    }

    fn replace_wildcards<S: AsRef<str>>(&self, values: &[S]) -> Result<OperatorNode> {
        Ok(OperatorNode {
            opcode: self.opcode,
            params: self
                .params
                .iter()
                .map(|param| param.replace_wildcards(values))
                .collect::<Result<_>>()?,
            predecessor: match &self.predecessor {
                Some(prev) => Some(Box::new(prev.replace_wildcards(values)?)),
                None => None,
            },
        })
    }

    fn splice_wildcard(&self, index: u32, value: &str) -> Result<OperatorNode> {
        Ok(OperatorNode {
            opcode: self.opcode,
            params: self
                .params
                .iter()
                .map(|param| param.splice_wildcard(index, value))
                .collect::<Result<_>>()?,
            predecessor: match &self.predecessor {
                Some(prev) => Some(Box::new(prev.splice_wildcard(index, value)?)),
                None => None,
            },
        })
    }

    /// Collect the chain ending at this node in head→tail order.
    fn collect<'a>(&'a self, out: &mut Vec<&'a OperatorNode>) {
        if let Some(prev) = &self.predecessor {
            prev.collect(out);
        }
        out.push(self);
    }
}

/// A typed operator chain.
///
/// `input` is the variant the chain's first operator consumes (or the
/// variant an empty chain is the identity on); [`Script::output`] is the
/// variant the last operator produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    input: RadonTypeKind,
    /// Tail node of the chain; `None` for the identity script.
    chain: Option<OperatorNode>,
}

impl Script {
    /// The identity script on `input`.
    pub fn identity(input: RadonTypeKind) -> Self {
        Self { input, chain: None }
    }

    /// Variant this script consumes.
    pub fn input(&self) -> RadonTypeKind {
        self.input
    }

    /// Variant this script produces. Equals `input()` for the identity.
    pub fn output(&self) -> RadonTypeKind {
        self.chain
            .as_ref()
            .map(|node| node.opcode.output())
            .unwrap_or(self.input)
    }

    /// Number of operators in the chain.
    pub fn len(&self) -> usize {
        self.operators().len()
    }

    /// Whether the chain is empty (identity script).
    pub fn is_empty(&self) -> bool {
        self.chain.is_none()
    }

    /// The item variant of an Array-yielding chain, where derivable.
    ///
    /// `split` and `keys` yield String items; `map` yields its subscript's
    /// output; `filter`, `sort`, and `alter` preserve the items they
    /// iterate. Anything else (e.g. `parseJsonArray`) is `None`: the item
    /// kind is only known at execution time.
    pub fn element_kind(&self) -> Option<RadonTypeKind> {
        self.chain.as_ref().and_then(node_element_kind)
    }

    /// The chain in head→tail order (head = first operator applied).
    pub fn operators(&self) -> Vec<&OperatorNode> {
        let mut out = Vec::new();
        if let Some(tail) = &self.chain {
            tail.collect(&mut out);
        }
        out
    }

    /// Append an operator, validating input continuity, parameter arity,
    /// and subscript typing. The existing chain is wrapped, not mutated.
    ///
    /// This is the checked path used by the bytecode decoder; the typed
    /// builders in [`crate::builders`] guarantee the same invariants by
    /// construction and use [`Script::append_unchecked`].
    pub fn append(self, opcode: Opcode, params: Vec<Param>) -> Result<Script> {
        let meta = opcode.metadata();
        if meta.input != self.output() {
            return Err(ScriptError::InputMismatch {
                opcode: meta.symbol,
                expected: meta.input,
                actual: self.output(),
            });
        }
        if !meta.params.matches(params.len()) {
            return Err(ScriptError::ParamArity {
                opcode: meta.symbol,
                actual: params.len(),
            });
        }
        if opcode.takes_subscript() {
            if let Some(Param::Subscript(subscript)) = params.last() {
                if opcode == Opcode::ArrayFilter
                    && subscript.output() != RadonTypeKind::Boolean
                {
                    return Err(ScriptError::SubscriptOutput {
                        opcode: meta.symbol,
                        expected: RadonTypeKind::Boolean,
                        actual: subscript.output(),
                    });
                }
                // Map values have no statically known variant; array items
                // sometimes do, and then the subscript must consume them.
                if opcode != Opcode::MapAlter {
                    if let Some(expected) = self.element_kind() {
                        if subscript.input() != expected {
                            return Err(ScriptError::SubscriptInput {
                                opcode: meta.symbol,
                                expected,
                                actual: subscript.input(),
                            });
                        }
                    }
                }
            }
        }
        Ok(self.append_unchecked(opcode, params))
    }

    /// Append without validation. Callers must uphold input continuity; the
    /// typed builders do so by construction.
    pub(crate) fn append_unchecked(mut self, opcode: Opcode, params: Vec<Param>) -> Script {
        let predecessor = self.chain.take().map(Box::new);
        Script {
            input: self.input,
            chain: Some(OperatorNode {
                opcode,
                params,
                predecessor,
            }),
        }
    }

    /// Max wildcard count across the whole chain.
    pub fn args_count(&self) -> Result<usize> {
        match &self.chain {
            Some(tail) => tail.args_count(),
            None => Ok(0),
        }
    }

    /// New script with every wildcard replaced positionally by `values`.
    ///
    /// Fails when fewer values are supplied than [`Script::args_count`];
    /// unreplaced tokens are never left behind.
    pub fn replace_wildcards<S: AsRef<str>>(&self, values: &[S]) -> Result<Script> {
        let expected = self.args_count()?;
        if values.len() < expected {
            return Err(ScriptError::ArityMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Script {
            input: self.input,
            chain: match &self.chain {
                Some(tail) => Some(tail.replace_wildcards(values)?),
                None => None,
            },
        })
    }

    /// New script with wildcard `index` spliced to `value` and every higher
    /// index renumbered down by one.
    pub fn splice_wildcard(&self, index: u32, value: &str) -> Result<Script> {
        Ok(Script {
            input: self.input,
            chain: match &self.chain {
                Some(tail) => Some(tail.splice_wildcard(index, value)?),
                None => None,
            },
        })
    }
}

fn node_element_kind(node: &OperatorNode) -> Option<RadonTypeKind> {
    match node.opcode {
        Opcode::StringSplit | Opcode::MapKeys => Some(RadonTypeKind::String),
        Opcode::ArrayMap => node.params.first().and_then(|param| match param {
            Param::Subscript(subscript) => Some(subscript.output()),
            _ => None,
        }),
        Opcode::ArrayFilter | Opcode::ArraySort | Opcode::ArrayAlter => {
            node.predecessor.as_deref().and_then(node_element_kind)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float_round_script() -> Script {
        Script::identity(RadonTypeKind::String)
            .append(Opcode::StringAsFloat, vec![])
            .unwrap()
            .append(Opcode::FloatRound, vec![])
            .unwrap()
    }

    #[test]
    fn test_identity_script() {
        let script = Script::identity(RadonTypeKind::Bytes);
        assert!(script.is_empty());
        assert_eq!(script.input(), RadonTypeKind::Bytes);
        assert_eq!(script.output(), RadonTypeKind::Bytes);
        assert_eq!(script.args_count().unwrap(), 0);
    }

    #[test]
    fn test_chain_types_flow() {
        let script = float_round_script();
        assert_eq!(script.input(), RadonTypeKind::String);
        assert_eq!(script.output(), RadonTypeKind::Integer);
        assert_eq!(script.len(), 2);
    }

    #[test]
    fn test_append_rejects_input_mismatch() {
        let err = Script::identity(RadonTypeKind::String)
            .append(Opcode::FloatRound, vec![])
            .unwrap_err();
        assert_eq!(
            err,
            ScriptError::InputMismatch {
                opcode: "FloatRound",
                expected: RadonTypeKind::Float,
                actual: RadonTypeKind::String,
            }
        );
    }

    #[test]
    fn test_append_rejects_wrong_param_count() {
        let err = Script::identity(RadonTypeKind::Map)
            .append(Opcode::MapGetFloat, vec![])
            .unwrap_err();
        assert_eq!(
            err,
            ScriptError::ParamArity {
                opcode: "MapGetFloat",
                actual: 0,
            }
        );
    }

    #[test]
    fn test_filter_subscript_must_yield_boolean() {
        let bad = Script::identity(RadonTypeKind::Float)
            .append(Opcode::FloatRound, vec![])
            .unwrap();
        let err = Script::identity(RadonTypeKind::Array)
            .append(Opcode::ArrayFilter, vec![Param::Subscript(bad)])
            .unwrap_err();
        assert!(matches!(err, ScriptError::SubscriptOutput { .. }));

        let good = Script::identity(RadonTypeKind::Float)
            .append(Opcode::FloatGreaterThan, vec![Param::Float(0.0)])
            .unwrap();
        assert!(Script::identity(RadonTypeKind::Array)
            .append(Opcode::ArrayFilter, vec![Param::Subscript(good)])
            .is_ok());
    }

    #[test]
    fn test_element_kind_tracks_derivable_items() {
        let split = Script::identity(RadonTypeKind::String)
            .append(Opcode::StringSplit, vec![Param::String(",".into())])
            .unwrap();
        assert_eq!(split.element_kind(), Some(RadonTypeKind::String));

        // Sorting preserves the items; mapping re-types them.
        let sorted = split.clone().append(Opcode::ArraySort, vec![]).unwrap();
        assert_eq!(sorted.element_kind(), Some(RadonTypeKind::String));

        let to_float = Script::identity(RadonTypeKind::String)
            .append(Opcode::StringAsFloat, vec![])
            .unwrap();
        let mapped = split
            .append(Opcode::ArrayMap, vec![Param::Subscript(to_float)])
            .unwrap();
        assert_eq!(mapped.element_kind(), Some(RadonTypeKind::Float));

        // Parsed JSON arrays have no statically known item variant.
        let parsed = Script::identity(RadonTypeKind::String)
            .append(Opcode::StringParseJsonArray, vec![])
            .unwrap();
        assert_eq!(parsed.element_kind(), None);
    }

    #[test]
    fn test_append_rejects_subscript_input_mismatch() {
        let split = Script::identity(RadonTypeKind::String)
            .append(Opcode::StringSplit, vec![Param::String(",".into())])
            .unwrap();
        let float_subscript = Script::identity(RadonTypeKind::Float)
            .append(Opcode::FloatRound, vec![])
            .unwrap();
        let err = split
            .append(Opcode::ArrayMap, vec![Param::Subscript(float_subscript)])
            .unwrap_err();
        assert_eq!(
            err,
            ScriptError::SubscriptInput {
                opcode: "ArrayMap",
                expected: RadonTypeKind::String,
                actual: RadonTypeKind::Float,
            }
        );
    }

    #[test]
    fn test_append_allows_subscript_on_unknown_items() {
        let parsed = Script::identity(RadonTypeKind::String)
            .append(Opcode::StringParseJsonArray, vec![])
            .unwrap();
        let float_subscript = Script::identity(RadonTypeKind::Float)
            .append(Opcode::FloatRound, vec![])
            .unwrap();
        assert!(parsed
            .append(Opcode::ArrayMap, vec![Param::Subscript(float_subscript)])
            .is_ok());
    }

    #[test]
    fn test_append_wraps_without_mutating() {
        let base = Script::identity(RadonTypeKind::String)
            .append(Opcode::StringAsFloat, vec![])
            .unwrap();
        let extended = base.clone().append(Opcode::FloatRound, vec![]).unwrap();
        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
        // The original chain is the extended chain's predecessor.
        assert_eq!(
            extended.operators()[0].opcode,
            base.operators()[0].opcode
        );
    }

    #[test]
    fn test_args_count_recurses_into_subscripts() {
        let subscript = Script::identity(RadonTypeKind::Map)
            .append(Opcode::MapGetFloat, vec![Param::String("\\1\\".into())])
            .unwrap()
            .append(Opcode::FloatGreaterThan, vec![Param::Float(0.0)])
            .unwrap();
        let script = Script::identity(RadonTypeKind::Array)
            .append(Opcode::ArrayFilter, vec![Param::Subscript(subscript)])
            .unwrap();
        assert_eq!(script.args_count().unwrap(), 2);
    }

    #[test]
    fn test_replace_wildcards_fails_short() {
        let script = Script::identity(RadonTypeKind::Map)
            .append(Opcode::MapGetFloat, vec![Param::String("\\0\\".into())])
            .unwrap();
        assert_eq!(
            script.replace_wildcards::<&str>(&[]),
            Err(ScriptError::ArityMismatch {
                expected: 1,
                actual: 0
            })
        );
    }

    #[test]
    fn test_replace_wildcards_yields_concrete_chain() {
        let script = Script::identity(RadonTypeKind::Map)
            .append(Opcode::MapGetFloat, vec![Param::String("price-\\0\\".into())])
            .unwrap();
        let folded = script.replace_wildcards(&["usd"]).unwrap();
        assert_eq!(folded.args_count().unwrap(), 0);
        assert_eq!(
            folded.operators()[0].params[0],
            Param::String("price-usd".into())
        );
    }

    #[test]
    fn test_splice_wildcard_renumbers_in_params() {
        let script = Script::identity(RadonTypeKind::Map)
            .append(
                Opcode::MapGetFloat,
                vec![Param::String("\\0\\/\\1\\".into())],
            )
            .unwrap();
        let spliced = script.splice_wildcard(0, "btc").unwrap();
        assert_eq!(
            spliced.operators()[0].params[0],
            Param::String("btc/\\0\\".into())
        );
        assert_eq!(spliced.args_count().unwrap(), 1);
    }

    #[test]
    fn test_param_map_keys_carry_wildcards() {
        let mut map = IndexMap::new();
        map.insert("key-\\0\\".to_string(), Param::Bool(true));
        let param = Param::Map(map);
        assert_eq!(param.args_count().unwrap(), 1);
        let replaced = param.replace_wildcards(&["k"]).unwrap();
        match replaced {
            Param::Map(entries) => assert!(entries.contains_key("key-k")),
            other => panic!("expected map, got {other:?}"),
        }
    }
}
