//! Typed script builders.
//!
//! One builder per Radon variant, each exposing only the operators that are
//! semantically valid on that variant. Every call appends one operator and
//! returns the builder of the operator's output variant, so an ill-typed
//! chain is unrepresentable; the guarantee lives in the Rust type system,
//! not in a runtime check.
//!
//! Builders start as the identity on their variant (`RadonString::default()`
//! is the script applied to a raw HTTP response body) and convert into a
//! [`Script`] with `.into()` when attached to a retrieval or embedded as a
//! subscript.

use indexmap::IndexMap;

use crate::chain::{Param, Script};
use crate::error::{Result, ScriptError};
use crate::opcode::Opcode;
use crate::reducer::{FilterOp, ReducerOp};
use crate::types::RadonTypeKind;

macro_rules! radon_builder {
    ($(#[$doc:meta])* $name:ident, $kind:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            script: Script,
        }

        impl $name {
            pub(crate) fn wrap(script: Script) -> Self {
                Self { script }
            }

            /// The underlying script.
            pub fn script(&self) -> &Script {
                &self.script
            }
        }

        impl Default for $name {
            /// Identity chain on this variant.
            fn default() -> Self {
                Self::wrap(Script::identity(RadonTypeKind::$kind))
            }
        }

        impl From<$name> for Script {
            fn from(value: $name) -> Script {
                value.script
            }
        }
    };
}

radon_builder!(
    /// Builder over an Array value.
    RadonArray, Array
);
radon_builder!(
    /// Builder over a Boolean value.
    RadonBoolean, Boolean
);
radon_builder!(
    /// Builder over a Bytes value.
    RadonBytes, Bytes
);
radon_builder!(
    /// Builder over a Float value.
    RadonFloat, Float
);
radon_builder!(
    /// Builder over an Integer value.
    RadonInteger, Integer
);
radon_builder!(
    /// Builder over a Map value.
    RadonMap, Map
);
radon_builder!(
    /// Builder over a String value. Retrieval scripts start here: the raw
    /// HTTP response body enters the chain as a String.
    RadonString, String
);

impl RadonArray {
    /// Check a subscript against the array's item variant, where known
    /// (see [`Script::element_kind`]).
    fn check_subscript_input(&self, opcode: Opcode, subscript: &Script) -> Result<()> {
        if let Some(expected) = self.script.element_kind() {
            if subscript.input() != expected {
                return Err(ScriptError::SubscriptInput {
                    opcode: opcode.symbol(),
                    expected,
                    actual: subscript.input(),
                });
            }
        }
        Ok(())
    }

    /// Keep only items for which `subscript` yields true.
    ///
    /// Fails unless the subscript consumes the array's item variant and
    /// yields Boolean.
    pub fn filter(self, subscript: impl Into<Script>) -> Result<RadonArray> {
        let subscript = subscript.into();
        if subscript.output() != RadonTypeKind::Boolean {
            return Err(ScriptError::SubscriptOutput {
                opcode: Opcode::ArrayFilter.symbol(),
                expected: RadonTypeKind::Boolean,
                actual: subscript.output(),
            });
        }
        self.check_subscript_input(Opcode::ArrayFilter, &subscript)?;
        Ok(RadonArray::wrap(self.script.append_unchecked(
            Opcode::ArrayFilter,
            vec![Param::Subscript(subscript)],
        )))
    }

    /// Keep only items passing a standard statistical filter.
    pub fn filter_op(self, op: FilterOp) -> RadonArray {
        RadonArray::wrap(self.script.append_unchecked(
            Opcode::ArrayFilter,
            vec![Param::Integer(op as i64)],
        ))
    }

    /// Transform every item through `subscript`.
    ///
    /// Fails when the array's item variant is known and the subscript does
    /// not consume it.
    pub fn map(self, subscript: impl Into<Script>) -> Result<RadonArray> {
        let subscript = subscript.into();
        self.check_subscript_input(Opcode::ArrayMap, &subscript)?;
        Ok(RadonArray::wrap(self.script.append_unchecked(
            Opcode::ArrayMap,
            vec![Param::Subscript(subscript)],
        )))
    }

    /// Sort items by natural order.
    pub fn sort(self) -> RadonArray {
        RadonArray::wrap(self.script.append_unchecked(Opcode::ArraySort, vec![]))
    }

    /// Sort items by the key each one maps to through `subscript`.
    ///
    /// Fails when the array's item variant is known and the subscript does
    /// not consume it.
    pub fn sort_by(self, subscript: impl Into<Script>) -> Result<RadonArray> {
        let subscript = subscript.into();
        self.check_subscript_input(Opcode::ArraySort, &subscript)?;
        Ok(RadonArray::wrap(self.script.append_unchecked(
            Opcode::ArraySort,
            vec![Param::Subscript(subscript)],
        )))
    }

    /// Replace the item at `index` with the result of `subscript` on it.
    ///
    /// Fails when the array's item variant is known and the subscript does
    /// not consume it.
    pub fn alter(self, index: i64, subscript: impl Into<Script>) -> Result<RadonArray> {
        let subscript = subscript.into();
        self.check_subscript_input(Opcode::ArrayAlter, &subscript)?;
        Ok(RadonArray::wrap(self.script.append_unchecked(
            Opcode::ArrayAlter,
            vec![Param::Integer(index), Param::Subscript(subscript)],
        )))
    }

    pub fn get_array(self, index: i64) -> RadonArray {
        RadonArray::wrap(
            self.script
                .append_unchecked(Opcode::ArrayGetArray, vec![Param::Integer(index)]),
        )
    }

    pub fn get_boolean(self, index: i64) -> RadonBoolean {
        RadonBoolean::wrap(
            self.script
                .append_unchecked(Opcode::ArrayGetBoolean, vec![Param::Integer(index)]),
        )
    }

    pub fn get_bytes(self, index: i64) -> RadonBytes {
        RadonBytes::wrap(
            self.script
                .append_unchecked(Opcode::ArrayGetBytes, vec![Param::Integer(index)]),
        )
    }

    pub fn get_float(self, index: i64) -> RadonFloat {
        RadonFloat::wrap(
            self.script
                .append_unchecked(Opcode::ArrayGetFloat, vec![Param::Integer(index)]),
        )
    }

    pub fn get_integer(self, index: i64) -> RadonInteger {
        RadonInteger::wrap(
            self.script
                .append_unchecked(Opcode::ArrayGetInteger, vec![Param::Integer(index)]),
        )
    }

    pub fn get_map(self, index: i64) -> RadonMap {
        RadonMap::wrap(
            self.script
                .append_unchecked(Opcode::ArrayGetMap, vec![Param::Integer(index)]),
        )
    }

    pub fn get_string(self, index: i64) -> RadonString {
        RadonString::wrap(
            self.script
                .append_unchecked(Opcode::ArrayGetString, vec![Param::Integer(index)]),
        )
    }

    /// Concatenate the items into one string.
    pub fn join(self, separator: Option<&str>) -> RadonString {
        let params = match separator {
            Some(sep) => vec![Param::String(sep.to_string())],
            None => vec![],
        };
        RadonString::wrap(self.script.append_unchecked(Opcode::ArrayJoin, params))
    }

    pub fn length(self) -> RadonInteger {
        RadonInteger::wrap(self.script.append_unchecked(Opcode::ArrayLength, vec![]))
    }

    /// Reduce the (numeric) items into one value with the given reducer.
    pub fn reduce(self, op: ReducerOp) -> RadonFloat {
        RadonFloat::wrap(
            self.script
                .append_unchecked(Opcode::ArrayReduce, vec![Param::Integer(op as i64)]),
        )
    }
}

impl RadonBoolean {
    pub fn negate(self) -> RadonBoolean {
        RadonBoolean::wrap(self.script.append_unchecked(Opcode::BooleanNegate, vec![]))
    }

    pub fn as_string(self) -> RadonString {
        RadonString::wrap(self.script.append_unchecked(Opcode::BooleanAsString, vec![]))
    }
}

impl RadonBytes {
    pub fn as_integer(self) -> RadonInteger {
        RadonInteger::wrap(self.script.append_unchecked(Opcode::BytesAsInteger, vec![]))
    }

    pub fn as_string(self) -> RadonString {
        RadonString::wrap(self.script.append_unchecked(Opcode::BytesAsString, vec![]))
    }

    /// Digest the bytes with the hash function identified by `function`.
    pub fn hash(self, function: i64) -> RadonBytes {
        RadonBytes::wrap(
            self.script
                .append_unchecked(Opcode::BytesHash, vec![Param::Integer(function)]),
        )
    }

    pub fn length(self) -> RadonInteger {
        RadonInteger::wrap(self.script.append_unchecked(Opcode::BytesLength, vec![]))
    }

    pub fn slice(self, start: i64, end: Option<i64>) -> RadonBytes {
        let mut params = vec![Param::Integer(start)];
        if let Some(end) = end {
            params.push(Param::Integer(end));
        }
        RadonBytes::wrap(self.script.append_unchecked(Opcode::BytesSlice, params))
    }
}

impl RadonFloat {
    pub fn absolute(self) -> RadonFloat {
        RadonFloat::wrap(self.script.append_unchecked(Opcode::FloatAbsolute, vec![]))
    }

    /// Truncate towards zero.
    pub fn as_integer(self) -> RadonInteger {
        RadonInteger::wrap(self.script.append_unchecked(Opcode::FloatAsInteger, vec![]))
    }

    pub fn as_string(self) -> RadonString {
        RadonString::wrap(self.script.append_unchecked(Opcode::FloatAsString, vec![]))
    }

    pub fn ceiling(self) -> RadonInteger {
        RadonInteger::wrap(self.script.append_unchecked(Opcode::FloatCeiling, vec![]))
    }

    pub fn floor(self) -> RadonInteger {
        RadonInteger::wrap(self.script.append_unchecked(Opcode::FloatFloor, vec![]))
    }

    pub fn round(self) -> RadonInteger {
        RadonInteger::wrap(self.script.append_unchecked(Opcode::FloatRound, vec![]))
    }

    pub fn multiply(self, factor: f64) -> RadonFloat {
        RadonFloat::wrap(
            self.script
                .append_unchecked(Opcode::FloatMultiply, vec![Param::Float(factor)]),
        )
    }

    pub fn negate(self) -> RadonFloat {
        RadonFloat::wrap(self.script.append_unchecked(Opcode::FloatNegate, vec![]))
    }

    pub fn power(self, exponent: f64) -> RadonFloat {
        RadonFloat::wrap(
            self.script
                .append_unchecked(Opcode::FloatPower, vec![Param::Float(exponent)]),
        )
    }

    pub fn greater_than(self, threshold: f64) -> RadonBoolean {
        RadonBoolean::wrap(
            self.script
                .append_unchecked(Opcode::FloatGreaterThan, vec![Param::Float(threshold)]),
        )
    }

    pub fn less_than(self, threshold: f64) -> RadonBoolean {
        RadonBoolean::wrap(
            self.script
                .append_unchecked(Opcode::FloatLessThan, vec![Param::Float(threshold)]),
        )
    }
}

impl RadonInteger {
    pub fn absolute(self) -> RadonInteger {
        RadonInteger::wrap(self.script.append_unchecked(Opcode::IntegerAbsolute, vec![]))
    }

    pub fn as_float(self) -> RadonFloat {
        RadonFloat::wrap(self.script.append_unchecked(Opcode::IntegerAsFloat, vec![]))
    }

    pub fn as_string(self) -> RadonString {
        RadonString::wrap(self.script.append_unchecked(Opcode::IntegerAsString, vec![]))
    }

    pub fn multiply(self, factor: i64) -> RadonInteger {
        RadonInteger::wrap(
            self.script
                .append_unchecked(Opcode::IntegerMultiply, vec![Param::Integer(factor)]),
        )
    }

    pub fn negate(self) -> RadonInteger {
        RadonInteger::wrap(self.script.append_unchecked(Opcode::IntegerNegate, vec![]))
    }

    pub fn power(self, exponent: i64) -> RadonInteger {
        RadonInteger::wrap(
            self.script
                .append_unchecked(Opcode::IntegerPower, vec![Param::Integer(exponent)]),
        )
    }

    pub fn greater_than(self, threshold: i64) -> RadonBoolean {
        RadonBoolean::wrap(
            self.script
                .append_unchecked(Opcode::IntegerGreaterThan, vec![Param::Integer(threshold)]),
        )
    }

    pub fn less_than(self, threshold: i64) -> RadonBoolean {
        RadonBoolean::wrap(
            self.script
                .append_unchecked(Opcode::IntegerLessThan, vec![Param::Integer(threshold)]),
        )
    }
}

impl RadonMap {
    /// Replace the value under `key` with the result of `subscript` on it.
    pub fn alter(self, key: &str, subscript: impl Into<Script>) -> RadonMap {
        RadonMap::wrap(self.script.append_unchecked(
            Opcode::MapAlter,
            vec![
                Param::String(key.to_string()),
                Param::Subscript(subscript.into()),
            ],
        ))
    }

    pub fn get_array(self, key: &str) -> RadonArray {
        RadonArray::wrap(
            self.script
                .append_unchecked(Opcode::MapGetArray, vec![Param::String(key.to_string())]),
        )
    }

    pub fn get_boolean(self, key: &str) -> RadonBoolean {
        RadonBoolean::wrap(
            self.script
                .append_unchecked(Opcode::MapGetBoolean, vec![Param::String(key.to_string())]),
        )
    }

    pub fn get_bytes(self, key: &str) -> RadonBytes {
        RadonBytes::wrap(
            self.script
                .append_unchecked(Opcode::MapGetBytes, vec![Param::String(key.to_string())]),
        )
    }

    pub fn get_float(self, key: &str) -> RadonFloat {
        RadonFloat::wrap(
            self.script
                .append_unchecked(Opcode::MapGetFloat, vec![Param::String(key.to_string())]),
        )
    }

    pub fn get_integer(self, key: &str) -> RadonInteger {
        RadonInteger::wrap(
            self.script
                .append_unchecked(Opcode::MapGetInteger, vec![Param::String(key.to_string())]),
        )
    }

    pub fn get_map(self, key: &str) -> RadonMap {
        RadonMap::wrap(
            self.script
                .append_unchecked(Opcode::MapGetMap, vec![Param::String(key.to_string())]),
        )
    }

    pub fn get_string(self, key: &str) -> RadonString {
        RadonString::wrap(
            self.script
                .append_unchecked(Opcode::MapGetString, vec![Param::String(key.to_string())]),
        )
    }

    pub fn keys(self) -> RadonArray {
        RadonArray::wrap(self.script.append_unchecked(Opcode::MapKeys, vec![]))
    }

    pub fn values(self) -> RadonArray {
        RadonArray::wrap(self.script.append_unchecked(Opcode::MapValues, vec![]))
    }
}

impl RadonString {
    pub fn as_boolean(self) -> RadonBoolean {
        RadonBoolean::wrap(self.script.append_unchecked(Opcode::StringAsBoolean, vec![]))
    }

    pub fn as_bytes(self) -> RadonBytes {
        RadonBytes::wrap(self.script.append_unchecked(Opcode::StringAsBytes, vec![]))
    }

    pub fn as_float(self) -> RadonFloat {
        RadonFloat::wrap(self.script.append_unchecked(Opcode::StringAsFloat, vec![]))
    }

    pub fn as_integer(self) -> RadonInteger {
        RadonInteger::wrap(self.script.append_unchecked(Opcode::StringAsInteger, vec![]))
    }

    pub fn length(self) -> RadonInteger {
        RadonInteger::wrap(self.script.append_unchecked(Opcode::StringLength, vec![]))
    }

    /// Map the string through a category table, falling back to `default`
    /// when no key matches.
    pub fn match_categories(
        self,
        categories: IndexMap<String, bool>,
        default: bool,
    ) -> RadonBoolean {
        let map = categories
            .into_iter()
            .map(|(key, value)| (key, Param::Bool(value)))
            .collect();
        RadonBoolean::wrap(self.script.append_unchecked(
            Opcode::StringMatch,
            vec![Param::Map(map), Param::Bool(default)],
        ))
    }

    pub fn parse_json_array(self) -> RadonArray {
        RadonArray::wrap(
            self.script
                .append_unchecked(Opcode::StringParseJsonArray, vec![]),
        )
    }

    pub fn parse_json_map(self) -> RadonMap {
        RadonMap::wrap(
            self.script
                .append_unchecked(Opcode::StringParseJsonMap, vec![]),
        )
    }

    pub fn slice(self, start: i64, end: Option<i64>) -> RadonString {
        let mut params = vec![Param::Integer(start)];
        if let Some(end) = end {
            params.push(Param::Integer(end));
        }
        RadonString::wrap(self.script.append_unchecked(Opcode::StringSlice, params))
    }

    pub fn split(self, separator: &str) -> RadonArray {
        RadonArray::wrap(
            self.script
                .append_unchecked(Opcode::StringSplit, vec![Param::String(separator.to_string())]),
        )
    }

    pub fn to_lower_case(self) -> RadonString {
        RadonString::wrap(
            self.script
                .append_unchecked(Opcode::StringToLowerCase, vec![]),
        )
    }

    pub fn to_upper_case(self) -> RadonString {
        RadonString::wrap(
            self.script
                .append_unchecked(Opcode::StringToUpperCase, vec![]),
        )
    }
}
