//! Script-layer errors.
//!
//! Every violation fails the constructing or transforming call immediately
//! with a typed error naming the offending field, index, or opcode. Nothing
//! in this crate is retried or silently defaulted.

use thiserror::Error;

use crate::types::RadonTypeKind;

/// Script-layer result type.
pub type Result<T> = std::result::Result<T, ScriptError>;

/// Construction- and decode-time validation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    /// An operator was folded onto a chain whose output variant does not
    /// match the operator's declared input variant.
    #[error("opcode {opcode} expects {expected} input, but the chain yields {actual}")]
    InputMismatch {
        opcode: &'static str,
        expected: RadonTypeKind,
        actual: RadonTypeKind,
    },

    /// A nested sub-script has the wrong declared output variant
    /// (e.g. a `filter` subscript not ultimately yielding Boolean).
    #[error("subscript for {opcode} must yield {expected}, found {actual}")]
    SubscriptOutput {
        opcode: &'static str,
        expected: RadonTypeKind,
        actual: RadonTypeKind,
    },

    /// A nested sub-script whose declared input variant does not match the
    /// items it will be applied to.
    #[error("subscript for {opcode} must consume {expected} items, found {actual}")]
    SubscriptInput {
        opcode: &'static str,
        expected: RadonTypeKind,
        actual: RadonTypeKind,
    },

    /// Too few or too many positional wildcard arguments.
    #[error("expected {expected} wildcard argument(s), got {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// A wildcard index outside the supported `0`–`9` window.
    #[error("wildcard index {index} is outside the supported 0-9 range")]
    WildcardOutOfRange { index: u32 },

    /// A backslash-delimited token that is not a well-formed single-digit
    /// wildcard (e.g. `\00\`).
    #[error("malformed wildcard token {token}: indices are a single digit 0-9")]
    MalformedWildcard { token: String },

    /// A byte that maps to no known opcode.
    #[error("unknown opcode 0x{0:02x}")]
    UnknownOpcode(u8),

    /// A byte that maps to no known filter.
    #[error("unknown filter opcode 0x{0:02x}")]
    UnknownFilter(u8),

    /// A byte that maps to no known reducer.
    #[error("unknown reducer opcode 0x{0:02x}")]
    UnknownReducer(u8),

    /// Bytecode element that is neither an opcode integer nor an
    /// `[opcode, params…]` array.
    #[error("unsupported bytecode container: expected an opcode or [opcode, params\u{2026}] array, found {found}")]
    UnsupportedContainer { found: &'static str },

    /// An operator parameter that cannot be decoded into a [`crate::chain::Param`].
    #[error("unsupported parameter for {opcode}: {detail}")]
    UnsupportedParam {
        opcode: &'static str,
        detail: String,
    },

    /// Wrong number of operator parameters.
    #[error("wrong number of parameters for {opcode}: got {actual}")]
    ParamArity { opcode: &'static str, actual: usize },

    /// An identity script on a non-String variant, which has no bytecode
    /// form: empty bytecode always decodes as the identity on String.
    #[error("identity script on {input} has no bytecode form")]
    UnencodableIdentity { input: RadonTypeKind },

    /// CBOR serialization or deserialization failure.
    #[error("malformed CBOR bytecode: {0}")]
    Cbor(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offender() {
        let err = ScriptError::InputMismatch {
            opcode: "FloatRound",
            expected: RadonTypeKind::Float,
            actual: RadonTypeKind::String,
        };
        let text = err.to_string();
        assert!(text.contains("FloatRound"));
        assert!(text.contains("Float"));
        assert!(text.contains("String"));
    }

    #[test]
    fn test_unknown_opcode_formats_hex() {
        assert_eq!(
            ScriptError::UnknownOpcode(0x0f).to_string(),
            "unknown opcode 0x0f"
        );
    }
}
