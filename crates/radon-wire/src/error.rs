//! Wire-layer errors.

use thiserror::Error;

/// Wire-layer result type.
pub type Result<T> = std::result::Result<T, WireError>;

/// Failures at the wire boundary: schema verification, protobuf decoding,
/// and dry-run report parsing.
#[derive(Debug, Error)]
pub enum WireError {
    /// The message violates the wire schema. The text names the offending
    /// field and retrieve index.
    #[error("wire schema violation: {0}")]
    Schema(String),

    /// Protobuf decoding failure, surfaced verbatim.
    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// A script-layer validation failure found while verifying embedded
    /// bytecode or opcode fields.
    #[error(transparent)]
    Script(#[from] radon_script::ScriptError),

    /// The execution engine's JSON report did not match the expected shape.
    #[error("malformed dry-run report: {0}")]
    Report(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_text_passes_through() {
        let err = WireError::Schema("retrieve[0]: RNG retrieval carries a url".to_string());
        assert!(err.to_string().contains("retrieve[0]"));
    }
}
