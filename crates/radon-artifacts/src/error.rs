//! Artifact-layer errors.
//!
//! Everything here is a construction-time validation failure. Folding,
//! expansion, and request building fail immediately with the offending
//! position and the expected/actual counts; nothing is silently coerced.

use thiserror::Error;

/// Artifact-layer result type.
pub type Result<T> = std::result::Result<T, ArtifactError>;

/// Validation failures raised while constructing or transforming artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Script-layer failure (wildcards, opcodes, subscript typing).
    #[error(transparent)]
    Script(#[from] radon_script::ScriptError),

    /// Wire-layer failure (schema verification, protobuf).
    #[error(transparent)]
    Wire(#[from] radon_wire::WireError),

    /// A structural field a retrieval method forbids.
    #[error("{method} retrieval must not carry {field}")]
    ForbiddenField {
        method: &'static str,
        field: &'static str,
    },

    /// A retrieval was folded with the wrong number of arguments.
    #[error("retrieval {index} expects {expected} argument(s), got {actual}")]
    RetrievalArity {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// A named argument key the retrieval declares was not supplied.
    #[error("named argument {key:?} is missing")]
    MissingArgKey { key: String },

    /// Named folding on a retrieval that declares no argument keys.
    #[error("retrieval declares no argument keys; fold positionally instead")]
    NoArgsKeys,

    /// Shared arguments passed to a non-homogeneous template.
    #[error(
        "template is not homogeneous: pass one argument vector per retrieval ({retrievals}), \
         not one shared vector"
    )]
    SharedArgsNotHomogeneous { retrievals: usize },

    /// Per-retrieval argument vectors whose outer length is wrong.
    #[error("expected {expected} argument vector(s) (one per retrieval), got {actual}")]
    ArgsVectorCount { expected: usize, actual: usize },

    /// A template needs at least one retrieval.
    #[error("template needs at least one retrieval")]
    EmptyTemplate,

    /// A sample that undersupplies a retrieval.
    #[error(
        "sample {name:?} supplies {actual} value(s), but retrieval {index} needs {expected}"
    )]
    SampleArity {
        name: String,
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// No sample registered under this name.
    #[error("unknown sample {name:?}")]
    UnknownSample { name: String },

    /// A request was built from a retrieval that still has wildcards.
    #[error(
        "request built from a parameterized retrieval at position {index} \
         (argsCount {args_count}); fold its arguments first"
    )]
    ParameterizedRetrieval { index: usize, args_count: usize },

    /// A modal's retrieval does not reserve wildcard `\0\` for the provider.
    #[error("modal retrieval must reference provider wildcard \\0\\ (or omit its url)")]
    NotModal,

    /// Modal expansion attempted without providers.
    #[error("modal needs a non-empty providers list")]
    NoProviders,

    /// A provider URL outside the http/https schemes.
    #[error("provider url {url:?} must use an http or https scheme")]
    BadProviderScheme { url: String },

    /// Two artifacts registered under one name.
    #[error("artifact {name:?} is already registered")]
    DuplicateArtifact { name: String },
}
