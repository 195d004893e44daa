//! Typed Radon scripts: operator chains, wildcard parameterization,
//! filter/reducer descriptors, and the CBOR bytecode round-trip.
//!
//! This crate is the foundation layer of the Radon compiler. It never
//! performs I/O and never executes a script; it only builds, validates,
//! encodes, and decodes the intermediate representation whose hash the
//! oracle network treats as consensus-critical.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod builders;
pub mod bytecode;
pub mod chain;
pub mod error;
pub mod opcode;
pub mod reducer;
pub mod types;
pub mod wildcard;

// Re-export the everyday surface.
pub use builders::{
    RadonArray, RadonBoolean, RadonBytes, RadonFloat, RadonInteger, RadonMap, RadonString,
};
pub use chain::{OperatorNode, Param, Script};
pub use error::{Result, ScriptError};
pub use opcode::{Opcode, OpcodeMetadata, ParamCount};
pub use reducer::{Filter, FilterOp, Reducer, ReducerOp};
pub use types::RadonTypeKind;
