//! Wire layer for Radon requests: the protobuf-shaped message, the SHA-256
//! RAD hash, the hex bytecode convention, and parsing of the external
//! execution engine's dry-run reports.
//!
//! Nothing here performs network I/O; the wire bytes are produced for
//! hashing and for hand-off to the engine.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod hash;
pub mod proto;
pub mod report;

pub use error::{Result, WireError};
pub use hash::{bytecode_hex, RadHash};
pub use proto::{
    kind, RadAggregate, RadFilter, RadRequest, RadRetrieve, RadTally, StringPair,
};
pub use report::{RadonReport, RadonValue};
