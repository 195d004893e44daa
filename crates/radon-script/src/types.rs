//! The seven Radon value variants.
//!
//! A [`RadonTypeKind`] is a *type tag*, not a runtime value: it statically
//! determines which operators may be appended to a chain next. Runtime values
//! only exist inside the external execution engine; this crate never holds
//! one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A Radon value variant.
///
/// Every operator is defined on exactly one input variant and declares a
/// fixed output variant. Opcode numeric ranges partition by output variant
/// (see [`crate::opcode`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RadonTypeKind {
    /// Homogeneous sequence of values.
    Array,
    /// True/false.
    Boolean,
    /// Raw byte string.
    Bytes,
    /// 64-bit float.
    Float,
    /// Signed integer.
    Integer,
    /// String-keyed map.
    Map,
    /// UTF-8 string. The raw HTTP response body enters a script as String.
    String,
}

impl RadonTypeKind {
    /// All variants, in a stable order.
    pub const ALL: [RadonTypeKind; 7] = [
        RadonTypeKind::Array,
        RadonTypeKind::Boolean,
        RadonTypeKind::Bytes,
        RadonTypeKind::Float,
        RadonTypeKind::Integer,
        RadonTypeKind::Map,
        RadonTypeKind::String,
    ];

    /// Symbolic name as it appears in opcode symbols and humanized JSON.
    pub fn name(self) -> &'static str {
        match self {
            RadonTypeKind::Array => "Array",
            RadonTypeKind::Boolean => "Boolean",
            RadonTypeKind::Bytes => "Bytes",
            RadonTypeKind::Float => "Float",
            RadonTypeKind::Integer => "Integer",
            RadonTypeKind::Map => "Map",
            RadonTypeKind::String => "String",
        }
    }
}

impl fmt::Display for RadonTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
