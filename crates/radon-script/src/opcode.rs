//! Opcode definitions and metadata for the Radon operator chain.
//!
//! Opcodes are **data, not behavior**: this crate never executes an operator.
//! Each opcode carries a static metadata entry (symbol, input variant, output
//! variant, parameter count) generated by an explicit, exhaustive table; the
//! mapping from operator to opcode is checked for completeness at compile
//! time, never derived by reflection.
//!
//! # Numeric ranges
//!
//! Opcode bytes partition by **output** variant:
//!
//! - `0x10–0x1F` → Array
//! - `0x20–0x2F` → Boolean
//! - `0x30–0x3F` → Bytes
//! - `0x40–0x4F` → Integer
//! - `0x50–0x5F` → Float
//! - `0x60–0x6F` → Map
//! - `0x70–0x7F` → String
//!
//! This partitioning is load-bearing: the bytecode decoder infers a chain's
//! input variant from the first opcode's metadata, and consumers can infer
//! the output class of any chain from its tail byte alone.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScriptError};
use crate::types::RadonTypeKind;

/// Parameter count specification for an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamCount {
    /// Exactly this many parameters.
    Fixed(usize),
    /// Between `min` and `max` parameters, both inclusive.
    Range { min: usize, max: usize },
}

impl ParamCount {
    /// Check whether the given parameter list length is valid.
    pub fn matches(self, len: usize) -> bool {
        match self {
            ParamCount::Fixed(count) => len == count,
            ParamCount::Range { min, max } => len >= min && len <= max,
        }
    }
}

/// Static metadata for an opcode.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeMetadata {
    /// Symbolic name, `InputVariant` + operator name (e.g. `StringAsFloat`).
    pub symbol: &'static str,
    /// Variant the operator consumes.
    pub input: RadonTypeKind,
    /// Variant the operator produces. Always agrees with the byte range.
    pub output: RadonTypeKind,
    /// Parameter count specification.
    pub params: ParamCount,
}

macro_rules! opcodes {
    ($( $symbol:ident = $byte:literal, $input:ident => $output:ident, $params:expr; )+) => {
        /// A Radon operator opcode.
        ///
        /// One byte per operator; see the module docs for the range layout.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(u8)]
        pub enum Opcode {
            $( $symbol = $byte, )+
        }

        impl Opcode {
            /// Every opcode, in byte order.
            pub const ALL: &'static [Opcode] = &[ $( Opcode::$symbol, )+ ];

            /// Resolve a raw byte into an opcode.
            pub fn from_u8(byte: u8) -> Result<Self> {
                match byte {
                    $( $byte => Ok(Opcode::$symbol), )+
                    other => Err(ScriptError::UnknownOpcode(other)),
                }
            }

            /// Static metadata for this opcode.
            pub fn metadata(self) -> &'static OpcodeMetadata {
                match self {
                    $( Opcode::$symbol => &OpcodeMetadata {
                        symbol: stringify!($symbol),
                        input: RadonTypeKind::$input,
                        output: RadonTypeKind::$output,
                        params: $params,
                    }, )+
                }
            }
        }
    };
}

const NONE: ParamCount = ParamCount::Fixed(0);
const ONE: ParamCount = ParamCount::Fixed(1);
const TWO: ParamCount = ParamCount::Fixed(2);
const UP_TO_ONE: ParamCount = ParamCount::Range { min: 0, max: 1 };
const ONE_OR_TWO: ParamCount = ParamCount::Range { min: 1, max: 2 };

opcodes! {
    // Array output (0x10–0x1F)
    ArrayFilter = 0x10, Array => Array, ONE;
    ArrayMap = 0x11, Array => Array, ONE;
    ArraySort = 0x12, Array => Array, UP_TO_ONE;
    ArrayAlter = 0x13, Array => Array, TWO;
    ArrayGetArray = 0x14, Array => Array, ONE;
    MapGetArray = 0x15, Map => Array, ONE;
    MapKeys = 0x16, Map => Array, NONE;
    MapValues = 0x17, Map => Array, NONE;
    StringSplit = 0x18, String => Array, ONE;
    StringParseJsonArray = 0x19, String => Array, NONE;

    // Boolean output (0x20–0x2F)
    ArrayGetBoolean = 0x20, Array => Boolean, ONE;
    BooleanNegate = 0x21, Boolean => Boolean, NONE;
    MapGetBoolean = 0x22, Map => Boolean, ONE;
    StringAsBoolean = 0x23, String => Boolean, NONE;
    StringMatch = 0x24, String => Boolean, TWO;
    FloatGreaterThan = 0x25, Float => Boolean, ONE;
    FloatLessThan = 0x26, Float => Boolean, ONE;
    IntegerGreaterThan = 0x27, Integer => Boolean, ONE;
    IntegerLessThan = 0x28, Integer => Boolean, ONE;

    // Bytes output (0x30–0x3F)
    ArrayGetBytes = 0x30, Array => Bytes, ONE;
    BytesHash = 0x31, Bytes => Bytes, ONE;
    BytesSlice = 0x32, Bytes => Bytes, ONE_OR_TWO;
    MapGetBytes = 0x33, Map => Bytes, ONE;
    StringAsBytes = 0x34, String => Bytes, NONE;

    // Integer output (0x40–0x4F)
    ArrayGetInteger = 0x40, Array => Integer, ONE;
    ArrayLength = 0x41, Array => Integer, NONE;
    BytesAsInteger = 0x42, Bytes => Integer, NONE;
    BytesLength = 0x43, Bytes => Integer, NONE;
    FloatAsInteger = 0x44, Float => Integer, NONE;
    FloatCeiling = 0x45, Float => Integer, NONE;
    FloatFloor = 0x46, Float => Integer, NONE;
    FloatRound = 0x47, Float => Integer, NONE;
    IntegerAbsolute = 0x48, Integer => Integer, NONE;
    IntegerMultiply = 0x49, Integer => Integer, ONE;
    IntegerNegate = 0x4A, Integer => Integer, NONE;
    IntegerPower = 0x4B, Integer => Integer, ONE;
    MapGetInteger = 0x4C, Map => Integer, ONE;
    StringAsInteger = 0x4D, String => Integer, NONE;
    StringLength = 0x4E, String => Integer, NONE;

    // Float output (0x50–0x5F)
    ArrayGetFloat = 0x50, Array => Float, ONE;
    ArrayReduce = 0x51, Array => Float, ONE;
    FloatAbsolute = 0x52, Float => Float, NONE;
    FloatMultiply = 0x53, Float => Float, ONE;
    FloatNegate = 0x54, Float => Float, NONE;
    FloatPower = 0x55, Float => Float, ONE;
    IntegerAsFloat = 0x56, Integer => Float, NONE;
    MapGetFloat = 0x57, Map => Float, ONE;
    StringAsFloat = 0x58, String => Float, NONE;

    // Map output (0x60–0x6F)
    ArrayGetMap = 0x60, Array => Map, ONE;
    MapGetMap = 0x61, Map => Map, ONE;
    MapAlter = 0x62, Map => Map, TWO;
    StringParseJsonMap = 0x63, String => Map, NONE;

    // String output (0x70–0x7F)
    ArrayGetString = 0x70, Array => String, ONE;
    ArrayJoin = 0x71, Array => String, UP_TO_ONE;
    BooleanAsString = 0x72, Boolean => String, NONE;
    BytesAsString = 0x73, Bytes => String, NONE;
    FloatAsString = 0x74, Float => String, NONE;
    IntegerAsString = 0x75, Integer => String, NONE;
    MapGetString = 0x76, Map => String, ONE;
    StringSlice = 0x77, String => String, ONE_OR_TWO;
    StringToLowerCase = 0x78, String => String, NONE;
    StringToUpperCase = 0x79, String => String, NONE;
}

impl Opcode {
    /// Symbolic name (e.g. `"StringAsFloat"`).
    pub fn symbol(self) -> &'static str {
        self.metadata().symbol
    }

    /// Variant this operator consumes.
    pub fn input(self) -> RadonTypeKind {
        self.metadata().input
    }

    /// Variant this operator produces.
    pub fn output(self) -> RadonTypeKind {
        self.metadata().output
    }

    /// Whether this operator takes a nested sub-script parameter.
    pub fn takes_subscript(self) -> bool {
        matches!(
            self,
            Opcode::ArrayFilter
                | Opcode::ArrayMap
                | Opcode::ArraySort
                | Opcode::ArrayAlter
                | Opcode::MapAlter
        )
    }
}

/// Output variant implied by a byte's numeric range, independent of whether
/// the byte names a known opcode.
pub fn range_output(byte: u8) -> Option<RadonTypeKind> {
    match byte & 0xf0 {
        0x10 => Some(RadonTypeKind::Array),
        0x20 => Some(RadonTypeKind::Boolean),
        0x30 => Some(RadonTypeKind::Bytes),
        0x40 => Some(RadonTypeKind::Integer),
        0x50 => Some(RadonTypeKind::Float),
        0x60 => Some(RadonTypeKind::Map),
        0x70 => Some(RadonTypeKind::String),
        _ => None,
    }
}
