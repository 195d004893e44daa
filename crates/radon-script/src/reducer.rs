//! Filter and reducer descriptors.
//!
//! Filters screen a batch of values (one per source or per witness) before a
//! reducer aggregates them into one. Both are *descriptors* consumed by the
//! external execution engine; this layer builds, serializes, and stringifies
//! them, and never computes a statistic itself.
//!
//! Filter arguments travel as CBOR bytes, matching the wire form
//! (`RADFilter { op, args }`).

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScriptError};

/// Statistical filter opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FilterOp {
    GreaterThan = 0x00,
    LessThan = 0x01,
    Equals = 0x02,
    AbsoluteDeviation = 0x03,
    RelativeDeviation = 0x04,
    DeviationStandard = 0x05,
    Top = 0x06,
    Bottom = 0x07,
    Mode = 0x08,
}

impl FilterOp {
    /// Resolve a raw byte into a filter opcode.
    pub fn from_u8(byte: u8) -> Result<Self> {
        Ok(match byte {
            0x00 => FilterOp::GreaterThan,
            0x01 => FilterOp::LessThan,
            0x02 => FilterOp::Equals,
            0x03 => FilterOp::AbsoluteDeviation,
            0x04 => FilterOp::RelativeDeviation,
            0x05 => FilterOp::DeviationStandard,
            0x06 => FilterOp::Top,
            0x07 => FilterOp::Bottom,
            0x08 => FilterOp::Mode,
            other => return Err(ScriptError::UnknownFilter(other)),
        })
    }

    /// Symbolic name used by the humanized JSON form.
    pub fn symbol(self) -> &'static str {
        match self {
            FilterOp::GreaterThan => "greaterThan",
            FilterOp::LessThan => "lessThan",
            FilterOp::Equals => "equals",
            FilterOp::AbsoluteDeviation => "absoluteDeviation",
            FilterOp::RelativeDeviation => "relativeDeviation",
            FilterOp::DeviationStandard => "deviationStandard",
            FilterOp::Top => "top",
            FilterOp::Bottom => "bottom",
            FilterOp::Mode => "mode",
        }
    }
}

/// Reduction opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ReducerOp {
    Mode = 0x02,
    AverageMean = 0x03,
    AverageMedian = 0x05,
    DeviationStandard = 0x07,
    HashConcatenate = 0x0b,
}

impl ReducerOp {
    /// Resolve a raw byte into a reducer opcode.
    pub fn from_u8(byte: u8) -> Result<Self> {
        Ok(match byte {
            0x02 => ReducerOp::Mode,
            0x03 => ReducerOp::AverageMean,
            0x05 => ReducerOp::AverageMedian,
            0x07 => ReducerOp::DeviationStandard,
            0x0b => ReducerOp::HashConcatenate,
            other => return Err(ScriptError::UnknownReducer(other)),
        })
    }

    /// Symbolic name used by the humanized JSON form.
    pub fn symbol(self) -> &'static str {
        match self {
            ReducerOp::Mode => "mode",
            ReducerOp::AverageMean => "averageMean",
            ReducerOp::AverageMedian => "averageMedian",
            ReducerOp::DeviationStandard => "deviationStandard",
            ReducerOp::HashConcatenate => "hashConcatenate",
        }
    }
}

/// A filter descriptor: opcode plus optional CBOR-encoded argument bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub op: FilterOp,
    /// CBOR encoding of the filter's argument; empty when the filter takes
    /// none (e.g. mode).
    pub args: Vec<u8>,
}

impl Filter {
    /// A filter with no argument.
    pub fn new(op: FilterOp) -> Self {
        Self { op, args: Vec::new() }
    }

    /// A filter whose single argument is CBOR-encoded into `args`.
    pub fn with_arg<T: Serialize>(op: FilterOp, arg: &T) -> Result<Self> {
        let mut args = Vec::new();
        ciborium::ser::into_writer(arg, &mut args)
            .map_err(|err| ScriptError::Cbor(err.to_string()))?;
        Ok(Self { op, args })
    }

    /// Keep values within `sigmas` standard deviations of the mean.
    pub fn deviation_standard(sigmas: f64) -> Self {
        // Serializing an f64 into a Vec cannot fail.
        Self::with_arg(FilterOp::DeviationStandard, &sigmas)
            .unwrap_or(Self { op: FilterOp::DeviationStandard, args: Vec::new() })
    }

    /// Keep only the modal value(s).
    pub fn mode() -> Self {
        Self::new(FilterOp::Mode)
    }

    /// Human-readable rendering, e.g. `deviationStandard(1.4)`.
    pub fn describe(&self) -> String {
        if self.args.is_empty() {
            return format!("{}()", self.op.symbol());
        }
        match ciborium::de::from_reader::<ciborium::value::Value, _>(self.args.as_slice()) {
            Ok(ciborium::value::Value::Float(f)) => format!("{}({})", self.op.symbol(), f),
            Ok(ciborium::value::Value::Integer(i)) => {
                format!("{}({})", self.op.symbol(), i128::from(i))
            }
            Ok(ciborium::value::Value::Text(t)) => format!("{}({t:?})", self.op.symbol()),
            _ => format!("{}(<{} bytes>)", self.op.symbol(), self.args.len()),
        }
    }
}

/// A reducer descriptor: filters applied in declared order, then the
/// reduction itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reducer {
    pub op: ReducerOp,
    pub filters: Vec<Filter>,
}

impl Reducer {
    /// A bare reducer with no filters.
    pub fn new(op: ReducerOp) -> Self {
        Self { op, filters: Vec::new() }
    }

    /// A reducer with a filter pipeline applied first.
    pub fn with_filters(op: ReducerOp, filters: Vec<Filter>) -> Self {
        Self { op, filters }
    }

    pub fn mode() -> Self {
        Self::new(ReducerOp::Mode)
    }

    pub fn average_mean() -> Self {
        Self::new(ReducerOp::AverageMean)
    }

    pub fn average_median() -> Self {
        Self::new(ReducerOp::AverageMedian)
    }

    pub fn hash_concatenate() -> Self {
        Self::new(ReducerOp::HashConcatenate)
    }

    /// Source-aggregation preset for numeric price feeds: discard outliers
    /// beyond 1.4 standard deviations, then take the mean.
    pub fn price_aggregate() -> Self {
        Self::with_filters(
            ReducerOp::AverageMean,
            vec![Filter::deviation_standard(1.4)],
        )
    }

    /// Witness-tally preset for numeric price feeds: discard outliers beyond
    /// 2.5 standard deviations, then take the mean.
    pub fn price_tally() -> Self {
        Self::with_filters(
            ReducerOp::AverageMean,
            vec![Filter::deviation_standard(2.5)],
        )
    }

    /// Human-readable rendering, e.g.
    /// `deviationStandard(1.4).averageMean()`.
    pub fn describe(&self) -> String {
        let mut parts: Vec<String> = self.filters.iter().map(Filter::describe).collect();
        parts.push(format!("{}()", self.op.symbol()));
        parts.join(".")
    }
}
