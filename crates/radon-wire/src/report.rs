//! Dry-run report parsing.
//!
//! The external execution engine, given hex bytecode, returns a JSON report
//! with one entry per source plus aggregate and tally stage results, each a
//! tagged union of a typed value or a `RadonError`. This module parses and
//! summarizes that shape; it never validates numeric correctness and never
//! performs the dry-run itself.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WireError};

/// A stage result from the execution engine: a typed value or an error.
///
/// Externally tagged, matching the engine's JSON (`{"RadonFloat": 61234.5}`,
/// `{"RadonError": "http status 404"}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RadonValue {
    RadonString(String),
    RadonInteger(i64),
    RadonFloat(f64),
    RadonBoolean(bool),
    RadonBytes(Vec<u8>),
    RadonArray(Vec<RadonValue>),
    RadonMap(IndexMap<String, RadonValue>),
    RadonError(String),
}

impl RadonValue {
    /// Whether this stage failed.
    pub fn is_error(&self) -> bool {
        matches!(self, RadonValue::RadonError(_))
    }

    /// One-line human summary of the stage result.
    pub fn summary(&self) -> String {
        match self {
            RadonValue::RadonString(s) => format!("String({s:?})"),
            RadonValue::RadonInteger(i) => format!("Integer({i})"),
            RadonValue::RadonFloat(f) => format!("Float({f})"),
            RadonValue::RadonBoolean(b) => format!("Boolean({b})"),
            RadonValue::RadonBytes(bytes) => format!("Bytes({} bytes)", bytes.len()),
            RadonValue::RadonArray(items) => format!("Array({} items)", items.len()),
            RadonValue::RadonMap(entries) => format!("Map({} keys)", entries.len()),
            RadonValue::RadonError(message) => format!("Error({message})"),
        }
    }
}

/// A full dry-run report: one result per source, then the two reduction
/// stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadonReport {
    pub retrieve: Vec<RadonValue>,
    pub aggregate: RadonValue,
    pub tally: RadonValue,
}

impl RadonReport {
    /// Parse the engine's JSON output.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| WireError::Report(err.to_string()))
    }

    /// Whether any source or stage failed.
    pub fn has_errors(&self) -> bool {
        self.retrieve.iter().any(RadonValue::is_error)
            || self.aggregate.is_error()
            || self.tally.is_error()
    }

    /// Multi-line human summary, one line per source and stage.
    pub fn summary(&self) -> String {
        let mut lines = Vec::with_capacity(self.retrieve.len() + 2);
        for (index, result) in self.retrieve.iter().enumerate() {
            lines.push(format!("retrieve[{index}]: {}", result.summary()));
        }
        lines.push(format!("aggregate: {}", self.aggregate.summary()));
        lines.push(format!("tally: {}", self.tally.summary()));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typical_report() {
        let json = r#"{
            "retrieve": [
                {"RadonFloat": 61234.5},
                {"RadonError": "http status 404"}
            ],
            "aggregate": {"RadonFloat": 61234.5},
            "tally": {"RadonFloat": 61230.0}
        }"#;
        let report = RadonReport::from_json(json).expect("parses");
        assert_eq!(report.retrieve.len(), 2);
        assert!(report.retrieve[1].is_error());
        assert!(report.has_errors());
        assert_eq!(report.aggregate, RadonValue::RadonFloat(61234.5));
    }

    #[test]
    fn test_parse_nested_values() {
        let json = r#"{
            "retrieve": [{"RadonMap": {"price": {"RadonFloat": 1.5}}}],
            "aggregate": {"RadonArray": [{"RadonInteger": 1}, {"RadonInteger": 2}]},
            "tally": {"RadonBoolean": true}
        }"#;
        let report = RadonReport::from_json(json).expect("parses");
        assert!(!report.has_errors());
        assert_eq!(report.aggregate.summary(), "Array(2 items)");
    }

    #[test]
    fn test_malformed_report_surfaces_serde_text() {
        let err = RadonReport::from_json("{\"retrieve\": 3}").unwrap_err();
        assert!(matches!(err, WireError::Report(_)));
    }

    #[test]
    fn test_summary_lines() {
        let report = RadonReport {
            retrieve: vec![RadonValue::RadonFloat(2.0)],
            aggregate: RadonValue::RadonFloat(2.0),
            tally: RadonValue::RadonError("insufficient commits".to_string()),
        };
        let summary = report.summary();
        assert!(summary.contains("retrieve[0]: Float(2)"));
        assert!(summary.contains("tally: Error(insufficient commits)"));
    }
}
