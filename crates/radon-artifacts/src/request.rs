//! Request: a fully concrete, hashable data request.
//!
//! A request is the terminal artifact: every member retrieval is concrete
//! (zero remaining wildcards), so the request has a canonical wire encoding
//! and a stable RAD hash. The hash binds the protobuf bytes, never any JSON
//! rendering.

use serde::{Deserialize, Serialize};

use radon_script::{Filter, Reducer};
use radon_wire::{RadAggregate, RadFilter, RadHash, RadRequest, RadTally};

use crate::error::{ArtifactError, Result};
use crate::json::reducer_json;
use crate::retrieval::Retrieval;

/// A concrete data request, ready for wire encoding and hashing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    retrievals: Vec<Retrieval>,
    aggregate: Reducer,
    tally: Reducer,
}

impl Request {
    /// Assemble a request. Fails fast if any member retrieval still expects
    /// wildcard arguments or violates its structural invariants.
    pub fn new(retrievals: Vec<Retrieval>, aggregate: Reducer, tally: Reducer) -> Result<Self> {
        if retrievals.is_empty() {
            return Err(ArtifactError::EmptyTemplate);
        }
        for (index, retrieval) in retrievals.iter().enumerate() {
            retrieval.validate()?;
            let args_count = retrieval.args_count()?;
            if args_count > 0 {
                return Err(ArtifactError::ParameterizedRetrieval { index, args_count });
            }
        }
        Ok(Self {
            retrievals,
            aggregate,
            tally,
        })
    }

    pub fn retrievals(&self) -> &[Retrieval] {
        &self.retrievals
    }

    pub fn aggregate(&self) -> &Reducer {
        &self.aggregate
    }

    pub fn tally(&self) -> &Reducer {
        &self.tally
    }

    /// Wire form of this request.
    pub fn to_wire(&self) -> Result<RadRequest> {
        Ok(RadRequest {
            retrieve: self
                .retrievals
                .iter()
                .map(Retrieval::to_wire)
                .collect::<Result<_>>()?,
            aggregate: Some(RadAggregate {
                reducer: self.aggregate.op as u32,
                filters: wire_filters(&self.aggregate.filters),
            }),
            tally: Some(RadTally {
                reducer: self.tally.op as u32,
                filters: wire_filters(&self.tally.filters),
            }),
        })
    }

    /// Verified canonical wire bytes.
    pub fn wire_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.to_wire()?.encode_verified()?)
    }

    /// SHA-256 of the canonical wire bytes.
    pub fn rad_hash(&self) -> Result<RadHash> {
        let bytes = self.wire_bytes()?;
        let hash = RadHash::of(&bytes);
        tracing::debug!(hash = %hash, bytes = bytes.len(), "computed RAD hash");
        Ok(hash)
    }

    /// Canonical wire bytes as lowercase hex, never `0x`-prefixed.
    pub fn bytecode(&self) -> Result<String> {
        Ok(radon_wire::bytecode_hex(&self.wire_bytes()?))
    }

    /// Wire-encoded size in bytes.
    pub fn weight(&self) -> Result<usize> {
        Ok(self.wire_bytes()?.len())
    }

    /// Display/debugging JSON form. Never hashed.
    pub fn to_json(&self, humanize: bool) -> serde_json::Value {
        serde_json::json!({
            "retrieve": self
                .retrievals
                .iter()
                .map(|retrieval| retrieval.to_json(humanize))
                .collect::<Vec<_>>(),
            "aggregate": reducer_json(&self.aggregate, humanize),
            "tally": reducer_json(&self.tally, humanize),
        })
    }
}

fn wire_filters(filters: &[Filter]) -> Vec<RadFilter> {
    filters
        .iter()
        .map(|filter| RadFilter {
            op: filter.op as u32,
            args: filter.args.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use radon_script::RadonString;

    fn concrete() -> Request {
        Request::new(
            vec![Retrieval::http_get("https://x/BTC")
                .with_script(RadonString::default().as_float())],
            Reducer::price_aggregate(),
            Reducer::price_tally(),
        )
        .unwrap()
    }

    #[test]
    fn test_parameterized_retrieval_rejected() {
        let result = Request::new(
            vec![
                Retrieval::http_get("https://x/BTC"),
                Retrieval::http_get("https://y/\\0\\"),
            ],
            Reducer::price_aggregate(),
            Reducer::price_tally(),
        );
        assert!(matches!(
            result,
            Err(ArtifactError::ParameterizedRetrieval { index: 1, args_count: 1 })
        ));
    }

    #[test]
    fn test_rad_hash_is_stable_hex() {
        let request = concrete();
        let first = request.rad_hash().unwrap().to_hex();
        let second = request.rad_hash().unwrap().to_hex();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(!first.starts_with("0x"));
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_rad_hash_is_sensitive_to_content() {
        let base = concrete();
        let other = Request::new(
            vec![Retrieval::http_get("https://x/ETH")
                .with_script(RadonString::default().as_float())],
            Reducer::price_aggregate(),
            Reducer::price_tally(),
        )
        .unwrap();
        assert_ne!(base.rad_hash().unwrap(), other.rad_hash().unwrap());
    }

    #[test]
    fn test_weight_matches_wire_bytes() {
        let request = concrete();
        assert_eq!(request.weight().unwrap(), request.wire_bytes().unwrap().len());
    }

    #[test]
    fn test_wire_round_trip() {
        let request = concrete();
        let bytes = request.wire_bytes().unwrap();
        let parsed = RadRequest::parse(&bytes).unwrap();
        assert_eq!(parsed, request.to_wire().unwrap());
    }

    #[test]
    fn test_humanized_json_names_reducers() {
        let json = concrete().to_json(true);
        assert_eq!(
            json["aggregate"]["reducer"],
            serde_json::Value::from("averageMean")
        );
    }
}
