//! Protobuf-shaped wire messages.
//!
//! Hand-written prost structs mirroring the `RADRequest` schema; the encoded
//! bytes are what gets hashed into the RAD hash and submitted to the oracle
//! network, so field numbers and types here are consensus-critical and must
//! never change.
//!
//! [`RadRequest::verify`] re-checks the schema invariants immediately before
//! encoding; a message that fails verification is never serialized.

use radon_script::{FilterOp, ReducerOp};

use crate::error::{Result, WireError};

/// Retrieval kind codes carried on the wire.
pub mod kind {
    /// No transport; only valid with an empty url (RNG marker form).
    pub const NONE: u32 = 0;
    pub const HTTP_GET: u32 = 1;
    pub const RNG: u32 = 2;
    pub const HTTP_POST: u32 = 3;
    pub const HTTP_HEAD: u32 = 4;

    /// Highest kind code in the schema.
    pub const MAX: u32 = HTTP_HEAD;
}

/// A complete data request on the wire.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RadRequest {
    #[prost(message, repeated, tag = "1")]
    pub retrieve: Vec<RadRetrieve>,
    #[prost(message, optional, tag = "2")]
    pub aggregate: Option<RadAggregate>,
    #[prost(message, optional, tag = "3")]
    pub tally: Option<RadTally>,
}

/// One data source on the wire.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RadRetrieve {
    #[prost(uint32, tag = "1")]
    pub kind: u32,
    #[prost(string, tag = "2")]
    pub url: String,
    #[prost(message, repeated, tag = "3")]
    pub headers: Vec<StringPair>,
    #[prost(bytes = "vec", tag = "4")]
    pub body: Vec<u8>,
    /// CBOR bytecode of the retrieval's script (`0x80`, the empty array,
    /// for the identity).
    #[prost(bytes = "vec", tag = "5")]
    pub script: Vec<u8>,
}

/// An HTTP header on the wire. Order is preserved and hash-relevant.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringPair {
    #[prost(string, tag = "1")]
    pub left: String,
    #[prost(string, tag = "2")]
    pub right: String,
}

/// Source-aggregation stage.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RadAggregate {
    #[prost(uint32, tag = "1")]
    pub reducer: u32,
    #[prost(message, repeated, tag = "2")]
    pub filters: Vec<RadFilter>,
}

/// Witness-tally stage.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RadTally {
    #[prost(uint32, tag = "1")]
    pub reducer: u32,
    #[prost(message, repeated, tag = "2")]
    pub filters: Vec<RadFilter>,
}

/// A filter on the wire: opcode plus CBOR-encoded arguments.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RadFilter {
    #[prost(uint32, tag = "1")]
    pub op: u32,
    #[prost(bytes = "vec", tag = "2")]
    pub args: Vec<u8>,
}

impl RadRequest {
    /// Schema verification. Every violation names the offending field.
    pub fn verify(&self) -> Result<()> {
        if self.retrieve.is_empty() {
            return Err(WireError::Schema(
                "retrieve: a request needs at least one source".to_string(),
            ));
        }
        for (index, retrieve) in self.retrieve.iter().enumerate() {
            retrieve
                .verify()
                .map_err(|err| WireError::Schema(format!("retrieve[{index}]: {err}")))?;
        }
        let aggregate = self
            .aggregate
            .as_ref()
            .ok_or_else(|| WireError::Schema("aggregate: missing stage".to_string()))?;
        verify_stage("aggregate", aggregate.reducer, &aggregate.filters)?;
        let tally = self
            .tally
            .as_ref()
            .ok_or_else(|| WireError::Schema("tally: missing stage".to_string()))?;
        verify_stage("tally", tally.reducer, &tally.filters)?;
        Ok(())
    }

    /// Verify, then encode to the canonical wire bytes.
    pub fn encode_verified(&self) -> Result<Vec<u8>> {
        self.verify()?;
        let bytes = prost::Message::encode_to_vec(self);
        tracing::debug!(len = bytes.len(), sources = self.retrieve.len(), "encoded RADRequest");
        Ok(bytes)
    }

    /// Decode wire bytes and re-verify the schema.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let message = <Self as prost::Message>::decode(bytes)?;
        message.verify()?;
        Ok(message)
    }
}

impl RadRetrieve {
    fn verify(&self) -> std::result::Result<(), String> {
        if self.kind > kind::MAX {
            return Err(format!("kind {} is outside the schema range", self.kind));
        }
        match self.kind {
            kind::NONE | kind::RNG => {
                if !self.url.is_empty() {
                    return Err("RNG retrieval carries a url".to_string());
                }
                if !self.headers.is_empty() {
                    return Err("RNG retrieval carries headers".to_string());
                }
                if !self.body.is_empty() {
                    return Err("RNG retrieval carries a body".to_string());
                }
            }
            kind::HTTP_GET | kind::HTTP_HEAD => {
                if self.url.is_empty() {
                    return Err("HTTP retrieval is missing its url".to_string());
                }
                if !self.body.is_empty() {
                    return Err("GET/HEAD retrieval carries a body".to_string());
                }
            }
            kind::HTTP_POST => {
                if self.url.is_empty() {
                    return Err("HTTP retrieval is missing its url".to_string());
                }
            }
            _ => unreachable!("kind already range-checked"),
        }
        Ok(())
    }
}

fn verify_stage(stage: &'static str, reducer: u32, filters: &[RadFilter]) -> Result<()> {
    let reducer_byte = u8::try_from(reducer)
        .map_err(|_| WireError::Schema(format!("{stage}: reducer {reducer} overflows a byte")))?;
    ReducerOp::from_u8(reducer_byte)
        .map_err(|err| WireError::Schema(format!("{stage}: {err}")))?;
    for (index, filter) in filters.iter().enumerate() {
        let op_byte = u8::try_from(filter.op).map_err(|_| {
            WireError::Schema(format!("{stage}.filters[{index}]: op {} overflows a byte", filter.op))
        })?;
        FilterOp::from_u8(op_byte)
            .map_err(|err| WireError::Schema(format!("{stage}.filters[{index}]: {err}")))?;
    }
    Ok(())
}
