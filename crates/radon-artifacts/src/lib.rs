//! Artifact hierarchy for oracle data requests.
//!
//! Four artifact kinds, from most abstract to most concrete:
//!
//! - [`Retrieval`]: one data source (method, url, headers, body, script),
//!   possibly parameterized by wildcards
//! - [`Template`]: retrievals plus aggregate/tally reducers, foldable with
//!   concrete arguments
//! - [`Modal`]: one retrieval replicated across interchangeable providers
//! - [`Request`]: fully concrete, wire-encodable, RAD-hashable
//!
//! Plus a [`Registry`] of named artifacts with substring search.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod modal;
pub mod registry;
pub mod request;
pub mod retrieval;
pub mod template;

mod json;

pub use error::{ArtifactError, Result};
pub use modal::Modal;
pub use registry::{Artifact, Registry};
pub use request::Request;
pub use retrieval::{Method, Retrieval};
pub use template::{Template, TemplateArgs};
