//! Registry: a named, searchable collection of artifacts.
//!
//! Names are unique across all artifact kinds. Lookup is exact; search
//! matches suffixes and substrings and returns deterministic, sorted
//! results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactError, Result};
use crate::modal::Modal;
use crate::request::Request;
use crate::template::Template;

/// Any of the three named artifact kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Artifact {
    Template(Template),
    Modal(Modal),
    Request(Request),
}

impl Artifact {
    pub fn kind(&self) -> &'static str {
        match self {
            Artifact::Template(_) => "template",
            Artifact::Modal(_) => "modal",
            Artifact::Request(_) => "request",
        }
    }
}

/// A collection of artifacts keyed by unique name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    artifacts: BTreeMap<String, Artifact>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an artifact. Names are unique across kinds.
    pub fn insert(&mut self, name: impl Into<String>, artifact: Artifact) -> Result<()> {
        let name = name.into();
        if self.artifacts.contains_key(&name) {
            return Err(ArtifactError::DuplicateArtifact { name });
        }
        self.artifacts.insert(name, artifact);
        Ok(())
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.get(name)
    }

    /// All names whose value ends with or contains `fragment`, in sorted
    /// order. Suffix matches rank before plain substring matches.
    pub fn search(&self, fragment: &str) -> Vec<&str> {
        let mut suffix = Vec::new();
        let mut inner = Vec::new();
        for name in self.artifacts.keys() {
            if name.ends_with(fragment) {
                suffix.push(name.as_str());
            } else if name.contains(fragment) {
                inner.push(name.as_str());
            }
        }
        suffix.extend(inner);
        suffix
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Artifact)> {
        self.artifacts.iter().map(|(name, artifact)| (name.as_str(), artifact))
    }
}
