//! Canonical resource descriptor
//!
//! [`ResourceDescriptor`] matches the in-toto / SLSA v1 resource descriptor
//! wire shape so results can be embedded directly in a provenance predicate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Algorithm name to hex-encoded digest.
///
/// Ordered so the canonical serialization is deterministic.
pub type DigestSet = BTreeMap<String, String>;

/// Role tags shared by the normalizer and the aggregators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorName {
    /// Top-level task definition of a standalone task run
    Task,

    /// Pipeline definition of a pipeline run
    Pipeline,

    /// Definition (or full snapshot) of a child task of a pipeline
    PipelineTask,

    /// Artifact referenced through a type-hinted param or result
    InputsResult,

    /// Artifact referenced through a declared resource
    PipelineResource,
}

impl DescriptorName {
    /// Wire value of the tag
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Pipeline => "pipeline",
            Self::PipelineTask => "pipelineTask",
            Self::InputsResult => "inputs/result",
            Self::PipelineResource => "pipelineResource",
        }
    }
}

impl Display for DescriptorName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single resolved dependency
///
/// # Invariants
/// A descriptor with empty `uri`, empty `digest` and empty `content` carries
/// nothing and is never emitted (see [`ResourceDescriptor::is_meaningful`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Role of the descriptor; not unique
    #[serde(default)]
    pub name: String,

    /// Artifact locator
    #[serde(default)]
    pub uri: String,

    /// Artifact digests
    #[serde(default)]
    pub digest: DigestSet,

    /// Raw serialized snapshot of the referenced object (base64 on the wire)
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "content_base64")]
    pub content: Vec<u8>,
}

impl ResourceDescriptor {
    /// Create a coordinates-only descriptor
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, uri: impl Into<String>, digest: DigestSet) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
            digest,
            content: Vec::new(),
        }
    }

    /// Attach an embedded snapshot
    #[inline]
    #[must_use]
    pub fn with_content(mut self, content: Vec<u8>) -> Self {
        self.content = content;
        self
    }

    /// Whether the descriptor identifies anything at all
    #[inline]
    #[must_use]
    pub fn is_meaningful(&self) -> bool {
        !(self.uri.is_empty() && self.digest.is_empty() && self.content.is_empty())
    }
}

mod content_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
