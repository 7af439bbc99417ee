//! Pre-normalization materials and the descriptor normalizer

use crate::descriptor::{DigestSet, ResourceDescriptor};
use serde::{Deserialize, Serialize};

/// Raw material reported by an extractor
///
/// 1:1 convertible to a [`ResourceDescriptor`] given a default name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    /// Artifact locator
    pub uri: String,

    /// Artifact digests
    #[serde(default)]
    pub digest: DigestSet,

    /// Explicit role, overriding the caller's default name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,
}

impl Material {
    /// Create material without a type hint
    #[inline]
    #[must_use]
    pub fn new(uri: impl Into<String>, digest: DigestSet) -> Self {
        Self {
            uri: uri.into(),
            digest,
            type_hint: None,
        }
    }

    /// Create material with a single digest entry
    #[inline]
    #[must_use]
    pub fn with_digest(
        uri: impl Into<String>,
        algorithm: impl Into<String>,
        hex: impl Into<String>,
    ) -> Self {
        Self::new(uri, DigestSet::from([(algorithm.into(), hex.into())]))
    }

    /// Set the type hint
    #[inline]
    #[must_use]
    pub fn with_type_hint(mut self, hint: impl Into<String>) -> Self {
        self.type_hint = Some(hint.into());
        self
    }

    /// Same uri and digest set
    #[inline]
    #[must_use]
    pub fn same_artifact(&self, other: &Self) -> bool {
        self.uri == other.uri && self.digest == other.digest
    }
}

/// Convert a material into the canonical descriptor shape
///
/// A non-empty type hint wins over `default_name`. Content is always empty.
#[must_use]
pub fn normalize(material: Material, default_name: &str) -> ResourceDescriptor {
    let name = match material.type_hint {
        Some(hint) if !hint.is_empty() => hint,
        _ => default_name.to_string(),
    };
    ResourceDescriptor::new(name, material.uri, material.digest)
}

/// Normalize a batch, dropping materials that identify nothing
pub fn normalize_all<I>(materials: I, default_name: &str) -> Vec<ResourceDescriptor>
where
    I: IntoIterator<Item = Material>,
{
    materials
        .into_iter()
        .map(|m| normalize(m, default_name))
        .filter(|rd| {
            let keep = rd.is_meaningful();
            if !keep {
                tracing::debug!(name = %rd.name, "dropping material without uri or digest");
            }
            keep
        })
        .collect()
}

/// Append materials, skipping any already present (same uri and digest)
pub fn append_materials<I>(materials: &mut Vec<Material>, incoming: I)
where
    I: IntoIterator<Item = Material>,
{
    for m in incoming {
        if !materials.iter().any(|existing| existing.same_artifact(&m)) {
            materials.push(m);
        }
    }
}
