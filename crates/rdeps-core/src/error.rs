//! Error types for rdeps Core
//!
//! Every failure is a deterministic function of the input record, so none
//! of them is retryable here; retries belong to the surrounding
//! attestation pipeline.

use rdeps_descriptor::DescriptorError;
use rdeps_run::ExtractionError;
use std::path::PathBuf;

/// Dependency resolution error
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// An extractor failed for some unit
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// A child task run could not be serialized into a verbose descriptor
    #[error("serializing task run {unit}: {source}")]
    Serialization {
        /// Task run being described
        unit: String,
        /// Underlying serializer error
        #[source]
        source: serde_json::Error,
    },

    /// A descriptor could not be canonicalized for deduplication
    #[error("deduplication failed: {0}")]
    Marshal(#[from] DescriptorError),
}

impl ResolveError {
    /// Unit the failure is attributed to, when known
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        match self {
            Self::Extraction(e) => Some(&e.unit),
            Self::Serialization { unit, .. } => Some(unit),
            Self::Marshal(_) => None,
        }
    }

    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("reading {}: {source}", .path.display())]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid TOML
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid YAML
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Extension is neither TOML nor YAML
    #[error("unsupported config format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Unknown build type name
    #[error("unknown build type: {0}")]
    UnknownBuildType(String),
}
