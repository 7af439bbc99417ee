//! Attestation configuration
//!
//! Loaded from TOML or YAML (chosen by file extension). Every field has a
//! default, so an empty file is a valid configuration.

use crate::error::ConfigError;
use crate::strategy::{MinimalTaskDescriptor, TaskDescriptorStrategy, VerboseTaskDescriptor};
use rdeps_run::InspectionOptions;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

/// Builder identity recorded by default
pub const DEFAULT_BUILDER_ID: &str = "https://tekton.dev/chains/v2";

/// Provenance build type, selecting the task descriptor strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuildType {
    /// Tekton-aware build type: child tasks embed their full snapshot
    #[serde(rename = "https://tekton.dev/chains/v2/slsa-tekton")]
    SlsaTekton,

    /// Generic SLSA build type: child tasks report coordinates only
    #[default]
    #[serde(rename = "https://tekton.dev/chains/v2/slsa")]
    Slsa,
}

impl BuildType {
    /// Build type URI
    #[inline]
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::SlsaTekton => "https://tekton.dev/chains/v2/slsa-tekton",
            Self::Slsa => "https://tekton.dev/chains/v2/slsa",
        }
    }

    /// Task descriptor strategy for this build type
    #[must_use]
    pub fn strategy(self) -> &'static dyn TaskDescriptorStrategy {
        match self {
            Self::SlsaTekton => &VerboseTaskDescriptor,
            Self::Slsa => &MinimalTaskDescriptor,
        }
    }
}

impl Display for BuildType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri())
    }
}

impl FromStr for BuildType {
    type Err = ConfigError;

    /// Accepts the short names `slsa` / `slsa-tekton` or the full URIs
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slsa-tekton" | "https://tekton.dev/chains/v2/slsa-tekton" => Ok(Self::SlsaTekton),
            "slsa" | "https://tekton.dev/chains/v2/slsa" => Ok(Self::Slsa),
            other => Err(ConfigError::UnknownBuildType(other.to_string())),
        }
    }
}

/// Per-request attestation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AttestationConfig {
    /// Builder identity
    pub builder_id: String,

    /// Build type (selects the task descriptor strategy)
    pub build_type: BuildType,

    /// Collect typed param/result materials from every completed child task
    pub deep_inspection: bool,
}

impl AttestationConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With build type
    #[inline]
    #[must_use]
    pub fn with_build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = build_type;
        self
    }

    /// With deep inspection
    #[inline]
    #[must_use]
    pub fn with_deep_inspection(mut self, enabled: bool) -> Self {
        self.deep_inspection = enabled;
        self
    }

    /// Strategy used for pipeline child tasks
    #[inline]
    #[must_use]
    pub fn task_descriptor(&self) -> &'static dyn TaskDescriptorStrategy {
        self.build_type.strategy()
    }

    /// Options forwarded to pipeline-level extractors
    #[inline]
    #[must_use]
    pub fn inspection(&self) -> InspectionOptions {
        InspectionOptions {
            deep_inspection: self.deep_inspection,
        }
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns error on malformed TOML or unknown values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Parse YAML text
    ///
    /// # Errors
    /// Returns error on malformed YAML or unknown values
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load from a `.toml`, `.yaml` or `.yml` file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let parse: fn(&str) -> Result<Self, ConfigError> =
            match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => Self::from_toml_str,
                Some("yaml" | "yml") => Self::from_yaml_str,
                _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
            };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = parse(&text)?;
        tracing::debug!(path = %path.display(), build_type = %config.build_type, "loaded attestation config");
        Ok(config)
    }
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            builder_id: DEFAULT_BUILDER_ID.to_string(),
            build_type: BuildType::default(),
            deep_inspection: false,
        }
    }
}
