//! Material extractor interface
//!
//! The resolver does not look inside images, params or resources itself;
//! it asks a [`MaterialExtractor`] for the materials of each unit.

use crate::record::{PipelineRun, TaskRun};
use rdeps_descriptor::Material;
use std::fmt::{self, Display, Formatter};

/// Which extractor operation produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collaborator {
    /// Step container images
    StepImages,

    /// Sidecar container images
    SidecarImages,

    /// Type-hinted task params and results
    ParamsResults,

    /// Declared task resources
    Resources,

    /// Type-hinted pipeline params and results
    PipelineParamsResults,
}

impl Display for Collaborator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StepImages => "step images",
            Self::SidecarImages => "sidecar images",
            Self::ParamsResults => "params and results",
            Self::Resources => "resources",
            Self::PipelineParamsResults => "pipeline params and results",
        })
    }
}

/// An extractor failed to compute materials for a unit
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("extracting {collaborator} of {unit}: {reason}")]
pub struct ExtractionError {
    /// Name of the unit being inspected
    pub unit: String,

    /// Operation that failed
    pub collaborator: Collaborator,

    /// What went wrong
    pub reason: String,
}

impl ExtractionError {
    /// Create an extraction error
    #[inline]
    #[must_use]
    pub fn new(unit: impl Into<String>, collaborator: Collaborator, reason: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            collaborator,
            reason: reason.into(),
        }
    }
}

/// Pipeline-level inspection switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InspectionOptions {
    /// Also collect typed param/result materials of every completed child
    pub deep_inspection: bool,
}

/// Source of raw materials for execution units
///
/// Implementations must be deterministic functions of the record; the
/// resolver never retries.
pub trait MaterialExtractor: Send + Sync + fmt::Debug {
    /// Default name given to image materials that carry no type hint
    fn image_tag(&self) -> &str;

    /// Images the run's steps executed in
    ///
    /// # Errors
    /// Fails if an image reference cannot be turned into a material.
    fn step_image_materials(&self, run: &TaskRun) -> Result<Vec<Material>, ExtractionError>;

    /// Images the run's sidecars executed in
    ///
    /// # Errors
    /// Fails if an image reference cannot be turned into a material.
    fn sidecar_image_materials(&self, run: &TaskRun) -> Result<Vec<Material>, ExtractionError>;

    /// Artifacts referenced through type-hinted params and results
    fn param_result_materials(&self, run: &TaskRun) -> Vec<Material>;

    /// Artifacts referenced through declared resources
    fn resource_materials(&self, run: &TaskRun) -> Vec<Material>;

    /// Artifacts referenced through type-hinted pipeline params and results
    fn pipeline_param_result_materials(
        &self,
        run: &PipelineRun,
        options: InspectionOptions,
    ) -> Vec<Material>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_names_unit_and_collaborator() {
        let err = ExtractionError::new("build-xyz", Collaborator::SidecarImages, "bad image id");
        let msg = err.to_string();
        assert!(msg.contains("build-xyz"));
        assert!(msg.contains("sidecar images"));
        assert!(msg.contains("bad image id"));
    }
}
