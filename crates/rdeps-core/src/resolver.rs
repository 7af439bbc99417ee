//! Resolved-dependency aggregation
//!
//! Collects every external artifact that influenced a run, in a fixed
//! order that defines first-occurrence precedence, then deduplicates.
//!
//! # Task runs
//! 1. `task` descriptor for the task's remote source
//! 2. step images, then sidecar images
//! 3. typed params/results (`inputs/result`)
//! 4. declared resources (`pipelineResource`)
//!
//! # Pipeline runs
//! 1. `pipeline` descriptor for the pipeline's remote source
//! 2. for each completed child (tasks, then finally tasks): the strategy's
//!    `pipelineTask` descriptor, then the child's step and sidecar images
//! 3. typed pipeline params/results (`inputs/result`)

use crate::config::AttestationConfig;
use crate::error::ResolveError;
use crate::strategy::TaskDescriptorStrategy;
use rdeps_descriptor::{dedupe, normalize_all, DescriptorName, ResourceDescriptor};
use rdeps_run::{
    ExecutionUnit, ExtractionError, InspectionOptions, MaterialExtractor, PipelineRun,
    StatusExtractor, TaskRun,
};

/// Resolved dependencies of a standalone task run
///
/// # Errors
/// Any extractor failure aborts the whole call; no partial result is returned.
pub fn resolve_task<E>(unit: &TaskRun, extractor: &E) -> Result<Vec<ResourceDescriptor>, ResolveError>
where
    E: MaterialExtractor + ?Sized,
{
    let mut rds = Vec::new();
    rds.extend(config_descriptor(unit, DescriptorName::Task));
    rds.extend(image_descriptors(unit, extractor)?);
    rds.extend(normalize_all(
        extractor.param_result_materials(unit),
        DescriptorName::InputsResult.as_str(),
    ));
    rds.extend(normalize_all(
        extractor.resource_materials(unit),
        DescriptorName::PipelineResource.as_str(),
    ));

    let collected = rds.len();
    let resolved = dedupe(rds)?;
    tracing::info!(
        task_run = %unit.name(),
        collected,
        resolved = resolved.len(),
        "resolved task run dependencies"
    );
    Ok(resolved)
}

/// Resolved dependencies of a pipeline run
///
/// Children that never ran, or never completed, contribute nothing.
///
/// # Errors
/// Any extractor or strategy failure aborts the whole call.
pub fn resolve_pipeline<E>(
    unit: &PipelineRun,
    strategy: &dyn TaskDescriptorStrategy,
    extractor: &E,
    options: InspectionOptions,
) -> Result<Vec<ResourceDescriptor>, ResolveError>
where
    E: MaterialExtractor + ?Sized,
{
    let mut rds = Vec::new();
    rds.extend(config_descriptor(unit, DescriptorName::Pipeline));

    let mut children = 0usize;
    for (task, child) in unit.completed_children() {
        children += 1;
        match strategy.describe(child)? {
            Some(rd) if rd.is_meaningful() => rds.push(rd),
            _ => tracing::debug!(
                task = %task.name,
                strategy = strategy.name(),
                "no task descriptor for child"
            ),
        }
        // Images count even when the strategy had nothing to say.
        rds.extend(image_descriptors(child, extractor)?);
    }

    rds.extend(normalize_all(
        extractor.pipeline_param_result_materials(unit, options),
        DescriptorName::InputsResult.as_str(),
    ));

    let collected = rds.len();
    let resolved = dedupe(rds)?;
    tracing::info!(
        pipeline_run = %unit.name(),
        strategy = strategy.name(),
        children,
        collected,
        resolved = resolved.len(),
        "resolved pipeline run dependencies"
    );
    Ok(resolved)
}

fn config_descriptor<U>(unit: &U, name: DescriptorName) -> Option<ResourceDescriptor>
where
    U: ExecutionUnit + ?Sized,
{
    unit.ref_source()
        .map(|src| ResourceDescriptor::new(name.as_str(), src.uri.clone(), src.digest.clone()))
        .filter(ResourceDescriptor::is_meaningful)
}

fn image_descriptors<E>(unit: &TaskRun, extractor: &E) -> Result<Vec<ResourceDescriptor>, ExtractionError>
where
    E: MaterialExtractor + ?Sized,
{
    let mut mats = extractor.step_image_materials(unit)?;
    mats.extend(extractor.sidecar_image_materials(unit)?);
    Ok(normalize_all(mats, extractor.image_tag()))
}

/// Resolver bound to one configuration and extractor
///
/// Holds no mutable state; one instance may serve concurrent requests.
#[derive(Debug, Clone)]
pub struct DependencyResolver<E = StatusExtractor> {
    config: AttestationConfig,
    extractor: E,
}

impl DependencyResolver<StatusExtractor> {
    /// Create a resolver reading materials from the record itself
    #[inline]
    #[must_use]
    pub fn new(config: AttestationConfig) -> Self {
        Self::with_extractor(config, StatusExtractor::new())
    }
}

impl<E: MaterialExtractor> DependencyResolver<E> {
    /// Create a resolver with a custom extractor
    #[inline]
    #[must_use]
    pub fn with_extractor(config: AttestationConfig, extractor: E) -> Self {
        Self { config, extractor }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AttestationConfig {
        &self.config
    }

    /// Resolved dependencies of a standalone task run
    ///
    /// # Errors
    /// See [`resolve_task`].
    pub fn resolve_task(&self, unit: &TaskRun) -> Result<Vec<ResourceDescriptor>, ResolveError> {
        resolve_task(unit, &self.extractor)
    }

    /// Resolved dependencies of a pipeline run, using the configured strategy
    ///
    /// # Errors
    /// See [`resolve_pipeline`].
    pub fn resolve_pipeline(&self, unit: &PipelineRun) -> Result<Vec<ResourceDescriptor>, ResolveError> {
        self.resolve_pipeline_with(unit, self.config.task_descriptor())
    }

    /// Resolved dependencies of a pipeline run with an explicit strategy
    ///
    /// # Errors
    /// See [`resolve_pipeline`].
    pub fn resolve_pipeline_with(
        &self,
        unit: &PipelineRun,
        strategy: &dyn TaskDescriptorStrategy,
    ) -> Result<Vec<ResourceDescriptor>, ResolveError> {
        resolve_pipeline(unit, strategy, &self.extractor, self.config.inspection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdeps_descriptor::DigestSet;
    use rdeps_run::{ContainerState, RefSource};

    const SHA256: &str = "05f6b1f3a5d1a3ad2f3a34e7f5bdf1d2a4a5e9b1c6d7e8f9a0b1c2d3e4f5a6b7";

    #[test]
    fn config_descriptor_skips_empty_source() {
        let mut tr = TaskRun::new("t");
        assert!(config_descriptor(&tr, DescriptorName::Task).is_none());

        tr.ref_source = Some(RefSource::new("", DigestSet::new()));
        assert!(config_descriptor(&tr, DescriptorName::Task).is_none());

        tr.ref_source = Some(RefSource::new("git+https://x.git", DigestSet::new()));
        let rd = config_descriptor(&tr, DescriptorName::Task).unwrap();
        assert_eq!(rd.name, "task");
    }

    #[test]
    fn default_resolver_reads_status_images() {
        let mut tr = TaskRun::new("build");
        tr.steps = vec![ContainerState::new("a", format!("alpine@sha256:{SHA256}"))];
        tr.sidecars = vec![ContainerState::new("b", format!("alpine@sha256:{SHA256}"))];

        let rds = DependencyResolver::new(AttestationConfig::new())
            .resolve_task(&tr)
            .unwrap();
        assert_eq!(rds.len(), 1);
        assert_eq!(rds[0].uri, "oci://alpine");
        assert_eq!(rds[0].name, "");
    }

    #[test]
    fn default_resolver_propagates_bad_image() {
        let mut tr = TaskRun::new("build");
        tr.steps = vec![ContainerState::new("a", "alpine:latest")];
        let err = DependencyResolver::new(AttestationConfig::new())
            .resolve_task(&tr)
            .unwrap_err();
        assert!(matches!(err, ResolveError::Extraction(_)));
        assert_eq!(err.unit(), Some("build"));
    }
}
