//! Task descriptor strategies
//!
//! Provides the [`TaskDescriptorStrategy`] trait deciding how a child task
//! of a pipeline is described in the resolved dependencies.

use crate::error::ResolveError;
use rdeps_descriptor::{DescriptorName, ResourceDescriptor};
use rdeps_run::{ExecutionUnit, TaskRun};

/// How a child task run of a pipeline is described
///
/// Selected once per attestation request.
pub trait TaskDescriptorStrategy: Send + Sync + std::fmt::Debug {
    /// Describe a completed child task run
    ///
    /// # Returns
    /// - `Ok(Some(_))` with a `pipelineTask` descriptor
    /// - `Ok(None)` if this strategy has nothing to say about the child
    ///
    /// # Errors
    /// Fails if the child snapshot cannot be serialized.
    fn describe(&self, child: &TaskRun) -> Result<Option<ResourceDescriptor>, ResolveError>;

    /// Strategy name (for debugging/serialization)
    fn name(&self) -> &'static str;
}

/// Embeds the full child snapshot, plus its source coordinates when known
///
/// Used by Tekton-aware verifiers that want to replay the task.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerboseTaskDescriptor;

impl TaskDescriptorStrategy for VerboseTaskDescriptor {
    fn describe(&self, child: &TaskRun) -> Result<Option<ResourceDescriptor>, ResolveError> {
        let content = serde_json::to_vec(child).map_err(|source| ResolveError::Serialization {
            unit: child.name().to_string(),
            source,
        })?;

        let mut rd = ResourceDescriptor::default().with_content(content);
        rd.name = DescriptorName::PipelineTask.to_string();
        if let Some(src) = child.ref_source() {
            rd.uri.clone_from(&src.uri);
            rd.digest.clone_from(&src.digest);
        }
        Ok(Some(rd))
    }

    fn name(&self) -> &'static str {
        "verbose"
    }
}

/// Coordinates only; nothing for children without a remote source
///
/// Used by generic SLSA verifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalTaskDescriptor;

impl TaskDescriptorStrategy for MinimalTaskDescriptor {
    fn describe(&self, child: &TaskRun) -> Result<Option<ResourceDescriptor>, ResolveError> {
        Ok(child.ref_source().map(|src| {
            ResourceDescriptor::new(
                DescriptorName::PipelineTask.as_str(),
                src.uri.clone(),
                src.digest.clone(),
            )
        }))
    }

    fn name(&self) -> &'static str {
        "minimal"
    }
}
