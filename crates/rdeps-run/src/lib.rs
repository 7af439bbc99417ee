//! rdeps Execution Records
//!
//! Read-only views over completed task and pipeline runs, and the
//! extractor interface that turns them into raw materials.
//!
//! # Overview
//!
//! - [`TaskRun`] / [`PipelineRun`]: record views implementing [`ExecutionUnit`]
//! - [`MaterialExtractor`]: collaborator interface consumed by the resolver
//! - [`StatusExtractor`]: default extractor reading the record's status fields

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod extract;
pub mod record;
pub mod status;

// Re-exports
pub use extract::{Collaborator, ExtractionError, InspectionOptions, MaterialExtractor};
pub use record::{
    Completion, ContainerState, ExecutionUnit, Param, ParamSpec, ParamValue, PipelineRun,
    PipelineSpec, PipelineTask, RefSource, ResourceInput, ResourceResult, TaskRun,
};
pub use status::{spdx_git, StatusExtractor};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
