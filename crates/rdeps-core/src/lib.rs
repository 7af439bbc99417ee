//! rdeps Core
//!
//! Computes the `resolvedDependencies` section of a SLSA provenance
//! predicate for a completed task run or pipeline run.
//!
//! # Core Concepts
//!
//! - [`resolve_task`] / [`resolve_pipeline`]: pure aggregation over a record snapshot
//! - [`TaskDescriptorStrategy`]: verbose vs. minimal description of pipeline child tasks
//! - [`AttestationConfig`]: build type, deep inspection, builder identity
//! - [`DependencyResolver`]: configuration and extractor bundled together
//!
//! # Example
//!
//! ```rust
//! use rdeps_core::{AttestationConfig, DependencyResolver};
//! use rdeps_run::TaskRun;
//!
//! let resolver = DependencyResolver::new(AttestationConfig::new());
//! let deps = resolver.resolve_task(&TaskRun::new("empty")).unwrap();
//! assert!(deps.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod resolver;
pub mod strategy;

// Re-exports
pub use config::{AttestationConfig, BuildType, DEFAULT_BUILDER_ID};
pub use error::{ConfigError, ResolveError};
pub use resolver::{resolve_pipeline, resolve_task, DependencyResolver};
pub use strategy::{MinimalTaskDescriptor, TaskDescriptorStrategy, VerboseTaskDescriptor};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
