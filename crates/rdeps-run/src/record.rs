//! Execution record views
//!
//! Small read-only projections of task and pipeline runs, carrying only
//! what dependency resolution reads. Constructed fresh per attestation
//! request and never mutated by the resolver.

use chrono::{DateTime, Utc};
use rdeps_descriptor::DigestSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a task or pipeline definition was fetched from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefSource {
    /// Locator of the definition (e.g. `git+https://host/repo.git@ref`)
    pub uri: String,

    /// Digest of the definition
    #[serde(default)]
    pub digest: DigestSet,

    /// Path of the definition inside the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
}

impl RefSource {
    /// Create a reference source
    #[inline]
    #[must_use]
    pub fn new(uri: impl Into<String>, digest: DigestSet) -> Self {
        Self {
            uri: uri.into(),
            digest,
            entry_point: None,
        }
    }
}

/// Execution state of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Completion {
    /// Never started (or absent from the record)
    NotRun,

    /// Started, no completion time yet
    Running,

    /// Finished
    Completed,
}

impl Completion {
    /// Only completed units contribute dependencies
    #[inline]
    #[must_use]
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Read-only view over a task or pipeline run
pub trait ExecutionUnit {
    /// Name of the run
    fn name(&self) -> &str;

    /// Declared remote source of the definition, if any
    fn ref_source(&self) -> Option<&RefSource>;

    /// When the run started
    fn start_time(&self) -> Option<DateTime<Utc>>;

    /// When the run finished
    fn completion_time(&self) -> Option<DateTime<Utc>>;

    /// Derived execution state
    fn completion(&self) -> Completion {
        match (self.start_time(), self.completion_time()) {
            (_, Some(_)) => Completion::Completed,
            (Some(_), None) => Completion::Running,
            (None, None) => Completion::NotRun,
        }
    }
}

/// Param, result or default value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Plain string
    String(String),

    /// Array of strings
    Array(Vec<String>),

    /// Object of string fields
    Object(BTreeMap<String, String>),
}

impl ParamValue {
    /// String payload, if this is a string value
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Object payload, if this is an object value
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Named value (run param or emitted result)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Param or result name
    pub name: String,

    /// Value
    pub value: ParamValue,
}

impl Param {
    /// Create a named value
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Declared param with an optional default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Param name
    pub name: String,

    /// Declared default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
}

/// Image a step or sidecar container actually ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerState {
    /// Container name
    pub name: String,

    /// Resolved image id, e.g. `docker-pullable://gcr.io/x@sha256:...`
    pub image_id: String,
}

impl ContainerState {
    /// Create a container state
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, image_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_id: image_id.into(),
        }
    }
}

/// Declared input resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInput {
    /// Resource name
    pub name: String,

    /// Resource type (`git`, `image`, ...)
    #[serde(rename = "type")]
    pub kind: String,

    /// Resource params (`url`, `revision`, ...)
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// Value emitted for a resource during the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResult {
    /// Resource the value belongs to
    pub resource_name: String,

    /// Key (`url`, `commit`, ...)
    pub key: String,

    /// Value
    pub value: String,
}

/// A single task run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRun {
    /// Run name
    pub name: String,

    /// Remote source of the task definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_source: Option<RefSource>,

    /// Start time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    /// Completion time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,

    /// Step containers
    #[serde(default)]
    pub steps: Vec<ContainerState>,

    /// Sidecar containers
    #[serde(default)]
    pub sidecars: Vec<ContainerState>,

    /// Params declared by the task definition
    #[serde(default)]
    pub spec_params: Vec<ParamSpec>,

    /// Params supplied to the run
    #[serde(default)]
    pub params: Vec<Param>,

    /// Results emitted by the run
    #[serde(default)]
    pub results: Vec<Param>,

    /// Declared input resources
    #[serde(default)]
    pub resources: Vec<ResourceInput>,

    /// Values emitted for resources
    #[serde(default)]
    pub resource_results: Vec<ResourceResult>,
}

impl TaskRun {
    /// Create an empty, not-yet-started task run
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl ExecutionUnit for TaskRun {
    fn name(&self) -> &str {
        &self.name
    }

    fn ref_source(&self) -> Option<&RefSource> {
        self.ref_source.as_ref()
    }

    fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    fn completion_time(&self) -> Option<DateTime<Utc>> {
        self.completion_time
    }
}

/// Task declared by a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineTask {
    /// Pipeline task name
    pub name: String,
}

/// Resolved pipeline definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSpec {
    /// Regular tasks, in declaration order
    #[serde(default)]
    pub tasks: Vec<PipelineTask>,

    /// Finally tasks, in declaration order
    #[serde(default)]
    pub finally: Vec<PipelineTask>,

    /// Declared pipeline params
    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

/// A pipeline run and the task runs it spawned
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    /// Run name
    pub name: String,

    /// Remote source of the pipeline definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_source: Option<RefSource>,

    /// Start time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    /// Completion time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<DateTime<Utc>>,

    /// Resolved pipeline definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_spec: Option<PipelineSpec>,

    /// Child task runs keyed by pipeline task name
    #[serde(default)]
    pub task_runs: BTreeMap<String, TaskRun>,

    /// Params supplied to the run
    #[serde(default)]
    pub params: Vec<Param>,

    /// Results emitted by the run
    #[serde(default)]
    pub results: Vec<Param>,
}

impl PipelineRun {
    /// Create an empty, not-yet-started pipeline run
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Declared child tasks: regular tasks first, then finally tasks
    pub fn child_tasks(&self) -> impl Iterator<Item = &PipelineTask> {
        self.pipeline_spec
            .iter()
            .flat_map(|spec| spec.tasks.iter().chain(spec.finally.iter()))
    }

    /// Task run spawned for a pipeline task
    #[inline]
    #[must_use]
    pub fn task_run(&self, pipeline_task: &str) -> Option<&TaskRun> {
        self.task_runs.get(pipeline_task)
    }

    /// Task runs of declared children that completed, in declaration order
    pub fn completed_children(&self) -> impl Iterator<Item = (&PipelineTask, &TaskRun)> {
        self.child_tasks().filter_map(move |task| match self.task_run(&task.name) {
            Some(tr) if tr.completion().is_completed() => Some((task, tr)),
            Some(tr) => {
                tracing::debug!(
                    task = %task.name,
                    state = ?tr.completion(),
                    "skipping task run that did not complete"
                );
                None
            }
            None => {
                tracing::debug!(task = %task.name, "taskrun status not found");
                None
            }
        })
    }
}

impl ExecutionUnit for PipelineRun {
    fn name(&self) -> &str {
        &self.name
    }

    fn ref_source(&self) -> Option<&RefSource> {
        self.ref_source.as_ref()
    }

    fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    fn completion_time(&self) -> Option<DateTime<Utc>> {
        self.completion_time
    }
}
