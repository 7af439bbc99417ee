//! Testing utilities for rdeps workspace
//!
//! Shared record fixtures and a scripted extractor.

#![allow(missing_docs)]

use chrono::{TimeZone, Utc};
use rdeps_descriptor::{DigestSet, Material};
use rdeps_run::{
    Collaborator, ExtractionError, InspectionOptions, MaterialExtractor, PipelineRun,
    PipelineSpec, PipelineTask, RefSource, TaskRun,
};
use std::collections::HashMap;

pub fn digest(algorithm: &str, hex: &str) -> DigestSet {
    DigestSet::from([(algorithm.to_string(), hex.to_string())])
}

pub fn ref_source(uri: &str, algorithm: &str, hex: &str) -> RefSource {
    RefSource::new(uri, digest(algorithm, hex))
}

pub fn material(uri: &str, algorithm: &str, hex: &str) -> Material {
    Material::with_digest(uri, algorithm, hex)
}

pub fn completed_task_run(name: &str) -> TaskRun {
    let mut tr = running_task_run(name);
    tr.completion_time = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 5, 0).unwrap());
    tr
}

pub fn running_task_run(name: &str) -> TaskRun {
    let mut tr = TaskRun::new(name);
    tr.start_time = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    tr
}

pub fn pipeline_run(name: &str, tasks: &[&str], finally: &[&str]) -> PipelineRun {
    let to_tasks = |names: &[&str]| {
        names
            .iter()
            .map(|n| PipelineTask { name: (*n).to_string() })
            .collect::<Vec<_>>()
    };
    let mut pr = PipelineRun::new(name);
    pr.pipeline_spec = Some(PipelineSpec {
        tasks: to_tasks(tasks),
        finally: to_tasks(finally),
        params: Vec::new(),
    });
    pr
}

/// Extractor returning fixed materials per task run name
#[derive(Debug, Default, Clone)]
pub struct ScriptedExtractor {
    image_tag: String,
    steps: HashMap<String, Vec<Material>>,
    sidecars: HashMap<String, Vec<Material>>,
    params: HashMap<String, Vec<Material>>,
    resources: HashMap<String, Vec<Material>>,
    pipeline: Vec<Material>,
    failures: HashMap<(String, Collaborator), String>,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_image_tag(mut self, tag: &str) -> Self {
        self.image_tag = tag.to_string();
        self
    }

    #[must_use]
    pub fn step_images(mut self, unit: &str, mats: Vec<Material>) -> Self {
        self.steps.insert(unit.to_string(), mats);
        self
    }

    #[must_use]
    pub fn sidecar_images(mut self, unit: &str, mats: Vec<Material>) -> Self {
        self.sidecars.insert(unit.to_string(), mats);
        self
    }

    #[must_use]
    pub fn param_results(mut self, unit: &str, mats: Vec<Material>) -> Self {
        self.params.insert(unit.to_string(), mats);
        self
    }

    #[must_use]
    pub fn resources(mut self, unit: &str, mats: Vec<Material>) -> Self {
        self.resources.insert(unit.to_string(), mats);
        self
    }

    #[must_use]
    pub fn pipeline_param_results(mut self, mats: Vec<Material>) -> Self {
        self.pipeline = mats;
        self
    }

    #[must_use]
    pub fn fail(mut self, unit: &str, collaborator: Collaborator, reason: &str) -> Self {
        self.failures
            .insert((unit.to_string(), collaborator), reason.to_string());
        self
    }

    fn scripted(
        &self,
        table: &HashMap<String, Vec<Material>>,
        unit: &str,
        collaborator: Collaborator,
    ) -> Result<Vec<Material>, ExtractionError> {
        if let Some(reason) = self.failures.get(&(unit.to_string(), collaborator)) {
            return Err(ExtractionError::new(unit, collaborator, reason.clone()));
        }
        Ok(table.get(unit).cloned().unwrap_or_default())
    }
}

impl MaterialExtractor for ScriptedExtractor {
    fn image_tag(&self) -> &str {
        &self.image_tag
    }

    fn step_image_materials(&self, run: &TaskRun) -> Result<Vec<Material>, ExtractionError> {
        self.scripted(&self.steps, &run.name, Collaborator::StepImages)
    }

    fn sidecar_image_materials(&self, run: &TaskRun) -> Result<Vec<Material>, ExtractionError> {
        self.scripted(&self.sidecars, &run.name, Collaborator::SidecarImages)
    }

    fn param_result_materials(&self, run: &TaskRun) -> Vec<Material> {
        self.params.get(&run.name).cloned().unwrap_or_default()
    }

    fn resource_materials(&self, run: &TaskRun) -> Vec<Material> {
        self.resources.get(&run.name).cloned().unwrap_or_default()
    }

    fn pipeline_param_result_materials(
        &self,
        _run: &PipelineRun,
        _options: InspectionOptions,
    ) -> Vec<Material> {
        self.pipeline.clone()
    }
}
