//! Default extractor reading materials straight from the run record
//!
//! # Conventions
//! - Image ids look like `[docker-pullable://]repo@alg:hex` and become
//!   `oci://repo` materials.
//! - The `CHAINS-GIT_URL` / `CHAINS-GIT_COMMIT` pair names a git source.
//! - Results named `*ARTIFACT_INPUTS` holding `{uri, digest: "alg:hex"}`
//!   name arbitrary input artifacts.
//! - Git-typed input resources with `url` and `revision` name a git source.

use crate::extract::{Collaborator, ExtractionError, InspectionOptions, MaterialExtractor};
use crate::record::{ContainerState, Param, ParamSpec, ParamValue, PipelineRun, TaskRun};
use rdeps_descriptor::{append_materials, Material};

/// Param/result carrying the git commit of the build source
pub const COMMIT_PARAM: &str = "CHAINS-GIT_COMMIT";

/// Param/result carrying the git url of the build source
pub const URL_PARAM: &str = "CHAINS-GIT_URL";

/// Suffix of results that declare input artifacts
pub const ARTIFACT_INPUTS_SUFFIX: &str = "ARTIFACT_INPUTS";

const OCI_SCHEME: &str = "oci://";
const DOCKER_PULLABLE_SCHEME: &str = "docker-pullable://";
const GIT_RESOURCE: &str = "git";

/// Extractor backed by the record's own status fields
#[derive(Debug, Clone, Default)]
pub struct StatusExtractor {
    image_tag: String,
}

impl StatusExtractor {
    /// Create an extractor whose image materials are unnamed
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Name image materials with `tag`
    #[inline]
    #[must_use]
    pub fn with_image_tag(mut self, tag: impl Into<String>) -> Self {
        self.image_tag = tag.into();
        self
    }
}

impl MaterialExtractor for StatusExtractor {
    fn image_tag(&self) -> &str {
        &self.image_tag
    }

    fn step_image_materials(&self, run: &TaskRun) -> Result<Vec<Material>, ExtractionError> {
        image_materials(&run.name, &run.steps, Collaborator::StepImages)
    }

    fn sidecar_image_materials(&self, run: &TaskRun) -> Result<Vec<Material>, ExtractionError> {
        image_materials(&run.name, &run.sidecars, Collaborator::SidecarImages)
    }

    fn param_result_materials(&self, run: &TaskRun) -> Vec<Material> {
        let mut git = GitSource::default();
        git.scan_defaults(&run.spec_params);
        git.scan(&run.params);
        git.scan(&run.results);

        let mut mats = Vec::new();
        mats.extend(git.into_material());
        mats.extend(structured_materials(&run.name, &run.results));
        mats
    }

    fn resource_materials(&self, run: &TaskRun) -> Vec<Material> {
        run.resources
            .iter()
            .filter(|input| input.kind == GIT_RESOURCE)
            .filter_map(|input| {
                let url = input.params.get("url").filter(|u| !u.is_empty())?;
                let revision = input.params.get("revision").map_or("", String::as_str);
                let mut m = Material::new(spdx_git(url, revision), Default::default());
                for rr in run.resource_results.iter().filter(|rr| rr.resource_name == input.name) {
                    if rr.key == "commit" {
                        m.digest.insert("sha1".to_string(), rr.value.clone());
                    }
                }
                Some(m)
            })
            .collect()
    }

    fn pipeline_param_result_materials(
        &self,
        run: &PipelineRun,
        options: InspectionOptions,
    ) -> Vec<Material> {
        let mut mats = structured_materials(&run.name, &run.results);

        if options.deep_inspection {
            for (_, tr) in run.completed_children() {
                let from_task = self.param_result_materials(tr);
                append_materials(&mut mats, from_task);
            }
        }

        let mut git = GitSource::default();
        if let Some(spec) = &run.pipeline_spec {
            git.scan_defaults(&spec.params);
        }
        git.scan(&run.params);
        git.scan(&run.results);
        append_materials(&mut mats, git.into_material());
        mats
    }
}

/// SPDX download location form of a git url
#[must_use]
pub fn spdx_git(url: &str, revision: &str) -> String {
    let mut out = String::with_capacity(url.len() + revision.len() + 9);
    if !url.starts_with("git+") {
        out.push_str("git+");
    }
    out.push_str(url);
    if !url.ends_with(".git") {
        out.push_str(".git");
    }
    if !revision.is_empty() {
        out.push('@');
        out.push_str(revision);
    }
    out
}

fn image_materials(
    unit: &str,
    containers: &[ContainerState],
    collaborator: Collaborator,
) -> Result<Vec<Material>, ExtractionError> {
    let mut mats = Vec::with_capacity(containers.len());
    for container in containers {
        let m = image_material(container.image_id.as_str())
            .map_err(|reason| ExtractionError::new(unit, collaborator, reason))?;
        append_materials(&mut mats, Some(m));
    }
    Ok(mats)
}

fn image_material(image_id: &str) -> Result<Material, String> {
    let Some((repo, digest)) = split_exactly(image_id, '@') else {
        return Err(format!("expected image id {image_id:?} to be separable by @"));
    };
    let Some((algorithm, hex)) = split_exactly(digest, ':') else {
        return Err(format!("expected digest {digest:?} to be separable by :"));
    };
    let repo = repo.strip_prefix(DOCKER_PULLABLE_SCHEME).unwrap_or(repo);
    Ok(Material::with_digest(format!("{OCI_SCHEME}{repo}"), algorithm, hex))
}

fn split_exactly(s: &str, sep: char) -> Option<(&str, &str)> {
    let (head, tail) = s.split_once(sep)?;
    if tail.contains(sep) {
        return None;
    }
    Some((head, tail))
}

#[derive(Debug, Default)]
struct GitSource {
    url: Option<String>,
    commit: Option<String>,
}

impl GitSource {
    fn scan_defaults(&mut self, specs: &[ParamSpec]) {
        for spec in specs {
            if let Some(value) = &spec.default {
                self.observe(&spec.name, value);
            }
        }
    }

    fn scan(&mut self, values: &[Param]) {
        for p in values {
            self.observe(&p.name, &p.value);
        }
    }

    fn observe(&mut self, name: &str, value: &ParamValue) {
        let Some(s) = value.as_str() else {
            return;
        };
        match name {
            COMMIT_PARAM => self.commit = Some(s.to_string()),
            URL_PARAM => self.url = Some(s.to_string()),
            _ => {}
        }
    }

    fn into_material(self) -> Option<Material> {
        match (self.url, self.commit) {
            (Some(url), Some(commit)) if !url.is_empty() && !commit.is_empty() => {
                Some(Material::with_digest(spdx_git(&url, ""), "sha1", commit))
            }
            _ => None,
        }
    }
}

fn structured_materials(unit: &str, results: &[Param]) -> Vec<Material> {
    results
        .iter()
        .filter(|r| r.name.ends_with(ARTIFACT_INPUTS_SUFFIX))
        .filter_map(|r| {
            let m = structured_material(&r.value);
            if m.is_none() {
                tracing::debug!(unit, result = %r.name, "ignoring malformed artifact inputs result");
            }
            m
        })
        .collect()
}

fn structured_material(value: &ParamValue) -> Option<Material> {
    let fields = value.as_object()?;
    let uri = fields.get("uri").filter(|u| !u.is_empty())?;
    let (algorithm, hex) = fields.get("digest")?.split_once(':')?;
    if !valid_digest(algorithm, hex) {
        return None;
    }
    Some(Material::with_digest(uri.clone(), algorithm, hex))
}

fn valid_digest(algorithm: &str, hex: &str) -> bool {
    let expected_len = match algorithm {
        "sha1" => 40,
        "sha224" => 56,
        "sha256" => 64,
        "sha384" => 96,
        "sha512" => 128,
        _ => return false,
    };
    hex.len() == expected_len && hex.bytes().all(|b| b.is_ascii_hexdigit())
}
