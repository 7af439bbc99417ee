//! rdeps command line
//!
//! `rdeps resolve --record run.json` prints the resolved dependencies of a
//! task or pipeline run record as a JSON array on stdout.

#![warn(missing_docs)]

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use rdeps_core::{AttestationConfig, BuildType, DependencyResolver};
use rdeps_descriptor::ResourceDescriptor;
use rdeps_run::{PipelineRun, TaskRun};
use std::path::{Path, PathBuf};

/// Kind of run record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Standalone task run
    Task,
    /// Pipeline run
    Pipeline,
}

/// A parsed run record
#[derive(Debug, Clone)]
pub enum Record {
    /// Standalone task run
    Task(TaskRun),
    /// Pipeline run with its child task runs
    Pipeline(PipelineRun),
}

/// Command definition
#[must_use]
pub fn cli() -> Command {
    Command::new("rdeps")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Resolve the dependencies of a completed task or pipeline run")
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON on stderr"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("resolve")
                .about("Print resolvedDependencies for a run record")
                .arg(
                    Arg::new("record")
                        .long("record")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Run record (.json, .yaml or .yml)"),
                )
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .value_parser(["task", "pipeline"])
                        .help("Record kind (detected from the record when omitted)"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Attestation config (.toml, .yaml or .yml)"),
                )
                .arg(
                    Arg::new("build-type")
                        .long("build-type")
                        .help("slsa, slsa-tekton, or a build type URI"),
                )
                .arg(
                    Arg::new("deep-inspection")
                        .long("deep-inspection")
                        .action(ArgAction::SetTrue)
                        .help("Collect typed results of every completed child task"),
                )
                .arg(
                    Arg::new("pretty")
                        .long("pretty")
                        .action(ArgAction::SetTrue)
                        .help("Pretty-print the JSON output"),
                ),
        )
}

/// Build the effective config: file values, then command-line overrides
///
/// # Errors
/// Returns error if the config file or build type is invalid
pub fn effective_config(matches: &ArgMatches) -> Result<AttestationConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => AttestationConfig::load(path)?,
        None => AttestationConfig::default(),
    };
    if let Some(name) = matches.get_one::<String>("build-type") {
        config = config.with_build_type(name.parse::<BuildType>()?);
    }
    if matches.get_flag("deep-inspection") {
        config = config.with_deep_inspection(true);
    }
    Ok(config)
}

/// Read a run record from disk
///
/// # Errors
/// Returns error if the file cannot be read or does not match `kind`
pub fn load_record(path: &Path, kind: Option<RecordKind>) -> Result<Record> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading record {}", path.display()))?;
    let value: serde_json::Value = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text).context("parsing JSON record")?,
        Some("yaml" | "yml") => serde_yaml::from_str(&text).context("parsing YAML record")?,
        _ => bail!("unsupported record format: {}", path.display()),
    };

    let kind = kind.unwrap_or_else(|| detect_kind(&value));
    tracing::debug!(path = %path.display(), ?kind, "loaded run record");
    Ok(match kind {
        RecordKind::Task => Record::Task(serde_json::from_value(value).context("decoding task run")?),
        RecordKind::Pipeline => {
            Record::Pipeline(serde_json::from_value(value).context("decoding pipeline run")?)
        }
    })
}

fn detect_kind(value: &serde_json::Value) -> RecordKind {
    let is_pipeline = value
        .as_object()
        .is_some_and(|o| o.contains_key("pipelineSpec") || o.contains_key("taskRuns"));
    if is_pipeline {
        RecordKind::Pipeline
    } else {
        RecordKind::Task
    }
}

/// Resolve a record under a config
///
/// # Errors
/// Returns error if resolution fails
pub fn resolve(record: &Record, config: AttestationConfig) -> Result<Vec<ResourceDescriptor>> {
    let resolver = DependencyResolver::new(config);
    let rds = match record {
        Record::Task(tr) => resolver.resolve_task(tr)?,
        Record::Pipeline(pr) => resolver.resolve_pipeline(pr)?,
    };
    Ok(rds)
}

/// Run the `resolve` subcommand, returning the JSON to print
///
/// # Errors
/// Returns error on invalid input or failed resolution
pub fn run_resolve(matches: &ArgMatches) -> Result<String> {
    let config = effective_config(matches)?;
    let kind = matches.get_one::<String>("kind").map(|k| match k.as_str() {
        "pipeline" => RecordKind::Pipeline,
        _ => RecordKind::Task,
    });
    let path = matches
        .get_one::<PathBuf>("record")
        .context("--record is required")?;

    let record = load_record(path, kind)?;
    let rds = resolve(&record, config)?;
    let json = if matches.get_flag("pretty") {
        serde_json::to_string_pretty(&rds)?
    } else {
        serde_json::to_string(&rds)?
    };
    Ok(json)
}
