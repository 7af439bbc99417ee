use pretty_assertions::assert_eq;
use rdeps_core::{
    resolve_pipeline, AttestationConfig, BuildType, DependencyResolver, MinimalTaskDescriptor,
    ResolveError, VerboseTaskDescriptor,
};
use rdeps_run::{Collaborator, InspectionOptions, PipelineRun, TaskRun};
use rdeps_test_utils::{
    completed_task_run, material, pipeline_run, ref_source, running_task_run, ScriptedExtractor,
};

fn names_and_uris(rds: &[rdeps_descriptor::ResourceDescriptor]) -> Vec<(&str, &str)> {
    rds.iter().map(|r| (r.name.as_str(), r.uri.as_str())).collect()
}

fn three_children() -> PipelineRun {
    let mut pr = pipeline_run("pr", &["a", "b", "c"], &[]);
    let mut a = completed_task_run("pr-a");
    a.ref_source = Some(ref_source("git+https://catalog.git@a", "sha1", "aaa"));
    let mut c = running_task_run("pr-c");
    c.ref_source = Some(ref_source("git+https://catalog.git@c", "sha1", "ccc"));
    pr.task_runs.insert("a".into(), a);
    pr.task_runs.insert("c".into(), c);
    pr
}

#[test]
fn only_completed_children_contribute() {
    let pr = three_children();
    let extractor = ScriptedExtractor::new()
        .step_images("pr-a", vec![material("oci://a", "sha256", "1")])
        .step_images("pr-c", vec![material("oci://c", "sha256", "3")]);

    let rds = resolve_pipeline(&pr, &MinimalTaskDescriptor, &extractor, InspectionOptions::default()).unwrap();
    assert_eq!(
        names_and_uris(&rds),
        vec![("pipelineTask", "git+https://catalog.git@a"), ("", "oci://a")]
    );
}

#[test]
fn minimal_strategy_absence_keeps_images() {
    let mut pr = pipeline_run("pr", &["inline"], &[]);
    pr.task_runs.insert("inline".into(), completed_task_run("pr-inline"));
    let extractor = ScriptedExtractor::new()
        .step_images("pr-inline", vec![material("oci://step", "sha256", "1")])
        .sidecar_images("pr-inline", vec![material("oci://sidecar", "sha256", "2")]);

    let rds = resolve_pipeline(&pr, &MinimalTaskDescriptor, &extractor, InspectionOptions::default()).unwrap();
    assert_eq!(names_and_uris(&rds), vec![("", "oci://step"), ("", "oci://sidecar")]);
}

#[test]
fn shared_base_image_appears_once() {
    let mut pr = pipeline_run("pr", &["build", "test"], &[]);
    pr.ref_source = Some(ref_source("git+https://pipelines.git@main", "sha1", "ppp"));
    pr.task_runs.insert("build".into(), completed_task_run("pr-build"));
    pr.task_runs.insert("test".into(), completed_task_run("pr-test"));
    let extractor = ScriptedExtractor::new()
        .step_images(
            "pr-build",
            vec![material("docker://builder", "sha256", "b"), material("docker://base", "sha256", "zzz")],
        )
        .step_images(
            "pr-test",
            vec![material("docker://tester", "sha256", "t"), material("docker://base", "sha256", "zzz")],
        );

    let rds = resolve_pipeline(&pr, &MinimalTaskDescriptor, &extractor, InspectionOptions::default()).unwrap();
    assert_eq!(rds.iter().filter(|r| r.uri == "docker://base").count(), 1);
    assert_eq!(
        names_and_uris(&rds),
        vec![
            ("pipeline", "git+https://pipelines.git@main"),
            ("", "docker://builder"),
            ("", "docker://base"),
            ("", "docker://tester"),
        ]
    );
}

#[test]
fn finally_tasks_follow_regular_tasks() {
    let mut pr = pipeline_run("pr", &["build"], &["notify"]);
    pr.task_runs.insert("notify".into(), completed_task_run("pr-notify"));
    pr.task_runs.insert("build".into(), completed_task_run("pr-build"));
    let extractor = ScriptedExtractor::new()
        .step_images("pr-notify", vec![material("oci://notify", "sha256", "n")])
        .step_images("pr-build", vec![material("oci://build", "sha256", "b")]);

    let rds = resolve_pipeline(&pr, &MinimalTaskDescriptor, &extractor, InspectionOptions::default()).unwrap();
    assert_eq!(names_and_uris(&rds), vec![("", "oci://build"), ("", "oci://notify")]);
}

#[test]
fn pipeline_results_are_appended_last() {
    let mut pr = pipeline_run("pr", &["build"], &[]);
    pr.task_runs.insert("build".into(), completed_task_run("pr-build"));
    let extractor = ScriptedExtractor::new()
        .step_images("pr-build", vec![material("oci://build", "sha256", "b")])
        .pipeline_param_results(vec![
            material("oci://build", "sha256", "b"),
            material("git+https://src.git", "sha1", "s"),
        ]);

    let rds = resolve_pipeline(&pr, &MinimalTaskDescriptor, &extractor, InspectionOptions::default()).unwrap();
    assert_eq!(
        names_and_uris(&rds),
        vec![("", "oci://build"), ("inputs/result", "git+https://src.git")]
    );
}

#[test]
fn verbose_strategy_embeds_each_child() {
    let mut pr = pipeline_run("pr", &["a", "b"], &[]);
    pr.task_runs.insert("a".into(), completed_task_run("pr-a"));
    pr.task_runs.insert("b".into(), completed_task_run("pr-b"));

    let rds = resolve_pipeline(&pr, &VerboseTaskDescriptor, &ScriptedExtractor::new(), InspectionOptions::default())
        .unwrap();
    assert_eq!(rds.len(), 2);
    let embedded: Vec<TaskRun> = rds
        .iter()
        .map(|rd| serde_json::from_slice(&rd.content).unwrap())
        .collect();
    assert_eq!(embedded[0].name, "pr-a");
    assert_eq!(embedded[1].name, "pr-b");
    assert!(rds.iter().all(|rd| rd.name == "pipelineTask"));
}

#[test]
fn child_extraction_failure_aborts() {
    let mut pr = pipeline_run("pr", &["build"], &[]);
    pr.task_runs.insert("build".into(), completed_task_run("pr-build"));
    let extractor = ScriptedExtractor::new().fail("pr-build", Collaborator::SidecarImages, "boom");

    let err = resolve_pipeline(&pr, &MinimalTaskDescriptor, &extractor, InspectionOptions::default()).unwrap_err();
    assert!(matches!(err, ResolveError::Extraction(_)));
    assert_eq!(err.unit(), Some("pr-build"));
}

#[test]
fn failure_in_skipped_child_is_ignored() {
    let mut pr = pipeline_run("pr", &["build"], &[]);
    pr.task_runs.insert("build".into(), running_task_run("pr-build"));
    let extractor = ScriptedExtractor::new().fail("pr-build", Collaborator::StepImages, "boom");

    let rds = resolve_pipeline(&pr, &MinimalTaskDescriptor, &extractor, InspectionOptions::default()).unwrap();
    assert!(rds.is_empty());
}

#[test]
fn empty_pipeline_yields_empty_list() {
    let rds = resolve_pipeline(
        &PipelineRun::new("pr"),
        &VerboseTaskDescriptor,
        &ScriptedExtractor::new(),
        InspectionOptions::default(),
    )
    .unwrap();
    assert!(rds.is_empty());
}

#[test]
fn resolver_uses_configured_build_type() {
    let mut pr = pipeline_run("pr", &["inline"], &[]);
    pr.task_runs.insert("inline".into(), completed_task_run("pr-inline"));

    let minimal = DependencyResolver::with_extractor(AttestationConfig::new(), ScriptedExtractor::new());
    assert!(minimal.resolve_pipeline(&pr).unwrap().is_empty());

    let verbose = DependencyResolver::with_extractor(
        AttestationConfig::new().with_build_type(BuildType::SlsaTekton),
        ScriptedExtractor::new(),
    );
    let rds = verbose.resolve_pipeline(&pr).unwrap();
    assert_eq!(rds.len(), 1);
    assert_eq!(rds[0].name, "pipelineTask");

    let explicit = minimal.resolve_pipeline_with(&pr, &VerboseTaskDescriptor).unwrap();
    assert_eq!(explicit, rds);
}
