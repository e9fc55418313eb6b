use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::raw_pipeline::common::error::ConversionError;
use crate::raw_pipeline::config::{EngineKind, RunConfiguration, RunConfigurationBuilder};
use crate::raw_pipeline::converter::Converter;
use crate::raw_pipeline::testing::{FakeRunner, fake_tools, files_under, touch};

struct Workspace {
    _dir: TempDir,
    base: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().canonicalize().unwrap();
        Self { _dir: dir, base }
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.base.join(relative)
    }

    fn builder(&self, engine: EngineKind) -> RunConfigurationBuilder {
        let tools_dir = self.path("bin");
        std::fs::create_dir_all(&tools_dir).unwrap();
        let profile = self.path("profiles/linear.pp3");
        if !profile.exists() {
            touch(&profile);
            std::fs::write(&profile, "[RAW]\nCA=false\n").unwrap();
        }
        RunConfiguration::builder()
            .engine(engine)
            .tools(fake_tools(&tools_dir))
            .profile(profile)
            .cache_dir(self.path("cache"))
            .output_dir(self.path("out"))
    }
}

#[test]
fn test_directory_tree_is_mirrored_under_output() {
    let ws = Workspace::new();
    touch(&ws.path("a/x/img.cr2"));
    touch(&ws.path("a/x/y/other.NEF"));
    touch(&ws.path("a/skip.jpg"));
    let config = ws.builder(EngineKind::Dcraw).build().unwrap();
    let runner = Arc::new(FakeRunner::new());

    let summary = Converter::with_runner(config, runner.clone())
        .run(&[ws.path("a")])
        .unwrap();

    assert_eq!(summary.converted, 2);
    assert_eq!(summary.batches, 1);
    assert!(ws.path("out/x/img.exr").is_file());
    assert!(ws.path("out/x/y/other.exr").is_file());
    assert_eq!(files_under(&ws.path("out")).len(), 2);
    assert!(files_under(&ws.path("cache")).is_empty());
}

#[test]
fn test_second_run_without_overwrite_skips_everything() {
    let ws = Workspace::new();
    touch(&ws.path("shoot/a.arw"));
    touch(&ws.path("shoot/b.arw"));
    touch(&ws.path("loose.dng"));
    let inputs = [ws.path("shoot"), ws.path("loose.dng")];
    let runner = Arc::new(FakeRunner::new());

    let first = Converter::with_runner(ws.builder(EngineKind::Dcraw).build().unwrap(), runner.clone())
        .run(&inputs)
        .unwrap();
    assert_eq!(first.converted, 3);
    assert_eq!(first.batches, 2);
    let calls_after_first = runner.calls().len();

    let second = Converter::with_runner(ws.builder(EngineKind::Dcraw).build().unwrap(), runner.clone())
        .run(&inputs)
        .unwrap();
    assert_eq!(second.skipped, 3);
    assert_eq!(second.converted, 0);
    assert_eq!(runner.calls().len(), calls_after_first);
}

#[test]
fn test_job_failures_do_not_fail_the_run() {
    let ws = Workspace::new();
    touch(&ws.path("in/good.cr3"));
    touch(&ws.path("in/bad.cr3"));
    let runner = Arc::new(FakeRunner::new());
    runner.fail_source("bad.cr3");

    let summary = Converter::with_runner(ws.builder(EngineKind::RawTherapee).build().unwrap(), runner)
        .run(&[ws.path("in")])
        .unwrap();

    assert_eq!(summary.converted, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total(), 2);
    assert_eq!(summary.failures[0].0, ws.path("in/bad.cr3"));
    assert!(files_under(&ws.path("cache")).is_empty());
}

#[test]
fn test_ca_profile_is_derived_once_and_removed() {
    let ws = Workspace::new();
    touch(&ws.path("in/a.orf"));
    touch(&ws.path("in/b.orf"));
    let runner = Arc::new(FakeRunner::new());
    let config = ws
        .builder(EngineKind::RawTherapee)
        .ca_correction(true)
        .build()
        .unwrap();

    Converter::with_runner(config, runner.clone())
        .run(&[ws.path("in")])
        .unwrap();

    let derived = ws.path("cache/linear.ca.pp3");
    let profiles: Vec<PathBuf> = runner
        .calls()
        .iter()
        .filter(|c| c.tool == "rawtherapee-cli")
        .map(|c| {
            let i = c.args.iter().position(|a| a == "-p").unwrap();
            PathBuf::from(&c.args[i + 1])
        })
        .collect();
    assert_eq!(profiles, [derived.clone(), derived.clone()]);
    assert!(!derived.exists());
    assert_eq!(
        std::fs::read_to_string(ws.path("profiles/linear.pp3")).unwrap(),
        "[RAW]\nCA=false\n"
    );
}

#[test]
fn test_missing_tool_aborts_before_any_job() {
    let ws = Workspace::new();
    touch(&ws.path("in/a.cr2"));
    let config = ws.builder(EngineKind::Dcraw).build().unwrap();
    let config = RunConfiguration {
        tools: crate::raw_pipeline::config::ToolPaths {
            dcraw: ws.path("bin/not-here/dcraw"),
            ..config.tools.clone()
        },
        ..config
    };
    let runner = Arc::new(FakeRunner::new());

    let err = Converter::with_runner(config, runner.clone())
        .run(&[ws.path("in")])
        .unwrap_err();

    assert!(matches!(err, ConversionError::ToolNotFound { tool: "dcraw", .. }));
    assert!(err.is_configuration());
    assert!(runner.calls().is_empty());
}

#[test]
fn test_no_inputs_is_a_configuration_error() {
    let ws = Workspace::new();
    touch(&ws.path("in/a.png"));
    let runner = Arc::new(FakeRunner::new());

    let err = Converter::with_runner(ws.builder(EngineKind::Dcraw).build().unwrap(), runner)
        .run(&[ws.path("in/a.png"), Path::new("/definitely/not/here.cr2").to_path_buf()])
        .unwrap_err();

    assert!(matches!(err, ConversionError::NoInputs));
}
