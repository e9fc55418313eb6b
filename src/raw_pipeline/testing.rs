//! Test doubles for driving the pipeline without the external tools

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::raw_pipeline::common::error::Result;
use crate::raw_pipeline::config::ToolPaths;
use crate::raw_pipeline::process::{CommandOutput, Invocation, ProcessRunner};

/// How the fake answers for one tool.
#[derive(Debug, Clone)]
pub(crate) enum FakeBehavior {
    /// Clean exit, artifact written
    Produce,
    /// Clean exit, nothing written
    Silent,
    /// Clean exit with an error line on stderr, nothing written
    ReportError(String),
    /// Non-zero exit after writing a partial artifact
    CrashAfterWriting,
}

/// Records every invocation and simulates tool behavior per tool name.
pub(crate) struct FakeRunner {
    delay: Duration,
    behaviors: Mutex<HashMap<&'static str, FakeBehavior>>,
    // Sources whose invocations should fail regardless of tool
    failing_sources: Mutex<Vec<String>>,
    calls: Mutex<Vec<Invocation>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeRunner {
    pub(crate) fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub(crate) fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            behaviors: Mutex::new(HashMap::new()),
            failing_sources: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_behavior(&self, tool: &'static str, behavior: FakeBehavior) {
        self.behaviors.lock().unwrap().insert(tool, behavior);
    }

    /// Any invocation mentioning `needle` in its arguments reports an error.
    pub(crate) fn fail_source(&self, needle: &str) {
        self.failing_sources.lock().unwrap().push(needle.to_string());
    }

    pub(crate) fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_for(&self, tool: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.tool == tool).count()
    }

    pub(crate) fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn behavior_for(&self, invocation: &Invocation) -> FakeBehavior {
        let failing = self.failing_sources.lock().unwrap();
        let mentions_failing = invocation.args.iter().any(|arg| {
            let arg = arg.to_string_lossy();
            failing.iter().any(|needle| arg.contains(needle.as_str()))
        });
        if mentions_failing {
            return FakeBehavior::ReportError("simulated failure".to_string());
        }
        self.behaviors
            .lock()
            .unwrap()
            .get(invocation.tool)
            .cloned()
            .unwrap_or(FakeBehavior::Produce)
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(invocation.clone());

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        let write_artifact = || -> Result<()> {
            if let Some(parent) = invocation.artifact().parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(invocation.artifact(), b"fake image data")?;
            Ok(())
        };

        let output = match self.behavior_for(invocation) {
            FakeBehavior::Produce => {
                write_artifact()?;
                CommandOutput {
                    success: true,
                    code: Some(0),
                    ..Default::default()
                }
            }
            FakeBehavior::Silent => CommandOutput {
                success: true,
                code: Some(0),
                ..Default::default()
            },
            FakeBehavior::ReportError(message) => CommandOutput {
                success: true,
                code: Some(0),
                stderr: format!("Error: {message}\n"),
                ..Default::default()
            },
            FakeBehavior::CrashAfterWriting => {
                write_artifact()?;
                CommandOutput {
                    success: false,
                    code: Some(139),
                    stderr: "segmentation fault\n".to_string(),
                    ..Default::default()
                }
            }
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(output)
    }
}

/// Creates empty stand-ins for every tool binary under `dir`.
pub(crate) fn fake_tools(dir: &Path) -> ToolPaths {
    let touch = |name: &str| -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"").unwrap();
        path
    };
    ToolPaths {
        dcraw: touch("dcraw"),
        rawtherapee: touch("rawtherapee-cli"),
        darktable: touch("darktable-cli"),
        oiiotool: touch("oiiotool"),
    }
}

/// Writes an empty file, creating parent directories.
pub(crate) fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"").unwrap();
}

/// Every file left anywhere under `dir`.
pub(crate) fn files_under(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}
