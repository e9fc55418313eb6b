use std::fs::File;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::raw_pipeline::common::error::{ConversionError, Result};
use crate::raw_pipeline::process::invocation::Invocation;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What a finished tool run left behind.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// The error the tool reported, if any: a failing exit status, or a line
    /// mentioning "error" on stderr even when the exit status was clean.
    pub fn reported_error(&self) -> Option<String> {
        let error_line = self
            .stderr
            .lines()
            .map(str::trim)
            .find(|line| line.to_ascii_lowercase().contains("error"));

        match (self.success, error_line) {
            (_, Some(line)) => Some(line.to_string()),
            (false, None) => {
                let detail = self.stderr.trim();
                Some(match (self.code, detail.is_empty()) {
                    (Some(code), true) => format!("exit status {code}"),
                    (None, true) => "terminated by signal".to_string(),
                    (_, false) => detail.to_string(),
                })
            }
            (true, None) => None,
        }
    }
}

/// Runs one external invocation to completion.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

/// Runs tools as real child processes, blocking the calling worker.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Kills any invocation still running after `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    fn wait(&self, child: &mut Child, tool: &'static str) -> Result<ExitStatus> {
        let Some(timeout) = self.timeout else {
            return Ok(child.wait()?);
        };

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                warn!(tool, "Killing process after {:?}", timeout);
                let _ = child.kill();
                let _ = child.wait();
                return Err(ConversionError::Timeout {
                    tool,
                    after: timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        debug!(tool = invocation.tool, "Running: {}", invocation.command_line());

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stderr(Stdio::piped());

        match &invocation.stdout_path {
            Some(path) => {
                command.stdout(Stdio::from(File::create(path)?));
            }
            None => {
                command.stdout(Stdio::piped());
            }
        }

        let mut child = command.spawn().map_err(|source| ConversionError::Spawn {
            tool: invocation.tool,
            source,
        })?;

        // Drain both pipes off-thread so a chatty tool cannot block on a full pipe.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_reader = thread::spawn(move || read_pipe(stdout));
        let stderr_reader = thread::spawn(move || read_pipe(stderr));

        let status = self.wait(&mut child, invocation.tool)?;

        let output = CommandOutput {
            success: status.success(),
            code: status.code(),
            stdout: stdout_reader.join().unwrap_or_default(),
            stderr: stderr_reader.join().unwrap_or_default(),
        };

        trace!(tool = invocation.tool, stdout = %output.stdout, stderr = %output.stderr, "Process finished");
        Ok(output)
    }
}

fn read_pipe<R: Read>(pipe: Option<R>) -> String {
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buffer);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
