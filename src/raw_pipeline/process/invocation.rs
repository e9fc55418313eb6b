use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// A single external tool call and the file it is expected to write.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub tool: &'static str,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// When set, the child's stdout is written to this file
    pub stdout_path: Option<PathBuf>,
    pub artifact: PathBuf,
}

impl Invocation {
    pub fn new(tool: &'static str, program: impl Into<PathBuf>, artifact: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            program: program.into(),
            args: Vec::new(),
            stdout_path: None,
            artifact: artifact.into(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout_path = Some(path.into());
        self
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    /// Shell-like rendering for logs.
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            line.push(' ');
            if arg.contains(char::is_whitespace) {
                line.push('"');
                line.push_str(&arg);
                line.push('"');
            } else {
                line.push_str(&arg);
            }
        }
        if let Some(path) = &self.stdout_path {
            line.push_str(" > ");
            line.push_str(&path.display().to_string());
        }
        line
    }
}
