use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),
    #[error("{program} failed with exit code {code:?}: {stderr}")]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Output from an external command
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// A resolved external binary (tesseract, pdftoppm).
#[derive(Debug, Clone)]
pub struct ExternalTool {
    name: String,
    path: PathBuf,
}

impl ExternalTool {
    /// Uses `explicit` when given, otherwise searches `PATH`.
    pub fn locate(name: &str, explicit: Option<&Path>) -> ToolResult<Self> {
        let path = match explicit {
            Some(p) if p.is_file() => p.to_path_buf(),
            Some(p) => return Err(ToolError::CommandNotFound(p.display().to_string())),
            None => which::which(name).map_err(|_| ToolError::CommandNotFound(name.to_string()))?,
        };

        Ok(Self {
            name: name.to_string(),
            path,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs the tool to completion; a non-zero exit is an error.
    pub async fn run<I, A>(&self, args: I) -> ToolResult<CommandOutput>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<OsStr>,
    {
        let output = Command::new(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        let result = CommandOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !result.status.success() {
            return Err(ToolError::CommandFailed {
                program: self.name.clone(),
                code: result.status.code(),
                stderr: result.stderr.trim().to_string(),
            });
        }

        Ok(result)
    }
}
