//! Running external programs.

use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

/// An error running an external program.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The program could not be started, usually because it does not exist.
    #[error("failed to run {}", .program.display())]
    Spawn {
        /// The program that was run.
        program: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// The program exited unsuccessfully.
    #[error("{} exited with {status}: {}", .program.display(), .stderr.trim())]
    Failed {
        /// The program that was run.
        program: PathBuf,
        /// The exit status of the program.
        status: ExitStatus,
        /// Everything the program wrote to stderr.
        stderr: String,
    },
}

/// The captured output of a successful program run.
#[derive(Clone, Debug, Default)]
pub struct ToolOutput {
    /// Everything written to stdout, lossily decoded.
    pub stdout: String,
    /// Everything written to stderr, lossily decoded.
    pub stderr: String,
}

/// Runs `command` to completion and captures its output.
///
/// The program gets no stdin. A non-zero exit status is an error.
pub fn run_tool(command: &mut Command) -> Result<ToolOutput, ToolError> {
    let program = PathBuf::from(command.get_program());
    tracing::debug!(?command, "running external tool");

    let output = command
        .stdin(Stdio::null())
        .output()
        .map_err(|source| ToolError::Spawn {
            program: program.clone(),
            source,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(ToolError::Failed {
            program,
            status: output.status,
            stderr,
        });
    }

    Ok(ToolOutput { stdout, stderr })
}
