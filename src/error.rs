use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single external tool invocation.
///
/// Every variant is recoverable at stage level: the caller reports it and
/// continues with an empty contribution from that tool.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{tool} timed out after {seconds}s")]
    TimedOut { tool: String, seconds: u64 },
    #[error("{tool} exited with status {code:?}: {stderr}")]
    NonZeroExit {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("{tool} could not be started: {source}")]
    SpawnFailed {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} produced no output file at {}", .path.display())]
    MissingOutputFile { tool: String, path: PathBuf },
}

impl ToolError {
    pub fn tool(&self) -> &str {
        match self {
            ToolError::TimedOut { tool, .. }
            | ToolError::NonZeroExit { tool, .. }
            | ToolError::SpawnFailed { tool, .. }
            | ToolError::MissingOutputFile { tool, .. } => tool,
        }
    }

    /// Short tag used in progress events.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::TimedOut { .. } => "timeout",
            ToolError::NonZeroExit { .. } => "non_zero_exit",
            ToolError::SpawnFailed { .. } => "spawn_failed",
            ToolError::MissingOutputFile { .. } => "missing_output_file",
        }
    }
}
