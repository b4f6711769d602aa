// tool.rs - External tool capability and runner
// Purpose: Describe an external binary as configuration (name, argv template,
//          where its results land) and execute it under a wall-clock timeout

use crate::error::ToolError;
use crate::tools_check::discover_tool_path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Where a tool leaves its line-oriented results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputSource {
    /// Results are read from captured stdout.
    #[default]
    Stdout,
    /// The tool writes `{output}` itself; stdout is ignored.
    File,
}

/// One external binary, described as data.
///
/// `program` and every entry of `args` may contain the placeholders
/// `{domain}`, `{output}`, `{input}` and `{threads}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalTool {
    pub name: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub output: OutputSource,
}

/// Values substituted into a tool's argv template.
#[derive(Debug, Clone, Default)]
pub struct Placeholders {
    pub domain: String,
    pub output: PathBuf,
    pub input: Option<PathBuf>,
    pub threads: usize,
}

impl Placeholders {
    fn apply(&self, template: &str) -> String {
        let input = self
            .input
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        template
            .replace("{domain}", &self.domain)
            .replace("{output}", &self.output.display().to_string())
            .replace("{input}", &input)
            .replace("{threads}", &self.threads.to_string())
    }
}

/// A fully rendered invocation, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub tool: String,
    pub program: String,
    pub args: Vec<String>,
}

impl std::fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

impl ExternalTool {
    pub fn new(name: &str, program: &str, args: &[&str], output: OutputSource) -> Self {
        Self {
            name: name.to_string(),
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            output,
        }
    }

    pub fn render(&self, values: &Placeholders) -> ToolCommand {
        ToolCommand {
            tool: self.name.clone(),
            program: values.apply(&self.program),
            args: self.args.iter().map(|a| values.apply(a)).collect(),
        }
    }

    /// Run the tool and collect its result lines, in order, from stdout or
    /// from the `{output}` file depending on [`OutputSource`].
    pub async fn execute(&self, values: &Placeholders, timeout_secs: u64) -> Result<Vec<String>, ToolError> {
        let command = self.render(values);

        // A leftover file from an earlier run must never read back as output.
        if self.output == OutputSource::File {
            match fs::remove_file(&values.output) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => debug!(tool = %self.name, error = %e, "could not clear previous output"),
            }
        }

        let stdout_lines = run(&command, timeout_secs).await?;

        match self.output {
            OutputSource::Stdout => Ok(stdout_lines),
            OutputSource::File => {
                if !values.output.exists() {
                    return Err(ToolError::MissingOutputFile {
                        tool: self.name.clone(),
                        path: values.output.clone(),
                    });
                }
                let content = fs::read_to_string(&values.output).unwrap_or_default();
                Ok(content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect())
            }
        }
    }
}

/// Spawn `command`, wait at most `timeout_secs` (0 = no limit) and return
/// its stdout split into lines.
///
/// The child is killed when the wait is abandoned, either by the timeout or
/// because the calling task was cancelled.
pub async fn run(command: &ToolCommand, timeout_secs: u64) -> Result<Vec<String>, ToolError> {
    debug!(tool = %command.tool, command = %command, "spawning external tool");

    let program = resolve_program(&command.program);
    let child = Command::new(&program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ToolError::SpawnFailed {
            tool: command.tool.clone(),
            source,
        })?;

    let waited = if timeout_secs == 0 {
        child.wait_with_output().await
    } else {
        match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
            Ok(waited) => waited,
            Err(_) => {
                return Err(ToolError::TimedOut {
                    tool: command.tool.clone(),
                    seconds: timeout_secs,
                });
            }
        }
    };

    let output = waited.map_err(|source| ToolError::SpawnFailed {
        tool: command.tool.clone(),
        source,
    })?;

    if !output.status.success() {
        return Err(ToolError::NonZeroExit {
            tool: command.tool.clone(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    debug!(tool = %command.tool, bytes = output.stdout.len(), "external tool finished");

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect())
}

/// Path that `--check-tools` would report for `program`, so binaries living
/// off PATH (e.g. `~/go/bin`) are spawned the same way they are discovered.
fn resolve_program(program: &str) -> PathBuf {
    discover_tool_path(program).unwrap_or_else(|| PathBuf::from(program))
}

/// Trimmed, non-empty lines of a result file. A missing file reads as empty.
pub fn read_lines(path: &Path) -> BTreeSet<String> {
    match fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => BTreeSet::new(),
    }
}

/// Write one entry per line, creating the parent directory if needed.
pub fn write_lines<I, S>(path: &Path, lines: I) -> io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut content = String::new();
    for line in lines {
        content.push_str(line.as_ref());
        content.push('\n');
    }
    fs::write(path, content)
}
