// tools_check.rs - External tool discovery
// Purpose: Tell the user which configured binaries are reachable before a scan

use crate::config::ReconConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub name: String,
    pub program: String,
    pub path: Option<PathBuf>,
}

impl ToolStatus {
    pub fn installed(&self) -> bool {
        self.path.is_some()
    }

    /// Install command for the default toolset, if known.
    pub fn install_hint(&self) -> Option<&'static str> {
        match self.program.as_str() {
            "subfinder" => Some("go install -v github.com/projectdiscovery/subfinder/v2/cmd/subfinder@latest"),
            "subdominator" => Some("pipx install subdominator"),
            "httpx" => Some("go install -v github.com/projectdiscovery/httpx/cmd/httpx@latest"),
            "gau" => Some("go install github.com/lc/gau/v2/cmd/gau@latest"),
            "waybackurls" => Some("go install github.com/tomnomnom/waybackurls@latest"),
            _ => None,
        }
    }
}

/// Directories where Go/pipx/cargo installs usually land but which are
/// often missing from PATH.
fn common_tool_paths() -> Vec<PathBuf> {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/root".to_string());
    let gopath = std::env::var("GOPATH").unwrap_or_else(|_| format!("{}/go", home));

    vec![
        PathBuf::from(format!("{}/bin", gopath)),
        PathBuf::from(format!("{}/go/bin", home)),
        PathBuf::from(format!("{}/.local/bin", home)),
        PathBuf::from(format!("{}/.cargo/bin", home)),
        PathBuf::from("/usr/local/bin"),
        PathBuf::from("/usr/bin"),
        PathBuf::from("/bin"),
        PathBuf::from("/snap/bin"),
    ]
}

fn is_executable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        return std::fs::metadata(path)
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false);
    }
    #[cfg(not(unix))]
    {
        return true;
    }
}

/// Resolve a binary via `which`, then the common install directories.
/// Explicit paths are checked as-is.
pub fn discover_tool_path(binary: &str) -> Option<PathBuf> {
    discover_in(binary, &common_tool_paths())
}

pub(crate) fn discover_in(binary: &str, fallback_dirs: &[PathBuf]) -> Option<PathBuf> {
    if binary.contains('/') {
        let path = PathBuf::from(binary);
        return is_executable(&path).then_some(path);
    }

    if let Ok(output) = std::process::Command::new("which").arg(binary).output() {
        if output.status.success() {
            let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !found.is_empty() {
                return Some(PathBuf::from(found));
            }
        }
    }

    fallback_dirs
        .iter()
        .map(|dir| dir.join(binary))
        .find(|candidate| is_executable(candidate))
}

/// Status of every tool the configuration would invoke.
pub fn check_tools(config: &ReconConfig) -> Vec<ToolStatus> {
    config
        .all_tools()
        .into_iter()
        .map(|tool| ToolStatus {
            name: tool.name.clone(),
            program: tool.program.clone(),
            path: discover_tool_path(&tool.program),
        })
        .collect()
}
