// config.rs - Scan configuration
// Purpose: Tool definitions, per-tool timeout and thread count, loadable from
//          JSON so tools can be swapped or added without code changes

use crate::tool::{ExternalTool, OutputSource};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_THREADS: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    /// Substituted into every `{threads}` placeholder
    pub threads: usize,
    /// Wall-clock limit per tool invocation (0 = no limit)
    pub timeout_secs: u64,
    pub enumerators: Vec<ExternalTool>,
    pub prober: ExternalTool,
    pub harvesters: Vec<ExternalTool>,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            enumerators: vec![
                ExternalTool::new(
                    "subfinder",
                    "subfinder",
                    &["-d", "{domain}", "-silent", "-t", "{threads}", "-o", "{output}"],
                    OutputSource::File,
                ),
                ExternalTool::new(
                    "subdominator",
                    "subdominator",
                    &["-d", "{domain}", "-o", "{output}"],
                    OutputSource::File,
                ),
            ],
            prober: ExternalTool::new(
                "httpx",
                "httpx",
                &["-l", "{input}", "-silent", "-threads", "{threads}", "-o", "{output}"],
                OutputSource::File,
            ),
            harvesters: vec![
                ExternalTool::new(
                    "gau",
                    "gau",
                    &[
                        "{domain}",
                        "--subs",
                        "--threads",
                        "{threads}",
                        "--blacklist",
                        "ttf,woff,svg,png,jpg,jpeg,gif,css,js,mp3,mp4",
                    ],
                    OutputSource::Stdout,
                ),
                ExternalTool::new("wayback", "waybackurls", &["{domain}"], OutputSource::Stdout),
            ],
        }
    }
}

impl ReconConfig {
    /// Load a JSON config. Missing fields fall back to the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .context(format!("Invalid config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Every tool name must be usable as a file-name component and unique
    /// within its stage, since it keys the per-tool output files.
    pub fn validate(&self) -> Result<()> {
        for (stage, tools) in [("enumerators", &self.enumerators), ("harvesters", &self.harvesters)] {
            let mut seen = std::collections::HashSet::new();
            for tool in tools.iter() {
                check_tool_name(&tool.name)?;
                if !seen.insert(tool.name.as_str()) {
                    anyhow::bail!("Duplicate tool name '{}' in {}", tool.name, stage);
                }
            }
        }
        check_tool_name(&self.prober.name)?;
        if self.threads == 0 {
            anyhow::bail!("threads must be at least 1");
        }
        Ok(())
    }

    /// Every tool this configuration may invoke, in pipeline order.
    pub fn all_tools(&self) -> Vec<&ExternalTool> {
        self.enumerators
            .iter()
            .chain(std::iter::once(&self.prober))
            .chain(self.harvesters.iter())
            .collect()
    }
}

fn check_tool_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(&['/', '\\'][..]) || name == "combined" {
        anyhow::bail!("Invalid tool name '{}'", name);
    }
    Ok(())
}
