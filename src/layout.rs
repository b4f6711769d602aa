// layout.rs - Output directory tree
// Purpose: Single place that knows where each stage persists its files

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_DIR: &str = "ghost_recon_results";

/// Paths under one scan's output directory:
///
/// ```text
/// <root>/
/// ├── subdomains/<tool>.txt
/// ├── subdomains/combined.txt
/// ├── subdomains/live_urls.txt
/// ├── urls/<tool>_<base_domain>.txt
/// ├── urls/combined.txt
/// ├── scans/
/// └── final_results.json
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn subdomains_dir(&self) -> PathBuf {
        self.root.join("subdomains")
    }

    pub fn urls_dir(&self) -> PathBuf {
        self.root.join("urls")
    }

    pub fn scans_dir(&self) -> PathBuf {
        self.root.join("scans")
    }

    pub fn subdomain_tool_file(&self, tool: &str) -> PathBuf {
        self.subdomains_dir().join(format!("{}.txt", tool))
    }

    pub fn combined_subdomains(&self) -> PathBuf {
        self.subdomains_dir().join("combined.txt")
    }

    pub fn live_hosts(&self) -> PathBuf {
        self.subdomains_dir().join("live_urls.txt")
    }

    pub fn url_tool_file(&self, tool: &str, base_domain: &str) -> PathBuf {
        self.urls_dir().join(format!("{}_{}.txt", tool, base_domain))
    }

    pub fn combined_urls(&self) -> PathBuf {
        self.urls_dir().join("combined.txt")
    }

    pub fn final_results(&self) -> PathBuf {
        self.root.join("final_results.json")
    }

    /// Create the whole tree. Safe to call repeatedly and concurrently.
    pub fn create(&self) -> Result<()> {
        for dir in [self.root.clone(), self.subdomains_dir(), self.urls_dir(), self.scans_dir()] {
            fs::create_dir_all(&dir)
                .context(format!("Failed to create output directory: {}", dir.display()))?;
        }
        Ok(())
    }
}
