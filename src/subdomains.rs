// subdomains.rs - Subdomain enumeration stage
// Purpose: Run every configured enumerator against the target in parallel,
//          persist each tool's hosts and their deduplicated union

use crate::config::ReconConfig;
use crate::domain::normalize_host;
use crate::layout::OutputLayout;
use crate::reporter::Reporter;
use crate::tool::{read_lines, write_lines, ExternalTool, Placeholders};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, warn};

/// Unique hostnames found for one target.
pub type SubdomainSet = BTreeSet<String>;

#[derive(Clone)]
pub struct SubdomainEnumerator {
    domain: String,
    layout: OutputLayout,
    tools: Vec<ExternalTool>,
    threads: usize,
    timeout_secs: u64,
    reporter: Arc<dyn Reporter>,
}

impl SubdomainEnumerator {
    pub fn new(domain: &str, layout: OutputLayout, config: &ReconConfig, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            domain: domain.to_string(),
            layout,
            tools: config.enumerators.clone(),
            threads: config.threads,
            timeout_secs: config.timeout_secs,
            reporter,
        }
    }

    /// Run one enumerator. Failures are reported and yield an empty set.
    pub async fn run_tool(&self, tool: &ExternalTool) -> SubdomainSet {
        let output = self.layout.subdomain_tool_file(&tool.name);
        self.reporter.tool_started(&tool.name, &self.domain);

        let values = Placeholders {
            domain: self.domain.clone(),
            output: output.clone(),
            input: None,
            threads: self.threads,
        };

        let result = tool.execute(&values, self.timeout_secs).await;
        let hosts: SubdomainSet = match &result {
            Ok(lines) => lines
                .iter()
                .map(|line| normalize_host(line.trim()))
                .filter(|host| !host.is_empty())
                .collect(),
            Err(_) => SubdomainSet::new(),
        };

        // The per-tool file always mirrors what this run contributed.
        if let Err(e) = write_lines(&output, &hosts) {
            self.reporter
                .warning(&format!("Could not write {}: {}", output.display(), e));
        }

        match result {
            Ok(_) => self.reporter.tool_completed(&tool.name, hosts.len()),
            Err(e) => {
                warn!(tool = %tool.name, error = %e, "enumerator failed");
                self.reporter.tool_failed(&e);
            }
        }
        hosts
    }

    /// Run all enumerators concurrently, then union and persist the results.
    pub async fn run_all(&self) -> Result<SubdomainSet> {
        let mut workers = JoinSet::new();
        for tool in self.tools.iter().cloned() {
            let enumerator = self.clone();
            workers.spawn(async move { enumerator.run_tool(&tool).await });
        }

        let mut results = Vec::with_capacity(self.tools.len());
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(hosts) => results.push(hosts),
                Err(e) => error!(error = %e, "enumeration worker aborted"),
            }
        }

        let combined: SubdomainSet = results.into_iter().flatten().collect();
        let combined_file = self.layout.combined_subdomains();
        write_lines(&combined_file, &combined)
            .context(format!("Failed to write {}", combined_file.display()))?;

        Ok(combined)
    }

    /// Re-read the per-tool files and union them.
    pub fn combine_results(&self) -> SubdomainSet {
        self.tools
            .iter()
            .flat_map(|tool| read_lines(&self.layout.subdomain_tool_file(&tool.name)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::tests::RecordingReporter;
    use crate::reporter::NullReporter;
    use crate::tool::OutputSource;

    fn echo_tool(name: &str, hosts: &[&str]) -> ExternalTool {
        let script = format!("printf '{}\\n'", hosts.join("\\n"));
        ExternalTool::new(name, "sh", &["-c", &script], OutputSource::Stdout)
    }

    fn enumerator(dir: &std::path::Path, tools: Vec<ExternalTool>, reporter: Arc<dyn Reporter>) -> SubdomainEnumerator {
        let layout = OutputLayout::new(dir);
        layout.create().unwrap();
        let config = ReconConfig {
            enumerators: tools,
            timeout_secs: 10,
            ..Default::default()
        };
        SubdomainEnumerator::new("example.com", layout, &config, reporter)
    }

    #[tokio::test]
    async fn test_union_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let enumerator = enumerator(
            dir.path(),
            vec![
                echo_tool("alpha", &["a.example.com"]),
                echo_tool("beta", &["b.example.com", "a.example.com"]),
            ],
            Arc::new(NullReporter),
        );

        let combined = enumerator.run_all().await.unwrap();
        let expected: SubdomainSet = ["a.example.com", "b.example.com"].iter().map(|s| s.to_string()).collect();
        assert_eq!(combined, expected);

        let on_disk = read_lines(&dir.path().join("subdomains/combined.txt"));
        assert_eq!(on_disk, expected);
        assert_eq!(read_lines(&dir.path().join("subdomains/alpha.txt")).len(), 1);
        assert_eq!(read_lines(&dir.path().join("subdomains/beta.txt")).len(), 2);
    }

    #[tokio::test]
    async fn test_combine_results_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let enumerator = enumerator(
            dir.path(),
            vec![
                echo_tool("alpha", &["a.example.com", "https://c.example.com:8443/x"]),
                echo_tool("beta", &["b.example.com"]),
            ],
            Arc::new(NullReporter),
        );

        let from_run = enumerator.run_all().await.unwrap();
        let first = enumerator.combine_results();
        let second = enumerator.combine_results();
        assert_eq!(first, from_run);
        assert_eq!(first, second);
        assert!(first.contains("c.example.com"));
    }

    #[tokio::test]
    async fn test_failing_tool_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let enumerator = enumerator(
            dir.path(),
            vec![
                ExternalTool::new("broken", "sh", &["-c", "exit 1"], OutputSource::Stdout),
                ExternalTool::new("absent", "ghost-recon-no-such-binary", &[], OutputSource::Stdout),
                echo_tool("alpha", &["a.example.com"]),
            ],
            reporter.clone(),
        );

        let combined = enumerator.run_all().await.unwrap();
        assert_eq!(combined.into_iter().collect::<Vec<_>>(), vec!["a.example.com"]);

        let events = reporter.events();
        assert!(events.contains(&"failed:broken:non_zero_exit".to_string()));
        assert!(events.contains(&"failed:absent:spawn_failed".to_string()));
        assert!(events.contains(&"done:alpha:1".to_string()));
    }

    #[tokio::test]
    async fn test_leftover_tool_file_is_not_reused() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let enumerator = enumerator(
            dir.path(),
            vec![ExternalTool::new("quiet", "sh", &["-c", "true"], OutputSource::File)],
            reporter.clone(),
        );
        let leftover = dir.path().join("subdomains/quiet.txt");
        write_lines(&leftover, ["stale.other.org"]).unwrap();

        let combined = enumerator.run_all().await.unwrap();
        assert!(combined.is_empty());
        assert!(reporter.events().contains(&"failed:quiet:missing_output_file".to_string()));
        assert!(read_lines(&leftover).is_empty());
    }
}
