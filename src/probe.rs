// probe.rs - HTTP liveness stage
// Purpose: Hand every candidate host to the prober in one batch file and
//          keep whatever it reports as live

use crate::config::ReconConfig;
use crate::layout::OutputLayout;
use crate::reporter::Reporter;
use crate::subdomains::SubdomainSet;
use crate::tool::{write_lines, ExternalTool, OutputSource, Placeholders};
use std::sync::Arc;
use tracing::warn;

pub struct HttpProber {
    layout: OutputLayout,
    tool: ExternalTool,
    threads: usize,
    timeout_secs: u64,
    reporter: Arc<dyn Reporter>,
}

impl HttpProber {
    pub fn new(layout: OutputLayout, config: &ReconConfig, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            layout,
            tool: config.prober.clone(),
            threads: config.threads,
            timeout_secs: config.timeout_secs,
            reporter,
        }
    }

    /// Live hosts in the order the prober reported them. Any failure yields
    /// an empty list; there are no partial results.
    pub async fn probe(&self, hosts: &SubdomainSet) -> Vec<String> {
        if hosts.is_empty() {
            self.reporter.warning("No subdomains to probe");
            return Vec::new();
        }

        let input = self.layout.combined_subdomains();
        let output = self.layout.live_hosts();

        if let Err(e) = write_lines(&input, hosts) {
            self.reporter
                .warning(&format!("Could not write probe input {}: {}", input.display(), e));
            return Vec::new();
        }
        self.reporter.tool_started(&self.tool.name, &format!("{} hosts", hosts.len()));

        let values = Placeholders {
            domain: String::new(),
            output: output.clone(),
            input: Some(input),
            threads: self.threads,
        };

        let live: Vec<String> = match self.tool.execute(&values, self.timeout_secs).await {
            Ok(lines) => lines
                .iter()
                .map(|line| line.trim())
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) => {
                warn!(tool = %self.tool.name, error = %e, "prober failed");
                self.reporter.tool_failed(&e);
                return Vec::new();
            }
        };

        if self.tool.output == OutputSource::Stdout {
            if let Err(e) = write_lines(&output, &live) {
                self.reporter
                    .warning(&format!("Could not write {}: {}", output.display(), e));
            }
        }

        self.reporter.tool_completed(&self.tool.name, live.len());
        live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::tests::RecordingReporter;
    use crate::tool::read_lines;

    fn prober(dir: &std::path::Path, tool: ExternalTool, reporter: Arc<dyn Reporter>) -> HttpProber {
        let layout = OutputLayout::new(dir);
        layout.create().unwrap();
        let config = ReconConfig {
            prober: tool,
            timeout_secs: 10,
            ..Default::default()
        };
        HttpProber::new(layout, &config, reporter)
    }

    fn hosts(list: &[&str]) -> SubdomainSet {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_probe_reads_output_file() {
        let dir = tempfile::tempdir().unwrap();
        // Keeps only hosts starting with "a." and emits a blank line
        let tool = ExternalTool::new(
            "fakehttpx",
            "sh",
            &["-c", "grep '^a\\.' {input} > {output}; echo '' >> {output}"],
            OutputSource::File,
        );
        let prober = prober(dir.path(), tool, Arc::new(RecordingReporter::default()));

        let live = prober.probe(&hosts(&["a.d.com", "b.d.com"])).await;
        assert_eq!(live, vec!["a.d.com"]);

        let batch = read_lines(&dir.path().join("subdomains/combined.txt"));
        assert_eq!(batch.len(), 2);
    }

    #[tokio::test]
    async fn test_probe_stdout_tool_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ExternalTool::new("lister", "sh", &["-c", "cat {input}"], OutputSource::Stdout);
        let prober = prober(dir.path(), tool, Arc::new(RecordingReporter::default()));

        let live = prober.probe(&hosts(&["a.d.com", "b.d.com"])).await;
        assert_eq!(live, vec!["a.d.com", "b.d.com"]);
        assert_eq!(read_lines(&dir.path().join("subdomains/live_urls.txt")).len(), 2);
    }

    #[tokio::test]
    async fn test_probe_failure_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let tool = ExternalTool::new("silent", "sh", &["-c", "true"], OutputSource::File);
        let prober = prober(dir.path(), tool, reporter.clone());

        // Left over from an earlier run
        write_lines(&dir.path().join("subdomains/live_urls.txt"), ["stale.d.com"]).unwrap();

        let live = prober.probe(&hosts(&["a.d.com"])).await;
        assert!(live.is_empty());
        assert!(reporter.events().contains(&"failed:silent:missing_output_file".to_string()));
    }

    #[tokio::test]
    async fn test_probe_skips_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let tool = ExternalTool::new("never", "ghost-recon-no-such-binary", &[], OutputSource::File);
        let prober = prober(dir.path(), tool, reporter.clone());

        assert!(prober.probe(&SubdomainSet::new()).await.is_empty());
        assert_eq!(reporter.events(), vec!["warn:No subdomains to probe"]);
    }
}
