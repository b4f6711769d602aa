// urls.rs - Historical URL gathering stage
// Purpose: Harvest archived/crawled URLs once per base domain of the live
//          hosts, filter static assets and merge everything into one set

use crate::config::ReconConfig;
use crate::domain::base_domain;
use crate::layout::OutputLayout;
use crate::reporter::Reporter;
use crate::tool::{write_lines, ExternalTool, Placeholders};
use crate::url_filter::filter_urls;
use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// Harvesters running at once for a single base domain
pub const HARVEST_WORKERS: usize = 2;

#[derive(Clone)]
pub struct UrlGatherer {
    layout: OutputLayout,
    tools: Vec<ExternalTool>,
    threads: usize,
    timeout_secs: u64,
    reporter: Arc<dyn Reporter>,
}

impl UrlGatherer {
    pub fn new(layout: OutputLayout, config: &ReconConfig, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            layout,
            tools: config.harvesters.clone(),
            threads: config.threads,
            timeout_secs: config.timeout_secs,
            reporter,
        }
    }

    /// Base domains to harvest, first occurrence wins.
    pub fn distinct_base_domains(live_hosts: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        live_hosts
            .iter()
            .map(|host| base_domain(host))
            .filter(|base| !base.is_empty() && seen.insert(base.clone()))
            .collect()
    }

    /// Run one harvester for one base domain. The filtered URLs are written
    /// to `urls/<tool>_<base>.txt`; failures contribute nothing and leave
    /// that file empty.
    pub async fn harvest(&self, tool: &ExternalTool, base: &str) -> Vec<String> {
        let output = self.layout.url_tool_file(&tool.name, base);
        self.reporter.tool_started(&tool.name, base);

        let values = Placeholders {
            domain: base.to_string(),
            output: output.clone(),
            input: None,
            threads: self.threads,
        };

        let result = tool.execute(&values, self.timeout_secs).await;
        let urls = match &result {
            Ok(lines) => filter_urls(lines.iter().map(|l| l.trim())),
            Err(_) => Vec::new(),
        };

        if let Err(e) = write_lines(&output, &urls) {
            self.reporter
                .warning(&format!("Could not write {}: {}", output.display(), e));
        }

        match result {
            Ok(_) => self.reporter.tool_completed(&tool.name, urls.len()),
            Err(e) => {
                warn!(tool = %tool.name, domain = base, error = %e, "harvester failed");
                self.reporter.tool_failed(&e);
            }
        }
        urls
    }

    /// All harvesters for one base domain, at most [`HARVEST_WORKERS`] at a time.
    pub async fn gather_domain(&self, base: &str) -> BTreeSet<String> {
        let semaphore = Arc::new(Semaphore::new(HARVEST_WORKERS));
        let mut workers = JoinSet::new();

        for tool in self.tools.iter().cloned() {
            let gatherer = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let base = base.to_string();
            workers.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return Vec::new();
                };
                gatherer.harvest(&tool, &base).await
            });
        }

        let mut results = Vec::with_capacity(self.tools.len());
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(urls) => results.push(urls),
                Err(e) => error!(domain = base, error = %e, "harvest worker aborted"),
            }
        }

        results.into_iter().flatten().collect()
    }

    /// Gather URLs for every distinct base domain among `live_hosts`, then
    /// persist the combined set.
    pub async fn gather(&self, live_hosts: &[String]) -> Result<BTreeSet<String>> {
        let mut all_urls = BTreeSet::new();

        for base in Self::distinct_base_domains(live_hosts) {
            debug!(domain = %base, "gathering urls");
            all_urls.extend(self.gather_domain(&base).await);
        }

        let combined_file = self.layout.combined_urls();
        write_lines(&combined_file, &all_urls)
            .context(format!("Failed to write {}", combined_file.display()))?;

        Ok(all_urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::tests::RecordingReporter;
    use crate::reporter::NullReporter;
    use crate::tool::{read_lines, OutputSource};
    use std::path::Path;

    fn gatherer(dir: &Path, tools: Vec<ExternalTool>, reporter: Arc<dyn Reporter>) -> UrlGatherer {
        let layout = OutputLayout::new(dir);
        layout.create().unwrap();
        let config = ReconConfig {
            harvesters: tools,
            timeout_secs: 10,
            ..Default::default()
        };
        UrlGatherer::new(layout, &config, reporter)
    }

    fn hosts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_distinct_base_domains() {
        let bases = UrlGatherer::distinct_base_domains(&hosts(&[
            "https://api.x.com",
            "www.x.com",
            "https://shop.y.org:8443/",
            "x.com",
        ]));
        assert_eq!(bases, vec!["x.com", "y.org"]);
    }

    #[tokio::test]
    async fn test_shared_base_domain_is_harvested_once() {
        let dir = tempfile::tempdir().unwrap();
        let counter = dir.path().join("calls.log");
        let script = format!("echo {{domain}} >> {}; echo http://{{domain}}/page", counter.display());
        let gatherer = gatherer(
            dir.path(),
            vec![ExternalTool::new("counter", "sh", &["-c", &script], OutputSource::Stdout)],
            Arc::new(NullReporter),
        );

        let urls = gatherer.gather(&hosts(&["api.x.com", "www.x.com"])).await.unwrap();

        let calls = std::fs::read_to_string(&counter).unwrap();
        assert_eq!(calls.lines().collect::<Vec<_>>(), vec!["x.com"]);
        assert_eq!(urls.into_iter().collect::<Vec<_>>(), vec!["http://x.com/page"]);
    }

    #[tokio::test]
    async fn test_filtering_and_per_tool_files() {
        let dir = tempfile::tempdir().unwrap();
        let gatherer = gatherer(
            dir.path(),
            vec![
                ExternalTool::new(
                    "first",
                    "sh",
                    &["-c", "printf 'http://{domain}/1\\nhttp://{domain}/1.png\\n'"],
                    OutputSource::Stdout,
                ),
                ExternalTool::new(
                    "second",
                    "sh",
                    &["-c", "printf 'http://{domain}/1\\nhttp://{domain}/app.js\\nhttp://{domain}/2\\n'"],
                    OutputSource::Stdout,
                ),
            ],
            Arc::new(NullReporter),
        );

        let urls = gatherer.gather(&hosts(&["a.d.com"])).await.unwrap();
        assert_eq!(urls.into_iter().collect::<Vec<_>>(), vec!["http://d.com/1", "http://d.com/2"]);

        let first = read_lines(&dir.path().join("urls/first_d.com.txt"));
        assert_eq!(first.into_iter().collect::<Vec<_>>(), vec!["http://d.com/1"]);
        let combined = read_lines(&dir.path().join("urls/combined.txt"));
        assert_eq!(combined.len(), 2);
    }

    #[tokio::test]
    async fn test_timeout_does_not_stop_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let mut gatherer = gatherer(
            dir.path(),
            vec![
                ExternalTool::new("slow", "sh", &["-c", "sleep 10"], OutputSource::Stdout),
                ExternalTool::new("fast", "sh", &["-c", "echo http://{domain}/ok"], OutputSource::Stdout),
            ],
            reporter.clone(),
        );
        gatherer.timeout_secs = 1;

        let urls = gatherer.gather(&hosts(&["x.com"])).await.unwrap();
        assert_eq!(urls.into_iter().collect::<Vec<_>>(), vec!["http://x.com/ok"]);

        let events = reporter.events();
        assert!(events.contains(&"failed:slow:timeout".to_string()));
        assert!(events.contains(&"done:fast:1".to_string()));
    }

    #[tokio::test]
    async fn test_at_most_two_harvesters_run_at_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("overlap.log");
        let script = format!("echo start >> {0}; sleep 1; echo end >> {0}", log.display());
        let tools = ["one", "two", "three"]
            .iter()
            .map(|name| ExternalTool::new(name, "sh", &["-c", &script], OutputSource::Stdout))
            .collect();
        let gatherer = gatherer(dir.path(), tools, Arc::new(NullReporter));

        gatherer.gather_domain("x.com").await;

        let mut running = 0i32;
        let mut peak = 0;
        let mut starts = 0;
        for line in std::fs::read_to_string(&log).unwrap().lines() {
            match line {
                "start" => {
                    starts += 1;
                    running += 1;
                    peak = peak.max(running);
                }
                "end" => running -= 1,
                other => panic!("unexpected log line {other:?}"),
            }
        }
        assert_eq!(starts, 3);
        assert_eq!(peak, HARVEST_WORKERS as i32);
    }

    #[tokio::test]
    async fn test_failed_harvest_empties_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let gatherer = gatherer(
            dir.path(),
            vec![ExternalTool::new("broken", "sh", &["-c", "exit 2"], OutputSource::Stdout)],
            reporter.clone(),
        );
        let leftover = dir.path().join("urls/broken_x.com.txt");
        write_lines(&leftover, ["http://x.com/old"]).unwrap();

        let urls = gatherer.gather(&hosts(&["x.com"])).await.unwrap();
        assert!(urls.is_empty());
        assert!(leftover.exists());
        assert!(read_lines(&leftover).is_empty());
        assert_eq!(reporter.events().iter().filter(|e| e.starts_with("done:")).count(), 0);
        assert!(reporter.events().contains(&"failed:broken:non_zero_exit".to_string()));
    }

    #[tokio::test]
    async fn test_no_live_hosts_writes_empty_combined() {
        let dir = tempfile::tempdir().unwrap();
        let gatherer = gatherer(dir.path(), Vec::new(), Arc::new(NullReporter));
        let urls = gatherer.gather(&[]).await.unwrap();
        assert!(urls.is_empty());
        assert!(dir.path().join("urls/combined.txt").exists());
    }
}
