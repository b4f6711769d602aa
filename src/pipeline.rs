// pipeline.rs - Scan orchestration
// Purpose: enumerate -> probe -> gather, strictly in sequence, then write
//          the aggregate to final_results.json

use crate::config::ReconConfig;
use crate::layout::OutputLayout;
use crate::probe::HttpProber;
use crate::reporter::{Reporter, Stage};
use crate::subdomains::SubdomainEnumerator;
use crate::urls::UrlGatherer;
use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Format of the run timestamp stored in the results
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Terminal aggregate of one run, written once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub domain: String,
    pub subdomains: Vec<String>,
    pub live_urls: Vec<String>,
    pub all_urls: Vec<String>,
    pub timestamp: String,
}

impl ScanResult {
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).context(format!("Failed to write results: {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read results: {}", path.display()))?;
        Ok(serde_json::from_str(&content)?)
    }
}

pub struct Pipeline {
    config: ReconConfig,
    reporter: Arc<dyn Reporter>,
}

impl Pipeline {
    pub fn new(config: ReconConfig, reporter: Arc<dyn Reporter>) -> Self {
        Self { config, reporter }
    }

    /// Run all three stages for `domain`, writing under `output_dir`.
    ///
    /// Tool failures only shrink the result; errors returned here are
    /// output-tree failures that make the run meaningless.
    pub async fn run(&self, domain: &str, output_dir: &Path) -> Result<ScanResult> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let layout = OutputLayout::new(output_dir);
        layout.create()?;

        info!(domain, output = %output_dir.display(), "scan started");
        self.reporter.scan_started(domain, &timestamp);

        self.reporter.stage_started(
            Stage::Enumerate,
            &format!("Starting subdomain enumeration for {}", domain),
        );
        let enumerator = SubdomainEnumerator::new(domain, layout.clone(), &self.config, self.reporter.clone());
        let subdomains = enumerator.run_all().await?;
        self.reporter.data_found("subdomains", subdomains.len());

        self.reporter.stage_started(
            Stage::Probe,
            &format!("Probing {} subdomains for live HTTP services", subdomains.len()),
        );
        let prober = HttpProber::new(layout.clone(), &self.config, self.reporter.clone());
        let live_urls = prober.probe(&subdomains).await;
        self.reporter.data_found("live HTTP services", live_urls.len());

        let tool_names: Vec<&str> = self.config.harvesters.iter().map(|t| t.name.as_str()).collect();
        self.reporter.stage_started(
            Stage::Gather,
            &format!("Gathering URLs with {}", tool_names.join(", ")),
        );
        let gatherer = UrlGatherer::new(layout.clone(), &self.config, self.reporter.clone());
        let all_urls = gatherer.gather(&live_urls).await?;
        self.reporter.data_found("URLs", all_urls.len());

        let result = ScanResult {
            domain: domain.to_string(),
            subdomains: subdomains.into_iter().collect(),
            live_urls,
            all_urls: all_urls.into_iter().collect(),
            timestamp,
        };
        result.save(&layout.final_results())?;

        info!(domain, "scan completed");
        self.reporter.scan_completed(layout.root());
        Ok(result)
    }
}
