// reporter.rs - Progress reporting seam
// Purpose: The pipeline reports what it does through `Reporter` and never
//          writes to the terminal itself, so it runs headless under test

use crate::error::ToolError;
use colored::*;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// One of the three sequential pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Enumerate,
    Probe,
    Gather,
}

impl Stage {
    /// Share of overall progress reached when this stage starts.
    pub fn progress_floor(self) -> f32 {
        match self {
            Stage::Enumerate => 0.0,
            Stage::Probe => 40.0,
            Stage::Gather => 60.0,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Enumerate => "SUBDOMAIN ENUMERATION",
            Stage::Probe => "HTTP PROBING",
            Stage::Gather => "URL GATHERING",
        };
        f.write_str(label)
    }
}

/// Receives pipeline events. Every method defaults to a no-op.
pub trait Reporter: Send + Sync {
    fn scan_started(&self, _domain: &str, _timestamp: &str) {}
    fn stage_started(&self, _stage: Stage, _detail: &str) {}
    fn tool_started(&self, _tool: &str, _target: &str) {}
    fn tool_completed(&self, _tool: &str, _count: usize) {}
    fn tool_failed(&self, _error: &ToolError) {}
    fn data_found(&self, _data_type: &str, _count: usize) {}
    fn warning(&self, _message: &str) {}
    fn scan_completed(&self, _output_dir: &Path) {}
    fn scan_failed(&self, _error: &str) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Colored terminal output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn scan_started(&self, domain: &str, timestamp: &str) {
        println!(
            "{}",
            format!("[~] GHOST_RECON started for {} at {}", domain, timestamp).magenta().bold()
        );
    }

    fn stage_started(&self, stage: Stage, detail: &str) {
        println!("\n{}", "═══════════════════════════════════════════════════════════════".yellow().bold());
        println!("{}", format!("  {}", stage).yellow().bold());
        println!("{}", "═══════════════════════════════════════════════════════════════".yellow().bold());
        if !detail.is_empty() {
            println!("{}", format!("[+] {}", detail).green());
        }
    }

    fn tool_started(&self, tool: &str, target: &str) {
        println!("{}", format!("[*] Running {} on {}", tool, target).cyan());
    }

    fn tool_completed(&self, tool: &str, count: usize) {
        println!("{}", format!("[+] {} found {} results", tool, count).green());
    }

    fn tool_failed(&self, error: &ToolError) {
        match error {
            ToolError::TimedOut { .. } => println!("{}", format!("[!] {}", error).yellow()),
            _ => println!("{}", format!("[✗] {}", error).red()),
        }
    }

    fn data_found(&self, data_type: &str, count: usize) {
        println!("{}", format!("[+] Total unique {}: {}", data_type, count).green().bold());
    }

    fn warning(&self, message: &str) {
        println!("{}", format!("[!] {}", message).yellow());
    }

    fn scan_completed(&self, output_dir: &Path) {
        println!(
            "\n{}",
            format!("[✓] GHOST_RECON completed! Results saved to {}", output_dir.display())
                .green()
                .bold()
        );
    }

    fn scan_failed(&self, error: &str) {
        eprintln!("{}", format!("[-] {}", error).red().bold());
    }
}

/// Forwards every event to each inner reporter, in order.
#[derive(Clone, Default)]
pub struct FanoutReporter {
    reporters: Vec<Arc<dyn Reporter>>,
}

impl FanoutReporter {
    pub fn new(reporters: Vec<Arc<dyn Reporter>>) -> Self {
        Self { reporters }
    }

    pub fn push(&mut self, reporter: Arc<dyn Reporter>) {
        self.reporters.push(reporter);
    }
}

impl Reporter for FanoutReporter {
    fn scan_started(&self, domain: &str, timestamp: &str) {
        self.reporters.iter().for_each(|r| r.scan_started(domain, timestamp));
    }

    fn stage_started(&self, stage: Stage, detail: &str) {
        self.reporters.iter().for_each(|r| r.stage_started(stage, detail));
    }

    fn tool_started(&self, tool: &str, target: &str) {
        self.reporters.iter().for_each(|r| r.tool_started(tool, target));
    }

    fn tool_completed(&self, tool: &str, count: usize) {
        self.reporters.iter().for_each(|r| r.tool_completed(tool, count));
    }

    fn tool_failed(&self, error: &ToolError) {
        self.reporters.iter().for_each(|r| r.tool_failed(error));
    }

    fn data_found(&self, data_type: &str, count: usize) {
        self.reporters.iter().for_each(|r| r.data_found(data_type, count));
    }

    fn warning(&self, message: &str) {
        self.reporters.iter().for_each(|r| r.warning(message));
    }

    fn scan_completed(&self, output_dir: &Path) {
        self.reporters.iter().for_each(|r| r.scan_completed(output_dir));
    }

    fn scan_failed(&self, error: &str) {
        self.reporters.iter().for_each(|r| r.scan_failed(error));
    }
}
