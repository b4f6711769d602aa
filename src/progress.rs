use crate::error::ToolError;
use crate::reporter::{Reporter, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A single line of `progress.jsonl`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub timestamp: DateTime<Utc>,
    pub target: String,
    pub event_type: EventType,
    pub message: String,
    pub progress_percentage: f32,
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventType {
    ScanStarted,
    StageStarted { stage: String },
    ToolStarted { tool_name: String },
    ToolCompleted { tool_name: String },
    ToolFailed { tool_name: String, error_kind: String, error: String },
    DataFound { data_type: String, count: usize },
    Warning,
    ScanCompleted,
    ScanFailed { error: String },
}

/// Reporter that persists events as JSON lines next to the scan output
#[derive(Clone)]
pub struct ProgressTracker {
    target: String,
    output_dir: PathBuf,
    events: Arc<Mutex<Vec<ProgressEvent>>>,
    progress: Arc<Mutex<f32>>,
}

impl ProgressTracker {
    pub fn new(target: String, output_dir: PathBuf) -> Self {
        fs::create_dir_all(&output_dir).ok();

        Self {
            target,
            output_dir,
            events: Arc::new(Mutex::new(Vec::new())),
            progress: Arc::new(Mutex::new(0.0)),
        }
    }

    pub fn progress_file(&self) -> PathBuf {
        self.output_dir.join("progress.jsonl")
    }

    fn current_progress(&self) -> f32 {
        self.progress.lock().map(|p| *p).unwrap_or(0.0)
    }

    fn set_progress(&self, value: f32) {
        if let Ok(mut progress) = self.progress.lock() {
            *progress = value;
        }
    }

    pub fn add_event(&self, event_type: EventType, message: String, details: Option<serde_json::Value>) {
        let event = ProgressEvent {
            timestamp: Utc::now(),
            target: self.target.clone(),
            event_type,
            message,
            progress_percentage: self.current_progress(),
            details,
        };

        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }

        self.save_to_file(&event);
    }

    fn save_to_file(&self, event: &ProgressEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            if let Ok(mut file) = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.progress_file())
            {
                writeln!(file, "{}", json).ok();
            }
        }

        self.save_current_status();
    }

    /// Overwrites `current_status.json` with the latest event summary
    fn save_current_status(&self) {
        let status_file = self.output_dir.join("current_status.json");

        if let Ok(events) = self.events.lock() {
            if let Some(event) = events.last() {
                let status = serde_json::json!({
                    "target": self.target,
                    "last_update": event.timestamp,
                    "progress": event.progress_percentage,
                    "current_message": event.message,
                    "event_type": event.event_type,
                    "total_events": events.len(),
                });

                if let Ok(json) = serde_json::to_string_pretty(&status) {
                    fs::write(&status_file, json).ok();
                }
            }
        }
    }

    pub fn get_events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn read_events_from_file(progress_file: &Path) -> Vec<ProgressEvent> {
        fs::read_to_string(progress_file)
            .map(|content| {
                content
                    .lines()
                    .filter_map(|line| serde_json::from_str::<ProgressEvent>(line).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Reporter for ProgressTracker {
    fn scan_started(&self, domain: &str, timestamp: &str) {
        self.set_progress(0.0);
        self.add_event(
            EventType::ScanStarted,
            format!("Starting scan of {}", domain),
            Some(serde_json::json!({ "run_timestamp": timestamp })),
        );
    }

    fn stage_started(&self, stage: Stage, detail: &str) {
        self.set_progress(stage.progress_floor());
        self.add_event(
            EventType::StageStarted { stage: stage.to_string() },
            detail.to_string(),
            None,
        );
    }

    fn tool_started(&self, tool: &str, target: &str) {
        self.add_event(
            EventType::ToolStarted { tool_name: tool.to_string() },
            format!("Running {} on {}", tool, target),
            None,
        );
    }

    fn tool_completed(&self, tool: &str, count: usize) {
        self.add_event(
            EventType::ToolCompleted { tool_name: tool.to_string() },
            format!("{} finished with {} results", tool, count),
            Some(serde_json::json!({ "count": count })),
        );
    }

    fn tool_failed(&self, error: &ToolError) {
        self.add_event(
            EventType::ToolFailed {
                tool_name: error.tool().to_string(),
                error_kind: error.kind().to_string(),
                error: error.to_string(),
            },
            format!("{} failed", error.tool()),
            None,
        );
    }

    fn data_found(&self, data_type: &str, count: usize) {
        self.add_event(
            EventType::DataFound {
                data_type: data_type.to_string(),
                count,
            },
            format!("Found {} {}", count, data_type),
            None,
        );
    }

    fn warning(&self, message: &str) {
        self.add_event(EventType::Warning, message.to_string(), None);
    }

    fn scan_completed(&self, output_dir: &Path) {
        self.set_progress(100.0);
        self.add_event(
            EventType::ScanCompleted,
            format!("Scan of {} completed, results in {}", self.target, output_dir.display()),
            None,
        );
    }

    fn scan_failed(&self, error: &str) {
        self.add_event(
            EventType::ScanFailed { error: error.to_string() },
            format!("Scan failed: {}", error),
            None,
        );
    }
}
