// lib.rs - GHOST_RECON library
// Purpose: Subdomain enumeration -> HTTP probing -> historical URL gathering,
//          driven through external recon tools

pub mod config;
pub mod domain;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod probe;
pub mod progress;
pub mod reporter;
pub mod subdomains;
pub mod tool;
pub mod tools_check;
pub mod url_filter;
pub mod urls;

pub use config::ReconConfig;
pub use error::ToolError;
pub use layout::OutputLayout;
pub use pipeline::{Pipeline, ScanResult};
pub use reporter::{ConsoleReporter, FanoutReporter, NullReporter, Reporter, Stage};
pub use tool::{ExternalTool, OutputSource};
