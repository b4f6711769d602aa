// main.rs - GHOST_RECON v1.0 - Reconnaissance pipeline
// Purpose: Enumerate subdomains, keep the live ones, collect historical URLs
//          for each, and save everything as structured output

use anyhow::Result;
use clap::Parser;
use colored::*;
use ghost_recon::layout::DEFAULT_OUTPUT_DIR;
use ghost_recon::progress::ProgressTracker;
use ghost_recon::tools_check::{check_tools, ToolStatus};
use ghost_recon::{ConsoleReporter, FanoutReporter, Pipeline, ReconConfig, Reporter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// GHOST_RECON - Subdomain enumeration and reconnaissance pipeline
#[derive(Parser, Debug)]
#[command(
    name = "ghost_recon",
    version = "1.0.0",
    about = "Subdomain enumeration, HTTP probing and historical URL gathering",
    after_help = r#"
PIPELINE:
  1. subfinder + subdominator  -> subdomains/<tool>.txt, subdomains/combined.txt
  2. httpx                     -> subdomains/live_urls.txt
  3. gau + waybackurls         -> urls/<tool>_<domain>.txt, urls/combined.txt
  Final aggregate              -> final_results.json

Tools can be replaced or added with --config <FILE> (JSON).
Set RUST_LOG=debug to see every command line that is spawned.
"#
)]
struct Args {
    /// Target domain to scan (e.g., example.com)
    #[arg(short, long, value_name = "DOMAIN", required_unless_present = "check_tools")]
    domain: Option<String>,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Threads passed to every tool that takes a thread count [default: 10]
    #[arg(short, long, value_name = "NUM")]
    threads: Option<usize>,

    /// Timeout per tool invocation in seconds, 0 = no limit [default: 300]
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// JSON file describing enumerators, prober and harvesters
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Check which configured tools are installed and exit
    #[arg(long)]
    check_tools: bool,

    /// Do not print the banner
    #[arg(long)]
    no_banner: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", format!("[-] Error: {:#}", e).red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => ReconConfig::from_file(path)?,
        None => ReconConfig::default(),
    };
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    // Loaded and default configs are already valid; only the override can break it.
    if let Some(threads) = args.threads {
        config.threads = threads;
        config.validate()?;
    }

    if !args.no_banner {
        print_banner();
    }

    if args.check_tools {
        print_tool_statuses(&check_tools(&config));
        return Ok(ExitCode::SUCCESS);
    }

    let Some(domain) = args.domain.as_deref().map(str::trim).filter(|d| !d.is_empty()) else {
        anyhow::bail!("A target domain is required (-d <DOMAIN>)");
    };

    println!("{}", format!("Initializing scan for: {}", domain).white().bold());
    println!("{}", format!("[*] Output directory: {}/", args.output.display()).cyan());
    println!(
        "{}",
        format!("[*] Threads: {} | Tool timeout: {}s", config.threads, config.timeout_secs).cyan()
    );

    let console: Arc<dyn Reporter> = Arc::new(ConsoleReporter);
    let progress: Arc<dyn Reporter> = Arc::new(ProgressTracker::new(domain.to_string(), args.output.clone()));
    let reporter: Arc<dyn Reporter> = Arc::new(FanoutReporter::new(vec![console, progress]));

    let pipeline = Pipeline::new(config, reporter.clone());

    // Dropping the pipeline future aborts its workers, which kills their children.
    tokio::select! {
        result = pipeline.run(domain, &args.output) => {
            match result {
                Ok(_) => {
                    println!("{}", "═".repeat(80).magenta());
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    reporter.scan_failed(&format!("{:#}", e));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            reporter.scan_failed("Scan interrupted by user");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_banner() {
    println!("{}", "═══════════════════════════════════════════════════════════════".magenta().bold());
    println!("{}", "   ██████╗ ██╗  ██╗ ██████╗ ███████╗████████╗".magenta().bold());
    println!("{}", "  ██╔════╝ ██║  ██║██╔═══██╗██╔════╝╚══██╔══╝".magenta().bold());
    println!("{}", "  ██║  ███╗███████║██║   ██║███████╗   ██║   ".magenta().bold());
    println!("{}", "  ██║   ██║██╔══██║██║   ██║╚════██║   ██║   ".magenta().bold());
    println!("{}", "  ╚██████╔╝██║  ██║╚██████╔╝███████║   ██║   ".magenta().bold());
    println!("{}", "   ╚═════╝ ╚═╝  ╚═╝ ╚═════╝ ╚══════╝   ╚═╝  RECON".magenta().bold());
    println!("{}", "═══════════════════════════════════════════════════════════════".magenta().bold());
    println!("{}", "  GHOST_RECON v1.0 - Subdomain & URL Reconnaissance".cyan().bold());
    println!("{}", "═══════════════════════════════════════════════════════════════\n".magenta().bold());
}

fn print_tool_statuses(statuses: &[ToolStatus]) {
    println!("{}", "  TOOL STATUS".white().bold());
    println!("{}", "━".repeat(63).white());

    for status in statuses {
        let (icon, name) = if status.installed() {
            ("✓".green(), status.name.green())
        } else {
            ("✗".red(), status.name.red())
        };

        let detail = match (&status.path, status.install_hint()) {
            (Some(path), _) => format!("→ {}", path.display()).dimmed().to_string(),
            (None, Some(hint)) => format!("Install: {}", hint).dimmed().to_string(),
            (None, None) => format!("'{}' not found", status.program).dimmed().to_string(),
        };

        println!("  {} {:<15} {}", icon, name, detail);
    }

    let missing = statuses.iter().filter(|s| !s.installed()).count();
    println!();
    if missing == 0 {
        println!("{}", "  ✓ All tools installed!".green().bold());
    } else {
        println!(
            "{}",
            format!("  {} tool(s) missing - their stage will contribute no results", missing)
                .yellow()
        );
    }
}
