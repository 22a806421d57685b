//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;
use console::style;

use crate::config::Settings;
use crate::harvest::harvest;
use crate::services::DownloadSummary;

#[derive(Parser, Debug)]
#[command(name = "pdfsweep")]
#[command(about = "Download every PDF linked from a web page through a real browser")]
#[command(version)]
pub struct Cli {
    /// Config file (default: ./pdfsweep.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Parse arguments and run one harvest.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    if let Some(path) = &settings.source_path {
        tracing::debug!("Loaded settings from {}", path.display());
    }

    let summary = harvest(&settings).await?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &DownloadSummary) {
    if summary.discovered == 0 {
        println!("{} No PDF links found", style("!").yellow());
        return;
    }

    let marker = if summary.failed == 0 {
        style("✓").green()
    } else {
        style("!").yellow()
    };
    println!(
        "{} {} links, {} attempted, {} renamed, {} skipped, {} failed",
        marker,
        summary.discovered,
        summary.attempted,
        style(summary.renamed).green(),
        summary.skipped,
        summary.failed
    );
}
