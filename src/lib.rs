pub mod checksum;
pub mod config;
pub mod conflict;
pub mod console;
pub mod document;
pub mod error;
pub mod fs;
pub mod interrupt;
pub mod isin;
pub mod pipeline;

#[cfg(test)]
mod test_support;

use config::OrganizerConfig;
use console::{Console, Level, TerminalConsole};
use document::PdfTextExtractor;
use fs::LocalFs;
use pipeline::Pipeline;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

pub fn run() -> ExitCode {
    // Load .env file; fall back to the parent directory
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path("../.env");
    }

    // Diagnostics go to stderr so they never interleave with prompts.
    // Use RUST_LOG=ts_organizer_lib=debug for per-file detail
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    interrupt::install();

    let mut console = TerminalConsole::stdio();

    let config = match OrganizerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            console.report(&format!("Critical error: {}", e), Level::Error);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(root = %config.root.display(), "configuration loaded");

    let fs = LocalFs;
    let extractor = PdfTextExtractor::new();

    match Pipeline::new(config, &fs, &extractor, &mut console).run() {
        Ok(summary) => {
            tracing::debug!(errors = summary.errors, "pipeline complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Pipeline aborted: {}", e);
            console.report(&format!("Critical error: {}", e), Level::Error);
            ExitCode::FAILURE
        }
    }
}
