//! # CLI Module
//!
//! Wires the pipeline together for the command-line entry point and prints the
//! end-of-run summary.
//!
//! ```text
//! main.rs        argument normalization, clap, .env loading
//!     ↓
//! cli::run       settings → HTTP client → providers → cache → pipeline
//!     ↓
//! Supervisor     passes until one completes
//! ```
//!
//! Everything the run needs is built once from [`Settings`] and handed down, so
//! the pipeline itself never touches the environment.

use std::path::PathBuf;

use tabled::Table;

use crate::{
    config::Settings,
    http::HttpClient,
    info,
    management::{CoverCache, ProcessedSet},
    pipeline::{
        BatchProcessor, CoverResolver, MetadataResolver, PassError, PassReport, RunOptions,
        Supervisor,
    },
    providers::Providers,
    scanner::Mp3Scanner,
    success,
    tags::LoftyTagStore,
    types::{FileStatus, ReportTableRow},
};

/// Processes every MP3 under `target` and prints a summary table.
///
/// Returns only when a pass completes, the target turns out not to be a
/// directory, or the configured restart cap is reached.
pub async fn run(target: PathBuf, options: RunOptions) -> Result<(), PassError> {
    let settings = Settings::from_env();
    announce(&target, &options, &settings);

    let http = HttpClient::new(settings.retry).map_err(|e| PassError::Aborted(Box::new(e)))?;
    let providers = Providers::standard(&http, &settings);
    let cache = CoverCache::new(settings.cache_dir.clone());

    let batch = BatchProcessor::new(
        target,
        options,
        Box::new(Mp3Scanner),
        Box::new(LoftyTagStore),
        MetadataResolver::new(providers.recognizer, providers.searches),
        CoverResolver::new(providers.covers, cache),
    );
    let supervisor = Supervisor::new(settings.cooldown, settings.max_restarts);

    let mut processed = ProcessedSet::new();
    let report = supervisor.run(&batch, &mut processed).await?;

    print_report(&report);
    Ok(())
}

fn announce(target: &std::path::Path, options: &RunOptions, settings: &Settings) {
    info!("Target directory: {}", target.display());
    info!("Cover cache: {}", settings.cache_dir.display());
    if options.recognize {
        info!("Audio recognition enabled");
    }
    if options.force {
        info!("Force mode: complete files and existing covers are processed again");
    }
    if options.rename {
        info!("Rename mode: files are renamed to \"Title - Artist\"");
    }
}

fn print_report(report: &PassReport) {
    let processed = report.count(FileStatus::Processed);
    let skipped = report.count(FileStatus::Skipped);

    if !report.outcomes.is_empty() {
        let rows: Vec<ReportTableRow> = report
            .outcomes
            .iter()
            .map(|o| ReportTableRow {
                file: o
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| o.path.display().to_string()),
                status: o.status.to_string(),
                detail: o.detail.clone(),
            })
            .collect();
        println!("{}", Table::new(rows));
    }

    success!("Done. {} processed, {} skipped", processed, skipped);
}
