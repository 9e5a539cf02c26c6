//! MP3 Tag and Cover Art Filler Library
//!
//! This library provides the building blocks of the `tagfill` command: a retrying
//! HTTP client, adapters for the online music services that supply metadata and
//! cover art, a content-addressed cover cache, and the batch pipeline that walks a
//! music directory and fixes up each file at most once per run.
//!
//! # Modules
//!
//! - `cli` - Wiring of the pipeline for the command-line entry point
//! - `config` - Configuration management and environment variables
//! - `http` - Shared HTTP client with bounded retry and backoff
//! - `management` - Cover cache and processed-file bookkeeping
//! - `pipeline` - Metadata resolution, cover chain, batch state machine, supervisor
//! - `providers` - MusicBrainz, Cover Art Archive, iTunes, DuckDuckGo and ACRCloud adapters
//! - `scanner` - Recursive MP3 discovery
//! - `snippet` - Audio snippet extraction for fingerprinting
//! - `tags` - Tag reading and writing backed by `lofty`
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use tagfill::{cli, config, pipeline::RunOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     config::load_env().await.ok();
//!     let options = RunOptions { recognize: false, force: false, rename: true };
//!     cli::run("./music".into(), options).await.ok();
//! }
//! ```

pub mod cli;
pub mod config;
pub mod http;
pub mod management;
pub mod pipeline;
pub mod providers;
pub mod scanner;
pub mod snippet;
pub mod tags;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used at the collaborator seams (tag store, scanner, providers) where the
/// concrete error comes from a third-party crate and only needs to be reported.
/// The `Send + Sync` bounds keep it usable across `.await` points and
/// `spawn_blocking` boundaries.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Scanning: {}", target.display());
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Cover embedded");
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark.
///
/// Unlike [`fatal!`], the program keeps running. The pipeline reports per-file
/// and per-pass failures through this macro and then carries on.
///
/// # Example
///
/// ```
/// error!("Failed to rename {}: {}", path.display(), e);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Reserved for the entry point, where a configuration problem means there is
/// nothing left to do.
///
/// # Example
///
/// ```
/// fatal!("Target directory does not exist: {}", target.display());
/// // Program exits here
/// ```
#[macro_export]
macro_rules! fatal {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues: a provider that came back empty, a retried
/// request, a tag write that did not go through.
///
/// # Example
///
/// ```
/// warning!("Still missing metadata, skipping cover search");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
