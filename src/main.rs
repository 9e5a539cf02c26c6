use std::path::PathBuf;

use clap::{
    Parser,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};

use tagfill::{cli, config, error, fatal, pipeline::RunOptions, utils};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Directory to scan for MP3 files
    #[clap(default_value = "./music")]
    target: PathBuf,

    /// Identify tracks by audio fingerprint before trying the file name
    #[clap(long)]
    recognize: bool,

    /// Process files that already have metadata and replace existing covers
    #[clap(long)]
    force: bool,

    /// Rename files to "Title - Artist.mp3"
    #[clap(long)]
    rename: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    // Flags may come with a single dash and unknown ones are ignored.
    let cli = Cli::parse_from(utils::normalize_args(std::env::args()));

    let options = RunOptions {
        recognize: cli.recognize,
        force: cli.force,
        rename: cli.rename,
    };

    if let Err(e) = cli::run(cli.target, options).await {
        fatal!("{}", e);
    }
}
