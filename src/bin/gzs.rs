//! `gzs`: compress or decompress files in the gzip format.
//!
//! Files ending in `.gz` are decompressed in place (to the name without the
//! suffix); everything else is compressed to `<name>.gz`. Sources are
//! removed after a successful transform unless `--keep` is given.

#![deny(unsafe_code)]

mod support;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gzs")]
#[command(about = "Compress or decompress files in the gzip format")]
#[command(version)]
struct Args {
    /// Keep input files instead of deleting them.
    #[arg(short, long)]
    keep: bool,

    /// Report progress to stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Files to compress (or, with a .gz suffix, decompress).
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    for path in &args.files {
        match support::transform(path, args.keep) {
            Ok(support::Outcome::Compressed(target)) => {
                tracing::info!(dest = %target.display(), "compressed");
            }
            Ok(support::Outcome::Decompressed(target)) => {
                tracing::info!(dest = %target.display(), "decompressed");
            }
            Err(err) => {
                eprintln!("gzs: {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
