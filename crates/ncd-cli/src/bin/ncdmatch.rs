//! ncdmatch - Compression-distance matcher for .freqs fingerprints
//!
//! Usage:
//!   ncdmatch --query <file.freqs>               # Identify one recording
//!   ncdmatch                                     # Identify every file in queries/
//!   ncdmatch --genre                             # Classify queries by genre
//!   ncdmatch --config <path> [options]           # Start from a TOML config

use anyhow::Result;
use clap::Parser;
use ncd_cli::output::print_json;
use ncd_cli::pipeline::{self, Mode, RunOptions};
use ncd_core::NcdConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ncdmatch")]
#[command(about = "Match .freqs fingerprints by normalized compression distance", long_about = None)]
struct Args {
    /// Path to configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Compressor: zlib (gzip), bzip2, zstd, lzma (xz), lzo, snappy, lz4 [default: zlib]
    #[arg(short, long)]
    compressor: Option<String>,

    /// Single query file
    #[arg(short, long)]
    query: Option<PathBuf>,

    /// CSV results file [default: results/results.csv]
    #[arg(short, long)]
    output: Option<String>,

    /// Reference database directory [default: database/]
    #[arg(long)]
    database: Option<String>,

    /// Query directory for batch runs [default: queries/]
    #[arg(long)]
    queries: Option<String>,

    /// Classify queries by genre instead of identifying recordings
    #[arg(short, long)]
    genre: bool,

    /// Run mode; derived from --genre and --query when omitted
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Also print the k closest references per query
    #[arg(long, value_name = "K")]
    top: Option<usize>,

    /// Compute distances on all cores
    #[arg(short, long)]
    parallel: bool,

    /// Use every fingerprint of a genre directory, not only the first
    #[arg(long)]
    all_members: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Default: warnings only, so skipped files still show up
    let level = if args.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let config = build_config(&args)?;
    let mode = Mode::select(args.mode, args.genre, args.query.is_some());

    let options = RunOptions {
        mode,
        config,
        query: args.query,
        top: args.top,
    };
    run_ncdmatch(&options)
}

fn build_config(args: &Args) -> Result<NcdConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading config from: {}", path.display());
            NcdConfig::load(path)?
        }
        None => NcdConfig::default(),
    };

    if let Some(compressor) = &args.compressor {
        config.engine.compressor = compressor.clone();
    }
    if let Some(output) = &args.output {
        config.output.path = output.clone();
    }
    if let Some(database) = &args.database {
        config.corpus.database_dir = database.clone();
    }
    if let Some(queries) = &args.queries {
        config.corpus.query_dir = queries.clone();
    }
    if args.parallel {
        config.engine.parallel = true;
    }
    if args.all_members {
        config.corpus.single_member_groups = false;
    }

    // Unknown compressor names fail here, before any file is touched
    config.validate()?;
    Ok(config)
}

fn run_ncdmatch(options: &RunOptions) -> Result<()> {
    let stdout = std::io::stdout();
    let summary = pipeline::run(options, &mut stdout.lock())?;
    print_json(&summary);
    Ok(())
}
