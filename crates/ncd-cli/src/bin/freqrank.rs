//! freqrank - Rank reference fingerprints by exact byte-window matches
//!
//! Usage: freqrank <query.freqs> <reference_dir> [--window N]

use anyhow::Result;
use clap::Parser;
use ncd_cli::output::print_json_ranking;
use ncd_core::window::DEFAULT_WINDOW_SIZE;
use ncd_core::rank_by_window_score;
use ncd_fp::{Corpus, FreqsReader, FREQS_EXTENSION};
use std::path::Path;

#[derive(Parser, Debug)]
#[command(name = "freqrank")]
#[command(about = "Rank fingerprints by the number of matching byte windows", long_about = None)]
struct Args {
    /// Query fingerprint file
    query: String,

    /// Directory of reference fingerprints
    reference_dir: String,

    /// Window size in bytes
    #[arg(short, long, default_value_t = DEFAULT_WINDOW_SIZE)]
    window: usize,

    /// Reference file extension
    #[arg(short, long, default_value = FREQS_EXTENSION)]
    extension: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Warn)
            .init();
    }

    run_freqrank(&args.query, &args.reference_dir, args.window, &args.extension)
}

fn run_freqrank(query: &str, reference_dir: &str, window: usize, extension: &str) -> Result<()> {
    let query_path = Path::new(query);
    if !query_path.is_file() {
        anyhow::bail!("Query file not found: {}", query_path.display());
    }
    if window == 0 {
        anyhow::bail!("Window size must be at least 1");
    }

    let query_data = FreqsReader::read(query_path)?;
    let references = Corpus::scan(Path::new(reference_dir), extension)?.load_candidates();
    log::info!(
        "Ranking {} references against {} ({} bytes, window {})",
        references.len(),
        query_path.display(),
        query_data.len(),
        window
    );

    let ranking = rank_by_window_score(&query_data, &references, window);
    print_json_ranking(query, window, &ranking);
    Ok(())
}
