//! Batch pipeline shared by the `ncdmatch` binary
//!
//! One configurable run covers the three ways of driving the search:
//! a single query, every query in a directory, or genre classification
//! against a grouped corpus.

use crate::output::{GenreRecord, MusicRecord, ResultSink, GENRE_HEADER, MUSIC_HEADER};
use anyhow::{Context, Result};
use clap::ValueEnum;
use ncd_core::{Candidate, Compressor, LabelGroups, NcdConfig, Search};
use ncd_fp::{expected_genre, noise_label, Corpus, CorpusEntry, GroupedCorpus};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// How the run drives the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Nearest reference for one query file
    Single,
    /// Nearest reference for every file in the query directory
    Batch,
    /// Closest genre (mean distance over each genre's fingerprints)
    Genre,
}

impl Mode {
    /// Explicit mode wins; otherwise `--genre`, then `--query`, then batch
    pub fn select(explicit: Option<Mode>, genre: bool, has_query: bool) -> Mode {
        match explicit {
            Some(mode) => mode,
            None if genre => Mode::Genre,
            None if has_query => Mode::Single,
            None => Mode::Batch,
        }
    }
}

/// Everything one run needs
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub mode: Mode,
    pub config: NcdConfig,
    /// A single query file; required in single mode
    pub query: Option<PathBuf>,
    /// Also print the `top` closest references per query
    pub top: Option<usize>,
}

/// Outcome of a run, printed as JSON by the binary
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub status: String,
    pub mode: Mode,
    pub compressor: String,
    pub queries: usize,
    pub processed: usize,
    pub failed: usize,
    pub output_file: String,
    /// Share of correctly classified queries (genre mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    pub processing_time_seconds: f64,
}

/// Run the configured search, writing the result table and one line per
/// query to `console`.
///
/// Fatal problems (bad compressor, missing query, empty corpus) abort the
/// run. A query that cannot be read or compressed is logged and skipped, as
/// is a reference that fails to compress against a query.
pub fn run<C: Write>(options: &RunOptions, console: &mut C) -> Result<RunSummary> {
    let start = std::time::Instant::now();
    let config = &options.config;
    let backend = config.validate()?;
    log::info!("Using compressor: {}", backend.name());

    if let Some(query) = &options.query {
        if !query.is_file() {
            anyhow::bail!("Query file not found: {}", query.display());
        }
    }

    let queries = collect_queries(options)?;
    log::info!("Processing {} queries in {:?} mode", queries.len(), options.mode);

    let search = Search::new(backend)
        .parallel(config.engine.parallel)
        .skip_failures(true);
    let output_path = Path::new(&config.output.path);

    let tally = match options.mode {
        Mode::Single | Mode::Batch => {
            let database = load_database(config)?;
            let mut sink = ResultSink::create(output_path, &MUSIC_HEADER)?;
            let tally = identify_all(&search, &queries, &database, options, &mut sink, console)?;
            finish_sink(sink, output_path)?;
            tally
        }
        Mode::Genre => {
            let groups = load_genres(config)?;
            let mut sink = ResultSink::create(output_path, &GENRE_HEADER)?;
            let tally = classify_all(&search, &queries, &groups, &mut sink, console)?;
            finish_sink(sink, output_path)?;
            tally
        }
    };

    let elapsed = start.elapsed();
    log::info!(
        "Processed {} of {} queries in {:.2}s ({} failed)",
        tally.processed,
        queries.len(),
        elapsed.as_secs_f64(),
        tally.failed
    );

    Ok(RunSummary {
        status: tally.status().to_string(),
        mode: options.mode,
        compressor: backend.name().to_string(),
        queries: queries.len(),
        processed: tally.processed,
        failed: tally.failed,
        output_file: output_path.display().to_string(),
        accuracy: tally.accuracy(),
        processing_time_seconds: elapsed.as_secs_f64(),
    })
}

#[derive(Debug, Default)]
struct Tally {
    processed: usize,
    failed: usize,
    /// Correct classifications, `None` outside genre mode
    correct: Option<usize>,
}

impl Tally {
    /// "success" when every query went through, "partial" when some did
    fn status(&self) -> &'static str {
        match (self.processed, self.failed) {
            (_, 0) => "success",
            (0, _) => "failed",
            _ => "partial",
        }
    }

    fn accuracy(&self) -> Option<f64> {
        let correct = self.correct?;
        if self.processed == 0 {
            return Some(0.0);
        }
        Some(correct as f64 / self.processed as f64)
    }
}

fn finish_sink<W: Write>(sink: ResultSink<W>, path: &Path) -> Result<()> {
    log::info!("Wrote {} result rows to {}", sink.rows(), path.display());
    sink.finish()?;
    Ok(())
}

fn collect_queries(options: &RunOptions) -> Result<Vec<CorpusEntry>> {
    if let Some(query) = &options.query {
        let label = query
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| query.display().to_string());
        return Ok(vec![CorpusEntry {
            label,
            path: query.clone(),
        }]);
    }
    if options.mode == Mode::Single {
        anyhow::bail!("Single mode needs a query file (--query)");
    }

    let dir = Path::new(&options.config.corpus.query_dir);
    let corpus = Corpus::scan(dir, &options.config.corpus.extension)
        .with_context(|| format!("Failed to list queries in {}", dir.display()))?;
    if corpus.is_empty() {
        log::warn!("No .{} queries found in {}", options.config.corpus.extension, dir.display());
    }
    Ok(corpus.entries().to_vec())
}

fn load_database(config: &NcdConfig) -> Result<Vec<Candidate>> {
    let dir = Path::new(&config.corpus.database_dir);
    let corpus = Corpus::scan(dir, &config.corpus.extension)
        .with_context(|| format!("Failed to list database {}", dir.display()))?;

    let candidates = corpus.load_candidates();
    if candidates.is_empty() {
        anyhow::bail!("Database {} contains no readable fingerprints", dir.display());
    }
    log::info!("Loaded {} reference fingerprints", candidates.len());
    Ok(candidates)
}

fn load_genres(config: &NcdConfig) -> Result<LabelGroups> {
    let dir = Path::new(&config.corpus.database_dir);
    let corpus = GroupedCorpus::scan(dir, &config.corpus.extension, config.corpus.single_member_groups)
        .with_context(|| format!("Failed to list genre database {}", dir.display()))?;
    if corpus.is_empty() {
        anyhow::bail!("Genre database {} has no genre directories with fingerprints", dir.display());
    }

    let groups = corpus.load_groups();
    if groups.member_count() == 0 {
        anyhow::bail!("Genre database {} contains no readable fingerprints", dir.display());
    }
    log::info!(
        "Loaded {} genres ({} fingerprints)",
        groups.len(),
        groups.member_count()
    );
    Ok(groups)
}

fn identify_all<W: Write, C: Write>(
    search: &Search<'_>,
    queries: &[CorpusEntry],
    database: &[Candidate],
    options: &RunOptions,
    sink: &mut ResultSink<W>,
    console: &mut C,
) -> Result<Tally> {
    let mut tally = Tally::default();

    for entry in queries {
        let query = match entry.load() {
            Ok(query) => query,
            Err(e) => {
                log::warn!("Skipping query {}: {}", entry.label, e);
                tally.failed += 1;
                continue;
            }
        };

        let ranked = match search.rank(&query.data, database) {
            Ok(ranked) => ranked,
            Err(e) => {
                log::warn!("Skipping query {}: {}", entry.label, e);
                tally.failed += 1;
                continue;
            }
        };
        let Some(best) = ranked.first() else {
            tally.failed += 1;
            continue;
        };

        writeln!(
            console,
            "Query: {} => Best Match: {} (NCD = {:.6})",
            entry.label, best.label, best.distance
        )?;
        if let Some(top) = options.top {
            for (position, m) in ranked.iter().take(top).enumerate() {
                writeln!(console, "  #{} {} (NCD = {:.6})", position + 1, m.label, m.distance)?;
            }
        }

        let noise = noise_label(&entry.label, &options.config.corpus.extension);
        sink.write(&MusicRecord {
            query: entry.label.clone(),
            noise_type: noise.noise_type,
            noise_intensity: noise.intensity,
            best_match: best.label.clone(),
            distance: best.distance,
        })?;
        tally.processed += 1;
    }

    Ok(tally)
}

fn classify_all<W: Write, C: Write>(
    search: &Search<'_>,
    queries: &[CorpusEntry],
    groups: &LabelGroups,
    sink: &mut ResultSink<W>,
    console: &mut C,
) -> Result<Tally> {
    let mut tally = Tally {
        correct: Some(0),
        ..Tally::default()
    };

    for entry in queries {
        let classified = entry
            .load()
            .map_err(anyhow::Error::from)
            .and_then(|query| Ok(search.best_label(&query.data, groups)?));
        let result = match classified {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Skipping query {}: {}", entry.label, e);
                tally.failed += 1;
                continue;
            }
        };

        let expected = expected_genre(&entry.label).to_string();
        let correct = result.label == expected;
        writeln!(
            console,
            "Query: {} => Genre: {} (confidence = {:.6}, expected {})",
            entry.label,
            result.label,
            result.confidence(),
            expected
        )?;

        sink.write(&GenreRecord {
            query: entry.label.clone(),
            identified: result.label.clone(),
            confidence: result.confidence(),
            expected,
            correct,
        })?;
        tally.processed += 1;
        if correct {
            tally.correct = tally.correct.map(|c| c + 1);
        }
    }

    Ok(tally)
}
