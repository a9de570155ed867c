//! CSV result sink and JSON output formatting

use anyhow::{Context, Result};
use ncd_core::WindowScore;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Columns of the music identification table
pub const MUSIC_HEADER: [&str; 5] = ["music query", "noise type", "noise intensity", "result", "NCD"];

/// Columns of the genre classification table
pub const GENRE_HEADER: [&str; 5] = [
    "genre query",
    "identified genre",
    "confidence",
    "expected genre",
    "correct",
];

/// One identified query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MusicRecord {
    pub query: String,
    pub noise_type: String,
    pub noise_intensity: String,
    pub best_match: String,
    pub distance: f64,
}

/// One classified query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreRecord {
    pub query: String,
    pub identified: String,
    pub confidence: f64,
    pub expected: String,
    pub correct: bool,
}

/// Fixed-column CSV table; the header is written up front so an empty run
/// still produces a well-formed file
pub struct ResultSink<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl ResultSink<File> {
    /// Create `path` (and its parent directories) and write `header`
    pub fn create(path: &Path, header: &[&str]) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Self::from_writer(file, header)
    }
}

impl<W: Write> ResultSink<W> {
    pub fn from_writer(writer: W, header: &[&str]) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer.write_record(header)?;
        Ok(Self { writer, rows: 0 })
    }

    pub fn write<R: Serialize>(&mut self, record: &R) -> Result<()> {
        self.writer.serialize(record)?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, header excluded
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush results: {}", e.error()))
    }
}

#[derive(Serialize)]
struct RankingOutput<'a> {
    query_path: &'a str,
    window_size: usize,
    results: &'a [WindowScore],
}

/// Print a byte-match ranking as JSON
pub fn print_json_ranking(query_path: &str, window_size: usize, results: &[WindowScore]) {
    let output = RankingOutput {
        query_path,
        window_size,
        results,
    };
    print_json(&output);
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing output: {}", e),
    }
}
