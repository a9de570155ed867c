//! Corpus enumeration
//!
//! A corpus is a directory of fingerprint files. The grouped variant treats
//! every immediate subdirectory as one label (e.g. a genre). Entries are
//! sorted by file name so repeated scans yield the same order.

use crate::error::{FpError, Result};
use crate::reader::FreqsReader;
use ncd_core::{Candidate, LabelGroups};
use std::path::{Path, PathBuf};

/// One fingerprint file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    /// File name, used as the candidate label
    pub label: String,
    pub path: PathBuf,
}

impl CorpusEntry {
    pub fn load(&self) -> Result<Candidate> {
        Ok(Candidate::new(self.label.clone(), FreqsReader::read(&self.path)?))
    }
}

/// Flat directory of fingerprints
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<CorpusEntry>,
}

impl Corpus {
    /// List fingerprint files directly inside `dir`
    pub fn scan(dir: &Path, extension: &str) -> Result<Self> {
        let entries = list_files(dir, extension)?;
        log::info!(
            "Found {} .{} files in {}",
            entries.len(),
            extension.trim_start_matches('.'),
            dir.display()
        );
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load every entry lazily; each call starts over from the first entry
    pub fn candidates(&self) -> impl Iterator<Item = (&CorpusEntry, Result<Candidate>)> + '_ {
        self.entries.iter().map(|entry| (entry, entry.load()))
    }

    /// Load every readable entry, skipping (and logging) the rest
    pub fn load_candidates(&self) -> Vec<Candidate> {
        self.candidates()
            .filter_map(|(entry, loaded)| match loaded {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    log::warn!("Skipping {}: {}", entry.path.display(), e);
                    None
                }
            })
            .collect()
    }
}

/// Fingerprints grouped by subdirectory
#[derive(Debug, Clone, Default)]
pub struct GroupedCorpus {
    groups: Vec<(String, Vec<CorpusEntry>)>,
}

impl GroupedCorpus {
    /// List each subdirectory of `dir` as a group.
    ///
    /// With `single_member` only the first file (by name) of each group is
    /// kept. Subdirectories without matching files are dropped.
    pub fn scan(dir: &Path, extension: &str, single_member: bool) -> Result<Self> {
        let subdirs = read_sorted(dir)?
            .into_iter()
            .filter(|path| path.is_dir())
            .collect::<Vec<_>>();

        let mut groups = Vec::new();
        for subdir in subdirs {
            let Some(label) = file_name(&subdir) else {
                continue;
            };
            let mut members = list_files(&subdir, extension)?;
            if members.is_empty() {
                log::debug!("Group {} has no fingerprints, dropping it", label);
                continue;
            }
            if single_member {
                members.truncate(1);
            }
            groups.push((label, members));
        }

        log::info!(
            "Found {} groups ({} fingerprints) in {}",
            groups.len(),
            groups.iter().map(|(_, m)| m.len()).sum::<usize>(),
            dir.display()
        );
        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[(String, Vec<CorpusEntry>)] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Load every readable member, skipping (and logging) the rest
    pub fn load_groups(&self) -> LabelGroups {
        let mut label_groups = LabelGroups::new();
        for (label, members) in &self.groups {
            let loaded = members
                .iter()
                .filter_map(|entry| match entry.load() {
                    Ok(candidate) => Some(candidate),
                    Err(e) => {
                        log::warn!("Skipping {}: {}", entry.path.display(), e);
                        None
                    }
                })
                .collect();
            label_groups.insert_group(label.clone(), loaded);
        }
        label_groups
    }
}

fn read_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(FpError::NotADirectory(dir.to_path_buf()));
    }
    let io_err = |source: std::io::Error| FpError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        paths.push(entry.map_err(io_err)?.path());
    }
    paths.sort();
    Ok(paths)
}

fn list_files(dir: &Path, extension: &str) -> Result<Vec<CorpusEntry>> {
    let extension = extension.trim_start_matches('.');
    let entries = read_sorted(dir)?
        .into_iter()
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|s| s.to_str())
                .map(|ext| ext == extension)
                .unwrap_or(false)
        })
        .filter_map(|path| file_name(&path).map(|label| CorpusEntry { label, path }))
        .collect();
    Ok(entries)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}
