//! Nearest-match and label-aggregation search over a reference corpus
//!
//! Both searches scan every candidate. Distances may be computed in parallel,
//! but they are always collected in candidate order and reduced
//! sequentially, so the outcome never depends on thread scheduling.

use crate::compressor::Compressor;
use crate::engine::NcdEngine;
use crate::error::{NcdError, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;


/// One reference fingerprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Opaque identifier (typically the file name)
    pub label: String,
    pub data: Vec<u8>,
}

impl Candidate {
    pub fn new(label: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            data,
        }
    }
}

/// Candidates partitioned by a categorical tag (e.g. genre).
///
/// Labels are kept in lexicographic order regardless of insertion order.
#[derive(Debug, Clone, Default)]
pub struct LabelGroups {
    groups: BTreeMap<String, Vec<Candidate>>,
}

impl LabelGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one member to `label`, creating the group if needed
    pub fn insert(&mut self, label: impl Into<String>, member: Candidate) {
        self.groups.entry(label.into()).or_default().push(member);
    }

    /// Add several members to `label`; an empty `members` still registers the group
    pub fn insert_group(&mut self, label: impl Into<String>, members: Vec<Candidate>) {
        self.groups.entry(label.into()).or_default().extend(members);
    }

    pub fn get(&self, label: &str) -> Option<&[Candidate]> {
        self.groups.get(label).map(Vec::as_slice)
    }

    /// Groups in canonical label order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Candidate])> {
        self.groups.iter().map(|(label, members)| (label.as_str(), members.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total members across all groups
    pub fn member_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

impl<L: Into<String>> FromIterator<(L, Candidate)> for LabelGroups {
    fn from_iter<I: IntoIterator<Item = (L, Candidate)>>(iter: I) -> Self {
        let mut groups = LabelGroups::new();
        for (label, member) in iter {
            groups.insert(label, member);
        }
        groups
    }
}

/// Result of a nearest-match scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub label: String,
    pub distance: f64,
    /// Position of the candidate in the scanned set
    pub index: usize,
}

/// Result of a label-aggregation scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelMatch {
    pub label: String,
    pub mean_distance: f64,
    /// Members the mean was computed over
    pub members: usize,
}

impl LabelMatch {
    /// `1 - mean_distance`.
    ///
    /// A heuristic score, not a probability: it drops below zero when the
    /// mean distance exceeds 1.
    pub fn confidence(&self) -> f64 {
        1.0 - self.mean_distance
    }
}

/// Similarity search driven by one compressor backend.
///
/// Strict by default: a compression failure on any candidate fails the whole
/// scan. With [`skip_failures`](Self::skip_failures) a failing candidate is
/// logged and left out instead; the query itself failing is always an error.
#[derive(Debug, Clone, Copy)]
pub struct Search<'c> {
    engine: NcdEngine<'c>,
    parallel: bool,
    skip_failures: bool,
}

impl<'c> Search<'c> {
    pub fn new(compressor: &'c dyn Compressor) -> Self {
        Self {
            engine: NcdEngine::new(compressor),
            parallel: false,
            skip_failures: false,
        }
    }

    /// Compute candidate distances on the rayon pool
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Leave out candidates that fail to compress instead of failing the scan
    pub fn skip_failures(mut self, skip: bool) -> Self {
        self.skip_failures = skip;
        self
    }

    pub fn engine(&self) -> &NcdEngine<'c> {
        &self.engine
    }

    /// Distance from `query` to every candidate, in candidate order.
    ///
    /// `None` marks a candidate skipped after a compression failure, which
    /// only happens with `skip_failures`. Otherwise any failure aborts the
    /// whole scan.
    pub fn distances(&self, query: &[u8], candidates: &[Candidate]) -> Result<Vec<Option<f64>>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let query_size = self.engine.compressed_size(query)?;
        self.measure_all(query, query_size, candidates)
    }

    /// Candidate with the smallest distance to `query`.
    ///
    /// Ties keep the earliest candidate.
    pub fn best_match(&self, query: &[u8], candidates: &[Candidate]) -> Result<Match> {
        let scored = self.scored(query, candidates)?;
        let (index, distance) = argmin(&scored).ok_or(NcdError::EmptyCandidateSet)?;

        Ok(Match {
            label: candidates[index].label.clone(),
            distance,
            index,
        })
    }

    /// Every candidate, closest first; ties stay in candidate order
    pub fn rank(&self, query: &[u8], candidates: &[Candidate]) -> Result<Vec<Match>> {
        let mut ranked: Vec<Match> = self
            .scored(query, candidates)?
            .into_iter()
            .map(|(index, distance)| Match {
                label: candidates[index].label.clone(),
                distance,
                index,
            })
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(ranked)
    }

    /// Label whose members have the smallest mean distance to `query`.
    ///
    /// Empty groups are skipped, as are groups whose members were all
    /// skipped. Ties keep the lexicographically first label.
    pub fn best_label(&self, query: &[u8], groups: &LabelGroups) -> Result<LabelMatch> {
        if groups.member_count() == 0 {
            return Err(NcdError::EmptyCandidateSet);
        }

        let query_size = self.engine.compressed_size(query)?;
        let mut best: Option<LabelMatch> = None;

        for (label, members) in groups.iter() {
            if members.is_empty() {
                log::debug!("Skipping empty group {}", label);
                continue;
            }

            let distances: Vec<f64> = self
                .measure_all(query, query_size, members)?
                .into_iter()
                .flatten()
                .collect();
            if distances.is_empty() {
                log::warn!("Skipping group {}: no member could be compared", label);
                continue;
            }

            let mean_distance = distances.iter().sum::<f64>() / distances.len() as f64;
            log::debug!(
                "Group {}: mean NCD = {:.6} over {} members",
                label,
                mean_distance,
                distances.len()
            );

            let better = best
                .as_ref()
                .map_or(true, |current| mean_distance < current.mean_distance);
            if better {
                best = Some(LabelMatch {
                    label: label.to_string(),
                    mean_distance,
                    members: distances.len(),
                });
            }
        }

        best.ok_or_else(|| self.nothing_compared(groups.member_count()))
    }

    /// (index, distance) of every candidate that could be compared
    fn scored(&self, query: &[u8], candidates: &[Candidate]) -> Result<Vec<(usize, f64)>> {
        if candidates.is_empty() {
            return Err(NcdError::EmptyCandidateSet);
        }

        let scored: Vec<(usize, f64)> = self
            .distances(query, candidates)?
            .into_iter()
            .enumerate()
            .filter_map(|(index, distance)| distance.map(|d| (index, d)))
            .collect();
        if scored.is_empty() {
            return Err(self.nothing_compared(candidates.len()));
        }
        Ok(scored)
    }

    fn measure_all(
        &self,
        query: &[u8],
        query_size: usize,
        candidates: &[Candidate],
    ) -> Result<Vec<Option<f64>>> {
        let measure = |candidate: &Candidate| -> Result<Option<f64>> {
            match self.engine.measure_with_size(query, query_size, &candidate.data) {
                Ok(m) => {
                    log::debug!(
                        "{}: NCD = {:.6} (C(q)={}, C(c)={}, C(qc)={})",
                        candidate.label,
                        m.distance,
                        m.size_x,
                        m.size_y,
                        m.size_xy
                    );
                    Ok(Some(m.distance))
                }
                Err(e @ NcdError::CompressionFailure { .. }) if self.skip_failures => {
                    log::warn!("Skipping candidate {}: {}", candidate.label, e);
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        };

        if self.parallel {
            candidates.par_iter().map(measure).collect()
        } else {
            candidates.iter().map(measure).collect()
        }
    }

    fn nothing_compared(&self, candidates: usize) -> NcdError {
        NcdError::compression(
            self.engine.compressor().name(),
            format!("all {} candidates failed to compress", candidates),
        )
    }
}

/// Entry with the smallest distance; the first one wins ties
fn argmin(scored: &[(usize, f64)]) -> Option<(usize, f64)> {
    scored.iter().copied().fold(None, |best, (index, value)| match best {
        Some((_, current)) if value >= current => best,
        _ => Some((index, value)),
    })
}
