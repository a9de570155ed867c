//! Positional byte-match scoring
//!
//! A cheap alternative to NCD: compare query and reference window by window
//! at the same offsets and count equal bytes. Only whole windows of the
//! shorter buffer are scored, trailing bytes are ignored.

use crate::search::Candidate;
use serde::Serialize;

pub const DEFAULT_WINDOW_SIZE: usize = 4;

/// Score of one reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowScore {
    pub label: String,
    pub score: usize,
}

/// Number of equal bytes at equal offsets over the whole windows shared by
/// both buffers. A `window_size` of 0 scores nothing.
pub fn window_match_score(query: &[u8], reference: &[u8], window_size: usize) -> usize {
    if window_size == 0 {
        return 0;
    }
    let windows = query.len().min(reference.len()) / window_size;
    let span = windows * window_size;

    query[..span]
        .iter()
        .zip(&reference[..span])
        .filter(|(a, b)| a == b)
        .count()
}

/// Every candidate by descending score; ties stay in candidate order
pub fn rank_by_window_score(
    query: &[u8],
    candidates: &[Candidate],
    window_size: usize,
) -> Vec<WindowScore> {
    let mut scores: Vec<WindowScore> = candidates
        .iter()
        .map(|candidate| WindowScore {
            label: candidate.label.clone(),
            score: window_match_score(query, &candidate.data, window_size),
        })
        .collect();

    scores.sort_by(|a, b| b.score.cmp(&a.score));
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_buffers_score_every_byte() {
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(window_match_score(&data, &data, 4), 8);
    }

    #[test]
    fn test_partial_window_is_ignored() {
        // 10 shared bytes, only two full windows of 4
        let data = [9u8; 10];
        assert_eq!(window_match_score(&data, &data, 4), 8);
        assert_eq!(window_match_score(&data, &data[..3], 4), 0);
    }

    #[test]
    fn test_offsets_must_line_up() {
        let query = [1u8, 2, 3, 4];
        let shifted = [0u8, 1, 2, 3];
        assert_eq!(window_match_score(&query, &shifted, 4), 0);
        assert_eq!(window_match_score(&query, &[1, 0, 3, 0], 2), 2);
    }

    #[test]
    fn test_zero_window() {
        assert_eq!(window_match_score(b"abcd", b"abcd", 0), 0);
    }

    #[test]
    fn test_ranking() {
        let candidates = vec![
            Candidate::new("none.freqs", vec![0; 8]),
            Candidate::new("half.freqs", vec![1, 2, 3, 4, 0, 0, 0, 0]),
            Candidate::new("full.freqs", vec![1, 2, 3, 4, 5, 6, 7, 8]),
            Candidate::new("half_too.freqs", vec![0, 0, 0, 0, 5, 6, 7, 8]),
        ];
        let ranked = rank_by_window_score(&[1, 2, 3, 4, 5, 6, 7, 8], &candidates, DEFAULT_WINDOW_SIZE);

        let labels: Vec<_> = ranked.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["full.freqs", "half.freqs", "half_too.freqs", "none.freqs"]);
        assert_eq!(ranked[0].score, 8);
        assert_eq!(ranked[3].score, 0);
    }
}
