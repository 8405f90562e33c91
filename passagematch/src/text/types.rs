// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
// Type definitions for passage matching components

use crate::text::errors::{MatchError, Result};
use serde::{Deserialize, Serialize};

/// A scored corpus position produced by an n-gram index lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Identifier of the indexed text the position belongs to
    pub text_id: String,
    /// Word position where the query is expected to start
    pub position: usize,
    /// Sum of the sizes of the n-grams that voted for this position
    pub score: usize,
}

/// The engine's answer for one (passage, corpus) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchVerdict {
    /// Whether the best score reached the threshold
    pub found: bool,
    /// Best similarity seen, in [0, 1]
    pub score: f64,
}

impl MatchVerdict {
    /// Verdict used for degenerate input (empty passage, passage longer than corpus)
    pub const NOT_FOUND: MatchVerdict = MatchVerdict {
        found: false,
        score: 0.0,
    };

    /// Exact containment after normalization
    pub const EXACT: MatchVerdict = MatchVerdict {
        found: true,
        score: 1.0,
    };

    /// Compare a best score against a threshold
    pub fn from_score(score: f64, threshold: f64) -> Self {
        Self {
            found: score >= threshold,
            score,
        }
    }
}

/// Eviction policy of the normalization memo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CachePolicy {
    /// Never evict; fine for a single book's worth of passages
    Unbounded,
    /// Least-recently-used eviction with a fixed capacity
    Lru { capacity: usize },
    /// No memoization
    Disabled,
}

impl Default for CachePolicy {
    fn default() -> Self {
        CachePolicy::Lru { capacity: 1000 }
    }
}

/// Matcher configuration
///
/// Every tuned constant of the search lives here so callers can adjust
/// them without touching the scoring code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Minimum similarity for a passage to count as found
    pub threshold: f64,
    /// Stop searching once a score at or above this is seen
    pub early_termination: f64,
    /// Normalized passages shorter than this (in chars) use partial-ratio scoring
    pub short_passage_chars: usize,
    /// Largest n-gram size stored in the index
    pub index_order: usize,
    /// Fraction of query words a candidate's vote total must reach
    pub min_overlap: f64,
    /// Upper bound on candidates returned by an index lookup
    pub max_candidates: usize,
    /// How many of the top candidates get a detailed score
    pub candidates_to_score: usize,
    /// Words of padding on each side of a candidate window
    pub window_margin: usize,
    /// Corpora shorter than this (in chars) are searched without an index
    pub index_min_corpus_chars: usize,
    /// Fraction of the threshold that triggers local refinement in window scans
    pub refine_ratio: f64,
    /// Sliding window step is `max(1, window / step_divisor)`
    pub step_divisor: usize,
    /// Normalization memo policy
    pub cache: CachePolicy,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            early_termination: 0.95,
            short_passage_chars: 50,
            index_order: 5,
            min_overlap: 0.5,
            max_candidates: 100,
            candidates_to_score: 20,
            window_margin: 5,
            index_min_corpus_chars: 10_000,
            refine_ratio: 0.9,
            step_divisor: 10,
            cache: CachePolicy::default(),
        }
    }
}

impl MatcherConfig {
    /// Create with a custom threshold
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Default::default()
        }
    }

    /// Whether a corpus of `corpus_chars` characters justifies building an index
    pub fn index_worth_it(&self, corpus_chars: usize) -> bool {
        corpus_chars > self.index_min_corpus_chars
    }

    /// Check that every field is in range
    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(MatchError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )))
            }
        };
        unit("threshold", self.threshold)?;
        unit("early_termination", self.early_termination)?;
        unit("min_overlap", self.min_overlap)?;
        unit("refine_ratio", self.refine_ratio)?;

        if self.index_order == 0 {
            return Err(MatchError::InvalidConfig(
                "index_order must be greater than 0".to_string(),
            ));
        }
        if self.step_divisor == 0 {
            return Err(MatchError::InvalidConfig(
                "step_divisor must be greater than 0".to_string(),
            ));
        }
        if self.max_candidates == 0 || self.candidates_to_score == 0 {
            return Err(MatchError::InvalidConfig(
                "candidate limits must be greater than 0".to_string(),
            ));
        }
        if let CachePolicy::Lru { capacity: 0 } = self.cache {
            return Err(MatchError::InvalidConfig(
                "LRU cache capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
