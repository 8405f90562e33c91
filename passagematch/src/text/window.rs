// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Sliding-window fallback search
//!
//! Used when the corpus is too small to be worth indexing or when an
//! index lookup produced no candidates.

use crate::text::scorer::{PreparedQuery, PreparedText};
use crate::text::types::{MatchVerdict, MatcherConfig};
use std::time::Instant;

/// Tunables of the windowed scan
#[derive(Debug, Clone, Copy)]
pub struct WindowParams {
    pub threshold: f64,
    pub early_termination: f64,
    /// Refine around a step scoring above `threshold * refine_ratio`
    pub refine_ratio: f64,
    /// Step is `max(1, window / step_divisor)`
    pub step_divisor: usize,
    /// Abandon the scan once this instant has passed
    pub deadline: Option<Instant>,
}

impl WindowParams {
    pub fn from_config(config: &MatcherConfig, threshold: f64) -> Self {
        Self {
            threshold,
            early_termination: config.early_termination,
            refine_ratio: config.refine_ratio,
            step_divisor: config.step_divisor.max(1),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Whether the deadline, if any, has passed
    pub fn expired(&self) -> bool {
        self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }
}

/// Scan a normalized corpus with passage-sized word windows
pub fn sliding_window_match(
    passage_norm: &str,
    corpus_norm: &str,
    threshold: f64,
    early_termination: f64,
) -> MatchVerdict {
    let params = WindowParams {
        threshold,
        early_termination,
        ..WindowParams::from_config(&MatcherConfig::default(), threshold)
    };
    let query = PreparedQuery::new(passage_norm);
    let passage_words = passage_norm.split_whitespace().count();
    scan(&query, passage_words, &PreparedText::new(corpus_norm.to_string()), params)
}

/// Windowed scan over a prepared corpus
///
/// Steps through the corpus `max(1, window / step_divisor)` words at a
/// time. A step scoring above the refinement trigger also scores the
/// offsets the coarse step skipped on either side. Returns as soon as any
/// window reaches the early-termination score. Past the deadline the scan
/// stops and reports the best score seen so far; callers that set a
/// deadline must treat such a verdict as incomplete.
pub fn scan(
    query: &PreparedQuery,
    passage_words: usize,
    corpus: &PreparedText,
    params: WindowParams,
) -> MatchVerdict {
    let corpus_words = corpus.word_count();
    if passage_words == 0 || passage_words > corpus_words {
        return MatchVerdict::NOT_FOUND;
    }

    let window = passage_words;
    let step = (window / params.step_divisor.max(1)).max(1);
    let last_start = corpus_words - window;
    let refine_at = params.threshold * params.refine_ratio;
    let score_at = |start: usize| query.ratio_chars(corpus.words_span(start, start + window));

    let mut best = 0.0f64;
    let mut start = 0;
    while start <= last_start {
        if params.expired() {
            log::debug!("Window scan abandoned at word {} of {}", start, corpus_words);
            break;
        }
        let score = score_at(start);
        best = best.max(score);

        if step > 1 && score > refine_at {
            let from = start.saturating_sub(step - 1);
            let to = (start + step - 1).min(last_start);
            for nearby in (from..=to).filter(|&j| j != start) {
                best = best.max(score_at(nearby));
                if best >= params.early_termination {
                    break;
                }
            }
        }

        if best >= params.early_termination {
            log::trace!("Window scan terminated early at word {} ({:.3})", start, best);
            return MatchVerdict::from_score(best, params.threshold);
        }
        start += step;
    }

    MatchVerdict::from_score(best, params.threshold)
}
