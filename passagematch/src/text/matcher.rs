// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Passage location: fast paths, indexed candidate scoring and fallback
//!
//! Search order for one passage:
//! 1. exact containment of the normalized passage (score 1.0)
//! 2. short passages: partial-ratio against the whole corpus
//! 3. with an index: full-ratio scoring of windows around the top candidates
//! 4. otherwise, or when the index has no candidates: sliding-window scan
//!
//! A passage with more words or characters than the corpus is never found.
//! An index is only consulted when it was built from the corpus being
//! searched. All paths report on the same [0, 1] scale.

use crate::text::ngram::NGramIndex;
use crate::text::normalizer::{normalize, TextNormalizer};
use crate::text::scorer::{PreparedQuery, PreparedText};
use crate::text::types::{Candidate, MatchVerdict, MatcherConfig};
use crate::text::window::{self, WindowParams};
use std::time::Instant;

/// How a corpus will be searched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Build an n-gram index and score its candidates
    Indexed,
    /// Scan with sliding windows only
    SlidingWindow,
}

impl SearchStrategy {
    /// Pick a strategy from the corpus size
    pub fn select(corpus_chars: usize, config: &MatcherConfig, use_index: bool) -> Self {
        if use_index && config.index_worth_it(corpus_chars) {
            SearchStrategy::Indexed
        } else {
            SearchStrategy::SlidingWindow
        }
    }
}

/// Locates passages inside corpora
#[derive(Debug)]
pub struct PassageMatcher {
    config: MatcherConfig,
    normalizer: TextNormalizer,
    deadline: Option<Instant>,
}

impl PassageMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self {
            normalizer: TextNormalizer::with_policy(config.cache),
            config,
            deadline: None,
        }
    }

    /// Stop window and candidate scoring once `deadline` has passed
    ///
    /// Verdicts computed after the deadline are incomplete; check
    /// [`is_expired`](Self::is_expired) before trusting them.
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Normalize and split a corpus once for repeated searches
    pub fn prepare_corpus(&self, corpus_text: &str) -> PreparedText {
        PreparedText::new(normalize(corpus_text))
    }

    /// Build an index for the corpus when the strategy calls for one
    pub fn build_index(&self, corpus: &PreparedText, use_index: bool) -> Option<NGramIndex> {
        match SearchStrategy::select(corpus.char_len(), &self.config, use_index) {
            SearchStrategy::Indexed => {
                let mut index = NGramIndex::with_order(self.config.index_order)
                    .with_top_k(self.config.max_candidates);
                index.build(corpus.as_str(), "main");
                Some(index)
            }
            SearchStrategy::SlidingWindow => {
                log::debug!(
                    "Corpus of {} chars searched without index",
                    corpus.char_len()
                );
                None
            }
        }
    }

    /// Decide whether `passage` occurs (approximately) in `full_text`
    pub fn find_substring_match(
        &self,
        passage: &str,
        full_text: &str,
        threshold: f64,
        index: Option<&NGramIndex>,
    ) -> MatchVerdict {
        let corpus = PreparedText::new(self.normalizer.normalize(full_text));
        self.find_in_corpus(passage, &corpus, threshold, index)
    }

    /// Same as [`find_substring_match`](Self::find_substring_match) against a prepared corpus
    pub fn find_in_corpus(
        &self,
        passage: &str,
        corpus: &PreparedText,
        threshold: f64,
        index: Option<&NGramIndex>,
    ) -> MatchVerdict {
        let passage_norm = self.normalizer.normalize(passage);
        if passage_norm.is_empty() || corpus.as_str().is_empty() {
            return MatchVerdict::NOT_FOUND;
        }

        if corpus.as_str().contains(passage_norm.as_str()) {
            return MatchVerdict::EXACT;
        }

        let query = PreparedQuery::new(&passage_norm);
        let passage_words = passage_norm.split(' ').count();
        if passage_words > corpus.word_count() || query.len() > corpus.char_len() {
            return MatchVerdict::NOT_FOUND;
        }

        if query.len() < self.config.short_passage_chars {
            let score = query.partial_ratio_chars(corpus.chars());
            return MatchVerdict::from_score(score, threshold);
        }

        let params =
            WindowParams::from_config(&self.config, threshold).with_deadline(self.deadline);

        if let Some(index) = index {
            match index.text_id_for_hash(corpus.fingerprint()) {
                Some(text_id) => {
                    let candidates: Vec<Candidate> = index
                        .find_candidates(&passage_norm, self.config.min_overlap)
                        .into_iter()
                        .filter(|c| c.text_id == text_id && c.position < corpus.word_count())
                        .collect();
                    if !candidates.is_empty() {
                        return self.score_candidates(
                            &query,
                            passage_words,
                            &candidates,
                            corpus,
                            params,
                        );
                    }
                    log::trace!("No index candidates, falling back to window scan");
                }
                None => log::debug!("Index was not built from this corpus, ignoring it"),
            }
        }

        window::scan(&query, passage_words, corpus, params)
    }

    /// Score windows around the best index candidates
    ///
    /// Each candidate is scored with passage-length windows shifted up to
    /// `window_margin` words either side of the candidate start, which
    /// absorbs small misalignments of the vote. Windows always come from
    /// the searched corpus.
    fn score_candidates(
        &self,
        query: &PreparedQuery,
        passage_words: usize,
        candidates: &[Candidate],
        corpus: &PreparedText,
        params: WindowParams,
    ) -> MatchVerdict {
        let margin = self.config.window_margin;
        let mut best = 0.0f64;

        for candidate in candidates.iter().take(self.config.candidates_to_score) {
            if params.expired() {
                log::debug!("Candidate scoring abandoned at word {}", candidate.position);
                break;
            }
            let from = candidate.position.saturating_sub(margin);
            let to = candidate.position + margin;

            for start in from..=to {
                if start >= corpus.word_count() {
                    break;
                }
                let score = query.ratio_chars(corpus.words_span(start, start + passage_words));
                best = best.max(score);

                if best >= self.config.early_termination {
                    log::trace!(
                        "Candidate at word {} reached {:.3}, stopping early",
                        start,
                        best
                    );
                    return MatchVerdict::from_score(best, params.threshold);
                }
            }
        }

        MatchVerdict::from_score(best, params.threshold)
    }
}

impl Default for PassageMatcher {
    fn default() -> Self {
        Self::new(MatcherConfig::default())
    }
}
