// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
// Word n-gram inverted index for approximate passage lookup

use crate::text::hasher::PassageHash;
use crate::text::normalizer::normalize;
use crate::text::types::Candidate;
use std::collections::HashMap;
use std::time::Instant;

/// Default largest n-gram size
pub const DEFAULT_ORDER: usize = 5;

/// Default bound on candidates returned per lookup
pub const DEFAULT_TOP_K: usize = 100;

/// One occurrence of an n-gram in an indexed text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Posting {
    /// Index into `NGramIndex::texts`
    text: usize,
    /// Word position the n-gram starts at
    position: usize,
    /// Number of words in the n-gram
    size: usize,
}

#[derive(Debug, Clone)]
struct IndexedText {
    id: String,
    /// Hash of the normalized text, identifying the corpus it was built from
    fingerprint: PassageHash,
    words: Vec<String>,
}

/// Inverted index from word n-grams (sizes 1..=n) to their occurrences
///
/// Built eagerly from whole corpora and never updated incrementally; a
/// changed corpus means a new index.
#[derive(Debug, Clone)]
pub struct NGramIndex {
    /// Largest n-gram size (5 by default)
    n: usize,
    /// Bound on candidates returned by a lookup
    top_k: usize,
    /// Mapping from n-gram to its occurrences
    ngram_to_postings: HashMap<String, Vec<Posting>>,
    /// Indexed texts in build order
    texts: Vec<IndexedText>,
}

impl NGramIndex {
    /// Create an index of order 5
    pub fn new() -> Self {
        Self::with_order(DEFAULT_ORDER)
    }

    /// Create an index with a specific largest n-gram size
    pub fn with_order(n: usize) -> Self {
        assert!(n > 0, "n must be greater than 0");
        Self {
            n,
            top_k: DEFAULT_TOP_K,
            ngram_to_postings: HashMap::new(),
            texts: Vec::new(),
        }
    }

    /// Set how many candidates a lookup may return
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Build an index of order `n` over a single corpus registered as `"main"`
    pub fn from_corpus(corpus_text: &str, n: usize) -> Self {
        let mut index = Self::with_order(n);
        index.build(corpus_text, "main");
        index
    }

    /// Index every n-gram of sizes 1..=n at every word position of the corpus
    ///
    /// Building an id that is already present replaces its postings.
    pub fn build(&mut self, corpus_text: &str, text_id: &str) {
        let started = Instant::now();
        let normalized = normalize(corpus_text);
        let words: Vec<String> = normalized.split_whitespace().map(str::to_string).collect();

        let text = match self.texts.iter().position(|t| t.id == text_id) {
            Some(existing) => {
                self.ngram_to_postings.retain(|_, postings| {
                    postings.retain(|p| p.text != existing);
                    !postings.is_empty()
                });
                existing
            }
            None => {
                self.texts.push(IndexedText {
                    id: text_id.to_string(),
                    fingerprint: PassageHash::of_normalized(""),
                    words: Vec::new(),
                });
                self.texts.len() - 1
            }
        };

        for position in 0..words.len() {
            for size in 1..=self.n {
                if position + size > words.len() {
                    break;
                }
                let ngram = words[position..position + size].join(" ");
                self.ngram_to_postings
                    .entry(ngram)
                    .or_default()
                    .push(Posting {
                        text,
                        position,
                        size,
                    });
            }
        }

        log::debug!(
            "Indexed text '{}': {} words, {} distinct n-grams in {:?}",
            text_id,
            words.len(),
            self.ngram_to_postings.len(),
            started.elapsed()
        );
        self.texts[text].fingerprint = PassageHash::of_normalized(&normalized);
        self.texts[text].words = words;
    }

    /// Find corpus positions where the query plausibly starts
    ///
    /// Every query n-gram (sizes 1..=n) found in the index votes, with its
    /// size as weight, for the position at which the query would have to
    /// start for that n-gram to line up. Positions whose total is below
    /// `min_overlap * query_words` are dropped. Results are ordered by score
    /// descending, then by text build order and position ascending, and
    /// truncated to the index's top-k.
    pub fn find_candidates(&self, query: &str, min_overlap: f64) -> Vec<Candidate> {
        let normalized = normalize(query);
        let query_words: Vec<&str> = normalized.split_whitespace().collect();
        if query_words.is_empty() {
            return Vec::new();
        }

        let mut scores: HashMap<(usize, usize), usize> = HashMap::new();
        for offset in 0..query_words.len() {
            for size in 1..=self.n.min(query_words.len() - offset) {
                let ngram = query_words[offset..offset + size].join(" ");
                let Some(postings) = self.ngram_to_postings.get(&ngram) else {
                    continue;
                };
                for posting in postings {
                    if self.texts[posting.text].words.len() < query_words.len() {
                        continue;
                    }
                    let start = posting.position.saturating_sub(offset);
                    *scores.entry((posting.text, start)).or_insert(0) += posting.size;
                }
            }
        }

        let min_score = query_words.len() as f64 * min_overlap;
        let mut ranked: Vec<((usize, usize), usize)> = scores
            .into_iter()
            .filter(|(_, score)| *score as f64 >= min_score)
            .collect();
        ranked.sort_by(|(a_key, a_score), (b_key, b_score)| {
            b_score.cmp(a_score).then_with(|| a_key.cmp(b_key))
        });
        ranked.truncate(self.top_k);

        ranked
            .into_iter()
            .map(|((text, position), score)| Candidate {
                text_id: self.texts[text].id.clone(),
                position,
                score,
            })
            .collect()
    }

    /// Normalized words of an indexed text
    pub fn words(&self, text_id: &str) -> Option<&[String]> {
        self.texts
            .iter()
            .find(|t| t.id == text_id)
            .map(|t| t.words.as_slice())
    }

    /// Id of the indexed text whose normalized form is `normalized`, if any
    pub fn text_id_for(&self, normalized: &str) -> Option<&str> {
        let fingerprint = PassageHash::of_normalized(normalized);
        self.text_id_for_hash(&fingerprint)
    }

    pub(crate) fn text_id_for_hash(&self, fingerprint: &PassageHash) -> Option<&str> {
        self.texts
            .iter()
            .find(|t| t.fingerprint == *fingerprint)
            .map(|t| t.id.as_str())
    }

    /// Number of indexed texts
    pub fn text_count(&self) -> usize {
        self.texts.len()
    }

    /// Number of distinct n-grams
    pub fn ngram_count(&self) -> usize {
        self.ngram_to_postings.len()
    }

    /// Total number of occurrence records
    pub fn posting_count(&self) -> usize {
        self.ngram_to_postings.values().map(Vec::len).sum()
    }

    /// Get n value
    pub fn order(&self) -> usize {
        self.n
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Whether the index holds the n-gram (given in normalized form)
    pub fn contains(&self, ngram: &str) -> bool {
        self.ngram_to_postings.contains_key(ngram)
    }
}

impl Default for NGramIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = "Ua hele au i ka hale o ka mea nona ka ai. \
                          A laila, hoi mai au i ke kahakai.";

    #[test]
    fn test_create_index() {
        let index = NGramIndex::new();
        assert_eq!(index.order(), 5);
        assert_eq!(index.text_count(), 0);
        assert_eq!(index.top_k(), 100);
    }

    #[test]
    #[should_panic(expected = "n must be greater than 0")]
    fn test_zero_order_panics() {
        NGramIndex::with_order(0);
    }

    #[test]
    fn test_every_ngram_indexed() {
        let index = NGramIndex::from_corpus("a b c", 2);
        for ngram in ["a", "b", "c", "a b", "b c"] {
            assert!(index.contains(ngram), "missing {}", ngram);
        }
        assert!(!index.contains("a b c"));
        assert_eq!(index.posting_count(), 5);
    }

    #[test]
    fn test_build_normalizes() {
        let index = NGramIndex::from_corpus("Aloha, KAKAHIAKA!", 2);
        assert!(index.contains("aloha kakahiaka"));
        assert_eq!(
            index.words("main").unwrap(),
            &["aloha".to_string(), "kakahiaka".to_string()]
        );
    }

    #[test]
    fn test_exact_occurrence_ranked_first() {
        let index = NGramIndex::from_corpus(CORPUS, 5);
        let candidates = index.find_candidates("i ka hale o ka mea", 0.5);
        assert!(!candidates.is_empty());
        assert_eq!(candidates[0].position, 3);
        assert_eq!(candidates[0].text_id, "main");
    }

    #[test]
    fn test_fuzzy_occurrence_found() {
        let index = NGramIndex::from_corpus(CORPUS, 5);
        let candidates = index.find_candidates("ua hiki au i ka hale o ka mea nona ka ai", 0.5);
        assert!(!candidates.is_empty());
        assert_eq!(candidates[0].position, 0);
    }

    #[test]
    fn test_empty_query() {
        let index = NGramIndex::from_corpus(CORPUS, 5);
        assert!(index.find_candidates("", 0.5).is_empty());
        assert!(index.find_candidates(" ?! ", 0.5).is_empty());
    }

    #[test]
    fn test_query_longer_than_corpus() {
        let index = NGramIndex::from_corpus("aloha kakahiaka", 5);
        assert!(index
            .find_candidates("aloha kakahiaka e ke alii", 0.1)
            .is_empty());
    }

    #[test]
    fn test_min_overlap_filters() {
        let index = NGramIndex::from_corpus(CORPUS, 5);
        // only "ka" overlaps
        let loose = index.find_candidates("ka moana nui akea", 0.1);
        let strict = index.find_candidates("ka moana nui akea", 0.9);
        assert!(!loose.is_empty());
        assert!(strict.is_empty());
    }

    #[test]
    fn test_scores_descending_and_ties_stable() {
        let index = NGramIndex::from_corpus("ka ka ka ka ka ka", 2);
        let first = index.find_candidates("ka ka", 0.5);
        let second = index.find_candidates("ka ka", 0.5);
        assert_eq!(first, second);
        for pair in first.windows(2) {
            assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                assert!(pair[0].position < pair[1].position);
            }
        }
    }

    #[test]
    fn test_top_k_truncation() {
        let corpus = vec!["ka"; 500].join(" ");
        let index = NGramIndex::from_corpus(&corpus, 1).with_top_k(10);
        assert_eq!(index.find_candidates("ka", 0.5).len(), 10);
    }

    #[test]
    fn test_multiple_texts() {
        let mut index = NGramIndex::with_order(3);
        index.build("he mele no ka lani", "chapter-1");
        index.build("he inoa no ka moi", "chapter-2");
        assert_eq!(index.text_count(), 2);

        let candidates = index.find_candidates("inoa no ka moi", 0.5);
        assert_eq!(candidates[0].text_id, "chapter-2");
        assert_eq!(candidates[0].position, 1);
    }

    #[test]
    fn test_rebuild_replaces_text() {
        let mut index = NGramIndex::with_order(2);
        index.build("ka lani", "main");
        index.build("ka moana", "main");
        assert_eq!(index.text_count(), 1);
        assert!(!index.contains("lani"));
        assert!(index.contains("ka moana"));
        assert_eq!(index.text_id_for("ka moana"), Some("main"));
        assert_eq!(index.text_id_for("ka lani"), None);
    }

    #[test]
    fn test_text_id_for_normalized_corpus() {
        let mut index = NGramIndex::with_order(2);
        index.build("He mele, no ka lani!", "chapter-1");
        index.build("he inoa no ka moi", "chapter-2");
        assert_eq!(index.text_id_for("he mele no ka lani"), Some("chapter-1"));
        assert_eq!(index.text_id_for("he inoa no ka moi"), Some("chapter-2"));
        assert_eq!(index.text_id_for("he inoa no ka lani"), None);
    }

    #[test]
    fn test_recall_long_passage() {
        let corpus: Vec<String> = (0..400).map(|i| format!("w{}", i)).collect();
        let corpus = corpus.join(" ");
        let passage: Vec<String> = (120..180).map(|i| format!("w{}", i)).collect();
        let index = NGramIndex::from_corpus(&corpus, 5);

        let candidates = index.find_candidates(&passage.join(" "), 0.5);
        assert_eq!(candidates[0].position, 120);
    }
}
