// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Similarity scoring between normalized strings
//!
//! Scores are indel ratios, `1 - indel_distance / (len_a + len_b)` over
//! characters, so 1.0 means identical and 0.0 means nothing in common.
//! Distances come from `rapidfuzz`; a query is wrapped in a batch
//! comparator once so sliding-window searches over a whole book reuse
//! its precomputed pattern.

use crate::text::hasher::PassageHash;
use crate::text::normalizer::normalize;
use rapidfuzz::distance::{indel, lcs_seq};
use std::collections::HashSet;
use std::fmt;

/// Indel ratio from an indel distance and the two lengths
fn indel_ratio(distance: usize, len_a: usize, len_b: usize) -> f64 {
    let total = len_a + len_b;
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }
    1.0 - distance as f64 / total as f64
}

/// A normalized query prepared for repeated scoring against many windows
pub struct PreparedQuery {
    chars: Vec<char>,
    charset: HashSet<char>,
    comparator: indel::BatchComparator<char>,
}

impl fmt::Debug for PreparedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedQuery")
            .field("query", &self.chars.iter().collect::<String>())
            .finish()
    }
}

impl PreparedQuery {
    /// Prepare already-normalized text
    pub fn new(normalized: &str) -> Self {
        let chars: Vec<char> = normalized.chars().collect();
        Self {
            charset: chars.iter().copied().collect(),
            comparator: indel::BatchComparator::new(chars.iter().copied()),
            chars,
        }
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Full-string ratio against a window of characters
    pub fn ratio_chars(&self, other: &[char]) -> f64 {
        if self.chars.is_empty() || other.is_empty() {
            return 0.0;
        }
        let distance = self.comparator.distance(other.iter().copied());
        indel_ratio(distance, self.chars.len(), other.len())
    }

    /// Full-string ratio against another normalized string
    pub fn ratio(&self, other: &str) -> f64 {
        let other: Vec<char> = other.chars().collect();
        self.ratio_chars(&other)
    }

    /// Best ratio of this query against any query-length stretch of `haystack`
    ///
    /// Stretches that are cut off at either end of the haystack are scored
    /// too, so a query hanging over the boundary can still align. A
    /// haystack shorter than the query has no such stretch and is scored
    /// as a whole.
    pub fn partial_ratio_chars(&self, haystack: &[char]) -> f64 {
        if self.chars.is_empty() || haystack.is_empty() {
            return 0.0;
        }
        if haystack.len() < self.chars.len() {
            return self.ratio_chars(haystack);
        }

        let m = self.chars.len();
        let n = haystack.len();
        let mut best = 0.0f64;

        for k in 1..m {
            let head = &haystack[..k];
            let tail = &haystack[n - k..];
            if self.charset.contains(&head[k - 1]) {
                best = best.max(self.ratio_chars(head));
            }
            if self.charset.contains(&tail[0]) {
                best = best.max(self.ratio_chars(tail));
            }
            if best >= 1.0 {
                return 1.0;
            }
        }

        for start in 0..=n - m {
            // a window opening on a character absent from the query scores no
            // better than the window one step to the right
            if start < n - m && !self.charset.contains(&haystack[start]) {
                continue;
            }
            best = best.max(self.ratio_chars(&haystack[start..start + m]));
            if best >= 1.0 {
                return 1.0;
            }
        }

        best
    }

    /// Partial ratio against a normalized string
    pub fn partial_ratio(&self, haystack: &str) -> f64 {
        let haystack: Vec<char> = haystack.chars().collect();
        self.partial_ratio_chars(&haystack)
    }
}

/// Normalized text split into words, with character spans per word
#[derive(Debug, Clone)]
pub struct PreparedText {
    normalized: String,
    fingerprint: PassageHash,
    chars: Vec<char>,
    spans: Vec<(usize, usize)>,
}

impl PreparedText {
    /// Prepare text that is already normalized
    pub fn new(normalized: String) -> Self {
        let chars: Vec<char> = normalized.chars().collect();
        let mut spans = Vec::new();
        let mut start = None;
        for (i, c) in chars.iter().enumerate() {
            match (c.is_whitespace(), start) {
                (false, None) => start = Some(i),
                (true, Some(s)) => {
                    spans.push((s, i));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            spans.push((s, chars.len()));
        }

        Self {
            fingerprint: PassageHash::of_normalized(&normalized),
            normalized,
            chars,
            spans,
        }
    }

    /// Normalize raw text and prepare it
    pub fn from_raw(text: &str) -> Self {
        Self::new(normalize(text))
    }

    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Hash of the normalized text
    pub fn fingerprint(&self) -> &PassageHash {
        &self.fingerprint
    }

    pub fn char_len(&self) -> usize {
        self.chars.len()
    }

    pub fn word_count(&self) -> usize {
        self.spans.len()
    }

    /// Characters covering words `from..to` (clamped to the text)
    pub fn words_span(&self, from: usize, to: usize) -> &[char] {
        let to = to.min(self.spans.len());
        if from >= to {
            return &[];
        }
        &self.chars[self.spans[from].0..self.spans[to - 1].1]
    }
}

/// Indel ratio of two normalized strings
pub fn ratio(a: &str, b: &str) -> f64 {
    PreparedQuery::new(a).ratio(b)
}

/// Best local-alignment ratio of the shorter string inside the longer one
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    PreparedQuery::new(short).partial_ratio(long)
}

/// Length of the longest common character subsequence
pub fn lcs_len(a: &str, b: &str) -> usize {
    lcs_seq::similarity(a.chars(), b.chars())
}

/// Similarity of two raw strings after normalization, in [0, 1]
///
/// Identical normalized strings score 1.0; if either side normalizes to
/// the empty string the score is 0.0.
pub fn score_match(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    ratio(&a, &b)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plain dynamic-programming LCS used to cross-check the library one
    fn lcs_reference(a: &str, b: &str) -> usize {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let mut prev = vec![0usize; b.len() + 1];
        for i in 1..=a.len() {
            let mut row = vec![0usize; b.len() + 1];
            for j in 1..=b.len() {
                row[j] = if a[i - 1] == b[j - 1] {
                    prev[j - 1] + 1
                } else {
                    row[j - 1].max(prev[j])
                };
            }
            prev = row;
        }
        prev[b.len()]
    }

    #[test]
    fn test_lcs_small() {
        assert_eq!(lcs_len("kitten", "sitting"), 4);
        assert_eq!(lcs_len("", "abc"), 0);
        assert_eq!(lcs_len("abc", "abc"), 3);
    }

    #[test]
    fn test_lcs_multi_block_matches_reference() {
        let a = "ua hele au i ka hale o ka mea nona ka ai a laila hoi mai au i ke kahakai \
                 me ka hauoli nui loa no ka mea ua ike au i na hoaloha a pau";
        let b = "ua hiki au i ka hale o ka mea nona ka ai a laila hoi hou au i ke kahakai \
                 me ka hauoli nui no ka mea ua ike ia i na hoa a pau loa";
        assert!(a.chars().count() > 128);
        assert_eq!(lcs_len(a, b), lcs_reference(a, b));
        assert_eq!(lcs_len(b, a), lcs_reference(b, a));
    }

    #[test]
    fn test_lcs_non_ascii() {
        let a = "ʻōlelo hawaiʻi";
        let b = "olelo hawaii";
        assert_eq!(lcs_len(a, b), lcs_reference(a, b));
    }

    #[test]
    fn test_ratio_identical_and_disjoint() {
        assert_eq!(ratio("aloha", "aloha"), 1.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
        assert_eq!(ratio("", ""), 0.0);
    }

    #[test]
    fn test_ratio_value() {
        // lcs("kitten", "sitting") = 4 -> 8 / 13
        assert!((ratio("kitten", "sitting") - 8.0 / 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_ratio_substring_is_perfect() {
        assert_eq!(partial_ratio("ka hale", "ua hele au i ka hale o ka mea"), 1.0);
        assert_eq!(partial_ratio("ua hele au i ka hale o ka mea", "ka hale"), 1.0);
    }

    #[test]
    fn test_partial_ratio_one_word_changed() {
        let score = partial_ratio(
            "ua hiki au i ka hale o ka mea nona ka ai",
            "a laila ua hele au i ka hale o ka mea nona ka ai i ka po",
        );
        assert!(score > 0.85, "score = {}", score);
        assert!(score < 1.0);
    }

    #[test]
    fn test_partial_ratio_edge_overhang() {
        // query hangs off the end of the haystack
        let score = partial_ratio("kahakai nui", "hoi mai au i ke kahakai");
        assert!(score > 0.7, "score = {}", score);
    }

    #[test]
    fn test_partial_ratio_empty() {
        assert_eq!(partial_ratio("", "aloha"), 0.0);
        assert_eq!(partial_ratio("aloha", ""), 0.0);
    }

    #[test]
    fn test_score_match_normalizes() {
        assert_eq!(score_match("Aloha, Kakahiaka!", "aloha kakahiaka"), 1.0);
        assert_eq!(score_match("...", "aloha"), 0.0);
        let s = score_match("the quick brown fox", "ka moana nui");
        assert!((0.0..0.85).contains(&s));
    }

    #[test]
    fn test_prepared_text_spans() {
        let text = PreparedText::from_raw("Ua hele au, i ka hale!");
        assert_eq!(text.as_str(), "ua hele au i ka hale");
        assert_eq!(text.word_count(), 6);
        let span: String = text.words_span(1, 3).iter().collect();
        assert_eq!(span, "hele au");
        let clamped: String = text.words_span(4, 99).iter().collect();
        assert_eq!(clamped, "ka hale");
        assert!(text.words_span(3, 3).is_empty());
    }

    #[test]
    fn test_ratio_matches_lcs_definition() {
        let a = "ua hele au i ka hale o ka mea nona ka ai";
        let b = "ua hiki au i ka hale o ka mea nona ka ai";
        let expected = 2.0 * lcs_reference(a, b) as f64 / (a.len() + b.len()) as f64;
        assert!((ratio(a, b) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_partial_ratio_short_haystack_scored_whole() {
        // the haystack is too short to contain the query anywhere
        let query = PreparedQuery::new("ua hele au i ka");
        let haystack: Vec<char> = "hele".chars().collect();
        let score = query.partial_ratio_chars(&haystack);
        assert!((score - 8.0 / 19.0).abs() < 1e-12, "score = {}", score);
    }

    #[test]
    fn test_prepared_query_reuse() {
        let query = PreparedQuery::new("ka hale");
        assert_eq!(query.len(), 7);
        assert_eq!(query.ratio("ka hale"), 1.0);
        assert!(query.ratio("ka hele") < 1.0);
    }
}
