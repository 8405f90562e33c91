// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Text normalizer producing the canonical form every other component uses
//!
//! Normalization lowercases, deletes every character that is neither a
//! Unicode word character nor whitespace, collapses whitespace runs to a
//! single ASCII space and trims. The result can be split on `' '` to get
//! the word sequence.

use crate::text::types::CachePolicy;
use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashMap;
use std::num::NonZeroUsize;

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("invalid NON_WORD pattern"));

/// Normalize text without consulting any cache
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize an optional field; a missing value normalizes to the empty string
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// Split normalized text into words
pub fn words(normalized: &str) -> Vec<&str> {
    normalized.split_whitespace().collect()
}

enum Memo {
    Unbounded(HashMap<String, String>),
    Lru(LruCache<String, String>),
}

impl Memo {
    fn get(&mut self, key: &str) -> Option<String> {
        match self {
            Memo::Unbounded(map) => map.get(key).cloned(),
            Memo::Lru(cache) => cache.get(key).cloned(),
        }
    }

    fn put(&mut self, key: String, value: String) {
        match self {
            Memo::Unbounded(map) => {
                map.insert(key, value);
            }
            Memo::Lru(cache) => {
                cache.put(key, value);
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            Memo::Unbounded(map) => map.len(),
            Memo::Lru(cache) => cache.len(),
        }
    }

    fn clear(&mut self) {
        match self {
            Memo::Unbounded(map) => map.clear(),
            Memo::Lru(cache) => cache.clear(),
        }
    }
}

/// Normalizer owning an explicit memo keyed by the raw input string
pub struct TextNormalizer {
    policy: CachePolicy,
    memo: Option<Mutex<Memo>>,
}

impl std::fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextNormalizer")
            .field("policy", &self.policy)
            .field("cached", &self.cache_len())
            .finish()
    }
}

impl TextNormalizer {
    /// Create a normalizer with the default LRU memo
    pub fn new() -> Self {
        Self::with_policy(CachePolicy::default())
    }

    /// Create a normalizer with a specific memo policy
    pub fn with_policy(policy: CachePolicy) -> Self {
        let memo = match policy {
            CachePolicy::Unbounded => Some(Memo::Unbounded(HashMap::new())),
            CachePolicy::Lru { capacity } => NonZeroUsize::new(capacity)
                .map(|capacity| Memo::Lru(LruCache::new(capacity))),
            CachePolicy::Disabled => None,
        };

        Self {
            policy,
            memo: memo.map(Mutex::new),
        }
    }

    /// Normalize text, reusing a memoized result when present
    pub fn normalize(&self, text: &str) -> String {
        let Some(memo) = &self.memo else {
            return normalize(text);
        };

        if let Some(hit) = memo.lock().get(text) {
            return hit;
        }

        let normalized = normalize(text);
        memo.lock().put(text.to_string(), normalized.clone());
        normalized
    }

    /// Memo policy in use
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Number of memoized entries
    pub fn cache_len(&self) -> usize {
        self.memo.as_ref().map(|m| m.lock().len()).unwrap_or(0)
    }

    /// Drop all memoized entries
    pub fn clear_cache(&self) {
        if let Some(memo) = &self.memo {
            memo.lock().clear();
        }
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_punctuation_and_case() {
        assert_eq!(normalize("Aloha, nui!"), "aloha nui");
        assert_eq!(normalize("Aloha, nui!"), normalize("aloha nui"));
    }

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(normalize("  ua   hele\tau\n\ni ka hale  "), "ua hele au i ka hale");
    }

    #[test]
    fn test_empty_and_missing() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   ...  !!"), "");
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some("Mahalo.")), "mahalo");
    }

    #[test]
    fn test_hawaiian_letters_survive() {
        // okina is a modifier letter and kahakō vowels are letters
        assert_eq!(normalize("ʻŌlelo Hawaiʻi!"), "ʻōlelo hawaiʻi");
    }

    #[test]
    fn test_underscore_and_digits_are_word_chars() {
        assert_eq!(normalize("page_12, line 3."), "page_12 line 3");
    }

    #[test]
    fn test_words_split() {
        assert_eq!(words("aloha kakahiaka"), vec!["aloha", "kakahiaka"]);
        assert!(words("").is_empty());
    }

    #[test]
    fn test_memo_unbounded() {
        let normalizer = TextNormalizer::with_policy(CachePolicy::Unbounded);
        assert_eq!(normalizer.normalize("E Komo Mai!"), "e komo mai");
        assert_eq!(normalizer.normalize("E Komo Mai!"), "e komo mai");
        assert_eq!(normalizer.cache_len(), 1);
        normalizer.normalize("Mahalo");
        assert_eq!(normalizer.cache_len(), 2);
        normalizer.clear_cache();
        assert_eq!(normalizer.cache_len(), 0);
    }

    #[test]
    fn test_memo_lru_evicts() {
        let normalizer = TextNormalizer::with_policy(CachePolicy::Lru { capacity: 2 });
        normalizer.normalize("a");
        normalizer.normalize("b");
        normalizer.normalize("c");
        assert_eq!(normalizer.cache_len(), 2);
    }

    #[test]
    fn test_memo_disabled() {
        let normalizer = TextNormalizer::with_policy(CachePolicy::Disabled);
        assert_eq!(normalizer.normalize("Hale!"), "hale");
        assert_eq!(normalizer.cache_len(), 0);
    }

    proptest! {
        #[test]
        fn prop_normalize_idempotent(s in "[a-zA-Z0-9ʻāēīōūĀĒĪŌŪ ,.;:!?'\"\t\n-]{0,80}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        #[test]
        fn prop_normalized_has_no_redundant_space(s in "[a-zA-Z ,.!\t\n]{0,80}") {
            let n = normalize(&s);
            prop_assert!(!n.contains("  "));
            prop_assert!(!n.starts_with(' '));
            prop_assert!(!n.ends_with(' '));
        }
    }
}
