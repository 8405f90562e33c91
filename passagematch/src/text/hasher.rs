// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Content hashing of normalized passages for duplicate detection

use crate::text::normalizer::{normalize, TextNormalizer};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use xxhash_rust::xxh3::xxh3_128;

/// 128-bit digest of a passage's normalized text
///
/// Used purely as an equality key; collisions are an accepted risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PassageHash(u128);

impl PassageHash {
    /// Hash the normalized form of `text`
    pub fn of(text: &str) -> Self {
        Self::of_normalized(&normalize(text))
    }

    /// Hash text that is already normalized
    pub fn of_normalized(normalized: &str) -> Self {
        PassageHash(xxh3_128(normalized.as_bytes()))
    }

    /// Hash through a memoizing normalizer
    pub fn with_normalizer(normalizer: &TextNormalizer, text: &str) -> Self {
        Self::of_normalized(&normalizer.normalize(text))
    }

    /// Raw digest value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for PassageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl FromStr for PassageHash {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u128::from_str_radix(s, 16)
            .map(PassageHash)
            .map_err(|e| format!("Invalid passage hash '{}': {}", s, e))
    }
}

impl Serialize for PassageHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PassageHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Hash one passage text
pub fn hash(text: &str) -> PassageHash {
    PassageHash::of(text)
}

/// Already-known passages keyed by the hash of their Hawaiian text
#[derive(Debug, Clone, Default)]
pub struct DuplicateIndex {
    entries: HashMap<PassageHash, (String, String)>,
}

impl DuplicateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a passage pair; returns false if an identical Hawaiian text was already present
    pub fn insert(&mut self, hawaiian: &str, english: &str) -> bool {
        let key = PassageHash::of(hawaiian);
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries
            .insert(key, (hawaiian.to_string(), english.to_string()));
        true
    }

    /// Whether a passage with the same normalized Hawaiian text is known
    pub fn is_duplicate(&self, hawaiian: &str) -> bool {
        self.contains_hash(&PassageHash::of(hawaiian))
    }

    pub fn contains_hash(&self, hash: &PassageHash) -> bool {
        self.entries.contains_key(hash)
    }

    /// Stored pair for a hash
    pub fn get(&self, hash: &PassageHash) -> Option<&(String, String)> {
        self.entries.get(hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
