// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
// Fuzzy passage matching engine

pub mod errors;
pub mod hasher;
pub mod matcher;
pub mod ngram;
pub mod normalizer;
pub mod scorer;
pub mod types;
pub mod window;

pub use errors::{MatchError, Result};
pub use hasher::{hash, DuplicateIndex, PassageHash};
pub use matcher::{PassageMatcher, SearchStrategy};
pub use ngram::NGramIndex;
pub use normalizer::{normalize, TextNormalizer};
pub use scorer::{partial_ratio, ratio, score_match, PreparedQuery, PreparedText};
pub use types::{CachePolicy, Candidate, MatchVerdict, MatcherConfig};
pub use window::sliding_window_match;

/// Re-export commonly used items
pub mod prelude {
    pub use super::hasher::{hash, PassageHash};
    pub use super::matcher::PassageMatcher;
    pub use super::ngram::NGramIndex;
    pub use super::normalizer::normalize;
    pub use super::scorer::score_match;
    pub use super::types::{MatchVerdict, MatcherConfig};
}
