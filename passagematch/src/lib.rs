// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Passagematch - locate and deduplicate Hawaiian-English passages
//!
//! The engine normalizes text, indexes a corpus by word n-grams, scores
//! candidate windows with an indel ratio and falls back to a sliding-window
//! scan when no index is worth building. [`batch`] fans a passage list out
//! over worker threads; [`dataset`] and [`corpus`] read the inputs.

pub mod batch;
pub mod corpus;
pub mod dataset;
pub mod text;

pub use batch::{BatchConfig, BatchOrchestrator, BatchReport, CheckLanguage, PassageVerdict};
pub use corpus::{identify_passage_pairs, CorpusDocument};
pub use dataset::PassageRecord;
pub use text::{
    hash, normalize, score_match, MatchError, MatchVerdict, MatcherConfig, NGramIndex,
    PassageHash, PassageMatcher, Result,
};
