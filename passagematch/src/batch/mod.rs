// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Batch checking of passage lists against a corpus

pub mod orchestrator;
pub mod report;

pub use orchestrator::{check_single_passage, BatchOrchestrator};
pub use report::{BatchReport, ReportSummary};

use crate::dataset::PassageRecord;
use crate::text::errors::MatchError;
use crate::text::types::MatcherConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use unicode_segmentation::UnicodeSegmentation;

/// Characters kept in a passage preview
pub const PREVIEW_CHARS: usize = 100;

/// Upper bound on the default worker count
pub const MAX_DEFAULT_WORKERS: usize = 8;

/// Which side(s) of a passage pair to look for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckLanguage {
    Hawaiian,
    English,
    /// Found if either side is found
    #[default]
    Both,
}

impl CheckLanguage {
    pub fn checks_hawaiian(self) -> bool {
        matches!(self, CheckLanguage::Hawaiian | CheckLanguage::Both)
    }

    pub fn checks_english(self) -> bool {
        matches!(self, CheckLanguage::English | CheckLanguage::Both)
    }
}

impl FromStr for CheckLanguage {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hawaiian" => Ok(CheckLanguage::Hawaiian),
            "english" => Ok(CheckLanguage::English),
            "both" => Ok(CheckLanguage::Both),
            _ => Err(MatchError::InvalidConfig(format!("Unknown language: {}", s))),
        }
    }
}

/// Batch run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub matcher: MatcherConfig,
    pub language: CheckLanguage,
    /// Worker threads; `None` means `min(available parallelism, 8)`
    pub workers: Option<usize>,
    /// Build n-gram indexes for corpora large enough to be worth it
    pub use_index: bool,
    /// Wall-clock budget for the whole run
    #[serde(with = "optional_secs")]
    pub time_budget: Option<Duration>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            language: CheckLanguage::Both,
            workers: None,
            use_index: true,
            time_budget: None,
        }
    }
}

impl BatchConfig {
    /// Effective number of workers
    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
                    .min(MAX_DEFAULT_WORKERS)
            })
            .max(1)
    }
}

mod optional_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.as_secs_f64()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let secs = Option::<f64>::deserialize(d)?;
        secs.map(|s| Duration::try_from_secs_f64(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Outcome class of one passage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerdictStatus {
    Found,
    NotFound,
    /// The passage could not be evaluated (worker failure, time budget)
    Indeterminate { reason: String },
}

/// Per-passage result reported to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassageVerdict {
    pub index: usize,
    #[serde(flatten)]
    pub status: VerdictStatus,
    pub hawaiian_found: bool,
    pub english_found: bool,
    pub hawaiian_score: f64,
    pub english_score: f64,
    pub hawaiian_preview: String,
    pub english_preview: String,
}

impl PassageVerdict {
    /// Verdict for a passage that could not be evaluated
    pub fn indeterminate(record: &PassageRecord, reason: impl Into<String>) -> Self {
        Self {
            index: record.index,
            status: VerdictStatus::Indeterminate {
                reason: reason.into(),
            },
            hawaiian_found: false,
            english_found: false,
            hawaiian_score: 0.0,
            english_score: 0.0,
            hawaiian_preview: preview(&record.hawaiian),
            english_preview: preview(&record.english),
        }
    }

    pub fn is_found(&self) -> bool {
        self.status == VerdictStatus::Found
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self.status, VerdictStatus::Indeterminate { .. })
    }
}

/// First 100 user-perceived characters, with `...` when cut
pub fn preview(text: &str) -> String {
    let mut graphemes = text.graphemes(true);
    let head: String = graphemes.by_ref().take(PREVIEW_CHARS).collect();
    if graphemes.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
