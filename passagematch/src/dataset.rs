// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Passage datasets: CSV loading, saving and duplicate bookkeeping
//!
//! Two layouts are understood:
//! - the benchmark dataset, columns `Hawaiian`, `English` followed by
//!   one column per model translation
//! - the finetuning dataset, columns `L1 Hawaiian_Text`, `Reference_Translation`

use crate::corpus::identify_passage_pairs;
use crate::text::errors::{MatchError, Result};
use crate::text::hasher::{DuplicateIndex, PassageHash};
use crate::text::normalizer::normalize;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::Path;

const HAWAIIAN_COLUMNS: [&str; 2] = ["Hawaiian", "L1 Hawaiian_Text"];
const ENGLISH_COLUMNS: [&str; 2] = ["English", "Reference_Translation"];

/// One passage pair read from a dataset row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassageRecord {
    /// 1-based row number within its file
    pub index: usize,
    pub hawaiian: String,
    pub english: String,
    pub hawaiian_hash: PassageHash,
    pub english_hash: PassageHash,
}

impl PassageRecord {
    pub fn new(index: usize, hawaiian: impl Into<String>, english: impl Into<String>) -> Self {
        let hawaiian = hawaiian.into();
        let english = english.into();
        Self {
            index,
            hawaiian_hash: PassageHash::of(&hawaiian),
            english_hash: PassageHash::of(&english),
            hawaiian,
            english,
        }
    }

    /// Whether both sides carry text
    pub fn is_complete(&self) -> bool {
        !self.hawaiian.is_empty() && !self.english.is_empty()
    }
}

/// Column layout used when writing a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetLayout {
    /// `Hawaiian,English[,model columns...]`
    Benchmark,
    /// `L1 Hawaiian_Text,Reference_Translation`
    Finetuning,
}

impl DatasetLayout {
    /// Guess the layout from a file path
    pub fn detect(path: &Path) -> Self {
        if path.to_string_lossy().contains("finetuning") {
            DatasetLayout::Finetuning
        } else {
            DatasetLayout::Benchmark
        }
    }

    fn headers(self) -> [&'static str; 2] {
        match self {
            DatasetLayout::Benchmark => ["Hawaiian", "English"],
            DatasetLayout::Finetuning => ["L1 Hawaiian_Text", "Reference_Translation"],
        }
    }
}

/// Load every row of a dataset as a passage record
///
/// Fields are trimmed. Rows with an empty side are kept so that the
/// row numbering stays stable; they simply cannot match anything.
pub fn load_passages(path: &Path) -> Result<Vec<PassageRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();

    let column = |names: &[&str]| -> Vec<usize> {
        names
            .iter()
            .filter_map(|name| headers.iter().position(|h| h.trim() == *name))
            .collect()
    };
    let hawaiian_cols = column(&HAWAIIAN_COLUMNS);
    let english_cols = column(&ENGLISH_COLUMNS);
    if hawaiian_cols.is_empty() || english_cols.is_empty() {
        return Err(MatchError::MissingColumns {
            path: path.to_path_buf(),
            expected: format!("{:?} and {:?}", HAWAIIAN_COLUMNS, ENGLISH_COLUMNS),
        });
    }

    // first non-empty value among the candidate columns
    let pick = |row: &csv::StringRecord, cols: &[usize]| -> String {
        cols.iter()
            .filter_map(|&c| row.get(c))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .unwrap_or_default()
            .to_string()
    };

    let mut passages = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        passages.push(PassageRecord::new(
            i + 1,
            pick(&row, &hawaiian_cols),
            pick(&row, &english_cols),
        ));
    }

    log::info!("Loaded {} passages from {}", passages.len(), path.display());
    Ok(passages)
}

/// Collect the complete passages of several datasets keyed by Hawaiian hash
///
/// Files that do not exist are skipped with a warning.
pub fn load_existing<P: AsRef<Path>>(paths: &[P]) -> Result<DuplicateIndex> {
    let mut existing = DuplicateIndex::new();
    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("{} not found, skipping", path.display());
            continue;
        }
        for record in load_passages(path)?.into_iter().filter(PassageRecord::is_complete) {
            existing.insert(&record.hawaiian, &record.english);
        }
    }
    Ok(existing)
}

/// Pairs `(index_in_a, index_in_b)` whose Hawaiian texts hash identically
pub fn find_cross_duplicates(a: &[PassageRecord], b: &[PassageRecord]) -> Vec<(usize, usize)> {
    let mut by_hash: HashMap<PassageHash, Vec<usize>> = HashMap::new();
    for record in a.iter().filter(|r| !r.hawaiian.is_empty()) {
        by_hash.entry(record.hawaiian_hash).or_default().push(record.index);
    }

    let mut pairs = Vec::new();
    for record in b.iter().filter(|r| !r.hawaiian.is_empty()) {
        if let Some(indices) = by_hash.get(&record.hawaiian_hash) {
            pairs.extend(indices.iter().map(|&i| (i, record.index)));
        }
    }
    pairs
}

/// Rows of one dataset whose Hawaiian text repeats an earlier row, as `(first, repeat)`
pub fn find_internal_duplicates(records: &[PassageRecord]) -> Vec<(usize, usize)> {
    let mut first_seen: HashMap<PassageHash, usize> = HashMap::new();
    let mut pairs = Vec::new();
    for record in records.iter().filter(|r| !r.hawaiian.is_empty()) {
        match first_seen.get(&record.hawaiian_hash) {
            Some(&first) => pairs.push((first, record.index)),
            None => {
                first_seen.insert(record.hawaiian_hash, record.index);
            }
        }
    }
    pairs
}

/// Rules for accepting an extracted Hawaiian/English page pair
#[derive(Debug, Clone, Copy)]
pub struct PairValidation {
    /// Minimum characters on each side
    pub min_length: usize,
    /// Minimum difference between the vowel ratios of the two sides
    pub min_vowel_gap: f64,
}

impl Default for PairValidation {
    fn default() -> Self {
        Self {
            min_length: 50,
            min_vowel_gap: 0.05,
        }
    }
}

impl PairValidation {
    /// Whether a pair looks like real Hawaiian/English content
    ///
    /// Hawaiian prose is markedly more vowel-heavy than English, so two
    /// sides with near-identical vowel ratios are probably the same language.
    pub fn is_valid(&self, hawaiian: &str, english: &str) -> bool {
        if hawaiian.chars().count() < self.min_length || english.chars().count() < self.min_length
        {
            return false;
        }
        if normalize(hawaiian) == normalize(english) {
            return false;
        }
        (vowel_ratio(hawaiian) - vowel_ratio(english)).abs() >= self.min_vowel_gap
    }
}

fn vowel_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let vowels = text
        .to_lowercase()
        .chars()
        .filter(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'))
        .count();
    vowels as f64 / total as f64
}

/// Keep valid pairs, optionally dropping those already in `existing`
pub fn filter_pairs(
    pairs: Vec<(String, String)>,
    validation: PairValidation,
    existing: &DuplicateIndex,
    skip_duplicates: bool,
) -> Vec<(String, String)> {
    let total = pairs.len();
    let kept: Vec<(String, String)> = pairs
        .into_par_iter()
        .filter(|(hawaiian, english)| validation.is_valid(hawaiian, english))
        .filter(|(hawaiian, _)| !(skip_duplicates && existing.is_duplicate(hawaiian)))
        .collect();
    log::info!("Kept {} of {} passage pairs", kept.len(), total);
    kept
}

/// Pair a book's pages and keep the valid, unseen pairs
///
/// Pairs stay in page order; `limit` caps how many are returned.
pub fn extract_passages(
    pages: &[String],
    validation: PairValidation,
    existing: &DuplicateIndex,
    skip_duplicates: bool,
    limit: Option<usize>,
) -> Vec<(String, String)> {
    let pairs = identify_passage_pairs(pages, true);
    let mut kept = filter_pairs(pairs, validation, existing, skip_duplicates);
    if let Some(limit) = limit {
        kept.truncate(limit);
    }
    kept
}

/// Write passage pairs to a dataset file
///
/// When appending to an existing benchmark dataset each row is padded with
/// empty cells up to the file's column count.
pub fn save_passages(
    pairs: &[(String, String)],
    path: &Path,
    append: bool,
    layout: DatasetLayout,
) -> Result<usize> {
    let appending = append && path.exists();

    let width = if appending && layout == DatasetLayout::Benchmark {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        reader.headers()?.len().max(2)
    } else {
        2
    };

    let file = if appending {
        OpenOptions::new().append(true).open(path)?
    } else {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?
    };
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);

    if !appending {
        writer.write_record(layout.headers())?;
    }
    for (hawaiian, english) in pairs {
        let mut row = vec![hawaiian.as_str(), english.as_str()];
        row.resize(width, "");
        writer.write_record(&row)?;
    }
    writer.flush()?;

    log::info!("Saved {} passages to {}", pairs.len(), path.display());
    Ok(pairs.len())
}
