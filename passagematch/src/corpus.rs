// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Corpus documents: flat text already extracted from a book
//!
//! A document is either a single UTF-8 text file or a directory whose
//! `*.txt` files, in name order, are its pages. Pages are joined with a
//! single space.
//!
//! Bilingual books print each English page opposite its Hawaiian
//! translation; [`identify_passage_pairs`] recovers those pairs from the
//! page list.

use crate::text::errors::{MatchError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// One loaded corpus
#[derive(Debug, Clone)]
pub struct CorpusDocument {
    /// Display name (file or directory name)
    pub name: String,
    /// Where it was loaded from, if anywhere
    pub path: Option<PathBuf>,
    /// Non-empty pages, whitespace collapsed, in order
    pub pages: Vec<String>,
    /// Flat corpus text
    pub text: String,
}

impl CorpusDocument {
    /// Wrap text that is already in memory
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            name: name.into(),
            path: None,
            pages: vec![text.clone()],
            text,
        }
    }

    /// Load a text file or a directory of page files
    pub fn load(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let metadata = fs::metadata(path).map_err(|e| MatchError::unreadable(path, e))?;
        let pages = if metadata.is_dir() {
            read_page_dir(path)?
        } else {
            vec![read_page(path)?]
        };

        let pages: Vec<String> = pages
            .into_iter()
            .map(|page| page.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|page| !page.is_empty())
            .collect();

        log::info!("Loaded {} pages from {}", pages.len(), path.display());

        Ok(Self {
            name,
            path: Some(path.to_path_buf()),
            text: pages.join(" "),
            pages,
        })
    }

    /// Number of pages joined into `text`
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Length of the flat text in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Pages shorter than this many characters are not passage content
pub const MIN_PAGE_CHARS: usize = 50;

/// Pair facing pages into `(hawaiian, english)` passages
///
/// Content alternates English page then Hawaiian page. With
/// `start_after_preface`, pairing starts on the page after the first one
/// mentioning a preface or introduction (or at the first page if none
/// does). A pair with a page under [`MIN_PAGE_CHARS`] is skipped by
/// advancing one page, which realigns the alternation after headings and
/// blank leaves.
pub fn identify_passage_pairs(
    pages: &[String],
    start_after_preface: bool,
) -> Vec<(String, String)> {
    let mut start = 0;
    if start_after_preface {
        if let Some(front) = pages.iter().position(|page| {
            let lower = page.to_lowercase();
            lower.contains("preface") || lower.contains("introduction")
        }) {
            start = front + 1;
        }
    }

    let mut pairs = Vec::new();
    let mut i = start;
    while i + 1 < pages.len() {
        let (english, hawaiian) = (&pages[i], &pages[i + 1]);
        if english.chars().count() < MIN_PAGE_CHARS || hawaiian.chars().count() < MIN_PAGE_CHARS {
            i += 1;
            continue;
        }
        pairs.push((hawaiian.clone(), english.clone()));
        i += 2;
    }

    log::debug!(
        "Identified {} passage pairs from {} pages starting at page {}",
        pairs.len(),
        pages.len(),
        start
    );
    pairs
}

fn read_page(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| MatchError::unreadable(path, e))?;
    String::from_utf8(bytes).map_err(|e| MatchError::unreadable(path, e))
}

fn read_page_dir(dir: &Path) -> Result<Vec<String>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| MatchError::unreadable(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().map_or(false, |ext| ext == "txt"))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(MatchError::unreadable(dir, "no .txt pages found"));
    }

    files.iter().map(|f| read_page(f)).collect()
}
