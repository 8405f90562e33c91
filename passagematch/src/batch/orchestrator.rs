// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Parallel evaluation of passage lists
//!
//! Passages are split into batches that run on a rayon pool. Every batch
//! prepares its own copy of the corpus and its own index, so workers share
//! nothing mutable. A batch that panics or runs past the time budget is
//! reported as indeterminate while the other batches complete normally.

use super::report::BatchReport;
use super::{preview, BatchConfig, CheckLanguage, PassageVerdict, VerdictStatus};
use crate::dataset::PassageRecord;
use crate::text::errors::{MatchError, Result};
use crate::text::matcher::PassageMatcher;
use crate::text::ngram::NGramIndex;
use crate::text::scorer::PreparedText;
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Below this many passages everything runs in a single pass
const MIN_PARALLEL_PASSAGES: usize = 10;

/// Batches per worker
const BATCHES_PER_WORKER: usize = 4;

/// Evaluates passage lists against a corpus
#[derive(Debug, Clone)]
pub struct BatchOrchestrator {
    config: BatchConfig,
}

impl BatchOrchestrator {
    pub fn new(config: BatchConfig) -> Result<Self> {
        config.matcher.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Number of passages per batch for a list of `passages` entries
    pub fn batch_size(&self, passages: usize) -> usize {
        let workers = self.config.worker_count();
        if workers > 1 && passages > MIN_PARALLEL_PASSAGES {
            (passages / (workers * BATCHES_PER_WORKER)).max(1)
        } else {
            passages.max(1)
        }
    }

    /// Check every passage against `corpus_text`
    pub fn run(
        &self,
        source: &str,
        passages: &[PassageRecord],
        corpus_text: &str,
    ) -> Result<BatchReport> {
        let language = self.config.language;
        let threshold = self.config.matcher.threshold;
        self.run_with(source, passages, corpus_text, |matcher, corpus, index, record| {
            check_single_passage(matcher, corpus, index, record, language, threshold)
        })
    }

    /// Like [`run`](Self::run) with a custom per-passage check
    pub fn run_with<F>(
        &self,
        source: &str,
        passages: &[PassageRecord],
        corpus_text: &str,
        check: F,
    ) -> Result<BatchReport>
    where
        F: Fn(&PassageMatcher, &PreparedText, Option<&NGramIndex>, &PassageRecord) -> PassageVerdict
            + Sync,
    {
        let started = Instant::now();
        let deadline = self.config.time_budget.map(|budget| started + budget);
        let workers = self.config.worker_count();
        let batch_size = self.batch_size(passages.len());

        let verdicts = if batch_size >= passages.len() {
            log::info!("Checking {} passages in a single pass", passages.len());
            self.run_batch(passages, corpus_text, deadline, &check)
        } else {
            let batches: Vec<&[PassageRecord]> = passages.chunks(batch_size).collect();
            log::info!(
                "Checking {} passages in {} batches on {} workers",
                passages.len(),
                batches.len(),
                workers
            );

            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("passagematch-worker-{}", i))
                .build()
                .map_err(|e| MatchError::WorkerPool(e.to_string()))?;

            let per_batch: Vec<Vec<PassageVerdict>> = pool.install(|| {
                batches
                    .par_iter()
                    .map(|batch| self.run_batch(batch, corpus_text, deadline, &check))
                    .collect()
            });
            per_batch.into_iter().flatten().collect()
        };

        log::debug!(
            "Checked {} passages in {:.2?}",
            verdicts.len(),
            started.elapsed()
        );
        Ok(BatchReport::new(source, verdicts))
    }

    /// Evaluate one batch in isolation
    ///
    /// Always returns one verdict per passage, in input order.
    fn run_batch<F>(
        &self,
        batch: &[PassageRecord],
        corpus_text: &str,
        deadline: Option<Instant>,
        check: &F,
    ) -> Vec<PassageVerdict>
    where
        F: Fn(&PassageMatcher, &PreparedText, Option<&NGramIndex>, &PassageRecord) -> PassageVerdict
            + Sync,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.process_batch(batch, corpus_text, deadline, check)
        }));

        let reason = match outcome {
            Ok(Some(verdicts)) => return verdicts,
            Ok(None) => {
                log::warn!(
                    "Time budget exhausted, {} passages left indeterminate",
                    batch.len()
                );
                "time budget exhausted".to_string()
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::error!("Worker failed on batch of {}: {}", batch.len(), message);
                format!("worker failed: {}", message)
            }
        };

        batch
            .iter()
            .map(|record| PassageVerdict::indeterminate(record, reason.clone()))
            .collect()
    }

    /// `None` when the deadline passed before the batch finished
    ///
    /// The matcher carries the deadline into its window and candidate
    /// loops, so a single slow passage cannot overrun the budget by much.
    fn process_batch<F>(
        &self,
        batch: &[PassageRecord],
        corpus_text: &str,
        deadline: Option<Instant>,
        check: &F,
    ) -> Option<Vec<PassageVerdict>>
    where
        F: Fn(&PassageMatcher, &PreparedText, Option<&NGramIndex>, &PassageRecord) -> PassageVerdict,
    {
        let expired = || deadline.map_or(false, |d| Instant::now() >= d);
        if expired() {
            return None;
        }

        let matcher = PassageMatcher::new(self.config.matcher.clone()).with_deadline(deadline);
        let corpus = matcher.prepare_corpus(corpus_text);
        let index = matcher.build_index(&corpus, self.config.use_index);

        let mut verdicts = Vec::with_capacity(batch.len());
        for record in batch {
            if expired() {
                return None;
            }
            let verdict = check(&matcher, &corpus, index.as_ref(), record);
            // a verdict finished past the deadline may come from an abandoned search
            if matcher.is_expired() {
                return None;
            }
            verdicts.push(verdict);
        }
        Some(verdicts)
    }
}

/// Check one passage pair in the requested language(s)
///
/// An empty side is never found and scores 0.
pub fn check_single_passage(
    matcher: &PassageMatcher,
    corpus: &PreparedText,
    index: Option<&NGramIndex>,
    record: &PassageRecord,
    language: CheckLanguage,
    threshold: f64,
) -> PassageVerdict {
    let check_side = |text: &str, enabled: bool| {
        if !enabled || text.is_empty() {
            return (false, 0.0);
        }
        let verdict = matcher.find_in_corpus(text, corpus, threshold, index);
        (verdict.found, verdict.score)
    };

    let (hawaiian_found, hawaiian_score) = check_side(&record.hawaiian, language.checks_hawaiian());
    let (english_found, english_score) = check_side(&record.english, language.checks_english());

    let found = match language {
        CheckLanguage::Hawaiian => hawaiian_found,
        CheckLanguage::English => english_found,
        CheckLanguage::Both => hawaiian_found || english_found,
    };

    PassageVerdict {
        index: record.index,
        status: if found {
            VerdictStatus::Found
        } else {
            VerdictStatus::NotFound
        },
        hawaiian_found,
        english_found,
        hawaiian_score,
        english_score,
        hawaiian_preview: preview(&record.hawaiian),
        english_preview: preview(&record.english),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
