// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Batch results: tallies, details and exports

use super::{PassageVerdict, VerdictStatus};
use crate::text::errors::Result;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Header of the flat CSV export
pub const CSV_HEADER: [&str; 9] = [
    "Source_CSV",
    "Row_Index",
    "Found_In_Corpus",
    "Hawaiian_Found",
    "English_Found",
    "Hawaiian_Score",
    "English_Score",
    "Hawaiian_Preview",
    "English_Preview",
];

/// Verdicts for one passage source checked against one corpus
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Passage source name, usually the dataset file name
    pub source: String,
    /// Corpus document the passages were checked against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    pub summary: ReportSummary,
    pub verdicts: Vec<PassageVerdict>,
}

/// Aggregate counts over a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub found: usize,
    pub not_found: usize,
    pub indeterminate: usize,
}

impl ReportSummary {
    pub fn tally<'a>(verdicts: impl IntoIterator<Item = &'a PassageVerdict>) -> Self {
        let mut summary = Self::default();
        for verdict in verdicts {
            summary.total += 1;
            match verdict.status {
                VerdictStatus::Found => summary.found += 1,
                VerdictStatus::NotFound => summary.not_found += 1,
                VerdictStatus::Indeterminate { .. } => summary.indeterminate += 1,
            }
        }
        summary
    }

    /// Share of passages found, in percent
    pub fn found_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.found as f64 * 100.0 / self.total as f64
        }
    }

    /// Sum of several summaries
    pub fn combine<'a>(summaries: impl IntoIterator<Item = &'a ReportSummary>) -> Self {
        summaries.into_iter().fold(Self::default(), |acc, s| Self {
            total: acc.total + s.total,
            found: acc.found + s.found,
            not_found: acc.not_found + s.not_found,
            indeterminate: acc.indeterminate + s.indeterminate,
        })
    }
}

impl BatchReport {
    pub fn new(source: impl Into<String>, verdicts: Vec<PassageVerdict>) -> Self {
        Self {
            source: source.into(),
            document: None,
            summary: ReportSummary::tally(&verdicts),
            verdicts,
        }
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    pub fn found(&self) -> impl Iterator<Item = &PassageVerdict> {
        self.verdicts.iter().filter(|v| v.is_found())
    }

    pub fn not_found(&self) -> impl Iterator<Item = &PassageVerdict> {
        self.verdicts
            .iter()
            .filter(|v| v.status == VerdictStatus::NotFound)
    }

    pub fn indeterminate(&self) -> impl Iterator<Item = &PassageVerdict> {
        self.verdicts.iter().filter(|v| v.is_indeterminate())
    }

    /// Up to `limit` found and `limit` not-found verdicts
    pub fn details(&self, limit: usize) -> (Vec<&PassageVerdict>, Vec<&PassageVerdict>) {
        (
            self.found().take(limit).collect(),
            self.not_found().take(limit).collect(),
        )
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Write all reports as one flat table, one row per passage
pub fn write_csv<W: Write>(reports: &[BatchReport], writer: W) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    csv.write_record(CSV_HEADER)?;

    for report in reports {
        for verdict in &report.verdicts {
            let found = match verdict.status {
                VerdictStatus::Found => "Yes",
                VerdictStatus::NotFound => "No",
                VerdictStatus::Indeterminate { .. } => "Error",
            };
            let index = verdict.index.to_string();
            let hawaiian_score = format!("{:.3}", verdict.hawaiian_score);
            let english_score = format!("{:.3}", verdict.english_score);
            csv.write_record([
                report.source.as_str(),
                index.as_str(),
                found,
                yes_no(verdict.hawaiian_found),
                yes_no(verdict.english_found),
                hawaiian_score.as_str(),
                english_score.as_str(),
                verdict.hawaiian_preview.as_str(),
                verdict.english_preview.as_str(),
            ])?;
        }
    }

    csv.flush()?;
    Ok(())
}

/// Export reports to a CSV file
pub fn export_csv(reports: &[BatchReport], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_csv(reports, file)?;
    log::info!("Exported {} reports to {}", reports.len(), path.display());
    Ok(())
}

/// Export reports to a pretty-printed JSON file
pub fn export_json(reports: &[BatchReport], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, reports)?;
    Ok(())
}
