// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Output formatting for check reports and duplicate listings

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use passagematch::batch::report::write_csv;
use passagematch::batch::{BatchReport, ReportSummary, VerdictStatus};
use passagematch::PassageVerdict;
use serde::Serialize;

use super::commands::OutputFormat;

/// Number of verdicts listed per category with `--details`
pub const DETAIL_LIMIT: usize = 5;

/// Renders batch reports in the requested format
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format(
        reports: &[BatchReport],
        format: OutputFormat,
        details: bool,
    ) -> Result<String, Box<dyn std::error::Error>> {
        match format {
            OutputFormat::Table => Ok(Self::format_table(reports, details)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(reports)?),
            OutputFormat::Csv => {
                let mut out = Vec::new();
                write_csv(reports, &mut out)?;
                Ok(String::from_utf8(out)?)
            }
        }
    }

    fn format_table(reports: &[BatchReport], details: bool) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                "Dataset",
                "Document",
                "Total",
                "Found",
                "Not found",
                "Indeterminate",
                "Found %",
            ]);

        for report in reports {
            table.add_row(summary_row(
                &report.source,
                report.document.as_deref().unwrap_or("-"),
                &report.summary,
            ));
        }
        if reports.len() > 1 {
            let total = ReportSummary::combine(reports.iter().map(|r| &r.summary));
            table.add_row(summary_row("TOTAL", "", &total));
        }

        let mut output = table.to_string();
        if details {
            for report in reports {
                let (found, not_found) = report.details(DETAIL_LIMIT);
                output.push_str(&format!(
                    "\n\n{} in {}\n",
                    report.source,
                    report.document.as_deref().unwrap_or("corpus")
                ));
                output.push_str(&verdict_table(&found).to_string());
                if !not_found.is_empty() {
                    output.push('\n');
                    output.push_str(&verdict_table(&not_found).to_string());
                }
            }
        }
        output
    }
}

fn summary_row(source: &str, document: &str, summary: &ReportSummary) -> Vec<Cell> {
    vec![
        Cell::new(source),
        Cell::new(document),
        Cell::new(summary.total),
        Cell::new(summary.found).fg(Color::Green),
        Cell::new(summary.not_found).fg(Color::Yellow),
        Cell::new(summary.indeterminate).fg(if summary.indeterminate > 0 {
            Color::Red
        } else {
            Color::Reset
        }),
        Cell::new(format!("{:.1}", summary.found_percent())),
    ]
}

fn verdict_table(verdicts: &[&PassageVerdict]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Row", "Status", "Haw", "Eng", "Hawaiian preview"]);

    for verdict in verdicts {
        let status = match &verdict.status {
            VerdictStatus::Found => Cell::new("found").fg(Color::Green),
            VerdictStatus::NotFound => Cell::new("not found").fg(Color::Yellow),
            VerdictStatus::Indeterminate { reason } => Cell::new(reason).fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(verdict.index),
            status,
            Cell::new(format!("{:.3}", verdict.hawaiian_score)),
            Cell::new(format!("{:.3}", verdict.english_score)),
            Cell::new(&verdict.hawaiian_preview),
        ]);
    }
    table
}

/// One duplicate pair for display
#[derive(Debug, Serialize)]
pub struct DuplicateRow {
    pub first: usize,
    pub second: usize,
    pub preview: String,
}

/// Render duplicate pairs found by `dedup`
pub fn format_duplicates(
    rows: &[DuplicateRow],
    first_label: &str,
    second_label: &str,
    format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Csv => {
            let mut out = format!("{},{},Preview\n", first_label, second_label);
            for row in rows {
                out.push_str(&format!(
                    "{},{},\"{}\"\n",
                    row.first,
                    row.second,
                    row.preview.replace('"', "\"\"")
                ));
            }
            Ok(out)
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![first_label, second_label, "Preview"]);
            for row in rows {
                table.add_row(vec![
                    Cell::new(row.first),
                    Cell::new(row.second),
                    Cell::new(&row.preview),
                ]);
            }
            Ok(table.to_string())
        }
    }
}
