// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for Passagematch

use colored::Colorize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::commands::{LanguageArg, OutputFormat};
use super::output::{format_duplicates, DuplicateRow, ReportFormatter};
use passagematch::batch::report::{export_csv, export_json};
use passagematch::batch::{preview, BatchConfig};
use passagematch::dataset::{
    extract_passages, filter_pairs, find_cross_duplicates, find_internal_duplicates,
    load_existing, load_passages, save_passages, DatasetLayout, PairValidation,
};
use passagematch::text::{partial_ratio, ratio};
use passagematch::{
    hash, normalize, score_match, BatchOrchestrator, BatchReport, CorpusDocument, PassageRecord,
};

/// Options of the check command
pub struct CheckOptions {
    pub documents: Vec<PathBuf>,
    pub csv: Vec<PathBuf>,
    pub language: LanguageArg,
    pub threshold: Option<f64>,
    pub details: bool,
    pub export: Option<PathBuf>,
    pub format: OutputFormat,
    pub workers: Option<usize>,
    pub no_index: bool,
    pub time_budget_secs: Option<f64>,
}

/// Number of pairs shown by `extract --preview`
const PREVIEW_PAIRS: usize = 3;

/// Characters of each side shown by `extract --preview`
const PREVIEW_PAIR_CHARS: usize = 200;

/// Options of the extract command
pub struct ExtractOptions {
    pub document: PathBuf,
    pub output: Option<PathBuf>,
    pub existing: Vec<PathBuf>,
    pub num_passages: Option<usize>,
    pub no_dedup: bool,
    pub preview: bool,
    pub append: bool,
}

/// Load the batch configuration file, or defaults when none is given
pub fn load_config(path: Option<&Path>) -> Result<BatchConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| format!("Cannot open config {}: {}", path.display(), e))?;
            let config: BatchConfig = serde_json::from_reader(file)?;
            log::debug!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(BatchConfig::default()),
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Handle the check command
///
/// Every dataset is checked against every readable document. Documents
/// that cannot be read are reported and skipped.
pub fn handle_check(
    options: CheckOptions,
    mut config: BatchConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    config.language = options.language.into();
    if let Some(threshold) = options.threshold {
        config.matcher.threshold = threshold;
    }
    if options.workers.is_some() {
        config.workers = options.workers;
    }
    if options.no_index {
        config.use_index = false;
    }
    if let Some(secs) = options.time_budget_secs {
        config.time_budget = Some(Duration::try_from_secs_f64(secs)?);
    }
    let orchestrator = BatchOrchestrator::new(config)?;

    let mut datasets: Vec<(String, Vec<PassageRecord>)> = Vec::new();
    for path in &options.csv {
        if !path.exists() {
            eprintln!("{}", format!("Dataset not found: {}", path.display()).yellow());
            continue;
        }
        datasets.push((file_label(path), load_passages(path)?));
    }
    if datasets.is_empty() {
        return Err("No datasets to check".into());
    }

    let mut reports: Vec<BatchReport> = Vec::new();
    for document_path in &options.documents {
        let document = match CorpusDocument::load(document_path) {
            Ok(document) => document,
            Err(e) => {
                eprintln!("{}", format!("Skipping document: {}", e).red());
                continue;
            }
        };
        if options.format == OutputFormat::Table {
            println!(
                "{}",
                format!(
                    "Checking {} ({} pages, {} chars)",
                    document.name,
                    document.page_count(),
                    document.char_len()
                )
                .cyan()
            );
        }

        for (source, passages) in &datasets {
            let report = orchestrator
                .run(source, passages, &document.text)?
                .with_document(document.name.clone());
            reports.push(report);
        }
    }

    if reports.is_empty() {
        return Err("No readable corpus documents".into());
    }

    println!(
        "{}",
        ReportFormatter::format(&reports, options.format, options.details)?
    );

    if let Some(export) = options.export {
        if export.extension().map_or(false, |ext| ext == "json") {
            export_json(&reports, &export)?;
        } else {
            export_csv(&reports, &export)?;
        }
        eprintln!("{}", format!("Results exported to {}", export.display()).green());
    }

    Ok(())
}

/// Handle the dedup command
pub fn handle_dedup(
    dataset: PathBuf,
    other: Option<PathBuf>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = load_passages(&dataset)?;

    let (pairs, first_label, second_label, lookup) = match &other {
        Some(other) => {
            let other_records = load_passages(other)?;
            let pairs = find_cross_duplicates(&records, &other_records);
            (pairs, file_label(&dataset), file_label(other), records)
        }
        None => {
            let pairs = find_internal_duplicates(&records);
            (pairs, "Row".to_string(), "Repeat".to_string(), records)
        }
    };

    let rows: Vec<DuplicateRow> = pairs
        .iter()
        .map(|&(first, second)| DuplicateRow {
            first,
            second,
            preview: lookup
                .get(first.saturating_sub(1))
                .map(|r| preview(&r.hawaiian))
                .unwrap_or_default(),
        })
        .collect();

    println!(
        "{}",
        format_duplicates(&rows, &first_label, &second_label, format)?
    );
    if format == OutputFormat::Table {
        let message = format!("{} duplicate passages", rows.len());
        if rows.is_empty() {
            println!("{}", message.green());
        } else {
            println!("{}", message.yellow());
        }
    }
    Ok(())
}

/// Handle the filter command
pub fn handle_filter(
    input: PathBuf,
    output: PathBuf,
    existing: Vec<PathBuf>,
    min_length: usize,
    keep_duplicates: bool,
    append: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pairs: Vec<(String, String)> = load_passages(&input)?
        .into_iter()
        .map(|r| (r.hawaiian, r.english))
        .collect();
    let candidates = pairs.len();

    let known = load_existing(&existing)?;
    let validation = PairValidation {
        min_length,
        ..Default::default()
    };
    let kept = filter_pairs(pairs, validation, &known, !keep_duplicates);

    let layout = DatasetLayout::detect(&output);
    let written = save_passages(&kept, &output, append, layout)?;

    println!(
        "{}",
        format!(
            "Kept {} of {} pairs ({} already known) -> {}",
            written,
            candidates,
            known.len(),
            output.display()
        )
        .green()
    );
    Ok(())
}

/// Handle the extract command
pub fn handle_extract(options: ExtractOptions) -> Result<(), Box<dyn std::error::Error>> {
    let document = CorpusDocument::load(&options.document)?;
    let known = load_existing(&options.existing)?;
    let pairs = extract_passages(
        &document.pages,
        PairValidation::default(),
        &known,
        !options.no_dedup,
        options.num_passages,
    );

    if options.preview {
        for (i, (hawaiian, english)) in pairs.iter().take(PREVIEW_PAIRS).enumerate() {
            println!("{}", format!("Pair {}", i + 1).bold());
            println!("  {} {}", "Hawaiian:".cyan(), truncate_chars(hawaiian, PREVIEW_PAIR_CHARS));
            println!("  {} {}", "English:".cyan(), truncate_chars(english, PREVIEW_PAIR_CHARS));
        }
        println!(
            "{}",
            format!("{} pairs from {} pages", pairs.len(), document.page_count()).green()
        );
        return Ok(());
    }

    let output = options
        .output
        .ok_or("An output dataset is required unless --preview is given")?;
    let layout = DatasetLayout::detect(&output);
    let written = save_passages(&pairs, &output, options.append, layout)?;
    println!(
        "{}",
        format!(
            "Extracted {} pairs from {} pages of {} -> {}",
            written,
            document.page_count(),
            document.name,
            output.display()
        )
        .green()
    );
    Ok(())
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Handle the hash command
pub fn handle_hash(text: String) -> Result<(), Box<dyn std::error::Error>> {
    println!("{} {}", "normalized:".bold(), normalize(&text));
    println!("{} {}", "hash:".bold(), hash(&text));
    Ok(())
}

/// Handle the score command
pub fn handle_score(a: String, b: String) -> Result<(), Box<dyn std::error::Error>> {
    let (na, nb) = (normalize(&a), normalize(&b));
    println!("{} {:.4}", "ratio:".bold(), ratio(&na, &nb));
    println!("{} {:.4}", "partial ratio:".bold(), partial_ratio(&na, &nb));
    println!("{} {:.4}", "score:".bold(), score_match(&a, &b));
    Ok(())
}

/// Handle the version command
pub fn handle_version() -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "{} {}",
        "passagematch".bold().green(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_config_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.matcher.threshold, 0.85);
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"workers": 2, "matcher": {"threshold": 0.9}}"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.matcher.threshold, 0.9);
        assert_eq!(config.matcher.index_order, 5);
    }

    #[test]
    fn test_check_skips_unreadable_documents() {
        let dir = tempfile::tempdir().unwrap();
        let book = dir.path().join("book.txt");
        fs::write(&book, "Ua hele au i ka hale o ka mea nona ka ai.").unwrap();
        let dataset = dir.path().join("benchmark.csv");
        fs::write(&dataset, "Hawaiian,English\nka hale o ka mea,the house\n").unwrap();
        let export = dir.path().join("out.csv");

        let options = CheckOptions {
            documents: vec![dir.path().join("missing.txt"), book],
            csv: vec![dataset],
            language: LanguageArg::Hawaiian,
            threshold: None,
            details: false,
            export: Some(export.clone()),
            format: OutputFormat::Json,
            workers: Some(1),
            no_index: false,
            time_budget_secs: None,
        };
        handle_check(options, BatchConfig::default()).unwrap();

        let exported = fs::read_to_string(export).unwrap();
        assert!(exported.contains("benchmark.csv,1,Yes,Yes,No,1.000"));
    }

    #[test]
    fn test_check_without_documents_fails() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("benchmark.csv");
        fs::write(&dataset, "Hawaiian,English\naloha,hello\n").unwrap();
        let options = CheckOptions {
            documents: vec![dir.path().join("missing.txt")],
            csv: vec![dataset],
            language: LanguageArg::Both,
            threshold: None,
            details: false,
            export: None,
            format: OutputFormat::Json,
            workers: None,
            no_index: true,
            time_budget_secs: None,
        };
        assert!(handle_check(options, BatchConfig::default()).is_err());
    }

    fn write_book(dir: &Path) -> PathBuf {
        let book = dir.join("book");
        fs::create_dir(&book).unwrap();
        let pages = [
            "Preface",
            "I went to the house of the owner of the food, and I saw his children.",
            "Ua hele au i ka hale o ka mea nona ka ai, a ua ike au i kona mau keiki.",
            "This is a song for the beloved land of the very old ancestors living there.",
            "He mele keia no ka aina aloha o na kupuna kahiko loa e noho ana i laila.",
        ];
        for (i, page) in pages.iter().enumerate() {
            fs::write(book.join(format!("{:03}.txt", i + 1)), page).unwrap();
        }
        book
    }

    #[test]
    fn test_extract_limits_and_skips_known() {
        let dir = tempfile::tempdir().unwrap();
        let book = write_book(dir.path());
        let known = dir.path().join("benchmark.csv");
        fs::write(
            &known,
            "Hawaiian,English\n\
             \"Ua hele au i ka hale o ka mea nona ka ai, a ua ike au i kona mau keiki.\",x\n",
        )
        .unwrap();
        let output = dir.path().join("finetuning.csv");

        handle_extract(ExtractOptions {
            document: book.clone(),
            output: Some(output.clone()),
            existing: vec![known],
            num_passages: Some(5),
            no_dedup: false,
            preview: false,
            append: false,
        })
        .unwrap();
        let records = load_passages(&output).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].hawaiian.starts_with("He mele keia"));

        handle_extract(ExtractOptions {
            document: book,
            output: Some(output.clone()),
            existing: vec![],
            num_passages: Some(1),
            no_dedup: false,
            preview: false,
            append: false,
        })
        .unwrap();
        let records = load_passages(&output).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].hawaiian.starts_with("Ua hele au"));
    }

    #[test]
    fn test_extract_requires_output_or_preview() {
        let dir = tempfile::tempdir().unwrap();
        let book = write_book(dir.path());
        let options = |preview| ExtractOptions {
            document: book.clone(),
            output: None,
            existing: vec![],
            num_passages: None,
            no_dedup: false,
            preview,
            append: false,
        };
        assert!(handle_extract(options(false)).is_err());
        assert!(handle_extract(options(true)).is_ok());
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("aloha", 10), "aloha");
        assert_eq!(truncate_chars("ʻōlelo", 3), "ʻōl...");
    }

    #[test]
    fn test_filter_writes_finetuning_layout() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("candidates.csv");
        fs::write(
            &input,
            "Hawaiian,English\n\
             \"Ua hele au i ka hale o ka mea nona ka ai, a ua ike au i kona mau keiki.\",\
             \"I went to the house of the owner of the food, and I saw his children.\"\n\
             short,tiny\n",
        )
        .unwrap();
        let output = dir.path().join("finetuning.csv");

        handle_filter(input, output.clone(), vec![], 50, false, false).unwrap();

        let written = fs::read_to_string(output).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "L1 Hawaiian_Text,Reference_Translation");
        assert_eq!(lines.len(), 2);
    }
}
