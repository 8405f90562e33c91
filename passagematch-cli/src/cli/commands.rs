// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command definitions for Passagematch

use clap::{Parser, Subcommand, ValueEnum};
use passagematch::CheckLanguage;
use std::path::PathBuf;

/// Log level options
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only errors
    Error,
    /// Warnings and errors
    Warn,
    /// Info, warnings, and errors
    Info,
    /// Debug messages and above (verbose)
    Debug,
    /// All messages including trace (very verbose)
    Trace,
    /// Disable all logging
    Off,
}

impl LogLevel {
    /// Convert to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

/// Passagematch CLI - find Hawaiian/English passages in books
#[derive(Parser)]
#[command(name = "passagematch")]
#[command(about = "Passagematch - fuzzy passage location and deduplication")]
#[command(version)]
pub struct Cli {
    /// Set log level (error, warn, info, debug, trace, off)
    #[arg(short = 'l', long = "log-level", global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Verbose mode (equivalent to --log-level debug)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// JSON file with batch/matcher settings; flags override it
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Level requested on the command line, `Warn` when unspecified
    pub fn level_filter(&self) -> log::LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.to_level_filter(),
            (None, true) => log::LevelFilter::Debug,
            (None, false) => log::LevelFilter::Warn,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show detailed version information
    Version,

    /// Check which dataset passages occur in one or more corpus documents
    Check {
        /// Corpus documents (text files or directories of page files)
        #[arg(required = true)]
        documents: Vec<PathBuf>,

        /// Passage datasets to check
        #[arg(long = "csv", required = true, num_args = 1..)]
        csv: Vec<PathBuf>,

        /// Which side of each pair to look for
        #[arg(long, value_enum, default_value = "both")]
        language: LanguageArg,

        /// Similarity threshold (0-1)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Show the first few found and not-found passages
        #[arg(short, long)]
        details: bool,

        /// Write all verdicts to a file (.json for JSON, CSV otherwise)
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,

        /// Number of worker threads (default: auto)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Disable n-gram indexing (slower, less memory)
        #[arg(long)]
        no_index: bool,

        /// Give up on unfinished batches after this many seconds
        #[arg(long = "time-budget-secs")]
        time_budget_secs: Option<f64>,
    },

    /// Report duplicate passages within a dataset or across two datasets
    Dedup {
        /// Dataset to inspect
        dataset: PathBuf,

        /// Second dataset to compare against
        other: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Validate passage pairs and save the ones worth keeping
    Filter {
        /// Dataset with candidate pairs
        input: PathBuf,

        /// Dataset to write the kept pairs to
        #[arg(short, long)]
        output: PathBuf,

        /// Datasets whose passages count as already known
        #[arg(long, num_args = 1..)]
        existing: Vec<PathBuf>,

        /// Minimum characters on each side
        #[arg(long, default_value_t = 50)]
        min_length: usize,

        /// Keep pairs even if already known
        #[arg(long)]
        keep_duplicates: bool,

        /// Append to the output instead of overwriting it
        #[arg(short, long)]
        append: bool,
    },

    /// Pair a bilingual book's facing pages and save the new passages
    Extract {
        /// Book as a directory of page files (or a single text file)
        document: PathBuf,

        /// Dataset to write the extracted pairs to
        #[arg(short, long, required_unless_present = "preview")]
        output: Option<PathBuf>,

        /// Datasets whose passages count as already known
        #[arg(long, num_args = 1..)]
        existing: Vec<PathBuf>,

        /// Keep at most this many pairs
        #[arg(short = 'n', long = "num-passages")]
        num_passages: Option<usize>,

        /// Keep pairs even if already known
        #[arg(long)]
        no_dedup: bool,

        /// Print the first pairs instead of saving them
        #[arg(long)]
        preview: bool,

        /// Append to the output instead of overwriting it
        #[arg(short, long)]
        append: bool,
    },

    /// Print the normalized form and hash of a passage
    Hash {
        /// Passage text
        text: String,
    },

    /// Score the similarity of two texts
    Score {
        /// First text
        a: String,

        /// Second text
        b: String,
    },
}

/// Language selector accepted on the command line
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LanguageArg {
    Hawaiian,
    English,
    Both,
}

impl From<LanguageArg> for CheckLanguage {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::Hawaiian => CheckLanguage::Hawaiian,
            LanguageArg::English => CheckLanguage::English,
            LanguageArg::Both => CheckLanguage::Both,
        }
    }
}

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let cli = Cli::parse_from([
            "passagematch",
            "check",
            "book.txt",
            "pages/",
            "--csv",
            "a.csv",
            "b.csv",
            "--language",
            "english",
            "-t",
            "0.9",
            "--no-index",
        ]);
        match cli.command {
            Commands::Check {
                documents,
                csv,
                language,
                threshold,
                no_index,
                format,
                ..
            } => {
                assert_eq!(documents.len(), 2);
                assert_eq!(csv.len(), 2);
                assert!(matches!(language, LanguageArg::English));
                assert_eq!(threshold, Some(0.9));
                assert!(no_index);
                assert_eq!(format, OutputFormat::Table);
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn test_parse_extract() {
        let cli = Cli::parse_from([
            "passagematch",
            "extract",
            "book/",
            "-o",
            "finetuning.csv",
            "-n",
            "25",
            "--existing",
            "benchmark.csv",
        ]);
        match cli.command {
            Commands::Extract {
                output,
                num_passages,
                existing,
                no_dedup,
                preview,
                ..
            } => {
                assert_eq!(output, Some(PathBuf::from("finetuning.csv")));
                assert_eq!(num_passages, Some(25));
                assert_eq!(existing.len(), 1);
                assert!(!no_dedup);
                assert!(!preview);
            }
            _ => panic!("expected extract"),
        }

        assert!(Cli::try_parse_from(["passagematch", "extract", "book/"]).is_err());
        assert!(Cli::try_parse_from(["passagematch", "extract", "book/", "--preview"]).is_ok());
    }

    #[test]
    fn test_level_filter() {
        let cli = Cli::parse_from(["passagematch", "-v", "version"]);
        assert_eq!(cli.level_filter(), log::LevelFilter::Debug);

        let cli = Cli::parse_from(["passagematch", "--log-level", "off", "-v", "version"]);
        assert_eq!(cli.level_filter(), log::LevelFilter::Off);

        let cli = Cli::parse_from(["passagematch", "version"]);
        assert_eq!(cli.level_filter(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
