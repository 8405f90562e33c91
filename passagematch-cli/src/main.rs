// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Passagematch command-line entry point

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.level_filter())
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Version => cli::handle_version(),
        Commands::Check {
            documents,
            csv,
            language,
            threshold,
            details,
            export,
            format,
            workers,
            no_index,
            time_budget_secs,
        } => {
            let config = cli::load_config(cli.config.as_deref())?;
            cli::handle_check(
                cli::CheckOptions {
                    documents,
                    csv,
                    language,
                    threshold,
                    details,
                    export,
                    format,
                    workers,
                    no_index,
                    time_budget_secs,
                },
                config,
            )
        }
        Commands::Dedup {
            dataset,
            other,
            format,
        } => cli::handle_dedup(dataset, other, format),
        Commands::Filter {
            input,
            output,
            existing,
            min_length,
            keep_duplicates,
            append,
        } => cli::handle_filter(input, output, existing, min_length, keep_duplicates, append),
        Commands::Extract {
            document,
            output,
            existing,
            num_passages,
            no_dedup,
            preview,
            append,
        } => cli::handle_extract(cli::ExtractOptions {
            document,
            output,
            existing,
            num_passages,
            no_dedup,
            preview,
            append,
        }),
        Commands::Hash { text } => cli::handle_hash(text),
        Commands::Score { a, b } => cli::handle_score(a, b),
    }
}
