// Copyright (c) 2025-2026 Passagematch Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for Passagematch
//!
//! Provides commands for checking datasets against corpus documents,
//! duplicate reporting, pair extraction and filtering, and ad-hoc
//! hashing and scoring.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_check, handle_dedup, handle_extract, handle_filter, handle_hash, handle_score,
    handle_version, load_config, CheckOptions, ExtractOptions,
};
