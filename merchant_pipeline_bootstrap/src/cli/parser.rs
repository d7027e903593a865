// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `clap`-derived CLI surface. Kept free of validation logic; `validator`
//! re-checks everything this produces before it reaches the application.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "merchant-pipeline", version, about = "Merchant extraction and classification pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a config file (TOML/YAML/JSON); env vars still override it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Overrides `WORKER_COUNT`.
    #[arg(long, global = true)]
    pub workers: Option<usize>,

    /// Overrides `STORE_URI`.
    #[arg(long, global = true)]
    pub store_uri: Option<String>,

    /// Overrides `RULES_DIR`.
    #[arg(long, global = true)]
    pub rules_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import raw transactions from a JSON-lines file and run them through
    /// the five-stage pipeline.
    Import {
        input: PathBuf,
    },

    /// Reload rule tables from `RULES_DIR`, replacing the active set only
    /// if every table parses and validates.
    ReloadRules,

    /// Print the current projected state of one transaction.
    ShowTransaction {
        transaction_id: String,
    },

    /// List transactions awaiting manual review.
    ReviewQueue,

    Approve {
        transaction_id: String,
        #[arg(long)]
        by: String,
    },

    Reject {
        transaction_id: String,
        #[arg(long)]
        by: String,
        #[arg(long)]
        reason: String,
    },

    /// Print aggregate transaction statistics.
    Stats,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
