// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. parser::parse_cli()             │  Parse CLI with clap
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validator::SecureArgParser      │  Security validation
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedCli                    │  Safe, validated config
//! └─────────────────────────────────────┘
//! ```

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, Cli, Commands};
pub use validator::{ParseError, SecureArgParser};

use std::path::PathBuf;

/// Validated CLI configuration, all paths canonicalized and free-form
/// strings checked for shell/path-traversal hazards.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub workers: Option<usize>,
    pub store_uri: Option<String>,
    pub rules_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Import { input: PathBuf },
    ReloadRules,
    ShowTransaction { transaction_id: String },
    ReviewQueue,
    Approve { transaction_id: String, by: String },
    Reject { transaction_id: String, by: String, reason: String },
    Stats,
}

pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parser::parse_cli();
    validate_cli(cli)
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    if let Some(ref path) = cli.config {
        SecureArgParser::validate_argument(&path.to_string_lossy())?;
    }
    if let Some(ref path) = cli.rules_dir {
        SecureArgParser::validate_argument(&path.to_string_lossy())?;
    }
    if let Some(ref uri) = cli.store_uri {
        SecureArgParser::validate_argument(uri)?;
    }
    if let Some(workers) = cli.workers {
        if workers == 0 || workers > 256 {
            return Err(ParseError::InvalidValue {
                arg: "workers".to_string(),
                reason: "must be between 1 and 256".to_string(),
            });
        }
    }

    let command = match cli.command {
        Commands::Import { input } => {
            let validated_input = SecureArgParser::validate_path(&input.to_string_lossy())?;
            ValidatedCommand::Import { input: validated_input }
        }
        Commands::ReloadRules => ValidatedCommand::ReloadRules,
        Commands::ShowTransaction { transaction_id } => {
            SecureArgParser::validate_argument(&transaction_id)?;
            ValidatedCommand::ShowTransaction { transaction_id }
        }
        Commands::ReviewQueue => ValidatedCommand::ReviewQueue,
        Commands::Approve { transaction_id, by } => {
            SecureArgParser::validate_argument(&transaction_id)?;
            SecureArgParser::validate_argument(&by)?;
            ValidatedCommand::Approve { transaction_id, by }
        }
        Commands::Reject { transaction_id, by, reason } => {
            SecureArgParser::validate_argument(&transaction_id)?;
            SecureArgParser::validate_argument(&by)?;
            SecureArgParser::validate_argument(&reason)?;
            ValidatedCommand::Reject { transaction_id, by, reason }
        }
        Commands::Stats => ValidatedCommand::Stats,
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        config: cli.config,
        workers: cli.workers,
        store_uri: cli.store_uri,
        rules_dir: cli.rules_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_workers() {
        let cli = Cli {
            command: Commands::Stats,
            verbose: false,
            config: None,
            workers: Some(0),
            store_uri: None,
            rules_dir: None,
        };
        assert!(validate_cli(cli).is_err());
    }

    #[test]
    fn accepts_stats_with_no_overrides() {
        let cli = Cli {
            command: Commands::Stats,
            verbose: false,
            config: None,
            workers: None,
            store_uri: None,
            rules_dir: None,
        };
        assert!(validate_cli(cli).is_ok());
    }
}
