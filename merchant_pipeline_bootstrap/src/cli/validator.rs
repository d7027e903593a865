// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Security validation for CLI arguments: path traversal prevention and
//! rejection of control characters/shell metacharacters in free-form
//! strings (merchant names, rejection reasons) before they reach the
//! pipeline or a log line.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid value for --{arg}: {reason}")]
    InvalidValue { arg: String, reason: String },

    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("argument contains disallowed characters: {0}")]
    UnsafeArgument(String),
}

pub struct SecureArgParser;

impl SecureArgParser {
    /// Rejects null bytes, path traversal segments (`..`), and the control
    /// characters that never appear in a legitimate transaction id, merchant
    /// name, or rejection reason.
    pub fn validate_argument(value: &str) -> Result<(), ParseError> {
        if value.contains('\0') {
            return Err(ParseError::UnsafeArgument(value.to_string()));
        }
        if value.split('/').any(|segment| segment == "..") {
            return Err(ParseError::UnsafeArgument(value.to_string()));
        }
        if value.chars().any(|c| c.is_control() && c != '\t') {
            return Err(ParseError::UnsafeArgument(value.to_string()));
        }
        Ok(())
    }

    /// Validates a path argument that must already exist on disk, returning
    /// its canonical form.
    pub fn validate_path(value: &str) -> Result<PathBuf, ParseError> {
        Self::validate_argument(value)?;
        let path = PathBuf::from(value);
        path.canonicalize().map_err(|_| ParseError::PathNotFound(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_traversal() {
        assert!(SecureArgParser::validate_argument("../../etc/passwd").is_err());
    }

    #[test]
    fn rejects_null_byte() {
        assert!(SecureArgParser::validate_argument("tx-123\0").is_err());
    }

    #[test]
    fn accepts_ordinary_transaction_id() {
        assert!(SecureArgParser::validate_argument("tx-2026-07-0001").is_ok());
    }

    #[test]
    fn validate_path_rejects_missing_file() {
        assert!(matches!(
            SecureArgParser::validate_path("/nonexistent/path/file.jsonl"),
            Err(ParseError::PathNotFound(_))
        ));
    }
}
