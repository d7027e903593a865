// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Unix exit code mapping (`sysexits.h`), so a failed run tells a shell
//! script *what kind* of failure it was without parsing stderr.

use std::process::ExitCode as ProcessExitCode;

use merchant_pipeline_domain::error::{CoreError, ErrorCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Ok = 0,
    /// EX_USAGE - command line usage error
    Usage = 64,
    /// EX_DATAERR - input data was incorrect
    DataErr = 65,
    /// EX_UNAVAILABLE - a service is unavailable
    Unavailable = 69,
    /// EX_SOFTWARE - internal software error
    Software = 70,
    /// EX_IOERR - an error occurred while doing I/O
    IoErr = 74,
    /// EX_CONFIG - configuration error
    Config = 78,
}

impl From<ExitCode> for ProcessExitCode {
    fn from(code: ExitCode) -> Self {
        ProcessExitCode::from(code as u8)
    }
}

pub fn map_error_to_exit_code(error: &CoreError) -> ExitCode {
    match error.category() {
        ErrorCategory::Configuration => ExitCode::Config,
        ErrorCategory::RuleLoading | ErrorCategory::Validation => ExitCode::DataErr,
        ErrorCategory::MachineLearning => ExitCode::Unavailable,
        ErrorCategory::Store => ExitCode::IoErr,
        ErrorCategory::Stage | ErrorCategory::Entity => ExitCode::Software,
    }
}

pub fn result_to_exit_code(result: Result<(), CoreError>) -> ProcessExitCode {
    match result {
        Ok(()) => ExitCode::Ok.into(),
        Err(e) => {
            tracing::error!("{e}");
            map_error_to_exit_code(&e).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_map_to_config_exit_code() {
        let err = CoreError::ConfigurationError { message: "bad".to_string() };
        assert_eq!(map_error_to_exit_code(&err), ExitCode::Config);
    }

    #[test]
    fn ml_unavailable_maps_to_unavailable() {
        assert_eq!(map_error_to_exit_code(&CoreError::MLUnavailable), ExitCode::Unavailable);
    }
}
