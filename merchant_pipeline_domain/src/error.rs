// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Error taxonomy for the merchant extraction core.
//!
//! Every error carries enough context to decide, at the call site, whether
//! the failure is recoverable. Pipeline stages never let an error cross the
//! stage boundary: a `StageFailure` becomes an annotation on the
//! `PipelineRecord`, not a propagated error. The Process API is the only
//! layer that surfaces errors to callers (storage failures), matching the
//! propagation policy.

use std::fmt;

/// Broad category an error falls into, used for metrics and logging without
/// matching on the full variant set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    RuleLoading,
    Validation,
    Stage,
    Store,
    Entity,
    MachineLearning,
    Configuration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::RuleLoading => "rule-loading",
            Self::Validation => "validation",
            Self::Stage => "stage",
            Self::Store => "store",
            Self::Entity => "entity",
            Self::MachineLearning => "machine-learning",
            Self::Configuration => "configuration",
        };
        write!(f, "{s}")
    }
}

/// The error type returned by domain operations.
///
/// `DuplicateDetected` is intentionally absent: per spec, a duplicate append
/// is informational (`AppendResult { duplicate: true, .. }`), not an error.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("rule load error: {message}")]
    RuleLoadError { message: String },

    #[error("validation error on {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("stage {stage} failure: {message}")]
    StageFailure { stage: u8, message: String },

    #[error("store append error: {message}")]
    StoreAppendError { message: String },

    #[error("store read error: {message}")]
    StoreReadError { message: String },

    #[error("entity not found: {entity_id}")]
    EntityNotFound { entity_id: String },

    #[error("entity cycle detected starting at {entity_id}")]
    EntityCycleDetected { entity_id: String },

    #[error("merge chain too deep (> {max_depth}) starting at {entity_id}")]
    MergeChainTooDeep { entity_id: String, max_depth: u32 },

    #[error("ml oracle timed out after {timeout_ms}ms")]
    MLTimeout { timeout_ms: u64 },

    #[error("ml oracle unavailable: circuit open")]
    MLUnavailable,

    #[error("ml oracle returned an invalid response: {message}")]
    MLInvalidResponse { message: String },

    #[error("configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::RuleLoadError { .. } => ErrorCategory::RuleLoading,
            Self::ValidationError { .. } => ErrorCategory::Validation,
            Self::StageFailure { .. } => ErrorCategory::Stage,
            Self::StoreAppendError { .. } | Self::StoreReadError { .. } => ErrorCategory::Store,
            Self::EntityNotFound { .. }
            | Self::EntityCycleDetected { .. }
            | Self::MergeChainTooDeep { .. } => ErrorCategory::Entity,
            Self::MLTimeout { .. } | Self::MLUnavailable | Self::MLInvalidResponse { .. } => {
                ErrorCategory::MachineLearning
            }
            Self::ConfigurationError { .. } => ErrorCategory::Configuration,
            Self::Io(_) | Self::Serialization(_) => ErrorCategory::Store,
        }
    }

    /// Whether a caller can reasonably retry the operation that produced
    /// this error without changing anything else first.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::StoreReadError { .. }
                | Self::MLTimeout { .. }
                | Self::MLUnavailable
                | Self::ValidationError { .. }
        )
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
