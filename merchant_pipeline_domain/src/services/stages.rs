// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Narrow, single-method traits for the five pipeline stages. Stages are
//! pure functions of their input and the current rule set, so parallelism
//! across transactions is a throughput decision, not a correctness one
//! (§5, §9). Stages 1-4 never touch the Entity Registry and stay
//! synchronous; Stage 5 is the one stage with an async port (it reads and
//! writes the registry).
//!
//! The stage interfaces are narrow enough — one method each — that trait
//! objects buy nothing over static dispatch; callers generic over `S:
//! TypeDetector` monomorphize just as easily as they would box a `dyn`.

use async_trait::async_trait;

use crate::aggregates::PipelineRecord;
use crate::entities::RawTransaction;
use crate::error::CoreResult;
use crate::services::rules::RuleSet;

pub trait TypeDetector: Send + Sync {
    /// Classifies `transaction` and returns a record carrying `stage_1`.
    fn detect(&self, transaction: RawTransaction, rules: &RuleSet) -> PipelineRecord;
}

pub trait CounterpartyDetector: Send + Sync {
    /// Requires `record.stage_1` to be present with `merchant = true`.
    fn detect(&self, record: PipelineRecord, rules: &RuleSet) -> PipelineRecord;
}

pub trait NerExtractor: Send + Sync {
    fn extract(&self, record: PipelineRecord, rules: &RuleSet) -> PipelineRecord;
}

pub trait Disambiguator: Send + Sync {
    fn disambiguate(&self, record: PipelineRecord, rules: &RuleSet) -> PipelineRecord;
}

#[async_trait]
pub trait EntityResolver: Send + Sync {
    /// Resolves the entity for `record.stage_4.merchant_id` and attaches the
    /// six categorization dimensions. The only stage trait that is async:
    /// it is the one stage that touches the (I/O-bound) Entity Registry.
    async fn resolve(&self, record: PipelineRecord, rules: &RuleSet) -> CoreResult<PipelineRecord>;
}
