// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The Rules Loader (§4.3): loads rule tables as pure data, validates them,
//! and swaps the active set atomically so readers never observe a partially
//! loaded table. Invalid rules are rejected wholesale; the previously loaded
//! set stays active.

use std::sync::Arc;

use arc_swap::ArcSwap;
use merchant_pipeline_domain::error::{CoreError, CoreResult};
use merchant_pipeline_domain::repositories::{RuleTableKind, RulesSource};
use merchant_pipeline_domain::services::rules::RuleSet;

/// Diagnostics for a load/reload attempt, supplementing the spec's pass/fail
/// contract with enough detail for a caller to show *why* a reload failed.
#[derive(Debug, Clone, Default)]
pub struct RuleLoadReport {
    pub accepted: bool,
    pub type_detector_count: usize,
    pub counterparty_count: usize,
    pub disambiguation_count: usize,
    pub mcc_count: usize,
    pub rejection_reason: Option<String>,
}

pub struct RulesLoader<S: RulesSource> {
    source: S,
    active: ArcSwap<RuleSet>,
}

impl<S: RulesSource> RulesLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source, active: ArcSwap::from_pointee(RuleSet::default()) }
    }

    pub fn current(&self) -> Arc<RuleSet> {
        self.active.load_full()
    }

    /// Loads (or reloads) every table, validates the combined set, and
    /// swaps it in atomically only if validation passes. On rejection, the
    /// previously active set remains untouched.
    pub async fn load(&self) -> CoreResult<RuleLoadReport> {
        let mut candidate = RuleSet::default();

        if let Some(bytes) = self.source.load_raw(RuleTableKind::TypeDetector).await? {
            candidate.type_detector = parse_json(&bytes)?;
        }
        if let Some(bytes) = self.source.load_raw(RuleTableKind::Counterparty).await? {
            candidate.counterparty = parse_json(&bytes)?;
        }
        if let Some(bytes) = self.source.load_raw(RuleTableKind::Disambiguation).await? {
            candidate.disambiguation = parse_json(&bytes)?;
        }
        if let Some(bytes) = self.source.load_raw(RuleTableKind::MccTable).await? {
            candidate.mcc_table = parse_json(&bytes)?;
        }

        candidate.sort_by_priority();

        if let Err(reason) = candidate.validate() {
            return Ok(RuleLoadReport { accepted: false, rejection_reason: Some(reason), ..Default::default() });
        }

        let report = RuleLoadReport {
            accepted: true,
            type_detector_count: candidate.type_detector.len(),
            counterparty_count: candidate.counterparty.len(),
            disambiguation_count: candidate.disambiguation.len(),
            mcc_count: candidate.mcc_table.len(),
            rejection_reason: None,
        };
        self.active.store(Arc::new(candidate));
        Ok(report)
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> CoreResult<Vec<T>> {
    serde_json::from_slice(bytes).map_err(|e| CoreError::RuleLoadError { message: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedSource {
        type_detector: &'static str,
    }

    #[async_trait]
    impl RulesSource for FixedSource {
        async fn load_raw(&self, table: RuleTableKind) -> CoreResult<Option<Vec<u8>>> {
            match table {
                RuleTableKind::TypeDetector => Ok(Some(self.type_detector.as_bytes().to_vec())),
                _ => Ok(None),
            }
        }
    }

    #[tokio::test]
    async fn invalid_rules_are_rejected_wholesale_and_old_set_persists() {
        let good = FixedSource {
            type_detector: r#"[{"common":{"id":"a","pattern":"FOO","priority":1,"confidence":0.9,"enabled":true},"required_field":null,"transaction_type":"card-purchase","direction":"Expense","merchant":true}]"#,
        };
        let loader = RulesLoader::new(good);
        let report = loader.load().await.unwrap();
        assert!(report.accepted);
        assert_eq!(loader.current().type_detector.len(), 1);

        let bad = FixedSource { type_detector: "not json" };
        let loader = RulesLoader::new(bad);
        let report = loader.load().await;
        assert!(report.is_err());
    }
}
