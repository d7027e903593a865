// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The `RulesSource` port: where rule tables come from (§4.3, §6). The
//! domain fixes what a rule table looks like ([`crate::services::rules`]);
//! this port only fixes where the raw bytes come from, leaving the
//! serialization format a free choice of the infrastructure layer.

use async_trait::async_trait;

use crate::error::CoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleTableKind {
    TypeDetector,
    Counterparty,
    Disambiguation,
    MccTable,
}

#[async_trait]
pub trait RulesSource: Send + Sync {
    /// Returns the raw bytes of the named table, or `Ok(None)` if the
    /// source has no such table (e.g. an optional MCC table).
    async fn load_raw(&self, table: RuleTableKind) -> CoreResult<Option<Vec<u8>>>;
}
