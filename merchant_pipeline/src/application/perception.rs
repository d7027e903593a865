// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The Perception API (§4.11): pure projections folding an Event Store
//! snapshot into derived views. Every function here is deterministic in
//! its snapshot — same `db` in, identical output out — and none of them
//! write back to the store.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use merchant_pipeline_domain::events::{Event, EventKind};
use serde_json::Value;

/// A snapshot of the event log handed to every projection. Built once per
/// read (via `EventStore::all_events` or `EventStore::query`) so a single
/// logical "as of" view is folded consistently across calls.
pub type Snapshot = [Event];

/// The folded, current view of one transaction.
#[derive(Debug, Clone, Default)]
pub struct TransactionView {
    pub transaction_id: String,
    pub imported_raw: Option<Value>,
    pub stage_1_type: Option<String>,
    pub classification: Option<Value>,
    pub correction: Option<Value>,
    pub verified_by: Option<String>,
    pub approved_by: Option<String>,
    pub rejected: bool,
    pub rejection_reason: Option<String>,
}

impl TransactionView {
    fn fold(&mut self, event: &Event) {
        match event.event_type {
            EventKind::TransactionImported => {
                self.imported_raw = event.data.get("raw").cloned();
                self.stage_1_type =
                    event.data.get("stage_1_type").and_then(Value::as_str).map(str::to_string);
            }
            EventKind::TransactionClassified => {
                self.classification = event.data.get("record").cloned();
            }
            EventKind::TransactionCorrected => {
                self.correction = event.data.get("correction").cloned();
            }
            EventKind::TransactionVerified => {
                self.verified_by =
                    event.data.get("verified_by").and_then(Value::as_str).map(str::to_string);
            }
            EventKind::ClassificationApproved => {
                self.approved_by =
                    event.data.get("approved_by").and_then(Value::as_str).map(str::to_string);
                self.rejected = false;
            }
            EventKind::ClassificationRejected => {
                self.rejected = true;
                self.rejection_reason =
                    event.data.get("reason").and_then(Value::as_str).map(str::to_string);
            }
            EventKind::ClassificationCorrected => {
                self.correction = event.data.get("correction").cloned();
                self.rejected = false;
            }
            _ => {}
        }
    }

    fn needs_verification(&self) -> bool {
        self.classification
            .as_ref()
            .and_then(|record| record.pointer("/stage_5/needs_verification"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    fn merchant_category(&self) -> Option<String> {
        self.classification
            .as_ref()
            .and_then(|record| record.pointer("/stage_5/merchant_category"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn transaction_type(&self) -> Option<&str> {
        self.stage_1_type.as_deref()
    }
}

/// The full current-state fold: one [`TransactionView`] per transaction id
/// that has at least one event.
pub fn project_current_state(db: &Snapshot) -> HashMap<String, TransactionView> {
    let mut views: HashMap<String, TransactionView> = HashMap::new();
    for event in db {
        let view = views.entry(event.entity_id.clone()).or_insert_with(|| TransactionView {
            transaction_id: event.entity_id.clone(),
            ..Default::default()
        });
        view.fold(event);
    }
    views
}

/// As [`project_current_state`], but only folding events with
/// `tx_time <= t`.
pub fn project_state_at(db: &Snapshot, t: DateTime<Utc>) -> HashMap<String, TransactionView> {
    let filtered: Vec<Event> = db.iter().filter(|e| e.tx_time <= t).cloned().collect();
    project_current_state(&filtered)
}

pub fn get_transaction(db: &Snapshot, id: &str) -> Option<TransactionView> {
    project_current_state(db).remove(id)
}

pub fn get_all_transactions(db: &Snapshot) -> Vec<TransactionView> {
    let mut views: Vec<TransactionView> = project_current_state(db).into_values().collect();
    views.sort_by(|a, b| a.transaction_id.cmp(&b.transaction_id));
    views
}

pub fn transactions_by_type(db: &Snapshot, transaction_type: &str) -> Vec<TransactionView> {
    get_all_transactions(db).into_iter().filter(|v| v.transaction_type() == Some(transaction_type)).collect()
}

pub fn transactions_by_category(db: &Snapshot, category: &str) -> Vec<TransactionView> {
    get_all_transactions(db)
        .into_iter()
        .filter(|v| v.merchant_category().as_deref() == Some(category))
        .collect()
}

pub fn transactions_by_merchant(db: &Snapshot, merchant_id: &str) -> Vec<TransactionView> {
    get_all_transactions(db)
        .into_iter()
        .filter(|v| {
            v.classification
                .as_ref()
                .and_then(|record| record.pointer("/stage_4/merchant_id"))
                .and_then(Value::as_str)
                == Some(merchant_id)
        })
        .collect()
}

/// Every event that touched `id`, in ascending `tx_time` order (the
/// snapshot is already ordered that way by the store, but this guards
/// callers that hand in an unordered slice).
pub fn transaction_history(db: &Snapshot, id: &str) -> Vec<Event> {
    let mut events: Vec<Event> = db.iter().filter(|e| e.entity_id == id).cloned().collect();
    events.sort_by_key(|e| e.tx_time);
    events
}

/// Transactions classified but not yet approved or rejected, and flagged
/// `needs_verification` by stage 5.
pub fn get_review_queue(db: &Snapshot) -> Vec<TransactionView> {
    get_all_transactions(db)
        .into_iter()
        .filter(|v| v.classification.is_some() && v.approved_by.is_none() && !v.rejected)
        .filter(|v| v.needs_verification())
        .collect()
}

/// Unresolved duplicate-candidate pairs: a `duplicate-detected` event with
/// no later `duplicate-resolved` for the same pair.
pub fn get_duplicate_candidates(db: &Snapshot) -> Vec<Event> {
    let resolved: std::collections::HashSet<(String, String)> = db
        .iter()
        .filter(|e| e.event_type == EventKind::DuplicateResolved)
        .filter_map(|e| {
            let source = e.data.get("source_id")?.as_str()?.to_string();
            let target = e.data.get("target_id")?.as_str()?.to_string();
            Some((source, target))
        })
        .collect();

    db.iter()
        .filter(|e| e.event_type == EventKind::DuplicateDetected)
        .filter(|e| {
            let a = e.data.get("entity_id_a").and_then(Value::as_str).unwrap_or_default();
            let b = e.data.get("entity_id_b").and_then(Value::as_str).unwrap_or_default();
            !resolved.contains(&(a.to_string(), b.to_string())) && !resolved.contains(&(b.to_string(), a.to_string()))
        })
        .cloned()
        .collect()
}

/// Balance reconciliations and any discrepancies raised against the same
/// account, newest-first per account.
pub fn get_reconciliations(db: &Snapshot) -> HashMap<String, Vec<Event>> {
    let mut by_account: HashMap<String, Vec<Event>> = HashMap::new();
    for event in db {
        if matches!(event.event_type, EventKind::BalanceReconciled | EventKind::DiscrepancyDetected) {
            by_account.entry(event.entity_id.clone()).or_default().push(event.clone());
        }
    }
    for events in by_account.values_mut() {
        events.sort_by_key(|e| std::cmp::Reverse(e.tx_time));
    }
    by_account
}

/// Aggregate counts and totals across every classified transaction.
#[derive(Debug, Clone, Default)]
pub struct TransactionStatistics {
    pub total: usize,
    pub counts_by_type: HashMap<String, usize>,
    pub counts_by_category: HashMap<String, usize>,
    pub pending_review: usize,
}

pub fn transaction_statistics(db: &Snapshot) -> TransactionStatistics {
    let views = get_all_transactions(db);
    let mut stats = TransactionStatistics { total: views.len(), ..Default::default() };
    for view in &views {
        if let Some(t) = view.transaction_type() {
            *stats.counts_by_type.entry(t.to_string()).or_insert(0) += 1;
        }
        if let Some(c) = view.merchant_category() {
            *stats.counts_by_category.entry(c).or_insert(0) += 1;
        }
        if view.classification.is_some() && view.approved_by.is_none() && !view.rejected && view.needs_verification() {
            stats.pending_review += 1;
        }
    }
    stats
}

/// One calendar month's rollup: transaction count and per-category counts,
/// keyed `"YYYY-MM"` by the transaction's `business_time`.
#[derive(Debug, Clone, Default)]
pub struct MonthlySummary {
    pub month: String,
    pub transaction_count: usize,
    pub counts_by_category: HashMap<String, usize>,
}

pub fn monthly_summary(db: &Snapshot) -> Vec<MonthlySummary> {
    let mut by_month: HashMap<String, MonthlySummary> = HashMap::new();
    let imported_time: HashMap<String, DateTime<Utc>> = db
        .iter()
        .filter(|e| e.event_type == EventKind::TransactionImported)
        .map(|e| (e.entity_id.clone(), e.business_time))
        .collect();

    for view in get_all_transactions(db) {
        let Some(business_time) = imported_time.get(&view.transaction_id) else { continue };
        let key = format!("{:04}-{:02}", business_time.year(), business_time.month());
        let entry = by_month.entry(key.clone()).or_insert_with(|| MonthlySummary { month: key, ..Default::default() });
        entry.transaction_count += 1;
        if let Some(category) = view.merchant_category() {
            *entry.counts_by_category.entry(category).or_insert(0) += 1;
        }
    }

    let mut summaries: Vec<MonthlySummary> = by_month.into_values().collect();
    summaries.sort_by(|a, b| a.month.cmp(&b.month));
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use merchant_pipeline_domain::events::EventMetadata;

    fn event(kind: EventKind, entity_id: &str, data: Value, business_time: DateTime<Utc>) -> Event {
        Event::new(kind, entity_id, business_time, business_time, data, EventMetadata::new("test", "test"))
    }

    #[test]
    fn project_current_state_folds_import_then_classification() {
        let t0 = DateTime::parse_from_rfc3339("2026-01-05T10:00:00Z").unwrap().with_timezone(&Utc);
        let events = vec![
            event(
                EventKind::TransactionImported,
                "tx-1",
                serde_json::json!({"raw": {"description": "UBER EATS"}, "stage_1_type": "card-purchase"}),
                t0,
            ),
            event(
                EventKind::TransactionClassified,
                "tx-1",
                serde_json::json!({"record": {"stage_5": {"merchant_category": "food", "needs_verification": true}}}),
                t0,
            ),
        ];
        let view = get_transaction(&events, "tx-1").unwrap();
        assert_eq!(view.stage_1_type.as_deref(), Some("card-purchase"));
        assert_eq!(view.merchant_category().as_deref(), Some("food"));
        assert!(view.needs_verification());
    }

    #[test]
    fn review_queue_excludes_approved_transactions() {
        let t0 = DateTime::parse_from_rfc3339("2026-01-05T10:00:00Z").unwrap().with_timezone(&Utc);
        let events = vec![
            event(
                EventKind::TransactionClassified,
                "tx-1",
                serde_json::json!({"record": {"stage_5": {"needs_verification": true}}}),
                t0,
            ),
            event(
                EventKind::TransactionClassified,
                "tx-2",
                serde_json::json!({"record": {"stage_5": {"needs_verification": true}}}),
                t0,
            ),
            event(
                EventKind::ClassificationApproved,
                "tx-2",
                serde_json::json!({"approved_by": "reviewer-1"}),
                t0,
            ),
        ];
        let queue = get_review_queue(&events);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].transaction_id, "tx-1");
    }

    #[test]
    fn monthly_summary_groups_by_import_business_time() {
        let jan = DateTime::parse_from_rfc3339("2026-01-15T00:00:00Z").unwrap().with_timezone(&Utc);
        let feb = DateTime::parse_from_rfc3339("2026-02-01T00:00:00Z").unwrap().with_timezone(&Utc);
        let events = vec![
            event(EventKind::TransactionImported, "tx-1", serde_json::json!({"stage_1_type": "card-purchase"}), jan),
            event(EventKind::TransactionImported, "tx-2", serde_json::json!({"stage_1_type": "card-purchase"}), feb),
        ];
        let summaries = monthly_summary(&events);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].month, "2026-01");
        assert_eq!(summaries[1].month, "2026-02");
    }
}
