// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Event payload categorization and validation.
//!
//! Payload types implement [`EventPayload`] to declare their event name,
//! category, and any structural invariants the Process API should enforce
//! before handing the payload to the Event Store (see
//! [`crate::events::event_type`]).

use serde::{Deserialize, Serialize};

/// Categories for domain events, used for routing and metrics without
/// matching on the full event-kind taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCategory {
    Transaction,
    Entity,
    Reconciliation,
    Review,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Transaction => "transaction",
            Self::Entity => "entity",
            Self::Reconciliation => "reconciliation",
            Self::Review => "review",
        };
        write!(f, "{s}")
    }
}

/// Implemented by event payload types to provide a name, a category, and
/// optional validation.
pub trait EventPayload: Send + Sync + Clone + Serialize {
    fn event_name(&self) -> &'static str;
    fn event_category(&self) -> EventCategory;

    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}
