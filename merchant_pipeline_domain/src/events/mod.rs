// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain events: the append-only facts that are the system of record.

pub mod domain_event;
pub mod event_type;
pub mod payloads;

pub use domain_event::{EventCategory, EventPayload};
pub use event_type::{Event, EventKind, EventMetadata};
