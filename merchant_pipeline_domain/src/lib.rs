// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Merchant Pipeline Domain
//!
//! Pure domain layer for the merchant extraction and classification core:
//! entities, value objects, domain events, aggregates, domain services, and
//! repository ports. No tokio runtime, no file I/O, no HTTP — this crate
//! only depends on an async runtime at its two repository port boundaries
//! (`EventStore`, `EntityRegistry`, `RulesSource`), exactly as those are the
//! only I/O-bound collaborators this system has.
//!
//! ## Architecture
//!
//! Following Clean Architecture, this crate sits beneath the application
//! and infrastructure layers and depends on neither:
//!
//! - [`entities`] — objects with a stable identity (`Entity`,
//!   `RawTransaction`).
//! - [`value_objects`] — immutable attribute-defined types (`EntityId`,
//!   `Confidence`, `Money`, `NormalizedText`, `IdempotencyHash`).
//! - [`events`] — the append-only facts that are the system of record.
//! - [`aggregates`] — `PipelineRecord`, the accumulator carried through
//!   stages 1-5.
//! - [`services`] — stage traits, rule data shapes, the ML oracle contract,
//!   the entity graph.
//! - [`repositories`] — the `EventStore`, `EntityRegistry`, and
//!   `RulesSource` ports.
//! - [`error`] — the `CoreError` taxonomy shared across every layer.

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use aggregates::PipelineRecord;
pub use entities::{Entity, EntityState, EntityType, RawTransaction};
pub use error::{CoreError, CoreResult};
pub use events::{Event, EventKind};
pub use repositories::{EntityRegistry, EventStore, RulesSource};
pub use value_objects::{Confidence, EntityId, IdempotencyHash, Money};
