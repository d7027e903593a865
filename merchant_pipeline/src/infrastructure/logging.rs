// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Structured logging setup via `tracing`. Background workers log and
//! continue on error per §7's propagation policy; this module only wires
//! the subscriber, it does not change what gets logged where.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Installs a global `tracing` subscriber. `log_level` is a
/// `tracing_subscriber::EnvFilter` directive (e.g. `"info"`,
/// `"merchant_pipeline=debug,warn"`); `RUST_LOG`, if set, still overrides it.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true).with_level(true);
    let _ = Registry::default().with(filter).with(fmt_layer).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_does_not_panic_on_repeated_calls() {
        init("info");
        init("debug");
    }
}
