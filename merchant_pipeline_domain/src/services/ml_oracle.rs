// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The `MlOracle` port: the remote merchant/category/anomaly detector that
//! stages 4 and 5 may optionally consult. Per §1 this collaborator is
//! out of scope beyond its interface; per §5 it is wrapped in a
//! timeout/retry/circuit-breaker contract that the domain fixes here so
//! every infrastructure implementation degrades the same way.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CoreResult;

#[async_trait]
pub trait MlOracle: Send + Sync {
    /// Sends `clean_merchant` (and any other context) to the oracle and
    /// returns its raw JSON suggestion. Callers apply the timeout and
    /// circuit-breaker policy around this call; the trait itself does not.
    async fn suggest(&self, clean_merchant: &str, context: Value) -> CoreResult<Value>;
}

/// Retry policy: exponential backoff, initial 1s, multiplier 2.0, max 10s,
/// max 3 attempts (§5).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub initial_backoff: Duration,
    pub multiplier: f64,
    pub max_backoff: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_secs(1),
            multiplier: 2.0,
            max_backoff: Duration::from_secs(10),
            max_attempts: 3,
        }
    }
}

impl RetryPolicy {
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let scaled = self.initial_backoff.as_secs_f64() * self.multiplier.powi(attempt as i32);
        Duration::from_secs_f64(scaled.min(self.max_backoff.as_secs_f64()))
    }
}

/// Per-destination circuit breaker configuration: `closed -> open` after 5
/// consecutive failures; `open -> half-open` after 60s; `half-open ->
/// closed` after 3 consecutive successes (§5). The state machine itself
/// lives in the infrastructure layer (it is stateful and time-driven); this
/// struct is the pure configuration the domain contract fixes.
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub open_duration: Duration,
    pub success_threshold: u32,
    pub call_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_duration: Duration::from_secs(60),
            success_threshold: 3,
            call_timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_respects_the_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for_attempt(0), Duration::from_secs(1));
        assert_eq!(policy.backoff_for_attempt(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_for_attempt(10), Duration::from_secs(10));
    }
}
