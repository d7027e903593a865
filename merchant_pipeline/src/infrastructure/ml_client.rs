// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A circuit-breaker- and retry-wrapped `MlOracle` decorator (§5). The
//! actual remote call is out of scope here — this wraps any `MlOracle` and
//! applies the timeout, exponential-backoff retry, and per-destination
//! circuit breaker the domain contract fixes, so every concrete oracle
//! transport degrades identically.

use std::time::Instant;

use async_trait::async_trait;
use merchant_pipeline_domain::error::{CoreError, CoreResult};
use merchant_pipeline_domain::services::ml_oracle::{CircuitBreakerConfig, MlOracle, RetryPolicy};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

struct BreakerInner {
    state: BreakerState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    opened_at: Option<Instant>,
}

/// Wraps `inner` with the circuit-breaker / retry / timeout contract. One
/// instance should be shared (behind an `Arc`) per remote destination.
pub struct CircuitBreakerMlOracle<O: MlOracle> {
    inner: O,
    retry: RetryPolicy,
    breaker: CircuitBreakerConfig,
    state: Mutex<BreakerInner>,
}

impl<O: MlOracle> CircuitBreakerMlOracle<O> {
    pub fn new(inner: O, retry: RetryPolicy, breaker: CircuitBreakerConfig) -> Self {
        Self {
            inner,
            retry,
            breaker,
            state: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                consecutive_successes: 0,
                opened_at: None,
            }),
        }
    }

    fn admit_call(&self) -> Result<(), CoreError> {
        let mut state = self.state.lock();
        match state.state {
            BreakerState::Closed => Ok(()),
            BreakerState::Open => {
                let elapsed = state.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                if elapsed >= self.breaker.open_duration {
                    state.state = BreakerState::HalfOpen;
                    state.consecutive_successes = 0;
                    Ok(())
                } else {
                    Err(CoreError::MLUnavailable)
                }
            }
            BreakerState::HalfOpen => Ok(()),
        }
    }

    fn record_success(&self) {
        let mut state = self.state.lock();
        match state.state {
            BreakerState::HalfOpen => {
                state.consecutive_successes += 1;
                if state.consecutive_successes >= self.breaker.success_threshold {
                    state.state = BreakerState::Closed;
                    state.consecutive_failures = 0;
                    state.consecutive_successes = 0;
                }
            }
            BreakerState::Closed => {
                state.consecutive_failures = 0;
            }
            BreakerState::Open => {}
        }
    }

    fn record_failure(&self) {
        let mut state = self.state.lock();
        match state.state {
            BreakerState::Closed => {
                state.consecutive_failures += 1;
                if state.consecutive_failures >= self.breaker.failure_threshold {
                    state.state = BreakerState::Open;
                    state.opened_at = Some(Instant::now());
                }
            }
            BreakerState::HalfOpen => {
                state.state = BreakerState::Open;
                state.opened_at = Some(Instant::now());
                state.consecutive_successes = 0;
            }
            BreakerState::Open => {}
        }
    }
}

#[async_trait]
impl<O: MlOracle> MlOracle for CircuitBreakerMlOracle<O> {
    async fn suggest(&self, clean_merchant: &str, context: Value) -> CoreResult<Value> {
        self.admit_call()?;

        let mut last_err = CoreError::MLUnavailable;
        for attempt in 0..self.retry.max_attempts {
            let call = self.inner.suggest(clean_merchant, context.clone());
            let outcome = tokio::time::timeout(self.breaker.call_timeout, call).await;
            match outcome {
                Ok(Ok(value)) => {
                    self.record_success();
                    return Ok(value);
                }
                Ok(Err(e)) => {
                    last_err = e;
                }
                Err(_) => {
                    last_err = CoreError::MLTimeout { timeout_ms: self.breaker.call_timeout.as_millis() as u64 };
                }
            }
            self.record_failure();
            if attempt + 1 < self.retry.max_attempts {
                sleep(self.retry.backoff_for_attempt(attempt)).await;
            }
        }
        Err(last_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyOracle {
        failures_before_success: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl MlOracle for FlakyOracle {
        async fn suggest(&self, _clean_merchant: &str, _context: Value) -> CoreResult<Value> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err(CoreError::MLInvalidResponse { message: "flaky".to_string() })
            } else {
                Ok(serde_json::json!({"merchant": "ok"}))
            }
        }
    }

    #[tokio::test]
    async fn retries_until_success_within_max_attempts() {
        let oracle = CircuitBreakerMlOracle::new(
            FlakyOracle { failures_before_success: 1, calls: AtomicU32::new(0) },
            RetryPolicy { initial_backoff: std::time::Duration::from_millis(1), ..RetryPolicy::default() },
            CircuitBreakerConfig::default(),
        );
        let result = oracle.suggest("STARBUCKS", serde_json::json!({})).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn opens_after_consecutive_failures_and_rejects_fast() {
        let oracle = CircuitBreakerMlOracle::new(
            FlakyOracle { failures_before_success: u32::MAX, calls: AtomicU32::new(0) },
            RetryPolicy { initial_backoff: std::time::Duration::from_millis(1), max_attempts: 1, ..RetryPolicy::default() },
            CircuitBreakerConfig { failure_threshold: 2, ..CircuitBreakerConfig::default() },
        );
        let _ = oracle.suggest("X", serde_json::json!({})).await;
        let _ = oracle.suggest("X", serde_json::json!({})).await;
        let third = oracle.suggest("X", serde_json::json!({})).await;
        assert!(matches!(third, Err(CoreError::MLUnavailable)));
    }
}
