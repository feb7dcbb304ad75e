//! Per-source circuit breaker
//!
//! Closed → Open after `failure_threshold` consecutive failures.
//! Open → HalfOpen once `cooldown` has elapsed. HalfOpen admits a single trial
//! request and rejects the rest until it reports back: success closes the
//! circuit, failure re-opens it for another cooldown.

use serde::Serialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Externally visible breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
enum Inner {
    Closed { consecutive_failures: u32 },
    Open { opened_at: Instant },
    HalfOpen { trial_in_flight: bool },
}

/// Circuit breaker guarding one source adapter
#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    cooldown: Duration,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            cooldown,
            inner: Mutex::new(Inner::Closed {
                consecutive_failures: 0,
            }),
        }
    }

    /// Whether a request may be attempted now
    pub async fn allow_request(&self) -> bool {
        let mut inner = self.inner.lock().await;

        match *inner {
            Inner::Closed { .. } => true,
            Inner::HalfOpen { trial_in_flight } => {
                if trial_in_flight {
                    false
                } else {
                    *inner = Inner::HalfOpen {
                        trial_in_flight: true,
                    };
                    true
                }
            }
            Inner::Open { opened_at } => {
                if opened_at.elapsed() >= self.cooldown {
                    tracing::debug!("Circuit cooldown elapsed, allowing trial request");
                    *inner = Inner::HalfOpen {
                        trial_in_flight: true,
                    };
                    true
                } else {
                    false
                }
            }
        }
    }

    pub async fn record_success(&self) {
        let mut inner = self.inner.lock().await;
        *inner = Inner::Closed {
            consecutive_failures: 0,
        };
    }

    pub async fn record_failure(&self) {
        let mut inner = self.inner.lock().await;

        let next = match *inner {
            Inner::Closed {
                consecutive_failures,
            } => {
                let failures = consecutive_failures + 1;
                if failures >= self.failure_threshold {
                    tracing::warn!(failures, "Circuit opened after consecutive failures");
                    Inner::Open {
                        opened_at: Instant::now(),
                    }
                } else {
                    Inner::Closed {
                        consecutive_failures: failures,
                    }
                }
            }
            Inner::HalfOpen { .. } => {
                tracing::warn!("Trial request failed, circuit re-opened");
                Inner::Open {
                    opened_at: Instant::now(),
                }
            }
            Inner::Open { opened_at } => Inner::Open { opened_at },
        };

        *inner = next;
    }

    pub async fn state(&self) -> BreakerState {
        match *self.inner.lock().await {
            Inner::Closed { .. } => BreakerState::Closed,
            Inner::Open { .. } => BreakerState::Open,
            Inner::HalfOpen { .. } => BreakerState::HalfOpen,
        }
    }
}
