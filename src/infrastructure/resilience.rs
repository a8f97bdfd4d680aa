use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Parameters for the timeout/retry/circuit-breaker wrapper around a remote
/// call.
#[derive(Debug, Clone)]
pub struct ResiliencePolicy {
    /// Upper bound on a single remote call.
    pub call_timeout: Duration,
    /// Total attempts per request, transient failures only.
    pub max_attempts: u32,
    /// Consecutive failed requests before the breaker opens.
    pub failure_threshold: u32,
    /// How long the breaker stays open before probing again.
    pub cooldown: Duration,
}

impl Default for ResiliencePolicy {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(2),
            max_attempts: 3,
            failure_threshold: 5,
            cooldown: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum BreakerState {
    Closed { consecutive_failures: u32 },
    Open { since: Instant },
    HalfOpen,
}

/// Per-dependency circuit breaker.
///
/// Closed until `failure_threshold` consecutive failures, then open: calls
/// are refused without touching the network until `cooldown` elapses, at
/// which point the breaker half-opens and admits probes. A probe success
/// closes it again; a probe failure re-opens it for another cooldown.
pub struct CircuitBreaker {
    failure_threshold: u32,
    cooldown: Duration,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            failure_threshold,
            cooldown,
            state: Mutex::new(BreakerState::Closed {
                consecutive_failures: 0,
            }),
        }
    }

    /// Whether a call may proceed. Transitions open to half-open once the
    /// cooldown has elapsed.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().expect("breaker lock poisoned");
        match *state {
            BreakerState::Closed { .. } | BreakerState::HalfOpen => true,
            BreakerState::Open { since } => {
                if since.elapsed() >= self.cooldown {
                    *state = BreakerState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock().expect("breaker lock poisoned");
        *state = BreakerState::Closed {
            consecutive_failures: 0,
        };
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock().expect("breaker lock poisoned");
        *state = match *state {
            BreakerState::Closed {
                consecutive_failures,
            } => {
                let failures = consecutive_failures + 1;
                if failures >= self.failure_threshold {
                    BreakerState::Open {
                        since: Instant::now(),
                    }
                } else {
                    BreakerState::Closed {
                        consecutive_failures: failures,
                    }
                }
            }
            // a failed probe re-arms the full cooldown
            BreakerState::HalfOpen => BreakerState::Open {
                since: Instant::now(),
            },
            open @ BreakerState::Open { .. } => open,
        };
    }

    pub fn is_open(&self) -> bool {
        matches!(
            *self.state.lock().expect("breaker lock poisoned"),
            BreakerState::Open { .. }
        )
    }
}
