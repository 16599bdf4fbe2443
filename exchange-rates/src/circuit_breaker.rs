//! Circuit breaker guarding calls to the rate provider.
//!
//! After `failure_threshold` consecutive failures the breaker opens and
//! rejects calls without touching the network. Once `reset_timeout` has
//! elapsed a single trial call is let through (half-open): success closes the
//! breaker, failure opens it for another cooldown.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use converter_types::ExchangeError;

/// Consecutive failures before the breaker opens.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Cooldown before an open breaker lets a trial call through.
pub const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

impl BreakerState {
    fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            trial_in_flight: false,
        }
    }

    /// Decides whether a call may start at `now`.
    fn acquire(&mut self, now: Instant, config: &CircuitBreakerConfig) -> bool {
        match self.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let cooled_down = self
                    .opened_at
                    .is_none_or(|opened| now.duration_since(opened) >= config.reset_timeout);
                if cooled_down {
                    self.state = CircuitState::HalfOpen;
                    self.trial_in_flight = true;
                }
                cooled_down
            }
            CircuitState::HalfOpen => {
                if self.trial_in_flight {
                    false
                } else {
                    self.trial_in_flight = true;
                    true
                }
            }
        }
    }

    fn succeed(&mut self) {
        *self = Self::closed();
    }

    fn fail(&mut self, now: Instant, config: &CircuitBreakerConfig) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.trial_in_flight = false;

        let trips = match self.state {
            CircuitState::HalfOpen => true,
            CircuitState::Closed => self.consecutive_failures >= config.failure_threshold,
            CircuitState::Open => false,
        };
        if trips {
            self.state = CircuitState::Open;
            self.opened_at = Some(now);
        }
    }
}

/// Stateful failure counter shared by every call through one client.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerState::closed()),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state as last recorded. An open breaker whose cooldown has
    /// passed still reports `Open` until the next call tries it.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    /// Runs `call` if the breaker allows it and records the outcome.
    ///
    /// Rejected calls return [`ExchangeError::CircuitOpen`] without running
    /// `call`. A call dropped before completing counts as a failure.
    pub async fn call<F, Fut, T>(&self, call: F) -> Result<T, ExchangeError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ExchangeError>>,
    {
        self.try_acquire(Instant::now())?;

        let mut permit = Permit {
            breaker: self,
            settled: false,
        };
        let result = call().await;
        permit.settled = true;

        match &result {
            Ok(_) => self.record_success(),
            Err(_) => self.record_failure(Instant::now()),
        }
        result
    }

    fn try_acquire(&self, now: Instant) -> Result<(), ExchangeError> {
        if self.lock().acquire(now, &self.config) {
            Ok(())
        } else {
            tracing::warn!("Circuit breaker open, rejecting call to rate provider");
            Err(ExchangeError::CircuitOpen)
        }
    }

    fn record_success(&self) {
        let mut state = self.lock();
        if state.state != CircuitState::Closed {
            tracing::info!("Circuit breaker closed after successful trial call");
        }
        state.succeed();
    }

    fn record_failure(&self, now: Instant) {
        let mut state = self.lock();
        let was_open = state.state == CircuitState::Open;
        state.fail(now, &self.config);
        if !was_open && state.state == CircuitState::Open {
            tracing::warn!(
                failures = state.consecutive_failures,
                cooldown_secs = self.config.reset_timeout.as_secs(),
                "Circuit breaker opened"
            );
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks an admitted call as failed if it is dropped mid-flight.
struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    settled: bool,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.record_failure(Instant::now());
        }
    }
}
