//! Rate limiting middleware using Governor.
//!
//! One token bucket per caller, keyed on the `user-id` header.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    middleware::NoOpMiddleware,
    state::keyed::DefaultKeyedStateStore,
};
use serde_json::json;
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tokio::time::MissedTickBehavior;

use converter_types::USER_ID_HEADER;

/// Requests per minute granted to each caller by default.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 100;

/// How often callers with a full bucket are dropped from the limiter.
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

const ANONYMOUS: &str = "anonymous";

/// Rate limiter state shared across requests.
///
/// Callers are keys of a single governor limiter, so an idle caller costs
/// one map entry until the next [`prune`](Self::prune).
pub struct RateLimiterState<C: Clock = DefaultClock> {
    limiter: RateLimiter<String, DefaultKeyedStateStore<String>, C, NoOpMiddleware<C::Instant>>,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::per_minute(DEFAULT_REQUESTS_PER_MINUTE)
    }
}

impl RateLimiterState {
    /// Allows `requests` per minute per caller, as a burst refilled evenly.
    /// Zero is treated as one.
    pub fn per_minute(requests: u32) -> Self {
        Self::with_clock(requests, DefaultClock::default())
    }
}

impl<C: Clock> RateLimiterState<C> {
    pub fn with_clock(requests: u32, clock: C) -> Self {
        let burst = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::new(
                Quota::per_minute(burst),
                DefaultKeyedStateStore::default(),
                clock,
            ),
        }
    }

    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, key: &str) -> bool {
        self.limiter.check_key(&key.to_string()).is_ok()
    }

    /// Number of callers currently tracked.
    pub fn len(&self) -> usize {
        self.limiter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiter.is_empty()
    }

    /// Drops callers whose bucket has fully refilled and returns how many
    /// remain. A dropped caller starts over with a full bucket, which is
    /// the state it was already in.
    pub fn prune(&self) -> usize {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        self.limiter.len()
    }
}

/// Prunes `limiter` every `every` until the task is aborted.
pub(crate) async fn prune_idle_callers<C: Clock>(
    limiter: Arc<RateLimiterState<C>>,
    every: Duration,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let remaining = limiter.prune();
        tracing::debug!(remaining, "Pruned idle rate limit entries");
    }
}

/// Rate limiting middleware. The health check is never limited.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.uri().path() == super::server::HEALTHCHECK_PATH {
        return next.run(request).await;
    }

    let key = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(ANONYMOUS)
        .to_string();

    if !limiter.check(&key) {
        tracing::warn!(user_id = %key, "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Rate limit exceeded. Please try again later.",
                "code": StatusCode::TOO_MANY_REQUESTS.as_u16()
            })),
        )
            .into_response();
    }

    next.run(request).await
}
