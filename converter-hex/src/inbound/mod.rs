//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the conversion service.

pub mod handlers;
mod rate_limit;
mod server;

pub use rate_limit::{DEFAULT_REQUESTS_PER_MINUTE, RateLimiterState};
pub use server::{API_PREFIX, HEALTHCHECK_PATH, HttpServer};
