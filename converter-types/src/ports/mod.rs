//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod cache;
mod exchange;
mod repository;

pub use cache::CacheBackend;
pub use exchange::{ExchangeError, RateProvider};
pub use repository::ConversionRepository;
