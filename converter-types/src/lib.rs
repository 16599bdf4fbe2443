//! # Converter Types
//!
//! Domain types and port traits for the currency conversion service.
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, rate arithmetic and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (CurrencyCode, RateTable, ConversionTransaction)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    ConversionTransaction, CurrencyCode, NewConversion, RateTable, TransactionId, cross_rate,
    rate_cache_key, seconds_until_next_utc_midnight, validate_currency,
};
pub use dto::*;
pub use error::{AppError, CacheError, ConversionError, RepoError};
pub use ports::{CacheBackend, ConversionRepository, ExchangeError, RateProvider};
