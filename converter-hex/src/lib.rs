//! # Converter Hex
//!
//! Application service layer and HTTP adapter for the currency converter.
//!
//! ## Architecture
//!
//! - `service` - Conversion pipeline (validate, resolve rates, cross-rate, persist)
//! - `cache` - Cache policy: backend failures become misses or skipped writes
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The service is generic over the `CacheBackend`, `RateProvider` and
//! `ConversionRepository` ports, so adapters are injected at construction.

pub mod cache;
pub mod inbound;
pub mod openapi;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use cache::RateCache;
pub use service::{CurrencyConverterService, ServiceConfig};
