//! Shared configuration and external-service clients for Tally.
//!
//! This crate provides what every other crate (and the bins) needs:
//! - Configuration management
//! - The exchange-rate provider client with its TTL cache

pub mod config;
pub mod rates;

pub use config::AppConfig;
pub use rates::{RatesCache, RatesError, RatesService};
