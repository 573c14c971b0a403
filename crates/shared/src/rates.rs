//! Exchange-rate lookup against an external provider.
//!
//! Rates are display-only: balances are stored in the base currency and a
//! looked-up factor converts them for presentation. The provider returns the
//! whole rate table in one response, so a single unknown code refreshes
//! every rate at once.

use std::collections::HashMap;
use std::time::Duration;

use moka::sync::Cache;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::config::RatesConfig;

/// Exchange-rate service errors.
#[derive(Debug, Error)]
pub enum RatesError {
    /// The provider's table does not contain the requested code.
    #[error("currency '{0}' is not available at the moment")]
    CurrencyUnavailable(String),
    /// The provider could not be reached or returned a bad response.
    #[error("failed to fetch currency rates: {0}")]
    Fetch(#[from] reqwest::Error),
}

/// In-memory rate cache with a single global time-to-live.
///
/// Entries expire independently; eviction is lazy, checked on read.
#[derive(Clone)]
pub struct RatesCache {
    store: Cache<String, Decimal>,
}

impl RatesCache {
    /// Creates a cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: Cache::builder().time_to_live(ttl).build(),
        }
    }

    /// Returns the cached rate for `code`, if present and not expired.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<Decimal> {
        self.store.get(code)
    }

    /// Stores every rate from a provider response.
    pub fn store_all(&self, rates: &HashMap<String, Decimal>) {
        for (code, rate) in rates {
            self.store.insert(code.clone(), *rate);
        }
    }
}

/// Provider response: base-currency/CODE factors for all known currencies.
#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, Decimal>,
}

/// Exchange-rate service: TTL cache in front of the provider.
///
/// Constructed once at startup and shared; callers only ever see
/// [`RatesService::rate`].
#[derive(Clone)]
pub struct RatesService {
    config: RatesConfig,
    client: reqwest::Client,
    cache: RatesCache,
}

impl RatesService {
    /// Creates a new exchange-rate service.
    #[must_use]
    pub fn new(config: RatesConfig) -> Self {
        let cache = RatesCache::new(Duration::from_secs(config.ttl_secs));
        Self {
            config,
            client: reqwest::Client::new(),
            cache,
        }
    }

    /// Returns the conversion factor from the base currency to `code`.
    ///
    /// The base currency itself is always 1. A cache miss refetches the
    /// entire rate table; a code still missing after that is unavailable.
    /// Fetch failures are surfaced, not retried.
    ///
    /// # Errors
    ///
    /// Returns [`RatesError::Fetch`] if the provider cannot be reached and
    /// [`RatesError::CurrencyUnavailable`] if it does not quote `code`.
    pub async fn rate(&self, code: &str) -> Result<Decimal, RatesError> {
        if code == self.config.base_currency {
            return Ok(Decimal::ONE);
        }

        if let Some(rate) = self.cache.get(code) {
            return Ok(rate);
        }

        self.refresh().await?;

        self.cache.get(code).ok_or_else(|| {
            info!(code, "rate requested for a code missing from the provider response");
            RatesError::CurrencyUnavailable(code.to_string())
        })
    }

    /// Fetches the full rate table and stores it in the cache.
    async fn refresh(&self) -> Result<(), RatesError> {
        let url = format!("{}?base={}", self.config.api_url, self.config.base_currency);

        let latest: RatesResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        self.cache.store_all(&latest.rates);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn test_config() -> RatesConfig {
        RatesConfig {
            base_currency: "RUB".to_string(),
            // Nothing listens here; tests must not depend on the network.
            api_url: "http://127.0.0.1:9/latest".to_string(),
            ttl_secs: 600,
        }
    }

    #[test]
    fn test_cache_store_and_get() {
        let cache = RatesCache::new(Duration::from_secs(60));
        let mut rates = HashMap::new();
        rates.insert("USD".to_string(), dec!(0.0136));
        rates.insert("EUR".to_string(), dec!(0.0125));

        cache.store_all(&rates);

        assert_eq!(cache.get("USD"), Some(dec!(0.0136)));
        assert_eq!(cache.get("EUR"), Some(dec!(0.0125)));
        assert_eq!(cache.get("JPY"), None);
    }

    #[test]
    fn test_cache_entries_expire() {
        let cache = RatesCache::new(Duration::from_millis(20));
        let mut rates = HashMap::new();
        rates.insert("USD".to_string(), dec!(0.0136));
        cache.store_all(&rates);

        assert!(cache.get("USD").is_some());
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(cache.get("USD"), None);
    }

    #[tokio::test]
    async fn test_base_currency_is_identity_without_fetch() {
        // The api_url is unreachable, so this only passes if no fetch happens.
        let service = RatesService::new(test_config());
        let rate = service.rate("RUB").await.expect("base currency rate");
        assert_eq!(rate, Decimal::ONE);
    }

    #[tokio::test]
    async fn test_cached_rate_is_served_without_fetch() {
        let service = RatesService::new(test_config());
        let mut rates = HashMap::new();
        rates.insert("USD".to_string(), dec!(0.0136));
        service.cache.store_all(&rates);

        let rate = service.rate("USD").await.expect("cached rate");
        assert_eq!(rate, dec!(0.0136));
    }

    #[tokio::test]
    async fn test_unreachable_provider_surfaces_fetch_error() {
        let service = RatesService::new(test_config());
        let err = service.rate("USD").await.expect_err("fetch should fail");
        assert!(matches!(err, RatesError::Fetch(_)));
    }

    #[test]
    fn test_rates_response_decodes_provider_payload() {
        let body = r#"{"base":"RUB","rates":{"USD":0.0136,"EUR":0.0125}}"#;
        let parsed: RatesResponse = serde_json::from_str(body).expect("decode");
        assert_eq!(parsed.rates.len(), 2);
        assert_eq!(parsed.rates["USD"], dec!(0.0136));
    }
}
