//! Analyzer Configuration
//!
//! API credentials, endpoints and limits, loaded from the environment.

use std::time::Duration;

use crate::error::{AnalyzerError, Result};

pub const DEFAULT_CMC_BASE_URL: &str = "https://pro-api.coinmarketcap.com/v1";
pub const DEFAULT_DEFILLAMA_BASE_URL: &str = "https://api.llama.fi";

/// Runtime configuration for both upstream providers
#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    /// CoinMarketCap Pro API key (sent as `X-CMC_PRO_API_KEY`)
    pub cmc_api_key: Option<String>,

    /// CoinMarketCap REST base URL
    pub cmc_base_url: String,

    /// DefiLlama REST base URL
    pub defillama_base_url: String,

    /// Per-request timeout in seconds, applied to every upstream call
    pub request_timeout_secs: u64,

    /// Size of the catalog listing request
    pub catalog_limit: u32,

    /// Protocol catalog time-to-live in seconds
    pub protocol_cache_ttl_secs: u64,

    /// Fiat currency for quotes
    pub quote_currency: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            cmc_api_key: None,
            cmc_base_url: DEFAULT_CMC_BASE_URL.into(),
            defillama_base_url: DEFAULT_DEFILLAMA_BASE_URL.into(),
            request_timeout_secs: 30,
            catalog_limit: 5000,
            protocol_cache_ttl_secs: 3600,
            quote_currency: "USD".into(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cmc_api_key: std::env::var("COINMARKETCAP_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            cmc_base_url: std::env::var("COINMARKETCAP_BASE_URL")
                .unwrap_or(defaults.cmc_base_url),
            defillama_base_url: std::env::var("DEFILLAMA_BASE_URL")
                .unwrap_or(defaults.defillama_base_url),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout_secs),
            catalog_limit: env_parse("CATALOG_LIMIT").unwrap_or(defaults.catalog_limit),
            protocol_cache_ttl_secs: env_parse("PROTOCOL_CACHE_TTL_SECS")
                .unwrap_or(defaults.protocol_cache_ttl_secs),
            quote_currency: std::env::var("QUOTE_CURRENCY")
                .map(|c| c.to_uppercase())
                .unwrap_or(defaults.quote_currency),
        }
    }

    /// Check that everything required to talk to the providers is present
    pub fn validate(&self) -> Result<()> {
        if self.cmc_api_key.is_none() {
            return Err(AnalyzerError::Config(
                "COINMARKETCAP_API_KEY is not set".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(AnalyzerError::Config(
                "REQUEST_TIMEOUT_SECS must be greater than zero".into(),
            ));
        }
        if self.quote_currency.trim().is_empty() {
            return Err(AnalyzerError::Config("QUOTE_CURRENCY is empty".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn protocol_cache_ttl(&self) -> chrono::Duration {
        let secs = u32::try_from(self.protocol_cache_ttl_secs).unwrap_or(u32::MAX);
        chrono::Duration::seconds(i64::from(secs))
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
