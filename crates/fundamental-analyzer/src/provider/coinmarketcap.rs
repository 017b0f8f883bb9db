//! CoinMarketCap Client
//!
//! Catalog (`cryptocurrency/map`) and quote (`cryptocurrency/quotes/latest`)
//! endpoints of the CoinMarketCap Pro API.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::MarketDataProvider;
use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, Result};
use crate::model::{AssetRecord, PercentChange, Quote};

const PROVIDER: &str = "CoinMarketCap";
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// Authenticated CoinMarketCap client
pub struct CoinMarketCapClient {
    client: Client,
    base_url: String,
    api_key: String,
    currency: String,
    catalog_limit: u32,
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    data: Vec<AssetRecord>,
}

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    data: HashMap<String, QuoteEntry>,
}

#[derive(Debug, Deserialize)]
struct QuoteEntry {
    name: String,
    symbol: String,
    #[serde(default)]
    cmc_rank: Option<u32>,
    #[serde(default, deserialize_with = "super::lenient_decimal")]
    circulating_supply: Option<Decimal>,
    #[serde(default, deserialize_with = "super::lenient_decimal")]
    total_supply: Option<Decimal>,
    #[serde(default, deserialize_with = "super::lenient_decimal")]
    max_supply: Option<Decimal>,
    quote: HashMap<String, QuoteValues>,
}

#[derive(Debug, Deserialize)]
struct QuoteValues {
    #[serde(default, deserialize_with = "super::lenient_decimal")]
    price: Option<Decimal>,
    #[serde(default, deserialize_with = "super::lenient_decimal")]
    market_cap: Option<Decimal>,
    #[serde(default, deserialize_with = "super::lenient_decimal")]
    volume_24h: Option<Decimal>,
    #[serde(default, deserialize_with = "super::lenient_decimal")]
    percent_change_1h: Option<Decimal>,
    #[serde(default, deserialize_with = "super::lenient_decimal")]
    percent_change_24h: Option<Decimal>,
    #[serde(default, deserialize_with = "super::lenient_decimal")]
    percent_change_7d: Option<Decimal>,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

impl CoinMarketCapClient {
    /// Create a client; the timeout applies to every request
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        let api_key = config
            .cmc_api_key
            .clone()
            .ok_or_else(|| AnalyzerError::Config("COINMARKETCAP_API_KEY is not set".into()))?;

        let client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.cmc_base_url.trim_end_matches('/').to_string(),
            api_key,
            currency: config.quote_currency.to_uppercase(),
            catalog_limit: config.catalog_limit,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(endpoint, status = status.as_u16(), "CoinMarketCap request failed");
            return Err(AnalyzerError::Upstream {
                provider: PROVIDER,
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn quote_from_entry(&self, entry: QuoteEntry) -> Result<Quote> {
        let QuoteEntry {
            name,
            symbol,
            cmc_rank,
            circulating_supply,
            total_supply,
            max_supply,
            mut quote,
        } = entry;

        let values = quote.remove(&self.currency).ok_or_else(|| AnalyzerError::MalformedResponse {
            provider: PROVIDER,
            reason: format!("no {} quote for {}", self.currency, symbol),
        })?;

        Ok(Quote {
            name,
            symbol,
            rank: cmc_rank,
            price: values.price.unwrap_or_default(),
            market_cap: values.market_cap.unwrap_or_default(),
            volume_24h: values.volume_24h.unwrap_or_default(),
            percent_change: PercentChange {
                h1: values.percent_change_1h.unwrap_or_default(),
                h24: values.percent_change_24h.unwrap_or_default(),
                d7: values.percent_change_7d.unwrap_or_default(),
            },
            circulating_supply,
            total_supply,
            max_supply,
            currency: self.currency.clone(),
            last_updated: values.last_updated,
        })
    }
}

#[async_trait]
impl MarketDataProvider for CoinMarketCapClient {
    async fn fetch_catalog(&self) -> Result<Vec<AssetRecord>> {
        tracing::info!(limit = self.catalog_limit, "Fetching CoinMarketCap catalog");

        let response: CatalogResponse = self
            .get_json("cryptocurrency/map", &[("limit", self.catalog_limit.to_string())])
            .await?;

        tracing::info!(assets = response.data.len(), "Loaded CoinMarketCap catalog");
        Ok(response.data)
    }

    async fn fetch_quote(&self, asset_id: u64) -> Result<Quote> {
        tracing::debug!(asset_id, currency = %self.currency, "Fetching quote");

        let mut response: QuotesResponse = self
            .get_json(
                "cryptocurrency/quotes/latest",
                &[("id", asset_id.to_string()), ("convert", self.currency.clone())],
            )
            .await?;

        let entry = response
            .data
            .remove(&asset_id.to_string())
            .ok_or_else(|| AnalyzerError::MalformedResponse {
                provider: PROVIDER,
                reason: format!("quote response has no entry for id {}", asset_id),
            })?;

        self.quote_from_entry(entry)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
