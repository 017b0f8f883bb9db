//! DefiLlama Client
//!
//! Unauthenticated protocol listing (`/protocols`) and detail
//! (`/protocol/{slug}`) endpoints.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::TvlProvider;
use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, Result};
use crate::model::{ProtocolDetail, ProtocolRecord};

const PROVIDER: &str = "DefiLlama";

pub struct DefiLlamaClient {
    client: Client,
    base_url: String,
}

/// Listing entry; every field is optional upstream
#[derive(Debug, Deserialize)]
struct ProtocolEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default, deserialize_with = "super::lenient_decimal")]
    tvl: Option<Decimal>,
}

impl From<ProtocolEntry> for ProtocolRecord {
    fn from(entry: ProtocolEntry) -> Self {
        ProtocolRecord {
            name: entry.name.unwrap_or_default(),
            symbol: entry.symbol.unwrap_or_default(),
            slug: entry.slug.unwrap_or_default(),
            tvl: entry.tvl.unwrap_or_default(),
        }
    }
}

impl DefiLlamaClient {
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.defillama_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(endpoint, status = status.as_u16(), "DefiLlama request failed");
            return Err(AnalyzerError::Upstream {
                provider: PROVIDER,
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl TvlProvider for DefiLlamaClient {
    async fn fetch_protocols(&self) -> Result<Vec<ProtocolRecord>> {
        tracing::info!("Fetching protocols from DefiLlama");

        let entries: Vec<ProtocolEntry> = self.get_json("protocols").await?;
        let protocols: Vec<ProtocolRecord> = entries.into_iter().map(Into::into).collect();

        tracing::info!(protocols = protocols.len(), "Loaded DefiLlama protocols");
        Ok(protocols)
    }

    async fn fetch_protocol_detail(&self, slug: &str) -> Result<ProtocolDetail> {
        tracing::debug!(slug, "Fetching DefiLlama protocol detail");
        self.get_json(&format!("protocol/{}", slug)).await
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
