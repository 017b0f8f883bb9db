//! Data Providers
//!
//! Abstractions and implementations for the market-data and TVL APIs.

mod coinmarketcap;
mod defillama;
mod mock;

pub use coinmarketcap::CoinMarketCapClient;
pub use defillama::DefiLlamaClient;
pub use mock::{MockMarketData, MockTvlProvider};

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::error::Result;
use crate::model::{AssetRecord, ProtocolDetail, ProtocolRecord, Quote};

/// Market-data provider (catalog listing and live quotes)
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Full asset catalog in provider order
    async fn fetch_catalog(&self) -> Result<Vec<AssetRecord>>;

    /// Fresh quote for one catalog id
    async fn fetch_quote(&self, asset_id: u64) -> Result<Quote>;

    /// Provider name
    fn name(&self) -> &str;
}

/// Protocol TVL provider
#[async_trait]
pub trait TvlProvider: Send + Sync {
    /// Flat listing of every tracked protocol
    async fn fetch_protocols(&self) -> Result<Vec<ProtocolRecord>>;

    /// Detail payload for one protocol slug
    async fn fetch_protocol_detail(&self, slug: &str) -> Result<ProtocolDetail>;

    /// Provider name
    fn name(&self) -> &str;
}

/// Numeric field that reads as `None` when Decimal cannot hold the value
/// (some listed supplies are near 1e30).
fn lenient_decimal<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_json))
}

fn decimal_from_json(value: &serde_json::Value) -> Option<Decimal> {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
