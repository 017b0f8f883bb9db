//! Mock Providers
//!
//! In-memory market-data and TVL providers for tests and offline demos.
//! Every upstream call is counted so cache behaviour can be asserted.

use std::collections::HashMap;
use std::time::Duration;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{MarketDataProvider, TvlProvider};
use crate::error::{AnalyzerError, Result};
use crate::model::{AssetRecord, PercentChange, ProtocolDetail, ProtocolRecord, Quote, TvlField};

/// Mock market-data provider with a fixed catalog and quotes
#[derive(Default)]
pub struct MockMarketData {
    catalog: Vec<AssetRecord>,
    quotes: HashMap<u64, Quote>,
    catalog_failure: Option<u16>,
    latency: Option<Duration>,
    catalog_calls: AtomicUsize,
    quote_calls: AtomicUsize,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Realistic static data for a handful of majors
    pub fn demo() -> Self {
        // (id, name, symbol, slug, price, circulating, total, max, 24h change)
        #[rustfmt::skip]
        let assets = [
            (1, "Bitcoin", "BTC", "bitcoin", dec!(97500), dec!(19_800_000), dec!(19_800_000), Some(dec!(21_000_000)), dec!(2.5)),
            (1027, "Ethereum", "ETH", "ethereum", dec!(3450), dec!(120_400_000), dec!(120_400_000), None, dec!(1.8)),
            (5426, "Solana", "SOL", "solana", dec!(195), dec!(475_000_000), dec!(590_000_000), None, dec!(4.2)),
            (7083, "Uniswap", "UNI", "uniswap", dec!(14.20), dec!(600_000_000), dec!(1_000_000_000), Some(dec!(1_000_000_000)), dec!(2.2)),
            (7278, "Aave", "AAVE", "aave", dec!(310), dec!(15_000_000), dec!(16_000_000), Some(dec!(16_000_000)), dec!(3.4)),
            (74, "Dogecoin", "DOGE", "dogecoin", dec!(0.38), dec!(147_000_000_000), dec!(147_000_000_000), None, dec!(12.0)),
        ];

        let mut mock = Self::new();
        for (id, name, symbol, slug, price, circulating, total, max, change_24h) in assets {
            let mut quote = Quote::new(name, symbol, price)
                .with_market_cap(price * circulating)
                .with_supply(Some(circulating), Some(total), max);
            quote.volume_24h = price * circulating / dec!(40);
            quote.percent_change = PercentChange {
                h1: Decimal::ZERO,
                h24: change_24h,
                d7: Decimal::ZERO,
            };
            quote.last_updated = Some(Utc::now());
            mock = mock.with_asset(AssetRecord::new(id, name, symbol, slug), quote);
        }
        mock
    }

    /// Add a catalog entry with its quote
    pub fn with_asset(mut self, asset: AssetRecord, quote: Quote) -> Self {
        self.quotes.insert(asset.id, quote);
        self.catalog.push(asset);
        self
    }

    /// Add a catalog entry with no quote (quote fetches fail with 400)
    pub fn with_catalog_entry(mut self, asset: AssetRecord) -> Self {
        self.catalog.push(asset);
        self
    }

    /// Delay every catalog fetch, so concurrent callers overlap
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every catalog fetch fail with the given status
    pub fn with_catalog_failure(mut self, status: u16) -> Self {
        self.catalog_failure = Some(status);
        self
    }

    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketData {
    async fn fetch_catalog(&self) -> Result<Vec<AssetRecord>> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(status) = self.catalog_failure {
            return Err(AnalyzerError::Upstream {
                provider: "MockMarketData",
                endpoint: "cryptocurrency/map".into(),
                status,
            });
        }
        Ok(self.catalog.clone())
    }

    async fn fetch_quote(&self, asset_id: u64) -> Result<Quote> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);

        self.quotes
            .get(&asset_id)
            .cloned()
            .ok_or_else(|| AnalyzerError::Upstream {
                provider: "MockMarketData",
                endpoint: "cryptocurrency/quotes/latest".into(),
                status: 400,
            })
    }

    fn name(&self) -> &str {
        "MockMarketData"
    }
}

/// Mock TVL provider with a fixed listing and per-slug details
#[derive(Default)]
pub struct MockTvlProvider {
    protocols: Vec<ProtocolRecord>,
    details: HashMap<String, ProtocolDetail>,
    listing_down: AtomicBool,
    latency: Option<Duration>,
    protocol_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl MockTvlProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn demo() -> Self {
        Self::new()
            .with_protocol(ProtocolRecord::new(
                "Uniswap V3",
                "UNI",
                "uniswap-v3",
                dec!(4_200_000_000),
            ))
            .with_protocol(ProtocolRecord::new("Aave V3", "AAVE", "aave-v3", dec!(18_500_000_000)))
            .with_protocol(ProtocolRecord::new("Lido", "LDO", "lido", dec!(26_000_000_000)))
            .with_protocol(ProtocolRecord::new("Bitcoin", "BTC", "bitcoin", Decimal::ZERO))
            .with_detail(
                "uniswap",
                ProtocolDetail {
                    current_chain_tvls: Some(HashMap::from([
                        ("Ethereum".to_string(), dec!(3_100_000_000)),
                        ("Arbitrum".to_string(), dec!(900_000_000)),
                        ("Base".to_string(), dec!(600_000_000)),
                    ])),
                    tvl: None,
                },
            )
            .with_detail(
                "aave",
                ProtocolDetail {
                    current_chain_tvls: None,
                    tvl: Some(TvlField::Scalar(dec!(21_000_000_000))),
                },
            )
    }

    pub fn with_protocol(mut self, protocol: ProtocolRecord) -> Self {
        self.protocols.push(protocol);
        self
    }

    pub fn with_detail(mut self, slug: impl Into<String>, detail: ProtocolDetail) -> Self {
        self.details.insert(slug.into(), detail);
        self
    }

    /// Delay every listing fetch, so concurrent callers overlap
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Toggle listing availability at runtime
    pub fn set_listing_down(&self, down: bool) {
        self.listing_down.store(down, Ordering::SeqCst);
    }

    pub fn protocol_calls(&self) -> usize {
        self.protocol_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TvlProvider for MockTvlProvider {
    async fn fetch_protocols(&self) -> Result<Vec<ProtocolRecord>> {
        self.protocol_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.listing_down.load(Ordering::SeqCst) {
            return Err(AnalyzerError::Upstream {
                provider: "MockTvlProvider",
                endpoint: "protocols".into(),
                status: 503,
            });
        }
        Ok(self.protocols.clone())
    }

    async fn fetch_protocol_detail(&self, slug: &str) -> Result<ProtocolDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);

        self.details
            .get(slug)
            .cloned()
            .ok_or_else(|| AnalyzerError::Upstream {
                provider: "MockTvlProvider",
                endpoint: format!("protocol/{}", slug),
                status: 404,
            })
    }

    fn name(&self) -> &str {
        "DefiLlama"
    }
}
