//! Aggregator
//!
//! Runs one analysis end to end: catalog resolution, live quote, TVL lookup,
//! derived metrics. Catalog or quote failures abort the request; TVL and
//! metric gaps degrade to sentinel values instead.

use std::sync::Arc;

use futures::future::join_all;

use crate::config::AnalyzerConfig;
use crate::error::{ErrorRecord, Result};
use crate::metrics::{
    TvlRatioAnalysis, analyze_inflation, assess_data_quality, calculate_fdv,
    calculate_tvl_ratio,
};
use crate::model::{AnalysisRecord, TvlStatus};
use crate::provider::{CoinMarketCapClient, DefiLlamaClient, MarketDataProvider, TvlProvider};

use super::{CatalogResolver, TvlResolver};

/// Result of one identifier in a batch
pub type AnalysisOutcome = std::result::Result<AnalysisRecord, ErrorRecord>;

pub struct Aggregator {
    market: Arc<dyn MarketDataProvider>,
    catalog: CatalogResolver,
    tvl: TvlResolver,
}

impl Aggregator {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        tvl_provider: Arc<dyn TvlProvider>,
        config: &AnalyzerConfig,
    ) -> Self {
        Self {
            catalog: CatalogResolver::new(Arc::clone(&market)),
            tvl: TvlResolver::new(tvl_provider, config.protocol_cache_ttl()),
            market,
        }
    }

    /// Build from pre-configured resolvers (custom caches, clocks or strategies)
    pub fn from_parts(
        market: Arc<dyn MarketDataProvider>,
        catalog: CatalogResolver,
        tvl: TvlResolver,
    ) -> Self {
        Self { market, catalog, tvl }
    }

    /// Wire up the live CoinMarketCap and DefiLlama clients
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let market = Arc::new(CoinMarketCapClient::from_config(config)?);
        let tvl = Arc::new(DefiLlamaClient::from_config(config)?);
        Ok(Self::new(market, tvl, config))
    }

    pub fn catalog(&self) -> &CatalogResolver {
        &self.catalog
    }

    pub fn tvl(&self) -> &TvlResolver {
        &self.tvl
    }

    pub async fn analyze(&self, identifier: &str) -> Result<AnalysisRecord> {
        tracing::info!(identifier, "Starting analysis");

        let asset = self.catalog.resolve(identifier).await?;
        let quote = self.market.fetch_quote(asset.id).await?;
        tracing::info!(name = %quote.name, symbol = %quote.symbol, "Fetched market data");

        let tvl = self.tvl.resolve(&asset.name, &asset.symbol).await;

        let fdv = calculate_fdv(quote.price, quote.total_supply);
        let inflation = analyze_inflation(quote.circulating_supply, quote.total_supply);
        let tvl_ratio = if tvl.has_tvl {
            calculate_tvl_ratio(tvl.tvl, quote.market_cap)
        } else {
            TvlRatioAnalysis::unknown("No TVL data")
        };
        let quality = assess_data_quality(&quote);

        let data_status = match tvl.status {
            TvlStatus::Unknown => "Partial analysis - TVL provider unavailable",
            TvlStatus::Found | TvlStatus::Absent => "Complete analysis with real data",
        };

        Ok(AnalysisRecord {
            asset,
            quote,
            tvl,
            tvl_ratio,
            fdv,
            inflation,
            quality,
            data_status: data_status.into(),
        })
    }

    /// Analyze several identifiers concurrently; results keep input order
    pub async fn analyze_many<S: AsRef<str>>(&self, identifiers: &[S]) -> Vec<AnalysisOutcome> {
        let tasks = identifiers.iter().map(|id| async move {
            let id = id.as_ref();
            self.analyze(id).await.map_err(|e| {
                tracing::warn!(identifier = id, error = %e, "Analysis failed");
                e.to_record(id)
            })
        });

        join_all(tasks).await
    }
}
