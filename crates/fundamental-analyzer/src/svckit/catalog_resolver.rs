//! Catalog Resolver
//!
//! Resolves a user-typed name, ticker or slug to a market-data catalog entry.
//!
//! The catalog is fetched once and kept for the life of the process; newly
//! listed assets are not visible until restart.

use std::sync::Arc;

use crate::cache::{CatalogCache, RefreshPolicy};
use crate::error::{AnalyzerError, Result};
use crate::model::AssetRecord;
use crate::provider::MarketDataProvider;
use crate::strategy::{AssetMatcher, default_asset_matchers, find_first_match};

pub struct CatalogResolver {
    provider: Arc<dyn MarketDataProvider>,
    cache: CatalogCache<AssetRecord>,
    matchers: Vec<AssetMatcher>,
}

impl CatalogResolver {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self::with_cache(provider, CatalogCache::new(RefreshPolicy::Never))
    }

    pub fn with_cache(
        provider: Arc<dyn MarketDataProvider>,
        cache: CatalogCache<AssetRecord>,
    ) -> Self {
        Self {
            provider,
            cache,
            matchers: default_asset_matchers(),
        }
    }

    /// Replace the matcher list (applied in order)
    pub fn with_matchers(mut self, matchers: Vec<AssetMatcher>) -> Self {
        self.matchers = matchers;
        self
    }

    /// Cached catalog, fetched on first use
    pub async fn catalog(&self) -> Result<Arc<Vec<AssetRecord>>> {
        self.cache
            .get_or_fetch(|| self.provider.fetch_catalog())
            .await
    }

    pub async fn resolve(&self, identifier: &str) -> Result<AssetRecord> {
        let catalog = self.catalog().await?;

        match find_first_match(&catalog, identifier, &self.matchers) {
            Some((asset, matcher)) => {
                tracing::info!(
                    identifier,
                    matcher,
                    id = asset.id,
                    name = %asset.name,
                    symbol = %asset.symbol,
                    "Resolved asset"
                );
                Ok(asset.clone())
            }
            None => {
                tracing::info!(identifier, catalog = catalog.len(), "No catalog match");
                Err(AnalyzerError::NotFound(identifier.trim().to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockMarketData;

    fn market() -> Arc<MockMarketData> {
        Arc::new(
            MockMarketData::new()
                .with_catalog_entry(AssetRecord::new(1, "Bitcoin", "BTC", "bitcoin"))
                .with_catalog_entry(AssetRecord::new(1027, "Ethereum", "ETH", "ethereum"))
                .with_catalog_entry(AssetRecord::new(
                    1321,
                    "Ethereum Classic",
                    "ETC",
                    "ethereum-classic",
                )),
        )
    }

    #[tokio::test]
    async fn test_resolve_exact_and_partial() {
        let market = market();
        let resolver = CatalogResolver::new(market.clone());

        assert_eq!(resolver.resolve("eTh").await.unwrap().id, 1027);
        assert_eq!(resolver.resolve("classic").await.unwrap().id, 1321);
        assert_eq!(resolver.resolve("BITCOIN").await.unwrap().symbol, "BTC");

        // catalog fetched exactly once across resolutions
        assert_eq!(market.catalog_calls(), 1);
    }

    #[tokio::test]
    async fn test_not_found() {
        let resolver = CatalogResolver::new(market());

        let err = resolver.resolve("  dogecoin ").await.unwrap_err();
        assert!(matches!(err, AnalyzerError::NotFound(ref id) if id == "dogecoin"));
    }

    #[tokio::test]
    async fn test_empty_catalog_is_not_found() {
        let resolver = CatalogResolver::new(Arc::new(MockMarketData::new()));
        assert!(matches!(
            resolver.resolve("bitcoin").await,
            Err(AnalyzerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_catalog_fetch_error_propagates() {
        let market = Arc::new(MockMarketData::new().with_catalog_failure(401));
        let resolver = CatalogResolver::new(market.clone());

        let err = resolver.resolve("bitcoin").await.unwrap_err();
        assert!(matches!(err, AnalyzerError::Upstream { status: 401, .. }));

        // failure is not cached
        let _ = resolver.resolve("bitcoin").await;
        assert_eq!(market.catalog_calls(), 2);
    }
}
