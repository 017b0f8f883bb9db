//! TVL Resolver
//!
//! Finds the total value locked for an asset by walking [`TvlStrategy::ORDER`]
//! until one strategy produces a positive figure. Never fails: an unreachable
//! provider or a miss both come back as `has_tvl == false`, told apart by
//! [`TvlStatus`](crate::model::TvlStatus).

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::cache::{CatalogCache, Clock, RefreshPolicy, SystemClock};
use crate::error::Result;
use crate::model::{ProtocolRecord, TvlResult};
use crate::provider::TvlProvider;
use crate::strategy::{TvlLookup, TvlQuery, TvlStrategy};

pub struct TvlResolver {
    provider: Arc<dyn TvlProvider>,
    cache: CatalogCache<ProtocolRecord>,
    strategies: Vec<TvlStrategy>,
}

impl TvlResolver {
    pub fn new(provider: Arc<dyn TvlProvider>, ttl: chrono::Duration) -> Self {
        Self::with_clock(provider, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(
        provider: Arc<dyn TvlProvider>,
        ttl: chrono::Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            cache: CatalogCache::with_clock(RefreshPolicy::Ttl(ttl), clock),
            strategies: TvlStrategy::ORDER.to_vec(),
        }
    }

    /// Replace the strategy list (applied in order)
    pub fn with_strategies(mut self, strategies: Vec<TvlStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Cached protocol listing, refetched after the TTL
    pub async fn protocols(&self) -> Result<Arc<Vec<ProtocolRecord>>> {
        self.cache
            .get_or_fetch(|| self.provider.fetch_protocols())
            .await
    }

    /// Protocol listing, or an empty listing when the provider is unreachable
    pub async fn get_protocols(&self) -> Arc<Vec<ProtocolRecord>> {
        match self.protocols().await {
            Ok(protocols) => protocols,
            Err(e) => {
                tracing::warn!(error = %e, "Protocol listing unavailable");
                Arc::new(Vec::new())
            }
        }
    }

    pub async fn resolve(&self, name: &str, symbol: &str) -> TvlResult {
        tracing::info!(name, symbol, "Searching TVL");
        let source = self.provider.name().to_string();

        let protocols = match self.protocols().await {
            Ok(protocols) => protocols,
            Err(e) => {
                tracing::warn!(error = %e, "Protocol listing unavailable; TVL unknown");
                return TvlResult::unknown(source);
            }
        };
        if protocols.is_empty() {
            return TvlResult::absent(source);
        }

        let query = TvlQuery::new(name, symbol);
        for strategy in &self.strategies {
            let tvl = match strategy.lookup(&query) {
                TvlLookup::Skip => continue,
                TvlLookup::Slug(slug) => self.tvl_by_slug_in(slug, &protocols).await,
                TvlLookup::ScanCatalog => first_positive_tvl(
                    protocols.iter().filter(|p| strategy.matches(p, &query)),
                ),
            };

            if tvl > Decimal::ZERO {
                tracing::info!(%tvl, method = %strategy.method(), "TVL found");
                return TvlResult::found(tvl, strategy.method(), source);
            }
            tracing::debug!(?strategy, "Strategy produced no TVL");
        }

        tracing::info!(name, "No TVL data found");
        TvlResult::absent(source)
    }

    /// TVL for a provider slug; zero when unavailable
    pub async fn tvl_by_slug(&self, slug: &str) -> Decimal {
        let protocols = self.get_protocols().await;
        self.tvl_by_slug_in(slug, &protocols).await
    }

    async fn tvl_by_slug_in(&self, slug: &str, protocols: &[ProtocolRecord]) -> Decimal {
        let listed = first_positive_tvl(protocols.iter().filter(|p| p.slug == slug));
        if listed > Decimal::ZERO {
            return listed;
        }

        match self.provider.fetch_protocol_detail(slug).await {
            Ok(detail) => detail.current_tvl(),
            Err(e) => {
                tracing::debug!(slug, error = %e, "No protocol detail");
                Decimal::ZERO
            }
        }
    }
}

fn first_positive_tvl<'a>(mut protocols: impl Iterator<Item = &'a ProtocolRecord>) -> Decimal {
    protocols
        .find(|p| p.tvl > Decimal::ZERO)
        .map_or(Decimal::ZERO, |p| p.tvl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::model::{MatchMethod, ProtocolDetail, TvlField, TvlPoint, TvlStatus};
    use crate::provider::MockTvlProvider;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    fn resolver(provider: Arc<MockTvlProvider>) -> TvlResolver {
        TvlResolver::new(provider, Duration::hours(1))
    }

    fn scalar(tvl: Decimal) -> ProtocolDetail {
        ProtocolDetail {
            current_chain_tvls: None,
            tvl: Some(TvlField::Scalar(tvl)),
        }
    }

    #[tokio::test]
    async fn test_alias_wins_over_exact_catalog_match() {
        let provider = Arc::new(
            MockTvlProvider::new()
                .with_protocol(ProtocolRecord::new("Uniswap", "UNI", "uniswap-labs", dec!(5)))
                .with_detail("uniswap", scalar(dec!(4_000_000_000))),
        );
        let result = resolver(provider).resolve("Uniswap", "UNI").await;

        assert!(result.has_tvl);
        assert_eq!(result.tvl, dec!(4_000_000_000));
        assert_eq!(result.method, MatchMethod::CommonMapping);
    }

    #[tokio::test]
    async fn test_symbol_alias() {
        let provider = Arc::new(
            MockTvlProvider::new()
                .with_protocol(ProtocolRecord::new("Compound V3", "COMP", "compound", dec!(900))),
        );
        let result = resolver(provider.clone()).resolve("Compound Governance", "COMP").await;

        assert_eq!(result.method, MatchMethod::SymbolMapping);
        assert_eq!(result.tvl, dec!(900));
        // slug found in listing, no detail request needed
        assert_eq!(provider.detail_calls(), 0);
    }

    #[tokio::test]
    async fn test_exact_catalog_skips_zero_entries() {
        let provider = Arc::new(
            MockTvlProvider::new()
                .with_protocol(ProtocolRecord::new("Pendle", "PENDLE", "pendle-old", Decimal::ZERO))
                .with_protocol(ProtocolRecord::new(
                    "Pendle",
                    "PENDLE",
                    "pendle",
                    dec!(3_500_000_000),
                )),
        );
        let result = resolver(provider).resolve("Pendle", "PENDLE").await;

        assert_eq!(result.method, MatchMethod::ProtocolsListMatch);
        assert_eq!(result.tvl, dec!(3_500_000_000));
    }

    #[tokio::test]
    async fn test_partial_match() {
        let provider = Arc::new(MockTvlProvider::new().with_protocol(ProtocolRecord::new(
            "Jito Liquid Staking",
            "JTO",
            "jito-liquid-staking",
            dec!(2_000_000),
        )));
        let result = resolver(provider).resolve("Jito", "").await;

        assert_eq!(result.method, MatchMethod::PartialMatch);
        assert_eq!(result.status, TvlStatus::Found);
    }

    #[tokio::test]
    async fn test_listed_zero_is_not_tvl() {
        let provider = Arc::new(
            MockTvlProvider::new()
                .with_protocol(ProtocolRecord::new("Bitcoin", "", "bitcoin", Decimal::ZERO)),
        );
        let result = resolver(provider.clone()).resolve("Bitcoin", "BTC").await;

        assert!(!result.has_tvl);
        assert_eq!(result.tvl, Decimal::ZERO);
        assert_eq!(result.method, MatchMethod::NotFound);
        assert_eq!(result.status, TvlStatus::Absent);
        // name and symbol alias both fell back to the detail endpoint
        assert_eq!(provider.detail_calls(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_unknown() {
        let provider = Arc::new(MockTvlProvider::new().with_protocol(ProtocolRecord::new(
            "Aave V3",
            "AAVE",
            "aave-v3",
            dec!(1),
        )));
        provider.set_listing_down(true);

        let tvl = resolver(provider.clone());
        let result = tvl.resolve("Aave", "AAVE").await;
        assert!(!result.has_tvl);
        assert_eq!(result.status, TvlStatus::Unknown);
        assert!(tvl.get_protocols().await.is_empty());
    }

    #[tokio::test]
    async fn test_protocol_cache_ttl() {
        let provider = Arc::new(
            MockTvlProvider::new()
                .with_protocol(ProtocolRecord::new("Lido", "LDO", "lido", dec!(26_000_000_000))),
        );
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let tvl = TvlResolver::with_clock(provider.clone(), Duration::hours(1), clock.clone());

        tvl.resolve("Lido", "LDO").await;
        clock.advance(Duration::minutes(30));
        tvl.resolve("Lido", "LDO").await;
        assert_eq!(provider.protocol_calls(), 1);

        clock.advance(Duration::minutes(31));
        tvl.resolve("Lido", "LDO").await;
        assert_eq!(provider.protocol_calls(), 2);
    }

    #[tokio::test]
    async fn test_tvl_by_slug_detail_shapes() {
        let provider = Arc::new(
            MockTvlProvider::new()
                .with_protocol(ProtocolRecord::new("Listed", "LST", "listed", dec!(10)))
                .with_detail(
                    "series",
                    ProtocolDetail {
                        current_chain_tvls: None,
                        tvl: Some(TvlField::Series(vec![
                            TvlPoint::default(),
                            TvlPoint {
                                total_liquidity_usd: Some(dec!(77)),
                                tvl: None,
                            },
                        ])),
                    },
                )
                .with_detail("scalar", scalar(dec!(5))),
        );
        let tvl = resolver(provider);

        assert_eq!(tvl.tvl_by_slug("listed").await, dec!(10));
        assert_eq!(tvl.tvl_by_slug("series").await, dec!(77));
        assert_eq!(tvl.tvl_by_slug("scalar").await, dec!(5));
        assert_eq!(tvl.tvl_by_slug("missing").await, Decimal::ZERO);
    }
}
