//! Domain Models
//!
//! Records flowing through the analysis pipeline: catalog entries from the
//! market-data provider, point-in-time quotes, protocol TVL entries, and the
//! merged analysis record.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::format::{format_amount, format_usd};
use crate::metrics::{DataQuality, FdvAnalysis, InflationAnalysis, TvlRatioAnalysis};

/// One entry of the market-data catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    /// Provider-assigned numeric id, unique within the catalog
    pub id: u64,

    /// Display name (e.g., "Bitcoin")
    pub name: String,

    /// Ticker symbol (e.g., "BTC")
    pub symbol: String,

    /// Provider slug (e.g., "bitcoin")
    pub slug: String,
}

impl AssetRecord {
    pub fn new(
        id: u64,
        name: impl Into<String>,
        symbol: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            symbol: symbol.into(),
            slug: slug.into(),
        }
    }
}

/// Price change percentages over standard windows
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentChange {
    pub h1: Decimal,
    pub h24: Decimal,
    pub d7: Decimal,
}

/// Point-in-time market snapshot for one asset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub name: String,
    pub symbol: String,

    /// Market-cap rank, when the provider ranks the asset
    pub rank: Option<u32>,

    /// Price in the quote currency
    pub price: Decimal,
    pub market_cap: Decimal,
    pub volume_24h: Decimal,
    pub percent_change: PercentChange,

    pub circulating_supply: Option<Decimal>,
    pub total_supply: Option<Decimal>,
    pub max_supply: Option<Decimal>,

    /// Quote currency code (e.g., "USD")
    pub currency: String,

    pub last_updated: Option<DateTime<Utc>>,
}

impl Quote {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            rank: None,
            price,
            market_cap: Decimal::ZERO,
            volume_24h: Decimal::ZERO,
            percent_change: PercentChange::default(),
            circulating_supply: None,
            total_supply: None,
            max_supply: None,
            currency: "USD".into(),
            last_updated: None,
        }
    }

    pub fn with_market_cap(mut self, market_cap: Decimal) -> Self {
        self.market_cap = market_cap;
        self
    }

    pub fn with_supply(
        mut self,
        circulating: Option<Decimal>,
        total: Option<Decimal>,
        max: Option<Decimal>,
    ) -> Self {
        self.circulating_supply = circulating;
        self.total_supply = total;
        self.max_supply = max;
        self
    }

    pub fn price_formatted(&self) -> String {
        format_usd(self.price, 4)
    }

    pub fn market_cap_formatted(&self) -> String {
        format_usd(self.market_cap, 0)
    }

    pub fn volume_24h_formatted(&self) -> String {
        format_usd(self.volume_24h, 0)
    }

    pub fn circulating_supply_formatted(&self) -> String {
        supply_formatted(self.circulating_supply)
    }

    pub fn total_supply_formatted(&self) -> String {
        supply_formatted(self.total_supply)
    }

    pub fn max_supply_formatted(&self) -> String {
        supply_formatted(self.max_supply)
    }
}

fn supply_formatted(supply: Option<Decimal>) -> String {
    match supply {
        Some(value) if !value.is_zero() => format_amount(value, 0),
        _ => "N/A".into(),
    }
}

/// One protocol from the TVL provider's listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolRecord {
    pub name: String,
    pub symbol: String,
    pub slug: String,

    /// Total value locked in USD (zero when the provider has no figure)
    pub tvl: Decimal,
}

impl ProtocolRecord {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        slug: impl Into<String>,
        tvl: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            slug: slug.into(),
            tvl,
        }
    }
}

/// A single point of a protocol's TVL history
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TvlPoint {
    #[serde(rename = "totalLiquidityUSD", default)]
    pub total_liquidity_usd: Option<Decimal>,

    #[serde(default)]
    pub tvl: Option<Decimal>,
}

/// The `tvl` field of a protocol detail, which is either a history or a number
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TvlField {
    Series(Vec<TvlPoint>),
    Scalar(Decimal),
}

/// Per-protocol detail payload from the TVL provider
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolDetail {
    /// Current TVL per chain
    #[serde(default)]
    pub current_chain_tvls: Option<HashMap<String, Decimal>>,

    #[serde(default)]
    pub tvl: Option<TvlField>,
}

impl ProtocolDetail {
    /// Current TVL, taken from whichever shape the payload carries.
    ///
    /// Preference: summed chain map, then the last history point, then a scalar.
    pub fn current_tvl(&self) -> Decimal {
        if let Some(chains) = self.current_chain_tvls.as_ref().filter(|c| !c.is_empty()) {
            return chains
                .values()
                .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
                .unwrap_or(Decimal::ZERO);
        }

        match &self.tvl {
            Some(TvlField::Series(points)) => points
                .last()
                .and_then(|p| p.total_liquidity_usd.or(p.tvl))
                .unwrap_or(Decimal::ZERO),
            Some(TvlField::Scalar(value)) => *value,
            None => Decimal::ZERO,
        }
    }
}

/// Which TVL matching strategy produced the figure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMethod {
    #[serde(rename = "common mapping")]
    CommonMapping,
    #[serde(rename = "symbol mapping")]
    SymbolMapping,
    #[serde(rename = "protocols list match")]
    ProtocolsListMatch,
    #[serde(rename = "partial match")]
    PartialMatch,
    #[serde(rename = "not found")]
    NotFound,
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchMethod::CommonMapping => "common mapping",
            MatchMethod::SymbolMapping => "symbol mapping",
            MatchMethod::ProtocolsListMatch => "protocols list match",
            MatchMethod::PartialMatch => "partial match",
            MatchMethod::NotFound => "not found",
        };
        f.write_str(label)
    }
}

/// Whether a missing TVL is confirmed or just unknown
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TvlStatus {
    /// A positive TVL was found
    Found,
    /// The provider answered but nothing matched with a positive TVL
    Absent,
    /// The provider's protocol catalog could not be fetched
    Unknown,
}

/// Outcome of a TVL lookup. Absence is a value, never an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TvlResult {
    pub tvl: Decimal,
    pub has_tvl: bool,
    pub source: String,
    pub method: MatchMethod,
    pub status: TvlStatus,
}

impl TvlResult {
    pub fn found(tvl: Decimal, method: MatchMethod, source: impl Into<String>) -> Self {
        Self {
            tvl,
            has_tvl: true,
            source: source.into(),
            method,
            status: TvlStatus::Found,
        }
    }

    pub fn absent(source: impl Into<String>) -> Self {
        Self::missing(source, TvlStatus::Absent)
    }

    pub fn unknown(source: impl Into<String>) -> Self {
        Self::missing(source, TvlStatus::Unknown)
    }

    fn missing(source: impl Into<String>, status: TvlStatus) -> Self {
        Self {
            tvl: Decimal::ZERO,
            has_tvl: false,
            source: source.into(),
            method: MatchMethod::NotFound,
            status,
        }
    }

    pub fn tvl_formatted(&self) -> String {
        if self.has_tvl {
            format_usd(self.tvl, 0)
        } else {
            "Not available".into()
        }
    }
}

/// Merged result of one analysis request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Catalog entry the identifier resolved to
    pub asset: AssetRecord,

    pub quote: Quote,
    pub tvl: TvlResult,
    pub tvl_ratio: TvlRatioAnalysis,
    pub fdv: FdvAnalysis,
    pub inflation: InflationAnalysis,
    pub quality: DataQuality,

    /// Human-readable completeness summary
    pub data_status: String,
}

impl AnalysisRecord {
    pub fn name(&self) -> &str {
        &self.quote.name
    }

    pub fn symbol(&self) -> &str {
        &self.quote.symbol
    }

    /// True when every secondary lookup produced real data
    pub fn is_complete(&self) -> bool {
        self.tvl.status != TvlStatus::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_detail_sums_chain_map() {
        let detail: ProtocolDetail = serde_json::from_str(
            r#"{"currentChainTvls": {"Ethereum": 1000.5, "Arbitrum": 250}, "tvl": 5}"#,
        )
        .unwrap();
        assert_eq!(detail.current_tvl(), dec!(1250.5));
    }

    #[test]
    fn test_detail_uses_last_series_point() {
        let detail: ProtocolDetail = serde_json::from_str(
            r#"{"currentChainTvls": {}, "tvl": [
                {"date": 1, "totalLiquidityUSD": 10},
                {"date": 2, "totalLiquidityUSD": 42}
            ]}"#,
        )
        .unwrap();
        assert_eq!(detail.current_tvl(), dec!(42));

        let legacy: ProtocolDetail =
            serde_json::from_str(r#"{"tvl": [{"date": 1, "tvl": 7}]}"#).unwrap();
        assert_eq!(legacy.current_tvl(), dec!(7));
    }

    #[test]
    fn test_detail_scalar_and_missing() {
        let scalar: ProtocolDetail = serde_json::from_str(r#"{"tvl": 123.25}"#).unwrap();
        assert_eq!(scalar.current_tvl(), dec!(123.25));

        let empty: ProtocolDetail = serde_json::from_str(r#"{"name": "Nothing"}"#).unwrap();
        assert_eq!(empty.current_tvl(), Decimal::ZERO);
    }

    #[test]
    fn test_tvl_result_formatting() {
        let found = TvlResult::found(dec!(1234567.8), MatchMethod::PartialMatch, "DefiLlama");
        assert_eq!(found.tvl_formatted(), "$1,234,568");
        assert_eq!(found.method.to_string(), "partial match");

        let absent = TvlResult::absent("DefiLlama");
        assert!(!absent.has_tvl);
        assert_eq!(absent.tvl_formatted(), "Not available");
        assert_eq!(absent.method, MatchMethod::NotFound);
    }

    #[test]
    fn test_supply_formatting() {
        let quote = Quote::new("Bitcoin", "BTC", dec!(50000))
            .with_supply(Some(dec!(19000000)), Some(Decimal::ZERO), None);

        assert_eq!(quote.circulating_supply_formatted(), "19,000,000");
        assert_eq!(quote.total_supply_formatted(), "N/A");
        assert_eq!(quote.max_supply_formatted(), "N/A");
        assert_eq!(quote.price_formatted(), "$50,000.0000");
    }
}
