//! TVL Matching Strategies
//!
//! The TVL provider names things differently from the market-data provider.
//! High-traffic assets go through a static alias table; the long tail is
//! matched against the protocol listing, precise strategies before fuzzy ones.

use crate::model::{MatchMethod, ProtocolRecord};

/// Static alias table: common coin names and tickers to TVL provider slugs
pub fn alias_slug(key: &str) -> Option<&'static str> {
    let slug = match key {
        "bitcoin" | "btc" => "bitcoin",
        "ethereum" | "eth" => "ethereum",
        "binance coin" | "bnb" => "binancecoin",
        "ripple" | "xrp" => "ripple",
        "cardano" | "ada" => "cardano",
        "solana" | "sol" => "solana",
        "polkadot" | "dot" => "polkadot",
        "dogecoin" | "doge" => "dogecoin",
        "avalanche" | "avax" => "avalanche",
        "chainlink" | "link" => "chainlink",
        "uniswap" | "uni" => "uniswap",
        "aave" => "aave",
        "compound" | "comp" => "compound",
        "polygon" | "matic" => "matic-network",
        "litecoin" | "ltc" => "litecoin",
        "cosmos" | "atom" => "cosmos",
        _ => return None,
    };
    Some(slug)
}

/// Normalized lookup input
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TvlQuery {
    /// Trimmed, lowercased asset name
    pub name: String,
    /// Trimmed, lowercased ticker (may be empty)
    pub symbol: String,
}

impl TvlQuery {
    pub fn new(name: &str, symbol: &str) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            symbol: symbol.trim().to_lowercase(),
        }
    }
}

/// What a strategy needs the resolver to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TvlLookup {
    /// Look the TVL up by provider slug
    Slug(&'static str),
    /// Scan the protocol listing with [`TvlStrategy::matches`]
    ScanCatalog,
    /// Strategy does not apply to this query
    Skip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TvlStrategy {
    NameAlias,
    SymbolAlias,
    ExactCatalog,
    PartialName,
}

impl TvlStrategy {
    /// Precision before recall
    pub const ORDER: [TvlStrategy; 4] = [
        TvlStrategy::NameAlias,
        TvlStrategy::SymbolAlias,
        TvlStrategy::ExactCatalog,
        TvlStrategy::PartialName,
    ];

    pub fn method(self) -> MatchMethod {
        match self {
            TvlStrategy::NameAlias => MatchMethod::CommonMapping,
            TvlStrategy::SymbolAlias => MatchMethod::SymbolMapping,
            TvlStrategy::ExactCatalog => MatchMethod::ProtocolsListMatch,
            TvlStrategy::PartialName => MatchMethod::PartialMatch,
        }
    }

    pub fn lookup(self, query: &TvlQuery) -> TvlLookup {
        match self {
            TvlStrategy::NameAlias => {
                alias_slug(&query.name).map_or(TvlLookup::Skip, TvlLookup::Slug)
            }
            TvlStrategy::SymbolAlias => {
                alias_slug(&query.symbol).map_or(TvlLookup::Skip, TvlLookup::Slug)
            }
            TvlStrategy::ExactCatalog if query.name.is_empty() && query.symbol.is_empty() => {
                TvlLookup::Skip
            }
            TvlStrategy::PartialName if query.name.is_empty() => TvlLookup::Skip,
            TvlStrategy::ExactCatalog | TvlStrategy::PartialName => TvlLookup::ScanCatalog,
        }
    }

    /// Catalog predicate for scanning strategies
    pub fn matches(self, protocol: &ProtocolRecord, query: &TvlQuery) -> bool {
        match self {
            TvlStrategy::ExactCatalog => {
                let symbol = protocol.symbol.to_lowercase();
                let name_hit = !query.name.is_empty()
                    && (protocol.name.to_lowercase() == query.name
                        || symbol == query.name
                        || protocol.slug.to_lowercase() == query.name);
                let symbol_hit = !query.symbol.is_empty() && symbol == query.symbol;
                name_hit || symbol_hit
            }
            TvlStrategy::PartialName => {
                !query.name.is_empty() && protocol.name.to_lowercase().contains(&query.name)
            }
            TvlStrategy::NameAlias | TvlStrategy::SymbolAlias => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_alias_table() {
        assert_eq!(alias_slug("btc"), Some("bitcoin"));
        assert_eq!(alias_slug("polygon"), Some("matic-network"));
        assert_eq!(alias_slug("binance coin"), Some("binancecoin"));
        assert_eq!(alias_slug("BTC"), None);
        assert_eq!(alias_slug("pepe"), None);
    }

    #[test]
    fn test_lookup_plan() {
        let query = TvlQuery::new(" Bitcoin ", "BTC");
        assert_eq!(TvlStrategy::NameAlias.lookup(&query), TvlLookup::Slug("bitcoin"));
        assert_eq!(TvlStrategy::SymbolAlias.lookup(&query), TvlLookup::Slug("bitcoin"));
        assert_eq!(TvlStrategy::ExactCatalog.lookup(&query), TvlLookup::ScanCatalog);

        let obscure = TvlQuery::new("Pendle", "PENDLE");
        assert_eq!(TvlStrategy::NameAlias.lookup(&obscure), TvlLookup::Skip);
        assert_eq!(TvlStrategy::PartialName.lookup(&obscure), TvlLookup::ScanCatalog);

        let blank = TvlQuery::new("", "");
        assert_eq!(TvlStrategy::ExactCatalog.lookup(&blank), TvlLookup::Skip);
        assert_eq!(TvlStrategy::PartialName.lookup(&blank), TvlLookup::Skip);
    }

    #[test]
    fn test_exact_catalog_predicate() {
        let aave = ProtocolRecord::new("Aave V3", "AAVE", "aave-v3", Decimal::ONE);

        assert!(TvlStrategy::ExactCatalog.matches(&aave, &TvlQuery::new("aave v3", "")));
        assert!(TvlStrategy::ExactCatalog.matches(&aave, &TvlQuery::new("AAVE-V3", "")));
        assert!(TvlStrategy::ExactCatalog.matches(&aave, &TvlQuery::new("Aave Token", "aave")));
        // the query name may equal the protocol's symbol
        assert!(TvlStrategy::ExactCatalog.matches(&aave, &TvlQuery::new("Aave", "")));
        assert!(!TvlStrategy::ExactCatalog.matches(&aave, &TvlQuery::new("Aave Token", "")));

        // an empty query symbol never matches protocols without a symbol
        let bare = ProtocolRecord::new("Bare", "", "bare", Decimal::ONE);
        assert!(!TvlStrategy::ExactCatalog.matches(&bare, &TvlQuery::new("other", "")));
    }

    #[test]
    fn test_partial_predicate() {
        let aave = ProtocolRecord::new("Aave V3", "AAVE", "aave-v3", Decimal::ONE);
        assert!(TvlStrategy::PartialName.matches(&aave, &TvlQuery::new("Aave", "")));
        assert!(!TvlStrategy::PartialName.matches(&aave, &TvlQuery::new("Compound", "")));
    }
}
