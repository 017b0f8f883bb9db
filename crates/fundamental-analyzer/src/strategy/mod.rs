//! Matching Strategies
//!
//! Ordered, tagged strategies used to match free-text identifiers against
//! provider catalogs. Resolvers walk these lists in order; adding a strategy
//! does not touch the resolution loops.

mod asset_match;
mod tvl_match;

pub use asset_match::{AssetMatcher, default_asset_matchers, find_first_match};
pub use tvl_match::{TvlLookup, TvlQuery, TvlStrategy, alias_slug};
