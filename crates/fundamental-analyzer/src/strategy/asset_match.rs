//! Asset Catalog Matchers

use crate::model::AssetRecord;

/// A named predicate over catalog entries.
///
/// The needle passed to `matches` is already trimmed and lowercased.
#[derive(Clone, Copy, Debug)]
pub struct AssetMatcher {
    pub name: &'static str,
    predicate: fn(&AssetRecord, &str) -> bool,
}

impl AssetMatcher {
    pub const fn new(name: &'static str, predicate: fn(&AssetRecord, &str) -> bool) -> Self {
        Self { name, predicate }
    }

    pub fn matches(&self, asset: &AssetRecord, needle: &str) -> bool {
        (self.predicate)(asset, needle)
    }

    /// Case-insensitive equality against name, symbol or slug
    pub const EXACT: AssetMatcher = AssetMatcher::new("exact", |asset, needle| {
        asset.name.to_lowercase() == needle
            || asset.symbol.to_lowercase() == needle
            || asset.slug.to_lowercase() == needle
    });

    /// Case-insensitive containment within name or symbol
    pub const PARTIAL: AssetMatcher = AssetMatcher::new("partial", |asset, needle| {
        asset.name.to_lowercase().contains(needle) || asset.symbol.to_lowercase().contains(needle)
    });
}

/// Exact first, then partial
pub fn default_asset_matchers() -> Vec<AssetMatcher> {
    vec![AssetMatcher::EXACT, AssetMatcher::PARTIAL]
}

/// Walk matchers in order; within a matcher the first catalog hit wins.
///
/// Returns the matching entry with the name of the matcher that found it.
pub fn find_first_match<'a>(
    catalog: &'a [AssetRecord],
    identifier: &str,
    matchers: &[AssetMatcher],
) -> Option<(&'a AssetRecord, &'static str)> {
    let needle = identifier.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    matchers.iter().find_map(|matcher| {
        catalog
            .iter()
            .find(|asset| matcher.matches(asset, &needle))
            .map(|asset| (asset, matcher.name))
    })
}
