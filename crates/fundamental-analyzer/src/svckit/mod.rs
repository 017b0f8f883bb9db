//! Service Kit
//!
//! Resolvers that turn raw provider data into answers, and the aggregator
//! that composes them into a full analysis.

mod aggregator;
mod catalog_resolver;
mod tvl_resolver;

pub use aggregator::{Aggregator, AnalysisOutcome};
pub use catalog_resolver::CatalogResolver;
pub use tvl_resolver::TvlResolver;
