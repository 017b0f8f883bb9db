//! # fundamental-analyzer
//!
//! Fundamental analysis for cryptocurrencies: resolves a free-text name or
//! ticker to a market-data catalog entry, pulls a live quote, finds the
//! asset's total value locked (TVL), and derives valuation, inflation and
//! TVL-ratio metrics.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐    ┌────────────────┐    ┌──────────────┐
//! │  "eth"       │───▶│ CatalogResolver│───▶│ fetch_quote  │
//! │  identifier  │    │ exact→partial  │    │ (market data)│
//! └──────────────┘    └────────────────┘    └──────┬───────┘
//!                                                  │
//!                     ┌────────────────┐           ▼
//!                     │  TvlResolver   │◀── name + symbol
//!                     │ alias→symbol→  │
//!                     │ exact→partial  │
//!                     └───────┬────────┘
//!                             ▼
//!              ┌──────────────────────────────┐
//!              │ metrics: FDV · inflation ·   │
//!              │ TVL/market cap · quality     │
//!              └──────────────┬───────────────┘
//!                             ▼
//!                      AnalysisRecord
//! ```
//!
//! Catalog and quote failures end the request with an [`AnalyzerError`].
//! TVL and metric gaps never do: they degrade to sentinel values.

pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod metrics;
pub mod model;
pub mod provider;
pub mod report;
pub mod strategy;
pub mod svckit;

pub use config::AnalyzerConfig;
pub use error::{AnalyzerError, ErrorKind, ErrorRecord, Result};
pub use model::{AnalysisRecord, AssetRecord, MatchMethod, Quote, TvlResult, TvlStatus};
pub use svckit::{Aggregator, AnalysisOutcome};
