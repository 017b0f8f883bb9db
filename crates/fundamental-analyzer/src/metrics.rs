//! Metric Calculator
//!
//! Side-effect-free classifiers for fully diluted valuation, supply
//! inflation, and TVL relative to market cap.
//!
//! Tier boundaries are exclusive-lower: a value exactly at a threshold falls
//! into the lower tier. Values keep full precision; only the `*_display`
//! helpers round to two decimals.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::format::{format_percent, format_usd};
use crate::model::Quote;

const HUNDRED: Decimal = dec!(100);

// ============================================================================
// Fully Diluted Valuation
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketSize {
    VeryLarge,
    Large,
    Medium,
    Small,
    Unknown,
}

impl fmt::Display for MarketSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MarketSize::VeryLarge => "Very Large",
            MarketSize::Large => "Large",
            MarketSize::Medium => "Medium",
            MarketSize::Small => "Small",
            MarketSize::Unknown => "Unknown",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FdvRisk {
    High,
    Medium,
    Low,
    VeryLow,
    Unknown,
}

impl fmt::Display for FdvRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FdvRisk::High => "High (aggressive valuation)",
            FdvRisk::Medium => "Medium",
            FdvRisk::Low => "Low",
            FdvRisk::VeryLow => "Very Low",
            FdvRisk::Unknown => "Unknown",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FdvAnalysis {
    pub fdv: Decimal,
    pub market_size: MarketSize,
    pub risk: FdvRisk,
}

impl FdvAnalysis {
    pub fn unknown() -> Self {
        Self {
            fdv: Decimal::ZERO,
            market_size: MarketSize::Unknown,
            risk: FdvRisk::Unknown,
        }
    }

    pub fn fdv_formatted(&self) -> String {
        if self.fdv.is_zero() {
            "$0".into()
        } else {
            format_usd(self.fdv, 2)
        }
    }
}

/// FDV = price * total supply
pub fn calculate_fdv(price: Decimal, total_supply: Option<Decimal>) -> FdvAnalysis {
    let total_supply = total_supply.unwrap_or(Decimal::ZERO);
    if price <= Decimal::ZERO || total_supply <= Decimal::ZERO {
        return FdvAnalysis::unknown();
    }
    // Out of Decimal range is treated like missing data
    let Some(fdv) = price.checked_mul(total_supply) else {
        return FdvAnalysis::unknown();
    };
    let (market_size, risk) = if fdv > dec!(10_000_000_000) {
        (MarketSize::VeryLarge, FdvRisk::High)
    } else if fdv > dec!(1_000_000_000) {
        (MarketSize::Large, FdvRisk::Medium)
    } else if fdv > dec!(100_000_000) {
        (MarketSize::Medium, FdvRisk::Low)
    } else {
        (MarketSize::Small, FdvRisk::VeryLow)
    };

    FdvAnalysis { fdv, market_size, risk }
}

// ============================================================================
// Inflation
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InflationSeverity {
    VeryHigh,
    High,
    Medium,
    Low,
    VeryLow,
    Unknown,
}

impl InflationSeverity {
    pub fn description(self) -> &'static str {
        match self {
            InflationSeverity::VeryHigh => "Very high inflation - potential selling pressure",
            InflationSeverity::High => "High inflation - needs close monitoring",
            InflationSeverity::Medium => "Medium inflation - acceptable for most projects",
            InflationSeverity::Low => "Low inflation - ideal condition",
            InflationSeverity::VeryLow => "Very low or zero inflation - optimal condition",
            InflationSeverity::Unknown => "Circulating supply is zero or unreported",
        }
    }
}

impl fmt::Display for InflationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InflationSeverity::VeryHigh => "Very High",
            InflationSeverity::High => "High",
            InflationSeverity::Medium => "Medium",
            InflationSeverity::Low => "Low",
            InflationSeverity::VeryLow => "Very Low",
            InflationSeverity::Unknown => "Unknown",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InflationAnalysis {
    /// Outstanding-but-not-circulating supply as a percentage of circulating
    pub rate: Decimal,
    pub severity: InflationSeverity,
}

impl InflationAnalysis {
    pub fn unknown() -> Self {
        Self {
            rate: Decimal::ZERO,
            severity: InflationSeverity::Unknown,
        }
    }

    pub fn rate_display(&self) -> String {
        format_percent(self.rate)
    }

    pub fn description(&self) -> &'static str {
        self.severity.description()
    }
}

pub fn analyze_inflation(
    circulating_supply: Option<Decimal>,
    total_supply: Option<Decimal>,
) -> InflationAnalysis {
    let Some(circulating) = circulating_supply.filter(|c| *c > Decimal::ZERO) else {
        return InflationAnalysis::unknown();
    };

    let rate = match total_supply {
        Some(total) if total > circulating => {
            let rate = total
                .checked_sub(circulating)
                .and_then(|outstanding| outstanding.checked_div(circulating))
                .and_then(|share| share.checked_mul(HUNDRED));
            match rate {
                Some(rate) => rate,
                None => return InflationAnalysis::unknown(),
            }
        }
        _ => Decimal::ZERO,
    };

    let severity = if rate > dec!(20) {
        InflationSeverity::VeryHigh
    } else if rate > dec!(10) {
        InflationSeverity::High
    } else if rate > dec!(5) {
        InflationSeverity::Medium
    } else if rate > dec!(1) {
        InflationSeverity::Low
    } else {
        InflationSeverity::VeryLow
    };

    InflationAnalysis { rate, severity }
}

// ============================================================================
// TVL / Market Cap
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TvlRisk {
    Low,
    Medium,
    High,
    VeryHigh,
    Unknown,
}

impl fmt::Display for TvlRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TvlRisk::Low => "low",
            TvlRisk::Medium => "medium",
            TvlRisk::High => "high",
            TvlRisk::VeryHigh => "very_high",
            TvlRisk::Unknown => "Unknown",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TvlRatioAnalysis {
    /// TVL as a percentage of market cap
    pub ratio: Decimal,
    pub interpretation: String,
    pub risk: TvlRisk,
}

impl TvlRatioAnalysis {
    pub fn unknown(interpretation: impl Into<String>) -> Self {
        Self {
            ratio: Decimal::ZERO,
            interpretation: interpretation.into(),
            risk: TvlRisk::Unknown,
        }
    }

    pub fn ratio_display(&self) -> String {
        format_percent(self.ratio)
    }
}

pub fn calculate_tvl_ratio(tvl: Decimal, market_cap: Decimal) -> TvlRatioAnalysis {
    if tvl <= Decimal::ZERO || market_cap <= Decimal::ZERO {
        return TvlRatioAnalysis::unknown("Insufficient data");
    }

    let Some(ratio) = tvl
        .checked_div(market_cap)
        .and_then(|share| share.checked_mul(HUNDRED))
    else {
        return TvlRatioAnalysis::unknown("Insufficient data");
    };
    let (interpretation, risk) = if ratio > dec!(50) {
        (
            "Very high TVL relative to market cap - indicates project health",
            TvlRisk::Low,
        )
    } else if ratio > dec!(20) {
        ("Good TVL relative to market cap", TvlRisk::Low)
    } else if ratio > dec!(10) {
        ("Reasonable TVL", TvlRisk::Medium)
    } else if ratio > dec!(5) {
        ("Low TVL - needs more investigation", TvlRisk::High)
    } else {
        ("Very low TVL - high risk", TvlRisk::VeryHigh)
    };

    TvlRatioAnalysis {
        ratio,
        interpretation: interpretation.into(),
        risk,
    }
}

// ============================================================================
// Data quality
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityLevel {
    Excellent,
    Good,
    Medium,
    Poor,
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QualityLevel::Excellent => "Excellent",
            QualityLevel::Good => "Good",
            QualityLevel::Medium => "Medium",
            QualityLevel::Poor => "Poor",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    /// Share of required fields that are populated, in percent
    pub completeness: Decimal,
    pub level: QualityLevel,
}

/// Completeness over name, symbol, price and market cap
pub fn assess_data_quality(quote: &Quote) -> DataQuality {
    let checks = [
        !quote.name.trim().is_empty(),
        !quote.symbol.trim().is_empty(),
        !quote.price.is_zero(),
        !quote.market_cap.is_zero(),
    ];
    let filled = checks.iter().filter(|c| **c).count();
    let completeness =
        (Decimal::from(filled) / Decimal::from(checks.len()) * HUNDRED).round_dp(2);

    let level = if completeness >= dec!(80) {
        QualityLevel::Excellent
    } else if completeness >= dec!(60) {
        QualityLevel::Good
    } else if completeness >= dec!(40) {
        QualityLevel::Medium
    } else {
        QualityLevel::Poor
    };

    DataQuality { completeness, level }
}
