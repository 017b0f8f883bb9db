//! Report Renderer
//!
//! Plain-text rendering of an [`AnalysisRecord`] for terminals.

use crate::error::ErrorRecord;
use crate::format::format_percent;
use crate::model::{AnalysisRecord, TvlStatus};

const RULE_WIDTH: usize = 50;

pub fn render_report(record: &AnalysisRecord) -> String {
    let quote = &record.quote;
    let mut output = String::new();

    output.push_str(&"═".repeat(RULE_WIDTH));
    output.push_str(&format!("\n📊 {} ({})\n", quote.name, quote.symbol));
    if let Some(rank) = quote.rank {
        output.push_str(&format!("  Rank:             #{}\n", rank));
    }
    if let Some(updated) = quote.last_updated {
        output.push_str(&format!(
            "  Last Updated:     {}\n",
            updated.format("%Y-%m-%d %H:%M UTC")
        ));
    }
    output.push_str(&"═".repeat(RULE_WIDTH));
    output.push('\n');

    output.push_str("\nPRICE & MARKET DATA\n");
    output.push_str(&format!("  Price:            {}\n", quote.price_formatted()));
    output.push_str(&format!("  Market Cap:       {}\n", quote.market_cap_formatted()));
    output.push_str(&format!("  Volume (24h):     {}\n", quote.volume_24h_formatted()));
    output.push_str(&format!(
        "  Change 1h/24h/7d: {} / {} / {}\n",
        format_percent(quote.percent_change.h1),
        format_percent(quote.percent_change.h24),
        format_percent(quote.percent_change.d7)
    ));

    output.push_str("\nVALUATION\n");
    output.push_str(&format!("  FDV:              {}\n", record.fdv.fdv_formatted()));
    output.push_str(&format!("  Market Size:      {}\n", record.fdv.market_size));
    output.push_str(&format!("  Valuation Risk:   {}\n", record.fdv.risk));

    output.push_str("\nTVL ANALYSIS\n");
    output.push_str(&format!("  TVL:              {}\n", record.tvl.tvl_formatted()));
    output.push_str(&format!("  Source:           {}\n", record.tvl.source));
    output.push_str(&format!("  Method:           {}\n", record.tvl.method));
    if record.tvl.has_tvl {
        output.push_str(&format!("  TVL/Market Cap:   {}\n", record.tvl_ratio.ratio_display()));
        output.push_str(&format!("  Assessment:       {}\n", record.tvl_ratio.interpretation));
        output.push_str(&format!("  Risk:             {}\n", record.tvl_ratio.risk));
    } else if record.tvl.status == TvlStatus::Unknown {
        output.push_str(&format!("  ⚠️  {} could not be reached\n", record.tvl.source));
    }

    output.push_str("\nSUPPLY & INFLATION\n");
    output.push_str(&format!("  Circulating:      {}\n", quote.circulating_supply_formatted()));
    output.push_str(&format!("  Total:            {}\n", quote.total_supply_formatted()));
    if quote.max_supply.is_some_and(|max| !max.is_zero()) {
        output.push_str(&format!("  Max:              {}\n", quote.max_supply_formatted()));
    }
    output.push_str(&format!(
        "  Inflation:        {} ({})\n",
        record.inflation.rate_display(),
        record.inflation.severity
    ));
    output.push_str(&format!("  {}\n", record.inflation.description()));

    output.push_str("\nDATA QUALITY\n");
    output.push_str(&format!(
        "  Completeness:     {} ({})\n",
        format_percent(record.quality.completeness),
        record.quality.level
    ));
    output.push_str(&format!("  Status:           {}\n", record.data_status));

    output
}

pub fn render_error(error: &ErrorRecord) -> String {
    let mut output = format!("❌ {}: {}", error.identifier, error.message);
    if error.retryable {
        output.push_str(" (temporary, try again)");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::metrics::{
        TvlRatioAnalysis, analyze_inflation, assess_data_quality, calculate_fdv,
        calculate_tvl_ratio,
    };
    use crate::model::{AssetRecord, MatchMethod, Quote, TvlResult};
    use rust_decimal_macros::dec;

    fn record(tvl: TvlResult, max_supply: Option<rust_decimal::Decimal>) -> AnalysisRecord {
        let mut quote = Quote::new("Bitcoin", "BTC", dec!(50000))
            .with_market_cap(dec!(1_000_000_000_000))
            .with_supply(Some(dec!(19_000_000)), Some(dec!(21_000_000)), max_supply);
        quote.rank = Some(1);

        let tvl_ratio = if tvl.has_tvl {
            calculate_tvl_ratio(tvl.tvl, quote.market_cap)
        } else {
            TvlRatioAnalysis::unknown("No TVL data")
        };

        AnalysisRecord {
            asset: AssetRecord::new(1, "Bitcoin", "BTC", "bitcoin"),
            fdv: calculate_fdv(quote.price, quote.total_supply),
            inflation: analyze_inflation(quote.circulating_supply, quote.total_supply),
            quality: assess_data_quality(&quote),
            quote,
            tvl,
            tvl_ratio,
            data_status: "Complete analysis with real data".into(),
        }
    }

    #[test]
    fn test_report_sections() {
        let report = render_report(&record(
            TvlResult::found(dec!(300_000_000_000), MatchMethod::CommonMapping, "DefiLlama"),
            Some(dec!(21_000_000)),
        ));

        assert!(report.contains("Bitcoin (BTC)"));
        assert!(report.contains("#1"));
        assert!(report.contains("$50,000.0000"));
        assert!(report.contains("$1,050,000,000,000.00"));
        assert!(report.contains("Very Large"));
        assert!(report.contains("common mapping"));
        assert!(report.contains("30%"));
        assert!(report.contains("Max:              21,000,000"));
        assert!(report.contains("Excellent"));
    }

    #[test]
    fn test_report_without_tvl_or_max_supply() {
        let report = render_report(&record(TvlResult::absent("DefiLlama"), None));

        assert!(report.contains("Not available"));
        assert!(report.contains("Source:           DefiLlama"));
        assert!(report.contains("Method:           not found"));
        assert!(!report.contains("TVL/Market Cap"));
        assert!(!report.contains("Max:"));
        assert!(!report.contains("could not be reached"));
    }

    #[test]
    fn test_report_flags_unreachable_tvl_provider() {
        let report = render_report(&record(TvlResult::unknown("DefiLlama"), None));
        assert!(report.contains("DefiLlama could not be reached"));
    }

    #[test]
    fn test_render_error() {
        let error = ErrorRecord {
            identifier: "notacoin".into(),
            kind: ErrorKind::NotFound,
            message: "Cryptocurrency 'notacoin' not found on CoinMarketCap".into(),
            retryable: false,
        };
        let rendered = render_error(&error);

        assert!(rendered.starts_with("❌ notacoin"));
        assert!(!rendered.contains("try again"));
    }
}
