//! analyze
//!
//! Command-line front end: one report per coin named on the command line,
//! or an interactive prompt when none are given.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fundamental_analyzer::provider::{MockMarketData, MockTvlProvider};
use fundamental_analyzer::report::{render_error, render_report};
use fundamental_analyzer::{Aggregator, AnalysisOutcome, AnalyzerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fundamental analysis for cryptocurrencies")]
struct Cli {
    /// Coin names, tickers or slugs (e.g. bitcoin ETH solana). Each argument is
    /// one coin: quote multi-word names, as in "binance coin"
    coins: Vec<String>,

    /// Print analysis records as JSON instead of text reports
    #[arg(long)]
    json: bool,

    /// Fiat currency for quotes
    #[arg(long, env = "QUOTE_CURRENCY")]
    currency: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Use built-in sample data instead of the live APIs
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment before clap reads env-backed flags
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays clean for reports and JSON
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = AnalyzerConfig::from_env();
    if let Some(currency) = &cli.currency {
        config.quote_currency = currency.to_uppercase();
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout_secs = timeout;
    }

    let aggregator = if cli.demo {
        tracing::info!("Using built-in sample data");
        Aggregator::new(
            Arc::new(MockMarketData::demo()),
            Arc::new(MockTvlProvider::demo()),
            &config,
        )
    } else {
        match Aggregator::from_config(&config) {
            Ok(aggregator) => aggregator,
            Err(e) => {
                eprintln!("❌ {}", e.user_message());
                eprintln!("   Set COINMARKETCAP_API_KEY in your environment or .env file.");
                eprintln!("   Get a free key at https://coinmarketcap.com/api/");
                eprintln!("   Or run with --demo to try sample data.");
                return Ok(ExitCode::FAILURE);
            }
        }
    };

    if cli.coins.is_empty() {
        interactive(&aggregator, cli.json).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let outcomes = aggregator.analyze_many(cli.coins.as_slice()).await;
    print_outcomes(&outcomes, cli.json)?;

    Ok(if batch_succeeded(&outcomes) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// A batch succeeds only if every coin did
fn batch_succeeded(outcomes: &[AnalysisOutcome]) -> bool {
    outcomes.iter().all(Result::is_ok)
}

async fn interactive(aggregator: &Aggregator, json: bool) -> anyhow::Result<()> {
    println!("Crypto Fundamental Analyzer");
    println!("Enter a coin name or ticker, or 'quit' to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit") {
            break;
        }

        let outcomes = aggregator.analyze_many(&[input]).await;
        print_outcomes(&outcomes, json)?;
    }

    Ok(())
}

fn print_outcomes(outcomes: &[AnalysisOutcome], json: bool) -> anyhow::Result<()> {
    if json {
        let values = outcomes
            .iter()
            .map(|outcome| match outcome {
                Ok(record) => serde_json::to_value(record),
                Err(error) => serde_json::to_value(error),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let body = match values.as_slice() {
            [single] => serde_json::to_string_pretty(single)?,
            _ => serde_json::to_string_pretty(&values)?,
        };
        println!("{}", body);
        return Ok(());
    }

    for outcome in outcomes {
        match outcome {
            Ok(record) => println!("{}", render_report(record)),
            Err(error) => eprintln!("{}", render_error(error)),
        }
    }
    Ok(())
}
