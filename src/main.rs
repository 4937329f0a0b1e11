use clap::Parser;
use colored::*;
use log::{error, info, warn};
use solxen_analyzer::{
    aggregator::analyze_mining_costs,
    aggregator::validate_amp,
    config::AnalyzerConfig,
    error::{AnalyzerError, Result},
    fetcher::TransactionFetcher,
    quote::QuoteClient,
    report,
};
use std::io::{self, Write};

#[derive(Parser, Debug)]
#[command(
    name = "solxen-analyzer",
    about = "SolXEN mining cost analysis: compares the cost of mining SolXEN against buying it"
)]
struct Cli {
    /// Current AMP value (prompted for when omitted)
    #[arg(long)]
    amp: Option<f64>,

    /// Number of recent mining transactions to analyze
    #[arg(long)]
    limit: Option<usize>,

    /// Path to a JSON config file
    #[arg(long)]
    config: Option<String>,

    /// RPC endpoint override
    #[arg(long)]
    rpc_url: Option<String>,
}

fn load_config(cli: &Cli) -> Result<AnalyzerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading config from: {}", path);
            AnalyzerConfig::from_file(path)
                .map_err(|e| AnalyzerError::Config(format!("failed to load '{}': {}", path, e)))?
        }
        None => AnalyzerConfig::from_env(),
    };

    if let Some(rpc_url) = &cli.rpc_url {
        config.rpc_url = rpc_url.clone();
    }
    if let Some(limit) = cli.limit {
        config.fetch.signature_limit = limit;
    }

    Ok(config)
}

/// Resolve AMP from the CLI flag, the AMP env var, or an interactive
/// prompt, in that order.
fn resolve_amp(cli: &Cli) -> Result<f64> {
    if let Some(amp) = cli.amp {
        return Ok(amp);
    }

    if let Ok(raw) = std::env::var("AMP") {
        return raw.trim().parse::<f64>().map_err(|_| {
            AnalyzerError::InvalidParameter(format!("AMP env value '{}' is not a number", raw))
        });
    }

    print!("{}", "Enter the current AMP value (e.g., 300): ".white());
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let trimmed = line.trim();

    trimmed.parse::<f64>().map_err(|_| {
        AnalyzerError::InvalidParameter(format!("AMP value '{}' is not a number", trimmed))
    })
}

async fn run(cli: Cli) -> Result<()> {
    println!("{}", "Starting SolXEN Mining Cost Analysis".cyan().bold());
    println!("{}", "===================================".cyan().bold());

    let config = load_config(&cli)?;

    // Fail fast on a bad AMP before any network round trip
    let amp = resolve_amp(&cli)?;
    validate_amp(amp)?;
    info!("Using AMP value: {}", amp);

    let fetcher = TransactionFetcher::new(&config)?;
    let records = fetcher
        .recent_transactions(config.fetch.signature_limit)
        .await?;

    let analysis = analyze_mining_costs(&records, amp, &config.cost_model)?;

    report::print_mining_summary(&analysis);
    report::print_cost_analysis(&analysis);
    report::print_emission_detail(&analysis.emission);

    // A failed or malformed quote drops the comparison section only; the
    // mining-side report above already went out.
    let quote_client = QuoteClient::new(config.quote.clone());
    match quote_client.market_quote().await {
        Ok(quote) => {
            report::print_market_quote(&quote);
            let comparison = report::compare_costs(
                analysis.emission.cost_per_100k_solxen,
                quote.cost_per_100k_solxen,
            );
            report::print_comparison(&comparison);
        }
        Err(e) => {
            warn!("Skipping market comparison, quote unavailable: {}", e);
        }
    }

    println!("\n{}", "Analysis complete.".cyan().bold());
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Analysis aborted: {}", e);
        std::process::exit(1);
    }
}
