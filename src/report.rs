use crate::aggregator::{EmissionEstimate, MiningCostAnalysis};
use crate::quote::MarketQuote;
use colored::*;
use serde::Serialize;

/// Mining-side vs market-side cost of the same 100,000 SolXEN.
/// Negative profit_or_loss means mining is cheaper than buying.
#[derive(Debug, Clone, Serialize)]
pub struct CostComparison {
    pub mining_cost_sol: f64,
    pub market_cost_sol: f64,
    pub profit_or_loss_sol: f64,
    pub difference_pct: f64,
    pub profitable: bool,
}

pub fn compare_costs(mining_cost_sol: f64, market_cost_sol: f64) -> CostComparison {
    let profit_or_loss_sol = mining_cost_sol - market_cost_sol;
    let difference_pct = if market_cost_sol != 0.0 {
        profit_or_loss_sol.abs() / market_cost_sol * 100.0
    } else {
        0.0
    };

    CostComparison {
        mining_cost_sol,
        market_cost_sol,
        profit_or_loss_sol,
        difference_pct,
        profitable: profit_or_loss_sol < 0.0,
    }
}

fn format_block_time(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "?".to_string())
}

fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "n/a".to_string(),
    }
}

/// Render a metric/value panel with box-drawing borders.
fn print_metric_table(title: &str, rows: &[(&str, String)]) {
    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let mut value_width = rows.iter().map(|(_, v)| v.chars().count()).max().unwrap_or(0);

    // "║ label │ value ║" -> borders plus three spacing columns
    let mut inner = label_width + value_width + 5;
    let title_width = title.chars().count() + 2;
    if title_width > inner {
        value_width += title_width - inner;
        inner = title_width;
    }

    println!("╔{}╗", "═".repeat(inner));
    println!(
        "║{}║",
        format!("{:^width$}", title, width = inner).yellow().bold()
    );
    println!("╠{}╣", "═".repeat(inner));
    for (label, value) in rows {
        println!(
            "║ {:<lw$} │ {:>vw$} ║",
            label,
            value,
            lw = label_width,
            vw = value_width
        );
    }
    println!("╚{}╝", "═".repeat(inner));
}

pub fn print_mining_summary(analysis: &MiningCostAnalysis) {
    let mut rows = vec![
        (
            "Total Transactions Analyzed",
            analysis.transactions_analyzed.to_string(),
        ),
        ("Unique Miners Involved", analysis.unique_miners.to_string()),
        (
            "Average Hashes per Transaction",
            format_optional(analysis.average_hashes_per_tx, 2),
        ),
        (
            "Highest Hash Count in a Transaction",
            analysis.highest_hash_count.to_string(),
        ),
        (
            "Lowest Hash Count in a Transaction",
            analysis.lowest_hash_count.to_string(),
        ),
        (
            "Average Cost per Transaction (SOL)",
            format_optional(analysis.average_cost_per_tx, 9),
        ),
        (
            "Highest Cost in a Transaction (SOL)",
            format!("{:.9}", analysis.highest_cost_sol),
        ),
        (
            "Lowest Cost in a Transaction (SOL)",
            format!("{:.9}", analysis.lowest_cost_sol),
        ),
    ];

    if let (Some(earliest), Some(latest)) =
        (analysis.earliest_block_time, analysis.latest_block_time)
    {
        rows.push(("Oldest Transaction", format_block_time(earliest)));
        rows.push(("Newest Transaction", format_block_time(latest)));
    }

    println!();
    print_metric_table("Mining Transaction Summary", &rows);
}

pub fn print_cost_analysis(analysis: &MiningCostAnalysis) {
    let rows = vec![
        (
            "Total Mining Cost (SOL)",
            format!("{:.9}", analysis.total_cost_sol),
        ),
        ("Total Hashes Found", analysis.total_hashes_found.to_string()),
        (
            "Total Superhashes Found",
            analysis.total_super_hashes_found.to_string(),
        ),
        (
            "Cost per Hash Found (SOL)",
            format!("{:.9}", analysis.cost_per_hash_sol),
        ),
    ];

    println!();
    print_metric_table("Mining Cost Analysis", &rows);
}

pub fn print_emission_detail(emission: &EmissionEstimate) {
    let rows = vec![
        ("SolXEN per Hash", format!("{}", emission.solxen_per_hash)),
        (
            "SolXEN per Superhash",
            format!("{}", emission.solxen_per_super_hash),
        ),
        (
            "Total SolXEN from Hashes",
            format!("{}", emission.solxen_from_hashes),
        ),
        (
            "Total SolXEN from Superhashes",
            format!("{}", emission.solxen_from_super_hashes),
        ),
        (
            "Estimated Total SolXEN Minted",
            format!("{}", emission.total_solxen_minted),
        ),
        (
            "Cost per 100,000 SolXEN (SOL)",
            format!("{:.9}", emission.cost_per_100k_solxen),
        ),
    ];

    println!();
    print_metric_table(
        &format!("SolXEN Minting Details with AMP = {}", emission.amp),
        &rows,
    );
}

pub fn print_market_quote(quote: &MarketQuote) {
    let rows = vec![
        ("Input (SOL)", format!("{:.9}", quote.in_amount_sol)),
        ("Output (SolXEN)", format!("{:.6}", quote.out_amount_solxen)),
        ("Price Impact (%)", format!("{:.2}", quote.price_impact_pct)),
        (
            "Cost of 100,000 SolXEN (SOL)",
            format!("{:.9}", quote.cost_per_100k_solxen),
        ),
    ];

    println!();
    print_metric_table("Jupiter Swap Quote", &rows);
}

pub fn print_comparison(comparison: &CostComparison) {
    let delta_label = if comparison.profitable {
        "Profit (SOL)"
    } else {
        "Loss (SOL)"
    };

    let rows = vec![
        (
            "Cost to Mine 100,000 SolXEN (SOL)",
            format!("{:.9}", comparison.mining_cost_sol),
        ),
        (
            "Cost to Buy 100,000 SolXEN (SOL)",
            format!("{:.9}", comparison.market_cost_sol),
        ),
        (
            delta_label,
            format!("{:.9}", comparison.profit_or_loss_sol.abs()),
        ),
        (
            "Difference (%)",
            format!("{:.2}%", comparison.difference_pct),
        ),
        (
            "Mining is Profitable?",
            if comparison.profitable { "Yes" } else { "No" }.to_string(),
        ),
    ];

    println!();
    print_metric_table("Comparison", &rows);
}
