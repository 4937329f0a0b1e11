use crate::config::QuoteConfig;
use crate::error::{AnalyzerError, Result};
use log::info;
use serde::{Deserialize, Serialize};

/// Raw Jupiter v6 quote. Amounts arrive as integer strings in each token's
/// smallest unit; all fields are optional so a partial response surfaces
/// as a [`AnalyzerError::MalformedQuote`] during normalization instead of
/// a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawQuote {
    pub in_amount: Option<String>,
    pub out_amount: Option<String>,
    pub price_impact_pct: Option<String>,
}

/// Decimal-normalized market quote for the SOL → SolXEN pair.
#[derive(Debug, Clone, Serialize)]
pub struct MarketQuote {
    pub in_amount_sol: f64,
    pub out_amount_solxen: f64,
    pub price_impact_pct: f64,
    pub cost_per_100k_solxen: f64,
}

/// Normalize a raw quote by each token's decimal precision and derive the
/// cost of 100,000 output tokens.
///
/// The decimal counts are properties of the two specific tokens involved
/// (9 for SOL, 6 for SolXEN by default) and come from [`QuoteConfig`], so
/// a different pair only needs different configuration.
pub fn normalize_quote(
    raw: &RawQuote,
    input_decimals: u8,
    output_decimals: u8,
) -> Result<MarketQuote> {
    let in_amount = raw
        .in_amount
        .as_deref()
        .ok_or_else(|| AnalyzerError::MalformedQuote("missing inAmount".to_string()))?
        .parse::<u64>()
        .map_err(|e| AnalyzerError::MalformedQuote(format!("unparseable inAmount: {}", e)))?;

    let out_amount = raw
        .out_amount
        .as_deref()
        .ok_or_else(|| AnalyzerError::MalformedQuote("missing outAmount".to_string()))?
        .parse::<u64>()
        .map_err(|e| AnalyzerError::MalformedQuote(format!("unparseable outAmount: {}", e)))?;

    let in_amount_sol = in_amount as f64 / 10f64.powi(input_decimals as i32);
    let out_amount_solxen = out_amount as f64 / 10f64.powi(output_decimals as i32);

    if out_amount_solxen == 0.0 {
        return Err(AnalyzerError::MalformedQuote(
            "zero outAmount, unit cost undefined".to_string(),
        ));
    }

    let cost_per_100k_solxen = 100_000.0 * in_amount_sol / out_amount_solxen;

    // Jupiter reports price impact as a fraction string
    let price_impact_pct = raw
        .price_impact_pct
        .as_deref()
        .and_then(|v| v.parse::<f64>().ok())
        .map(|fraction| fraction * 100.0)
        .unwrap_or(0.0);

    Ok(MarketQuote {
        in_amount_sol,
        out_amount_solxen,
        price_impact_pct,
        cost_per_100k_solxen,
    })
}

/// Jupiter swap quote boundary.
pub struct QuoteClient {
    http: reqwest::Client,
    config: QuoteConfig,
}

impl QuoteClient {
    pub fn new(config: QuoteConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub async fn fetch_raw(&self) -> Result<RawQuote> {
        info!(
            "Requesting swap quote for {} smallest units of {}...",
            self.config.amount_lamports, self.config.input_mint
        );

        let amount = self.config.amount_lamports.to_string();
        let slippage_bps = self.config.slippage_bps.to_string();

        let raw: RawQuote = self
            .http
            .get(&self.config.api_url)
            .query(&[
                ("inputMint", self.config.input_mint.as_str()),
                ("outputMint", self.config.output_mint.as_str()),
                ("amount", amount.as_str()),
                ("slippageBps", slippage_bps.as_str()),
                ("onlyDirectRoutes", "false"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(raw)
    }

    /// Fetch and normalize in one step.
    pub async fn market_quote(&self) -> Result<MarketQuote> {
        let raw = self.fetch_raw().await?;
        normalize_quote(
            &raw,
            self.config.input_decimals,
            self.config.output_decimals,
        )
    }
}
