use serde::{Deserialize, Serialize};

/// SolXEN miner program on mainnet. Every analyzed transaction was sent here.
pub const MINER_PROGRAM_ID: &str = "B8HwMYCk1o7EaJhooM4P43BHSk5M8zZHsTeJixqw7LMN";

/// Wrapped SOL mint, the input side of the market quote.
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// SolXEN token mint, the output side of the market quote.
pub const SOLXEN_MINT: &str = "6f8deE148nynnSiWshA9vLydEbJGpDeKh5G4PRgjmzG7";

pub const JUPITER_QUOTE_URL: &str = "https://quote-api.jup.ag/v6/quote";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// RPC endpoint URL
    pub rpc_url: String,

    /// Miner program address whose transactions are analyzed
    pub miner_program_id: String,

    /// Transaction retrieval settings
    pub fetch: FetchConfig,

    /// Jupiter quote settings
    pub quote: QuoteConfig,

    /// Cost and emission constants
    pub cost_model: CostModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// How many recent signatures to analyze
    pub signature_limit: usize,

    /// Transactions per batched getTransaction request
    pub batch_size: usize,

    /// Pause between batches, rate-limit pacing only
    pub batch_pause_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Quote API endpoint
    pub api_url: String,

    /// Input token mint
    pub input_mint: String,

    /// Output token mint
    pub output_mint: String,

    /// Quote size in the input token's smallest unit
    pub amount_lamports: u64,

    /// Slippage tolerance in basis points
    pub slippage_bps: u64,

    /// Decimal places of the input token
    pub input_decimals: u8,

    /// Decimal places of the output token
    pub output_decimals: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostModelConfig {
    /// Compute unit price assumed when a transaction carries none, in
    /// lamports per compute unit. Heuristic fee floor, not a protocol rule.
    pub fallback_unit_price: f64,

    /// SolXEN minted per hash at AMP = 1
    pub solxen_per_hash: f64,

    /// SolXEN minted per superhash at AMP = 1
    pub solxen_per_super_hash: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            miner_program_id: MINER_PROGRAM_ID.to_string(),
            fetch: FetchConfig::default(),
            quote: QuoteConfig::default(),
            cost_model: CostModelConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            signature_limit: 100,
            batch_size: 20,
            batch_pause_ms: 500,
        }
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            api_url: JUPITER_QUOTE_URL.to_string(),
            input_mint: SOL_MINT.to_string(),
            output_mint: SOLXEN_MINT.to_string(),
            amount_lamports: 100_000_000, // 0.1 SOL
            slippage_bps: 50,
            input_decimals: 9,
            output_decimals: 6,
        }
    }
}

impl Default for CostModelConfig {
    fn default() -> Self {
        Self {
            fallback_unit_price: 1.0,
            solxen_per_hash: 420.0,
            solxen_per_super_hash: 42069.0,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AnalyzerConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Load config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            rpc_url: std::env::var("RPC_URL").unwrap_or(defaults.rpc_url),
            miner_program_id: std::env::var("MINER_PROGRAM_ID")
                .unwrap_or(defaults.miner_program_id),
            fetch: FetchConfig::from_env(),
            quote: QuoteConfig::from_env(),
            cost_model: defaults.cost_model,
        }
    }
}

impl FetchConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            signature_limit: std::env::var("SIGNATURE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.signature_limit),
            batch_size: std::env::var("BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.batch_size),
            batch_pause_ms: std::env::var("BATCH_PAUSE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.batch_pause_ms),
        }
    }
}

impl QuoteConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_url: std::env::var("QUOTE_API_URL").unwrap_or(defaults.api_url),
            input_mint: std::env::var("QUOTE_INPUT_MINT").unwrap_or(defaults.input_mint),
            output_mint: std::env::var("QUOTE_OUTPUT_MINT").unwrap_or(defaults.output_mint),
            amount_lamports: std::env::var("QUOTE_AMOUNT_LAMPORTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.amount_lamports),
            slippage_bps: std::env::var("QUOTE_SLIPPAGE_BPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.slippage_bps),
            input_decimals: defaults.input_decimals,
            output_decimals: defaults.output_decimals,
        }
    }
}
