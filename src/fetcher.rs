use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, Result};
use log::{debug, error, info};
use serde::Deserialize;
use serde_json::{json, Value};
use solana_client::rpc_client::{GetConfirmedSignaturesForAddress2Config, RpcClient};
use solana_client::rpc_response::RpcConfirmedTransactionStatusWithSignature;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// ═══════════════════════════════════════════════════════════════════════════════
/// TRANSACTION FETCHER
/// ═══════════════════════════════════════════════════════════════════════════════
///
/// Retrieves recent transactions sent to the SolXEN miner program.
///
/// Signatures are listed through the regular RPC client; the transactions
/// themselves are pulled in bounded JSON-RPC batches (one POST per batch)
/// with a fixed pause between batches to stay under provider rate limits.
/// A failed batch is logged and skipped, it is never retried. Transactions
/// the node could not resolve come back as null results and are filtered
/// out before anything downstream sees them.
/// ═══════════════════════════════════════════════════════════════════════════════

/// One transaction as returned by `getTransaction` with jsonParsed encoding.
///
/// Every field defaults so that partially populated RPC responses
/// deserialize instead of failing; downstream extraction treats missing
/// sub-fields as zero/empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionRecord {
    /// Attached from the signature listing, not part of the RPC result body
    #[serde(skip)]
    pub signature: String,
    pub block_time: Option<i64>,
    pub meta: Option<TransactionMeta>,
    pub transaction: Option<TransactionPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionMeta {
    pub fee: u64,
    pub compute_units_consumed: Option<u64>,
    pub log_messages: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionPayload {
    pub message: TransactionMessage,
    pub signatures: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionMessage {
    pub account_keys: Vec<AccountKey>,
    pub instructions: Vec<InstructionRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountKey {
    pub pubkey: String,
    pub signer: bool,
    pub writable: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstructionRecord {
    pub program_id: String,
    /// Base58 payload; absent on instructions the node fully parsed
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcBatchItem {
    id: Option<u64>,
    #[serde(default)]
    result: Option<TransactionRecord>,
}

pub struct TransactionFetcher {
    rpc_client: Arc<RpcClient>,
    http: reqwest::Client,
    rpc_url: String,
    program_id: Pubkey,
    batch_size: usize,
    batch_pause: Duration,
}

impl TransactionFetcher {
    pub fn new(config: &AnalyzerConfig) -> Result<Self> {
        let program_id = Pubkey::from_str(&config.miner_program_id).map_err(|e| {
            AnalyzerError::Config(format!(
                "Invalid miner program ID '{}': {}",
                config.miner_program_id, e
            ))
        })?;

        let rpc_client = Arc::new(RpcClient::new_with_commitment(
            config.rpc_url.clone(),
            CommitmentConfig::confirmed(),
        ));

        Ok(Self {
            rpc_client,
            http: reqwest::Client::new(),
            rpc_url: config.rpc_url.clone(),
            program_id,
            batch_size: config.fetch.batch_size.max(1),
            batch_pause: Duration::from_millis(config.fetch.batch_pause_ms),
        })
    }

    /// Fetch up to `limit` recent transactions involving the miner program.
    ///
    /// Unresolvable transactions are filtered out, so the returned list can
    /// be shorter than the signature count.
    pub async fn recent_transactions(&self, limit: usize) -> Result<Vec<TransactionRecord>> {
        info!(
            "Fetching the last {} mining transactions involving the miner program...",
            limit
        );

        let signatures = self.list_signatures(limit)?;
        info!("Fetched {} signatures.", signatures.len());

        let mut transactions = Vec::with_capacity(signatures.len());

        for (batch_index, batch) in signatures.chunks(self.batch_size).enumerate() {
            let base_id = batch_index * self.batch_size;

            match self.fetch_batch(base_id, batch).await {
                Ok(mut records) => transactions.append(&mut records),
                Err(e) => {
                    error!(
                        "Error in batch request ({} transactions skipped): {}",
                        batch.len(),
                        e
                    );
                }
            }

            // Pacing between round trips, not a retry mechanism
            sleep(self.batch_pause).await;
        }

        info!("Collected {} mining transactions.", transactions.len());
        Ok(transactions)
    }

    fn list_signatures(
        &self,
        limit: usize,
    ) -> Result<Vec<RpcConfirmedTransactionStatusWithSignature>> {
        let config = GetConfirmedSignaturesForAddress2Config {
            before: None,
            until: None,
            limit: Some(limit),
            commitment: Some(CommitmentConfig::confirmed()),
        };

        Ok(self
            .rpc_client
            .get_signatures_for_address_with_config(&self.program_id, config)?)
    }

    /// Issue one batched getTransaction request and pair each result with
    /// the signature it was requested for.
    async fn fetch_batch(
        &self,
        base_id: usize,
        batch: &[RpcConfirmedTransactionStatusWithSignature],
    ) -> Result<Vec<TransactionRecord>> {
        let requests: Vec<Value> = batch
            .iter()
            .enumerate()
            .map(|(offset, sig_info)| {
                json!({
                    "jsonrpc": "2.0",
                    "id": base_id + offset,
                    "method": "getTransaction",
                    "params": [
                        sig_info.signature,
                        {
                            "commitment": "confirmed",
                            "maxSupportedTransactionVersion": 0,
                            "encoding": "jsonParsed",
                        },
                    ],
                })
            })
            .collect();

        let items: Vec<RpcBatchItem> = self
            .http
            .post(&self.rpc_url)
            .json(&requests)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut records = Vec::with_capacity(items.len());

        for item in items {
            // Batch responses may arrive out of order; the id maps each
            // result back to its signature.
            let Some(sig_info) = item
                .id
                .and_then(|id| (id as usize).checked_sub(base_id))
                .and_then(|offset| batch.get(offset))
            else {
                debug!("Discarding batch response with unknown id {:?}", item.id);
                continue;
            };

            let Some(mut record) = item.result else {
                debug!("Transaction {} could not be resolved", sig_info.signature);
                continue;
            };

            record.signature = sig_info.signature.clone();
            record.block_time = record.block_time.or(sig_info.block_time);
            records.push(record);
        }

        Ok(records)
    }
}
