use crate::fetcher::TransactionRecord;
use serde::Serialize;

/// ═══════════════════════════════════════════════════════════════════════════════
/// FEE / WORK EXTRACTOR
/// ═══════════════════════════════════════════════════════════════════════════════
///
/// Reconstructs, from a single confirmed transaction, how much work the
/// miner produced (hashes / superhashes counted from program log lines)
/// and what that work cost in SOL (base fee + priority fee derived from
/// the compute budget instruction).
///
/// Pure function of its input. Missing or malformed sub-fields degrade to
/// zero / sentinel values, never to an error.
/// ═══════════════════════════════════════════════════════════════════════════════

pub const COMPUTE_BUDGET_PROGRAM_ID: &str = "ComputeBudget111111111111111111111111111111";

/// Log marker the miner program emits for a superhash. Contains
/// [`HASH_MARKER`] as a prefix, so it must be tested first.
pub const SUPER_HASH_MARKER: &str = "Found '42069'";

/// Log marker for an ordinary hash.
pub const HASH_MARKER: &str = "Found '420'";

/// Sentinel miner identity when a transaction carries no account keys.
pub const UNKNOWN_MINER: &str = "Unknown Miner";

pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;
pub const MICRO_LAMPORTS_PER_LAMPORT: f64 = 1_000_000.0;

/// SetComputeUnitPrice discriminant in the compute budget program.
const SET_COMPUTE_UNIT_PRICE: u8 = 3;

/// Work and cost figures derived from one transaction.
#[derive(Debug, Clone, Serialize)]
pub struct MiningInfo {
    pub miner_address: String,
    pub fee_sol: f64,
    pub compute_units_consumed: u64,
    /// Lamports per compute unit, after the fallback floor
    pub compute_unit_price: f64,
    pub compute_cost_sol: f64,
    pub hashes_found: u64,
    pub super_hashes_found: u64,
    pub total_cost_sol: f64,
}

/// Decode a SetComputeUnitPrice payload: discriminant byte 3 followed by a
/// little-endian u32 in micro-lamports per compute unit. Returns None for
/// other discriminants and for payloads shorter than 5 bytes.
pub fn decode_compute_unit_price(data: &[u8]) -> Option<u32> {
    if data.len() < 5 || data[0] != SET_COMPUTE_UNIT_PRICE {
        return None;
    }

    let raw: [u8; 4] = data[1..5].try_into().ok()?;
    Some(u32::from_le_bytes(raw))
}

/// Extract mining work and cost from one transaction record.
///
/// `fallback_unit_price` (lamports per compute unit) is applied when no
/// compute budget price instruction is present or the decoded price is
/// zero. The default of 1 models an implicit minimum fee floor.
pub fn extract_mining_info(record: &TransactionRecord, fallback_unit_price: f64) -> MiningInfo {
    let meta = record.meta.as_ref();
    let fee = meta.map(|m| m.fee).unwrap_or(0);
    let compute_units_consumed = meta.and_then(|m| m.compute_units_consumed).unwrap_or(0);

    let mut compute_unit_price = 0.0;

    if let Some(message) = record.transaction.as_ref().map(|t| &t.message) {
        for ix in &message.instructions {
            if ix.program_id != COMPUTE_BUDGET_PROGRAM_ID {
                continue;
            }
            let Some(data) = ix.data.as_deref() else {
                continue;
            };
            let Ok(bytes) = bs58::decode(data).into_vec() else {
                continue;
            };
            if let Some(micro_lamports) = decode_compute_unit_price(&bytes) {
                // Last price instruction wins
                compute_unit_price = micro_lamports as f64 / MICRO_LAMPORTS_PER_LAMPORT;
            }
        }
    }

    if compute_unit_price == 0.0 {
        compute_unit_price = fallback_unit_price;
    }

    let compute_cost_sol = compute_units_consumed as f64 * compute_unit_price / LAMPORTS_PER_SOL;
    let fee_sol = fee as f64 / LAMPORTS_PER_SOL;
    let total_cost_sol = fee_sol + compute_cost_sol;

    let mut hashes_found = 0u64;
    let mut super_hashes_found = 0u64;

    if let Some(logs) = meta.and_then(|m| m.log_messages.as_ref()) {
        for line in logs {
            // The superhash marker subsumes the hash marker, check it first.
            // A superhash counts toward both totals, exactly once each.
            if line.contains(SUPER_HASH_MARKER) {
                hashes_found += 1;
                super_hashes_found += 1;
            } else if line.contains(HASH_MARKER) {
                hashes_found += 1;
            }
        }
    }

    let miner_address = record
        .transaction
        .as_ref()
        .and_then(|t| t.message.account_keys.first())
        .map(|key| key.pubkey.clone())
        .unwrap_or_else(|| UNKNOWN_MINER.to_string());

    MiningInfo {
        miner_address,
        fee_sol,
        compute_units_consumed,
        compute_unit_price,
        compute_cost_sol,
        hashes_found,
        super_hashes_found,
        total_cost_sol,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{
        AccountKey, InstructionRecord, TransactionMessage, TransactionMeta, TransactionPayload,
    };

    const FALLBACK: f64 = 1.0;

    fn record(
        fee: u64,
        compute_units: Option<u64>,
        instructions: Vec<InstructionRecord>,
        logs: Vec<&str>,
        keys: Vec<&str>,
    ) -> TransactionRecord {
        TransactionRecord {
            signature: "test-signature".to_string(),
            block_time: Some(1715700000),
            meta: Some(TransactionMeta {
                fee,
                compute_units_consumed: compute_units,
                log_messages: Some(logs.into_iter().map(String::from).collect()),
            }),
            transaction: Some(TransactionPayload {
                message: TransactionMessage {
                    account_keys: keys
                        .into_iter()
                        .map(|pubkey| AccountKey {
                            pubkey: pubkey.to_string(),
                            signer: true,
                            writable: true,
                        })
                        .collect(),
                    instructions,
                },
                signatures: vec!["test-signature".to_string()],
            }),
        }
    }

    fn price_instruction(micro_lamports: u32) -> InstructionRecord {
        let mut payload = vec![3u8];
        payload.extend_from_slice(&micro_lamports.to_le_bytes());
        InstructionRecord {
            program_id: COMPUTE_BUDGET_PROGRAM_ID.to_string(),
            data: Some(bs58::encode(&payload).into_string()),
        }
    }

    #[test]
    fn counts_hash_and_superhash_markers() {
        let tx = record(
            5000,
            Some(100_000),
            vec![],
            vec![
                "Program log: Found '42069' superhash!",
                "Program log: Found '420' hash",
                "Program log: unrelated output",
            ],
            vec!["miner1"],
        );

        let info = extract_mining_info(&tx, FALLBACK);

        assert_eq!(info.hashes_found, 2);
        assert_eq!(info.super_hashes_found, 1);
        assert!(info.super_hashes_found <= info.hashes_found);
    }

    #[test]
    fn superhash_line_counts_once_toward_each_total() {
        // The hash marker is a substring of the superhash marker; a single
        // superhash line must not be double-counted as a hash as well.
        let tx = record(
            0,
            None,
            vec![],
            vec!["Program log: Found '42069' superhash!"],
            vec!["miner1"],
        );

        let info = extract_mining_info(&tx, FALLBACK);

        assert_eq!(info.hashes_found, 1);
        assert_eq!(info.super_hashes_found, 1);
    }

    #[test]
    fn defaults_unit_price_without_budget_instruction() {
        // Boundary case: the 1 lamport/CU floor is a heuristic default,
        // not a protocol requirement.
        let tx = record(5000, Some(100_000), vec![], vec![], vec!["miner1"]);

        let info = extract_mining_info(&tx, FALLBACK);

        assert_eq!(info.compute_unit_price, 1.0);
        assert!((info.compute_cost_sol - 0.0001).abs() < 1e-12);
        assert!((info.total_cost_sol - 0.000105).abs() < 1e-12);
    }

    #[test]
    fn decodes_compute_unit_price_from_instruction() {
        // 1_000_000 micro-lamports per CU = 1 lamport per CU
        let tx = record(
            5000,
            Some(200_000),
            vec![price_instruction(1_000_000)],
            vec![],
            vec!["miner1"],
        );

        let info = extract_mining_info(&tx, FALLBACK);

        assert_eq!(info.compute_unit_price, 1.0);
        assert!((info.compute_cost_sol - 0.0002).abs() < 1e-12);
    }

    #[test]
    fn last_price_instruction_wins() {
        let tx = record(
            0,
            Some(1_000_000),
            vec![price_instruction(2_000_000), price_instruction(5_000_000)],
            vec![],
            vec!["miner1"],
        );

        let info = extract_mining_info(&tx, FALLBACK);

        assert_eq!(info.compute_unit_price, 5.0);
    }

    #[test]
    fn zero_decoded_price_falls_back_to_floor() {
        let tx = record(
            0,
            Some(100_000),
            vec![price_instruction(0)],
            vec![],
            vec!["miner1"],
        );

        let info = extract_mining_info(&tx, FALLBACK);

        assert_eq!(info.compute_unit_price, 1.0);
    }

    #[test]
    fn short_payload_is_ignored() {
        assert_eq!(decode_compute_unit_price(&[3, 1, 2]), None);
        assert_eq!(decode_compute_unit_price(&[]), None);
        // Wrong discriminant
        assert_eq!(decode_compute_unit_price(&[2, 1, 0, 0, 0]), None);
        // Exactly five bytes decodes
        assert_eq!(decode_compute_unit_price(&[3, 1, 0, 0, 0]), Some(1));
    }

    #[test]
    fn empty_record_degrades_to_defaults() {
        let tx = TransactionRecord::default();

        let info = extract_mining_info(&tx, FALLBACK);

        assert_eq!(info.miner_address, UNKNOWN_MINER);
        assert_eq!(info.fee_sol, 0.0);
        assert_eq!(info.compute_units_consumed, 0);
        assert_eq!(info.hashes_found, 0);
        assert_eq!(info.super_hashes_found, 0);
        assert_eq!(info.total_cost_sol, 0.0);
    }

    #[test]
    fn extraction_is_deterministic() {
        let tx = record(
            5000,
            Some(150_000),
            vec![price_instruction(250_000)],
            vec!["Program log: Found '420' hash"],
            vec!["miner1"],
        );

        let first = extract_mining_info(&tx, FALLBACK);
        let second = extract_mining_info(&tx, FALLBACK);

        assert_eq!(first.total_cost_sol, second.total_cost_sol);
        assert_eq!(first.hashes_found, second.hashes_found);
        assert_eq!(first.miner_address, second.miner_address);
    }
}
