use crate::error::Result;
use crate::{Coin, OutputRef, PublicKey, Transaction, TransactionOutput, UtxoPool};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PoolEntry {
    #[serde(rename = "ref")]
    output_ref: OutputRef,
    amount: Coin,
    owner: PublicKey,
}

/// An initial pool and a batch of proposed transactions, as read by the CLI.
///
/// Example:
/// ```json
/// {
///   "pool": [{ "ref": "<TXID>:0", "amount": 10, "owner": "<hex public key>" }],
///   "batch": [{
///     "inputs": [{ "claimed": "<TXID>:0", "signature": "<hex signature>" }],
///     "outputs": [{ "amount": 9, "owner": "<hex public key>" }]
///   }]
/// }
/// ```
/// Transaction ids are recomputed on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pool: Vec<PoolEntry>,
    batch: Vec<Transaction>,
}

impl Scenario {
    pub fn new(pool: &UtxoPool, batch: Vec<Transaction>) -> Self {
        let mut entries = pool
            .iter()
            .map(|(output_ref, output)| PoolEntry {
                output_ref: *output_ref,
                amount: output.amount(),
                owner: *output.owner(),
            })
            .collect::<Vec<PoolEntry>>();
        entries.sort_by_key(|entry| entry.output_ref);
        Self {
            pool: entries,
            batch,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds the UTXO pool. A reference listed twice keeps its last entry.
    pub fn pool(&self) -> UtxoPool {
        self.pool
            .iter()
            .map(|entry| {
                (
                    entry.output_ref,
                    TransactionOutput::new(entry.amount, entry.owner),
                )
            })
            .collect()
    }

    pub fn batch(&self) -> &[Transaction] {
        &self.batch
    }
}
