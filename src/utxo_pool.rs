use crate::{Coin, OutputRef, Transaction, TransactionOutput};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Iter;
use std::collections::HashMap;
use std::iter::FromIterator;

/// A pool of confirmed and unspent transaction outputs.
///
/// Every entry is an output of an applied transaction that no applied transaction has
/// consumed yet. Cloning produces an independent copy, which is how callers hand a snapshot
/// to the selection without giving up their own pool.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct UtxoPool {
    // Unspent transaction outputs, indexed by the transaction ID and their index in the
    // transaction.
    utxos: HashMap<OutputRef, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    pub fn contains(&self, output_ref: &OutputRef) -> bool {
        self.utxos.contains_key(output_ref)
    }

    pub fn get(&self, output_ref: &OutputRef) -> Option<&TransactionOutput> {
        self.utxos.get(output_ref)
    }

    /// Inserts the output, replacing any previous output under the same reference.
    pub fn add(&mut self, output_ref: OutputRef, output: TransactionOutput) {
        self.utxos.insert(output_ref, output);
    }

    /// Removes the output if present. Removing an absent reference changes nothing.
    pub fn remove(&mut self, output_ref: &OutputRef) -> Option<TransactionOutput> {
        self.utxos.remove(output_ref)
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, OutputRef, TransactionOutput> {
        self.utxos.iter()
    }

    /// Sum of all unspent amounts, None on overflow.
    pub fn total_value(&self) -> Option<Coin> {
        Coin::checked_sum(self.utxos.values().map(TransactionOutput::amount))
    }

    /// Applies the effects of an accepted transaction: its claims leave the pool and its
    /// outputs enter it under the transaction's own id.
    /// The transaction must have been validated against this pool.
    pub fn apply(&mut self, transaction: &Transaction) {
        for claimed in transaction.claimed_refs() {
            self.remove(claimed);
        }
        for (output_ref, output) in transaction.produced() {
            self.add(output_ref, output.clone());
        }
    }
}

impl FromIterator<(OutputRef, TransactionOutput)> for UtxoPool {
    fn from_iter<I: IntoIterator<Item = (OutputRef, TransactionOutput)>>(iter: I) -> Self {
        Self {
            utxos: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a UtxoPool {
    type Item = (&'a OutputRef, &'a TransactionOutput);
    type IntoIter = Iter<'a, OutputRef, TransactionOutput>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
