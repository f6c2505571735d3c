use crate::{
    Coin, ScroogeError, SignatureVerifier, Transaction, TransactionId, TransactionValidator,
    UtxoPool, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::{debug, info};

/// How a batch of proposed transactions is turned into a mutually valid subset.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    /// Accepts every transaction that is valid against the pool as updated by the
    /// transactions accepted before it. The first of two conflicting transactions wins.
    FirstSeen,
    /// Like `FirstSeen`, but when a transaction conflicts with accepted ones, it replaces
    /// them if that strictly increases the total fee.
    ///
    /// This is a single-pass greedy heuristic with one swap decision per conflicting
    /// transaction, not an exact maximum-weight solver. Conflicts that are not local, e.g.
    /// one transaction claiming the outputs of two later ones, can leave fees on the table.
    MaxFee,
}

impl SelectionPolicy {
    /// Selects transactions from `batch` in order, starting from `snapshot`. The snapshot is
    /// left untouched, the resulting pool is part of the returned selection.
    pub fn select<V: SignatureVerifier>(
        &self,
        validator: &TransactionValidator<V>,
        batch: &[Transaction],
        snapshot: &UtxoPool,
    ) -> Selection {
        let mut state = SelectionState::new(batch, snapshot);
        for index in 0..batch.len() {
            match self {
                SelectionPolicy::FirstSeen => state.first_seen(validator, index),
                SelectionPolicy::MaxFee => state.max_fee(validator, index),
            }
        }
        let selection = state.finish();
        info!(
            policy = %self,
            batch = batch.len(),
            accepted = selection.accepted.len(),
            rejected = selection.rejected.len(),
            repairs = selection.repairs,
            total_fee = %selection.total_fee,
            "selected transactions"
        );
        selection
    }
}

impl Display for SelectionPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionPolicy::FirstSeen => write!(f, "first-seen"),
            SelectionPolicy::MaxFee => write!(f, "max-fee"),
        }
    }
}

impl FromStr for SelectionPolicy {
    type Err = ScroogeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first-seen" => Ok(SelectionPolicy::FirstSeen),
            "max-fee" => Ok(SelectionPolicy::MaxFee),
            unknown => Err(ScroogeError::UnknownPolicy(unknown.to_string())),
        }
    }
}

/// The outcome of selecting a batch.
#[derive(Debug, Clone)]
pub struct Selection {
    accepted: Vec<Transaction>,
    rejected: Vec<(TransactionId, ValidationError)>,
    displaced: Vec<TransactionId>,
    repairs: usize,
    total_fee: Coin,
    pool: UtxoPool,
}

impl Selection {
    /// Accepted transactions in the order they were finalized.
    pub fn accepted(&self) -> &[Transaction] {
        &self.accepted
    }

    /// Transactions that were never accepted, with the rule they broke.
    pub fn rejected(&self) -> &[(TransactionId, ValidationError)] {
        &self.rejected
    }

    /// Transactions that were accepted and later replaced by a higher-fee conflict.
    pub fn displaced(&self) -> &[TransactionId] {
        &self.displaced
    }

    /// Number of conflicts resolved by replacing accepted transactions.
    pub fn repairs(&self) -> usize {
        self.repairs
    }

    pub fn total_fee(&self) -> Coin {
        self.total_fee
    }

    /// The pool after applying the accepted transactions.
    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    pub fn into_parts(self) -> (Vec<Transaction>, UtxoPool) {
        (self.accepted, self.pool)
    }
}

#[derive(Debug, Clone, Copy)]
struct Selected {
    // Position in the batch.
    index: usize,
    fee: Coin,
}

/// A single pass over the batch. `working_pool` is always `snapshot` with the `selected`
/// transactions applied in order.
struct SelectionState<'a> {
    batch: &'a [Transaction],
    snapshot: &'a UtxoPool,
    working_pool: UtxoPool,
    selected: Vec<Selected>,
    rejected: Vec<(TransactionId, ValidationError)>,
    displaced: Vec<TransactionId>,
    repairs: usize,
}

impl<'a> SelectionState<'a> {
    fn new(batch: &'a [Transaction], snapshot: &'a UtxoPool) -> Self {
        Self {
            batch,
            snapshot,
            working_pool: snapshot.clone(),
            selected: Vec::new(),
            rejected: Vec::new(),
            displaced: Vec::new(),
            repairs: 0,
        }
    }

    fn first_seen<V: SignatureVerifier>(
        &mut self,
        validator: &TransactionValidator<V>,
        index: usize,
    ) {
        match validator.validate(&self.batch[index], &self.working_pool) {
            Ok(fee) => self.accept(index, fee),
            Err(err) => self.reject(index, err),
        }
    }

    fn max_fee<V: SignatureVerifier>(&mut self, validator: &TransactionValidator<V>, index: usize) {
        match validator.validate(&self.batch[index], &self.working_pool) {
            Ok(fee) => self.accept(index, fee),
            Err(err) if err.is_conflict() => self.repair(validator, index, err),
            Err(err) => self.reject(index, err),
        }
    }

    fn accept(&mut self, index: usize, fee: Coin) {
        let batch = self.batch;
        let transaction = &batch[index];
        debug!(tx = %transaction.id().short(), %fee, "accepted transaction");
        self.working_pool.apply(transaction);
        self.selected.push(Selected { index, fee });
    }

    fn reject(&mut self, index: usize, err: ValidationError) {
        let batch = self.batch;
        let transaction = &batch[index];
        debug!(tx = %transaction.id().short(), %err, "rejected transaction");
        self.rejected.push((*transaction.id(), err));
    }

    /// The transaction claims an output that is missing from the working pool. If it's
    /// valid against the snapshot, an accepted transaction spent that output, and the
    /// conflicting transactions are replaced when that strictly increases the total fee.
    fn repair<V: SignatureVerifier>(
        &mut self,
        validator: &TransactionValidator<V>,
        index: usize,
        conflict: ValidationError,
    ) {
        let batch = self.batch;
        let transaction = &batch[index];
        let fee = match validator.validate(transaction, self.snapshot) {
            Ok(fee) => fee,
            Err(err) => return self.reject(index, err),
        };

        let evicted = self.evicted_by(transaction);
        let mut candidate = self
            .selected
            .iter()
            .filter(|s| !evicted.contains(&s.index))
            .copied()
            .collect::<Vec<Selected>>();
        candidate.push(Selected { index, fee });

        let fee_without = total_fee(&self.selected);
        let fee_with = total_fee(&candidate);
        let improves = match (fee_with, fee_without) {
            (Some(with), Some(without)) => with > without,
            _ => false,
        };
        if !improves {
            debug!(
                tx = %transaction.id().short(),
                %fee,
                "conflicting transaction does not increase the total fee"
            );
            return self.reject(index, conflict);
        }

        debug!(
            tx = %transaction.id().short(),
            %fee,
            evicted = evicted.len(),
            "replacing conflicting transactions"
        );
        let mut working_pool = self.snapshot.clone();
        for selected in &candidate {
            working_pool.apply(&batch[selected.index]);
        }
        let displaced = self
            .selected
            .iter()
            .filter(|s| evicted.contains(&s.index))
            .map(|s| *batch[s.index].id())
            .collect::<Vec<TransactionId>>();
        self.displaced.extend(displaced);
        self.working_pool = working_pool;
        self.selected = candidate;
        self.repairs += 1;
    }

    /// Batch positions of the selected transactions that must leave the selection for
    /// `transaction` to enter: those sharing a claim with it, and transitively those spending
    /// outputs of an evicted transaction.
    fn evicted_by(&self, transaction: &Transaction) -> HashSet<usize> {
        let mut evicted = self
            .selected
            .iter()
            .filter(|s| self.batch[s.index].conflicts_with(transaction))
            .map(|s| s.index)
            .collect::<HashSet<usize>>();
        let mut evicted_ids = evicted
            .iter()
            .map(|index| *self.batch[*index].id())
            .collect::<HashSet<TransactionId>>();
        // Children come after their parents in the selection, so one ordered scan reaches
        // every descendant.
        for selected in &self.selected {
            let child = &self.batch[selected.index];
            if !evicted.contains(&selected.index)
                && evicted_ids.iter().any(|parent| child.spends_from(parent))
            {
                evicted.insert(selected.index);
                evicted_ids.insert(*child.id());
            }
        }
        evicted
    }

    fn finish(self) -> Selection {
        let total_fee = total_fee(&self.selected).unwrap_or_else(Coin::zero);
        let batch = self.batch;
        let accepted = self
            .selected
            .iter()
            .map(|s| batch[s.index].clone())
            .collect();
        Selection {
            accepted,
            rejected: self.rejected,
            displaced: self.displaced,
            repairs: self.repairs,
            total_fee,
            pool: self.working_pool,
        }
    }
}

fn total_fee(selected: &[Selected]) -> Option<Coin> {
    Coin::checked_sum(selected.iter().map(|s| s.fee))
}
