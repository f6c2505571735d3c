use crate::{
    Coin, Selection, SelectionPolicy, SignatureVerifier, Transaction, TransactionValidator,
    UtxoPool, ValidationError,
};

/// Owns the public ledger and handles one batch of proposed transactions at a time.
///
/// The ledger only changes through `handle_transactions`, which takes `&mut self` for the
/// whole batch, so no partially applied batch is ever observable.
pub struct TransactionHandler<V> {
    ledger: UtxoPool,
    validator: TransactionValidator<V>,
    policy: SelectionPolicy,
}

impl<V: SignatureVerifier> TransactionHandler<V> {
    /// Creates a handler whose ledger is a copy of `pool`.
    pub fn new(pool: &UtxoPool, verifier: V, policy: SelectionPolicy) -> Self {
        Self {
            ledger: pool.clone(),
            validator: TransactionValidator::new(verifier),
            policy,
        }
    }

    pub fn pool(&self) -> &UtxoPool {
        &self.ledger
    }

    pub fn is_valid_tx(&self, transaction: &Transaction) -> bool {
        self.validator.is_valid(transaction, &self.ledger)
    }

    /// Validates against the current ledger, returning the fee or the broken rule.
    pub fn validate(&self, transaction: &Transaction) -> Result<Coin, ValidationError> {
        self.validator.validate(transaction, &self.ledger)
    }

    /// Runs the selection against the current ledger without changing it.
    pub fn select(&self, batch: &[Transaction]) -> Selection {
        self.policy.select(&self.validator, batch, &self.ledger)
    }

    /// Selects a mutually valid subset of `batch`, applies it to the ledger and returns the
    /// accepted transactions in the order they were finalized.
    pub fn handle_transactions(&mut self, batch: &[Transaction]) -> Vec<Transaction> {
        let (accepted, ledger) = self.select(batch).into_parts();
        self.ledger = ledger;
        accepted
    }
}
