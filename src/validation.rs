use crate::{Coin, OutputRef, SignatureVerifier, Transaction, TransactionOutput, UtxoPool};
use std::collections::HashSet;
use thiserror::Error;

/// The first rule a transaction broke.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ValidationError {
    #[error("claimed output: {0} is not in the UTXO pool")]
    MissingClaim(OutputRef),

    #[error("signature of input: {index} does not verify against the owner of: {claimed}")]
    InvalidSignature { index: usize, claimed: OutputRef },

    #[error("output: {0} is claimed more than once")]
    DuplicateClaim(OutputRef),

    #[error("output: {index} has a negative amount: {amount}")]
    NegativeOutput { index: usize, amount: Coin },

    #[error("inputs: {inputs} are less than outputs: {outputs}")]
    InsufficientInputs { inputs: Coin, outputs: Coin },

    #[error("transaction amounts overflow")]
    ValueOverflow,
}

impl ValidationError {
    /// True when the transaction failed only because a claim is absent, i.e. it may be a
    /// double-spend of an output that another transaction consumed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ValidationError::MissingClaim(_))
    }
}

/// Checks transactions against a UTXO pool.
///
/// A transaction is valid if:
///   - all outputs it claims are in the pool,
///   - the signature on each input verifies under the owner of the claimed output,
///   - no output is claimed more than once,
///   - all of its output amounts are non-negative,
///   - the sum of its input amounts is greater than or equal to the sum of its outputs.
///
/// The checks run in that order and stop at the first failure. Claims are always checked
/// before signatures because the owner to verify against is looked up in the pool.
///
/// Amounts are summed as `Coin`, so a transaction whose inputs or outputs add up to more
/// than `i64::MAX` is rejected with `ValueOverflow`, even if it conserves value.
#[derive(Debug, Clone, Default)]
pub struct TransactionValidator<V> {
    verifier: V,
}

impl<V: SignatureVerifier> TransactionValidator<V> {
    pub fn new(verifier: V) -> Self {
        Self { verifier }
    }

    pub fn is_valid(&self, transaction: &Transaction, pool: &UtxoPool) -> bool {
        self.validate(transaction, pool).is_ok()
    }

    /// Returns the transaction fee if the transaction is valid against `pool`.
    pub fn validate(
        &self,
        transaction: &Transaction,
        pool: &UtxoPool,
    ) -> Result<Coin, ValidationError> {
        Self::validate_all_claims_in_pool(transaction, pool)?;
        self.validate_all_signatures(transaction, pool)?;
        Self::validate_no_output_claimed_twice(transaction)?;
        Self::validate_all_outputs_non_negative(transaction)?;
        Self::validate_inputs_cover_outputs(transaction, pool)
    }

    fn validate_all_claims_in_pool(
        transaction: &Transaction,
        pool: &UtxoPool,
    ) -> Result<(), ValidationError> {
        match transaction.claimed_refs().find(|r| !pool.contains(r)) {
            Some(missing) => Err(ValidationError::MissingClaim(*missing)),
            None => Ok(()),
        }
    }

    fn validate_all_signatures(
        &self,
        transaction: &Transaction,
        pool: &UtxoPool,
    ) -> Result<(), ValidationError> {
        for (index, input) in transaction.inputs().iter().enumerate() {
            // The pool, not the transaction, says who owns the claimed output.
            let owner = pool
                .get(input.claimed())
                .map(TransactionOutput::owner)
                .ok_or(ValidationError::MissingClaim(*input.claimed()))?;
            let verified = transaction
                .signable_content(index)
                .map(|message| self.verifier.verify(owner, &message, input.signature()))
                .unwrap_or(false);
            if !verified {
                return Err(ValidationError::InvalidSignature {
                    index,
                    claimed: *input.claimed(),
                });
            }
        }
        Ok(())
    }

    fn validate_no_output_claimed_twice(transaction: &Transaction) -> Result<(), ValidationError> {
        let mut claimed = HashSet::with_capacity(transaction.inputs().len());
        match transaction.claimed_refs().find(|r| !claimed.insert(*r)) {
            Some(duplicate) => Err(ValidationError::DuplicateClaim(*duplicate)),
            None => Ok(()),
        }
    }

    fn validate_all_outputs_non_negative(transaction: &Transaction) -> Result<(), ValidationError> {
        match transaction
            .outputs()
            .iter()
            .enumerate()
            .find(|(_, output)| output.amount().is_negative())
        {
            Some((index, output)) => Err(ValidationError::NegativeOutput {
                index,
                amount: output.amount(),
            }),
            None => Ok(()),
        }
    }

    fn validate_inputs_cover_outputs(
        transaction: &Transaction,
        pool: &UtxoPool,
    ) -> Result<Coin, ValidationError> {
        let inputs = input_value(transaction, pool)?;
        let outputs = output_value(transaction)?;
        if inputs < outputs {
            return Err(ValidationError::InsufficientInputs { inputs, outputs });
        }
        inputs
            .checked_sub(outputs)
            .ok_or(ValidationError::ValueOverflow)
    }
}

fn input_value(transaction: &Transaction, pool: &UtxoPool) -> Result<Coin, ValidationError> {
    let mut total = Coin::zero();
    for claimed in transaction.claimed_refs() {
        let output = pool
            .get(claimed)
            .ok_or(ValidationError::MissingClaim(*claimed))?;
        total = total
            .checked_add(output.amount())
            .ok_or(ValidationError::ValueOverflow)?;
    }
    Ok(total)
}

fn output_value(transaction: &Transaction) -> Result<Coin, ValidationError> {
    Coin::checked_sum(transaction.outputs().iter().map(TransactionOutput::amount))
        .ok_or(ValidationError::ValueOverflow)
}

/// Input value minus output value, with the inputs priced by `pool`.
/// Returns None if a claim is not in the pool or the amounts overflow.
pub fn transaction_fee(transaction: &Transaction, pool: &UtxoPool) -> Option<Coin> {
    let inputs = input_value(transaction, pool).ok()?;
    let outputs = output_value(transaction).ok()?;
    inputs.checked_sub(outputs)
}
