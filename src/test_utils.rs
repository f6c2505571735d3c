//! Deterministic keys and fixtures shared by the unit tests.

use crate::{
    Coin, OutputRef, PublicKey, Sha256, Signature, Transaction, TransactionBuilder,
    TransactionId, TransactionOutput, UtxoPool,
};
use ed25519_dalek::{Signer, SigningKey};

pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    pub fn from_seed(seed: u8) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&[seed; 32]),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_raw(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::new(self.signing_key.sign(message).to_bytes().to_vec())
    }
}

/// The id of a transaction that created coins out of thin air. Its outputs seed the pools.
pub fn genesis_id() -> TransactionId {
    TransactionId::new(Sha256::digest(b"genesis"))
}

pub fn genesis_ref(index: u32) -> OutputRef {
    OutputRef::new(genesis_id(), index)
}

/// A pool holding one genesis output per amount, all owned by `owner`.
pub fn genesis_pool(owner: &KeyPair, amounts: &[i64]) -> UtxoPool {
    amounts
        .iter()
        .enumerate()
        .map(|(index, amount)| {
            (
                genesis_ref(index as u32),
                TransactionOutput::new(Coin::new(*amount), owner.public_key()),
            )
        })
        .collect()
}

/// Spends `claimed` into outputs of the given amounts, every input signed by `signer`.
pub fn spend(claimed: &[OutputRef], amounts: &[i64], signer: &KeyPair) -> Transaction {
    pay(claimed, amounts, signer, &KeyPair::from_seed(200))
}

/// Like `spend`, but pays the outputs to `recipient` so they can be spent again.
pub fn pay(
    claimed: &[OutputRef],
    amounts: &[i64],
    signer: &KeyPair,
    recipient: &KeyPair,
) -> Transaction {
    let builder = claimed
        .iter()
        .fold(TransactionBuilder::new(), |builder, r| builder.input(*r));
    amounts
        .iter()
        .fold(builder, |builder, amount| {
            builder.output(Coin::new(*amount), recipient.public_key())
        })
        .sign_all(|_, message| signer.sign(message))
        .build()
}

pub fn ids(transactions: &[Transaction]) -> Vec<TransactionId> {
    transactions.iter().map(|t| *t.id()).collect()
}
