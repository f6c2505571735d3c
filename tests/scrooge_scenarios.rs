//! End-to-end scenarios against the public API: Scrooge owns a single coin of 10 and signs
//! conflicting spends of it.

use ed25519_dalek::{Signer, SigningKey};
use scroogecoin_lib::{
    Coin, Ed25519Verifier, OutputRef, PublicKey, SelectionPolicy, Sha256, Signature,
    Transaction, TransactionBuilder, TransactionHandler, TransactionId, TransactionOutput,
    UtxoPool, ValidationError,
};

struct Fixture {
    scrooge: SigningKey,
    alice: PublicKey,
    coin: OutputRef,
    pool: UtxoPool,
}

impl Fixture {
    fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();

        let scrooge = SigningKey::from_bytes(&[11; 32]);
        let alice = PublicKey::from_raw(SigningKey::from_bytes(&[12; 32]).verifying_key().to_bytes());
        // A root transaction created this coin out of thin air.
        let coin = OutputRef::new(TransactionId::new(Sha256::digest(b"root")), 0);
        let mut pool = UtxoPool::new();
        pool.add(
            coin,
            TransactionOutput::new(
                Coin::new(10),
                PublicKey::from_raw(scrooge.verifying_key().to_bytes()),
            ),
        );
        Self {
            scrooge,
            alice,
            coin,
            pool,
        }
    }

    fn spend(&self, claims: &[OutputRef], amounts: &[i64]) -> Transaction {
        let builder = claims
            .iter()
            .fold(TransactionBuilder::new(), |builder, claim| builder.input(*claim));
        amounts
            .iter()
            .fold(builder, |builder, amount| {
                builder.output(Coin::new(*amount), self.alice)
            })
            .sign_all(|_, message| {
                Signature::new(self.scrooge.sign(message).to_bytes().to_vec())
            })
            .build()
    }

    fn handler(&self, policy: SelectionPolicy) -> TransactionHandler<Ed25519Verifier> {
        TransactionHandler::new(&self.pool, Ed25519Verifier, policy)
    }
}

#[test]
fn conflicting_spends_are_each_valid_in_isolation() {
    let fixture = Fixture::new();
    let fee_one = fixture.spend(&[fixture.coin], &[5, 3, 1]);
    let fee_two = fixture.spend(&[fixture.coin], &[4, 3, 1]);
    let handler = fixture.handler(SelectionPolicy::MaxFee);

    assert!(handler.is_valid_tx(&fee_one));
    assert!(handler.is_valid_tx(&fee_two));
    assert_eq!(handler.validate(&fee_one), Ok(Coin::new(1)));
    assert_eq!(handler.validate(&fee_two), Ok(Coin::new(2)));
}

#[test]
fn first_seen_policy_is_order_sensitive() {
    let fixture = Fixture::new();
    let fee_one = fixture.spend(&[fixture.coin], &[5, 3, 1]);
    let fee_two = fixture.spend(&[fixture.coin], &[4, 3, 1]);

    let mut handler = fixture.handler(SelectionPolicy::FirstSeen);
    let accepted = handler.handle_transactions(&[fee_one.clone(), fee_two.clone()]);
    assert_eq!(accepted, vec![fee_one.clone()]);

    let mut handler = fixture.handler(SelectionPolicy::FirstSeen);
    let accepted = handler.handle_transactions(&[fee_two.clone(), fee_one]);
    assert_eq!(accepted, vec![fee_two]);
}

#[test]
fn max_fee_policy_prefers_the_higher_fee() {
    let fixture = Fixture::new();
    let fee_one = fixture.spend(&[fixture.coin], &[5, 3, 1]);
    let fee_two = fixture.spend(&[fixture.coin], &[4, 3, 1]);
    let mut handler = fixture.handler(SelectionPolicy::MaxFee);

    let accepted = handler.handle_transactions(&[fee_one, fee_two.clone()]);

    assert_eq!(accepted, vec![fee_two.clone()]);
    let pool = handler.pool();
    assert!(!pool.contains(&fixture.coin));
    for (index, output) in fee_two.outputs().iter().enumerate() {
        assert_eq!(
            pool.get(&OutputRef::new(*fee_two.id(), index as u32)),
            Some(output)
        );
    }
    assert_eq!(pool.total_value(), Some(Coin::new(8)));
}

#[test]
fn negative_output_is_rejected() {
    let fixture = Fixture::new();
    let negative = fixture.spend(&[fixture.coin], &[5, -1]);
    let handler = fixture.handler(SelectionPolicy::MaxFee);

    assert_eq!(
        handler.validate(&negative),
        Err(ValidationError::NegativeOutput {
            index: 1,
            amount: Coin::new(-1),
        })
    );
}

#[test]
fn double_claim_within_a_transaction_is_rejected() {
    let fixture = Fixture::new();
    let double_claim = fixture.spend(&[fixture.coin, fixture.coin], &[15]);
    let mut handler = fixture.handler(SelectionPolicy::MaxFee);

    assert_eq!(
        handler.validate(&double_claim),
        Err(ValidationError::DuplicateClaim(fixture.coin))
    );
    assert!(handler.handle_transactions(&[double_claim]).is_empty());
    assert_eq!(handler.pool(), &fixture.pool);
}
