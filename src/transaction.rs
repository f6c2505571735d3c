use crate::error::{Result, ScroogeError};
use crate::{Coin, PublicKey, Sha256, Signature};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A double SHA-256 hash of the transaction data, signatures included.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Sha256);

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionId {
    pub const fn new(data: Sha256) -> Self {
        Self(data)
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// The first 8 hex characters, for log lines.
    pub fn short(&self) -> String {
        self.0.to_hex()[..8].to_string()
    }
}

/// A reference to an output of a prior transaction: the unit that inputs claim and the key
/// of the UTXO pool.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
pub struct OutputRef {
    transaction_id: TransactionId,
    output_index: u32,
}

impl OutputRef {
    pub const fn new(transaction_id: TransactionId, output_index: u32) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn output_index(&self) -> u32 {
        self.output_index
    }
}

impl Display for OutputRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.output_index)
    }
}

impl FromStr for OutputRef {
    type Err = ScroogeError;

    /// Parses `<TXID>:<OutputIndex>`.
    fn from_str(s: &str) -> Result<Self> {
        let (id, index) = s
            .split_once(':')
            .ok_or_else(|| ScroogeError::InvalidOutputRef(s.to_string()))?;
        let output_index = index
            .parse::<u32>()
            .map_err(|_| ScroogeError::InvalidOutputRef(s.to_string()))?;
        Ok(Self::new(
            TransactionId::new(Sha256::from_hex(id)?),
            output_index,
        ))
    }
}

impl Serialize for OutputRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            (&self.transaction_id, self.output_index).serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for OutputRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            let (transaction_id, output_index) =
                <(TransactionId, u32)>::deserialize(deserializer)?;
            Ok(Self::new(transaction_id, output_index))
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    // The output being spent.
    claimed: OutputRef,
    // Signature by the claimed output's owner over the signable content at this input's
    // position.
    signature: Signature,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.claimed)
    }
}

impl TransactionInput {
    pub fn new(claimed: OutputRef, signature: Signature) -> Self {
        Self { claimed, signature }
    }

    pub fn unsigned(claimed: OutputRef) -> Self {
        Self::new(claimed, Signature::empty())
    }

    pub fn claimed(&self) -> &OutputRef {
        &self.claimed
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionOutput {
    amount: Coin,
    owner: PublicKey,
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.amount, self.owner)
    }
}

impl TransactionOutput {
    pub fn new(amount: Coin, owner: PublicKey) -> Self {
        Self { amount, owner }
    }

    pub fn amount(&self) -> Coin {
        self.amount
    }

    pub fn owner(&self) -> &PublicKey {
        &self.owner
    }
}

#[derive(Serialize)]
struct SignableContent<'a> {
    claimed: &'a OutputRef,
    input_index: u32,
    outputs: &'a [TransactionOutput],
}

#[derive(Serialize)]
struct TransactionContent<'a> {
    inputs: &'a [TransactionInput],
    outputs: &'a [TransactionOutput],
}

fn encode<T: Serialize>(value: &T) -> Vec<u8> {
    // Only fixed-layout structs, slices and byte vectors are encoded here, for which bincode
    // has no failure mode.
    bincode::serialize(value).expect("canonical transaction encoding cannot fail")
}

/// The message that the input at `input_index` must sign: the claimed output reference, the
/// position of the input and every output. Other inputs' signatures are not covered, so
/// inputs can be signed in any order.
fn signable_content(
    claimed: &OutputRef,
    input_index: usize,
    outputs: &[TransactionOutput],
) -> Vec<u8> {
    encode(&SignableContent {
        claimed,
        input_index: input_index as u32,
        outputs,
    })
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Transaction {
    // Derived from inputs and outputs, it's stored to avoid re-hashing on every lookup.
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Transaction {
    /// Creates a finalized transaction. The signatures must already be attached, as the
    /// identity covers them.
    pub fn new(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        let id = Self::hash_transaction_data(&inputs, &outputs);
        Self {
            id,
            inputs,
            outputs,
        }
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn inputs(&self) -> &[TransactionInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.outputs
    }

    /// Returns the canonical message the signature of the input at `input_index` covers,
    /// or None if there is no such input.
    pub fn signable_content(&self, input_index: usize) -> Option<Vec<u8>> {
        self.inputs
            .get(input_index)
            .map(|input| signable_content(input.claimed(), input_index, &self.outputs))
    }

    /// Output references claimed by the inputs, in input order.
    pub fn claimed_refs(&self) -> impl Iterator<Item = &OutputRef> + '_ {
        self.inputs.iter().map(TransactionInput::claimed)
    }

    /// The outputs this transaction creates, keyed by the references under which they enter
    /// the UTXO pool.
    pub fn produced(&self) -> impl Iterator<Item = (OutputRef, &TransactionOutput)> + '_ {
        let id = self.id;
        self.outputs
            .iter()
            .enumerate()
            .map(move |(index, output)| (OutputRef::new(id, index as u32), output))
    }

    /// Two transactions conflict when they claim at least one common output.
    pub fn conflicts_with(&self, other: &Transaction) -> bool {
        let claimed = self.claimed_refs().collect::<HashSet<_>>();
        other.claimed_refs().any(|r| claimed.contains(r))
    }

    /// True if this transaction claims an output created by `parent`.
    pub fn spends_from(&self, parent: &TransactionId) -> bool {
        self.claimed_refs().any(|r| r.transaction_id() == parent)
    }

    fn hash_transaction_data(
        inputs: &[TransactionInput],
        outputs: &[TransactionOutput],
    ) -> TransactionId {
        let data = encode(&TransactionContent { inputs, outputs });
        TransactionId::new(Sha256::double_digest(&data))
    }
}

impl<'de> Deserialize<'de> for Transaction {
    /// The identity is recomputed from the decoded content, never trusted from the input.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct TransactionHelper {
            inputs: Vec<TransactionInput>,
            outputs: Vec<TransactionOutput>,
        }

        let helper = TransactionHelper::deserialize(deserializer)?;
        Ok(Transaction::new(helper.inputs, helper.outputs))
    }
}

/// Assembles a transaction whose inputs are signed one position at a time.
///
/// ```
/// use scroogecoin_lib::{Coin, OutputRef, PublicKey, Signature, TransactionBuilder};
/// # let claimed: OutputRef = format!("{}:0", "00".repeat(32)).parse().unwrap();
/// # let owner = PublicKey::from_raw([7; 32]);
/// let mut builder = TransactionBuilder::new()
///     .input(claimed)
///     .output(Coin::new(5), owner);
/// let message = builder.signable_content(0).unwrap();
/// # let signature = Signature::new(message);
/// builder.sign_input(0, signature).unwrap();
/// let transaction = builder.build();
/// assert_eq!(transaction.inputs().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, claimed: OutputRef) -> Self {
        self.inputs.push(TransactionInput::unsigned(claimed));
        self
    }

    pub fn output(mut self, amount: Coin, owner: PublicKey) -> Self {
        self.outputs.push(TransactionOutput::new(amount, owner));
        self
    }

    pub fn signable_content(&self, input_index: usize) -> Result<Vec<u8>> {
        let input = self
            .inputs
            .get(input_index)
            .ok_or(ScroogeError::InputIndexOutOfRange {
                index: input_index,
                count: self.inputs.len(),
            })?;
        Ok(signable_content(input.claimed(), input_index, &self.outputs))
    }

    pub fn sign_input(&mut self, input_index: usize, signature: Signature) -> Result<()> {
        let count = self.inputs.len();
        let input = self
            .inputs
            .get_mut(input_index)
            .ok_or(ScroogeError::InputIndexOutOfRange {
                index: input_index,
                count,
            })?;
        input.signature = signature;
        Ok(())
    }

    /// Signs every input with `sign`, which receives the input position and the message.
    pub fn sign_all<F>(mut self, mut sign: F) -> Self
    where
        F: FnMut(usize, &[u8]) -> Signature,
    {
        for index in 0..self.inputs.len() {
            let message = signable_content(self.inputs[index].claimed(), index, &self.outputs);
            self.inputs[index].signature = sign(index, &message);
        }
        self
    }

    /// Finalizes the transaction and computes its identity.
    pub fn build(self) -> Transaction {
        Transaction::new(self.inputs, self.outputs)
    }
}
