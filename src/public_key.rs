use crate::error::{Result, ScroogeError};
use ed25519_dalek::Verifier;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::TryFrom;
use std::fmt::{Debug, Display, Formatter};

const PUBLIC_KEY_BYTE_COUNT: usize = 32;

/// The public credential that owns a transaction output.
#[derive(Copy, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct PublicKey([u8; PUBLIC_KEY_BYTE_COUNT]);

impl PublicKey {
    pub const fn from_raw(raw_bytes: [u8; PUBLIC_KEY_BYTE_COUNT]) -> Self {
        Self(raw_bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_BYTE_COUNT] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)?;
        let raw = <[u8; PUBLIC_KEY_BYTE_COUNT]>::try_from(bytes.as_slice()).map_err(|_| {
            ScroogeError::InvalidLength {
                expected: PUBLIC_KEY_BYTE_COUNT,
                actual: bytes.len(),
                input: s.to_string(),
            }
        })?;
        Ok(Self(raw))
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            <[u8; PUBLIC_KEY_BYTE_COUNT]>::deserialize(deserializer).map(Self)
        }
    }
}

/// Opaque signature bytes attached to a transaction input.
/// The bytes are not checked for length until verification.
#[derive(Clone, Default, Hash, Eq, PartialEq)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", hex::encode(&self.0))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&hex::encode(&self.0))
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            hex::decode(&s)
                .map(Self)
                .map_err(serde::de::Error::custom)
        } else {
            Vec::<u8>::deserialize(deserializer).map(Self)
        }
    }
}

/// Checks that a signature over a message was produced by the owner of a public key.
///
/// Implementations must be deterministic and free of side effects: validation may call
/// `verify` any number of times for the same input and expects the same answer.
pub trait SignatureVerifier {
    fn verify(&self, owner: &PublicKey, message: &[u8], signature: &Signature) -> bool;
}

impl<V: SignatureVerifier + ?Sized> SignatureVerifier for &V {
    fn verify(&self, owner: &PublicKey, message: &[u8], signature: &Signature) -> bool {
        (**self).verify(owner, message, signature)
    }
}

/// Verifies Ed25519 signatures.
/// Public keys that are not valid curve points and signatures of the wrong length
/// fail verification rather than erroring.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, owner: &PublicKey, message: &[u8], signature: &Signature) -> bool {
        let verifying_key = match ed25519_dalek::VerifyingKey::from_bytes(owner.as_bytes()) {
            Ok(key) => key,
            Err(_) => return false,
        };
        let signature = match ed25519_dalek::Signature::from_slice(signature.as_slice()) {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        verifying_key.verify(message, &signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::KeyPair;

    #[test]
    fn verifies_signature_from_owner() {
        let alice = KeyPair::from_seed(1);
        let signature = alice.sign(b"pay bob");
        assert!(Ed25519Verifier.verify(&alice.public_key(), b"pay bob", &signature));
    }

    #[test]
    fn rejects_signature_over_other_message() {
        let alice = KeyPair::from_seed(1);
        let signature = alice.sign(b"pay bob");
        assert!(!Ed25519Verifier.verify(&alice.public_key(), b"pay eve", &signature));
    }

    #[test]
    fn rejects_signature_from_other_key() {
        let alice = KeyPair::from_seed(1);
        let scrooge = KeyPair::from_seed(2);
        let signature = scrooge.sign(b"pay bob");
        assert!(!Ed25519Verifier.verify(&alice.public_key(), b"pay bob", &signature));
    }

    #[test]
    fn malformed_signature_does_not_verify() {
        let alice = KeyPair::from_seed(1);
        let signature = Signature::new(vec![1, 2, 3]);
        assert!(!Ed25519Verifier.verify(&alice.public_key(), b"pay bob", &signature));
        assert!(!Ed25519Verifier.verify(&alice.public_key(), b"pay bob", &Signature::empty()));
    }

    #[test]
    fn public_key_hex_round_trips() {
        let key = KeyPair::from_seed(7).public_key();
        assert_eq!(PublicKey::from_hex(&key.to_hex()).unwrap(), key);
        assert!(PublicKey::from_hex("00ff").is_err());
    }
}
