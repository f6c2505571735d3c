use crate::error::{Result, ScroogeError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Digest;
use std::fmt::{Display, Formatter};

const SHA256_BYTE_COUNT: usize = 32;

/// A 256-bit SHA-256 digest.
/// Displays and serializes as a hex-encoded string.
#[derive(Copy, Clone, Debug, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct Sha256([u8; SHA256_BYTE_COUNT]);

impl Sha256 {
    pub const fn from_raw(raw_bytes: [u8; SHA256_BYTE_COUNT]) -> Self {
        Self(raw_bytes)
    }

    pub fn digest(data: &[u8]) -> Self {
        let mut output = [0; SHA256_BYTE_COUNT];
        output.copy_from_slice(sha2::Sha256::digest(data).as_slice());
        Self(output)
    }

    /// SHA-256 applied twice, as used for transaction identities.
    pub fn double_digest(data: &[u8]) -> Self {
        Self::digest(Self::digest(data).as_slice())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_slice())
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)?;
        if bytes.len() != SHA256_BYTE_COUNT {
            return Err(ScroogeError::InvalidLength {
                expected: SHA256_BYTE_COUNT,
                actual: bytes.len(),
                input: s.to_string(),
            });
        }
        let mut sha = [0; SHA256_BYTE_COUNT];
        sha.copy_from_slice(&bytes);
        Ok(Self(sha))
    }
}

impl Display for Sha256 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Sha256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Sha256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            <[u8; SHA256_BYTE_COUNT]>::deserialize(deserializer).map(Self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_matches_known_vector() {
        assert_eq!(
            Sha256::digest(b"hello world").to_hex(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn hex_round_trips() {
        let hash = Sha256::double_digest(b"scrooge");
        assert_eq!(Sha256::from_hex(&hash.to_hex()).unwrap(), hash);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = Sha256::from_hex("abcd").unwrap_err();
        assert!(matches!(
            err,
            ScroogeError::InvalidLength {
                expected: 32,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        assert!(matches!(
            Sha256::from_hex("zz"),
            Err(ScroogeError::InvalidHex(_))
        ));
    }

    #[test]
    fn serializes_as_hex_in_json() {
        let hash = Sha256::from_raw([0xab; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        assert_eq!(serde_json::from_str::<Sha256>(&json).unwrap(), hash);
    }
}
