use thiserror::Error;

/// Failures outside the validation path: parsing identifiers, building transactions and
/// loading scenario files.
#[derive(Error, Debug)]
pub enum ScroogeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid length, expected: {expected} bytes but got: {actual} in: {input}")]
    InvalidLength {
        expected: usize,
        actual: usize,
        input: String,
    },

    #[error("invalid output reference: {0}, expected format: <TXID>:<OutputIndex>")]
    InvalidOutputRef(String),

    #[error("input index: {index} is out of range for a transaction with {count} inputs")]
    InputIndexOutOfRange { index: usize, count: usize },

    #[error("unknown selection policy: {0}, expected one of: first-seen, max-fee")]
    UnknownPolicy(String),

    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScroogeError>;
