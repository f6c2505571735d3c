pub mod coin;
pub mod commands;
pub mod error;
pub mod handler;
pub mod hash;
pub mod public_key;
pub mod scenario;
pub mod selection;
pub mod transaction;
pub mod utxo_pool;
pub mod validation;

#[cfg(test)]
mod test_utils;

pub use self::{
    coin::*, error::ScroogeError, handler::*, hash::*, public_key::*, scenario::*, selection::*,
    transaction::*, utxo_pool::*, validation::*,
};
